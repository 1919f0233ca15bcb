pub mod application_dto;
pub mod auth_dto;
pub mod career_dto;
pub mod cv_dto;
pub mod screening_dto;
