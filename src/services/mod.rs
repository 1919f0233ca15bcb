pub mod application_service;
pub mod auth_service;
pub mod career_service;
pub mod classifier_service;
pub mod cv_service;
pub mod notification_service;
pub mod screening_service;
pub mod settings_service;
