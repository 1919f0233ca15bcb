pub mod admin_routes;
pub mod applicant_routes;
pub mod auth_routes;
pub mod health;
pub mod public_routes;
pub mod recruiter_routes;
