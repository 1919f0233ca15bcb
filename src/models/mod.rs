pub mod application;
pub mod career;
pub mod cv;
pub mod email_outbox;
pub mod history;
pub mod organization;
pub mod screening;
pub mod settings;
pub mod user;
