pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    application_service::ApplicationService, auth_service::AuthService,
    career_service::CareerService, classifier_service::ClassifierService, cv_service::CvService,
    notification_service::NotificationService, screening_service::ScreeningService,
    settings_service::SettingsService,
};
use reqwest::Client;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub application_service: ApplicationService,
    pub auth_service: AuthService,
    pub career_service: CareerService,
    pub classifier_service: ClassifierService,
    pub cv_service: CvService,
    pub notification_service: NotificationService,
    pub screening_service: ScreeningService,
    pub settings_service: SettingsService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("reqwest client construction cannot fail with these options");

        let classifier_service = ClassifierService::new(
            config.openai_api_key.clone(),
            http_client,
            config.classifier_model.clone(),
            config.classifier_reasoning_effort.clone(),
            config.classifier_timeout_secs,
        );
        let notification_service = NotificationService::new(
            pool.clone(),
            config.email_relay_url.clone(),
            config.email_relay_secret.clone(),
        );

        Self {
            application_service: ApplicationService::new(pool.clone()),
            auth_service: AuthService::new(pool.clone()),
            career_service: CareerService::new(pool.clone()),
            classifier_service,
            cv_service: CvService::new(pool.clone()),
            notification_service,
            screening_service: ScreeningService::new(pool.clone()),
            settings_service: SettingsService::new(pool.clone()),
            pool,
        }
    }
}
