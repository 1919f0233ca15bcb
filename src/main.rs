use ats_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    middleware as mw, routes, AppState,
};
use axum::{
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    // Email outbox worker: delivers pending notifications, never blocks a
    // request path.
    {
        let notif = app_state.notification_service.clone();
        tokio::spawn(async move {
            loop {
                match notif.run_once().await {
                    Ok(true) => {}
                    Ok(false) => {
                        tokio::time::sleep(Duration::from_millis(1000)).await;
                    }
                    Err(e) => {
                        tracing::error!(error = ?e, "email outbox worker error");
                        tokio::time::sleep(Duration::from_secs(2)).await;
                    }
                }
            }
        });
    }

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let public_api = Router::new()
        .route("/api/auth/register", post(routes::auth_routes::register))
        .route("/api/auth/login", post(routes::auth_routes::login))
        .route(
            "/api/public/careers",
            get(routes::public_routes::list_open_careers),
        )
        .route(
            "/api/public/careers/:id",
            get(routes::public_routes::get_open_career),
        )
        .layer(axum::middleware::from_fn_with_state(
            mw::rate_limit::Throttle::per_second(config.public_rps),
            mw::rate_limit::throttle,
        ));

    let applicant_api = Router::new()
        .route(
            "/api/applicant/cv",
            get(routes::applicant_routes::my_cv).put(routes::applicant_routes::upsert_cv),
        )
        .route(
            "/api/applicant/applications",
            get(routes::applicant_routes::my_applications)
                .post(routes::applicant_routes::apply),
        )
        .layer(axum::middleware::from_fn(mw::auth::require_applicant))
        .layer(axum::middleware::from_fn_with_state(
            mw::rate_limit::Throttle::per_second(config.api_rps),
            mw::rate_limit::throttle,
        ));

    let recruiter_api = Router::new()
        .route(
            "/api/recruiter/careers",
            get(routes::recruiter_routes::list_careers)
                .post(routes::recruiter_routes::create_career),
        )
        .route(
            "/api/recruiter/careers/:id",
            get(routes::recruiter_routes::get_career)
                .patch(routes::recruiter_routes::update_career)
                .delete(routes::recruiter_routes::close_career),
        )
        .route(
            "/api/recruiter/candidates",
            get(routes::recruiter_routes::list_candidates),
        )
        .route(
            "/api/recruiter/candidates/grouped",
            get(routes::recruiter_routes::grouped_candidates),
        )
        .route(
            "/api/recruiter/applications/:uid/screen-cv",
            post(routes::recruiter_routes::screen_cv),
        )
        .route(
            "/api/recruiter/applications/:uid/status",
            post(routes::recruiter_routes::manual_transition),
        )
        .route(
            "/api/recruiter/applications/:uid/history",
            get(routes::recruiter_routes::application_history),
        )
        .layer(axum::middleware::from_fn(mw::auth::require_recruiter))
        .layer(axum::middleware::from_fn_with_state(
            mw::rate_limit::Throttle::per_second(config.api_rps),
            mw::rate_limit::throttle,
        ));

    let admin_api = Router::new()
        .route(
            "/api/admin/settings/screening-prompt",
            get(routes::admin_routes::get_settings)
                .put(routes::admin_routes::update_screening_prompt),
        )
        .route(
            "/api/admin/organizations",
            get(routes::admin_routes::list_organizations)
                .post(routes::admin_routes::create_organization),
        )
        .layer(axum::middleware::from_fn(mw::auth::require_admin));

    let app = base_routes
        .merge(public_api)
        .merge(applicant_api)
        .merge(recruiter_api)
        .merge(admin_api)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
