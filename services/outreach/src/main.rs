use sea_orm::Database;
use tracing::info;

use clinic_core::config::Config;
use clinic_core::tracing::init_tracing;
use clinic_outreach::config::OutreachConfig;
use clinic_outreach::infra::sms::SmsGateway;
use clinic_outreach::router::build_router;
use clinic_outreach::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = OutreachConfig::from_env();

    let sms = SmsGateway::from_config(&config).expect("invalid SMS configuration");

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let state = AppState {
        db,
        sms,
        timezone: config.clinic_timezone,
    };
    info!(
        sms_mode = state.sms.mode().as_str(),
        timezone = %state.timezone,
        "outreach service configured"
    );

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.outreach_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("outreach service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
