use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use clinic_core::health::{healthz, readyz};
use clinic_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    dashboard::get_dashboard_stats,
    message::{complete_message, fail_message},
    patient::{create_patient, get_patient, list_patients},
    sms::send_sms,
    user::{delete_me, register_me},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Users
        .route("/users/@me", post(register_me).delete(delete_me))
        // Patients
        .route("/patients", get(list_patients).post(create_patient))
        .route("/patients/{id}", get(get_patient))
        // Outreach
        .route("/sms/send", post(send_sms))
        .route("/messages/{id}/completion", post(complete_message))
        .route("/messages/{id}/failure", post(fail_message))
        // Dashboard
        .route("/dashboard/stats", get(get_dashboard_stats))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(TraceLayer::new_for_http())
                .layer(propagate_request_id_layer()),
        )
}
