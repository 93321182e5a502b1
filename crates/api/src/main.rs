mod config;
mod error;
mod state;
mod telemetry;
pub mod routes {
    pub mod assignments;
    pub mod health;
    pub mod preferences;
    pub mod schedule;
}

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use carpool_core::SystemClock;
use store::{Fixture, InMemoryStore};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
        paths(
            routes::health::health,
            routes::schedule::generate,
            routes::assignments::week,
            routes::preferences::submit,
        ),
        components(schemas(
            types::GenerateRequest, types::GenerateSummary, types::Assignment,
            types::AssignmentId, types::AssignmentMethod, types::AssignmentStatus,
            types::PreferenceSubmission, types::PreferenceInput, types::PreferenceLevel,
            types::WeeklyPreference, types::TemplateSlot, types::RouteType,
            types::GroupId, types::DriverId, types::SlotId,
        )),
        tags(
            (name = "carpool", description = "Weekly carpool assignment API")
        )
    )]
struct ApiDoc;

fn app(state: state::AppState) -> Router {
    Router::new()
        .route("/v1/health", get(routes::health::health))
        .route("/v1/groups/:group/schedule", post(routes::schedule::generate))
        .route(
            "/v1/groups/:group/weeks/:week/assignments",
            get(routes::assignments::week),
        )
        .route("/v1/groups/:group/preferences", post(routes::preferences::submit))
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(telemetry::stack())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();

    let settings = config::Settings::from_env()?;
    let store = InMemoryStore::new();
    if let Some(path) = &settings.fixture {
        let fixture = Fixture::from_path(path)?;
        tracing::info!(path = %path.display(), groups = fixture.groups.len(), "loading fixture");
        store.load_fixture(fixture);
    }

    let app_state = state::AppState::new(settings.engine.clone(), store, Arc::new(SystemClock));

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], settings.port));
    tracing::info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(app_state))
        .with_graceful_shutdown(shutdown())
        .await?;
    Ok(())
}

async fn shutdown() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
