use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use hospital_core::{
    CoreConfig, CriticalAlertPolicy, Registry,
    config::{critical_severity_from_env_value, id_prefix_from_env_value},
    constants::{DEFAULT_BILL_ID_PREFIX, DEFAULT_PATIENT_ID_PREFIX},
    standard_notifier,
};

/// Main entry point for the hospital service
///
/// Resolves configuration from the environment, wires the department desks into a fresh
/// in-memory registry and serves the REST API (with Swagger UI at `/swagger-ui`).
///
/// # Environment Variables
/// - `HOSPITAL_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `HOSPITAL_CRITICAL_SEVERITY`: Emergency severity that raises a critical alert (default: 4)
/// - `HOSPITAL_PATIENT_ID_PREFIX`: Patient identifier prefix (default: "P")
/// - `HOSPITAL_BILL_ID_PREFIX`: Bill identifier prefix (default: "BILL-")
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration values are invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hospital_run=info".parse()?)
                .add_directive("hospital_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("HOSPITAL_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = Arc::new(CoreConfig::new(
        critical_severity_from_env_value(std::env::var("HOSPITAL_CRITICAL_SEVERITY").ok())?,
        id_prefix_from_env_value(
            std::env::var("HOSPITAL_PATIENT_ID_PREFIX").ok(),
            DEFAULT_PATIENT_ID_PREFIX,
        ),
        id_prefix_from_env_value(
            std::env::var("HOSPITAL_BILL_ID_PREFIX").ok(),
            DEFAULT_BILL_ID_PREFIX,
        ),
    )?);

    let notifier = standard_notifier(CriticalAlertPolicy::from_config(&cfg));
    let registry = Registry::new(cfg, notifier);

    tracing::info!("++ Starting hospital REST on {}", rest_addr);

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, router(AppState::new(registry))).await?;

    Ok(())
}
