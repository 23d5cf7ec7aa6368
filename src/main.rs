//! Main entry point for the patient management service.
//!
//! Resolves configuration from the environment once at startup, builds the
//! shared application state (patient repository, spam detector) and serves
//! the REST API with OpenAPI/Swagger documentation.

use std::path::PathBuf;
use std::sync::Arc;

use api_rest::{router, AppState};
use parking_lot::Mutex;
use pms_core::{recovery_policy_from_env_value, CoreConfig, PatientRepository};
use spam_model::{EmailGenerator, SpamDetector};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the patient management REST server.
///
/// # Environment Variables
/// - `PMS_REST_ADDR`: server address (default: "0.0.0.0:8000")
/// - `PATIENT_STORE_PATH`: path to the patient store file (default: "patients.json";
///   the backup lives next to it as `<path>.backup`)
/// - `PATIENT_RECOVERY_POLICY`: `fallback-empty` (default) or `strict`
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pms_run=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("pms_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("PMS_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".into());

    let store_path = std::env::var("PATIENT_STORE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(pms_core::DEFAULT_STORE_FILE));
    let recovery_policy =
        recovery_policy_from_env_value(std::env::var("PATIENT_RECOVERY_POLICY").ok())?;

    let cfg = Arc::new(CoreConfig::new(store_path, recovery_policy)?);

    tracing::info!("++ Starting patient management REST API on {}", addr);
    tracing::info!("++ Patient store at {}", cfg.store_path().display());

    let state = AppState {
        repository: Arc::new(PatientRepository::new(cfg)),
        detector: Arc::new(Mutex::new(SpamDetector::new())),
        generator: Arc::new(Mutex::new(EmailGenerator::new())),
    };

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
