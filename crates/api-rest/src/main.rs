//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! Useful for development and debugging when you only want the REST server
//! (with OpenAPI/Swagger UI). The workspace's main `pms-run` binary is the
//! normal entry point.

use std::path::PathBuf;
use std::sync::Arc;

use api_rest::{router, AppState};
use parking_lot::Mutex;
use pms_core::{recovery_policy_from_env_value, CoreConfig, PatientRepository};
use spam_model::{EmailGenerator, SpamDetector};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
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

    tracing::info!("++ Starting REST API server on {}", addr);
    tracing::info!("++ Swagger UI at http://{}/swagger-ui", addr);

    let state = AppState {
        repository: Arc::new(PatientRepository::new(cfg)),
        detector: Arc::new(Mutex::new(SpamDetector::new())),
        generator: Arc::new(Mutex::new(EmailGenerator::new())),
    };

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
