use std::any::Any;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinError;
use tracing::{error, warn};
use vigil_compute::{Analysis, RiskEngine};
use vigil_core::{ErrorPayload, VigilError};
use vigil_ingest::load_dataset;

pub const INTERNAL_ERROR: &str = "Internal Processing Error";

/// Load and score `path` on the blocking pool. Every failure, including a
/// panic inside the scoring task or an expired timeout, comes back as the
/// payload the caller should print.
pub async fn analyze_file(
    engine: Arc<RiskEngine>,
    path: PathBuf,
    timeout: Option<Duration>,
) -> Result<Analysis, ErrorPayload> {
    let task = tokio::task::spawn_blocking(move || {
        let raw = load_dataset(&path)?;
        engine.analyze_with_diagnostics(&raw)
    });

    let joined = match timeout {
        Some(limit) => match tokio::time::timeout(limit, task).await {
            Ok(joined) => joined,
            Err(_) => {
                warn!(timeout_secs = limit.as_secs_f64(), "analysis timed out, discarding run");
                return Err(ErrorPayload::new(INTERNAL_ERROR).with_details(format!(
                    "analysis exceeded the {}s timeout",
                    limit.as_secs_f64()
                )));
            }
        },
        None => task.await,
    };

    match joined {
        Ok(Ok(analysis)) => Ok(analysis),
        Ok(Err(e)) => Err(error_payload(&e)),
        Err(join_err) => Err(join_failure(join_err)),
    }
}

/// Input errors are reported verbatim; everything else is generic.
pub fn error_payload(err: &VigilError) -> ErrorPayload {
    if err.is_input_error() {
        ErrorPayload::new(err.to_string())
    } else {
        error!(error = %err, "analysis failed");
        ErrorPayload::new(INTERNAL_ERROR).with_details(err.to_string())
    }
}

fn join_failure(err: JoinError) -> ErrorPayload {
    let details = if err.is_panic() {
        panic_message(err.into_panic())
    } else {
        err.to_string()
    };
    error!(details = %details, "scoring task failed");
    ErrorPayload::new(INTERNAL_ERROR).with_details(details)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "scoring task panicked".to_string()
    }
}
