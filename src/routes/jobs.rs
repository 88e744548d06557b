use axum::extract::State;
use axum::Json;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::auth::ApiKey;
use crate::error::AppError;
use crate::extract::JsonBody;
use crate::models::AuditEvent;
use crate::state::SharedState;

const JOB_ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const JOB_ID_LEN: usize = 8;

#[derive(Deserialize)]
pub struct CreateJobRequest {
    pub objective: Option<String>,
    pub priority: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobResponse {
    pub status: &'static str,
    pub job_id: String,
}

/// Accept a job submission. Nothing executes it; the only effect is the audit entry.
pub async fn create(
    _key: ApiKey,
    State(state): State<SharedState>,
    JsonBody(req): JsonBody<CreateJobRequest>,
) -> Result<Json<CreateJobResponse>, AppError> {
    let job_id = generate_job_id();

    state
        .audit
        .append(AuditEvent::JobCreated {
            job_id: job_id.clone(),
            objective: req.objective.unwrap_or_else(|| "unknown".to_string()),
            priority: req.priority.unwrap_or_else(|| "normal".to_string()),
        })
        .await?;

    tracing::info!("Queued job {job_id}");
    Ok(Json(CreateJobResponse {
        status: "queued",
        job_id,
    }))
}

fn generate_job_id() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..JOB_ID_LEN)
        .map(|_| JOB_ID_ALPHABET[rng.random_range(0..JOB_ID_ALPHABET.len())] as char)
        .collect();
    format!("job_{suffix}")
}
