//! HTTP transport for the classification server.
//!
//! Routes mirror the three-party protocol: key uploads enroll a recipient,
//! `/:id/send` runs the evaluation pipeline and delivers the result to the
//! recipient's mailbox, inbox routes page through delivered results.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::ckks::{Ciphertext, CkksContext, PublicKey, RelinearizationKey, RotationKeySet};
use crate::error::MailError;
use crate::mailbox::{MailboxStore, MessageRecord};
use crate::pipeline;
use crate::registry::KeyRegistry;
use crate::storage;

pub struct AppState {
    pub ctx: Arc<CkksContext>,
    pub registry: Arc<KeyRegistry>,
    pub mailbox: Arc<MailboxStore>,
    pub weights: Arc<Vec<f64>>,
    /// When set, delivered ciphertext/result pairs are also written here
    pub data_dir: Option<PathBuf>,
}

/// Envelope for all three key uploads
#[derive(Serialize, Deserialize)]
pub struct KeyUpload<K> {
    pub fingerprint: String,
    pub key: K,
}

#[derive(Serialize, Deserialize)]
pub struct SendRequest {
    pub subject: String,
    pub ciphertext: Ciphertext,
}

#[derive(Serialize, Deserialize)]
pub struct SendResponse {
    pub message_id: usize,
}

#[derive(Serialize, Deserialize)]
pub struct ParamsResponse {
    pub fingerprint: String,
    pub slots: usize,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

struct ApiError(MailError);

impl From<MailError> for ApiError {
    fn from(e: MailError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            MailError::UnknownUser(_) | MailError::MissingPublicKey(_) => StatusCode::NOT_FOUND,
            MailError::IndexOutOfRange { .. } | MailError::EncodingError(_) => {
                StatusCode::BAD_REQUEST
            }
            MailError::ConfigMismatch { .. } => StatusCode::CONFLICT,
            MailError::LevelExhausted
            | MailError::LevelMismatch(_, _)
            | MailError::ScaleMismatch(_, _)
            | MailError::MissingRotationKey(_)
            | MailError::MissingRelinKey(_) => StatusCode::UNPROCESSABLE_ENTITY,
            MailError::InvalidParams(_)
            | MailError::SerializationError(_)
            | MailError::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

async fn ping() -> &'static str {
    "pong"
}

async fn get_params(State(state): State<Arc<AppState>>) -> Json<ParamsResponse> {
    Json(ParamsResponse {
        fingerprint: state.ctx.fingerprint(),
        slots: state.ctx.params().slots(),
    })
}

async fn upload_public_key(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(upload): Json<KeyUpload<PublicKey>>,
) -> Result<StatusCode, ApiError> {
    state
        .registry
        .register_public(&id, &upload.fingerprint, upload.key)?;
    state.mailbox.enroll(&id);
    info!(user = %id, "public key registered");
    Ok(StatusCode::OK)
}

async fn upload_rotation_keys(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(upload): Json<KeyUpload<RotationKeySet>>,
) -> Result<StatusCode, ApiError> {
    state
        .registry
        .register_rotation(&id, &upload.fingerprint, upload.key)?;
    state.mailbox.enroll(&id);
    info!(user = %id, "rotation keys registered");
    Ok(StatusCode::OK)
}

async fn upload_relin_key(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(upload): Json<KeyUpload<RelinearizationKey>>,
) -> Result<StatusCode, ApiError> {
    state
        .registry
        .register_relin(&id, &upload.fingerprint, upload.key)?;
    state.mailbox.enroll(&id);
    info!(user = %id, "relinearization key registered");
    Ok(StatusCode::OK)
}

async fn get_public_key(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PublicKey>, ApiError> {
    let bundle = state.registry.lookup(&id)?;
    let pk = bundle
        .public_key
        .ok_or(MailError::MissingPublicKey(id))?;
    Ok(Json(pk))
}

/// Accept a ciphertext for a recipient, evaluate the classifier, and
/// deliver the encrypted score. Fails closed: any pipeline error leaves
/// the mailbox untouched.
async fn send_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SendRequest>,
) -> Result<Json<SendResponse>, ApiError> {
    let bundle = state.registry.lookup(&id)?;
    let SendRequest {
        subject,
        ciphertext,
    } = req;

    let ctx = state.ctx.clone();
    let weights = state.weights.clone();
    let inbound = ciphertext.clone();
    let result = tokio::task::spawn_blocking(move || {
        pipeline::evaluate(&ctx, &weights, &inbound, &bundle)
    })
    .await
    .map_err(evaluation_join_error)?;

    let result = match result {
        Ok(ct) => ct,
        Err(e) => {
            warn!(user = %id, error = %e, "evaluation failed, nothing delivered");
            return Err(e.into());
        }
    };

    let message_id = state.mailbox.deliver(&id, &subject, result.clone())?;
    if let Some(dir) = &state.data_dir {
        let msg = message_id.to_string();
        storage::save_ciphertext(dir, &id, &msg, &ciphertext)?;
        storage::save_result(dir, &id, &msg, &result)?;
    }
    info!(user = %id, message_id, "result delivered");
    Ok(Json(SendResponse { message_id }))
}

/// A crashed evaluation task is a server-side failure, not a bad request.
fn evaluation_join_error(e: tokio::task::JoinError) -> MailError {
    MailError::StorageError(std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("evaluation task failed: {e}"),
    ))
}

async fn inbox_len(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<usize>, ApiError> {
    Ok(Json(state.mailbox.count(&id)?))
}

async fn inbox_fetch(
    State(state): State<Arc<AppState>>,
    Path((id, index)): Path<(String, usize)>,
) -> Result<Json<MessageRecord>, ApiError> {
    Ok(Json(state.mailbox.fetch(&id, index)?))
}

async fn flush(State(state): State<Arc<AppState>>) -> StatusCode {
    state.registry.reset();
    state.mailbox.reset();
    info!("registry and mailboxes flushed");
    StatusCode::OK
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/params", get(get_params))
        .route("/:id/pk", post(upload_public_key).get(get_public_key))
        .route("/:id/rok", post(upload_rotation_keys))
        .route("/:id/rek", post(upload_relin_key))
        .route("/:id/send", post(send_message))
        .route("/:id/inbox/len", get(inbox_len))
        .route("/:id/inbox/:index", get(inbox_fetch))
        .route("/flush", post(flush))
        .with_state(state)
}
