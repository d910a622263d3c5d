//! Chat request lifecycle: create, list, inspect and answer.
//!
//! The HTTP side is the durable record. When the counterpart is connected to
//! the relay it is also told right away; if not, the event is dropped and
//! the client picks the request up from the incoming list.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, instrument};

use soulace_core::ClientEvent;
use soulace_core::events::{ReplyPayload, RequestPayload};

use crate::storage::ChatRequestStatus;

use super::{ApiError, ApiJson, AppState, AuthUser};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChatRequest {
    #[serde(default)]
    pub receiver_id: String,
}

#[derive(Debug, Deserialize)]
pub struct RespondChatRequest {
    pub action: String,
}

/// `POST /api/chat-requests`
#[instrument(skip_all, fields(caller = %caller.id()))]
pub async fn create(
    caller: AuthUser,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateChatRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let receiver = body.receiver_id.trim();
    if receiver.is_empty() {
        return Err(ApiError::BadRequest("receiverId is required".into()));
    }
    if receiver == caller.id() {
        return Err(ApiError::BadRequest(
            "Cannot send a chat request to yourself".into(),
        ));
    }
    if !state.db.account_exists(receiver).await? {
        return Err(ApiError::NotFound(format!("Account {receiver} not found")));
    }

    let id = uuid::Uuid::new_v4().to_string();
    let request = state
        .db
        .create_chat_request(&id, caller.id(), receiver)
        .await?;
    info!(request_id = %id, receiver = %receiver, "Chat request created");

    let notify = ClientEvent::Request(RequestPayload {
        to: receiver.to_string(),
        request_id: Some(id),
        sender_name: Some(caller.0.name.clone()),
    });
    if let Err(e) = state.relay.dispatch(caller.id(), notify).await {
        e.log(caller.id());
    }
    let receiver_online = state.relay.is_online(receiver).await;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "request": request,
            "receiverOnline": receiver_online,
        })),
    ))
}

/// `GET /api/chat-requests/incoming`
#[instrument(skip_all, fields(caller = %caller.id()))]
pub async fn incoming(
    caller: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let requests = state.db.incoming_chat_requests(caller.id()).await?;
    Ok(Json(json!({ "success": true, "requests": requests })))
}

/// `GET /api/chat-requests/{id}`
#[instrument(skip_all, fields(caller = %caller.id(), request_id = %id))]
pub async fn get(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let request = state.db.get_chat_request(&id).await?;
    if !request.involves(caller.id()) {
        return Err(ApiError::Forbidden("Not a party to this request".into()));
    }
    Ok(Json(json!({ "success": true, "request": request })))
}

/// `POST /api/chat-requests/{id}/respond`
///
/// Only the receiver answers, and only once.
#[instrument(skip_all, fields(caller = %caller.id(), request_id = %id))]
pub async fn respond(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<RespondChatRequest>,
) -> Result<Json<Value>, ApiError> {
    let status = match body.action.parse::<ChatRequestStatus>() {
        Ok(s @ (ChatRequestStatus::Accepted | ChatRequestStatus::Declined)) => s,
        _ => {
            return Err(ApiError::BadRequest(
                "action must be accepted or declined".into(),
            ));
        }
    };

    let request = state.db.get_chat_request(&id).await?;
    if request.receiver_id != caller.id() {
        return Err(ApiError::Forbidden(
            "Only the receiver can answer this request".into(),
        ));
    }

    if !state.db.respond_chat_request(&id, caller.id(), status).await? {
        return Err(ApiError::Conflict(format!(
            "Chat request already {}",
            state.db.get_chat_request(&id).await?.status()
        )));
    }
    info!(status = %status, "Chat request answered");

    let reply = ReplyPayload {
        to: request.sender_id.clone(),
        request_id: id.clone(),
    };
    let notify = match status {
        ChatRequestStatus::Accepted => ClientEvent::Accept(reply),
        _ => ClientEvent::Reject(reply),
    };
    if let Err(e) = state.relay.dispatch(caller.id(), notify).await {
        e.log(caller.id());
    }

    let updated = state.db.get_chat_request(&id).await?;
    Ok(Json(json!({ "success": true, "request": updated })))
}
