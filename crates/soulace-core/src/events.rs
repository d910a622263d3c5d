//! Relay event protocol for the presence channel.
//!
//! Every frame is a JSON object `{"event": <name>, "data": <payload>}`.
//! Inbound frames are decoded once into [`ClientEvent`]; the server only
//! ever emits [`ServerEvent`]. Outbound payloads carry the sender identity
//! the server registered for the connection, not anything the client sent.

use serde::{Deserialize, Serialize};

/// Addressed chat request from one party to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPayload {
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
}

/// Reply that references an earlier request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyPayload {
    pub to: String,
    pub request_id: String,
}

/// Typing indicators only name the counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingPayload {
    pub to: String,
}

/// Frames a connected client may send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "chat:request")]
    Request(RequestPayload),
    #[serde(rename = "chat:accept")]
    Accept(ReplyPayload),
    #[serde(rename = "chat:reject")]
    Reject(ReplyPayload),
    #[serde(rename = "chat:requestTimeout")]
    RequestTimeout(ReplyPayload),
    #[serde(rename = "chat:typing")]
    Typing(TypingPayload),
    #[serde(rename = "chat:stopTyping")]
    StopTyping(TypingPayload),
}

impl ClientEvent {
    pub fn decode(frame: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(frame)
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Request(_) => "chat:request",
            Self::Accept(_) => "chat:accept",
            Self::Reject(_) => "chat:reject",
            Self::RequestTimeout(_) => "chat:requestTimeout",
            Self::Typing(_) => "chat:typing",
            Self::StopTyping(_) => "chat:stopTyping",
        }
    }

    /// Split into the receiver identity and the event to deliver there.
    pub fn into_delivery(self, from: &str) -> (String, ServerEvent) {
        let from = from.to_string();
        match self {
            Self::Request(p) => (
                p.to,
                ServerEvent::Request(IncomingRequest {
                    from,
                    request_id: p.request_id,
                    sender_name: p.sender_name,
                }),
            ),
            Self::Accept(p) => (
                p.to,
                ServerEvent::Accepted(IncomingReply {
                    from,
                    request_id: p.request_id,
                }),
            ),
            Self::Reject(p) => (
                p.to,
                ServerEvent::Rejected(IncomingReply {
                    from,
                    request_id: p.request_id,
                }),
            ),
            Self::RequestTimeout(p) => (
                p.to,
                ServerEvent::RequestExpired(IncomingReply {
                    from,
                    request_id: p.request_id,
                }),
            ),
            Self::Typing(p) => (p.to, ServerEvent::UserTyping(IncomingTyping { from })),
            Self::StopTyping(p) => (
                p.to,
                ServerEvent::UserStoppedTyping(IncomingTyping { from }),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingRequest {
    pub from: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingReply {
    pub from: String,
    pub request_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingTyping {
    pub from: String,
}

/// Frames the server pushes to a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "chat:request")]
    Request(IncomingRequest),
    #[serde(rename = "chat:accepted")]
    Accepted(IncomingReply),
    #[serde(rename = "chat:rejected")]
    Rejected(IncomingReply),
    #[serde(rename = "chat:requestExpired")]
    RequestExpired(IncomingReply),
    #[serde(rename = "chat:userTyping")]
    UserTyping(IncomingTyping),
    #[serde(rename = "chat:userStoppedTyping")]
    UserStoppedTyping(IncomingTyping),
    /// Full, sorted list of online identities.
    #[serde(rename = "getOnlineUsers")]
    OnlineUsers(Vec<String>),
}

impl ServerEvent {
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
