//! obs-websocket v5 message shapes and helpers.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use sha2::{Digest as _, Sha256};

use crate::foundation::error::{AlignError, AlignResult};

/// RPC version negotiated during `Identify`.
pub const RPC_VERSION: u32 = 1;

/// Request status code reported for a missing scene, input, or scene item.
pub const STATUS_RESOURCE_NOT_FOUND: u32 = 600;

/// Message opcodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    /// Server greeting with optional auth challenge.
    Hello = 0,
    /// Client identification.
    Identify = 1,
    /// Server acknowledgement of `Identify`.
    Identified = 2,
    /// Unsolicited server event.
    Event = 5,
    /// Client request.
    Request = 6,
    /// Server response to a request.
    RequestResponse = 7,
}

/// Any message as it arrives on the socket, before the payload is typed.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct RawMessage {
    /// Opcode.
    pub op: u8,
    /// Opcode-specific payload.
    pub d: serde_json::Value,
}

impl RawMessage {
    /// Parse a text frame.
    pub fn parse(text: &str) -> AlignResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Wrap a typed payload.
    pub fn new(op: OpCode, d: impl serde::Serialize) -> AlignResult<Self> {
        Ok(Self {
            op: op as u8,
            d: serde_json::to_value(d)?,
        })
    }

    /// Decode the payload, checking the opcode first.
    pub fn payload<T: serde::de::DeserializeOwned>(self, expected: OpCode) -> AlignResult<T> {
        if self.op != expected as u8 {
            return Err(AlignError::protocol(format!(
                "expected op {} ({expected:?}), got op {}",
                expected as u8, self.op
            )));
        }
        Ok(serde_json::from_value(self.d)?)
    }

    /// Serialize to a text frame body.
    pub fn to_json(&self) -> AlignResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Authentication challenge carried by `Hello`.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct AuthChallenge {
    /// Per-connection challenge.
    pub challenge: String,
    /// Per-password salt.
    pub salt: String,
}

/// `Hello` payload.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hello {
    /// Server plugin version.
    #[serde(default)]
    pub obs_web_socket_version: String,
    /// Highest RPC version the server speaks.
    pub rpc_version: u32,
    /// Present when the server requires a password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<AuthChallenge>,
}

/// `Identify` payload.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identify {
    /// Requested RPC version.
    pub rpc_version: u32,
    /// Response to the auth challenge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<String>,
    /// Event categories to receive; zero subscribes to none.
    pub event_subscriptions: u32,
}

/// `Identified` payload.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identified {
    /// RPC version both sides will use.
    pub negotiated_rpc_version: u32,
}

/// `Request` payload.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Request name, e.g. `GetVideoInfo`.
    pub request_type: String,
    /// Client-chosen id echoed in the response.
    pub request_id: String,
    /// Request arguments.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub request_data: serde_json::Value,
}

/// Outcome block of a `RequestResponse`.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct RequestStatus {
    /// Whether the request succeeded.
    pub result: bool,
    /// Status code.
    pub code: u32,
    /// Human-readable reason on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// `RequestResponse` payload.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestResponse {
    /// Echoed request name.
    pub request_type: String,
    /// Echoed request id.
    pub request_id: String,
    /// Outcome.
    pub request_status: RequestStatus,
    /// Response body, absent for requests without output.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub response_data: serde_json::Value,
}

impl RequestResponse {
    /// Turn a failed status into the matching error, or hand back the response data.
    pub fn into_result(self) -> AlignResult<serde_json::Value> {
        let status = self.request_status;
        if status.result {
            return Ok(self.response_data);
        }
        let comment = status.comment.unwrap_or_default();
        let msg = format!(
            "{} failed with code {}: {comment}",
            self.request_type, status.code
        );
        if status.code == STATUS_RESOURCE_NOT_FOUND {
            Err(AlignError::not_found(msg))
        } else {
            Err(AlignError::backend(msg))
        }
    }
}

/// Answer to an auth challenge:
/// `base64(sha256(base64(sha256(password + salt)) + challenge))`.
pub fn auth_response(password: &str, salt: &str, challenge: &str) -> String {
    let secret = STANDARD.encode(Sha256::digest(format!("{password}{salt}").as_bytes()));
    STANDARD.encode(Sha256::digest(format!("{secret}{challenge}").as_bytes()))
}

/// Decode screenshot data, accepting either a `data:` URL or bare base64.
pub fn decode_image_data(data: &str) -> AlignResult<Vec<u8>> {
    let payload = if data.starts_with("data:") {
        data.split_once(',')
            .map(|(_, b64)| b64)
            .ok_or_else(|| AlignError::capture("malformed data URL in screenshot response"))?
    } else {
        data
    };
    if payload.is_empty() {
        return Err(AlignError::capture("screenshot response carried no image data"));
    }
    STANDARD
        .decode(payload.trim())
        .map_err(|e| AlignError::capture(format!("screenshot data is not valid base64: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/backend/protocol.rs"]
mod tests;
