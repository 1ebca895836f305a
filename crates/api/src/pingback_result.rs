//! HTTP rendering of inbound pingback outcomes.
//!
//! | Status                              | HTTP | Body                    |
//! |-------------------------------------|------|-------------------------|
//! | `Success`                           | 201  | XML-RPC success         |
//! | `Error17` / `Error32` / `Error48`   | 200  | XML-RPC fault           |
//! | `SpamDetectedFakeNotFound`          | 404  | empty                   |
//! | `InvalidPingRequest`                | 400  | empty                   |
//! | `GenericError`                      | 500  | empty                   |

use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use moonglade_core::pingback::{xmlrpc, PingbackStatus};

/// Message returned in the XML-RPC success response.
pub const SUCCESS_MESSAGE: &str = "Thanks! Pingback received.";

const XML_CONTENT_TYPE: &str = "text/xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingbackResult(pub PingbackStatus);

impl From<PingbackStatus> for PingbackResult {
    fn from(status: PingbackStatus) -> Self {
        Self(status)
    }
}

impl IntoResponse for PingbackResult {
    fn into_response(self) -> Response {
        let status = self.0;
        if let Some((code, message)) = status.fault() {
            return (
                StatusCode::OK,
                [(CONTENT_TYPE, XML_CONTENT_TYPE)],
                xmlrpc::fault_response(code, message),
            )
                .into_response();
        }

        match status {
            PingbackStatus::Success => (
                StatusCode::CREATED,
                [(CONTENT_TYPE, XML_CONTENT_TYPE)],
                xmlrpc::success_response(SUCCESS_MESSAGE),
            )
                .into_response(),
            PingbackStatus::SpamDetectedFakeNotFound => StatusCode::NOT_FOUND.into_response(),
            PingbackStatus::InvalidPingRequest => StatusCode::BAD_REQUEST.into_response(),
            _ => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}
