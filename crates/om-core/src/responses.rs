//! Response envelope returned for every request.
//!
//! Every outcome, success or failure, is rendered as `{ "data": ..., "message": ... }`
//! next to a status code. Failures always carry `data: null`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MESSAGE_SUCCESS: &str = "success";
pub const MESSAGE_LOGIN_SUCCESS: &str = "login success";
pub const MESSAGE_PERMISSION_DENIED: &str = "Permission denied";

/// Outcome class of a request, with its HTTP-style code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Ok,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    InternalError,
}

impl Status {
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::InternalError => 500,
        }
    }

    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Ok)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::BadRequest => "bad_request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.as_str())
    }
}

/// The `{data, message}` body.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Envelope<T> {
    pub data: Option<T>,
    pub message: String,
}

impl<T> Envelope<T> {
    /// Successful result carrying data.
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            message: MESSAGE_SUCCESS.to_string(),
        }
    }

    /// Result without data (mutations, failures).
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            data: None,
            message: message.into(),
        }
    }
}

/// Status plus envelope, as produced by the request boundary.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Response<T> {
    pub status: Status,
    #[serde(flatten)]
    pub body: Envelope<T>,
}

impl<T> Response<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: Status::Ok,
            body: Envelope::success(data),
        }
    }

    pub fn ok_with_message(data: Option<T>, message: impl Into<String>) -> Self {
        Self {
            status: Status::Ok,
            body: Envelope {
                data,
                message: message.into(),
            },
        }
    }

    pub fn failure(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            body: Envelope::message(message),
        }
    }

    /// Convert the payload type, e.g. into `serde_json::Value` for the wire.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Response<U> {
        Response {
            status: self.status,
            body: Envelope {
                data: self.body.data.map(f),
                message: self.body.message,
            },
        }
    }
}
