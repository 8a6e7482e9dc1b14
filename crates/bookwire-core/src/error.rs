use thiserror::Error;

use crate::http_client::HttpError;

/// Closed set of error codes the booking platform embeds in its JSON error
/// envelope, plus the codes this adapter synthesizes itself.
///
/// The upstream identifies errors by name strings; anything outside the known
/// set (including the numeric codes some endpoints emit) collapses to
/// [`ErrorCode::Unknown`]. The raw code is preserved separately on
/// [`CallError::Api`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The account is already authorized.
    UserLogged,
    /// Credentials were not supplied.
    UserAuthorisationError,
    /// The phone number is malformed.
    NumberNotTrue,
    /// Wrong login or password.
    UserAuthorisationDataError,
    /// The upstream answered with no usable body.
    EmptyResponse,
    Unknown,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserLogged => "USER_LOGGED",
            Self::UserAuthorisationError => "USER_AUTHORISATION_ERROR",
            Self::NumberNotTrue => "NUMBER_NOT_TRUE",
            Self::UserAuthorisationDataError => "USER_AUTHORISATION_DATA_ERROR",
            Self::EmptyResponse => "EMPTY_RESPONSE",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Canonical human-readable message for the code.
    pub const fn canonical_message(self) -> &'static str {
        match self {
            Self::UserLogged => "User is already authorized",
            Self::UserAuthorisationError => "You must enter username and password to login",
            Self::NumberNotTrue => "Probably you entered an incorrect number",
            Self::UserAuthorisationDataError => "Wrong login or password",
            Self::EmptyResponse => "Unexpected empty response",
            Self::Unknown => "Unknown upstream error",
        }
    }

    /// HTTP status the boundary layer should answer with for this code.
    pub const fn http_status(self) -> u16 {
        match self {
            Self::UserLogged => 409,
            Self::UserAuthorisationError | Self::NumberNotTrue => 400,
            Self::UserAuthorisationDataError => 401,
            Self::EmptyResponse => 502,
            Self::Unknown => 500,
        }
    }

    /// Maps a raw upstream code to the closed set. Unrecognized names and
    /// numeric codes fall back to [`ErrorCode::Unknown`].
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "USER_LOGGED" => Self::UserLogged,
            "USER_AUTHORISATION_ERROR" => Self::UserAuthorisationError,
            "NUMBER_NOT_TRUE" => Self::NumberNotTrue,
            "USER_AUTHORISATION_DATA_ERROR" => Self::UserAuthorisationDataError,
            "EMPTY_RESPONSE" => Self::EmptyResponse,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable failure taxonomy for every outbound call, regardless of whether the
/// upstream failed at the transport layer, the HTTP layer, or inside its own
/// JSON error envelope.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CallError {
    /// The upstream's structured error envelope reported a failure. `raw`
    /// preserves the code exactly as the upstream sent it.
    #[error("upstream error {raw}: {message}")]
    Api {
        code: ErrorCode,
        raw: String,
        message: String,
    },

    /// HTTP error status without a decodable structured error body.
    #[error("upstream returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The shared admission gate rejected the call.
    #[error("too many requests to the upstream")]
    RateLimited,

    /// Transport-level failure: DNS, connect, reset, timeout.
    #[error("transport failure: {message}")]
    Network { message: String },

    /// The success payload did not match the expected shape.
    #[error("failed to decode upstream payload: {message}")]
    DataParse { message: String },

    /// Catch-all for faults the pipeline could not attribute.
    #[error("unexpected failure: {message}")]
    Unexpected { message: String },
}

impl CallError {
    pub fn api(code: ErrorCode, raw: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            code,
            raw: raw.into(),
            message: message.into(),
        }
    }

    pub fn empty_response(message: impl Into<String>) -> Self {
        Self::api(ErrorCode::EmptyResponse, "EMPTY_RESPONSE", message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::api(ErrorCode::Unknown, "UNKNOWN", message)
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn data_parse(message: impl Into<String>) -> Self {
        Self::DataParse {
            message: message.into(),
        }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    /// Wire-facing code string. Upstream envelope failures keep the raw code
    /// exactly as received; HTTP faults carry the numeric status.
    pub fn code_str(&self) -> String {
        match self {
            Self::Api { raw, .. } => raw.clone(),
            Self::Http { status, .. } => status.to_string(),
            Self::RateLimited => String::from("RATE_LIMITED"),
            Self::Network { .. } => String::from("NETWORK"),
            Self::DataParse { .. } => String::from("DATA_PARSE_ERROR"),
            Self::Unexpected { .. } => String::from("UNEXPECTED_ERROR"),
        }
    }

    /// HTTP status the boundary layer should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Api { code, .. } => code.http_status(),
            Self::Http { status, .. } => *status,
            Self::RateLimited => 429,
            Self::Network { .. } => 502,
            Self::DataParse { .. } => 502,
            Self::Unexpected { .. } => 500,
        }
    }
}

impl From<HttpError> for CallError {
    fn from(error: HttpError) -> Self {
        Self::network(error.message())
    }
}
