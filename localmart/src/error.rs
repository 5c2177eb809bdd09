use crate::transport::{HttpResponse, TransportError};
use serde::Deserialize;
use serde_json::Value;

pub const FALLBACK_MESSAGE: &str = "An unexpected error occurred";
pub const INVALID_REQUEST_MESSAGE: &str = "Invalid request";
pub const AUTHENTICATION_REQUIRED_MESSAGE: &str = "Authentication required";
pub const PERMISSION_DENIED_MESSAGE: &str = "You do not have permission to perform this action";
pub const NOT_FOUND_MESSAGE: &str = "The requested resource was not found";
pub const VALIDATION_ERROR_MESSAGE: &str = "Validation error";
pub const SERVER_ERROR_MESSAGE: &str = "Server error, please try again later";
pub const NO_RESPONSE_MESSAGE: &str =
    "No response from server. Please check your internet connection.";
pub const SETUP_FALLBACK_MESSAGE: &str = "Error setting up the request";

pub const NETWORK_ERROR_CODE: &str = "NETWORK_ERROR";
pub const DECODE_ERROR_CODE: &str = "DECODE_ERROR";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestErrorKind {
    /// The server answered with a non-2xx status
    Server,
    /// The request was sent but nothing came back
    Network,
    /// The request never left the client
    Setup,
    /// A 2xx body did not match the expected shape
    Decode,
}

/// The single error shape every API call fails with
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct RequestError {
    pub kind: RequestErrorKind,
    pub message: String,
    pub code: Option<String>,
    pub details: Option<Value>,
    pub status: Option<u16>,
}

impl RequestError {
    /// Classify a non-2xx response
    pub fn from_response(response: &HttpResponse) -> Self {
        let mut error = Self {
            kind: RequestErrorKind::Server,
            message: FALLBACK_MESSAGE.to_string(),
            code: None,
            details: None,
            status: Some(response.status),
        };

        match ErrorBody::parse(&response.body) {
            Some(ErrorBody::Envelope { error: envelope }) => {
                if let Some(message) = envelope.message.filter(|m| !m.is_empty()) {
                    error.message = message;
                }
                error.code = envelope.code;
                error.details = envelope.details;
            }
            Some(ErrorBody::Detail { detail: Value::String(detail) }) => {
                if !detail.is_empty() {
                    error.message = detail;
                }
            }
            Some(ErrorBody::Detail { detail }) => {
                // FastAPI validation errors arrive as a list
                error.details = Some(detail);
            }
            Some(ErrorBody::Text(text)) if !text.trim().is_empty() => {
                error.message = text;
            }
            _ => {}
        }

        match response.status {
            400 if error.message.is_empty() => {
                error.message = INVALID_REQUEST_MESSAGE.to_string()
            }
            401 => error.message = AUTHENTICATION_REQUIRED_MESSAGE.to_string(),
            403 => error.message = PERMISSION_DENIED_MESSAGE.to_string(),
            404 => error.message = NOT_FOUND_MESSAGE.to_string(),
            422 => error.message = VALIDATION_ERROR_MESSAGE.to_string(),
            500 => error.message = SERVER_ERROR_MESSAGE.to_string(),
            _ => {}
        }

        error
    }

    pub fn network() -> Self {
        Self {
            kind: RequestErrorKind::Network,
            message: NO_RESPONSE_MESSAGE.to_string(),
            code: Some(NETWORK_ERROR_CODE.to_string()),
            details: None,
            status: None,
        }
    }

    pub fn setup(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: RequestErrorKind::Setup,
            message: if message.is_empty() {
                SETUP_FALLBACK_MESSAGE.to_string()
            } else {
                message
            },
            code: None,
            details: None,
            status: None,
        }
    }

    pub fn decode(err: serde_json::Error) -> Self {
        Self {
            kind: RequestErrorKind::Decode,
            message: format!("Unexpected response body: {err}"),
            code: Some(DECODE_ERROR_CODE.to_string()),
            details: None,
            status: None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }
}

impl From<TransportError> for RequestError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::NoResponse(_) => RequestError::network(),
            TransportError::Setup(message) => RequestError::setup(message),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    details: Option<Value>,
}

/// The error body shapes the API is known to produce
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Envelope { error: ErrorEnvelope },
    Detail { detail: Value },
    Text(String),
}

impl ErrorBody {
    fn parse(body: &[u8]) -> Option<Self> {
        if body.is_empty() {
            return None;
        }

        match serde_json::from_slice::<ErrorBody>(body) {
            Ok(parsed) => Some(parsed),
            // valid JSON of some other shape carries no message
            Err(_) if serde_json::from_slice::<Value>(body).is_ok() => None,
            Err(_) => std::str::from_utf8(body)
                .ok()
                .map(|text| ErrorBody::Text(text.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn error_for(status: u16, body: &str) -> RequestError {
        RequestError::from_response(&HttpResponse::new(status, body.to_string()))
    }

    #[test]
    fn test_detail_not_found_is_overridden() {
        let error = error_for(404, r#"{"detail": "Not found"}"#);

        assert_eq!(error.kind, RequestErrorKind::Server);
        assert_eq!(error.message, NOT_FOUND_MESSAGE);
        assert_eq!(error.status, Some(404));
        assert_eq!(error.code, None);
        assert!(error.is_not_found());
    }

    #[test]
    fn test_envelope_message_code_and_details() {
        let error = error_for(
            409,
            r#"{"error": {"message": "Out of stock", "code": "STOCK", "details": {"product_id": 4}}}"#,
        );

        assert_eq!(error.message, "Out of stock");
        assert_eq!(error.code.as_deref(), Some("STOCK"));
        assert_eq!(error.details, Some(json!({"product_id": 4})));
        assert_eq!(error.status, Some(409));
    }

    #[test]
    fn test_envelope_wins_over_detail() {
        let error = error_for(
            400,
            r#"{"error": {"message": "from envelope"}, "detail": "from detail"}"#,
        );
        assert_eq!(error.message, "from envelope");
    }

    #[test]
    fn test_detail_string_message() {
        let error = error_for(400, r#"{"detail": "Not enough stock for Bread"}"#);
        assert_eq!(error.message, "Not enough stock for Bread");
    }

    #[test]
    fn test_empty_detail_uses_fallback() {
        let error = error_for(409, r#"{"detail": ""}"#);
        assert_eq!(error.message, FALLBACK_MESSAGE);
        assert_eq!(error.details, None);
    }

    #[test]
    fn test_detail_list_goes_to_details() {
        let error = error_for(
            409,
            r#"{"detail": [{"loc": ["body", "quantity"], "msg": "must be > 0"}]}"#,
        );

        assert_eq!(error.message, FALLBACK_MESSAGE);
        assert!(error.details.unwrap().is_array());
    }

    #[test]
    fn test_raw_text_body() {
        let error = error_for(502, "Bad Gateway");
        assert_eq!(error.message, "Bad Gateway");
        assert_eq!(error.status, Some(502));
    }

    #[test]
    fn test_json_string_body() {
        let error = error_for(418, r#""short and stout""#);
        assert_eq!(error.message, "short and stout");
    }

    #[test]
    fn test_unrecognised_body_uses_fallback() {
        assert_eq!(error_for(418, r#"{"oops": true}"#).message, FALLBACK_MESSAGE);
        assert_eq!(error_for(418, "").message, FALLBACK_MESSAGE);
        assert_eq!(error_for(400, "").message, FALLBACK_MESSAGE);
    }

    #[test]
    fn test_status_overrides() {
        let body = r#"{"detail": "server said"}"#;

        assert_eq!(error_for(401, body).message, AUTHENTICATION_REQUIRED_MESSAGE);
        assert_eq!(error_for(403, body).message, PERMISSION_DENIED_MESSAGE);
        assert_eq!(error_for(422, body).message, VALIDATION_ERROR_MESSAGE);
        assert_eq!(error_for(500, body).message, SERVER_ERROR_MESSAGE);
        assert_eq!(error_for(400, body).message, "server said");
        assert_eq!(error_for(409, body).message, "server said");
        assert!(error_for(401, body).is_unauthorized());
    }

    #[test]
    fn test_override_keeps_code_and_details() {
        let error = error_for(
            422,
            r#"{"error": {"message": "bad", "code": "INVALID", "details": ["name"]}}"#,
        );

        assert_eq!(error.message, VALIDATION_ERROR_MESSAGE);
        assert_eq!(error.code.as_deref(), Some("INVALID"));
        assert_eq!(error.details, Some(json!(["name"])));
    }

    #[test]
    fn test_no_response_is_network_error() {
        let error: RequestError = TransportError::NoResponse("timed out".into()).into();

        assert_eq!(error.kind, RequestErrorKind::Network);
        assert_eq!(error.message, NO_RESPONSE_MESSAGE);
        assert_eq!(error.code.as_deref(), Some(NETWORK_ERROR_CODE));
        assert_eq!(error.status, None);
    }

    #[test]
    fn test_setup_error_keeps_underlying_message() {
        let error: RequestError = TransportError::Setup("relative URL without a base".into()).into();

        assert_eq!(error.kind, RequestErrorKind::Setup);
        assert_eq!(error.message, "relative URL without a base");
        assert_eq!(error.status, None);

        let empty: RequestError = TransportError::Setup(String::new()).into();
        assert_eq!(empty.message, SETUP_FALLBACK_MESSAGE);
    }

    #[test]
    fn test_display_is_message() {
        let error = error_for(404, "");
        assert_eq!(error.to_string(), NOT_FOUND_MESSAGE);
    }
}
