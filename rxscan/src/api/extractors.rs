use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;

use crate::error::RxError;

/// `axum::Json` whose rejections are reported in the v1 error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(RxError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for RxError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => {
                let message = err.body_text();
                match missing_field(&message) {
                    Some(field) => RxError::Validation(format!("Missing required field: {field}")),
                    None => RxError::Validation(format!("Invalid JSON: {message}")),
                }
            }
            JsonRejection::JsonSyntaxError(err) => {
                RxError::Validation(format!("JSON syntax error: {}", err.body_text()))
            }
            JsonRejection::MissingJsonContentType(_) => RxError::Validation(
                "Missing `Content-Type: application/json` header".to_string(),
            ),
            JsonRejection::BytesRejection(_) => {
                RxError::Validation("Failed to read request body".to_string())
            }
            other => RxError::Validation(other.body_text()),
        }
    }
}

fn missing_field(message: &str) -> Option<&str> {
    let prefix = "missing field `";
    let start = message.find(prefix)? + prefix.len();
    let remaining = message.get(start..)?;
    let end = remaining.find('`')?;
    remaining.get(..end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_extracted() {
        assert_eq!(
            missing_field("Failed to deserialize: missing field `text` at line 1 column 2"),
            Some("text")
        );
        assert_eq!(missing_field("expected a string"), None);
    }
}
