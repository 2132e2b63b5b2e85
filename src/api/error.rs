use reqwest::StatusCode;

use super::types::ApiEnvelope;

/// Where a failed call broke down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
  /// No response was received (connect, DNS, TLS, timeout)
  Transport,
  /// Non-2xx status
  Status,
  /// 2xx response whose body reports a failure, or a body we could not decode
  Application,
}

/// The single failure shape surfaced by the API client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
  pub kind: ApiErrorKind,
  pub status: Option<u16>,
  pub message: String,
}

impl ApiError {
  pub fn transport(err: &reqwest::Error) -> Self {
    Self {
      kind: ApiErrorKind::Transport,
      status: None,
      message: format!("network error: {}", err),
    }
  }

  pub fn application(message: impl Into<String>) -> Self {
    Self {
      kind: ApiErrorKind::Application,
      status: None,
      message: message.into(),
    }
  }

  /// Build the error for a non-2xx response.
  pub fn from_status(status: StatusCode, body: Option<&ApiEnvelope>) -> Self {
    let message = body
      .and_then(ApiEnvelope::message)
      .unwrap_or_else(|| format!("server error {}", status.as_u16()));

    Self {
      kind: ApiErrorKind::Status,
      status: Some(status.as_u16()),
      message,
    }
  }
}

impl ApiEnvelope {
  /// Whether a 2xx body reports a logical failure.
  ///
  /// `success: false` always does; an `error`/`errors` field does unless the
  /// body also says `success: true`.
  pub fn signals_failure(&self) -> bool {
    match self.success {
      Some(success) => !success,
      None => self.error.is_some() || self.errors.as_ref().is_some_and(|e| !e.is_empty()),
    }
  }

  /// The application supplied message: `error`, else `errors` joined.
  pub fn message(&self) -> Option<String> {
    if let Some(error) = self.error.as_ref().filter(|e| !e.is_empty()) {
      return Some(error.clone());
    }
    self
      .errors
      .as_ref()
      .filter(|errors| !errors.is_empty())
      .map(|errors| errors.join(", "))
  }

  /// Convert a logically failed 2xx body into an error.
  pub fn into_error(self, fallback: &str) -> ApiError {
    ApiError::application(self.message().unwrap_or_else(|| fallback.to_string()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn envelope(json: &str) -> ApiEnvelope {
    serde_json::from_str(json).unwrap()
  }

  #[test]
  fn test_status_error_prefers_error_field() {
    let body = envelope(r#"{"error": "Unauthorized", "errors": ["a", "b"]}"#);
    let err = ApiError::from_status(StatusCode::UNAUTHORIZED, Some(&body));
    assert_eq!(err.message, "Unauthorized");
    assert_eq!(err.kind, ApiErrorKind::Status);
    assert_eq!(err.status, Some(401));
  }

  #[test]
  fn test_status_error_joins_errors_list() {
    let body = envelope(r#"{"errors": ["Title is required", "Description is required"]}"#);
    let err = ApiError::from_status(StatusCode::BAD_REQUEST, Some(&body));
    assert_eq!(err.message, "Title is required, Description is required");
  }

  #[test]
  fn test_status_error_generic_message() {
    let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, None);
    assert_eq!(err.message, "server error 500");

    let empty = envelope(r#"{"errors": []}"#);
    let err = ApiError::from_status(StatusCode::BAD_GATEWAY, Some(&empty));
    assert_eq!(err.message, "server error 502");
  }

  #[test]
  fn test_signals_failure() {
    assert!(envelope(r#"{"success": false}"#).signals_failure());
    assert!(envelope(r#"{"error": "boom"}"#).signals_failure());
    assert!(!envelope(r#"{"success": true, "error": "ignored"}"#).signals_failure());
    assert!(!envelope(r#"{"data": []}"#).signals_failure());
    assert!(!envelope(r#"{"errors": []}"#).signals_failure());
  }

  #[test]
  fn test_into_error_uses_fallback() {
    let err = envelope(r#"{"success": false}"#).into_error("Login failed. Please try again.");
    assert_eq!(err.message, "Login failed. Please try again.");
    assert_eq!(err.kind, ApiErrorKind::Application);
  }
}
