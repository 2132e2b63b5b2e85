//! Serde types matching the backend's request and response bodies.

use serde::{Deserialize, Serialize};

use crate::portfolio::Project;

/// Optional status/error fields any response body may carry.
#[derive(Debug, Default, Deserialize)]
pub struct ApiEnvelope {
  pub success: Option<bool>,
  pub error: Option<String>,
  pub errors: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ProjectList {
  #[serde(default)]
  pub data: Option<Vec<Project>>,
}

#[derive(Debug, Deserialize)]
pub struct AuthStatus {
  #[serde(default)]
  pub authenticated: bool,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
  pub username: &'a str,
  pub password: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactRequest {
  pub name: String,
  pub email: String,
  pub subject: String,
  pub message: String,
}

#[derive(Debug, Serialize)]
pub struct NewsletterRequest<'a> {
  pub email: &'a str,
}
