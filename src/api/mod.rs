//! Client for the portfolio backend's HTTP API.
//!
//! Every call is a single attempt. Transport errors, non-2xx statuses and
//! bodies that report a logical failure all collapse into [`ApiError`].

mod client;
mod error;
mod types;

pub use client::PortfolioClient;
pub use error::ApiError;
pub use types::ContactRequest;

use futures::future::BoxFuture;
use url::Url;

use crate::portfolio::Project;

/// Project persistence operations the list controller depends on.
pub trait ProjectsApi: Send + Sync + 'static {
  fn list_projects(&self) -> BoxFuture<'static, Result<Vec<Project>, ApiError>>;

  fn create_project(&self, project: Project) -> BoxFuture<'static, Result<(), ApiError>>;

  fn update_project(&self, project: Project) -> BoxFuture<'static, Result<(), ApiError>>;

  fn delete_project(&self, id: u64) -> BoxFuture<'static, Result<(), ApiError>>;
}

/// Transports able to deliver a logout while the session is shutting down.
pub trait TeardownTransport: Send + Sync + 'static {
  /// Queue a beacon-style POST. Returns false when the transport is unavailable.
  fn send_beacon(&self, url: &Url) -> BoxFuture<'static, bool>;

  /// Plain credentialed request, used when no beacon could be queued.
  fn send_keepalive(&self, url: &Url) -> BoxFuture<'static, Result<(), ApiError>>;
}
