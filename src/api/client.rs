use color_eyre::{eyre::eyre, Result};
use futures::future::{BoxFuture, FutureExt};
use reqwest::header::CONTENT_TYPE;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::{ApiConfig, EndpointsConfig, TeardownConfig};
use crate::portfolio::Project;

use super::error::ApiError;
use super::types::{
  ApiEnvelope, AuthStatus, ContactRequest, LoginRequest, NewsletterRequest, ProjectList,
};
use super::{ProjectsApi, TeardownTransport};

const LOGIN_FAILED: &str = "Login failed. Please try again.";
const CONTACT_FAILED: &str = "Failed to send message. Please try again.";
const NEWSLETTER_FAILED: &str = "Subscription failed. Please try again.";
const REQUEST_FAILED: &str = "Request failed";

/// HTTP client for the portfolio backend.
///
/// Clones share one connection pool and one cookie store, so the session
/// cookie set by `login` rides along on every later call.
#[derive(Clone)]
pub struct PortfolioClient {
  http: reqwest::Client,
  base: Url,
  endpoints: EndpointsConfig,
  beacon: bool,
}

impl PortfolioClient {
  pub fn new(api: &ApiConfig, teardown: &TeardownConfig) -> Result<Self> {
    // Url::join replaces the last segment unless the base ends with '/'
    let mut base_url = api.base_url.trim().to_string();
    if !base_url.ends_with('/') {
      base_url.push('/');
    }
    let base = Url::parse(&base_url)
      .map_err(|e| eyre!("Invalid API base URL {}: {}", api.base_url, e))?;

    let http = reqwest::Client::builder()
      .cookie_store(true)
      .timeout(api.timeout())
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base,
      endpoints: api.endpoints.clone(),
      beacon: teardown.beacon,
    })
  }

  pub fn base_url(&self) -> &Url {
    &self.base
  }

  fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, ApiError> {
    let mut url = self
      .base
      .join(path)
      .map_err(|e| ApiError::application(format!("invalid endpoint {}: {}", path, e)))?;
    if !query.is_empty() {
      url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url)
  }

  pub fn logout_url(&self) -> Result<Url, ApiError> {
    self.endpoint(&self.endpoints.auth, &[("action", "logout")])
  }

  /// Send a request and return the body of a 2xx response.
  async fn execute(request: RequestBuilder) -> Result<String, ApiError> {
    let response = request.send().await.map_err(|e| ApiError::transport(&e))?;
    let status = response.status();
    let body = response.text().await.map_err(|e| ApiError::transport(&e))?;

    if !status.is_success() {
      let envelope = serde_json::from_str::<ApiEnvelope>(&body).ok();
      return Err(ApiError::from_status(status, envelope.as_ref()));
    }

    Ok(body)
  }

  /// Decode a 2xx body, rejecting bodies that report a logical failure.
  fn decode<T: DeserializeOwned>(body: &str, fallback: &str) -> Result<T, ApiError> {
    if let Ok(envelope) = serde_json::from_str::<ApiEnvelope>(body) {
      if envelope.signals_failure() {
        return Err(envelope.into_error(fallback));
      }
    }
    serde_json::from_str(body).map_err(|e| ApiError::application(format!("invalid response: {}", e)))
  }

  /// Check a 2xx body of a call whose payload we don't need.
  ///
  /// Empty and non-JSON bodies count as success.
  fn check(body: &str, fallback: &str) -> Result<(), ApiError> {
    match serde_json::from_str::<ApiEnvelope>(body) {
      Ok(envelope) if envelope.signals_failure() => Err(envelope.into_error(fallback)),
      _ => Ok(()),
    }
  }

  /// Check a 2xx body that must say `success: true`.
  fn require_success(body: &str, fallback: &str) -> Result<(), ApiError> {
    let envelope: ApiEnvelope = serde_json::from_str(body).unwrap_or_default();
    if envelope.success == Some(true) {
      Ok(())
    } else {
      Err(envelope.into_error(fallback))
    }
  }

  pub async fn fetch_projects(&self) -> Result<Vec<Project>, ApiError> {
    let url = self.endpoint(&self.endpoints.projects, &[])?;
    let body = Self::execute(self.http.get(url)).await?;
    let list: ProjectList = Self::decode(&body, REQUEST_FAILED)?;
    Ok(list.data.unwrap_or_default())
  }

  pub async fn post_project(&self, project: &Project) -> Result<(), ApiError> {
    let url = self.endpoint(&self.endpoints.projects, &[])?;
    let body = Self::execute(self.http.post(url).json(project)).await?;
    Self::check(&body, REQUEST_FAILED)
  }

  pub async fn put_project(&self, project: &Project) -> Result<(), ApiError> {
    if project.id.is_none() {
      return Err(ApiError::application("Project id is required for update"));
    }
    let url = self.endpoint(&self.endpoints.projects, &[])?;
    let body = Self::execute(self.http.put(url).json(project)).await?;
    Self::check(&body, REQUEST_FAILED)
  }

  pub async fn remove_project(&self, id: u64) -> Result<(), ApiError> {
    let id = id.to_string();
    let url = self.endpoint(&self.endpoints.projects, &[("id", &id)])?;
    let body = Self::execute(self.http.delete(url)).await?;
    Self::check(&body, REQUEST_FAILED)
  }

  pub async fn check_session(&self) -> Result<bool, ApiError> {
    let url = self.endpoint(&self.endpoints.auth, &[("action", "check")])?;
    let body = Self::execute(self.http.get(url)).await?;
    let status: AuthStatus = Self::decode(&body, REQUEST_FAILED)?;
    Ok(status.authenticated)
  }

  pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
    let url = self.endpoint(&self.endpoints.auth, &[("action", "login")])?;
    let request = LoginRequest { username, password };
    let body = Self::execute(self.http.post(url).json(&request)).await?;
    Self::require_success(&body, LOGIN_FAILED)
  }

  pub async fn logout(&self) -> Result<(), ApiError> {
    let url = self.logout_url()?;
    let body = Self::execute(self.http.get(url)).await?;
    Self::check(&body, REQUEST_FAILED)
  }

  pub async fn submit_contact(&self, request: &ContactRequest) -> Result<(), ApiError> {
    let url = self.endpoint(&self.endpoints.contact, &[])?;
    let body = Self::execute(self.http.post(url).json(request)).await?;
    Self::require_success(&body, CONTACT_FAILED)
  }

  pub async fn subscribe_newsletter(&self, email: &str) -> Result<(), ApiError> {
    let url = self.endpoint(&self.endpoints.newsletter, &[])?;
    let request = NewsletterRequest { email };
    let body = Self::execute(self.http.post(url).json(&request)).await?;
    Self::check(&body, NEWSLETTER_FAILED)
  }

  /// Fetch a read-only content resource such as "skills" or "testimonials".
  pub async fn get_resource(&self, name: &str) -> Result<serde_json::Value, ApiError> {
    let url = self.endpoint(&self.endpoints.resources, &[("resource", name)])?;
    let body = Self::execute(self.http.get(url)).await?;
    Self::decode(&body, REQUEST_FAILED)
  }
}

impl ProjectsApi for PortfolioClient {
  fn list_projects(&self) -> BoxFuture<'static, Result<Vec<Project>, ApiError>> {
    let client = self.clone();
    async move { client.fetch_projects().await }.boxed()
  }

  fn create_project(&self, project: Project) -> BoxFuture<'static, Result<(), ApiError>> {
    let client = self.clone();
    async move { client.post_project(&project).await }.boxed()
  }

  fn update_project(&self, project: Project) -> BoxFuture<'static, Result<(), ApiError>> {
    let client = self.clone();
    async move { client.put_project(&project).await }.boxed()
  }

  fn delete_project(&self, id: u64) -> BoxFuture<'static, Result<(), ApiError>> {
    let client = self.clone();
    async move { client.remove_project(id).await }.boxed()
  }
}

impl TeardownTransport for PortfolioClient {
  fn send_beacon(&self, url: &Url) -> BoxFuture<'static, bool> {
    if !self.beacon {
      return futures::future::ready(false).boxed();
    }
    let request = self
      .http
      .post(url.clone())
      .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
      .body(Vec::new());
    async move {
      // Delivered means queued; the status is never looked at
      request.send().await.is_ok()
    }
    .boxed()
  }

  fn send_keepalive(&self, url: &Url) -> BoxFuture<'static, Result<(), ApiError>> {
    let request = self.http.get(url.clone());
    async move { Self::execute(request).await.map(|_| ()) }.boxed()
  }
}
