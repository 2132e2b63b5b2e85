//! One-shot commands against the public side of the site.

use color_eyre::{eyre::eyre, Result};
use std::sync::Arc;

use crate::api::PortfolioClient;
use crate::cache::{NoopStorage, SnapshotCache, PROJECTS_SNAPSHOT_KEY};
use crate::portfolio::filter::categories;
use crate::portfolio::forms::is_valid_email;
use crate::portfolio::{
  default_projects, CategoryFilter, ContactForm, LoadState, ProjectFilter, ProjectsController,
  RefreshFailurePolicy,
};
use crate::render::Renderer;

/// Print the public project listing.
///
/// Unlike the dashboard, a failed fetch falls back to the built-in projects.
pub async fn list_projects(
  client: PortfolioClient,
  view: &Renderer,
  category: Option<&str>,
  show_all: bool,
  categories_only: bool,
) -> Result<()> {
  let mut projects = ProjectsController::new(
    Arc::new(client),
    SnapshotCache::new(NoopStorage, PROJECTS_SNAPSHOT_KEY),
    RefreshFailurePolicy::Fallback(default_projects()),
  );
  projects.initialize();
  projects.settle().await;

  if let LoadState::LoadFailed(e) = projects.state() {
    view.warn(&format!("Could not load projects ({}); showing defaults.", e));
  }

  if categories_only {
    view.categories(&categories(projects.projects()));
    return Ok(());
  }

  let filter = ProjectFilter {
    active: category.map(CategoryFilter::parse).unwrap_or_default(),
    show_all,
  };
  view.projects(filter.apply(projects.projects()), projects.state());
  Ok(())
}

pub async fn send_contact(client: &PortfolioClient, view: &Renderer, form: ContactForm) -> Result<()> {
  let errors = form.validate();
  if !errors.is_empty() {
    for e in &errors {
      view.error(e);
    }
    return Err(eyre!("Contact form is invalid"));
  }

  client
    .submit_contact(&form.to_request())
    .await
    .map_err(|e| eyre!("{}", e))?;

  tracing::info!("contact message sent");
  view.info("Thank you! Your message has been sent.");
  Ok(())
}

pub async fn subscribe(client: &PortfolioClient, view: &Renderer, email: &str) -> Result<()> {
  let email = email.trim();
  if !is_valid_email(email) {
    return Err(eyre!("Please enter a valid email address"));
  }

  client
    .subscribe_newsletter(email)
    .await
    .map_err(|e| eyre!("{}", e))?;

  view.info("Subscribed.");
  Ok(())
}

/// Print a content resource (skills, testimonials) as JSON.
pub async fn show_resource(client: &PortfolioClient, name: &str) -> Result<()> {
  let value = client.get_resource(name).await.map_err(|e| eyre!("{}", e))?;
  let pretty = serde_json::to_string_pretty(&value)?;
  println!("{}", pretty);
  Ok(())
}
