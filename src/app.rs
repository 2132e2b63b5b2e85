//! The admin dashboard session.

use crate::api::PortfolioClient;
use crate::cache::{SnapshotCache, SnapshotStorage, PROJECTS_SNAPSHOT_KEY};
use crate::commands::{self, Action, COMMANDS};
use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::portfolio::{
  CategoryFilter, LoginForm, ProjectFilter, ProjectsController, RefreshFailurePolicy,
};
use crate::render::Renderer;
use crate::session::{TeardownNotifier, UnloadHooks, UnloadRegistration};
use crate::state::AppStore;
use color_eyre::{eyre::eyre, Result};
use std::sync::Arc;
use std::time::Duration;

/// Main dashboard state
pub struct App {
  config: Config,

  /// Backend client, shared with the teardown notifier
  client: Arc<PortfolioClient>,

  /// Owner of the project list
  projects: ProjectsController<PortfolioClient, Box<dyn SnapshotStorage>>,

  /// Handlers run when the session goes away
  hooks: UnloadHooks,

  /// What the list shows; the dashboard starts with every project visible
  filter: ProjectFilter,

  /// Our teardown handler, present while the dashboard is up
  teardown: Option<UnloadRegistration>,

  store: AppStore,
  view: Renderer,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(
    config: Config,
    client: PortfolioClient,
    storage: Box<dyn SnapshotStorage>,
    store: AppStore,
  ) -> Self {
    let client = Arc::new(client);
    let projects = ProjectsController::new(
      client.clone(),
      SnapshotCache::new(storage, PROJECTS_SNAPSHOT_KEY),
      RefreshFailurePolicy::KeepCurrent,
    );
    let view = Renderer::new(&store);

    Self {
      config,
      client,
      projects,
      hooks: UnloadHooks::new(),
      filter: ProjectFilter {
        active: CategoryFilter::All,
        show_all: true,
      },
      teardown: None,
      store,
      view,
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    self.sign_in().await?;
    self.install_teardown()?;

    // Paint the snapshot right away; the refresh replaces it when it lands
    self.projects.initialize();
    if let Some(saved_at) = self.projects.snapshot_saved_at() {
      self.view.warn(&format!(
        "Showing cached projects from {}",
        saved_at.format("%Y-%m-%d %H:%M UTC")
      ));
    }
    self.show_list();
    self.view.info("Type 'help' for commands.");

    let mut events = EventHandler::new(Duration::from_millis(100));

    while !self.should_quit {
      match events.next().await {
        Some(event) => self.handle_event(event).await,
        None => break,
      }
    }

    Ok(())
  }

  /// Make sure the backend session is ended if we go away without a logout.
  fn install_teardown(&mut self) -> Result<()> {
    let logout_url = self
      .client
      .logout_url()
      .map_err(|e| eyre!("Invalid logout endpoint: {}", e))?;
    let notifier =
      TeardownNotifier::new(self.client.clone(), logout_url, self.config.teardown.deadline());
    self.teardown = Some(notifier.install(&self.hooks));
    Ok(())
  }

  async fn sign_in(&mut self) -> Result<()> {
    match self.client.check_session().await {
      Ok(true) => {
        tracing::info!("reusing authenticated session");
        return Ok(());
      }
      Ok(false) => {}
      Err(e) => tracing::debug!(error = %e, "session check failed, logging in"),
    }

    let form = LoginForm {
      username: self.config.admin.username.clone().unwrap_or_default(),
      password: Config::get_password()?,
    };
    let errors = form.validate();
    if !errors.is_empty() {
      return Err(eyre!(errors.join("; ")));
    }

    self
      .client
      .login(&form.username, &form.password)
      .await
      .map_err(|e| eyre!("{}", e))?;

    tracing::info!(username = %form.username, "logged in");
    self.view.info(&format!("Logged in as {}", form.username));
    Ok(())
  }

  async fn handle_event(&mut self, event: Event) {
    match event {
      Event::Line(line) => self.handle_line(&line).await,
      Event::Tick => self.poll(),
      Event::Interrupt | Event::Closed => {
        self.unload().await;
        self.should_quit = true;
      }
    }
  }

  fn poll(&mut self) {
    if !self.projects.poll() {
      return;
    }

    if let Some(notice) = self.projects.take_notice() {
      self.view.notice(&notice);
    }
    if !self.projects.is_loading() {
      self.show_list();
    }
  }

  async fn handle_line(&mut self, line: &str) {
    if line.trim().is_empty() {
      return;
    }

    if let Some(id) = self.projects.pending_delete() {
      match line.trim().to_lowercase().as_str() {
        "y" | "yes" => {
          self.projects.confirm_delete();
          self.view.info(&format!("Deleting project {}...", id));
        }
        _ => {
          self.projects.cancel_delete();
          self.view.info("Delete cancelled.");
        }
      }
      return;
    }

    match commands::parse(line) {
      Ok(action) => self.execute(action).await,
      Err(msg) => self.view.error(&msg),
    }
  }

  async fn execute(&mut self, action: Action) {
    match action {
      Action::List => self.show_list(),
      Action::Refresh => {
        if !self.projects.refresh() {
          self.view.warn("Already refreshing.");
        }
      }
      Action::Add => {
        self.projects.open_create();
        self.show_form();
      }
      Action::Edit(id) => {
        if self.projects.open_edit(id) {
          self.show_form();
        } else {
          self.view.error(&format!("No project with id {}", id));
        }
      }
      Action::Set { field, value } => {
        let result = match self.projects.form_mut() {
          Some(form) => form.set_field(&field, &value),
          None => Err(NO_FORM.to_string()),
        };
        if let Err(msg) = result {
          self.view.error(&msg);
        }
      }
      Action::TechAdd(tech) => match self.projects.form_mut() {
        Some(form) => {
          form.add_technology(&tech);
        }
        None => self.view.error(NO_FORM),
      },
      Action::TechRemove(index) => match self.projects.form_mut() {
        Some(form) => {
          if form.remove_technology(index).is_none() {
            self.view.error(&format!("No technology at position {}", index));
          }
        }
        None => self.view.error(NO_FORM),
      },
      Action::Show => self.show_form(),
      Action::Save => match self.projects.submit_form() {
        Ok(()) => self.view.info("Saving..."),
        Err(_) => match self.projects.take_notice() {
          Some(notice) => self.view.notice(&notice),
          None => self.view.error(NO_FORM),
        },
      },
      Action::Cancel => self.projects.cancel_form(),
      Action::Delete(id) => {
        if self.projects.request_delete(id) {
          let title = self
            .projects
            .find(id)
            .map(|p| p.title.clone())
            .unwrap_or_default();
          self.view.prompt(&format!(
            "Are you sure you want to delete project {} ({})? [y/N]",
            id, title
          ));
        } else {
          self.view.error(&format!("No project with id {}", id));
        }
      }
      Action::Filter(category) => {
        self.filter.set_category(CategoryFilter::parse(&category));
        self.show_list();
      }
      Action::ToggleAll => {
        let all = self.filter.toggle_show_all();
        self
          .view
          .info(if all { "Showing all projects." } else { "Showing featured projects." });
        self.show_list();
      }
      Action::Theme(setting) => {
        let dark = match setting {
          Some(dark) => {
            self.store.set_dark_mode(dark);
            dark
          }
          None => self.store.toggle_dark_mode(),
        };
        self
          .view
          .info(if dark { "Dark mode on." } else { "Dark mode off." });
      }
      Action::Logout => self.logout().await,
      Action::Quit => {
        self.unload().await;
        self.should_quit = true;
      }
      Action::Help => self.view.help(COMMANDS),
    }
  }

  fn show_list(&self) {
    self.view.projects(
      self.filter.apply(self.projects.projects()),
      self.projects.state(),
    );
  }

  fn show_form(&self) {
    match self.projects.form() {
      Some(form) => self.view.form(form),
      None => self.view.error(NO_FORM),
    }
  }

  /// The session is going away without a logout: tell the backend, once.
  async fn unload(&mut self) {
    if self.teardown.is_none() {
      return;
    }
    self.hooks.dispatch().await;
    self.teardown = None;

    if self.projects.has_pending() {
      tracing::debug!("leaving with remote calls still in flight");
    }
  }

  async fn logout(&mut self) {
    // Deregister first so the shutdown logout doesn't fire as well
    self.teardown = None;

    if let Err(e) = self.client.logout().await {
      tracing::debug!(error = %e, "logout failed");
    }
    self.view.info("Logged out.");
    self.should_quit = true;
  }
}

const NO_FORM: &str = "No form open. Use 'add' or 'edit <id>' first.";

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::NoopStorage;
  use crate::state::AppState;
  use axum::extract::{Query, State};
  use axum::http::Method;
  use axum::routing::any;
  use axum::{Json, Router};
  use serde_json::{json, Value};
  use std::collections::HashMap;
  use std::sync::Mutex;

  /// Methods of every `auth?action=logout` request the backend saw
  type LogoutLog = Arc<Mutex<Vec<Method>>>;

  async fn auth(
    State(log): State<LogoutLog>,
    method: Method,
    Query(query): Query<HashMap<String, String>>,
  ) -> Json<Value> {
    if query.get("action").map(String::as_str) == Some("logout") {
      log.lock().unwrap().push(method);
    }
    Json(json!({ "success": true }))
  }

  async fn app_with_backend() -> (App, LogoutLog) {
    let log = LogoutLog::default();
    let router = Router::new()
      .route("/portfolio/auth", any(auth))
      .with_state(log.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      axum::serve(listener, router).await.unwrap();
    });

    let mut config = Config::default();
    config.api.base_url = format!("http://{}/portfolio", addr);
    let client = PortfolioClient::new(&config.api, &config.teardown).unwrap();
    let store = AppStore::new(AppState::default());

    let mut app = App::new(config, client, Box::new(NoopStorage), store);
    app.install_teardown().unwrap();
    (app, log)
  }

  fn logouts(log: &LogoutLog) -> Vec<Method> {
    log.lock().unwrap().clone()
  }

  #[tokio::test]
  async fn test_quit_then_eof_ends_session_once() {
    let (mut app, log) = app_with_backend().await;

    app.execute(Action::Quit).await;
    app.handle_event(Event::Closed).await;

    assert!(app.should_quit);
    assert_eq!(logouts(&log), vec![Method::POST]);
    assert!(app.hooks.is_empty());
  }

  #[tokio::test]
  async fn test_interrupt_ends_session_once() {
    let (mut app, log) = app_with_backend().await;

    app.handle_event(Event::Interrupt).await;
    app.handle_event(Event::Interrupt).await;

    assert_eq!(logouts(&log).len(), 1);
  }

  #[tokio::test]
  async fn test_logout_does_not_fire_teardown() {
    let (mut app, log) = app_with_backend().await;

    app.execute(Action::Logout).await;
    assert!(app.hooks.is_empty());
    app.handle_event(Event::Closed).await;

    assert!(app.should_quit);
    assert_eq!(logouts(&log), vec![Method::GET]);
  }

  #[tokio::test]
  async fn test_teardown_falls_back_to_keepalive_without_beacon() {
    let (mut app, log) = app_with_backend().await;
    app.client = Arc::new({
      let mut teardown = app.config.teardown.clone();
      teardown.beacon = false;
      PortfolioClient::new(&app.config.api, &teardown).unwrap()
    });
    app.install_teardown().unwrap();
    assert_eq!(app.hooks.len(), 1);

    app.handle_event(Event::Closed).await;

    assert_eq!(logouts(&log), vec![Method::GET]);
  }

  #[tokio::test]
  async fn test_theme_command_updates_store() {
    let (mut app, _log) = app_with_backend().await;

    app.execute(Action::Theme(Some(true))).await;
    assert!(app.store.get().dark_mode);
    app.execute(Action::Theme(Some(true))).await;
    assert!(app.store.get().dark_mode);
    app.execute(Action::Theme(None)).await;
    assert!(!app.store.get().dark_mode);
  }
}
