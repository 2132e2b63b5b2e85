//! Owner of the visible project list.
//!
//! Loading follows "show the snapshot, then refresh": `initialize` paints
//! whatever the snapshot cache holds and immediately starts a fetch from the
//! backend. Only the fetch decides what ends up on screen.
//!
//! Remote calls run as spawned tasks and report back over a channel, the
//! same way a query is polled from the event loop tick:
//!
//! ```ignore
//! let mut projects = ProjectsController::new(api, cache, RefreshFailurePolicy::KeepCurrent);
//! projects.initialize();
//!
//! // In event loop tick
//! if projects.poll() {
//!     // State changed, redraw
//! }
//! ```
//!
//! Completions are applied in arrival order, so when two refreshes overlap
//! the one that finishes last wins. Nothing is cancelled.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::api::{ApiError, ProjectsApi};
use crate::cache::{SnapshotCache, SnapshotStorage};

use super::types::{FormMode, Project, ProjectForm};

/// Load state of the list view.
///
/// `Loaded` and `LoadFailed` are re-entered by every later refresh; there is
/// no terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
  Idle,
  Loading,
  Loaded,
  LoadFailed(String),
}

/// What the list shows when a refresh fails.
#[derive(Debug, Clone)]
pub enum RefreshFailurePolicy {
  /// Leave whatever is currently displayed
  KeepCurrent,
  /// Replace the list with a fixed set of projects
  Fallback(Vec<Project>),
}

/// Last user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
  Info(String),
  Error(String),
  Validation(Vec<String>),
}

enum Completion {
  Refreshed(Result<Vec<Project>, ApiError>),
  Saved {
    mode: FormMode,
    result: Result<(), ApiError>,
  },
  Deleted {
    id: u64,
    result: Result<(), ApiError>,
  },
}

pub struct ProjectsController<A: ProjectsApi, S: SnapshotStorage> {
  api: Arc<A>,
  cache: SnapshotCache<S>,
  policy: RefreshFailurePolicy,
  projects: Vec<Project>,
  state: LoadState,
  refreshes_in_flight: usize,
  mutations_in_flight: usize,
  form: Option<ProjectForm>,
  pending_delete: Option<u64>,
  notice: Option<Notice>,
  tx: mpsc::UnboundedSender<Completion>,
  rx: mpsc::UnboundedReceiver<Completion>,
}

impl<A: ProjectsApi, S: SnapshotStorage> ProjectsController<A, S> {
  pub fn new(api: Arc<A>, cache: SnapshotCache<S>, policy: RefreshFailurePolicy) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    Self {
      api,
      cache,
      policy,
      projects: Vec::new(),
      state: LoadState::Idle,
      refreshes_in_flight: 0,
      mutations_in_flight: 0,
      form: None,
      pending_delete: None,
      notice: None,
      tx,
      rx,
    }
  }

  pub fn projects(&self) -> &[Project] {
    &self.projects
  }

  pub fn state(&self) -> &LoadState {
    &self.state
  }

  pub fn is_loading(&self) -> bool {
    self.refreshes_in_flight > 0
  }

  /// Whether any remote call is still outstanding.
  pub fn has_pending(&self) -> bool {
    self.refreshes_in_flight > 0 || self.mutations_in_flight > 0
  }

  pub fn find(&self, id: u64) -> Option<&Project> {
    self.projects.iter().find(|p| p.id == Some(id))
  }

  pub fn snapshot_saved_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
    self.cache.saved_at()
  }

  /// Paint the snapshot (if any) and start the authoritative fetch.
  pub fn initialize(&mut self) {
    let cached: Vec<Project> = self.cache.load();
    if !cached.is_empty() {
      tracing::debug!(count = cached.len(), "showing cached projects");
      self.projects = cached;
    }
    self.start_refresh();
  }

  /// Start a refresh unless one is already loading.
  ///
  /// Returns false when the request was dropped because of that.
  pub fn refresh(&mut self) -> bool {
    if self.is_loading() {
      tracing::debug!("refresh already in flight");
      return false;
    }
    self.start_refresh();
    true
  }

  fn start_refresh(&mut self) {
    self.refreshes_in_flight += 1;
    self.state = LoadState::Loading;

    let request = self.api.list_projects();
    let tx = self.tx.clone();
    tokio::spawn(async move {
      // Ignore send errors - the controller may be gone
      let _ = tx.send(Completion::Refreshed(request.await));
    });
  }

  pub fn form(&self) -> Option<&ProjectForm> {
    self.form.as_ref()
  }

  pub fn form_mut(&mut self) -> Option<&mut ProjectForm> {
    self.form.as_mut()
  }

  pub fn open_create(&mut self) {
    self.form = Some(ProjectForm::create());
  }

  /// Open the edit form on a copy of the project. Returns false if unknown.
  pub fn open_edit(&mut self, id: u64) -> bool {
    match self.find(id).cloned() {
      Some(project) => {
        self.form = Some(ProjectForm::edit(project));
        true
      }
      None => false,
    }
  }

  pub fn cancel_form(&mut self) {
    self.form = None;
  }

  /// Validate the open form and send it.
  ///
  /// Validation failures never reach the network.
  pub fn submit_form(&mut self) -> Result<(), Vec<String>> {
    let Some(form) = self.form.as_ref() else {
      return Err(vec!["No project form is open".to_string()]);
    };

    let errors = form.project.validate();
    if !errors.is_empty() {
      self.notice = Some(Notice::Validation(errors.clone()));
      return Err(errors);
    }

    let mode = form.mode;
    let request = match mode {
      FormMode::Create => self.api.create_project(form.project.clone()),
      FormMode::Edit => self.api.update_project(form.project.clone()),
    };

    self.mutations_in_flight += 1;
    let tx = self.tx.clone();
    tokio::spawn(async move {
      let result = request.await;
      let _ = tx.send(Completion::Saved { mode, result });
    });
    Ok(())
  }

  /// First step of a delete: remember what to delete and wait for confirmation.
  pub fn request_delete(&mut self, id: u64) -> bool {
    if self.find(id).is_none() {
      return false;
    }
    self.pending_delete = Some(id);
    true
  }

  pub fn pending_delete(&self) -> Option<u64> {
    self.pending_delete
  }

  pub fn cancel_delete(&mut self) {
    self.pending_delete = None;
  }

  /// Send the delete confirmed by the user. Returns false if none was pending.
  pub fn confirm_delete(&mut self) -> bool {
    let Some(id) = self.pending_delete.take() else {
      return false;
    };

    self.mutations_in_flight += 1;
    let request = self.api.delete_project(id);
    let tx = self.tx.clone();
    tokio::spawn(async move {
      let result = request.await;
      let _ = tx.send(Completion::Deleted { id, result });
    });
    true
  }

  #[cfg(test)]
  pub fn notice(&self) -> Option<&Notice> {
    self.notice.as_ref()
  }

  pub fn take_notice(&mut self) -> Option<Notice> {
    self.notice.take()
  }

  /// Apply every completed call without blocking.
  ///
  /// Returns `true` if anything changed. Call this in the event loop tick.
  pub fn poll(&mut self) -> bool {
    let mut changed = false;
    while let Ok(completion) = self.rx.try_recv() {
      self.apply(completion);
      changed = true;
    }
    changed
  }

  /// Wait for the next call to complete and apply it.
  pub async fn wait(&mut self) {
    // The controller holds a sender, so the channel never closes
    if let Some(completion) = self.rx.recv().await {
      self.apply(completion);
    }
  }

  /// Wait until no remote call is outstanding.
  pub async fn settle(&mut self) {
    while self.has_pending() {
      self.wait().await;
    }
  }

  fn apply(&mut self, completion: Completion) {
    match completion {
      Completion::Refreshed(result) => {
        self.refreshes_in_flight = self.refreshes_in_flight.saturating_sub(1);
        self.apply_refresh(result);
      }
      Completion::Saved { mode, result } => {
        self.mutations_in_flight = self.mutations_in_flight.saturating_sub(1);
        match result {
          Ok(()) => {
            let verb = match mode {
              FormMode::Create => "created",
              FormMode::Edit => "updated",
            };
            tracing::info!("project {}", verb);
            self.form = None;
            self.notice = Some(Notice::Info(format!("Project {}", verb)));
            self.start_refresh();
          }
          Err(e) => {
            tracing::warn!(error = %e, "saving project failed");
            self.notice = Some(Notice::Error(e.message));
          }
        }
      }
      Completion::Deleted { id, result } => {
        self.mutations_in_flight = self.mutations_in_flight.saturating_sub(1);
        match result {
          Ok(()) => {
            tracing::info!(id, "project deleted");
            self.notice = Some(Notice::Info(format!("Project {} deleted", id)));
            self.start_refresh();
          }
          Err(e) => {
            tracing::warn!(id, error = %e, "deleting project failed");
            self.notice = Some(Notice::Error(e.message));
          }
        }
      }
    }
  }

  fn apply_refresh(&mut self, result: Result<Vec<Project>, ApiError>) {
    let still_loading = self.refreshes_in_flight > 0;

    match result {
      Ok(projects) => {
        tracing::debug!(count = projects.len(), "projects refreshed");
        self.projects = projects;
        self.cache.save(&self.projects);
        self.state = if still_loading {
          LoadState::Loading
        } else {
          LoadState::Loaded
        };
      }
      Err(e) => {
        tracing::warn!(error = %e, "refreshing projects failed");
        if let RefreshFailurePolicy::Fallback(projects) = &self.policy {
          self.projects = projects.clone();
        }
        self.state = if still_loading {
          LoadState::Loading
        } else {
          LoadState::LoadFailed(e.message)
        };
      }
    }
  }
}
