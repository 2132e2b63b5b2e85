//! Session teardown on shutdown.
//!
//! When the dashboard goes away without an explicit logout, the backend
//! session is still live. [`TeardownNotifier`] makes one best-effort attempt
//! to end it: a beacon-style POST if the transport offers one, otherwise a
//! plain logout request, all bounded by a deadline. Nothing is reported back.

use futures::future::{BoxFuture, FutureExt};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use url::Url;

use crate::api::TeardownTransport;

type UnloadHandler = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

#[derive(Default)]
struct HookTable {
  next_id: u64,
  handlers: Vec<(u64, UnloadHandler)>,
}

/// Handlers to run once when the session is shutting down.
#[derive(Clone, Default)]
pub struct UnloadHooks {
  table: Arc<Mutex<HookTable>>,
}

impl UnloadHooks {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a handler. It stays registered until the returned guard is dropped.
  pub fn register<F>(&self, handler: F) -> UnloadRegistration
  where
    F: Fn() -> BoxFuture<'static, ()> + Send + Sync + 'static,
  {
    let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
    let id = table.next_id;
    table.next_id += 1;
    table.handlers.push((id, Arc::new(handler)));

    UnloadRegistration {
      id,
      table: Arc::downgrade(&self.table),
    }
  }

  #[cfg(test)]
  pub fn len(&self) -> usize {
    self
      .table
      .lock()
      .map(|table| table.handlers.len())
      .unwrap_or(0)
  }

  #[cfg(test)]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Run every registered handler once, concurrently.
  pub async fn dispatch(&self) {
    let handlers: Vec<UnloadHandler> = match self.table.lock() {
      Ok(table) => table.handlers.iter().map(|(_, h)| h.clone()).collect(),
      Err(_) => return,
    };
    tracing::debug!(count = handlers.len(), "dispatching unload handlers");
    futures::future::join_all(handlers.iter().map(|handler| handler())).await;
  }
}

/// Guard for a registered unload handler; dropping it deregisters the handler.
#[must_use = "dropping the registration removes the handler immediately"]
pub struct UnloadRegistration {
  id: u64,
  table: Weak<Mutex<HookTable>>,
}

impl Drop for UnloadRegistration {
  fn drop(&mut self) {
    if let Some(table) = self.table.upgrade() {
      let mut table = table.lock().unwrap_or_else(|e| e.into_inner());
      table.handlers.retain(|(id, _)| *id != self.id);
    }
  }
}

/// Fire-and-forget logout for a session that is going away.
pub struct TeardownNotifier<T: TeardownTransport> {
  transport: Arc<T>,
  logout_url: Url,
  deadline: Duration,
}

impl<T: TeardownTransport> TeardownNotifier<T> {
  pub fn new(transport: Arc<T>, logout_url: Url, deadline: Duration) -> Self {
    Self {
      transport,
      logout_url,
      deadline,
    }
  }

  /// Make one attempt to end the backend session. Never fails.
  pub fn notify(&self) -> BoxFuture<'static, ()> {
    let transport = self.transport.clone();
    let url = self.logout_url.clone();
    let deadline = self.deadline;

    async move {
      let attempt = async {
        if transport.send_beacon(&url).await {
          return "beacon";
        }
        match transport.send_keepalive(&url).await {
          Ok(()) => "keepalive",
          Err(e) => {
            tracing::debug!(error = %e, "teardown logout failed");
            "failed"
          }
        }
      };

      match tokio::time::timeout(deadline, attempt).await {
        Ok(outcome) => tracing::debug!(outcome, "teardown logout attempted"),
        Err(_) => tracing::debug!(?deadline, "teardown logout timed out"),
      }
    }
    .boxed()
  }

  /// Register this notifier as the session's unload handler.
  pub fn install(self, hooks: &UnloadHooks) -> UnloadRegistration {
    let notifier = Arc::new(self);
    hooks.register(move || notifier.notify())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::ApiError;
  use std::sync::atomic::{AtomicUsize, Ordering};

  #[derive(Default)]
  struct FakeTransport {
    beacon_available: bool,
    keepalive_fails: bool,
    keepalive_delay: Option<Duration>,
    beacons: AtomicUsize,
    keepalives: AtomicUsize,
  }

  impl TeardownTransport for FakeTransport {
    fn send_beacon(&self, _url: &Url) -> BoxFuture<'static, bool> {
      self.beacons.fetch_add(1, Ordering::SeqCst);
      futures::future::ready(self.beacon_available).boxed()
    }

    fn send_keepalive(&self, _url: &Url) -> BoxFuture<'static, Result<(), ApiError>> {
      self.keepalives.fetch_add(1, Ordering::SeqCst);
      let fails = self.keepalive_fails;
      let delay = self.keepalive_delay;
      async move {
        if let Some(delay) = delay {
          tokio::time::sleep(delay).await;
        }
        if fails {
          Err(ApiError::application("server error 500"))
        } else {
          Ok(())
        }
      }
      .boxed()
    }
  }

  fn notifier(transport: &Arc<FakeTransport>, deadline: Duration) -> TeardownNotifier<FakeTransport> {
    let url = Url::parse("http://localhost/myportfolio/auth?action=logout").unwrap();
    TeardownNotifier::new(transport.clone(), url, deadline)
  }

  #[tokio::test]
  async fn test_beacon_skips_keepalive() {
    let transport = Arc::new(FakeTransport {
      beacon_available: true,
      ..FakeTransport::default()
    });
    notifier(&transport, Duration::from_secs(1)).notify().await;

    assert_eq!(transport.beacons.load(Ordering::SeqCst), 1);
    assert_eq!(transport.keepalives.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn test_falls_back_to_keepalive() {
    let transport = Arc::new(FakeTransport::default());
    notifier(&transport, Duration::from_secs(1)).notify().await;

    assert_eq!(transport.beacons.load(Ordering::SeqCst), 1);
    assert_eq!(transport.keepalives.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_keepalive_failure_is_swallowed() {
    let transport = Arc::new(FakeTransport {
      keepalive_fails: true,
      ..FakeTransport::default()
    });
    notifier(&transport, Duration::from_secs(1)).notify().await;

    assert_eq!(transport.keepalives.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_slow_keepalive_is_bounded_by_deadline() {
    let transport = Arc::new(FakeTransport {
      keepalive_delay: Some(Duration::from_secs(30)),
      ..FakeTransport::default()
    });

    let started = std::time::Instant::now();
    notifier(&transport, Duration::from_millis(50)).notify().await;
    assert!(started.elapsed() < Duration::from_secs(5));
  }

  #[tokio::test]
  async fn test_installed_notifier_fires_once_per_dispatch() {
    let transport = Arc::new(FakeTransport {
      beacon_available: true,
      ..FakeTransport::default()
    });
    let hooks = UnloadHooks::new();
    let registration = notifier(&transport, Duration::from_secs(1)).install(&hooks);
    assert_eq!(hooks.len(), 1);

    hooks.dispatch().await;
    assert_eq!(transport.beacons.load(Ordering::SeqCst), 1);

    drop(registration);
    assert!(hooks.is_empty());
    hooks.dispatch().await;
    assert_eq!(transport.beacons.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_registrations_are_independent() {
    let hooks = UnloadHooks::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = calls.clone();
    let first = hooks.register(move || {
      counter.fetch_add(1, Ordering::SeqCst);
      futures::future::ready(()).boxed()
    });
    let counter = calls.clone();
    let second = hooks.register(move || {
      counter.fetch_add(10, Ordering::SeqCst);
      futures::future::ready(()).boxed()
    });

    drop(first);
    hooks.dispatch().await;
    assert_eq!(calls.load(Ordering::SeqCst), 10);
    drop(second);
  }

  #[test]
  fn test_registration_outliving_hooks() {
    let hooks = UnloadHooks::new();
    let registration = hooks.register(|| futures::future::ready(()).boxed());
    drop(hooks);
    drop(registration);
  }
}
