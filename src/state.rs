//! Observable application state.
//!
//! Components that care about presentation settings subscribe to the store
//! and read the current value when they draw.

use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppState {
  pub dark_mode: bool,
}

#[derive(Debug, Clone)]
pub struct AppStore {
  tx: watch::Sender<AppState>,
}

impl AppStore {
  pub fn new(initial: AppState) -> Self {
    let (tx, _rx) = watch::channel(initial);
    Self { tx }
  }

  pub fn get(&self) -> AppState {
    *self.tx.borrow()
  }

  pub fn subscribe(&self) -> watch::Receiver<AppState> {
    self.tx.subscribe()
  }

  pub fn set_dark_mode(&self, dark_mode: bool) {
    // send_if_modified keeps subscribers quiet when nothing changed
    self.tx.send_if_modified(|state| {
      let changed = state.dark_mode != dark_mode;
      state.dark_mode = dark_mode;
      changed
    });
  }

  pub fn toggle_dark_mode(&self) -> bool {
    self.tx.send_modify(|state| state.dark_mode = !state.dark_mode);
    self.get().dark_mode
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_toggle_updates_subscribers() {
    let store = AppStore::new(AppState::default());
    let mut rx = store.subscribe();

    assert!(store.toggle_dark_mode());
    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update().dark_mode);

    assert!(!store.toggle_dark_mode());
    assert!(!rx.borrow_and_update().dark_mode);
  }

  #[test]
  fn test_setting_same_value_does_not_notify() {
    let store = AppStore::new(AppState { dark_mode: true });
    let rx = store.subscribe();

    store.set_dark_mode(true);
    assert!(!rx.has_changed().unwrap());

    store.set_dark_mode(false);
    assert!(rx.has_changed().unwrap());
    assert!(!store.get().dark_mode);
  }
}
