use std::io::BufRead;
use std::time::Duration;
use tokio::sync::mpsc;

/// Session events
#[derive(Debug)]
pub enum Event {
  /// A line typed on stdin
  Line(String),
  /// Periodic tick for polling outstanding remote calls
  Tick,
  /// Ctrl-C
  Interrupt,
  /// Stdin was closed
  Closed,
}

/// Event handler that produces events from stdin, Ctrl-C and a tick timer
pub struct EventHandler {
  rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
  /// Create a new event handler with the given tick rate
  pub fn new(tick_rate: Duration) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();

    // Stdin reads block, so they get a plain thread the runtime never waits on
    let line_tx = tx.clone();
    std::thread::spawn(move || {
      for line in std::io::stdin().lock().lines() {
        match line {
          Ok(line) => {
            if line_tx.send(Event::Line(line)).is_err() {
              return;
            }
          }
          Err(_) => break,
        }
      }
      let _ = line_tx.send(Event::Closed);
    });

    // Spawn Ctrl-C listener
    let signal_tx = tx.clone();
    tokio::spawn(async move {
      while tokio::signal::ctrl_c().await.is_ok() {
        if signal_tx.send(Event::Interrupt).is_err() {
          break;
        }
      }
    });

    // Tick
    tokio::spawn(async move {
      let mut interval = tokio::time::interval(tick_rate);
      loop {
        interval.tick().await;
        if tx.send(Event::Tick).is_err() {
          break;
        }
      }
    });

    Self { rx }
  }

  /// Receive the next event
  pub async fn next(&mut self) -> Option<Event> {
    self.rx.recv().await
  }
}
