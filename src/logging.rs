use color_eyre::{eyre::eyre, Result};
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Send tracing output to a daily log file so it never mixes with the session.
///
/// The filter comes from FOLIO_LOG (default "folio=info"). Keep the returned
/// guard alive until exit or buffered lines are lost. When no log file can be
/// opened the process runs without logging.
pub fn init() -> Option<WorkerGuard> {
  let (writer, guard) = match Config::data_dir().and_then(|dir| file_writer(&dir.join("logs"))) {
    Ok(file) => file,
    Err(e) => {
      eprintln!("warning: logging disabled: {}", e);
      return None;
    }
  };

  let installed = tracing_subscriber::registry()
    .with(EnvFilter::try_from_env("FOLIO_LOG").unwrap_or_else(|_| "folio=info".into()))
    .with(
      tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false),
    )
    .try_init();

  match installed {
    Ok(()) => Some(guard),
    Err(e) => {
      eprintln!("warning: logging disabled: {}", e);
      None
    }
  }
}

fn file_writer(dir: &Path) -> Result<(NonBlocking, WorkerGuard)> {
  std::fs::create_dir_all(dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;

  let appender = tracing_appender::rolling::daily(dir, "folio.log");
  Ok(tracing_appender::non_blocking(appender))
}
