mod api;
mod app;
mod cache;
mod commands;
mod config;
mod event;
mod logging;
mod portfolio;
mod public;
mod render;
mod session;
mod state;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use std::path::PathBuf;

use crate::api::PortfolioClient;
use crate::cache::{NoopStorage, SnapshotStorage, SqliteStorage};
use crate::config::Config;
use crate::portfolio::ContactForm;
use crate::render::Renderer;
use crate::state::{AppState, AppStore};

#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(about = "A terminal admin console for a portfolio site's projects API")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./folio.yaml or $XDG_CONFIG_HOME/folio/config.yaml)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Don't read or write the offline project snapshot
  #[arg(long, global = true)]
  no_cache: bool,

  #[command(subcommand)]
  command: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
  /// Sign in and manage projects (default)
  Dashboard {
    /// Admin username, overrides the config file
    #[arg(short, long)]
    username: Option<String>,
  },
  /// Print the public project listing
  Projects {
    /// Only show this category ("all" for every category)
    #[arg(long)]
    category: Option<String>,
    /// Include projects that aren't featured
    #[arg(long)]
    all: bool,
    /// List the categories instead of the projects
    #[arg(long)]
    categories: bool,
  },
  /// Send a message through the contact form
  Contact {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    subject: String,
    #[arg(long)]
    message: String,
  },
  /// Subscribe an address to the newsletter
  Newsletter {
    #[arg(long)]
    email: String,
  },
  /// Print a content resource such as "skills" or "testimonials"
  Resource { name: String },
}

/// Snapshot storage for the dashboard, or nothing when caching is off or unavailable
fn open_storage(config: &Config, no_cache: bool) -> Box<dyn SnapshotStorage> {
  if no_cache || !config.cache.enabled {
    return Box::new(NoopStorage);
  }

  let path = match &config.cache.path {
    Some(path) => Ok(path.clone()),
    None => Config::data_dir().map(|dir| dir.join("cache.db")),
  };

  match path.and_then(|path| SqliteStorage::open(&path)) {
    Ok(storage) => Box::new(storage),
    Err(e) => {
      tracing::warn!(error = %e, "snapshot cache unavailable, continuing without it");
      Box::new(NoopStorage)
    }
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _log_guard = logging::init();

  let mut config = Config::load(args.config.as_deref())?;
  let store = AppStore::new(AppState {
    dark_mode: config.theme.dark_mode,
  });
  let view = Renderer::new(&store);
  let client = PortfolioClient::new(&config.api, &config.teardown)?;
  tracing::info!(base_url = %client.base_url(), "starting");

  match args.command.unwrap_or(Cmd::Dashboard { username: None }) {
    Cmd::Dashboard { username } => {
      if username.is_some() {
        config.admin.username = username;
      }
      let storage = open_storage(&config, args.no_cache);
      let mut app = app::App::new(config, client, storage, store);
      app.run().await?;
    }
    Cmd::Projects {
      category,
      all,
      categories,
    } => {
      public::list_projects(client, &view, category.as_deref(), all, categories).await?;
    }
    Cmd::Contact {
      name,
      email,
      subject,
      message,
    } => {
      let form = ContactForm {
        name,
        email,
        subject,
        message,
      };
      public::send_contact(&client, &view, form).await?;
    }
    Cmd::Newsletter { email } => public::subscribe(&client, &view, &email).await?,
    Cmd::Resource { name } => public::show_resource(&client, &name).await?,
  }

  Ok(())
}
