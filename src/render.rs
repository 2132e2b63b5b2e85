//! Plain line output for the terminal, colored per the current theme.

use crossterm::style::{Color, Stylize};
use tokio::sync::watch;

use crate::commands::Command;
use crate::portfolio::{FormMode, LoadState, Notice, Project, ProjectForm};
use crate::state::{AppState, AppStore};

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// One row of the project table, without color.
pub fn project_row(project: &Project) -> String {
  let id = project
    .id
    .map(|id| id.to_string())
    .unwrap_or_else(|| "-".to_string());
  let star = if project.featured { "*" } else { " " };
  format!(
    "{:>4} {} {:<32} {:<14} {}",
    id,
    star,
    truncate(&project.title, 32),
    truncate(&project.category, 14),
    truncate(&project.technologies.join(", "), 40)
  )
}

/// Status line for the list header.
pub fn load_status(state: &LoadState, count: usize) -> String {
  match state {
    LoadState::Idle => format!("{} projects", count),
    LoadState::Loading => format!("{} projects (refreshing...)", count),
    LoadState::Loaded => format!("{} projects", count),
    LoadState::LoadFailed(e) => format!("{} projects (refresh failed: {})", count, e),
  }
}

struct Palette {
  accent: Color,
  muted: Color,
  ok: Color,
  warn: Color,
  error: Color,
}

impl Palette {
  fn for_state(state: AppState) -> Self {
    if state.dark_mode {
      Self {
        accent: Color::Cyan,
        muted: Color::DarkGrey,
        ok: Color::Green,
        warn: Color::Yellow,
        error: Color::Red,
      }
    } else {
      Self {
        accent: Color::DarkBlue,
        muted: Color::Grey,
        ok: Color::DarkGreen,
        warn: Color::DarkYellow,
        error: Color::DarkRed,
      }
    }
  }
}

/// Writes views to stdout using the theme from the app store.
pub struct Renderer {
  theme: watch::Receiver<AppState>,
}

impl Renderer {
  pub fn new(store: &AppStore) -> Self {
    Self {
      theme: store.subscribe(),
    }
  }

  fn palette(&self) -> Palette {
    Palette::for_state(*self.theme.borrow())
  }

  pub fn projects<'a>(&self, projects: impl IntoIterator<Item = &'a Project>, state: &LoadState) {
    let palette = self.palette();
    let projects: Vec<&Project> = projects.into_iter().collect();

    let status = load_status(state, projects.len());
    let status = match state {
      LoadState::LoadFailed(_) => status.with(palette.error),
      LoadState::Loading => status.with(palette.warn),
      _ => status.with(palette.muted),
    };
    println!("{}", status);

    if projects.is_empty() {
      println!("{}", "  No projects found.".with(palette.muted));
      return;
    }
    for project in projects {
      let row = project_row(project);
      if project.featured {
        println!("{}", row.with(palette.accent));
      } else {
        println!("{}", row);
      }
    }
  }

  pub fn categories(&self, categories: &[&str]) {
    let palette = self.palette();
    for category in categories {
      println!("  {}", (*category).with(palette.accent));
    }
  }

  pub fn form(&self, form: &ProjectForm) {
    let palette = self.palette();
    let heading = match form.mode {
      FormMode::Create => "New project".to_string(),
      FormMode::Edit => format!(
        "Editing project {}",
        form.project.id.map(|id| id.to_string()).unwrap_or_default()
      ),
    };
    println!("{}", heading.with(palette.accent).bold());

    let p = &form.project;
    let optional = |v: &Option<String>| v.clone().unwrap_or_default();
    let fields = [
      ("title", p.title.clone()),
      ("description", p.description.clone()),
      ("image", p.image.clone()),
      ("category", p.category.clone()),
      ("featured", if p.featured { "yes" } else { "no" }.to_string()),
      ("github", optional(&p.github_url)),
      ("live", optional(&p.live_url)),
    ];
    for (name, value) in fields {
      println!("  {} {}", format!("{:<12}", name).with(palette.muted), value);
    }

    let techs: Vec<String> = p
      .technologies
      .iter()
      .enumerate()
      .map(|(i, t)| format!("[{}] {}", i, t))
      .collect();
    println!("  {} {}", format!("{:<12}", "tech").with(palette.muted), techs.join("  "));
  }

  pub fn notice(&self, notice: &Notice) {
    match notice {
      Notice::Info(msg) => self.info(msg),
      Notice::Error(msg) => self.error(&format!("Error: {}", msg)),
      Notice::Validation(errors) => {
        for e in errors {
          self.error(e);
        }
      }
    }
  }

  pub fn info(&self, msg: &str) {
    println!("{}", msg.with(self.palette().ok));
  }

  pub fn warn(&self, msg: &str) {
    println!("{}", msg.with(self.palette().warn));
  }

  pub fn error(&self, msg: &str) {
    println!("{}", msg.with(self.palette().error));
  }

  pub fn prompt(&self, prompt: &str) {
    println!("{}", prompt.with(self.palette().warn).bold());
  }

  pub fn help(&self, commands: &[Command]) {
    let palette = self.palette();
    for cmd in commands {
      let usage = format!("{:<22}", cmd.usage);
      println!("  {} {}", usage.with(palette.accent), cmd.description);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
  }

  #[test]
  fn test_truncate_exact_length() {
    assert_eq!(truncate("hello", 5), "hello");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn test_truncate_multibyte() {
    assert_eq!(truncate("héllo wörld", 8), "héllo...");
  }

  #[test]
  fn test_project_row() {
    let project = Project {
      id: Some(7),
      title: "Folio".to_string(),
      technologies: vec!["Rust".to_string(), "SQLite".to_string()],
      featured: true,
      ..Project::blank()
    };
    let row = project_row(&project);
    assert!(row.starts_with("   7 * Folio"));
    assert!(row.ends_with("Rust, SQLite"));

    let draft = Project::blank();
    assert!(project_row(&draft).starts_with("   -  "));
  }

  #[test]
  fn test_load_status() {
    assert_eq!(load_status(&LoadState::Loaded, 2), "2 projects");
    assert_eq!(
      load_status(&LoadState::LoadFailed("server error 500".to_string()), 1),
      "1 projects (refresh failed: server error 500)"
    );
  }
}
