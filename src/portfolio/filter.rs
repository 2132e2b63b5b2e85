//! Category filter for the public project listing.

use super::types::Project;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
  #[default]
  All,
  Category(String),
}

impl CategoryFilter {
  /// Parse user input: "all" (any case) or a category label.
  pub fn parse(input: &str) -> Self {
    let input = input.trim();
    if input.is_empty() || input.eq_ignore_ascii_case("all") {
      CategoryFilter::All
    } else {
      CategoryFilter::Category(input.to_string())
    }
  }
}

/// Which projects the listing shows.
///
/// Unless `show_all` is set only featured projects are listed.
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
  pub active: CategoryFilter,
  pub show_all: bool,
}

impl ProjectFilter {
  pub fn set_category(&mut self, filter: CategoryFilter) {
    self.active = filter;
  }

  pub fn toggle_show_all(&mut self) -> bool {
    self.show_all = !self.show_all;
    self.show_all
  }

  pub fn apply<'a>(&self, projects: &'a [Project]) -> Vec<&'a Project> {
    projects
      .iter()
      .filter(|p| match &self.active {
        CategoryFilter::All => true,
        CategoryFilter::Category(category) => &p.category == category,
      })
      .filter(|p| self.show_all || p.featured)
      .collect()
  }
}

/// Distinct categories in first-seen order.
pub fn categories(projects: &[Project]) -> Vec<&str> {
  let mut seen: Vec<&str> = Vec::new();
  for project in projects {
    if !seen.contains(&project.category.as_str()) {
      seen.push(&project.category);
    }
  }
  seen
}

#[cfg(test)]
mod tests {
  use super::*;

  fn project(title: &str, category: &str, featured: bool) -> Project {
    Project {
      title: title.to_string(),
      category: category.to_string(),
      featured,
      ..Project::blank()
    }
  }

  fn titles(projects: Vec<&Project>) -> Vec<&str> {
    projects.into_iter().map(|p| p.title.as_str()).collect()
  }

  fn sample() -> Vec<Project> {
    vec![
      project("Shop", "Web App", true),
      project("Blog", "Web App", false),
      project("Tracker", "Mobile", true),
      project("Notes", "Mobile", false),
    ]
  }

  #[test]
  fn test_default_shows_featured_only() {
    let projects = sample();
    let filter = ProjectFilter::default();
    assert_eq!(titles(filter.apply(&projects)), vec!["Shop", "Tracker"]);
  }

  #[test]
  fn test_category_with_show_all() {
    let projects = sample();
    let mut filter = ProjectFilter::default();
    filter.set_category(CategoryFilter::parse("Mobile"));
    assert_eq!(titles(filter.apply(&projects)), vec!["Tracker"]);

    assert!(filter.toggle_show_all());
    assert_eq!(titles(filter.apply(&projects)), vec!["Tracker", "Notes"]);
  }

  #[test]
  fn test_unknown_category_is_empty() {
    let projects = sample();
    let filter = ProjectFilter {
      active: CategoryFilter::Category("Desktop".to_string()),
      show_all: true,
    };
    assert!(filter.apply(&projects).is_empty());
  }

  #[test]
  fn test_parse_all() {
    assert_eq!(CategoryFilter::parse("ALL"), CategoryFilter::All);
    assert_eq!(CategoryFilter::parse(""), CategoryFilter::All);
  }

  #[test]
  fn test_categories_first_seen_order() {
    let projects = sample();
    assert_eq!(categories(&projects), vec!["Web App", "Mobile"]);
  }
}
