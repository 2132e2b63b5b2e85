use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// A project record as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
  /// Absent until the backend assigns one
  #[serde(
    default,
    skip_serializing_if = "Option::is_none",
    deserialize_with = "lenient_id"
  )]
  pub id: Option<u64>,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub image: String,
  #[serde(default)]
  pub technologies: Vec<String>,
  #[serde(default)]
  pub category: String,
  #[serde(default, deserialize_with = "lenient_flag")]
  pub featured: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub github_url: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub live_url: Option<String>,
}

// PHP backends often hand numeric columns back as strings and booleans as 0/1.
#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
  Bool(bool),
  Int(i64),
  Text(String),
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
  match Option::<Loose>::deserialize(deserializer)? {
    None => Ok(None),
    Some(Loose::Int(n)) => u64::try_from(n)
      .map(Some)
      .map_err(|_| de::Error::custom(format!("invalid project id {}", n))),
    Some(Loose::Text(s)) if s.trim().is_empty() => Ok(None),
    Some(Loose::Text(s)) => s
      .trim()
      .parse()
      .map(Some)
      .map_err(|_| de::Error::custom(format!("invalid project id {:?}", s))),
    Some(Loose::Bool(b)) => Err(de::Error::custom(format!("invalid project id {}", b))),
  }
}

fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
  match Option::<Loose>::deserialize(deserializer)? {
    None => Ok(false),
    Some(Loose::Bool(b)) => Ok(b),
    Some(Loose::Int(n)) => Ok(n != 0),
    Some(Loose::Text(s)) => match s.trim().to_lowercase().as_str() {
      "" | "0" | "false" => Ok(false),
      "1" | "true" => Ok(true),
      _ => Err(de::Error::custom(format!("invalid flag {:?}", s))),
    },
  }
}

pub const DEFAULT_CATEGORY: &str = "Web App";

impl Project {
  /// An empty record ready to be filled in by the create form.
  pub fn blank() -> Self {
    Self {
      id: None,
      title: String::new(),
      description: String::new(),
      image: String::new(),
      technologies: Vec::new(),
      category: DEFAULT_CATEGORY.to_string(),
      featured: false,
      github_url: None,
      live_url: None,
    }
  }

  /// Local pre-flight check before the record is sent anywhere.
  ///
  /// Returns an empty `Vec` if the record can be submitted.
  pub fn validate(&self) -> Vec<String> {
    let mut errors = Vec::new();

    if self.title.trim().is_empty() {
      errors.push("Title is required".to_string());
    }

    if self.description.trim().is_empty() {
      errors.push("Description is required".to_string());
    }

    errors
  }
}

/// Projects shown by the public listing when the backend can't be reached.
pub fn default_projects() -> Vec<Project> {
  vec![Project {
    id: Some(1),
    title: "E-Commerce Platform".to_string(),
    description:
      "A full-featured online store with product management, cart functionality, and secure checkout."
        .to_string(),
    image: "https://images.unsplash.com/photo-1556742049-0cfed4f6a45d?auto=format&fit=crop&w=800&q=80"
      .to_string(),
    technologies: ["Angular", "TypeScript", "Node.js", "MongoDB"]
      .into_iter()
      .map(String::from)
      .collect(),
    category: DEFAULT_CATEGORY.to_string(),
    featured: true,
    github_url: Some("https://github.com/kingjudah/ecommerce".to_string()),
    live_url: Some("https://ecommerce-demo.kingjudah.com".to_string()),
  }]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
  Create,
  Edit,
}

/// In-progress create/edit form.
///
/// Survives a failed submit so the user can retry without re-entering data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectForm {
  pub project: Project,
  pub mode: FormMode,
}

impl ProjectForm {
  pub fn create() -> Self {
    Self {
      project: Project::blank(),
      mode: FormMode::Create,
    }
  }

  pub fn edit(project: Project) -> Self {
    Self {
      project,
      mode: FormMode::Edit,
    }
  }

  /// Set a field by name. Empty values clear the optional links.
  pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), String> {
    let value = value.trim();
    let optional = || (!value.is_empty()).then(|| value.to_string());

    match field {
      "title" => self.project.title = value.to_string(),
      "description" => self.project.description = value.to_string(),
      "image" => self.project.image = value.to_string(),
      "category" => self.project.category = value.to_string(),
      "featured" => {
        self.project.featured = match value {
          "true" | "yes" | "y" | "1" => true,
          "false" | "no" | "n" | "0" => false,
          _ => return Err(format!("featured must be yes or no, got '{}'", value)),
        }
      }
      "github" | "githubUrl" => self.project.github_url = optional(),
      "live" | "liveUrl" => self.project.live_url = optional(),
      _ => return Err(format!("Unknown field '{}'", field)),
    }
    Ok(())
  }

  /// Append a technology tag. Blank input is ignored.
  pub fn add_technology(&mut self, tech: &str) -> bool {
    let tech = tech.trim();
    if tech.is_empty() {
      return false;
    }
    self.project.technologies.push(tech.to_string());
    true
  }

  pub fn remove_technology(&mut self, index: usize) -> Option<String> {
    (index < self.project.technologies.len()).then(|| self.project.technologies.remove(index))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_decodes_php_style_columns() {
    let project: Project = serde_json::from_str(
      r#"{"id":"7","title":"A","description":"B","featured":"1","githubUrl":null}"#,
    )
    .unwrap();
    assert_eq!(project.id, Some(7));
    assert!(project.featured);
    assert_eq!(project.github_url, None);

    let project: Project =
      serde_json::from_str(r#"{"id":null,"title":"A","featured":0}"#).unwrap();
    assert_eq!(project.id, None);
    assert!(!project.featured);

    let project: Project = serde_json::from_str(r#"{"title":"A","featured":true}"#).unwrap();
    assert_eq!(project.id, None);
    assert!(project.featured);
  }

  #[test]
  fn test_rejects_garbage_id() {
    assert!(serde_json::from_str::<Project>(r#"{"id":"abc","title":"A"}"#).is_err());
    assert!(serde_json::from_str::<Project>(r#"{"id":-1,"title":"A"}"#).is_err());
  }

  #[test]
  fn test_id_is_written_as_number() {
    let project = Project {
      id: Some(5),
      ..Project::blank()
    };
    let value = serde_json::to_value(&project).unwrap();
    assert_eq!(value["id"], 5);
    assert_eq!(value["featured"], false);
  }

  #[test]
  fn test_blank_project_fails_validation() {
    let errors = Project::blank().validate();
    assert_eq!(errors, vec!["Title is required", "Description is required"]);
  }

  #[test]
  fn test_whitespace_title_is_rejected() {
    let project = Project {
      title: "   ".to_string(),
      description: "Y".to_string(),
      ..Project::blank()
    };
    assert_eq!(project.validate(), vec!["Title is required"]);
  }

  #[test]
  fn test_wire_format_is_camel_case() {
    let project = Project {
      title: "X".to_string(),
      github_url: Some("https://github.com/x".to_string()),
      ..Project::blank()
    };
    let value = serde_json::to_value(&project).unwrap();
    assert_eq!(value["githubUrl"], "https://github.com/x");
    assert_eq!(value["category"], "Web App");
    assert!(value.get("id").is_none());
    assert!(value.get("liveUrl").is_none());
  }

  #[test]
  fn test_set_field() {
    let mut form = ProjectForm::create();
    form.set_field("title", " Folio ").unwrap();
    form.set_field("featured", "yes").unwrap();
    form.set_field("github", "https://github.com/f").unwrap();
    assert_eq!(form.project.title, "Folio");
    assert!(form.project.featured);
    assert_eq!(form.project.github_url.as_deref(), Some("https://github.com/f"));

    form.set_field("github", "").unwrap();
    assert_eq!(form.project.github_url, None);

    assert!(form.set_field("featured", "maybe").is_err());
    assert!(form.set_field("owner", "me").is_err());
  }

  #[test]
  fn test_technology_tags() {
    let mut form = ProjectForm::create();
    assert!(form.add_technology(" Rust "));
    assert!(!form.add_technology("   "));
    assert!(form.add_technology("Tokio"));
    assert_eq!(form.project.technologies, vec!["Rust", "Tokio"]);

    assert_eq!(form.remove_technology(0).as_deref(), Some("Rust"));
    assert_eq!(form.remove_technology(5), None);
    assert_eq!(form.project.technologies, vec!["Tokio"]);
  }
}
