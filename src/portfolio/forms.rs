//! Contact and login forms with local validation.

use crate::api::ContactRequest;

#[derive(Debug, Clone, Default)]
pub struct ContactForm {
  pub name: String,
  pub email: String,
  pub subject: String,
  pub message: String,
}

impl ContactForm {
  /// Returns an empty `Vec` if the form can be submitted.
  pub fn validate(&self) -> Vec<String> {
    let mut errors = Vec::new();

    check_length(&mut errors, "Name", &self.name, 2, 100);

    if self.email.trim().is_empty() {
      errors.push("Email is required".to_string());
    } else if !is_valid_email(self.email.trim()) {
      errors.push("Please enter a valid email address".to_string());
    }

    check_length(&mut errors, "Subject", &self.subject, 3, 255);
    check_length(&mut errors, "Message", &self.message, 10, 5000);

    errors
  }

  pub fn to_request(&self) -> ContactRequest {
    ContactRequest {
      name: self.name.trim().to_string(),
      email: self.email.trim().to_string(),
      subject: self.subject.trim().to_string(),
      message: self.message.trim().to_string(),
    }
  }
}

fn check_length(errors: &mut Vec<String>, label: &str, value: &str, min: usize, max: usize) {
  let len = value.trim().chars().count();
  if len == 0 {
    errors.push(format!("{label} is required"));
  } else if len < min {
    errors.push(format!("{label} must be at least {min} characters"));
  } else if len > max {
    errors.push(format!("{label} must be at most {max} characters"));
  }
}

/// Address shape accepted by the site's contact form.
///
/// The local part is dot-separated atoms of letters, digits and
/// ``!#$%&'*+/=?^_`{|}~-``. The domain is dot-separated labels of letters,
/// digits and inner hyphens, so single-label hosts like `localhost` pass.
pub fn is_valid_email(email: &str) -> bool {
  let Some((local, domain)) = email.split_once('@') else {
    return false;
  };
  email.len() <= 254
    && !local.is_empty()
    && local.len() <= 64
    && local.split('.').all(is_local_atom)
    && domain.split('.').all(is_domain_label)
}

fn is_local_atom(atom: &str) -> bool {
  !atom.is_empty()
    && atom
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+/=?^_`{|}~-".contains(c))
}

fn is_domain_label(label: &str) -> bool {
  !label.is_empty()
    && label.len() <= 63
    && !label.starts_with('-')
    && !label.ends_with('-')
    && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
  pub username: String,
  pub password: String,
}

impl LoginForm {
  pub fn validate(&self) -> Vec<String> {
    if self.username.is_empty() || self.password.is_empty() {
      vec!["Username and password are required".to_string()]
    } else {
      Vec::new()
    }
  }
}
