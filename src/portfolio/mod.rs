//! Portfolio domain: the project record, the list controller that keeps it
//! on screen, the public listing filter, and the contact/login forms.

pub mod controller;
pub mod filter;
pub mod forms;
mod types;

pub use controller::{LoadState, Notice, ProjectsController, RefreshFailurePolicy};
pub use filter::{CategoryFilter, ProjectFilter};
pub use forms::{ContactForm, LoginForm};
pub use types::{default_projects, FormMode, Project, ProjectForm};
