//! Request DTOs for the todo API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::todos::NewTodo;

/// Maximum title length in characters
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum description length in characters
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// Request body for POST /todos
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTodoRequest {
    /// Short summary, required
    pub title: String,
    /// Optional details
    #[serde(default)]
    pub description: String,
}

impl CreateTodoRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.title.trim().is_empty() {
            return Some("Title cannot be empty".to_string());
        }
        if self.title.chars().count() > MAX_TITLE_LENGTH {
            return Some(format!(
                "Title exceeds maximum length of {} characters",
                MAX_TITLE_LENGTH
            ));
        }
        if self.description.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Some(format!(
                "Description exceeds maximum length of {} characters",
                MAX_DESCRIPTION_LENGTH
            ));
        }
        None
    }
}

impl From<CreateTodoRequest> for NewTodo {
    fn from(req: CreateTodoRequest) -> Self {
        NewTodo {
            title: req.title,
            description: req.description,
        }
    }
}
