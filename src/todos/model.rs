//! Todo entity.

use serde::{Deserialize, Serialize};

/// A stored todo item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub done: bool,
}

/// Fields supplied when creating a todo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub description: String,
}

impl Todo {
    /// New todos always start open.
    pub fn create(id: u64, new: NewTodo) -> Self {
        Self {
            id,
            title: new.title,
            description: new.description,
            done: false,
        }
    }
}
