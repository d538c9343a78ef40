//! Todo Repository
//!
//! In-memory todo storage with sequential ids.

use std::collections::BTreeMap;

use tokio::sync::RwLock;

use super::{NewTodo, Todo};

#[derive(Debug, Default)]
struct Inner {
    todos: BTreeMap<u64, Todo>,
    last_id: u64,
}

/// Thread-safe in-memory todo list.
#[derive(Debug, Default)]
pub struct TodoRepository {
    inner: RwLock<Inner>,
}

impl TodoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// All todos ordered by id.
    pub async fn list(&self) -> Vec<Todo> {
        self.inner.read().await.todos.values().cloned().collect()
    }

    pub async fn find(&self, id: u64) -> Option<Todo> {
        self.inner.read().await.todos.get(&id).cloned()
    }

    /// Stores a new todo under the next id (starting at 1).
    pub async fn add(&self, new: NewTodo) -> Todo {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let todo = Todo::create(inner.last_id, new);
        inner.todos.insert(todo.id, todo.clone());
        todo
    }

    /// Removes and returns the todo, if present.
    pub async fn remove(&self, id: u64) -> Option<Todo> {
        self.inner.write().await.todos.remove(&id)
    }
}
