//! Todos Module
//!
//! The todo list domain: entity, in-memory repository, domain events and
//! the cache invalidation that reacts to them.

mod events;
mod invalidation;
mod model;
mod repository;

pub use events::{EventHandler, EventPublisher, TodoEvent};
pub use invalidation::{CacheInvalidationHandler, TODOS_CACHE_KEY};
pub use model::{NewTodo, Todo};
pub use repository::TodoRepository;
