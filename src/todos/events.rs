//! Domain Events
//!
//! In-process publisher that hands todo events to registered handlers.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::cache::Cancellation;
use crate::error::Result;

/// Something that happened to the todo list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoEvent {
    Created {
        id: u64,
        title: String,
        description: String,
    },
    Deleted {
        id: u64,
    },
}

impl TodoEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TodoEvent::Created { .. } => "todo.created",
            TodoEvent::Deleted { .. } => "todo.deleted",
        }
    }
}

/// Reacts to published todo events.
#[async_trait]
pub trait EventHandler: Send + Sync + Debug {
    async fn handle(&self, event: &TodoEvent, cancel: &Cancellation) -> Result<()>;
}

/// Dispatches each event to every handler, in registration order.
#[derive(Debug, Default, Clone)]
pub struct EventPublisher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Stops at the first handler error.
    pub async fn publish(&self, event: TodoEvent, cancel: &Cancellation) -> Result<()> {
        debug!("Publishing {} to {} handler(s)", event.name(), self.handlers.len());
        for handler in &self.handlers {
            handler.handle(&event, cancel).await?;
        }
        Ok(())
    }
}
