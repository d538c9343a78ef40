//! API Module
//!
//! HTTP handlers and routing for the todo service.
//!
//! # Endpoints
//! - `GET /todos` - List todos (served through the cache)
//! - `POST /todos` - Create a todo
//! - `DELETE /todos/:id` - Delete a todo
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
