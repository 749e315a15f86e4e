//! Todo domain: model, input shapes and the operation service.

mod model;
mod service;

pub use model::{CreateTodo, Todo, UpdateTodo};
pub use service::TodoService;
