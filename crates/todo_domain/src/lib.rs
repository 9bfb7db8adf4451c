pub mod notifications;
pub mod reminder;
pub mod service;
pub mod storage;
pub mod store;
pub mod todo;

pub use crate::service::{TodoService, TodoServiceBuilder};
