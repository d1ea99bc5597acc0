//! Client-side proxy for the todo HTTP API and the view state built on it.

pub mod api;
pub mod error;
pub mod feed;

pub use api::TodoApi;
pub use error::ClientError;
pub use feed::{filter_todos_by_content, TodoFeed};
