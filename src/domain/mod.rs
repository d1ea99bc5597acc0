pub mod error;
pub mod page;
pub mod store;
pub mod todo;
