pub mod file_store;
pub mod sqlite_store;
