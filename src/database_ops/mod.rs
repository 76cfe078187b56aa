pub mod db;
pub mod ensure;
pub mod models;
pub mod store;

pub use db::{CatalogTable, Db};
pub use store::{CatalogStore, StorageError};
