pub mod lock;
pub mod memory;
pub mod models;
pub mod schema;
pub mod sqlite;
pub mod store;
