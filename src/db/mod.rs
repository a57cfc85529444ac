pub mod connection;

pub use connection::{init_db, Database};
