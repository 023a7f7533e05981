pub mod connection;
pub mod kv;
pub mod properties;

pub use connection::{init_db, Database};
pub use kv::KeyValueStore;
pub use properties::PropertyStore;
