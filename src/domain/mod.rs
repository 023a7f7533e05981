pub mod property;
pub mod reconcile;
pub mod validate;
