pub mod registration;
pub mod store_timeout;
