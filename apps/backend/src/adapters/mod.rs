//! Credential store implementations.

pub mod users_memory;
pub mod users_sea;

pub use users_memory::InMemoryUserStore;
pub use users_sea::SeaUserStore;
