pub mod config;
pub mod domain;
pub mod handlers;
pub mod srs;
pub mod state;
pub mod store;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
