#[cfg(feature = "server")]
pub mod api;
#[cfg(feature = "server")]
pub mod config;
pub mod error;
#[cfg(feature = "server")]
pub mod gateway;
pub mod parse;
#[cfg(feature = "server")]
pub mod server;
#[cfg(feature = "server")]
pub mod store;
pub mod validate;
pub mod wasm;
