// === PUBLIC CONTRACT ===
// Only the contract module should be public for other crates to consume
pub mod contract;

pub use contract::{client, error, model};

// === MODULE DEFINITION ===
pub mod module;
pub use module::UsersDirectory;

pub mod config;

// === INTERNAL MODULES ===
// Exposed for tests and the server binary wiring; external consumers should
// stick to `contract`.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod gateways;
#[doc(hidden)]
pub mod infra;
