//! Marketplace identifiers and credential resolution.

pub mod credentials;
pub mod id;

pub use credentials::*;
pub use id::*;
