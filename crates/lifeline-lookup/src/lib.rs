//! Client for the resource inference service.
//!
//! The inference service turns a caller's free-text transcript into a
//! recommended resource: what kind of help (`type_of_resource`) and where to
//! find it (`address`). This crate issues exactly one request per lookup and
//! never retries; callers decide how a failed lookup is presented.

pub mod client;
pub mod config;
pub mod error;

pub use client::{LookupClient, ResourceResult};
pub use config::LookupConfig;
pub use error::LookupError;
