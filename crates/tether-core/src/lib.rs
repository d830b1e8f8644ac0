//! Core types and identity-resolution logic for Tether.
//!
//! This crate is deliberately free of HTTP and database dependencies. It
//! defines the contact model, the store abstraction, and the resolver that
//! decides whether an incoming email/phone pair creates, attaches to, or
//! merges identity clusters.

pub mod consolidate;
pub mod contact;
pub mod error;
pub mod request;
pub mod resolve;
pub mod store;

pub use error::{Error, Result};
pub use resolve::{identify, resolve};
