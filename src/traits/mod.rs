//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - HTTP GET used by the network clients
//!
//! The fetch seam used by data providers lives next to them in
//! [`crate::provider::Fetcher`].

pub mod http;

pub use http::{Headers, HttpClient, HttpError, Response};
