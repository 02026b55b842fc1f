//! Mock implementations for testing.
//!
//! These doubles let the network clients run without touching the network.
//!
//! # Available Mocks
//!
//! - [`MockHttpClient`] - HTTP client with configurable responses

pub mod http;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
