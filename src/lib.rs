//! Sila - auth-aware data providers for a streaming-service client
//!
//! A screen holds a [`host::ProviderHost`], which drives a
//! [`provider::DataProvider`] through the mount protocol. The provider runs
//! its [`provider::Fetcher`] on a Tokio task and exposes the outcome as a
//! [`fetch_state::FetchState`], reloading when the
//! [`auth::AuthController`] token it fetched with goes stale.
//!
//! This library exposes modules for use in integration tests.

pub mod adapters;
pub mod auth;
pub mod config;
pub mod emotes;
pub mod error;
pub mod fetch_state;
pub mod host;
pub mod provider;
pub mod traits;
