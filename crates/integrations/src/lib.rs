//! Outbound HTTP clients for the third-party services Rankforge talks to.
//!
//! Every client wraps a shared [`reqwest::Client`] and a base URL that can be
//! overridden (tests point them at a local stub server). Response parsing is
//! split into pure functions so it can be tested without the network.

pub mod error;
pub mod llm;
pub mod page_fetch;
pub mod pagespeed;
pub mod payments;
pub mod serp;

pub use error::IntegrationError;
