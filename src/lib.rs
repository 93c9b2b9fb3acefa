//! Acceptance-test toolkit for the DemoQA account and bookstore API.
//!
//! [`ApiClient`] wraps the HTTP surface, [`Session`] pairs one client with a
//! typed [`ScenarioContext`] and runs the per-scenario hooks, and
//! [`validation`] holds the field-shape rules the step definitions assert.

pub mod client;
pub mod config;
pub mod context;
pub mod data;
mod error;
pub mod logging;
pub mod session;
pub mod validation;

pub use client::{ApiClient, ApiClientBuilder, DEFAULT_BASE_URL};
pub use config::Config;
pub use context::ScenarioContext;
pub use data::ApiResponse;
pub use error::{Error, Result, EMPTY_RESPONSE};
pub use session::{
    Outcome, RunLog, RunState, ScenarioEnd, Session, Teardown, BOOK_CREATION_TAG,
    USER_CREATION_TAG,
};
