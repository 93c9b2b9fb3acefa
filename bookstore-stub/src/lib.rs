//! In-process fake of the DemoQA account and bookstore API.
//!
//! [`StubServer::start`] binds an ephemeral port on `127.0.0.1` and serves the
//! same paths, payloads and status codes as the real service, backed by an
//! in-memory store. Every request that reaches the stub is recorded so tests
//! can inspect what actually went over the wire.

mod catalogue;
mod data;
mod error;
mod runner;
mod store;
mod stub_server;
mod util;

pub use catalogue::{seed_books, Book};
pub use data::{RequestData, ResponseData};
pub use error::Error;
pub use stub_server::StubServer;
