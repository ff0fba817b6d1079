//! Chat orchestrator for a ceramic product studio
//!
//! Answers product questions through Gemini and designs ceramic patterns
//! through Leonardo, behind one small HTTP contract. Image generation is
//! asynchronous upstream; clients poll a status endpoint with the returned id.

pub mod ai;
pub mod app;
pub mod client;
pub mod error;
pub mod intent;
pub mod models;
pub mod poller;
pub mod prompts;
pub mod server;

pub use error::{Error, Result};
