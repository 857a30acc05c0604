// Library root: exposes internals for integration tests.
// The binary entry point is src/main.rs.

pub mod config;
pub mod error;
pub mod generation;
pub mod http;
pub mod llm;
pub mod logger;
pub mod markdown;
pub mod model;
pub mod prompts;
pub mod store;
pub mod study;
