//! AI tools puzzle backend: catalog, grading, hints, and progress recording.

pub mod board;
pub mod catalog;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod grading;
pub mod hints;
pub mod protocol;
pub mod routes;
pub mod seeds;
pub mod selection;
pub mod session;
pub mod state;
pub mod store;
pub mod telemetry;
