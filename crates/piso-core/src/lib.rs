//! Core types and trait definitions for the piso clinical record store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod appointment;
pub mod dashboard;
pub mod error;
pub mod ficha;
pub mod patient;
pub mod practitioner;
pub mod store;
pub mod timeline;
pub mod validate;

pub use error::{Error, Result};
