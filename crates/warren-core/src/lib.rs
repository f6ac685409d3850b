//! # warren-core
//!
//! Foundation types shared by every Warren crate:
//!
//! - **Branded IDs**: `RunId`, `IdempotencyKey` as newtypes for type safety
//! - **Logging**: `tracing` subscriber setup and an in-memory capture layer
//!   for asserting on log output in tests

#![deny(unsafe_code)]

pub mod ids;
pub mod logging;

pub use ids::{IdempotencyKey, RunId};
