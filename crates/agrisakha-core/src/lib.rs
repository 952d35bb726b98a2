//! # AgriSakha Core
//!
//! Shared, I/O-free logic for AgriSakha: data models, advisory rules, the
//! keyword classifier, the Hindi translator, the query log abstraction, and
//! the advisory pipeline that ties them together.
//!
//! This crate contains no HTTP, filesystem, or runtime dependencies. The
//! `agrisakha` crate wires it to axum and a JSON file on disk.

pub mod advisory;
pub mod analysis;
pub mod classify;
pub mod models;
pub mod query_log;
pub mod rules;
pub mod translate;
