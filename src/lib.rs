//! # AgriSakha
//!
//! A crop advisory service for farmers. Queries are matched against an
//! ordered keyword rule set, optionally translated to Hindi, logged to a
//! JSON file, and answered over a small HTTP API.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌────────────┐   ┌────────────┐   ┌─────────────┐
//! │ POST         │──▶│ Classifier │──▶│ Translator │──▶│  Query Log  │
//! │ /advisory    │   │ (rules)    │   │ (Hindi)    │   │ queries.json│
//! └──────────────┘   └────────────┘   └────────────┘   └─────────────┘
//! ```
//!
//! The classifier, translator, and log trait live in `agrisakha-core`;
//! this crate adds configuration, the JSON file backend, upload storage,
//! the axum server, and the CLI.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`knowledge`] | Loading rules/translations and building the service |
//! | [`file_log`] | JSON-file query log backend |
//! | [`uploads`] | Image upload storage |
//! | [`server`] | HTTP server |
//! | [`ask`], [`history`], [`check`] | CLI commands |

pub mod ask;
pub mod check;
pub mod config;
pub mod file_log;
pub mod history;
pub mod knowledge;
pub mod logging;
pub mod server;
pub mod uploads;
