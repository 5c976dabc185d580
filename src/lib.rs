//! # ECU Catalog
//!
//! A local-first catalog of ECU (engine control unit) part records, keyed by
//! part number and model, with CSV import/export and a cleanup tool for raw
//! spreadsheets.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐  <username> <token>  ┌─────────────┐   ┌──────────────┐
//! │  ecu-gate │─────────────────────▶│ ecu-catalog │──▶│ RecordStore  │
//! │ usuarios  │   (fire-and-forget)  │ App + REPL  │   │ SQLite table │
//! └───────────┘                      └──────┬──────┘   └──────▲───────┘
//!                                           │                 │
//!                                           ▼                 │
//!                                    ┌─────────────┐          │
//!                                    │  reconcile  │──────────┘
//!                                    │ CSV in/out  │
//!                                    └─────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`store`] | Record store trait, SQLite and in-memory backends |
//! | [`search`] | Substring search filters |
//! | [`reconcile`] | CSV import and export |
//! | [`clean`] | Raw spreadsheet cleanup |
//! | [`gate`] | Accounts, login and catalog handoff |
//! | [`session`] | Launch-argument check |
//! | [`app`] | Application state and command dispatcher |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema creation |

pub mod app;
pub mod clean;
pub mod config;
pub mod db;
pub mod error;
pub mod gate;
pub mod logging;
pub mod migrate;
pub mod models;
pub mod reconcile;
pub mod search;
pub mod session;
pub mod store;
