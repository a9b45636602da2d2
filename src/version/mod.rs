//! Version management layer
//!
//! Resolves which mod versions each uploaded file of a project ships, keeps
//! the results in a durable store, and folds them into update feeds.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Repository  │────▶│  Resolver   │────▶│    Store    │
//! │  (fetch)    │     │  (inspect)  │     │  (SQLite)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                                                ▼
//!                                         ┌─────────────┐
//!                                         │ Aggregator  │
//!                                         │   (feed)    │
//!                                         └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`aggregator`]: latest/recommended selection per game version
//! - [`database`]: SQLite implementation of the store
//! - [`error`]: Error types for the store, the repository and the pipeline
//! - [`repository`]: Repository trait for the external mod repository
//! - [`repositories`]: Concrete repository clients (CurseForge)
//! - [`resolver`]: One-time inspection of each uploaded file
//! - [`store`]: Store trait and lookup predicate
//! - [`types`]: Projects, artifacts, versions and loaders

pub mod aggregator;
pub mod database;
pub mod error;
pub mod repositories;
pub mod repository;
pub mod resolver;
pub mod store;
pub mod types;
