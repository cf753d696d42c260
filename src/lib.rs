//! Abuse-report and false-positive contact directories
//!
//! Two remote JSON directories (companies and security vendors) are fetched
//! with fixed-delay retries, cached in memory for a configurable TTL, backed by
//! a bundled offline dataset, and normalized into one contact model.

pub mod cache;
pub mod cli;
pub mod config;
pub mod directory;
pub mod fetch;
pub mod loader;
pub mod logger;
pub mod lookup;
pub mod normalizer;

pub use directory::{Classification, ContactKind, ContactRecord, Directory, Entity};
pub use loader::{DirectoryKind, DirectoryLoader, LoadError, LoadOutcome};
pub use lookup::find;
