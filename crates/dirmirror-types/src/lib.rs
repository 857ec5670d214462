//! Core type system and error handling for dirmirror
//!
//! This crate provides the foundational types shared by every dirmirror crate:
//!
//! - **Error handling**: a single error enum with kinds, severity levels and a
//!   fatality flag used by the scheduler's failure policy
//! - **Core types**: entry kinds seen while walking directory trees
//! - **Configuration**: validated values such as the sync interval
//!
//! # Features
//!
//! - `serde`: Enable serialization support
//!
//! # Examples
//!
//! ```rust
//! use dirmirror_types::{Error, Result, SyncInterval};
//!
//! fn parse_interval(raw: &str) -> Result<SyncInterval> {
//!     raw.parse().map_err(Error::config)
//! }
//!
//! assert_eq!(parse_interval("5").unwrap().as_secs(), 5);
//! assert!(parse_interval("0").is_err());
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod result;
pub mod types;

// Re-export commonly used types
pub use config::{BufferSize, FailurePolicy, SyncInterval};
pub use error::{Error, ErrorKind, ErrorSeverity};
pub use result::Result;
pub use types::*;
