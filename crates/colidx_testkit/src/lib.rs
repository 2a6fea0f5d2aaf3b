//! # colidx Testkit
//!
//! Test utilities for colidx.
//!
//! This crate provides:
//! - Property-based test generators using proptest
//! - Table and segment fixtures for index tests
//! - A brute-force reference for ordered index bounds
//!
//! ## Usage
//!
//! ```rust,ignore
//! use colidx_testkit::prelude::*;
//!
//! proptest! {
//!     #![proptest_config(PropTestConfig::quick().to_proptest_config())]
//!
//!     #[test]
//!     fn bounds_match_reference(values in segment_values_strategy(64)) {
//!         // ...
//!     }
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
