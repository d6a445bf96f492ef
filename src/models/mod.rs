//! Data models for dbutil.
//!
//! This module re-exports all model types used throughout the crate.

pub mod value;

pub use value::{NamedArgs, SqlValue};
