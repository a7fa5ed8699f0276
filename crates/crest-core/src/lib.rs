//! crest-core: Shared types and utilities for the Crest processing engine
//!
//! This crate provides the foundational types used across all Crest crates:
//! the sample alias, the multichannel audio block, decibel conversions, and
//! the workspace error type.

mod block;
mod db;
mod error;

pub use block::*;
pub use db::*;
pub use error::*;
