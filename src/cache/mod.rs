//! Cache module - Manages per-identifier generations under the cache root
//!
//! Provides:
//! - Handles and data kinds
//! - Generation writes with filter navigation
//! - Current-pointer metadata and reads
//! - Age-based pruning and full erase

pub mod erase;
pub mod filter;
pub mod handle;
pub mod meta;
pub mod reader;
pub mod store;
pub mod sweep;
