//! Core module - Contains the fundamental data structures and utilities
//!
//! This module provides:
//! - Store configuration and error types
//! - Identifier hashing
//! - Cache layout and path rendering
//! - Unified result model and rendering
//! - Common utilities

pub mod config;
pub mod error;
pub mod hash;
pub mod model;
pub mod paths;
pub mod render;
pub mod util;
