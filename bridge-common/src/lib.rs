//! # Bridge Common Library
//!
//! Shared account and participant logic for Bridge services:
//! - Domain models (accounts, enrollments, demographics, labels)
//! - Conversion of persistence failures into domain errors
//! - Demographic assessment result parsing
//! - Field validators
//! - Account database initialization and lookup
//! - Configuration loading

pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod json;
pub mod models;
pub mod persistence;
pub mod validators;

pub use context::RequestContext;
pub use error::{Error, Result};
