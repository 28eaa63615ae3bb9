//! compass-core — Assessment session engine, scoring, and ports.
//!
//! This crate defines the fundamental data model, the per-level
//! configuration table, the staged session engine with checkpoint/resume,
//! and the weighted career-field scoring that the Career Compass app
//! builds on.

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod scoring;
pub mod traits;
