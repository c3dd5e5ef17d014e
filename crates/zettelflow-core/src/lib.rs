//! Zettelflow Core Library
//!
//! Core domain logic for the zettelflow note lifecycle: metadata repair,
//! AI enrichment, quality-gated promotion and vault analytics.

pub mod config;
pub mod connections;
pub mod error;
pub mod llm;
pub mod logging;
pub mod note;
pub mod process;
pub mod promote;
pub mod repair;
pub mod report;
pub mod text;
pub mod time;
pub mod vault;
