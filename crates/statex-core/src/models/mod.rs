//! Data models for statements and engine configuration.

pub mod config;
pub mod statement;
