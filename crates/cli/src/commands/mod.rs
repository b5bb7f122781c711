//! CLI subcommand implementations

pub mod service;
pub mod training;
