//! screentest CLI
//!
//! Command implementations and output helpers for the `screentest` binary.

pub mod commands;
pub mod output;
pub mod specs;
