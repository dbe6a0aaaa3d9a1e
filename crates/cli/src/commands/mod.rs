//! CLI Commands

pub mod config;
pub mod estimate;
pub mod generate;
pub mod render;
pub mod select;
pub mod validate;
