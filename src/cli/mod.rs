//! CLI module for SoilSync
//! 
//! Handles command-line argument parsing.

pub mod args;

pub use args::{Args, Commands, RecommendArgs, SoilArgs, Verbosity};
