//! CLI module for Haggle

pub mod app;
pub mod commands;

pub use app::{render_catalog, render_reports, EvaluateRequest, HaggleApp, SimulateRequest};
pub use commands::{Cli, Commands, PolicyArg};
