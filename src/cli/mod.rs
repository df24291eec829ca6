pub mod commands;
pub mod core;
mod help;
pub mod output;
pub mod render;
mod shell;

pub use shell::{run_cli, SCRIPT_ENV};
