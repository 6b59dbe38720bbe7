//! Line-mode front-end: a plain REPL and a one-shot prompt runner.

pub mod commands;
pub mod runner;

pub use runner::{run_interactive, run_single_prompt};
