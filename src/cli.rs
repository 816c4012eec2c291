//! CLI domain: parse, route, output, and presentation only.
//! Calculation logic lives in the orchestrator; routes only wire it up.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands, OutputFormat};
pub use presentation::{format_dataset_json, format_dataset_text, format_run_summary};
pub use route::RunContext;
