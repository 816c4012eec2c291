//! Integration tests for the mean rate distribution engine

mod cli_commands;
mod config_loading;
mod end_to_end;
mod store_roundtrip;
mod test_utils;
