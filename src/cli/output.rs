//! CLI output: error mapping from domain errors to the CLI surface.

use crate::error::MrdError;

/// Map domain errors to a one-line message for stderr.
pub fn map_error(e: &MrdError) -> String {
    match e {
        MrdError::TooManySites { .. } => format!(
            "{}. Reduce the number of sites or raise calculation.max_sites.",
            e
        ),
        _ => e.to_string(),
    }
}
