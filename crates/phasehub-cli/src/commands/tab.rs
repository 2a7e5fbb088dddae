//! Column alignment for free-form text.

use std::io::Read;

use phasehub_core::error::AppError;

use crate::output;

/// Execute the tab command
pub fn execute() -> Result<(), AppError> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    println!("{}", output::pretty_tab(&input));
    Ok(())
}
