#![deny(clippy::all, clippy::cargo, clippy::expect_used, clippy::unwrap_used)]
#![deny(clippy::pedantic, clippy::nursery, unsafe_code)]
#![warn(clippy::unimplemented, clippy::redundant_type_annotations)]

use anyhow::Result;
use std::io::BufRead;

pub mod algo;
pub mod core;
pub mod data;

/// Runs the given solver on the instance read from reader and writes the selected task ids to stdout.
/// Also writes the total weight to stdout.
///
/// # Errors
/// - If the instance could not be read from the reader.
/// - If the solver fails.
/// - If the selection could not be written to stdout.
///
/// # Panics
///  - If the selection is invalid in debug mode.
pub fn run_reader(solver: &mut dyn core::Solver, reader: &mut impl BufRead) -> Result<()> {
    let instance: core::Instance = data::deserialize(reader)?;
    run_instance(solver, &instance)
}

/// Runs the given solver on an instance and writes the selected task ids and the total weight to stdout.
///
/// # Errors
/// - If the solver fails.
/// - If the selection could not be written to stdout.
///
/// # Panics
///  - If the selection is invalid in debug mode.
pub fn run_instance(solver: &mut dyn core::Solver, instance: &core::Instance) -> Result<()> {
    let selection = solver.solve(instance)?;

    debug_assert!(selection.verify(), "Selection is invalid: {selection:?}");

    println!("{}", data::to_string(&selection.ids())?);
    println!("{}", selection.value());

    Ok(())
}
