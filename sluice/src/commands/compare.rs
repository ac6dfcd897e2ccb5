// sluice/src/commands/compare.rs
//
// USE CASE: cell-by-cell diff of two CSV files. Exit code 1 when they differ.

use std::path::PathBuf;

use sluice_core::application::compare_files;

/// Returns `true` when both files hold the same records.
pub fn execute(file1: PathBuf, file2: PathBuf) -> anyhow::Result<bool> {
    let comparison = compare_files(&file1, &file2)?;
    println!("{}", comparison);

    if comparison.left_rows != comparison.right_rows {
        println!(
            "⚠️  Row counts differ: {} (file1) vs {} (file2)",
            comparison.left_rows, comparison.right_rows
        );
    }
    Ok(comparison.is_identical())
}
