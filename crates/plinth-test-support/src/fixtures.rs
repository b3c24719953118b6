//! Test fixtures and environment helpers.

use std::io;

use tempfile::TempDir;

/// Create a temporary data directory for a settings store under test.
///
/// The directory and everything inside it is removed on drop.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn temp_data_dir() -> io::Result<TempDir> {
    tempfile::tempdir()
}
