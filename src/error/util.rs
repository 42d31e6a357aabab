//! Utility functions for error handling
//!
//! This module provides utility functions to make error handling more convenient.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{DashboardError, Result};

/// Safely open a file with rich error information
///
/// This function attempts to open a file and provides detailed
/// error information if the operation fails.
///
/// # Arguments
/// * `path` - The path to the file to open
/// * `purpose` - Why the file is being opened (for error context)
///
/// # Returns
/// * `Result<fs::File>` - The opened file or a detailed error
pub fn safe_open_file(path: &Path, purpose: &str) -> Result<fs::File> {
    if !path.exists() {
        return Err(DashboardError::io(
            format!("File not found, needed for: {purpose}"),
            path,
        ));
    }

    if !path.is_file() {
        return Err(DashboardError::io(
            format!("Path is not a file, expected a file for: {purpose}"),
            path,
        ));
    }

    match fs::File::open(path) {
        Ok(file) => Ok(file),
        Err(e) => {
            // Provide different error messages based on the error kind
            let context = match e.kind() {
                io::ErrorKind::PermissionDenied => {
                    "Permission denied - check file permissions".to_string()
                }
                io::ErrorKind::NotFound => {
                    "File not found - it may have been deleted during operation".to_string()
                }
                _ => format!("Failed to open file for: {purpose}"),
            };

            Err(DashboardError::io_with_source(context, path, e))
        }
    }
}

/// Rewind an opened file, keeping the path in the error
pub fn rewind_file(file: &mut fs::File, path: &Path) -> Result<()> {
    io::Seek::rewind(file)
        .map_err(|e| DashboardError::io_with_source("Failed to rewind file", path, e))
}
