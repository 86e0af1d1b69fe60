//! Error conversion helpers for document I/O
//!
//! Extension traits attaching path context to `io::Result` and JSON results.

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    ///
    /// # Example
    /// ```ignore
    /// fs.write(&output, &document)
    ///     .with_path_context("write document", &output)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;

    /// Like `with_path_context`, but a missing file becomes `InputNotFound`.
    fn with_input_context(self, path: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, path.display()),
            source: Box::new(e),
        })
    }

    fn with_input_context(self, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ApplicationError::InputNotFound(path.to_path_buf()),
            _ => ApplicationError::OperationFailed {
                context: format!("read input: {}", path.display()),
                source: Box::new(e),
            },
        })
    }
}
