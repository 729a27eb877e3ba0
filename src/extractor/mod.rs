//! Import extraction from raw file content.
//!
//! - [`script`] — anchored-line matching of `import x` / `from x import y`.
//! - [`notebook`] — decodes a notebook and applies the script rule to its code cells.
//! - [`requirements`] — turns dependency-list entries into synthetic `import name` statements.
//!
//! Matching is purely textual: multi-line, indented, and conditional imports are
//! not seen. Content is never executed.

use crate::error::DecodeError;
use crate::models::FileKind;

pub mod notebook;
pub mod requirements;
pub mod script;

pub trait Extractor {
    /// Return the raw import statements found in `content`, in document order.
    fn extract(&self, file_name: &str, content: &str) -> Result<Vec<String>, DecodeError>;
}

/// Dispatch to the extractor for `kind`.
pub fn extract_imports(
    kind: FileKind,
    file_name: &str,
    content: &str,
) -> Result<Vec<String>, DecodeError> {
    match kind {
        FileKind::Script => script::ScriptExtractor::new().extract(file_name, content),
        FileKind::Notebook => notebook::NotebookExtractor::new().extract(file_name, content),
        FileKind::DependencyList => {
            requirements::RequirementsExtractor::new().extract(file_name, content)
        }
    }
}
