use crate::models::FileKind;

/// Recognize the file kinds the scanner extracts imports from.
///
/// Returns `None` for everything else; the walker ignores those files.
pub fn detect_file_kind(name: &str) -> Option<FileKind> {
    if name == "requirements.txt" {
        Some(FileKind::DependencyList)
    } else if name.ends_with(".ipynb") {
        Some(FileKind::Notebook)
    } else if name.ends_with(".py") {
        Some(FileKind::Script)
    } else {
        None
    }
}
