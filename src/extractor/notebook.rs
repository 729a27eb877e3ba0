use serde::Deserialize;

use crate::error::DecodeError;

/// Extractor for Jupyter notebooks.
///
/// The sources of all `code` cells are joined in document order and scanned
/// with the script rule. Markdown and raw cells are ignored.
pub struct NotebookExtractor;

impl NotebookExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Deserialize)]
struct Notebook {
    cells: Vec<Cell>,
}

#[derive(Debug, Deserialize)]
struct Cell {
    cell_type: String,
    #[serde(default)]
    source: CellSource,
}

/// nbformat allows the cell source as one string or as a list of lines.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CellSource {
    Lines(Vec<String>),
    Text(String),
}

impl Default for CellSource {
    fn default() -> Self {
        CellSource::Lines(Vec::new())
    }
}

impl CellSource {
    fn text(&self) -> String {
        match self {
            CellSource::Lines(lines) => lines.join("\n"),
            CellSource::Text(text) => text.clone(),
        }
    }
}

impl super::Extractor for NotebookExtractor {
    fn extract(&self, file_name: &str, content: &str) -> Result<Vec<String>, DecodeError> {
        let code = code_cells(file_name, content)?;
        Ok(super::script::scan_source(&code))
    }
}

/// Decode a notebook and return the concatenated source of its code cells.
pub fn code_cells(file_name: &str, content: &str) -> Result<String, DecodeError> {
    let notebook: Notebook = serde_json::from_str(content).map_err(|source| DecodeError {
        file: file_name.to_string(),
        source,
    })?;

    let code = notebook
        .cells
        .iter()
        .filter(|cell| cell.cell_type == "code")
        .map(|cell| cell.source.text())
        .collect::<Vec<_>>()
        .join("\n");

    Ok(code)
}
