use std::sync::LazyLock;

use regex::Regex;

use crate::error::DecodeError;

static IMPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^import\s+[\w.]+").expect("valid regex"));
static FROM_IMPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^from\s+[\w.]+\s+import\s+[\w.*]+").expect("valid regex"));

/// Extractor for Python source files.
///
/// Captures the matched prefix of every line that starts (at column 0) with
/// `import <dotted.path>` or `from <dotted.path> import <name>`.
pub struct ScriptExtractor;

impl ScriptExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl super::Extractor for ScriptExtractor {
    fn extract(&self, _file_name: &str, content: &str) -> Result<Vec<String>, DecodeError> {
        Ok(scan_source(content))
    }
}

/// Apply the line rule to a block of source text.
pub fn scan_source(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| {
            IMPORT_RE
                .find(line)
                .or_else(|| FROM_IMPORT_RE.find(line))
                .map(|m| m.as_str().to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_source() {
        let src = "import pandas as pd\nfrom sklearn.linear_model import LinearRegression\n# comment";
        assert_eq!(
            scan_source(src),
            vec![
                "import pandas",
                "from sklearn.linear_model import LinearRegression"
            ]
        );
    }

    #[test]
    fn test_keeps_line_order() {
        let src = "from os import path\nimport sys\nfrom a.b import *\n";
        assert_eq!(
            scan_source(src),
            vec!["from os import path", "import sys", "from a.b import *"]
        );
    }

    #[test]
    fn test_ignores_indented_and_embedded_imports() {
        let src = "def f():\n    import json\nx = 'import re'\n#import abc\nimportlib = 1\n";
        assert!(scan_source(src).is_empty());
    }

    #[test]
    fn test_windows_line_endings() {
        assert_eq!(scan_source("import requests\r\nimport yaml\r\n").len(), 2);
    }
}
