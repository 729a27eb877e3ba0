use std::sync::LazyLock;

use regex::Regex;

use crate::error::DecodeError;

/// `name[extras]<version-spec>` — only the name is kept.
static REQUIREMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9][A-Za-z0-9_.\-]*)\s*(\[[^\]]*\])?\s*([=<>!~]=?.*)?")
        .expect("valid regex")
});

/// Extractor for `requirements.txt`.
///
/// Each entry becomes a synthetic `import <name>` statement so dependency
/// files flow through the same transformer as source files. Comments, option
/// lines (`-r`, `-e`, `--index-url`) and anything not starting with a package
/// name are skipped.
pub struct RequirementsExtractor;

impl RequirementsExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl super::Extractor for RequirementsExtractor {
    fn extract(&self, _file_name: &str, content: &str) -> Result<Vec<String>, DecodeError> {
        let imports = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| REQUIREMENT_RE.captures(line))
            .map(|caps| format!("import {}", &caps[1]))
            .collect();
        Ok(imports)
    }
}
