//! Category store: the hand-edited library → category mapping and the list of
//! categories shown by default in the report.
//!
//! The mapping is a JSON object. A library mapped to `null` or `""` is
//! uncategorized and resolves to [`OTHER`].

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Category for libraries without a label.
pub const OTHER: &str = "Other";

#[derive(Debug, Default)]
pub struct CategoryStore {
    path: Option<PathBuf>,
    labels: BTreeMap<String, Option<String>>,
}

impl CategoryStore {
    /// Load the mapping from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let mut store = Self {
            path: Some(path.to_path_buf()),
            labels: BTreeMap::new(),
        };
        store.reload()?;
        Ok(store)
    }

    /// Load the mapping if the file exists, otherwise start empty at `path`.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self {
                path: Some(path.to_path_buf()),
                labels: BTreeMap::new(),
            })
        }
    }

    /// Build a store from in-memory pairs; `None` marks an uncategorized library.
    #[cfg(test)]
    pub fn from_labels<I, K>(labels: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<String>)>,
        K: Into<String>,
    {
        Self {
            path: None,
            labels: labels
                .into_iter()
                .map(|(k, v)| (k.into(), normalize_label(v)))
                .collect(),
        }
    }

    /// Re-read the backing file, picking up manual edits made since the last load.
    pub fn reload(&mut self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read category file {}", path.display()))?;
        let raw: BTreeMap<String, Option<String>> = serde_json::from_str(&content)
            .with_context(|| format!("Invalid category file {}", path.display()))?;

        self.labels = raw
            .into_iter()
            .map(|(k, v)| (k, normalize_label(v)))
            .collect();
        Ok(())
    }

    /// Category of `library`; [`OTHER`] when absent or uncategorized.
    pub fn lookup(&self, library: &str) -> &str {
        self.labels
            .get(library)
            .and_then(|label| label.as_deref())
            .unwrap_or(OTHER)
    }

    /// Every category label in the mapping, uncategorized entries counted as [`OTHER`].
    pub fn categories(&self) -> BTreeSet<&str> {
        self.labels
            .values()
            .map(|label| label.as_deref().unwrap_or(OTHER))
            .collect()
    }

    /// Add libraries that are not yet in the mapping as uncategorized.
    ///
    /// Existing labels are kept. Returns the number of libraries added.
    pub fn merge_libraries<'a>(&mut self, libraries: impl IntoIterator<Item = &'a str>) -> usize {
        let before = self.labels.len();
        for library in libraries {
            self.labels.entry(library.to_string()).or_insert(None);
        }
        self.labels.len() - before
    }

    /// Write the mapping back as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.labels)?;
        std::fs::write(path, json + "\n")
            .with_context(|| format!("Failed to write category file {}", path.display()))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

fn normalize_label(label: Option<String>) -> Option<String> {
    label
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
}

/// Ordered set of categories whose series are visible by default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnabledCategories {
    names: Vec<String>,
}

impl EnabledCategories {
    /// Read one category per line. Blank lines and repeats are dropped.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read enabled categories {}", path.display()))?;
        Ok(Self::from_names(content.lines()))
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let names = names
            .into_iter()
            .map(|n| n.as_ref().trim().to_string())
            .filter(|n| !n.is_empty() && seen.insert(n.clone()))
            .collect();
        Self { names }
    }

    pub fn contains(&self, category: &str) -> bool {
        self.names.iter().any(|n| n == category)
    }

    /// Names in file order.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}
