use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Plotly's default qualitative palette.
pub const DEFAULT_PALETTE: [&str; 10] = [
    "#636EFA", "#EF553B", "#00CC96", "#AB63FA", "#FFA15A", "#19D3F3", "#FF6692", "#B6E880",
    "#FF97FF", "#FECB52",
];

/// Root configuration structure, deserialized from `.import-timeline/config.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub files: FilesConfig,
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Where the scan and report steps read and write their files.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Tabular export written by `scan`, read by `report`.
    pub export: PathBuf,
    /// Library → category JSON mapping.
    pub categories: PathBuf,
    /// One enabled category per line.
    pub enabled: PathBuf,
    /// Directory receiving the rendered report.
    pub output_dir: PathBuf,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            export: PathBuf::from("git.csv"),
            categories: PathBuf::from("cat.json"),
            enabled: PathBuf::from("enabled_categories.txt"),
            output_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    pub api_url: String,
    pub timeout_secs: u64,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub title: String,
    /// Series colours, assigned by category first-appearance order and cycled.
    pub palette: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: "Usage of Libraries Over Time by Category".to_string(),
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Load the configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `<project_path>/.import-timeline/config.toml`
/// 3. `~/.config/import-timeline/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = project_path.join(".import-timeline").join("config.toml");
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home
            .join(".config")
            .join("import-timeline")
            .join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    if config.report.palette.is_empty() {
        config.report.palette = ReportConfig::default().palette;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[files]\nexport = \"scan.csv\"\n\n[report]\npalette = []\n",
        )
        .unwrap();

        let config = load_config(dir.path(), Some(path.as_path())).unwrap();
        assert_eq!(config.files.export, PathBuf::from("scan.csv"));
        assert_eq!(config.files.categories, PathBuf::from("cat.json"));
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.report.palette.len(), DEFAULT_PALETTE.len());
    }

    #[test]
    fn test_project_config_found() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join(".import-timeline")).unwrap();
        std::fs::write(
            dir.path().join(".import-timeline").join("config.toml"),
            "[github]\ntimeout_secs = 5\n",
        )
        .unwrap();

        let config = load_config(dir.path(), None).unwrap();
        assert_eq!(config.github.timeout_secs, 5);
    }

    #[test]
    fn test_invalid_config_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[files\n").unwrap();
        assert!(load_config(dir.path(), Some(path.as_path())).is_err());
    }
}
