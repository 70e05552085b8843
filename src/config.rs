//! TOML configuration for extraction and traversal.
//!
//! Every table and key is optional; omitted values fall back to the same
//! defaults as [`Config::default`]. Unknown keys are rejected so that typos
//! surface as parse errors instead of being silently ignored.
//!
//! ```toml
//! [extract]
//! temp_prefix = "treecode-"
//! max_entries = 100000
//! temp_root = "/var/tmp"
//!
//! [walk]
//! follow_links = false
//! max_depth = 64
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use treecode_extract::ExtractOptions;
use treecode_extract::scoped::DEFAULT_TEMP_PREFIX;

use crate::walk::WalkOptions;

/// Errors arising while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration {}: {source}", .path.display())]
    Read {
        /// The configuration file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The configuration is not valid TOML or has unexpected keys.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Temporary directory and archive limits.
    pub extract: ExtractConfig,
    /// Tree traversal settings.
    pub walk: WalkConfig,
}

impl Config {
    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML, mistyped values, or
    /// unknown keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use treecode::Config;
    ///
    /// let config = Config::from_toml_str("[walk]\nmax_depth = 8\n").expect("valid config");
    /// assert_eq!(config.walk.max_depth, Some(8));
    /// assert_eq!(config.extract.temp_prefix, "treecode-");
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read and
    /// [`ConfigError::Parse`] when its content is invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Options for scoped extraction.
    #[must_use]
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            temp_prefix: self.extract.temp_prefix.clone(),
            temp_root: self.extract.temp_root.clone(),
            max_entries: self.extract.max_entries,
        }
    }

    /// Options for tree traversal.
    #[must_use]
    pub const fn walk_options(&self) -> WalkOptions {
        WalkOptions {
            follow_links: self.walk.follow_links,
            max_depth: self.walk.max_depth,
        }
    }
}

/// The `[extract]` table.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractConfig {
    /// Prefix for temporary extraction directories.
    #[serde(default = "ExtractConfig::default_temp_prefix")]
    pub temp_prefix: String,
    /// Upper bound on archive members.
    pub max_entries: Option<usize>,
    /// Parent directory for temporary extraction directories.
    pub temp_root: Option<PathBuf>,
}

impl ExtractConfig {
    fn default_temp_prefix() -> String {
        DEFAULT_TEMP_PREFIX.to_owned()
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            temp_prefix: Self::default_temp_prefix(),
            max_entries: None,
            temp_root: None,
        }
    }
}

/// The `[walk]` table.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct WalkConfig {
    /// Descend through symbolic links to directories.
    pub follow_links: bool,
    /// Maximum traversal depth below the root.
    pub max_depth: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    fn defaults_match_the_component_defaults() {
        let config = Config::default();

        assert_eq!(config.extract_options(), ExtractOptions::default());
        assert_eq!(config.walk_options(), WalkOptions::default());
    }

    #[rstest]
    fn empty_source_yields_defaults() {
        let config = Config::from_toml_str("").expect("empty config parses");
        assert_eq!(config, Config::default());
    }

    #[rstest]
    fn deserialises_overrides_from_toml() {
        let source = concat!(
            "[extract]\n",
            "temp_prefix = \"pkg-\"\n",
            "max_entries = 500\n",
            "temp_root = \"/var/tmp\"\n",
            "[walk]\n",
            "follow_links = true\n",
            "max_depth = 12\n",
        );

        let config = Config::from_toml_str(source).expect("overrides parse");

        let extract = config.extract_options();
        assert_eq!(extract.temp_prefix, "pkg-");
        assert_eq!(extract.max_entries, Some(500));
        assert_eq!(extract.temp_root, Some(PathBuf::from("/var/tmp")));
        let walk = config.walk_options();
        assert!(walk.follow_links);
        assert_eq!(walk.max_depth, Some(12));
    }

    #[rstest]
    fn partial_table_keeps_other_defaults() {
        let config = Config::from_toml_str("[extract]\nmax_entries = 3\n").expect("parses");

        assert_eq!(config.extract.temp_prefix, DEFAULT_TEMP_PREFIX);
        assert_eq!(config.extract.max_entries, Some(3));
        assert_eq!(config.walk, WalkConfig::default());
    }

    #[rstest]
    #[case::unknown_top_level("unexpected = true\n")]
    #[case::unknown_nested("[walk]\nfollow = true\n")]
    #[case::wrong_type("[extract]\nmax_entries = \"lots\"\n")]
    #[case::negative_depth("[walk]\nmax_depth = -1\n")]
    fn rejects_invalid_sources(#[case] source: &str) {
        let outcome = Config::from_toml_str(source);
        assert!(matches!(outcome, Err(ConfigError::Parse(_))));
    }

    #[rstest]
    fn load_reads_the_file() {
        let dir = TempDir::new().expect("temp dir creation succeeds");
        let path = dir.path().join("treecode.toml");
        fs::write(&path, "[walk]\nmax_depth = 2\n").expect("write config");

        let config = Config::load(&path).expect("config loads");

        assert_eq!(config.walk.max_depth, Some(2));
    }

    #[rstest]
    fn load_reports_missing_files() {
        let outcome = Config::load(Path::new("/definitely/not/treecode.toml"));
        assert!(matches!(outcome, Err(ConfigError::Read { .. })));
    }
}
