//! Report defaults for `ut`.
//!
//! Settings come from, in increasing precedence: built-in defaults,
//! `~/.config/ut/config.toml`, the file named by `--config`, and `UT_*`
//! environment variables (`UT_FORMAT=json`, `UT_MAX_RESULTS=5`). Command-line
//! flags on `ut stats` override all of these for a single run.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use ut_core::{GroupBy, OutputFormat};

/// Defaults applied to every report unless a flag overrides them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Interval store to read. Must already exist; reports never create it.
    pub database_path: PathBuf,
    /// Rows kept after sorting by running time. Percentages are computed
    /// before the cap, so a capped report need not sum to 100.
    pub max_results: usize,
    /// Character limit for names in `pretty` and `simple` output. JSON always
    /// carries the full name.
    pub max_name_length: usize,
    /// `pretty`, `simple` or `json`. Anything else fails at load time.
    pub format: OutputFormat,
    /// Group by application `name` or by `window` title.
    pub group_by: GroupBy,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("ut.db"),
            max_results: 20,
            max_name_length: 50,
            format: OutputFormat::Pretty,
            group_by: GroupBy::Name,
        }
    }
}

impl Config {
    /// Merges the config layers, with `config_path` above the default file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // UT_MAX_NAME_LENGTH maps to max_name_length
        figment = figment.merge(Env::prefixed("UT_"));

        figment.extract()
    }
}

/// Directory holding the user-level `config.toml`.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("ut"))
}

/// Default home of `ut.db`; `~/.local/share/ut` on Linux.
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("ut"))
}
