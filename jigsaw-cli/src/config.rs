use std::path::PathBuf;

use jigsaw_core::{DEFAULT_GRID, Grid};
use serde::Deserialize;
use tracing::warn;

use crate::error::CliError;

/// Environment variables checked for the fact-service key, in order.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub model: Option<String>,
    pub api_base: Option<String>,
    pub rows: Option<u32>,
    pub cols: Option<u32>,
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("jigsaw").join("config.toml"))
}

pub fn parse_config(text: &str) -> Result<Config, CliError> {
    Ok(toml::from_str(text)?)
}

pub fn load_config() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };

    let Ok(content) = std::fs::read_to_string(&path) else {
        return Config::default();
    };

    parse_config(&content).unwrap_or_else(|err| {
        warn!(path = %path.display(), %err, "ignoring unreadable config");
        Config::default()
    })
}

/// Environment first, then the config file. Empty values count as unset.
pub fn resolve_api_key<F>(env: F, config: &Config) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    API_KEY_VARS
        .iter()
        .filter_map(|var| env(*var))
        .chain(config.gemini_api_key.clone())
        .find(|key| !key.trim().is_empty())
}

/// Command-line values win over the config file, which wins over the default board.
pub fn resolve_grid(rows: Option<u32>, cols: Option<u32>, config: &Config) -> Result<Grid, CliError> {
    let rows = rows.or(config.rows).unwrap_or(DEFAULT_GRID.rows() as u32);
    let cols = cols.or(config.cols).unwrap_or(DEFAULT_GRID.cols() as u32);
    Ok(Grid::new(rows, cols)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_config() {
        let config = parse_config("gemini_api_key = \"abc\"\nrows = 5\n").unwrap();
        assert_eq!(config.gemini_api_key.as_deref(), Some("abc"));
        assert_eq!(config.rows, Some(5));
        assert_eq!(config.cols, None);
        assert!(parse_config("rows = \"five\"").is_err());
    }

    #[test]
    fn env_key_beats_config_key() {
        let config = Config {
            gemini_api_key: Some("from-file".into()),
            ..Config::default()
        };
        let env = |var: &str| (var == "API_KEY").then(|| "from-env".to_string());
        assert_eq!(resolve_api_key(env, &config).as_deref(), Some("from-env"));
        assert_eq!(resolve_api_key(|_| None, &config).as_deref(), Some("from-file"));
        let blank = |_: &str| Some("  ".to_string());
        assert_eq!(resolve_api_key(blank, &Config::default()), None);
    }

    #[test]
    fn grid_layers_cli_over_config_over_default() {
        let config = Config {
            rows: Some(6),
            cols: Some(5),
            ..Config::default()
        };
        assert_eq!(resolve_grid(None, None, &Config::default()).unwrap(), DEFAULT_GRID);
        assert_eq!(resolve_grid(None, None, &config).unwrap(), Grid::new(6, 5).unwrap());
        assert_eq!(resolve_grid(Some(2), None, &config).unwrap(), Grid::new(2, 5).unwrap());
        assert!(matches!(
            resolve_grid(Some(0), None, &config),
            Err(CliError::Grid(_))
        ));
    }
}
