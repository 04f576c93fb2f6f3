//! User settings for parcelsim, read from `settings.toml`.
use crate::format::NumberLocale;
use crate::get_parcelsim_config_dir;
use crate::input::read_toml;
use crate::log::DEFAULT_LOG_LEVEL;
use anyhow::Result;
use documented::DocumentedFields;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const SETTINGS_FILE_NAME: &str = "settings.toml";

const DEFAULT_SETTINGS_FILE_HEADER: &str = "# parcelsim settings
# Uncomment a line to override its default. `parcelsim settings show` prints what is in effect.
";

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

/// Location of `settings.toml` in the user's config folder
pub fn get_settings_file_path() -> PathBuf {
    get_parcelsim_config_dir().join(SETTINGS_FILE_NAME)
}

/// User preferences which apply to every command
#[derive(Debug, DocumentedFields, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Log level used unless `PARCELSIM_LOG_LEVEL` is set
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// How to display numbers ("es" or "en")
    #[serde(default)]
    pub locale: NumberLocale,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            locale: NumberLocale::default(),
        }
    }
}

impl Settings {
    /// Load the user's settings, falling back to defaults when there is no settings file
    pub fn load() -> Result<Settings> {
        Self::load_from_path(&get_settings_file_path())
    }

    /// Load settings from `file_path`; a missing file gives the defaults and fields left out of
    /// the file take their default values
    pub(crate) fn load_from_path(file_path: &Path) -> Result<Settings> {
        if file_path.is_file() {
            read_toml(file_path)
        } else {
            Ok(Settings::default())
        }
    }

    /// A settings file listing every field with its documentation and default, all commented out
    pub fn default_file_contents() -> String {
        let defaults = toml::Table::try_from(Settings::default())
            .expect("Settings should serialise to a TOML table");

        let mut out = DEFAULT_SETTINGS_FILE_HEADER.to_string();
        for (field, value) in &defaults {
            let docs = Settings::get_field_docs(field).expect("Settings field has no doc comment");
            out.push('\n');
            for doc_line in docs.lines() {
                out.push_str(&format!("# # {}\n", doc_line.trim()));
            }
            out.push_str(&format!("# {field} = {value}\n"));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_settings_load_from_path_no_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join(SETTINGS_FILE_NAME); // NB: doesn't exist
        assert_eq!(
            Settings::load_from_path(&file_path).unwrap(),
            Settings::default()
        );
    }

    #[test]
    fn test_settings_load_from_path() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join(SETTINGS_FILE_NAME);

        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "log_level = \"warn\"").unwrap();
            writeln!(file, "locale = \"en\"").unwrap();
        }

        assert_eq!(
            Settings::load_from_path(&file_path).unwrap(),
            Settings {
                log_level: "warn".to_string(),
                locale: NumberLocale::En,
            }
        );
    }

    #[test]
    fn test_settings_invalid_locale() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join(SETTINGS_FILE_NAME);

        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "locale = \"fr\"").unwrap();
        }

        assert!(Settings::load_from_path(&file_path).is_err());
    }

    #[test]
    fn test_default_file_contents() {
        let contents = Settings::default_file_contents();
        assert!(contents.contains("# log_level = \"info\""));
        assert!(contents.contains("# locale = \"es\""));
    }

    #[test]
    fn test_default_file_contents_uncommented() {
        let uncommented = Settings::default_file_contents()
            .lines()
            .filter_map(|line| line.strip_prefix("# "))
            .filter(|line| !line.starts_with('#') && line.contains(" = "))
            .collect::<Vec<_>>()
            .join("\n");
        let settings: Settings = toml::from_str(&uncommented).unwrap();
        assert_eq!(settings, Settings::default());
    }
}
