/*
 * This file is a part of Arbor.
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 *
*/

//! YAML configuration for the `arbord` binary. The engine itself
//! ([`crate::tree::Tree`]) takes no config of its own beyond the single
//! `max_name_len` bound — everything else here is shell/logging plumbing.

use serde::Deserialize;
use std::env::VarError;
use std::fs;

/// The `arbord` configuration file's shape.
#[derive(Deserialize, Debug, PartialEq, Clone, Default)]
pub struct Config {
    /// Upper bound on a single path component's length. Defaults to
    /// [`crate::path::DEFAULT_MAX_NAME`] when absent.
    pub max_name_len: Option<usize>,
    /// The `env_logger` filter string, e.g. `"info"` or `"arbor=debug"`.
    pub log: Option<String>,
}

impl Config {
    pub fn max_name_len(&self) -> usize {
        self.max_name_len.unwrap_or(crate::path::DEFAULT_MAX_NAME)
    }

    pub fn log_filter(&self) -> &str {
        self.log.as_deref().unwrap_or("info")
    }
}

/// Whether the running configuration came from a file the operator supplied,
/// or is entirely defaults — mirrors the distinction `arbord` prints on
/// startup.
pub enum ConfigType {
    Custom(Config),
    Def(Config),
}

impl ConfigType {
    pub fn into_inner(self) -> Config {
        match self {
            Self::Custom(c) | Self::Def(c) => c,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

/// Reads the path named by the `ARBORD_CONFIG` environment variable, if set.
/// With no variable set, returns the all-defaults configuration.
pub fn get_config_file_or_return_cfg() -> Result<ConfigType, String> {
    match std::env::var("ARBORD_CONFIG") {
        Ok(path) => {
            let raw = fs::read_to_string(&path)
                .map_err(|e| format!("failed to read config file '{path}': {e}"))?;
            let cfg: Config = serde_yaml::from_str(&raw)
                .map_err(|e| format!("failed to parse config file '{path}': {e}"))?;
            Ok(ConfigType::Custom(cfg))
        }
        Err(VarError::NotPresent) => Ok(ConfigType::Def(Config::default())),
        Err(VarError::NotUnicode(_)) => Err("ARBORD_CONFIG is not valid unicode".to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_fields_absent() {
        let cfg = Config::default();
        assert_eq!(cfg.max_name_len(), crate::path::DEFAULT_MAX_NAME);
        assert_eq!(cfg.log_filter(), "info");
    }

    #[test]
    fn parses_a_minimal_yaml_document() {
        let cfg: Config = serde_yaml::from_str("max_name_len: 32\nlog: debug\n").unwrap();
        assert_eq!(cfg.max_name_len(), 32);
        assert_eq!(cfg.log_filter(), "debug");
    }
}
