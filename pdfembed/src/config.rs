// This file is part of the product PdfEmbed.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::tags::pdf::EMBED_PDF_RIGHT;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug)]
pub enum ConfigError {
    LoadError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::LoadError(msg) => write!(f, "Configuration load error: {}", msg),
            ConfigError::ValidationError(msg) => {
                write!(f, "Configuration validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Display defaults applied when a tag omits the width or height attribute.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EmbedConfig {
    #[serde(default = "default_embed_width")]
    pub width: i64,
    #[serde(default = "default_embed_height")]
    pub height: i64,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            width: default_embed_width(),
            height: default_embed_height(),
        }
    }
}

fn default_embed_width() -> i64 {
    800
}

fn default_embed_height() -> i64 {
    1090
}

/// Raw permissions section: group name to the rights that group grants.
pub type GroupRightsData = HashMap<String, Vec<String>>;

fn default_group_rights() -> GroupRightsData {
    let mut rights = GroupRightsData::new();
    rights.insert("user".to_string(), vec![EMBED_PDF_RIGHT.to_string()]);
    rights.insert("sysop".to_string(), vec![EMBED_PDF_RIGHT.to_string()]);
    rights
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub app: AppConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub embed: EmbedConfig,
    #[serde(default = "default_group_rights")]
    pub permissions: GroupRightsData,
}

#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub app: AppConfig,
    pub logging: LoggingConfig,
    pub embed: EmbedConfig,
    pub permissions: GroupPermissions,
}

/// Validated group-to-rights mapping consulted on every permission check.
#[derive(Debug, Clone, Default)]
pub struct GroupPermissions {
    rights: GroupRightsData,
}

impl GroupPermissions {
    pub fn new(rights: GroupRightsData) -> Self {
        Self { rights }
    }

    pub fn group_has_right(&self, group: &str, right: &str) -> bool {
        self.rights
            .get(group)
            .is_some_and(|rights| rights.iter().any(|granted| granted == right))
    }

    /// Return a sorted list of the groups granting a given right.
    pub fn groups_granting(&self, right: &str) -> Vec<String> {
        let mut groups: Vec<String> = self
            .rights
            .iter()
            .filter(|(_, rights)| rights.iter().any(|granted| granted == right))
            .map(|(group, _)| group.clone())
            .collect();
        groups.sort();
        groups
    }
}

const VALID_LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

impl Config {
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let config_path = root.join("config.yaml");
        let config_content = fs::read_to_string(&config_path).map_err(|e| {
            ConfigError::LoadError(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;
        let config: Config = serde_yaml::from_str(&config_content).map_err(|e| {
            ConfigError::LoadError(format!(
                "Failed to parse config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;
        Ok(config)
    }

    /// Loads and validates configuration at startup. If validation fails, the host should not start.
    pub fn load_and_validate(root: &Path) -> Result<ValidatedConfig, ConfigError> {
        let config = Self::load(root)?;

        Self::validate_embed(&config.embed)?;
        Self::validate_logging(&config.logging)?;
        Self::validate_permissions(&config.permissions)?;

        let permissions = GroupPermissions::new(config.permissions);
        let granting = permissions.groups_granting(EMBED_PDF_RIGHT);
        if granting.is_empty() {
            log::warn!(
                "No group grants the '{}' right; every tag will render a permission error",
                EMBED_PDF_RIGHT
            );
        } else {
            log::debug!(
                "Groups granting '{}': {}",
                EMBED_PDF_RIGHT,
                granting.join(", ")
            );
        }

        Ok(ValidatedConfig {
            app: config.app,
            logging: config.logging,
            embed: config.embed,
            permissions,
        })
    }

    fn validate_embed(embed: &EmbedConfig) -> Result<(), ConfigError> {
        if !(1..=10000).contains(&embed.width) {
            return Err(ConfigError::ValidationError(format!(
                "embed.width must be between 1 and 10000, got: {}",
                embed.width
            )));
        }
        if !(1..=10000).contains(&embed.height) {
            return Err(ConfigError::ValidationError(format!(
                "embed.height must be between 1 and 10000, got: {}",
                embed.height
            )));
        }
        Ok(())
    }

    fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
        let level = logging.level.to_lowercase();
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of {:?}, got: {}",
                VALID_LOG_LEVELS, logging.level
            )));
        }
        Ok(())
    }

    fn validate_permissions(permissions: &GroupRightsData) -> Result<(), ConfigError> {
        for (group, rights) in permissions {
            if group.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "permissions group names cannot be empty".to_string(),
                ));
            }
            for right in rights {
                if right.trim().is_empty() {
                    return Err(ConfigError::ValidationError(format!(
                        "permissions for group '{}' contain an empty right name",
                        group
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
pub fn test_validated_config() -> ValidatedConfig {
    ValidatedConfig {
        app: AppConfig {
            name: "Test Wiki".to_string(),
            description: "Test wiki instance".to_string(),
        },
        logging: LoggingConfig::default(),
        embed: EmbedConfig::default(),
        permissions: GroupPermissions::new(default_group_rights()),
    }
}
