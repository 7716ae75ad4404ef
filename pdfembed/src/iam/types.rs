// This file is part of the product PdfEmbed.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Implicit group containing every user, registered or not.
pub const ALL_GROUP: &str = "*";

/// Implicit group containing every registered user.
pub const REGISTERED_GROUP: &str = "user";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub name: String,
    pub groups: Vec<String>,
    pub registered: bool,
}

impl User {
    pub fn registered(name: &str, groups: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            groups,
            registered: true,
        }
    }

    pub fn unregistered(name: &str) -> Self {
        Self {
            name: name.to_string(),
            groups: Vec::new(),
            registered: false,
        }
    }

    /// Groups used for permission checks: the implicit groups plus the
    /// user's explicit ones, without duplicates.
    pub fn effective_groups(&self) -> Vec<String> {
        let mut groups = vec![ALL_GROUP.to_string()];
        if self.registered {
            groups.push(REGISTERED_GROUP.to_string());
        }
        for group in &self.groups {
            if !groups.contains(group) {
                groups.push(group.clone());
            }
        }
        groups
    }
}

/// On-disk shape of one user record in users.yaml.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct YamlUser {
    #[serde(default)]
    pub groups: Vec<String>,
}

impl YamlUser {
    pub fn into_user(self, name: &str) -> User {
        User::registered(name, self.groups)
    }
}

#[derive(Debug)]
pub enum IamError {
    ConfigurationError(String),
    FileError(String),
    ParseError(String),
}

impl std::fmt::Display for IamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IamError::ConfigurationError(msg) => write!(f, "IAM configuration error: {}", msg),
            IamError::FileError(msg) => write!(f, "IAM file error: {}", msg),
            IamError::ParseError(msg) => write!(f, "IAM parse error: {}", msg),
        }
    }
}

impl std::error::Error for IamError {}

pub type YamlUsersData = HashMap<String, YamlUser>;
pub type UsersData = HashMap<String, User>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_user_gets_implicit_groups() {
        let user = User::registered("Alice", vec!["sysop".to_string()]);
        assert_eq!(
            user.effective_groups(),
            vec!["*".to_string(), "user".to_string(), "sysop".to_string()]
        );
    }

    #[test]
    fn unregistered_user_only_gets_all_group() {
        let user = User::unregistered("10.0.0.1");
        assert_eq!(user.effective_groups(), vec!["*".to_string()]);
    }

    #[test]
    fn explicit_groups_are_not_duplicated() {
        let user = User::registered("Bob", vec!["user".to_string(), "sysop".to_string()]);
        assert_eq!(
            user.effective_groups(),
            vec!["*".to_string(), "user".to_string(), "sysop".to_string()]
        );
    }

    #[test]
    fn yaml_user_becomes_registered_user() {
        let yaml_user = YamlUser {
            groups: vec!["sysop".to_string()],
        };
        let user = yaml_user.into_user("Admin");
        assert_eq!(user.name, "Admin");
        assert!(user.registered);
        assert_eq!(user.groups, vec!["sysop".to_string()]);
    }
}
