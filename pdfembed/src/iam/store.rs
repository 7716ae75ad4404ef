// This file is part of the product PdfEmbed.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::types::{IamError, UsersData, YamlUsersData};
use std::fs;
use std::path::PathBuf;

/// Source of registered user accounts.
pub trait UserStore: Send + Sync {
    fn load(&self) -> Result<UsersData, IamError>;
}

/// User store backed by a YAML file mapping user names to their groups.
pub struct FileUserStore {
    users_file: PathBuf,
}

impl FileUserStore {
    pub fn new(users_file: PathBuf) -> Result<Self, IamError> {
        if users_file.as_os_str().is_empty() {
            return Err(IamError::ConfigurationError(
                "Users file path cannot be empty".to_string(),
            ));
        }
        Ok(Self { users_file })
    }

    fn parse_users(&self, content: &str) -> Result<UsersData, IamError> {
        let yaml_users: YamlUsersData = serde_yaml::from_str(content).map_err(|e| {
            IamError::ParseError(format!(
                "Failed to parse users file '{}': {}",
                self.users_file.display(),
                e
            ))
        })?;
        Ok(yaml_users
            .into_iter()
            .map(|(name, yaml_user)| {
                let user = yaml_user.into_user(&name);
                (name, user)
            })
            .collect())
    }
}

impl UserStore for FileUserStore {
    fn load(&self) -> Result<UsersData, IamError> {
        let content = fs::read_to_string(&self.users_file).map_err(|e| {
            IamError::FileError(format!(
                "Failed to read users file '{}': {}",
                self.users_file.display(),
                e
            ))
        })?;
        self.parse_users(&content)
    }
}

/// In-memory user store for tests.
#[cfg(test)]
pub struct MemoryUserStore {
    users: UsersData,
}

#[cfg(test)]
impl MemoryUserStore {
    pub fn from_users(users: Vec<super::types::User>) -> Self {
        Self {
            users: users
                .into_iter()
                .map(|user| (user.name.clone(), user))
                .collect(),
        }
    }
}

#[cfg(test)]
impl UserStore for MemoryUserStore {
    fn load(&self) -> Result<UsersData, IamError> {
        Ok(self.users.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn new_rejects_empty_path() {
        assert!(matches!(
            FileUserStore::new(PathBuf::new()),
            Err(IamError::ConfigurationError(_))
        ));
    }

    #[test]
    fn load_reads_users_from_yaml_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let users_file = temp.path().join("users.yaml");
        fs::write(
            &users_file,
            "Alice:\n  groups: []\nAdmin:\n  groups:\n    - sysop\n",
        )
        .expect("write users file");

        let store = FileUserStore::new(users_file).expect("store");
        let users = store.load().expect("load users");
        assert_eq!(users.len(), 2);
        assert!(users["Alice"].groups.is_empty());
        assert!(users["Alice"].registered);
        assert_eq!(users["Admin"].groups, vec!["sysop".to_string()]);
    }

    #[test]
    fn load_reports_missing_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = FileUserStore::new(temp.path().join("users.yaml")).expect("store");
        let err = store.load().expect_err("missing file should fail");
        assert!(matches!(err, IamError::FileError(_)));
    }

    #[test]
    fn load_reports_malformed_yaml() {
        let temp = tempfile::tempdir().expect("tempdir");
        let users_file = temp.path().join("users.yaml");
        fs::write(&users_file, "Alice: [unbalanced\n").expect("write users file");

        let store = FileUserStore::new(users_file).expect("store");
        let err = store.load().expect_err("malformed file should fail");
        assert!(matches!(err, IamError::ParseError(_)));
    }

    #[test]
    fn memory_store_returns_seeded_users() {
        use super::super::types::User;

        let store = MemoryUserStore::from_users(vec![
            User::registered("Alice", vec![]),
            User::registered("Admin", vec!["sysop".to_string()]),
        ]);
        let users = store.load().expect("load users");
        assert_eq!(users.len(), 2);
        assert_eq!(users["Admin"].groups, vec!["sysop".to_string()]);
    }
}
