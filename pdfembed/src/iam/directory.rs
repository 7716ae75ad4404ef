// This file is part of the product PdfEmbed.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::store::UserStore;
use super::types::{IamError, User, UsersData};
use crate::config::GroupPermissions;

/// Characters never valid inside a user name.
const ILLEGAL_NAME_CHARS: [char; 9] = ['#', '<', '>', '[', ']', '|', '{', '}', ':'];

/// Resolves user names to accounts and answers permission checks.
pub struct UserDirectory {
    users: UsersData,
    permissions: GroupPermissions,
}

impl UserDirectory {
    pub fn new(permissions: GroupPermissions) -> Self {
        Self {
            users: UsersData::new(),
            permissions,
        }
    }

    pub fn with_store(
        store: &dyn UserStore,
        permissions: GroupPermissions,
    ) -> Result<Self, IamError> {
        let users = store.load()?;
        log::debug!("Loaded {} registered users", users.len());
        Ok(Self { users, permissions })
    }

    /// Resolve a name to a user account. Unknown but well-formed names
    /// become unregistered users; malformed names resolve to nothing.
    pub fn user_from_name(&self, name: &str) -> Option<User> {
        let canonical = canonical_user_name(name)?;
        match self.users.get(&canonical) {
            Some(user) => Some(user.clone()),
            None => Some(User::unregistered(&canonical)),
        }
    }

    pub fn is_allowed(&self, user: &User, right: &str) -> bool {
        user.effective_groups()
            .iter()
            .any(|group| self.permissions.group_has_right(group, right))
    }
}

/// Canonical form of a user name: underscores become spaces, space runs
/// collapse, and the first letter is uppercased. Names with control
/// characters or reserved punctuation have no canonical form.
fn canonical_user_name(name: &str) -> Option<String> {
    let text = name.replace('_', " ");
    let text = text.trim();
    // Rejected before whitespace collapses: a control character inside
    // a name is malformed, not a separator.
    if text
        .chars()
        .any(|c| c.is_control() || ILLEGAL_NAME_CHARS.contains(&c))
    {
        return None;
    }
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        return None;
    }

    let mut chars = text.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().collect::<String>() + chars.as_str())
}
