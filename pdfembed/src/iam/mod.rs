// This file is part of the product PdfEmbed.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

mod directory;
mod store;
mod types;

pub use directory::UserDirectory;
#[cfg(test)]
pub use store::MemoryUserStore;
pub use store::{FileUserStore, UserStore};
pub use types::{IamError, User, UsersData};
