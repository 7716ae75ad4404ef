// This file is part of the product PdfEmbed.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

/// Namespace prefixes that all resolve to the file repository.
const FILE_NAMESPACE_PREFIXES: [&str; 3] = ["file:", "image:", "media:"];

/// Characters never valid inside a file title.
const ILLEGAL_TITLE_CHARS: [char; 8] = ['#', '<', '>', '[', ']', '|', '{', '}'];

/// Canonical title of a file page, without its namespace prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileTitle {
    text: String,
}

impl FileTitle {
    /// Parse free text into a canonical file title. Underscores become
    /// spaces, space runs collapse, an optional leading colon and file
    /// namespace prefix are stripped, and the first letter is uppercased.
    /// Control characters and reserved punctuation reject the whole name.
    pub fn from_text(raw: &str) -> Option<Self> {
        let text = raw.replace('_', " ");
        let mut text = text.trim();
        // Rejected before whitespace collapses: a tab or newline inside
        // the name is malformed, not a separator.
        if text
            .chars()
            .any(|c| c.is_control() || ILLEGAL_TITLE_CHARS.contains(&c))
        {
            return None;
        }
        text = text.strip_prefix(':').unwrap_or(text).trim_start();

        for prefix in FILE_NAMESPACE_PREFIXES {
            let matches_prefix = text
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix));
            if matches_prefix {
                text = text[prefix.len()..].trim_start();
                break;
            }
        }

        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if text.is_empty() {
            return None;
        }

        let mut chars = text.chars();
        let first = chars.next()?;
        let text = first.to_uppercase().collect::<String>() + chars.as_str();
        Some(Self { text })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Storage key form of the title, with spaces as underscores.
    pub fn db_key(&self) -> String {
        self.text.replace(' ', "_")
    }
}
