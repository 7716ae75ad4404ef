// This file is part of the product PdfEmbed.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::collections::HashMap;

/// Interface-message lookup for user-facing text such as error boxes.
pub trait MessageCatalog: Send + Sync {
    /// Raw message text for a key, or the `⧼key⧽` placeholder when unknown.
    fn text(&self, key: &str) -> String;

    /// Message text with HTML metacharacters escaped.
    fn escaped(&self, key: &str) -> String {
        escape_html(&self.text(key))
    }
}

/// Catalog backed by message files compiled into the binary.
pub struct EmbeddedCatalog {
    messages: HashMap<String, String>,
}

impl EmbeddedCatalog {
    pub fn english() -> Self {
        Self::from_json(include_str!("i18n/en.json")).unwrap_or_else(|e| {
            log::error!("Failed to parse embedded message file: {}", e);
            Self {
                messages: HashMap::new(),
            }
        })
    }

    fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        let raw: HashMap<String, serde_json::Value> = serde_json::from_str(content)?;
        let messages = raw
            .into_iter()
            .filter(|(key, _)| !key.starts_with('@'))
            .filter_map(|(key, value)| match value {
                serde_json::Value::String(text) => Some((key, text)),
                _ => None,
            })
            .collect();
        Ok(Self { messages })
    }
}

impl MessageCatalog for EmbeddedCatalog {
    fn text(&self, key: &str) -> String {
        match self.messages.get(key) {
            Some(text) => text.clone(),
            None => {
                log::warn!("Unknown interface message key: {}", key);
                format!("\u{29FC}{}\u{29FD}", key)
            }
        }
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
