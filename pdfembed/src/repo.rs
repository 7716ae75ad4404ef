// This file is part of the product PdfEmbed.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::title::FileTitle;
use std::collections::HashMap;

/// A file found in the repository, with the URL it is served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoFile {
    title: FileTitle,
    url: String,
}

impl RepoFile {
    pub fn new(title: FileTitle, url: String) -> Self {
        Self { title, url }
    }

    pub fn title(&self) -> &FileTitle {
        &self.title
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Lookup into the wiki's uploaded-file repository.
pub trait FileRepo: Send + Sync {
    fn find(&self, title: &FileTitle) -> Option<RepoFile>;
}

/// File repository held in memory, keyed by storage key.
#[derive(Debug, Default)]
pub struct MemoryFileRepo {
    files: HashMap<String, String>,
}

impl MemoryFileRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, url: &str) {
        match FileTitle::from_text(name) {
            Some(title) => {
                self.files.insert(title.db_key(), url.to_string());
            }
            None => {
                log::warn!("Skipping repository entry with invalid file name: {}", name);
            }
        }
    }

    pub fn with_files(entries: &[(&str, &str)]) -> Self {
        let mut repo = Self::new();
        for (name, url) in entries {
            repo.insert(name, url);
        }
        repo
    }
}

impl FileRepo for MemoryFileRepo {
    fn find(&self, title: &FileTitle) -> Option<RepoFile> {
        self.files
            .get(&title.db_key())
            .map(|url| RepoFile::new(title.clone(), url.clone()))
    }
}
