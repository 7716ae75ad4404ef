// This file is part of the product PdfEmbed.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

#![allow(dead_code)]

use pdfembed::config::{Config, ValidatedConfig};
use pdfembed::iam::{FileUserStore, User, UserDirectory};
use pdfembed::messages::EmbeddedCatalog;
use pdfembed::parser::frame::{FrameExpander, TemplateFrame};
use pdfembed::parser::{
    ParserOutput, RequestInfo, TagContext, TagRegistry, create_default_registry_with_config,
};
use pdfembed::repo::MemoryFileRepo;
use pdfembed::templates::MiniJinjaEngine;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

/// Registered author with no extra groups; allowed through the `user` grant.
pub const AUTHOR_NAME: &str = "Alice";

/// Registered sysop.
pub const SYSOP_NAME: &str = "Admin";

/// Name with no account; resolves to an unregistered user.
pub const VISITOR_NAME: &str = "Visitor";

pub const SAMPLE_URL: &str = "https://wiki.example/files/Sample.pdf";
pub const REPORT_URL: &str = "https://wiki.example/files/Annual_report_2025.pdf";

pub struct TestHarness {
    pub root: TempDir,
    pub config: ValidatedConfig,
    pub directory: UserDirectory,
    pub repo: MemoryFileRepo,
    pub registry: TagRegistry,
    pub messages: EmbeddedCatalog,
    pub expander: FrameExpander,
    pub frame: TemplateFrame,
    pub output: ParserOutput,
    pub revision_author: Option<String>,
}

impl TestHarness {
    pub fn new() -> Self {
        let root = TempDir::new().expect("fixture root");
        seed_config_file(&root);
        seed_users_file(&root);

        let config = Config::load_and_validate(root.path()).expect("validated config");
        let store = FileUserStore::new(root.path().join("users.yaml")).expect("user store");
        let directory =
            UserDirectory::with_store(&store, config.permissions.clone()).expect("directory");
        let repo = MemoryFileRepo::with_files(&[
            ("Sample.pdf", SAMPLE_URL),
            ("Annual report 2025.pdf", REPORT_URL),
        ]);
        let registry =
            create_default_registry_with_config(&config, Arc::new(MiniJinjaEngine::new()));

        Self {
            root,
            config,
            directory,
            repo,
            registry,
            messages: EmbeddedCatalog::english(),
            expander: FrameExpander::new(),
            frame: TemplateFrame::new(),
            output: ParserOutput::new(),
            revision_author: Some(AUTHOR_NAME.to_string()),
        }
    }

    pub fn context<'a>(&'a self, request: &'a RequestInfo) -> TagContext<'a> {
        TagContext {
            frame: &self.frame,
            request,
            revision_author: self.revision_author.as_deref(),
            directory: &self.directory,
            repo: &self.repo,
            messages: &self.messages,
            expander: &self.expander,
            output: &self.output,
        }
    }

    pub fn user(&self, name: &str) -> User {
        self.directory.user_from_name(name).expect("known user name")
    }
}

/// Request for an ordinary page view: no action-based actor override.
pub fn view_request() -> RequestInfo {
    RequestInfo {
        action: Some("view".to_string()),
        user: None,
    }
}

/// Request for a page being edited by the given user.
pub fn edit_request(user: Option<User>) -> RequestInfo {
    RequestInfo {
        action: Some("edit".to_string()),
        user,
    }
}

fn seed_config_file(root: &TempDir) {
    let content = r#"app:
  name: "Test Wiki"
  description: "Wiki instance driven by the integration suite"
embed:
  width: 800
  height: 600
"#;
    fs::write(root.path().join("config.yaml"), content).expect("write config.yaml");
}

fn seed_users_file(root: &TempDir) {
    let content = r#"Alice:
  groups: []
Admin:
  groups:
    - sysop
"#;
    fs::write(root.path().join("users.yaml"), content).expect("write users.yaml");
}
