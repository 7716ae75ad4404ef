// This file is part of the product PdfEmbed.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::ValidatedConfig;
use crate::iam::{User, UserDirectory};
use crate::messages::MessageCatalog;
use crate::repo::FileRepo;
use crate::tags::pdf;
use crate::templates::TemplateEngine;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

mod attributes;
pub mod frame;

use frame::{MarkupExpander, TemplateFrame};

// Type alias for complex tag handler function
type TagHandler =
    Box<dyn Fn(&ParsedTag, &TagContext<'_>) -> Result<String, String> + Send + Sync>;

struct TagMetadata {
    handler: TagHandler,
    is_dynamic: bool,
}

/// Represents one parsed tag occurrence with its attributes and body
#[derive(Debug, Clone)]
pub struct ParsedTag {
    pub name: String,
    pub attributes: HashMap<String, String>,
    pub body: String,
}

/// Request state a handler may consult: the action query value and the
/// authenticated user, when there is one.
#[derive(Debug, Clone, Default)]
pub struct RequestInfo {
    pub action: Option<String>,
    pub user: Option<User>,
}

pub struct TagContext<'a> {
    pub frame: &'a TemplateFrame,
    pub request: &'a RequestInfo,
    pub revision_author: Option<&'a str>,
    pub directory: &'a UserDirectory,
    pub repo: &'a dyn FileRepo,
    pub messages: &'a dyn MessageCatalog,
    pub expander: &'a dyn MarkupExpander,
    pub output: &'a ParserOutput,
}

/// Sentinel expiry meaning the host's default page cache lifetime applies.
const HOST_DEFAULT_EXPIRY: u64 = u64::MAX;

/// Render metadata accumulated while a page is processed. Handlers
/// lower the cache expiry when their output must not be served stale.
#[derive(Debug)]
pub struct ParserOutput {
    cache_expiry: AtomicU64,
}

impl ParserOutput {
    pub fn new() -> Self {
        Self {
            cache_expiry: AtomicU64::new(HOST_DEFAULT_EXPIRY),
        }
    }

    /// Lower the cache expiry to at most the given number of seconds.
    /// The lowest value seen during a render wins; zero makes the page
    /// uncacheable.
    pub fn update_cache_expiry(&self, seconds: u64) {
        self.cache_expiry.fetch_min(seconds, Ordering::SeqCst);
    }

    /// The expiry floor in seconds, or None when no handler lowered it.
    pub fn cache_expiry(&self) -> Option<u64> {
        match self.cache_expiry.load(Ordering::SeqCst) {
            HOST_DEFAULT_EXPIRY => None,
            seconds => Some(seconds),
        }
    }

    pub fn is_cacheable(&self) -> bool {
        self.cache_expiry.load(Ordering::SeqCst) != 0
    }
}

impl Default for ParserOutput {
    fn default() -> Self {
        Self::new()
    }
}

/// Produce a canonical string for a tag occurrence to support stable marker hashing
fn normalize_tag(tag: &ParsedTag) -> String {
    let mut sorted_attrs: Vec<_> = tag.attributes.iter().collect();
    sorted_attrs.sort_unstable_by(|a, b| a.0.cmp(b.0));

    let mut result = format!("<{}", tag.name);
    for (key, value) in sorted_attrs {
        if value.is_empty() {
            result.push_str(&format!(" {}", key));
        } else {
            result.push_str(&format!(r#" {}="{}""#, key, value));
        }
    }
    result.push('>');
    result.push_str(&tag.body);
    result.push_str(&format!("</{}>", tag.name));
    result
}

/// Generate a SHA-256 marker for a tag occurrence. The occurrence index
/// is hashed in, so repeated tags keep independent fragments.
fn generate_tag_marker(index: u64, tag: &ParsedTag) -> String {
    let normalized = normalize_tag(tag);
    let mut hasher = Sha256::new();
    hasher.update(index.to_le_bytes());
    hasher.update(normalized.as_bytes());
    let result = hasher.finalize();
    format!("TAG_MARKER_{:x}", result)
}

/// Registry for storing and managing parser tag handlers
pub struct TagRegistry {
    handlers: HashMap<String, TagMetadata>,
}

impl TagRegistry {
    pub fn new() -> Self {
        TagRegistry {
            handlers: HashMap::new(),
        }
    }

    /// Register a new tag handler under a lowercase tag name
    pub fn register<F>(&mut self, name: &str, handler: F, is_dynamic: bool)
    where
        F: Fn(&ParsedTag, &TagContext<'_>) -> Result<String, String> + Send + Sync + 'static,
    {
        self.handlers.insert(
            name.to_lowercase(),
            TagMetadata {
                handler: Box::new(handler),
                is_dynamic,
            },
        );
    }

    /// Process a tag using its registered handler
    /// Returns Some(Ok(html)) for success, Some(Err(error)) for handler errors, None for unknown tags
    pub fn process(
        &self,
        tag: &ParsedTag,
        ctx: &TagContext<'_>,
    ) -> Option<Result<String, String>> {
        self.handlers
            .get(&tag.name)
            .map(|metadata| (metadata.handler)(tag, ctx))
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Check whether a tag is registered as dynamic
    pub fn is_dynamic(&self, name: &str) -> Option<bool> {
        self.handlers.get(name).map(|metadata| metadata.is_dynamic)
    }

    /// Return a sorted list of registered tag names.
    pub fn registered_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for TagRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Scan one complete occurrence of a registered tag from the start of
/// the text: either a self-closing tag, or an open tag with its body
/// running to the case-insensitive matching close tag.
fn scan_tag_occurrence(text: &str, registry: &TagRegistry) -> Option<(ParsedTag, usize)> {
    let (open_tag, open_len) = attributes::parse_open_tag(text)?;
    if !registry.is_registered(&open_tag.name) {
        return None;
    }

    if open_tag.self_closing {
        let tag = ParsedTag {
            name: open_tag.name,
            attributes: open_tag.attributes,
            body: String::new(),
        };
        return Some((tag, open_len));
    }

    let close_tag = format!("</{}>", open_tag.name);
    let close_pos = find_ascii_case_insensitive(&text[open_len..], &close_tag)?;
    let tag = ParsedTag {
        body: text[open_len..open_len + close_pos].to_string(),
        name: open_tag.name,
        attributes: open_tag.attributes,
    };
    Some((tag, open_len + close_pos + close_tag.len()))
}

/// Find an ASCII needle in text without regard to letter case.
fn find_ascii_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    let haystack = haystack.as_bytes();
    let needle = needle.as_bytes();
    (0..=haystack.len() - needle.len())
        .find(|&i| haystack[i..i + needle.len()].eq_ignore_ascii_case(needle))
}

pub struct TagProcessingResult {
    pub processed_text: String,
    pub marker_to_html_map: HashMap<String, String>,
    pub contains_dynamic_tags: bool,
}

/// Process page text looking for registered tags and replace each rendered
/// occurrence with a marker placeholder
/// Returns metadata used by the renderer to determine cacheability.
pub fn process_text_with_tags(
    text: &str,
    registry: &TagRegistry,
    ctx: &TagContext<'_>,
) -> TagProcessingResult {
    // If there are no tag candidates, no processing is needed.
    if !text.contains('<') {
        return TagProcessingResult {
            processed_text: text.to_string(),
            marker_to_html_map: HashMap::new(),
            contains_dynamic_tags: false,
        };
    }

    let mut marker_to_html_map = HashMap::new();
    let mut result_text = String::new();
    let mut last_end = 0;
    let mut contains_dynamic_tags = false;
    let mut occurrence: u64 = 0;

    while last_end < text.len() {
        // Look for the next tag candidate starting from last_end
        if let Some(start_pos) = text[last_end..].find('<') {
            let actual_start = last_end + start_pos;

            // Add text before the tag to result
            result_text.push_str(&text[last_end..actual_start]);

            // Try to scan a complete registered tag from this position
            if let Some((tag, consumed)) = scan_tag_occurrence(&text[actual_start..], registry) {
                // Get the original tag markup
                let tag_string = &text[actual_start..actual_start + consumed];

                let is_dynamic = registry.is_dynamic(&tag.name).unwrap_or(false);
                if is_dynamic {
                    contains_dynamic_tags = true;
                }

                log::trace!("Rendering tag '{}' (dynamic={})", tag.name, is_dynamic);
                match registry.process(&tag, ctx) {
                    Some(Ok(html)) => {
                        // Store the mapping from marker to rendered HTML
                        let marker = generate_tag_marker(occurrence, &tag);
                        marker_to_html_map.insert(marker.clone(), html);

                        // Add marker placeholder to result text
                        result_text.push_str(&marker);

                        // Move past processed tag
                        occurrence += 1;
                        last_end = actual_start + consumed;
                    }
                    Some(Err(_)) | None => {
                        // Tag handler error - leave original markup in place
                        log::debug!(
                            "Tag '{}' failed to render - leaving original markup in place",
                            tag.name
                        );
                        result_text.push_str(tag_string);
                        last_end = actual_start + consumed;
                    }
                }
            } else {
                // Not a registered, well-formed tag occurrence; keep the "<" and move past it
                result_text.push('<');
                last_end = actual_start + 1;
            }
        } else {
            // No more candidates found, add remaining text
            result_text.push_str(&text[last_end..]);
            break;
        }
    }

    TagProcessingResult {
        processed_text: result_text,
        marker_to_html_map,
        contains_dynamic_tags,
    }
}

/// Replace marker placeholders in text with their corresponding rendered HTML
pub fn replace_tag_markers(text: &str, marker_to_html_map: &HashMap<String, String>) -> String {
    let mut result = text.to_string();

    for (marker, html) in marker_to_html_map {
        log::trace!("Replacing marker '{}' with HTML: '{}'", marker, html);
        result = result.replace(marker, html);
    }

    result
}

pub struct ExpandedText {
    pub html: String,
    pub contains_dynamic_tags: bool,
}

/// Expand every registered tag in page text: render each occurrence
/// behind a marker, then re-insert the fragments as the final step.
pub fn expand_text_with_tags(
    text: &str,
    registry: &TagRegistry,
    ctx: &TagContext<'_>,
) -> ExpandedText {
    let processed = process_text_with_tags(text, registry, ctx);
    let html = replace_tag_markers(&processed.processed_text, &processed.marker_to_html_map);
    ExpandedText {
        html,
        contains_dynamic_tags: processed.contains_dynamic_tags,
    }
}

/// Create the default tag registry with the built-in handlers, bound to
/// the site's configured embed defaults
pub fn create_default_registry_with_config(
    config: &ValidatedConfig,
    template_engine: Arc<dyn TemplateEngine>,
) -> TagRegistry {
    let mut registry = TagRegistry::new();

    // Register the pdf handler using a closure to capture config. The
    // handler output depends on the acting user, so the tag is dynamic.
    let embed = config.embed.clone();
    registry.register(
        "pdf",
        move |tag, ctx| pdf::handle_pdf_tag(tag, ctx, &embed, template_engine.as_ref()),
        true,
    );

    registry
}
