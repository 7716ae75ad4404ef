// This file is part of the product PdfEmbed.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use nom::{
    IResult,
    bytes::complete::{tag, take_until},
    sequence::delimited,
};
use std::collections::HashMap;

/// Arguments passed to the page being expanded, as when it is
/// transcluded as a template.
#[derive(Debug, Clone, Default)]
pub struct TemplateFrame {
    arguments: HashMap<String, String>,
}

impl TemplateFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_arguments(arguments: HashMap<String, String>) -> Self {
        Self { arguments }
    }

    pub fn argument(&self, name: &str) -> Option<&str> {
        self.arguments.get(name).map(String::as_str)
    }

    pub fn set_argument(&mut self, name: &str, value: &str) {
        self.arguments.insert(name.to_string(), value.to_string());
    }
}

/// Expansion of wikitext fragments against a template frame.
pub trait MarkupExpander: Send + Sync {
    fn expand(&self, text: &str, frame: &TemplateFrame) -> String;
}

/// Expander that substitutes `{{{name}}}` parameters from the frame.
#[derive(Debug, Default)]
pub struct FrameExpander;

impl FrameExpander {
    pub fn new() -> Self {
        Self
    }
}

impl MarkupExpander for FrameExpander {
    fn expand(&self, text: &str, frame: &TemplateFrame) -> String {
        expand_frame_parameters(text, frame)
    }
}

fn nom_parse_parameter(input: &str) -> IResult<&str, &str> {
    delimited(tag("{{{"), take_until("}}}"), tag("}}}"))(input)
}

/// Substitute one level of `{{{name}}}` and `{{{name|default}}}`
/// parameters. Nested parameters inside a default are not resolved.
pub fn expand_frame_parameters(text: &str, frame: &TemplateFrame) -> String {
    if !text.contains("{{{") {
        return text.to_string();
    }

    let mut result = String::with_capacity(text.len());
    let mut remaining = text;

    while let Some(start) = remaining.find("{{{") {
        result.push_str(&remaining[..start]);
        let candidate = &remaining[start..];

        match nom_parse_parameter(candidate) {
            Ok((rest, inner)) => {
                let consumed = candidate.len() - rest.len();
                result.push_str(&resolve_parameter(inner, frame, &candidate[..consumed]));
                remaining = rest;
            }
            Err(_) => {
                // No closing braces; keep the literal text.
                result.push_str("{{{");
                remaining = &candidate[3..];
            }
        }
    }

    result.push_str(remaining);
    result
}

fn resolve_parameter(inner: &str, frame: &TemplateFrame, original: &str) -> String {
    let (name, default) = match inner.split_once('|') {
        Some((name, default)) => (name.trim(), Some(default)),
        None => (inner.trim(), None),
    };

    if let Some(value) = frame.argument(name) {
        return value.to_string();
    }
    if let Some(default) = default {
        return default.to_string();
    }
    original.to_string()
}
