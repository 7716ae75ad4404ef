// This file is part of the product PdfEmbed.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::EmbedConfig;
use crate::messages::escape_html;
use crate::parser::{ParsedTag, TagContext};
use crate::templates::{TemplateEngine, render_minijinja_template};
use crate::title::FileTitle;
use minijinja::context;
use once_cell::sync::Lazy;
use regex::Regex;

/// Right an actor must hold to embed PDF files.
pub const EMBED_PDF_RIGHT: &str = "embed_pdf";

/// Author name used when a revision has no recorded user.
const UNKNOWN_USER_NAME: &str = "Unknown user";

static PDF_REFERENCE_REGEX: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"(?is).+?\.pdf"));

/// Outcome of resolving one tag occurrence: the embed parameters, or
/// the key of the error message shown in its place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderResult {
    Embed {
        width: i64,
        height: i64,
        url: String,
        page: i64,
    },
    Error {
        message_key: &'static str,
    },
}

/// True for request actions where the current user, not the revision
/// author, is the acting identity.
pub fn is_edit_like_action(action: Option<&str>) -> bool {
    matches!(action, Some("edit") | Some("submit"))
}

/// True when the text references a PDF: at least one character followed
/// by `.pdf`, anywhere in the string, without regard to case. The match
/// is not anchored to the end of the name, so `file.pdfx` also passes.
pub fn has_pdf_reference(text: &str) -> bool {
    match PDF_REFERENCE_REGEX.as_ref() {
        Ok(regex) => regex.is_match(text),
        Err(e) => {
            log::error!("PDF reference pattern failed to compile: {}", e);
            false
        }
    }
}

/// Integer form of an attribute value: an optional sign and the leading
/// digits are read, anything else counts as 0.
pub fn parse_int(text: &str) -> i64 {
    let text = text.trim_start();
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return 0;
    }
    match digits.parse::<i64>() {
        Ok(value) if negative => -value,
        Ok(value) => value,
        // Digit runs that overflow i64 saturate
        Err(_) if negative => i64::MIN,
        Err(_) => i64::MAX,
    }
}

/// Resolve one `<pdf>` tag occurrence into its display parameters or an
/// error message key. Checks run in order and the first failure wins:
/// actor resolution, the embed_pdf right, file-name validation, title
/// parsing, then repository lookup.
pub fn resolve_pdf_tag(
    tag: &ParsedTag,
    ctx: &TagContext<'_>,
    embed: &EmbedConfig,
) -> RenderResult {
    // The fragment is gated on the acting identity; the page carrying
    // it must never be served from cache.
    ctx.output.update_cache_expiry(0);

    let mut file = tag.body.clone();
    if file.contains("{{{") {
        file = ctx.expander.expand(&file, ctx.frame);
    }

    // While a page is being edited the current user places the tag; on
    // every other render the last revision author vouches for it.
    let user = if is_edit_like_action(ctx.request.action.as_deref()) {
        ctx.request.user.clone()
    } else {
        let author = ctx.revision_author.unwrap_or(UNKNOWN_USER_NAME);
        ctx.directory.user_from_name(author)
    };

    let user = match user {
        Some(user) => user,
        None => {
            return RenderResult::Error {
                message_key: "embed_pdf_invalid_user",
            };
        }
    };

    if !ctx.directory.is_allowed(&user, EMBED_PDF_RIGHT) {
        return RenderResult::Error {
            message_key: "embed_pdf_no_permission",
        };
    }

    if file.is_empty() || !has_pdf_reference(&file) {
        return RenderResult::Error {
            message_key: "embed_pdf_blank_file",
        };
    }

    let title = match FileTitle::from_text(&file) {
        Some(title) => title,
        None => {
            return RenderResult::Error {
                message_key: "embed_pdf_blank_file",
            };
        }
    };

    // A repository miss is dispatched at the end, after the display
    // parameters are read.
    let found = ctx.repo.find(&title);

    let width = match tag.attributes.get("width") {
        Some(value) => parse_int(&ctx.expander.expand(value, ctx.frame)),
        None => embed.width,
    };
    let height = match tag.attributes.get("height") {
        Some(value) => parse_int(&ctx.expander.expand(value, ctx.frame)),
        None => embed.height,
    };
    let page = match tag.attributes.get("page") {
        Some(value) => parse_int(&ctx.expander.expand(value, ctx.frame)),
        None => 1,
    };

    match found {
        Some(file) => RenderResult::Embed {
            width,
            height,
            url: format!("{}#page={}", file.url(), page),
            page,
        },
        None => RenderResult::Error {
            message_key: "embed_pdf_invalid_file",
        },
    }
}

/// Pdf tag handler that embeds an uploaded PDF file in an iframe
///
/// The tag body names the file; supported attributes:
/// - width (optional): iframe width in pixels, site default when absent
/// - height (optional): iframe height in pixels, site default when absent
/// - page (optional): page the document opens on. Defaults to 1.
///
/// Example usage:
/// ```text
/// <pdf>Sample.pdf</pdf>
/// <pdf width="500" page="3">File:Annual report.pdf</pdf>
/// ```
///
/// Generated HTML:
/// ```html
/// <iframe width="500" height="600" src="https://wiki.example/files/Sample.pdf#page=3"
///     style="max-width: 100%;" loading="lazy"></iframe>
/// ```
///
/// Every failure renders a localized error box in place of the iframe;
/// nothing is reported to the surrounding page pipeline as an error.
pub fn handle_pdf_tag(
    tag: &ParsedTag,
    ctx: &TagContext<'_>,
    embed: &EmbedConfig,
    template_engine: &dyn TemplateEngine,
) -> Result<String, String> {
    match resolve_pdf_tag(tag, ctx, embed) {
        RenderResult::Embed {
            width,
            height,
            url,
            ..
        } => {
            // Render the frame template with minijinja (attributes are automatically HTML-escaped)
            let context = context! {
                width => width,
                height => height,
                // Escaped by hand and marked safe: minijinja's HTML escape
                // also rewrites `/`, and src needs the literal URL.
                url => minijinja::Value::from_safe_string(escape_html(&url))
            };
            match render_minijinja_template(template_engine, "tags/pdf_frame.html", context) {
                Ok(html) => Ok(html),
                Err(e) => {
                    log::error!("Failed to render PDF frame template: {}", e);
                    Ok(fallback_frame_html(width, height, &url))
                }
            }
        }
        RenderResult::Error { message_key } => {
            let message = ctx.messages.text(message_key);
            let context = context! { message => &message };
            match render_minijinja_template(template_engine, "tags/error_box.html", context) {
                Ok(html) => Ok(html),
                Err(e) => {
                    log::error!("Failed to render error box template: {}", e);
                    Ok(fallback_error_html(&message))
                }
            }
        }
    }
}

fn fallback_frame_html(width: i64, height: i64, url: &str) -> String {
    format!(
        r#"<iframe width="{}" height="{}" src="{}" style="max-width: 100%;" loading="lazy"></iframe>"#,
        width,
        height,
        escape_html(url)
    )
}

fn fallback_error_html(message: &str) -> String {
    format!(
        r#"<div class="pdfembed-error notification is-danger">{}</div>"#,
        escape_html(message)
    )
}
