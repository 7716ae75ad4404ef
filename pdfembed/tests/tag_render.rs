// This file is part of the product PdfEmbed.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

mod common;

use pdfembed::messages::MessageCatalog;
use pdfembed::parser::ParsedTag;
use pdfembed::tags::pdf::{RenderResult, handle_pdf_tag, resolve_pdf_tag};
use pdfembed::templates::MiniJinjaEngine;

fn pdf_tag(body: &str, attributes: &[(&str, &str)]) -> ParsedTag {
    ParsedTag {
        name: "pdf".to_string(),
        attributes: attributes
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        body: body.to_string(),
    }
}

#[test]
fn round_trip_embed_uses_configured_defaults() {
    let harness = common::TestHarness::new();
    let request = common::view_request();
    let result = resolve_pdf_tag(
        &pdf_tag("Sample.pdf", &[]),
        &harness.context(&request),
        &harness.config.embed,
    );

    // Defaults come from the seeded config.yaml, page from the built-in 1
    assert_eq!(
        result,
        RenderResult::Embed {
            width: 800,
            height: 600,
            url: format!("{}#page=1", common::SAMPLE_URL),
            page: 1,
        }
    );
}

#[test]
fn width_attribute_overrides_configured_default() {
    let harness = common::TestHarness::new();
    let request = common::view_request();
    let result = resolve_pdf_tag(
        &pdf_tag("Sample.pdf", &[("width", "300")]),
        &harness.context(&request),
        &harness.config.embed,
    );

    assert!(matches!(
        result,
        RenderResult::Embed {
            width: 300,
            height: 600,
            ..
        }
    ));
}

#[test]
fn page_attribute_lands_in_the_url_fragment() {
    let harness = common::TestHarness::new();
    let request = common::view_request();
    let result = resolve_pdf_tag(
        &pdf_tag("Sample.pdf", &[("page", "7")]),
        &harness.context(&request),
        &harness.config.embed,
    );

    assert_eq!(
        result,
        RenderResult::Embed {
            width: 800,
            height: 600,
            url: format!("{}#page=7", common::SAMPLE_URL),
            page: 7,
        }
    );
}

#[test]
fn empty_body_is_blank_file_regardless_of_attributes() {
    let harness = common::TestHarness::new();
    let request = common::view_request();
    let result = resolve_pdf_tag(
        &pdf_tag("", &[("width", "300"), ("height", "200"), ("page", "2")]),
        &harness.context(&request),
        &harness.config.embed,
    );

    assert_eq!(
        result,
        RenderResult::Error {
            message_key: "embed_pdf_blank_file"
        }
    );
}

#[test]
fn body_without_pdf_reference_is_blank_file() {
    let harness = common::TestHarness::new();
    let request = common::view_request();
    let result = resolve_pdf_tag(
        &pdf_tag("Slides.pptx", &[]),
        &harness.context(&request),
        &harness.config.embed,
    );

    assert_eq!(
        result,
        RenderResult::Error {
            message_key: "embed_pdf_blank_file"
        }
    );
}

#[test]
fn unauthorized_author_is_no_permission_despite_valid_file() {
    let mut harness = common::TestHarness::new();
    harness.revision_author = Some(common::VISITOR_NAME.to_string());
    let request = common::view_request();
    let result = resolve_pdf_tag(
        &pdf_tag("Sample.pdf", &[]),
        &harness.context(&request),
        &harness.config.embed,
    );

    assert_eq!(
        result,
        RenderResult::Error {
            message_key: "embed_pdf_no_permission"
        }
    );
}

#[test]
fn repository_miss_is_invalid_file() {
    let harness = common::TestHarness::new();
    let request = common::view_request();
    let result = resolve_pdf_tag(
        &pdf_tag("Unuploaded.pdf", &[]),
        &harness.context(&request),
        &harness.config.embed,
    );

    assert_eq!(
        result,
        RenderResult::Error {
            message_key: "embed_pdf_invalid_file"
        }
    );
}

#[test]
fn accepts_pdf_mid_string() {
    // The reference pattern matches ".pdf" anywhere, so "Guide.pdfx"
    // passes validation and resolves when such a file exists.
    let mut harness = common::TestHarness::new();
    harness
        .repo
        .insert("Guide.pdfx", "https://wiki.example/files/Guide.pdfx");
    let request = common::view_request();
    let result = resolve_pdf_tag(
        &pdf_tag("Guide.pdfx", &[]),
        &harness.context(&request),
        &harness.config.embed,
    );

    assert_eq!(
        result,
        RenderResult::Embed {
            width: 800,
            height: 600,
            url: "https://wiki.example/files/Guide.pdfx#page=1".to_string(),
            page: 1,
        }
    );
}

#[test]
fn namespace_prefixed_body_resolves() {
    let harness = common::TestHarness::new();
    let request = common::view_request();
    let result = resolve_pdf_tag(
        &pdf_tag("File:annual_report 2025.pdf", &[]),
        &harness.context(&request),
        &harness.config.embed,
    );

    assert_eq!(
        result,
        RenderResult::Embed {
            width: 800,
            height: 600,
            url: format!("{}#page=1", common::REPORT_URL),
            page: 1,
        }
    );
}

#[test]
fn body_placeholder_expands_before_validation() {
    let mut harness = common::TestHarness::new();
    harness.frame.set_argument("1", "Sample.pdf");
    let request = common::view_request();
    let result = resolve_pdf_tag(
        &pdf_tag("{{{1}}}", &[]),
        &harness.context(&request),
        &harness.config.embed,
    );

    assert_eq!(
        result,
        RenderResult::Embed {
            width: 800,
            height: 600,
            url: format!("{}#page=1", common::SAMPLE_URL),
            page: 1,
        }
    );
}

#[test]
fn attribute_placeholder_expands_before_conversion() {
    let mut harness = common::TestHarness::new();
    harness.frame.set_argument("w", "480");
    let request = common::view_request();
    let result = resolve_pdf_tag(
        &pdf_tag("Sample.pdf", &[("width", "{{{w|320}}}")]),
        &harness.context(&request),
        &harness.config.embed,
    );

    assert!(matches!(result, RenderResult::Embed { width: 480, .. }));
}

#[test]
fn edit_action_checks_the_current_user_not_the_author() {
    let mut harness = common::TestHarness::new();
    // The recorded author would be denied
    harness.revision_author = Some(common::VISITOR_NAME.to_string());
    let sysop = harness.user(common::SYSOP_NAME);
    let request = common::edit_request(Some(sysop));
    let result = resolve_pdf_tag(
        &pdf_tag("Sample.pdf", &[]),
        &harness.context(&request),
        &harness.config.embed,
    );

    assert!(matches!(result, RenderResult::Embed { .. }));
}

#[test]
fn edit_action_without_a_user_is_invalid_user() {
    let harness = common::TestHarness::new();
    let request = common::edit_request(None);
    let result = resolve_pdf_tag(
        &pdf_tag("Sample.pdf", &[]),
        &harness.context(&request),
        &harness.config.embed,
    );

    assert_eq!(
        result,
        RenderResult::Error {
            message_key: "embed_pdf_invalid_user"
        }
    );
}

#[test]
fn every_resolution_disables_page_caching() {
    let harness = common::TestHarness::new();
    let request = common::view_request();
    assert!(harness.output.is_cacheable());

    resolve_pdf_tag(
        &pdf_tag("Unuploaded.pdf", &[]),
        &harness.context(&request),
        &harness.config.embed,
    );

    assert!(!harness.output.is_cacheable());
    assert_eq!(harness.output.cache_expiry(), Some(0));
}

#[test]
fn error_fragments_are_localized_error_boxes() {
    let mut harness = common::TestHarness::new();
    let templates = MiniJinjaEngine::new();

    let cases = [
        (pdf_tag("", &[]), "embed_pdf_blank_file"),
        (pdf_tag("Unuploaded.pdf", &[]), "embed_pdf_invalid_file"),
    ];
    for (tag, key) in cases {
        let request = common::view_request();
        let html = handle_pdf_tag(
            &tag,
            &harness.context(&request),
            &harness.config.embed,
            &templates,
        )
        .expect("error fragment");
        assert!(html.contains(r#"class="pdfembed-error notification is-danger""#));
        assert!(html.contains(&harness.messages.text(key)));
    }

    // The permission box carries its own message
    harness.revision_author = Some(common::VISITOR_NAME.to_string());
    let request = common::view_request();
    let html = handle_pdf_tag(
        &pdf_tag("Sample.pdf", &[]),
        &harness.context(&request),
        &harness.config.embed,
        &templates,
    )
    .expect("error fragment");
    assert!(html.contains(&harness.messages.text("embed_pdf_no_permission")));
}

#[test]
fn embed_fragment_carries_display_attributes() {
    let harness = common::TestHarness::new();
    let templates = MiniJinjaEngine::new();
    let request = common::view_request();
    let html = handle_pdf_tag(
        &pdf_tag("Sample.pdf", &[("width", "640"), ("page", "2")]),
        &harness.context(&request),
        &harness.config.embed,
        &templates,
    )
    .expect("embed fragment");

    assert!(html.contains(r#"<iframe width="640" height="600""#));
    assert!(html.contains(&format!(r#"src="{}#page=2""#, common::SAMPLE_URL)));
    assert!(html.contains(r#"style="max-width: 100%;""#));
    assert!(html.contains(r#"loading="lazy""#));
}
