// This file is part of the product PdfEmbed.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_until, take_while1},
    character::complete::{alpha1, alphanumeric1, char, multispace0, multispace1},
    combinator::{map, opt, recognize},
    multi::many0,
    sequence::{delimited, pair, preceded, separated_pair, tuple},
};
use std::collections::HashMap;

/// An opening tag such as `<pdf width="500">` or `<pdf />`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct OpenTag {
    pub name: String,
    pub attributes: HashMap<String, String>,
    pub self_closing: bool,
}

// Nom parser implementation for parser tags
// Parse tag name: starts with a letter, then alphanumeric with hyphens and underscores
fn tag_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alpha1,
        many0(alt((alphanumeric1, tag("-"), tag("_")))),
    ))(input)
}

// Parse double-quoted string value
fn double_quoted_value(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_until("\""), char('"'))(input)
}

// Parse single-quoted string value
fn single_quoted_value(input: &str) -> IResult<&str, &str> {
    delimited(char('\''), take_until("'"), char('\''))(input)
}

// Parse unquoted value (numbers or simple strings without spaces)
fn unquoted_value(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && c != '>' && c != '/')(input)
}

// Parse attribute value (quoted or unquoted)
fn attribute_value(input: &str) -> IResult<&str, &str> {
    alt((double_quoted_value, single_quoted_value, unquoted_value))(input)
}

// Parse single attribute
fn attribute(input: &str) -> IResult<&str, (String, String)> {
    alt((
        // key="value", key='value' or key=value
        map(
            separated_pair(
                tag_name,
                delimited(multispace0, char('='), multispace0),
                attribute_value,
            ),
            |(k, v)| (k.to_lowercase(), v.to_string()),
        ),
        // standalone flag (e.g., "nocache")
        map(tag_name, |k| (k.to_lowercase(), String::new())),
    ))(input)
}

// Parse tag content inside < >
fn open_tag_content(input: &str) -> IResult<&str, OpenTag> {
    map(
        tuple((
            tag_name,
            many0(preceded(multispace1, attribute)),
            multispace0,
            opt(tag("/")),
        )),
        |(name, attrs, _, self_close)| OpenTag {
            name: name.to_lowercase(),
            attributes: attrs.into_iter().collect(),
            self_closing: self_close.is_some(),
        },
    )(input)
}

// Parse complete opening tag with < > delimiters
fn nom_parse_open_tag(input: &str) -> IResult<&str, OpenTag> {
    delimited(char('<'), open_tag_content, char('>'))(input)
}

/// Parse an opening tag from text starting at the beginning using nom
/// Returns (OpenTag, consumed_bytes) if successful
pub(super) fn parse_open_tag(text: &str) -> Option<(OpenTag, usize)> {
    match nom_parse_open_tag(text) {
        Ok((remaining, open_tag)) => {
            let consumed = text.len() - remaining.len();
            Some((open_tag, consumed))
        }
        Err(_) => None,
    }
}
