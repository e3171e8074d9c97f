/*!
 * Minimal tag-aware scanning over markup fragments.
 *
 * This is not an HTML parser. It finds tags with a regular expression and
 * pairs an opening tag with its closing tag by counting nested tags of the
 * same name. Angle brackets inside attribute values are not understood.
 */

use regex::{Captures, Regex};

use super::patterns::{CLASS_ATTR_REGEX, STYLE_ATTR_REGEX, TAG_REGEX};

/// A single tag located in a fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag<'a> {
    /// Tag name as written
    pub name: &'a str,
    /// Raw attribute text, empty when the tag has no attributes
    pub attrs: &'a str,
    /// Byte offset of `<`
    pub start: usize,
    /// Byte offset just past `>`
    pub end: usize,
    /// `</name>`
    pub closing: bool,
    /// `<name ... />`
    pub self_closing: bool,
}

impl<'a> Tag<'a> {
    /// Build a tag from a `TAG_REGEX` match, shifting offsets by `base`
    pub(crate) fn from_captures(caps: &Captures<'a>, base: usize) -> Self {
        let whole = caps.get(0).map(|m| (m.start(), m.end())).unwrap_or((0, 0));
        Tag {
            name: caps.get(2).map_or("", |m| m.as_str()),
            attrs: caps.get(3).map_or("", |m| m.as_str()),
            start: base + whole.0,
            end: base + whole.1,
            closing: caps.get(1).is_some_and(|m| !m.as_str().is_empty()),
            self_closing: caps.get(4).is_some_and(|m| !m.as_str().is_empty()),
        }
    }

    /// Value of the class attribute, if any
    pub fn class(&self) -> Option<&'a str> {
        attribute_value(&CLASS_ATTR_REGEX, self.attrs)
    }

    /// Value of the inline style attribute, if any
    pub fn style(&self) -> Option<&'a str> {
        attribute_value(&STYLE_ATTR_REGEX, self.attrs)
    }

    /// Whether the class attribute contains `token` as a whole word
    pub fn has_class(&self, token: &str) -> bool {
        self.class().is_some_and(|class| has_class_token(class, token))
    }

    /// Whether this tag can start an element with content
    pub fn is_opening(&self) -> bool {
        !self.closing && !self.self_closing
    }
}

/// An opening tag paired with its closing tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element<'a> {
    pub open: Tag<'a>,
    /// Byte offset of the closing tag's `<`
    pub close_start: usize,
    /// Byte offset just past the closing tag's `>`
    pub end: usize,
}

impl<'a> Element<'a> {
    pub fn start(&self) -> usize {
        self.open.start
    }

    /// Content between the opening and closing tags
    pub fn inner<'h>(&self, html: &'h str) -> &'h str {
        &html[self.open.end..self.close_start]
    }
}

fn attribute_value<'a>(regex: &Regex, attrs: &'a str) -> Option<&'a str> {
    let caps = regex.captures(attrs)?;
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
}

/// Whitespace-separated class token test
pub fn has_class_token(class: &str, token: &str) -> bool {
    class.split_whitespace().any(|t| t == token)
}

/// Every tag in `html`, in document order
pub fn tags(html: &str) -> impl Iterator<Item = Tag<'_>> {
    TAG_REGEX.captures_iter(html).map(|caps| Tag::from_captures(&caps, 0))
}

/// Find the tag closing `open`, skipping nested tags with the same name
fn find_close<'a>(html: &'a str, open: &Tag<'a>) -> Option<Tag<'a>> {
    let rest = &html[open.end..];
    let mut depth = 0usize;
    for caps in TAG_REGEX.captures_iter(rest) {
        let tag = Tag::from_captures(&caps, open.end);
        if !tag.name.eq_ignore_ascii_case(open.name) {
            continue;
        }
        if tag.closing {
            if depth == 0 {
                return Some(tag);
            }
            depth -= 1;
        } else if !tag.self_closing {
            depth += 1;
        }
    }
    None
}

fn pair<'a>(html: &'a str, open: Tag<'a>) -> Option<Element<'a>> {
    let close = find_close(html, &open)?;
    Some(Element {
        close_start: close.start,
        end: close.end,
        open,
    })
}

/// First element whose opening tag satisfies `matches` and has a closing tag
pub fn first_element<'a>(html: &'a str, matches: impl Fn(&Tag<'a>) -> bool) -> Option<Element<'a>> {
    tags(html)
        .filter(|tag| tag.is_opening() && matches(tag))
        .find_map(|tag| pair(html, tag))
}

/// All outermost elements whose opening tag satisfies `matches`.
///
/// Matching elements nested inside an earlier match are not reported; callers
/// that need them run another pass over the rewritten text.
pub fn find_elements<'a>(html: &'a str, matches: impl Fn(&Tag<'a>) -> bool) -> Vec<Element<'a>> {
    let mut found: Vec<Element<'a>> = Vec::new();
    let mut cursor = 0;
    for tag in tags(html) {
        if tag.start < cursor || !tag.is_opening() || !matches(&tag) {
            continue;
        }
        if let Some(element) = pair(html, tag) {
            cursor = element.end;
            found.push(element);
        }
    }
    found
}

/// Replace every element in `elements` with whatever `replace` returns
pub fn splice_elements<'a>(
    html: &'a str,
    elements: &[Element<'a>],
    replace: impl Fn(&Element<'a>) -> &'a str,
) -> String {
    let mut out = String::with_capacity(html.len());
    let mut cursor = 0;
    for element in elements {
        out.push_str(&html[cursor..element.start()]);
        out.push_str(replace(element));
        cursor = element.end;
    }
    out.push_str(&html[cursor..]);
    out
}
