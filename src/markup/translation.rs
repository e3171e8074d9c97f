/*!
 * Translation text lookup.
 *
 * A card may carry its translation in several places. The sources are tried
 * in a fixed order and the first one yielding non-empty text wins:
 *
 * 1. `LineContainer`: an element classed `dc-line dc-translation`
 * 2. `AnyContainer`: any element classed `dc-translation`
 * 3. `ClozeBack`: the first non-empty `::back` half of a cloze marker
 */

use std::fmt;

use super::patterns::CLOZE_REGEX;
use super::scanner::{self, Tag};
use super::text::strip_tags;

const LINE_CLASS: &str = "dc-line";
const TRANSLATION_CLASS: &str = "dc-translation";

/// Where the translation text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranslationSource {
    LineContainer,
    AnyContainer,
    ClozeBack,
}

impl TranslationSource {
    /// Precedence order, highest first
    pub const ORDER: [TranslationSource; 3] = [
        TranslationSource::LineContainer,
        TranslationSource::AnyContainer,
        TranslationSource::ClozeBack,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::LineContainer => "line-container",
            Self::AnyContainer => "any-container",
            Self::ClozeBack => "cloze-back",
        }
    }

    /// Look this source up in a fragment.
    ///
    /// `original` is the fragment before line containers were removed and
    /// `remaining` the fragment after.
    pub fn lookup(&self, original: &str, remaining: &str) -> Option<String> {
        match self {
            Self::LineContainer => line_container_text(original),
            Self::AnyContainer => any_container_text(remaining),
            Self::ClozeBack => first_cloze_back_text(remaining),
        }
    }
}

impl fmt::Display for TranslationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// First-wins holder for the translation text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationSlot {
    text: String,
    source: Option<TranslationSource>,
}

impl TranslationSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_filled(&self) -> bool {
        self.source.is_some()
    }

    /// Store `candidate` unless the slot is already filled or the candidate is
    /// empty. Returns whether the candidate was taken.
    pub fn offer(&mut self, source: TranslationSource, candidate: Option<String>) -> bool {
        if self.is_filled() {
            return false;
        }
        match candidate {
            Some(text) if !text.is_empty() => {
                self.text = text;
                self.source = Some(source);
                true
            }
            _ => false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source(&self) -> Option<TranslationSource> {
        self.source
    }

    pub fn into_parts(self) -> (String, Option<TranslationSource>) {
        (self.text, self.source)
    }
}

fn is_line_container(tag: &Tag<'_>) -> bool {
    tag.has_class(LINE_CLASS) && tag.has_class(TRANSLATION_CLASS)
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() { None } else { Some(text) }
}

/// Plain text of the first `dc-line dc-translation` container
pub fn line_container_text(html: &str) -> Option<String> {
    let element = scanner::first_element(html, is_line_container)?;
    non_empty(strip_tags(element.inner(html)))
}

/// Remove every `dc-line dc-translation` container, content included
pub fn remove_line_containers(html: &str) -> String {
    let elements = scanner::find_elements(html, is_line_container);
    if elements.is_empty() {
        return html.to_string();
    }
    scanner::splice_elements(html, &elements, |_| "")
}

/// Plain text of the first element of any kind classed `dc-translation`
pub fn any_container_text(html: &str) -> Option<String> {
    let element = scanner::first_element(html, |tag| tag.has_class(TRANSLATION_CLASS))?;
    non_empty(strip_tags(element.inner(html)))
}

/// Plain text of a cloze back-half
pub fn cloze_back_text(back: &str) -> Option<String> {
    non_empty(strip_tags(back))
}

/// Plain text of the first cloze marker whose back-half is non-empty
pub fn first_cloze_back_text(html: &str) -> Option<String> {
    CLOZE_REGEX
        .captures_iter(html)
        .filter_map(|caps| caps.get(2))
        .find_map(|back| cloze_back_text(back.as_str()))
}
