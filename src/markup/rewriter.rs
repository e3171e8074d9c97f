/*!
 * Card markup rewriting.
 *
 * `MarkupRewriter::rewrite` runs a fixed sequence of passes over one card
 * fragment. Each pass reads the previous pass's output and a pass that finds
 * nothing to do returns its input unchanged, so any string is accepted.
 *
 * 1. drop `<style>` blocks
 * 2. pull out the translation text
 * 3. turn cloze markers into colored spans
 * 4. unwrap `dc-down` / `dc-gap` decorations
 * 5. restyle `dc-card` containers
 * 6. restyle `dc-image` boxes
 * 7. put the audio reference under the first `dc-line`
 * 8. collapse double spaces
 */

use regex::Captures;

use super::patterns::{BACKGROUND_IMAGE_REGEX, CLOZE_REGEX, STYLE_BLOCK_REGEX, TAG_REGEX};
use super::scanner::{self, Tag};
use super::text::{escape_attribute, escape_quotes, escape_text, strip_tags};
use super::translation::{self, TranslationSlot, TranslationSource};

/// Cloze color used when none is configured
pub const DEFAULT_CLOZE_COLOR: &str = "rgb(255, 189, 128)";

/// Prefix of an embedded audio reference
pub const SOUND_MARKER: &str = "[sound:";

const CARD_CLASS: &str = "dc-card";
const IMAGE_CLASS: &str = "dc-image";
const LINE_CLASS: &str = "dc-line";
const DECORATION_CLASSES: [&str; 2] = ["dc-down", "dc-gap"];

const CARD_STYLE: &str = "padding-bottom:1rem;";
const AUDIO_STYLE: &str = "padding:0.4rem;margin-top:0.25rem;";
const IMAGE_LAYOUT: [&str; 8] = [
    "display:inline-block",
    "width:calc(50% - 10px)",
    "padding-bottom:29%",
    "background-position:center",
    "background-repeat:no-repeat",
    "background-size:cover",
    "margin-left:2px",
    "margin-right:2px",
];

/// Output of one rewrite
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformResult {
    /// Rewritten card markup
    pub markup: String,
    /// Plain translation text, empty when none was found
    pub translation: String,
    /// Which lookup supplied `translation`
    pub translation_source: Option<TranslationSource>,
}

impl TransformResult {
    pub fn into_pair(self) -> (String, String) {
        (self.markup, self.translation)
    }
}

/// Rewrites card markup for a single cloze color
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupRewriter {
    color: String,
}

impl Default for MarkupRewriter {
    fn default() -> Self {
        Self::new(DEFAULT_CLOZE_COLOR)
    }
}

impl MarkupRewriter {
    pub fn new(color: impl Into<String>) -> Self {
        Self { color: color.into() }
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    /// Rewrite one fragment. `sound` is the raw sound field of the record.
    pub fn rewrite(&self, markup: &str, sound: &str) -> TransformResult {
        let mut slot = TranslationSlot::new();

        let html = strip_style_blocks(markup);
        let html = extract_translation(&html, &mut slot);
        let html = rewrite_clozes(&html, &self.color, &mut slot);
        let html = unwrap_decorations(&html);
        let html = normalize_cards(&html);
        let html = normalize_images(&html);
        let html = insert_audio(&html, sound);
        let html = collapse_double_spaces(&html);

        let (translation, translation_source) = slot.into_parts();
        TransformResult {
            markup: html,
            translation,
            translation_source,
        }
    }
}

/// Rewrite `markup` and return `(markup, translation)`
pub fn transform(markup: &str, sound: &str, color: &str) -> (String, String) {
    MarkupRewriter::new(color).rewrite(markup, sound).into_pair()
}

pub fn strip_style_blocks(html: &str) -> String {
    STYLE_BLOCK_REGEX.replace_all(html, "").into_owned()
}

/// Fill `slot` from the ordered sources and return the fragment with its
/// `dc-line dc-translation` containers removed.
pub fn extract_translation(html: &str, slot: &mut TranslationSlot) -> String {
    let remaining = translation::remove_line_containers(html);
    for source in TranslationSource::ORDER {
        if slot.is_filled() {
            break;
        }
        slot.offer(source, source.lookup(html, &remaining));
    }
    remaining
}

/// Replace each cloze marker with a colored span holding its plain front text.
/// Markers whose front is empty once stripped are deleted.
pub fn rewrite_clozes(html: &str, color: &str, slot: &mut TranslationSlot) -> String {
    let color = escape_attribute(color);
    CLOZE_REGEX
        .replace_all(html, |caps: &Captures<'_>| {
            if let Some(back) = caps.get(2) {
                slot.offer(TranslationSource::ClozeBack, translation::cloze_back_text(back.as_str()));
            }
            let plain = strip_tags(caps.get(1).map_or("", |m| m.as_str()));
            if plain.is_empty() {
                return String::new();
            }
            format!("<span style=\"color:{};\">{}</span>", color, escape_text(&plain))
        })
        .into_owned()
}

fn is_decoration(tag: &Tag<'_>) -> bool {
    DECORATION_CLASSES.iter().any(|class| tag.has_class(class))
}

fn unwrap_pass(html: &str) -> String {
    let elements = scanner::find_elements(html, is_decoration);
    scanner::splice_elements(html, &elements, |e| e.inner(html))
}

/// Replace decorative wrappers with their content until a pass changes nothing.
/// Unwrapping one layer can expose another decoration nested inside it.
pub fn unwrap_decorations(html: &str) -> String {
    let mut current = html.to_string();
    loop {
        let next = unwrap_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Apply `rewrite` to every opening tag; `None` keeps the tag as written
fn rewrite_open_tags(html: &str, rewrite: impl Fn(&Tag<'_>) -> Option<String>) -> String {
    TAG_REGEX
        .replace_all(html, |caps: &Captures<'_>| {
            let tag = Tag::from_captures(caps, 0);
            let original = || caps.get(0).map_or(String::new(), |m| m.as_str().to_string());
            if tag.closing {
                return original();
            }
            rewrite(&tag).unwrap_or_else(original)
        })
        .into_owned()
}

fn tag_end(tag: &Tag<'_>) -> &'static str {
    if tag.self_closing { " />" } else { ">" }
}

/// `dc-card` elements keep their class and get a fixed bottom padding
pub fn normalize_cards(html: &str) -> String {
    rewrite_open_tags(html, |tag| {
        let class = tag.class().filter(|class| scanner::has_class_token(class, CARD_CLASS))?;
        Some(format!(
            "<{} class=\"{}\" style=\"{}\"{}",
            tag.name,
            escape_quotes(class),
            CARD_STYLE,
            tag_end(tag)
        ))
    })
}

/// Inline layout for a `dc-image` style, keeping its background image
pub fn image_style(original: &str) -> String {
    let mut style = IMAGE_LAYOUT.join(";");
    style.push(';');
    if let Some(background) = BACKGROUND_IMAGE_REGEX.find(original) {
        style.push_str(background.as_str());
        if !background.as_str().ends_with(';') {
            style.push(';');
        }
    }
    style
}

/// Styled `dc-image` elements get a fixed box layout
pub fn normalize_images(html: &str) -> String {
    rewrite_open_tags(html, |tag| {
        let class = tag.class().filter(|class| scanner::has_class_token(class, IMAGE_CLASS))?;
        let style = tag.style()?;
        Some(format!(
            "<{} class=\"{}\" style=\"{}\"{}",
            tag.name,
            escape_quotes(class),
            escape_quotes(&image_style(style)),
            tag_end(tag)
        ))
    })
}

/// Trim a raw sound field down to the audio reference it carries
pub fn normalize_sound(sound: &str) -> Option<&str> {
    let trimmed = sound.trim_matches(|c: char| c == '"' || c == '\'' || c.is_whitespace());
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with(SOUND_MARKER) {
        return Some(trimmed);
    }
    match trimmed.find(SOUND_MARKER) {
        Some(index) => Some(&trimmed[index..]),
        None => Some(trimmed),
    }
}

/// Insert an audio container right after the first plain `dc-line` element.
/// Without such an element the sound is dropped.
pub fn insert_audio(html: &str, sound: &str) -> String {
    let Some(sound) = normalize_sound(sound) else {
        return html.to_string();
    };
    let Some(line) = scanner::first_element(html, |tag| tag.class() == Some(LINE_CLASS)) else {
        return html.to_string();
    };

    let mut out = String::with_capacity(html.len() + sound.len() + 64);
    out.push_str(&html[..line.end]);
    out.push_str("<div class=\"dc-audio\" style=\"");
    out.push_str(AUDIO_STYLE);
    out.push_str("\">");
    out.push_str(sound);
    out.push_str("</div>");
    out.push_str(&html[line.end..]);
    out
}

/// Single pass: each pair of spaces becomes one, so longer runs only halve
pub fn collapse_double_spaces(html: &str) -> String {
    html.replace("  ", " ")
}
