/*!
 * Compiled patterns shared by every rewrite pass.
 *
 * All patterns are built once on first use and only ever read afterwards,
 * so a single rewriter can be used from any number of threads.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// `<style ...> ... </style>` blocks, across lines, shortest body first
pub(crate) static STYLE_BLOCK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").expect("Invalid style block regex")
});

/// `{{c1::front}}` or `{{c1::front::back}}`
pub(crate) static CLOZE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)\{\{c\d+::(.*?)(?:::([^}]*))?\}\}").expect("Invalid cloze regex")
});

/// Any opening, closing or self-closing tag.
/// Groups: 1 = `/` for closing tags, 2 = tag name, 3 = attribute text, 4 = trailing `/`
pub(crate) static TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<(/?)([a-z][a-z0-9-]*)(\s[^>]*?)?(/?)>").expect("Invalid tag regex")
});

/// `class="..."` or `class='...'` inside an attribute list
pub(crate) static CLASS_ATTR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:^|\s)class\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("Invalid class attribute regex")
});

/// `style="..."` or `style='...'` inside an attribute list
pub(crate) static STYLE_ATTR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:^|\s)style\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("Invalid style attribute regex")
});

/// `background-image: url(...)` declaration inside a style value
pub(crate) static BACKGROUND_IMAGE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)background-image\s*:\s*url\(([^)]+)\)").expect("Invalid background image regex")
});
