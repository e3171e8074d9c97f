/*!
 * Card markup rewriting.
 *
 * Everything in this module is pure: no I/O, no shared mutable state. The
 * compiled patterns are read-only statics, so rewriters can be shared freely.
 */

mod patterns;
pub mod rewriter;
pub mod scanner;
pub mod text;
pub mod translation;

pub use rewriter::{transform, MarkupRewriter, TransformResult, DEFAULT_CLOZE_COLOR, SOUND_MARKER};
pub use text::strip_tags;
pub use translation::{TranslationSlot, TranslationSource};
