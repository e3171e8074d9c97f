/*!
 * # clozeport - flashcard package converter
 * 
 * A Rust library for converting exported flashcard packages into a simple
 * two-column table for another flashcard tool.
 * 
 * ## Features
 * 
 * - Read zip packages holding a tab-separated data file and a `media/` folder
 * - Rewrite card markup:
 *   - drop `<style>` blocks
 *   - extract the translation line
 *   - turn cloze markers into colored spans
 *   - unwrap decorative wrappers and restyle card and image containers
 *   - place the audio reference under the main line
 * - Copy package media into a destination folder
 * - Batch processing of a whole directory of packages
 * 
 * ## Architecture
 * 
 * The library is organized in these main modules:
 * - `markup`: The pure markup rewriter
 *   - `markup::rewriter`: Rewrite pipeline and its passes
 *   - `markup::translation`: Ordered translation lookup
 *   - `markup::scanner`: Minimal tag-aware scanning
 *   - `markup::text`: Tag stripping and escaping
 * - `record_io`: Tab-separated record reading and writing
 * - `package`: Zip package access and media copying
 * - `file_utils`: File system operations
 * - `app_config`: Configuration management
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 * 
 * ## License
 * 
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod markup;
pub mod package;
pub mod record_io;

// Re-export main types for easier usage
pub use app_config::{Config, MediaPolicy};
pub use app_controller::{Controller, Outcome, RunSummary};
pub use errors::{AppError, PackageError, RecordError};
pub use markup::{transform, MarkupRewriter, TransformResult, TranslationSource};
pub use package::{MediaCopyReport, Package};
pub use record_io::{convert_records, CardRecord, ConversionStats, ConvertedRecord};
