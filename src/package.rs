/*!
 * Flashcard package access.
 *
 * A package is a zip archive holding one delimited data file and, optionally,
 * a top-level `media/` directory with the images and audio the cards use.
 */

use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, warn};
use zip::ZipArchive;

use crate::app_config::MediaPolicy;
use crate::errors::PackageError;
use crate::file_utils::FileManager;
use crate::markup::MarkupRewriter;
use crate::record_io::{self, ConversionStats};

/// Data file names preferred over any other candidate
pub const DATA_FILE_NAMES: [&str; 2] = ["item.csv", "items.csv"];

/// Extensions accepted for a fallback data file
pub const DATA_FILE_EXTENSIONS: [&str; 2] = ["csv", "tsv"];

/// Top-level directory holding media assets
pub const MEDIA_DIR: &str = "media";

/// Archive metadata written by macOS, never card data
const METADATA_DIR: &str = "__MACOSX";

/// Outcome of copying a package's media
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MediaCopyReport {
    /// Files written to the destination
    pub copied: usize,
    /// Files left alone because they already existed
    pub skipped: usize,
    /// Entries that could not be placed safely
    pub ignored: usize,
    /// Bytes written
    pub bytes: u64,
}

fn base_name(entry: &str) -> &str {
    entry.rsplit('/').next().unwrap_or(entry)
}

fn is_metadata(entry: &str) -> bool {
    entry.split('/').next().is_some_and(|first| first == METADATA_DIR)
}

fn is_media(entry: &str) -> bool {
    entry.split('/').next().is_some_and(|first| first.eq_ignore_ascii_case(MEDIA_DIR))
}

fn has_data_extension(entry: &str) -> bool {
    Path::new(base_name(entry))
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| DATA_FILE_EXTENSIONS.contains(&ext.as_str()))
}

/// Pick the data file among `names`.
///
/// An entry whose base name is one of `DATA_FILE_NAMES` wins outright.
/// Otherwise exactly one entry with a `DATA_FILE_EXTENSIONS` extension must
/// exist. Directories, media and archive metadata are never candidates.
pub fn select_data_file<'a>(package: &Path, names: &[&'a str]) -> Result<&'a str, PackageError> {
    let candidates: Vec<&'a str> = names
        .iter()
        .copied()
        .filter(|name| !name.ends_with('/') && !is_metadata(name) && !is_media(name))
        .collect();

    if let Some(preferred) = candidates.iter().copied().find(|name| {
        let base = base_name(name).to_lowercase();
        DATA_FILE_NAMES.contains(&base.as_str())
    }) {
        return Ok(preferred);
    }

    let fallback: Vec<&'a str> = candidates
        .into_iter()
        .filter(|name| has_data_extension(name))
        .collect();

    match fallback.as_slice() {
        [] => Err(PackageError::MissingDataFile(package.to_path_buf())),
        [only] => Ok(*only),
        many => Err(PackageError::AmbiguousDataFile {
            path: package.to_path_buf(),
            candidates: many.iter().map(|name| name.to_string()).collect(),
        }),
    }
}

/// Path of a media entry relative to the media directory.
/// `None` when the entry is not media or would escape the destination.
fn media_relative_path(enclosed: Option<PathBuf>) -> Option<PathBuf> {
    let enclosed = enclosed?;
    let mut components = enclosed.components();
    match components.next() {
        Some(Component::Normal(first)) if first.to_string_lossy().eq_ignore_ascii_case(MEDIA_DIR) => {}
        _ => return None,
    }
    let relative = components.as_path();
    if relative.as_os_str().is_empty() || !relative.components().all(|c| matches!(c, Component::Normal(_))) {
        return None;
    }
    Some(relative.to_path_buf())
}

/// An opened flashcard package
pub struct Package<R: Read + Seek> {
    path: PathBuf,
    archive: ZipArchive<R>,
}

impl Package<File> {
    /// Open a package from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PackageError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| PackageError::Archive {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_reader(path, file)
    }
}

impl<R: Read + Seek> Package<R> {
    /// Open a package from any seekable reader; `path` is used in messages
    pub fn from_reader<P: AsRef<Path>>(path: P, reader: R) -> Result<Self, PackageError> {
        let path = path.as_ref().to_path_buf();
        let archive = ZipArchive::new(reader).map_err(|e| PackageError::Archive {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Ok(Self { path, archive })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names of every entry, in archive order
    pub fn entry_names(&self) -> Vec<String> {
        self.archive.file_names().map(|name| name.to_string()).collect()
    }

    /// Name of the entry holding the card data
    pub fn locate_data_file(&self) -> Result<String, PackageError> {
        let names = self.entry_names();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        select_data_file(&self.path, &refs).map(|name| name.to_string())
    }

    /// Convert the package's data file into `writer`
    pub fn convert_data_file<W: Write>(
        &mut self,
        writer: W,
        rewriter: &MarkupRewriter,
        discard_bom: bool,
    ) -> Result<(ConversionStats, W)> {
        let name = self.locate_data_file()?;
        debug!("Using data file '{}' from {:?}", name, self.path);

        let entry = self
            .archive
            .by_name(&name)
            .map_err(|e| PackageError::Archive {
                path: self.path.clone(),
                message: e.to_string(),
            })?;

        record_io::convert_records(entry, writer, rewriter, discard_bom)
            .with_context(|| format!("Failed to convert '{}' in {:?}", name, self.path))
    }

    /// Copy every file under the package's `media/` directory into `destination`
    pub fn copy_media(&mut self, destination: &Path, policy: MediaPolicy) -> Result<MediaCopyReport> {
        let mut report = MediaCopyReport::default();

        for index in 0..self.archive.len() {
            let mut entry = self.archive.by_index(index).map_err(|e| PackageError::Archive {
                path: self.path.clone(),
                message: e.to_string(),
            })?;

            let name = entry.name().to_string();
            if entry.is_dir() || !is_media(&name) {
                continue;
            }

            let Some(relative) = media_relative_path(entry.enclosed_name()) else {
                warn!("Ignoring media entry with unsafe path: {}", name);
                report.ignored += 1;
                continue;
            };

            let target = destination.join(&relative);
            if target.exists() && policy == MediaPolicy::Skip {
                debug!("Media already present, skipping: {:?}", target);
                report.skipped += 1;
                continue;
            }

            let written = FileManager::copy_atomically(&mut entry, &target).map_err(|e| PackageError::MediaCopy {
                entry: name.clone(),
                message: format!("{:#}", e),
            })?;
            report.copied += 1;
            report.bytes += written;
        }

        Ok(report)
    }
}
