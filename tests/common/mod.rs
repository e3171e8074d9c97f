/*!
 * Common test utilities for the clozeport test suite
 */

#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use anyhow::Result;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use clozeport::app_config::Config;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a zip package holding the given entries. Names ending in `/` become directories.
pub fn create_test_package(dir: &Path, filename: &str, entries: &[(&str, &[u8])]) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    let mut writer = ZipWriter::new(File::create(&file_path)?);
    let options = SimpleFileOptions::default();
    
    for (name, content) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options)?;
        } else {
            writer.start_file(*name, options)?;
            writer.write_all(content)?;
        }
    }
    
    writer.finish()?;
    Ok(file_path)
}

/// A single data row in package format: markup, sound, tags
pub fn sample_row(front: &str, translation: &str, sound: &str) -> String {
    format!(
        "\"<div class=\"\"dc-card\"\"><div class=\"\"dc-line\"\">{{{{c1::{}}}}}</div><div class=\"\"dc-line dc-translation\"\">{}</div></div>\"\t{}\tdeck::sample\n",
        front, translation, sound
    )
}

/// A configuration whose directories all live inside `root`
pub fn test_config(root: &Path) -> Config {
    Config {
        raw_dir: root.join("raw"),
        processed_dir: root.join("processed"),
        media_dir: root.join("processed").join("media"),
        ..Config::default()
    }
}

/// Route library logging to the test harness
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
