use anyhow::{Result, Context};
use std::fs;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

// @module: File and directory utilities

/// Leading bytes of every zip local file header
const ZIP_MAGIC: [u8; 4] = [b'P', b'K', 0x03, 0x04];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }
    
    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }
    
    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }
    
    // @generates: Output path for a converted table
    // @params: input_file, output_dir, suffix, extension
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        suffix: &str,
        extension: &str,
    ) -> PathBuf {
        let input_file = input_file.as_ref();
        let output_dir = output_dir.as_ref();
        
        // Get the file stem (filename without extension)
        let stem = input_file.file_stem().unwrap_or_default();
        
        let mut output_filename = stem.to_string_lossy().to_string();
        output_filename.push_str(suffix);
        output_filename.push('.');
        output_filename.push_str(extension);
        
        output_dir.join(output_filename)
    }
    
    /// List files with a specific extension directly inside a directory, sorted by name
    pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        let extension = extension.trim_start_matches('.');
        
        for entry in WalkDir::new(dir.as_ref()).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();
            
            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext.to_string_lossy().eq_ignore_ascii_case(extension) {
                        result.push(path.to_path_buf());
                    }
                }
            }
        }
        
        Ok(result)
    }
    
    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }
    
    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }
        
        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;
        
        Ok(())
    }

    /// Create a temporary file next to `destination`, to be persisted over it once complete
    pub fn temp_file_for<P: AsRef<Path>>(destination: P) -> Result<NamedTempFile> {
        let destination = destination.as_ref();
        let parent = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::ensure_dir(&parent)?;
        NamedTempFile::new_in(&parent)
            .with_context(|| format!("Failed to create temporary file in {:?}", parent))
    }
    
    /// Stream `reader` into `destination` through a temporary file, then rename it into place
    pub fn copy_atomically<R: Read + ?Sized, P: AsRef<Path>>(reader: &mut R, destination: P) -> Result<u64> {
        let destination = destination.as_ref();
        let mut temp = Self::temp_file_for(destination)?;
        let written = io::copy(reader, &mut temp)
            .with_context(|| format!("Failed to write temporary file for {:?}", destination))?;
        temp.persist(destination)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to move file into place: {:?}", destination))?;
        Ok(written)
    }

    /// Detect whether a file is a flashcard package or a plain data table
    pub fn detect_file_type<P: AsRef<Path>>(path: P) -> Result<FileType> {
        let path = path.as_ref();
        
        if !path.exists() {
            return Err(anyhow::anyhow!("File does not exist: {:?}", path));
        }
        
        // Check file extension
        if let Some(ext) = path.extension() {
            let ext_str = ext.to_string_lossy().to_lowercase();
            
            if ext_str == "zip" {
                return Ok(FileType::Package);
            }
            
            if ["csv", "tsv", "txt"].contains(&ext_str.as_str()) {
                return Ok(FileType::Table);
            }
        }
        
        // Fall back to examining the first bytes
        let mut magic = [0u8; 4];
        let mut file = File::open(path)
            .with_context(|| format!("Failed to open file: {:?}", path))?;
        if file.read_exact(&mut magic).is_ok() && magic == ZIP_MAGIC {
            return Ok(FileType::Package);
        }
        
        // Default to unknown if we couldn't determine the type
        Ok(FileType::Unknown)
    }
}

/// Enum representing different input file types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// Zip package holding a data file and media
    Package,
    /// Tab-separated data file
    Table,
    /// Unknown file type
    Unknown,
}
