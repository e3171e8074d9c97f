/*!
 * End-to-end tests for converting packages and tables
 */

use std::fs;

use anyhow::Result;
use clozeport::app_config::{Config, MediaPolicy};
use clozeport::app_controller::{Controller, Outcome};
use clozeport::package::MediaCopyReport;
use clozeport::record_io::RecordReader;

use crate::common;

fn read_rows(path: &std::path::Path) -> Result<Vec<(String, String)>> {
    let bytes = fs::read(path)?;
    let mut rows = Vec::new();
    for record in RecordReader::new(bytes.as_slice()) {
        let record = record?;
        rows.push((record.markup, record.sound));
    }
    Ok(rows)
}

/// Test converting a folder, then running it again without force
#[test]
fn test_runFolder_withPackages_shouldConvertThenSkip() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let config = common::test_config(temp_dir.path());
    fs::create_dir_all(&config.raw_dir)?;
    
    let first_rows = format!(
        "{}{}",
        common::sample_row("Katze", "cat", "[sound:katze.mp3]"),
        common::sample_row("Hund", "dog", "")
    );
    common::create_test_package(
        &config.raw_dir,
        "animals.zip",
        &[
            ("item.csv", first_rows.as_bytes()),
            ("media/", b""),
            ("media/katze.mp3", b"meow"),
        ],
    )?;
    common::create_test_package(
        &config.raw_dir,
        "colors.zip",
        &[("deck/items.csv", common::sample_row("Rot", "red", "").as_bytes())],
    )?;
    common::create_test_file(&config.raw_dir, "notes.txt", "ignored")?;
    
    let controller = Controller::with_config(config.clone())?;
    let summary = controller.run_folder(&config.raw_dir, false)?;
    
    assert_eq!(summary.converted, 2);
    assert_eq!(summary.failed, 0);
    
    let animals = read_rows(&config.processed_dir.join("animals_out.tsv"))?;
    assert_eq!(animals.len(), 2);
    assert_eq!(animals[0].1, "cat");
    assert!(animals[0].0.contains("[sound:katze.mp3]"));
    assert!(animals[0].0.contains(r#"<span style="color:rgb(255, 189, 128);">Katze</span>"#));
    assert_eq!(animals[1].1, "dog");
    assert_eq!(fs::read_to_string(config.media_dir.join("katze.mp3"))?, "meow");
    
    let colors = read_rows(&config.processed_dir.join("colors_out.tsv"))?;
    assert_eq!(colors[0].1, "red");
    
    let again = controller.run_folder(&config.raw_dir, false)?;
    assert_eq!(again.converted, 0);
    assert_eq!(again.skipped, 2);
    assert_eq!(again.total(), 2);
    Ok(())
}

/// Test that forcing replaces an existing output
#[test]
fn test_run_withForce_shouldReplaceOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = common::test_config(temp_dir.path());
    fs::create_dir_all(&config.raw_dir)?;
    let package = common::create_test_package(
        &config.raw_dir,
        "deck.zip",
        &[("item.csv", common::sample_row("Eins", "one", "").as_bytes())],
    )?;
    let controller = Controller::with_config(config.clone())?;
    let output = controller.output_path_for(&package);
    fs::create_dir_all(&config.processed_dir)?;
    fs::write(&output, "stale\n")?;
    
    let skipped = controller.run(&package, false)?;
    assert_eq!(skipped, Outcome::Skipped { output: output.clone() });
    assert_eq!(fs::read_to_string(&output)?, "stale\n");
    
    let converted = controller.run(&package, true)?;
    match converted {
        Outcome::Converted { output: written, stats, media } => {
            assert_eq!(written, output);
            assert_eq!(stats.rows_written, 1);
            assert_eq!(media, Some(MediaCopyReport::default()));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(read_rows(&output)?[0].1, "one");
    Ok(())
}

/// Test that a broken package stops the run by default
#[test]
fn test_runFolder_withBrokenPackage_shouldFailFast() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = common::test_config(temp_dir.path());
    fs::create_dir_all(&config.raw_dir)?;
    common::create_test_file(&config.raw_dir, "a_broken.zip", "not a zip")?;
    common::create_test_package(
        &config.raw_dir,
        "b_good.zip",
        &[("item.csv", common::sample_row("x", "y", "").as_bytes())],
    )?;
    
    let controller = Controller::with_config(config.clone())?;
    let result = controller.run_folder(&config.raw_dir, false);
    
    let err = result.unwrap_err();
    assert!(format!("{:#}", err).contains("a_broken.zip"));
    assert!(!config.processed_dir.join("b_good_out.tsv").exists());
    Ok(())
}

/// Test that keep_going converts the rest and counts failures
#[test]
fn test_runFolder_withKeepGoing_shouldCountFailures() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = Config {
        keep_going: true,
        ..common::test_config(temp_dir.path())
    };
    fs::create_dir_all(&config.raw_dir)?;
    common::create_test_file(&config.raw_dir, "a_broken.zip", "not a zip")?;
    common::create_test_package(&config.raw_dir, "b_nodata.zip", &[("readme.md", b"hi")])?;
    common::create_test_package(
        &config.raw_dir,
        "c_good.zip",
        &[("item.csv", common::sample_row("x", "y", "").as_bytes())],
    )?;
    
    let summary = Controller::with_config(config.clone())?.run_folder(&config.raw_dir, false)?;
    
    assert_eq!(summary.converted, 1);
    assert_eq!(summary.failed, 2);
    assert!(config.processed_dir.join("c_good_out.tsv").exists());
    assert!(!config.processed_dir.join("b_nodata_out.tsv").exists());
    Ok(())
}

/// Test converting a plain data table
#[test]
fn test_run_withTable_shouldConvertWithoutMedia() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = Config {
        color: "#0000ff".to_string(),
        ..common::test_config(temp_dir.path())
    };
    let table = common::create_test_file(
        temp_dir.path(),
        "export.tsv",
        &format!("\u{FEFF}{}", common::sample_row("blau", "blue", "[sound:b.mp3]")),
    )?;
    
    let outcome = Controller::with_config(config.clone())?.run(&table, false)?;
    
    let output = config.processed_dir.join("export_out.tsv");
    assert!(matches!(outcome, Outcome::Converted { media: None, .. }));
    let rows = read_rows(&output)?;
    assert!(rows[0].0.starts_with("<div class=\"dc-card\""));
    assert!(rows[0].0.contains(r#"<span style="color:#0000ff;">blau</span>"#));
    assert_eq!(rows[0].1, "blue");
    Ok(())
}

/// Test that unknown inputs are rejected
#[test]
fn test_run_withUnknownFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = common::test_config(temp_dir.path());
    let other = common::create_test_file(temp_dir.path(), "notes.md", "# hi")?;
    
    let result = Controller::with_config(config)?.run(&other, false);
    
    assert!(result.unwrap_err().to_string().contains("Unsupported input file"));
    Ok(())
}

/// Test that media copying honours the overwrite policy
#[test]
fn test_run_withOverwritePolicy_shouldReplaceMedia() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = Config {
        media_policy: MediaPolicy::Overwrite,
        ..common::test_config(temp_dir.path())
    };
    fs::create_dir_all(&config.media_dir)?;
    fs::write(config.media_dir.join("a.png"), "old")?;
    let package = common::create_test_package(
        temp_dir.path(),
        "deck.zip",
        &[("item.csv", b"front\n"), ("media/a.png", b"new")],
    )?;
    
    Controller::with_config(config.clone())?.run(&package, false)?;
    
    assert_eq!(fs::read_to_string(config.media_dir.join("a.png"))?, "new");
    Ok(())
}

/// Test folder edge cases
#[test]
fn test_runFolder_withMissingOrEmptyDirectory_shouldErrorOrDoNothing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = common::test_config(temp_dir.path());
    let controller = Controller::with_config(config.clone())?;
    
    assert!(controller.run_folder(&config.raw_dir, false).is_err());
    
    fs::create_dir_all(&config.raw_dir)?;
    let summary = controller.run_folder(&config.raw_dir, false)?;
    assert_eq!(summary.total(), 0);
    Ok(())
}

/// Test that an invalid configuration is refused up front
#[test]
fn test_withConfig_withInvalidColor_shouldFail() {
    let config = Config {
        color: "red;display:none".to_string(),
        ..Config::default()
    };
    
    assert!(Controller::with_config(config).is_err());
}
