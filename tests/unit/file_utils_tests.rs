/*!
 * Tests for file and directory utilities
 */

use std::path::Path;
use docorrect::file_utils::FileManager;

use crate::common::{create_temp_dir, create_test_file};

#[test]
fn test_generateOutputPath_shouldPrefixFilename() {
    let output = FileManager::generate_output_path(
        Path::new("/docs/tesis.docx"),
        Path::new("/out"),
    );
    assert_eq!(output, Path::new("/out/corrected_tesis.docx"));
}

#[test]
fn test_fileExists_withRealAndMissingFiles_shouldReportCorrectly() {
    let temp_dir = create_temp_dir().unwrap();
    let dir_path = temp_dir.path().to_path_buf();
    let file = create_test_file(&dir_path, "exists.txt", "content").unwrap();

    assert!(FileManager::file_exists(&file));
    assert!(!FileManager::file_exists(dir_path.join("missing.txt")));
    // A directory is not a file
    assert!(!FileManager::file_exists(&dir_path));
    assert!(FileManager::dir_exists(&dir_path));
}

#[test]
fn test_ensureDir_withNestedPath_shouldCreateAllParents() {
    let temp_dir = create_temp_dir().unwrap();
    let nested = temp_dir.path().join("a").join("b").join("c");

    FileManager::ensure_dir(&nested).unwrap();
    assert!(FileManager::dir_exists(&nested));
}

#[test]
fn test_findFiles_withMixedExtensions_shouldFindOnlyMatching() {
    let temp_dir = create_temp_dir().unwrap();
    let dir_path = temp_dir.path().to_path_buf();

    create_test_file(&dir_path, "one.docx", "x").unwrap();
    create_test_file(&dir_path, "two.DOCX", "x").unwrap();
    create_test_file(&dir_path, "three.txt", "x").unwrap();

    let subdir = dir_path.join("sub");
    FileManager::ensure_dir(&subdir).unwrap();
    create_test_file(&subdir, "four.docx", "x").unwrap();

    let found = FileManager::find_files(&dir_path, "docx").unwrap();
    assert_eq!(found.len(), 3);
    assert!(found.iter().all(|p| {
        p.extension().unwrap().to_string_lossy().eq_ignore_ascii_case("docx")
    }));
}

#[test]
fn test_writeBytes_thenReadBytes_shouldRoundTrip() {
    let temp_dir = create_temp_dir().unwrap();
    let path = temp_dir.path().join("new_dir").join("data.bin");

    let payload = vec![0u8, 1, 2, 254, 255];
    FileManager::write_bytes(&path, &payload).unwrap();

    let read_back = FileManager::read_bytes(&path).unwrap();
    assert_eq!(read_back, payload);
}

#[test]
fn test_writeToFile_thenReadToString_shouldRoundTrip() {
    let temp_dir = create_temp_dir().unwrap();
    let path = temp_dir.path().join("log.txt");

    FileManager::write_to_file(&path, "línea uno\n").unwrap();
    assert_eq!(FileManager::read_to_string(&path).unwrap(), "línea uno\n");
}
