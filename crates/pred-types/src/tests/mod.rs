use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;


pub(crate) fn write_temp_json(contents: &serde_json::Value) -> (NamedTempFile, PathBuf) {
    let mut file = NamedTempFile::new().expect("create temp file");
    write!(file, "{contents}").expect("write temp file");
    let path = file.path().to_path_buf();
    (file, path)
}
