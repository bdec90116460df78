use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary source root holding `files`, returning the dir handle.
/// The caller must hold onto `TempDir` to keep the directory alive.
pub fn source_root(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, text) in files {
        let path = dir.path().join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, text).unwrap();
    }
    dir
}

/// Encode `records` as a binary profile.
pub fn profile(records: &[(&str, u64)]) -> Vec<u8> {
    let mut data = Vec::new();
    for (tag, count) in records {
        covlua::profile::encode_record(&mut data, tag, *count);
    }
    data
}

/// Write a profile file into `dir` and return its path.
#[allow(dead_code)]
pub fn write_profile(dir: &TempDir, records: &[(&str, u64)]) -> PathBuf {
    let path = dir.path().join("profile.bin");
    std::fs::write(&path, profile(records)).unwrap();
    path
}
