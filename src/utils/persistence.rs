use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Serialize};

use crate::errors::FlowError;

const TMP_SUFFIX: &str = "tmp";

pub fn ensure_dir(path: &Path) -> Result<(), FlowError> {
    fs::create_dir_all(path)?;
    Ok(())
}

/// Sibling path used to stage writes, e.g. `flow.json` -> `flow.json.tmp`.
pub fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

/// Serializes `value` to `path` by staging to a temporary file and renaming it
/// into place, so readers never see a half-written document.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), FlowError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Reads a JSON document, returning `None` when the file does not exist yet.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, FlowError> {
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&data)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn tmp_path_appends_suffix() {
        assert_eq!(
            tmp_path(Path::new("/data/flow.json")),
            PathBuf::from("/data/flow.json.tmp")
        );
        assert_eq!(tmp_path(Path::new("/data/flow")), PathBuf::from("/data/flow.tmp"));
    }

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempdir().unwrap();
        let value: Option<Vec<u32>> = read_json(&dir.path().join("absent.json")).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn atomic_write_leaves_no_staging_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("doc.json");
        write_json_atomic(&path, &vec![1, 2, 3]).unwrap();

        assert!(!tmp_path(&path).exists());
        let loaded: Option<Vec<u32>> = read_json(&path).unwrap();
        assert_eq!(loaded, Some(vec![1, 2, 3]));
    }
}
