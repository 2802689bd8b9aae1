use crate::error::{LoadError, Result};
use std::path::{Path, PathBuf};
use stixview_graph::Bundle;

/// Load a bundle from dropped files: only the first one is used
pub async fn ingest_files(paths: &[PathBuf]) -> Result<Bundle> {
    let Some(first) = paths.first() else {
        return Err(LoadError::NoFile);
    };
    if paths.len() > 1 {
        log::warn!(
            "{} files given, loading only the first one ({})",
            paths.len(),
            first.display()
        );
    }
    ingest_file(first).await
}

pub async fn ingest_file(path: &Path) -> Result<Bundle> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if !is_json {
        log::warn!("{} does not look like a JSON file, trying anyway", path.display());
    }

    let bytes = tokio::fs::read(path).await.map_err(|err| LoadError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    ingest_bytes(&path.display().to_string(), &bytes)
}

/// Parse raw JSON text (a dropped file's contents, stdin, ...)
pub fn ingest_bytes(source_name: &str, bytes: &[u8]) -> Result<Bundle> {
    Bundle::from_json_slice(bytes).map_err(|err| LoadError::from_graph(source_name, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn first_of_many_files_is_loaded() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("a.json");
        let second = dir.path().join("b.json");
        fs::write(&first, r#"{"id": "bundle--a", "objects": []}"#).unwrap();
        fs::write(&second, r#"{"id": "bundle--b", "objects": []}"#).unwrap();

        let bundle = ingest_files(&[first, second]).await.unwrap();
        assert_eq!(bundle.id.as_deref(), Some("bundle--a"));
    }

    #[tokio::test]
    async fn no_files_is_an_error() {
        assert_eq!(ingest_files(&[]).await.unwrap_err(), LoadError::NoFile);
    }

    #[tokio::test]
    async fn unreadable_file_reports_io() {
        let dir = tempdir().unwrap();
        let err = ingest_file(&dir.path().join("missing.json")).await.unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }), "{err}");
    }

    #[test]
    fn bad_json_and_bad_bundle_are_distinguished() {
        assert!(matches!(
            ingest_bytes("drop", b"{not json"),
            Err(LoadError::Parse { .. })
        ));
        assert!(matches!(
            ingest_bytes("drop", br#"{"objects": 3}"#),
            Err(LoadError::Bundle { .. })
        ));
    }
}
