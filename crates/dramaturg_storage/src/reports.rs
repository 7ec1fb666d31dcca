//! Report writer.

use chrono::Utc;
use dramaturg_error::{DramaturgResult, StorageError, StorageErrorKind};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// File name of the final report.
pub const FINAL_REPORT_FILE: &str = "final_report.txt";
/// File name of the JSON run result.
pub const RESULT_FILE: &str = "pipeline_result.json";
/// File name of the artifact index.
pub const INDEX_FILE: &str = "index.txt";

const RULE: &str = "============================================================";

/// Writes analysis artifacts into one directory.
///
/// Layout:
///
/// ```text
/// analysis_output/
/// ├── station1_report.txt
/// ├── ...
/// ├── station6_report.txt
/// ├── final_report.txt
/// ├── pipeline_result.json
/// └── index.txt
/// ```
///
/// Every write goes to a temporary sibling first and is renamed into place.
#[derive(Debug, Clone)]
pub struct ReportStore {
    base_path: PathBuf,
}

impl ReportStore {
    /// Create a store, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> DramaturgResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        tracing::debug!(path = %base_path.display(), "Report store ready");
        Ok(Self { base_path })
    }

    /// Output directory.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// File name of a station report.
    pub fn station_file_name(station: u8) -> String {
        format!("station{}_report.txt", station)
    }

    /// Write a text file, replacing any previous version.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written or moved into place.
    #[tracing::instrument(skip(self, contents), fields(size = contents.len()))]
    pub async fn write_text(&self, file_name: &str, contents: &str) -> DramaturgResult<PathBuf> {
        let path = self.base_path.join(file_name);
        let temp_path = self.base_path.join(format!(".{}.tmp", file_name));

        tokio::fs::write(&temp_path, contents).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;

        tokio::fs::rename(&temp_path, &path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "Failed to move {} into place: {}",
                path.display(),
                e
            )))
        })?;

        tracing::debug!(path = %path.display(), "Artifact written");
        Ok(path)
    }

    /// Write `stationN_report.txt` with a title header.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written.
    pub async fn write_station_report(
        &self,
        station: u8,
        title: &str,
        body: &str,
    ) -> DramaturgResult<PathBuf> {
        let contents = format!(
            "Station {}: {}\nGenerated: {}\n{}\n\n{}\n",
            station,
            title,
            Utc::now().to_rfc3339(),
            RULE,
            body.trim_end()
        );
        self.write_text(&Self::station_file_name(station), &contents)
            .await
    }

    /// Write `final_report.txt`.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written.
    pub async fn write_final_report(&self, report: &str) -> DramaturgResult<PathBuf> {
        self.write_text(FINAL_REPORT_FILE, report).await
    }

    /// Write a value as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns error if serialization or the write fails.
    pub async fn write_json<T: Serialize + ?Sized>(
        &self,
        file_name: &str,
        value: &T,
    ) -> DramaturgResult<PathBuf> {
        let json = serde_json::to_string_pretty(value).map_err(|e| {
            StorageError::new(StorageErrorKind::Serialization(e.to_string()))
        })?;
        self.write_text(file_name, &json).await
    }

    /// Write `index.txt` listing the given artifacts.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written.
    pub async fn write_index(&self, project: &str, artifacts: &[PathBuf]) -> DramaturgResult<PathBuf> {
        let mut contents = format!(
            "Project: {}\nGenerated: {}\n{}\n\n",
            project,
            Utc::now().to_rfc3339(),
            RULE
        );
        for artifact in artifacts {
            let name = artifact
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| artifact.display().to_string());
            contents.push_str(&name);
            contents.push('\n');
        }
        self.write_text(INDEX_FILE, &contents).await
    }
}
