//! Report store filesystem tests.

use dramaturg_storage::{FINAL_REPORT_FILE, INDEX_FILE, RESULT_FILE, ReportStore};
use serde_json::json;

#[tokio::test]
async fn test_creates_nested_directory() -> anyhow::Result<()> {
    let temp = tempfile::tempdir()?;
    let dir = temp.path().join("a").join("b");
    let store = ReportStore::new(&dir)?;
    assert!(dir.is_dir());
    assert_eq!(store.base_path(), dir.as_path());
    Ok(())
}

#[tokio::test]
async fn test_station_report_has_header() -> anyhow::Result<()> {
    let temp = tempfile::tempdir()?;
    let store = ReportStore::new(temp.path())?;

    let path = store
        .write_station_report(3, "Conflict network", "Characters: 4\n\n")
        .await?;

    assert!(path.ends_with("station3_report.txt"));
    let contents = std::fs::read_to_string(&path)?;
    assert!(contents.starts_with("Station 3: Conflict network\n"));
    assert!(contents.ends_with("Characters: 4\n"));
    Ok(())
}

#[tokio::test]
async fn test_rewrite_replaces_contents() -> anyhow::Result<()> {
    let temp = tempfile::tempdir()?;
    let store = ReportStore::new(temp.path())?;

    store.write_final_report("first").await?;
    let path = store.write_final_report("second").await?;

    assert_eq!(std::fs::read_to_string(path)?, "second");
    let leftovers: Vec<_> = std::fs::read_dir(temp.path())?
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_json_and_index() -> anyhow::Result<()> {
    let temp = tempfile::tempdir()?;
    let store = ReportStore::new(temp.path())?;

    let json_path = store.write_json(RESULT_FILE, &json!({"ok": true})).await?;
    let final_path = store.write_final_report("done").await?;
    let index_path = store
        .write_index("Demo", &[json_path.clone(), final_path])
        .await?;

    let parsed: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(json_path)?)?;
    assert_eq!(parsed, json!({"ok": true}));

    assert!(index_path.ends_with(INDEX_FILE));
    let index = std::fs::read_to_string(index_path)?;
    assert!(index.contains("Project: Demo"));
    assert!(index.contains(RESULT_FILE));
    assert!(index.contains(FINAL_REPORT_FILE));
    Ok(())
}
