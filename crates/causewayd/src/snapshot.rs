use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use causeway_core::GraphSnapshot;

pub fn load_snapshot(path: &Path) -> Result<GraphSnapshot> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read graph snapshot {}", path.display()))?;
    let snapshot: GraphSnapshot = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse graph snapshot {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        mechanisms = snapshot.mechanisms.len(),
        nodes = snapshot.nodes.as_ref().map(Vec::len),
        "graph snapshot loaded"
    );
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn loads_mechanism_only_snapshot() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("graph.json");
        fs::write(
            &path,
            r#"{"mechanisms":[{"id":"m1","source":"a","target":"b","direction":"negative","evidence_quality":"A"}]}"#,
        )
        .expect("write snapshot");

        let snapshot = load_snapshot(&path).expect("load snapshot");
        assert_eq!(snapshot.mechanisms.len(), 1);
        assert!(snapshot.nodes.is_none());
    }

    #[test]
    fn parse_failures_name_the_file() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("broken.json");
        fs::write(&path, "{not json").expect("write snapshot");

        let err = load_snapshot(&path).expect_err("invalid json");
        assert!(format!("{err:#}").contains("broken.json"));
    }
}
