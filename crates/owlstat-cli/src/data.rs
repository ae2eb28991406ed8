use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context as _;
use owlstat_stats::dataset::GroupedDataset;
use serde::Deserialize;

/// One `(label, value)` record of an input file.
#[derive(Debug, Clone, Deserialize)]
pub struct Observation {
    pub label: String,
    pub value: f64,
}

/// Scores of three archers, six arrows each.
const ARCHERS: [(&str, f64); 18] = [
    ("Pat", 5.0),
    ("Pat", 4.0),
    ("Pat", 4.0),
    ("Pat", 3.0),
    ("Pat", 9.0),
    ("Pat", 4.0),
    ("Jack", 4.0),
    ("Jack", 8.0),
    ("Jack", 7.0),
    ("Jack", 5.0),
    ("Jack", 1.0),
    ("Jack", 5.0),
    ("Alex", 9.0),
    ("Alex", 8.0),
    ("Alex", 8.0),
    ("Alex", 10.0),
    ("Alex", 5.0),
    ("Alex", 10.0),
];

pub fn archers() -> anyhow::Result<GroupedDataset> {
    Ok(GroupedDataset::from_pairs(ARCHERS)?)
}

/// Reads a JSON array of [`Observation`] records and groups them by label.
pub fn load_dataset(path: &Path) -> anyhow::Result<GroupedDataset> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open dataset file: {}", path.display()))?;
    let observations: Vec<Observation> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse dataset JSON file: {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        records = observations.len(),
        "loaded observations"
    );
    let dataset = GroupedDataset::from_pairs(observations.into_iter().map(|o| (o.label, o.value)))
        .with_context(|| format!("Invalid dataset: {}", path.display()))?;
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    fn write_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_dataset_keeps_discovery_order() {
        let file = write_file(
            r#"[
                {"label": "Jack", "value": 4.0},
                {"label": "Pat", "value": 5},
                {"label": "Jack", "value": 8.5},
                {"label": "Pat", "value": -1.25}
            ]"#,
        );
        let dataset = load_dataset(file.path()).unwrap();
        let labels: Vec<_> = dataset.labels().collect();
        assert_eq!(labels, ["Jack", "Pat"]);
        assert_eq!(dataset.get("Jack").unwrap().values(), &[4.0, 8.5]);
        assert_eq!(dataset.get("Pat").unwrap().values(), &[5.0, -1.25]);
    }

    #[test]
    fn test_malformed_file_is_reported() {
        let file = write_file(r#"[{"label": "a", "value": "#);
        let err = load_dataset(file.path()).unwrap_err();
        assert!(
            err.to_string()
                .starts_with("Failed to parse dataset JSON file"),
            "{err:#}"
        );
    }

    #[test]
    fn test_missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_dataset(&dir.path().join("missing.json")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to open dataset file"));
    }

    #[test]
    fn test_too_few_groups_is_reported() {
        let file = write_file(r#"[{"label": "a", "value": 1}, {"label": "a", "value": 2}]"#);
        let err = load_dataset(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("at least 2 groups are required"));
    }

    #[test]
    fn test_archers() {
        let dataset = archers().unwrap();
        assert_eq!(dataset.group_count(), 3);
        assert_eq!(dataset.total_count(), 18);
    }
}
