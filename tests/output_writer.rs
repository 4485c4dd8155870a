//! Result files: consistency across formats and refusal of inconsistent tables.

use radiomics_batch::models::{FeatureMap, FeatureValue, ReconciledTable};
use radiomics_batch::output::{read_csv_table, OutputError, OutputWriter};
use std::fs;
use tempfile::TempDir;

fn row(volume: f64, version: &str) -> FeatureMap {
    FeatureMap::from_iter([
        ("diagnostics_Versions_PyRadiomics", FeatureValue::from(version)),
        ("diagnostics_Spacing", FeatureValue::from(vec![0.5, 0.5, 1.0])),
        ("original_shape_VoxelVolume", FeatureValue::from(volume)),
    ])
}

#[test]
fn test_mismatched_headers_fail_before_touching_disk() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("out");

    let mut reordered = FeatureMap::new();
    reordered.insert("original_shape_VoxelVolume", 1.0);
    reordered.insert("diagnostics_Versions_PyRadiomics", "v3");
    reordered.insert("diagnostics_Spacing", vec![0.5, 0.5, 1.0]);
    let table = ReconciledTable::from_rows(vec![row(1.0, "v3"), reordered]);

    let err = OutputWriter::new(&target).write(&table).unwrap_err();
    assert!(matches!(err, OutputError::HeaderMismatch(ref m) if m.row == 1));
    assert!(!target.exists());
}

#[test]
fn test_mismatch_keeps_previous_results_intact() {
    let dir = TempDir::new().unwrap();
    let writer = OutputWriter::new(dir.path());
    writer
        .write(&ReconciledTable::from_rows(vec![row(1.0, "v3")]))
        .unwrap();
    let before = fs::read_to_string(dir.path().join("results.csv")).unwrap();

    let missing: FeatureMap = row(2.0, "v3")
        .into_iter()
        .filter(|(name, _)| name != "diagnostics_Spacing")
        .collect();
    let bad = ReconciledTable::from_rows(vec![row(2.0, "v3"), missing]);
    assert!(writer.write(&bad).is_err());

    let after = fs::read_to_string(dir.path().join("results.csv")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_rewrite_overwrites_instead_of_appending() {
    let dir = TempDir::new().unwrap();
    let writer = OutputWriter::new(dir.path());

    writer
        .write(&ReconciledTable::from_rows(vec![
            row(1.0, "v3"),
            row(2.0, "v3"),
            row(3.0, "v3"),
        ]))
        .unwrap();
    writer
        .write(&ReconciledTable::from_rows(vec![row(9.0, "v3")]))
        .unwrap();

    let csv = fs::read_to_string(dir.path().join("results.csv")).unwrap();
    assert_eq!(csv.lines().count(), 2);
    let txt = fs::read_to_string(dir.path().join("results.txt")).unwrap();
    assert_eq!(txt.lines().count(), 3);
    assert!(!txt.contains("Case-2_"));
}

#[test]
fn test_all_formats_enumerate_the_same_samples() {
    let dir = TempDir::new().unwrap();
    let table = ReconciledTable::from_rows(vec![row(1.5, "v3.0"), row(0.0, "v3.1")]);
    OutputWriter::new(dir.path()).write(&table).unwrap();

    let csv = fs::read_to_string(dir.path().join("results.csv")).unwrap();
    assert_eq!(
        csv,
        "diagnostics_Versions_PyRadiomics,diagnostics_Spacing,original_shape_VoxelVolume\n\
         v3.0,\"[0.5, 0.5, 1.0]\",1.5\n\
         v3.1,\"[0.5, 0.5, 1.0]\",0.0\n"
    );

    let txt = fs::read_to_string(dir.path().join("results.txt")).unwrap();
    assert!(txt.contains("Case-1_original_shape_VoxelVolume: 1.5\n"));
    assert!(txt.contains("Case-2_diagnostics_Versions_PyRadiomics: v3.1\n"));
    assert!(txt.contains("Case-2_diagnostics_Spacing: [0.5, 0.5, 1.0]\n"));

    let json_text = fs::read_to_string(dir.path().join("results.json")).unwrap();
    // Pretty-printed with two-space indentation
    assert!(json_text.starts_with("[\n  {\n    \"diagnostics_Versions_PyRadiomics\""));
    let json: serde_json::Value = serde_json::from_str(&json_text).unwrap();
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1]["diagnostics_Versions_PyRadiomics"], "v3.1");
    assert_eq!(rows[0]["diagnostics_Spacing"], serde_json::json!([0.5, 0.5, 1.0]));
}

#[test]
fn test_written_csv_reads_back() {
    let dir = TempDir::new().unwrap();
    let table = ReconciledTable::from_rows(vec![row(1.5, "v3.0"), row(4.0, "v3.1")]);
    let outputs = OutputWriter::new(dir.path())
        .with_formats(true, false, false)
        .write(&table)
        .unwrap();

    let loaded = read_csv_table(outputs.csv.unwrap()).unwrap();
    assert_eq!(loaded.headers(), table.headers());
    assert_eq!(loaded.len(), 2);
    assert_eq!(
        loaded.rows()[1].get("original_shape_VoxelVolume"),
        Some(&FeatureValue::Number(4.0))
    );
    assert_eq!(
        loaded.rows()[0].get("diagnostics_Spacing"),
        Some(&FeatureValue::Array(vec![0.5, 0.5, 1.0]))
    );
}
