//! End-to-end summaries over CSV input.

use sheetsync_sheet::Sheet;
use sheetsync_stats::{summarize, StatsError};

#[test]
fn test_summary_serializes() {
    let sheet = Sheet::from_csv_str("TEMP,HUMIDITY\n10,40\n20,50\n30,60").unwrap();
    let summary = summarize(&sheet, None).unwrap();

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["columns"][0]["name"], "TEMP");
    assert_eq!(json["columns"][0]["describe"]["count"], 3);
    assert_eq!(json["columns"][1]["sum"], 150.0);
}

#[test]
fn test_bool_cell_in_explicit_column() {
    let sheet = Sheet::from_csv_str("TEMP\n10\ntrue\n").unwrap();
    let columns = vec!["TEMP".to_string()];

    let err = summarize(&sheet, Some(&columns)).unwrap_err();
    assert!(matches!(err, StatsError::NonNumeric { row: 3, .. }));
    assert!(err.to_string().contains("TEMP"));
}

#[test]
fn test_pressure_correlation_is_symmetric() {
    let sheet = Sheet::from_csv_str(
        "TEMP,HUMIDITY,PRESSURE\n27.5,44.9,1001.6\n27.6,45.1,1001.7\n27.4,44.2,1001.9\n27.9,45.8,1001.5",
    )
    .unwrap();
    let summary = summarize(&sheet, None).unwrap();

    let ab = summary.correlation.get("TEMP", "PRESSURE").unwrap();
    let ba = summary.correlation.get("PRESSURE", "TEMP").unwrap();
    assert!((ab - ba).abs() < 1e-12);
    assert!((summary.correlation.get("PRESSURE", "PRESSURE").unwrap() - 1.0).abs() < 1e-12);
}
