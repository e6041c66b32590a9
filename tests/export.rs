use std::path::PathBuf;

use terminus::config::load_and_build;
use terminus::export::{points, summary};
use terminus::terminator::{TerminatorContext, TerminatorTable, find_terminator_points};

fn mars_table() -> (terminus::config::Scenario, TerminatorTable) {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("configs/scenarios/mars.yaml");
    let scenario = load_and_build(path).expect("mars scenario");
    let context = TerminatorContext::new(&scenario.ephemeris);
    let table = find_terminator_points(&context, &scenario.request).expect("terminator table");
    (scenario, table)
}

#[test]
fn csv_has_one_record_per_point() {
    let (_, table) = mars_table();
    let mut buffer = Vec::new();
    points::write_table(&mut buffer, &table).expect("csv");

    let mut reader = csv::Reader::from_reader(buffer.as_slice());
    let headers = reader.headers().expect("headers").clone();
    assert_eq!(headers.iter().collect::<Vec<_>>().join(","), points::HEADER);

    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.expect("record")).collect();
    assert_eq!(records.len(), table.point_count());
    for (record, (cut, point)) in records.iter().zip(table.points()) {
        assert_eq!(record[0].parse::<usize>().unwrap(), cut);
        let x: f64 = record[5].parse().unwrap();
        assert!((x - point.position[0]).abs() < 1e-6);
        assert!(record[4].ends_with("TDB"));
    }
    let rolls: Vec<f64> = records.iter().map(|r| r[1].parse().unwrap()).collect();
    assert_eq!(rolls.len(), 3);
    assert!((rolls[1] - 120.0).abs() < 1e-6);
    assert!((rolls[2] - 240.0).abs() < 1e-6);
}

#[test]
fn json_summary_echoes_the_request_and_rows() {
    let (scenario, table) = mars_table();
    let dir = tempfile::tempdir().expect("tempdir");
    let output = dir.path().join("nested").join("mars.json");
    let request = &scenario.request;
    let (method, source, target, observer, correction, locus) = (
        request.method.to_string(),
        request.illumination_source.to_string(),
        request.target.to_string(),
        request.observer.to_string(),
        request.aberration_correction.to_string(),
        request.locus.to_string(),
    );
    let meta = summary::Metadata {
        scenario: scenario.name.as_deref(),
        method: &method,
        illumination_source: &source,
        target: &target,
        observer: &observer,
        frame: &request.frame,
        epoch: request.epoch,
        aberration_correction: &correction,
        locus: &locus,
    };
    summary::write_summary(&output, &meta, &table).expect("summary");

    let json: serde_json::Value =
        serde_json::from_reader(std::fs::File::open(&output).expect("open")).expect("parse");
    assert_eq!(json["scenario"], "mars-umbral");
    assert_eq!(json["method"], "UMBRAL/TANGENT/ELLIPSOID");
    assert_eq!(json["aberration_correction"], "LT+S");
    assert_eq!(json["point_count"], 3);
    let cuts = json["cuts"].as_array().expect("cuts");
    assert_eq!(cuts.len(), 3);
    assert_eq!(cuts[2]["cut"], 2);
    assert_eq!(cuts[0]["points"].as_array().expect("points").len(), 1);
    assert!(json["epoch_tdb"].as_str().expect("epoch").starts_with("2008 AUG 11"));
}
