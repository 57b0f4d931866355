mod common;

use common::{csv_text, report_header, report_row, zip_of, Call, FakeSheets, Op};
use csv_sheet_sync::pipeline::{process_upload, run_upload, UploadOptions, UploadRequest};
use csv_sheet_sync::processing::ExtractionMode;
use csv_sheet_sync::types::{ColumnMapping, LogicalField, SheetTarget};
use csv_sheet_sync::{StatusClass, SyncError};
use encoding_rs::WINDOWS_1252;

fn target() -> SheetTarget {
    SheetTarget::new("spreadsheet-1", "data_integration")
}

fn named_options() -> UploadOptions {
    UploadOptions {
        mode: ExtractionMode::NamedMapping,
        ..Default::default()
    }
}

#[test]
fn positional_upload_publishes_filtered_sorted_rows() {
    let first = csv_text(&[
        report_header(),
        report_row("late", "Station 1", "SOC 5", "2/1/2024 08:00"),
        report_row("filtered", "Depot", "SOC 5", "1/1/2024 08:00"),
    ]);
    let second = csv_text(&[
        report_header(),
        report_row("early", "Station 2", "SOC 5 East", "1/15/2024 17:30:00"),
    ]);
    let archive = zip_of(&[("jan.csv", first.as_bytes()), ("feb.csv", second.as_bytes())]);

    let api = FakeSheets::new();
    let response = process_upload(&UploadRequest::new(archive), &api, &target(), &UploadOptions::default());

    assert!(response.ok);
    assert_eq!(response.rows_written, Some(2));
    assert_eq!(response.http_status(), 200);

    let grid = api.grid("data_integration").unwrap();
    assert_eq!(grid.len(), 3);
    assert_eq!(grid[0].len(), 10);
    assert_eq!(grid[1][0], "early-0");
    assert_eq!(grid[2][0], "late-0");
}

#[test]
fn named_upload_scenario() {
    let archive = zip_of(&[
        ("a.csv", b"Date,Station\n1/2/2024 9:00,A\n"),
        ("b.csv", b"Date,Station\n1/2/2024 8:00,B\n"),
    ]);
    let mapping = ColumnMapping::default()
        .with(LogicalField::Date, "Date")
        .with(LogicalField::Station, "Station");

    let api = FakeSheets::new();
    let request = UploadRequest::new(archive).with_mapping(mapping);
    let report = run_upload(&request, &api, &target(), &named_options()).unwrap();

    assert_eq!(report.rows_written, 2);
    let grid = api.grid("data_integration").unwrap();
    assert_eq!(grid[0], vec!["Station", "Cluster", "Type", "Region", "Remark", "Date"]);
    assert_eq!(grid[1][0], "B");
    assert_eq!(grid[2][0], "A");
}

#[test]
fn named_upload_without_date_writes_every_data_row() {
    let archive = zip_of(&[
        ("a.csv", b"Station,Remark\nA,ok\nB,\n\nC,late\n"),
        ("b.csv", b"Remark,Station\nx,D\n"),
    ]);
    let mapping = ColumnMapping::from_json(r#"{"stationName":"Station","remark":"Remark","dateColumn":""}"#)
        .unwrap();

    let api = FakeSheets::new();
    let request = UploadRequest::new(archive).with_mapping(mapping);
    let response = process_upload(&request, &api, &target(), &named_options());

    assert!(response.ok);
    assert_eq!(response.rows_written, Some(4));
    let stations: Vec<String> = api.grid("data_integration").unwrap()[1..]
        .iter()
        .map(|r| r[0].clone())
        .collect();
    assert_eq!(stations, vec!["A", "B", "C", "D"]);
}

#[test]
fn archive_without_csv_never_publishes() {
    let archive = zip_of(&[("readme.txt", b"no tables here")]);
    let api = FakeSheets::new();
    let response = process_upload(&UploadRequest::new(archive), &api, &target(), &UploadOptions::default());

    assert!(!response.ok);
    assert_eq!(response.status, Some(StatusClass::ClientError));
    assert_eq!(response.http_status(), 400);
    assert!(api.calls().is_empty());
}

#[test]
fn oversized_entry_is_rejected_before_any_write() {
    let big = vec![b'1'; 26 * 1024 * 1024];
    let archive = zip_of(&[("ok.csv", b"a\n1\n"), ("huge.csv", big.as_slice())]);
    let api = FakeSheets::new();

    let err = run_upload(&UploadRequest::new(archive), &api, &target(), &UploadOptions::default())
        .unwrap_err();
    assert!(matches!(err, SyncError::OversizedSource { ref name, .. } if name == "huge.csv"));
    assert_eq!(err.status_class(), StatusClass::PayloadTooLarge);
    assert!(api.calls().is_empty());
}

#[test]
fn missing_archive_is_a_client_error() {
    let api = FakeSheets::new();
    let response = process_upload(&UploadRequest::default(), &api, &target(), &UploadOptions::default());

    assert_eq!(response.http_status(), 400);
    assert!(response.message.unwrap().contains("No ZIP file uploaded"));
    assert!(api.calls().is_empty());
}

#[test]
fn named_mode_checks_mapping_before_reading_archive() {
    let api = FakeSheets::new();

    let response = process_upload(&UploadRequest::new(b"not a zip".to_vec()), &api, &target(), &named_options());
    assert_eq!(response.http_status(), 400);
    assert!(response.message.unwrap().contains("No column mapping provided"));

    let request = UploadRequest::new(b"not a zip".to_vec())
        .with_mapping(ColumnMapping::default().with(LogicalField::Date, "Date"));
    let err = run_upload(&request, &api, &target(), &named_options()).unwrap_err();
    assert!(matches!(err, SyncError::InvalidMapping { .. }));
    assert!(err.to_string().contains("stationName"));

    assert!(api.calls().is_empty());
}

#[test]
fn malformed_source_fails_whole_upload() {
    let archive = zip_of(&[("good.csv", b"Station\nA\n"), ("bad.csv", b"Station\n\xFF\xFE\xFA\n")]);
    let mapping = ColumnMapping::default().with(LogicalField::Station, "Station");
    let api = FakeSheets::new();

    let response = process_upload(
        &UploadRequest::new(archive).with_mapping(mapping),
        &api,
        &target(),
        &named_options(),
    );
    assert_eq!(response.http_status(), 500);
    assert!(response.message.unwrap().contains("bad.csv"));
    assert!(api.calls().is_empty());
}

#[test]
fn declared_encoding_applies_to_every_source() {
    let archive = zip_of(&[("latin.csv", b"Station\nCaf\xE9\n")]);
    let mapping = ColumnMapping::default().with(LogicalField::Station, "Station");
    let options = UploadOptions {
        encoding: WINDOWS_1252,
        ..named_options()
    };

    let api = FakeSheets::new();
    run_upload(&UploadRequest::new(archive).with_mapping(mapping), &api, &target(), &options).unwrap();
    assert_eq!(api.grid("data_integration").unwrap()[1][0], "Café");
}

#[test]
fn publish_failure_is_a_server_error() {
    let archive = zip_of(&[("a.csv", b"Station\nA\n")]);
    let mapping = ColumnMapping::default().with(LogicalField::Station, "Station");
    let api = FakeSheets::failing_on(Op::Update);

    let response = process_upload(
        &UploadRequest::new(archive).with_mapping(mapping),
        &api,
        &target(),
        &named_options(),
    );
    assert!(!response.ok);
    assert_eq!(response.http_status(), 500);
    assert!(response.message.unwrap().contains("publish failed during write"));
    assert!(api.calls().iter().any(|c| matches!(c, Call::Clear(_))));
}

#[test]
fn response_serializes_camel_case() {
    let archive = zip_of(&[("a.csv", b"Station\nA\nB\n")]);
    let mapping = ColumnMapping::default().with(LogicalField::Station, "Station");
    let api = FakeSheets::new();

    let response = process_upload(
        &UploadRequest::new(archive).with_mapping(mapping),
        &api,
        &target(),
        &named_options(),
    );
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        serde_json::json!({"ok": true, "rowsWritten": 2})
    );
}
