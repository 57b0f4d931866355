mod common;

use std::sync::Arc;

use common::{zip_of, FakeSheets, Op, RecordingObserver};
use csv_sheet_sync::observability::{
    severity_for_error, CompositeObserver, FileObserver, SyncEvent, SyncObserver, SyncSeverity,
    UploadStats,
};
use csv_sheet_sync::pipeline::{run_upload, UploadOptions, UploadRequest};
use csv_sheet_sync::processing::ExtractionMode;
use csv_sheet_sync::sheets::{PublishFailure, PublishPhase, SheetsApiError, TabCreation};
use csv_sheet_sync::types::{ColumnMapping, LogicalField, SheetTarget};
use csv_sheet_sync::SyncError;

fn target() -> SheetTarget {
    SheetTarget::new("spreadsheet-1", "merged")
}

fn named_request(archive: Vec<u8>) -> UploadRequest {
    UploadRequest::new(archive).with_mapping(
        ColumnMapping::default()
            .with(LogicalField::Station, "Station")
            .with(LogicalField::Date, "Date"),
    )
}

fn options_with(observer: Arc<dyn SyncObserver>, alert_at_or_above: SyncSeverity) -> UploadOptions {
    UploadOptions {
        mode: ExtractionMode::NamedMapping,
        observer: Some(observer),
        alert_at_or_above,
        ..Default::default()
    }
}

#[test]
fn successful_upload_reports_events_in_stage_order() {
    let archive = zip_of(&[
        ("a.csv", b"Station,Date\nA,1/2/2024\nX,never\n"),
        ("b.csv", b"Station,Date\nB,1/1/2024\n"),
    ]);
    let obs = RecordingObserver::shared();
    let options = options_with(obs.clone(), SyncSeverity::Critical);

    let report = run_upload(&named_request(archive), &FakeSheets::new(), &target(), &options).unwrap();
    assert_eq!(report.rows_written, 2);

    assert_eq!(
        obs.events(),
        vec![
            SyncEvent::SourceCollected { name: "a.csv".into(), bytes: 32 },
            SyncEvent::SourceCollected { name: "b.csv".into(), bytes: 24 },
            SyncEvent::SourceParsed { name: "a.csv".into(), rows: 3 },
            SyncEvent::SourceParsed { name: "b.csv".into(), rows: 2 },
            SyncEvent::FileMerged { name: "a.csv".into(), accepted: 1, rejected: 1 },
            SyncEvent::FileMerged { name: "b.csv".into(), accepted: 1, rejected: 0 },
            SyncEvent::RowsSorted { rows: 2 },
            SyncEvent::TabEnsured { tab: "merged".into(), creation: TabCreation::Created },
            SyncEvent::TabCleared { tab: "merged".into() },
            SyncEvent::RowsWritten { tab: "merged".into(), rows: 2 },
        ]
    );
    assert_eq!(
        *obs.successes.lock().unwrap(),
        vec![UploadStats { files: 2, rows_written: 2 }]
    );
    assert!(obs.failures.lock().unwrap().is_empty());
}

#[test]
fn client_errors_are_warnings_without_alert() {
    let obs = RecordingObserver::shared();
    let options = options_with(obs.clone(), SyncSeverity::Critical);

    let _ = run_upload(&UploadRequest::default(), &FakeSheets::new(), &target(), &options).unwrap_err();

    assert_eq!(*obs.failures.lock().unwrap(), vec![SyncSeverity::Warning]);
    assert!(obs.alerts.lock().unwrap().is_empty());
    assert!(obs.successes.lock().unwrap().is_empty());
}

#[test]
fn alert_threshold_is_configurable() {
    let archive = zip_of(&[("a.csv", b"Station,Date\nA,1/2/2024\n")]);
    let obs = RecordingObserver::shared();
    let options = options_with(obs.clone(), SyncSeverity::Error);

    let api = FakeSheets::failing_on(Op::Clear);
    let err = run_upload(&named_request(archive), &api, &target(), &options).unwrap_err();
    assert!(matches!(err, SyncError::Publish(ref f) if f.phase == PublishPhase::Clear));

    assert_eq!(*obs.failures.lock().unwrap(), vec![SyncSeverity::Error]);
    assert_eq!(*obs.alerts.lock().unwrap(), vec![SyncSeverity::Error]);
}

#[test]
fn severity_mapping() {
    let auth = SyncError::Publish(PublishFailure {
        phase: PublishPhase::EnsureTab,
        destination_may_be_empty: false,
        source: SheetsApiError::Auth {
            message: "token request failed".into(),
        },
    });
    assert_eq!(severity_for_error(&auth), SyncSeverity::Critical);

    let config = SyncError::Config {
        message: "Missing environment variable".into(),
    };
    assert_eq!(severity_for_error(&config), SyncSeverity::Critical);

    assert_eq!(severity_for_error(&SyncError::NoHeaderResolved), SyncSeverity::Error);
    assert_eq!(
        severity_for_error(&SyncError::OversizedSource {
            name: "big.csv".into(),
            size: 2,
            limit: 1
        }),
        SyncSeverity::Warning
    );
}

#[test]
fn composite_fans_out_to_every_observer() {
    let a = RecordingObserver::shared();
    let b = RecordingObserver::shared();
    let fan_out: Vec<Arc<dyn SyncObserver>> = vec![a.clone(), b.clone()];
    let composite: Arc<dyn SyncObserver> = Arc::new(CompositeObserver::new(fan_out));
    let options = options_with(composite, SyncSeverity::Warning);

    let _ = run_upload(&UploadRequest::default(), &FakeSheets::new(), &target(), &options).unwrap_err();

    for obs in [&a, &b] {
        assert_eq!(*obs.failures.lock().unwrap(), vec![SyncSeverity::Warning]);
        assert_eq!(*obs.alerts.lock().unwrap(), vec![SyncSeverity::Warning]);
    }
}

#[test]
fn file_observer_appends_lines() {
    let path = std::env::temp_dir().join(format!("csv-sheet-sync-{}.log", std::process::id()));
    let _ = std::fs::remove_file(&path);

    let archive = zip_of(&[("a.csv", b"Station,Date\nA,1/2/2024\n")]);
    let options = options_with(Arc::new(FileObserver::new(&path)), SyncSeverity::Critical);
    run_upload(&named_request(archive), &FakeSheets::new(), &target(), &options).unwrap();

    let log = std::fs::read_to_string(&path).unwrap();
    assert!(log.contains("event collected name=a.csv"));
    assert!(log.contains("ok files=1 rows_written=1"));
    let _ = std::fs::remove_file(&path);
}
