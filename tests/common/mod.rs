#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};

use csv_sheet_sync::observability::{SyncEvent, SyncObserver, SyncSeverity, UploadStats};
use csv_sheet_sync::sheets::{SheetsApi, SheetsApiError, TabCreation};
use csv_sheet_sync::types::SheetTarget;
use csv_sheet_sync::SyncError;
use zip::write::SimpleFileOptions;

/// Build an in-memory ZIP with the given `(name, content)` entries.
pub fn zip_of(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        for (name, content) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content).unwrap();
        }
        zip.finish().unwrap();
    }
    buf
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    AddTab,
    Clear,
    Update,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    AddTab(String),
    Clear(String),
    Update { range: String, rows: usize },
}

/// In-memory spreadsheet: one grid per tab, writes anchored at `A1`.
#[derive(Default)]
pub struct FakeSheets {
    tabs: Mutex<BTreeMap<String, Vec<Vec<String>>>>,
    calls: Mutex<Vec<Call>>,
    fail_on: Option<Op>,
}

impl FakeSheets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(op: Op) -> Self {
        Self {
            fail_on: Some(op),
            ..Self::default()
        }
    }

    pub fn with_tab(self, tab: &str, grid: Vec<Vec<String>>) -> Self {
        self.tabs.lock().unwrap().insert(tab.to_string(), grid);
        self
    }

    pub fn grid(&self, tab: &str) -> Option<Vec<Vec<String>>> {
        self.tabs.lock().unwrap().get(tab).cloned()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn fail(&self, op: Op) -> Result<(), SheetsApiError> {
        if self.fail_on == Some(op) {
            return Err(SheetsApiError::Api {
                status: 503,
                message: format!("{op:?} unavailable"),
            });
        }
        Ok(())
    }
}

impl SheetsApi for FakeSheets {
    fn add_tab(&self, target: &SheetTarget) -> Result<TabCreation, SheetsApiError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::AddTab(target.tab_name.clone()));
        self.fail(Op::AddTab)?;
        let mut tabs = self.tabs.lock().unwrap();
        if tabs.contains_key(&target.tab_name) {
            return Ok(TabCreation::AlreadyExists);
        }
        tabs.insert(target.tab_name.clone(), Vec::new());
        Ok(TabCreation::Created)
    }

    fn clear_tab(&self, target: &SheetTarget) -> Result<(), SheetsApiError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Clear(target.whole_tab_range()));
        self.fail(Op::Clear)?;
        if let Some(grid) = self.tabs.lock().unwrap().get_mut(&target.tab_name) {
            grid.clear();
        }
        Ok(())
    }

    fn update_values(
        &self,
        target: &SheetTarget,
        start_cell: &str,
        values: &[Vec<String>],
    ) -> Result<(), SheetsApiError> {
        self.calls.lock().unwrap().push(Call::Update {
            range: target.range_from(start_cell),
            rows: values.len(),
        });
        self.fail(Op::Update)?;
        assert_eq!(start_cell, "A1", "fake only supports writes anchored at A1");

        let mut tabs = self.tabs.lock().unwrap();
        let grid = tabs.entry(target.tab_name.clone()).or_default();
        for (r, row) in values.iter().enumerate() {
            if grid.len() <= r {
                grid.push(Vec::new());
            }
            let line = &mut grid[r];
            if line.len() < row.len() {
                line.resize(row.len(), String::new());
            }
            for (c, cell) in row.iter().enumerate() {
                line[c] = cell.clone();
            }
        }
        Ok(())
    }
}

/// Observer recording everything it is told.
#[derive(Default)]
pub struct RecordingObserver {
    pub events: Mutex<Vec<SyncEvent>>,
    pub successes: Mutex<Vec<UploadStats>>,
    pub failures: Mutex<Vec<SyncSeverity>>,
    pub alerts: Mutex<Vec<SyncSeverity>>,
}

impl RecordingObserver {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<SyncEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl SyncObserver for RecordingObserver {
    fn on_event(&self, event: &SyncEvent) {
        self.events.lock().unwrap().push(event.clone());
    }

    fn on_success(&self, stats: UploadStats) {
        self.successes.lock().unwrap().push(stats);
    }

    fn on_failure(&self, severity: SyncSeverity, _error: &SyncError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, severity: SyncSeverity, _error: &SyncError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

/// Width of one row of the station report (columns `A..=AH`).
pub const REPORT_WIDTH: usize = 34;

/// A station-report header row: `H0`, `H1`, ...
pub fn report_header() -> Vec<String> {
    (0..REPORT_WIDTH).map(|i| format!("H{i}")).collect()
}

/// A station-report data row with the given filter cells (`K`, `M`) and date (`X`).
pub fn report_row(tag: &str, k: &str, m: &str, date: &str) -> Vec<String> {
    let mut row: Vec<String> = (0..REPORT_WIDTH).map(|i| format!("{tag}-{i}")).collect();
    row[10] = k.to_string();
    row[12] = m.to_string();
    row[23] = date.to_string();
    row
}

/// Render rows as CSV text.
pub fn csv_text(rows: &[Vec<String>]) -> String {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for row in rows {
        wtr.write_record(row).unwrap();
    }
    String::from_utf8(wtr.into_inner().unwrap()).unwrap()
}
