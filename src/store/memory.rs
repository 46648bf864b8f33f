//! プロセス内ストア
//!
//! シートと同じ「ヘッダ行 + 値の行」を保持する。読み込み・書き込みの失敗を
//! 切り替えられるので、受付処理の検証に使う。

use super::AttendeeStore;
use crate::error::{CheckInError, Result};
use checkin_common::AttendeeSnapshot;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// 書き込み履歴の1件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellWrite {
    pub attendee_id: String,
    pub column: usize,
    pub value: String,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<Vec<String>>>,
    writes: Mutex<Vec<CellWrite>>,
    fail_loads: AtomicBool,
    fail_updates: AtomicBool,
}

impl MemoryStore {
    /// 先頭行はヘッダ
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Default::default()
        }
    }

    pub fn from_str_rows(rows: &[&[&str]]) -> Self {
        Self::new(
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    pub fn writes(&self) -> Vec<CellWrite> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }

    /// 行（0始まり、ヘッダ含む）・列（1始まり）のセル値
    pub fn cell(&self, row: usize, column: usize) -> Option<String> {
        let rows = self.rows.lock().ok()?;
        rows.get(row)?.get(column.checked_sub(1)?).cloned()
    }

    fn poisoned() -> CheckInError {
        CheckInError::Load("ストアのロックに失敗".into())
    }
}

impl AttendeeStore for MemoryStore {
    async fn load_all(&self) -> Result<AttendeeSnapshot> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(CheckInError::Load("simulated network error".into()));
        }
        let rows = self.rows.lock().map_err(|_| Self::poisoned())?;
        Ok(AttendeeSnapshot::from_rows(&rows))
    }

    async fn update_by_id(&self, attendee_id: &str, updates: &[(usize, String)]) -> Result<bool> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(CheckInError::Update("simulated network error".into()));
        }

        let mut rows = self.rows.lock().map_err(|_| Self::poisoned())?;
        let snapshot = AttendeeSnapshot::from_rows(&rows);
        let Some(index) = snapshot.records.iter().position(|r| r.id == attendee_id) else {
            return Ok(false);
        };

        let row = &mut rows[index + 1];
        let mut writes = self.writes.lock().map_err(|_| Self::poisoned())?;
        for (column, value) in updates {
            if *column == 0 {
                return Err(CheckInError::Update("列番号は1始まりです".into()));
            }
            if row.len() < *column {
                row.resize(*column, String::new());
            }
            row[column - 1] = value.clone();
            writes.push(CellWrite {
                attendee_id: attendee_id.to_string(),
                column: *column,
                value: value.clone(),
            });
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemoryStore {
        MemoryStore::from_str_rows(&[
            &["ID", "Name", "Ticket Type", "Email", "Checked In", "Check-in Time"],
            &["A100", "Hanako", "Type A", "h@example.com", "No"],
            &["B200", "Taro", "Type B", "t@example.com", "Yes", "2026-10-17 09:00:00"],
        ])
    }

    #[tokio::test]
    async fn test_load_all() {
        let snapshot = store().load_all().await.unwrap();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.find_by_id("B200").unwrap().checked_in);
    }

    #[tokio::test]
    async fn test_update_field_pads_short_row() {
        let store = store();
        assert!(store.update_field("A100", 6, "2026-10-17 10:00:00").await.unwrap());
        assert_eq!(store.cell(1, 6).as_deref(), Some("2026-10-17 10:00:00"));
        assert_eq!(store.writes().len(), 1);
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let store = store();
        assert!(!store.update_field("Z999", 5, "Yes").await.unwrap());
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let store = store();
        let record = store.find_by_id("A100").await.unwrap().unwrap();
        assert_eq!(record.ticket_type, "Type A");
        assert!(store.find_by_id("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_simulated_failures() {
        let store = store();
        store.set_fail_loads(true);
        assert!(matches!(store.load_all().await, Err(CheckInError::Load(_))));

        store.set_fail_updates(true);
        assert!(matches!(store.update_field("A100", 5, "Yes").await, Err(CheckInError::Update(_))));
    }
}
