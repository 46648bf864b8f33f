//! 参加者ストア
//!
//! リモートのスプレッドシートを「IDをキーにしたレコード集合」として扱う。
//! 読み込みは全件取得、書き込みはID指定のセル更新のみ。

pub mod auth;
pub mod locator;
pub mod memory;
pub mod sheets;

pub use locator::SheetLocator;
pub use memory::MemoryStore;
pub use sheets::SheetsStore;

use crate::error::Result;
use checkin_common::{AttendeeRecord, AttendeeSnapshot, SheetLayout};
use tracing::warn;

#[allow(async_fn_in_trait)]
pub trait AttendeeStore {
    /// 先頭シートの全レコードを取得
    async fn load_all(&self) -> Result<AttendeeSnapshot>;

    /// IDが一致する最初の行に書き込む
    ///
    /// `updates` は (列番号(1始まり), 値)。該当行がなければ `Ok(false)`。
    async fn update_by_id(&self, attendee_id: &str, updates: &[(usize, String)]) -> Result<bool>;

    async fn find_by_id(&self, attendee_id: &str) -> Result<Option<AttendeeRecord>> {
        let snapshot = self.load_all().await?;
        Ok(snapshot.find_by_id(attendee_id).cloned())
    }

    async fn update_field(&self, attendee_id: &str, column: usize, value: &str) -> Result<bool> {
        self.update_by_id(attendee_id, &[(column, value.to_string())]).await
    }
}

/// 読み込み失敗は致命的にしない（警告して空を返す）
pub async fn load_snapshot<S: AttendeeStore>(store: &S) -> AttendeeSnapshot {
    match store.load_all().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!("参加者データの読み込みに失敗: {}", e);
            AttendeeSnapshot::default()
        }
    }
}

/// 受付済み（"Yes"）と受付時刻を書き込む
pub async fn mark_checked_in<S: AttendeeStore>(
    store: &S,
    layout: &SheetLayout,
    attendee_id: &str,
    timestamp: &str,
) -> Result<bool> {
    let updated = store
        .update_by_id(attendee_id, &layout.check_in_updates(timestamp))
        .await?;
    if !updated {
        warn!("Attendee ID {} not found in spreadsheet", attendee_id);
    }
    Ok(updated)
}
