//! 受付デスク
//!
//! 受付セッション（状態遷移と集計）とストアを束ね、ユーザー操作ごとに1ステップずつ処理する。
//! 失敗は結果として返し、セッションは常に Scanning か Reviewing のどちらかに留まる。

use crate::config::Config;
use crate::error::{CheckInError, Result};
use crate::store::{load_snapshot, mark_checked_in, AttendeeStore};
use checkin_common::{AttendeeRecord, Review, ScanSession, SheetLayout, TIMESTAMP_FORMAT};
use std::time::Duration;
use tracing::{info, warn};

const DEFAULT_CONFIRM_PAUSE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { count: usize },
    /// 空または取得失敗（直前のスナップショットは保持）
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmOutcome {
    CheckedIn {
        record: AttendeeRecord,
        first_time: bool,
        timestamp: String,
    },
    /// 書き込み失敗。Reviewing のまま
    Failed { message: String },
}

pub struct CheckInDesk<S> {
    store: S,
    layout: SheetLayout,
    confirm_pause: Duration,
    session: ScanSession,
}

impl<S: AttendeeStore> CheckInDesk<S> {
    pub fn new(store: S, layout: SheetLayout) -> Self {
        Self {
            store,
            layout,
            confirm_pause: DEFAULT_CONFIRM_PAUSE,
            session: ScanSession::new(),
        }
    }

    pub fn from_config(store: S, config: &Config) -> Self {
        Self::new(store, config.layout).with_confirm_pause(config.confirm_pause())
    }

    pub fn with_confirm_pause(mut self, pause: Duration) -> Self {
        self.confirm_pause = pause;
        self
    }

    pub fn session(&self) -> &ScanSession {
        &self.session
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn review(&self) -> Option<Review> {
        self.session.review()
    }

    /// Load Attendees
    pub async fn load_attendees(&mut self) -> LoadOutcome {
        let snapshot = load_snapshot(&self.store).await;
        if snapshot.is_empty() {
            warn!("参加者データが空のため、前回のデータを保持します");
            return LoadOutcome::Failed;
        }

        let count = snapshot.len();
        self.session.replace_snapshot(snapshot);
        info!("{}件の参加者を読み込み", count);
        LoadOutcome::Loaded { count }
    }

    /// カメラまたは手動入力のペイロードを照合
    pub fn submit_payload(&mut self, payload: impl Into<String>) -> Result<Review> {
        let review = self.session.submit_payload(payload)?;
        info!("照合: {} ({})", review.attendee_id(), review.kind());
        Ok(review)
    }

    /// Confirm Check-in / Check in Again
    ///
    /// 成功時は集計を更新して Scanning へ戻る。スナップショットは更新しない。
    pub async fn confirm(&mut self) -> Result<ConfirmOutcome> {
        let review = self.session.review().ok_or(CheckInError::Session(
            checkin_common::Error::InvalidTransition {
                action: "confirm",
                mode: "scanning",
            },
        ))?;
        let record = review.record().cloned().ok_or(CheckInError::Session(
            checkin_common::Error::InvalidTransition {
                action: "confirm",
                mode: "reviewing without a match",
            },
        ))?;

        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        let message = match mark_checked_in(&self.store, &self.layout, &record.id, &timestamp).await {
            Ok(true) => {
                let first_time = self.session.apply_check_in(&record)?;
                info!(
                    "受付完了: {} ({}{})",
                    record.id,
                    record.ticket_type,
                    if first_time { "" } else { ", 再受付" }
                );
                return Ok(ConfirmOutcome::CheckedIn {
                    record,
                    first_time,
                    timestamp,
                });
            }
            Ok(false) => format!("Attendee ID {} not found in spreadsheet!", record.id),
            Err(e) => {
                warn!("受付書き込み失敗: {}", e);
                e.to_string()
            }
        };

        self.session.record_failure(message.clone());
        Ok(ConfirmOutcome::Failed { message })
    }

    /// 受付完了表示の待ち時間
    pub async fn display_pause(&self) {
        tokio::time::sleep(self.confirm_pause).await;
    }

    /// Scan Again
    pub fn scan_again(&mut self) -> Result<()> {
        Ok(self.session.return_to_scanning()?)
    }

    /// Try Again
    pub fn try_again(&mut self) -> Result<()> {
        Ok(self.session.return_to_scanning()?)
    }

    /// Reset Scanner
    pub fn reset(&mut self) {
        self.session.reset();
    }

    /// Load Data and Try Again（照合中のペイロードを読み込み後に再照合）
    pub async fn load_and_retry(&mut self) -> Result<LoadOutcome> {
        if self.session.payload().is_none() {
            return Err(CheckInError::Session(
                checkin_common::Error::InvalidTransition {
                    action: "load and retry",
                    mode: "scanning",
                },
            ));
        }
        Ok(self.load_attendees().await)
    }
}
