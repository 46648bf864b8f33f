//! 受付セッションの状態遷移
//!
//! ```text
//! Scanning --(payload)--> Reviewing --(confirm / scan again / try again / reset)--> Scanning
//! ```
//!
//! ペイロードを保持するのは Reviewing の間だけ。
//! リモートへの書き込みは呼び出し側が行い、成功した場合のみ `apply_check_in` を呼ぶ。

use crate::counters::SessionCounters;
use crate::error::{Error, Result};
use crate::payload::interpret;
use crate::types::{AttendeeRecord, AttendeeSnapshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Scanning,
    Reviewing { payload: String },
}

impl Mode {
    fn name(&self) -> &'static str {
        match self {
            Mode::Scanning => "scanning",
            Mode::Reviewing { .. } => "reviewing",
        }
    }
}

/// ペイロード照合結果
#[derive(Debug, Clone, PartialEq)]
pub enum Review {
    /// 参加者データ未読み込み
    NoSnapshot { attendee_id: String },
    NotFound { attendee_id: String },
    AlreadyCheckedIn { record: AttendeeRecord },
    Ready { record: AttendeeRecord },
}

impl Review {
    pub fn attendee_id(&self) -> &str {
        match self {
            Review::NoSnapshot { attendee_id } | Review::NotFound { attendee_id } => attendee_id,
            Review::AlreadyCheckedIn { record } | Review::Ready { record } => &record.id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Review::NoSnapshot { .. } => "no snapshot",
            Review::NotFound { .. } => "not found",
            Review::AlreadyCheckedIn { .. } => "already checked in",
            Review::Ready { .. } => "ready",
        }
    }

    pub fn record(&self) -> Option<&AttendeeRecord> {
        match self {
            Review::AlreadyCheckedIn { record } | Review::Ready { record } => Some(record),
            _ => None,
        }
    }
}

/// ユーザー操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    LoadAttendees,
    ResetScanner,
    ScanWithCamera,
    ManualEntry,
    ConfirmCheckIn,
    CheckInAgain,
    ScanAgain,
    LoadDataAndTryAgain,
    TryAgain,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::LoadAttendees => "Load Attendees",
            Action::ResetScanner => "Reset Scanner",
            Action::ScanWithCamera => "Scan QR Code",
            Action::ManualEntry => "Process Manual Entry",
            Action::ConfirmCheckIn => "Confirm Check-in",
            Action::CheckInAgain => "Check in Again",
            Action::ScanAgain => "Scan Again",
            Action::LoadDataAndTryAgain => "Load Data and Try Again",
            Action::TryAgain => "Try Again",
        }
    }
}

/// 受付セッション
///
/// モード・スナップショット・集計をまとめて保持する。
#[derive(Debug, Clone)]
pub struct ScanSession {
    mode: Mode,
    snapshot: Option<AttendeeSnapshot>,
    counters: SessionCounters,
    failure: Option<String>,
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanSession {
    pub fn new() -> Self {
        Self {
            mode: Mode::Scanning,
            snapshot: None,
            counters: SessionCounters::default(),
            failure: None,
        }
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn is_scanning(&self) -> bool {
        self.mode == Mode::Scanning
    }

    pub fn payload(&self) -> Option<&str> {
        match &self.mode {
            Mode::Reviewing { payload } => Some(payload),
            Mode::Scanning => None,
        }
    }

    pub fn snapshot(&self) -> Option<&AttendeeSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn counters(&self) -> &SessionCounters {
        &self.counters
    }

    /// 直前の失敗メッセージ
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// スナップショットを丸ごと置き換え、集計をやり直す
    pub fn replace_snapshot(&mut self, snapshot: AttendeeSnapshot) {
        self.counters = SessionCounters::derive(&snapshot);
        self.snapshot = Some(snapshot);
    }

    /// ペイロードを受け取り照合状態へ
    pub fn submit_payload(&mut self, payload: impl Into<String>) -> Result<Review> {
        let payload = payload.into();
        if payload.is_empty() {
            return Err(Error::EmptyPayload);
        }
        self.require_scanning("submit payload")?;

        self.failure = None;
        self.mode = Mode::Reviewing { payload };
        self.review().ok_or(Error::InvalidTransition {
            action: "review",
            mode: "scanning",
        })
    }

    /// 現在のペイロードをスナップショットと照合
    pub fn review(&self) -> Option<Review> {
        let attendee_id = interpret(self.payload()?);

        let Some(snapshot) = &self.snapshot else {
            return Some(Review::NoSnapshot { attendee_id });
        };

        let review = match snapshot.find_by_id(&attendee_id) {
            None => Review::NotFound { attendee_id },
            Some(record) if record.checked_in => Review::AlreadyCheckedIn {
                record: record.clone(),
            },
            Some(record) => Review::Ready {
                record: record.clone(),
            },
        };
        Some(review)
    }

    /// リモート書き込み成功後に集計を更新してスキャンへ戻る
    ///
    /// 初回受付なら `true` を返す。スナップショットは更新しない。
    pub fn apply_check_in(&mut self, record: &AttendeeRecord) -> Result<bool> {
        self.require_reviewing("apply check-in")?;

        let first_time = !record.checked_in;
        self.counters.record_check_in(&record.ticket_type, first_time);
        self.mode = Mode::Scanning;
        self.failure = None;
        Ok(first_time)
    }

    /// 失敗を記録（状態は Reviewing のまま）
    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.failure = Some(message.into());
    }

    /// Scan Again / Try Again
    pub fn return_to_scanning(&mut self) -> Result<()> {
        self.require_reviewing("return to scanning")?;
        self.mode = Mode::Scanning;
        self.failure = None;
        Ok(())
    }

    /// 無条件でスキャン待ちに戻す
    pub fn reset(&mut self) {
        self.mode = Mode::Scanning;
        self.failure = None;
    }

    /// 現在の状態で選択できる操作
    pub fn available_actions(&self) -> Vec<Action> {
        let mut actions = Vec::new();

        match self.review() {
            None => {
                actions.push(Action::ScanWithCamera);
                actions.push(Action::ManualEntry);
            }
            Some(Review::NoSnapshot { .. }) => actions.push(Action::LoadDataAndTryAgain),
            Some(Review::NotFound { .. }) => actions.push(Action::ScanAgain),
            Some(Review::AlreadyCheckedIn { .. }) => actions.push(Action::CheckInAgain),
            Some(Review::Ready { .. }) => actions.push(Action::ConfirmCheckIn),
        }

        if self.failure.is_some() {
            actions.push(Action::TryAgain);
        }
        actions.push(Action::LoadAttendees);
        actions.push(Action::ResetScanner);
        actions
    }

    fn require_scanning(&self, action: &'static str) -> Result<()> {
        match self.mode {
            Mode::Scanning => Ok(()),
            _ => Err(Error::InvalidTransition {
                action,
                mode: self.mode.name(),
            }),
        }
    }

    fn require_reviewing(&self, action: &'static str) -> Result<()> {
        match self.mode {
            Mode::Reviewing { .. } => Ok(()),
            _ => Err(Error::InvalidTransition {
                action,
                mode: self.mode.name(),
            }),
        }
    }
}
