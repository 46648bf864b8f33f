//! Event Check-in Common Library
//!
//! 受付端末（CLI）と他のフロントエンドで共有される型と状態遷移ロジック。
//! IOは一切行わない。

pub mod types;
pub mod layout;
pub mod error;
pub mod payload;
pub mod counters;
pub mod session;

pub use types::{AttendeeRecord, AttendeeSnapshot, TicketType};
pub use layout::{SheetLayout, TIMESTAMP_FORMAT, CHECKED_IN_YES};
pub use error::{Error, Result};
pub use payload::{interpret, interpret_detailed, Interpretation, PayloadKind};
pub use counters::SessionCounters;
pub use session::{Action, Mode, Review, ScanSession};
