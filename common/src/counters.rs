//! 受付集計
//!
//! 読み込み時にスナップショットから一度だけ算出し、以降は受付ごとの差分で更新する。
//! 他の端末による書き込みは反映されない。

use crate::types::{AttendeeSnapshot, TicketType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCounters {
    pub total_checked_in: u32,
    pub type_a: u32,
    pub type_b: u32,
}

impl SessionCounters {
    /// スナップショットから集計し直す
    pub fn derive(snapshot: &AttendeeSnapshot) -> Self {
        let mut counters = Self::default();
        for record in snapshot.iter().filter(|r| r.checked_in) {
            counters.total_checked_in += 1;
            counters.bump(record.ticket_category());
        }
        counters
    }

    /// 受付1件分を加算
    ///
    /// 合計は初回受付のみ、種別は再受付でも加算する。
    pub fn record_check_in(&mut self, ticket_type: &str, first_time: bool) {
        if first_time {
            self.total_checked_in += 1;
        }
        self.bump(TicketType::classify(ticket_type));
    }

    pub fn count_for(&self, ticket_type: TicketType) -> Option<u32> {
        match ticket_type {
            TicketType::TypeA => Some(self.type_a),
            TicketType::TypeB => Some(self.type_b),
            TicketType::Other => None,
        }
    }

    fn bump(&mut self, ticket_type: TicketType) {
        match ticket_type {
            TicketType::TypeA => self.type_a += 1,
            TicketType::TypeB => self.type_b += 1,
            TicketType::Other => {}
        }
    }
}
