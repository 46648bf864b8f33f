use serde::{Deserialize, Serialize};

use crate::layout::CHECKED_IN_YES;

/// シートの列名
pub const FIELD_ID: &str = "ID";
pub const FIELD_TICKET_TYPE: &str = "Ticket Type";
pub const FIELD_CHECKED_IN: &str = "Checked In";
pub const FIELD_CHECK_IN_TIME: &str = "Check-in Time";

/// 参加者レコード（シートの1行）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeRecord {
    pub id: String,

    #[serde(default)]
    pub ticket_type: String,      // チケット種別

    #[serde(default)]
    pub checked_in: bool,         // 受付済み

    #[serde(default)]
    pub check_in_time: String,    // 受付時刻（未受付なら空）

    /// 全列（シートの列順）
    #[serde(default)]
    pub fields: Vec<(String, String)>,
}

impl AttendeeRecord {
    /// ヘッダ行と値の行からレコードを生成
    ///
    /// 足りないセルは空文字として扱う。
    pub fn from_row(headers: &[String], row: &[String]) -> Self {
        let fields: Vec<(String, String)> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), row.get(i).cloned().unwrap_or_default()))
            .collect();

        let lookup = |name: &str| {
            fields
                .iter()
                .find(|(h, _)| h == name)
                .map(|(_, v)| v.clone())
                .unwrap_or_default()
        };

        Self {
            id: lookup(FIELD_ID),
            ticket_type: lookup(FIELD_TICKET_TYPE),
            checked_in: lookup(FIELD_CHECKED_IN).trim() == CHECKED_IN_YES,
            check_in_time: lookup(FIELD_CHECK_IN_TIME),
            fields,
        }
    }

    /// 表示用フィールド（受付状態の列を除く）
    pub fn display_fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .filter(|(h, _)| h != FIELD_CHECKED_IN && h != FIELD_CHECK_IN_TIME)
            .map(|(h, v)| (h.as_str(), v.as_str()))
    }

    pub fn ticket_category(&self) -> TicketType {
        TicketType::classify(&self.ticket_type)
    }
}

/// チケット種別の分類
///
/// 認識するのは "type a" / "type b" の2種類のみ。それ以外は `Other`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketType {
    TypeA,
    TypeB,
    Other,
}

impl TicketType {
    pub fn classify(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "type a" => TicketType::TypeA,
            "type b" => TicketType::TypeB,
            _ => TicketType::Other,
        }
    }
}

impl std::fmt::Display for TicketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TicketType::TypeA => write!(f, "Type A"),
            TicketType::TypeB => write!(f, "Type B"),
            TicketType::Other => write!(f, "Other"),
        }
    }
}

/// 最後に読み込んだ参加者表
///
/// 読み込みごとに丸ごと置き換える。書き込み後も自動では更新されない。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttendeeSnapshot {
    pub headers: Vec<String>,
    pub records: Vec<AttendeeRecord>,
}

impl AttendeeSnapshot {
    /// シートの値（先頭行がヘッダ）から生成
    pub fn from_rows(rows: &[Vec<String>]) -> Self {
        let Some((headers, body)) = rows.split_first() else {
            return Self::default();
        };

        let records = body
            .iter()
            .map(|row| AttendeeRecord::from_row(headers, row))
            .collect();

        Self {
            headers: headers.clone(),
            records,
        }
    }

    /// IDの完全一致で検索（先頭の行が優先）
    pub fn find_by_id(&self, attendee_id: &str) -> Option<&AttendeeRecord> {
        self.records.iter().find(|r| r.id == attendee_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttendeeRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> Vec<String> {
        ["ID", "Name", "Ticket Type", "Email", "Checked In", "Check-in Time"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_row_maps_named_fields() {
        let record = AttendeeRecord::from_row(
            &headers(),
            &row(&["A100", "Hanako", "Type A", "h@example.com", "Yes", "2026-10-01 09:00:00"]),
        );
        assert_eq!(record.id, "A100");
        assert_eq!(record.ticket_type, "Type A");
        assert!(record.checked_in);
        assert_eq!(record.check_in_time, "2026-10-01 09:00:00");
        assert_eq!(record.fields.len(), 6);
    }

    #[test]
    fn test_from_row_short_row_is_blank() {
        let record = AttendeeRecord::from_row(&headers(), &row(&["B200", "Taro", "type b"]));
        assert_eq!(record.id, "B200");
        assert!(!record.checked_in);
        assert_eq!(record.check_in_time, "");
        assert_eq!(record.fields[5], ("Check-in Time".to_string(), String::new()));
    }

    #[test]
    fn test_checked_in_only_yes() {
        for (value, expected) in [("Yes", true), (" Yes ", true), ("No", false), ("yes!", false), ("", false)] {
            let record = AttendeeRecord::from_row(&headers(), &row(&["X", "", "", "", value]));
            assert_eq!(record.checked_in, expected, "value: {:?}", value);
        }
    }

    #[test]
    fn test_display_fields_hide_status_columns() {
        let record = AttendeeRecord::from_row(
            &headers(),
            &row(&["A100", "Hanako", "Type A", "h@example.com", "Yes", "2026-10-01 09:00:00"]),
        );
        let names: Vec<&str> = record.display_fields().map(|(h, _)| h).collect();
        assert_eq!(names, vec!["ID", "Name", "Ticket Type", "Email"]);
    }

    #[test]
    fn test_ticket_type_classify() {
        assert_eq!(TicketType::classify("Type A"), TicketType::TypeA);
        assert_eq!(TicketType::classify("TYPE A"), TicketType::TypeA);
        assert_eq!(TicketType::classify("type b"), TicketType::TypeB);
        assert_eq!(TicketType::classify("VIP"), TicketType::Other);
        assert_eq!(TicketType::classify(" type a"), TicketType::Other);
    }

    #[test]
    fn test_snapshot_find_by_id_exact() {
        let snapshot = AttendeeSnapshot::from_rows(&[
            headers(),
            row(&["A100", "first"]),
            row(&["a100", "lower"]),
            row(&["A100", "duplicate"]),
        ]);
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.find_by_id("A100").map(|r| r.fields[1].1.as_str()), Some("first"));
        assert_eq!(snapshot.find_by_id("a100").map(|r| r.fields[1].1.as_str()), Some("lower"));
        assert!(snapshot.find_by_id("A10").is_none());
    }

    #[test]
    fn test_snapshot_from_empty_rows() {
        let snapshot = AttendeeSnapshot::from_rows(&[]);
        assert!(snapshot.is_empty());
        assert!(snapshot.headers.is_empty());
    }
}
