//! QRペイロード解釈
//!
//! JSON（`{"id": "..."}`）と生のID文字列の両方を受け付ける。
//! 解釈に失敗しても決してエラーにはならず、生文字列をIDとして扱う。

use serde_json::Value;

/// ペイロードの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// JSONの id フィールドから取得
    Structured,
    /// ペイロード全体をIDとして使用
    Raw,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpretation {
    pub attendee_id: String,
    pub kind: PayloadKind,
}

/// ペイロードから参加者IDを取り出す
pub fn interpret(payload: &str) -> String {
    interpret_detailed(payload).attendee_id
}

pub fn interpret_detailed(payload: &str) -> Interpretation {
    match structured_id(payload) {
        Some(attendee_id) => Interpretation {
            attendee_id,
            kind: PayloadKind::Structured,
        },
        None => Interpretation {
            attendee_id: payload.to_string(),
            kind: PayloadKind::Raw,
        },
    }
}

fn structured_id(payload: &str) -> Option<String> {
    let value: Value = serde_json::from_str(payload).ok()?;
    match value.as_object()?.get("id")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
