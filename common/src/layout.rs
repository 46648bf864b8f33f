//! シートのレイアウト定義
//!
//! 読み込みは列名、書き込みは列番号（1始まり）で行う。
//! シートの列構成が想定と異なると書き込み先がずれる。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// 受付時刻の書式
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const CHECKED_IN_YES: &str = "Yes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetLayout {
    /// "Checked In" 列（E列）
    pub checked_in_column: usize,
    /// "Check-in Time" 列（F列）
    pub check_in_time_column: usize,
    /// ヘッダ行数
    pub header_rows: usize,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            checked_in_column: 5,
            check_in_time_column: 6,
            header_rows: 1,
        }
    }
}

impl SheetLayout {
    pub fn validate(&self) -> Result<()> {
        if self.checked_in_column == 0 || self.check_in_time_column == 0 {
            return Err(Error::Config("列番号は1以上で指定してください".into()));
        }
        if self.checked_in_column == self.check_in_time_column {
            return Err(Error::Config(format!(
                "受付列と時刻列が同じです: {}",
                self.checked_in_column
            )));
        }
        Ok(())
    }

    /// データ行（0始まり）のシート上の行番号（1始まり）
    pub fn sheet_row(&self, record_index: usize) -> usize {
        record_index + self.header_rows + 1
    }

    /// 受付済みにする書き込み内容
    pub fn check_in_updates(&self, timestamp: &str) -> Vec<(usize, String)> {
        vec![
            (self.checked_in_column, CHECKED_IN_YES.to_string()),
            (self.check_in_time_column, timestamp.to_string()),
        ]
    }
}

/// 列番号（1始まり）をA1形式の列記号に変換
pub fn column_letter(column: usize) -> String {
    let mut n = column;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// A1形式のセル参照
pub fn cell_ref(row: usize, column: usize) -> String {
    format!("{}{}", column_letter(column), row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(1), "A");
        assert_eq!(column_letter(5), "E");
        assert_eq!(column_letter(26), "Z");
        assert_eq!(column_letter(27), "AA");
        assert_eq!(column_letter(52), "AZ");
        assert_eq!(column_letter(703), "AAA");
    }

    #[test]
    fn test_cell_ref() {
        assert_eq!(cell_ref(2, 5), "E2");
        assert_eq!(cell_ref(10, 6), "F10");
    }

    #[test]
    fn test_sheet_row_offset() {
        let layout = SheetLayout::default();
        assert_eq!(layout.sheet_row(0), 2);
        assert_eq!(layout.sheet_row(9), 11);
    }

    #[test]
    fn test_validate() {
        assert!(SheetLayout::default().validate().is_ok());

        let zero = SheetLayout { checked_in_column: 0, ..Default::default() };
        assert!(matches!(zero.validate(), Err(Error::Config(_))));

        let same = SheetLayout { checked_in_column: 6, ..Default::default() };
        assert!(same.validate().is_err());
    }

    #[test]
    fn test_check_in_updates() {
        let updates = SheetLayout::default().check_in_updates("2026-10-17 10:00:00");
        assert_eq!(
            updates,
            vec![(5, "Yes".to_string()), (6, "2026-10-17 10:00:00".to_string())]
        );
    }
}
