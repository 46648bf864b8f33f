use crate::error::{CheckInError, Result};
use regex::Regex;

/// スプレッドシートの所在（URLから抽出したキー）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLocator {
    pub url: String,
    pub spreadsheet_id: String,
}

impl SheetLocator {
    pub fn parse(url: &str) -> Result<Self> {
        lazy_static::lazy_static! {
            static ref KEY_RE: Regex = Regex::new(r"/spreadsheets/d/([a-zA-Z0-9\-_]+)").unwrap();
        }

        let spreadsheet_id = KEY_RE
            .captures(url)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| CheckInError::InvalidSheetUrl(url.to_string()))?;

        Ok(Self {
            url: url.to_string(),
            spreadsheet_id,
        })
    }
}
