//! Google Sheets（v4 REST API）実装
//!
//! 先頭シートのみを使用する。1行目をヘッダとして扱う。
//! 書き込み時は毎回ID列を読み直して行位置を決めるため、読み込み後に行が
//! 並べ替えられても対象行はずれない（読み直しから書き込みまでの間の変更は防げない）。
//! 認証は最初のリクエスト時に行い、失敗した場合は次のリクエストで再試行する。

use super::auth::{authenticate, load_credentials, SheetsClient};
use super::{AttendeeStore, SheetLocator};
use crate::config::Config;
use crate::error::{CheckInError, Result};
use checkin_common::layout::cell_ref;
use checkin_common::{AttendeeSnapshot, SheetLayout};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4";

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

pub struct SheetsStore {
    client: OnceCell<Arc<SheetsClient>>,
    credentials_path: Option<PathBuf>,
    locator: SheetLocator,
    layout: SheetLayout,
    api_base: String,
}

impl SheetsStore {
    pub fn new(client: Arc<SheetsClient>, locator: SheetLocator, layout: SheetLayout) -> Self {
        Self {
            client: OnceCell::from(client),
            credentials_path: None,
            locator,
            layout,
            api_base: SHEETS_API_BASE.to_string(),
        }
    }

    /// 認証せずにストアを開く（URLの検証のみ）
    pub fn open(config: &Config, sheet_url: &str) -> Result<Self> {
        Ok(Self {
            client: OnceCell::new(),
            credentials_path: config.credentials_path.clone(),
            locator: SheetLocator::parse(sheet_url)?,
            layout: config.layout,
            api_base: SHEETS_API_BASE.to_string(),
        })
    }

    /// 認証してストアを開く
    pub async fn connect(config: &Config, sheet_url: &str) -> Result<Self> {
        let store = Self::open(config, sheet_url)?;
        store.client().await?;
        Ok(store)
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    async fn client(&self) -> Result<&Arc<SheetsClient>> {
        self.client
            .get_or_try_init(|| async {
                let key = load_credentials(self.credentials_path.as_deref())?;
                let client = authenticate(key).await?;
                info!(
                    "スプレッドシート接続: {} ({})",
                    self.locator.spreadsheet_id,
                    client.client_email()
                );
                Ok::<_, CheckInError>(client)
            })
            .await
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        build_url(&self.api_base, &self.locator.spreadsheet_id, segments)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let client = self.client().await?;
        let token = client.bearer_token().await?;
        debug!("GET {}", url);

        let response = client
            .http()
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| CheckInError::Load(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(CheckInError::Load(format!("{}: {}", status, text.trim())));
        }

        response
            .json()
            .await
            .map_err(|e| CheckInError::ApiParse(e.to_string()))
    }

    async fn first_sheet_title(&self) -> Result<String> {
        let mut url = self.url(&[])?;
        url.query_pairs_mut().append_pair("fields", "sheets.properties.title");

        let meta: SpreadsheetMeta = self.get_json(url).await?;
        meta.sheets
            .into_iter()
            .next()
            .map(|s| s.properties.title)
            .ok_or_else(|| CheckInError::Load("シートがありません".into()))
    }

    /// 先頭シートのタイトルと全セル値
    async fn fetch_rows(&self) -> Result<(String, Vec<Vec<String>>)> {
        let title = self.first_sheet_title().await?;
        let range = quote_sheet_title(&title);
        let url = self.url(&["values", range.as_str()])?;

        let values: ValueRange = self.get_json(url).await?;
        let rows = values
            .values
            .iter()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect();
        Ok((title, rows))
    }
}

impl AttendeeStore for SheetsStore {
    async fn load_all(&self) -> Result<AttendeeSnapshot> {
        let (title, rows) = self.fetch_rows().await?;
        let snapshot = AttendeeSnapshot::from_rows(&rows);
        info!("{} から {}件読み込み", title, snapshot.len());
        Ok(snapshot)
    }

    async fn update_by_id(&self, attendee_id: &str, updates: &[(usize, String)]) -> Result<bool> {
        let (title, rows) = self
            .fetch_rows()
            .await
            .map_err(|e| CheckInError::Update(e.to_string()))?;
        let snapshot = AttendeeSnapshot::from_rows(&rows);

        let Some(index) = snapshot.records.iter().position(|r| r.id == attendee_id) else {
            return Ok(false);
        };
        let row = self.layout.sheet_row(index);
        let sheet = quote_sheet_title(&title);

        let data: Vec<Value> = updates
            .iter()
            .map(|(column, value)| {
                json!({
                    "range": format!("{}!{}", sheet, cell_ref(row, *column)),
                    "values": [[value]],
                })
            })
            .collect();
        let body = json!({
            "valueInputOption": "USER_ENTERED",
            "data": data,
        });

        let url = self.url(&["values:batchUpdate"])?;
        let client = self.client().await?;
        let token = client.bearer_token().await?;
        debug!("POST {} (row {})", url, row);

        let response = client
            .http()
            .post(url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| CheckInError::Update(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(CheckInError::Update(format!("{}: {}", status, text.trim())));
        }

        info!("{} を更新 (行 {})", attendee_id, row);
        Ok(true)
    }
}

fn build_url(api_base: &str, spreadsheet_id: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(api_base)
        .map_err(|e| CheckInError::Config(format!("API URLが不正: {}", e)))?;
    url.path_segments_mut()
        .map_err(|_| CheckInError::Config(format!("API URLが不正: {}", api_base)))?
        .pop_if_empty()
        .push("spreadsheets")
        .push(spreadsheet_id)
        .extend(segments);
    Ok(url)
}

/// A1表記用にシート名をクォート
fn quote_sheet_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

fn cell_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => if *b { "TRUE".into() } else { "FALSE".into() },
        other => other.to_string(),
    }
}
