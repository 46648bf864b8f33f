use crate::error::{CheckInError, Result};
use checkin_common::SheetLayout;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// 参加者シートのURL
    pub sheet_url: Option<String>,
    /// サービスアカウント鍵ファイル（開発用）
    pub credentials_path: Option<PathBuf>,
    /// QRスキャナーコマンド（1行1ペイロードを標準出力に出すもの）
    pub scanner_command: Vec<String>,
    pub scan_interval_ms: u64,
    pub scan_timeout_seconds: u64,
    /// 受付完了表示の待ち時間
    pub confirm_pause_ms: u64,
    pub layout: SheetLayout,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sheet_url: None,
            credentials_path: None,
            scanner_command: vec![
                "zbarcam".into(),
                "--raw".into(),
                "--nodisplay".into(),
                "-q".into(),
            ],
            scan_interval_ms: 100,
            scan_timeout_seconds: 60,
            confirm_pause_ms: 2000,
            layout: SheetLayout::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.layout.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CheckInError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("event-checkin").join("config.json"))
    }

    /// コマンドライン指定を優先してシートURLを決定
    pub fn resolve_sheet_url(&self, override_url: Option<&str>) -> Result<String> {
        override_url
            .map(str::to_string)
            .or_else(|| self.sheet_url.clone())
            .filter(|url| !url.trim().is_empty())
            .ok_or(CheckInError::MissingSheetUrl)
    }

    pub fn set_sheet_url(&mut self, url: String) -> Result<()> {
        self.sheet_url = Some(url);
        self.save()
    }

    pub fn set_credentials_path(&mut self, path: PathBuf) -> Result<()> {
        self.credentials_path = Some(path);
        self.save()
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_millis(self.scan_interval_ms)
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_secs(self.scan_timeout_seconds)
    }

    pub fn confirm_pause(&self) -> Duration {
        Duration::from_millis(self.confirm_pause_ms)
    }
}
