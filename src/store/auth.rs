//! サービスアカウント認証
//!
//! 認証情報の探索順:
//! 1. 環境変数 `CHECKIN_GOOGLE_CREDENTIALS`（JSON本文。デプロイ時のシークレット）
//! 2. `/run/secrets/google_credentials`
//! 3. 設定ファイルの `credentialsPath`（ローカル開発用）
//!
//! 認証済みクライアントはプロセス内でキャッシュし、以降の呼び出しで再利用する。

use crate::error::{CheckInError, Result};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

pub const CREDENTIALS_ENV: &str = "CHECKIN_GOOGLE_CREDENTIALS";
pub const CREDENTIALS_SECRET_PATH: &str = "/run/secrets/google_credentials";

const TOKEN_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECONDS: i64 = 3600;

lazy_static::lazy_static! {
    static ref CLIENTS: Mutex<HashMap<String, Arc<SheetsClient>>> = Mutex::new(HashMap::new());
}

/// サービスアカウント鍵（JSON鍵ファイルの必要部分）
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountKey {
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| CheckInError::Auth(format!("認証情報の形式が不正: {}", e)))
    }
}

/// `credentials_path` は設定ファイルの `credentialsPath`
pub fn load_credentials(credentials_path: Option<&Path>) -> Result<ServiceAccountKey> {
    load_credentials_from(
        std::env::var(CREDENTIALS_ENV).ok(),
        Path::new(CREDENTIALS_SECRET_PATH),
        credentials_path,
    )
}

fn load_credentials_from(
    env_value: Option<String>,
    secret_path: &Path,
    local_path: Option<&Path>,
) -> Result<ServiceAccountKey> {
    if let Some(content) = env_value.filter(|v| !v.trim().is_empty()) {
        match ServiceAccountKey::from_json(&content) {
            Ok(key) => return Ok(key),
            Err(e) => warn!("{} から認証情報を読み込めません: {}", CREDENTIALS_ENV, e),
        }
    }

    let mut candidates = vec![secret_path];
    candidates.extend(local_path);

    for path in candidates {
        if !path.exists() {
            debug!("認証情報ファイルなし: {}", path.display());
            continue;
        }
        match std::fs::read_to_string(path)
            .map_err(CheckInError::from)
            .and_then(|content| ServiceAccountKey::from_json(&content))
        {
            Ok(key) => return Ok(key),
            Err(e) => warn!("{} から認証情報を読み込めません: {}", path.display(), e),
        }
    }

    Err(CheckInError::MissingCredentials)
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_expired(&self) -> bool {
        Utc::now() + chrono::Duration::seconds(60) >= self.expires_at
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    TOKEN_LIFETIME_SECONDS
}

/// 認証済みHTTPクライアント
pub struct SheetsClient {
    http: reqwest::Client,
    key: ServiceAccountKey,
    token: tokio::sync::Mutex<AccessToken>,
}

impl SheetsClient {
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// 有効なアクセストークン（期限切れなら取り直す）
    pub async fn bearer_token(&self) -> Result<String> {
        let mut token = self.token.lock().await;
        if token.is_expired() {
            debug!("アクセストークン更新: {}", self.key.client_email);
            *token = exchange_token(&self.http, &self.key).await?;
        }
        Ok(token.value.clone())
    }

    /// 期限内の固定トークンを持つクライアント（ローカルのスタブサーバー向け）
    #[cfg(test)]
    pub(crate) fn with_static_token(http: reqwest::Client, token: &str) -> Self {
        Self {
            http,
            key: ServiceAccountKey {
                client_email: "checkin@localhost".to_string(),
                private_key: String::new(),
                private_key_id: None,
                token_uri: DEFAULT_TOKEN_URI.to_string(),
            },
            token: tokio::sync::Mutex::new(AccessToken {
                value: token.to_string(),
                expires_at: Utc::now() + chrono::Duration::seconds(TOKEN_LIFETIME_SECONDS),
            }),
        }
    }
}

/// サービスアカウントで認証（プロセス内キャッシュあり）
pub async fn authenticate(key: ServiceAccountKey) -> Result<Arc<SheetsClient>> {
    if let Some(client) = cached_client(&key.client_email) {
        debug!("認証キャッシュを使用: {}", key.client_email);
        return Ok(client);
    }

    let http = reqwest::Client::new();
    let token = exchange_token(&http, &key).await?;
    info!("認証成功: {}", key.client_email);

    let email = key.client_email.clone();
    let client = Arc::new(SheetsClient {
        http,
        key,
        token: tokio::sync::Mutex::new(token),
    });

    let mut clients = CLIENTS
        .lock()
        .map_err(|_| CheckInError::Auth("認証キャッシュにアクセスできません".into()))?;
    Ok(clients.entry(email).or_insert(client).clone())
}

fn cached_client(client_email: &str) -> Option<Arc<SheetsClient>> {
    CLIENTS.lock().ok()?.get(client_email).cloned()
}

async fn exchange_token(http: &reqwest::Client, key: &ServiceAccountKey) -> Result<AccessToken> {
    let now = Utc::now();
    let claims = Claims {
        iss: &key.client_email,
        scope: TOKEN_SCOPE,
        aud: &key.token_uri,
        iat: now.timestamp(),
        exp: now.timestamp() + TOKEN_LIFETIME_SECONDS,
    };

    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();

    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| CheckInError::Auth(format!("秘密鍵が不正: {}", e)))?;
    let assertion = jsonwebtoken::encode(&header, &claims, &encoding_key)
        .map_err(|e| CheckInError::Auth(format!("JWT署名エラー: {}", e)))?;

    let response = http
        .post(&key.token_uri)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
        .send()
        .await
        .map_err(|e| CheckInError::Auth(format!("トークン取得エラー: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        return Err(CheckInError::Auth(format!(
            "トークン取得失敗 ({}): {}",
            status,
            text.trim()
        )));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| CheckInError::ApiParse(format!("トークンレスポンス: {}", e)))?;

    Ok(AccessToken {
        value: token.access_token,
        expires_at: now + chrono::Duration::seconds(token.expires_in),
    })
}
