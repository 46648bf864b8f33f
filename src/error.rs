use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckInError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("認証情報が見つかりません。環境変数 CHECKIN_GOOGLE_CREDENTIALS か `checkin config --set-credentials PATH` で設定してください")]
    MissingCredentials,

    #[error("シートURLが設定されていません。`checkin config --set-sheet-url URL` で設定してください")]
    MissingSheetUrl,

    #[error("シートURLが不正: {0}")]
    InvalidSheetUrl(String),

    #[error("認証エラー: {0}")]
    Auth(String),

    #[error("参加者データの読み込みに失敗: {0}")]
    Load(String),

    #[error("スプレッドシート更新エラー: {0}")]
    Update(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("スキャナーエラー: {0}")]
    Scanner(String),

    #[error("レポート生成エラー: {0}")]
    Report(String),

    #[error("受付処理エラー: {0}")]
    Session(#[from] checkin_common::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("CLI実行エラー: {0}")]
    CliExecution(String),
}

pub type Result<T> = std::result::Result<T, CheckInError>;
