//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use event_checkin::error::CheckInError;
use event_checkin::store::SheetLocator;

/// 不正なシートURL
#[test]
fn test_invalid_sheet_url() {
    let result = SheetLocator::parse("https://example.com/not-a-sheet");
    assert!(result.is_err());

    let err = result.unwrap_err();
    assert!(matches!(err, CheckInError::InvalidSheetUrl(_)));
}

/// CheckInErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        CheckInError::Config("テスト設定エラー".to_string()),
        CheckInError::InvalidSheetUrl("https://example.com".to_string()),
        CheckInError::Auth("トークン取得失敗".to_string()),
        CheckInError::Load("simulated network error".to_string()),
        CheckInError::Update("simulated network error".to_string()),
        CheckInError::Scanner("camera busy".to_string()),
        CheckInError::Report("書き込み失敗".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// 認証情報なしのメッセージに設定方法が含まれる
#[test]
fn test_missing_credentials_message() {
    let display = CheckInError::MissingCredentials.to_string();
    assert!(display.contains("CHECKIN_GOOGLE_CREDENTIALS"));
    assert!(display.contains("--set-credentials"));
}

/// 共通ライブラリのエラーから変換
#[test]
fn test_session_error_conversion() {
    let err: CheckInError = checkin_common::Error::EmptyPayload.into();
    assert!(matches!(err, CheckInError::Session(_)));
    assert!(err.to_string().contains("Empty payload"));
}

/// IOエラーから変換
#[test]
fn test_io_error_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: CheckInError = io_error.into();
    assert!(matches!(err, CheckInError::Io(_)));
}

/// JSONエラーから変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
    let err: CheckInError = json_err.into();
    assert!(matches!(err, CheckInError::JsonParse(_)));
}
