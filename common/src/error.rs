//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Empty payload")]
    EmptyPayload,

    /// 現在の状態では受け付けられない操作
    #[error("Invalid transition: {action} is not allowed while {mode}")]
    InvalidTransition {
        action: &'static str,
        mode: &'static str,
    },
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
