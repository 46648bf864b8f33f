//! QRコード取得
//!
//! カメラ経由のデコードは別タスクで一定間隔ごとに行い、最初の1件で停止する。
//! 結果は1件だけ格納できるチャネルで受け渡す（スキャナーのエラーも同じ経路で返す）。
//! 手動入力の文字列はそのまま使う。

mod command;

pub use command::CommandDecoder;

use crate::error::Result;
use std::time::Duration;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// カメラ + QRデコーダ
pub trait FrameDecoder: Send + 'static {
    /// キャプチャ開始
    fn start(&mut self) -> Result<()>;

    /// 1フレーム分デコード（未検出なら `None`、エラーはスキャン終了）
    fn decode_frame(&mut self) -> Result<Option<String>>;

    /// キャプチャ資源の解放
    fn release(&mut self);
}

/// 実行中のスキャン
///
/// `stop()` は何度呼んでもよい。ハンドルを破棄しても停止する。
pub struct ScanHandle {
    result: Option<oneshot::Receiver<Result<String>>>,
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

/// スキャンを開始
pub fn start_scan<D: FrameDecoder>(mut decoder: D, interval: Duration) -> ScanHandle {
    let (result_tx, result_rx) = oneshot::channel();
    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        if let Err(e) = decoder.start() {
            warn!("スキャナー起動失敗: {}", e);
            decoder.release();
            let _ = result_tx.send(Err(e));
            return;
        }

        let mut found = None;
        let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
        loop {
            tokio::select! {
                _ = &mut stop_rx => {
                    debug!("スキャン停止");
                    break;
                }
                _ = ticker.tick() => {
                    match decoder.decode_frame() {
                        Ok(Some(payload)) => {
                            debug!("QRコード検出: {} chars", payload.len());
                            found = Some(Ok(payload));
                            break;
                        }
                        Ok(None) => {}
                        Err(e) => {
                            warn!("スキャナーエラー: {}", e);
                            found = Some(Err(e));
                            break;
                        }
                    }
                }
            }
        }

        // 結果を渡す前にキャプチャを解放する
        decoder.release();
        if let Some(result) = found {
            let _ = result_tx.send(result);
        }
    });

    ScanHandle {
        result: Some(result_rx),
        stop: Some(stop_tx),
        task: Some(task),
    }
}

impl ScanHandle {
    /// 検出済みペイロード（またはスキャナーのエラー）を取り出す。1回だけ返す
    pub fn poll(&mut self) -> Option<Result<String>> {
        let result = self.result.as_mut()?;
        match result.try_recv() {
            Ok(payload) => {
                self.result = None;
                Some(payload)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => {
                self.result = None;
                None
            }
        }
    }

    /// ペイロードを待つ。停止された場合は `None`
    pub async fn next(&mut self) -> Option<Result<String>> {
        let result = self.result.as_mut()?;
        let payload = result.await.ok();
        self.result = None;
        payload
    }

    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }

    /// 停止してキャプチャ解放まで待つ
    pub async fn join(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("スキャンタスク異常終了: {}", e);
            }
        }
    }
}

impl Drop for ScanHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
