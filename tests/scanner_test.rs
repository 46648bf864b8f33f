//! QRスキャンのテスト
//!
//! 擬似デコーダで、1件で停止すること・停止が冪等であること・解放漏れがないこと・
//! スキャナーのエラーが呼び出し側に届くことを検証

use event_checkin::acquisition::{start_scan, FrameDecoder};
use event_checkin::error::{CheckInError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct Probe {
    started: AtomicUsize,
    frames: AtomicUsize,
    released: AtomicUsize,
}

/// `hit_at` フレーム目でペイロードを返すデコーダ
struct FakeDecoder {
    probe: Arc<Probe>,
    hit_at: Option<usize>,
    payload: String,
    fail_start: bool,
    fail_decode: bool,
}

impl FakeDecoder {
    fn new(probe: &Arc<Probe>, hit_at: Option<usize>) -> Self {
        Self {
            probe: probe.clone(),
            hit_at,
            payload: r#"{"id":"A100"}"#.to_string(),
            fail_start: false,
            fail_decode: false,
        }
    }
}

impl FrameDecoder for FakeDecoder {
    fn start(&mut self) -> Result<()> {
        self.probe.started.fetch_add(1, Ordering::SeqCst);
        if self.fail_start {
            return Err(CheckInError::Scanner("camera busy".into()));
        }
        Ok(())
    }

    fn decode_frame(&mut self) -> Result<Option<String>> {
        let frame = self.probe.frames.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_decode {
            return Err(CheckInError::Scanner("zbarcam が終了しました".into()));
        }
        Ok(match self.hit_at {
            Some(n) if frame >= n => Some(self.payload.clone()),
            _ => None,
        })
    }

    fn release(&mut self) {
        self.probe.released.fetch_add(1, Ordering::SeqCst);
    }
}

const INTERVAL: Duration = Duration::from_millis(5);

/// 検出したら停止・解放し、結果は1回だけ返す
#[tokio::test]
async fn test_scan_returns_payload_once() {
    let probe = Arc::new(Probe::default());
    let mut handle = start_scan(FakeDecoder::new(&probe, Some(3)), INTERVAL);

    let payload = tokio::time::timeout(Duration::from_secs(5), handle.next())
        .await
        .expect("scan timed out")
        .expect("no result")
        .unwrap();
    assert_eq!(payload, r#"{"id":"A100"}"#);

    assert!(handle.poll().is_none());
    handle.join().await;

    assert_eq!(probe.started.load(Ordering::SeqCst), 1);
    assert_eq!(probe.frames.load(Ordering::SeqCst), 3);
    assert_eq!(probe.released.load(Ordering::SeqCst), 1);
}

/// ポーリングで取得（空 → 値）
#[tokio::test]
async fn test_poll_until_payload() {
    let probe = Arc::new(Probe::default());
    let mut handle = start_scan(FakeDecoder::new(&probe, Some(4)), INTERVAL);

    let mut payload = None;
    for _ in 0..1000 {
        if let Some(p) = handle.poll() {
            payload = Some(p.unwrap());
            break;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    assert_eq!(payload.as_deref(), Some(r#"{"id":"A100"}"#));
    assert!(handle.poll().is_none());

    handle.join().await;
    assert_eq!(probe.released.load(Ordering::SeqCst), 1);
}

/// 停止は何度呼んでも1回だけ解放
#[tokio::test]
async fn test_stop_is_idempotent() {
    let probe = Arc::new(Probe::default());
    let mut handle = start_scan(FakeDecoder::new(&probe, None), INTERVAL);
    tokio::time::sleep(Duration::from_millis(20)).await;

    handle.stop();
    handle.stop();
    assert!(handle.next().await.is_none());
    handle.join().await;

    assert_eq!(probe.released.load(Ordering::SeqCst), 1);
    let frames = probe.frames.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(probe.frames.load(Ordering::SeqCst), frames, "decoding continued after stop");
}

/// ハンドル破棄でも停止・解放される
#[tokio::test]
async fn test_drop_cancels_scan() {
    let probe = Arc::new(Probe::default());
    let handle = start_scan(FakeDecoder::new(&probe, None), INTERVAL);
    tokio::time::sleep(Duration::from_millis(20)).await;
    drop(handle);

    for _ in 0..500 {
        if probe.released.load(Ordering::SeqCst) == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    assert_eq!(probe.released.load(Ordering::SeqCst), 1);
}

/// カメラを開けない場合は起動エラーを返して終了
#[tokio::test]
async fn test_start_failure_is_reported() {
    let probe = Arc::new(Probe::default());
    let mut decoder = FakeDecoder::new(&probe, Some(1));
    decoder.fail_start = true;

    let mut handle = start_scan(decoder, INTERVAL);
    let result = handle.next().await;
    assert!(
        matches!(&result, Some(Err(CheckInError::Scanner(msg))) if msg == "camera busy"),
        "unexpected result: {:?}",
        result
    );
    handle.join().await;

    assert_eq!(probe.frames.load(Ordering::SeqCst), 0);
    assert_eq!(probe.released.load(Ordering::SeqCst), 1);
}

/// デコード中のエラーも結果として返り、スキャンは止まる
#[tokio::test]
async fn test_decode_error_is_reported() {
    let probe = Arc::new(Probe::default());
    let mut decoder = FakeDecoder::new(&probe, None);
    decoder.fail_decode = true;

    let mut handle = start_scan(decoder, INTERVAL);
    let result = tokio::time::timeout(Duration::from_secs(5), handle.next())
        .await
        .expect("scan timed out");
    assert!(matches!(result, Some(Err(CheckInError::Scanner(_)))));
    assert!(handle.poll().is_none());
    handle.join().await;

    assert_eq!(probe.frames.load(Ordering::SeqCst), 1);
    assert_eq!(probe.released.load(Ordering::SeqCst), 1);
}
