//! 外部スキャナーコマンド（zbarcam 等）によるデコーダ
//!
//! 標準出力の1行を1ペイロードとして扱う。起動はスキャンタスク（tokio ランタイム）内で行う。

use super::FrameDecoder;
use crate::error::{CheckInError, Result};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver};
use tracing::debug;

pub struct CommandDecoder {
    program: String,
    args: Vec<String>,
    child: Option<Child>,
    lines: Option<UnboundedReceiver<String>>,
}

impl CommandDecoder {
    pub fn new(command: &[String]) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| CheckInError::Config("スキャナーコマンドが空です".into()))?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            child: None,
            lines: None,
        })
    }
}

impl FrameDecoder for CommandDecoder {
    fn start(&mut self) -> Result<()> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CheckInError::Scanner(format!("{} 起動エラー: {}", self.program, e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| CheckInError::Scanner("標準出力を取得できません".into()))?;

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if tx.send(line).is_err() {
                    break;
                }
            }
        });

        debug!("スキャナー起動: {} (pid {:?})", self.program, child.id());
        self.child = Some(child);
        self.lines = Some(rx);
        Ok(())
    }

    fn decode_frame(&mut self) -> Result<Option<String>> {
        let Some(lines) = self.lines.as_mut() else {
            return Err(CheckInError::Scanner("スキャナー未起動".into()));
        };

        loop {
            match lines.try_recv() {
                Ok(line) => {
                    let payload = line.trim_end_matches(['\r', '\n']);
                    if !payload.trim().is_empty() {
                        return Ok(Some(payload.to_string()));
                    }
                }
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Disconnected) => {
                    return Err(CheckInError::Scanner(format!("{} が終了しました", self.program)))
                }
            }
        }
    }

    /// 子プロセスに終了シグナルを送るだけで待たない（回収は tokio に任せる）
    fn release(&mut self) {
        self.lines = None;
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.start_kill() {
                debug!("スキャナー停止済み: {}", e);
            }
        }
    }
}

impl Drop for CommandDecoder {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_command_rejected() {
        assert!(matches!(CommandDecoder::new(&[]), Err(CheckInError::Config(_))));
    }

    #[test]
    fn test_decode_before_start() {
        let mut decoder = CommandDecoder::new(&["zbarcam".to_string()]).unwrap();
        assert!(decoder.decode_frame().is_err());
    }

    #[tokio::test]
    async fn test_missing_program() {
        let mut decoder =
            CommandDecoder::new(&["definitely-not-a-scanner-binary".to_string()]).unwrap();
        assert!(matches!(decoder.start(), Err(CheckInError::Scanner(_))));
        decoder.release();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_reads_payload_line() {
        let mut decoder = CommandDecoder::new(&[
            "sh".to_string(),
            "-c".to_string(),
            r#"printf '\n{"id":"A100"}\n'; sleep 5"#.to_string(),
        ])
        .unwrap();
        decoder.start().unwrap();

        let mut payload = None;
        for _ in 0..100 {
            if let Some(p) = decoder.decode_frame().unwrap() {
                payload = Some(p);
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        decoder.release();
        assert_eq!(payload.as_deref(), Some(r#"{"id":"A100"}"#));
    }

    /// 解放は子プロセスの終了を待たずに戻る
    #[cfg(unix)]
    #[tokio::test]
    async fn test_release_does_not_wait_for_exit() {
        let mut decoder = CommandDecoder::new(&[
            "sh".to_string(),
            "-c".to_string(),
            "sleep 30".to_string(),
        ])
        .unwrap();
        decoder.start().unwrap();

        let started = std::time::Instant::now();
        decoder.release();
        assert!(started.elapsed() < std::time::Duration::from_secs(1));
        assert!(decoder.decode_frame().is_err());
    }
}
