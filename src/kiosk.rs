//! 対話式受付画面（ターミナル）
//!
//! 画面に出せる操作は `ScanSession::available_actions` から作る。

use crate::acquisition::{start_scan, CommandDecoder};
use crate::config::Config;
use crate::desk::{CheckInDesk, ConfirmOutcome, LoadOutcome};
use crate::error::{CheckInError, Result};
use crate::store::AttendeeStore;
use checkin_common::{Action, Review, SessionCounters};
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub struct KioskOptions {
    pub camera: bool,
    pub scanner_command: Vec<String>,
    pub scan_interval: Duration,
    pub scan_timeout: Duration,
}

impl KioskOptions {
    pub fn from_config(config: &Config, camera: bool) -> Self {
        Self {
            camera,
            scanner_command: config.scanner_command.clone(),
            scan_interval: config.scan_interval(),
            scan_timeout: config.scan_timeout(),
        }
    }
}

/// 受付ループ（Quit で終了）
pub async fn run<S: AttendeeStore>(desk: &mut CheckInDesk<S>, options: &KioskOptions) -> Result<()> {
    println!("🎟️ Event Check-in System\n");

    loop {
        print_stats(desk.session().counters());
        match desk.review() {
            Some(review) => print_review(&review),
            None => println!("\n📷 Scan QR Code"),
        }
        if let Some(failure) = desk.session().failure() {
            println!("❌ {}", failure);
        }

        let actions: Vec<Action> = desk
            .session()
            .available_actions()
            .into_iter()
            .filter(|a| options.camera || *a != Action::ScanWithCamera)
            .collect();
        let mut labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();
        labels.push("Quit");

        let selection = Select::new()
            .with_prompt("操作を選択")
            .items(&labels)
            .default(0)
            .interact()
            .map_err(|e| CheckInError::CliExecution(e.to_string()))?;

        let Some(action) = actions.get(selection).copied() else {
            println!("終了します");
            break;
        };
        handle_action(desk, action, options).await?;
    }

    Ok(())
}

async fn handle_action<S: AttendeeStore>(
    desk: &mut CheckInDesk<S>,
    action: Action,
    options: &KioskOptions,
) -> Result<()> {
    match action {
        Action::LoadAttendees => {
            let outcome = with_spinner("参加者データを読み込み中...", desk.load_attendees()).await;
            print_load_outcome(&outcome);
        }
        Action::ResetScanner => {
            desk.reset();
            println!("✔ スキャナーをリセットしました");
        }
        Action::ScanWithCamera => match scan_with_camera(options).await {
            Ok(Some(payload)) => {
                desk.submit_payload(payload)?;
            }
            Ok(None) => println!("QRコードを検出できませんでした"),
            Err(e) => println!("❌ {}", e),
        },
        Action::ManualEntry => {
            let code: String = Input::new()
                .with_prompt("Enter Attendee ID")
                .allow_empty(true)
                .interact_text()
                .map_err(|e| CheckInError::CliExecution(e.to_string()))?;
            if !code.is_empty() {
                desk.submit_payload(code)?;
            }
        }
        Action::ConfirmCheckIn | Action::CheckInAgain => {
            let outcome = desk.confirm().await?;
            print_confirm_outcome(&outcome);
            if matches!(outcome, ConfirmOutcome::CheckedIn { .. }) {
                desk.display_pause().await;
            }
        }
        Action::ScanAgain => desk.scan_again()?,
        Action::TryAgain => desk.try_again()?,
        Action::LoadDataAndTryAgain => {
            let outcome =
                with_spinner("参加者データを読み込み中...", desk.load_and_retry()).await?;
            print_load_outcome(&outcome);
        }
    }
    Ok(())
}

/// カメラでスキャン（タイムアウトまたは Ctrl+C で中断）
///
/// スキャナーを起動できない・途中で落ちた場合は `Err`。
async fn scan_with_camera(options: &KioskOptions) -> Result<Option<String>> {
    let decoder = CommandDecoder::new(&options.scanner_command)?;
    let mut handle = start_scan(decoder, options.scan_interval);

    let spinner = spinner("Align the QR code with the camera to scan.");
    let payload = tokio::select! {
        payload = handle.next() => payload,
        _ = tokio::time::sleep(options.scan_timeout) => None,
        _ = tokio::signal::ctrl_c() => None,
    };
    spinner.finish_and_clear();

    // 次の状態に進む前にカメラを解放
    handle.join().await;
    payload.transpose()
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

async fn with_spinner<F: std::future::Future>(message: &str, future: F) -> F::Output {
    let spinner = spinner(message);
    let output = future.await;
    spinner.finish_and_clear();
    output
}

pub fn print_stats(counters: &SessionCounters) {
    println!("---");
    println!(
        "📊 Total Checked In: {}  |  Type A Tickets: {}  |  Type B Tickets: {}",
        counters.total_checked_in, counters.type_a, counters.type_b
    );
    println!("---");
}

pub fn print_review(review: &Review) {
    println!("\n🪪 Attendee Check-in");
    println!("Scanned ID: {}", review.attendee_id());

    match review {
        Review::NoSnapshot { .. } => {
            println!("❌ 参加者データが読み込まれていません。先に読み込んでください");
        }
        Review::NotFound { .. } => println!("❌ Attendee not found!"),
        Review::AlreadyCheckedIn { record } | Review::Ready { record } => {
            println!("✅ Attendee found!\n");
            println!("[Attendee Information]");
            for (name, value) in record.display_fields() {
                println!("  {}: {}", name, value);
            }
            println!("\n[Check-in Status]");
            if record.checked_in {
                println!("  ⚠️ This attendee has already checked in!");
                println!("  Previous check-in: {}", record.check_in_time);
            } else {
                println!("  未受付");
            }
        }
    }
}

pub fn print_load_outcome(outcome: &LoadOutcome) {
    match outcome {
        LoadOutcome::Loaded { count } => println!("✔ Loaded {} attendees!", count),
        LoadOutcome::Failed => println!("❌ Failed to load attendee data."),
    }
}

pub fn print_confirm_outcome(outcome: &ConfirmOutcome) {
    match outcome {
        ConfirmOutcome::CheckedIn {
            record,
            first_time,
            timestamp,
        } => {
            let note = if *first_time { "" } else { "（再受付）" };
            println!("🎉 受付完了: {} {} @ {}", record.id, note, timestamp);
        }
        ConfirmOutcome::Failed { message } => println!("❌ 受付に失敗しました: {}", message),
    }
}
