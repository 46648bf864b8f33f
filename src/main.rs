use checkin_common::{Review, SessionCounters};
use clap::Parser;
use dialoguer::Confirm;
use event_checkin::{cli, config, desk, error, kiosk, logging, report, store};
use cli::{Cli, Commands};
use config::Config;
use desk::{CheckInDesk, ConfirmOutcome, LoadOutcome};
use error::{CheckInError, Result};
use store::SheetsStore;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Run { no_camera } => {
            // 認証や読み込みの失敗は画面上で再試行できるようにする
            let url = config.resolve_sheet_url(cli.sheet_url.as_deref())?;
            let store = SheetsStore::open(&config, &url)?;
            let mut desk = CheckInDesk::from_config(store, &config);

            let outcome = desk.load_attendees().await;
            kiosk::print_load_outcome(&outcome);

            let options = kiosk::KioskOptions::from_config(&config, !no_camera);
            kiosk::run(&mut desk, &options).await?;
        }

        Commands::Load => {
            let store = connect(&config, cli.sheet_url.as_deref()).await?;
            let mut desk = CheckInDesk::from_config(store, &config);

            let outcome = desk.load_attendees().await;
            kiosk::print_load_outcome(&outcome);
            if let LoadOutcome::Loaded { .. } = outcome {
                kiosk::print_stats(desk.session().counters());
            }
        }

        Commands::Lookup { payload } => {
            let store = connect(&config, cli.sheet_url.as_deref()).await?;
            let mut desk = CheckInDesk::from_config(store, &config);

            kiosk::print_load_outcome(&desk.load_attendees().await);
            let review = desk.submit_payload(payload)?;
            kiosk::print_review(&review);
        }

        Commands::CheckIn { payload, yes } => {
            let store = connect(&config, cli.sheet_url.as_deref()).await?;
            let mut desk = CheckInDesk::from_config(store, &config);

            kiosk::print_load_outcome(&desk.load_attendees().await);
            let review = desk.submit_payload(payload)?;
            kiosk::print_review(&review);

            let prompt = match &review {
                Review::Ready { .. } => "Confirm Check-in?",
                Review::AlreadyCheckedIn { .. } => "Check in Again?",
                _ => return Ok(()),
            };

            if !yes {
                let proceed = Confirm::new()
                    .with_prompt(prompt)
                    .default(false)
                    .interact()
                    .map_err(|e| CheckInError::CliExecution(e.to_string()))?;
                if !proceed {
                    println!("中止しました");
                    return Ok(());
                }
            }

            let outcome = desk.confirm().await?;
            kiosk::print_confirm_outcome(&outcome);
            if let ConfirmOutcome::Failed { message } = outcome {
                return Err(CheckInError::Update(message));
            }
            kiosk::print_stats(desk.session().counters());
        }

        Commands::Export { output } => {
            let store = connect(&config, cli.sheet_url.as_deref()).await?;
            let snapshot = store::load_snapshot(&store).await;
            if snapshot.is_empty() {
                return Err(CheckInError::Load("参加者データがありません".into()));
            }

            let counters = SessionCounters::derive(&snapshot);
            report::write_report(&snapshot, &counters, &output)?;
            println!("✔ レポート出力: {} ({}件)", output.display(), snapshot.len());
        }

        Commands::Config { set_sheet_url, set_credentials, show } => {
            let mut config = config;

            if let Some(url) = set_sheet_url {
                store::SheetLocator::parse(&url)?;
                config.set_sheet_url(url)?;
                println!("✔ シートURLを設定しました");
            }

            if let Some(path) = set_credentials {
                if !path.exists() {
                    return Err(CheckInError::Config(format!(
                        "ファイルが見つかりません: {}",
                        path.display()
                    )));
                }
                config.set_credentials_path(path)?;
                println!("✔ 認証情報ファイルを設定しました");
            }

            if show {
                println!("設定:");
                println!("  シートURL: {}", config.sheet_url.as_deref().unwrap_or("未設定"));
                println!(
                    "  認証情報ファイル: {}",
                    config
                        .credentials_path
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "未設定".into())
                );
                println!("  スキャナー: {}", config.scanner_command.join(" "));
                println!("  スキャン間隔: {}ms", config.scan_interval_ms);
                println!(
                    "  書き込み列: 受付={} 時刻={}",
                    config.layout.checked_in_column, config.layout.check_in_time_column
                );
            }
        }
    }

    Ok(())
}

async fn connect(config: &Config, sheet_url: Option<&str>) -> Result<SheetsStore> {
    let url = config.resolve_sheet_url(sheet_url)?;
    SheetsStore::connect(config, &url).await
}
