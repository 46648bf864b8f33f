use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "checkin")]
#[command(about = "QRコード受付・参加者チェックインツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 参加者シートのURL（省略時は設定ファイルの値）
    #[arg(long, global = true)]
    pub sheet_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 対話式の受付画面を起動
    Run {
        /// カメラを使わず手動入力のみ
        #[arg(long)]
        no_camera: bool,
    },

    /// 参加者を読み込んで受付状況を表示
    Load,

    /// ペイロード（QRの内容またはID）で参加者を照会（書き込みなし）
    Lookup {
        /// QRコードの内容または参加者ID
        #[arg(required = true)]
        payload: String,
    },

    /// 1件受付
    CheckIn {
        /// QRコードの内容または参加者ID
        #[arg(required = true)]
        payload: String,

        /// 確認せずに受付（受付済みでも再受付）
        #[arg(short, long)]
        yes: bool,
    },

    /// 受付レポートをExcelで出力
    Export {
        /// 出力ファイル
        #[arg(short, long, default_value = "checkin-report.xlsx")]
        output: PathBuf,
    },

    /// 設定を表示/編集
    Config {
        /// 参加者シートのURLを設定
        #[arg(long)]
        set_sheet_url: Option<String>,

        /// サービスアカウント鍵ファイルを設定
        #[arg(long)]
        set_credentials: Option<PathBuf>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check_in() {
        let cli = Cli::parse_from(["checkin", "check-in", r#"{"id":"A100"}"#, "--yes"]);
        match cli.command {
            Commands::CheckIn { payload, yes } => {
                assert_eq!(payload, r#"{"id":"A100"}"#);
                assert!(yes);
            }
            _ => panic!("unexpected command"),
        }
    }

    #[test]
    fn test_global_sheet_url() {
        let cli = Cli::parse_from(["checkin", "load", "--sheet-url", "https://x/spreadsheets/d/abc"]);
        assert_eq!(cli.sheet_url.as_deref(), Some("https://x/spreadsheets/d/abc"));
        assert!(matches!(cli.command, Commands::Load));
    }

    #[test]
    fn test_export_default_output() {
        let cli = Cli::parse_from(["checkin", "export"]);
        match cli.command {
            Commands::Export { output } => assert_eq!(output, PathBuf::from("checkin-report.xlsx")),
            _ => panic!("unexpected command"),
        }
    }
}
