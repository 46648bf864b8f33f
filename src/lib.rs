//! Event Check-in
//!
//! QRコード（または手動入力）で参加者を照合し、スプレッドシートに受付済みと受付時刻を書き込む。

pub mod acquisition;
pub mod cli;
pub mod config;
pub mod desk;
pub mod error;
pub mod kiosk;
pub mod logging;
pub mod report;
pub mod store;
