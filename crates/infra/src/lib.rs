//! # Intake インフラ層
//!
//! 外部システムとの接続・通信を担当するインフラストラクチャ層。
//!
//! ## 設計方針
//!
//! このクレートはドメイン層の配信リクエストを、具体的な送信手段（メール API、
//! SMTP リレー、Amazon SES）で送り出す実装を提供する。外部システムの詳細を
//! カプセル化し、ディスパッチャーはチャネルの種類で分岐しない。
//!
//! ## 依存関係
//!
//! ```text
//! core-service → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`notification`] - 送信チャネル（SendGrid / SMTP / SES）とチャネル設定
//! - `mock` - テスト用モックチャネル（`test-utils` feature）
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use intake_infra::notification::{SmtpChannel, SmtpConfig, TransportChannel};
//!
//! let channel = SmtpChannel::new(&SmtpConfig::default());
//! let result = channel.send(&request).await;
//! ```

pub mod notification;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
