//! # Intake ドメイン層
//!
//! 問診票の送信から医師通知までの通知パイプラインで使うドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **値オブジェクト**: 識別子を持たない不変オブジェクト（例: [`report::RedFlag`]）
//! - **ドメインサービス**: 副作用を持たない判定ロジック（例: [`policy::NotificationPolicy`]）
//! - **ドメインエラー**: 契約違反を表現するエラー型
//!
//! ## 依存関係の方向
//!
//! ```text
//! core-service → infra → domain
//! ```
//!
//! ドメイン層はインフラ層（メール API、SMTP）には一切依存しない。
//!
//! ## モジュール構成
//!
//! - [`attachment`] - 添付ファイルのパッケージング
//! - [`error`] - ドメイン層で発生するエラーの定義
//! - [`notification`] - 配信リクエストとチャネル結果
//! - [`policy`] - 医師通知の要否判定
//! - [`report`] - レポートモデル（レッドフラグ、質問と回答）
//! - [`submission`] - 問診票の送信コンテキスト

#[macro_use]
mod macros;

pub mod attachment;
pub mod error;
pub mod notification;
pub mod policy;
pub mod report;
pub mod submission;

pub use error::DomainError;
