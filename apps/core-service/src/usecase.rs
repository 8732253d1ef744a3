//! # ユースケース層
//!
//! Core Service のビジネスロジックを実装する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: 送信チャネル・描画サービスを `Arc<dyn Trait>` で外部から注入
//! - **呼び出し元を失敗させない**: 通知の結果は `bool` で返し、フォームの保存を妨げない
//!
//! ## モジュール構成
//!
//! - `notification`: 医師通知のユースケース

pub mod notification;

pub use notification::NotificationService;
