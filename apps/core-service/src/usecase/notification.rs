//! # 通知ユースケース
//!
//! 問診票の送信に伴う医師通知の判定・描画・パッケージング・配信を統合する。
//!
//! ## モジュール構成
//!
//! - [`channels`] - 設定からの送信チャネル構築
//! - [`dispatcher`] - 優先順位つきチャネル間のフェイルオーバー
//! - [`template_renderer`] - tera テンプレートエンジンによるレポート・メール生成
//! - [`service`] - 判定 + 描画 + パッケージング + 配信の統合サービス

pub mod channels;
pub mod dispatcher;
pub mod service;
pub mod template_renderer;

pub use dispatcher::{ChannelFailure, DeliveryDispatcher, DispatchOutcome};
pub use service::{NotificationService, NotifyOutcome, SenderIdentity};
pub use template_renderer::{DoctorEmail, DocumentRenderer, TeraReportRenderer};
