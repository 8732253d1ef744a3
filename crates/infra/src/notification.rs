//! # 通知送信チャネル
//!
//! 医師向け通知メールの送信を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `TransportChannel` trait で送信手段を抽象化し、
//!   ディスパッチャーはチャネルの種類で分岐しない
//! - **3 つの実装**: SendGrid（メール API）、SMTP（lettre）、SES（Amazon SES v2）
//! - **構築時の能力確認**: 設定や依存が欠けたチャネルも構築は成功し、
//!   `send` が [`ChannelError::Unavailable`] を返す。続行の判断はディスパッチャーが行う
//! - **明示的な設定**: 各チャネルは構築時に設定構造体を受け取り、環境変数を直接読まない

mod config;
mod mime_message;
mod sendgrid;
mod ses;
mod smtp;

use async_trait::async_trait;
pub use config::{DEFAULT_SEND_TIMEOUT, SENDGRID_DEFAULT_API_URL, SendGridConfig, SmtpConfig};
use intake_domain::notification::{ChannelError, ChannelResult, DeliveryRequest};
pub use mime_message::build_message;
pub use sendgrid::SendGridChannel;
pub use ses::{SesChannel, create_client as create_ses_client};
pub use smtp::SmtpChannel;

/// 送信チャネルトレイト
///
/// 通知基盤の中核。1 つの配信リクエストを 1 つの手段で送信する。
/// 実装は内部のエラーをすべて [`ChannelError`] に変換し、panic しない。
#[async_trait]
pub trait TransportChannel: Send + Sync {
    /// ログに出力するチャネル識別子（例: `"sendgrid"`）
    fn name(&self) -> &str;

    /// 配信リクエストを送信する
    async fn send(&self, request: &DeliveryRequest) -> ChannelResult;
}

/// 構築時の能力確認の結果
///
/// 利用可能なら送信に必要な状態を保持し、利用不可ならその理由を保持する。
#[derive(Debug)]
enum Capability<T> {
    Ready(T),
    Unavailable(String),
}

impl<T> Capability<T> {
    fn from_result(result: Result<T, String>) -> Self {
        match result {
            Ok(inner) => Self::Ready(inner),
            Err(reason) => Self::Unavailable(reason),
        }
    }

    fn ready(&self) -> Result<&T, ChannelError> {
        match self {
            Self::Ready(inner) => Ok(inner),
            Self::Unavailable(reason) => Err(ChannelError::unavailable(reason.clone())),
        }
    }

    fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}
