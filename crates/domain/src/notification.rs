//! # 通知
//!
//! 医師へのメール通知に関するドメインモデルを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`DeliveryRequest`] | 配信リクエスト | 通知イベント 1 件につき 1 度だけ構築するメール |
//! | [`ChannelResult`] | チャネル結果 | 1 チャネルでの送信試行の結果 |
//! | [`ChannelError`] | チャネル失敗 | 利用不可 / 送信エラーの 2 種類 |
//!
//! ## 設計方針
//!
//! - **例外を使わない失敗**: チャネル内部のエラーは [`ChannelError`] に変換して返す
//! - **利用不可と送信エラーの区別**: どちらもフェイルオーバーの契機だが、ログ上は区別する
//! - **リクエストの不変性**: チャネルは `&DeliveryRequest` しか受け取らない

use strum::IntoStaticStr;
use thiserror::Error;

use crate::{
    attachment::{Attachment, PackagingError},
    submission::SubmissionId,
};

/// 配信リクエスト
///
/// 通知イベント 1 件につき 1 度だけ構築し、チャネルチェーンに参照で渡す。
/// 添付ファイルはこのリクエストが排他的に所有し、配信完了（成功または全滅）後に破棄される。
#[derive(Debug)]
pub struct DeliveryRequest {
    /// ログ出力用の送信 ID
    pub submission_id:     SubmissionId,
    /// 送信先メールアドレス
    pub recipient_address: String,
    /// 件名
    pub subject:           String,
    /// HTML 本文
    pub html_body:         String,
    /// プレーンテキスト本文
    pub text_body:         String,
    /// 添付ファイル（順序を保持）
    pub attachments:       Vec<Attachment>,
    /// 送信元メールアドレス
    pub sender_address:    String,
    /// 送信元の表示名
    pub sender_name:       String,
}

/// チャネル失敗の種別
///
/// ログの `notification.failure_kind` に出力される値。
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ChannelFailureKind {
    Unavailable,
    Transport,
}

/// チャネル失敗
///
/// どちらのバリアントもディスパッチャーにとっては同じ「次のチャネルへ」の合図。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// 必要な設定・依存が欠けていてチャネルが構造的に使えない
    #[error("チャネルが利用できません: {reason}")]
    Unavailable { reason: String },

    /// 送信中のネットワーク・認証・API エラー
    #[error("送信に失敗: {detail}")]
    Transport { detail: String },
}

impl ChannelError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn transport(detail: impl Into<String>) -> Self {
        Self::Transport {
            detail: detail.into(),
        }
    }

    /// 失敗の種別を返す
    pub fn kind(&self) -> ChannelFailureKind {
        match self {
            Self::Unavailable { .. } => ChannelFailureKind::Unavailable,
            Self::Transport { .. } => ChannelFailureKind::Transport,
        }
    }
}

/// 1 チャネルでの送信試行の結果
pub type ChannelResult = Result<(), ChannelError>;

/// 通知処理のエラー
///
/// チャネル失敗はここに含まれない（[`ChannelError`] としてディスパッチャー内で処理される）。
/// ここにあるのは、どのチャネルでも回復できない上流の失敗だけ。
#[derive(Debug, Error)]
pub enum NotificationError {
    /// 添付ファイルのパッケージングに失敗
    #[error("添付ファイルのパッケージングに失敗: {0}")]
    Packaging(#[from] PackagingError),

    /// テンプレートレンダリングに失敗
    #[error("テンプレートレンダリングに失敗: {0}")]
    TemplateFailed(String),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn channel_errorの種別が正しい() {
        assert_eq!(
            ChannelError::unavailable("API キー未設定").kind(),
            ChannelFailureKind::Unavailable
        );
        assert_eq!(ChannelError::transport("接続拒否").kind(), ChannelFailureKind::Transport);
    }

    #[test]
    fn channel_failure_kindの文字列変換が正しい() {
        let unavailable: &str = ChannelFailureKind::Unavailable.into();
        assert_eq!(unavailable, "unavailable");
        assert_eq!(ChannelFailureKind::Transport.to_string(), "transport");
    }

    #[test]
    fn channel_errorのメッセージに詳細が含まれる() {
        let err = ChannelError::transport("HTTP 401: invalid api key");
        assert_eq!(err.to_string(), "送信に失敗: HTTP 401: invalid api key");
    }

    #[test]
    fn packaging_errorからnotification_errorに変換できる() {
        let err: NotificationError = PackagingError::InvalidMimeType("pdf".to_string()).into();
        assert!(matches!(err, NotificationError::Packaging(_)));
    }
}
