//! SMTP 通知送信実装
//!
//! lettre の `AsyncSmtpTransport` を使用してメールを送信する。
//! 開発環境では Mailpit（ローカル SMTP サーバー、STARTTLS なし）に接続する。

use async_trait::async_trait;
use intake_domain::notification::{ChannelError, ChannelResult, DeliveryRequest};
use lettre::{
    AsyncSmtpTransport,
    AsyncTransport,
    Tokio1Executor,
    transport::smtp::authentication::Credentials,
};

use super::{Capability, SmtpConfig, TransportChannel, build_message};

/// SMTP 通知送信
///
/// `lettre::AsyncSmtpTransport<Tokio1Executor>` をラップする。
/// ホスト未設定・認証情報の片方だけの指定は利用不可として扱う。
pub struct SmtpChannel {
    capability: Capability<AsyncSmtpTransport<Tokio1Executor>>,
}

impl SmtpChannel {
    /// 設定から SMTP チャネルを作成する
    ///
    /// 接続は送信時に行うため、ここではネットワークアクセスは発生しない。
    pub fn new(config: &SmtpConfig) -> Self {
        Self {
            capability: Capability::from_result(Self::probe(config)),
        }
    }

    fn probe(config: &SmtpConfig) -> Result<AsyncSmtpTransport<Tokio1Executor>, String> {
        let host = config
            .host
            .as_deref()
            .map(str::trim)
            .filter(|host| !host.is_empty())
            .ok_or_else(|| "SMTP_HOST が設定されていません".to_string())?;

        let credentials = match (&config.username, &config.password) {
            (Some(username), Some(password)) => {
                Some(Credentials::new(username.clone(), password.clone()))
            }
            (None, None) => None,
            _ => {
                return Err(
                    "SMTP_USERNAME と SMTP_PASSWORD は同時に設定する必要があります".to_string(),
                );
            }
        };

        let builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .map_err(|e| format!("STARTTLS の構成に失敗: {e}"))?
        } else {
            // builder_dangerous: TLS なしで接続（Mailpit 等のローカル SMTP 向け）
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
        };

        let mut builder = builder.port(config.port).timeout(Some(config.timeout));
        if let Some(credentials) = credentials {
            builder = builder.credentials(credentials);
        }

        Ok(builder.build())
    }

    pub fn is_available(&self) -> bool {
        self.capability.is_ready()
    }
}

#[async_trait]
impl TransportChannel for SmtpChannel {
    fn name(&self) -> &str {
        "smtp"
    }

    async fn send(&self, request: &DeliveryRequest) -> ChannelResult {
        let transport = self.capability.ready()?;
        let message = build_message(request)?;
        tracing::debug!(
            notification.channel = "smtp",
            notification.submission_id = %request.submission_id,
            attachments = request.attachments.len(),
            "SMTP でメールを送信します"
        );

        transport
            .send(message)
            .await
            .map_err(|e| ChannelError::transport(format!("SMTP 送信失敗: {e}")))?;

        Ok(())
    }
}
