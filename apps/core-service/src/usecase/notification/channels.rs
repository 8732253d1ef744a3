//! # 送信チャネルの構築
//!
//! 設定の優先順に従って [`TransportChannel`] を構築する。
//! 設定が欠けたチャネルも構築し、送信時に利用不可を返させる。

use std::sync::Arc;

use intake_infra::notification::{
    SendGridChannel,
    SesChannel,
    SmtpChannel,
    TransportChannel,
    create_ses_client,
};

use crate::config::{ChannelKind, NotificationConfig};

/// 設定から送信チャネルを優先順に構築する
pub async fn build_channels(config: &NotificationConfig) -> Vec<Arc<dyn TransportChannel>> {
    let mut channels: Vec<Arc<dyn TransportChannel>> = Vec::with_capacity(config.channels.len());

    for kind in &config.channels {
        let (channel, available): (Arc<dyn TransportChannel>, bool) = match kind {
            ChannelKind::Sendgrid => {
                let channel = SendGridChannel::new(&config.sendgrid);
                let available = channel.is_available();
                (Arc::new(channel), available)
            }
            ChannelKind::Smtp => {
                let channel = SmtpChannel::new(&config.smtp);
                let available = channel.is_available();
                (Arc::new(channel), available)
            }
            ChannelKind::Ses => {
                let client = if config.ses.enabled {
                    Some(create_ses_client(&config.ses.region).await)
                } else {
                    None
                };
                let channel = SesChannel::new(client);
                let available = channel.is_available();
                (Arc::new(channel), available)
            }
        };

        if available {
            tracing::info!(notification.channel = %kind, "通知チャネルを構成しました");
        } else {
            tracing::warn!(
                notification.channel = %kind,
                "通知チャネルの設定が不足しています（送信時はスキップされます）"
            );
        }
        channels.push(channel);
    }

    channels
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> NotificationConfig {
        NotificationConfig::from_lookup(|name| {
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        })
        .unwrap()
    }

    #[tokio::test]
    async fn 設定の優先順にチャネルを構築する() {
        let config = config(&[("NOTIFICATION_CHANNELS", "smtp,ses,sendgrid")]);

        let channels = build_channels(&config).await;

        let names: Vec<&str> = channels.iter().map(|channel| channel.name()).collect();
        assert_eq!(names, vec!["smtp", "ses", "sendgrid"]);
    }

    #[tokio::test]
    async fn 設定が欠けたチャネルも構築される() {
        // SENDGRID_API_KEY・SMTP_HOST とも未設定
        let channels = build_channels(&config(&[])).await;

        assert_eq!(channels.len(), 2);
    }
}
