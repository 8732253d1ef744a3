//! SendGrid 通知送信実装
//!
//! SendGrid v3 `mail/send` API を使用してメールを送信する。
//! 添付ファイルは API の形式（base64 + type + disposition）に変換する。

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use intake_domain::notification::{ChannelError, ChannelResult, DeliveryRequest};
use serde::Serialize;

use super::{Capability, SendGridConfig, TransportChannel};

#[derive(Debug, Serialize)]
struct SendGridAddress<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name:  Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct SendGridPersonalization<'a> {
    to: Vec<SendGridAddress<'a>>,
}

#[derive(Debug, Serialize)]
struct SendGridContent<'a> {
    #[serde(rename = "type")]
    content_type: &'static str,
    value:        &'a str,
}

#[derive(Debug, Serialize)]
struct SendGridAttachment<'a> {
    content:      String,
    #[serde(rename = "type")]
    content_type: &'a str,
    filename:     &'a str,
    disposition:  &'static str,
}

/// `mail/send` のリクエストボディ
#[derive(Debug, Serialize)]
struct SendGridRequest<'a> {
    personalizations: Vec<SendGridPersonalization<'a>>,
    from:             SendGridAddress<'a>,
    subject:          &'a str,
    /// text/plain を text/html より先に置く（API の要件）
    content:          Vec<SendGridContent<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments:      Vec<SendGridAttachment<'a>>,
}

struct SendGridClient {
    http:    reqwest::Client,
    api_key: String,
    api_url: String,
}

/// SendGrid 通知送信
///
/// API キーが未設定、または HTTP クライアントを構築できない場合は
/// 利用不可のチャネルとして構築される。
pub struct SendGridChannel {
    capability: Capability<SendGridClient>,
}

impl SendGridChannel {
    /// 設定から SendGrid チャネルを作成する
    pub fn new(config: &SendGridConfig) -> Self {
        Self {
            capability: Capability::from_result(Self::probe(config)),
        }
    }

    fn probe(config: &SendGridConfig) -> Result<SendGridClient, String> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| "SENDGRID_API_KEY が設定されていません".to_string())?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| format!("HTTP クライアントの構築に失敗: {e}"))?;

        Ok(SendGridClient {
            http,
            api_key: api_key.to_string(),
            api_url: config.api_url.clone(),
        })
    }

    /// 送信に必要な設定が揃っているか
    pub fn is_available(&self) -> bool {
        self.capability.is_ready()
    }
}

fn build_payload(request: &DeliveryRequest) -> SendGridRequest<'_> {
    let sender_name = Some(request.sender_name.as_str()).filter(|name| !name.trim().is_empty());

    let attachments = request
        .attachments
        .iter()
        .map(|attachment| SendGridAttachment {
            content:      STANDARD.encode(attachment.content()),
            content_type: attachment.mime_type(),
            filename:     attachment.filename(),
            disposition:  "attachment",
        })
        .collect();

    SendGridRequest {
        personalizations: vec![SendGridPersonalization {
            to: vec![SendGridAddress {
                email: &request.recipient_address,
                name:  None,
            }],
        }],
        from: SendGridAddress {
            email: &request.sender_address,
            name:  sender_name,
        },
        subject: &request.subject,
        content: vec![
            SendGridContent {
                content_type: "text/plain",
                value:        &request.text_body,
            },
            SendGridContent {
                content_type: "text/html",
                value:        &request.html_body,
            },
        ],
        attachments,
    }
}

#[async_trait]
impl TransportChannel for SendGridChannel {
    fn name(&self) -> &str {
        "sendgrid"
    }

    async fn send(&self, request: &DeliveryRequest) -> ChannelResult {
        let client = self.capability.ready()?;
        let payload = build_payload(request);
        tracing::debug!(
            notification.channel = "sendgrid",
            notification.submission_id = %request.submission_id,
            attachments = request.attachments.len(),
            "SendGrid API でメールを送信します"
        );

        let response = client
            .http
            .post(&client.api_url)
            .bearer_auth(&client.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ChannelError::transport(format!("SendGrid API 呼び出し失敗: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChannelError::transport(format!(
                "SendGrid API がエラーを返しました: HTTP {status}: {body}"
            )));
        }

        Ok(())
    }
}
