//! SES 通知送信実装
//!
//! AWS SES v2 API の raw 送信を使用してメールを送信する。
//! SES の simple 形式は添付ファイルを扱えないため、SMTP チャネルと同じ
//! MIME メッセージを組み立ててそのまま渡す。

use async_trait::async_trait;
use aws_sdk_sesv2::{
    Client,
    primitives::Blob,
    types::{Destination, EmailContent, RawMessage},
};
use intake_domain::notification::{ChannelError, ChannelResult, DeliveryRequest};

use super::{Capability, TransportChannel, build_message};

/// SES 通知送信
///
/// `aws_sdk_sesv2::Client` をラップする。
/// クライアントが渡されなかった場合（`SES_ENABLED=false`）は利用不可のチャネルとして構築される。
pub struct SesChannel {
    capability: Capability<Client>,
}

impl SesChannel {
    /// 新しい SES 送信インスタンスを作成
    ///
    /// # 引数
    ///
    /// - `client`: AWS SES v2 クライアント（`None` の場合は利用不可）
    pub fn new(client: Option<Client>) -> Self {
        Self {
            capability: Capability::from_result(
                client.ok_or_else(|| "SES クライアントが構成されていません".to_string()),
            ),
        }
    }

    pub fn is_available(&self) -> bool {
        self.capability.is_ready()
    }
}

/// SES クライアントを作成する
///
/// 認証情報は SDK のデフォルト認証チェーンで解決する:
/// - ローカル: 環境変数 `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`（`.env` で設定）
/// - 本番: IAM ロール
///
/// # 引数
///
/// * `region` - SES のリージョン（例: `ap-northeast-1`）
pub async fn create_client(region: &str) -> Client {
    let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(region.to_string()))
        .load()
        .await;

    Client::new(&config)
}

#[async_trait]
impl TransportChannel for SesChannel {
    fn name(&self) -> &str {
        "ses"
    }

    async fn send(&self, request: &DeliveryRequest) -> ChannelResult {
        let client = self.capability.ready()?;

        let raw = RawMessage::builder()
            .data(Blob::new(build_message(request)?.formatted()))
            .build()
            .map_err(|e| ChannelError::transport(format!("raw メッセージ構築失敗: {e}")))?;

        tracing::debug!(
            notification.channel = "ses",
            notification.submission_id = %request.submission_id,
            attachments = request.attachments.len(),
            "SES でメールを送信します"
        );

        let destination = Destination::builder()
            .to_addresses(&request.recipient_address)
            .build();

        client
            .send_email()
            .from_email_address(&request.sender_address)
            .destination(destination)
            .content(EmailContent::builder().raw(raw).build())
            .send()
            .await
            .map_err(|e| ChannelError::transport(format!("SES 送信失敗: {e}")))?;

        Ok(())
    }
}
