//! # 配信ディスパッチャー
//!
//! 優先順位つきの送信チャネルを順に試し、最初に成功したところで止まる。
//!
//! ## 設計方針
//!
//! - **チャネル種別で分岐しない**: すべてのチャネルを [`TransportChannel`] として扱う
//! - **利用不可も送信失敗も次のチャネルへ**: 両者はログ上で区別するが、制御は同じ
//! - **試行ごとに 1 レコード**: 成功なら成功ログ、失敗ならチャネル名と失敗種別つきの失敗ログ
//! - **チャネル内の再試行はしない**

use std::sync::Arc;

use intake_domain::notification::{ChannelError, ChannelFailureKind, DeliveryRequest};
use intake_infra::notification::TransportChannel;
use intake_shared::{
    event_log::{error as log_error, event},
    log_business_event,
};

/// 1 チャネルでの失敗
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelFailure {
    pub channel: String,
    pub error:   ChannelError,
}

/// 配信の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// いずれかのチャネルで送信に成功
    Delivered {
        channel:         String,
        /// 成功までに失敗したチャネル（試行順）
        failed_attempts: Vec<ChannelFailure>,
    },
    /// すべてのチャネルで失敗
    Exhausted { failures: Vec<ChannelFailure> },
}

impl DispatchOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

/// 配信ディスパッチャー
///
/// チャネルは起動時に一度だけ構築され、読み取り専用で共有される。
pub struct DeliveryDispatcher {
    channels: Vec<Arc<dyn TransportChannel>>,
}

impl DeliveryDispatcher {
    /// 優先順（先頭が最優先）のチャネルからディスパッチャーを作成する
    pub fn new(channels: Vec<Arc<dyn TransportChannel>>) -> Self {
        Self { channels }
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|channel| channel.name()).collect()
    }

    /// 配信リクエストを送信し、いずれかのチャネルで成功したかを返す
    pub async fn deliver(&self, request: &DeliveryRequest) -> bool {
        self.dispatch(request).await.is_delivered()
    }

    /// 配信リクエストを優先順に送信する
    ///
    /// チャネルが 1 つもない場合は失敗なしの [`DispatchOutcome::Exhausted`] を返す。
    pub async fn dispatch(&self, request: &DeliveryRequest) -> DispatchOutcome {
        let mut failures = Vec::new();

        for channel in &self.channels {
            match channel.send(request).await {
                Ok(()) => {
                    log_business_event!(
                        event.category = event::category::NOTIFICATION,
                        event.action = event::action::CHANNEL_SUCCEEDED,
                        event.entity_type = event::entity_type::SUBMISSION,
                        event.entity_id = %request.submission_id,
                        event.result = event::result::SUCCESS,
                        notification.channel = channel.name(),
                        notification.submission_id = %request.submission_id,
                        "通知チャネルで送信成功"
                    );
                    return DispatchOutcome::Delivered {
                        channel:         channel.name().to_string(),
                        failed_attempts: failures,
                    };
                }
                Err(error) => {
                    log_failure(channel.name(), request, &error);
                    failures.push(ChannelFailure {
                        channel: channel.name().to_string(),
                        error,
                    });
                }
            }
        }

        DispatchOutcome::Exhausted { failures }
    }
}

fn log_failure(channel: &str, request: &DeliveryRequest, error: &ChannelError) {
    let failure_kind: &'static str = error.kind().into();
    let (error_kind, message) = match error.kind() {
        ChannelFailureKind::Unavailable => (
            log_error::kind::CHANNEL_UNAVAILABLE,
            "通知チャネルが利用できないため次のチャネルへ",
        ),
        ChannelFailureKind::Transport => (
            log_error::kind::CHANNEL_TRANSPORT,
            "通知チャネルでの送信に失敗したため次のチャネルへ",
        ),
    };

    log_business_event!(
        event.category = event::category::NOTIFICATION,
        event.action = event::action::CHANNEL_FAILED,
        event.entity_type = event::entity_type::SUBMISSION,
        event.entity_id = %request.submission_id,
        event.result = event::result::FAILURE,
        notification.channel = channel,
        notification.submission_id = %request.submission_id,
        notification.failure_kind = failure_kind,
        error.category = log_error::category::EXTERNAL_SERVICE,
        error.kind = error_kind,
        error = %error,
        "{message}"
    );
}
