//! # テスト用モックチャネル
//!
//! ディスパッチャー・通知サービスのテストで使用するインメモリのモック。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! intake-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use intake_domain::notification::{ChannelError, ChannelResult, DeliveryRequest};

use crate::notification::TransportChannel;

// ===== MockChannel =====

/// 受信した配信リクエストの要約
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentRecord {
    pub recipient_address: String,
    pub subject:           String,
    pub attachments:       Vec<(String, Vec<u8>)>,
}

/// 結果を固定できるモックチャネル
///
/// `Clone` は内部状態を共有するため、テスト側で保持したクローンから
/// 呼び出し回数や受信内容を検証できる。
#[derive(Clone)]
pub struct MockChannel {
    name:   String,
    result: ChannelResult,
    sent:   Arc<Mutex<Vec<SentRecord>>>,
}

impl MockChannel {
    /// 常に成功するチャネル
    pub fn succeeding(name: impl Into<String>) -> Self {
        Self::with_result(name, Ok(()))
    }

    /// 常に利用不可を返すチャネル（依存・設定の欠落を模擬）
    pub fn unavailable(name: impl Into<String>) -> Self {
        Self::with_result(name, Err(ChannelError::unavailable("モック: 設定なし")))
    }

    /// 常に送信エラーを返すチャネル
    pub fn failing(name: impl Into<String>) -> Self {
        Self::with_result(name, Err(ChannelError::transport("モック: 接続拒否")))
    }

    pub fn with_result(name: impl Into<String>, result: ChannelResult) -> Self {
        Self {
            name: name.into(),
            result,
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// `send` が呼ばれた回数
    pub fn call_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// 受信した配信リクエストの要約
    pub fn sent(&self) -> Vec<SentRecord> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransportChannel for MockChannel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, request: &DeliveryRequest) -> ChannelResult {
        self.sent.lock().unwrap().push(SentRecord {
            recipient_address: request.recipient_address.clone(),
            subject:           request.subject.clone(),
            attachments:       request
                .attachments
                .iter()
                .map(|a| (a.filename().to_string(), a.content().to_vec()))
                .collect(),
        });
        self.result.clone()
    }
}
