//! 通知テストビルダー
//!
//! モックチャネルと標準的なテストデータで [`NotificationService`] を組み立てる。

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use intake_domain::{
    policy::{NotificationPolicy, PolicyMode},
    report::{QuestionAnswer, RedFlag},
    submission::{DoctorContact, FormContext, SubmissionContext, SubmissionId},
};
use intake_infra::{mock::MockChannel, notification::TransportChannel};

use crate::usecase::notification::{
    DeliveryDispatcher,
    DocumentRenderer,
    NotificationService,
    SenderIdentity,
    TeraReportRenderer,
};

/// テスト用の免責事項
pub const TEST_DISCLAIMER: &str = "この問診結果は診断ではありません。";

/// 通知テストビルダー
///
/// # 使用例
///
/// ```ignore
/// let channel = MockChannel::succeeding("sendgrid");
/// let service = NotificationTestBuilder::new().channel(&channel).build();
/// ```
pub struct NotificationTestBuilder {
    channels: Vec<Arc<dyn TransportChannel>>,
    policy:   PolicyMode,
    renderer: Option<Arc<dyn DocumentRenderer>>,
}

impl Default for NotificationTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationTestBuilder {
    pub fn new() -> Self {
        Self {
            channels: Vec::new(),
            policy:   PolicyMode::Gated,
            renderer: None,
        }
    }

    /// チャネルを優先順の末尾に追加する（状態はクローン元と共有）
    pub fn channel(mut self, channel: &MockChannel) -> Self {
        self.channels.push(Arc::new(channel.clone()));
        self
    }

    pub fn policy(mut self, policy: PolicyMode) -> Self {
        self.policy = policy;
        self
    }

    /// レポート描画サービスを差し替える（既定は tera テンプレート）
    pub fn renderer(mut self, renderer: Arc<dyn DocumentRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn build(self) -> NotificationService {
        let templates = Arc::new(TeraReportRenderer::new().unwrap());
        let documents = self
            .renderer
            .unwrap_or_else(|| templates.clone() as Arc<dyn DocumentRenderer>);

        NotificationService::new(
            NotificationPolicy::new(self.policy),
            documents,
            templates,
            DeliveryDispatcher::new(self.channels),
            SenderIdentity {
                address: "noreply@intake.example.com".to_string(),
                name:    "Intake".to_string(),
            },
            TEST_DISCLAIMER,
        )
    }

    /// 担当医（メールあり）つきの送信内容
    pub fn submission(redflags: Vec<RedFlag>) -> SubmissionContext {
        SubmissionContext {
            submission_id: SubmissionId::new(),
            patient_name: "山田花子".to_string(),
            submitted_at: Utc.with_ymd_and_hms(2026, 10, 14, 9, 30, 0).unwrap(),
            redflags,
            answers: vec![
                QuestionAnswer::new("年齢", "45"),
                QuestionAnswer::new("主訴", "胸痛"),
                QuestionAnswer::new("既往歴", "高血圧"),
            ],
            form: FormContext {
                doctor:           Some(DoctorContact {
                    name:   "佐藤一郎".to_string(),
                    email:  Some("sato@clinic.example.com".to_string()),
                    mobile: None,
                }),
                review_requested: false,
            },
        }
    }

    /// 情報 URL つきのレッドフラグ
    pub fn chest_pain() -> RedFlag {
        RedFlag::new(
            "胸の痛みが 20 分以上続いている",
            Some("https://example.com/info/chest-pain".parse().unwrap()),
        )
        .unwrap()
    }
}
