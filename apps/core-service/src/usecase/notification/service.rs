//! # 通知サービス
//!
//! 通知判定 → レポート描画 → 添付ファイル化 → 配信 を統合するサービス。
//!
//! ## 設計方針
//!
//! - **呼び出し元を失敗させない**: `notify_doctor()` は `bool` だけを返し、panic もエラーも返さない
//! - **上流の失敗は区別して記録**: 添付ファイル化・描画の失敗はチャネル失敗とは別のログになる
//! - **依存性注入**: 描画サービスと送信チャネルは trait で抽象化

use std::sync::Arc;

use intake_domain::{
    attachment::{Attachment, package_document},
    notification::{DeliveryRequest, NotificationError},
    policy::{NotificationPolicy, NotifyDecision, SkipReason},
    report::Audience,
    submission::SubmissionContext,
};
use intake_shared::{
    event_log::{error as log_error, event},
    log_business_event,
};
use tracing_error::SpanTrace;

use super::{DeliveryDispatcher, DispatchOutcome, DocumentRenderer, TeraReportRenderer, channels};
use crate::config::NotificationConfig;

/// 送信元
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderIdentity {
    pub address: String,
    pub name:    String,
}

/// 医師通知の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// ポリシーにより通知しない
    Skipped(SkipReason),
    /// 医師に配信した
    Delivered { channel: String },
    /// すべてのチャネルで失敗
    Exhausted { attempts: usize },
}

impl NotifyOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

/// 通知サービス
///
/// 問診票 1 件の送信に対して、必要なら担当医へ通知する。
pub struct NotificationService {
    policy:     NotificationPolicy,
    documents:  Arc<dyn DocumentRenderer>,
    templates:  Arc<TeraReportRenderer>,
    dispatcher: DeliveryDispatcher,
    sender:     SenderIdentity,
    disclaimer: String,
}

impl NotificationService {
    pub fn new(
        policy: NotificationPolicy,
        documents: Arc<dyn DocumentRenderer>,
        templates: Arc<TeraReportRenderer>,
        dispatcher: DeliveryDispatcher,
        sender: SenderIdentity,
        disclaimer: impl Into<String>,
    ) -> Self {
        Self {
            policy,
            documents,
            templates,
            dispatcher,
            sender,
            disclaimer: disclaimer.into(),
        }
    }

    /// 設定から通知サービスを構築する
    ///
    /// 送信チャネルは設定の優先順に構築する。
    pub async fn from_config(config: &NotificationConfig) -> Result<Self, NotificationError> {
        let renderer = Arc::new(TeraReportRenderer::new()?);
        let channels = channels::build_channels(config).await;

        Ok(Self::new(
            NotificationPolicy::new(config.policy),
            renderer.clone(),
            renderer,
            DeliveryDispatcher::new(channels),
            SenderIdentity {
                address: config.from_address.clone(),
                name:    config.from_name.clone(),
            },
            config.disclaimer.clone(),
        ))
    }

    pub fn dispatcher(&self) -> &DeliveryDispatcher {
        &self.dispatcher
    }

    /// 担当医に通知する
    ///
    /// 通知した場合のみ `true` を返す。通知不要と判定した場合、
    /// 全チャネルで失敗した場合、添付ファイルを準備できなかった場合は `false`。
    #[tracing::instrument(
        skip_all,
        fields(notification.submission_id = %submission.submission_id)
    )]
    pub async fn notify_doctor(&self, submission: &SubmissionContext) -> bool {
        match self.try_notify_doctor(submission).await {
            Ok(outcome) => outcome.is_delivered(),
            Err(e) => {
                let kind = match &e {
                    NotificationError::Packaging(_) => log_error::kind::PACKAGING,
                    NotificationError::TemplateFailed(_) => log_error::kind::RENDERING,
                };
                tracing::error!(
                    error.category = log_error::category::DATA_CONTRACT,
                    error.kind = kind,
                    notification.submission_id = %submission.submission_id,
                    error = %e,
                    span_trace = %SpanTrace::capture(),
                    "医師通知の準備に失敗"
                );
                false
            }
        }
    }

    /// 担当医に通知し、結果の詳細を返す
    ///
    /// # エラー
    ///
    /// レポートの描画・添付ファイル化に失敗した場合。チャネルの失敗はエラーではなく
    /// [`NotifyOutcome::Exhausted`] として返す。
    pub async fn try_notify_doctor(
        &self,
        submission: &SubmissionContext,
    ) -> Result<NotifyOutcome, NotificationError> {
        let doctor = match (
            self.policy.decide(&submission.redflags, &submission.form),
            submission.form.doctor.as_ref(),
        ) {
            (NotifyDecision::Skip(reason), _) => return Ok(self.skip(submission, reason)),
            (NotifyDecision::Notify, None) => {
                return Ok(self.skip(submission, SkipReason::NoDoctorAssigned));
            }
            (NotifyDecision::Notify, Some(doctor)) => doctor,
        };
        let Some(recipient) = doctor.deliverable_email() else {
            return Ok(self.skip(submission, SkipReason::NoDeliverableContact));
        };

        let model = submission.report_model(&self.disclaimer);
        let stem = format!("intake-report-{}", submission.submission_id);
        let attachments = [Audience::Patient, Audience::Doctor]
            .into_iter()
            .map(|audience| -> Result<Attachment, NotificationError> {
                let document = self.documents.render(&model, audience)?;
                Ok(package_document(document, &stem)?)
            })
            .collect::<Result<Vec<_>, NotificationError>>()?;

        let email = self.templates.render_doctor_email(submission, &doctor.name)?;

        let request = DeliveryRequest {
            submission_id: submission.submission_id.clone(),
            recipient_address: recipient.to_string(),
            subject: email.subject,
            html_body: email.html_body,
            text_body: email.text_body,
            attachments,
            sender_address: self.sender.address.clone(),
            sender_name: self.sender.name.clone(),
        };

        let outcome = match self.dispatcher.dispatch(&request).await {
            DispatchOutcome::Delivered {
                channel,
                failed_attempts,
            } => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_DELIVERED,
                    event.entity_type = event::entity_type::SUBMISSION,
                    event.entity_id = %submission.submission_id,
                    event.result = event::result::SUCCESS,
                    notification.channel = %channel,
                    notification.failed_attempts = failed_attempts.len(),
                    "担当医への通知が完了"
                );
                NotifyOutcome::Delivered { channel }
            }
            DispatchOutcome::Exhausted { failures } => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_EXHAUSTED,
                    event.entity_type = event::entity_type::SUBMISSION,
                    event.entity_id = %submission.submission_id,
                    event.result = event::result::FAILURE,
                    notification.attempts = failures.len(),
                    "すべての通知チャネルで送信に失敗"
                );
                NotifyOutcome::Exhausted {
                    attempts: failures.len(),
                }
            }
        };

        Ok(outcome)
    }

    fn skip(&self, submission: &SubmissionContext, reason: SkipReason) -> NotifyOutcome {
        let skip_reason: &'static str = reason.into();
        log_business_event!(
            event.category = event::category::NOTIFICATION,
            event.action = event::action::NOTIFICATION_SKIPPED,
            event.entity_type = event::entity_type::SUBMISSION,
            event.entity_id = %submission.submission_id,
            event.result = event::result::SKIPPED,
            notification.skip_reason = skip_reason,
            "担当医への通知は不要"
        );
        NotifyOutcome::Skipped(reason)
    }
}

#[cfg(test)]
mod tests {
    use intake_domain::{attachment::RenderedDocument, policy::PolicyMode, report::ReportModel};
    use intake_infra::mock::MockChannel;
    use pretty_assertions::assert_eq;
    use tracing::Level;

    use super::*;
    use crate::test_utils::{LogCapture, NotificationTestBuilder};

    fn flagged_submission() -> SubmissionContext {
        NotificationTestBuilder::submission(vec![NotificationTestBuilder::chest_pain()])
    }

    fn quiet_submission() -> SubmissionContext {
        NotificationTestBuilder::submission(vec![])
    }

    /// 空のドキュメントを返す描画サービス
    struct EmptyRenderer;

    impl DocumentRenderer for EmptyRenderer {
        fn render(
            &self,
            _model: &ReportModel,
            audience: Audience,
        ) -> Result<RenderedDocument, NotificationError> {
            Ok(RenderedDocument {
                audience,
                content: vec![],
                mime_type: "application/pdf".to_string(),
                extension: "pdf".to_string(),
            })
        }
    }

    /// 常に失敗する描画サービス
    struct BrokenRenderer;

    impl DocumentRenderer for BrokenRenderer {
        fn render(
            &self,
            _model: &ReportModel,
            _audience: Audience,
        ) -> Result<RenderedDocument, NotificationError> {
            Err(NotificationError::TemplateFailed("テンプレートなし".to_string()))
        }
    }

    #[tokio::test]
    async fn レッドフラグがあれば担当医に添付つきで送信する() {
        let channel = MockChannel::succeeding("sendgrid");
        let service = NotificationTestBuilder::new().channel(&channel).build();
        let submission = flagged_submission();

        let outcome = service.try_notify_doctor(&submission).await.unwrap();

        assert_eq!(
            outcome,
            NotifyOutcome::Delivered {
                channel: "sendgrid".to_string(),
            }
        );
        let sent = channel.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient_address, "sato@clinic.example.com");
        let filenames: Vec<&str> = sent[0]
            .attachments
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(
            filenames,
            vec![
                format!("intake-report-{}-patient.html", submission.submission_id),
                format!("intake-report-{}-doctor.html", submission.submission_id),
            ]
        );
    }

    #[tokio::test]
    async fn 通知不要ならチャネルを呼ばずにfalseを返す() {
        let channel = MockChannel::succeeding("sendgrid");
        let service = NotificationTestBuilder::new().channel(&channel).build();
        let submission = quiet_submission();

        assert_eq!(
            service.try_notify_doctor(&submission).await.unwrap(),
            NotifyOutcome::Skipped(SkipReason::NoTrigger)
        );
        assert!(!service.notify_doctor(&submission).await);
        assert_eq!(channel.call_count(), 0);
    }

    #[tokio::test]
    async fn 連絡先のない担当医には送信しない() {
        let channel = MockChannel::succeeding("sendgrid");
        let service = NotificationTestBuilder::new()
            .policy(PolicyMode::Always)
            .channel(&channel)
            .build();
        let mut submission = quiet_submission();
        if let Some(doctor) = submission.form.doctor.as_mut() {
            doctor.email = Some("  ".to_string());
        }

        let outcome = service.try_notify_doctor(&submission).await.unwrap();

        assert_eq!(outcome, NotifyOutcome::Skipped(SkipReason::NoDeliverableContact));
        assert_eq!(channel.call_count(), 0);
    }

    #[tokio::test]
    async fn 常時通知ならレッドフラグがなくても送信する() {
        let channel = MockChannel::succeeding("smtp");
        let service = NotificationTestBuilder::new()
            .policy(PolicyMode::Always)
            .channel(&channel)
            .build();

        assert!(service.notify_doctor(&quiet_submission()).await);
        assert_eq!(channel.call_count(), 1);
    }

    #[tokio::test]
    async fn 全チャネル失敗ならexhaustedでfalse() {
        let service = NotificationTestBuilder::new()
            .channel(&MockChannel::unavailable("sendgrid"))
            .channel(&MockChannel::failing("smtp"))
            .build();
        let submission = flagged_submission();

        assert_eq!(
            service.try_notify_doctor(&submission).await.unwrap(),
            NotifyOutcome::Exhausted { attempts: 2 }
        );
        assert!(!service.notify_doctor(&submission).await);
    }

    #[tokio::test]
    async fn 空のドキュメントはパッケージングエラーで送信しない() {
        let capture = LogCapture::new();
        let _guard = capture.set_default();
        let channel = MockChannel::succeeding("sendgrid");
        let service = NotificationTestBuilder::new()
            .renderer(Arc::new(EmptyRenderer))
            .channel(&channel)
            .build();
        let submission = flagged_submission();

        let result = service.try_notify_doctor(&submission).await;
        assert!(matches!(result, Err(NotificationError::Packaging(_))));

        assert!(!service.notify_doctor(&submission).await);
        assert_eq!(channel.call_count(), 0);
        let packaging_errors: Vec<_> = capture
            .events()
            .into_iter()
            .filter(|e| e.field("error.kind") == Some(log_error::kind::PACKAGING))
            .collect();
        assert_eq!(packaging_errors.len(), 1);
        assert_eq!(packaging_errors[0].level, Level::ERROR);
        assert!(packaging_errors[0].field("span_trace").is_some());
    }

    #[tokio::test]
    async fn 描画に失敗したらfalseを返す() {
        let channel = MockChannel::succeeding("sendgrid");
        let service = NotificationTestBuilder::new()
            .renderer(Arc::new(BrokenRenderer))
            .channel(&channel)
            .build();
        let submission = flagged_submission();

        assert!(!service.notify_doctor(&submission).await);
        assert_eq!(channel.call_count(), 0);
    }
}
