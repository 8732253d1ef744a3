//! # テンプレートレンダラー
//!
//! tera テンプレートエンジンで問診結果レポートと医師向け通知メールを生成する。
//!
//! ## 設計方針
//!
//! - **`include_str!` によるコンパイル時埋め込み**: テンプレートはバイナリに埋め込まれる
//! - **条件付きセクションはテンプレート側で分岐**: レッドフラグ・回答が空の場合、
//!   そのセクションは出力しない
//! - **自動エスケープ**: `.html` テンプレートは tera の自動エスケープを有効にしたまま使う
//! - **件名パターン**: `[Intake] 問診票の確認依頼: {患者名}`

use intake_domain::{
    attachment::RenderedDocument,
    notification::NotificationError,
    report::{Audience, ReportModel},
    submission::SubmissionContext,
};
use tera::{Context, Tera};

/// レポート描画サービス
///
/// 描画結果は添付ファイルとしてパッケージングされる。レイアウトや
/// 出力形式（HTML・PDF）は実装が決める。
pub trait DocumentRenderer: Send + Sync {
    /// 指定した読み手向けのレポートを描画する
    fn render(
        &self,
        model: &ReportModel,
        audience: Audience,
    ) -> Result<RenderedDocument, NotificationError>;
}

/// 医師向け通知メールの件名と本文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorEmail {
    pub subject:   String,
    pub html_body: String,
    pub text_body: String,
}

/// tera によるレポート・メールのレンダラー
pub struct TeraReportRenderer {
    engine: Tera,
}

impl TeraReportRenderer {
    /// 新しいレンダラーインスタンスを作成
    ///
    /// `include_str!` で埋め込んだテンプレートを tera に登録する。
    pub fn new() -> Result<Self, NotificationError> {
        let mut engine = Tera::default();

        engine
            .add_raw_templates(vec![
                (
                    "patient_report.html",
                    include_str!("../../../templates/reports/patient_report.html"),
                ),
                (
                    "doctor_report.html",
                    include_str!("../../../templates/reports/doctor_report.html"),
                ),
                (
                    "doctor_notification.html",
                    include_str!("../../../templates/notifications/doctor_notification.html"),
                ),
                (
                    "doctor_notification.txt",
                    include_str!("../../../templates/notifications/doctor_notification.txt"),
                ),
            ])
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        Ok(Self { engine })
    }

    /// 医師向け通知メールを生成する
    ///
    /// # 引数
    ///
    /// - `submission`: 問診票の送信内容
    /// - `doctor_name`: 宛名に使う担当医の氏名
    pub fn render_doctor_email(
        &self,
        submission: &SubmissionContext,
        doctor_name: &str,
    ) -> Result<DoctorEmail, NotificationError> {
        let mut context = Context::new();
        context.insert("doctor_name", doctor_name);
        context.insert("patient_name", &submission.patient_name);
        context.insert(
            "submitted_at",
            &submission.submitted_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        );
        context.insert("redflags", &submission.redflags);
        context.insert("review_requested", &submission.form.review_requested);

        let html_body = self.render_template("doctor_notification.html", &context)?;
        let text_body = self.render_template("doctor_notification.txt", &context)?;

        let subject = if submission.redflags.is_empty() {
            format!("[Intake] 問診票の確認依頼: {}", submission.patient_name)
        } else {
            format!(
                "[Intake] 問診票の確認依頼: {}（レッドフラグ {} 件）",
                submission.patient_name,
                submission.redflags.len()
            )
        };

        Ok(DoctorEmail {
            subject,
            html_body,
            text_body,
        })
    }

    fn render_template(&self, name: &str, context: &Context) -> Result<String, NotificationError> {
        self.engine
            .render(name, context)
            .map_err(|e| NotificationError::TemplateFailed(format!("{name}: {e}")))
    }
}

impl DocumentRenderer for TeraReportRenderer {
    fn render(
        &self,
        model: &ReportModel,
        audience: Audience,
    ) -> Result<RenderedDocument, NotificationError> {
        let context = Context::from_serialize(model)
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        let template = match audience {
            Audience::Patient => "patient_report.html",
            Audience::Doctor => "doctor_report.html",
        };
        let html = self.render_template(template, &context)?;

        Ok(RenderedDocument {
            audience,
            content: html.into_bytes(),
            mime_type: "text/html; charset=utf-8".to_string(),
            extension: "html".to_string(),
        })
    }
}
