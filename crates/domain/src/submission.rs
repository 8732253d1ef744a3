//! # 問診票の送信コンテキスト
//!
//! 通知ユースケース（`notify_doctor`）への入力を定義する。
//! 送信データの永続化はこのクレートの範囲外で、ここでは保存済みの送信 1 件を
//! 通知パイプラインに渡すための読み取り専用ビューだけを扱う。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::report::{QuestionAnswer, RedFlag, ReportModel};

define_uuid_id! {
    /// 問診票の送信 ID（一意識別子）
    ///
    /// ログの `notification.submission_id` に出力され、チャネル試行と送信を紐付ける。
    pub struct SubmissionId;
}

/// 担当医の連絡先
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorContact {
    pub name:   String,
    #[serde(default)]
    pub email:  Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
}

impl DoctorContact {
    /// メール通知に使える宛先を返す
    ///
    /// 空白のみのアドレスは宛先なしとして扱う。
    pub fn deliverable_email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }
}

/// 通知ポリシーが参照する送信時の文脈
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormContext {
    /// 担当医（未割り当ての場合は `None`）
    #[serde(default)]
    pub doctor:           Option<DoctorContact>,
    /// 患者が医師による確認を明示的に希望したか
    #[serde(default)]
    pub review_requested: bool,
}

/// 問診票の送信 1 件分の通知入力
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionContext {
    #[serde(default)]
    pub submission_id: SubmissionId,
    pub patient_name:  String,
    pub submitted_at:  DateTime<Utc>,
    /// トリアージ評価の結果（評価順）
    #[serde(default)]
    pub redflags:      Vec<RedFlag>,
    /// 回答（送信順）
    #[serde(default)]
    pub answers:       Vec<QuestionAnswer>,
    #[serde(default)]
    pub form:          FormContext,
}

impl SubmissionContext {
    /// 描画用のレポートモデルを構築する
    pub fn report_model(&self, disclaimer: &str) -> ReportModel {
        ReportModel::new(self.redflags.clone(), self.answers.clone(), disclaimer)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn doctor(email: Option<&str>) -> DoctorContact {
        DoctorContact {
            name:   "佐藤医師".to_string(),
            email:  email.map(str::to_string),
            mobile: None,
        }
    }

    #[rstest]
    #[case(Some("sato@clinic.example.com"), Some("sato@clinic.example.com"))]
    #[case(Some("  sato@clinic.example.com  "), Some("sato@clinic.example.com"))]
    #[case(Some("   "), None)]
    #[case(None, None)]
    fn deliverable_emailは空白のみを宛先なしとして扱う(
        #[case] email: Option<&str>,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(doctor(email).deliverable_email(), expected);
    }

    #[test]
    fn submission_contextをjsonから復元できる() {
        let json = r#"{
            "patient_name": "山田花子",
            "submitted_at": "2026-10-01T09:30:00Z",
            "redflags": [{"text": "呼吸困難"}],
            "answers": [{"q": "症状", "a": "息切れ"}],
            "form": {"doctor": {"name": "佐藤医師", "email": "sato@clinic.example.com"}}
        }"#;

        let ctx: SubmissionContext = serde_json::from_str(json).unwrap();

        assert_eq!(ctx.patient_name, "山田花子");
        assert_eq!(ctx.redflags.len(), 1);
        assert_eq!(ctx.answers[0].a, "息切れ");
        assert!(!ctx.form.review_requested);
        let model = ctx.report_model("免責事項");
        assert_eq!(model.answers(), ctx.answers.as_slice());
    }
}
