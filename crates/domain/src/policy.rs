//! # 通知ポリシー
//!
//! トリアージ結果と送信時の文脈から、医師への通知が必要かどうかを判定する。
//!
//! 判定は副作用を持たない純粋関数。「通知不要」はエラーではなく正常な終端状態で、
//! 配信失敗とは [`NotifyDecision::Skip`] によって区別される。

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::{report::RedFlag, submission::FormContext};

/// ポリシーの動作モード
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
pub enum PolicyMode {
    /// レッドフラグまたは確認希望がある場合のみ通知する
    #[default]
    Gated,
    /// 送信のたびに通知する（宛先は必要）
    Always,
}

/// 通知しない理由
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SkipReason {
    /// レッドフラグも確認希望もない
    NoTrigger,
    /// 担当医が割り当てられていない
    NoDoctorAssigned,
    /// 担当医にメールアドレスがない
    NoDeliverableContact,
}

/// 通知要否の判定結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyDecision {
    Notify,
    Skip(SkipReason),
}

/// 通知ポリシー
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationPolicy {
    mode: PolicyMode,
}

impl NotificationPolicy {
    pub fn new(mode: PolicyMode) -> Self {
        Self { mode }
    }

    /// 通知要否を判定する
    ///
    /// トリガー（`Gated` モードではレッドフラグまたは確認希望）の判定を先に行い、
    /// 次に宛先の有無を確認する。
    pub fn decide(&self, redflags: &[RedFlag], form: &FormContext) -> NotifyDecision {
        let triggered = match self.mode {
            PolicyMode::Gated => !redflags.is_empty() || form.review_requested,
            PolicyMode::Always => true,
        };
        if !triggered {
            return NotifyDecision::Skip(SkipReason::NoTrigger);
        }

        let Some(doctor) = &form.doctor else {
            return NotifyDecision::Skip(SkipReason::NoDoctorAssigned);
        };
        if doctor.deliverable_email().is_none() {
            return NotifyDecision::Skip(SkipReason::NoDeliverableContact);
        }

        NotifyDecision::Notify
    }

    /// 通知が必要な場合のみ `true` を返す
    pub fn should_notify(&self, redflags: &[RedFlag], form: &FormContext) -> bool {
        self.decide(redflags, form) == NotifyDecision::Notify
    }
}
