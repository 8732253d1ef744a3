//! # レポートモデル
//!
//! 問診票 1 件分のレポート（患者向け・医師向け）を描画するための入力モデル。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`RedFlag`] | レッドフラグ | トリアージ評価が導出した臨床上の警告 |
//! | [`QuestionAnswer`] | 質問と回答 | 回答済みの質問 1 件 |
//! | [`ReportModel`] | レポートモデル | レッドフラグ・回答・免責文のまとまり |
//! | [`Audience`] | 対象読者 | 患者 / 医師 |
//!
//! ## 設計方針
//!
//! - **不変性**: 構築後は変更不可。送信 1 件につき 1 度だけ構築し、描画後に破棄する
//! - **順序保持**: `answers` は送信順、`redflags` は評価順を保持する
//! - **空は不在と同じ**: `answers` が空の場合、回答セクションは描画しない

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;
use url::Url;

use crate::DomainError;

/// レポートの対象読者
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    /// 患者向け
    Patient,
    /// 医師向け
    Doctor,
}

/// レッドフラグ（値オブジェクト）
///
/// トリアージ評価（このクレートの範囲外）が生成し、下流では読み取り専用。
///
/// # 不変条件
///
/// - `text` は空白のみではない
/// - `info_url` が存在する場合、スキームは `http` または `https`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RedFlagRecord")]
pub struct RedFlag {
    text:     String,
    info_url: Option<Url>,
}

/// デシリアライズ時にも不変条件を検証するための中間表現
#[derive(Deserialize)]
struct RedFlagRecord {
    text:     String,
    #[serde(default)]
    info_url: Option<Url>,
}

impl TryFrom<RedFlagRecord> for RedFlag {
    type Error = DomainError;

    fn try_from(record: RedFlagRecord) -> Result<Self, Self::Error> {
        Self::new(record.text, record.info_url)
    }
}

impl RedFlag {
    /// レッドフラグを作成する
    ///
    /// # エラー
    ///
    /// - 本文が空白のみの場合
    /// - 参考 URL のスキームが http / https 以外の場合
    pub fn new(text: impl Into<String>, info_url: Option<Url>) -> Result<Self, DomainError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(DomainError::Validation(
                "レッドフラグの本文は必須です".to_string(),
            ));
        }
        if let Some(url) = info_url
            .as_ref()
            .filter(|url| !matches!(url.scheme(), "http" | "https"))
        {
            return Err(DomainError::Validation(format!(
                "レッドフラグの参考 URL は http または https である必要があります: {url}"
            )));
        }
        Ok(Self { text, info_url })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn info_url(&self) -> Option<&Url> {
        self.info_url.as_ref()
    }
}

/// 質問と回答（1 行分）
///
/// 質問・回答ともに必須。描画時はそのまま出力する（エスケープはテンプレート側の責務）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub q: String,
    pub a: String,
}

impl QuestionAnswer {
    pub fn new(q: impl Into<String>, a: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            a: a.into(),
        }
    }
}

/// レポートモデル
///
/// 描画サービスに渡される唯一の入力。テンプレート内の条件分岐は
/// このモデルのフィールドが空かどうかだけで決まる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportModel {
    redflags:   Vec<RedFlag>,
    answers:    Vec<QuestionAnswer>,
    disclaimer: String,
}

impl ReportModel {
    pub fn new(
        redflags: Vec<RedFlag>,
        answers: Vec<QuestionAnswer>,
        disclaimer: impl Into<String>,
    ) -> Self {
        Self {
            redflags,
            answers,
            disclaimer: disclaimer.into(),
        }
    }

    /// レッドフラグ（評価順）
    pub fn redflags(&self) -> &[RedFlag] {
        &self.redflags
    }

    /// 質問と回答（送信順）
    pub fn answers(&self) -> &[QuestionAnswer] {
        &self.answers
    }

    pub fn disclaimer(&self) -> &str {
        &self.disclaimer
    }
}
