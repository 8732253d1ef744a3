//! # ドメイン層エラー定義
//!
//! ドメインモデルの構築時に検出される契約違反を表現するエラー型。
//!
//! ## 設計方針
//!
//! - **型による分類**: エラーの種類を列挙型で明示し、パターンマッチで処理可能に
//! - **thiserror 活用**: `#[error(...)]` マクロでエラーメッセージを自動生成
//!
//! 通知パイプライン固有のエラー（チャネル失敗、パッケージング失敗）は
//! [`crate::notification`] と [`crate::attachment`] に定義する。
//!
//! ## 使用例
//!
//! ```rust
//! use intake_domain::DomainError;
//!
//! fn validate_text(text: &str) -> Result<(), DomainError> {
//!     if text.trim().is_empty() {
//!         return Err(DomainError::Validation("本文は必須です".to_string()));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// ドメイン層で発生するエラー
#[derive(Debug, Error)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 入力値がドメインの制約に違反している場合に使用する。
    ///
    /// # 例
    ///
    /// - レッドフラグの本文が空
    /// - 参考 URL のスキームが http / https 以外
    #[error("バリデーションエラー: {0}")]
    Validation(String),
}
