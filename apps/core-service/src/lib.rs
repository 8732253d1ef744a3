//! # Core Service ライブラリ
//!
//! 医師通知パイプラインのユースケースと設定を公開する。
//! フォーム送信ハンドラ（このクレートの範囲外）は
//! [`usecase::notification::NotificationService::notify_doctor`] だけを呼び出す。

pub mod config;
pub mod usecase;

// テストユーティリティ（内部実装、ドキュメントからは隠す）
#[cfg(any(test, feature = "test-utils"))]
#[doc(hidden)]
pub mod test_utils;
