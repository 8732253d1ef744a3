//! テストユーティリティ
//!
//! ユニットテストと `tests/` の統合テストで共有する。

mod log_capture;
mod notification_test_builder;

pub use log_capture::{CapturedEvent, LogCapture};
pub use notification_test_builder::NotificationTestBuilder;
