//! # ビジネスイベントログとエラーコンテキストの構造化ヘルパー
//!
//! 通知パイプラインの調査を `jq` で効率的に行えるよう、ログフィールドの命名規約と
//! ヘルパーマクロを提供する。
//!
//! ## ビジネスイベント
//!
//! [`log_business_event!`] マクロで出力する。`event.kind = "business_event"` マーカーが
//! 自動付与され、`jq 'select(.["event.kind"] == "business_event")'` でフィルタできる。
//!
//! ## エラーコンテキスト
//!
//! 既存の `tracing::error!` に `error.category` + `error.kind` フィールドを直接追加する。
//! 定数は [`error`] モジュールで提供。
//!
//! ## フィールド命名規約
//!
//! ドット記法（`event.category`、`notification.channel`）を使用。tracing の
//! `$($field:ident).+` パターンでサポートされ、JSON 出力でフラットなキーになる。

/// ビジネスイベントを構造化ログとして出力する。
///
/// `event.kind = "business_event"` マーカーを自動付与し、
/// `tracing::info!` レベルで出力する。
///
/// ## 必須フィールド（慣例）
///
/// - `event.category`: イベントカテゴリ（[`event::category`] の定数を使用）
/// - `event.action`: アクション名（[`event::action`] の定数を使用）
/// - `event.result`: 結果（[`event::result`] の定数を使用）
///
/// ## 推奨フィールド
///
/// - `event.entity_type`: エンティティ種別（[`event::entity_type`] の定数を使用）
/// - `event.entity_id`: エンティティ ID（問診票の送信 ID など）
#[macro_export]
macro_rules! log_business_event {
    ($($args:tt)*) => {
        ::tracing::info!(
            event.kind = "business_event",
            $($args)*
        )
    };
}

/// イベントフィールドの定数
pub mod event {
    /// イベントカテゴリ
    pub mod category {
        pub const NOTIFICATION: &str = "notification";
    }

    /// イベントアクション
    pub mod action {
        /// 1 チャネルでの送信に成功
        pub const CHANNEL_SUCCEEDED: &str = "notification.channel_succeeded";
        /// 1 チャネルでの送信に失敗（フェイルオーバー対象）
        pub const CHANNEL_FAILED: &str = "notification.channel_failed";
        /// ポリシーにより通知不要と判定
        pub const NOTIFICATION_SKIPPED: &str = "notification.skipped";
        /// いずれかのチャネルで医師への通知が完了
        pub const NOTIFICATION_DELIVERED: &str = "notification.delivered";
        /// 全チャネルで送信失敗
        pub const NOTIFICATION_EXHAUSTED: &str = "notification.exhausted";
    }

    /// エンティティ種別
    pub mod entity_type {
        pub const SUBMISSION: &str = "submission";
    }

    /// イベント結果
    pub mod result {
        pub const SUCCESS: &str = "success";
        pub const FAILURE: &str = "failure";
        pub const SKIPPED: &str = "skipped";
    }
}

/// エラーコンテキストフィールドの定数
pub mod error {
    /// エラーカテゴリ
    pub mod category {
        /// 外部サービス呼び出し（メール API、SMTP リレー）
        pub const EXTERNAL_SERVICE: &str = "external_service";
        /// 上流のデータ契約違反（添付ファイル、テンプレート）
        pub const DATA_CONTRACT: &str = "data_contract";
    }

    /// エラー種別
    pub mod kind {
        /// チャネルが構造的に利用できない（設定・依存の欠落）
        pub const CHANNEL_UNAVAILABLE: &str = "channel_unavailable";
        /// 送信中のネットワーク・認証・API エラー
        pub const CHANNEL_TRANSPORT: &str = "channel_transport";
        pub const PACKAGING: &str = "packaging";
        pub const RENDERING: &str = "rendering";
    }
}
