//! # Core Service 通知ランナー
//!
//! 保存済みの問診票送信（`SubmissionContext` の JSON）を読み込み、担当医への
//! 通知パイプラインを 1 回実行する。フォーム送信ハンドラと同じ
//! [`NotificationService::notify_doctor`] を呼ぶため、チャネル設定の確認や
//! 通知の再送に使う。
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `NOTIFICATION_CHANNELS` | No | 送信チャネルの優先順（デフォルト: `sendgrid,smtp`） |
//! | `NOTIFICATION_POLICY` | No | `gated` / `always`（デフォルト: `gated`） |
//! | `SENDGRID_API_KEY` | No | 未設定なら SendGrid チャネルは利用不可 |
//! | `SMTP_HOST` | No | 未設定なら SMTP チャネルは利用不可 |
//! | `SES_ENABLED` | No | `true` で SES クライアントを構築 |
//! | `LOG_FORMAT` | No | `json` / `pretty` |
//!
//! ## 起動方法
//!
//! ```bash
//! # ファイルから
//! cargo run -p intake-core-service -- submission.json
//!
//! # 標準入力から
//! cat submission.json | cargo run -p intake-core-service
//! ```

use std::io::Read as _;

use anyhow::Context as _;
use intake_core_service::{config::CoreConfig, usecase::NotificationService};
use intake_domain::submission::SubmissionContext;
use intake_shared::observability::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    init_tracing(TracingConfig::from_env("core-service"));

    let config = CoreConfig::from_env().context("設定の読み込みに失敗しました")?;

    let input = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("送信内容を読み込めません: {path}"))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("標準入力を読み込めません")?;
            buf
        }
    };
    let submission: SubmissionContext =
        serde_json::from_str(&input).context("送信内容の JSON が不正です")?;

    let service = NotificationService::from_config(&config.notification)
        .await
        .context("通知サービスの初期化に失敗しました")?;

    tracing::info!(
        notification.submission_id = %submission.submission_id,
        channels = ?service.dispatcher().channel_names(),
        "医師通知を実行します"
    );

    let delivered = service.notify_doctor(&submission).await;

    tracing::info!(
        notification.submission_id = %submission.submission_id,
        delivered,
        "医師通知の処理が完了しました"
    );

    Ok(())
}
