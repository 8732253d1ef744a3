//! 医師通知パイプラインの統合テスト
//!
//! 通知判定 → レポート描画 → 添付ファイル化 → フェイルオーバー配信 を
//! モックチャネルで通して検証する。

use intake_core_service::test_utils::{LogCapture, NotificationTestBuilder};
use intake_domain::submission::SubmissionContext;
use intake_infra::mock::{MockChannel, SentRecord};
use intake_shared::event_log::event;
use pretty_assertions::assert_eq;

fn flagged_submission() -> SubmissionContext {
    NotificationTestBuilder::submission(vec![NotificationTestBuilder::chest_pain()])
}

fn attachment_html(record: &SentRecord, suffix: &str) -> String {
    let (_, content) = record
        .attachments
        .iter()
        .find(|(name, _)| name.ends_with(suffix))
        .expect("添付ファイルが存在すること");
    String::from_utf8(content.clone()).expect("UTF-8 の HTML であること")
}

#[tokio::test]
async fn test_notify_doctor_レッドフラグも確認希望もなければ配信しない() {
    // Arrange
    let channel = MockChannel::succeeding("sendgrid");
    let service = NotificationTestBuilder::new().channel(&channel).build();
    let submission = NotificationTestBuilder::submission(vec![]);

    // Act
    let delivered = service.notify_doctor(&submission).await;

    // Assert
    assert!(!delivered);
    assert_eq!(channel.call_count(), 0);
}

#[tokio::test]
async fn test_notify_doctor_確認希望があればレッドフラグなしでも配信する() {
    // Arrange
    let channel = MockChannel::succeeding("sendgrid");
    let service = NotificationTestBuilder::new().channel(&channel).build();
    let mut submission = NotificationTestBuilder::submission(vec![]);
    submission.form.review_requested = true;

    // Act
    let delivered = service.notify_doctor(&submission).await;

    // Assert
    assert!(delivered);
    assert_eq!(channel.call_count(), 1);
}

#[tokio::test]
async fn test_notify_doctor_最初のチャネルで成功したら2番目は呼ばない() {
    // Arrange
    let primary = MockChannel::succeeding("sendgrid");
    let secondary = MockChannel::succeeding("smtp");
    let service = NotificationTestBuilder::new()
        .channel(&primary)
        .channel(&secondary)
        .build();

    // Act
    let delivered = service.notify_doctor(&flagged_submission()).await;

    // Assert
    assert!(delivered);
    assert_eq!(primary.call_count(), 1);
    assert_eq!(secondary.call_count(), 0);
}

#[tokio::test]
async fn test_notify_doctor_利用不可のチャネルから次のチャネルへ切り替える() {
    // Arrange
    let capture = LogCapture::new();
    let _guard = capture.set_default();
    let primary = MockChannel::unavailable("sendgrid");
    let secondary = MockChannel::succeeding("smtp");
    let service = NotificationTestBuilder::new()
        .channel(&primary)
        .channel(&secondary)
        .build();

    // Act
    let delivered = service.notify_doctor(&flagged_submission()).await;

    // Assert
    assert!(delivered);
    assert_eq!(secondary.call_count(), 1);
    let failures = capture.events_with_action(event::action::CHANNEL_FAILED);
    let successes = capture.events_with_action(event::action::CHANNEL_SUCCEEDED);
    assert_eq!(failures.len(), 1);
    assert_eq!(successes.len(), 1);
    assert_eq!(failures[0].field("notification.channel"), Some("sendgrid"));
    assert_eq!(failures[0].field("notification.failure_kind"), Some("unavailable"));
    assert_eq!(successes[0].field("notification.channel"), Some("smtp"));
}

#[tokio::test]
async fn test_notify_doctor_全チャネル失敗ならチャネル数と同じ件数の失敗ログ() {
    // Arrange
    let capture = LogCapture::new();
    let _guard = capture.set_default();
    let service = NotificationTestBuilder::new()
        .channel(&MockChannel::unavailable("sendgrid"))
        .channel(&MockChannel::failing("smtp"))
        .channel(&MockChannel::failing("ses"))
        .build();

    // Act
    let delivered = service.notify_doctor(&flagged_submission()).await;

    // Assert
    assert!(!delivered);
    assert_eq!(
        capture
            .events_with_action(event::action::CHANNEL_FAILED)
            .len(),
        3
    );
    assert!(
        capture
            .events_with_action(event::action::CHANNEL_SUCCEEDED)
            .is_empty()
    );
    assert_eq!(
        capture
            .events_with_action(event::action::NOTIFICATION_EXHAUSTED)
            .len(),
        1
    );
}

#[tokio::test]
async fn test_notify_doctor_患者用レポートにレッドフラグのリンクと回答表を含む() {
    // Arrange
    let channel = MockChannel::succeeding("sendgrid");
    let service = NotificationTestBuilder::new().channel(&channel).build();

    // Act
    assert!(service.notify_doctor(&flagged_submission()).await);

    // Assert
    let sent = channel.sent();
    assert_eq!(sent[0].attachments.len(), 2);
    let patient = attachment_html(&sent[0], "-patient.html");
    assert_eq!(patient.matches("<tr class=\"redflag-row\">").count(), 1);
    assert!(patient.contains("胸の痛みが 20 分以上続いている"));
    assert!(patient.contains("<a href=\""));
    assert_eq!(patient.matches("<tr class=\"answer-row\">").count(), 3);
    assert!(patient.contains("<th scope=\"row\">年齢</th><td>45</td>"));
}

#[tokio::test]
async fn test_notify_doctor_医師用レポートに同じ回答表を含む() {
    // Arrange
    let channel = MockChannel::succeeding("sendgrid");
    let service = NotificationTestBuilder::new().channel(&channel).build();

    // Act
    assert!(service.notify_doctor(&flagged_submission()).await);

    // Assert
    let doctor = attachment_html(&channel.sent()[0], "-doctor.html");
    assert_eq!(doctor.matches("<tr class=\"answer-row\">").count(), 3);
    let positions: Vec<usize> = ["年齢", "主訴", "既往歴"]
        .iter()
        .map(|q| {
            doctor
                .find(&format!("<th scope=\"row\">{q}</th>"))
                .expect("質問が見出しセルにあること")
        })
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
}

#[tokio::test]
async fn test_notify_doctor_回答が空なら回答表を出力しない() {
    // Arrange
    let channel = MockChannel::succeeding("sendgrid");
    let service = NotificationTestBuilder::new().channel(&channel).build();
    let mut submission = flagged_submission();
    submission.answers.clear();

    // Act
    assert!(service.notify_doctor(&submission).await);

    // Assert
    let sent = channel.sent();
    for suffix in ["-patient.html", "-doctor.html"] {
        assert!(!attachment_html(&sent[0], suffix).contains("answer-table"));
    }
}
