//! MIME メッセージ構築
//!
//! SMTP チャネルと SES チャネル（raw 送信）で共有する。
//!
//! 構造:
//!
//! ```text
//! multipart/mixed
//! ├── multipart/alternative
//! │   ├── text/plain
//! │   └── text/html
//! └── 添付ファイル（Content-Disposition: attachment）×N
//! ```
//!
//! 添付ファイルは自前で base64 エンコードしてから lettre に渡す。lettre に
//! 文字列として渡すと改行が CRLF に正規化され、バイト列が変わってしまう。

use base64::{Engine as _, engine::general_purpose::STANDARD};
use intake_domain::{
    attachment::Attachment,
    notification::{ChannelError, DeliveryRequest},
};
use lettre::{
    Message,
    message::{
        Body,
        Mailbox,
        MultiPart,
        SinglePart,
        header::{ContentTransferEncoding, ContentType},
    },
};

/// RFC 2045 の base64 行長
const BASE64_LINE_LENGTH: usize = 76;

/// 配信リクエストから MIME メッセージを構築する
///
/// # エラー
///
/// 送信元・宛先アドレスや MIME タイプが不正な場合は [`ChannelError::Transport`] を返す。
pub fn build_message(request: &DeliveryRequest) -> Result<Message, ChannelError> {
    let sender_address = request
        .sender_address
        .parse()
        .map_err(|e| ChannelError::transport(format!("送信元アドレス不正: {e}")))?;
    let sender_name = Some(request.sender_name.clone()).filter(|name| !name.trim().is_empty());
    let from = Mailbox::new(sender_name, sender_address);

    let to: Mailbox = request
        .recipient_address
        .parse()
        .map_err(|e| ChannelError::transport(format!("宛先アドレス不正: {e}")))?;

    let mut body = MultiPart::mixed().multipart(MultiPart::alternative_plain_html(
        request.text_body.clone(),
        request.html_body.clone(),
    ));
    for attachment in &request.attachments {
        body = body.singlepart(attachment_part(attachment)?);
    }

    Message::builder()
        .from(from)
        .to(to)
        .subject(&request.subject)
        .multipart(body)
        .map_err(|e| ChannelError::transport(format!("メッセージ構築失敗: {e}")))
}

fn attachment_part(attachment: &Attachment) -> Result<SinglePart, ChannelError> {
    let content_type = ContentType::parse(attachment.mime_type()).map_err(|e| {
        ChannelError::transport(format!(
            "添付ファイルの MIME タイプ不正: {} ({e})",
            attachment.mime_type()
        ))
    })?;

    let body = Body::dangerous_pre_encoded(
        encode_base64_lines(attachment.content()),
        ContentTransferEncoding::Base64,
    );

    Ok(lettre::message::Attachment::new(attachment.filename().to_string()).body(body, content_type))
}

/// base64 エンコードし、76 文字ごとに CRLF で折り返す
fn encode_base64_lines(content: &[u8]) -> Vec<u8> {
    let encoded = STANDARD.encode(content);
    let mut out = Vec::with_capacity(encoded.len() + encoded.len() / BASE64_LINE_LENGTH * 2 + 2);
    for line in encoded.as_bytes().chunks(BASE64_LINE_LENGTH) {
        out.extend_from_slice(line);
        out.extend_from_slice(b"\r\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use intake_domain::{attachment::package, submission::SubmissionId};
    use pretty_assertions::assert_eq;

    use super::*;

    fn binary_document() -> Vec<u8> {
        let mut bytes = b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\nline\r\nline\n".to_vec();
        bytes.extend(0u8..=255);
        bytes
    }

    fn make_request(attachments: Vec<Attachment>) -> DeliveryRequest {
        DeliveryRequest {
            submission_id: SubmissionId::new(),
            recipient_address: "sato@clinic.example.com".to_string(),
            subject: "[Intake] 問診票の確認依頼".to_string(),
            html_body: "<p>レッドフラグがあります</p>".to_string(),
            text_body: "レッドフラグがあります".to_string(),
            attachments,
            sender_address: "noreply@intake.example.com".to_string(),
            sender_name: "Intake".to_string(),
        }
    }

    /// 整形済みメッセージから指定ファイル名の添付パートを取り出して復号する
    fn extract_attachment(formatted: &str, filename: &str) -> Vec<u8> {
        let marker = format!("filename=\"{filename}\"");
        let header_pos = formatted.find(&marker).expect("添付パートが存在すること");
        let rest = &formatted[header_pos..];
        let body_start = rest.find("\r\n\r\n").expect("ヘッダーの終端") + 4;
        let body = &rest[body_start..];
        let body_end = body.find("\r\n--").expect("パートの終端");
        let encoded: String = body[..body_end]
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        STANDARD.decode(encoded).expect("base64 として復号できること")
    }

    #[test]
    fn 添付ファイルのバイト列がmimeを経由しても変わらない() {
        let original = binary_document();
        let attachment = package(original.clone(), "report-doctor.pdf", "application/pdf").unwrap();
        let request = make_request(vec![attachment]);

        let message = build_message(&request).unwrap();
        let formatted = String::from_utf8(message.formatted()).unwrap();

        assert_eq!(extract_attachment(&formatted, "report-doctor.pdf"), original);
    }

    #[test]
    fn テキスト添付も改行が正規化されない() {
        let original = b"<html>\n<body>LF only\n</body>\n</html>\n".to_vec();
        let attachment = package(original.clone(), "report.html", "text/html; charset=utf-8").unwrap();
        let request = make_request(vec![attachment]);

        let formatted = String::from_utf8(build_message(&request).unwrap().formatted()).unwrap();

        assert_eq!(extract_attachment(&formatted, "report.html"), original);
    }

    #[test]
    fn html本文とテキスト本文がalternativeで含まれる() {
        let request = make_request(vec![]);

        let formatted = String::from_utf8(build_message(&request).unwrap().formatted()).unwrap();

        assert!(formatted.contains("multipart/mixed"));
        assert!(formatted.contains("multipart/alternative"));
        assert!(formatted.contains("text/plain"));
        assert!(formatted.contains("text/html"));
    }

    #[test]
    fn 添付ファイルが順序どおりに含まれる() {
        let request = make_request(vec![
            package(binary_document(), "a-patient.pdf", "application/pdf").unwrap(),
            package(binary_document(), "a-doctor.pdf", "application/pdf").unwrap(),
        ]);

        let formatted = String::from_utf8(build_message(&request).unwrap().formatted()).unwrap();

        let patient = formatted.find("a-patient.pdf").unwrap();
        let doctor = formatted.find("a-doctor.pdf").unwrap();
        assert!(patient < doctor);
    }

    #[test]
    fn 宛先アドレスが不正ならtransportエラー() {
        let mut request = make_request(vec![]);
        request.recipient_address = "not-an-address".to_string();

        let err = build_message(&request).unwrap_err();

        assert!(matches!(err, ChannelError::Transport { .. }));
    }

    #[test]
    fn base64は76文字で折り返される() {
        let encoded = encode_base64_lines(&[0u8; 200]);
        let text = String::from_utf8(encoded).unwrap();

        assert!(text.lines().all(|line| line.len() <= BASE64_LINE_LENGTH));
        assert!(text.ends_with("\r\n"));
    }
}
