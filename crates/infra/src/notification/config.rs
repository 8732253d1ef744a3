//! チャネル設定
//!
//! プロセス起動時に一度だけ構築し、各チャネルのコンストラクタに渡す。
//! 構築後は読み取り専用。

use std::time::Duration;

/// SendGrid v3 API のデフォルトエンドポイント
pub const SENDGRID_DEFAULT_API_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// 送信タイムアウトのデフォルト
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// SendGrid チャネルの設定
#[derive(Clone)]
pub struct SendGridConfig {
    /// API キー（未設定の場合チャネルは利用不可）
    pub api_key: Option<String>,
    /// `mail/send` エンドポイント
    pub api_url: String,
    pub timeout: Duration,
}

impl Default for SendGridConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: SENDGRID_DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_SEND_TIMEOUT,
        }
    }
}

// API キーをログに出さない
impl std::fmt::Debug for SendGridConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendGridConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// SMTP チャネルの設定
#[derive(Clone)]
pub struct SmtpConfig {
    /// SMTP ホスト（未設定の場合チャネルは利用不可）
    pub host:     Option<String>,
    pub port:     u16,
    /// 認証ユーザー名（パスワードと同時に指定する）
    pub username: Option<String>,
    pub password: Option<String>,
    /// STARTTLS を使用するか（Mailpit 等のローカル SMTP では `false`）
    pub starttls: bool,
    pub timeout:  Duration,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host:     None,
            port:     587,
            username: None,
            password: None,
            starttls: true,
            timeout:  DEFAULT_SEND_TIMEOUT,
        }
    }
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("starttls", &self.starttls)
            .field("timeout", &self.timeout)
            .finish()
    }
}
