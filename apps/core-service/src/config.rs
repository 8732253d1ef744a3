//! # Core Service 設定
//!
//! 環境変数から通知パイプラインの設定を読み込む。
//!
//! 起動時に一度だけ読み込み、各チャネルには明示的な設定構造体として渡す。
//! チャネルの実装が環境変数を直接参照することはない。

use std::{env, str::FromStr, time::Duration};

use intake_domain::policy::PolicyMode;
use intake_infra::notification::{
    DEFAULT_SEND_TIMEOUT,
    SENDGRID_DEFAULT_API_URL,
    SendGridConfig,
    SmtpConfig,
};
use thiserror::Error;

/// 免責事項の既定文言（`REPORT_DISCLAIMER` 未設定時）
pub const DEFAULT_DISCLAIMER: &str = "この問診結果は診断ではありません。症状が急変した場合は速やかに医療機関を受診してください。";

/// 設定エラー
///
/// 起動時に検出し、プロセスを開始しない。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// 値を解釈できない
    #[error("{name} の値が不正です: {value:?}（{reason}）")]
    Invalid {
        name:   &'static str,
        value:  String,
        reason: String,
    },

    /// 送信チャネルが 1 つも指定されていない
    #[error("NOTIFICATION_CHANNELS に送信チャネルが指定されていません")]
    NoChannels,
}

/// 送信チャネルの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ChannelKind {
    /// SendGrid メール API
    Sendgrid,
    /// SMTP リレー
    Smtp,
    /// Amazon SES v2
    Ses,
}

/// Core Service の設定
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// 通知設定
    pub notification: NotificationConfig,
}

/// 通知機能の設定
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// 送信チャネル（優先順）
    pub channels:     Vec<ChannelKind>,
    /// 通知ポリシー
    pub policy:       PolicyMode,
    /// 送信元メールアドレス
    pub from_address: String,
    /// 送信元表示名
    pub from_name:    String,
    /// レポートに記載する免責事項
    pub disclaimer:   String,
    pub sendgrid:     SendGridConfig,
    pub smtp:         SmtpConfig,
    pub ses:          SesSettings,
}

/// SES クライアントの構築設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SesSettings {
    /// `false` の場合はクライアントを構築せず、SES チャネルは利用不可になる
    pub enabled: bool,
    pub region:  String,
}

impl CoreConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            notification: NotificationConfig::from_env()?,
        })
    }
}

impl NotificationConfig {
    /// 環境変数から通知設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の参照関数から通知設定を読み込む
    ///
    /// `lookup` が `None` を返した変数は既定値を使う。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars { lookup };

        let channels = parse_channels(&vars.string_or("NOTIFICATION_CHANNELS", "sendgrid,smtp"))?;
        let policy = vars.parse_or("NOTIFICATION_POLICY", PolicyMode::Gated)?;
        let timeout = Duration::from_secs(
            vars.parse_or("NOTIFICATION_SEND_TIMEOUT_SECS", DEFAULT_SEND_TIMEOUT.as_secs())?,
        );

        let sendgrid = SendGridConfig {
            api_key: vars.optional("SENDGRID_API_KEY"),
            api_url: vars.string_or("SENDGRID_API_URL", SENDGRID_DEFAULT_API_URL),
            timeout,
        };

        let smtp = SmtpConfig {
            host: vars.optional("SMTP_HOST"),
            port: vars.parse_or("SMTP_PORT", 587u16)?,
            username: vars.optional("SMTP_USERNAME"),
            password: vars.optional("SMTP_PASSWORD"),
            starttls: vars.parse_or("SMTP_STARTTLS", true)?,
            timeout,
        };

        let ses = SesSettings {
            enabled: vars.parse_or("SES_ENABLED", false)?,
            region:  vars.string_or("SES_REGION", "ap-northeast-1"),
        };

        Ok(Self {
            channels,
            policy,
            from_address: vars.string_or("NOTIFICATION_FROM_ADDRESS", "noreply@intake.example.com"),
            from_name: vars.string_or("NOTIFICATION_FROM_NAME", "Intake"),
            disclaimer: vars.string_or("REPORT_DISCLAIMER", DEFAULT_DISCLAIMER),
            sendgrid,
            smtp,
            ses,
        })
    }
}

/// `"sendgrid, smtp"` 形式のチャネル列を解釈する
fn parse_channels(value: &str) -> Result<Vec<ChannelKind>, ConfigError> {
    let channels = value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            ChannelKind::from_str(&name.to_ascii_lowercase()).map_err(|_| ConfigError::Invalid {
                name:   "NOTIFICATION_CHANNELS",
                value:  name.to_string(),
                reason: "sendgrid / smtp / ses のいずれかを指定してください".to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if channels.is_empty() {
        return Err(ConfigError::NoChannels);
    }
    Ok(channels)
}

struct Vars<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    /// 空白のみの値は未設定として扱う
    fn optional(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|value| !value.trim().is_empty())
    }

    fn string_or(&self, name: &str, default: &str) -> String {
        self.optional(name).unwrap_or_else(|| default.to_string())
    }

    fn parse_or<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(name) {
            Some(value) => {
                let parsed = value.trim().parse::<T>();
                parsed.map_err(|e| ConfigError::Invalid {
                    name,
                    value,
                    reason: e.to_string(),
                })
            }
            None => Ok(default),
        }
    }
}
