//! # 添付ファイルのパッケージング
//!
//! 描画サービスの出力（[`RenderedDocument`]）を、チャネルに依存しない
//! 添付ファイル記述子（[`Attachment`]）に変換する。
//!
//! ## 設計方針
//!
//! - **バイト列の完全保持**: 変換・再エンコードは一切行わない
//! - **生成経路の一本化**: `Attachment` は [`package`] からのみ生成でき、生成後は不変
//! - **失敗の明示**: 空のドキュメントや不正なファイル名は [`PackagingError`] として返す。
//!   PDF が黙って欠落した通知を送らないためのもの

use thiserror::Error;

use crate::report::Audience;

/// パッケージングエラー
///
/// 上流のデータ契約違反を示す。どのチャネルでも回復できないため、
/// その送信の通知処理は中断する。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackagingError {
    /// 描画結果が空
    #[error("ドキュメントが空です: {filename}")]
    EmptyDocument { filename: String },

    /// ヘッダーに使えないファイル名
    #[error("ファイル名が不正です: {filename:?}（{reason}）")]
    InvalidFilename {
        filename: String,
        reason:   &'static str,
    },

    /// メディアタイプとして解釈できない MIME タイプ
    #[error("MIME タイプが不正です: {0:?}")]
    InvalidMimeType(String),
}

/// 描画サービスの出力
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub audience:  Audience,
    pub content:   Vec<u8>,
    pub mime_type: String,
    /// ファイル拡張子（ドットなし、例: `"html"`, `"pdf"`）
    pub extension: String,
}

/// 添付ファイル記述子
///
/// 作成した配信試行が排他的に所有する。`Clone` を実装しないため、
/// 複数の配信で共有されることはない。
#[derive(Debug, PartialEq, Eq)]
pub struct Attachment {
    filename:  String,
    mime_type: String,
    content:   Vec<u8>,
}

impl Attachment {
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

/// 描画済みドキュメントを添付ファイルに変換する
///
/// # エラー
///
/// - `document` が空の場合は [`PackagingError::EmptyDocument`]
/// - `filename` が空、制御文字・`"`・パス区切りを含む場合は [`PackagingError::InvalidFilename`]
/// - `mime_type` が `type/subtype` 形式でない場合は [`PackagingError::InvalidMimeType`]
pub fn package(
    document: Vec<u8>,
    filename: impl Into<String>,
    mime_type: impl Into<String>,
) -> Result<Attachment, PackagingError> {
    let filename = filename.into();
    let mime_type = mime_type.into();

    validate_filename(&filename)?;
    validate_mime_type(&mime_type)?;

    if document.is_empty() {
        return Err(PackagingError::EmptyDocument { filename });
    }

    Ok(Attachment {
        filename,
        mime_type,
        content: document,
    })
}

/// [`RenderedDocument`] を `"{stem}-{audience}.{extension}"` の名前で添付ファイルにする
pub fn package_document(
    document: RenderedDocument,
    stem: &str,
) -> Result<Attachment, PackagingError> {
    let filename = format!("{stem}-{}.{}", document.audience, document.extension);
    package(document.content, filename, document.mime_type)
}

fn validate_filename(filename: &str) -> Result<(), PackagingError> {
    let invalid = |reason| PackagingError::InvalidFilename {
        filename: filename.to_string(),
        reason,
    };

    if filename.trim().is_empty() {
        return Err(invalid("空のファイル名"));
    }
    if filename.chars().any(char::is_control) {
        return Err(invalid("制御文字を含む"));
    }
    if filename.contains('"') {
        return Err(invalid("二重引用符を含む"));
    }
    if filename.contains(['/', '\\']) {
        return Err(invalid("パス区切り文字を含む"));
    }
    Ok(())
}

fn validate_mime_type(mime_type: &str) -> Result<(), PackagingError> {
    let parsed: mime::Mime = mime_type
        .parse()
        .map_err(|_| PackagingError::InvalidMimeType(mime_type.to_string()))?;

    // "*/*" のようなワイルドカードは Accept ヘッダー用で、添付ファイルの型にはならない
    if parsed.type_() == mime::STAR || parsed.subtype() == mime::STAR {
        return Err(PackagingError::InvalidMimeType(mime_type.to_string()));
    }
    Ok(())
}
