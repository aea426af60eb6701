//! 正規化シリアライズと内容ベースの識別子

use crate::error::Result;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use sha2::{Digest, Sha256};

/// ドメインオブジェクトを正規化された JSON テキストに変換する
///
/// キーは型の宣言順に並び、インデント幅は呼び出し側が指定します（0 なら1行）。
/// 同じ内容からは常にバイト単位で同じテキストが得られます。
pub fn to_canonical_json<T: Serialize>(value: &T, indent: usize) -> Result<String> {
    if indent == 0 {
        return Ok(serde_json::to_string(value)?);
    }

    let indent = " ".repeat(indent);
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(indent.as_bytes()));
    value.serialize(&mut serializer)?;

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// テキストから安定した数値文字列の識別子を導出する
///
/// SHA-256 ダイジェストの先頭4バイトを10進数で表したもの。
pub fn content_id(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    let head = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    head.to_string()
}
