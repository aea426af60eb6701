//! ブロックの展開（expand）と平坦化（flatten）のヘルパー
//!
//! 各リソース定義は、ドメイン型の静的な形に沿ってこれらの関数を呼び出し、
//! 属性ツリーと API ペイロードを相互に変換します。

use crate::error::{MapperError, Result};
use crate::value::{AttrMap, AttrValue};
use std::collections::BTreeSet;

static EMPTY_BLOCK: AttrMap = AttrMap::new();

/// 単一ブロック（MaxItems: 1 の TypeList）を取り出す
///
/// - 未設定 / null / 空リスト → `None`
/// - `[null]` → 空マップ（ブロックは存在するがサブフィールドがない）
/// - `[{...}]` → そのマップ
///
/// 「存在しない」と「存在するが空」を区別することが重要です。
/// フィールドを持たないブロック（`mask_config` など）は存在自体に意味があります。
pub fn unwrap_block(value: Option<&AttrValue>) -> Option<&AttrMap> {
    match value?.as_list()?.first()? {
        AttrValue::Null => Some(&EMPTY_BLOCK),
        AttrValue::Map(map) => Some(map),
        _ => None,
    }
}

/// ブロックのリストを展開する
///
/// マップでない要素はスキップします（スキーマ側で形が保証されているため、
/// 通常は到達しません）。
pub fn expand_blocks<T>(
    value: Option<&AttrValue>,
    path: &str,
    mut expand: impl FnMut(&AttrMap) -> T,
) -> Vec<T> {
    let Some(items) = value.and_then(AttrValue::as_list) else {
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match item.as_map() {
            Some(map) => Some(expand(map)),
            None => {
                tracing::debug!(path, index, kind = item.kind(), "skipping malformed block element");
                None
            }
        })
        .collect()
}

/// 文字列集合をシーケンスに変換する
///
/// 出力はソート済み・重複なし。同じ内容の集合からは常に同じ順序が得られます。
pub fn expand_string_set(value: Option<&AttrValue>) -> Vec<String> {
    match value {
        Some(AttrValue::Set(set)) => set.iter().cloned().collect(),
        Some(AttrValue::List(items)) => items
            .iter()
            .filter_map(AttrValue::as_str)
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect(),
        _ => Vec::new(),
    }
}

/// 文字列リストを順序を保ったまま取り出す
pub fn expand_string_list(value: Option<&AttrValue>) -> Vec<String> {
    value
        .and_then(AttrValue::as_list)
        .map(|items| {
            items
                .iter()
                .filter_map(AttrValue::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// 必須の文字列フィールドを取得（型が違えば StructuralMismatch）
pub fn required_str<'a>(map: &'a AttrMap, key: &str, path: &str) -> Result<&'a str> {
    map.get_str(key)
        .ok_or_else(|| MapperError::mismatch(format!("{path}.{key}"), "string"))
}

/// 必須の整数フィールドを取得（型が違えば StructuralMismatch）
pub fn required_int(map: &AttrMap, key: &str, path: &str) -> Result<i64> {
    map.get_int(key)
        .ok_or_else(|| MapperError::mismatch(format!("{path}.{key}"), "int"))
}

/// オブジェクトのスライスをブロックのリストに平坦化する
///
/// 入力順を保ちます。入力が空なら `None`（`[{}]` ではなく属性自体を出さない）。
pub fn flatten_blocks<T>(items: &[T], flatten: impl Fn(&T) -> AttrMap) -> Option<AttrValue> {
    if items.is_empty() {
        return None;
    }

    Some(AttrValue::List(
        items.iter().map(|item| AttrValue::Map(flatten(item))).collect(),
    ))
}

/// 文字列のコレクションを Set ノードに変換する
pub fn flatten_string_set<I, S>(items: I) -> AttrValue
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    AttrValue::Set(items.into_iter().map(Into::into).collect())
}
