//! スキーマに沿った設定の読み込み
//!
//! JSON の設定値を属性ツリーに変換します。型の変換、デフォルト値の適用、
//! 集合の構築、必須・件数・値の検証を行います。

use crate::error::{MapperError, Result};
use crate::schema::{AttrKind, Attribute, Schema, ValueType};
use crate::value::{AttrMap, AttrValue};
use serde_json::Value;
use std::collections::BTreeSet;

impl Schema {
    /// JSON オブジェクトを属性ツリーに変換する
    pub fn decode(&self, input: &Value) -> Result<AttrMap> {
        decode_object(self, input, "")
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn decode_object(schema: &Schema, input: &Value, path: &str) -> Result<AttrMap> {
    let empty = serde_json::Map::new();
    let object = match input {
        Value::Object(obj) => obj,
        Value::Null => &empty,
        other => {
            return Err(MapperError::schema(
                display_path(path),
                format!("オブジェクトが必要です ({} が指定されました)", json_kind(other)),
            ));
        }
    };

    for key in object.keys() {
        if schema.get(key).is_none() {
            return Err(MapperError::schema(join(path, key), "未対応の属性です"));
        }
    }

    let mut out = AttrMap::new();
    for (name, attribute) in schema.iter() {
        let attr_path = join(path, name);
        match object.get(name.as_str()).filter(|v| !v.is_null()) {
            None => {
                if attribute.required {
                    return Err(MapperError::schema(attr_path, "必須属性が指定されていません"));
                }
                if let Some(default) = &attribute.default {
                    out.insert(name.clone(), default.clone());
                }
            }
            Some(value) => {
                if attribute.is_computed_only() {
                    return Err(MapperError::schema(
                        attr_path,
                        "computed 属性は設定できません",
                    ));
                }
                let decoded = decode_attribute(attribute, value, &attr_path)?;
                out.insert(name.clone(), decoded);
            }
        }
    }

    Ok(out)
}

fn decode_attribute(attribute: &Attribute, value: &Value, path: &str) -> Result<AttrValue> {
    let decoded = match &attribute.kind {
        AttrKind::Scalar(ty) => coerce_scalar(*ty, value, path)?,
        AttrKind::List(ty) => {
            let items = expect_array(value, path)?;
            check_items(attribute, items.len(), path)?;
            AttrValue::List(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| coerce_scalar(*ty, item, &join(path, &i.to_string())))
                    .collect::<Result<Vec<_>>>()?,
            )
        }
        AttrKind::Set(ty) => {
            let items = expect_array(value, path)?;
            let mut set = BTreeSet::new();
            for (i, item) in items.iter().enumerate() {
                let scalar = coerce_scalar(*ty, item, &join(path, &i.to_string()))?;
                set.insert(scalar_to_string(&scalar));
            }
            check_items(attribute, set.len(), path)?;
            AttrValue::Set(set)
        }
        AttrKind::Map(ty) => {
            let Value::Object(obj) = value else {
                return Err(MapperError::schema(path, "マップが必要です"));
            };
            AttrValue::Map(
                obj.iter()
                    .map(|(k, v)| Ok((k.clone(), coerce_scalar(*ty, v, &join(path, k))?)))
                    .collect::<Result<AttrMap>>()?,
            )
        }
        AttrKind::Block(schema) => {
            // 単一ブロックはオブジェクトで書いてもよい
            let items: Vec<&Value> = match value {
                Value::Array(items) => items.iter().collect(),
                Value::Object(_) => vec![value],
                other => {
                    return Err(MapperError::schema(
                        path,
                        format!("ブロックが必要です ({} が指定されました)", json_kind(other)),
                    ));
                }
            };
            check_items(attribute, items.len(), path)?;
            AttrValue::List(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| {
                        decode_object(schema, item, &join(path, &i.to_string())).map(AttrValue::Map)
                    })
                    .collect::<Result<Vec<_>>>()?,
            )
        }
    };

    for validator in &attribute.validators {
        validator
            .check(&decoded)
            .map_err(|message| MapperError::schema(path, message))?;
    }

    Ok(decoded)
}

fn coerce_scalar(ty: ValueType, value: &Value, path: &str) -> Result<AttrValue> {
    let coerced = match (ty, value) {
        (ValueType::String, Value::String(s)) => Some(AttrValue::String(s.clone())),
        (ValueType::String, Value::Number(n)) => Some(AttrValue::String(n.to_string())),
        (ValueType::String, Value::Bool(b)) => Some(AttrValue::String(b.to_string())),
        (ValueType::Bool, Value::Bool(b)) => Some(AttrValue::Bool(*b)),
        (ValueType::Bool, Value::String(s)) => s.parse().ok().map(AttrValue::Bool),
        (ValueType::Int, Value::Number(n)) => n.as_i64().map(AttrValue::Int),
        (ValueType::Int, Value::String(s)) => s.parse().ok().map(AttrValue::Int),
        (ValueType::Float, Value::Number(n)) => n.as_f64().map(AttrValue::Float),
        (ValueType::Float, Value::String(s)) => s.parse().ok().map(AttrValue::Float),
        _ => None,
    };

    coerced.ok_or_else(|| {
        MapperError::schema(
            path,
            format!("{ty:?} に変換できません ({} が指定されました)", json_kind(value)),
        )
    })
}

fn expect_array<'a>(value: &'a Value, path: &str) -> Result<&'a Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(MapperError::schema(
            path,
            format!("リストが必要です ({} が指定されました)", json_kind(other)),
        )),
    }
}

fn check_items(attribute: &Attribute, count: usize, path: &str) -> Result<()> {
    // 空のリスト・ブロックは未指定と同じ
    if attribute.required && count == 0 {
        return Err(MapperError::schema(path, "必須属性が指定されていません"));
    }
    if let Some(min) = attribute.min_items.filter(|min| count < *min) {
        return Err(MapperError::schema(
            path,
            format!("{min} 件以上必要です (実際: {count})"),
        ));
    }
    if let Some(max) = attribute.max_items.filter(|max| count > *max) {
        return Err(MapperError::schema(
            path,
            format!("{max} 件以下である必要があります (実際: {count})"),
        ));
    }
    Ok(())
}

fn scalar_to_string(value: &AttrValue) -> String {
    match value {
        AttrValue::String(s) => s.clone(),
        AttrValue::Bool(b) => b.to_string(),
        AttrValue::Int(i) => i.to_string(),
        AttrValue::Float(f) => f.to_string(),
        other => other.kind().to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() { "(root)" } else { path }
}
