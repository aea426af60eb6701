//! 宣言的スキーマ
//!
//! リソース・データソースの属性定義をビルダーで組み立てます。
//! スキーマはプロセス起動時に一度だけ構築し、以降は読み取り専用で扱います
//! （各定義は `LazyLock<Schema>` に保持する）。

use crate::value::AttrValue;
use serde::Serialize;
use std::collections::BTreeMap;

/// スカラー値の型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    String,
    Bool,
    Int,
    Float,
}

/// 属性の形
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrKind {
    Scalar(ValueType),
    List(ValueType),
    Set(ValueType),
    Map(ValueType),
    /// ネストしたブロックのリスト（MaxItems: 1 なら単一ブロック）
    Block(Box<Schema>),
}

/// 値の検証ルール
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Validator {
    NotEmpty,
    LenBetween(usize, usize),
    OneOf(Vec<String>),
    IntBetween(i64, i64),
}

impl Validator {
    /// 値を検証し、違反していればメッセージを返す
    pub fn check(&self, value: &AttrValue) -> Result<(), String> {
        match (self, value) {
            (Validator::NotEmpty, AttrValue::String(s)) if s.is_empty() => {
                Err("空文字列は指定できません".to_string())
            }
            (Validator::LenBetween(min, max), AttrValue::String(s)) => {
                let len = s.chars().count();
                if len < *min || len > *max {
                    Err(format!("長さは {min} 以上 {max} 以下である必要があります (実際: {len})"))
                } else {
                    Ok(())
                }
            }
            (Validator::OneOf(allowed), AttrValue::String(s)) if !allowed.contains(s) => Err(
                format!("{s:?} は指定できません。許可される値: {}", allowed.join(", ")),
            ),
            (Validator::IntBetween(min, max), AttrValue::Int(i)) if i < min || i > max => Err(
                format!("{min} 以上 {max} 以下である必要があります (実際: {i})"),
            ),
            _ => Ok(()),
        }
    }
}

/// 単一属性の定義
#[derive(Debug, Clone, Serialize)]
pub struct Attribute {
    pub kind: AttrKind,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub force_new: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<AttrValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Validator>,
}

impl Attribute {
    pub fn new(kind: AttrKind) -> Self {
        Self {
            kind,
            required: false,
            optional: false,
            computed: false,
            force_new: false,
            default: None,
            min_items: None,
            max_items: None,
            description: None,
            validators: Vec::new(),
        }
    }

    pub fn string() -> Self {
        Self::new(AttrKind::Scalar(ValueType::String))
    }

    pub fn bool() -> Self {
        Self::new(AttrKind::Scalar(ValueType::Bool))
    }

    pub fn int() -> Self {
        Self::new(AttrKind::Scalar(ValueType::Int))
    }

    pub fn float() -> Self {
        Self::new(AttrKind::Scalar(ValueType::Float))
    }

    pub fn list_of(elem: ValueType) -> Self {
        Self::new(AttrKind::List(elem))
    }

    pub fn set_of(elem: ValueType) -> Self {
        Self::new(AttrKind::Set(elem))
    }

    pub fn map_of(elem: ValueType) -> Self {
        Self::new(AttrKind::Map(elem))
    }

    pub fn block(schema: Schema) -> Self {
        Self::new(AttrKind::Block(Box::new(schema)))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    /// デフォルト値（暗黙に optional になる）
    pub fn default(mut self, value: impl Into<AttrValue>) -> Self {
        self.optional = true;
        self.default = Some(value.into());
        self
    }

    pub fn min_items(mut self, n: usize) -> Self {
        self.min_items = Some(n);
        self
    }

    pub fn max_items(mut self, n: usize) -> Self {
        self.max_items = Some(n);
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validate(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// 利用者が値を設定できない（プロバイダーだけが埋める）属性か
    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }
}

/// 属性名 → 属性定義
#[derive(Debug, Clone, Default, Serialize)]
pub struct Schema {
    attributes: BTreeMap<String, Attribute>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attr(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Attribute)> {
        self.attributes.iter()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// 変更時に再作成が必要なトップレベル属性
    pub fn force_new_attributes(&self) -> Vec<&str> {
        self.attributes
            .iter()
            .filter(|(_, a)| a.force_new)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// プロバイダーだけが埋めるトップレベル属性
    pub fn computed_attributes(&self) -> Vec<&str> {
        self.attributes
            .iter()
            .filter(|(_, a)| a.computed)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}
