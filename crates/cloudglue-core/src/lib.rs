//! cloudglue のコア
//!
//! 宣言的な設定システムが扱う汎用の属性ツリーと、クラウド API の型付き
//! ペイロードを相互に変換するための部品を提供します。
//!
//! - [`value`]: 属性ツリー (`AttrValue` / `AttrMap`)
//! - [`mapper`]: ブロックの unwrap / expand / flatten
//! - [`schema`]: 宣言的スキーマビルダー
//! - [`decode`]: スキーマに沿った JSON 設定の読み込み
//! - [`encode`]: 正規化 JSON と内容ベースの識別子

pub mod decode;
pub mod encode;
pub mod error;
pub mod mapper;
pub mod schema;
pub mod value;

pub use encode::{content_id, to_canonical_json};
pub use error::{MapperError, Result};
pub use mapper::{
    expand_blocks, expand_string_list, expand_string_set, flatten_blocks, flatten_string_set,
    required_int, required_str, unwrap_block,
};
pub use schema::{AttrKind, Attribute, Schema, ValueType, Validator};
pub use value::{AttrMap, AttrValue};
