//! Resource tag handling

use cloudglue_core::{AttrMap, AttrValue};
use std::collections::BTreeMap;

pub type Tags = BTreeMap<String, String>;

/// Provider-level default tags overlaid by resource tags
pub fn merge_default_tags(defaults: &Tags, tags: &Tags) -> Tags {
    let mut all = defaults.clone();
    all.extend(tags.iter().map(|(k, v)| (k.clone(), v.clone())));
    all
}

/// Remote tags minus the provider defaults the resource did not set itself
pub fn without_defaults(all: &Tags, defaults: &Tags, configured: &Tags) -> Tags {
    all.iter()
        .filter(|(k, v)| configured.contains_key(*k) || defaults.get(*k) != Some(*v))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Map attribute for a tag set; empty sets leave the attribute unset
pub fn to_attr(tags: &Tags) -> AttrValue {
    if tags.is_empty() {
        return AttrValue::Null;
    }
    AttrValue::Map(
        tags.iter()
            .map(|(k, v)| (k.clone(), AttrValue::from(v.as_str())))
            .collect::<AttrMap>(),
    )
}

pub fn from_attr(value: Option<&AttrValue>) -> Tags {
    value
        .and_then(AttrValue::as_map)
        .map(|m| {
            m.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

/// Tags to (re)apply and keys to remove when going from `old` to `new`
pub fn diff(old: &Tags, new: &Tags) -> (Tags, Vec<String>) {
    let upsert = new
        .iter()
        .filter(|(k, v)| old.get(*k) != Some(*v))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    let remove = old
        .keys()
        .filter(|k| !new.contains_key(*k))
        .cloned()
        .collect();
    (upsert, remove)
}
