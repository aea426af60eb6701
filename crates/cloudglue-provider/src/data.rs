//! Per-invocation resource data
//!
//! `ResourceData` carries the desired configuration, the prior state and the
//! values written back by a CRUD function during a single invocation.

use cloudglue_core::{AttrMap, AttrValue};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct ResourceData {
    id: Option<String>,
    config: AttrMap,
    prior: AttrMap,
    written: AttrMap,
    removed: Vec<String>,
}

impl ResourceData {
    /// Data for a create or a data source read: only configuration is known
    pub fn new(config: AttrMap) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Data for refresh / delete: the stored state doubles as configuration
    pub fn from_state(id: impl Into<String>, state: AttrMap) -> Self {
        Self {
            id: Some(id.into()),
            config: state.clone(),
            prior: state,
            ..Default::default()
        }
    }

    /// Data for an update: prior state and new configuration
    pub fn for_update(id: impl Into<String>, prior: AttrMap, config: AttrMap) -> Self {
        Self {
            id: Some(id.into()),
            config,
            prior,
            ..Default::default()
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Mark the resource as gone; callers drop it from state
    pub fn clear_id(&mut self) {
        self.id = None;
    }

    pub fn is_new(&self) -> bool {
        self.prior.is_empty()
    }

    /// Current value: written values win over configuration
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        if self.removed.iter().any(|k| k == key) {
            return None;
        }
        self.written.get(key).or_else(|| self.config.get(key))
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(AttrValue::as_str)
    }

    pub fn get_string(&self, key: &str) -> String {
        self.get_str(key).unwrap_or_default().to_string()
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(AttrValue::as_bool)
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(AttrValue::as_int)
    }

    pub fn get_list(&self, key: &str) -> &[AttrValue] {
        self.get(key).and_then(AttrValue::as_list).unwrap_or(&[])
    }

    pub fn get_block(&self, key: &str) -> Option<&AttrMap> {
        cloudglue_core::unwrap_block(self.get(key))
    }

    pub fn get_string_set(&self, key: &str) -> Vec<String> {
        cloudglue_core::expand_string_set(self.get(key))
    }

    pub fn get_string_list(&self, key: &str) -> Vec<String> {
        cloudglue_core::expand_string_list(self.get(key))
    }

    pub fn get_string_map(&self, key: &str) -> BTreeMap<String, String> {
        self.get(key)
            .and_then(AttrValue::as_map)
            .map(|m| {
                m.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Write a value into the resulting state. `None` removes the attribute.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        let key = key.into();
        match value.into() {
            AttrValue::Null => {
                self.written.remove(&key);
                if !self.removed.contains(&key) {
                    self.removed.push(key);
                }
            }
            value => {
                self.removed.retain(|k| *k != key);
                self.written.insert(key, value);
            }
        }
    }

    /// Whether configuration differs from prior state for `key`
    pub fn has_change(&self, key: &str) -> bool {
        !self.is_new() && self.prior.get(key) != self.config.get(key)
    }

    /// (old, new) pair for `key`
    pub fn get_change(&self, key: &str) -> (Option<&AttrValue>, Option<&AttrValue>) {
        (self.prior.get(key), self.config.get(key))
    }

    /// The state produced by this invocation
    pub fn state(&self) -> AttrMap {
        let mut state = self.config.clone();
        for (k, v) in self.written.iter() {
            state.insert(k.clone(), v.clone());
        }
        for k in &self.removed {
            state.remove(k);
        }
        state
    }

    pub fn into_parts(self) -> (Option<String>, AttrMap) {
        let state = self.state();
        (self.id, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_written_values_override_config() {
        let mut d = ResourceData::new(AttrMap::new().with("name", "a").with("version", "1"));
        d.set("name", "b");
        d.set("arn", "arn:aws:x");

        assert_eq!(d.get_str("name"), Some("b"));
        let state = d.state();
        assert_eq!(state.get_str("name"), Some("b"));
        assert_eq!(state.get_str("version"), Some("1"));
        assert_eq!(state.get_str("arn"), Some("arn:aws:x"));
    }

    #[test]
    fn test_set_null_removes_attribute() {
        let mut d = ResourceData::new(AttrMap::new().with("details", "x"));
        d.set("details", AttrValue::Null);

        assert!(d.get("details").is_none());
        assert!(!d.state().contains_key("details"));

        d.set("details", "y");
        assert_eq!(d.state().get_str("details"), Some("y"));
    }

    #[test]
    fn test_change_detection() {
        let prior = AttrMap::new()
            .with("name", "a")
            .with("tags", AttrMap::new().with("env", "dev"));
        let config = AttrMap::new()
            .with("name", "a")
            .with("tags", AttrMap::new().with("env", "prod"));
        let d = ResourceData::for_update("id-1", prior, config);

        assert!(!d.has_change("name"));
        assert!(d.has_change("tags"));
        assert!(!d.has_change("missing"));
    }

    #[test]
    fn test_new_resource_has_no_changes() {
        let d = ResourceData::new(AttrMap::new().with("name", "a"));
        assert!(d.is_new());
        assert!(!d.has_change("name"));
        assert!(d.id().is_none());
    }

    #[test]
    fn test_clear_id() {
        let mut d = ResourceData::from_state("m-1", AttrMap::new().with("name", "a"));
        assert_eq!(d.id(), Some("m-1"));
        d.clear_id();
        let (id, state) = d.into_parts();
        assert!(id.is_none());
        assert_eq!(state.get_str("name"), Some("a"));
    }
}
