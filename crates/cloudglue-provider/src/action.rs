//! Action types for resource lifecycle management

use crate::state::ResourceState;
use cloudglue_core::{AttrKind, AttrMap, AttrValue, Schema};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Represents a planned action for a resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    /// Unique identifier for the action
    pub id: String,

    /// Type of action to perform
    pub action_type: ActionType,

    /// Resource type (e.g., "aws_medialive_multiplex")
    pub resource_type: String,

    /// Local resource name
    pub resource_name: String,

    /// Description of the action
    pub description: String,

    /// Attribute paths whose configured value differs from state
    pub changed_attributes: Vec<String>,

    /// Desired configuration (absent for deletes)
    pub desired: Option<AttrMap>,
}

/// Type of action to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Create a new resource
    Create,
    /// Update an existing resource in place
    Update,
    /// Delete and recreate the resource
    Replace,
    /// Delete a resource
    Delete,
    /// No changes needed
    NoOp,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Create => write!(f, "create"),
            ActionType::Update => write!(f, "update"),
            ActionType::Replace => write!(f, "replace"),
            ActionType::Delete => write!(f, "delete"),
            ActionType::NoOp => write!(f, "no-op"),
        }
    }
}

/// Result of applying actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResult {
    /// Successfully applied actions
    pub succeeded: Vec<ActionResult>,

    /// Failed actions
    pub failed: Vec<ActionResult>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl ApplyResult {
    pub fn new() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
            duration_ms: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn add_success(&mut self, action_id: String, message: String) {
        self.succeeded.push(ActionResult {
            action_id,
            success: true,
            message,
            error: None,
        });
    }

    pub fn add_failure(&mut self, action_id: String, error: String) {
        self.failed.push(ActionResult {
            action_id,
            success: false,
            message: String::new(),
            error: Some(error),
        });
    }
}

impl Default for ApplyResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a single action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    /// ID of the action
    pub action_id: String,

    /// Whether the action succeeded
    pub success: bool,

    /// Success message
    pub message: String,

    /// Error message if failed
    pub error: Option<String>,
}

/// Plan containing all actions to be applied
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// List of actions to perform
    pub actions: Vec<Action>,

    /// Whether the plan has any changes
    pub has_changes: bool,
}

impl Plan {
    pub fn new(actions: Vec<Action>) -> Self {
        let has_changes = actions.iter().any(|a| a.action_type != ActionType::NoOp);
        Self {
            actions,
            has_changes,
        }
    }

    pub fn empty() -> Self {
        Self {
            actions: Vec::new(),
            has_changes: false,
        }
    }

    /// Get actions by type
    pub fn actions_by_type(&self, action_type: ActionType) -> Vec<&Action> {
        self.actions
            .iter()
            .filter(|a| a.action_type == action_type)
            .collect()
    }

    /// Summary of the plan
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            create: self.actions_by_type(ActionType::Create).len(),
            update: self.actions_by_type(ActionType::Update).len(),
            replace: self.actions_by_type(ActionType::Replace).len(),
            delete: self.actions_by_type(ActionType::Delete).len(),
            no_change: self.actions_by_type(ActionType::NoOp).len(),
        }
    }
}

/// Summary of planned actions
#[derive(Debug, Clone)]
pub struct PlanSummary {
    pub create: usize,
    pub update: usize,
    pub replace: usize,
    pub delete: usize,
    pub no_change: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to create, {} to update, {} to replace, {} to delete, {} unchanged",
            self.create, self.update, self.replace, self.delete, self.no_change
        )
    }
}

/// Attribute paths where `config` differs from `prior`.
///
/// Computed-only attributes are ignored, as are optional+computed attributes
/// the configuration leaves unset. Blocks of equal length are compared field
/// by field so nested computed values do not show up as changes.
pub fn diff_attributes(schema: &Schema, config: &AttrMap, prior: &AttrMap) -> Vec<String> {
    let mut changed = Vec::new();
    diff_into(schema, config, prior, "", &mut changed);
    changed
}

fn diff_into(schema: &Schema, config: &AttrMap, prior: &AttrMap, prefix: &str, out: &mut Vec<String>) {
    let empty = AttrMap::new();

    for (name, attribute) in schema.iter() {
        if attribute.is_computed_only() {
            continue;
        }

        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };
        let new = config.get(name);
        let old = prior.get(name);

        if new.is_none() && attribute.computed {
            continue;
        }

        match (&attribute.kind, new, old) {
            (AttrKind::Block(inner), Some(AttrValue::List(n)), Some(AttrValue::List(o)))
                if n.len() == o.len() =>
            {
                for (i, (ni, oi)) in n.iter().zip(o).enumerate() {
                    diff_into(
                        inner,
                        ni.as_map().unwrap_or(&empty),
                        oi.as_map().unwrap_or(&empty),
                        &format!("{path}.{i}"),
                        out,
                    );
                }
            }
            // state files store sets as JSON arrays
            (AttrKind::Set(_), Some(n), Some(o)) => {
                if set_members(n) != set_members(o) {
                    out.push(path);
                }
            }
            _ if new != old => out.push(path),
            _ => {}
        }
    }
}

fn set_members(value: &AttrValue) -> Option<BTreeSet<String>> {
    match value {
        AttrValue::Set(set) => Some(set.clone()),
        AttrValue::List(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => None,
    }
}

/// Decide what to do with a single resource address
pub fn plan_resource(
    schema: &Schema,
    resource_type: &str,
    resource_name: &str,
    desired: Option<AttrMap>,
    prior: Option<&ResourceState>,
) -> Option<Action> {
    let address = format!("{resource_type}.{resource_name}");

    let (action_type, changed_attributes, description) = match (&desired, prior) {
        (None, None) => return None,
        (Some(_), None) => (ActionType::Create, Vec::new(), format!("{address} will be created")),
        (None, Some(_)) => (ActionType::Delete, Vec::new(), format!("{address} will be destroyed")),
        (Some(_), Some(state)) if state.is_tainted() => (
            ActionType::Replace,
            Vec::new(),
            format!("{address} is tainted and will be replaced"),
        ),
        (Some(config), Some(state)) => {
            let changed = diff_attributes(schema, config, &state.attributes);
            let force_new = schema.force_new_attributes();
            let replace = changed
                .iter()
                .any(|path| force_new.contains(&path.split('.').next().unwrap_or_default()));

            if changed.is_empty() {
                (ActionType::NoOp, changed, format!("{address} is up to date"))
            } else if replace {
                (ActionType::Replace, changed, format!("{address} must be replaced"))
            } else {
                (ActionType::Update, changed, format!("{address} will be updated in-place"))
            }
        }
    };

    Some(Action {
        id: format!("{action_type}-{address}"),
        action_type,
        resource_type: resource_type.to_string(),
        resource_name: resource_name.to_string(),
        description,
        changed_attributes,
        desired,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ResourceStatus;
    use cloudglue_core::{Attribute, ValueType};

    fn schema() -> Schema {
        Schema::new()
            .attr("arn", Attribute::string().computed())
            .attr("name", Attribute::string().required())
            .attr("zones", Attribute::list_of(ValueType::String).required().force_new())
            .attr(
                "settings",
                Attribute::block(
                    Schema::new()
                        .attr("bitrate", Attribute::int().required())
                        .attr("reserved", Attribute::int().optional().computed()),
                )
                .optional()
                .max_items(1),
            )
    }

    fn config(name: &str, zones: Vec<&str>) -> AttrMap {
        AttrMap::new()
            .with("name", name)
            .with("zones", zones)
            .with("settings", AttrValue::block(AttrMap::new().with("bitrate", 1000i64)))
    }

    fn stored(attributes: AttrMap) -> ResourceState {
        ResourceState::new("m-1", "test_multiplex").with_attributes(attributes)
    }

    #[test]
    fn test_plan_create_and_delete() {
        let create = plan_resource(&schema(), "test_multiplex", "a", Some(config("a", vec!["z1", "z2"])), None).unwrap();
        assert_eq!(create.action_type, ActionType::Create);
        assert_eq!(create.id, "create-test_multiplex.a");

        let prior = stored(config("a", vec!["z1", "z2"]));
        let delete = plan_resource(&schema(), "test_multiplex", "a", None, Some(&prior)).unwrap();
        assert_eq!(delete.action_type, ActionType::Delete);
        assert!(delete.desired.is_none());

        assert!(plan_resource(&schema(), "test_multiplex", "a", None, None).is_none());
    }

    #[test]
    fn test_computed_values_are_not_changes() {
        let mut state = config("a", vec!["z1", "z2"]);
        state.insert("arn", "arn:aws:medialive:multiplex:1");
        state.insert(
            "settings",
            AttrValue::block(AttrMap::new().with("bitrate", 1000i64).with("reserved", 1i64)),
        );
        let prior = stored(state);

        let action = plan_resource(&schema(), "test_multiplex", "a", Some(config("a", vec!["z1", "z2"])), Some(&prior)).unwrap();
        assert_eq!(action.action_type, ActionType::NoOp);
    }

    #[test]
    fn test_update_vs_replace() {
        let prior = stored(config("a", vec!["z1", "z2"]));

        let update = plan_resource(&schema(), "test_multiplex", "a", Some(config("b", vec!["z1", "z2"])), Some(&prior)).unwrap();
        assert_eq!(update.action_type, ActionType::Update);
        assert_eq!(update.changed_attributes, vec!["name"]);

        let replace = plan_resource(&schema(), "test_multiplex", "a", Some(config("a", vec!["z1", "z3"])), Some(&prior)).unwrap();
        assert_eq!(replace.action_type, ActionType::Replace);
    }

    #[test]
    fn test_set_survives_state_file_roundtrip() {
        let schema = Schema::new()
            .attr("name", Attribute::string().required())
            .attr("ids", Attribute::set_of(ValueType::String).optional());
        let desired = schema
            .decode(&serde_json::json!({ "name": "a", "ids": ["b", "a"] }))
            .unwrap();

        let text = serde_json::to_string(&stored(desired.clone())).unwrap();
        let prior: ResourceState = serde_json::from_str(&text).unwrap();
        assert!(matches!(prior.attributes.get("ids"), Some(AttrValue::List(_))));

        let action = plan_resource(&schema, "test_multiplex", "a", Some(desired), Some(&prior)).unwrap();
        assert_eq!(action.action_type, ActionType::NoOp);

        let changed = schema
            .decode(&serde_json::json!({ "name": "a", "ids": ["a", "c"] }))
            .unwrap();
        let action = plan_resource(&schema, "test_multiplex", "a", Some(changed), Some(&prior)).unwrap();
        assert_eq!(action.changed_attributes, vec!["ids"]);
    }

    #[test]
    fn test_nested_change_path() {
        let prior = stored(config("a", vec!["z1", "z2"]));
        let mut desired = config("a", vec!["z1", "z2"]);
        desired.insert("settings", AttrValue::block(AttrMap::new().with("bitrate", 2000i64)));

        let action = plan_resource(&schema(), "test_multiplex", "a", Some(desired), Some(&prior)).unwrap();
        assert_eq!(action.action_type, ActionType::Update);
        assert_eq!(action.changed_attributes, vec!["settings.0.bitrate"]);
    }

    #[test]
    fn test_tainted_resource_is_replaced() {
        let prior = stored(config("a", vec!["z1", "z2"])).with_status(ResourceStatus::Tainted);
        let action = plan_resource(&schema(), "test_multiplex", "a", Some(config("a", vec!["z1", "z2"])), Some(&prior)).unwrap();
        assert_eq!(action.action_type, ActionType::Replace);
    }

    #[test]
    fn test_plan_summary() {
        let prior = stored(config("a", vec!["z1", "z2"]));
        let plan = Plan::new(vec![
            plan_resource(&schema(), "test_multiplex", "a", Some(config("b", vec!["z1", "z2"])), Some(&prior)).unwrap(),
            plan_resource(&schema(), "test_multiplex", "c", Some(config("c", vec!["z1", "z2"])), None).unwrap(),
        ]);

        assert!(plan.has_changes);
        assert_eq!(
            plan.summary().to_string(),
            "1 to create, 1 to update, 0 to replace, 0 to delete, 0 unchanged"
        );
    }
}
