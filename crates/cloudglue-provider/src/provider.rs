//! Data source / resource traits and the provider registry

use crate::action::{ActionType, Action, ApplyResult, Plan, plan_resource};
use crate::data::ResourceData;
use crate::error::{ProviderError, Result};
use crate::state::{GlobalState, ResourceState, ResourceStatus};
use async_trait::async_trait;
use cloudglue_core::{AttrMap, Schema};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Per-operation time limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub create: Duration,
    pub read: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self::uniform(Duration::from_secs(20 * 60))
    }
}

impl Timeouts {
    pub fn uniform(duration: Duration) -> Self {
        Self {
            create: duration,
            read: duration,
            update: duration,
            delete: duration,
        }
    }

    pub fn with_read(mut self, read: Duration) -> Self {
        self.read = read;
        self
    }
}

/// Read-only lookup of remote objects
///
/// A data source receives the decoded configuration in a [`ResourceData`],
/// calls the remote API and writes computed attributes back. It must set an
/// id before returning.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Type name as used in configuration (e.g. "aws_servicecatalog_provisioning_artifacts")
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> &Schema;

    fn timeouts(&self) -> Timeouts {
        Timeouts::default()
    }

    async fn read(&self, d: &mut ResourceData) -> Result<()>;
}

/// Managed resource with a full create/read/update/delete lifecycle
///
/// `read` clears the id when the remote object no longer exists.
#[async_trait]
pub trait Resource: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> &Schema;

    fn timeouts(&self) -> Timeouts {
        Timeouts::default()
    }

    async fn create(&self, d: &mut ResourceData) -> Result<()>;

    async fn read(&self, d: &mut ResourceData) -> Result<()>;

    async fn update(&self, d: &mut ResourceData) -> Result<()>;

    async fn delete(&self, d: &mut ResourceData) -> Result<()>;

    /// Adopt an existing remote object by id
    async fn import(&self, id: &str, d: &mut ResourceData) -> Result<()> {
        d.set_id(id);
        self.read(d).await
    }
}

/// Outcome of a data source read
#[derive(Debug, Clone)]
pub struct ReadResult {
    pub id: String,
    pub state: AttrMap,
}

async fn with_timeout<T>(
    limit: Duration,
    operation: String,
    future: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(limit, future)
        .await
        .map_err(|_| ProviderError::Timeout(operation))?
}

/// Computed attributes the configuration leaves unset keep their prior value
fn carry_computed(schema: &Schema, prior: &AttrMap, mut config: AttrMap) -> AttrMap {
    for (name, attribute) in schema.iter() {
        if !attribute.computed || config.contains_key(name) {
            continue;
        }
        if let Some(value) = prior.get(name) {
            config.insert(name.clone(), value.clone());
        }
    }
    config
}

/// Registry of data sources and resources of one provider
pub struct Provider {
    name: String,
    data_sources: BTreeMap<&'static str, Arc<dyn DataSource>>,
    resources: BTreeMap<&'static str, Arc<dyn Resource>>,
}

impl Provider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_sources: BTreeMap::new(),
            resources: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn register_data_source(&mut self, data_source: impl DataSource + 'static) {
        tracing::debug!(provider = %self.name, type_name = data_source.type_name(), "registered data source");
        self.data_sources
            .insert(data_source.type_name(), Arc::new(data_source));
    }

    pub fn register_resource(&mut self, resource: impl Resource + 'static) {
        tracing::debug!(provider = %self.name, type_name = resource.type_name(), "registered resource");
        self.resources.insert(resource.type_name(), Arc::new(resource));
    }

    pub fn data_source(&self, type_name: &str) -> Result<Arc<dyn DataSource>> {
        self.data_sources
            .get(type_name)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownType(type_name.to_string()))
    }

    pub fn resource(&self, type_name: &str) -> Result<Arc<dyn Resource>> {
        self.resources
            .get(type_name)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownType(type_name.to_string()))
    }

    pub fn data_source_types(&self) -> Vec<&'static str> {
        self.data_sources.keys().copied().collect()
    }

    pub fn resource_types(&self) -> Vec<&'static str> {
        self.resources.keys().copied().collect()
    }

    /// Schema of a data source or resource type
    pub fn schema(&self, type_name: &str) -> Result<&Schema> {
        if let Some(ds) = self.data_sources.get(type_name) {
            return Ok(ds.schema());
        }
        self.resources
            .get(type_name)
            .map(|r| r.schema())
            .ok_or_else(|| ProviderError::UnknownType(type_name.to_string()))
    }

    /// Decode `config` against the data source schema and read it
    pub async fn read_data_source(
        &self,
        type_name: &str,
        config: &serde_json::Value,
    ) -> Result<ReadResult> {
        let data_source = self.data_source(type_name)?;
        let mut d = ResourceData::new(data_source.schema().decode(config)?);

        tracing::info!(type_name, "reading data source");
        with_timeout(
            data_source.timeouts().read,
            format!("reading {type_name}"),
            data_source.read(&mut d),
        )
        .await?;

        let (id, state) = d.into_parts();
        let id = id.ok_or_else(|| {
            ProviderError::InvalidConfig(format!("{type_name}: read did not set an id"))
        })?;
        Ok(ReadResult { id, state })
    }

    /// Plan a single resource address. `config` of `None` plans its removal.
    pub fn plan(
        &self,
        type_name: &str,
        name: &str,
        config: Option<&serde_json::Value>,
        state: &GlobalState,
    ) -> Result<Plan> {
        let resource = self.resource(type_name)?;
        let desired = config.map(|c| resource.schema().decode(c)).transpose()?;
        let prior = state.get_resource(&GlobalState::key(type_name, name));

        let action = plan_resource(resource.schema(), type_name, name, desired, prior);
        Ok(Plan::new(action.into_iter().collect()))
    }

    /// Apply every action of `plan`, recording results into `state`
    pub async fn apply(&self, plan: &Plan, state: &mut GlobalState) -> ApplyResult {
        let start = Instant::now();
        let mut result = ApplyResult::new();

        for action in &plan.actions {
            let outcome = match action.action_type {
                ActionType::NoOp => continue,
                ActionType::Create => self.apply_create(action, state).await,
                ActionType::Update => self.apply_update(action, state).await,
                ActionType::Delete => self.apply_delete(action, state).await,
                ActionType::Replace => match self.apply_delete(action, state).await {
                    Ok(_) => self.apply_create(action, state).await,
                    Err(e) => Err(e),
                },
            };

            match outcome {
                Ok(message) => {
                    tracing::info!(action = %action.id, "{}", message);
                    result.add_success(action.id.clone(), message);
                }
                Err(e) => {
                    tracing::error!(action = %action.id, error = %e, "action failed");
                    result.add_failure(action.id.clone(), e.to_string());
                }
            }
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        result
    }

    async fn apply_create(&self, action: &Action, state: &mut GlobalState) -> Result<String> {
        let resource = self.resource(&action.resource_type)?;
        let key = GlobalState::key(&action.resource_type, &action.resource_name);
        let desired = action.desired.clone().ok_or_else(|| {
            ProviderError::InvalidConfig(format!("{key}: no configuration to create from"))
        })?;

        let mut d = ResourceData::new(desired);
        let outcome = with_timeout(
            resource.timeouts().create,
            format!("creating {key}"),
            resource.create(&mut d),
        )
        .await;
        let (id, attributes) = d.into_parts();

        match (outcome, id) {
            (Ok(()), Some(id)) => {
                state.set_resource(
                    key.clone(),
                    ResourceState::new(&id, &action.resource_type).with_attributes(attributes),
                );
                Ok(format!("{key} created (id: {id})"))
            }
            (Ok(()), None) => Err(ProviderError::InvalidConfig(format!(
                "{key}: create did not set an id"
            ))),
            (Err(e), Some(id)) => {
                tracing::warn!(resource = %key, id = %id, "create failed after the object was created; marking as tainted");
                state.set_resource(
                    key,
                    ResourceState::new(id, &action.resource_type)
                        .with_status(ResourceStatus::Tainted)
                        .with_attributes(attributes),
                );
                Err(e)
            }
            (Err(e), None) => Err(e),
        }
    }

    async fn apply_update(&self, action: &Action, state: &mut GlobalState) -> Result<String> {
        let resource = self.resource(&action.resource_type)?;
        let key = GlobalState::key(&action.resource_type, &action.resource_name);
        let prior = state
            .get_resource(&key)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(key.clone()))?;
        let desired = action.desired.clone().ok_or_else(|| {
            ProviderError::InvalidConfig(format!("{key}: no configuration to update from"))
        })?;

        let desired = carry_computed(resource.schema(), &prior.attributes, desired);
        let mut d = ResourceData::for_update(&prior.id, prior.attributes.clone(), desired);
        with_timeout(
            resource.timeouts().update,
            format!("updating {key}"),
            resource.update(&mut d),
        )
        .await?;

        match d.into_parts() {
            (Some(id), attributes) => {
                let mut updated = prior;
                updated.refresh(id, attributes);
                state.set_resource(key.clone(), updated);
                Ok(format!("{key} updated"))
            }
            (None, _) => {
                state.remove_resource(&key);
                Ok(format!("{key} no longer exists and was removed from state"))
            }
        }
    }

    async fn apply_delete(&self, action: &Action, state: &mut GlobalState) -> Result<String> {
        let resource = self.resource(&action.resource_type)?;
        let key = GlobalState::key(&action.resource_type, &action.resource_name);
        let Some(prior) = state.get_resource(&key).cloned() else {
            return Ok(format!("{key} is not in state; nothing to delete"));
        };

        let mut d = ResourceData::from_state(&prior.id, prior.attributes);
        with_timeout(
            resource.timeouts().delete,
            format!("deleting {key}"),
            resource.delete(&mut d),
        )
        .await?;

        state.remove_resource(&key);
        Ok(format!("{key} destroyed"))
    }

    /// Re-read a managed resource. Returns `false` when it vanished remotely.
    pub async fn refresh(&self, type_name: &str, name: &str, state: &mut GlobalState) -> Result<bool> {
        let resource = self.resource(type_name)?;
        let key = GlobalState::key(type_name, name);
        let prior = state
            .get_resource(&key)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(key.clone()))?;

        let mut d = ResourceData::from_state(&prior.id, prior.attributes.clone());
        with_timeout(
            resource.timeouts().read,
            format!("reading {key}"),
            resource.read(&mut d),
        )
        .await?;

        match d.into_parts() {
            (Some(id), attributes) => {
                let mut refreshed = prior;
                refreshed.refresh(id, attributes);
                state.set_resource(key, refreshed);
                Ok(true)
            }
            (None, _) => {
                tracing::warn!(resource = %key, "resource not found remotely, removing from state");
                state.remove_resource(&key);
                Ok(false)
            }
        }
    }

    /// Bring an existing remote object under management
    pub async fn import(
        &self,
        type_name: &str,
        name: &str,
        id: &str,
        state: &mut GlobalState,
    ) -> Result<()> {
        let resource = self.resource(type_name)?;
        let key = GlobalState::key(type_name, name);
        if state.get_resource(&key).is_some() {
            return Err(ProviderError::InvalidConfig(format!(
                "{key} is already managed"
            )));
        }

        let mut d = ResourceData::default();
        with_timeout(
            resource.timeouts().read,
            format!("importing {key}"),
            resource.import(id, &mut d),
        )
        .await?;

        match d.into_parts() {
            (Some(id), attributes) => {
                state.set_resource(
                    key,
                    ResourceState::new(id, type_name).with_attributes(attributes),
                );
                Ok(())
            }
            (None, _) => Err(ProviderError::NotFound(format!("{type_name} {id}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudglue_core::{AttrValue, Attribute, ValueType};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{LazyLock, Mutex};

    static WIDGET_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
        Schema::new()
            .attr("arn", Attribute::string().computed())
            .attr("name", Attribute::string().required())
            .attr("zone", Attribute::string().required().force_new())
            .attr("labels", Attribute::map_of(ValueType::String).optional())
    });

    /// In-memory remote API
    #[derive(Default)]
    struct FakeWidgets {
        remote: Arc<Mutex<HashMap<String, AttrMap>>>,
        next_id: AtomicU32,
        fail_after_create: bool,
    }

    #[async_trait]
    impl Resource for FakeWidgets {
        fn type_name(&self) -> &'static str {
            "test_widget"
        }

        fn schema(&self) -> &Schema {
            &WIDGET_SCHEMA
        }

        async fn create(&self, d: &mut ResourceData) -> Result<()> {
            let id = format!("w-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
            let stored = AttrMap::new()
                .with("name", d.get_string("name"))
                .with("zone", d.get_string("zone"));
            self.remote.lock().unwrap().insert(id.clone(), stored);
            d.set_id(&id);
            if self.fail_after_create {
                return Err(ProviderError::api("waiting for widget", "never became ready"));
            }
            self.read(d).await
        }

        async fn read(&self, d: &mut ResourceData) -> Result<()> {
            let id = d.id().unwrap_or_default().to_string();
            let found = self.remote.lock().unwrap().get(&id).cloned();
            match found {
                Some(widget) => {
                    d.set("name", widget.get_string("name"));
                    d.set("arn", format!("arn:test:widget/{id}"));
                }
                None => d.clear_id(),
            }
            Ok(())
        }

        async fn update(&self, d: &mut ResourceData) -> Result<()> {
            assert!(d.get_str("arn").is_some(), "computed attributes carry over");
            let id = d.id().unwrap_or_default().to_string();
            if let Some(widget) = self.remote.lock().unwrap().get_mut(&id) {
                widget.insert("name", d.get_string("name"));
            }
            self.read(d).await
        }

        async fn delete(&self, d: &mut ResourceData) -> Result<()> {
            let id = d.id().unwrap_or_default().to_string();
            self.remote.lock().unwrap().remove(&id);
            Ok(())
        }
    }

    struct Echo;

    static ECHO_SCHEMA: LazyLock<Schema> =
        LazyLock::new(|| Schema::new().attr("text", Attribute::string().required()).attr("length", Attribute::int().computed()));

    #[async_trait]
    impl DataSource for Echo {
        fn type_name(&self) -> &'static str {
            "test_echo"
        }

        fn schema(&self) -> &Schema {
            &ECHO_SCHEMA
        }

        async fn read(&self, d: &mut ResourceData) -> Result<()> {
            let text = d.get_string("text");
            d.set("length", text.len() as i64);
            d.set_id(text);
            Ok(())
        }
    }

    fn provider_with(widgets: FakeWidgets) -> Provider {
        let mut provider = Provider::new("test");
        provider.register_resource(widgets);
        provider.register_data_source(Echo);
        provider
    }

    fn widget(name: &str, zone: &str) -> serde_json::Value {
        serde_json::json!({ "name": name, "zone": zone })
    }

    #[tokio::test]
    async fn test_read_data_source() {
        let provider = provider_with(FakeWidgets::default());
        let result = provider
            .read_data_source("test_echo", &serde_json::json!({ "text": "hello" }))
            .await
            .unwrap();

        assert_eq!(result.id, "hello");
        assert_eq!(result.state.get_int("length"), Some(5));
    }

    #[tokio::test]
    async fn test_unknown_type() {
        let provider = provider_with(FakeWidgets::default());
        let err = provider
            .read_data_source("test_missing", &serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnknownType(_)));
        assert!(provider.schema("test_missing").is_err());
        assert_eq!(provider.resource_types(), vec!["test_widget"]);
        assert_eq!(provider.data_source_types(), vec!["test_echo"]);
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected_before_read() {
        let provider = provider_with(FakeWidgets::default());
        let err = provider
            .read_data_source("test_echo", &serde_json::json!({ "length": 3 }))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Mapper(_)));
    }

    #[tokio::test]
    async fn test_lifecycle() {
        let provider = provider_with(FakeWidgets::default());
        let mut state = GlobalState::new();

        // create
        let plan = provider.plan("test_widget", "main", Some(&widget("a", "z1")), &state).unwrap();
        assert_eq!(plan.summary().create, 1);
        let result = provider.apply(&plan, &mut state).await;
        assert!(result.is_success());
        let created = state.get_resource("test_widget.main").unwrap().clone();
        assert_eq!(created.id, "w-0");
        assert_eq!(created.attributes.get_str("arn"), Some("arn:test:widget/w-0"));

        // unchanged
        let plan = provider.plan("test_widget", "main", Some(&widget("a", "z1")), &state).unwrap();
        assert!(!plan.has_changes);

        // in-place update
        let plan = provider.plan("test_widget", "main", Some(&widget("b", "z1")), &state).unwrap();
        assert_eq!(plan.summary().update, 1);
        assert!(provider.apply(&plan, &mut state).await.is_success());
        let updated = state.get_resource("test_widget.main").unwrap();
        assert_eq!(updated.id, "w-0");
        assert_eq!(updated.attributes.get_str("name"), Some("b"));

        // force-new attribute
        let plan = provider.plan("test_widget", "main", Some(&widget("b", "z2")), &state).unwrap();
        assert_eq!(plan.summary().replace, 1);
        assert!(provider.apply(&plan, &mut state).await.is_success());
        assert_eq!(state.get_resource("test_widget.main").unwrap().id, "w-1");

        // destroy
        let plan = provider.plan("test_widget", "main", None, &state).unwrap();
        assert_eq!(plan.summary().delete, 1);
        assert!(provider.apply(&plan, &mut state).await.is_success());
        assert!(state.resources.is_empty());
    }

    #[tokio::test]
    async fn test_failed_create_taints_resource() {
        let provider = provider_with(FakeWidgets {
            fail_after_create: true,
            ..Default::default()
        });
        let mut state = GlobalState::new();

        let plan = provider.plan("test_widget", "main", Some(&widget("a", "z1")), &state).unwrap();
        let result = provider.apply(&plan, &mut state).await;

        assert!(!result.is_success());
        assert!(result.failed[0].error.as_deref().unwrap().contains("never became ready"));
        assert!(state.get_resource("test_widget.main").unwrap().is_tainted());

        let plan = provider.plan("test_widget", "main", Some(&widget("a", "z1")), &state).unwrap();
        assert_eq!(plan.summary().replace, 1);
    }

    #[tokio::test]
    async fn test_refresh_drops_vanished_resource() {
        let widgets = FakeWidgets::default();
        let remote = Arc::clone(&widgets.remote);
        let provider = provider_with(widgets);
        let mut state = GlobalState::new();

        let plan = provider.plan("test_widget", "main", Some(&widget("a", "z1")), &state).unwrap();
        provider.apply(&plan, &mut state).await;

        assert!(provider.refresh("test_widget", "main", &mut state).await.unwrap());

        remote.lock().unwrap().clear();
        assert!(!provider.refresh("test_widget", "main", &mut state).await.unwrap());
        assert!(state.get_resource("test_widget.main").is_none());
    }

    #[tokio::test]
    async fn test_import() {
        let widgets = FakeWidgets::default();
        widgets.remote.lock().unwrap().insert(
            "w-42".to_string(),
            AttrMap::new().with("name", "existing").with("zone", "z1"),
        );
        let provider = provider_with(widgets);
        let mut state = GlobalState::new();

        provider.import("test_widget", "adopted", "w-42", &mut state).await.unwrap();
        let imported = state.get_resource("test_widget.adopted").unwrap();
        assert_eq!(imported.id, "w-42");
        assert_eq!(
            imported.attributes.get("name"),
            Some(&AttrValue::from("existing"))
        );

        let err = provider
            .import("test_widget", "other", "w-404", &mut state)
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        assert!(provider.import("test_widget", "adopted", "w-42", &mut state).await.is_err());
    }
}
