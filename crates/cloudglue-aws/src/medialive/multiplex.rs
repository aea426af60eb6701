//! `aws_medialive_multiplex` resource

use super::api::*;
use super::wait;
use crate::conns::AwsClient;
use crate::names::*;
use crate::tags::{self, Tags};
use async_trait::async_trait;
use cloudglue_core::{AttrMap, AttrValue, Attribute, Schema, ValueType, Validator, required_int};
use cloudglue_provider::{
    ProviderError, Resource, ResourceData, Result, Timeouts, retry_with_backoff,
};
use std::sync::LazyLock;
use std::time::Duration;

pub const TYPE_NAME: &str = "aws_medialive_multiplex";

const ATTR_AVAILABILITY_ZONES: &str = "availability_zones";
const ATTR_MULTIPLEX_SETTINGS: &str = "multiplex_settings";
const ATTR_START_MULTIPLEX: &str = "start_multiplex";

const ATTR_TRANSPORT_STREAM_BITRATE: &str = "transport_stream_bitrate";
const ATTR_TRANSPORT_STREAM_ID: &str = "transport_stream_id";
const ATTR_TRANSPORT_STREAM_RESERVED_BITRATE: &str = "transport_stream_reserved_bitrate";
const ATTR_MAXIMUM_VIDEO_BUFFER_DELAY: &str = "maximum_video_buffer_delay_milliseconds";

const TIMEOUT: Duration = Duration::from_secs(30 * 60);

static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    let settings = Schema::new()
        .attr(
            ATTR_TRANSPORT_STREAM_BITRATE,
            Attribute::int()
                .required()
                .validate(Validator::IntBetween(1_000_000, 100_000_000)),
        )
        .attr(
            ATTR_TRANSPORT_STREAM_ID,
            Attribute::int()
                .required()
                .validate(Validator::IntBetween(0, 65535)),
        )
        .attr(
            ATTR_TRANSPORT_STREAM_RESERVED_BITRATE,
            Attribute::int().optional().computed(),
        )
        .attr(
            ATTR_MAXIMUM_VIDEO_BUFFER_DELAY,
            Attribute::int()
                .optional()
                .computed()
                .validate(Validator::IntBetween(800, 3000)),
        );

    Schema::new()
        .attr(ATTR_ARN, Attribute::string().computed())
        .attr(
            ATTR_AVAILABILITY_ZONES,
            Attribute::list_of(ValueType::String)
                .required()
                .force_new()
                .min_items(2)
                .max_items(2),
        )
        .attr(
            ATTR_MULTIPLEX_SETTINGS,
            Attribute::block(settings).optional().max_items(1),
        )
        .attr(ATTR_NAME, Attribute::string().required())
        .attr(ATTR_START_MULTIPLEX, Attribute::bool().default(false))
        .attr(ATTR_TAGS, Attribute::map_of(ValueType::String).optional())
        .attr(ATTR_TAGS_ALL, Attribute::map_of(ValueType::String).computed())
});

/// Expand the `multiplex_settings` block
pub fn expand_multiplex_settings(
    block: Option<&AttrMap>,
) -> cloudglue_core::Result<Option<MultiplexSettings>> {
    let Some(m) = block else {
        return Ok(None);
    };
    let path = "multiplex_settings.0";

    Ok(Some(MultiplexSettings {
        transport_stream_bitrate: required_int(m, ATTR_TRANSPORT_STREAM_BITRATE, path)?,
        transport_stream_id: required_int(m, ATTR_TRANSPORT_STREAM_ID, path)?,
        transport_stream_reserved_bitrate: m
            .get_int(ATTR_TRANSPORT_STREAM_RESERVED_BITRATE)
            .filter(|v| *v != 0),
        maximum_video_buffer_delay_milliseconds: m
            .get_int(ATTR_MAXIMUM_VIDEO_BUFFER_DELAY)
            .filter(|v| *v != 0),
    }))
}

pub fn flatten_multiplex_settings(settings: &MultiplexSettings) -> AttrValue {
    let mut m = AttrMap::new()
        .with(ATTR_TRANSPORT_STREAM_BITRATE, settings.transport_stream_bitrate)
        .with(ATTR_TRANSPORT_STREAM_ID, settings.transport_stream_id);
    m.insert_some(
        ATTR_TRANSPORT_STREAM_RESERVED_BITRATE,
        settings.transport_stream_reserved_bitrate,
    );
    m.insert_some(
        ATTR_MAXIMUM_VIDEO_BUFFER_DELAY,
        settings.maximum_video_buffer_delay_milliseconds,
    );

    AttrValue::block(m)
}

/// A MediaLive multiplex and, optionally, its running state
pub struct MultiplexResource {
    client: AwsClient,
}

impl MultiplexResource {
    pub fn new(client: AwsClient) -> Self {
        Self { client }
    }

    fn configured_tags(&self, d: &ResourceData) -> Tags {
        tags::merge_default_tags(self.client.default_tags(), &d.get_string_map(ATTR_TAGS))
    }

    async fn start(&self, conn: &dyn MediaLiveApi, id: &str, timeout: Duration) -> Result<()> {
        tracing::info!(id, "starting MediaLive Multiplex");
        conn.start_multiplex(id)
            .await
            .map_err(|e| e.context(format!("starting MediaLive Multiplex ({id})")))?;
        wait::multiplex_running(conn, id, timeout, self.client.poll_interval()).await?;
        Ok(())
    }

    async fn stop(&self, conn: &dyn MediaLiveApi, id: &str, timeout: Duration) -> Result<()> {
        tracing::info!(id, "stopping MediaLive Multiplex");
        conn.stop_multiplex(id)
            .await
            .map_err(|e| e.context(format!("stopping MediaLive Multiplex ({id})")))?;
        wait::multiplex_stopped(conn, id, timeout, self.client.poll_interval()).await?;
        Ok(())
    }
}

fn require_id(d: &ResourceData) -> Result<String> {
    d.id()
        .map(str::to_string)
        .ok_or_else(|| ProviderError::InvalidConfig("MediaLive Multiplex has no id".to_string()))
}

#[async_trait]
impl Resource for MultiplexResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> &Schema {
        &SCHEMA
    }

    fn timeouts(&self) -> Timeouts {
        Timeouts::uniform(TIMEOUT)
    }

    async fn create(&self, d: &mut ResourceData) -> Result<()> {
        let conn = self.client.medialive()?;
        let conn = conn.as_ref();
        let name = d.get_string(ATTR_NAME);

        let settings = expand_multiplex_settings(d.get_block(ATTR_MULTIPLEX_SETTINGS))?
            .ok_or_else(|| {
                ProviderError::InvalidConfig(format!(
                    "creating MediaLive Multiplex ({name}): {ATTR_MULTIPLEX_SETTINGS} is required"
                ))
            })?;
        let input = CreateMultiplexInput {
            name: name.clone(),
            availability_zones: d.get_string_list(ATTR_AVAILABILITY_ZONES),
            settings,
            request_id: uuid::Uuid::new_v4().to_string(),
            tags: self.configured_tags(d),
        };

        tracing::info!(name = %name, "creating MediaLive Multiplex");
        let operation = format!("creating MediaLive Multiplex ({name})");
        let input = &input;
        let op = operation.as_str();
        let multiplex = retry_with_backoff(self.client.retry(), op, move || async move {
            conn.create_multiplex(input).await.map_err(|e| e.context(op))
        })
        .await?;

        let id = multiplex.id;
        d.set_id(&id);

        let timeout = self.timeouts().create;
        wait::multiplex_created(conn, &id, timeout, self.client.poll_interval()).await?;

        if d.get_bool(ATTR_START_MULTIPLEX) == Some(true) {
            self.start(conn, &id, timeout).await?;
        }

        self.read(d).await
    }

    async fn read(&self, d: &mut ResourceData) -> Result<()> {
        let conn = self.client.medialive()?;
        let id = require_id(d)?;

        let Some(multiplex) = wait::find_multiplex(conn.as_ref(), &id).await? else {
            tracing::warn!(id = %id, "MediaLive Multiplex not found, removing from state");
            d.clear_id();
            return Ok(());
        };

        let configured = d.get_string_map(ATTR_TAGS);
        let tags = tags::without_defaults(&multiplex.tags, self.client.default_tags(), &configured);

        d.set(ATTR_ARN, multiplex.arn);
        d.set(ATTR_AVAILABILITY_ZONES, multiplex.availability_zones);
        d.set(
            ATTR_MULTIPLEX_SETTINGS,
            multiplex.settings.as_ref().map(flatten_multiplex_settings),
        );
        d.set(ATTR_NAME, multiplex.name);
        d.set(ATTR_TAGS, tags::to_attr(&tags));
        d.set(ATTR_TAGS_ALL, tags::to_attr(&multiplex.tags));

        if d.get_bool(ATTR_START_MULTIPLEX).is_none() {
            d.set(ATTR_START_MULTIPLEX, multiplex.state == STATE_RUNNING);
        }

        Ok(())
    }

    async fn update(&self, d: &mut ResourceData) -> Result<()> {
        let conn = self.client.medialive()?;
        let conn = conn.as_ref();
        let id = require_id(d)?;
        let timeout = self.timeouts().update;

        if d.has_change(ATTR_NAME) || d.has_change(ATTR_MULTIPLEX_SETTINGS) {
            let input = UpdateMultiplexInput {
                id: id.clone(),
                name: Some(d.get_string(ATTR_NAME)),
                settings: expand_multiplex_settings(d.get_block(ATTR_MULTIPLEX_SETTINGS))?,
            };

            tracing::info!(id = %id, "updating MediaLive Multiplex");
            let operation = format!("updating MediaLive Multiplex ({id})");
            let input = &input;
            let op = operation.as_str();
            retry_with_backoff(self.client.retry(), op, move || async move {
                conn.update_multiplex(input).await.map_err(|e| e.context(op))
            })
            .await?;
        }

        if d.has_change(ATTR_START_MULTIPLEX) {
            if d.get_bool(ATTR_START_MULTIPLEX) == Some(true) {
                self.start(conn, &id, timeout).await?;
            } else {
                self.stop(conn, &id, timeout).await?;
            }
        }

        if d.has_change(ATTR_TAGS) {
            let (old, _) = d.get_change(ATTR_TAGS);
            let old_tags =
                tags::merge_default_tags(self.client.default_tags(), &tags::from_attr(old));
            let (upsert, remove) = tags::diff(&old_tags, &self.configured_tags(d));
            let arn = d.get_string(ATTR_ARN);

            if !remove.is_empty() {
                conn.untag_resource(&arn, &remove)
                    .await
                    .map_err(|e| e.context(format!("untagging MediaLive Multiplex ({id})")))?;
            }
            if !upsert.is_empty() {
                conn.tag_resource(&arn, &upsert)
                    .await
                    .map_err(|e| e.context(format!("tagging MediaLive Multiplex ({id})")))?;
            }
        }

        self.read(d).await
    }

    async fn delete(&self, d: &mut ResourceData) -> Result<()> {
        let conn = self.client.medialive()?;
        let conn = conn.as_ref();
        let id = require_id(d)?;
        let timeout = self.timeouts().delete;

        let Some(multiplex) = wait::find_multiplex(conn, &id).await? else {
            return Ok(());
        };

        if multiplex.state == STATE_RUNNING {
            self.stop(conn, &id, timeout).await?;
        }

        tracing::info!(id = %id, "deleting MediaLive Multiplex");
        match conn.delete_multiplex(&id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => return Ok(()),
            Err(e) => return Err(e.context(format!("deleting MediaLive Multiplex ({id})"))),
        }

        wait::multiplex_deleted(conn, &id, timeout, self.client.poll_interval()).await
    }
}
