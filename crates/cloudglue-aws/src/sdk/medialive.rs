use super::from_sdk;
use crate::error::{AwsError, Result};
use crate::medialive::api::*;
use crate::tags::Tags;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_medialive::Client;
use aws_sdk_medialive::types;
use std::collections::HashMap;

pub struct SdkMediaLive {
    client: Client,
}

impl SdkMediaLive {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

fn to_i32(name: &str, value: i64) -> Result<i32> {
    i32::try_from(value).map_err(|_| AwsError::Sdk(format!("{name} out of range: {value}")))
}

fn sdk_settings(settings: &MultiplexSettings) -> Result<types::MultiplexSettings> {
    let mut builder = types::MultiplexSettings::builder()
        .transport_stream_bitrate(to_i32(
            "transport_stream_bitrate",
            settings.transport_stream_bitrate,
        )?)
        .transport_stream_id(to_i32("transport_stream_id", settings.transport_stream_id)?);
    if let Some(v) = settings.transport_stream_reserved_bitrate {
        builder = builder.transport_stream_reserved_bitrate(to_i32(
            "transport_stream_reserved_bitrate",
            v,
        )?);
    }
    if let Some(v) = settings.maximum_video_buffer_delay_milliseconds {
        builder = builder.maximum_video_buffer_delay_milliseconds(to_i32(
            "maximum_video_buffer_delay_milliseconds",
            v,
        )?);
    }
    Ok(builder.build())
}

fn settings(settings: &types::MultiplexSettings) -> MultiplexSettings {
    MultiplexSettings {
        transport_stream_bitrate: settings.transport_stream_bitrate().map(i64::from).unwrap_or_default(),
        transport_stream_id: settings.transport_stream_id().map(i64::from).unwrap_or_default(),
        transport_stream_reserved_bitrate: settings
            .transport_stream_reserved_bitrate()
            .map(i64::from),
        maximum_video_buffer_delay_milliseconds: settings
            .maximum_video_buffer_delay_milliseconds()
            .map(i64::from),
    }
}

fn tags(tags: Option<&HashMap<String, String>>) -> Tags {
    tags.map(|t| t.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default()
}

fn multiplex(m: &types::Multiplex) -> Multiplex {
    Multiplex {
        id: m.id().unwrap_or_default().to_string(),
        arn: m.arn().unwrap_or_default().to_string(),
        name: m.name().unwrap_or_default().to_string(),
        state: m.state().map(|s| s.as_str().to_string()).unwrap_or_default(),
        availability_zones: m.availability_zones().to_vec(),
        settings: m.multiplex_settings().map(settings),
        tags: tags(m.tags()),
    }
}

fn missing_multiplex(operation: &str) -> AwsError {
    AwsError::Sdk(format!("{operation} returned no multiplex"))
}

#[async_trait]
impl MediaLiveApi for SdkMediaLive {
    async fn create_multiplex(&self, input: &CreateMultiplexInput) -> Result<Multiplex> {
        let tags: HashMap<String, String> = input.tags.clone().into_iter().collect();
        let output = self
            .client
            .create_multiplex()
            .name(&input.name)
            .set_availability_zones(Some(input.availability_zones.clone()))
            .multiplex_settings(sdk_settings(&input.settings)?)
            .request_id(&input.request_id)
            .set_tags((!tags.is_empty()).then_some(tags))
            .send()
            .await
            .map_err(from_sdk)?;
        output
            .multiplex()
            .map(multiplex)
            .ok_or_else(|| missing_multiplex("CreateMultiplex"))
    }

    async fn describe_multiplex(&self, id: &str) -> Result<Multiplex> {
        let out = self
            .client
            .describe_multiplex()
            .multiplex_id(id)
            .send()
            .await
            .map_err(from_sdk)?;
        Ok(Multiplex {
            id: out.id().unwrap_or(id).to_string(),
            arn: out.arn().unwrap_or_default().to_string(),
            name: out.name().unwrap_or_default().to_string(),
            state: out.state().map(|s| s.as_str().to_string()).unwrap_or_default(),
            availability_zones: out.availability_zones().to_vec(),
            settings: out.multiplex_settings().map(settings),
            tags: tags(out.tags()),
        })
    }

    async fn update_multiplex(&self, input: &UpdateMultiplexInput) -> Result<Multiplex> {
        let mut request = self.client.update_multiplex().multiplex_id(&input.id);
        if let Some(name) = &input.name {
            request = request.name(name);
        }
        if let Some(s) = &input.settings {
            request = request.multiplex_settings(sdk_settings(s)?);
        }
        let output = request.send().await.map_err(from_sdk)?;
        output
            .multiplex()
            .map(multiplex)
            .ok_or_else(|| missing_multiplex("UpdateMultiplex"))
    }

    async fn delete_multiplex(&self, id: &str) -> Result<()> {
        self.client
            .delete_multiplex()
            .multiplex_id(id)
            .send()
            .await
            .map_err(from_sdk)?;
        Ok(())
    }

    async fn start_multiplex(&self, id: &str) -> Result<()> {
        self.client
            .start_multiplex()
            .multiplex_id(id)
            .send()
            .await
            .map_err(from_sdk)?;
        Ok(())
    }

    async fn stop_multiplex(&self, id: &str) -> Result<()> {
        self.client
            .stop_multiplex()
            .multiplex_id(id)
            .send()
            .await
            .map_err(from_sdk)?;
        Ok(())
    }

    async fn tag_resource(&self, arn: &str, tags: &Tags) -> Result<()> {
        self.client
            .create_tags()
            .resource_arn(arn)
            .set_tags(Some(tags.clone().into_iter().collect()))
            .send()
            .await
            .map_err(from_sdk)?;
        Ok(())
    }

    async fn untag_resource(&self, arn: &str, keys: &[String]) -> Result<()> {
        self.client
            .delete_tags()
            .resource_arn(arn)
            .set_tag_keys(Some(keys.to_vec()))
            .send()
            .await
            .map_err(from_sdk)?;
        Ok(())
    }
}
