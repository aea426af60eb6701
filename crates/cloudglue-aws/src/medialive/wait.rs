//! Multiplex lookups and state waiters

use super::api::*;
use cloudglue_provider::{Result, StateWait, wait_for_state};
use std::time::Duration;

/// Describe a multiplex, mapping "not found" and `DELETED` to `None`
pub async fn find_multiplex(conn: &dyn MediaLiveApi, id: &str) -> Result<Option<Multiplex>> {
    match conn.describe_multiplex(id).await {
        Ok(multiplex) if multiplex.state == STATE_DELETED => Ok(None),
        Ok(multiplex) => Ok(Some(multiplex)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e.context(format!("describing MediaLive Multiplex ({id})"))),
    }
}

async fn wait(
    conn: &dyn MediaLiveApi,
    id: &str,
    params: StateWait,
) -> Result<Option<Multiplex>> {
    tracing::debug!(id, operation = %params.operation, "waiting for multiplex state");
    wait_for_state(&params, move || async move {
        Ok(find_multiplex(conn, id).await?.map(|m| {
            let state = m.state.clone();
            (m, state)
        }))
    })
    .await
}

pub async fn multiplex_created(
    conn: &dyn MediaLiveApi,
    id: &str,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<Option<Multiplex>> {
    let params = StateWait::new(
        format!("waiting for MediaLive Multiplex ({id}) create"),
        &[STATE_CREATING],
        &[STATE_IDLE],
    )
    .timeout(timeout)
    .poll_interval(poll_interval);
    wait(conn, id, params).await
}

pub async fn multiplex_running(
    conn: &dyn MediaLiveApi,
    id: &str,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<Option<Multiplex>> {
    let params = StateWait::new(
        format!("waiting for MediaLive Multiplex ({id}) start"),
        &[STATE_IDLE, STATE_STARTING, STATE_RECOVERING],
        &[STATE_RUNNING],
    )
    .timeout(timeout)
    .poll_interval(poll_interval);
    wait(conn, id, params).await
}

pub async fn multiplex_stopped(
    conn: &dyn MediaLiveApi,
    id: &str,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<Option<Multiplex>> {
    let params = StateWait::new(
        format!("waiting for MediaLive Multiplex ({id}) stop"),
        &[STATE_RUNNING, STATE_STOPPING],
        &[STATE_IDLE],
    )
    .timeout(timeout)
    .poll_interval(poll_interval);
    wait(conn, id, params).await
}

pub async fn multiplex_deleted(
    conn: &dyn MediaLiveApi,
    id: &str,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<()> {
    let params = StateWait::new(
        format!("waiting for MediaLive Multiplex ({id}) delete"),
        &[STATE_IDLE, STATE_DELETING],
        &[],
    )
    .timeout(timeout)
    .poll_interval(poll_interval)
    .until_not_found();
    wait(conn, id, params).await.map(|_| ())
}
