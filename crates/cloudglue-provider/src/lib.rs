//! cloudglue provider framework
//!
//! This crate provides the resource lifecycle around the attribute mapper:
//! data source and resource traits, a provider registry, plan/apply, local
//! state management and retry/wait helpers for slow cloud APIs.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  cloudglue CLI                   │
//! │        (read / plan / apply / import ...)        │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               cloudglue-provider                 │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  Provider registry                        │   │
//! │  │  trait DataSource / trait Resource        │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │  Plan/Apply  │  │  State Mgmt  │            │
//! │  └──────────────┘  └──────────────┘            │
//! └───────┬─────────────────────────────────────────┘
//!         │
//! ┌───────▼───────┐
//! │ cloudglue-aws │
//! └───────────────┘
//! ```

pub mod action;
pub mod data;
pub mod error;
pub mod provider;
pub mod retry;
pub mod state;

// Re-exports
pub use action::{Action, ActionResult, ActionType, ApplyResult, Plan, PlanSummary};
pub use data::ResourceData;
pub use error::{ProviderError, Result};
pub use provider::{DataSource, Provider, ReadResult, Resource, Timeouts};
pub use retry::{RetryConfig, StateWait, retry_with_backoff, wait_for_state};
pub use state::{GlobalState, ResourceState, ResourceStatus, StateLock, StateManager};
