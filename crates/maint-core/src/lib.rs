//! Reconciliation-action scheduling for cluster maintenance.
//!
//! Maintenance converges the actual shard, collection and index state of a
//! server towards a desired plan by running discrete, resumable actions.
//!
//! ```text
//! ActionRegistry  ── find_ready_action ──▶  Worker  ── first / next ──▶  Action
//!   (dedup, cooldown)                       (loop + transition)        (ActionBody)
//!          ▲                                                               │
//!          └────────────── pre_action (chain links) ───────────────────────┘
//! ```
//!
//! - `action`: the action entity, its step interface and statistics.
//! - `worker`: the driver loop and transition function.
//! - `registry`: the registry boundary plus an in-memory registry.
//! - `pool`: threads running pool workers.

pub mod action;
pub mod config;
pub mod description;
pub mod error;
pub mod factory;
pub mod pool;
pub mod registry;
pub mod scripted;
pub mod shutdown;
pub mod worker;

#[cfg(test)]
mod testing;

pub use action::{
    Action, ActionBody, ActionHandle, ActionResult, ActionSnapshot, ActionState, ActionStats,
    ResultCode, StepContext, StepOutcome,
};
pub use config::MaintenanceConfig;
pub use description::ActionDescription;
pub use error::{MaintenanceError, Result};
pub use factory::ActionFactory;
pub use pool::WorkerPool;
pub use registry::{ActionRegistry, Registry};
pub use shutdown::ShutdownToken;
pub use worker::{LoopState, Worker};
