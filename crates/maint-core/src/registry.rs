//! The registry boundary and an in-memory implementation of it.
//!
//! Workers only ever talk to the [`Registry`] trait. [`ActionRegistry`] is the
//! in-process table used by the pool and the CLI: it de-duplicates submitted
//! work by identity hash, hands each ready action to exactly one worker, and
//! retains finished actions for reporting until they age out.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;

use crate::action::{Action, ActionHandle, ActionResult, ActionSnapshot, ActionState, ResultCode};
use crate::config::MaintenanceConfig;
use crate::description::ActionDescription;
use crate::error::{MaintenanceError, Result};
use crate::factory::ActionFactory;
use crate::shutdown::ShutdownToken;
use crate::worker::Worker;

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// What the worker loop and actions need from whoever owns the action table.
///
/// Implementations must never hand two in-flight actions with the same
/// identity hash to different workers.
pub trait Registry: Send + Sync {
    /// A fresh id, unique for the life of the process.
    fn next_action_id(&self) -> u64;

    /// Claim one ready action, or `None` if there is nothing to do right now.
    fn find_ready_action(&self) -> Option<ActionHandle>;

    /// Validate and register an action that will run as part of a chain.
    /// `None` means the parameters were rejected.
    fn pre_action(
        &self,
        description: ActionDescription,
        properties: serde_json::Value,
    ) -> Option<ActionHandle>;

    fn is_shutting_down(&self) -> bool;

    /// Cooldown applied by [`Action::done`].
    fn block_window(&self) -> Duration;
}

// ---------------------------------------------------------------------------
// ActionRegistry
// ---------------------------------------------------------------------------

pub struct ActionRegistry {
    config: MaintenanceConfig,
    factory: ActionFactory,
    next_id: AtomicU64,
    actions: Mutex<Vec<ActionHandle>>,
    work_ready: Condvar,
    shutdown: ShutdownToken,
}

impl ActionRegistry {
    pub fn new(config: MaintenanceConfig, factory: ActionFactory) -> Self {
        Self::with_shutdown(config, factory, ShutdownToken::new())
    }

    pub fn with_shutdown(
        config: MaintenanceConfig,
        factory: ActionFactory,
        shutdown: ShutdownToken,
    ) -> Self {
        Self {
            config,
            factory,
            next_id: AtomicU64::new(1),
            actions: Mutex::new(Vec::new()),
            work_ready: Condvar::new(),
            shutdown,
        }
    }

    pub fn config(&self) -> &MaintenanceConfig {
        &self.config
    }

    pub fn shutdown_token(&self) -> ShutdownToken {
        self.shutdown.clone()
    }

    fn table(&self) -> MutexGuard<'_, Vec<ActionHandle>> {
        self.actions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Submit new work. Rejected while an action with the same identity hash
    /// is still running or inside its cooldown window.
    pub fn add_action(
        &self,
        description: ActionDescription,
        properties: serde_json::Value,
    ) -> Result<ActionHandle> {
        let action = self.register(description, properties, ActionState::Ready)?;
        self.work_ready.notify_one();
        Ok(action)
    }

    /// Run one action chain to completion on the calling thread.
    pub fn execute_now(
        &self,
        description: ActionDescription,
        properties: serde_json::Value,
    ) -> Result<ActionHandle> {
        let action = self.register(description, properties, ActionState::Executing)?;
        let mut worker = Worker::direct(self, action.clone());
        worker.run();
        Ok(action)
    }

    fn register(
        &self,
        description: ActionDescription,
        properties: serde_json::Value,
        state: ActionState,
    ) -> Result<ActionHandle> {
        if self.shutdown.is_triggered() {
            return Err(MaintenanceError::ShuttingDown);
        }
        let body = self.factory.create(&description, &properties)?;
        let hash = description.identity_hash();

        let mut actions = self.table();
        self.evict_expired(&mut actions);
        if let Some(existing) = actions.iter().find(|a| a.hash() == hash && !a.done()) {
            tracing::debug!(
                hash = %format!("{hash:016x}"),
                existing_id = existing.id(),
                "duplicate action rejected"
            );
            return Err(MaintenanceError::DuplicateAction {
                hash,
                existing_id: existing.id(),
            });
        }
        let action = Action::new(self, description, properties, body);
        action.set_state(state);
        tracing::info!(
            action_id = action.id(),
            description = %action.description(),
            "action registered"
        );
        actions.push(action.clone());
        Ok(action)
    }

    fn claim_ready(actions: &[ActionHandle]) -> Option<ActionHandle> {
        let candidate = actions.iter().find(|a| {
            a.state() == ActionState::Ready
                && !actions.iter().any(|other| {
                    other.id() != a.id()
                        && other.hash() == a.hash()
                        && !matches!(other.state(), ActionState::Ready)
                        && !other.state().is_terminal()
                })
        })?;
        candidate.set_state(ActionState::Executing);
        Some(candidate.clone())
    }

    pub fn find_action(&self, id: u64) -> Option<ActionHandle> {
        self.table().iter().find(|a| a.id() == id).cloned()
    }

    pub fn snapshots(&self) -> Vec<ActionSnapshot> {
        let mut snaps: Vec<ActionSnapshot> = self.table().iter().map(|a| a.snapshot()).collect();
        snaps.sort_by_key(|s| s.id);
        snaps
    }

    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table().is_empty()
    }

    pub fn all_terminal(&self) -> bool {
        self.table().iter().all(|a| a.state().is_terminal())
    }

    /// Drop finished actions whose cooldown has ended and whose linger
    /// period has passed. Returns how many were removed. Admission and idle
    /// workers run this on their own; calling it directly is only needed to
    /// force a sweep.
    pub fn remove_expired(&self) -> usize {
        let mut actions = self.table();
        self.evict_expired(&mut actions)
    }

    fn evict_expired(&self, actions: &mut Vec<ActionHandle>) -> usize {
        let linger = self.config.linger_window();
        let now = Utc::now();
        let before = actions.len();
        actions.retain(|a| {
            if !a.done_at(now) {
                return true;
            }
            match a.stats().completed_at {
                Some(completed) => (now - completed)
                    .to_std()
                    .map(|elapsed| elapsed < linger)
                    .unwrap_or(true),
                None => false,
            }
        });
        let removed = before - actions.len();
        if removed > 0 {
            tracing::debug!(removed, remaining = actions.len(), "expired actions removed");
        }
        removed
    }

    /// Trip the shutdown token, fail every action still queued, and wake
    /// every idle worker. Chains already claimed are failed by their worker.
    pub fn begin_shutdown(&self) {
        tracing::info!("maintenance shutdown requested");
        self.shutdown.trigger();
        let actions = self.table();
        let mut dropped = 0usize;
        for action in actions.iter().filter(|a| a.state() == ActionState::Ready) {
            action.set_result(ActionResult::error(
                ResultCode::SHUTTING_DOWN,
                "not started before shutdown",
            ));
            action.end_stats();
            action.set_state(ActionState::Failed);
            dropped += 1;
        }
        drop(actions);
        if dropped > 0 {
            tracing::warn!(dropped, "queued actions failed by shutdown");
        }
        self.work_ready.notify_all();
    }
}

impl Registry for ActionRegistry {
    fn next_action_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn find_ready_action(&self) -> Option<ActionHandle> {
        let mut actions = self.table();
        if self.shutdown.is_triggered() {
            return None;
        }
        if let Some(action) = Self::claim_ready(&actions) {
            return Some(action);
        }
        let (guard, _) = self
            .work_ready
            .wait_timeout(actions, self.config.idle_wait())
            .unwrap_or_else(PoisonError::into_inner);
        actions = guard;
        if self.shutdown.is_triggered() {
            return None;
        }
        let claimed = Self::claim_ready(&actions);
        if claimed.is_none() {
            self.evict_expired(&mut actions);
        }
        claimed
    }

    fn pre_action(
        &self,
        description: ActionDescription,
        properties: serde_json::Value,
    ) -> Option<ActionHandle> {
        let body = match self.factory.create(&description, &properties) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(description = %description, error = %e, "chained action rejected");
                return None;
            }
        };
        // Registered as executing: it runs only through its chain, never by
        // being picked up on its own.
        let action = Action::new(self, description, properties, body);
        action.set_state(ActionState::Executing);
        tracing::info!(
            action_id = action.id(),
            description = %action.description(),
            "chained action registered"
        );
        self.table().push(action.clone());
        Some(action)
    }

    fn is_shutting_down(&self) -> bool {
        self.shutdown.is_triggered()
    }

    fn block_window(&self) -> Duration {
        self.config.block_window()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
