//! Maintenance actions.
//!
//! An `Action` is one resumable unit of reconciliation work. The worker drives
//! it by calling [`Action::first`] once and [`Action::next`] until the body
//! stops answering [`StepOutcome::Unfinished`]. While executing, a body may
//! link a pre-action (must finish before this action resumes) or a
//! post-action (starts only after this action completes successfully).
//!
//! Actions are shared through [`ActionHandle`] (`Arc<Action>`): the registry
//! keeps one for reporting and cooldown, the owning worker keeps one as its
//! current action, and chain neighbours keep one through their pre/post links.
//! Only the worker that currently owns the chain mutates state, result, links
//! and statistics; the internal mutex exists so that reporting can read a
//! consistent snapshot at any time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::description::ActionDescription;
use crate::registry::Registry;

pub type ActionHandle = Arc<Action>;

// ---------------------------------------------------------------------------
// ActionState
// ---------------------------------------------------------------------------

/// Lifecycle state of an action.
///
/// Transitions: `Ready → Executing → (Waiting ↔ Executing)* → Complete | Failed`
///
/// `WaitingPre` and `WaitingPost` only record that a chain link was requested
/// during a step; they are kept for reporting. The worker never branches on
/// them. The one state that means "parked behind a chain dependency" is
/// `Waiting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionState {
    Ready,
    Executing,
    Waiting,
    WaitingPre,
    WaitingPost,
    Complete,
    Failed,
}

impl ActionState {
    pub fn code(self) -> u8 {
        match self {
            ActionState::Ready => 1,
            ActionState::Executing => 2,
            ActionState::Waiting => 3,
            ActionState::WaitingPre => 4,
            ActionState::WaitingPost => 5,
            ActionState::Complete => 6,
            ActionState::Failed => 7,
        }
    }

    pub fn from_code(code: u8) -> Option<ActionState> {
        match code {
            1 => Some(ActionState::Ready),
            2 => Some(ActionState::Executing),
            3 => Some(ActionState::Waiting),
            4 => Some(ActionState::WaitingPre),
            5 => Some(ActionState::WaitingPost),
            6 => Some(ActionState::Complete),
            7 => Some(ActionState::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ActionState::Complete | ActionState::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionState::Ready => "ready",
            ActionState::Executing => "executing",
            ActionState::Waiting => "waiting",
            ActionState::WaitingPre => "waiting_pre",
            ActionState::WaitingPost => "waiting_post",
            ActionState::Complete => "complete",
            ActionState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ActionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ActionResult
// ---------------------------------------------------------------------------

/// Integer result code reported to operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultCode(pub i32);

impl ResultCode {
    pub const OK: ResultCode = ResultCode(0);
    pub const FAILED: ResultCode = ResultCode(1);
    pub const INTERNAL: ResultCode = ResultCode(4);
    pub const BAD_PARAMETER: ResultCode = ResultCode(10);
    pub const SHUTTING_DOWN: ResultCode = ResultCode(30);
    /// Set on chain members that were failed because an upstream action failed.
    pub const UPSTREAM_FAILED: ResultCode = ResultCode(1496);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub code: ResultCode,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl ActionResult {
    pub fn ok() -> Self {
        Self {
            code: ResultCode::OK,
            message: String::new(),
        }
    }

    pub fn error(code: ResultCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::error(ResultCode::FAILED, message)
    }

    pub fn is_ok(&self) -> bool {
        self.code == ResultCode::OK
    }
}

impl Default for ActionResult {
    fn default() -> Self {
        Self::ok()
    }
}

// ---------------------------------------------------------------------------
// Step interface
// ---------------------------------------------------------------------------

/// What a single step reports back to the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// More work remains: call `next` again on a later loop iteration.
    Unfinished,
    /// This invocation reached an outcome. A non-ok result becomes the
    /// action's terminal result.
    Finished(ActionResult),
}

impl StepOutcome {
    pub fn done() -> Self {
        StepOutcome::Finished(ActionResult::ok())
    }

    pub fn fail(message: impl Into<String>) -> Self {
        StepOutcome::Finished(ActionResult::failed(message))
    }

    pub fn is_unfinished(&self) -> bool {
        matches!(self, StepOutcome::Unfinished)
    }
}

/// The business logic of an action, written as a caller-driven coroutine.
///
/// Progress between calls lives in the implementing type; the worker only
/// looks at the returned outcome and at the action's state and result.
pub trait ActionBody: Send {
    fn first(&mut self, ctx: &mut StepContext<'_>) -> StepOutcome;

    fn next(&mut self, _ctx: &mut StepContext<'_>) -> StepOutcome {
        StepOutcome::done()
    }
}

/// Handle given to a body for the duration of one step.
pub struct StepContext<'a> {
    action: &'a Action,
    registry: &'a dyn Registry,
}

impl<'a> StepContext<'a> {
    pub fn action_id(&self) -> u64 {
        self.action.id
    }

    pub fn description(&self) -> &ActionDescription {
        &self.action.description
    }

    pub fn properties(&self) -> &serde_json::Value {
        &self.action.properties
    }

    /// Ask for work that must finish before this action continues.
    /// Returns false if the registry rejected the parameters or a pre-action
    /// is already pending, in which case this action's result is now a
    /// parameter error.
    pub fn create_pre_action(
        &mut self,
        description: ActionDescription,
        properties: serde_json::Value,
    ) -> bool {
        self.action
            .create_pre_action(self.registry, description, properties)
    }

    /// Ask for work to start once this action completes successfully.
    pub fn create_post_action(
        &mut self,
        description: ActionDescription,
        properties: serde_json::Value,
    ) -> bool {
        self.action
            .create_post_action(self.registry, description, properties)
    }

    pub fn set_result(&mut self, result: ActionResult) {
        self.action.set_result(result);
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionStats {
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub last_step_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub progress: u64,
}

impl ActionStats {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            started_at: None,
            last_step_at: None,
            completed_at: None,
            progress: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Point-in-time status report of one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSnapshot {
    pub id: u64,
    pub state: u8,
    pub progress: u64,
    pub result: i32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    pub hash: String,
    pub description: BTreeMap<String, String>,
    pub created: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_step: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

struct ActionInner {
    state: ActionState,
    result: ActionResult,
    pre_action: Option<ActionHandle>,
    post_action: Option<ActionHandle>,
    stats: ActionStats,
}

pub struct Action {
    id: u64,
    hash: u64,
    description: ActionDescription,
    properties: serde_json::Value,
    block_window: Duration,
    inner: Mutex<ActionInner>,
    body: Mutex<Box<dyn ActionBody>>,
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner();
        f.debug_struct("Action")
            .field("id", &self.id)
            .field("hash", &format_args!("{:016x}", self.hash))
            .field("description", &self.description)
            .field("state", &inner.state)
            .field("result", &inner.result)
            .field("pre_action", &inner.pre_action.as_ref().map(|a| a.id))
            .field("post_action", &inner.post_action.as_ref().map(|a| a.id))
            .finish()
    }
}

impl Action {
    /// Construct a `Ready` action. The id comes from the registry, as does the
    /// cooldown window used by [`Action::done`].
    pub fn new(
        registry: &dyn Registry,
        description: ActionDescription,
        properties: serde_json::Value,
        body: Box<dyn ActionBody>,
    ) -> ActionHandle {
        let hash = description.identity_hash();
        Arc::new(Self {
            id: registry.next_action_id(),
            hash,
            description,
            properties,
            block_window: registry.block_window(),
            inner: Mutex::new(ActionInner {
                state: ActionState::Ready,
                result: ActionResult::ok(),
                pre_action: None,
                post_action: None,
                stats: ActionStats::new(Utc::now()),
            }),
            body: Mutex::new(body),
        })
    }

    fn inner(&self) -> MutexGuard<'_, ActionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }

    pub fn description(&self) -> &ActionDescription {
        &self.description
    }

    pub fn properties(&self) -> &serde_json::Value {
        &self.properties
    }

    // -----------------------------------------------------------------------
    // Stepping
    // -----------------------------------------------------------------------

    pub fn first(&self, registry: &dyn Registry) -> StepOutcome {
        self.step(registry, true)
    }

    pub fn next(&self, registry: &dyn Registry) -> StepOutcome {
        self.step(registry, false)
    }

    fn step(&self, registry: &dyn Registry, first: bool) -> StepOutcome {
        let outcome = {
            let mut body = self.body.lock().unwrap_or_else(PoisonError::into_inner);
            let mut ctx = StepContext {
                action: self,
                registry,
            };
            if first {
                body.first(&mut ctx)
            } else {
                body.next(&mut ctx)
            }
        };
        if let StepOutcome::Finished(result) = &outcome {
            if !result.is_ok() {
                self.set_result(result.clone());
            }
        }
        outcome
    }

    // -----------------------------------------------------------------------
    // State and result
    // -----------------------------------------------------------------------

    pub fn state(&self) -> ActionState {
        self.inner().state
    }

    /// Move to `state`. Terminal states are sticky: leaving `Complete` or
    /// `Failed` is refused and reported as false.
    pub fn set_state(&self, state: ActionState) -> bool {
        let mut inner = self.inner();
        if inner.state.is_terminal() && inner.state != state {
            tracing::warn!(
                action_id = self.id,
                from = %inner.state,
                to = %state,
                "refusing to leave terminal action state"
            );
            return false;
        }
        inner.state = state;
        true
    }

    pub fn result(&self) -> ActionResult {
        self.inner().result.clone()
    }

    pub fn set_result(&self, result: ActionResult) {
        self.inner().result = result;
    }

    /// True when the action failed or reported a non-ok result.
    pub fn has_failed(&self) -> bool {
        let inner = self.inner();
        inner.state == ActionState::Failed || !inner.result.is_ok()
    }

    // -----------------------------------------------------------------------
    // Chain links
    // -----------------------------------------------------------------------

    pub fn pre_action(&self) -> Option<ActionHandle> {
        self.inner().pre_action.clone()
    }

    pub fn post_action(&self) -> Option<ActionHandle> {
        self.inner().post_action.clone()
    }

    pub fn set_post_action(&self, post: Option<ActionHandle>) {
        self.inner().post_action = post;
    }

    pub fn clear_pre_action(&self) {
        self.inner().pre_action = None;
    }

    fn create_pre_action(
        &self,
        registry: &dyn Registry,
        description: ActionDescription,
        properties: serde_json::Value,
    ) -> bool {
        if let Some(pending) = self.pre_action() {
            tracing::warn!(
                action_id = self.id,
                pre_action_id = pending.id,
                "second pre-action requested before the first ran"
            );
            self.set_result(ActionResult::error(
                ResultCode::BAD_PARAMETER,
                format!("pre-action {} already pending", pending.id),
            ));
            return false;
        }
        match registry.pre_action(description, properties) {
            Some(pre) => {
                tracing::debug!(action_id = self.id, pre_action_id = pre.id, "pre-action linked");
                let mut inner = self.inner();
                inner.pre_action = Some(pre);
                if !inner.state.is_terminal() {
                    inner.state = ActionState::WaitingPre;
                }
                true
            }
            None => {
                tracing::warn!(action_id = self.id, "pre-action rejected parameters");
                self.set_result(ActionResult::error(
                    ResultCode::BAD_PARAMETER,
                    "pre-action rejected parameters",
                ));
                false
            }
        }
    }

    fn create_post_action(
        &self,
        registry: &dyn Registry,
        description: ActionDescription,
        properties: serde_json::Value,
    ) -> bool {
        let Some(post) = registry.pre_action(description, properties) else {
            tracing::warn!(action_id = self.id, "post-action rejected parameters");
            self.set_result(ActionResult::error(
                ResultCode::BAD_PARAMETER,
                "post-action rejected parameters",
            ));
            return false;
        };
        tracing::debug!(action_id = self.id, post_action_id = post.id, "post-action linked");

        // An action already followed by something (typically the parent that
        // is waiting on it) keeps that follower after the new post-action.
        let existing = self.inner().post_action.take();
        if existing.is_some() {
            post.set_post_action(existing);
        }
        let mut inner = self.inner();
        inner.post_action = Some(post);
        if !inner.state.is_terminal() {
            inner.state = ActionState::WaitingPost;
        }
        true
    }

    // -----------------------------------------------------------------------
    // Statistics
    // -----------------------------------------------------------------------

    pub fn start_stats(&self) {
        self.inner().stats.started_at = Some(Utc::now());
    }

    pub fn inc_stats(&self) {
        let mut inner = self.inner();
        inner.stats.progress += 1;
        inner.stats.last_step_at = Some(Utc::now());
    }

    pub fn end_stats(&self) {
        self.inner().stats.completed_at = Some(Utc::now());
    }

    pub fn stats(&self) -> ActionStats {
        self.inner().stats.clone()
    }

    pub fn progress(&self) -> u64 {
        self.inner().stats.progress
    }

    // -----------------------------------------------------------------------
    // Completion gating
    // -----------------------------------------------------------------------

    pub fn block_window(&self) -> Duration {
        self.block_window
    }

    /// Terminal, and the block window has passed since completion.
    pub fn done(&self) -> bool {
        self.done_at(Utc::now())
    }

    pub fn done_at(&self, now: DateTime<Utc>) -> bool {
        let inner = self.inner();
        if !inner.state.is_terminal() {
            return false;
        }
        match inner.stats.completed_at {
            Some(completed) => (now - completed)
                .to_std()
                .map(|elapsed| elapsed >= self.block_window)
                .unwrap_or(false),
            None => true,
        }
    }

    // -----------------------------------------------------------------------
    // Reporting
    // -----------------------------------------------------------------------

    pub fn snapshot(&self) -> ActionSnapshot {
        let inner = self.inner();
        ActionSnapshot {
            id: self.id,
            state: inner.state.code(),
            progress: inner.stats.progress,
            result: inner.result.code.0,
            message: inner.result.message.clone(),
            hash: format!("{:016x}", self.hash),
            description: self.description.to_map(),
            created: inner.stats.created_at,
            started: inner.stats.started_at,
            last_step: inner.stats.last_step_at,
            done: inner.stats.completed_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::{COLLECTION, DATABASE, TYPE};
    use crate::testing::{desc, FakeRegistry, FnBody};
    use chrono::Duration as CDur;
    use serde_json::json;

    fn noop(registry: &FakeRegistry, ty: &str) -> ActionHandle {
        Action::new(
            registry,
            desc(ty),
            json!({}),
            FnBody::boxed(|_, _| StepOutcome::done()),
        )
    }

    #[test]
    fn state_codes_round_trip() {
        for state in [
            ActionState::Ready,
            ActionState::Executing,
            ActionState::Waiting,
            ActionState::WaitingPre,
            ActionState::WaitingPost,
            ActionState::Complete,
            ActionState::Failed,
        ] {
            assert_eq!(ActionState::from_code(state.code()), Some(state));
        }
        assert_eq!(ActionState::from_code(0), None);
    }

    #[test]
    fn ids_are_assigned_by_registry_and_increase() {
        let reg = FakeRegistry::new();
        let a = noop(&reg, "a");
        let b = noop(&reg, "b");
        assert!(b.id() > a.id());
        assert_eq!(a.hash(), desc("a").identity_hash());
        assert_eq!(a.state(), ActionState::Ready);
        assert!(a.result().is_ok());
    }

    #[test]
    fn failed_step_records_result() {
        let reg = FakeRegistry::new();
        let a = Action::new(
            &reg,
            desc("x"),
            json!({}),
            FnBody::boxed(|_, _| StepOutcome::fail("disk full")),
        );
        assert_eq!(a.first(&reg), StepOutcome::fail("disk full"));
        assert_eq!(a.result().code, ResultCode::FAILED);
        assert_eq!(a.result().message, "disk full");
        assert!(a.has_failed());
    }

    #[test]
    fn ok_step_does_not_clear_earlier_error() {
        let reg = FakeRegistry::new();
        let a = Action::new(
            &reg,
            desc("x"),
            json!({}),
            FnBody::boxed(|_, ctx| {
                ctx.set_result(ActionResult::error(ResultCode::INTERNAL, "boom"));
                StepOutcome::done()
            }),
        );
        a.first(&reg);
        assert_eq!(a.result().code, ResultCode::INTERNAL);
    }

    #[test]
    fn pre_action_request_sets_marker_and_link() {
        let reg = FakeRegistry::new();
        reg.allow("child");
        let a = Action::new(
            &reg,
            desc("parent"),
            json!({}),
            FnBody::boxed(|_, ctx| {
                assert!(ctx.create_pre_action(desc("child"), json!({})));
                StepOutcome::Unfinished
            }),
        );
        a.set_state(ActionState::Executing);
        assert!(a.first(&reg).is_unfinished());
        assert_eq!(a.state(), ActionState::WaitingPre);
        let pre = a.pre_action().expect("pre-action linked");
        assert_eq!(pre.description().action_type(), Some("child"));
        assert!(a.result().is_ok());
    }

    #[test]
    fn rejected_pre_action_sets_bad_parameter_and_keeps_state() {
        let reg = FakeRegistry::new();
        let a = Action::new(
            &reg,
            desc("parent"),
            json!({}),
            FnBody::boxed(|_, ctx| {
                assert!(!ctx.create_pre_action(desc("unknown"), json!({})));
                StepOutcome::Unfinished
            }),
        );
        a.set_state(ActionState::Executing);
        a.first(&reg);
        assert_eq!(a.state(), ActionState::Executing);
        assert!(a.pre_action().is_none());
        assert_eq!(a.result().code, ResultCode::BAD_PARAMETER);
    }

    #[test]
    fn rejected_post_action_sets_bad_parameter() {
        let reg = FakeRegistry::new();
        let a = Action::new(
            &reg,
            desc("parent"),
            json!({}),
            FnBody::boxed(|_, ctx| {
                ctx.create_post_action(desc("unknown"), json!({}));
                StepOutcome::done()
            }),
        );
        a.first(&reg);
        assert!(a.post_action().is_none());
        assert_eq!(a.result().code, ResultCode::BAD_PARAMETER);
    }

    #[test]
    fn post_action_is_spliced_before_existing_follower() {
        let reg = FakeRegistry::new();
        reg.allow("follow");
        let parent = noop(&reg, "parent");
        let a = Action::new(
            &reg,
            desc("pre"),
            json!({}),
            FnBody::boxed(|_, ctx| {
                ctx.create_post_action(desc("follow"), json!({}));
                StepOutcome::done()
            }),
        );
        a.set_post_action(Some(parent.clone()));
        a.first(&reg);

        let follow = a.post_action().expect("post linked");
        assert_eq!(follow.description().action_type(), Some("follow"));
        let after = follow.post_action().expect("parent kept");
        assert_eq!(after.id(), parent.id());
        assert_eq!(a.state(), ActionState::WaitingPost);
    }

    #[test]
    fn terminal_states_are_sticky() {
        let reg = FakeRegistry::new();
        let a = noop(&reg, "x");
        assert!(a.set_state(ActionState::Executing));
        assert!(a.set_state(ActionState::Complete));
        assert!(!a.set_state(ActionState::Executing));
        assert!(!a.set_state(ActionState::Failed));
        assert!(a.set_state(ActionState::Complete));
        assert_eq!(a.state(), ActionState::Complete);
    }

    #[test]
    fn stats_track_start_steps_and_end() {
        let reg = FakeRegistry::new();
        let a = noop(&reg, "x");
        assert!(a.stats().started_at.is_none());
        a.start_stats();
        a.inc_stats();
        a.inc_stats();
        let s = a.stats();
        assert!(s.started_at.is_some());
        assert!(s.last_step_at.is_some());
        assert_eq!(s.progress, 2);
        assert!(s.completed_at.is_none());
        a.end_stats();
        assert!(a.stats().completed_at.is_some());
    }

    #[test]
    fn done_waits_for_block_window_on_complete() {
        let reg = FakeRegistry::with_block_window(Duration::from_secs(5));
        let a = noop(&reg, "x");
        assert!(!a.done());
        a.end_stats();
        a.set_state(ActionState::Complete);
        let finished = a.stats().completed_at.unwrap();
        assert!(!a.done_at(finished));
        assert!(!a.done_at(finished + CDur::seconds(4)));
        assert!(a.done_at(finished + CDur::seconds(5)));
    }

    #[test]
    fn done_waits_for_block_window_on_failed() {
        let reg = FakeRegistry::with_block_window(Duration::from_millis(200));
        let a = noop(&reg, "x");
        a.end_stats();
        a.set_state(ActionState::Failed);
        assert!(!a.done());
        std::thread::sleep(Duration::from_millis(250));
        assert!(a.done());
    }

    #[test]
    fn done_is_false_for_non_terminal_even_after_window() {
        let reg = FakeRegistry::with_block_window(Duration::ZERO);
        let a = noop(&reg, "x");
        a.end_stats();
        a.set_state(ActionState::Waiting);
        assert!(!a.done_at(Utc::now() + CDur::hours(1)));
    }

    #[test]
    fn snapshot_contains_full_description() {
        let reg = FakeRegistry::new();
        let d = ActionDescription::new([
            (TYPE, "CreateCollection"),
            (DATABASE, "_system"),
            (COLLECTION, "orders"),
        ]);
        let a = Action::new(
            &reg,
            d,
            json!({"waitForSync": true}),
            FnBody::boxed(|_, _| StepOutcome::done()),
        );
        a.inc_stats();
        a.set_result(ActionResult::error(ResultCode::BAD_PARAMETER, "nope"));

        let snap = a.snapshot();
        assert_eq!(snap.id, a.id());
        assert_eq!(snap.state, ActionState::Ready.code());
        assert_eq!(snap.progress, 1);
        assert_eq!(snap.result, 10);

        let v = serde_json::to_value(&snap).unwrap();
        assert_eq!(v["description"]["type"], "CreateCollection");
        assert_eq!(v["description"]["database"], "_system");
        assert_eq!(v["description"]["collection"], "orders");
        assert_eq!(v["description"].as_object().unwrap().len(), 3);
        assert_eq!(v["message"], "nope");
        assert!(v.get("done").is_none());
    }
}
