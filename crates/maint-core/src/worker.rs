//! The worker loop that drives actions to completion.
//!
//! A worker holds at most one current action. Each loop iteration either
//! looks for work or runs one step of the current action, then
//! [`Worker::next_state`] decides what happens next:
//!
//! ```text
//! FindAction  --found-------------------->  RunFirst
//! RunFirst    --unfinished--------------->  RunNext
//! RunNext     --unfinished--------------->  RunNext
//! any step    --declared a pre-action---->  RunFirst   (on the pre-action)
//! any step    --finished, post is parked->  RunNext    (on the post-action)
//! any step    --finished, post is fresh-->  RunFirst   (on the post-action)
//! any step    --finished, no post-------->  FindAction (Stop when direct)
//! ```
//!
//! On success a linked post-action becomes current. On failure every action
//! reachable through post links is failed with it. A direct worker is bound
//! to one action and goes to `Stop` instead of `FindAction`.

use crate::action::{ActionHandle, ActionResult, ActionState, ResultCode};
use crate::registry::Registry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    FindAction,
    RunFirst,
    RunNext,
    Stop,
}

pub struct Worker<'r> {
    registry: &'r dyn Registry,
    current: Option<ActionHandle>,
    loop_state: LoopState,
    direct: bool,
    last_result: ActionResult,
}

impl<'r> Worker<'r> {
    /// A pool worker: pulls work from the registry until shutdown.
    pub fn new(registry: &'r dyn Registry) -> Self {
        Self {
            registry,
            current: None,
            loop_state: LoopState::FindAction,
            direct: false,
            last_result: ActionResult::ok(),
        }
    }

    /// A worker bound to `action`; it stops once that action's chain resolves.
    pub fn direct(registry: &'r dyn Registry, action: ActionHandle) -> Self {
        if action.state() == ActionState::Ready {
            action.set_state(ActionState::Executing);
        }
        action.start_stats();
        Self {
            registry,
            current: Some(action),
            loop_state: LoopState::RunFirst,
            direct: true,
            last_result: ActionResult::ok(),
        }
    }

    pub fn loop_state(&self) -> LoopState {
        self.loop_state
    }

    pub fn current(&self) -> Option<&ActionHandle> {
        self.current.as_ref()
    }

    /// Result of the last action this worker finished with.
    pub fn last_result(&self) -> &ActionResult {
        &self.last_result
    }

    pub fn is_direct(&self) -> bool {
        self.direct
    }

    fn idle_state(&self) -> LoopState {
        if self.direct {
            LoopState::Stop
        } else {
            LoopState::FindAction
        }
    }

    /// Run until `Stop` or shutdown.
    pub fn run(&mut self) {
        while self.loop_state != LoopState::Stop && !self.registry.is_shutting_down() {
            self.step_loop();
        }
        if let Some(action) = self.current.take() {
            tracing::warn!(
                action_id = action.id(),
                "worker stopped with an unfinished chain, failing it"
            );
            fail_chain(
                &action,
                ActionResult::error(ResultCode::SHUTTING_DOWN, "abandoned during shutdown"),
            );
        }
    }

    /// One loop iteration: acquire or step, then transition.
    pub fn step_loop(&mut self) {
        let more = match (self.loop_state, self.current.clone()) {
            (LoopState::FindAction, _) => {
                self.current = self.registry.find_ready_action();
                self.current.is_some()
            }
            (LoopState::RunFirst, Some(action)) => action.first(self.registry).is_unfinished(),
            (LoopState::RunNext, Some(action)) => action.next(self.registry).is_unfinished(),
            (LoopState::Stop, _) => return,
            (state, None) => {
                tracing::error!(?state, "worker loop state without a current action");
                self.loop_state = LoopState::Stop;
                return;
            }
        };
        self.next_state(more);
    }

    /// The transition function. `more` is whether the last acquisition or
    /// step asked to be called again.
    pub fn next_state(&mut self, more: bool) {
        let more = more
            && !self
                .current
                .as_ref()
                .is_some_and(|action| action.has_failed());

        if more {
            let Some(action) = self.current.clone() else {
                self.loop_state = self.idle_state();
                return;
            };
            if self.loop_state == LoopState::FindAction {
                action.start_stats();
                self.loop_state = LoopState::RunFirst;
            } else {
                action.inc_stats();
                self.loop_state = LoopState::RunNext;
            }

            if let Some(pre) = action.pre_action() {
                tracing::debug!(
                    action_id = action.id(),
                    pre_action_id = pre.id(),
                    "parking action behind pre-action"
                );
                action.set_state(ActionState::Waiting);
                pre.set_post_action(Some(action));
                self.current = Some(pre);
                self.loop_state = LoopState::RunFirst;
            }
            return;
        }

        let Some(action) = self.current.take() else {
            self.loop_state = self.idle_state();
            return;
        };
        self.last_result = action.result();
        discard_pending_pre(&action);

        if action.has_failed() {
            tracing::warn!(
                action_id = action.id(),
                code = self.last_result.code.0,
                message = %self.last_result.message,
                "action failed"
            );
            fail_chain(
                &action,
                ActionResult::failed("action failed without a result"),
            );
            self.loop_state = self.idle_state();
            return;
        }

        action.end_stats();
        action.set_state(ActionState::Complete);
        tracing::info!(
            action_id = action.id(),
            progress = action.progress(),
            "action complete"
        );

        match action.post_action() {
            Some(post) => {
                post.clear_pre_action();
                self.loop_state = if post.state() == ActionState::Waiting {
                    LoopState::RunNext
                } else {
                    LoopState::RunFirst
                };
                post.set_state(ActionState::Executing);
                tracing::debug!(
                    action_id = action.id(),
                    post_action_id = post.id(),
                    resume = self.loop_state == LoopState::RunNext,
                    "handing off to post-action"
                );
                self.current = Some(post);
            }
            None => self.loop_state = self.idle_state(),
        }
    }
}

/// Fail `start` and everything reachable from it through post links.
///
/// Members whose result is still ok get an explanatory one: `start` gets
/// `cause`, the rest `UPSTREAM_FAILED`.
fn fail_chain(start: &ActionHandle, cause: ActionResult) {
    let mut next = Some(start.clone());
    while let Some(action) = next {
        if action.result().is_ok() {
            if action.id() == start.id() {
                action.set_result(cause.clone());
            } else {
                action.set_result(ActionResult::error(
                    ResultCode::UPSTREAM_FAILED,
                    format!("upstream action {} failed", start.id()),
                ));
            }
        }
        mark_failed(&action);
        next = action.post_action();
    }
}

/// A pre-action requested on the very step that finished its requester never
/// runs; fail it so it does not sit executing in the registry.
fn discard_pending_pre(action: &ActionHandle) {
    let Some(pre) = action.pre_action() else {
        return;
    };
    tracing::warn!(
        action_id = action.id(),
        pre_action_id = pre.id(),
        "discarding pre-action requested on a finishing step"
    );
    pre.set_result(ActionResult::error(
        ResultCode::UPSTREAM_FAILED,
        format!("requesting action {} finished before it ran", action.id()),
    ));
    mark_failed(&pre);
    action.clear_pre_action();
}

/// Move to `Failed`, stamping completion only on the first time through.
fn mark_failed(action: &ActionHandle) {
    let stamped = action.state() == ActionState::Failed && action.stats().completed_at.is_some();
    if action.set_state(ActionState::Failed) && !stamped {
        action.end_stats();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
