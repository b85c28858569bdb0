//! In-crate fakes shared by the unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::action::{Action, ActionBody, ActionHandle, StepContext, StepOutcome};
use crate::description::{ActionDescription, TYPE};
use crate::registry::Registry;
use crate::shutdown::ShutdownToken;

pub fn desc(action_type: &str) -> ActionDescription {
    ActionDescription::new([(TYPE, action_type)])
}

type StepFn = dyn FnMut(u32, &mut StepContext<'_>) -> StepOutcome + Send;

/// Body driven by a closure that receives the zero-based step number.
pub struct FnBody {
    step: u32,
    f: Box<StepFn>,
}

impl FnBody {
    pub fn boxed<F>(f: F) -> Box<dyn ActionBody>
    where
        F: FnMut(u32, &mut StepContext<'_>) -> StepOutcome + Send + 'static,
    {
        Box::new(FnBody {
            step: 0,
            f: Box::new(f),
        })
    }
}

impl ActionBody for FnBody {
    fn first(&mut self, ctx: &mut StepContext<'_>) -> StepOutcome {
        self.step = 0;
        (self.f)(0, ctx)
    }

    fn next(&mut self, ctx: &mut StepContext<'_>) -> StepOutcome {
        self.step += 1;
        (self.f)(self.step, ctx)
    }
}

type BodyFactory = Box<dyn Fn() -> Box<dyn ActionBody> + Send + Sync>;

/// Registry with a hand-fed ready queue and per-type chained-action bodies.
pub struct FakeRegistry {
    next_id: AtomicU64,
    block_window: Duration,
    ready: Mutex<VecDeque<ActionHandle>>,
    bodies: Mutex<HashMap<String, BodyFactory>>,
    pub created: Mutex<Vec<ActionHandle>>,
    pub shutdown: ShutdownToken,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::with_block_window(Duration::from_secs(2))
    }

    pub fn with_block_window(block_window: Duration) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            block_window,
            ready: Mutex::new(VecDeque::new()),
            bodies: Mutex::new(HashMap::new()),
            created: Mutex::new(Vec::new()),
            shutdown: ShutdownToken::new(),
        }
    }

    /// Accept chained actions of `action_type`; they complete in one step.
    pub fn allow(&self, action_type: &str) {
        self.on(action_type, || FnBody::boxed(|_, _| StepOutcome::done()));
    }

    pub fn on<F>(&self, action_type: &str, make: F)
    where
        F: Fn() -> Box<dyn ActionBody> + Send + Sync + 'static,
    {
        self.bodies
            .lock()
            .unwrap()
            .insert(action_type.to_string(), Box::new(make));
    }

    pub fn push_ready(&self, action: ActionHandle) {
        self.ready.lock().unwrap().push_back(action);
    }

    pub fn created_of(&self, action_type: &str) -> Vec<ActionHandle> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.description().action_type() == Some(action_type))
            .cloned()
            .collect()
    }
}

impl Registry for FakeRegistry {
    fn next_action_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn find_ready_action(&self) -> Option<ActionHandle> {
        let action = self.ready.lock().unwrap().pop_front()?;
        action.set_state(crate::action::ActionState::Executing);
        Some(action)
    }

    fn pre_action(
        &self,
        description: ActionDescription,
        properties: serde_json::Value,
    ) -> Option<ActionHandle> {
        let body = {
            let bodies = self.bodies.lock().unwrap();
            let make = bodies.get(description.action_type()?)?;
            make()
        };
        let action = Action::new(self, description, properties, body);
        action.set_state(crate::action::ActionState::Executing);
        self.created.lock().unwrap().push(Arc::clone(&action));
        Some(action)
    }

    fn is_shutting_down(&self) -> bool {
        self.shutdown.is_triggered()
    }

    fn block_window(&self) -> Duration {
        self.block_window
    }
}
