//! `ScriptedAction`: a step body whose behaviour is read from its properties.
//!
//! Used for dry runs of a plan and for exercising chains end to end without
//! touching real shards. Recognised properties:
//!
//! ```yaml
//! steps: 3            # number of step calls until success (default 1)
//! fail_at: 1          # zero-based step that fails instead
//! message: "..."      # failure message
//! step_delay_ms: 10   # sleep inside every step
//! pre:  { description: {type: noop}, properties: {} }
//! post: { description: {type: noop}, properties: {} }
//! ```
//!
//! `pre` and `post` are requested on the first step. A step that requests a
//! pre-action always reports `Unfinished`, so the worker parks this action
//! and runs the pre-action first.

use serde::Deserialize;
use std::time::Duration;

use crate::action::{ActionBody, ActionResult, ResultCode, StepContext, StepOutcome};
use crate::description::ActionDescription;
use crate::error::{MaintenanceError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct ChainRequest {
    pub description: ActionDescription,
    #[serde(default)]
    pub properties: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct Script {
    #[serde(default = "default_steps")]
    steps: u32,
    #[serde(default)]
    fail_at: Option<u32>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    step_delay_ms: u64,
    #[serde(default)]
    pre: Option<ChainRequest>,
    #[serde(default)]
    post: Option<ChainRequest>,
}

fn default_steps() -> u32 {
    1
}

pub struct ScriptedAction {
    script: Script,
    step: u32,
}

impl ScriptedAction {
    pub fn from_properties(
        _description: &ActionDescription,
        properties: &serde_json::Value,
    ) -> Result<Box<dyn ActionBody>> {
        let script: Script = if properties.is_null() {
            serde_json::from_value(serde_json::json!({}))?
        } else {
            serde_json::from_value(properties.clone())
                .map_err(|e| MaintenanceError::InvalidProperties(e.to_string()))?
        };
        if script.steps == 0 {
            return Err(MaintenanceError::InvalidProperties(
                "steps must be at least 1".into(),
            ));
        }
        Ok(Box::new(ScriptedAction { script, step: 0 }))
    }

    fn run_step(&mut self, ctx: &mut StepContext<'_>) -> StepOutcome {
        if self.script.step_delay_ms > 0 {
            std::thread::sleep(Duration::from_millis(self.script.step_delay_ms));
        }

        let mut parked = false;
        if self.step == 0 {
            if let Some(post) = self.script.post.clone() {
                ctx.create_post_action(post.description, post.properties);
            }
            if let Some(pre) = self.script.pre.clone() {
                parked = ctx.create_pre_action(pre.description, pre.properties);
            }
        }

        let step = self.step;
        self.step += 1;

        if self.script.fail_at == Some(step) {
            let message = self
                .script
                .message
                .clone()
                .unwrap_or_else(|| format!("scripted failure at step {step}"));
            return StepOutcome::Finished(ActionResult::error(ResultCode::FAILED, message));
        }
        if parked || self.step < self.script.steps {
            StepOutcome::Unfinished
        } else {
            StepOutcome::done()
        }
    }
}

impl ActionBody for ScriptedAction {
    fn first(&mut self, ctx: &mut StepContext<'_>) -> StepOutcome {
        self.step = 0;
        self.run_step(ctx)
    }

    fn next(&mut self, ctx: &mut StepContext<'_>) -> StepOutcome {
        self.run_step(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::testing::{desc, FakeRegistry};
    use serde_json::json;

    fn scripted(reg: &FakeRegistry, props: serde_json::Value) -> crate::action::ActionHandle {
        let body = ScriptedAction::from_properties(&desc("scripted"), &props).unwrap();
        Action::new(reg, desc("scripted"), props, body)
    }

    #[test]
    fn counts_down_steps() {
        let reg = FakeRegistry::new();
        let a = scripted(&reg, json!({"steps": 3}));
        assert!(a.first(&reg).is_unfinished());
        assert!(a.next(&reg).is_unfinished());
        assert_eq!(a.next(&reg), StepOutcome::done());
    }

    #[test]
    fn null_properties_mean_single_step() {
        let reg = FakeRegistry::new();
        let a = scripted(&reg, serde_json::Value::Null);
        assert_eq!(a.first(&reg), StepOutcome::done());
    }

    #[test]
    fn fails_at_requested_step() {
        let reg = FakeRegistry::new();
        let a = scripted(&reg, json!({"steps": 5, "fail_at": 1, "message": "shard gone"}));
        assert!(a.first(&reg).is_unfinished());
        assert_eq!(a.next(&reg), StepOutcome::fail("shard gone"));
        assert_eq!(a.result().message, "shard gone");
    }

    #[test]
    fn pre_request_forces_unfinished() {
        let reg = FakeRegistry::new();
        reg.allow("noop");
        let a = scripted(&reg, json!({"pre": {"description": {"type": "noop"}}}));
        assert!(a.first(&reg).is_unfinished());
        assert!(a.pre_action().is_some());
        assert_eq!(a.next(&reg), StepOutcome::done());
    }

    #[test]
    fn invalid_properties_are_rejected() {
        let d = desc("scripted");
        assert!(ScriptedAction::from_properties(&d, &json!({"steps": 0})).is_err());
        assert!(ScriptedAction::from_properties(&d, &json!({"steps": "many"})).is_err());
        assert!(ScriptedAction::from_properties(&d, &json!({"bogus": 1})).is_err());
    }
}
