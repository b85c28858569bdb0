//! Maps a description's `type` to the step body that runs it.
//!
//! Constructing the body is also where parameters are validated: a
//! constructor error is what makes the registry reject an action.

use std::collections::HashMap;

use crate::action::ActionBody;
use crate::description::{ActionDescription, TYPE};
use crate::error::{MaintenanceError, Result};
use crate::scripted::ScriptedAction;

pub type BodyConstructor =
    Box<dyn Fn(&ActionDescription, &serde_json::Value) -> Result<Box<dyn ActionBody>> + Send + Sync>;

#[derive(Default)]
pub struct ActionFactory {
    constructors: HashMap<String, BodyConstructor>,
}

impl ActionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory that knows the dry-run types `noop` and `scripted`.
    pub fn with_scripted() -> Self {
        let mut factory = Self::new();
        factory.register("noop", |d, p| ScriptedAction::from_properties(d, p));
        factory.register("scripted", |d, p| ScriptedAction::from_properties(d, p));
        factory
    }

    pub fn register<F>(&mut self, action_type: impl Into<String>, constructor: F) -> &mut Self
    where
        F: Fn(&ActionDescription, &serde_json::Value) -> Result<Box<dyn ActionBody>>
            + Send
            + Sync
            + 'static,
    {
        self.constructors
            .insert(action_type.into(), Box::new(constructor));
        self
    }

    pub fn create(
        &self,
        description: &ActionDescription,
        properties: &serde_json::Value,
    ) -> Result<Box<dyn ActionBody>> {
        let action_type = description
            .action_type()
            .ok_or_else(|| MaintenanceError::MissingKey {
                action_type: String::new(),
                key: TYPE.to_string(),
            })?;
        let constructor = self
            .constructors
            .get(action_type)
            .ok_or_else(|| MaintenanceError::UnknownActionType(action_type.to_string()))?;
        constructor(description, properties)
    }

    pub fn types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}
