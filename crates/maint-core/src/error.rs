use thiserror::Error;

#[derive(Debug, Error)]
pub enum MaintenanceError {
    #[error("unknown action type: {0}")]
    UnknownActionType(String),

    #[error("action type '{action_type}' requires description key '{key}'")]
    MissingKey { action_type: String, key: String },

    #[error("invalid action properties: {0}")]
    InvalidProperties(String),

    #[error("action with hash {hash:016x} already registered as id {existing_id}")]
    DuplicateAction { hash: u64, existing_id: u64 },

    #[error("maintenance is shutting down")]
    ShuttingDown,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MaintenanceError>;
