use crate::model::TaskId;
use uuid::Uuid;

/// Source of fresh task identifiers.
pub trait IdSource: Send {
    fn next_id(&mut self) -> TaskId;
}

/// Deterministic ids of the form `task-1`, `task-2`, ...
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    issued: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::with_prefix("task")
    }

    pub fn with_prefix<P: Into<String>>(prefix: P) -> Self {
        Self {
            prefix: prefix.into(),
            issued: 0,
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> TaskId {
        self.issued += 1;
        TaskId::new(format!("{}-{}", self.prefix, self.issued))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdSource for UuidIds {
    fn next_id(&mut self) -> TaskId {
        TaskId::new(Uuid::new_v4().to_string())
    }
}
