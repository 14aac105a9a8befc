pub mod id;
pub mod task;

pub use id::{IdSource, SequentialIds, UuidIds};
pub use task::{Suggestion, Task, TaskId};
