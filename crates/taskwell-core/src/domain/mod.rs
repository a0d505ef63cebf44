//! Domain entities - the core business objects.

mod task;

mod user;

pub use task::{NewTask, Task, TaskChanges, TaskStatus};
pub use user::{NewUser, User};
