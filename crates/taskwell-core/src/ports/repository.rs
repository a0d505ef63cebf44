use async_trait::async_trait;

use crate::domain::{NewTask, NewUser, Task, TaskChanges, TaskStatus, User};
use crate::error::RepoError;

/// User repository - the credential store.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a user, assigning a fresh positive id.
    ///
    /// Uniqueness of username and email must be enforced atomically by the
    /// implementation: of two concurrent creations with the same username,
    /// exactly one succeeds and the other observes `RepoError::Constraint`.
    async fn create(&self, new: NewUser) -> Result<User, RepoError>;

    /// Find a user by id.
    async fn find_by_id(&self, id: u64) -> Result<Option<User>, RepoError>;

    /// Find a user by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Filter and page window for task listings.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub limit: Option<usize>,
    pub offset: usize,
}

/// One page of tasks plus the total match count.
///
/// `total` counts every task of the owner matching the filter, independent
/// of the limit applied to `tasks`.
#[derive(Debug, Clone)]
pub struct TaskPage {
    pub tasks: Vec<Task>,
    pub total: u64,
}

/// Task repository.
///
/// Every lookup and mutation takes the owner id and applies it as part of
/// the query predicate: a task owned by someone else is indistinguishable
/// from a task that does not exist.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Create a task, assigning a fresh positive id.
    async fn create(&self, new: NewTask) -> Result<Task, RepoError>;

    /// Find a task by id, scoped to its owner.
    async fn find_owned(&self, id: u64, owner_id: u64) -> Result<Option<Task>, RepoError>;

    /// List the owner's tasks matching the filter.
    async fn list_owned(&self, owner_id: u64, filter: TaskFilter) -> Result<TaskPage, RepoError>;

    /// Apply a partial update to an owned task. Returns the updated task,
    /// or `None` under the same not-found semantics as `find_owned`.
    async fn update_owned(
        &self,
        id: u64,
        owner_id: u64,
        changes: TaskChanges,
    ) -> Result<Option<Task>, RepoError>;

    /// Remove an owned task permanently. Returns whether a task was removed;
    /// its id must never resolve again.
    async fn delete_owned(&self, id: u64, owner_id: u64) -> Result<bool, RepoError>;
}
