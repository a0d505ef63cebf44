//! In-memory repositories backed by HashMaps behind async RwLocks.
//!
//! Each mutation runs under a single write lock, so uniqueness checks and
//! partial updates appear atomic to concurrent readers. Data is lost on
//! process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use taskwell_core::domain::{NewTask, NewUser, Task, TaskChanges, User};
use taskwell_core::error::RepoError;
use taskwell_core::ports::{TaskFilter, TaskPage, TaskRepository, UserRepository};

#[derive(Default)]
struct UserTable {
    users: HashMap<u64, User>,
    by_username: HashMap<String, u64>,
    by_email: HashMap<String, u64>,
    next_id: u64,
}

/// In-memory user repository with unique indexes on username and email.
#[derive(Default)]
pub struct InMemoryUserRepository {
    inner: RwLock<UserTable>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, new: NewUser) -> Result<User, RepoError> {
        // Uniqueness check and insert happen under one write lock, so a
        // concurrent creation with the same username or email cannot slip
        // between them.
        let mut table = self.inner.write().await;

        if table.by_username.contains_key(&new.username) {
            return Err(RepoError::Constraint(format!(
                "username {} already exists",
                new.username
            )));
        }
        if table.by_email.contains_key(&new.email) {
            return Err(RepoError::Constraint(format!(
                "email {} already exists",
                new.email
            )));
        }

        table.next_id += 1;
        let user = User::from_new(table.next_id, new);

        table.by_username.insert(user.username.clone(), user.id);
        table.by_email.insert(user.email.clone(), user.id);
        table.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_id(&self, id: u64) -> Result<Option<User>, RepoError> {
        let table = self.inner.read().await;
        Ok(table.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let table = self.inner.read().await;
        Ok(table
            .by_username
            .get(username)
            .and_then(|id| table.users.get(id))
            .cloned())
    }
}

#[derive(Default)]
struct TaskTable {
    tasks: HashMap<u64, Task>,
    next_id: u64,
}

/// In-memory task repository. All lookups combine task id and owner id in a
/// single predicate; a foreign task is reported the same way as a missing one.
#[derive(Default)]
pub struct InMemoryTaskRepository {
    inner: RwLock<TaskTable>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, new: NewTask) -> Result<Task, RepoError> {
        let mut table = self.inner.write().await;

        table.next_id += 1;
        let task = Task::from_new(table.next_id, new);
        table.tasks.insert(task.id, task.clone());

        Ok(task)
    }

    async fn find_owned(&self, id: u64, owner_id: u64) -> Result<Option<Task>, RepoError> {
        let table = self.inner.read().await;
        Ok(table
            .tasks
            .get(&id)
            .filter(|t| t.owner_id == owner_id)
            .cloned())
    }

    async fn list_owned(&self, owner_id: u64, filter: TaskFilter) -> Result<TaskPage, RepoError> {
        let table = self.inner.read().await;

        let mut matching: Vec<&Task> = table
            .tasks
            .values()
            .filter(|t| t.owner_id == owner_id)
            .filter(|t| filter.status.is_none_or(|s| t.status == s))
            .collect();
        matching.sort_by_key(|t| t.id);

        let total = matching.len() as u64;
        let tasks = matching
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();

        Ok(TaskPage { tasks, total })
    }

    async fn update_owned(
        &self,
        id: u64,
        owner_id: u64,
        changes: TaskChanges,
    ) -> Result<Option<Task>, RepoError> {
        let mut table = self.inner.write().await;

        let Some(task) = table.tasks.get_mut(&id).filter(|t| t.owner_id == owner_id) else {
            return Ok(None);
        };

        task.apply(changes);
        Ok(Some(task.clone()))
    }

    async fn delete_owned(&self, id: u64, owner_id: u64) -> Result<bool, RepoError> {
        let mut table = self.inner.write().await;

        if !table
            .tasks
            .get(&id)
            .is_some_and(|t| t.owner_id == owner_id)
        {
            return Ok(false);
        }

        table.tasks.remove(&id);
        Ok(true)
    }
}
