use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::{duplicate_email, Store};
use crate::error::AppError;
use crate::models::{NewTask, Task, TaskChanges, User};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    // Kept in insertion order, which is creation order.
    tasks: Vec<Task>,
}

/// In-process store with the same observable behaviour as [`PgStore`](super::PgStore):
/// unique emails, cascading user deletion and a server-assigned `updated_at`.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, AppError> {
        self.tables
            .lock()
            .map_err(|_| AppError::InternalServerError("memory store lock poisoned".into()))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<User, AppError> {
        let mut tables = self.lock()?;
        if tables.users.iter().any(|u| u.email == email) {
            return Err(duplicate_email());
        }
        let user = User::new(email, hashed_password);
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.lock()?;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.lock()?;
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        if tables.users.len() == before {
            return Ok(false);
        }
        tables.tasks.retain(|t| t.owner_id != id);
        Ok(true)
    }

    async fn create_task(&self, owner_id: Uuid, task: NewTask) -> Result<Task, AppError> {
        let mut tables = self.lock()?;
        if !tables.users.iter().any(|u| u.id == owner_id) {
            return Err(AppError::DatabaseError(format!(
                "tasks.owner_id references missing user {}",
                owner_id
            )));
        }
        let task = Task::new(owner_id, task);
        tables.tasks.push(task.clone());
        Ok(task)
    }

    async fn list_tasks(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Task>, AppError> {
        let tables = self.lock()?;
        Ok(tables
            .tasks
            .iter()
            .filter(|t| t.owner_id == owner_id)
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect())
    }

    async fn get_task(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Task>, AppError> {
        let tables = self.lock()?;
        Ok(tables
            .tasks
            .iter()
            .find(|t| t.id == id && t.owner_id == owner_id)
            .cloned())
    }

    async fn update_task(
        &self,
        owner_id: Uuid,
        id: Uuid,
        changes: TaskChanges,
    ) -> Result<Option<Task>, AppError> {
        let mut tables = self.lock()?;
        let Some(task) = tables
            .tasks
            .iter_mut()
            .find(|t| t.id == id && t.owner_id == owner_id)
        else {
            return Ok(None);
        };
        task.apply(changes);
        task.updated_at = Some(Utc::now());
        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, owner_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.lock()?;
        let before = tables.tasks.len();
        tables
            .tasks
            .retain(|t| !(t.id == id && t.owner_id == owner_id));
        Ok(tables.tasks.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskStatus;

    fn new_task(title: &str) -> NewTask {
        NewTask {
            title: title.into(),
            description: None,
            status: TaskStatus::Todo,
        }
    }

    #[actix_rt::test]
    async fn test_duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        store.create_user("a@x.com", "hash").await.unwrap();

        match store.create_user("a@x.com", "other").await {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Email already registered"),
            other => panic!("unexpected result: {:?}", other.map(|u| u.email)),
        }
        // Case-sensitive as stored.
        assert!(store.create_user("A@x.com", "hash").await.is_ok());
    }

    #[actix_rt::test]
    async fn test_deleting_user_cascades_to_tasks() {
        let store = MemoryStore::new();
        let alice = store.create_user("alice@x.com", "hash").await.unwrap();
        let bob = store.create_user("bob@x.com", "hash").await.unwrap();
        store.create_task(alice.id, new_task("a1")).await.unwrap();
        store.create_task(bob.id, new_task("b1")).await.unwrap();

        assert!(store.delete_user(alice.id).await.unwrap());
        assert!(!store.delete_user(alice.id).await.unwrap());
        assert!(store.list_tasks(alice.id, 100, 0).await.unwrap().is_empty());
        assert_eq!(store.list_tasks(bob.id, 100, 0).await.unwrap().len(), 1);
    }

    #[actix_rt::test]
    async fn test_task_requires_existing_owner() {
        let store = MemoryStore::new();
        let result = store.create_task(Uuid::new_v4(), new_task("orphan")).await;
        assert!(matches!(result, Err(AppError::DatabaseError(_))));
    }

    #[actix_rt::test]
    async fn test_update_sets_updated_at_and_respects_owner() {
        let store = MemoryStore::new();
        let alice = store.create_user("alice@x.com", "hash").await.unwrap();
        let bob = store.create_user("bob@x.com", "hash").await.unwrap();
        let task = store.create_task(alice.id, new_task("a1")).await.unwrap();
        assert!(task.updated_at.is_none());

        let changes = TaskChanges {
            title: Some("hijacked".into()),
            ..Default::default()
        };
        assert!(store.update_task(bob.id, task.id, changes).await.unwrap().is_none());

        let changes = TaskChanges {
            status: Some(TaskStatus::Done),
            ..Default::default()
        };
        let updated = store
            .update_task(alice.id, task.id, changes)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "a1");
        assert_eq!(updated.status, TaskStatus::Done);
        assert!(updated.updated_at.is_some());
        assert_eq!(updated.created_at, task.created_at);
    }

    #[actix_rt::test]
    async fn test_list_pages_in_creation_order() {
        let store = MemoryStore::new();
        let alice = store.create_user("alice@x.com", "hash").await.unwrap();
        for i in 0..15 {
            store
                .create_task(alice.id, new_task(&format!("Task {}", i)))
                .await
                .unwrap();
        }

        let page: Vec<String> = store
            .list_tasks(alice.id, 5, 5)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(page, ["Task 5", "Task 6", "Task 7", "Task 8", "Task 9"]);
        assert!(store.list_tasks(alice.id, 5, 15).await.unwrap().is_empty());
    }
}
