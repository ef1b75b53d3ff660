use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::supabase::SupabaseClient;

const TASKS_PATH: &str = "/rest/v1/tasks";

/// A persisted task row. `user_id` is the owning identity, set server-side at
/// creation and never accepted from client input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default = "default_priority")]
    pub priority: String,
    pub user_id: String,
}

/// Insert payload, owner included.
#[derive(Debug, Clone, Serialize)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: String,
    pub user_id: String,
}

/// Update payload. Fields are replaced wholesale; the owner is never touched
/// by an update.
#[derive(Debug, Clone, Serialize)]
pub struct TaskFields {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: String,
}

pub fn default_priority() -> String {
    "medium".to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("task store request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{0}")]
    Unexpected(String),
}

/// External persistent store for task records, queried with equality filters.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// All tasks, filtered server-side to `owner_id` when given.
    async fn list(&self, owner_id: Option<&str>) -> Result<Vec<TaskRecord>, StoreError>;

    async fn create(&self, task: NewTask) -> Result<TaskRecord, StoreError>;

    /// Returns `None` when no record matched `id`.
    async fn update(&self, id: &str, fields: TaskFields) -> Result<Option<TaskRecord>, StoreError>;

    /// Returns whether exactly one record was removed.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;
}

/// PostgREST-backed store. Every operation is a single round trip; the store
/// provides its own concurrency control (last write wins).
pub struct SupabaseTaskStore {
    client: SupabaseClient,
}

impl SupabaseTaskStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TaskStore for SupabaseTaskStore {
    async fn list(&self, owner_id: Option<&str>) -> Result<Vec<TaskRecord>, StoreError> {
        let mut req = self
            .client
            .request_as_key(Method::GET, TASKS_PATH)
            .query(&[("select", "*")]);
        if let Some(owner) = owner_id {
            req = req.query(&[("user_id", format!("eq.{owner}"))]);
        }

        let rows: Vec<TaskRecord> = req.send().await?.error_for_status()?.json().await?;
        Ok(rows)
    }

    async fn create(&self, task: NewTask) -> Result<TaskRecord, StoreError> {
        let rows: Vec<TaskRecord> = self
            .client
            .request_as_key(Method::POST, TASKS_PATH)
            .header("Prefer", "return=representation")
            .json(&task)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Unexpected("insert returned no rows".to_string()))
    }

    async fn update(&self, id: &str, fields: TaskFields) -> Result<Option<TaskRecord>, StoreError> {
        let rows: Vec<TaskRecord> = self
            .client
            .request_as_key(Method::PATCH, TASKS_PATH)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&fields)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(rows.into_iter().next())
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let rows: Vec<TaskRecord> = self
            .client
            .request_as_key(Method::DELETE, TASKS_PATH)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(rows.len() == 1)
    }
}
