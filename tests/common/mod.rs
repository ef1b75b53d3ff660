use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use mindsync_api::services::assistant::AssistantService;
use mindsync_api::services::identity::{
    IdentityError, IdentityProvider, LoginOutcome, SignupOutcome, SignupUser, UserIdentity,
};
use mindsync_api::services::news::NewsService;
use mindsync_api::services::tasks::{NewTask, StoreError, TaskFields, TaskRecord, TaskStore};
use mindsync_api::services::weather::WeatherService;
use mindsync_api::state::AppState;

/// In-memory identity provider. Accounts are (email, password) pairs; every
/// issued session token maps to a fixed identity, mirroring an opaque token
/// the real provider would resolve.
#[derive(Default)]
pub struct MockIdentity {
    accounts: Mutex<HashMap<String, String>>,
    sessions: Mutex<HashMap<String, UserIdentity>>,
    next_user: AtomicUsize,
}

impl MockIdentity {
    /// Registers a session token resolving to the given identity.
    pub fn issue(&self, id: &str, email: &str) -> String {
        let token = format!("tok-{id}");
        self.sessions.lock().unwrap().insert(
            token.clone(),
            UserIdentity {
                id: id.to_string(),
                email: email.to_string(),
            },
        );
        token
    }
}

#[async_trait]
impl IdentityProvider for MockIdentity {
    async fn signup(&self, email: &str, password: &str) -> Result<SignupOutcome, IdentityError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(IdentityError::AlreadyRegistered);
        }
        accounts.insert(email.to_string(), password.to_string());

        // No elevated key in tests: confirmation stays pending, no session.
        let n = self.next_user.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(SignupOutcome {
            user: SignupUser {
                id: format!("user-{n}"),
                email: email.to_string(),
                email_confirmed: false,
            },
            access_token: None,
            message: "Please check your email to verify your account.".to_string(),
        })
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, IdentityError> {
        let stored = self.accounts.lock().unwrap().get(email).cloned();
        match stored {
            None => Err(IdentityError::NoSuchAccount),
            Some(stored) if stored != password => Err(IdentityError::InvalidCredentials),
            Some(_) => {
                let user = UserIdentity {
                    id: format!("user-for-{email}"),
                    email: email.to_string(),
                };
                let token = format!("tok-login-{email}");
                self.sessions.lock().unwrap().insert(token.clone(), user.clone());
                Ok(LoginOutcome {
                    user,
                    access_token: token,
                })
            }
        }
    }

    async fn resolve(&self, token: &str) -> Option<UserIdentity> {
        self.sessions.lock().unwrap().get(token).cloned()
    }
}

/// In-memory task store that also counts operations, so tests can assert the
/// auth gate rejected a request before the store was touched.
#[derive(Default)]
pub struct MockStore {
    rows: Mutex<Vec<TaskRecord>>,
    next_id: AtomicUsize,
    pub calls: AtomicUsize,
}

impl MockStore {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskStore for MockStore {
    async fn list(&self, owner_id: Option<&str>) -> Result<Vec<TaskRecord>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|t| owner_id.map_or(true, |owner| t.user_id == owner))
            .cloned()
            .collect())
    }

    async fn create(&self, task: NewTask) -> Result<TaskRecord, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let record = TaskRecord {
            id: format!("task-{n}"),
            title: task.title,
            description: task.description,
            completed: task.completed,
            priority: task.priority,
            user_id: task.user_id,
        };
        self.rows.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &str, fields: TaskFields) -> Result<Option<TaskRecord>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        for row in rows.iter_mut() {
            if row.id == id {
                row.title = fields.title;
                row.description = fields.description;
                row.completed = fields.completed;
                row.priority = fields.priority;
                return Ok(Some(row.clone()));
            }
        }
        Ok(None)
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|row| row.id != id);
        Ok(before - rows.len() == 1)
    }
}

pub struct TestApp {
    pub app: Router,
    pub identity: Arc<MockIdentity>,
    pub store: Arc<MockStore>,
}

pub fn test_app() -> TestApp {
    let identity = Arc::new(MockIdentity::default());
    let store = Arc::new(MockStore::default());

    // Concrete passthrough services with dummy keys; nothing dials out unless
    // a test actually hits those endpoints.
    let http = reqwest::Client::new();
    let state = AppState {
        identity: identity.clone(),
        tasks: store.clone(),
        assistant: Arc::new(AssistantService::new(
            http.clone(),
            "test-key".to_string(),
            "gemini-test".to_string(),
        )),
        weather: Arc::new(WeatherService::new(http.clone(), "test-key".to_string())),
        news: Arc::new(NewsService::new(http, "test-key".to_string())),
    };

    TestApp {
        app: mindsync_api::app(state),
        identity,
        store,
    }
}

/// Drives one request through the router and returns (status, parsed body).
pub async fn send(
    app: &Router,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}
