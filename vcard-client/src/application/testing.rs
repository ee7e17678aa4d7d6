//! Scripted executor shared by the application unit tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Arc;

use crate::domain::{ApiError, ApiRequest, RequestExecutor, ResponseBody};
use crate::infrastructure::{InMemoryStore, RecordingNotifier};

use super::session::Session;

pub const PERSON_ID: u64 = 79001234567;

/// Replays queued responses in order and records every request it receives
#[derive(Default)]
pub struct MockExecutor {
    responses: Mutex<VecDeque<Result<ResponseBody, ApiError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockExecutor {
    pub fn push(&self, response: Result<ResponseBody, ApiError>) {
        self.responses.lock().push_back(response);
    }

    pub fn push_json(&self, value: Value) {
        self.push(Ok(ResponseBody::Json(value)));
    }

    pub fn push_err(&self, err: ApiError) {
        self.push(Err(err));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl RequestExecutor for MockExecutor {
    async fn execute(&self, request: ApiRequest) -> Result<ResponseBody, ApiError> {
        self.requests.lock().push(request);
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Transport("no scripted response".into())))
    }
}

pub struct Harness {
    pub executor: Arc<MockExecutor>,
    pub store: Arc<InMemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub session: Arc<Session>,
}

impl Harness {
    pub fn new() -> Self {
        let executor = Arc::new(MockExecutor::default());
        let store = Arc::new(InMemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let session = Arc::new(Session::new(
            executor.clone(),
            store.clone(),
            notifier.clone(),
        ));
        Harness {
            executor,
            store,
            notifier,
            session,
        }
    }

    /// Harness with a verified session for [`PERSON_ID`]
    pub async fn signed_in() -> Self {
        let harness = Self::new();
        harness.executor.push_json(profile_json(PERSON_ID));
        harness
            .session
            .verify("valid-token")
            .await
            .expect("verify should succeed");
        harness.notifier.clear();
        harness
    }
}

pub fn profile_json(person_id: u64) -> Value {
    json!({
        "authInfo": {
            "personId": person_id,
            "boundEmail": "user@example.com",
            "lastLoginDate": "2024-03-01T09:00:00+03:00",
            "registrationDate": "2019-05-20T12:00:00+03:00"
        },
        "contractInfo": {"blocked": false, "contractId": person_id},
        "userInfo": {"defaultPayCurrency": 643, "language": "ru"}
    })
}
