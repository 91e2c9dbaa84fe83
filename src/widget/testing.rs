//! Test doubles for the widget workflows.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::widget::transport::{Dispatch, TransportError};

/// Scripted `Dispatch` implementation: responses are consumed in push
/// order, every call is recorded, and an optional delay simulates a slow
/// or hung dispatcher.
pub(crate) struct ScriptedDispatch {
    responses: Mutex<VecDeque<Result<Value, TransportError>>>,
    calls: Mutex<Vec<(String, Vec<(String, String)>)>>,
    delay: Option<Duration>,
}

impl ScriptedDispatch {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push_success(&self, payload: Value) {
        self.responses.lock().unwrap().push_back(Ok(payload));
    }

    pub fn push_error(&self, err: TransportError) {
        self.responses.lock().unwrap().push_back(Err(err));
    }

    pub fn calls(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Dispatch for ScriptedDispatch {
    async fn call(
        &self,
        action: &str,
        fields: &[(&str, String)],
        _timeout: Duration,
    ) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push((
            action.to_string(),
            fields
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
        ));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::ConnectionFailed("script exhausted".to_string())))
    }
}
