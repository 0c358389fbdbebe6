//! Scripted transport for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{ApiRequest, ApiResponse, Transport, TransportError};

#[derive(Clone)]
enum Scripted {
    Response(ApiResponse),
    Fail(String),
}

/// Answers by path. The last scripted answer for a path repeats.
/// Unscripted paths get a 404.
#[derive(Default)]
pub(crate) struct MockTransport {
    routes: Mutex<HashMap<String, VecDeque<Scripted>>>,
    requests: Mutex<Vec<ApiRequest>>,
    yields: usize,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Suspend this many times inside each `send`, so concurrent callers interleave.
    pub(crate) fn with_yields(yields: usize) -> Self {
        Self {
            yields,
            ..Self::default()
        }
    }

    pub(crate) fn respond(&self, path: &str, status: u16, body: &str) {
        self.script(
            path,
            Scripted::Response(ApiResponse {
                status,
                body: body.to_string(),
            }),
        );
    }

    pub(crate) fn fail(&self, path: &str, reason: &str) {
        self.script(path, Scripted::Fail(reason.to_string()));
    }

    fn script(&self, path: &str, answer: Scripted) {
        self.routes
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(answer);
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn calls_to(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let path = request.path.clone();
        self.requests.lock().unwrap().push(request);

        for _ in 0..self.yields {
            tokio::task::yield_now().await;
        }

        let answer = {
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(&path) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match answer {
            Some(Scripted::Response(response)) => Ok(response),
            Some(Scripted::Fail(reason)) => Err(TransportError::Other(reason)),
            None => Ok(ApiResponse {
                status: 404,
                body: r#"{"detail": "Not Found"}"#.to_string(),
            }),
        }
    }
}
