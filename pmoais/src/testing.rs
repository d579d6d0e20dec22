//! Scripted in-memory transport for unit tests

use crate::error::{Error, Result};
use crate::transport::{HttpRequest, HttpResponse, Transport};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

enum Reply {
    Status(u16, String),
    Unreachable,
    Hang,
}

/// Answers by exact URL and records every request it sees
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    routes: HashMap<String, Reply>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, url: &str, status: u16, body: &str) -> Self {
        self.routes
            .insert(url.to_string(), Reply::Status(status, body.to_string()));
        self
    }

    pub fn unreachable(mut self, url: &str) -> Self {
        self.routes.insert(url.to_string(), Reply::Unreachable);
        self
    }

    pub fn hang(mut self, url: &str) -> Self {
        self.routes.insert(url.to_string(), Reply::Hang);
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, url: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.url == url)
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = request.url.clone();
        self.requests.lock().unwrap().push(request);

        match self.routes.get(&url) {
            Some(Reply::Status(status, body)) => Ok(HttpResponse::new(*status, body.clone())),
            Some(Reply::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(Error::Timeout)
            }
            Some(Reply::Unreachable) | None => {
                Err(Error::Network(format!("connection refused: {}", url)))
            }
        }
    }
}
