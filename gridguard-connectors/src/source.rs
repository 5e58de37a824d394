//! Data sources
//!
//! A source answers one question: what did the API publish between two
//! instants. Transport, retries and decoding are its business; the ETL
//! cycle only sees a decoded [`ImbalanceResponse`].

use std::sync::Mutex;

use async_trait::async_trait;
use gridguard_core::Timestamp;

use crate::{
    apg::{self, DecodeError, ImbalanceResponse},
    ConnectorError,
};

/// Provider of imbalance data windows
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch everything published in `[start, end]`
    async fn fetch_window(
        &self,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<ImbalanceResponse, ConnectorError>;

    /// Name used in log lines
    fn name(&self) -> &str {
        "source"
    }
}

/// Source that serves one fixed response
///
/// Replays an archived payload, or stands in for the API in tests. Every
/// requested window is recorded.
#[derive(Debug)]
pub struct StaticSource {
    response: ImbalanceResponse,
    requests: Mutex<Vec<(Timestamp, Timestamp)>>,
}

impl StaticSource {
    pub fn new(response: ImbalanceResponse) -> Self {
        Self {
            response,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Serve a payload as the API would have returned it
    pub fn from_json(body: &str) -> Result<Self, DecodeError> {
        Ok(Self::new(apg::decode(body)?))
    }

    /// Windows requested so far, oldest first
    pub fn requests(&self) -> Vec<(Timestamp, Timestamp)> {
        match self.requests.lock() {
            Ok(requests) => requests.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl DataSource for StaticSource {
    async fn fetch_window(
        &self,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<ImbalanceResponse, ConnectorError> {
        self.requests
            .lock()
            .map_err(|_| ConnectorError::Source("request log lock poisoned".into()))?
            .push((start, end));

        Ok(self.response.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}
