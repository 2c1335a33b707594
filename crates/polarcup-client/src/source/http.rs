// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! HTTP snapshot source.

use std::time::Duration;

use super::SnapshotSource;
use crate::snapshot::{FetchError, Snapshot};

/// Endpoint served by a cup on its default mDNS name.
pub const DEFAULT_ENDPOINT: &str = "http://polarcup.local/data";

/// Fetches snapshots with a plain `GET` against the cup's data endpoint.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    endpoint: String,
    timeout: Option<Duration>,
}

impl HttpSource {
    /// Create a source for `endpoint` with no request timeout.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout: None,
        })
    }

    /// Fail requests that take longer than `timeout`. `None` waits forever.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl SnapshotSource for HttpSource {
    async fn fetch(&self) -> Result<Snapshot, FetchError> {
        let mut request = self.client.get(&self.endpoint);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        Snapshot::from_json(&body)
    }
}
