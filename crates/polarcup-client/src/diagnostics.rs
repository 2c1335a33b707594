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

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const DEFAULT_MAX_DIAGNOSTICS: usize = 50;

/// Diagnostic message with timestamp
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticMessage {
    pub timestamp: DateTime<Utc>,
    pub level: DiagnosticLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Info,
    Warning,
    Error,
}

/// Bounded log of poller diagnostics, oldest first
#[derive(Debug)]
pub struct DiagnosticLog {
    messages: VecDeque<DiagnosticMessage>,
    max_messages: usize,
}

impl Default for DiagnosticLog {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticLog {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_DIAGNOSTICS)
    }

    #[must_use]
    pub fn with_capacity(max_messages: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(max_messages),
            max_messages: max_messages.max(1),
        }
    }

    /// Add a diagnostic message
    pub fn add(&mut self, level: DiagnosticLevel, message: String) {
        self.messages.push_back(DiagnosticMessage {
            timestamp: Utc::now(),
            level,
            message,
        });

        // Keep only the last N messages
        while self.messages.len() > self.max_messages {
            self.messages.pop_front();
        }
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &DiagnosticMessage> {
        self.messages.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[must_use]
    pub fn count(&self, level: DiagnosticLevel) -> usize {
        self.messages.iter().filter(|m| m.level == level).count()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&DiagnosticMessage> {
        self.messages.back()
    }
}

pub type SharedDiagnostics = Arc<Mutex<DiagnosticLog>>;

#[must_use]
pub fn new_shared_diagnostics() -> SharedDiagnostics {
    Arc::new(Mutex::new(DiagnosticLog::new()))
}

/// Lock the log, recovering it if a writer panicked
pub fn lock_diagnostics(diagnostics: &SharedDiagnostics) -> MutexGuard<'_, DiagnosticLog> {
    diagnostics.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Record a message, ignoring lock poisoning
pub fn record(diagnostics: &SharedDiagnostics, level: DiagnosticLevel, message: String) {
    lock_diagnostics(diagnostics).add(level, message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_is_bounded() {
        let mut log = DiagnosticLog::with_capacity(3);
        for i in 0..5 {
            log.add(DiagnosticLevel::Info, format!("message {i}"));
        }

        assert_eq!(log.len(), 3);
        assert_eq!(log.iter().next().unwrap().message, "message 2");
        assert_eq!(log.latest().unwrap().message, "message 4");
    }

    #[test]
    fn test_message_serializes_with_timestamp() {
        let mut log = DiagnosticLog::new();
        log.add(DiagnosticLevel::Warning, "cycle 2 superseded".to_string());
        let message = log.latest().unwrap();

        let value = serde_json::to_value(message).unwrap();
        assert_eq!(value["level"], "warning");
        assert_eq!(value["message"], "cycle 2 superseded");
        let stamp = value["timestamp"].as_str().unwrap();
        assert_eq!(stamp.parse::<DateTime<Utc>>().unwrap(), message.timestamp);
    }

    #[test]
    fn test_count_by_level() {
        let diagnostics = new_shared_diagnostics();
        record(&diagnostics, DiagnosticLevel::Error, "cycle failed".to_string());
        record(&diagnostics, DiagnosticLevel::Info, "started".to_string());
        record(&diagnostics, DiagnosticLevel::Error, "cycle failed".to_string());

        let log = diagnostics.lock().unwrap();
        assert_eq!(log.count(DiagnosticLevel::Error), 2);
        assert_eq!(log.count(DiagnosticLevel::Warning), 0);
    }
}
