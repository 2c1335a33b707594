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

//! Render targets.
//!
//! The display is modelled as a small fixed set of named elements: two text
//! nodes and a cooling-status container carrying its own two text nodes and a
//! set of class markers. The model is created once, shared between the
//! renderer and whatever view draws it, and never looked up by name at render
//! time.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

/// Class markers the cooling-status container can carry.
///
/// Only one is ever present after a render; what each one looks like is up to
/// the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatusClass {
    NeedsCooling,
    CoolingActive,
    OptimalTemp,
}

impl StatusClass {
    /// All markers, in the order they are cleared.
    pub const ALL: [StatusClass; 3] = [
        StatusClass::NeedsCooling,
        StatusClass::CoolingActive,
        StatusClass::OptimalTemp,
    ];

    /// Marker name as used by stylesheets.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusClass::NeedsCooling => "needs-cooling",
            StatusClass::CoolingActive => "cooling-active",
            StatusClass::OptimalTemp => "optimal-temp",
        }
    }
}

impl std::fmt::Display for StatusClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A text element. Assignment replaces the whole content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextNode {
    content: String,
}

impl TextNode {
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.content = text.into();
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.content
    }
}

/// Operations the cooling-status renderer needs from its container.
///
/// [`StatusContainer`] is the real implementation; tests substitute
/// recording mocks.
pub trait CoolingStatusTarget {
    fn remove_class(&mut self, class: StatusClass);
    fn add_class(&mut self, class: StatusClass);
    fn set_status_text(&mut self, text: &str);
    fn set_time_text(&mut self, text: &str);
}

/// The cooling-status block: class markers plus its two nested text nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusContainer {
    classes: BTreeSet<StatusClass>,
    pub status_text: TextNode,
    pub time_text: TextNode,
}

impl StatusContainer {
    #[must_use]
    pub fn has_class(&self, class: StatusClass) -> bool {
        self.classes.contains(&class)
    }

    /// Markers currently applied, in a stable order.
    pub fn classes(&self) -> impl Iterator<Item = StatusClass> + '_ {
        self.classes.iter().copied()
    }

    /// The applied marker, if exactly one is present.
    #[must_use]
    pub fn active_class(&self) -> Option<StatusClass> {
        if self.classes.len() == 1 {
            self.classes.iter().next().copied()
        } else {
            None
        }
    }
}

impl CoolingStatusTarget for StatusContainer {
    fn remove_class(&mut self, class: StatusClass) {
        self.classes.remove(&class);
    }

    fn add_class(&mut self, class: StatusClass) {
        self.classes.insert(class);
    }

    fn set_status_text(&mut self, text: &str) {
        self.status_text.set_text(text);
    }

    fn set_time_text(&mut self, text: &str) {
        self.time_text.set_text(text);
    }
}

/// Every render target the poller writes to.
#[derive(Debug, Clone, Default)]
pub struct DisplayModel {
    pub temperature: TextNode,
    pub quantity: TextNode,
    pub cooling_status: StatusContainer,

    /// When the last accepted snapshot was rendered.
    pub last_updated: Option<DateTime<Utc>>,

    /// Ticket of the cycle that produced the current content (0 = none yet).
    pub(crate) rendered_ticket: u64,
}

impl DisplayModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticket of the cycle whose snapshot is currently shown.
    #[must_use]
    pub fn rendered_ticket(&self) -> u64 {
        self.rendered_ticket
    }
}

/// Display model shared between the renderer and the view.
pub type SharedDisplay = Arc<Mutex<DisplayModel>>;

/// Create an empty shared display.
#[must_use]
pub fn new_shared_display() -> SharedDisplay {
    Arc::new(Mutex::new(DisplayModel::new()))
}

/// Lock the display, recovering the guard if a writer panicked.
pub fn lock_display(display: &SharedDisplay) -> MutexGuard<'_, DisplayModel> {
    display.lock().unwrap_or_else(PoisonError::into_inner)
}
