// Copyright 2025 eraflo
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

//! Next-tick scheduling for single-threaded, frame-driven subsystems.
//!
//! Work that must not run inside the current call stack (scene mutations, callbacks
//! that may re-enter their caller) is pushed onto a [`DeferredQueue`] and executed
//! when the owner drains it on its next tick.

use std::collections::VecDeque;

/// A FIFO of deferred tasks, drained once per tick.
///
/// Tasks deferred while a drain is in progress are not part of that drain; they
/// run on the following tick.
#[derive(Debug, Clone)]
pub struct DeferredQueue<T> {
    tasks: VecDeque<T>,
}

impl<T> DeferredQueue<T> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            tasks: VecDeque::new(),
        }
    }

    /// Schedules `task` for the next tick.
    pub fn defer(&mut self, task: T) {
        self.tasks.push_back(task);
    }

    /// Takes the tasks that are due this tick, leaving the queue empty for tasks
    /// deferred while they run.
    pub fn take_due(&mut self) -> VecDeque<T> {
        std::mem::take(&mut self.tasks)
    }

    /// Drops every pending task.
    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Number of pending tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` if nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
