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

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::fetcher::FetchRequest;

#[derive(Debug)]
struct QueuedFetch {
    priority: u32,
    sequence: u64,
    request: FetchRequest,
}

impl PartialEq for QueuedFetch {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}

impl Eq for QueuedFetch {}

impl Ord for QueuedFetch {
    // Max-heap: higher priority first, then the earliest request.
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for QueuedFetch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Pending fetches ordered by priority, FIFO among equal priorities.
#[derive(Debug, Default)]
pub(crate) struct FetchQueue {
    heap: BinaryHeap<QueuedFetch>,
    next_sequence: u64,
}

impl FetchQueue {
    pub(crate) fn push(&mut self, request: FetchRequest, priority: u32) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(QueuedFetch {
            priority,
            sequence,
            request,
        });
    }

    pub(crate) fn pop(&mut self) -> Option<FetchRequest> {
        self.heap.pop().map(|queued| queued.request)
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }
}
