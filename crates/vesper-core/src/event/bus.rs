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

//! Unbounded event channel with cloneable endpoints.

use flume::{Receiver, Sender};

/// A simple event bus backed by an unbounded [`flume`] channel.
///
/// The bus itself keeps one sender and one receiver alive; additional
/// endpoints can be obtained with [`EventBus::sender`] and
/// [`EventBus::receiver`]. Note that receivers compete for events; the bus
/// is a queue, not a broadcast.
#[derive(Debug)]
pub struct EventBus<T> {
    sender: Sender<T>,
    receiver: Receiver<T>,
}

impl<T> EventBus<T> {
    /// Creates a new, empty event bus.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        Self { sender, receiver }
    }

    /// Publishes an event onto the bus.
    pub fn publish(&self, event: T) {
        if let Err(e) = self.sender.send(event) {
            log::error!("Failed to publish event: {e}");
        }
    }

    /// Returns a new sender endpoint.
    pub fn sender(&self) -> Sender<T> {
        self.sender.clone()
    }

    /// Returns a new receiver endpoint.
    pub fn receiver(&self) -> Receiver<T> {
        self.receiver.clone()
    }
}

impl<T> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivers_published_events_in_order() {
        let bus = EventBus::new();
        bus.publish(1u32);
        bus.publish(2u32);

        let receiver = bus.receiver();
        assert_eq!(receiver.try_recv(), Ok(1));
        assert_eq!(receiver.try_recv(), Ok(2));
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn detached_sender_feeds_the_same_queue() {
        let bus = EventBus::new();
        let sender = bus.sender();
        sender.send(7u32).unwrap();
        assert_eq!(bus.receiver().try_recv(), Ok(7));
    }
}
