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

//! Per-frame transient geometry allocation.
//!
//! The pool hands out ranges inside shared dynamic buffers instead of one
//! buffer per transient mesh. Ranges are valid for the current frame only;
//! when a frame finishes every slot's capacity becomes available again.

use flume::Receiver;

use crate::renderer::api::{
    BufferUsage, IndexBuffer, IndexRange, IndexType, VertexBuffer, VertexFormat, VertexRange,
};
use crate::renderer::context::{FrameEvent, RenderContext};
use crate::renderer::error::ResourceError;

/// Slot capacities are rounded up to a multiple of this many elements.
// TODO: make the granularity part of RenderConfig once a workload needs
// tuning it.
const GRANULARITY: usize = 1024;

struct VertexSlot {
    buffer: VertexBuffer,
    available: usize,
}

struct IndexSlot {
    buffer: IndexBuffer,
    available: usize,
}

/// A pool of dynamic buffers for geometry that lives one frame.
///
/// Allocations are first-fit per vertex format or index type; a miss grows
/// the pool with a new slot. The pool subscribes to the context's frame
/// events and recycles all slots once the frame they served is finished.
pub struct GeometryPool {
    vertex_slots: Vec<VertexSlot>,
    index_slots: Vec<IndexSlot>,
    frame_events: Receiver<FrameEvent>,
}

impl GeometryPool {
    /// Creates an empty pool subscribed to the context's frame events.
    pub fn new(ctx: &mut RenderContext) -> Self {
        Self {
            vertex_slots: Vec::new(),
            index_slots: Vec::new(),
            frame_events: ctx.subscribe_frame_events(),
        }
    }

    /// Allocates `count` vertices of the given format for this frame.
    ///
    /// A zero count yields the empty range without touching any slot.
    pub fn allocate_vertices(
        &mut self,
        ctx: &mut RenderContext,
        count: usize,
        format: &VertexFormat,
    ) -> Result<VertexRange, ResourceError> {
        self.recycle_finished_frames();

        if count == 0 {
            return Ok(VertexRange::empty());
        }

        let found = self
            .vertex_slots
            .iter()
            .position(|s| s.buffer.format() == format && s.available >= count);

        let index = match found {
            Some(index) => index,
            None => {
                let capacity = count.div_ceil(GRANULARITY) * GRANULARITY;
                // Created with `?` so a failed slot is never retained.
                let buffer = VertexBuffer::new(
                    ctx,
                    capacity,
                    format.clone(),
                    BufferUsage::Dynamic,
                    "transient vertices",
                )?;
                log::debug!(
                    "Geometry pool grew by {capacity} vertices of {} bytes",
                    format.size()
                );
                self.vertex_slots.push(VertexSlot {
                    buffer,
                    available: capacity,
                });
                self.vertex_slots.len() - 1
            }
        };

        let slot = &mut self.vertex_slots[index];
        let start = slot.buffer.count() - slot.available;
        slot.available -= count;
        Ok(slot.buffer.range(start, count))
    }

    /// Allocates `count` indices of the given type for this frame.
    pub fn allocate_indices(
        &mut self,
        ctx: &mut RenderContext,
        count: usize,
        index_type: IndexType,
    ) -> Result<IndexRange, ResourceError> {
        self.recycle_finished_frames();

        if count == 0 {
            return Ok(IndexRange::empty());
        }

        let found = self
            .index_slots
            .iter()
            .position(|s| s.buffer.index_type() == index_type && s.available >= count);

        let index = match found {
            Some(index) => index,
            None => {
                let capacity = count.div_ceil(GRANULARITY) * GRANULARITY;
                let buffer = IndexBuffer::new(
                    ctx,
                    capacity,
                    index_type,
                    BufferUsage::Dynamic,
                    "transient indices",
                )?;
                log::debug!("Geometry pool grew by {capacity} {index_type:?} indices");
                self.index_slots.push(IndexSlot {
                    buffer,
                    available: capacity,
                });
                self.index_slots.len() - 1
            }
        };

        let slot = &mut self.index_slots[index];
        let start = slot.buffer.count() - slot.available;
        slot.available -= count;
        Ok(slot.buffer.range(start, count))
    }

    /// Releases every slot's buffer.
    pub fn destroy(self, ctx: &mut RenderContext) {
        for slot in self.vertex_slots {
            slot.buffer.destroy(ctx);
        }
        for slot in self.index_slots {
            slot.buffer.destroy(ctx);
        }
    }

    fn recycle_finished_frames(&mut self) {
        let mut finished = false;
        while self.frame_events.try_recv().is_ok() {
            finished = true;
        }
        if !finished {
            return;
        }

        for slot in &mut self.vertex_slots {
            slot.available = slot.buffer.count();
        }
        for slot in &mut self.index_slots {
            slot.available = slot.buffer.count();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::test_support::counting_context;

    fn format() -> VertexFormat {
        VertexFormat::parse("3f:position 2f:uv").unwrap()
    }

    #[test]
    fn zero_count_allocates_nothing() {
        let (mut ctx, device) = counting_context();
        let mut pool = GeometryPool::new(&mut ctx);

        let range = pool.allocate_vertices(&mut ctx, 0, &format()).unwrap();
        assert!(range.is_empty());
        assert_eq!(device.buffer_count(), 0);
    }

    #[test]
    fn packs_allocations_into_one_slot() {
        let (mut ctx, device) = counting_context();
        let mut pool = GeometryPool::new(&mut ctx);

        let a = pool.allocate_vertices(&mut ctx, 100, &format()).unwrap();
        let b = pool.allocate_vertices(&mut ctx, 200, &format()).unwrap();

        assert_eq!(device.buffer_count(), 1);
        assert_eq!(a.buffer(), b.buffer());
        assert_eq!(a.start(), 0);
        assert_eq!(b.start(), 100);
    }

    #[test]
    fn rounds_capacity_up_to_the_granule() {
        let (mut ctx, _) = counting_context();
        let mut pool = GeometryPool::new(&mut ctx);

        pool.allocate_vertices(&mut ctx, 1, &format()).unwrap();

        assert_eq!(pool.vertex_slots[0].buffer.count(), GRANULARITY);
        assert_eq!(pool.vertex_slots[0].available, GRANULARITY - 1);

        pool.allocate_indices(&mut ctx, GRANULARITY + 1, IndexType::U16)
            .unwrap();
        assert_eq!(pool.index_slots[0].buffer.count(), 2 * GRANULARITY);
    }

    #[test]
    fn distinct_formats_use_distinct_slots() {
        let (mut ctx, device) = counting_context();
        let mut pool = GeometryPool::new(&mut ctx);

        let positions = VertexFormat::parse("3f:position").unwrap();
        pool.allocate_vertices(&mut ctx, 10, &format()).unwrap();
        pool.allocate_vertices(&mut ctx, 10, &positions).unwrap();

        assert_eq!(device.buffer_count(), 2);
    }

    #[test]
    fn failed_slot_is_not_retained() {
        let (mut ctx, device) = counting_context();
        let mut pool = GeometryPool::new(&mut ctx);

        device.fail_next_buffer();
        assert!(pool.allocate_vertices(&mut ctx, 10, &format()).is_err());
        assert!(pool.vertex_slots.is_empty());

        // The next allocation succeeds and starts from a clean slot.
        let range = pool.allocate_vertices(&mut ctx, 10, &format()).unwrap();
        assert_eq!(range.start(), 0);
    }

    #[test]
    fn frame_finish_recycles_capacity() {
        let (mut ctx, device) = counting_context();
        let mut pool = GeometryPool::new(&mut ctx);

        let a = pool.allocate_vertices(&mut ctx, 600, &format()).unwrap();
        ctx.update();
        let b = pool.allocate_vertices(&mut ctx, 600, &format()).unwrap();

        // Recycling means the second frame reuses the same slot from the
        // start instead of growing the pool.
        assert_eq!(device.buffer_count(), 1);
        assert_eq!(a.start(), 0);
        assert_eq!(b.start(), 0);
    }

    #[test]
    fn allocation_spills_to_a_new_slot_when_full() {
        let (mut ctx, device) = counting_context();
        let mut pool = GeometryPool::new(&mut ctx);

        pool.allocate_vertices(&mut ctx, GRANULARITY, &format()).unwrap();
        let spilled = pool.allocate_vertices(&mut ctx, 10, &format()).unwrap();

        assert_eq!(device.buffer_count(), 2);
        assert_eq!(spilled.start(), 0);
    }
}
