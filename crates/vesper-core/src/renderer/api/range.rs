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

//! Non-owning views over contiguous parts of GPU buffers.
//!
//! Ranges are `Copy` and identify their buffer by handle; they are used by
//! allocation schemes that pack many small meshes into one buffer. A range
//! must not outlive the buffer it points into.

use crate::renderer::api::buffer::{IndexBuffer, IndexType, VertexBuffer};
use crate::renderer::api::handle::BufferHandle;
use crate::renderer::context::RenderContext;
use crate::renderer::error::ResourceError;

/// Kind of geometric primitive assembled from vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveMode {
    /// Individual points.
    PointList,
    /// Individual lines.
    LineList,
    /// A connected strip of lines.
    LineStrip,
    /// A connected loop of lines.
    LineLoop,
    /// Individual triangles.
    TriangleList,
    /// A connected strip of triangles.
    TriangleStrip,
    /// A connected fan of triangles.
    TriangleFan,
}

/// A contiguous range of vertices within a vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VertexRange {
    buffer: Option<BufferHandle>,
    vertex_size: usize,
    start: usize,
    count: usize,
}

impl VertexRange {
    /// Returns the empty range.
    pub const fn empty() -> Self {
        Self {
            buffer: None,
            vertex_size: 0,
            start: 0,
            count: 0,
        }
    }

    pub(crate) fn new(
        buffer: BufferHandle,
        vertex_size: usize,
        start: usize,
        count: usize,
    ) -> Self {
        Self {
            buffer: Some(buffer),
            vertex_size,
            start,
            count,
        }
    }

    /// Copies `self.count()` vertices from `data` into this range.
    pub fn copy_from(&self, ctx: &mut RenderContext, data: &[u8]) -> Result<(), ResourceError> {
        self.transfer(ctx, data.len(), |ctx, buffer, offset| {
            ctx.device().write_buffer(buffer, offset, data)
        })
    }

    /// Copies `self.count()` vertices from this range into `out`.
    pub fn copy_to(&self, ctx: &mut RenderContext, out: &mut [u8]) -> Result<(), ResourceError> {
        self.transfer(ctx, out.len(), |ctx, buffer, offset| {
            ctx.device().read_buffer(buffer, offset, out)
        })
    }

    fn transfer(
        &self,
        ctx: &mut RenderContext,
        bytes: usize,
        op: impl FnOnce(&mut RenderContext, BufferHandle, usize) -> Result<(), ResourceError>,
    ) -> Result<(), ResourceError> {
        let expected = self.count * self.vertex_size;
        if bytes != expected {
            return Err(ResourceError::SizeMismatch {
                label: "vertex range".to_string(),
                expected,
                actual: bytes,
            });
        }

        let Some(buffer) = self.buffer else {
            // The empty range accepts (only) empty transfers.
            return Ok(());
        };

        ctx.bind_buffer_handle(crate::renderer::api::BufferKind::Vertex, Some(buffer));
        op(ctx, buffer, self.start * self.vertex_size)
    }

    /// Returns the handle of the underlying buffer, if any.
    pub fn buffer(&self) -> Option<BufferHandle> {
        self.buffer
    }

    /// Returns the index of the first vertex in this range.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Returns the number of vertices in this range.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns `true` if this range covers no vertices.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_none() || self.count == 0
    }
}

/// A contiguous range of indices within an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRange {
    buffer: Option<BufferHandle>,
    index_type: IndexType,
    start: usize,
    count: usize,
}

impl IndexRange {
    /// Returns the empty range.
    pub const fn empty() -> Self {
        Self {
            buffer: None,
            index_type: IndexType::U16,
            start: 0,
            count: 0,
        }
    }

    pub(crate) fn new(
        buffer: BufferHandle,
        index_type: IndexType,
        start: usize,
        count: usize,
    ) -> Self {
        Self {
            buffer: Some(buffer),
            index_type,
            start,
            count,
        }
    }

    /// Copies `self.count()` indices from `data` into this range.
    pub fn copy_from(&self, ctx: &mut RenderContext, data: &[u8]) -> Result<(), ResourceError> {
        self.transfer(ctx, data.len(), |ctx, buffer, offset| {
            ctx.device().write_buffer(buffer, offset, data)
        })
    }

    /// Copies `self.count()` indices from this range into `out`.
    pub fn copy_to(&self, ctx: &mut RenderContext, out: &mut [u8]) -> Result<(), ResourceError> {
        self.transfer(ctx, out.len(), |ctx, buffer, offset| {
            ctx.device().read_buffer(buffer, offset, out)
        })
    }

    fn transfer(
        &self,
        ctx: &mut RenderContext,
        bytes: usize,
        op: impl FnOnce(&mut RenderContext, BufferHandle, usize) -> Result<(), ResourceError>,
    ) -> Result<(), ResourceError> {
        let expected = self.count * self.index_type.size();
        if bytes != expected {
            return Err(ResourceError::SizeMismatch {
                label: "index range".to_string(),
                expected,
                actual: bytes,
            });
        }

        let Some(buffer) = self.buffer else {
            return Ok(());
        };

        ctx.bind_buffer_handle(crate::renderer::api::BufferKind::Index, Some(buffer));
        op(ctx, buffer, self.start * self.index_type.size())
    }

    /// Returns the handle of the underlying buffer, if any.
    pub fn buffer(&self) -> Option<BufferHandle> {
        self.buffer
    }

    /// Returns the element type of the underlying buffer.
    pub fn index_type(&self) -> IndexType {
        self.index_type
    }

    /// Returns the index of the first element in this range.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Returns the number of elements in this range.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns `true` if this range covers no elements.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_none() || self.count == 0
    }
}

impl Default for IndexRange {
    fn default() -> Self {
        Self::empty()
    }
}

/// A renderable range of primitives: a mode, vertex data, and optionally
/// index data.
#[derive(Debug, Clone, Copy)]
pub struct PrimitiveRange {
    mode: PrimitiveMode,
    vertex_buffer: Option<BufferHandle>,
    index: Option<(BufferHandle, IndexType)>,
    start: usize,
    count: usize,
}

impl PrimitiveRange {
    /// Returns the empty range.
    pub const fn empty() -> Self {
        Self {
            mode: PrimitiveMode::TriangleList,
            vertex_buffer: None,
            index: None,
            start: 0,
            count: 0,
        }
    }

    /// Covers a whole vertex buffer without indices.
    pub fn new(mode: PrimitiveMode, vertex_buffer: &VertexBuffer) -> Self {
        Self {
            mode,
            vertex_buffer: Some(vertex_buffer.handle()),
            index: None,
            start: 0,
            count: vertex_buffer.count(),
        }
    }

    /// Covers a vertex range without indices.
    pub fn with_vertex_range(mode: PrimitiveMode, range: VertexRange) -> Self {
        Self {
            mode,
            vertex_buffer: range.buffer(),
            index: None,
            start: range.start(),
            count: range.count(),
        }
    }

    /// Covers an index range drawing from the given vertex buffer.
    pub fn with_index_range(
        mode: PrimitiveMode,
        vertex_buffer: &VertexBuffer,
        range: IndexRange,
    ) -> Self {
        Self {
            mode,
            vertex_buffer: Some(vertex_buffer.handle()),
            index: range.buffer().map(|b| (b, range.index_type())),
            start: range.start(),
            count: range.count(),
        }
    }

    /// Returns `true` if there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.count == 0 || self.vertex_buffer.is_none()
    }

    /// Returns the primitive mode.
    pub fn mode(&self) -> PrimitiveMode {
        self.mode
    }

    /// Returns the vertex buffer handle, if any.
    pub fn vertex_buffer(&self) -> Option<BufferHandle> {
        self.vertex_buffer
    }

    /// Returns the index buffer handle and element type, if indexed.
    pub fn index_buffer(&self) -> Option<(BufferHandle, IndexType)> {
        self.index
    }

    /// Returns the first vertex or index drawn.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Returns the number of vertices or indices drawn.
    pub fn count(&self) -> usize {
        self.count
    }
}

impl Default for PrimitiveRange {
    fn default() -> Self {
        Self::empty()
    }
}
