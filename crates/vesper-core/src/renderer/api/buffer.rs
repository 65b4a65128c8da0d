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

//! GPU vertex and index buffers.
//!
//! Buffers are created through a [`RenderContext`] and hold their device
//! handle plus enough metadata to validate element-granular transfers. Every
//! operation on a buffer makes it the current buffer of its kind on the
//! context, so redundant device binds are elided.

use std::borrow::Cow;
use std::ops::{Deref, DerefMut};

use crate::renderer::api::format::VertexFormat;
use crate::renderer::api::handle::BufferHandle;
use crate::renderer::api::range::{IndexRange, VertexRange};
use crate::renderer::context::RenderContext;
use crate::renderer::error::ResourceError;

/// The kind of a buffer object, deciding its bind point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// Vertex data.
    Vertex,
    /// Index (element) data.
    Index,
}

/// Usage hint for a buffer allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    /// Data is specified once and used many times.
    Static,
    /// Data is specified once and used a few times.
    Stream,
    /// Data is repeatedly respecified and re-used.
    Dynamic,
}

/// Access mode requested when locking a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockMode {
    /// Read-only access; the mapping is discarded on unlock.
    ReadOnly,
    /// Write-only access.
    WriteOnly,
    /// Read and write access.
    ReadWrite,
}

/// The element type of an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexType {
    /// Indices are `u8`.
    U8,
    /// Indices are `u16`.
    U16,
    /// Indices are `u32`.
    U32,
}

impl IndexType {
    /// Returns the size of one index in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }
}

/// Description of a buffer allocation handed to the device.
#[derive(Debug, Clone)]
pub struct BufferDescriptor<'a> {
    /// Optional label for logs and diagnostics.
    pub label: Option<Cow<'a, str>>,
    /// Size of the allocation in bytes.
    pub size: usize,
    /// Kind of the buffer.
    pub kind: BufferKind,
    /// Usage hint.
    pub usage: BufferUsage,
}

/// A byte staging area for a locked buffer.
///
/// Obtained from `lock` and consumed by `unlock`, which writes the bytes
/// back unless the lock was read-only. Consuming the mapping makes a double
/// unlock unrepresentable.
#[derive(Debug)]
pub struct MappedBuffer {
    bytes: Vec<u8>,
    mode: LockMode,
    buffer: BufferHandle,
}

impl MappedBuffer {
    /// Returns the access mode this mapping was locked with.
    pub fn mode(&self) -> LockMode {
        self.mode
    }
}

impl Deref for MappedBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}

impl DerefMut for MappedBuffer {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

/// Shared bookkeeping for vertex and index buffers.
#[derive(Debug)]
struct RawBuffer {
    handle: BufferHandle,
    kind: BufferKind,
    usage: BufferUsage,
    element_size: usize,
    count: usize,
    locked: bool,
    label: String,
}

impl RawBuffer {
    fn new(
        ctx: &mut RenderContext,
        kind: BufferKind,
        count: usize,
        element_size: usize,
        usage: BufferUsage,
        label: &str,
    ) -> Result<Self, ResourceError> {
        let size = count * element_size;
        let handle = ctx.device().create_buffer(&BufferDescriptor {
            label: Some(Cow::Borrowed(label)),
            size,
            kind,
            usage,
        })?;
        ctx.stats_mut().buffer_created(size);

        Ok(Self {
            handle,
            kind,
            usage,
            element_size,
            count,
            locked: false,
            label: label.to_string(),
        })
    }

    fn size(&self) -> usize {
        self.count * self.element_size
    }

    fn lock(
        &mut self,
        ctx: &mut RenderContext,
        mode: LockMode,
    ) -> Result<MappedBuffer, ResourceError> {
        if self.locked {
            return Err(ResourceError::AlreadyLocked {
                label: self.label.clone(),
            });
        }

        ctx.bind_buffer_handle(self.kind, Some(self.handle));

        // The staging area always carries the current contents, so partial
        // writes under a write lock cannot clobber untouched elements.
        let mut bytes = vec![0u8; self.size()];
        ctx.device().read_buffer(self.handle, 0, &mut bytes)?;

        self.locked = true;
        Ok(MappedBuffer {
            bytes,
            mode,
            buffer: self.handle,
        })
    }

    fn unlock(&mut self, ctx: &mut RenderContext, mapping: MappedBuffer) {
        assert_eq!(
            mapping.buffer, self.handle,
            "unlock with a mapping from a different buffer"
        );

        self.locked = false;
        if mapping.mode == LockMode::ReadOnly {
            return;
        }

        ctx.bind_buffer_handle(self.kind, Some(self.handle));
        if let Err(e) = ctx.device().write_buffer(self.handle, 0, &mapping.bytes) {
            log::error!("Failed to write back mapping of '{}': {e}", self.label);
        }
    }

    fn copy_from(
        &self,
        ctx: &mut RenderContext,
        data: &[u8],
        count: usize,
        start: usize,
    ) -> Result<(), ResourceError> {
        self.check_range(count, start)?;
        self.check_size(data.len(), count)?;

        ctx.bind_buffer_handle(self.kind, Some(self.handle));
        ctx.device()
            .write_buffer(self.handle, start * self.element_size, data)
    }

    fn copy_to(
        &self,
        ctx: &mut RenderContext,
        out: &mut [u8],
        count: usize,
        start: usize,
    ) -> Result<(), ResourceError> {
        self.check_range(count, start)?;
        self.check_size(out.len(), count)?;

        ctx.bind_buffer_handle(self.kind, Some(self.handle));
        ctx.device()
            .read_buffer(self.handle, start * self.element_size, out)
    }

    fn check_range(&self, count: usize, start: usize) -> Result<(), ResourceError> {
        if start + count > self.count {
            return Err(ResourceError::OutOfRange {
                label: self.label.clone(),
                offset: start,
                len: count,
                capacity: self.count,
            });
        }
        Ok(())
    }

    fn check_size(&self, bytes: usize, count: usize) -> Result<(), ResourceError> {
        let expected = count * self.element_size;
        if bytes != expected {
            return Err(ResourceError::SizeMismatch {
                label: self.label.clone(),
                expected,
                actual: bytes,
            });
        }
        Ok(())
    }

    fn destroy(self, ctx: &mut RenderContext) {
        if let Err(e) = ctx.device().destroy_buffer(self.handle) {
            log::warn!("Failed to destroy buffer '{}': {e}", self.label);
        }
        ctx.bind_buffer_handle_forget(self.kind, self.handle);
        ctx.stats_mut().buffer_destroyed(self.size());
    }
}

/// A GPU buffer of interleaved vertices.
#[derive(Debug)]
pub struct VertexBuffer {
    raw: RawBuffer,
    format: VertexFormat,
}

impl VertexBuffer {
    /// Creates a vertex buffer holding `count` zero-initialized vertices of
    /// the given format.
    pub fn new(
        ctx: &mut RenderContext,
        count: usize,
        format: VertexFormat,
        usage: BufferUsage,
        label: &str,
    ) -> Result<Self, ResourceError> {
        let raw = RawBuffer::new(ctx, BufferKind::Vertex, count, format.size(), usage, label)?;
        Ok(Self { raw, format })
    }

    /// Locks this buffer and returns a staging mapping of its contents.
    ///
    /// Fails with [`ResourceError::AlreadyLocked`] while a mapping is
    /// outstanding.
    pub fn lock(
        &mut self,
        ctx: &mut RenderContext,
        mode: LockMode,
    ) -> Result<MappedBuffer, ResourceError> {
        self.raw.lock(ctx, mode)
    }

    /// Unlocks this buffer, writing the mapping back unless it was read-only.
    pub fn unlock(&mut self, ctx: &mut RenderContext, mapping: MappedBuffer) {
        self.raw.unlock(ctx, mapping);
    }

    /// Copies `count` vertices from `data` into this buffer starting at
    /// vertex `start`. On failure no partial transfer is performed.
    pub fn copy_from(
        &self,
        ctx: &mut RenderContext,
        data: &[u8],
        count: usize,
        start: usize,
    ) -> Result<(), ResourceError> {
        self.raw.copy_from(ctx, data, count, start)
    }

    /// Copies `count` vertices starting at vertex `start` into `out`.
    pub fn copy_to(
        &self,
        ctx: &mut RenderContext,
        out: &mut [u8],
        count: usize,
        start: usize,
    ) -> Result<(), ResourceError> {
        self.raw.copy_to(ctx, out, count, start)
    }

    /// Returns a non-owning range over `count` vertices starting at `start`.
    pub fn range(&self, start: usize, count: usize) -> VertexRange {
        debug_assert!(start + count <= self.raw.count);
        VertexRange::new(self.raw.handle, self.format.size(), start, count)
    }

    /// Returns the vertex format of this buffer.
    pub fn format(&self) -> &VertexFormat {
        &self.format
    }

    /// Returns the number of vertices in this buffer.
    pub fn count(&self) -> usize {
        self.raw.count
    }

    /// Returns the usage hint of this buffer.
    pub fn usage(&self) -> BufferUsage {
        self.raw.usage
    }

    /// Returns the device handle of this buffer.
    pub fn handle(&self) -> BufferHandle {
        self.raw.handle
    }

    /// Returns `true` while a mapping is outstanding.
    pub fn is_locked(&self) -> bool {
        self.raw.locked
    }

    /// Releases the device object and updates resource statistics.
    pub fn destroy(self, ctx: &mut RenderContext) {
        self.raw.destroy(ctx);
    }
}

/// A GPU buffer of primitive indices.
#[derive(Debug)]
pub struct IndexBuffer {
    raw: RawBuffer,
    index_type: IndexType,
}

impl IndexBuffer {
    /// Creates an index buffer holding `count` zero-initialized indices of
    /// the given type.
    pub fn new(
        ctx: &mut RenderContext,
        count: usize,
        index_type: IndexType,
        usage: BufferUsage,
        label: &str,
    ) -> Result<Self, ResourceError> {
        let raw = RawBuffer::new(ctx, BufferKind::Index, count, index_type.size(), usage, label)?;
        Ok(Self { raw, index_type })
    }

    /// Locks this buffer and returns a staging mapping of its contents.
    pub fn lock(
        &mut self,
        ctx: &mut RenderContext,
        mode: LockMode,
    ) -> Result<MappedBuffer, ResourceError> {
        self.raw.lock(ctx, mode)
    }

    /// Unlocks this buffer, writing the mapping back unless it was read-only.
    pub fn unlock(&mut self, ctx: &mut RenderContext, mapping: MappedBuffer) {
        self.raw.unlock(ctx, mapping);
    }

    /// Copies `count` indices from `data` into this buffer starting at
    /// index `start`. On failure no partial transfer is performed.
    pub fn copy_from(
        &self,
        ctx: &mut RenderContext,
        data: &[u8],
        count: usize,
        start: usize,
    ) -> Result<(), ResourceError> {
        self.raw.copy_from(ctx, data, count, start)
    }

    /// Copies `count` indices starting at index `start` into `out`.
    pub fn copy_to(
        &self,
        ctx: &mut RenderContext,
        out: &mut [u8],
        count: usize,
        start: usize,
    ) -> Result<(), ResourceError> {
        self.raw.copy_to(ctx, out, count, start)
    }

    /// Returns a non-owning range over `count` indices starting at `start`.
    pub fn range(&self, start: usize, count: usize) -> IndexRange {
        debug_assert!(start + count <= self.raw.count);
        IndexRange::new(self.raw.handle, self.index_type, start, count)
    }

    /// Returns the element type of this buffer.
    pub fn index_type(&self) -> IndexType {
        self.index_type
    }

    /// Returns the number of indices in this buffer.
    pub fn count(&self) -> usize {
        self.raw.count
    }

    /// Returns the usage hint of this buffer.
    pub fn usage(&self) -> BufferUsage {
        self.raw.usage
    }

    /// Returns the device handle of this buffer.
    pub fn handle(&self) -> BufferHandle {
        self.raw.handle
    }

    /// Returns `true` while a mapping is outstanding.
    pub fn is_locked(&self) -> bool {
        self.raw.locked
    }

    /// Releases the device object and updates resource statistics.
    pub fn destroy(self, ctx: &mut RenderContext) {
        self.raw.destroy(ctx);
    }
}
