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

//! The device abstraction the rendering core drives.

use std::fmt;

use crate::math::{LinearRgba, Recti};
use crate::renderer::api::{
    ActiveInput, AttachmentPoint, BufferDescriptor, BufferHandle, BufferKind, DeviceLimits,
    FramebufferHandle, IndexType, PrimitiveMode, ProgramHandle, RenderState, ShaderHandle,
    ShaderStage, TextureDescriptor, TextureHandle, UniformValue, VertexArrayHandle,
    VertexArrayLayout,
};
use crate::renderer::error::{ResourceError, ShaderError};

/// A combined clear of any subset of the current render target's buffers.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClearOps {
    /// Color to clear to, if the color buffer is cleared.
    pub color: Option<LinearRgba>,
    /// Depth to clear to, if the depth buffer is cleared.
    pub depth: Option<f32>,
    /// Value to clear to, if the stencil buffer is cleared.
    pub stencil: Option<u32>,
}

/// Low-level graphics operations implemented by a backend.
///
/// The context owns a boxed device and is the only caller; backends keep
/// their state behind interior mutability. Binding deduplication lives in
/// the context, so every `bind_*` call here reaches the backend.
pub trait RenderDevice: fmt::Debug {
    /// Allocates a zero-initialized buffer.
    fn create_buffer(&self, descriptor: &BufferDescriptor<'_>)
        -> Result<BufferHandle, ResourceError>;

    /// Releases a buffer object.
    fn destroy_buffer(&self, handle: BufferHandle) -> Result<(), ResourceError>;

    /// Writes `data` into a buffer at a byte offset.
    ///
    /// Fails with [`ResourceError::OutOfRange`] without partial effect when
    /// the write exceeds the buffer.
    fn write_buffer(
        &self,
        handle: BufferHandle,
        offset: usize,
        data: &[u8],
    ) -> Result<(), ResourceError>;

    /// Reads bytes from a buffer at a byte offset into `out`.
    fn read_buffer(
        &self,
        handle: BufferHandle,
        offset: usize,
        out: &mut [u8],
    ) -> Result<(), ResourceError>;

    /// Compiles shader source for one stage.
    ///
    /// On failure the error carries the backend's info log.
    fn compile_shader(
        &self,
        stage: ShaderStage,
        source: &str,
        label: &str,
    ) -> Result<ShaderHandle, ShaderError>;

    /// Releases a shader object.
    fn destroy_shader(&self, handle: ShaderHandle) -> Result<(), ResourceError>;

    /// Links a vertex and a fragment shader into a program.
    fn link_program(
        &self,
        vertex: ShaderHandle,
        fragment: ShaderHandle,
        label: &str,
    ) -> Result<ProgramHandle, ShaderError>;

    /// Releases a program object.
    fn destroy_program(&self, handle: ProgramHandle) -> Result<(), ResourceError>;

    /// Reports the active vertex attributes of a linked program.
    fn reflect_attributes(&self, program: ProgramHandle) -> Vec<ActiveInput>;

    /// Reports the active uniforms (sampler and non-sampler) of a linked
    /// program.
    fn reflect_uniforms(&self, program: ProgramHandle) -> Vec<ActiveInput>;

    /// Assigns a texture unit to a sampler uniform.
    fn set_sampler_unit(&self, program: ProgramHandle, location: i32, unit: u32);

    /// Uploads a uniform value.
    fn set_uniform(&self, program: ProgramHandle, location: i32, value: &UniformValue);

    /// Creates a vertex array object from a resolved layout.
    fn create_vertex_array(
        &self,
        layout: &VertexArrayLayout,
    ) -> Result<VertexArrayHandle, ResourceError>;

    /// Releases a vertex array object.
    fn destroy_vertex_array(&self, handle: VertexArrayHandle) -> Result<(), ResourceError>;

    /// Allocates a texture.
    fn create_texture(&self, descriptor: &TextureDescriptor<'_>)
        -> Result<TextureHandle, ResourceError>;

    /// Releases a texture object.
    fn destroy_texture(&self, handle: TextureHandle) -> Result<(), ResourceError>;

    /// Creates an offscreen framebuffer with no attachments.
    fn create_framebuffer(&self, label: &str) -> Result<FramebufferHandle, ResourceError>;

    /// Releases a framebuffer object.
    fn destroy_framebuffer(&self, handle: FramebufferHandle) -> Result<(), ResourceError>;

    /// Attaches a texture to a framebuffer point, or detaches with `None`.
    fn set_framebuffer_attachment(
        &self,
        framebuffer: FramebufferHandle,
        point: AttachmentPoint,
        texture: Option<TextureHandle>,
    ) -> Result<(), ResourceError>;

    /// Makes a program current, or none.
    fn bind_program(&self, program: Option<ProgramHandle>);

    /// Makes a buffer current at its kind's bind point, or none.
    fn bind_buffer(&self, kind: BufferKind, buffer: Option<BufferHandle>);

    /// Makes a vertex array current, or none.
    fn bind_vertex_array(&self, array: Option<VertexArrayHandle>);

    /// Makes a framebuffer current; `None` selects the default framebuffer.
    fn bind_framebuffer(&self, framebuffer: Option<FramebufferHandle>);

    /// Selects the active texture unit.
    fn set_active_texture_unit(&self, unit: u32);

    /// Binds a texture to a unit, or unbinds with `None`.
    fn bind_texture(&self, unit: u32, texture: Option<TextureHandle>);

    /// Sets the viewport rectangle.
    fn set_viewport(&self, area: Recti);

    /// Sets the scissor rectangle; `None` disables the scissor test.
    fn set_scissor(&self, area: Option<Recti>);

    /// Applies a complete fixed-function state.
    fn apply_render_state(&self, state: &RenderState);

    /// Clears any subset of the current render target's buffers.
    fn clear(&self, ops: &ClearOps);

    /// Draws `count` unindexed vertices starting at `first`.
    fn draw(&self, mode: PrimitiveMode, first: usize, count: usize);

    /// Draws `count` indices starting at index `first`.
    fn draw_indexed(&self, mode: PrimitiveMode, index_type: IndexType, first: usize, count: usize);

    /// Returns the device's capability limits.
    fn limits(&self) -> DeviceLimits;

    /// Presents the current frame.
    fn swap_buffers(&self);
}
