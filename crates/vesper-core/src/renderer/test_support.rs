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

//! A counting in-memory device for unit tests.
//!
//! Buffers are real byte vectors with bounds checking; everything else just
//! counts calls. Tests keep a clone of the device to inspect counters after
//! handing it to a context.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::math::Recti;
use crate::renderer::api::{
    ActiveInput, AttachmentPoint, BufferDescriptor, BufferHandle, BufferKind, DeviceLimits,
    FramebufferHandle, IndexType, PrimitiveMode, ProgramHandle, RenderState, ShaderHandle,
    ShaderStage, TextureDescriptor, TextureHandle, UniformValue, VertexArrayHandle,
    VertexArrayLayout,
};
use crate::renderer::error::{ResourceError, ShaderError};
use crate::renderer::traits::{ClearOps, RenderDevice};

#[derive(Debug, Default)]
struct CountingState {
    buffers: HashMap<usize, Vec<u8>>,
    next_handle: usize,
    fail_next_buffer: bool,
    buffer_binds: u32,
    program_binds: u32,
    texture_binds: u32,
    vertex_array_binds: u32,
    framebuffer_binds: u32,
    unit_switches: u32,
    scissor_calls: Vec<Option<Recti>>,
    draws: u32,
    swaps: u32,
}

/// In-memory [`RenderDevice`] that records the calls it receives.
#[derive(Debug, Clone, Default)]
pub(crate) struct CountingDevice {
    state: Rc<RefCell<CountingState>>,
}

impl CountingDevice {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Makes the next `create_buffer` call fail.
    pub(crate) fn fail_next_buffer(&self) {
        self.state.borrow_mut().fail_next_buffer = true;
    }

    pub(crate) fn buffer_binds(&self) -> u32 {
        self.state.borrow().buffer_binds
    }

    pub(crate) fn program_binds(&self) -> u32 {
        self.state.borrow().program_binds
    }

    pub(crate) fn texture_binds(&self) -> u32 {
        self.state.borrow().texture_binds
    }

    pub(crate) fn unit_switches(&self) -> u32 {
        self.state.borrow().unit_switches
    }

    pub(crate) fn scissor_calls(&self) -> Vec<Option<Recti>> {
        self.state.borrow().scissor_calls.clone()
    }

    pub(crate) fn draws(&self) -> u32 {
        self.state.borrow().draws
    }

    pub(crate) fn swaps(&self) -> u32 {
        self.state.borrow().swaps
    }

    pub(crate) fn buffer_count(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    pub(crate) fn buffer_contents(&self, handle: BufferHandle) -> Vec<u8> {
        self.state.borrow().buffers[&handle.0].clone()
    }
}

impl RenderDevice for CountingDevice {
    fn create_buffer(
        &self,
        descriptor: &BufferDescriptor<'_>,
    ) -> Result<BufferHandle, ResourceError> {
        let mut state = self.state.borrow_mut();
        if state.fail_next_buffer {
            state.fail_next_buffer = false;
            return Err(ResourceError::AllocationFailed {
                label: descriptor
                    .label
                    .as_deref()
                    .unwrap_or_default()
                    .to_string(),
                details: "injected failure".to_string(),
            });
        }
        state.next_handle += 1;
        let handle = state.next_handle;
        state.buffers.insert(handle, vec![0u8; descriptor.size]);
        Ok(BufferHandle(handle))
    }

    fn destroy_buffer(&self, handle: BufferHandle) -> Result<(), ResourceError> {
        self.state
            .borrow_mut()
            .buffers
            .remove(&handle.0)
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle {
                details: format!("buffer {}", handle.0),
            })
    }

    fn write_buffer(
        &self,
        handle: BufferHandle,
        offset: usize,
        data: &[u8],
    ) -> Result<(), ResourceError> {
        let mut state = self.state.borrow_mut();
        let buffer = state
            .buffers
            .get_mut(&handle.0)
            .ok_or(ResourceError::InvalidHandle {
                details: format!("buffer {}", handle.0),
            })?;
        if offset + data.len() > buffer.len() {
            return Err(ResourceError::OutOfRange {
                label: format!("buffer {}", handle.0),
                offset,
                len: data.len(),
                capacity: buffer.len(),
            });
        }
        buffer[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn read_buffer(
        &self,
        handle: BufferHandle,
        offset: usize,
        out: &mut [u8],
    ) -> Result<(), ResourceError> {
        let state = self.state.borrow();
        let buffer = state
            .buffers
            .get(&handle.0)
            .ok_or(ResourceError::InvalidHandle {
                details: format!("buffer {}", handle.0),
            })?;
        if offset + out.len() > buffer.len() {
            return Err(ResourceError::OutOfRange {
                label: format!("buffer {}", handle.0),
                offset,
                len: out.len(),
                capacity: buffer.len(),
            });
        }
        out.copy_from_slice(&buffer[offset..offset + out.len()]);
        Ok(())
    }

    fn compile_shader(
        &self,
        _stage: ShaderStage,
        _source: &str,
        label: &str,
    ) -> Result<ShaderHandle, ShaderError> {
        Err(ShaderError::CompileFailed {
            label: label.to_string(),
            info_log: "counting device has no compiler".to_string(),
        })
    }

    fn destroy_shader(&self, _handle: ShaderHandle) -> Result<(), ResourceError> {
        Ok(())
    }

    fn link_program(
        &self,
        _vertex: ShaderHandle,
        _fragment: ShaderHandle,
        label: &str,
    ) -> Result<ProgramHandle, ShaderError> {
        Err(ShaderError::LinkFailed {
            label: label.to_string(),
            info_log: "counting device has no linker".to_string(),
        })
    }

    fn destroy_program(&self, _handle: ProgramHandle) -> Result<(), ResourceError> {
        Ok(())
    }

    fn reflect_attributes(&self, _program: ProgramHandle) -> Vec<ActiveInput> {
        Vec::new()
    }

    fn reflect_uniforms(&self, _program: ProgramHandle) -> Vec<ActiveInput> {
        Vec::new()
    }

    fn set_sampler_unit(&self, _program: ProgramHandle, _location: i32, _unit: u32) {}

    fn set_uniform(&self, _program: ProgramHandle, _location: i32, _value: &UniformValue) {}

    fn create_vertex_array(
        &self,
        _layout: &VertexArrayLayout,
    ) -> Result<VertexArrayHandle, ResourceError> {
        let mut state = self.state.borrow_mut();
        state.next_handle += 1;
        Ok(VertexArrayHandle(state.next_handle))
    }

    fn destroy_vertex_array(&self, _handle: VertexArrayHandle) -> Result<(), ResourceError> {
        Ok(())
    }

    fn create_texture(
        &self,
        _descriptor: &TextureDescriptor<'_>,
    ) -> Result<TextureHandle, ResourceError> {
        let mut state = self.state.borrow_mut();
        state.next_handle += 1;
        Ok(TextureHandle(state.next_handle))
    }

    fn destroy_texture(&self, _handle: TextureHandle) -> Result<(), ResourceError> {
        Ok(())
    }

    fn create_framebuffer(&self, _label: &str) -> Result<FramebufferHandle, ResourceError> {
        let mut state = self.state.borrow_mut();
        state.next_handle += 1;
        Ok(FramebufferHandle(state.next_handle))
    }

    fn destroy_framebuffer(&self, _handle: FramebufferHandle) -> Result<(), ResourceError> {
        Ok(())
    }

    fn set_framebuffer_attachment(
        &self,
        _framebuffer: FramebufferHandle,
        _point: AttachmentPoint,
        _texture: Option<TextureHandle>,
    ) -> Result<(), ResourceError> {
        Ok(())
    }

    fn bind_program(&self, _program: Option<ProgramHandle>) {
        self.state.borrow_mut().program_binds += 1;
    }

    fn bind_buffer(&self, _kind: BufferKind, _buffer: Option<BufferHandle>) {
        self.state.borrow_mut().buffer_binds += 1;
    }

    fn bind_vertex_array(&self, _array: Option<VertexArrayHandle>) {
        self.state.borrow_mut().vertex_array_binds += 1;
    }

    fn bind_framebuffer(&self, _framebuffer: Option<FramebufferHandle>) {
        self.state.borrow_mut().framebuffer_binds += 1;
    }

    fn set_active_texture_unit(&self, _unit: u32) {
        self.state.borrow_mut().unit_switches += 1;
    }

    fn bind_texture(&self, _unit: u32, _texture: Option<TextureHandle>) {
        self.state.borrow_mut().texture_binds += 1;
    }

    fn set_viewport(&self, _area: Recti) {}

    fn set_scissor(&self, area: Option<Recti>) {
        self.state.borrow_mut().scissor_calls.push(area);
    }

    fn apply_render_state(&self, _state: &RenderState) {}

    fn clear(&self, _ops: &ClearOps) {}

    fn draw(&self, _mode: PrimitiveMode, _first: usize, _count: usize) {
        self.state.borrow_mut().draws += 1;
    }

    fn draw_indexed(
        &self,
        _mode: PrimitiveMode,
        _index_type: IndexType,
        _first: usize,
        _count: usize,
    ) {
        self.state.borrow_mut().draws += 1;
    }

    fn limits(&self) -> DeviceLimits {
        DeviceLimits {
            max_color_attachments: 4,
            max_draw_buffers: 4,
            max_vertex_texture_image_units: 16,
            max_fragment_texture_image_units: 16,
            max_combined_texture_image_units: 32,
            max_texture_size: 4096,
            max_vertex_attributes: 16,
        }
    }

    fn swap_buffers(&self) {
        self.state.borrow_mut().swaps += 1;
    }
}

/// Builds a context over a fresh counting device, returning both.
pub(crate) fn counting_context() -> (crate::renderer::context::RenderContext, CountingDevice) {
    let device = CountingDevice::new();
    let ctx = crate::renderer::context::RenderContext::new(
        Box::new(device.clone()),
        &crate::renderer::api::RenderConfig::default(),
        640,
        480,
    );
    (ctx, device)
}
