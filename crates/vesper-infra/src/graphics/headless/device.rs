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

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use vesper_core::math::Recti;
use vesper_core::renderer::api::{
    ActiveInput, AttachmentPoint, BufferDescriptor, BufferHandle, BufferKind, DeviceLimits,
    FramebufferHandle, IndexType, PrimitiveMode, ProgramHandle, RenderState, ShaderHandle,
    ShaderStage, TextureDescriptor, TextureHandle, UniformValue, VertexArrayHandle,
    VertexArrayLayout,
};
use vesper_core::renderer::error::{ResourceError, ShaderError};
use vesper_core::renderer::traits::{ClearOps, RenderDevice};

use super::reflect::{self, Declaration, ShaderInputs};

/// Call counters the device keeps for inspection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceCounters {
    /// Number of `bind_buffer` calls received.
    pub buffer_binds: u32,
    /// Number of `bind_program` calls received.
    pub program_binds: u32,
    /// Number of `bind_texture` calls received.
    pub texture_binds: u32,
    /// Number of `bind_vertex_array` calls received.
    pub vertex_array_binds: u32,
    /// Number of `bind_framebuffer` calls received.
    pub framebuffer_binds: u32,
    /// Number of active texture unit switches received.
    pub unit_switches: u32,
    /// Number of draw operations received.
    pub draw_calls: u32,
    /// Number of presented frames.
    pub frames: u32,
}

/// One recorded draw operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    /// Primitive mode of the draw.
    pub mode: PrimitiveMode,
    /// Index type for indexed draws, `None` for unindexed.
    pub index_type: Option<IndexType>,
    /// First vertex or index drawn.
    pub first: usize,
    /// Number of vertices or indices drawn.
    pub count: usize,
}

#[derive(Debug)]
struct ShaderRecord {
    inputs: ShaderInputs,
}

#[derive(Debug)]
struct ProgramRecord {
    attributes: Vec<ActiveInput>,
    uniforms: Vec<ActiveInput>,
}

impl ProgramRecord {
    fn uniform_location(&self, name: &str) -> Option<i32> {
        self.uniforms
            .iter()
            .find(|u| u.name == name)
            .map(|u| u.location)
    }
}

#[derive(Debug)]
struct TextureRecord {
    width: u32,
    height: u32,
}

#[derive(Debug, Default)]
struct HeadlessState {
    next_handle: usize,
    buffers: HashMap<usize, Vec<u8>>,
    shaders: HashMap<usize, ShaderRecord>,
    programs: HashMap<usize, ProgramRecord>,
    textures: HashMap<usize, TextureRecord>,
    framebuffers: HashMap<usize, HashMap<AttachmentPoint, TextureHandle>>,
    vertex_arrays: HashMap<usize, VertexArrayLayout>,
    uniform_values: HashMap<(usize, i32), UniformValue>,
    sampler_units: HashMap<(usize, i32), u32>,
    counters: DeviceCounters,
    draw_calls: Vec<DrawCall>,
}

impl HeadlessState {
    fn allocate_handle(&mut self) -> usize {
        self.next_handle += 1;
        self.next_handle
    }
}

/// A software [`RenderDevice`] holding all resources in host memory.
///
/// Cloning is shallow; all clones share one device. The device records
/// every draw and keeps the last value set on every uniform, so tests can
/// verify what a context and its programs actually did.
#[derive(Debug, Clone, Default)]
pub struct HeadlessDevice {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessDevice {
    /// Creates an empty device.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the call counters.
    pub fn counters(&self) -> DeviceCounters {
        self.state.borrow().counters
    }

    /// Returns every draw recorded so far, in order.
    pub fn draw_calls(&self) -> Vec<DrawCall> {
        self.state.borrow().draw_calls.clone()
    }

    /// Returns the contents of a buffer, if it exists.
    pub fn buffer_contents(&self, handle: BufferHandle) -> Option<Vec<u8>> {
        self.state.borrow().buffers.get(&handle.0).cloned()
    }

    /// Returns the last value uploaded to a named uniform of a program.
    pub fn uniform_value(&self, program: ProgramHandle, name: &str) -> Option<UniformValue> {
        let state = self.state.borrow();
        let location = state.programs.get(&program.0)?.uniform_location(name)?;
        state.uniform_values.get(&(program.0, location)).copied()
    }

    /// Returns the texture unit assigned to a named sampler of a program.
    pub fn sampler_unit(&self, program: ProgramHandle, name: &str) -> Option<u32> {
        let state = self.state.borrow();
        let location = state.programs.get(&program.0)?.uniform_location(name)?;
        state.sampler_units.get(&(program.0, location)).copied()
    }

    /// Returns the texture attached to a framebuffer point, if any.
    pub fn framebuffer_attachment(
        &self,
        framebuffer: FramebufferHandle,
        point: AttachmentPoint,
    ) -> Option<TextureHandle> {
        self.state
            .borrow()
            .framebuffers
            .get(&framebuffer.0)?
            .get(&point)
            .copied()
    }

    /// Returns the number of live buffer objects.
    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }
}

fn merge_uniforms(
    into: &mut Vec<Declaration>,
    from: &[Declaration],
    label: &str,
) -> Result<(), ShaderError> {
    for declaration in from {
        match into.iter().find(|d| d.name == declaration.name) {
            None => into.push(declaration.clone()),
            Some(existing) if existing.ty == declaration.ty => {}
            Some(_) => {
                return Err(ShaderError::LinkFailed {
                    label: label.to_string(),
                    info_log: format!(
                        "uniform '{}' declared with conflicting types",
                        declaration.name
                    ),
                });
            }
        }
    }
    Ok(())
}

impl RenderDevice for HeadlessDevice {
    fn create_buffer(
        &self,
        descriptor: &BufferDescriptor<'_>,
    ) -> Result<BufferHandle, ResourceError> {
        let mut state = self.state.borrow_mut();
        let handle = state.allocate_handle();
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
        stage: ShaderStage,
        source: &str,
        label: &str,
    ) -> Result<ShaderHandle, ShaderError> {
        let inputs =
            reflect::scan(stage, source).map_err(|info_log| ShaderError::CompileFailed {
                label: label.to_string(),
                info_log,
            })?;

        let mut state = self.state.borrow_mut();
        let handle = state.allocate_handle();
        state.shaders.insert(handle, ShaderRecord { inputs });
        Ok(ShaderHandle(handle))
    }

    fn destroy_shader(&self, handle: ShaderHandle) -> Result<(), ResourceError> {
        self.state
            .borrow_mut()
            .shaders
            .remove(&handle.0)
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle {
                details: format!("shader {}", handle.0),
            })
    }

    fn link_program(
        &self,
        vertex: ShaderHandle,
        fragment: ShaderHandle,
        label: &str,
    ) -> Result<ProgramHandle, ShaderError> {
        let mut state = self.state.borrow_mut();

        let mut uniforms: Vec<Declaration> = Vec::new();
        let mut attributes: Vec<Declaration> = Vec::new();
        for handle in [vertex, fragment] {
            let record = state
                .shaders
                .get(&handle.0)
                .ok_or_else(|| ShaderError::LinkFailed {
                    label: label.to_string(),
                    info_log: format!("unknown shader object {}", handle.0),
                })?;

            attributes.extend(record.inputs.attributes.iter().cloned());
            merge_uniforms(&mut uniforms, &record.inputs.uniforms, label)?;
        }

        let record = ProgramRecord {
            attributes: attributes
                .into_iter()
                .enumerate()
                .map(|(location, d)| ActiveInput {
                    name: d.name,
                    location: location as i32,
                    ty: d.ty,
                })
                .collect(),
            uniforms: uniforms
                .into_iter()
                .enumerate()
                .map(|(location, d)| ActiveInput {
                    name: d.name,
                    location: location as i32,
                    ty: d.ty,
                })
                .collect(),
        };

        let handle = state.allocate_handle();
        state.programs.insert(handle, record);
        Ok(ProgramHandle(handle))
    }

    fn destroy_program(&self, handle: ProgramHandle) -> Result<(), ResourceError> {
        self.state
            .borrow_mut()
            .programs
            .remove(&handle.0)
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle {
                details: format!("program {}", handle.0),
            })
    }

    fn reflect_attributes(&self, program: ProgramHandle) -> Vec<ActiveInput> {
        self.state
            .borrow()
            .programs
            .get(&program.0)
            .map(|r| r.attributes.clone())
            .unwrap_or_default()
    }

    fn reflect_uniforms(&self, program: ProgramHandle) -> Vec<ActiveInput> {
        self.state
            .borrow()
            .programs
            .get(&program.0)
            .map(|r| r.uniforms.clone())
            .unwrap_or_default()
    }

    fn set_sampler_unit(&self, program: ProgramHandle, location: i32, unit: u32) {
        self.state
            .borrow_mut()
            .sampler_units
            .insert((program.0, location), unit);
    }

    fn set_uniform(&self, program: ProgramHandle, location: i32, value: &UniformValue) {
        self.state
            .borrow_mut()
            .uniform_values
            .insert((program.0, location), *value);
    }

    fn create_vertex_array(
        &self,
        layout: &VertexArrayLayout,
    ) -> Result<VertexArrayHandle, ResourceError> {
        let mut state = self.state.borrow_mut();
        if !state.buffers.contains_key(&layout.vertex_buffer.0) {
            return Err(ResourceError::InvalidHandle {
                details: format!("vertex buffer {}", layout.vertex_buffer.0),
            });
        }
        let handle = state.allocate_handle();
        state.vertex_arrays.insert(handle, layout.clone());
        Ok(VertexArrayHandle(handle))
    }

    fn destroy_vertex_array(&self, handle: VertexArrayHandle) -> Result<(), ResourceError> {
        self.state
            .borrow_mut()
            .vertex_arrays
            .remove(&handle.0)
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle {
                details: format!("vertex array {}", handle.0),
            })
    }

    fn create_texture(
        &self,
        descriptor: &TextureDescriptor<'_>,
    ) -> Result<TextureHandle, ResourceError> {
        let mut state = self.state.borrow_mut();
        let limit = self.limits().max_texture_size;
        if descriptor.width > limit || descriptor.height > limit {
            return Err(ResourceError::AllocationFailed {
                label: descriptor
                    .label
                    .as_deref()
                    .unwrap_or_default()
                    .to_string(),
                details: format!(
                    "{}x{} exceeds the maximum texture size {limit}",
                    descriptor.width, descriptor.height
                ),
            });
        }
        let handle = state.allocate_handle();
        state.textures.insert(
            handle,
            TextureRecord {
                width: descriptor.width,
                height: descriptor.height,
            },
        );
        Ok(TextureHandle(handle))
    }

    fn destroy_texture(&self, handle: TextureHandle) -> Result<(), ResourceError> {
        self.state
            .borrow_mut()
            .textures
            .remove(&handle.0)
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle {
                details: format!("texture {}", handle.0),
            })
    }

    fn create_framebuffer(&self, _label: &str) -> Result<FramebufferHandle, ResourceError> {
        let mut state = self.state.borrow_mut();
        let handle = state.allocate_handle();
        state.framebuffers.insert(handle, HashMap::new());
        Ok(FramebufferHandle(handle))
    }

    fn destroy_framebuffer(&self, handle: FramebufferHandle) -> Result<(), ResourceError> {
        self.state
            .borrow_mut()
            .framebuffers
            .remove(&handle.0)
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle {
                details: format!("framebuffer {}", handle.0),
            })
    }

    fn set_framebuffer_attachment(
        &self,
        framebuffer: FramebufferHandle,
        point: AttachmentPoint,
        texture: Option<TextureHandle>,
    ) -> Result<(), ResourceError> {
        let mut state = self.state.borrow_mut();
        if let Some(texture) = texture {
            if !state.textures.contains_key(&texture.0) {
                return Err(ResourceError::InvalidHandle {
                    details: format!("texture {}", texture.0),
                });
            }
        }
        let attachments =
            state
                .framebuffers
                .get_mut(&framebuffer.0)
                .ok_or(ResourceError::InvalidHandle {
                    details: format!("framebuffer {}", framebuffer.0),
                })?;
        match texture {
            Some(texture) => {
                attachments.insert(point, texture);
            }
            None => {
                attachments.remove(&point);
            }
        }
        Ok(())
    }

    fn bind_program(&self, _program: Option<ProgramHandle>) {
        self.state.borrow_mut().counters.program_binds += 1;
    }

    fn bind_buffer(&self, _kind: BufferKind, _buffer: Option<BufferHandle>) {
        self.state.borrow_mut().counters.buffer_binds += 1;
    }

    fn bind_vertex_array(&self, _array: Option<VertexArrayHandle>) {
        self.state.borrow_mut().counters.vertex_array_binds += 1;
    }

    fn bind_framebuffer(&self, _framebuffer: Option<FramebufferHandle>) {
        self.state.borrow_mut().counters.framebuffer_binds += 1;
    }

    fn set_active_texture_unit(&self, _unit: u32) {
        self.state.borrow_mut().counters.unit_switches += 1;
    }

    fn bind_texture(&self, _unit: u32, _texture: Option<TextureHandle>) {
        self.state.borrow_mut().counters.texture_binds += 1;
    }

    fn set_viewport(&self, _area: Recti) {}

    fn set_scissor(&self, _area: Option<Recti>) {}

    fn apply_render_state(&self, _state: &RenderState) {}

    fn clear(&self, _ops: &ClearOps) {}

    fn draw(&self, mode: PrimitiveMode, first: usize, count: usize) {
        let mut state = self.state.borrow_mut();
        state.counters.draw_calls += 1;
        state.draw_calls.push(DrawCall {
            mode,
            index_type: None,
            first,
            count,
        });
    }

    fn draw_indexed(&self, mode: PrimitiveMode, index_type: IndexType, first: usize, count: usize) {
        let mut state = self.state.borrow_mut();
        state.counters.draw_calls += 1;
        state.draw_calls.push(DrawCall {
            mode,
            index_type: Some(index_type),
            first,
            count,
        });
    }

    fn limits(&self) -> DeviceLimits {
        DeviceLimits {
            max_color_attachments: 4,
            max_draw_buffers: 4,
            max_vertex_texture_image_units: 16,
            max_fragment_texture_image_units: 16,
            max_combined_texture_image_units: 32,
            max_texture_size: 16384,
            max_vertex_attributes: 16,
        }
    }

    fn swap_buffers(&self) {
        self.state.borrow_mut().counters.frames += 1;
    }
}
