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

//! Shaders, linked programs and program introspection.
//!
//! Linking a [`Program`] introspects its active inputs: attributes,
//! samplers and non-sampler uniforms. Samplers are assigned sequential
//! texture units in discovery order, and uniforms whose name and type match
//! an entry in the context's shared state registry are tagged with that
//! entry's shared ID.

use crate::renderer::api::handle::{ProgramHandle, ShaderHandle, TextureHandle};
use crate::renderer::context::RenderContext;
use crate::renderer::error::ShaderError;

/// Names with this prefix are device built-ins and never program inputs.
const RESERVED_PREFIX: &str = "gl_";

/// Pipeline stage of a shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex processing stage.
    Vertex,
    /// Fragment processing stage.
    Fragment,
}

/// Type of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    /// A single `f32`.
    Float,
    /// Two `f32` elements.
    Vec2,
    /// Three `f32` elements.
    Vec3,
    /// Four `f32` elements.
    Vec4,
}

impl AttributeType {
    /// Returns the number of `f32` elements of this type.
    pub fn element_count(self) -> u32 {
        match self {
            Self::Float => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 => 4,
        }
    }

    /// Returns the attribute type with the given element count, if any.
    pub fn from_element_count(count: u32) -> Option<Self> {
        match count {
            1 => Some(Self::Float),
            2 => Some(Self::Vec2),
            3 => Some(Self::Vec3),
            4 => Some(Self::Vec4),
            _ => None,
        }
    }

    /// Returns the GLSL name of this type.
    pub fn glsl_name(self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::Vec4 => "vec4",
        }
    }
}

/// Type of a non-sampler uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformType {
    /// A single `i32`.
    Int,
    /// A single `u32`.
    UInt,
    /// A single `f32`.
    Float,
    /// Two `f32` elements.
    Vec2,
    /// Three `f32` elements.
    Vec3,
    /// Four `f32` elements.
    Vec4,
    /// A 2x2 `f32` matrix.
    Mat2,
    /// A 3x3 `f32` matrix.
    Mat3,
    /// A 4x4 `f32` matrix.
    Mat4,
}

impl UniformType {
    /// Returns the number of scalar elements of this type.
    pub fn element_count(self) -> u32 {
        match self {
            Self::Int | Self::UInt | Self::Float => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 => 4,
            Self::Mat2 => 4,
            Self::Mat3 => 9,
            Self::Mat4 => 16,
        }
    }

    /// Returns `true` if this type is a single value.
    pub fn is_scalar(self) -> bool {
        matches!(self, Self::Int | Self::UInt | Self::Float)
    }

    /// Returns `true` if this type is a vector.
    pub fn is_vector(self) -> bool {
        matches!(self, Self::Vec2 | Self::Vec3 | Self::Vec4)
    }

    /// Returns `true` if this type is a matrix.
    pub fn is_matrix(self) -> bool {
        matches!(self, Self::Mat2 | Self::Mat3 | Self::Mat4)
    }

    /// Returns the GLSL name of this type.
    pub fn glsl_name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Float => "float",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::Vec4 => "vec4",
            Self::Mat2 => "mat2",
            Self::Mat3 => "mat3",
            Self::Mat4 => "mat4",
        }
    }
}

/// Type of a sampler uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplerType {
    /// One-dimensional texture sampler.
    Sampler1D,
    /// Two-dimensional texture sampler.
    Sampler2D,
    /// Three-dimensional texture sampler.
    Sampler3D,
    /// Rectangle texture sampler.
    SamplerRect,
    /// Cube map texture sampler.
    SamplerCube,
}

impl SamplerType {
    /// Returns the GLSL name of this type.
    pub fn glsl_name(self) -> &'static str {
        match self {
            Self::Sampler1D => "sampler1D",
            Self::Sampler2D => "sampler2D",
            Self::Sampler3D => "sampler3D",
            Self::SamplerRect => "sampler2DRect",
            Self::SamplerCube => "samplerCube",
        }
    }
}

/// The type of an active program input reported by introspection.
///
/// Types the core does not model arrive as [`InputType::Unsupported`] with
/// the backend's native type code, never as a silently wrong mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    /// A vertex attribute type.
    Attribute(AttributeType),
    /// A non-sampler uniform type.
    Uniform(UniformType),
    /// A sampler uniform type.
    Sampler(SamplerType),
    /// A valid device type the core does not model.
    Unsupported {
        /// The backend's native type code.
        native: u32,
    },
}

/// An active program input reported by the device during introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveInput {
    /// Name of the input.
    pub name: String,
    /// Location assigned by the device.
    pub location: i32,
    /// Type of the input.
    pub ty: InputType,
}

/// A typed uniform value for upload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// A single `i32`.
    Int(i32),
    /// A single `u32`.
    UInt(u32),
    /// A single `f32`.
    Float(f32),
    /// Two `f32` elements.
    Vec2([f32; 2]),
    /// Three `f32` elements.
    Vec3([f32; 3]),
    /// Four `f32` elements.
    Vec4([f32; 4]),
    /// A 2x2 `f32` matrix in column-major order.
    Mat2([f32; 4]),
    /// A 3x3 `f32` matrix in column-major order.
    Mat3([f32; 9]),
    /// A 4x4 `f32` matrix in column-major order.
    Mat4([f32; 16]),
}

impl UniformValue {
    /// Returns the uniform type of this value.
    pub fn ty(&self) -> UniformType {
        match self {
            Self::Int(_) => UniformType::Int,
            Self::UInt(_) => UniformType::UInt,
            Self::Float(_) => UniformType::Float,
            Self::Vec2(_) => UniformType::Vec2,
            Self::Vec3(_) => UniformType::Vec3,
            Self::Vec4(_) => UniformType::Vec4,
            Self::Mat2(_) => UniformType::Mat2,
            Self::Mat3(_) => UniformType::Mat3,
            Self::Mat4(_) => UniformType::Mat4,
        }
    }
}

/// Supplies values for shared program state by shared ID.
///
/// Frame-setup code implements this to push camera matrices and similar
/// values into every program generically, without knowing uniform names.
pub trait SharedProgramState {
    /// Returns the value for the shared uniform with the given ID, if known.
    fn uniform_value(&mut self, id: i32, ty: UniformType) -> Option<UniformValue>;

    /// Returns the texture for the shared sampler with the given ID, if
    /// known.
    fn sampler_texture(&mut self, id: i32, ty: SamplerType) -> Option<TextureHandle>;
}

/// A compiled shader of one pipeline stage.
#[derive(Debug)]
pub struct Shader {
    handle: ShaderHandle,
    stage: ShaderStage,
    label: String,
}

impl Shader {
    /// Compiles a shader, prepending the context's shared program state
    /// declaration to the source.
    pub fn new(
        ctx: &mut RenderContext,
        stage: ShaderStage,
        source: &str,
        label: &str,
    ) -> Result<Self, ShaderError> {
        let text = format!("{}\n{source}", ctx.shared_state_declaration());
        let handle = ctx.device().compile_shader(stage, &text, label)?;

        Ok(Self {
            handle,
            stage,
            label: label.to_string(),
        })
    }

    /// Returns the stage of this shader.
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// Returns the device handle of this shader.
    pub fn handle(&self) -> ShaderHandle {
        self.handle
    }

    /// Returns the label of this shader.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Releases the device object.
    pub fn destroy(self, ctx: &mut RenderContext) {
        if let Err(e) = ctx.device().destroy_shader(self.handle) {
            log::warn!("Failed to destroy shader '{}': {e}", self.label);
        }
    }
}

/// An active vertex attribute of a linked program.
#[derive(Debug, Clone)]
pub struct Attribute {
    name: String,
    ty: AttributeType,
    location: i32,
}

impl Attribute {
    /// Returns the name of this attribute.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the type of this attribute.
    pub fn ty(&self) -> AttributeType {
        self.ty
    }

    /// Returns the location of this attribute.
    pub fn location(&self) -> i32 {
        self.location
    }
}

/// An active sampler uniform of a linked program.
#[derive(Debug, Clone)]
pub struct Sampler {
    name: String,
    ty: SamplerType,
    location: i32,
    unit: u32,
    shared_id: Option<i32>,
}

impl Sampler {
    /// Returns the name of this sampler.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the type of this sampler.
    pub fn ty(&self) -> SamplerType {
        self.ty
    }

    /// Returns the location of this sampler.
    pub fn location(&self) -> i32 {
        self.location
    }

    /// Returns the texture unit assigned to this sampler.
    pub fn unit(&self) -> u32 {
        self.unit
    }

    /// Returns the shared state ID of this sampler, if it is shared.
    pub fn shared_id(&self) -> Option<i32> {
        self.shared_id
    }

    /// Returns `true` if this sampler takes its value from shared state.
    pub fn is_shared(&self) -> bool {
        self.shared_id.is_some()
    }

    /// Makes the given texture current on this sampler's unit.
    pub fn bind_texture(&self, ctx: &mut RenderContext, texture: &crate::renderer::api::Texture) {
        ctx.set_active_texture_unit(self.unit);
        ctx.set_current_texture(Some(texture));
    }
}

/// An active non-sampler uniform of a linked program.
#[derive(Debug, Clone)]
pub struct Uniform {
    name: String,
    ty: UniformType,
    location: i32,
    shared_id: Option<i32>,
    program: ProgramHandle,
}

impl Uniform {
    /// Returns the name of this uniform.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the type of this uniform.
    pub fn ty(&self) -> UniformType {
        self.ty
    }

    /// Returns the shared state ID of this uniform, if it is shared.
    pub fn shared_id(&self) -> Option<i32> {
        self.shared_id
    }

    /// Returns `true` if this uniform takes its value from shared state.
    pub fn is_shared(&self) -> bool {
        self.shared_id.is_some()
    }

    /// Uploads a value to this uniform.
    ///
    /// A value of the wrong type is logged and skipped.
    pub fn set(&self, ctx: &mut RenderContext, value: &UniformValue) {
        if value.ty() != self.ty {
            log::error!(
                "Value of type {} does not match uniform '{}' of type {}",
                value.ty().glsl_name(),
                self.name,
                self.ty.glsl_name()
            );
            return;
        }

        ctx.device().set_uniform(self.program, self.location, value);
    }
}

/// A linked shader program with its introspected inputs.
#[derive(Debug)]
pub struct Program {
    handle: ProgramHandle,
    label: String,
    vertex: Shader,
    fragment: Shader,
    attributes: Vec<Attribute>,
    samplers: Vec<Sampler>,
    uniforms: Vec<Uniform>,
}

impl Program {
    /// Links a program from a vertex and a fragment shader and introspects
    /// its active inputs.
    pub fn new(
        ctx: &mut RenderContext,
        vertex: Shader,
        fragment: Shader,
        label: &str,
    ) -> Result<Self, ShaderError> {
        if vertex.stage() != ShaderStage::Vertex {
            return Err(ShaderError::StageMismatch {
                label: vertex.label().to_string(),
                expected: ShaderStage::Vertex,
                found: vertex.stage(),
            });
        }
        if fragment.stage() != ShaderStage::Fragment {
            return Err(ShaderError::StageMismatch {
                label: fragment.label().to_string(),
                expected: ShaderStage::Fragment,
                found: fragment.stage(),
            });
        }

        let handle = ctx
            .device()
            .link_program(vertex.handle(), fragment.handle(), label)?;

        let mut program = Self {
            handle,
            label: label.to_string(),
            vertex,
            fragment,
            attributes: Vec::new(),
            samplers: Vec::new(),
            uniforms: Vec::new(),
        };

        // Introspection runs with the program bound and leaves no program
        // current afterwards.
        ctx.bind_program_handle(Some(handle));
        program.retrieve_uniforms(ctx);
        program.retrieve_attributes(ctx);
        ctx.bind_program_handle(None);

        ctx.stats_mut().program_created();
        Ok(program)
    }

    fn retrieve_uniforms(&mut self, ctx: &mut RenderContext) {
        let inputs = ctx.device().reflect_uniforms(self.handle);

        for input in inputs {
            if input.name.starts_with(RESERVED_PREFIX) {
                log::warn!(
                    "Program '{}' exposes reserved uniform '{}'",
                    self.label,
                    input.name
                );
                continue;
            }

            match input.ty {
                InputType::Uniform(ty) => {
                    self.uniforms.push(Uniform {
                        shared_id: ctx.shared_uniform_id(&input.name, ty),
                        name: input.name,
                        ty,
                        location: input.location,
                        program: self.handle,
                    });
                }
                InputType::Sampler(ty) => {
                    let unit = self.samplers.len() as u32;
                    ctx.device()
                        .set_sampler_unit(self.handle, input.location, unit);
                    self.samplers.push(Sampler {
                        shared_id: ctx.shared_sampler_id(&input.name, ty),
                        name: input.name,
                        ty,
                        location: input.location,
                        unit,
                    });
                }
                InputType::Unsupported { native } => {
                    log::warn!(
                        "Skipping uniform '{}' of program '{}' with unsupported type {native:#06x}",
                        input.name,
                        self.label
                    );
                }
                InputType::Attribute(_) => {}
            }
        }
    }

    fn retrieve_attributes(&mut self, ctx: &mut RenderContext) {
        let inputs = ctx.device().reflect_attributes(self.handle);

        for input in inputs {
            if input.name.starts_with(RESERVED_PREFIX) {
                continue;
            }

            match input.ty {
                InputType::Attribute(ty) => {
                    self.attributes.push(Attribute {
                        name: input.name,
                        ty,
                        location: input.location,
                    });
                }
                InputType::Unsupported { native } => {
                    log::warn!(
                        "Skipping attribute '{}' of program '{}' with unsupported type {native:#06x}",
                        input.name,
                        self.label
                    );
                }
                _ => {}
            }
        }
    }

    /// Pushes shared values into every shared uniform and binds shared
    /// sampler textures to their units.
    pub fn apply_shared_state(&self, ctx: &mut RenderContext, state: &mut dyn SharedProgramState) {
        for uniform in &self.uniforms {
            let Some(id) = uniform.shared_id else {
                continue;
            };
            match state.uniform_value(id, uniform.ty) {
                Some(value) => uniform.set(ctx, &value),
                None => log::warn!(
                    "Shared state has no value for uniform '{}' (ID {id})",
                    uniform.name
                ),
            }
        }

        for sampler in &self.samplers {
            let Some(id) = sampler.shared_id else {
                continue;
            };
            match state.sampler_texture(id, sampler.ty) {
                Some(texture) => {
                    ctx.set_active_texture_unit(sampler.unit);
                    ctx.bind_texture_handle(Some(texture));
                }
                None => log::warn!(
                    "Shared state has no texture for sampler '{}' (ID {id})",
                    sampler.name
                ),
            }
        }
    }

    /// Returns the attribute with the given name, if active.
    pub fn find_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Returns the sampler with the given name, if active.
    pub fn find_sampler(&self, name: &str) -> Option<&Sampler> {
        self.samplers.iter().find(|s| s.name == name)
    }

    /// Returns the uniform with the given name, if active.
    pub fn find_uniform(&self, name: &str) -> Option<&Uniform> {
        self.uniforms.iter().find(|u| u.name == name)
    }

    /// Returns the active attributes of this program.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Returns the active samplers of this program.
    pub fn samplers(&self) -> &[Sampler] {
        &self.samplers
    }

    /// Returns the active non-sampler uniforms of this program.
    pub fn uniforms(&self) -> &[Uniform] {
        &self.uniforms
    }

    /// Returns the device handle of this program.
    pub fn handle(&self) -> ProgramHandle {
        self.handle
    }

    /// Returns the label of this program.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Releases the program and its shaders.
    pub fn destroy(self, ctx: &mut RenderContext) {
        if let Err(e) = ctx.device().destroy_program(self.handle) {
            log::warn!("Failed to destroy program '{}': {e}", self.label);
        }
        self.vertex.destroy(ctx);
        self.fragment.destroy(ctx);
        ctx.stats_mut().program_destroyed();
    }
}
