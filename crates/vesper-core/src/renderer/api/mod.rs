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

//! Public API types of the rendering core.

pub mod buffer;
pub mod format;
pub mod framebuffer;
pub mod handle;
pub mod interface;
pub mod limits;
pub mod program;
pub mod range;
pub mod settings;
pub mod state;
pub mod stats;
pub mod texture;
pub mod vertex_array;

pub use buffer::{
    BufferDescriptor, BufferKind, BufferUsage, IndexBuffer, IndexType, LockMode, MappedBuffer,
    VertexBuffer,
};
pub use format::{FormatParseError, VertexComponent, VertexFormat};
pub use framebuffer::{AttachmentPoint, DefaultFramebuffer, TextureFramebuffer};
pub use handle::{
    BufferHandle, FramebufferHandle, ProgramHandle, ShaderHandle, TextureHandle, VertexArrayHandle,
};
pub use interface::ProgramInterface;
pub use limits::DeviceLimits;
pub use program::{
    ActiveInput, Attribute, AttributeType, InputType, Program, Sampler, SamplerType, Shader,
    ShaderStage, SharedProgramState, Uniform, UniformType, UniformValue,
};
pub use range::{IndexRange, PrimitiveMode, PrimitiveRange, VertexRange};
pub use settings::RenderConfig;
pub use state::{BlendFactor, CompareFunction, CullMode, RenderState, StencilOp, StencilState};
pub use stats::{FrameStats, RenderStats};
pub use texture::{AddressMode, FilterMode, Texture, TextureDescriptor, TextureFormat};
pub use vertex_array::{AttributePointer, VertexArrayBinding, VertexArrayLayout};
