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

//! Precomputed vertex-attribute pointer configurations.
//!
//! A [`VertexArrayBinding`] resolves every attribute of a program against
//! the components of a vertex buffer's format once, at creation. Draw calls
//! then only bind the resulting device object.

use crate::renderer::api::buffer::{IndexBuffer, IndexType, VertexBuffer};
use crate::renderer::api::handle::{BufferHandle, VertexArrayHandle};
use crate::renderer::api::program::Program;
use crate::renderer::context::RenderContext;
use crate::renderer::error::{BindingError, RenderError};

/// One resolved attribute pointer within a vertex array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributePointer {
    /// Location of the program attribute.
    pub location: i32,
    /// Number of `f32` elements read per vertex.
    pub element_count: u32,
    /// Byte offset of the component within a vertex.
    pub offset: usize,
    /// Byte stride between consecutive vertices.
    pub stride: usize,
}

/// The full layout handed to the device when creating a vertex array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexArrayLayout {
    /// The vertex buffer attributes read from.
    pub vertex_buffer: BufferHandle,
    /// The bound index buffer, if any.
    pub index_buffer: Option<BufferHandle>,
    /// Resolved attribute pointers.
    pub attributes: Vec<AttributePointer>,
}

/// A device vertex array object plus the index type it was built with.
#[derive(Debug)]
pub struct VertexArrayBinding {
    handle: VertexArrayHandle,
    index_type: Option<IndexType>,
}

impl VertexArrayBinding {
    /// Builds a vertex array binding the program's attributes to the
    /// components of the vertex buffer's format.
    pub fn new(
        ctx: &mut RenderContext,
        program: &Program,
        vertex_buffer: &VertexBuffer,
    ) -> Result<Self, RenderError> {
        Self::build(ctx, program, vertex_buffer, None)
    }

    /// Like [`VertexArrayBinding::new`], additionally attaching an index
    /// buffer.
    pub fn with_index_buffer(
        ctx: &mut RenderContext,
        program: &Program,
        vertex_buffer: &VertexBuffer,
        index_buffer: &IndexBuffer,
    ) -> Result<Self, RenderError> {
        Self::build(ctx, program, vertex_buffer, Some(index_buffer))
    }

    fn build(
        ctx: &mut RenderContext,
        program: &Program,
        vertex_buffer: &VertexBuffer,
        index_buffer: Option<&IndexBuffer>,
    ) -> Result<Self, RenderError> {
        let format = vertex_buffer.format();
        let mut attributes = Vec::with_capacity(program.attributes().len());

        for attribute in program.attributes() {
            let component = format.find_component(attribute.name()).ok_or_else(|| {
                BindingError::NoMatchingComponent {
                    attribute: attribute.name().to_string(),
                    program: program.label().to_string(),
                }
            })?;

            if component.element_count() != attribute.ty().element_count() {
                return Err(BindingError::IncompatibleType {
                    attribute: attribute.name().to_string(),
                    program: program.label().to_string(),
                    component_elements: component.element_count(),
                    attribute_elements: attribute.ty().element_count(),
                }
                .into());
            }

            attributes.push(AttributePointer {
                location: attribute.location(),
                element_count: component.element_count(),
                offset: component.offset(),
                stride: format.size(),
            });
        }

        let layout = VertexArrayLayout {
            vertex_buffer: vertex_buffer.handle(),
            index_buffer: index_buffer.map(|b| b.handle()),
            attributes,
        };
        let handle = ctx.device().create_vertex_array(&layout)?;

        Ok(Self {
            handle,
            index_type: index_buffer.map(|b| b.index_type()),
        })
    }

    /// Returns the device handle of this vertex array.
    pub fn handle(&self) -> VertexArrayHandle {
        self.handle
    }

    /// Returns the element type of the attached index buffer, if any.
    pub fn index_type(&self) -> Option<IndexType> {
        self.index_type
    }

    /// Releases the device object.
    pub fn destroy(self, ctx: &mut RenderContext) {
        if let Err(e) = ctx.device().destroy_vertex_array(self.handle) {
            log::warn!("Failed to destroy vertex array: {e}");
        }
    }
}
