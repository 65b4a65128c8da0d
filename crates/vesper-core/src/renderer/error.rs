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

//! Error types for the rendering core.
//!
//! Construction-style operations return these through `Result`; per-frame
//! operations that fail are logged and skipped by their callers. Because the
//! context is passed explicitly everywhere, there is no "no current context"
//! failure mode.

use std::error::Error;
use std::fmt;

use crate::renderer::api::ShaderStage;

/// Errors from GPU resource allocation and data transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// The device could not allocate the resource.
    AllocationFailed {
        /// Label of the resource that failed to allocate.
        label: String,
        /// Backend-provided details.
        details: String,
    },
    /// A transfer addressed elements outside the resource.
    OutOfRange {
        /// Label of the addressed resource.
        label: String,
        /// First element (or byte) addressed.
        offset: usize,
        /// Number of elements (or bytes) addressed.
        len: usize,
        /// Capacity of the resource in the same unit.
        capacity: usize,
    },
    /// The provided data size does not match the described transfer.
    SizeMismatch {
        /// Label of the addressed resource.
        label: String,
        /// Expected size in bytes.
        expected: usize,
        /// Actual size in bytes.
        actual: usize,
    },
    /// A lock was requested while a mapping is already outstanding.
    AlreadyLocked {
        /// Label of the locked buffer.
        label: String,
    },
    /// An operation referenced a handle the device does not know.
    InvalidHandle {
        /// Description of the offending handle.
        details: String,
    },
    /// A framebuffer configuration was rejected.
    IncompleteFramebuffer {
        /// Description of the rejected configuration.
        details: String,
    },
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocationFailed { label, details } => {
                write!(f, "Failed to allocate '{label}': {details}")
            }
            Self::OutOfRange {
                label,
                offset,
                len,
                capacity,
            } => write!(
                f,
                "Transfer of {len} at {offset} exceeds capacity {capacity} of '{label}'"
            ),
            Self::SizeMismatch {
                label,
                expected,
                actual,
            } => write!(
                f,
                "Data size {actual} does not match expected {expected} for '{label}'"
            ),
            Self::AlreadyLocked { label } => {
                write!(f, "Buffer '{label}' is already locked")
            }
            Self::InvalidHandle { details } => write!(f, "Invalid resource handle: {details}"),
            Self::IncompleteFramebuffer { details } => {
                write!(f, "Incomplete framebuffer: {details}")
            }
        }
    }
}

impl Error for ResourceError {}

/// Errors from shader compilation and program linking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderError {
    /// The shader source failed to compile.
    CompileFailed {
        /// Label of the shader.
        label: String,
        /// The device's info log for the failure.
        info_log: String,
    },
    /// The program failed to link.
    LinkFailed {
        /// Label of the program.
        label: String,
        /// The device's info log for the failure.
        info_log: String,
    },
    /// A shader of the wrong stage was supplied to a link.
    StageMismatch {
        /// Label of the offending shader.
        label: String,
        /// The stage that was expected.
        expected: ShaderStage,
        /// The stage that was found.
        found: ShaderStage,
    },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CompileFailed { label, info_log } => {
                write!(f, "Failed to compile shader '{label}': {info_log}")
            }
            Self::LinkFailed { label, info_log } => {
                write!(f, "Failed to link program '{label}': {info_log}")
            }
            Self::StageMismatch {
                label,
                expected,
                found,
            } => write!(
                f,
                "Shader '{label}' is a {found:?} shader where a {expected:?} shader was expected"
            ),
        }
    }
}

impl Error for ShaderError {}

/// Errors from matching programs against vertex formats and interfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    /// A program attribute has no component of the same name in the format.
    NoMatchingComponent {
        /// Name of the unmatched attribute.
        attribute: String,
        /// Label of the program.
        program: String,
    },
    /// A program attribute and its format component disagree on arity.
    IncompatibleType {
        /// Name of the mismatched attribute.
        attribute: String,
        /// Label of the program.
        program: String,
        /// Element count of the format component.
        component_elements: u32,
        /// Element count of the program attribute.
        attribute_elements: u32,
    },
    /// A program does not expose the declared interface.
    InterfaceMismatch {
        /// Label of the program.
        program: String,
    },
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMatchingComponent { attribute, program } => write!(
                f,
                "No vertex component matches attribute '{attribute}' of program '{program}'"
            ),
            Self::IncompatibleType {
                attribute,
                program,
                component_elements,
                attribute_elements,
            } => write!(
                f,
                "Vertex component for attribute '{attribute}' of program '{program}' \
                 has {component_elements} elements where {attribute_elements} are required"
            ),
            Self::InterfaceMismatch { program } => {
                write!(f, "Program '{program}' does not match the declared interface")
            }
        }
    }
}

impl Error for BindingError {}

/// Top-level errors from the render context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// An operation requiring a current program ran without one.
    NoCurrentProgram,
    /// A shared state entry was re-registered under a different type.
    SharedStateTypeMismatch {
        /// Name of the shared entry.
        name: String,
        /// GLSL type already registered under the name.
        existing: String,
        /// GLSL type of the rejected registration.
        requested: String,
    },
    /// A resource operation failed.
    Resource(ResourceError),
    /// A shader operation failed.
    Shader(ShaderError),
    /// A binding operation failed.
    Binding(BindingError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCurrentProgram => write!(f, "No current program"),
            Self::SharedStateTypeMismatch {
                name,
                existing,
                requested,
            } => write!(
                f,
                "Shared state '{name}' is registered as {existing}, not {requested}"
            ),
            Self::Resource(e) => write!(f, "{e}"),
            Self::Shader(e) => write!(f, "{e}"),
            Self::Binding(e) => write!(f, "{e}"),
        }
    }
}

impl Error for RenderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Resource(e) => Some(e),
            Self::Shader(e) => Some(e),
            Self::Binding(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ResourceError> for RenderError {
    fn from(e: ResourceError) -> Self {
        Self::Resource(e)
    }
}

impl From<ShaderError> for RenderError {
    fn from(e: ShaderError) -> Self {
        Self::Shader(e)
    }
}

impl From<BindingError> for RenderError {
    fn from(e: BindingError) -> Self {
        Self::Binding(e)
    }
}
