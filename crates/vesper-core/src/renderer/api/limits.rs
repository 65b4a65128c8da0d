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

//! Capability limits reported by a device.

/// Hardware and backend limits queried once at context creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceLimits {
    /// Maximum number of color attachments on a framebuffer.
    pub max_color_attachments: u32,
    /// Maximum number of simultaneously written draw buffers.
    pub max_draw_buffers: u32,
    /// Maximum texture units usable from the vertex stage.
    pub max_vertex_texture_image_units: u32,
    /// Maximum texture units usable from the fragment stage.
    pub max_fragment_texture_image_units: u32,
    /// Maximum texture units usable across all stages.
    pub max_combined_texture_image_units: u32,
    /// Maximum texture dimension in pixels.
    pub max_texture_size: u32,
    /// Maximum number of vertex attributes.
    pub max_vertex_attributes: u32,
}
