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

//! Minimal 2D textures, sufficient for framebuffer attachments and sampler
//! binding.

use std::borrow::Cow;

use crate::renderer::api::handle::TextureHandle;
use crate::renderer::context::RenderContext;
use crate::renderer::error::ResourceError;

/// Pixel format of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// 8-bit RGBA color.
    Rgba8,
    /// 24-bit depth with 8-bit stencil.
    Depth24Stencil8,
}

impl TextureFormat {
    /// Returns the size of one pixel in bytes.
    pub fn bytes_per_pixel(self) -> usize {
        4
    }

    /// Returns `true` if this format stores depth values.
    pub fn is_depth(self) -> bool {
        matches!(self, Self::Depth24Stencil8)
    }
}

/// Minification/magnification filtering of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    /// Nearest-texel sampling.
    Nearest,
    /// Linear interpolation between texels.
    Linear,
}

/// Wrapping behavior of texture coordinates outside `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressMode {
    /// Coordinates repeat.
    Repeat,
    /// Coordinates clamp to the edge texel.
    ClampToEdge,
    /// Coordinates repeat, mirrored on every other repetition.
    MirrorRepeat,
}

/// Description of a texture allocation handed to the device.
#[derive(Debug, Clone)]
pub struct TextureDescriptor<'a> {
    /// Optional label for logs and diagnostics.
    pub label: Option<Cow<'a, str>>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel format.
    pub format: TextureFormat,
    /// Sampling filter.
    pub filter: FilterMode,
    /// Coordinate wrapping.
    pub address_mode: AddressMode,
}

/// A 2D texture object.
#[derive(Debug)]
pub struct Texture {
    handle: TextureHandle,
    width: u32,
    height: u32,
    format: TextureFormat,
}

impl Texture {
    /// Creates a texture with the described properties.
    pub fn new(
        ctx: &mut RenderContext,
        descriptor: &TextureDescriptor<'_>,
    ) -> Result<Self, ResourceError> {
        let handle = ctx.device().create_texture(descriptor)?;
        let size =
            descriptor.width as usize * descriptor.height as usize * descriptor.format.bytes_per_pixel();
        ctx.stats_mut().texture_created(size);

        Ok(Self {
            handle,
            width: descriptor.width,
            height: descriptor.height,
            format: descriptor.format,
        })
    }

    /// Returns the device handle of this texture.
    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    /// Returns the width of this texture in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of this texture in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the pixel format of this texture.
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    /// Releases the device object and updates resource statistics.
    pub fn destroy(self, ctx: &mut RenderContext) {
        if let Err(e) = ctx.device().destroy_texture(self.handle) {
            log::warn!("Failed to destroy texture: {e}");
        }
        let size = self.width as usize * self.height as usize * self.format.bytes_per_pixel();
        ctx.stats_mut().texture_destroyed(size);
    }
}
