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

//! Render targets: the window-backed default framebuffer and offscreen
//! texture framebuffers.

use crate::renderer::api::handle::{FramebufferHandle, TextureHandle};
use crate::renderer::api::settings::RenderConfig;
use crate::renderer::api::texture::Texture;
use crate::renderer::context::RenderContext;
use crate::renderer::error::ResourceError;

/// Attachment points of an offscreen framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentPoint {
    /// First color attachment.
    Color0,
    /// Second color attachment.
    Color1,
    /// Third color attachment.
    Color2,
    /// Fourth color attachment.
    Color3,
    /// Depth attachment.
    Depth,
}

impl AttachmentPoint {
    /// Returns the color attachment index, or `None` for the depth point.
    pub fn color_index(self) -> Option<u32> {
        match self {
            Self::Color0 => Some(0),
            Self::Color1 => Some(1),
            Self::Color2 => Some(2),
            Self::Color3 => Some(3),
            Self::Depth => None,
        }
    }

    fn slot(self) -> usize {
        match self {
            Self::Color0 => 0,
            Self::Color1 => 1,
            Self::Color2 => 2,
            Self::Color3 => 3,
            Self::Depth => 4,
        }
    }
}

/// The window-backed framebuffer.
///
/// Its pixel properties come from the render configuration; its dimensions
/// track window resizes reported through the context.
#[derive(Debug, Clone)]
pub struct DefaultFramebuffer {
    width: u32,
    height: u32,
    color_bits: u32,
    depth_bits: u32,
    stencil_bits: u32,
    samples: u32,
}

impl DefaultFramebuffer {
    pub(crate) fn new(config: &RenderConfig, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            color_bits: config.color_bits,
            depth_bits: config.depth_bits,
            stencil_bits: config.stencil_bits,
            samples: config.samples,
        }
    }

    pub(crate) fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Returns the width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the color buffer depth in bits.
    pub fn color_bits(&self) -> u32 {
        self.color_bits
    }

    /// Returns the depth buffer depth in bits.
    pub fn depth_bits(&self) -> u32 {
        self.depth_bits
    }

    /// Returns the stencil buffer depth in bits.
    pub fn stencil_bits(&self) -> u32 {
        self.stencil_bits
    }

    /// Returns the multisample count.
    pub fn samples(&self) -> u32 {
        self.samples
    }
}

#[derive(Debug, Clone, Copy)]
struct Attachment {
    texture: TextureHandle,
    width: u32,
    height: u32,
}

/// An offscreen framebuffer rendering into texture attachments.
///
/// Dimensions are derived from the attachments: they are zero while no
/// attachment is set or while attachments disagree on size.
#[derive(Debug)]
pub struct TextureFramebuffer {
    handle: FramebufferHandle,
    label: String,
    attachments: [Option<Attachment>; 5],
}

impl TextureFramebuffer {
    /// Creates an offscreen framebuffer with no attachments.
    pub fn new(ctx: &mut RenderContext, label: &str) -> Result<Self, ResourceError> {
        let handle = ctx.device().create_framebuffer(label)?;
        Ok(Self {
            handle,
            label: label.to_string(),
            attachments: [None; 5],
        })
    }

    /// Attaches a texture to the given point, or detaches with `None`.
    ///
    /// Color attachment indices are validated against the device limits.
    pub fn set_attachment(
        &mut self,
        ctx: &mut RenderContext,
        point: AttachmentPoint,
        texture: Option<&Texture>,
    ) -> Result<(), ResourceError> {
        if let Some(index) = point.color_index() {
            if index >= ctx.limits().max_color_attachments {
                return Err(ResourceError::IncompleteFramebuffer {
                    details: format!(
                        "color attachment {index} exceeds device limit {} on '{}'",
                        ctx.limits().max_color_attachments,
                        self.label
                    ),
                });
            }
        }

        ctx.device()
            .set_framebuffer_attachment(self.handle, point, texture.map(|t| t.handle()))?;

        self.attachments[point.slot()] = texture.map(|t| Attachment {
            texture: t.handle(),
            width: t.width(),
            height: t.height(),
        });
        Ok(())
    }

    /// Returns the texture attached at the given point, if any.
    pub fn attachment(&self, point: AttachmentPoint) -> Option<TextureHandle> {
        self.attachments[point.slot()].map(|a| a.texture)
    }

    /// Returns the common width of the attachments, or zero.
    pub fn width(&self) -> u32 {
        self.common_size().0
    }

    /// Returns the common height of the attachments, or zero.
    pub fn height(&self) -> u32 {
        self.common_size().1
    }

    fn common_size(&self) -> (u32, u32) {
        let mut size = None;
        for attachment in self.attachments.iter().flatten() {
            match size {
                None => size = Some((attachment.width, attachment.height)),
                Some(s) if s != (attachment.width, attachment.height) => return (0, 0),
                Some(_) => {}
            }
        }
        size.unwrap_or((0, 0))
    }

    /// Returns the device handle of this framebuffer.
    pub fn handle(&self) -> FramebufferHandle {
        self.handle
    }

    /// Returns the label of this framebuffer.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Releases the device object. Attached textures are not destroyed.
    pub fn destroy(self, ctx: &mut RenderContext) {
        if let Err(e) = ctx.device().destroy_framebuffer(self.handle) {
            log::warn!("Failed to destroy framebuffer '{}': {e}", self.label);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_points_map_to_distinct_slots() {
        let points = [
            AttachmentPoint::Color0,
            AttachmentPoint::Color1,
            AttachmentPoint::Color2,
            AttachmentPoint::Color3,
            AttachmentPoint::Depth,
        ];
        let mut seen = [false; 5];
        for point in points {
            assert!(!seen[point.slot()]);
            seen[point.slot()] = true;
        }
        assert_eq!(AttachmentPoint::Depth.color_index(), None);
        assert_eq!(AttachmentPoint::Color2.color_index(), Some(2));
    }
}
