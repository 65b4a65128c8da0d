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

//! Declarative fixed-function render state.
//!
//! A [`RenderState`] describes blend, depth, stencil and rasterizer state
//! as one value. The context applies it as a unit, diffed against the
//! currently cached state, so material layers map their own enums 1:1 onto
//! these and never talk to the device directly.

/// Blend factor for source or destination color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstColor,
    OneMinusDstColor,
    DstAlpha,
    OneMinusDstAlpha,
}

/// Comparison function for depth and stencil tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum CompareFunction {
    Never,
    Always,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

/// Operation applied to a stencil value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum StencilOp {
    Keep,
    Zero,
    Replace,
    Increment,
    Decrement,
    Invert,
}

/// Which faces are culled during rasterization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CullMode {
    /// No culling.
    None,
    /// Cull front faces.
    Front,
    /// Cull back faces.
    Back,
    /// Cull both faces.
    Both,
}

/// Stencil test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilState {
    /// Comparison against the reference value.
    pub function: CompareFunction,
    /// Reference value for the comparison.
    pub reference: u32,
    /// Bit mask applied to reference and stored value.
    pub mask: u32,
    /// Operation when the stencil test fails.
    pub stencil_fail: StencilOp,
    /// Operation when the stencil test passes but the depth test fails.
    pub depth_fail: StencilOp,
    /// Operation when both tests pass.
    pub pass: StencilOp,
}

impl Default for StencilState {
    fn default() -> Self {
        Self {
            function: CompareFunction::Always,
            reference: 0,
            mask: !0,
            stencil_fail: StencilOp::Keep,
            depth_fail: StencilOp::Keep,
            pass: StencilOp::Keep,
        }
    }
}

/// Complete fixed-function state applied as one unit.
///
/// Blending is active whenever the factors differ from `(One, Zero)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderState {
    /// Whether fragments are depth tested.
    pub depth_testing: bool,
    /// Whether passing fragments write depth.
    pub depth_writing: bool,
    /// Depth comparison function.
    pub depth_function: CompareFunction,
    /// Whether fragments write color.
    pub color_writing: bool,
    /// Source blend factor.
    pub src_factor: BlendFactor,
    /// Destination blend factor.
    pub dst_factor: BlendFactor,
    /// Whether fragments are stencil tested.
    pub stencil_testing: bool,
    /// Stencil test configuration.
    pub stencil: StencilState,
    /// Face culling mode.
    pub cull_mode: CullMode,
    /// Whether polygons are drawn as outlines.
    pub wireframe: bool,
    /// Rasterized line width in pixels.
    pub line_width: f32,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            depth_testing: true,
            depth_writing: true,
            depth_function: CompareFunction::LessEqual,
            color_writing: true,
            src_factor: BlendFactor::One,
            dst_factor: BlendFactor::Zero,
            stencil_testing: false,
            stencil: StencilState::default(),
            cull_mode: CullMode::Back,
            wireframe: false,
            line_width: 1.0,
        }
    }
}

impl RenderState {
    /// Returns `true` if the blend factors enable blending.
    pub fn is_blending(&self) -> bool {
        !(self.src_factor == BlendFactor::One && self.dst_factor == BlendFactor::Zero)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_does_not_blend() {
        assert!(!RenderState::default().is_blending());
    }

    #[test]
    fn alpha_factors_enable_blending() {
        let state = RenderState {
            src_factor: BlendFactor::SrcAlpha,
            dst_factor: BlendFactor::OneMinusSrcAlpha,
            ..Default::default()
        };
        assert!(state.is_blending());
    }
}
