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

//! Render context configuration.

use serde::{Deserialize, Serialize};

/// Pixel properties requested for the default framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Color buffer depth in bits.
    pub color_bits: u32,
    /// Depth buffer depth in bits.
    pub depth_bits: u32,
    /// Stencil buffer depth in bits.
    pub stencil_bits: u32,
    /// Multisample count; zero disables multisampling.
    pub samples: u32,
    /// Whether to request a debug-capable context.
    pub debug: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            color_bits: 32,
            depth_bits: 24,
            stencil_bits: 8,
            samples: 0,
            debug: false,
        }
    }
}
