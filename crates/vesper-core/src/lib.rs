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

//! # Vesper Core
//!
//! Backend-agnostic GPU resource and rendering-state core: buffers and
//! transient geometry pooling, shader programs with introspection, vertex
//! array bindings, framebuffers, and a render context that caches GPU
//! binding state behind guarded setters.
//!
//! Concrete backends implement the [`renderer::traits::RenderDevice`] trait.

#![warn(missing_docs)]

pub mod event;
pub mod math;
pub mod renderer;
