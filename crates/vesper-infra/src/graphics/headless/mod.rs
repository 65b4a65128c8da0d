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

//! An in-memory software device.
//!
//! Buffers hold real bytes, shader "compilation" scans declarations out of
//! the GLSL source, and drawing is recorded instead of rasterized. The
//! device exposes its records so tests can assert on the calls a context
//! actually issued.

mod device;
mod reflect;

pub use device::{DeviceCounters, DrawCall, HeadlessDevice};
