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

//! Per-frame rendering statistics and live resource gauges.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::renderer::api::range::PrimitiveMode;

/// Number of recent frames kept for the frame-rate window.
const FRAME_WINDOW: usize = 60;

/// Counters gathered during one frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStats {
    /// Wall-clock duration of the frame.
    pub duration: Duration,
    /// Number of draw operations issued.
    pub operation_count: u32,
    /// Number of device state changes performed.
    pub state_change_count: u32,
    /// Number of vertices submitted.
    pub vertex_count: u32,
    /// Number of points assembled.
    pub point_count: u32,
    /// Number of line segments assembled.
    pub line_count: u32,
    /// Number of triangles assembled.
    pub triangle_count: u32,
}

/// Rolling rendering statistics.
///
/// Keeps the most recent frames for frame-rate estimation plus live gauges
/// of allocated resources. The current frame is always `frames()[0]`.
#[derive(Debug)]
pub struct RenderStats {
    frames: VecDeque<FrameStats>,
    frame_count: u64,
    frame_started: Instant,
    buffer_count: u32,
    buffer_bytes: usize,
    program_count: u32,
    texture_count: u32,
    texture_bytes: usize,
}

impl RenderStats {
    /// Creates empty statistics with one current frame.
    pub fn new() -> Self {
        let mut frames = VecDeque::with_capacity(FRAME_WINDOW);
        frames.push_front(FrameStats::default());
        Self {
            frames,
            frame_count: 0,
            frame_started: Instant::now(),
            buffer_count: 0,
            buffer_bytes: 0,
            program_count: 0,
            texture_count: 0,
            texture_bytes: 0,
        }
    }

    /// Finalizes the current frame and starts a new one.
    pub fn add_frame(&mut self) {
        if let Some(current) = self.frames.front_mut() {
            current.duration = self.frame_started.elapsed();
        }
        self.frame_started = Instant::now();
        self.frame_count += 1;

        self.frames.push_front(FrameStats::default());
        while self.frames.len() > FRAME_WINDOW {
            self.frames.pop_back();
        }
    }

    /// Records one device state change in the current frame.
    pub fn add_state_change(&mut self) {
        if let Some(current) = self.frames.front_mut() {
            current.state_change_count += 1;
        }
    }

    /// Records one draw of `count` vertices in the given mode.
    pub fn add_primitives(&mut self, mode: PrimitiveMode, count: usize) {
        let Some(current) = self.frames.front_mut() else {
            return;
        };
        let count = count as u32;

        current.operation_count += 1;
        current.vertex_count += count;

        match mode {
            PrimitiveMode::PointList => current.point_count += count,
            PrimitiveMode::LineList => current.line_count += count / 2,
            PrimitiveMode::LineStrip => current.line_count += count.saturating_sub(1),
            PrimitiveMode::LineLoop => current.line_count += count,
            PrimitiveMode::TriangleList => current.triangle_count += count / 3,
            PrimitiveMode::TriangleStrip | PrimitiveMode::TriangleFan => {
                current.triangle_count += count.saturating_sub(2)
            }
        }
    }

    /// Returns the recent frames, most recent first.
    pub fn frames(&self) -> impl Iterator<Item = &FrameStats> {
        self.frames.iter()
    }

    /// Returns the counters of the frame in progress.
    pub fn current_frame(&self) -> FrameStats {
        self.frames.front().copied().unwrap_or_default()
    }

    /// Returns the total number of completed frames.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Returns the frame rate over the recent frame window.
    pub fn frame_rate(&self) -> f32 {
        let total: Duration = self.frames.iter().map(|f| f.duration).sum();
        if total.is_zero() {
            return 0.0;
        }
        // The current frame has no duration yet.
        (self.frames.len().saturating_sub(1)) as f32 / total.as_secs_f32()
    }

    pub(crate) fn buffer_created(&mut self, bytes: usize) {
        self.buffer_count += 1;
        self.buffer_bytes += bytes;
    }

    pub(crate) fn buffer_destroyed(&mut self, bytes: usize) {
        self.buffer_count = self.buffer_count.saturating_sub(1);
        self.buffer_bytes = self.buffer_bytes.saturating_sub(bytes);
    }

    pub(crate) fn program_created(&mut self) {
        self.program_count += 1;
    }

    pub(crate) fn program_destroyed(&mut self) {
        self.program_count = self.program_count.saturating_sub(1);
    }

    pub(crate) fn texture_created(&mut self, bytes: usize) {
        self.texture_count += 1;
        self.texture_bytes += bytes;
    }

    pub(crate) fn texture_destroyed(&mut self, bytes: usize) {
        self.texture_count = self.texture_count.saturating_sub(1);
        self.texture_bytes = self.texture_bytes.saturating_sub(bytes);
    }

    /// Returns the number of live buffers.
    pub fn buffer_count(&self) -> u32 {
        self.buffer_count
    }

    /// Returns the total bytes of live buffers.
    pub fn buffer_bytes(&self) -> usize {
        self.buffer_bytes
    }

    /// Returns the number of live programs.
    pub fn program_count(&self) -> u32 {
        self.program_count
    }

    /// Returns the number of live textures.
    pub fn texture_count(&self) -> u32 {
        self.texture_count
    }

    /// Returns the total bytes of live textures.
    pub fn texture_bytes(&self) -> usize {
        self.texture_bytes
    }
}

impl Default for RenderStats {
    fn default() -> Self {
        Self::new()
    }
}
