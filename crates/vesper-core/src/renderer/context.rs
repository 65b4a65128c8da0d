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

//! The render context: a state cache over a device plus frame and window
//! machinery.
//!
//! Every `set_current_*` setter is a guarded no-op when the requested value
//! equals the cached one; only an actual change reaches the device and
//! counts as a state change. The context is passed explicitly to everything
//! that needs it; there is no global current context.

use flume::{Receiver, Sender};

use crate::event::EventBus;
use crate::math::{LinearRgba, Recti};
use crate::renderer::api::{
    BufferHandle, BufferKind, DefaultFramebuffer, DeviceLimits, FramebufferHandle, Program,
    ProgramHandle, PrimitiveRange, RenderConfig, RenderState, RenderStats, SamplerType, Texture,
    TextureFramebuffer, TextureHandle, UniformType, VertexArrayBinding, VertexArrayHandle,
    VertexBuffer, IndexBuffer,
};
use crate::renderer::error::RenderError;
use crate::renderer::traits::{ClearOps, RenderDevice};

/// How [`RenderContext::update`] paces frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// `update` never blocks; frames run continuously.
    Automatic,
    /// `update` blocks until a refresh is requested or the context closes.
    Manual,
}

/// Event broadcast to frame subscribers at the end of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEvent {
    /// The frame was presented; transient per-frame resources may recycle.
    FrameFinished,
}

/// Event fed into the context by a windowing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    /// The window was resized.
    Resized {
        /// New width in pixels.
        width: u32,
        /// New height in pixels.
        height: u32,
    },
    /// The user asked to close the window.
    CloseRequested,
    /// A redraw was requested; unblocks manual-refresh waits.
    Refresh,
}

/// Token identifying a registered listener, used to remove it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// The render target currently bound; never "none".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FramebufferBinding {
    Default,
    Offscreen {
        handle: FramebufferHandle,
        width: u32,
        height: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SharedType {
    Uniform(UniformType),
    Sampler(SamplerType),
}

impl SharedType {
    fn glsl_name(&self) -> &'static str {
        match self {
            Self::Uniform(ty) => ty.glsl_name(),
            Self::Sampler(ty) => ty.glsl_name(),
        }
    }
}

/// One registered shared entry. Registration order is preserved so the
/// declaration text lists entries in the order they were created.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SharedEntry {
    name: String,
    ty: SharedType,
    id: i32,
}

/// The rendering core's central object.
///
/// Owns the device, the cached binding state, the shared program state
/// registry, statistics and the window event queue. All rendering happens
/// on the thread that owns the context; the only blocking point is
/// [`RenderContext::update`] in manual refresh mode.
pub struct RenderContext {
    device: Box<dyn RenderDevice>,
    limits: DeviceLimits,
    default_framebuffer: DefaultFramebuffer,
    refresh_mode: RefreshMode,
    closing: bool,

    current_program: Option<ProgramHandle>,
    current_vertex_buffer: Option<BufferHandle>,
    current_index_buffer: Option<BufferHandle>,
    current_vertex_array: Option<VertexArrayHandle>,
    current_framebuffer: FramebufferBinding,
    active_unit: u32,
    texture_units: Vec<Option<TextureHandle>>,
    viewport_area: Recti,
    scissor_area: Recti,
    render_state: RenderState,

    shared_entries: Vec<SharedEntry>,
    declaration: Option<String>,

    window_events: EventBus<WindowEvent>,
    frame_listeners: Vec<Sender<FrameEvent>>,
    resize_listeners: Vec<(ListenerId, Box<dyn FnMut(u32, u32)>)>,
    close_listeners: Vec<(ListenerId, Box<dyn FnMut() -> bool>)>,
    next_listener: u64,

    stats: RenderStats,
}

impl std::fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("device", &self.device)
            .field("refresh_mode", &self.refresh_mode)
            .field("closing", &self.closing)
            .field("current_program", &self.current_program)
            .field("current_framebuffer", &self.current_framebuffer)
            .finish_non_exhaustive()
    }
}

impl RenderContext {
    /// Creates a context over the given device, with the default
    /// framebuffer initially sized `width` by `height`.
    pub fn new(
        device: Box<dyn RenderDevice>,
        config: &RenderConfig,
        width: u32,
        height: u32,
    ) -> Self {
        let limits = device.limits();
        let viewport = Recti::of_size(width, height);
        let render_state = RenderState::default();

        device.set_viewport(viewport);
        device.apply_render_state(&render_state);

        log::info!(
            "Render context created ({width}x{height}, {} texture units)",
            limits.max_combined_texture_image_units
        );

        Self {
            texture_units: vec![None; limits.max_combined_texture_image_units as usize],
            device,
            limits,
            default_framebuffer: DefaultFramebuffer::new(config, width, height),
            refresh_mode: RefreshMode::Automatic,
            closing: false,
            current_program: None,
            current_vertex_buffer: None,
            current_index_buffer: None,
            current_vertex_array: None,
            current_framebuffer: FramebufferBinding::Default,
            active_unit: 0,
            viewport_area: viewport,
            scissor_area: viewport,
            render_state,
            shared_entries: Vec::new(),
            declaration: None,
            window_events: EventBus::new(),
            frame_listeners: Vec::new(),
            resize_listeners: Vec::new(),
            close_listeners: Vec::new(),
            next_listener: 0,
            stats: RenderStats::new(),
        }
    }

    pub(crate) fn device(&self) -> &dyn RenderDevice {
        &*self.device
    }

    /// Returns the device's capability limits.
    pub fn limits(&self) -> &DeviceLimits {
        &self.limits
    }

    /// Returns the rendering statistics.
    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut RenderStats {
        &mut self.stats
    }

    /// Returns the window-backed default framebuffer.
    pub fn default_framebuffer(&self) -> &DefaultFramebuffer {
        &self.default_framebuffer
    }

    // --- state cache -----------------------------------------------------

    /// Makes the given program current.
    pub fn set_current_program(&mut self, program: Option<&Program>) {
        self.bind_program_handle(program.map(|p| p.handle()));
    }

    /// Returns the handle of the current program, if any.
    pub fn current_program(&self) -> Option<ProgramHandle> {
        self.current_program
    }

    pub(crate) fn bind_program_handle(&mut self, handle: Option<ProgramHandle>) {
        if self.current_program == handle {
            return;
        }
        self.current_program = handle;
        self.device.bind_program(handle);
        self.stats.add_state_change();
    }

    /// Makes the given vertex buffer current.
    pub fn set_current_vertex_buffer(&mut self, buffer: Option<&VertexBuffer>) {
        self.bind_buffer_handle(BufferKind::Vertex, buffer.map(|b| b.handle()));
    }

    /// Makes the given index buffer current.
    pub fn set_current_index_buffer(&mut self, buffer: Option<&IndexBuffer>) {
        self.bind_buffer_handle(BufferKind::Index, buffer.map(|b| b.handle()));
    }

    /// Returns the handle of the current buffer of the given kind, if any.
    pub fn current_buffer(&self, kind: BufferKind) -> Option<BufferHandle> {
        match kind {
            BufferKind::Vertex => self.current_vertex_buffer,
            BufferKind::Index => self.current_index_buffer,
        }
    }

    pub(crate) fn bind_buffer_handle(&mut self, kind: BufferKind, handle: Option<BufferHandle>) {
        let current = match kind {
            BufferKind::Vertex => &mut self.current_vertex_buffer,
            BufferKind::Index => &mut self.current_index_buffer,
        };
        if *current == handle {
            return;
        }
        *current = handle;
        self.device.bind_buffer(kind, handle);
        self.stats.add_state_change();
    }

    /// Drops a destroyed buffer from the cache without a device bind.
    pub(crate) fn bind_buffer_handle_forget(&mut self, kind: BufferKind, handle: BufferHandle) {
        let current = match kind {
            BufferKind::Vertex => &mut self.current_vertex_buffer,
            BufferKind::Index => &mut self.current_index_buffer,
        };
        if *current == Some(handle) {
            *current = None;
        }
    }

    /// Makes the given vertex array current.
    pub fn set_current_vertex_array(&mut self, array: Option<&VertexArrayBinding>) {
        let handle = array.map(|a| a.handle());
        if self.current_vertex_array == handle {
            return;
        }
        self.current_vertex_array = handle;
        self.device.bind_vertex_array(handle);
        self.stats.add_state_change();
    }

    /// Returns the handle of the current vertex array, if any.
    pub fn current_vertex_array(&self) -> Option<VertexArrayHandle> {
        self.current_vertex_array
    }

    /// Selects the active texture unit.
    pub fn set_active_texture_unit(&mut self, unit: u32) {
        if unit as usize >= self.texture_units.len() {
            log::error!(
                "Texture unit {unit} exceeds device limit {}",
                self.texture_units.len()
            );
            return;
        }
        if self.active_unit == unit {
            return;
        }
        self.active_unit = unit;
        self.device.set_active_texture_unit(unit);
        self.stats.add_state_change();
    }

    /// Returns the active texture unit.
    pub fn active_texture_unit(&self) -> u32 {
        self.active_unit
    }

    /// Binds the given texture on the active unit.
    pub fn set_current_texture(&mut self, texture: Option<&Texture>) {
        self.bind_texture_handle(texture.map(|t| t.handle()));
    }

    /// Returns the texture bound on the active unit, if any.
    pub fn current_texture(&self) -> Option<TextureHandle> {
        self.texture_units[self.active_unit as usize]
    }

    pub(crate) fn bind_texture_handle(&mut self, handle: Option<TextureHandle>) {
        let unit = self.active_unit as usize;
        if self.texture_units[unit] == handle {
            return;
        }
        self.texture_units[unit] = handle;
        self.device.bind_texture(self.active_unit, handle);
        self.stats.add_state_change();
    }

    /// Makes an offscreen framebuffer the current render target.
    pub fn set_current_framebuffer(&mut self, framebuffer: &TextureFramebuffer) {
        let binding = FramebufferBinding::Offscreen {
            handle: framebuffer.handle(),
            width: framebuffer.width(),
            height: framebuffer.height(),
        };
        if self.current_framebuffer == binding {
            return;
        }
        self.current_framebuffer = binding;
        self.device.bind_framebuffer(Some(framebuffer.handle()));
        self.stats.add_state_change();
    }

    /// Makes the default framebuffer the current render target.
    pub fn set_default_framebuffer_current(&mut self) {
        if self.current_framebuffer == FramebufferBinding::Default {
            return;
        }
        self.current_framebuffer = FramebufferBinding::Default;
        self.device.bind_framebuffer(None);
        self.stats.add_state_change();
    }

    /// Returns the size in pixels of the current render target.
    pub fn current_framebuffer_size(&self) -> (u32, u32) {
        match self.current_framebuffer {
            FramebufferBinding::Default => (
                self.default_framebuffer.width(),
                self.default_framebuffer.height(),
            ),
            FramebufferBinding::Offscreen { width, height, .. } => (width, height),
        }
    }

    /// Sets the viewport rectangle.
    pub fn set_viewport_area(&mut self, area: Recti) {
        if self.viewport_area == area {
            return;
        }
        self.viewport_area = area;
        self.device.set_viewport(area);
        self.stats.add_state_change();
    }

    /// Returns the viewport rectangle.
    pub fn viewport_area(&self) -> Recti {
        self.viewport_area
    }

    /// Sets the scissor rectangle.
    ///
    /// The device scissor test is enabled only when the area differs from
    /// the full current render target.
    pub fn set_scissor_area(&mut self, area: Recti) {
        if self.scissor_area == area {
            return;
        }
        self.scissor_area = area;

        let (width, height) = self.current_framebuffer_size();
        if area == Recti::of_size(width, height) {
            self.device.set_scissor(None);
        } else {
            self.device.set_scissor(Some(area));
        }
        self.stats.add_state_change();
    }

    /// Returns the scissor rectangle.
    pub fn scissor_area(&self) -> Recti {
        self.scissor_area
    }

    /// Applies a fixed-function state, diffed against the cached state.
    pub fn set_render_state(&mut self, state: &RenderState) {
        if self.render_state == *state {
            return;
        }
        self.render_state = *state;
        self.device.apply_render_state(state);
        self.stats.add_state_change();
    }

    /// Reapplies the given state unconditionally.
    ///
    /// Used after foreign code may have touched the device behind the
    /// cache's back.
    pub fn force_render_state(&mut self, state: &RenderState) {
        self.render_state = *state;
        self.device.apply_render_state(state);
        self.stats.add_state_change();
    }

    /// Returns the cached fixed-function state.
    pub fn render_state(&self) -> &RenderState {
        &self.render_state
    }

    // --- shared program state registry -----------------------------------

    /// Registers a shared uniform under the given application-defined ID.
    ///
    /// Registering an identical name and type again is idempotent; the same
    /// name under a different type is an error.
    pub fn create_shared_uniform(
        &mut self,
        name: &str,
        ty: UniformType,
        id: i32,
    ) -> Result<(), RenderError> {
        self.create_shared_entry(name, SharedType::Uniform(ty), id)
    }

    /// Registers a shared sampler under the given application-defined ID.
    pub fn create_shared_sampler(
        &mut self,
        name: &str,
        ty: SamplerType,
        id: i32,
    ) -> Result<(), RenderError> {
        self.create_shared_entry(name, SharedType::Sampler(ty), id)
    }

    // Uniforms and samplers share one name space, like the declaration
    // text they end up in.
    fn create_shared_entry(
        &mut self,
        name: &str,
        ty: SharedType,
        id: i32,
    ) -> Result<(), RenderError> {
        if let Some(existing) = self.shared_entries.iter().find(|e| e.name == name) {
            if existing.ty == ty {
                return Ok(());
            }
            return Err(RenderError::SharedStateTypeMismatch {
                name: name.to_string(),
                existing: existing.ty.glsl_name().to_string(),
                requested: ty.glsl_name().to_string(),
            });
        }

        self.shared_entries.push(SharedEntry {
            name: name.to_string(),
            ty,
            id,
        });
        self.declaration = None;
        Ok(())
    }

    /// Returns the shared ID of the uniform with this name and type.
    pub fn shared_uniform_id(&self, name: &str, ty: UniformType) -> Option<i32> {
        self.shared_entries
            .iter()
            .find(|e| e.name == name && e.ty == SharedType::Uniform(ty))
            .map(|e| e.id)
    }

    /// Returns the shared ID of the sampler with this name and type.
    pub fn shared_sampler_id(&self, name: &str, ty: SamplerType) -> Option<i32> {
        self.shared_entries
            .iter()
            .find(|e| e.name == name && e.ty == SharedType::Sampler(ty))
            .map(|e| e.id)
    }

    /// Returns GLSL source declaring every registered shared entry, in
    /// registration order.
    ///
    /// The text is regenerated lazily, only after the registry changed.
    pub fn shared_state_declaration(&mut self) -> &str {
        let Self {
            declaration,
            shared_entries,
            ..
        } = self;

        declaration.get_or_insert_with(|| {
            let mut text = String::new();
            for entry in shared_entries.iter() {
                text.push_str(&format!(
                    "uniform {} {};\n",
                    entry.ty.glsl_name(),
                    entry.name
                ));
            }
            text
        })
    }

    // --- clears and drawing ----------------------------------------------

    /// Clears the color buffer of the current render target.
    pub fn clear_color_buffer(&mut self, color: LinearRgba) {
        self.device.clear(&ClearOps {
            color: Some(color),
            ..Default::default()
        });
    }

    /// Clears the depth buffer of the current render target.
    pub fn clear_depth_buffer(&mut self, depth: f32) {
        self.device.clear(&ClearOps {
            depth: Some(depth),
            ..Default::default()
        });
    }

    /// Clears the stencil buffer of the current render target.
    pub fn clear_stencil_buffer(&mut self, value: u32) {
        self.device.clear(&ClearOps {
            stencil: Some(value),
            ..Default::default()
        });
    }

    /// Clears color, depth and stencil in one device call.
    pub fn clear_buffers(&mut self, color: LinearRgba, depth: f32, stencil: u32) {
        self.device.clear(&ClearOps {
            color: Some(color),
            depth: Some(depth),
            stencil: Some(stencil),
        });
    }

    /// Draws a primitive range with the current program.
    ///
    /// Without a current program this logs an error and does nothing. The
    /// range's buffers are made current lazily, so redundant binds are
    /// elided.
    pub fn render(&mut self, range: &PrimitiveRange) {
        if self.current_program.is_none() {
            log::error!("Cannot render without a current program");
            return;
        }
        if range.is_empty() {
            log::warn!("Rendering empty primitive range");
            return;
        }

        self.bind_buffer_handle(BufferKind::Vertex, range.vertex_buffer());

        if let Some((buffer, index_type)) = range.index_buffer() {
            self.bind_buffer_handle(BufferKind::Index, Some(buffer));
            self.device
                .draw_indexed(range.mode(), index_type, range.start(), range.count());
        } else {
            self.device.draw(range.mode(), range.start(), range.count());
        }

        self.stats.add_primitives(range.mode(), range.count());
    }

    // --- frame and window machinery --------------------------------------

    /// Returns the refresh mode.
    pub fn refresh_mode(&self) -> RefreshMode {
        self.refresh_mode
    }

    /// Sets the refresh mode.
    pub fn set_refresh_mode(&mut self, mode: RefreshMode) {
        self.refresh_mode = mode;
    }

    /// Returns `true` once a close request has been accepted.
    pub fn is_closing(&self) -> bool {
        self.closing
    }

    /// Subscribes to end-of-frame events.
    pub fn subscribe_frame_events(&mut self) -> Receiver<FrameEvent> {
        let (sender, receiver) = flume::unbounded();
        self.frame_listeners.push(sender);
        receiver
    }

    /// Returns a sender a windowing layer feeds events through.
    ///
    /// The sender may be moved to another thread; events are serviced by
    /// [`RenderContext::update`] on the owning thread.
    pub fn window_event_sender(&self) -> Sender<WindowEvent> {
        self.window_events.sender()
    }

    /// Requests a refresh, unblocking a manual-refresh `update`.
    pub fn refresh(&self) {
        self.window_events.publish(WindowEvent::Refresh);
    }

    /// Emulates a user close request; close listeners are consulted on the
    /// next `update`.
    pub fn request_close(&self) {
        self.window_events.publish(WindowEvent::CloseRequested);
    }

    /// Registers a resize listener; listeners fire in registration order.
    pub fn on_resize(&mut self, listener: impl FnMut(u32, u32) + 'static) -> ListenerId {
        let id = self.next_listener_id();
        self.resize_listeners.push((id, Box::new(listener)));
        id
    }

    /// Registers a close-request listener.
    ///
    /// A close request is honored only if every close listener returns
    /// `true`; with none registered it is honored immediately.
    pub fn on_close_request(&mut self, listener: impl FnMut() -> bool + 'static) -> ListenerId {
        let id = self.next_listener_id();
        self.close_listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a previously registered listener.
    pub fn remove_listener(&mut self, id: ListenerId) {
        self.resize_listeners.retain(|(i, _)| *i != id);
        self.close_listeners.retain(|(i, _)| *i != id);
    }

    fn next_listener_id(&mut self) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        id
    }

    /// Finishes the frame: presents, notifies frame subscribers and
    /// services window events.
    ///
    /// In manual refresh mode this blocks until a refresh is requested or
    /// the context is closing. Returns `false` once closing.
    pub fn update(&mut self) -> bool {
        self.device.swap_buffers();
        self.stats.add_frame();
        self.frame_listeners
            .retain(|s| s.send(FrameEvent::FrameFinished).is_ok());

        match self.refresh_mode {
            RefreshMode::Automatic => {
                let pending: Vec<WindowEvent> =
                    self.window_events.receiver().try_iter().collect();
                for event in pending {
                    self.handle_window_event(event);
                }
            }
            RefreshMode::Manual => {
                let receiver = self.window_events.receiver();
                while !self.closing {
                    // The context keeps a sender alive, so this wait only
                    // ends through an event.
                    match receiver.recv() {
                        Ok(event) => {
                            let refresh = event == WindowEvent::Refresh;
                            self.handle_window_event(event);
                            if refresh {
                                break;
                            }
                        }
                        Err(_) => break,
                    }
                }
            }
        }

        !self.closing
    }

    fn handle_window_event(&mut self, event: WindowEvent) {
        match event {
            WindowEvent::Resized { width, height } => {
                self.default_framebuffer.set_size(width, height);

                let mut listeners = std::mem::take(&mut self.resize_listeners);
                for (_, listener) in &mut listeners {
                    listener(width, height);
                }
                // Listeners registered during dispatch land behind the
                // existing ones.
                listeners.append(&mut self.resize_listeners);
                self.resize_listeners = listeners;
            }
            WindowEvent::CloseRequested => {
                let mut allowed = true;
                let mut listeners = std::mem::take(&mut self.close_listeners);
                for (_, listener) in &mut listeners {
                    if !listener() {
                        allowed = false;
                    }
                }
                listeners.append(&mut self.close_listeners);
                self.close_listeners = listeners;

                if allowed {
                    self.closing = true;
                }
            }
            WindowEvent::Refresh => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::api::BufferKind;
    use crate::renderer::test_support::counting_context;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn redundant_binds_are_elided() {
        let (mut ctx, device) = counting_context();

        ctx.bind_buffer_handle(BufferKind::Vertex, Some(BufferHandle(7)));
        ctx.bind_buffer_handle(BufferKind::Vertex, Some(BufferHandle(7)));
        ctx.bind_buffer_handle(BufferKind::Vertex, Some(BufferHandle(7)));
        assert_eq!(device.buffer_binds(), 1);

        ctx.bind_buffer_handle(BufferKind::Index, Some(BufferHandle(7)));
        assert_eq!(device.buffer_binds(), 2);

        ctx.bind_buffer_handle(BufferKind::Vertex, None);
        ctx.bind_buffer_handle(BufferKind::Vertex, None);
        assert_eq!(device.buffer_binds(), 3);

        assert_eq!(ctx.stats().current_frame().state_change_count, 3);
    }

    #[test]
    fn forgetting_a_buffer_forces_the_next_bind() {
        let (mut ctx, device) = counting_context();

        ctx.bind_buffer_handle(BufferKind::Vertex, Some(BufferHandle(7)));
        ctx.bind_buffer_handle_forget(BufferKind::Vertex, BufferHandle(7));
        ctx.bind_buffer_handle(BufferKind::Vertex, Some(BufferHandle(7)));

        assert_eq!(device.buffer_binds(), 2);
    }

    #[test]
    fn shared_registry_is_idempotent_but_type_strict() {
        let (mut ctx, _) = counting_context();

        ctx.create_shared_uniform("viewMatrix", UniformType::Mat4, 1)
            .unwrap();
        ctx.create_shared_uniform("viewMatrix", UniformType::Mat4, 1)
            .unwrap();

        let err = ctx
            .create_shared_uniform("viewMatrix", UniformType::Vec4, 2)
            .unwrap_err();
        assert!(matches!(err, RenderError::SharedStateTypeMismatch { .. }));

        assert_eq!(
            ctx.shared_uniform_id("viewMatrix", UniformType::Mat4),
            Some(1)
        );
        assert_eq!(ctx.shared_uniform_id("viewMatrix", UniformType::Vec4), None);
        assert_eq!(ctx.shared_uniform_id("modelMatrix", UniformType::Mat4), None);
    }

    #[test]
    fn declaration_follows_registration_order() {
        let (mut ctx, _) = counting_context();
        assert_eq!(ctx.shared_state_declaration(), "");

        ctx.create_shared_uniform("time", UniformType::Float, 0)
            .unwrap();
        ctx.create_shared_sampler("colorMap", SamplerType::Sampler2D, 1)
            .unwrap();
        ctx.create_shared_uniform("viewMatrix", UniformType::Mat4, 2)
            .unwrap();

        assert_eq!(
            ctx.shared_state_declaration(),
            "uniform float time;\n\
             uniform sampler2D colorMap;\n\
             uniform mat4 viewMatrix;\n"
        );

        // Late registrations append; earlier entries keep their place.
        ctx.create_shared_uniform("modelMatrix", UniformType::Mat4, 3)
            .unwrap();
        assert_eq!(
            ctx.shared_state_declaration(),
            "uniform float time;\n\
             uniform sampler2D colorMap;\n\
             uniform mat4 viewMatrix;\n\
             uniform mat4 modelMatrix;\n"
        );
    }

    #[test]
    fn full_target_scissor_disables_the_device_test() {
        let (mut ctx, device) = counting_context();

        ctx.set_scissor_area(Recti::new(10, 10, 100, 100));
        ctx.set_scissor_area(Recti::of_size(640, 480));

        assert_eq!(
            device.scissor_calls(),
            vec![Some(Recti::new(10, 10, 100, 100)), None]
        );
    }

    #[test]
    fn render_without_a_program_is_a_no_op() {
        let (mut ctx, device) = counting_context();

        ctx.render(&PrimitiveRange::empty());
        assert_eq!(device.draws(), 0);
        assert_eq!(ctx.stats().current_frame().operation_count, 0);
    }

    #[test]
    fn close_requires_every_listener_to_agree() {
        let (mut ctx, _) = counting_context();

        let veto = ctx.on_close_request(|| false);
        ctx.on_close_request(|| true);

        ctx.request_close();
        assert!(ctx.update());
        assert!(!ctx.is_closing());

        ctx.remove_listener(veto);
        ctx.request_close();
        assert!(!ctx.update());
        assert!(ctx.is_closing());
    }

    #[test]
    fn resize_reaches_listeners_and_the_default_framebuffer() {
        let (mut ctx, _) = counting_context();

        let seen = Rc::new(Cell::new((0, 0)));
        let sink = Rc::clone(&seen);
        ctx.on_resize(move |w, h| sink.set((w, h)));

        ctx.window_event_sender()
            .send(WindowEvent::Resized {
                width: 800,
                height: 600,
            })
            .unwrap();
        ctx.update();

        assert_eq!(seen.get(), (800, 600));
        assert_eq!(ctx.default_framebuffer().width(), 800);
        assert_eq!(ctx.default_framebuffer().height(), 600);
    }

    #[test]
    fn manual_update_blocks_until_a_refresh() {
        let (mut ctx, device) = counting_context();
        ctx.set_refresh_mode(RefreshMode::Manual);

        let sender = ctx.window_event_sender();
        let waker = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(20));
            sender.send(WindowEvent::Refresh).unwrap();
        });

        let started = std::time::Instant::now();
        assert!(ctx.update());
        assert!(started.elapsed() >= std::time::Duration::from_millis(20));
        assert_eq!(device.swaps(), 1);

        waker.join().unwrap();
    }

    #[test]
    fn frame_subscribers_hear_every_update() {
        let (mut ctx, _) = counting_context();
        let events = ctx.subscribe_frame_events();

        ctx.update();
        ctx.update();

        assert_eq!(events.try_iter().count(), 2);
    }
}
