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

//! End-to-end tests driving the full pipeline over the headless device.

use vesper_core::renderer::api::{
    AddressMode, AttachmentPoint, BufferUsage, FilterMode, IndexBuffer, IndexType, PrimitiveMode,
    PrimitiveRange, Program, RenderConfig, Shader, ShaderStage, Texture, TextureDescriptor,
    TextureFormat, TextureFramebuffer, VertexArrayBinding, VertexBuffer, VertexFormat,
};
use vesper_core::renderer::error::{BindingError, RenderError, ResourceError};
use vesper_core::renderer::{GeometryPool, RenderContext, WindowEvent};
use vesper_infra::graphics::{DrawCall, HeadlessDevice};

fn context() -> (RenderContext, HeadlessDevice) {
    let device = HeadlessDevice::new();
    let ctx = RenderContext::new(
        Box::new(device.clone()),
        &RenderConfig::default(),
        640,
        480,
    );
    (ctx, device)
}

fn position_program(ctx: &mut RenderContext) -> Program {
    let vertex = Shader::new(
        ctx,
        ShaderStage::Vertex,
        "in vec2 position;\nvoid main() {}\n",
        "vs",
    )
    .unwrap();
    let fragment = Shader::new(ctx, ShaderStage::Fragment, "void main() {}\n", "fs").unwrap();
    Program::new(ctx, vertex, fragment, "position pass").unwrap()
}

fn texture(ctx: &mut RenderContext, size: u32, format: TextureFormat) -> Texture {
    Texture::new(
        ctx,
        &TextureDescriptor {
            label: None,
            width: size,
            height: size,
            format,
            filter: FilterMode::Nearest,
            address_mode: AddressMode::ClampToEdge,
        },
    )
    .unwrap()
}

#[test]
fn test_indexed_draw_reaches_the_device() {
    let (mut ctx, device) = context();
    let format = VertexFormat::parse("2f:position").unwrap();

    let vertices =
        VertexBuffer::new(&mut ctx, 4, format, BufferUsage::Static, "quad").unwrap();
    let indices =
        IndexBuffer::new(&mut ctx, 6, IndexType::U16, BufferUsage::Static, "quad").unwrap();
    let program = position_program(&mut ctx);
    let array =
        VertexArrayBinding::with_index_buffer(&mut ctx, &program, &vertices, &indices).unwrap();

    ctx.set_current_program(Some(&program));
    ctx.set_current_vertex_array(Some(&array));
    ctx.render(&PrimitiveRange::with_index_range(
        PrimitiveMode::TriangleList,
        &vertices,
        indices.range(0, 6),
    ));

    assert_eq!(
        device.draw_calls(),
        vec![DrawCall {
            mode: PrimitiveMode::TriangleList,
            index_type: Some(IndexType::U16),
            first: 0,
            count: 6,
        }]
    );

    let frame = ctx.stats().current_frame();
    assert_eq!(frame.operation_count, 1);
    assert_eq!(frame.vertex_count, 6);
    assert_eq!(frame.triangle_count, 2);
}

#[test]
fn test_vertex_array_uses_only_the_components_the_program_needs() {
    let (mut ctx, _) = context();
    let vertex = Shader::new(
        &mut ctx,
        ShaderStage::Vertex,
        "in vec3 position;\nin vec2 uv;\nvoid main() {}\n",
        "vs",
    )
    .unwrap();
    let fragment = Shader::new(&mut ctx, ShaderStage::Fragment, "void main() {}\n", "fs").unwrap();
    let program = Program::new(&mut ctx, vertex, fragment, "textured").unwrap();

    // The extra 'normal' component is simply not wired up.
    let rich = VertexFormat::parse("3f:position 2f:uv 3f:normal").unwrap();
    let vertices =
        VertexBuffer::new(&mut ctx, 4, rich, BufferUsage::Static, "rich").unwrap();
    assert!(VertexArrayBinding::new(&mut ctx, &program, &vertices).is_ok());

    let bare = VertexFormat::parse("3f:position").unwrap();
    let vertices =
        VertexBuffer::new(&mut ctx, 4, bare, BufferUsage::Static, "bare").unwrap();
    let err = VertexArrayBinding::new(&mut ctx, &program, &vertices).unwrap_err();
    let RenderError::Binding(BindingError::NoMatchingComponent { attribute, .. }) = err else {
        panic!("expected a missing component error");
    };
    assert_eq!(attribute, "uv");
}

#[test]
fn test_render_without_a_program_is_skipped() {
    let (mut ctx, device) = context();
    let format = VertexFormat::parse("2f:position").unwrap();
    let vertices = VertexBuffer::new(&mut ctx, 3, format, BufferUsage::Static, "tri").unwrap();

    ctx.render(&PrimitiveRange::new(PrimitiveMode::TriangleList, &vertices));

    assert!(device.draw_calls().is_empty());
}

#[test]
fn test_repeat_draws_do_not_rebind() {
    let (mut ctx, device) = context();
    let format = VertexFormat::parse("2f:position").unwrap();
    let vertices = VertexBuffer::new(&mut ctx, 3, format, BufferUsage::Static, "tri").unwrap();
    let program = position_program(&mut ctx);

    ctx.set_current_program(Some(&program));
    let range = PrimitiveRange::new(PrimitiveMode::TriangleList, &vertices);

    ctx.render(&range);
    let binds_after_first = device.counters().buffer_binds;
    ctx.render(&range);
    ctx.render(&range);

    assert_eq!(device.counters().buffer_binds, binds_after_first);
    assert_eq!(device.counters().draw_calls, 3);
}

#[test]
fn test_transient_geometry_draws_at_its_offset() {
    let (mut ctx, device) = context();
    let format = VertexFormat::parse("2f:position").unwrap();
    let mut pool = GeometryPool::new(&mut ctx);
    let program = position_program(&mut ctx);

    let first = pool.allocate_vertices(&mut ctx, 3, &format).unwrap();
    let second = pool.allocate_vertices(&mut ctx, 3, &format).unwrap();
    let data: [f32; 6] = [0.0, 0.0, 1.0, 0.0, 0.5, 1.0];
    first
        .copy_from(&mut ctx, bytemuck::cast_slice(&data))
        .unwrap();
    second
        .copy_from(&mut ctx, bytemuck::cast_slice(&data))
        .unwrap();

    ctx.set_current_program(Some(&program));
    ctx.render(&PrimitiveRange::with_vertex_range(
        PrimitiveMode::TriangleList,
        second,
    ));

    let calls = device.draw_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].first, 3);
    assert_eq!(calls[0].count, 3);
}

#[test]
fn test_current_render_target_is_never_none() {
    let (mut ctx, device) = context();
    assert_eq!(ctx.current_framebuffer_size(), (640, 480));

    let color = texture(&mut ctx, 256, TextureFormat::Rgba8);
    let depth = texture(&mut ctx, 256, TextureFormat::Depth24Stencil8);
    let mut framebuffer = TextureFramebuffer::new(&mut ctx, "offscreen").unwrap();
    framebuffer
        .set_attachment(&mut ctx, AttachmentPoint::Color0, Some(&color))
        .unwrap();
    framebuffer
        .set_attachment(&mut ctx, AttachmentPoint::Depth, Some(&depth))
        .unwrap();

    assert_eq!(
        device.framebuffer_attachment(framebuffer.handle(), AttachmentPoint::Color0),
        Some(color.handle())
    );

    ctx.set_current_framebuffer(&framebuffer);
    assert_eq!(ctx.current_framebuffer_size(), (256, 256));

    ctx.set_default_framebuffer_current();
    assert_eq!(ctx.current_framebuffer_size(), (640, 480));
}

#[test]
fn test_texture_creation_respects_the_device_size_limit() {
    let (mut ctx, _) = context();
    let limit = ctx.limits().max_texture_size;

    let err = Texture::new(
        &mut ctx,
        &TextureDescriptor {
            label: Some("oversized".into()),
            width: limit + 1,
            height: 1,
            format: TextureFormat::Rgba8,
            filter: FilterMode::Nearest,
            address_mode: AddressMode::ClampToEdge,
        },
    )
    .unwrap_err();
    let ResourceError::AllocationFailed { details, .. } = err else {
        panic!("expected an allocation failure");
    };
    assert!(details.contains(&limit.to_string()));

    assert!(Texture::new(
        &mut ctx,
        &TextureDescriptor {
            label: None,
            width: limit,
            height: 1,
            format: TextureFormat::Rgba8,
            filter: FilterMode::Nearest,
            address_mode: AddressMode::ClampToEdge,
        },
    )
    .is_ok());
}

#[test]
fn test_mismatched_attachments_have_no_common_size() {
    let (mut ctx, _) = context();
    let small = texture(&mut ctx, 128, TextureFormat::Rgba8);
    let large = texture(&mut ctx, 256, TextureFormat::Rgba8);

    let mut framebuffer = TextureFramebuffer::new(&mut ctx, "mismatched").unwrap();
    framebuffer
        .set_attachment(&mut ctx, AttachmentPoint::Color0, Some(&small))
        .unwrap();
    framebuffer
        .set_attachment(&mut ctx, AttachmentPoint::Color1, Some(&large))
        .unwrap();

    assert_eq!(framebuffer.width(), 0);
    assert_eq!(framebuffer.height(), 0);
}

#[test]
fn test_update_presents_and_counts_frames() {
    let (mut ctx, device) = context();

    assert!(ctx.update());
    assert!(ctx.update());

    assert_eq!(device.counters().frames, 2);
    assert_eq!(ctx.stats().frame_count(), 2);
}

#[test]
fn test_close_request_ends_the_update_loop() {
    let (mut ctx, _) = context();

    ctx.request_close();
    assert!(!ctx.update());
    assert!(ctx.is_closing());
}

#[test]
fn test_window_resize_tracks_the_default_framebuffer() {
    let (mut ctx, _) = context();

    ctx.window_event_sender()
        .send(WindowEvent::Resized {
            width: 1024,
            height: 768,
        })
        .unwrap();
    ctx.update();

    assert_eq!(ctx.default_framebuffer().width(), 1024);
    assert_eq!(ctx.current_framebuffer_size(), (1024, 768));
}
