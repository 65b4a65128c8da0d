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

//! Integration tests for program linking, introspection and shared state.

use vesper_core::renderer::api::{
    AddressMode, FilterMode, Program, ProgramInterface, RenderConfig, SamplerType, Shader,
    ShaderStage, SharedProgramState, Texture, TextureDescriptor, TextureFormat, TextureHandle,
    UniformType, UniformValue,
};
use vesper_core::renderer::error::ShaderError;
use vesper_core::renderer::RenderContext;
use vesper_infra::graphics::HeadlessDevice;

const VERTEX_SRC: &str = "\
#version 150
in vec3 position;
in vec2 uv;
uniform mat4 viewMatrix;
void main() {
    gl_Position = viewMatrix * vec4(position, 1.0);
}
";

const FRAGMENT_SRC: &str = "\
#version 150
uniform sampler2D colorMap;
uniform sampler2D normalMap;
uniform float time;
void main() {
    gl_FragColor = texture(colorMap, vec2(time));
}
";

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

fn link(ctx: &mut RenderContext) -> Program {
    let vertex = Shader::new(ctx, ShaderStage::Vertex, VERTEX_SRC, "test vs").unwrap();
    let fragment = Shader::new(ctx, ShaderStage::Fragment, FRAGMENT_SRC, "test fs").unwrap();
    Program::new(ctx, vertex, fragment, "test program").unwrap()
}

#[test]
fn test_compile_failure_carries_the_info_log() {
    let (mut ctx, _) = context();

    let err = Shader::new(&mut ctx, ShaderStage::Fragment, "uniform half x;\n", "bad").unwrap_err();
    let ShaderError::CompileFailed { label, info_log } = err else {
        panic!("expected a compile failure");
    };
    assert_eq!(label, "bad");
    assert!(info_log.contains("'half'"));
}

#[test]
fn test_introspection_finds_every_input() {
    let (mut ctx, _) = context();
    let program = link(&mut ctx);

    assert_eq!(program.attributes().len(), 2);
    assert!(program.find_attribute("position").is_some());
    assert!(program.find_attribute("uv").is_some());

    assert!(program.find_uniform("viewMatrix").is_some());
    assert!(program.find_uniform("time").is_some());
    assert!(program.find_sampler("colorMap").is_some());

    // Introspection leaves no program current.
    assert!(ctx.current_program().is_none());
}

#[test]
fn test_samplers_get_sequential_units() {
    let (mut ctx, device) = context();
    let program = link(&mut ctx);

    let color = program.find_sampler("colorMap").unwrap();
    let normal = program.find_sampler("normalMap").unwrap();
    assert_eq!(color.unit(), 0);
    assert_eq!(normal.unit(), 1);

    // The units were uploaded to the device during introspection.
    assert_eq!(device.sampler_unit(program.handle(), "colorMap"), Some(0));
    assert_eq!(device.sampler_unit(program.handle(), "normalMap"), Some(1));
}

#[test]
fn test_shared_ids_come_from_the_registry() {
    let (mut ctx, _) = context();
    ctx.create_shared_uniform("viewMatrix", UniformType::Mat4, 7)
        .unwrap();
    ctx.create_shared_sampler("colorMap", SamplerType::Sampler2D, 3)
        .unwrap();

    let program = link(&mut ctx);

    assert_eq!(
        program.find_uniform("viewMatrix").unwrap().shared_id(),
        Some(7)
    );
    assert_eq!(
        program.find_sampler("colorMap").unwrap().shared_id(),
        Some(3)
    );
    assert_eq!(program.find_uniform("time").unwrap().shared_id(), None);
    assert_eq!(program.find_sampler("normalMap").unwrap().shared_id(), None);
}

#[test]
fn test_reserved_and_unsupported_uniforms_are_skipped() {
    let (mut ctx, _) = context();

    let source = "\
uniform float gl_builtin;
uniform bool flag;
uniform float time;
";
    let vertex = Shader::new(&mut ctx, ShaderStage::Vertex, "in vec3 position;\n", "vs").unwrap();
    let fragment = Shader::new(&mut ctx, ShaderStage::Fragment, source, "fs").unwrap();
    let program = Program::new(&mut ctx, vertex, fragment, "skippy").unwrap();

    assert!(program.find_uniform("gl_builtin").is_none());
    assert!(program.find_uniform("flag").is_none());
    assert!(program.find_uniform("time").is_some());
    assert_eq!(program.uniforms().len(), 1);
}

#[test]
fn test_conflicting_stage_declarations_fail_to_link() {
    let (mut ctx, _) = context();

    let vertex = Shader::new(
        &mut ctx,
        ShaderStage::Vertex,
        "uniform float scale;\n",
        "vs",
    )
    .unwrap();
    let fragment = Shader::new(
        &mut ctx,
        ShaderStage::Fragment,
        "uniform vec2 scale;\n",
        "fs",
    )
    .unwrap();

    let err = Program::new(&mut ctx, vertex, fragment, "conflict").unwrap_err();
    let ShaderError::LinkFailed { info_log, .. } = err else {
        panic!("expected a link failure");
    };
    assert!(info_log.contains("scale"));
}

#[test]
fn test_linking_requires_matching_stages() {
    let (mut ctx, _) = context();

    let a = Shader::new(&mut ctx, ShaderStage::Fragment, "uniform float x;\n", "a").unwrap();
    let b = Shader::new(&mut ctx, ShaderStage::Fragment, "uniform float y;\n", "b").unwrap();

    let err = Program::new(&mut ctx, a, b, "two fragments").unwrap_err();
    assert!(matches!(err, ShaderError::StageMismatch { .. }));
}

#[test]
fn test_uniform_upload_is_type_checked() {
    let (mut ctx, device) = context();
    let program = link(&mut ctx);
    let time = program.find_uniform("time").unwrap();

    time.set(&mut ctx, &UniformValue::Int(3));
    assert_eq!(device.uniform_value(program.handle(), "time"), None);

    time.set(&mut ctx, &UniformValue::Float(1.5));
    assert_eq!(
        device.uniform_value(program.handle(), "time"),
        Some(UniformValue::Float(1.5))
    );
}

struct TestSharedState {
    matrix: [f32; 16],
    texture: TextureHandle,
}

impl SharedProgramState for TestSharedState {
    fn uniform_value(&mut self, id: i32, _ty: UniformType) -> Option<UniformValue> {
        (id == 7).then_some(UniformValue::Mat4(self.matrix))
    }

    fn sampler_texture(&mut self, id: i32, _ty: SamplerType) -> Option<TextureHandle> {
        (id == 3).then_some(self.texture)
    }
}

#[test]
fn test_apply_shared_state_uploads_values_and_binds_textures() {
    let (mut ctx, device) = context();
    ctx.create_shared_uniform("viewMatrix", UniformType::Mat4, 7)
        .unwrap();
    ctx.create_shared_sampler("colorMap", SamplerType::Sampler2D, 3)
        .unwrap();
    let program = link(&mut ctx);

    let texture = Texture::new(
        &mut ctx,
        &TextureDescriptor {
            label: None,
            width: 4,
            height: 4,
            format: TextureFormat::Rgba8,
            filter: FilterMode::Linear,
            address_mode: AddressMode::Repeat,
        },
    )
    .unwrap();

    let mut matrix = [0.0f32; 16];
    matrix[0] = 2.0;
    let mut state = TestSharedState {
        matrix,
        texture: texture.handle(),
    };

    let binds_before = device.counters().texture_binds;
    program.apply_shared_state(&mut ctx, &mut state);

    assert_eq!(
        device.uniform_value(program.handle(), "viewMatrix"),
        Some(UniformValue::Mat4(matrix))
    );
    assert_eq!(ctx.current_texture(), Some(texture.handle()));
    assert!(device.counters().texture_binds > binds_before);
}

#[test]
fn test_interface_attribute_check_is_asymmetric() {
    let (mut ctx, _) = context();
    let program = link(&mut ctx);

    let mut interface = ProgramInterface::new();
    interface.add_uniform("viewMatrix", UniformType::Mat4);
    interface.add_uniform("time", UniformType::Float);
    interface.add_sampler("colorMap", SamplerType::Sampler2D);
    interface.add_sampler("normalMap", SamplerType::Sampler2D);

    // The program exposes 'uv', which is not declared yet.
    let mut partial = interface.clone();
    partial.add_attribute(
        "position",
        vesper_core::renderer::api::AttributeType::Vec3,
    );
    assert!(!partial.matches_program(&program, false));
    assert!(partial.check_program(&program).is_err());

    // Declaring more attributes than the program exposes is fine.
    let mut full = partial.clone();
    full.add_attribute("uv", vesper_core::renderer::api::AttributeType::Vec2);
    full.add_attribute("normal", vesper_core::renderer::api::AttributeType::Vec3);
    assert!(full.matches_program(&program, false));

    // Declared uniforms must exist with the exact type.
    let mut wrong = full.clone();
    wrong.add_uniform("missing", UniformType::Float);
    assert!(!wrong.matches_program(&program, false));
}
