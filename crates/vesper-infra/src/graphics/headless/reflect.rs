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

//! GLSL declaration scanning for the headless device.
//!
//! A deliberately small subset: one declaration per line, of the form
//! `uniform <type> <name>;` or, in the vertex stage, `in`/`attribute`
//! declarations. Everything else is passed over, matching how a real
//! compiler only reports the inputs it keeps active.

use vesper_core::renderer::api::{AttributeType, InputType, SamplerType, ShaderStage, UniformType};

/// GL type codes of types the scanner recognizes but the core does not
/// model. Declarations of these surface as [`InputType::Unsupported`].
const UNSUPPORTED_TYPES: &[(&str, u32)] = &[
    ("bool", 0x8B56),
    ("bvec2", 0x8B57),
    ("bvec3", 0x8B58),
    ("bvec4", 0x8B59),
    ("ivec2", 0x8B53),
    ("ivec3", 0x8B54),
    ("ivec4", 0x8B55),
    ("uvec2", 0x8DC6),
    ("uvec3", 0x8DC7),
    ("uvec4", 0x8DC8),
    ("mat2x3", 0x8B65),
    ("mat2x4", 0x8B66),
    ("mat3x2", 0x8B67),
    ("mat3x4", 0x8B68),
    ("mat4x2", 0x8B69),
    ("mat4x3", 0x8B6A),
    ("sampler1DShadow", 0x8B61),
    ("sampler2DShadow", 0x8B62),
    ("samplerCubeShadow", 0x8DC5),
];

/// A scanned input declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Declaration {
    pub name: String,
    pub ty: InputType,
}

/// Declarations of one shader, split by the qualifier they carried.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ShaderInputs {
    pub attributes: Vec<Declaration>,
    pub uniforms: Vec<Declaration>,
}

fn uniform_type(word: &str) -> Option<InputType> {
    let ty = match word {
        "int" => InputType::Uniform(UniformType::Int),
        "uint" => InputType::Uniform(UniformType::UInt),
        "float" => InputType::Uniform(UniformType::Float),
        "vec2" => InputType::Uniform(UniformType::Vec2),
        "vec3" => InputType::Uniform(UniformType::Vec3),
        "vec4" => InputType::Uniform(UniformType::Vec4),
        "mat2" => InputType::Uniform(UniformType::Mat2),
        "mat3" => InputType::Uniform(UniformType::Mat3),
        "mat4" => InputType::Uniform(UniformType::Mat4),
        "sampler1D" => InputType::Sampler(SamplerType::Sampler1D),
        "sampler2D" => InputType::Sampler(SamplerType::Sampler2D),
        "sampler3D" => InputType::Sampler(SamplerType::Sampler3D),
        "sampler2DRect" => InputType::Sampler(SamplerType::SamplerRect),
        "samplerCube" => InputType::Sampler(SamplerType::SamplerCube),
        _ => return None,
    };
    Some(ty)
}

fn attribute_type(word: &str) -> Option<InputType> {
    let ty = match word {
        "float" => AttributeType::Float,
        "vec2" => AttributeType::Vec2,
        "vec3" => AttributeType::Vec3,
        "vec4" => AttributeType::Vec4,
        _ => return None,
    };
    Some(InputType::Attribute(ty))
}

fn unsupported_type(word: &str) -> Option<InputType> {
    UNSUPPORTED_TYPES
        .iter()
        .find(|(name, _)| *name == word)
        .map(|(_, native)| InputType::Unsupported { native: *native })
}

/// Scans the declarations out of shader source.
///
/// Returns a compiler-style info log on malformed or unknown declarations.
pub(crate) fn scan(stage: ShaderStage, source: &str) -> Result<ShaderInputs, String> {
    let mut inputs = ShaderInputs::default();
    let mut errors = Vec::new();

    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let text = raw.trim();
        if text.is_empty() || text.starts_with("//") || text.starts_with('#') {
            continue;
        }

        let mut tokens = text.split_whitespace();
        let qualifier = match tokens.next() {
            Some(q @ ("uniform" | "in" | "attribute")) => q,
            _ => continue,
        };
        if qualifier != "uniform" && stage != ShaderStage::Vertex {
            // Fragment-stage inputs are varyings, not program inputs.
            continue;
        }

        let (Some(ty_word), Some(name_word)) = (tokens.next(), tokens.next()) else {
            errors.push(format!("ERROR: 0:{line}: malformed declaration '{text}'"));
            continue;
        };
        let name = name_word.trim_end_matches(';');
        if name.is_empty() || tokens.next().is_some() {
            errors.push(format!("ERROR: 0:{line}: malformed declaration '{text}'"));
            continue;
        }
        if name.contains('[') {
            errors.push(format!("ERROR: 0:{line}: array inputs are not supported"));
            continue;
        }

        let ty = if qualifier == "uniform" {
            uniform_type(ty_word).or_else(|| unsupported_type(ty_word))
        } else {
            attribute_type(ty_word).or_else(|| unsupported_type(ty_word))
        };

        match ty {
            Some(ty) => {
                let declaration = Declaration {
                    name: name.to_string(),
                    ty,
                };
                if qualifier == "uniform" {
                    inputs.uniforms.push(declaration);
                } else {
                    inputs.attributes.push(declaration);
                }
            }
            None => errors.push(format!("ERROR: 0:{line}: unknown type '{ty_word}'")),
        }
    }

    if errors.is_empty() {
        Ok(inputs)
    } else {
        Err(errors.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_attributes_and_uniforms() {
        let source = "\
#version 150
in vec3 position;
in vec2 uv;
uniform mat4 viewMatrix;
uniform sampler2D colorMap;

void main() {
    gl_Position = viewMatrix * vec4(position, 1.0);
}
";
        let inputs = scan(ShaderStage::Vertex, source).unwrap();
        assert_eq!(inputs.attributes.len(), 2);
        assert_eq!(inputs.uniforms.len(), 2);
        assert_eq!(
            inputs.attributes[0].ty,
            InputType::Attribute(AttributeType::Vec3)
        );
        assert_eq!(inputs.uniforms[0].name, "viewMatrix");
        assert_eq!(
            inputs.uniforms[1].ty,
            InputType::Sampler(SamplerType::Sampler2D)
        );
    }

    #[test]
    fn fragment_inputs_are_varyings() {
        let inputs = scan(ShaderStage::Fragment, "in vec2 uv;\nuniform float time;\n").unwrap();
        assert!(inputs.attributes.is_empty());
        assert_eq!(inputs.uniforms.len(), 1);
        assert_eq!(inputs.uniforms[0].name, "time");
    }

    #[test]
    fn recognized_but_unmodeled_types_become_unsupported() {
        let inputs = scan(ShaderStage::Fragment, "uniform bool flag;\n").unwrap();
        assert_eq!(
            inputs.uniforms[0].ty,
            InputType::Unsupported { native: 0x8B56 }
        );
    }

    #[test]
    fn unknown_types_fail_with_line_numbers() {
        let log = scan(ShaderStage::Fragment, "\nuniform half x;\n").unwrap_err();
        assert!(log.contains("0:2"));
        assert!(log.contains("'half'"));
    }
}
