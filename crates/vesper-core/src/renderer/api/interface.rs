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

//! Declared program interfaces for validating programs and vertex formats.

use crate::renderer::api::format::VertexFormat;
use crate::renderer::api::program::{AttributeType, Program, SamplerType, UniformType};
use crate::renderer::error::BindingError;

/// A declared set of samplers, uniforms and attributes a program is
/// expected to expose.
///
/// The attribute direction of [`ProgramInterface::matches_program`] is
/// deliberately asymmetric: the interface may declare attributes the
/// program does not expose, but the program must not expose attributes the
/// interface does not declare. An undeclared program attribute would read
/// from vertex data nobody promised to provide.
#[derive(Debug, Clone, Default)]
pub struct ProgramInterface {
    samplers: Vec<(String, SamplerType)>,
    uniforms: Vec<(String, UniformType)>,
    attributes: Vec<(String, AttributeType)>,
}

impl ProgramInterface {
    /// Creates an empty interface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a sampler.
    pub fn add_sampler(&mut self, name: &str, ty: SamplerType) {
        self.samplers.push((name.to_string(), ty));
    }

    /// Declares a non-sampler uniform.
    pub fn add_uniform(&mut self, name: &str, ty: UniformType) {
        self.uniforms.push((name.to_string(), ty));
    }

    /// Declares a vertex attribute.
    pub fn add_attribute(&mut self, name: &str, ty: AttributeType) {
        self.attributes.push((name.to_string(), ty));
    }

    /// Declares an attribute for every component of the given vertex format.
    pub fn add_attributes(&mut self, format: &VertexFormat) {
        for component in format.components() {
            match AttributeType::from_element_count(component.element_count()) {
                Some(ty) => self.add_attribute(component.name(), ty),
                None => log::error!(
                    "Vertex component '{}' has no attribute type",
                    component.name()
                ),
            }
        }
    }

    /// Checks whether the program exposes this entire interface with exact
    /// types, and no attributes beyond it.
    ///
    /// With `verbose` set, every mismatch is logged.
    pub fn matches_program(&self, program: &Program, verbose: bool) -> bool {
        for (name, ty) in &self.samplers {
            let Some(sampler) = program.find_sampler(name) else {
                if verbose {
                    log::error!(
                        "Sampler '{name}' missing from program '{}'",
                        program.label()
                    );
                }
                return false;
            };
            if sampler.ty() != *ty {
                if verbose {
                    log::error!(
                        "Sampler '{name}' of program '{}' is {}, not {}",
                        program.label(),
                        sampler.ty().glsl_name(),
                        ty.glsl_name()
                    );
                }
                return false;
            }
        }

        for (name, ty) in &self.uniforms {
            let Some(uniform) = program.find_uniform(name) else {
                if verbose {
                    log::error!(
                        "Uniform '{name}' missing from program '{}'",
                        program.label()
                    );
                }
                return false;
            };
            if uniform.ty() != *ty {
                if verbose {
                    log::error!(
                        "Uniform '{name}' of program '{}' is {}, not {}",
                        program.label(),
                        uniform.ty().glsl_name(),
                        ty.glsl_name()
                    );
                }
                return false;
            }
        }

        for attribute in program.attributes() {
            let Some((_, ty)) = self
                .attributes
                .iter()
                .find(|(name, _)| name == attribute.name())
            else {
                if verbose {
                    log::error!(
                        "Attribute '{}' of program '{}' is not declared",
                        attribute.name(),
                        program.label()
                    );
                }
                return false;
            };
            if attribute.ty() != *ty {
                if verbose {
                    log::error!(
                        "Attribute '{}' of program '{}' is {}, not {}",
                        attribute.name(),
                        program.label(),
                        attribute.ty().glsl_name(),
                        ty.glsl_name()
                    );
                }
                return false;
            }
        }

        true
    }

    /// Checks whether the format has exactly one same-arity component per
    /// declared attribute.
    pub fn matches_format(&self, format: &VertexFormat, verbose: bool) -> bool {
        if format.components().len() != self.attributes.len() {
            if verbose {
                log::error!(
                    "Vertex format has {} components where the interface declares {} attributes",
                    format.components().len(),
                    self.attributes.len()
                );
            }
            return false;
        }

        for (name, ty) in &self.attributes {
            let Some(component) = format.find_component(name) else {
                if verbose {
                    log::error!("Vertex format has no component '{name}'");
                }
                return false;
            };
            if component.element_count() != ty.element_count() {
                if verbose {
                    log::error!(
                        "Component '{name}' has {} elements where attribute type {} requires {}",
                        component.element_count(),
                        ty.glsl_name(),
                        ty.element_count()
                    );
                }
                return false;
            }
        }

        true
    }

    /// Verbose [`ProgramInterface::matches_program`] as a typed error.
    pub fn check_program(&self, program: &Program) -> Result<(), BindingError> {
        if self.matches_program(program, true) {
            Ok(())
        } else {
            Err(BindingError::InterfaceMismatch {
                program: program.label().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_direction_requires_equal_counts() {
        let format = VertexFormat::new().with("position", 3).with("uv", 2);

        let mut interface = ProgramInterface::new();
        interface.add_attribute("position", AttributeType::Vec3);
        assert!(!interface.matches_format(&format, false));

        interface.add_attribute("uv", AttributeType::Vec2);
        assert!(interface.matches_format(&format, false));
    }

    #[test]
    fn format_direction_checks_names_and_arity() {
        let format = VertexFormat::new().with("position", 3).with("uv", 2);

        let mut renamed = ProgramInterface::new();
        renamed.add_attribute("position", AttributeType::Vec3);
        renamed.add_attribute("texcoord", AttributeType::Vec2);
        assert!(!renamed.matches_format(&format, false));

        let mut narrowed = ProgramInterface::new();
        narrowed.add_attribute("position", AttributeType::Vec3);
        narrowed.add_attribute("uv", AttributeType::Vec3);
        assert!(!narrowed.matches_format(&format, false));
    }

    #[test]
    fn derives_attributes_from_format() {
        let format = VertexFormat::new().with("position", 3).with("uv", 2);

        let mut interface = ProgramInterface::new();
        interface.add_attributes(&format);
        assert!(interface.matches_format(&format, false));
    }
}
