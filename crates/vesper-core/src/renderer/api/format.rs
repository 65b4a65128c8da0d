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

//! Vertex formats describing interleaved attribute components.

use std::error::Error;
use std::fmt;

/// Size in bytes of a single `f32` vertex element.
const ELEMENT_SIZE: usize = 4;

/// A single named component of a vertex, made of one to four `f32` elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexComponent {
    name: String,
    element_count: u32,
    offset: usize,
}

impl VertexComponent {
    /// Returns the name of this component.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of `f32` elements in this component.
    pub fn element_count(&self) -> u32 {
        self.element_count
    }

    /// Returns the byte offset of this component within a vertex.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the size of this component in bytes.
    pub fn size(&self) -> usize {
        self.element_count as usize * ELEMENT_SIZE
    }
}

/// An ordered set of vertex components with computed byte offsets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VertexFormat {
    components: Vec<VertexComponent>,
    size: usize,
}

impl VertexFormat {
    /// Creates an empty vertex format.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a format specification such as `"3f:position 2f:uv"`.
    ///
    /// Each whitespace-separated entry is `<1-4>f:<name>`.
    pub fn parse(spec: &str) -> Result<Self, FormatParseError> {
        let mut format = Self::new();

        for entry in spec.split_whitespace() {
            let (arity, name) = entry.split_once(':').ok_or_else(|| FormatParseError {
                entry: entry.to_string(),
            })?;

            let element_count = match arity {
                "1f" => 1,
                "2f" => 2,
                "3f" => 3,
                "4f" => 4,
                _ => {
                    return Err(FormatParseError {
                        entry: entry.to_string(),
                    })
                }
            };

            if name.is_empty() {
                return Err(FormatParseError {
                    entry: entry.to_string(),
                });
            }

            format.push(name, element_count);
        }

        Ok(format)
    }

    /// Appends a component with the given name and element count.
    ///
    /// `element_count` must be between 1 and 4.
    pub fn push(&mut self, name: &str, element_count: u32) {
        assert!(
            (1..=4).contains(&element_count),
            "vertex components have 1 to 4 elements"
        );

        self.components.push(VertexComponent {
            name: name.to_string(),
            element_count,
            offset: self.size,
        });
        self.size += element_count as usize * ELEMENT_SIZE;
    }

    /// Builder-style variant of [`VertexFormat::push`].
    pub fn with(mut self, name: &str, element_count: u32) -> Self {
        self.push(name, element_count);
        self
    }

    /// Returns the component with the given name, if present.
    pub fn find_component(&self, name: &str) -> Option<&VertexComponent> {
        self.components.iter().find(|c| c.name == name)
    }

    /// Returns the components of this format in declaration order.
    pub fn components(&self) -> &[VertexComponent] {
        &self.components
    }

    /// Returns the size of one vertex in bytes.
    pub fn size(&self) -> usize {
        self.size
    }
}

/// Error returned when a format specification string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatParseError {
    /// The specification entry that could not be parsed.
    pub entry: String,
}

impl fmt::Display for FormatParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid vertex format entry '{}'", self.entry)
    }
}

impl Error for FormatParseError {}
