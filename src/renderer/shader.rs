//! Shader Sources
//!
//! A [`ShaderLoader`] turns a logical shader name (`"forward.vert"`) into
//! GLSL text with every `#include "file"` line expanded in place.

use std::path::PathBuf;

use rustc_hash::FxHashSet;

use crate::errors::{EmberError, Result};

/// Nesting limit for `#include`; deeper chains are reported as cycles.
const MAX_INCLUDE_DEPTH: usize = 16;

pub trait ShaderLoader {
    /// Raw source of one file, includes unexpanded.
    fn read(&self, name: &str) -> Result<String>;

    /// Source of `name` with includes resolved.
    fn load(&self, name: &str) -> Result<String> {
        let mut included = FxHashSet::default();
        preprocess(self, name, &mut included, 0)
    }
}

fn preprocess<L: ShaderLoader + ?Sized>(
    loader: &L,
    name: &str,
    included: &mut FxHashSet<String>,
    depth: usize,
) -> Result<String> {
    if depth > MAX_INCLUDE_DEPTH {
        return Err(EmberError::ShaderCompilation {
            name: name.to_string(),
            reason: "include depth exceeded".to_string(),
        });
    }

    let source = loader.read(name)?;
    let mut output = String::with_capacity(source.len());
    for line in source.lines() {
        if let Some(target) = parse_include(line) {
            // Each file is pasted at most once per shader.
            if included.insert(target.to_string()) {
                output.push_str(&preprocess(loader, target, included, depth + 1)?);
            }
        } else {
            output.push_str(line);
            output.push('\n');
        }
    }
    Ok(output)
}

fn parse_include(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix("#include")?.trim();
    rest.strip_prefix('"')?.strip_suffix('"')
}

/// Shaders compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedShaderLoader;

impl EmbeddedShaderLoader {
    const SOURCES: &'static [(&'static str, &'static str)] = &[
        ("common.glsl", include_str!("shaders/common.glsl")),
        ("forward.vert", include_str!("shaders/forward.vert")),
        ("unlit.frag", include_str!("shaders/unlit.frag")),
        ("simple_lit.frag", include_str!("shaders/simple_lit.frag")),
        ("shadow.vert", include_str!("shaders/shadow.vert")),
        ("shadow.frag", include_str!("shaders/shadow.frag")),
    ];
}

impl ShaderLoader for EmbeddedShaderLoader {
    fn read(&self, name: &str) -> Result<String> {
        Self::SOURCES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, source)| (*source).to_string())
            .ok_or_else(|| EmberError::ShaderNotFound(name.to_string()))
    }
}

/// Reads shaders from a directory at runtime, e.g. for iteration on disk.
#[derive(Debug, Clone)]
pub struct DirectoryShaderLoader {
    root: PathBuf,
}

impl DirectoryShaderLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ShaderLoader for DirectoryShaderLoader {
    fn read(&self, name: &str) -> Result<String> {
        let path = self.root.join(name);
        std::fs::read_to_string(&path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                EmberError::ShaderNotFound(path.display().to_string())
            } else {
                EmberError::Io(err)
            }
        })
    }
}
