//! Bundled shader library.
//!
//! Shader functions are addressed as `module::function`, e.g.
//! [`VERTEX_FUNCTION`]. The library compiles every bundled WGSL module once
//! per device.

use std::collections::HashMap;

use pollster::FutureExt;

use crate::error::{RenderError, RenderResult};

/// Vertex stage of the pixel-buffer quad.
pub const VERTEX_FUNCTION: &str = "pixel_buffer_shader::vertexFunction";

/// Fragment stage sampling the pixel-buffer texture.
pub const FRAGMENT_FUNCTION: &str = "pixel_buffer_shader::fragmentFunction";

const BUNDLED_SOURCES: &[(&str, &str)] = &[(
    "pixel_buffer_shader",
    include_str!("shaders/pixel_buffer.wgsl"),
)];

struct CompiledModule {
    source: &'static str,
    module: wgpu::ShaderModule,
}

/// A function resolved from the library, ready for a pipeline stage.
pub struct ShaderFunction<'a> {
    pub module: &'a wgpu::ShaderModule,
    pub entry_point: &'a str,
}

/// Shader modules compiled for one device.
pub struct ShaderLibrary {
    modules: HashMap<&'static str, CompiledModule>,
}

impl ShaderLibrary {
    /// Compiles the bundled shader modules.
    pub fn bundled(device: &wgpu::Device) -> RenderResult<Self> {
        let mut modules = HashMap::new();
        for &(name, source) in BUNDLED_SOURCES {
            device.push_error_scope(wgpu::ErrorFilter::Validation);
            let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(name),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
            if let Some(error) = device.pop_error_scope().block_on() {
                return Err(RenderError::ShaderCompilationFailed(format!("{name}: {error}")));
            }
            modules.insert(name, CompiledModule { source, module });
        }
        Ok(Self { modules })
    }

    /// Resolves a `module::function` name.
    pub fn make_function<'a>(&'a self, qualified_name: &'a str) -> RenderResult<ShaderFunction<'a>> {
        let (module_name, entry_point) = qualified_name
            .split_once("::")
            .ok_or_else(|| RenderError::FunctionNotFound(qualified_name.to_string()))?;

        let compiled = self
            .modules
            .get(module_name)
            .ok_or_else(|| RenderError::ShaderNotFound(module_name.to_string()))?;

        if !declares_function(compiled.source, entry_point) {
            return Err(RenderError::FunctionNotFound(qualified_name.to_string()));
        }

        Ok(ShaderFunction {
            module: &compiled.module,
            entry_point,
        })
    }
}

fn declares_function(source: &str, name: &str) -> bool {
    source.lines().any(|line| {
        line.trim_start()
            .strip_prefix("fn ")
            .and_then(|rest| rest.strip_prefix(name))
            .is_some_and(|rest| rest.trim_start().starts_with('('))
    })
}
