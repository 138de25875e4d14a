//! Vertex/fragment program linking.

use shaderlink_core::{ModuleError, ShaderError};
use tracing::debug;

use crate::bundle::{ConstValue, ShaderBundle};
use crate::config::{CompileConfig, Naming, Stage};
use crate::loader::ModuleLoader;

/// Options for [`link_program`].
#[derive(Debug, Clone)]
pub struct LinkOptions {
    pub naming: Naming,
    pub newline: String,
    pub indent: String,
    pub vertex_consts: Vec<(String, ConstValue)>,
    pub fragment_consts: Vec<(String, ConstValue)>,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            naming: Naming::default(),
            newline: "\n".to_string(),
            indent: "\t".to_string(),
            vertex_consts: Vec::new(),
            fragment_consts: Vec::new(),
        }
    }
}

impl LinkOptions {
    /// No whitespace and generated short names.
    pub fn minified() -> Self {
        Self {
            naming: Naming::Minify,
            newline: String::new(),
            indent: String::new(),
            ..Self::default()
        }
    }
}

/// The two stage sources of a linked program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedProgram {
    pub vertex: String,
    pub fragment: String,
}

fn build_stage(
    loader: &mut dyn ModuleLoader,
    stage: Stage,
    path: &str,
    options: &LinkOptions,
    consts: &[(String, ConstValue)],
) -> Result<ShaderBundle, ShaderError> {
    let module = loader.load(path)?.ok_or_else(|| ModuleError::NotFound {
        path: path.to_string(),
        from: stage.as_str().to_string(),
        span: Default::default(),
    })?;
    let mut bundle = ShaderBundle::new(CompileConfig::new(stage).with_naming(options.naming));
    bundle.append(module);
    bundle.finalize(loader)?;
    for (name, value) in consts {
        bundle.inject_const(name, *value)?;
    }
    Ok(bundle)
}

/// Compile both stages and check that their varyings agree.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn link_program(
    loader: &mut dyn ModuleLoader,
    vertex_path: &str,
    fragment_path: &str,
    options: &LinkOptions,
) -> Result<LinkedProgram, ShaderError> {
    let vertex = build_stage(loader, Stage::Vertex, vertex_path, options, &options.vertex_consts)?;
    let fragment = build_stage(
        loader,
        Stage::Fragment,
        fragment_path,
        options,
        &options.fragment_consts,
    )?;

    let out = vertex.varyings();
    let input = fragment.varyings();
    if out.len() != input.len() {
        return Err(ModuleError::VaryingsDiffer {
            vertex: out.len(),
            fragment: input.len(),
        }
        .into());
    }
    for (name, ty) in &out {
        match input.get(name) {
            None => {
                return Err(ModuleError::VaryingMissing {
                    name: name.clone(),
                    stage: "fragment",
                }
                .into());
            }
            Some(other) if other != ty => {
                return Err(ModuleError::VaryingType {
                    name: name.clone(),
                    stage: "fragment",
                }
                .into());
            }
            Some(_) => {}
        }
    }
    debug!(varyings = out.len(), "linked program");

    Ok(LinkedProgram {
        vertex: vertex.write(&options.newline, &options.indent)?,
        fragment: fragment.write(&options.newline, &options.indent)?,
    })
}
