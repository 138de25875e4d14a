//! Shared helpers for the integration tests.

#![allow(dead_code)]

use shaderlink::ast::Stmt;
use shaderlink::{
    CompileConfig, MemoryLoader, Naming, ShaderBundle, ShaderError, ShaderModule, Stage,
};

/// Compile `entry` (found among `modules`) for `stage`.
pub fn compile(
    stage: Stage,
    naming: Naming,
    entry: &str,
    modules: Vec<(&str, Vec<Stmt>)>,
) -> Result<ShaderBundle, (ShaderBundle, ShaderError)> {
    let mut loader = MemoryLoader::new();
    let mut bundle = ShaderBundle::new(CompileConfig::new(stage).with_naming(naming));
    for (path, statements) in modules {
        let module = ShaderModule::new(path, statements);
        if path == entry {
            bundle.append(module);
        } else {
            loader.insert(module);
        }
    }
    match bundle.finalize(&mut loader) {
        Ok(()) => Ok(bundle),
        Err(err) => Err((bundle, err)),
    }
}

/// Compile a single vertex module and return the readable output.
pub fn vertex_source(statements: Vec<Stmt>) -> String {
    let bundle = compile(Stage::Vertex, Naming::Readable, "/main.glsl", vec![("/main.glsl", statements)])
        .unwrap_or_else(|(_, err)| panic!("compile failed: {err}"));
    bundle.write("\n", "\t").unwrap()
}

/// Compile a single vertex module and return the error.
pub fn vertex_error(statements: Vec<Stmt>) -> ShaderError {
    match compile(Stage::Vertex, Naming::Readable, "/main.glsl", vec![("/main.glsl", statements)]) {
        Ok(bundle) => panic!(
            "expected an error, got:\n{}",
            bundle.write("\n", "\t").unwrap()
        ),
        Err((_, err)) => err,
    }
}
