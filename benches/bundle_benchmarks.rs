//! Performance benchmarks for the shaderlink bundle pipeline.
//!
//! Measures finalizing and writing bundles across different workloads:
//! - Module graphs: an entry importing a growing library of functions
//! - Dynamic indexing: helper synthesis for many indexed arrays
//! - Linking: a full vertex/fragment program
//!
//! ## Profiling with Puffin
//!
//! Run with the `profile-with-puffin` feature to collect pass timings:
//!
//! ```bash
//! cargo bench --features profile-with-puffin -- --profile-time 5
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use shaderlink::prelude::*;
use std::hint::black_box;

#[cfg(feature = "profile-with-puffin")]
static FRAME_VIEW: std::sync::OnceLock<puffin::GlobalFrameView> = std::sync::OnceLock::new();

#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
    FRAME_VIEW.get_or_init(puffin::GlobalFrameView::default);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

/// Flush profiling data at the end of an iteration.
#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

// ============================================================================
// Fixtures
// ============================================================================

/// A library exporting `count` functions `fK(float) -> float`.
fn library(count: usize) -> ShaderModule {
    let mut statements = Vec::new();
    for k in 0..count {
        let name = format!("f{k}");
        statements.push(function(
            Some("float"),
            &name,
            vec![param("float", "x")],
            vec![ret(binary(
                BinaryOp::Add,
                binary(BinaryOp::Mul, var("x"), float(k as f64)),
                call("sin", vec![var("x")]),
            ))],
        ));
        statements.push(export(&name));
    }
    ShaderModule::new("/lib/math.glsl", statements)
}

/// A vertex entry chaining every library function.
fn chained_entry(count: usize) -> ShaderModule {
    let mut statements = Vec::new();
    for k in 0..count {
        let name = format!("f{k}");
        statements.push(import(&name, &name, "/lib/math.glsl"));
    }
    statements.push(attribute("float", "seed"));
    let mut body = vec![local("float", "acc", Some(var("seed")))];
    for k in 0..count {
        body.push(assign(var("acc"), call(&format!("f{k}"), vec![var("acc")])));
    }
    body.push(assign(var("gl_Position"), call("vec4", vec![var("acc")])));
    statements.push(function(None, "main", vec![], body));
    ShaderModule::new("/main.glsl", statements)
}

/// A vertex entry reading `count` uniform arrays of `len` floats with a loop index.
fn indexed_entry(count: usize, len: usize) -> ShaderModule {
    let mut statements = Vec::new();
    let mut loop_body = Vec::new();
    for k in 0..count {
        let name = format!("weights{k}");
        statements.push(uniform_array("float", &name, len + k));
        loop_body.push(assign_op(
            var("sum"),
            AssignOp::Add,
            get_index(var(&name), var("i")),
        ));
    }
    let body = vec![
        local("float", "sum", Some(float(0.0))),
        for_loop(
            local("int", "i", Some(int(0))),
            binary(BinaryOp::Less, var("i"), int(len as i64)),
            increment(var("i")),
            loop_body,
        ),
        assign(var("gl_Position"), call("vec4", vec![var("sum")])),
    ];
    statements.push(function(None, "main", vec![], body));
    ShaderModule::new("/indexed.glsl", statements)
}

fn build(entry: &ShaderModule, loader: &mut MemoryLoader, naming: Naming) -> String {
    let mut bundle = ShaderBundle::new(CompileConfig::new(Stage::Vertex).with_naming(naming));
    bundle.append(entry.clone());
    bundle.finalize(loader).unwrap();
    bundle.write("\n", "\t").unwrap()
}

fn fragment_for(varyings: &[&str]) -> ShaderModule {
    let mut statements: Vec<Stmt> = vec![precision(Precision::Medium, "float")];
    let mut sum = float(0.0);
    for name in varyings {
        statements.push(varying("float", name));
        sum = binary(BinaryOp::Add, sum, var(name));
    }
    statements.push(function(
        None,
        "main",
        vec![],
        vec![assign(var("gl_FragColor"), call("vec4", vec![sum]))],
    ));
    ShaderModule::new("/fragment.glsl", statements)
}

fn vertex_for(varyings: &[&str]) -> ShaderModule {
    let mut statements: Vec<Stmt> = vec![attribute("vec4", "position")];
    let mut body = Vec::new();
    for (k, name) in varyings.iter().enumerate() {
        statements.push(varying("float", name));
        body.push(assign(var(name), float(k as f64)));
    }
    body.push(assign(var("gl_Position"), var("position")));
    statements.push(function(None, "main", vec![], body));
    ShaderModule::new("/vertex.glsl", statements)
}

// ============================================================================
// Benchmarks
// ============================================================================

fn module_graph_benchmarks(c: &mut Criterion) {
    setup_profiler();

    let mut group = c.benchmark_group("bundle/module_graph");
    for count in [4usize, 32, 128] {
        let entry = chained_entry(count);
        let mut loader = MemoryLoader::new().with(library(count));
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("readable", count), &count, |b, _| {
            b.iter(|| {
                let out = build(black_box(&entry), &mut loader, Naming::Readable);
                end_profiling_frame();
                black_box(out.len())
            });
        });
        group.bench_with_input(BenchmarkId::new("minify", count), &count, |b, _| {
            b.iter(|| {
                let out = build(black_box(&entry), &mut loader, Naming::Minify);
                end_profiling_frame();
                black_box(out.len())
            });
        });
    }
    group.finish();
}

fn dynamic_index_benchmarks(c: &mut Criterion) {
    setup_profiler();

    let mut group = c.benchmark_group("bundle/dynamic_index");
    for (count, len) in [(1usize, 8usize), (8, 16), (32, 64)] {
        let entry = indexed_entry(count, len);
        let mut loader = MemoryLoader::new();
        group.bench_function(format!("{count}_arrays_of_{len}"), |b| {
            b.iter(|| {
                let out = build(black_box(&entry), &mut loader, Naming::Readable);
                end_profiling_frame();
                black_box(out.len())
            });
        });
    }
    group.finish();
}

fn link_benchmarks(c: &mut Criterion) {
    setup_profiler();

    let names: Vec<String> = (0..8).map(|k| format!("v{k}")).collect();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let mut loader = MemoryLoader::new()
        .with(vertex_for(&names))
        .with(fragment_for(&names));

    let mut group = c.benchmark_group("link");
    group.bench_function("eight_varyings", |b| {
        b.iter(|| {
            let program = link_program(
                &mut loader,
                "/vertex.glsl",
                "/fragment.glsl",
                &LinkOptions::default(),
            )
            .unwrap();
            end_profiling_frame();
            black_box(program.fragment.len())
        });
    });
    group.bench_function("eight_varyings_minified", |b| {
        let options = LinkOptions::minified();
        b.iter(|| {
            let program =
                link_program(&mut loader, "/vertex.glsl", "/fragment.glsl", &options).unwrap();
            end_profiling_frame();
            black_box(program.vertex.len())
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    module_graph_benchmarks,
    dynamic_index_benchmarks,
    link_benchmarks
);

criterion_main!(benches);
