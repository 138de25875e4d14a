//! Multi-module bundles: imports, packages, re-exports and dependency order.

mod common;

use common::compile;
use shaderlink::ast::builder::*;
use shaderlink::ast::{BinaryOp, CallExpr, Expr, Stmt};
use shaderlink::core::Span;
use shaderlink::{ModuleError, NameError, Naming, ShaderError, Stage};

fn main_fn(body: Vec<Stmt>) -> Stmt {
    function(None, "main", vec![], body)
}

fn set_position(value: Expr) -> Stmt {
    assign(var("gl_Position"), call("vec4", vec![value]))
}

fn math_module() -> (&'static str, Vec<Stmt>) {
    (
        "/lib/math.glsl",
        vec![
            function(
                Some("float"),
                "twice",
                vec![param("float", "x")],
                vec![ret(binary(BinaryOp::Mul, var("x"), float(2.0)))],
            ),
            function(Some("float"), "unused", vec![], vec![ret(float(0.0))]),
            export("twice"),
            export("unused"),
        ],
    )
}

fn build(entry: Vec<Stmt>, mut others: Vec<(&'static str, Vec<Stmt>)>) -> String {
    others.push(("/main.glsl", entry));
    compile(Stage::Vertex, Naming::Readable, "/main.glsl", others)
        .unwrap_or_else(|(_, err)| panic!("compile failed: {err}"))
        .write("\n", "\t")
        .unwrap()
}

fn build_error(entry: Vec<Stmt>, mut others: Vec<(&'static str, Vec<Stmt>)>) -> ShaderError {
    others.push(("/main.glsl", entry));
    match compile(Stage::Vertex, Naming::Readable, "/main.glsl", others) {
        Ok(_) => panic!("expected an error"),
        Err((_, err)) => err,
    }
}

#[test]
fn named_imports_are_emitted_before_the_importer() {
    let out = build(
        vec![
            import("twice", "twice", "/lib/math.glsl"),
            main_fn(vec![set_position(call("twice", vec![float(1.0)]))]),
        ],
        vec![math_module()],
    );
    assert_eq!(
        out,
        "float twice(float x){\n\treturn x*2.0;\n}\nvoid main(){\n\tgl_Position=vec4(twice(1.0));\n}"
    );
}

#[test]
fn aliases_resolve_to_the_exported_variable() {
    let out = build(
        vec![
            import("twice", "double_it", "/lib/math.glsl"),
            main_fn(vec![set_position(call("double_it", vec![float(1.0)]))]),
        ],
        vec![math_module()],
    );
    assert!(out.contains("gl_Position=vec4(twice(1.0));"));
}

#[test]
fn package_members_resolve_at_name_resolution() {
    let package_call = Expr::Call(Box::new(CallExpr {
        callee: member(var("m"), "twice"),
        args: vec![float(3.0)],
        span: Span::default(),
    }));
    let out = build(
        vec![import_all("m", "/lib/math.glsl"), main_fn(vec![set_position(package_call)])],
        vec![math_module()],
    );
    assert!(out.contains("gl_Position=vec4(twice(3.0));"));
    assert!(!out.contains("unused"));
}

#[test]
fn packages_are_not_values() {
    let err = build_error(
        vec![import_all("m", "/lib/math.glsl"), main_fn(vec![set_position(var("m"))])],
        vec![math_module()],
    );
    assert!(matches!(err, ShaderError::Name(NameError::PackageAsValue { .. })));

    let err = build_error(
        vec![
            import_all("m", "/lib/math.glsl"),
            main_fn(vec![set_position(member(var("m"), "missing"))]),
        ],
        vec![math_module()],
    );
    assert!(matches!(
        err,
        ShaderError::Name(NameError::UnknownPackageMember { .. })
    ));
}

#[test]
fn reexports_forward_the_original_variable() {
    let api = (
        "/lib/api.glsl",
        vec![reexport("twice", "scale", "/lib/math.glsl")],
    );
    let out = build(
        vec![
            import("scale", "scale", "/lib/api.glsl"),
            main_fn(vec![set_position(call("scale", vec![float(1.0)]))]),
        ],
        vec![math_module(), api],
    );
    assert!(out.starts_with("float twice(float x){"));
    assert!(out.contains("vec4(twice(1.0))"));
}

#[test]
fn missing_exports_and_modules_are_errors() {
    let err = build_error(
        vec![import("nope", "nope", "/lib/math.glsl"), main_fn(vec![])],
        vec![math_module()],
    );
    assert!(matches!(
        err,
        ShaderError::Name(NameError::NotExported { ref name, ref path, .. })
            if name == "nope" && path == "/lib/math.glsl"
    ));

    let err = build_error(
        vec![import("f", "f", "/lib/missing.glsl"), main_fn(vec![])],
        vec![],
    );
    assert!(matches!(
        err,
        ShaderError::Module(ModuleError::NotFound { ref path, ref from, .. })
            if path == "/lib/missing.glsl" && from == "/main.glsl"
    ));
}

#[test]
fn duplicate_exports_are_rejected() {
    let err = build_error(
        vec![
            uniform("float", "t"),
            export("t"),
            export_as("t", "t"),
            main_fn(vec![]),
        ],
        vec![],
    );
    assert!(matches!(
        err,
        ShaderError::Name(NameError::DuplicateExport { .. })
    ));
}

#[test]
fn circular_imports_fail_with_a_trace() {
    let a = (
        "/a.glsl",
        vec![
            import("b", "b", "/b.glsl"),
            function(Some("float"), "a", vec![], vec![ret(float(1.0))]),
            export("a"),
        ],
    );
    let b = (
        "/b.glsl",
        vec![
            import("a", "a", "/a.glsl"),
            function(Some("float"), "b", vec![], vec![ret(float(1.0))]),
            export("b"),
        ],
    );
    let err = build_error(vec![import("a", "a", "/a.glsl"), main_fn(vec![])], vec![a, b]);
    match err {
        ShaderError::Module(ModuleError::CircularDependency { trace, .. }) => {
            assert_eq!(trace, "\n -> /a.glsl\n -> /b.glsl\n -> /a.glsl");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn dependency_order_is_stable() {
    let leaf = (
        "/z/leaf.glsl",
        vec![
            function(Some("float"), "leaf", vec![], vec![ret(float(1.0))]),
            export("leaf"),
        ],
    );
    let mid = (
        "/a/mid.glsl",
        vec![
            import("leaf", "leaf", "/z/leaf.glsl"),
            function(Some("float"), "mid", vec![], vec![ret(call("leaf", vec![]))]),
            export("mid"),
        ],
    );
    let out = build(
        vec![
            import("mid", "mid", "/a/mid.glsl"),
            import("leaf", "leaf", "/z/leaf.glsl"),
            main_fn(vec![set_position(binary(
                BinaryOp::Add,
                call("mid", vec![]),
                call("leaf", vec![]),
            ))]),
        ],
        vec![mid, leaf],
    );
    let leaf_at = out.find("float leaf()").unwrap();
    let mid_at = out.find("float mid()").unwrap();
    let main_at = out.find("void main()").unwrap();
    assert!(leaf_at < mid_at && mid_at < main_at);
}

#[test]
fn versions_must_agree() {
    let lib = (
        "/lib.glsl",
        vec![
            version(300, Some("es")),
            function(Some("float"), "one", vec![], vec![ret(float(1.0))]),
            export("one"),
        ],
    );
    let err = build_error(
        vec![version(100, None), import("one", "one", "/lib.glsl"), main_fn(vec![])],
        vec![lib.clone()],
    );
    assert!(matches!(
        err,
        ShaderError::Module(ModuleError::VersionMismatch { ref found, ref expected, .. })
            if found == "100" && expected == "300 es"
    ));

    let out = build(
        vec![version(300, Some("es")), import("one", "one", "/lib.glsl"), main_fn(vec![])],
        vec![lib],
    );
    assert_eq!(out, "#version 300 es\nvoid main(){\n}");
}

#[test]
fn helpers_without_dependencies_go_to_the_first_module() {
    let lib = (
        "/lib.glsl",
        vec![
            precision(shaderlink::ast::Precision::High, "float"),
            uniform_array("float", "table", 4),
            function(
                Some("float"),
                "lookup",
                vec![param("int", "i")],
                vec![ret(get_index(var("table"), var("i")))],
            ),
            export("lookup"),
        ],
    );
    let out = build(
        vec![
            import("lookup", "lookup", "/lib.glsl"),
            main_fn(vec![set_position(call("lookup", vec![int(1)]))]),
        ],
        vec![lib],
    );
    assert!(out.starts_with("precision highp float;\nfloat getIndex_float_4("));
}
