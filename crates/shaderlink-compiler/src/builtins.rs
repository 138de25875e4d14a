//! The built-in symbol table for each stage.
//!
//! Built-ins are ordinary constant variables in the arena, bound in the global
//! frame of every module's scope stack. Magic stage variables that shaders
//! write to (`gl_Position`, `gl_FragColor`, ...) are not constant.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use shaderlink_core::{FunctionValue, Overload, SamplerKind, ScalarKind, Span, Value, VarId};

use crate::config::Stage;
use crate::variable::{DeclKind, VarArena, Variable};

fn vec(n: u8) -> Value {
    Value::vec(ScalarKind::Float, n)
}

fn bvec(n: u8) -> Value {
    Value::vec(ScalarKind::Bool, n)
}

fn ivec(n: u8) -> Value {
    Value::vec(ScalarKind::Int, n)
}

/// `float`, `vec2`, `vec3`, `vec4`
fn gen_types() -> [Value; 4] {
    [Value::FLOAT, vec(2), vec(3), vec(4)]
}

fn sig(params: Vec<Value>, ret: Value) -> Overload {
    Overload::new(params, Some(ret))
}

/// `genType f(genType)`
fn one_to_one() -> Vec<Overload> {
    gen_types().into_iter().map(|t| sig(vec![t.clone()], t)).collect()
}

/// `genType f(genType, genType)`
fn two_to_one() -> Vec<Overload> {
    gen_types()
        .into_iter()
        .map(|t| sig(vec![t.clone(), t.clone()], t))
        .collect()
}

/// `genType f(genType, genType)` and `genType f(genType, float)`
fn two_to_one_or_scalar() -> Vec<Overload> {
    let mut overloads = two_to_one();
    overloads.extend(
        gen_types()
            .into_iter()
            .skip(1)
            .map(|t| sig(vec![t.clone(), Value::FLOAT], t)),
    );
    overloads
}

/// `genType f(genType, genType, genType)`
fn three_to_one() -> Vec<Overload> {
    gen_types()
        .into_iter()
        .map(|t| sig(vec![t.clone(), t.clone(), t.clone()], t))
        .collect()
}

/// `float f(genType)`
fn to_float(arity: usize) -> Vec<Overload> {
    gen_types()
        .into_iter()
        .map(|t| sig(vec![t; arity], Value::FLOAT))
        .collect()
}

fn atan() -> Vec<Overload> {
    let mut overloads = one_to_one();
    overloads.extend(two_to_one());
    overloads
}

fn clamp() -> Vec<Overload> {
    let mut overloads = three_to_one();
    overloads.extend(
        gen_types()
            .into_iter()
            .skip(1)
            .map(|t| sig(vec![t.clone(), Value::FLOAT, Value::FLOAT], t)),
    );
    overloads
}

fn mix() -> Vec<Overload> {
    let mut overloads = three_to_one();
    overloads.extend(
        gen_types()
            .into_iter()
            .skip(1)
            .map(|t| sig(vec![t.clone(), t.clone(), Value::FLOAT], t)),
    );
    overloads
}

fn step() -> Vec<Overload> {
    let mut overloads = two_to_one();
    overloads.extend(
        gen_types()
            .into_iter()
            .skip(1)
            .map(|t| sig(vec![Value::FLOAT, t.clone()], t)),
    );
    overloads
}

fn smoothstep() -> Vec<Overload> {
    let mut overloads = three_to_one();
    overloads.extend(
        gen_types()
            .into_iter()
            .skip(1)
            .map(|t| sig(vec![Value::FLOAT, Value::FLOAT, t.clone()], t)),
    );
    overloads
}

fn refract() -> Vec<Overload> {
    gen_types()
        .into_iter()
        .map(|t| sig(vec![t.clone(), t.clone(), Value::FLOAT], t))
        .collect()
}

/// Component-wise comparisons returning `bvecN`.
fn relational(include_bool: bool) -> Vec<Overload> {
    let mut overloads = Vec::new();
    for n in 2..=4 {
        overloads.push(sig(vec![vec(n), vec(n)], bvec(n)));
        overloads.push(sig(vec![ivec(n), ivec(n)], bvec(n)));
        if include_bool {
            overloads.push(sig(vec![bvec(n), bvec(n)], bvec(n)));
        }
    }
    overloads
}

fn bvec_to(ret: impl Fn(u8) -> Value) -> Vec<Overload> {
    (2..=4).map(|n| sig(vec![bvec(n)], ret(n))).collect()
}

fn core_functions() -> Vec<(&'static str, Vec<Overload>)> {
    let mut functions = Vec::new();
    for name in [
        "abs", "acos", "asin", "ceil", "cos", "degrees", "exp", "exp2", "floor", "fract",
        "inversesqrt", "log", "log2", "normalize", "radians", "sign", "sin", "sqrt", "tan",
    ] {
        functions.push((name, one_to_one()));
    }
    functions.push(("atan", atan()));
    functions.push(("pow", two_to_one()));
    functions.push(("mod", two_to_one_or_scalar()));
    functions.push(("min", two_to_one_or_scalar()));
    functions.push(("max", two_to_one_or_scalar()));
    functions.push(("clamp", clamp()));
    functions.push(("mix", mix()));
    functions.push(("step", step()));
    functions.push(("smoothstep", smoothstep()));
    functions.push(("length", to_float(1)));
    functions.push(("distance", to_float(2)));
    functions.push(("dot", to_float(2)));
    functions.push(("cross", vec![sig(vec![vec(3), vec(3)], vec(3))]));
    functions.push(("faceforward", three_to_one()));
    functions.push(("reflect", two_to_one()));
    functions.push(("refract", refract()));
    functions.push(("lessThan", relational(false)));
    functions.push(("lessThanEqual", relational(false)));
    functions.push(("greaterThan", relational(false)));
    functions.push(("greaterThanEqual", relational(false)));
    functions.push(("equal", relational(true)));
    functions.push(("notEqual", relational(true)));
    functions.push(("any", bvec_to(|_| Value::BOOL)));
    functions.push(("all", bvec_to(|_| Value::BOOL)));
    functions.push(("not", bvec_to(bvec)));
    functions
}

fn core_types() -> Vec<(String, Value)> {
    let mut types = vec![
        ("float".to_string(), Value::FLOAT),
        ("int".to_string(), Value::INT),
        ("bool".to_string(), Value::BOOL),
    ];
    for kind in [ScalarKind::Float, ScalarKind::Int, ScalarKind::Bool] {
        for n in 2..=4 {
            let value = Value::vec(kind, n);
            types.push((value.type_name(), value));
        }
    }
    types
}

/// Stage variables: name, type, writable.
fn stage_variables(stage: Stage) -> Vec<(&'static str, Value, bool)> {
    match stage {
        Stage::Vertex => vec![
            ("gl_Position", vec(4), true),
            ("gl_PointSize", Value::FLOAT, true),
        ],
        Stage::Fragment => vec![
            ("gl_FragCoord", vec(4), false),
            ("gl_FrontFacing", Value::BOOL, false),
            ("gl_PointCoord", vec(2), false),
            ("gl_FragColor", vec(4), true),
        ],
    }
}

fn texture_functions() -> Vec<(&'static str, Vec<Overload>)> {
    let sampler_2d = Value::Sampler(SamplerKind::Sampler2D);
    let sampler_cube = Value::Sampler(SamplerKind::SamplerCube);
    vec![
        (
            "texture2D",
            vec![
                sig(vec![sampler_2d.clone(), vec(2)], vec(4)),
                sig(vec![sampler_2d, vec(2), Value::FLOAT], vec(4)),
            ],
        ),
        (
            "textureCube",
            vec![
                sig(vec![sampler_cube.clone(), vec(3)], vec(4)),
                sig(vec![sampler_cube, vec(3), Value::FLOAT], vec(4)),
            ],
        ),
    ]
}

/// Allocate the stage's built-ins and return the global frame bindings.
pub fn register_builtins(stage: Stage, vars: &mut VarArena) -> FxHashMap<String, VarId> {
    let mut globals = FxHashMap::default();
    let mut bind = |vars: &mut VarArena, name: String, value: Value, constant: bool| {
        let var = Variable::new(name.clone(), DeclKind::Builtin, Span::default()).with_value(value);
        let id = vars.alloc(if constant { var.constant() } else { var });
        globals.insert(name, id);
    };

    for (name, value) in core_types() {
        bind(vars, name, Value::type_of(value), true);
    }
    let mut functions = core_functions();
    if stage == Stage::Fragment {
        for kind in [SamplerKind::Sampler2D, SamplerKind::SamplerCube] {
            bind(vars, kind.name().to_string(), Value::type_of(Value::Sampler(kind)), true);
        }
        functions.extend(texture_functions());
    }
    for (name, overloads) in functions {
        let function = Value::Function(Arc::new(FunctionValue::builtin(name, overloads)));
        bind(vars, name.to_string(), function, true);
    }
    for (name, value, writable) in stage_variables(stage) {
        bind(vars, name.to_string(), value, !writable);
    }

    tracing::debug!(stage = stage.as_str(), count = globals.len(), "registered built-ins");
    globals
}
