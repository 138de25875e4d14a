//! `getIndex`/`setIndex` helper synthesis.
//!
//! The target language only indexes with constant expressions, so each
//! macro call is rewritten to call a generated accessor whose body bisects
//! the index range into nested `if(i<h)` tests down to constant-index
//! leaves. One helper exists per (macro, element type, length); helpers
//! over struct elements wait for the struct's declaration to be emitted.

use shaderlink_ast::{HelperContainer, HelperFunction, HelperKind, Ident, Stmt};
use shaderlink_core::{ShaderError, Span, TypeError, Value, VarId};
use tracing::trace;

use crate::usage::{InjectedStatement, Usage};
use crate::variable::{DeclKind, VarArena, Variable};

/// Find or synthesize the helper for indexing `container`.
pub fn inject_helper(
    vars: &mut VarArena,
    usage: &mut Usage,
    kind: HelperKind,
    container: &Value,
    span: Span,
) -> Result<VarId, ShaderError> {
    let (name, element, dep, shape) = match container.unwrap_context() {
        Value::Array(element, len) => {
            let (element_name, dep) = match element.unwrap_context() {
                Value::Struct(layout) => (layout.name.clone(), Some(layout.var)),
                other => (other.type_name(), None),
            };
            let name = format!("{}_{}_{}", kind.macro_name(), element_name, len);
            let element = Ident {
                name: element_name,
                var: dep,
                span,
            };
            (name, element, dep, HelperContainer::Array { len: *len })
        }
        Value::Vec(component, arity) => {
            let ty = container.type_name();
            let name = format!("{}_{}_{}", kind.macro_name(), ty, component.name());
            let element = Ident::new(component.name(), span);
            let shape = HelperContainer::Vector {
                ty,
                len: *arity as usize,
            };
            (name, element, None, shape)
        }
        other => {
            return Err(TypeError::NotIndexable {
                ty: other.type_name(),
                span,
            }
            .into());
        }
    };

    if let Some(existing) = usage.find_injected(&name, dep) {
        return Ok(existing);
    }

    let id = vars.alloc(Variable::new(name.clone(), DeclKind::Helper, span).constant());
    trace!(helper = %name, len = shape.len(), "injecting dynamic index helper");
    let stmt = Stmt::Helper(HelperFunction {
        kind,
        name: Ident {
            name: name.clone(),
            var: Some(id),
            span,
        },
        element,
        container: shape,
        span,
    });
    usage.inject(InjectedStatement {
        name,
        var: id,
        deps: dep.into_iter().collect(),
        stmt,
    });
    Ok(id)
}

// ============================================================================
// Emission
// ============================================================================

/// Write a helper definition using the current names in `vars`.
pub fn write_helper(
    out: &mut String,
    helper: &HelperFunction,
    vars: &VarArena,
    nl: &str,
    tab: &str,
) {
    let name = match helper.name.var {
        Some(id) => vars.name(id),
        None => helper.name.name.as_str(),
    };
    let element = match helper.element.var {
        Some(id) => vars.name(id),
        None => helper.element.name.as_str(),
    };
    let container = match &helper.container {
        HelperContainer::Array { len } => format!("{element} x[{len}]"),
        HelperContainer::Vector { ty, .. } => format!("{ty} x"),
    };

    match helper.kind {
        HelperKind::Get => {
            out.push_str(&format!("{element} {name}(in {container},in int i){{{nl}"));
        }
        HelperKind::Set => {
            out.push_str(&format!(
                "void {name}(inout {container},in int i,in {element} a){{{nl}"
            ));
        }
    }
    write_tree(out, helper.kind, 0, helper.container.len(), 1, nl, tab);
    out.push('}');
}

/// Bisect `[a, b)` at `ceil((a + b) / 2)` until single indices remain.
fn write_tree(
    out: &mut String,
    kind: HelperKind,
    a: usize,
    b: usize,
    depth: usize,
    nl: &str,
    tab: &str,
) {
    let indent = tab.repeat(depth);
    if a + 1 >= b {
        match kind {
            HelperKind::Get => out.push_str(&format!("{indent}return x[{a}];{nl}")),
            HelperKind::Set => out.push_str(&format!("{indent}x[{a}]=a;{nl}")),
        }
        return;
    }
    let h = (a + b).div_ceil(2);
    out.push_str(&format!("{indent}if(i<{h}){{{nl}"));
    write_tree(out, kind, a, h, depth + 1, nl, tab);
    out.push_str(&format!("{indent}}}else{{{nl}"));
    write_tree(out, kind, h, b, depth + 1, nl, tab);
    out.push_str(&format!("{indent}}}{nl}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use shaderlink_core::{ScalarKind, StructField, StructLayout};
    use std::sync::Arc;

    fn helper(kind: HelperKind, len: usize) -> HelperFunction {
        HelperFunction {
            kind,
            name: Ident::new(format!("{}_float_{len}", kind.macro_name()), Span::default()),
            element: Ident::new("float", Span::default()),
            container: HelperContainer::Array { len },
            span: Span::default(),
        }
    }

    fn render(kind: HelperKind, len: usize) -> String {
        let mut out = String::new();
        write_helper(&mut out, &helper(kind, len), &VarArena::new(), "\n", "\t");
        out
    }

    /// Follow the generated conditions for index `i` and return the leaf.
    fn select(text: &str, i: usize) -> String {
        let lines: Vec<&str> = text.lines().skip(1).map(str::trim).collect();
        let mut pos = 0;
        loop {
            let line = lines[pos];
            if let Some(rest) = line.strip_prefix("if(i<") {
                let h: usize = rest.trim_end_matches("){").parse().unwrap();
                if i < h {
                    pos += 1;
                } else {
                    // Skip to the matching `}else{`.
                    let mut open = 0;
                    pos += 1;
                    loop {
                        let l = lines[pos];
                        if l == "}else{" && open == 0 {
                            break;
                        }
                        if l.starts_with("if(") {
                            open += 1;
                        } else if l == "}" {
                            open -= 1;
                        }
                        pos += 1;
                    }
                    pos += 1;
                }
            } else {
                return line.to_string();
            }
        }
    }

    fn depth(text: &str) -> usize {
        text.lines()
            .filter(|line| line.trim_start().starts_with("return") || line.contains("]=a;"))
            .map(|line| line.len() - line.trim_start_matches('\t').len() - 1)
            .max()
            .unwrap()
    }

    #[test]
    fn getter_selects_every_element() {
        for len in 2..=9 {
            let text = render(HelperKind::Get, len);
            for i in 0..len {
                assert_eq!(select(&text, i), format!("return x[{i}];"), "len {len}");
            }
        }
    }

    #[test]
    fn setter_writes_every_element() {
        let text = render(HelperKind::Set, 5);
        assert!(text.starts_with("void setIndex_float_5(inout float x[5],in int i,in float a){"));
        for i in 0..5 {
            assert_eq!(select(&text, i), format!("x[{i}]=a;"));
        }
    }

    #[test]
    fn nesting_depth_is_ceil_log2() {
        for (len, expected) in [(2, 1), (3, 2), (4, 2), (5, 3), (8, 3), (9, 4), (16, 4)] {
            assert_eq!(depth(&render(HelperKind::Get, len)), expected, "len {len}");
        }
    }

    #[test]
    fn minified_output_has_no_whitespace() {
        let mut out = String::new();
        write_helper(&mut out, &helper(HelperKind::Get, 2), &VarArena::new(), "", "");
        assert_eq!(
            out,
            "float getIndex_float_2(in float x[2],in int i){if(i<1){return x[0];}else{return x[1];}}"
        );
    }

    #[test]
    fn vector_helpers_index_components() {
        let mut vars = VarArena::new();
        let mut usage = Usage::new();
        let id = inject_helper(
            &mut vars,
            &mut usage,
            HelperKind::Get,
            &Value::vec(ScalarKind::Float, 3),
            Span::default(),
        )
        .unwrap();
        assert_eq!(vars.name(id), "getIndex_vec3_float");

        let stmts = usage.pop_injected(None);
        let Stmt::Helper(helper) = &stmts[0] else {
            panic!("expected helper");
        };
        let mut out = String::new();
        write_helper(&mut out, helper, &vars, "", "");
        assert!(out.starts_with("float getIndex_vec3_float(in vec3 x,in int i){"));
    }

    #[test]
    fn helpers_are_deduplicated_per_dependency() {
        let mut vars = VarArena::new();
        let mut usage = Usage::new();
        let light = vars.alloc(Variable::new("Light", DeclKind::Struct, Span::default()));
        let layout = StructLayout::new(
            light,
            "Light",
            vec![StructField {
                name: "intensity".to_string(),
                value: Value::FLOAT,
                span: Span::default(),
            }],
        )
        .unwrap();
        let lights = Value::Array(Box::new(Value::Struct(Arc::new(layout))), 4);

        let first = inject_helper(&mut vars, &mut usage, HelperKind::Get, &lights, Span::default())
            .unwrap();
        let second = inject_helper(&mut vars, &mut usage, HelperKind::Get, &lights, Span::default())
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(vars.name(first), "getIndex_Light_4");

        let floats = Value::Array(Box::new(Value::FLOAT), 4);
        let other = inject_helper(&mut vars, &mut usage, HelperKind::Get, &floats, Span::default())
            .unwrap();
        assert_ne!(first, other);
        assert_eq!(usage.pending_injected(), 2);

        assert_eq!(usage.pop_injected(None).len(), 1);
        assert_eq!(usage.pop_injected(Some(light)).len(), 1);
    }

    #[test]
    fn scalars_are_not_indexable() {
        let mut vars = VarArena::new();
        let mut usage = Usage::new();
        let err = inject_helper(&mut vars, &mut usage, HelperKind::Get, &Value::FLOAT, Span::default())
            .unwrap_err();
        assert!(err.is_type());
    }
}
