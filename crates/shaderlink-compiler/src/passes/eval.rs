//! Type Check Pass - evaluate every declaration and expression.
//!
//! Each declaration gives its variable a [`Value`]: a placeholder of the
//! declared type, a `LiteralInt` for integer consts with a known payload,
//! or a type descriptor for structs. Expressions are evaluated against
//! those values; operators, calls, member access and indexing are checked
//! by the value model in `shaderlink-core`.
//!
//! [`ExprEvaluator`] only reads the arena, so later passes re-evaluate
//! expressions with it instead of caching types in the tree.

use std::sync::Arc;

use shaderlink_ast::{CallExpr, ConstDecl, Expr, FunctionDecl, Ident, InterfaceDecl, Stmt};
use shaderlink_core::values as ops;
use shaderlink_core::{
    FunctionValue, NameError, Overload, ShaderError, Span, StructField, StructLayout, TypeError,
    Value, VarId,
};

use crate::passes::resolve::bound;
use crate::return_checker::ReturnChecker;
use crate::variable::{DeclKind, VarArena};

type Result<T> = std::result::Result<T, ShaderError>;

// ============================================================================
// Expression evaluation
// ============================================================================

pub struct ExprEvaluator<'a> {
    vars: &'a VarArena,
}

impl<'a> ExprEvaluator<'a> {
    pub fn new(vars: &'a VarArena) -> Self {
        Self { vars }
    }

    fn var_value(&self, ident: &Ident) -> Result<Value> {
        let id = bound(ident)?;
        let record = self.vars.get(id);
        if record.is_package() {
            return Err(NameError::PackageAsValue {
                name: ident.name.clone(),
                span: ident.span,
            }
            .into());
        }
        Ok(self.vars.value(id, ident.span)?.clone().with_context(ident.span))
    }

    /// Evaluate an expression that must produce a value.
    pub fn eval(&self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Int(value, _) => Ok(Value::LiteralInt(*value)),
            Expr::Float(..) => Ok(Value::FLOAT),
            Expr::Bool(..) => Ok(Value::BOOL),
            Expr::Var(ident) => self.var_value(ident),
            Expr::Member(member) => match member.package_member {
                Some(id) => Ok(self.vars.value(id, member.span)?.clone()),
                None => {
                    let object = self.eval(&member.object)?;
                    Ok(object.member(&member.key, member.span)?)
                }
            },
            Expr::Index(index) => {
                let container = self.eval(&index.container)?;
                let position = self.constant_index(&index.index)?;
                Ok(container.index(position, index.span)?)
            }
            Expr::GetIndex(index) => {
                let container = self.eval(&index.container)?;
                self.dynamic_index(&index.index)?;
                Ok(container.index(0, index.span)?)
            }
            Expr::Call(call) => self
                .eval_call(call)?
                .ok_or_else(|| TypeError::VoidValue { span: call.span }.into()),
            Expr::Binary(binary) => {
                let left = self.eval(&binary.left)?;
                let right = self.eval(&binary.right)?;
                Ok(ops::binary(binary.op, &left, &right, binary.span)?)
            }
            Expr::Unary(unary) => {
                let operand = self.eval(&unary.operand)?;
                Ok(ops::unary(unary.op, &operand, unary.span)?)
            }
            Expr::Paren(inner, _) => self.eval(inner),
        }
    }

    /// Evaluate a call; `None` is a void result.
    pub fn eval_call(&self, call: &CallExpr) -> Result<Option<Value>> {
        let callee = self.eval(&call.callee)?;
        let args = call
            .args
            .iter()
            .map(|arg| self.eval(arg))
            .collect::<Result<Vec<_>>>()?;
        Ok(callee.call(&args, call.span)?)
    }

    /// The payload of an index that must be known at compile time.
    pub fn constant_index(&self, expr: &Expr) -> Result<i64> {
        let value = self.eval(expr)?;
        value.literal_int().ok_or_else(|| {
            TypeError::NonConstantIndex {
                hint: "getIndex".to_string(),
                span: expr.span(),
            }
            .into()
        })
    }

    /// Check the index of a `getIndex`/`setIndex` macro.
    pub fn dynamic_index(&self, expr: &Expr) -> Result<()> {
        let value = self.eval(expr)?;
        Ok(Value::INT.check(&value, expr.span())?)
    }
}

// ============================================================================
// Statement checking
// ============================================================================

pub struct TypeCheckPass<'a> {
    vars: &'a mut VarArena,
    /// Return type of the function being checked; `Some(None)` is void.
    returns: Option<Option<Value>>,
    checker: ReturnChecker,
}

impl<'a> TypeCheckPass<'a> {
    pub fn new(vars: &'a mut VarArena) -> Self {
        Self {
            vars,
            returns: None,
            checker: ReturnChecker::new(),
        }
    }

    pub fn run(mut self, statements: &[Stmt]) -> Result<()> {
        self.check_block(statements)
    }

    fn eval(&self, expr: &Expr) -> Result<Value> {
        ExprEvaluator::new(self.vars).eval(expr)
    }

    /// The placeholder a declaration of `ty name[length]` holds.
    fn declared_type(
        &self,
        ty: &Ident,
        length: Option<usize>,
        allow_sampler: bool,
        span: Span,
    ) -> Result<Value> {
        let id = bound(ty)?;
        let proto = self.vars.value(id, ty.span)?.instantiate(&ty.name, ty.span)?;
        if proto.is_sampler() && !allow_sampler {
            return Err(TypeError::SamplerNotUniform {
                ty: proto.type_name(),
                span,
            }
            .into());
        }
        match length {
            Some(len) => Ok(Value::array(proto, len, span)?),
            None => Ok(proto),
        }
    }

    fn set(&mut self, ident: &Ident, value: Value) -> Result<()> {
        let id = bound(ident)?;
        self.vars.set_value(id, value);
        Ok(())
    }

    fn check_interface(&mut self, decl: &InterfaceDecl, allow_sampler: bool) -> Result<()> {
        let value = self.declared_type(&decl.ty, decl.length, allow_sampler, decl.span)?;
        if !allow_sampler && !value.is_simple() {
            return Err(TypeError::ExpectedSimple {
                ty: value.type_name(),
                span: decl.span,
            }
            .into());
        }
        self.set(&decl.name, value)
    }

    fn check_const(&mut self, decl: &ConstDecl) -> Result<()> {
        let ty = self.declared_type(&decl.ty, decl.length, false, decl.span)?;
        let mut value = ty.clone();
        if let Some(init) = &decl.init {
            let init_value = self.eval(init)?;
            ty.check(&init_value, init.span())?;
            if let (true, Some(payload)) = (ty.is_int(), init_value.literal_int()) {
                value = Value::LiteralInt(payload);
            }
        }
        self.set(&decl.name, value)
    }

    fn check_function(&mut self, decl: &FunctionDecl) -> Result<()> {
        let ret = match &decl.ret {
            Some(ty) => Some(self.declared_type(ty, None, false, decl.span)?),
            None => None,
        };
        let mut params = Vec::with_capacity(decl.params.len());
        for param in &decl.params {
            let value = self.declared_type(&param.ty, param.length, true, param.span)?;
            self.set(&param.name, value.clone())?;
            params.push(value);
        }

        let id = bound(&decl.name)?;
        let function = FunctionValue::user(
            decl.name.name.clone(),
            id,
            Overload::new(params, ret.clone()),
        );
        self.vars.set_value(id, Value::Function(Arc::new(function)));

        let has_return = ret.is_some();
        let outer = self.returns.replace(ret);
        self.check_block(&decl.body)?;
        self.returns = outer;

        if has_return {
            self.checker.check(decl)?;
        }
        Ok(())
    }

    fn check_struct(&mut self, decl: &shaderlink_ast::StructDecl) -> Result<()> {
        let mut fields = Vec::with_capacity(decl.members.len());
        for member in &decl.members {
            fields.push(StructField {
                name: member.name.clone(),
                value: self.declared_type(&member.ty, member.length, false, member.span)?,
                span: member.span,
            });
        }
        let id = bound(&decl.name)?;
        let layout = StructLayout::new(id, decl.name.name.clone(), fields)?;
        self.vars
            .set_value(id, Value::type_of(Value::Struct(Arc::new(layout))));
        Ok(())
    }

    /// Evaluate a write target, rejecting constant roots.
    fn assignable(&self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Var(ident) => {
                let id = bound(ident)?;
                if self.vars.get(id).constant {
                    return Err(TypeError::AssignToConst {
                        name: ident.name.clone(),
                        span: ident.span,
                    }
                    .into());
                }
                self.eval(expr)
            }
            Expr::Member(member) if member.package_member.is_none() => {
                self.assignable(&member.object)?;
                self.eval(expr)
            }
            Expr::Member(member) => {
                Err(NameError::PackageMemberAssignment { span: member.span }.into())
            }
            Expr::Index(index) => {
                self.assignable(&index.container)?;
                self.eval(expr)
            }
            Expr::Paren(inner, _) => self.assignable(inner),
            other => Err(TypeError::NotAssignable { span: other.span() }.into()),
        }
    }

    /// Check that `value` may be stored through `target`.
    fn check_store(&self, target: &Expr, value: &Value, span: Span) -> Result<()> {
        match target {
            Expr::Member(member) if member.package_member.is_none() => {
                let object = self.assignable(&member.object)?;
                Ok(object.set_member(&member.key, value, span)?)
            }
            Expr::Index(index) => {
                let container = self.assignable(&index.container)?;
                let position = ExprEvaluator::new(self.vars).constant_index(&index.index)?;
                Ok(container.set_index(position, value, span)?)
            }
            Expr::Paren(inner, _) => self.check_store(inner, value, span),
            _ => Ok(self.assignable(target)?.check(value, span)?),
        }
    }

    fn check_block(&mut self, statements: &[Stmt]) -> Result<()> {
        for stmt in statements {
            self.check_stmt(stmt)?;
        }
        Ok(())
    }

    fn check_condition(&self, cond: &Expr) -> Result<()> {
        let value = self.eval(cond)?;
        Ok(Value::BOOL.check(&value, cond.span())?)
    }

    fn check_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Version(_)
            | Stmt::Extension(_)
            | Stmt::Import(_)
            | Stmt::Reexport(_)
            | Stmt::Export(_)
            | Stmt::Helper(_) => Ok(()),
            Stmt::Precision(s) => {
                let value = self.declared_type(&s.ty, None, true, s.span)?;
                if (value.is_simple() && !value.is_bool()) || value.is_sampler() {
                    Ok(())
                } else {
                    Err(TypeError::ExpectedSimple {
                        ty: value.type_name(),
                        span: s.span,
                    }
                    .into())
                }
            }
            Stmt::Uniform(d) => {
                let value = self.declared_type(&d.ty, d.length, true, d.span)?;
                self.set(&d.name, value)
            }
            Stmt::Attribute(d) | Stmt::Varying(d) => self.check_interface(d, false),
            Stmt::Const(d) => self.check_const(d),
            Stmt::Var(d) => {
                let ty = self.declared_type(&d.ty, d.length, false, d.span)?;
                if let Some(init) = &d.init {
                    let value = self.eval(init)?;
                    ty.check(&value, init.span())?;
                }
                self.set(&d.name, ty)
            }
            Stmt::Struct(d) => self.check_struct(d),
            Stmt::Function(d) => self.check_function(d),
            Stmt::Assign(s) => {
                let value = self.eval(&s.value)?;
                match s.op.binary_op() {
                    Some(op) => {
                        let current = self.assignable(&s.target)?;
                        let result = ops::binary(op, &current, &value, s.span)?;
                        Ok(current.check(&result, s.span)?)
                    }
                    None => self.check_store(&s.target, &value, s.span),
                }
            }
            Stmt::If(s) => {
                for branch in &s.branches {
                    if let Some(cond) = &branch.cond {
                        self.check_condition(cond)?;
                    }
                    self.check_block(&branch.body)?;
                }
                Ok(())
            }
            Stmt::For(s) => {
                self.check_stmt(&s.init)?;
                self.check_condition(&s.cond)?;
                self.check_stmt(&s.step)?;
                self.check_block(&s.body)
            }
            Stmt::Return(s) => {
                let expected = self.returns.clone().flatten();
                let got = match &s.value {
                    Some(value) => Some(self.eval(value)?),
                    None => None,
                };
                let name = |value: &Option<Value>| {
                    value
                        .as_ref()
                        .map_or_else(|| "void".to_string(), Value::type_name)
                };
                let matches = match (&expected, &got) {
                    (Some(expected), Some(got)) => expected.check(got, s.span).is_ok(),
                    (None, None) => true,
                    _ => false,
                };
                if matches {
                    Ok(())
                } else {
                    Err(TypeError::ReturnMismatch {
                        expected: name(&expected),
                        got: name(&got),
                        span: s.span,
                    }
                    .into())
                }
            }
            Stmt::Call(call) => match ExprEvaluator::new(self.vars).eval_call(call)? {
                None => Ok(()),
                Some(_) => Err(TypeError::DiscardedValue { span: call.span }.into()),
            },
            Stmt::Update(s) => {
                let target = self.assignable(&s.target)?;
                Ok(ops::update(s.op, &target, s.span)?)
            }
            Stmt::SetIndex(s) => {
                let container = self.assignable(&s.container)?;
                let evaluator = ExprEvaluator::new(self.vars);
                evaluator.dynamic_index(&s.index)?;
                let value = evaluator.eval(&s.value)?;
                Ok(container.set_index(0, &value, s.span)?)
            }
        }
    }
}

/// Validate an entry point: `void main()`.
pub fn check_main(vars: &VarArena, main: VarId) -> Result<()> {
    let record = vars.get(main);
    let valid = record.decl == DeclKind::Function
        && matches!(
            record.value.as_ref().map(Value::unwrap_context),
            Some(Value::Function(function))
                if function.overloads.len() == 1
                    && function.overloads[0].params.is_empty()
                    && function.overloads[0].ret.is_none()
        );
    if valid {
        Ok(())
    } else {
        Err(TypeError::InvalidMain { span: record.span }.into())
    }
}

