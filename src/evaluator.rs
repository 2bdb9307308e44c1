use std::fmt;
use std::rc::Rc;

use log::{debug, trace};

use crate::ast::{Expr, ExprKind, InfixOp, PrefixOp, Program, Stmt, StmtKind};
use crate::environment::{AssignOutcome, Environment};
use crate::error::Error;
use crate::lexer::Position;

#[derive(Debug, Clone)]
pub enum Value {
    // Numeric values are f64 end to end, so very large results drift to
    // `inf` rather than wrap.
    Number(f64),
    Boolean(bool),
    Str(String),
    Function(FunctionValue),
    Null,
}

#[derive(Debug, Clone)]
pub struct FunctionValue {
    pub name: String,
    pub params: Vec<String>,
    pub body: Rc<Vec<Stmt>>,
    pub closure: Environment,
}

impl Value {
    /// Kind label used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Boolean(_) => "boolean",
            Value::Str(_) => "string",
            Value::Function(_) => "function",
            Value::Null => "null",
        }
    }
}

impl PartialEq for Value {
    // Values of different kinds are unequal rather than coerced, and
    // functions never compare equal to anything.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Null, Value::Null) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Str(s) => write!(f, "{}", s),
            Value::Function(func) => write!(f, "<kaam {}/{}>", func.name, func.params.len()),
            Value::Null => write!(f, "nalla"),
        }
    }
}

/// Hard ceilings on runaway programs. Exceeding any of them aborts the run
/// with a runtime error instead of hanging or exhausting memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// A `jabtak` loop may run its body at most this many times.
    pub max_loop_iterations: usize,
    /// Nested `kaam` calls may stack at most this deep.
    pub max_recursion_depth: usize,
    /// Concatenation may not build a string longer than this many bytes.
    pub max_string_length: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_loop_iterations: 100_000,
            max_recursion_depth: 64,
            max_string_length: 1_048_576,
        }
    }
}

/// Everything a finished run hands back: the lines `chaap` printed, in
/// order, and the value of the last top-level statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    pub outputs: Vec<String>,
    pub result: Value,
}

/// How a single statement finished. `Return`, `Break` and `Continue`
/// unwind through enclosing blocks until a function call or loop absorbs
/// them; reaching the top level is an error.
#[derive(Debug, Clone)]
enum EvalFlow {
    Value(Value),
    Return(Value),
    Break,
    Continue,
}

pub struct Evaluator {
    env: Environment,
    outputs: Vec<String>,
    call_depth: usize,
    limits: Limits,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::with_limits(Limits::default())
    }

    pub fn with_limits(limits: Limits) -> Self {
        Self {
            env: Environment::new(),
            outputs: Vec::new(),
            call_depth: 0,
            limits,
        }
    }

    /// Lines printed by `chaap` since the last call to this method.
    pub fn take_outputs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.outputs)
    }

    pub fn eval_program(&mut self, program: &Program) -> Result<Value, Error> {
        debug!(
            "evaluating {} top-level statement(s)",
            program.statements.len()
        );

        let mut last = Value::Null;

        for stmt in &program.statements {
            match self.eval_stmt(stmt)? {
                EvalFlow::Value(value) => last = value,
                EvalFlow::Return(_) => {
                    return Err(Error::runtime("'wapas' used outside of a function", stmt.pos));
                }
                EvalFlow::Break => {
                    return Err(Error::runtime("'bas_karo' used outside of a loop", stmt.pos));
                }
                EvalFlow::Continue => {
                    return Err(Error::runtime(
                        "'agla_dekho' used outside of a loop",
                        stmt.pos,
                    ));
                }
            }
        }

        Ok(last)
    }

    fn eval_stmt(&mut self, stmt: &Stmt) -> Result<EvalFlow, Error> {
        match &stmt.kind {
            StmtKind::Declare { name, value } => {
                let evaluated = self.eval_expr(value)?;
                // `rakho` updates the nearest existing binding; only an
                // unbound name creates a fresh one in the current scope.
                match self.env.assign(name, &evaluated) {
                    AssignOutcome::Assigned => {}
                    AssignOutcome::Constant => {
                        return Err(Error::runtime(
                            format!("cannot reassign constant '{name}'"),
                            stmt.pos,
                        ));
                    }
                    AssignOutcome::Undefined => self.env.define(name.clone(), evaluated.clone()),
                }
                Ok(EvalFlow::Value(evaluated))
            }
            StmtKind::DeclareConst { name, value } => {
                let evaluated = self.eval_expr(value)?;
                if self.env.constant_in_current_scope(name) {
                    return Err(Error::runtime(
                        format!("cannot reassign constant '{name}'"),
                        stmt.pos,
                    ));
                }
                self.env.define_constant(name.clone(), evaluated.clone());
                Ok(EvalFlow::Value(evaluated))
            }
            StmtKind::Assign { name, value } => {
                let evaluated = self.eval_expr(value)?;
                match self.env.assign(name, &evaluated) {
                    AssignOutcome::Assigned => Ok(EvalFlow::Value(evaluated)),
                    AssignOutcome::Constant => Err(Error::runtime(
                        format!("cannot reassign constant '{name}'"),
                        stmt.pos,
                    )),
                    AssignOutcome::Undefined => Err(self.unknown_variable(name, stmt.pos)),
                }
            }
            StmtKind::Print { value } => {
                let evaluated = self.eval_expr(value)?;
                self.outputs.push(evaluated.to_string());
                Ok(EvalFlow::Value(evaluated))
            }
            StmtKind::Expr(expr) => Ok(EvalFlow::Value(self.eval_expr(expr)?)),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let condition = self.eval_expr(condition)?;
                if is_truthy(&condition) {
                    self.eval_block_scoped(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.eval_block_scoped(else_branch)
                } else {
                    Ok(EvalFlow::Value(Value::Null))
                }
            }
            StmtKind::While { condition, body } => self.eval_while(condition, body, stmt.pos),
            StmtKind::FunctionDef { name, params, body } => {
                let function = Value::Function(FunctionValue {
                    name: name.clone(),
                    params: params.clone(),
                    body: Rc::clone(body),
                    closure: self.env.clone(),
                });
                self.env.define(name.clone(), function.clone());
                Ok(EvalFlow::Value(function))
            }
            StmtKind::Return(value) => {
                let value = match value {
                    Some(value) => self.eval_expr(value)?,
                    None => Value::Null,
                };
                Ok(EvalFlow::Return(value))
            }
            StmtKind::Break => Ok(EvalFlow::Break),
            StmtKind::Continue => Ok(EvalFlow::Continue),
        }
    }

    fn eval_while(&mut self, condition: &Expr, body: &[Stmt], pos: Position) -> Result<EvalFlow, Error> {
        let mut iterations = 0usize;
        let mut last = Value::Null;

        loop {
            let condition_value = self.eval_expr(condition)?;
            if !is_truthy(&condition_value) {
                break;
            }

            iterations += 1;
            if iterations > self.limits.max_loop_iterations {
                return Err(Error::runtime(
                    format!(
                        "'jabtak' loop exceeded the iteration limit ({})",
                        self.limits.max_loop_iterations
                    ),
                    pos,
                ));
            }

            match self.eval_block_scoped(body)? {
                EvalFlow::Value(value) => last = value,
                EvalFlow::Return(value) => return Ok(EvalFlow::Return(value)),
                EvalFlow::Break => break,
                EvalFlow::Continue => continue,
            }
        }

        Ok(EvalFlow::Value(last))
    }

    fn eval_block(&mut self, block: &[Stmt]) -> Result<EvalFlow, Error> {
        let mut last = Value::Null;

        for stmt in block {
            match self.eval_stmt(stmt)? {
                EvalFlow::Value(value) => last = value,
                flow => return Ok(flow),
            }
        }

        Ok(EvalFlow::Value(last))
    }

    // Runs the block in a fresh child scope and restores the outer scope
    // afterwards, whether the block finished or unwound.
    fn eval_block_scoped(&mut self, block: &[Stmt]) -> Result<EvalFlow, Error> {
        let parent = self.env.clone();
        self.env = Environment::new_enclosed(parent.clone());
        let result = self.eval_block(block);
        self.env = parent;
        result
    }

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value, Error> {
        match &expr.kind {
            ExprKind::Identifier(name) => match self.env.get(name) {
                Some(value) => Ok(value),
                None => Err(self.unknown_variable(name, expr.pos)),
            },
            ExprKind::Number(value) => Ok(Value::Number(*value)),
            ExprKind::Str(value) => Ok(Value::Str(value.clone())),
            ExprKind::Boolean(value) => Ok(Value::Boolean(*value)),
            ExprKind::Null => Ok(Value::Null),
            ExprKind::Call { callee, args } => {
                let callee_value = self.eval_expr(callee)?;
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval_expr(arg)?);
                }
                self.eval_call(callee_value, values, expr.pos)
            }
            ExprKind::Prefix { op, rhs } => {
                let rhs = self.eval_expr(rhs)?;
                self.eval_prefix(*op, rhs, expr.pos)
            }
            ExprKind::Infix { lhs, op, rhs } => {
                // Logical operators short-circuit: the right side only
                // runs when the left side has not decided the answer.
                if matches!(op, InfixOp::And) {
                    let lhs = self.eval_expr(lhs)?;
                    if !is_truthy(&lhs) {
                        return Ok(Value::Boolean(false));
                    }
                    let rhs = self.eval_expr(rhs)?;
                    return Ok(Value::Boolean(is_truthy(&rhs)));
                }

                if matches!(op, InfixOp::Or) {
                    let lhs = self.eval_expr(lhs)?;
                    if is_truthy(&lhs) {
                        return Ok(Value::Boolean(true));
                    }
                    let rhs = self.eval_expr(rhs)?;
                    return Ok(Value::Boolean(is_truthy(&rhs)));
                }

                let lhs = self.eval_expr(lhs)?;
                let rhs = self.eval_expr(rhs)?;
                self.eval_infix(lhs, *op, rhs, expr.pos)
            }
        }
    }

    fn eval_call(&mut self, callee: Value, args: Vec<Value>, pos: Position) -> Result<Value, Error> {
        match callee {
            Value::Function(function) => {
                if function.params.len() != args.len() {
                    return Err(Error::runtime(
                        format!(
                            "'{}' expected {} argument(s), got {}",
                            function.name,
                            function.params.len(),
                            args.len()
                        ),
                        pos,
                    ));
                }

                if self.call_depth >= self.limits.max_recursion_depth {
                    return Err(Error::runtime(
                        format!(
                            "recursion depth exceeded the limit ({})",
                            self.limits.max_recursion_depth
                        ),
                        pos,
                    ));
                }

                trace!("calling '{}' at depth {}", function.name, self.call_depth);

                // The call scope encloses the closure scope, not the
                // caller's, so captured variables keep resolving after
                // the defining scope has exited.
                self.call_depth += 1;
                let outer_env = self.env.clone();
                self.env = Environment::new_enclosed(function.closure.clone());

                for (param, arg) in function.params.iter().zip(args) {
                    self.env.define(param.clone(), arg);
                }

                let result = self.eval_block(&function.body);
                self.env = outer_env;
                self.call_depth -= 1;

                match result? {
                    EvalFlow::Return(value) => Ok(value),
                    // No `wapas` means the call produces nalla.
                    EvalFlow::Value(_) => Ok(Value::Null),
                    EvalFlow::Break => {
                        Err(Error::runtime("'bas_karo' used outside of a loop", pos))
                    }
                    EvalFlow::Continue => {
                        Err(Error::runtime("'agla_dekho' used outside of a loop", pos))
                    }
                }
            }
            other => Err(Error::type_mismatch(
                format!("cannot call a {} value", other.kind_name()),
                pos,
            )),
        }
    }

    fn eval_prefix(&self, op: PrefixOp, rhs: Value, pos: Position) -> Result<Value, Error> {
        match op {
            PrefixOp::Not => Ok(Value::Boolean(!is_truthy(&rhs))),
            PrefixOp::Negate => match rhs {
                Value::Number(n) => Ok(Value::Number(-n)),
                other => Err(Error::type_mismatch(
                    format!("cannot negate a {} value", other.kind_name()),
                    pos,
                )),
            },
        }
    }

    fn eval_infix(&self, lhs: Value, op: InfixOp, rhs: Value, pos: Position) -> Result<Value, Error> {
        match op {
            // Reached when a logical operand was already evaluated
            // eagerly, e.g. through a parenthesized subexpression.
            InfixOp::And => Ok(Value::Boolean(is_truthy(&lhs) && is_truthy(&rhs))),
            InfixOp::Or => Ok(Value::Boolean(is_truthy(&lhs) || is_truthy(&rhs))),
            InfixOp::Add => match (lhs, rhs) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::Str(a), Value::Str(b)) => self.concat_strings(a, b, pos),
                (a, b) => Err(Error::type_mismatch(
                    format!(
                        "'+' expects two numbers or two strings, got {} and {}",
                        a.kind_name(),
                        b.kind_name()
                    ),
                    pos,
                )),
            },
            InfixOp::Subtract => numbers(lhs, rhs, pos, "-", |a, b| Value::Number(a - b)),
            InfixOp::Multiply => numbers(lhs, rhs, pos, "*", |a, b| Value::Number(a * b)),
            InfixOp::Divide => match (&lhs, &rhs) {
                (Value::Number(_), Value::Number(b)) if *b == 0.0 => {
                    Err(Error::runtime("division by zero", pos))
                }
                _ => numbers(lhs, rhs, pos, "/", |a, b| Value::Number(a / b)),
            },
            InfixOp::Eq => Ok(Value::Boolean(lhs == rhs)),
            InfixOp::NotEq => Ok(Value::Boolean(lhs != rhs)),
            InfixOp::Lt => numbers(lhs, rhs, pos, "<", |a, b| Value::Boolean(a < b)),
            InfixOp::Gt => numbers(lhs, rhs, pos, ">", |a, b| Value::Boolean(a > b)),
            InfixOp::LtEq => numbers(lhs, rhs, pos, "<=", |a, b| Value::Boolean(a <= b)),
            InfixOp::GtEq => numbers(lhs, rhs, pos, ">=", |a, b| Value::Boolean(a >= b)),
        }
    }

    fn concat_strings(&self, a: String, b: String, pos: Position) -> Result<Value, Error> {
        if a.len() + b.len() > self.limits.max_string_length {
            return Err(Error::runtime(
                format!(
                    "string length exceeded the limit ({} bytes)",
                    self.limits.max_string_length
                ),
                pos,
            ));
        }
        Ok(Value::Str(format!("{}{}", a, b)))
    }

    fn unknown_variable(&self, name: &str, pos: Position) -> Error {
        let mut message = format!("unknown variable '{name}'");
        if let Some(suggestion) = closest_name(name, &self.env.visible_names()) {
            message.push_str(&format!(" (did you mean '{suggestion}'?)"));
        }
        Error::reference(message, pos)
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

fn numbers(
    lhs: Value,
    rhs: Value,
    pos: Position,
    operator: &'static str,
    op: impl FnOnce(f64, f64) -> Value,
) -> Result<Value, Error> {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => Ok(op(a, b)),
        (a, b) => Err(Error::type_mismatch(
            format!(
                "'{}' expects two numbers, got {} and {}",
                operator,
                a.kind_name(),
                b.kind_name()
            ),
            pos,
        )),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Boolean(b) => *b,
        Value::Number(n) => *n != 0.0,
        Value::Str(s) => !s.is_empty(),
        Value::Function(_) => true,
        Value::Null => false,
    }
}

fn closest_name(target: &str, candidates: &[String]) -> Option<String> {
    let threshold = (target.chars().count() / 3).max(2);

    candidates
        .iter()
        .map(|candidate| (edit_distance(target, candidate), candidate))
        .filter(|(distance, _)| *distance <= threshold)
        .min_by_key(|(distance, candidate)| (*distance, candidate.clone()))
        .map(|(_, candidate)| candidate.clone())
}

fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution_cost = usize::from(ca != cb);
            current[j + 1] = (previous[j] + substitution_cost)
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        previous.copy_from_slice(&current);
    }

    previous[b.len()]
}
