//! Test evaluator for module system integration tests
//!
//! Interprets the small slice of script the loader tests need: the implicit
//! dialect as written by hand or produced by the declarative rewrite.
//! Supported statements are `const`/`let`/`var` (plain or `{ a, b: c }`
//! destructuring), function declarations, `return`, `throw` and expression
//! statements. Expressions cover literals, object literals, member access,
//! calls, assignment, `+` and `??`.

#![allow(dead_code)]

use parking_lot::Mutex;
use spacey_modules::lexer::{tokenize, Token, TokenKind};
use spacey_modules::module_system::{IMPORT_ASYNC, LOAD};
use spacey_modules::{
    GlobalNamespace, ModuleScope, NativeFunction, ObjectRef, ScriptError, ScriptEvaluator, Value,
};
use std::collections::HashMap;
use std::sync::Arc;

type EvalResult<T> = Result<T, ScriptError>;

/// Evaluator that records every `(path, source)` pair it is asked to run.
///
/// Clones share the record, so a test can keep one after handing the
/// evaluator to a module system.
#[derive(Clone, Default)]
pub struct MiniEvaluator {
    seen: Arc<Mutex<Vec<(String, String)>>>,
}

impl MiniEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything evaluated so far, in order
    pub fn seen(&self) -> Vec<(String, String)> {
        self.seen.lock().clone()
    }

    /// Sources evaluated for `path`
    pub fn sources_for(&self, path: &str) -> Vec<String> {
        self.seen
            .lock()
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, source)| source.clone())
            .collect()
    }
}

impl ScriptEvaluator for MiniEvaluator {
    fn evaluate(&self, source: &str, scope: &ModuleScope<'_>) -> EvalResult<Value> {
        self.seen
            .lock()
            .push((scope.filename().to_string(), source.to_string()));

        let program = Parser::new(source).program()?;

        let env = Env::default();
        for name in ModuleScope::parameter_names() {
            if let Some(value) = scope.binding(name) {
                env.declare(name, value);
            }
        }

        let interpreter = Interpreter {
            scope: Some(scope),
            globals: scope.globals().clone(),
        };
        interpreter.exec_block(&program, &env)?;
        Ok(Value::Undefined)
    }
}

// ---------------------------------------------------------------------------
// Syntax
// ---------------------------------------------------------------------------

enum Stmt {
    Declare(Pattern, Expr),
    Function(Arc<FunctionDef>),
    Return(Option<Expr>),
    Throw(Expr),
    Expression(Expr),
    Empty,
}

enum Pattern {
    Name(String),
    /// `{ key: local, ... }`
    Object(Vec<(String, String)>),
}

enum Expr {
    Literal(Value),
    Ident(String),
    Member(Box<Expr>, String),
    Call(Box<Expr>, Vec<Expr>),
    Assign(Box<Expr>, Box<Expr>),
    Nullish(Box<Expr>, Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Object(Vec<(String, Expr)>),
    Function(Arc<FunctionDef>),
}

struct FunctionDef {
    name: Option<String>,
    params: Vec<String>,
    body: Vec<Stmt>,
}

struct Parser<'s> {
    source: &'s str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'s> Parser<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            tokens: tokenize(source),
            pos: 0,
        }
    }

    fn program(mut self) -> EvalResult<Vec<Stmt>> {
        let mut body = Vec::new();
        while self.pos < self.tokens.len() {
            body.push(self.statement()?);
        }
        Ok(body)
    }

    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> EvalResult<()> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn unexpected(&self) -> ScriptError {
        match self.tokens.get(self.pos) {
            Some(token) => {
                ScriptError::syntax(format!("Unexpected token '{}'", token.text(self.source)))
            }
            None => ScriptError::syntax("Unexpected end of input"),
        }
    }

    /// Any word, keywords included (property names)
    fn name(&mut self) -> EvalResult<String> {
        match self.tokens.get(self.pos) {
            Some(token) if token.kind.is_name() => {
                let name = token.text(self.source).to_string();
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn identifier(&mut self) -> EvalResult<String> {
        match self.peek() {
            Some(TokenKind::Identifier(name)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn block(&mut self) -> EvalResult<Vec<Stmt>> {
        self.expect(&TokenKind::LeftBrace)?;
        let mut body = Vec::new();
        while !self.eat(&TokenKind::RightBrace) {
            if self.pos >= self.tokens.len() {
                return Err(self.unexpected());
            }
            body.push(self.statement()?);
        }
        Ok(body)
    }

    fn statement(&mut self) -> EvalResult<Stmt> {
        let stmt = match self.peek() {
            Some(TokenKind::Const | TokenKind::Let | TokenKind::Var) => {
                self.pos += 1;
                let pattern = self.pattern()?;
                self.expect(&TokenKind::Equal)?;
                Stmt::Declare(pattern, self.expression()?)
            }
            Some(TokenKind::Function) => {
                self.pos += 1;
                let def = self.function_rest()?;
                if def.name.is_none() {
                    return Err(ScriptError::syntax("Function statements require a name"));
                }
                return Ok(Stmt::Function(def));
            }
            Some(TokenKind::Return) => {
                self.pos += 1;
                match self.peek() {
                    None | Some(TokenKind::Semicolon | TokenKind::RightBrace) => Stmt::Return(None),
                    _ => Stmt::Return(Some(self.expression()?)),
                }
            }
            Some(TokenKind::Throw) => {
                self.pos += 1;
                Stmt::Throw(self.expression()?)
            }
            Some(TokenKind::Semicolon) => {
                self.pos += 1;
                return Ok(Stmt::Empty);
            }
            _ => Stmt::Expression(self.expression()?),
        };
        self.eat(&TokenKind::Semicolon);
        Ok(stmt)
    }

    fn pattern(&mut self) -> EvalResult<Pattern> {
        if !self.eat(&TokenKind::LeftBrace) {
            return Ok(Pattern::Name(self.identifier()?));
        }

        let mut entries = Vec::new();
        loop {
            if self.eat(&TokenKind::RightBrace) {
                break;
            }
            let key = self.name()?;
            let local = if self.eat(&TokenKind::Colon) {
                self.identifier()?
            } else {
                key.clone()
            };
            entries.push((key, local));
            if !self.eat(&TokenKind::Comma) {
                self.expect(&TokenKind::RightBrace)?;
                break;
            }
        }
        Ok(Pattern::Object(entries))
    }

    /// Everything after the `function` keyword
    fn function_rest(&mut self) -> EvalResult<Arc<FunctionDef>> {
        let name = match self.peek() {
            Some(TokenKind::Identifier(_)) => Some(self.identifier()?),
            _ => None,
        };

        self.expect(&TokenKind::LeftParen)?;
        let mut params = Vec::new();
        while !self.eat(&TokenKind::RightParen) {
            params.push(self.identifier()?);
            if !self.eat(&TokenKind::Comma) {
                self.expect(&TokenKind::RightParen)?;
                break;
            }
        }

        let body = self.block()?;
        Ok(Arc::new(FunctionDef { name, params, body }))
    }

    fn expression(&mut self) -> EvalResult<Expr> {
        let target = self.nullish()?;
        if !self.eat(&TokenKind::Equal) {
            return Ok(target);
        }
        if !matches!(target, Expr::Ident(_) | Expr::Member(..)) {
            return Err(ScriptError::syntax("Invalid left-hand side in assignment"));
        }
        let value = self.expression()?;
        Ok(Expr::Assign(Box::new(target), Box::new(value)))
    }

    fn nullish(&mut self) -> EvalResult<Expr> {
        let mut left = self.additive()?;
        while self.eat(&TokenKind::QuestionQuestion) {
            let right = self.additive()?;
            left = Expr::Nullish(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn additive(&mut self) -> EvalResult<Expr> {
        let mut left = self.postfix()?;
        while self.eat(&TokenKind::Plus) {
            let right = self.postfix()?;
            left = Expr::Add(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn postfix(&mut self) -> EvalResult<Expr> {
        let mut expr = self.primary()?;
        loop {
            if self.eat(&TokenKind::Dot) {
                expr = Expr::Member(Box::new(expr), self.name()?);
            } else if self.eat(&TokenKind::LeftParen) {
                let mut args = Vec::new();
                while !self.eat(&TokenKind::RightParen) {
                    args.push(self.expression()?);
                    if !self.eat(&TokenKind::Comma) {
                        self.expect(&TokenKind::RightParen)?;
                        break;
                    }
                }
                expr = Expr::Call(Box::new(expr), args);
            } else {
                return Ok(expr);
            }
        }
    }

    fn primary(&mut self) -> EvalResult<Expr> {
        let Some(token) = self.tokens.get(self.pos).cloned() else {
            return Err(self.unexpected());
        };
        self.pos += 1;

        let expr = match token.kind {
            TokenKind::Number(n) => Expr::Literal(Value::Number(n)),
            TokenKind::String(s) | TokenKind::Template(s) => Expr::Literal(Value::String(s)),
            TokenKind::True => Expr::Literal(Value::Boolean(true)),
            TokenKind::False => Expr::Literal(Value::Boolean(false)),
            TokenKind::Null => Expr::Literal(Value::Null),
            TokenKind::Identifier(name) => Expr::Ident(name),
            TokenKind::Function => Expr::Function(self.function_rest()?),
            TokenKind::LeftParen => {
                let inner = self.expression()?;
                self.expect(&TokenKind::RightParen)?;
                inner
            }
            TokenKind::LeftBrace => self.object_literal()?,
            _ => {
                return Err(ScriptError::syntax(format!(
                    "Unexpected token '{}'",
                    token.text(self.source)
                )));
            }
        };
        Ok(expr)
    }

    /// Everything after the opening brace
    fn object_literal(&mut self) -> EvalResult<Expr> {
        let mut props = Vec::new();
        loop {
            if self.eat(&TokenKind::RightBrace) {
                break;
            }
            let key = match self.peek() {
                Some(TokenKind::String(key)) => {
                    let key = key.clone();
                    self.pos += 1;
                    key
                }
                _ => self.name()?,
            };
            let value = if self.eat(&TokenKind::Colon) {
                self.expression()?
            } else {
                Expr::Ident(key.clone())
            };
            props.push((key, value));
            if !self.eat(&TokenKind::Comma) {
                self.expect(&TokenKind::RightBrace)?;
                break;
            }
        }
        Ok(Expr::Object(props))
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
struct Env(Arc<Frame>);

#[derive(Default)]
struct Frame {
    vars: Mutex<HashMap<String, Value>>,
    parent: Option<Env>,
}

impl Env {
    fn child(&self) -> Env {
        Env(Arc::new(Frame {
            vars: Mutex::new(HashMap::new()),
            parent: Some(self.clone()),
        }))
    }

    fn declare(&self, name: &str, value: Value) {
        self.0.vars.lock().insert(name.to_string(), value);
    }

    fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.0.vars.lock().get(name) {
            return Some(value.clone());
        }
        self.0.parent.as_ref().and_then(|parent| parent.lookup(name))
    }

    fn assign(&self, name: &str, value: Value) -> bool {
        {
            let mut vars = self.0.vars.lock();
            if let Some(slot) = vars.get_mut(name) {
                *slot = value;
                return true;
            }
        }
        match &self.0.parent {
            Some(parent) => parent.assign(name, value),
            None => false,
        }
    }
}

struct Interpreter<'a> {
    /// Absent inside functions called after their module finished
    scope: Option<&'a ModuleScope<'a>>,
    globals: GlobalNamespace,
}

impl Interpreter<'_> {
    /// Runs statements; `Some` carries a `return` value
    fn exec_block(&self, body: &[Stmt], env: &Env) -> EvalResult<Option<Value>> {
        for stmt in body {
            if let Some(value) = self.exec(stmt, env)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    fn exec(&self, stmt: &Stmt, env: &Env) -> EvalResult<Option<Value>> {
        match stmt {
            Stmt::Declare(pattern, init) => {
                let value = self.eval(init, env)?;
                bind(pattern, value, env)?;
            }
            Stmt::Function(def) => {
                if let Some(name) = &def.name {
                    env.declare(name, self.function(def, env));
                }
            }
            Stmt::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval(expr, env)?,
                    None => Value::Undefined,
                };
                return Ok(Some(value));
            }
            Stmt::Throw(expr) => {
                let value = self.eval(expr, env)?;
                return Err(ScriptError::Thrown(value.to_string()));
            }
            Stmt::Expression(expr) => {
                self.eval(expr, env)?;
            }
            Stmt::Empty => {}
        }
        Ok(None)
    }

    fn eval(&self, expr: &Expr, env: &Env) -> EvalResult<Value> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Ident(name) => self.lookup(name, env),
            Expr::Member(object, property) => get_property(&self.eval(object, env)?, property),
            Expr::Call(callee, args) => {
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg, env))
                    .collect::<EvalResult<Vec<_>>>()?;

                if let Expr::Ident(name) = callee.as_ref() {
                    if env.lookup(name).is_none() {
                        if let Some(exports) = self.call_loader(name, &args)? {
                            return Ok(exports);
                        }
                    }
                }

                self.eval(callee, env)?.call(&args)
            }
            Expr::Assign(target, value) => {
                let value = self.eval(value, env)?;
                match target.as_ref() {
                    Expr::Ident(name) => {
                        if !env.assign(name, value.clone()) {
                            return Err(ScriptError::reference(format!("{} is not defined", name)));
                        }
                    }
                    Expr::Member(object, property) => match self.eval(object, env)? {
                        Value::Object(object) => object.set(property.clone(), value.clone()),
                        other => {
                            return Err(ScriptError::type_error(format!(
                                "Cannot set properties of {} (setting '{}')",
                                other, property
                            )));
                        }
                    },
                    _ => return Err(ScriptError::syntax("Invalid left-hand side in assignment")),
                }
                Ok(value)
            }
            Expr::Nullish(left, right) => {
                let value = self.eval(left, env)?;
                if value.is_nullish() {
                    self.eval(right, env)
                } else {
                    Ok(value)
                }
            }
            Expr::Add(left, right) => {
                let left = self.eval(left, env)?;
                let right = self.eval(right, env)?;
                match (&left, &right) {
                    (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                    _ => Ok(Value::String(format!("{}{}", left, right))),
                }
            }
            Expr::Object(props) => {
                let object = ObjectRef::new();
                for (key, value) in props {
                    object.set(key.clone(), self.eval(value, env)?);
                }
                Ok(Value::Object(object))
            }
            Expr::Function(def) => Ok(self.function(def, env)),
        }
    }

    fn lookup(&self, name: &str, env: &Env) -> EvalResult<Value> {
        env.lookup(name)
            .or_else(|| self.globals.get(name))
            .or_else(|| (name == "undefined").then_some(Value::Undefined))
            .ok_or_else(|| ScriptError::reference(format!("{} is not defined", name)))
    }

    /// `load(spec)` / `importAsync(spec)`; `None` for any other callee
    fn call_loader(&self, name: &str, args: &[Value]) -> EvalResult<Option<Value>> {
        if name != LOAD && name != IMPORT_ASYNC {
            return Ok(None);
        }
        let scope = self
            .scope
            .ok_or_else(|| ScriptError::reference(format!("{} is not defined", name)))?;
        let Some(Value::String(specifier)) = args.first() else {
            return Err(ScriptError::type_error("module specifier must be a string"));
        };

        let exports = if name == LOAD {
            scope.load(specifier)?
        } else {
            scope.import_async(specifier).into_inner()?
        };
        Ok(Some(Value::Object(exports)))
    }

    fn function(&self, def: &Arc<FunctionDef>, env: &Env) -> Value {
        let name = def.name.clone();
        let def = def.clone();
        let env = env.clone();
        let globals = self.globals.clone();

        Value::Function(Arc::new(NativeFunction::new(name, move |args| {
            let locals = env.child();
            for (i, param) in def.params.iter().enumerate() {
                locals.declare(param, args.get(i).cloned().unwrap_or_default());
            }
            let interpreter = Interpreter {
                scope: None,
                globals: globals.clone(),
            };
            Ok(interpreter.exec_block(&def.body, &locals)?.unwrap_or_default())
        })))
    }
}

fn bind(pattern: &Pattern, value: Value, env: &Env) -> EvalResult<()> {
    match pattern {
        Pattern::Name(name) => env.declare(name, value),
        Pattern::Object(entries) => {
            let Some(object) = value.as_object() else {
                return Err(ScriptError::type_error(format!("Cannot destructure '{}'", value)));
            };
            for (key, local) in entries {
                env.declare(local, object.get(key).unwrap_or_default());
            }
        }
    }
    Ok(())
}

fn get_property(object: &Value, property: &str) -> EvalResult<Value> {
    match object {
        Value::Object(object) => Ok(object.get(property).unwrap_or_default()),
        Value::Undefined | Value::Null => Err(ScriptError::type_error(format!(
            "Cannot read properties of {} (reading '{}')",
            object, property
        ))),
        Value::Function(function) if property == "name" => {
            Ok(Value::from(function.name().unwrap_or_default()))
        }
        _ => Ok(Value::Undefined),
    }
}
