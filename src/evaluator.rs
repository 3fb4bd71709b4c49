//! An AST evaluator for the Monkey programming language.

use crate::ast;
use crate::object::{self, Builtin, Environment, Hashable, Object};
use crate::token::Token;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::error;
use std::fmt;
use std::rc::Rc;
use std::result;

// An environment handle shared between frames and the function values that
// captured it.
type Env = Rc<RefCell<Environment>>;

// The outcome of evaluating a single node: either a plain value, or a value
// unwinding out of a `return` statement. `Return` propagates through
// enclosing blocks until a function call or the program unwraps it, so it
// never appears in an `Object`.
enum Flow {
    Value(Object),
    Return(Object),
}

// Unwraps a `Flow::Value`, or propagates a `Flow::Return` to the caller of
// the enclosing evaluation function.
macro_rules! value_of {
    ($flow:expr) => {
        match $flow {
            Flow::Value(value) => value,
            flow @ Flow::Return(_) => return Ok(flow),
        }
    };
}

/// Evaluates an `ast::Program` within `env` and produces the value of its
/// final statement, or `Null` for an empty program.
///
/// A `return` reaching the top level terminates evaluation with the
/// returned value.
pub fn eval(prog: &ast::Program, env: &Env) -> Result<Object> {
    let mut value = Object::Null;

    for stmt in &prog.statements {
        match eval_statement(stmt, env)? {
            // Handle early return statements if applicable, unwrapping the
            // inner value and terminating the program.
            Flow::Return(v) => return Ok(v),
            Flow::Value(v) => value = v,
        }
    }

    Ok(value)
}

fn eval_statement(stmt: &ast::Statement, env: &Env) -> Result<Flow> {
    match stmt {
        ast::Statement::Expression(expr) => eval_expression(expr, env),
        ast::Statement::Let(stmt) => {
            let value = value_of!(eval_expression(&stmt.value, env)?);

            // eval succeeded; capture this binding in our environment.
            env.borrow_mut().set(stmt.name.value.clone(), value);
            Ok(Flow::Value(Object::Null))
        }
        ast::Statement::Return(stmt) => {
            let value = value_of!(eval_expression(&stmt.value, env)?);
            Ok(Flow::Return(value))
        }
        ast::Statement::Block(block) => eval_block(block, env),
    }
}

// Evaluates a block's statements in order. Unlike a program, a block does
// not unwrap a returning value: the signal keeps propagating so that the
// enclosing function call or program unwinds.
fn eval_block(block: &ast::BlockStatement, env: &Env) -> Result<Flow> {
    let mut value = Object::Null;

    for stmt in &block.statements {
        match eval_statement(stmt, env)? {
            flow @ Flow::Return(_) => return Ok(flow),
            Flow::Value(v) => value = v,
        }
    }

    Ok(Flow::Value(value))
}

fn eval_expression(expr: &ast::Expression, env: &Env) -> Result<Flow> {
    match expr {
        ast::Expression::Integer(int) => Ok(Flow::Value(Object::Integer(int.value))),
        ast::Expression::Boolean(b) => Ok(Flow::Value(Object::Boolean(b.value))),
        ast::Expression::String(s) => Ok(Flow::Value(Object::String(s.value.clone()))),

        ast::Expression::Identifier(id) => eval_identifier(id, env).map(Flow::Value),

        ast::Expression::Array(a) => {
            let mut items = Vec::with_capacity(a.items.len());
            for item in &a.items {
                items.push(value_of!(eval_expression(item, env)?));
            }

            Ok(Flow::Value(Object::Array(object::Array { items })))
        }

        ast::Expression::Map(m) => {
            let mut pairs = BTreeMap::new();
            for (key, value) in &m.pairs {
                let key = value_of!(eval_expression(key, env)?);
                let key = Hashable::from_object(&key).map_err(Error::Object)?;
                let value = value_of!(eval_expression(value, env)?);

                // Entries evaluate in source order, so a duplicate key
                // overwrites the earlier pair: last write wins.
                pairs.insert(key, value);
            }

            Ok(Flow::Value(Object::Map(object::Map { pairs })))
        }

        ast::Expression::Prefix(p) => {
            let right = value_of!(eval_expression(&p.right, env)?);
            let value = object::unary(p.operator, &right).map_err(Error::Object)?;
            Ok(Flow::Value(value))
        }

        ast::Expression::Infix(i) => {
            let left = value_of!(eval_expression(&i.left, env)?);
            let right = value_of!(eval_expression(&i.right, env)?);

            let value = match i.operator {
                Token::Equal
                | Token::NotEqual
                | Token::LessThan
                | Token::LessEqual
                | Token::GreaterThan
                | Token::GreaterEqual => {
                    object::compare(i.operator, &left, &right).map_err(Error::Object)?
                }
                _ => object::binary(i.operator, &left, &right).map_err(Error::Object)?,
            };

            Ok(Flow::Value(value))
        }

        ast::Expression::If(expr) => {
            let condition = value_of!(eval_expression(&expr.condition, env)?);

            if condition.truth() {
                eval_block(&expr.consequence, env)
            } else if let Some(alt) = &expr.alternative {
                eval_block(alt, env)
            } else {
                Ok(Flow::Value(Object::Null))
            }
        }

        ast::Expression::Function(func) => {
            let parameters = func.parameters.iter().map(|p| p.value.clone()).collect();

            Ok(Flow::Value(Object::Function(object::Function {
                parameters,
                body: func.body.clone(),
                env: Rc::clone(env),
            })))
        }

        ast::Expression::Call(call) => {
            let function = value_of!(eval_expression(&call.function, env)?);

            let mut args = Vec::with_capacity(call.arguments.len());
            for arg in &call.arguments {
                args.push(value_of!(eval_expression(arg, env)?));
            }

            match function {
                Object::Function(func) => apply_function(&func, args).map(Flow::Value),
                // Built-ins use their own execution logic.
                Object::Builtin(b) => b
                    .apply(&args)
                    .map(Flow::Value)
                    .map_err(Error::Object),
                other => Err(Error::NotCallable(other.type_name())),
            }
        }

        ast::Expression::Index(expr) => {
            let left = value_of!(eval_expression(&expr.left, env)?);
            let index = value_of!(eval_expression(&expr.index, env)?);

            eval_index(&left, &index).map(Flow::Value)
        }
    }
}

// Resolves an identifier in the environment chain, falling back to the
// built-in table only when the chain has no binding.
fn eval_identifier(id: &ast::Identifier, env: &Env) -> Result<Object> {
    if let Some(obj) = env.borrow().get(&id.value) {
        return Ok(obj);
    }

    match Builtin::lookup(&id.value) {
        Some(b) => Ok(Object::Builtin(b)),
        None => Err(Error::IdentifierNotFound(id.value.clone())),
    }
}

// Applies a user-defined function: binds arguments in a fresh frame whose
// outer environment is the function's captured environment, not the
// caller's, then evaluates the body and unwraps any returning value.
fn apply_function(func: &object::Function, args: Vec<Object>) -> Result<Object> {
    if func.parameters.len() != args.len() {
        return Err(Error::WrongNumberOfArguments {
            want: func.parameters.len(),
            got: args.len(),
        });
    }

    let frame = Environment::new_enclosed(&func.env);
    for (param, arg) in func.parameters.iter().zip(args) {
        frame.borrow_mut().set(param.clone(), arg);
    }

    match eval_block(&func.body, &frame)? {
        // If the function had an early return, stop evaluation and produce
        // the returned value.
        Flow::Return(value) => Ok(value),
        Flow::Value(value) => Ok(value),
    }
}

// Evaluates an index expression for maps, arrays, and strings.
fn eval_index(left: &Object, index: &Object) -> Result<Object> {
    match left {
        // A missing map key yields Null; an unhashable key is an error.
        Object::Map(m) => m.get(index).map_err(Error::Object),

        Object::Array(a) => {
            let i = sequence_index(index, a.items.len())?;
            Ok(a.items[i].clone())
        }

        // Indexing a string produces a single-character string.
        Object::String(s) => {
            let i = sequence_index(index, s.chars().count())?;
            let c = s.chars().nth(i).unwrap_or_default();
            Ok(Object::String(c.to_string()))
        }

        other => Err(Error::IndexNotSupported(other.type_name())),
    }
}

// Checks an array or string index: it must be an integer, negative indices
// count from the end, and the result must be in bounds.
fn sequence_index(index: &Object, length: usize) -> Result<usize> {
    let Object::Integer(i) = index else {
        return Err(Error::InvalidIndexType(index.type_name()));
    };

    let converted = if *i < 0 { i + length as i64 } else { *i };
    if converted < 0 || converted as usize >= length {
        return Err(Error::IndexOutOfRange {
            index: *i,
            length,
        });
    }

    Ok(converted as usize)
}

/// A Result type specialized for use with an `Error`.
pub type Result<T> = result::Result<T, Error>;

/// Specifies the different classes of errors which may occur while
/// evaluating a program.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    IdentifierNotFound(String),
    NotCallable(&'static str),
    WrongNumberOfArguments { want: usize, got: usize },
    IndexNotSupported(&'static str),
    InvalidIndexType(&'static str),
    IndexOutOfRange { index: i64, length: usize },
    Object(object::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::IdentifierNotFound(name) => write!(f, "identifier not found: {}", name),
            Error::NotCallable(type_name) => {
                write!(f, "invalid call of non-function ({})", type_name)
            }
            Error::WrongNumberOfArguments { want, got } => {
                write!(f, "wrong number of arguments: got={}, want={}", got, want)
            }
            Error::IndexNotSupported(type_name) => {
                write!(f, "index operator not supported: {}", type_name)
            }
            Error::InvalidIndexType(type_name) => {
                write!(f, "invalid index type: {}", type_name)
            }
            Error::IndexOutOfRange { index, length } => {
                write!(f, "index out of range: {} (len {})", index, length)
            }
            Error::Object(err) => err.fmt(f),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Object(err) => Some(err),
            _ => None,
        }
    }
}
