//! Objects produced when evaluating the Monkey programming language.

use crate::ast;
use crate::token::Token;

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::error;
use std::fmt;
use std::rc::Rc;
use std::result;

/// Objects produced when evaluating Monkey source code, along with their
/// associated data if applicable.
#[derive(Clone, Debug, PartialEq)]
pub enum Object {
    Null,
    Integer(i64),
    Boolean(bool),
    String(String),
    Array(Array),
    Map(Map),
    Function(Function),
    Builtin(Builtin),
}

impl Object {
    /// Produces the name of this object's type, for use in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Null => "null",
            Object::Integer(_) => "int",
            Object::Boolean(_) => "bool",
            Object::String(_) => "string",
            Object::Array(_) => "array",
            Object::Map(_) => "map",
            Object::Function(_) => "function",
            Object::Builtin(_) => "builtin_function",
        }
    }

    /// Produces the boolean interpretation of this object, as used by `if`
    /// conditions and the `!` operator.
    ///
    /// Null, `false`, `0`, and the empty string are the only falsy values;
    /// arrays, maps, and functions are always truthy, even when empty.
    pub fn truth(&self) -> bool {
        match self {
            Object::Null => false,
            Object::Integer(i) => *i != 0,
            Object::Boolean(b) => *b,
            Object::String(s) => !s.is_empty(),
            Object::Array(_) | Object::Map(_) | Object::Function(_) | Object::Builtin(_) => true,
        }
    }

    // Applies a unary operator to this object, producing `None` when the
    // operator has no meaning for this type.
    fn unary(&self, op: Token) -> Option<Object> {
        match (self, op) {
            (Object::Integer(i), Token::Minus) => Some(Object::Integer(-i)),
            (Object::Integer(i), Token::Plus) => Some(Object::Integer(*i)),
            _ => None,
        }
    }

    // Applies a binary operator between this object and `other`, producing
    // `Ok(None)` when this type does not handle the combination. `side`
    // indicates which operand this object is, so non-commutative operators
    // evaluate in source order.
    fn binary(&self, op: Token, other: &Object, side: Side) -> Result<Option<Object>> {
        match self {
            Object::Integer(value) => {
                let Object::Integer(other) = other else {
                    return Ok(None);
                };
                let (l, r) = match side {
                    Side::Left => (*value, *other),
                    Side::Right => (*other, *value),
                };

                match op {
                    Token::Plus => Ok(Some(Object::Integer(l + r))),
                    Token::Minus => Ok(Some(Object::Integer(l - r))),
                    Token::Asterisk => Ok(Some(Object::Integer(l * r))),
                    Token::Slash => {
                        if r == 0 {
                            Err(Error::DivisionByZero)
                        } else {
                            // Truncated toward zero.
                            Ok(Some(Object::Integer(l / r)))
                        }
                    }
                    _ => Ok(None),
                }
            }

            Object::String(value) => {
                let Object::String(other) = other else {
                    return Ok(None);
                };

                match op {
                    Token::Plus => {
                        let (l, r) = match side {
                            Side::Left => (value, other),
                            Side::Right => (other, value),
                        };
                        Ok(Some(Object::String(format!("{}{}", l, r))))
                    }
                    _ => Ok(None),
                }
            }

            // No other type handles any binary operator.
            _ => Ok(None),
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Null => write!(f, "null"),
            Object::Integer(i) => i.fmt(f),
            Object::Boolean(b) => b.fmt(f),
            Object::String(s) => f.write_str(s),
            Object::Array(a) => a.fmt(f),
            Object::Map(m) => m.fmt(f),
            Object::Function(func) => func.fmt(f),
            Object::Builtin(b) => write!(f, "<built-in function {}>", b),
        }
    }
}

// Marks which side of a binary expression an operand came from.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Side {
    Left,
    Right,
}

/// Applies a unary operator to an object.
///
/// `!` negates any object's truthiness; the remaining operators are
/// delegated to the operand's type.
pub fn unary(op: Token, x: &Object) -> Result<Object> {
    if op == Token::Bang {
        return Ok(Object::Boolean(!x.truth()));
    }

    match x.unary(op) {
        Some(v) => Ok(v),
        None => Err(Error::UnknownUnaryOperator(op)),
    }
}

/// Applies a binary (non-comparison) operator between two objects.
///
/// The left operand's type is asked for a result first; if it does not
/// handle the combination the right operand's type is asked, before giving
/// up with an error.
pub fn binary(op: Token, x: &Object, y: &Object) -> Result<Object> {
    if let Some(v) = x.binary(op, y, Side::Left)? {
        return Ok(v);
    }
    if let Some(v) = y.binary(op, x, Side::Right)? {
        return Ok(v);
    }

    Err(Error::UnknownBinaryOperator(
        x.to_string(),
        op,
        y.to_string(),
    ))
}

/// Applies a comparison operator between two objects of the same type.
///
/// Integers order by value and booleans by `false < true`; every other
/// combination, including operands of mismatched types, is an error.
pub fn compare(op: Token, x: &Object, y: &Object) -> Result<Object> {
    if x.type_name() == y.type_name() {
        match (x, y) {
            (Object::Integer(l), Object::Integer(r)) => {
                return Ok(Object::Boolean(threeway(op, l.cmp(r))));
            }
            (Object::Boolean(l), Object::Boolean(r)) => {
                return Ok(Object::Boolean(threeway(op, l.cmp(r))));
            }
            _ => {}
        }
    }

    Err(Error::InvalidComparison(x.to_string(), op, y.to_string()))
}

// Maps a three-way comparison to the result of a relational operator.
fn threeway(op: Token, ordering: std::cmp::Ordering) -> bool {
    match op {
        Token::Equal => ordering.is_eq(),
        Token::NotEqual => ordering.is_ne(),
        Token::LessThan => ordering.is_lt(),
        Token::LessEqual => ordering.is_le(),
        Token::GreaterThan => ordering.is_gt(),
        Token::GreaterEqual => ordering.is_ge(),
        _ => false,
    }
}

/// The object representation of a Monkey array.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Array {
    pub items: Vec<Object>,
}

impl fmt::Display for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            item.fmt(f)?;
        }
        write!(f, "]")
    }
}

/// A value usable as a `Map` key. Only null, integers, booleans, and
/// strings hash; using any other type as a key is an error.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Hashable {
    Null,
    Boolean(bool),
    Integer(i64),
    String(String),
}

impl Hashable {
    /// Converts an object into a map key, or produces an error for
    /// unhashable types.
    pub fn from_object(obj: &Object) -> Result<Self> {
        match obj {
            Object::Null => Ok(Hashable::Null),
            Object::Boolean(b) => Ok(Hashable::Boolean(*b)),
            Object::Integer(i) => Ok(Hashable::Integer(*i)),
            Object::String(s) => Ok(Hashable::String(s.clone())),
            _ => Err(Error::Unhashable(obj.type_name())),
        }
    }
}

impl fmt::Display for Hashable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hashable::Null => write!(f, "null"),
            Hashable::Boolean(b) => b.fmt(f),
            Hashable::Integer(i) => i.fmt(f),
            Hashable::String(s) => f.write_str(s),
        }
    }
}

/// The object representation of a Monkey map. Entries are keyed by the key
/// value itself, so distinct keys never alias.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Map {
    pub pairs: BTreeMap<Hashable, Object>,
}

impl Map {
    /// Looks up a key, producing `Null` when it is absent and an error when
    /// it is unhashable.
    pub fn get(&self, key: &Object) -> Result<Object> {
        let key = Hashable::from_object(key)?;
        Ok(self.pairs.get(&key).cloned().unwrap_or(Object::Null))
    }

    /// The number of entries in the map.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl fmt::Display for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key, value)?;
        }
        write!(f, "}}")
    }
}

/// The object representation of a Monkey function: its parameters, body,
/// and the environment captured where the function literal was evaluated.
#[derive(Clone)]
pub struct Function {
    pub parameters: Vec<String>,
    pub body: ast::BlockStatement,
    pub env: Rc<RefCell<Environment>>,
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn({}) {}", self.parameters.join(", "), self.body)
    }
}

// The captured environment may contain this function itself, so neither
// Debug nor PartialEq can recurse into it.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("parameters", &self.parameters)
            .field("body", &format_args!("{}", self.body))
            .finish_non_exhaustive()
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.parameters == other.parameters
            && self.body == other.body
            && Rc::ptr_eq(&self.env, &other.env)
    }
}

/// An execution environment used when evaluating Monkey source code: a
/// mapping from names to objects, with an optional enclosing environment.
///
/// Environments have reference identity. A function literal keeps the
/// environment it was evaluated in alive and shares it with every call
/// frame it spawns, which is what makes closures and recursion through a
/// `let` binding work.
#[derive(Debug, Default)]
pub struct Environment {
    store: HashMap<String, Object>,
    outer: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    /// Creates a new root `Environment`.
    pub fn new() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Environment::default()))
    }

    /// Creates an enclosed `Environment` for use within a function call.
    pub fn new_enclosed(outer: &Rc<RefCell<Environment>>) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Environment {
            store: HashMap::new(),
            outer: Some(Rc::clone(outer)),
        }))
    }

    /// Retrieves the object bound to an identifier name, searching enclosing
    /// environments outer-ward, or returns `None` if `name` is unbound.
    pub fn get(&self, name: &str) -> Option<Object> {
        match self.store.get(name) {
            // We found a binding in this environment; no need to consult the
            // outer environment.
            Some(obj) => Some(obj.clone()),
            // We did not find a binding; try the outer environment, if any.
            None => self.outer.as_ref().and_then(|outer| outer.borrow().get(name)),
        }
    }

    /// Binds an object to the identifier `name` in this environment's local
    /// frame.
    pub fn set(&mut self, name: String, obj: Object) {
        self.store.insert(name, obj);
    }
}

/// The built-in Monkey functions.
///
/// The table is fixed at compile time; an identifier only resolves to a
/// built-in after lookup in the environment chain fails.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Builtin {
    Len,
    Print,
}

impl Builtin {
    /// Constructs a built-in using its name.
    pub fn lookup(name: &str) -> Option<Self> {
        match name {
            "len" => Some(Builtin::Len),
            "print" => Some(Builtin::Print),

            _ => None,
        }
    }

    /// Applies the appropriate built-in function on `args` to produce an
    /// `Object`.
    pub fn apply(&self, args: &[Object]) -> Result<Object> {
        match self {
            Builtin::Len => builtin_len(args),
            Builtin::Print => builtin_print(args),
        }
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Builtin::Len => write!(f, "len"),
            Builtin::Print => write!(f, "print"),
        }
    }
}

fn builtin_len(args: &[Object]) -> Result<Object> {
    if args.len() != 1 {
        return Err(Error::Builtin(
            Builtin::Len,
            format!("expected 1 argument, but got {}", args.len()),
        ));
    }

    match &args[0] {
        Object::String(s) => Ok(Object::Integer(s.chars().count() as i64)),
        Object::Array(a) => Ok(Object::Integer(a.items.len() as i64)),
        Object::Map(m) => Ok(Object::Integer(m.len() as i64)),

        other => Err(Error::Builtin(
            Builtin::Len,
            format!("argument of type {} is not supported", other.type_name()),
        )),
    }
}

fn builtin_print(args: &[Object]) -> Result<Object> {
    let strings: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
    println!("{}", strings.join(" "));
    Ok(Object::Null)
}

/// A Result type specialized for use with an `Error`.
pub type Result<T> = result::Result<T, Error>;

/// Specifies the different classes of errors which may occur when operating
/// on objects.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    UnknownUnaryOperator(Token),
    UnknownBinaryOperator(String, Token, String),
    InvalidComparison(String, Token, String),
    Unhashable(&'static str),
    DivisionByZero,
    Builtin(Builtin, String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownUnaryOperator(op) => write!(f, "unknown unary operator: {}", op),
            Error::UnknownBinaryOperator(x, op, y) => {
                write!(f, "unknown binary operator: {} {} {}", x, op, y)
            }
            Error::InvalidComparison(x, op, y) => {
                write!(f, "invalid cmp operator: {} {} {}", x, op, y)
            }
            Error::Unhashable(type_name) => write!(f, "unhashable type: {}", type_name),
            Error::DivisionByZero => write!(f, "division by zero"),
            Error::Builtin(b, err) => write!(f, "built-in {}: {}", b, err),
        }
    }
}

impl error::Error for Error {}
