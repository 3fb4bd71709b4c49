//! An abstract syntax tree for the Monkey programming language.

use crate::token::{Position, Token};

use std::fmt;

/// The top level structure of a Monkey program.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    /// The statements that make up the `Program`.
    pub statements: Vec<Statement>,
}

impl Program {
    /// Creates a new `Program` for use with a `parser::Parser`.
    pub fn new() -> Self {
        Program { statements: vec![] }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.statements {
            stmt.fmt(f)?;
        }

        Ok(())
    }
}

/// Possible statement types in Monkey.
#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    Let(LetStatement),
    Return(ReturnStatement),
    Expression(Expression),
    Block(BlockStatement),
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Let(stmt) => write!(f, "let {} = {};", stmt.name, stmt.value),
            Statement::Return(stmt) => write!(f, "return {};", stmt.value),
            Statement::Expression(expr) => expr.fmt(f),
            Statement::Block(block) => block.fmt(f),
        }
    }
}

/// A statement that binds an expression to an identifier.
#[derive(Clone, Debug, PartialEq)]
pub struct LetStatement {
    pub name: Identifier,
    pub value: Expression,
    pub position: Position,
}

/// A statement that returns a value from a function or program.
#[derive(Clone, Debug, PartialEq)]
pub struct ReturnStatement {
    pub value: Expression,
    pub position: Position,
}

/// A braced sequence of statements.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
    pub position: Position,
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for stmt in &self.statements {
            stmt.fmt(f)?;
        }
        write!(f, "}}")
    }
}

/// A computed expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    Identifier(Identifier),
    Integer(IntegerLiteral),
    Boolean(BooleanLiteral),
    String(StringLiteral),
    Array(ArrayLiteral),
    Map(MapLiteral),
    Prefix(PrefixExpression),
    Infix(InfixExpression),
    If(IfExpression),
    Function(FunctionLiteral),
    Call(CallExpression),
    Index(IndexExpression),
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(id) => id.fmt(f),
            Expression::Integer(int) => int.value.fmt(f),
            Expression::Boolean(b) => b.value.fmt(f),
            Expression::String(s) => write!(f, "\"{}\"", s.value),
            Expression::Array(a) => a.fmt(f),
            Expression::Map(m) => m.fmt(f),
            Expression::Prefix(p) => write!(f, "({}{})", p.operator, p.right),
            Expression::Infix(i) => write!(f, "({} {} {})", i.left, i.operator, i.right),
            Expression::If(stmt) => stmt.fmt(f),
            Expression::Function(func) => func.fmt(f),
            Expression::Call(call) => call.fmt(f),
            Expression::Index(index) => write!(f, "({}[{}])", index.left, index.index),
        }
    }
}

/// A programmer-created identifier.
#[derive(Clone, Debug, PartialEq)]
pub struct Identifier {
    pub value: String,
    pub position: Position,
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// A base-10 integer literal.
#[derive(Clone, Debug, PartialEq)]
pub struct IntegerLiteral {
    pub value: i64,
    pub position: Position,
}

/// A `true` or `false` literal.
#[derive(Clone, Debug, PartialEq)]
pub struct BooleanLiteral {
    pub value: bool,
    pub position: Position,
}

/// A double-quoted string literal.
#[derive(Clone, Debug, PartialEq)]
pub struct StringLiteral {
    pub value: String,
    pub position: Position,
}

/// An array literal, such as `[1, 2, 3]`.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayLiteral {
    pub items: Vec<Expression>,
    pub position: Position,
}

impl fmt::Display for ArrayLiteral {
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

/// A map literal, such as `{"key": "value"}`. Entries are kept in source
/// order; duplicate keys are resolved during evaluation, not parsing.
#[derive(Clone, Debug, PartialEq)]
pub struct MapLiteral {
    pub pairs: Vec<(Expression, Expression)>,
    pub position: Position,
}

impl fmt::Display for MapLiteral {
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

/// A unary operator applied to a single operand, such as `-5` or `!ok`.
#[derive(Clone, Debug, PartialEq)]
pub struct PrefixExpression {
    pub operator: Token,
    pub right: Box<Expression>,
    pub position: Position,
}

/// A binary operator applied to two operands, such as `1 + 2`.
#[derive(Clone, Debug, PartialEq)]
pub struct InfixExpression {
    pub operator: Token,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub position: Position,
}

/// An if/else expression.
#[derive(Clone, Debug, PartialEq)]
pub struct IfExpression {
    pub condition: Box<Expression>,
    pub consequence: BlockStatement,
    pub alternative: Option<BlockStatement>,
    pub position: Position,
}

impl fmt::Display for IfExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "if ({}) {}", self.condition, self.consequence)?;
        if let Some(alt) = &self.alternative {
            write!(f, " else {}", alt)?;
        }

        Ok(())
    }
}

/// A function literal: parameters and a body, such as `fn(x, y) { x + y }`.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionLiteral {
    pub parameters: Vec<Identifier>,
    pub body: BlockStatement,
    pub position: Position,
}

impl fmt::Display for FunctionLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn(")?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            param.fmt(f)?;
        }
        write!(f, ") {}", self.body)
    }
}

/// A call of a function expression with arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct CallExpression {
    pub function: Box<Expression>,
    pub arguments: Vec<Expression>,
    pub position: Position,
}

impl fmt::Display for CallExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.function)?;
        for (i, arg) in self.arguments.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            arg.fmt(f)?;
        }
        write!(f, ")")
    }
}

/// An index of an array, map, or string, such as `a[0]`.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexExpression {
    pub left: Box<Expression>,
    pub index: Box<Expression>,
    pub position: Position,
}
