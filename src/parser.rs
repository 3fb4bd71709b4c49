//! A Pratt parser for the Monkey programming language.

use crate::ast;
use crate::lexer::{self, Lexer};
use crate::token::{Position, Token, TokenValue};

use std::error;
use std::fmt;
use std::mem;
use std::result;

// The binding power of each operator, from weakest to strongest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    // == and !=
    Equals,
    // <, <=, > and >=
    LessGreater,
    // + and -
    Sum,
    // * and /
    Product,
    // -x, +x and !x
    Prefix,
    // fn(x)
    Call,
    // a[i]
    Index,
}

// Produces the precedence of a token in infix position, or `Lowest` for
// tokens that are not infix operators.
fn precedence_of(token: Token) -> Precedence {
    match token {
        Token::Equal | Token::NotEqual => Precedence::Equals,
        Token::LessThan | Token::LessEqual | Token::GreaterThan | Token::GreaterEqual => {
            Precedence::LessGreater
        }
        Token::Plus | Token::Minus => Precedence::Sum,
        Token::Asterisk | Token::Slash => Precedence::Product,
        Token::LeftParen => Precedence::Call,
        Token::LeftBracket => Precedence::Index,
        _ => Precedence::Lowest,
    }
}

/// Parses tokens produced by a `Lexer` into an `ast::Program` for the Monkey
/// programming language.
///
/// The parser fails fast: the first expectation failure aborts the parse
/// with an error carrying the offending position.
pub struct Parser<'a> {
    lexer: Lexer<'a>,

    // Single token of lookahead, which is all this grammar requires.
    current: TokenValue,
}

impl<'a> Parser<'a> {
    /// Creates a new `Parser` by accepting a `Lexer`.
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self> {
        // Advance once to ready the first token.
        let current = lexer.next_token()?;
        Ok(Parser { lexer, current })
    }

    /// Parses the input token stream and creates an `ast::Program`. On
    /// success, all tokens up to end of input have been consumed.
    pub fn parse(&mut self) -> Result<ast::Program> {
        let mut prog = ast::Program::new();

        while !self.current_is(Token::Eof) {
            prog.statements.push(self.parse_statement()?);
        }

        Ok(prog)
    }

    // Advances the parser once, producing the token that was current before
    // the advance.
    fn next_token(&mut self) -> Result<TokenValue> {
        let next = self.lexer.next_token()?;
        Ok(mem::replace(&mut self.current, next))
    }

    // Determines if the current token is of kind `token`.
    fn current_is(&self, token: Token) -> bool {
        self.current.token == token
    }

    // Asserts that the current token is of kind `token` without advancing.
    fn expect(&self, token: Token) -> Result<()> {
        if self.current_is(token) {
            Ok(())
        } else {
            Err(self.unexpected(token))
        }
    }

    // Asserts that the current token is of kind `token` and consumes it.
    fn consume(&mut self, token: Token) -> Result<TokenValue> {
        self.expect(token)?;
        self.next_token()
    }

    // Consumes the optional semicolon that may terminate a statement.
    fn skip_semicolon(&mut self) -> Result<()> {
        if self.current_is(Token::Semicolon) {
            self.next_token()?;
        }

        Ok(())
    }

    fn unexpected(&self, want: Token) -> Error {
        Error::UnexpectedToken {
            want,
            got: self.current.to_string(),
            position: self.current.position.clone(),
        }
    }

    fn parse_statement(&mut self) -> Result<ast::Statement> {
        match self.current.token {
            Token::Let => self.parse_let_statement(),
            Token::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Result<ast::Statement> {
        // Consume the `let` keyword.
        let position = self.next_token()?.position;

        let name_token = self.consume(Token::Identifier)?;
        let name = ast::Identifier {
            value: name_token.literal,
            position: name_token.position,
        };

        self.consume(Token::Assign)?;
        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon()?;

        Ok(ast::Statement::Let(ast::LetStatement {
            name,
            value,
            position,
        }))
    }

    fn parse_return_statement(&mut self) -> Result<ast::Statement> {
        // Consume the `return` keyword.
        let position = self.next_token()?.position;

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon()?;

        Ok(ast::Statement::Return(ast::ReturnStatement {
            value,
            position,
        }))
    }

    fn parse_expression_statement(&mut self) -> Result<ast::Statement> {
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon()?;

        Ok(ast::Statement::Expression(expr))
    }

    // The heart of the Pratt parser: parse a prefix expression, then keep
    // folding it into infix expressions while the next operator binds more
    // tightly than the caller's precedence.
    fn parse_expression(&mut self, precedence: Precedence) -> Result<ast::Expression> {
        let mut left = self.parse_prefix()?;

        while !self.current_is(Token::Semicolon) && precedence < precedence_of(self.current.token) {
            left = match self.current.token {
                Token::LeftParen => self.parse_call_expression(left)?,
                Token::LeftBracket => self.parse_index_expression(left)?,
                _ => self.parse_infix_expression(left)?,
            };
        }

        Ok(left)
    }

    // Dispatches on the current token to the prefix parse rule registered
    // for its kind.
    fn parse_prefix(&mut self) -> Result<ast::Expression> {
        match self.current.token {
            Token::Identifier => {
                let token = self.next_token()?;
                Ok(ast::Expression::Identifier(ast::Identifier {
                    value: token.literal,
                    position: token.position,
                }))
            }
            Token::Integer => self.parse_integer_literal(),
            Token::String => {
                let token = self.next_token()?;
                Ok(ast::Expression::String(ast::StringLiteral {
                    value: token.literal,
                    position: token.position,
                }))
            }
            Token::True | Token::False => {
                let token = self.next_token()?;
                Ok(ast::Expression::Boolean(ast::BooleanLiteral {
                    value: token.token == Token::True,
                    position: token.position,
                }))
            }
            Token::Bang | Token::Plus | Token::Minus => self.parse_prefix_expression(),
            Token::LeftParen => self.parse_grouped_expression(),
            Token::LeftBracket => self.parse_array_literal(),
            Token::LeftBrace => self.parse_map_literal(),
            Token::If => self.parse_if_expression(),
            Token::Function => self.parse_function_literal(),

            _ => Err(Error::NoPrefixFunction(
                self.current.token,
                self.current.position.clone(),
            )),
        }
    }

    fn parse_integer_literal(&mut self) -> Result<ast::Expression> {
        let token = self.next_token()?;

        // The lexer only produces digit runs for Integer tokens, so the only
        // way this fails is an out-of-range literal.
        let value: i64 = token
            .literal
            .parse()
            .map_err(|_| Error::IllegalInteger(token.literal.clone(), token.position.clone()))?;

        Ok(ast::Expression::Integer(ast::IntegerLiteral {
            value,
            position: token.position,
        }))
    }

    fn parse_prefix_expression(&mut self) -> Result<ast::Expression> {
        let token = self.next_token()?;
        let right = self.parse_expression(Precedence::Prefix)?;

        Ok(ast::Expression::Prefix(ast::PrefixExpression {
            operator: token.token,
            right: Box::new(right),
            position: token.position,
        }))
    }

    fn parse_infix_expression(&mut self, left: ast::Expression) -> Result<ast::Expression> {
        let precedence = precedence_of(self.current.token);
        let token = self.next_token()?;
        let right = self.parse_expression(precedence)?;

        Ok(ast::Expression::Infix(ast::InfixExpression {
            operator: token.token,
            left: Box::new(left),
            right: Box::new(right),
            position: token.position,
        }))
    }

    fn parse_grouped_expression(&mut self) -> Result<ast::Expression> {
        // Consume the opening parenthesis.
        self.next_token()?;

        let expr = self.parse_expression(Precedence::Lowest)?;
        self.consume(Token::RightParen)?;

        Ok(expr)
    }

    fn parse_array_literal(&mut self) -> Result<ast::Expression> {
        // Consume the opening bracket.
        let position = self.next_token()?.position;

        let items = self.parse_expression_list(Token::RightBracket)?;
        self.consume(Token::RightBracket)?;

        Ok(ast::Expression::Array(ast::ArrayLiteral {
            items,
            position,
        }))
    }

    fn parse_map_literal(&mut self) -> Result<ast::Expression> {
        // Consume the opening brace.
        let position = self.next_token()?.position;

        // Pairs stay in source order; duplicate keys are resolved at
        // evaluation time, last write wins.
        let mut pairs = vec![];
        while !self.current_is(Token::RightBrace) {
            let key = self.parse_expression(Precedence::Lowest)?;
            self.consume(Token::Colon)?;
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));

            if !self.current_is(Token::RightBrace) {
                self.consume(Token::Comma)?;
            }
        }
        self.consume(Token::RightBrace)?;

        Ok(ast::Expression::Map(ast::MapLiteral { pairs, position }))
    }

    // Parses a comma-separated list of expressions, stopping before `end`
    // without consuming it.
    fn parse_expression_list(&mut self, end: Token) -> Result<Vec<ast::Expression>> {
        let mut exprs = vec![];
        if self.current_is(end) {
            return Ok(exprs);
        }

        exprs.push(self.parse_expression(Precedence::Lowest)?);
        while self.current_is(Token::Comma) {
            self.next_token()?;
            exprs.push(self.parse_expression(Precedence::Lowest)?);
        }

        Ok(exprs)
    }

    fn parse_block_statement(&mut self) -> Result<ast::BlockStatement> {
        // Consume the opening brace.
        let position = self.next_token()?.position;

        let mut statements = vec![];
        while !self.current_is(Token::RightBrace) && !self.current_is(Token::Eof) {
            statements.push(self.parse_statement()?);
        }
        self.consume(Token::RightBrace)?;

        Ok(ast::BlockStatement {
            statements,
            position,
        })
    }

    fn parse_if_expression(&mut self) -> Result<ast::Expression> {
        // Consume the `if` keyword.
        let position = self.next_token()?.position;

        self.consume(Token::LeftParen)?;
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.consume(Token::RightParen)?;

        self.expect(Token::LeftBrace)?;
        let consequence = self.parse_block_statement()?;

        let alternative = if self.current_is(Token::Else) {
            self.next_token()?;
            self.expect(Token::LeftBrace)?;
            Some(self.parse_block_statement()?)
        } else {
            None
        };

        Ok(ast::Expression::If(ast::IfExpression {
            condition: Box::new(condition),
            consequence,
            alternative,
            position,
        }))
    }

    fn parse_function_literal(&mut self) -> Result<ast::Expression> {
        // Consume the `fn` keyword.
        let position = self.next_token()?.position;

        self.expect(Token::LeftParen)?;
        let parameters = self.parse_function_parameters()?;

        self.expect(Token::LeftBrace)?;
        let body = self.parse_block_statement()?;

        Ok(ast::Expression::Function(ast::FunctionLiteral {
            parameters,
            body,
            position,
        }))
    }

    fn parse_function_parameters(&mut self) -> Result<Vec<ast::Identifier>> {
        // Consume the opening parenthesis.
        self.next_token()?;

        let mut parameters = vec![];
        if self.current_is(Token::RightParen) {
            self.next_token()?;
            return Ok(parameters);
        }

        let token = self.consume(Token::Identifier)?;
        parameters.push(ast::Identifier {
            value: token.literal,
            position: token.position,
        });

        while self.current_is(Token::Comma) {
            self.next_token()?;
            let token = self.consume(Token::Identifier)?;
            parameters.push(ast::Identifier {
                value: token.literal,
                position: token.position,
            });
        }

        self.consume(Token::RightParen)?;
        Ok(parameters)
    }

    fn parse_call_expression(&mut self, function: ast::Expression) -> Result<ast::Expression> {
        // Consume the opening parenthesis.
        let position = self.next_token()?.position;

        let arguments = self.parse_expression_list(Token::RightParen)?;
        self.consume(Token::RightParen)?;

        Ok(ast::Expression::Call(ast::CallExpression {
            function: Box::new(function),
            arguments,
            position,
        }))
    }

    fn parse_index_expression(&mut self, left: ast::Expression) -> Result<ast::Expression> {
        // Consume the opening bracket.
        let position = self.next_token()?.position;

        let index = self.parse_expression(Precedence::Lowest)?;
        self.consume(Token::RightBracket)?;

        Ok(ast::Expression::Index(ast::IndexExpression {
            left: Box::new(left),
            index: Box::new(index),
            position,
        }))
    }
}

/// A Result type specialized for use with an `Error`.
pub type Result<T> = result::Result<T, Error>;

/// Specifies the different classes of errors which may occur while parsing.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    UnexpectedToken {
        want: Token,
        got: String,
        position: Position,
    },
    NoPrefixFunction(Token, Position),
    IllegalInteger(String, Position),
    Lexer(lexer::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnexpectedToken {
                want,
                got,
                position,
            } => write!(
                f,
                r#"{}: expected next token to be "{}", got "{}" instead"#,
                position, want, got
            ),
            Error::NoPrefixFunction(token, position) => write!(
                f,
                r#"{}: no prefix parse function for "{}" found"#,
                position, token
            ),
            Error::IllegalInteger(literal, position) => {
                write!(f, r#"{}: could not parse "{}" as integer"#, position, literal)
            }
            Error::Lexer(err) => err.fmt(f),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Lexer(err) => Some(err),
            _ => None,
        }
    }
}

impl From<lexer::Error> for Error {
    fn from(err: lexer::Error) -> Self {
        Error::Lexer(err)
    }
}
