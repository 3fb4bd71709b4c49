use monkey_lang::ast;
use monkey_lang::token::{Position, Token};

#[test]
fn program_display() {
    let prog = ast::Program {
        statements: vec![
            ast::Statement::Let(ast::LetStatement {
                name: ident("myVar"),
                value: ast::Expression::Identifier(ident("anotherVar")),
                position: pos(),
            }),
            ast::Statement::Return(ast::ReturnStatement {
                value: ast::Expression::Integer(ast::IntegerLiteral {
                    value: 5,
                    position: pos(),
                }),
                position: pos(),
            }),
        ],
    };

    assert_eq!("let myVar = anotherVar;return 5;", prog.to_string());
}

#[test]
fn expression_display() {
    let tests = vec![
        (
            ast::Expression::Prefix(ast::PrefixExpression {
                operator: Token::Minus,
                right: Box::new(int(5)),
                position: pos(),
            }),
            "(-5)",
        ),
        (
            ast::Expression::Infix(ast::InfixExpression {
                operator: Token::Plus,
                left: Box::new(int(1)),
                right: Box::new(int(2)),
                position: pos(),
            }),
            "(1 + 2)",
        ),
        (
            ast::Expression::String(ast::StringLiteral {
                value: "hello".to_string(),
                position: pos(),
            }),
            "\"hello\"",
        ),
        (
            ast::Expression::Array(ast::ArrayLiteral {
                items: vec![int(1), int(2), int(3)],
                position: pos(),
            }),
            "[1, 2, 3]",
        ),
        (
            ast::Expression::Map(ast::MapLiteral {
                pairs: vec![(int(1), int(2)), (int(3), int(4))],
                position: pos(),
            }),
            "{1: 2, 3: 4}",
        ),
        (
            ast::Expression::Index(ast::IndexExpression {
                left: Box::new(ast::Expression::Identifier(ident("a"))),
                index: Box::new(int(0)),
                position: pos(),
            }),
            "(a[0])",
        ),
        (
            ast::Expression::Call(ast::CallExpression {
                function: Box::new(ast::Expression::Identifier(ident("add"))),
                arguments: vec![int(1), int(2)],
                position: pos(),
            }),
            "add(1, 2)",
        ),
    ];

    for (expr, want) in tests {
        assert_eq!(want, expr.to_string());
    }
}

#[test]
fn if_expression_display() {
    let expr = ast::Expression::If(ast::IfExpression {
        condition: Box::new(ast::Expression::Infix(ast::InfixExpression {
            operator: Token::LessThan,
            left: Box::new(ast::Expression::Identifier(ident("x"))),
            right: Box::new(ast::Expression::Identifier(ident("y"))),
            position: pos(),
        })),
        consequence: block(vec![ast::Statement::Expression(
            ast::Expression::Identifier(ident("x")),
        )]),
        alternative: Some(block(vec![ast::Statement::Expression(
            ast::Expression::Identifier(ident("y")),
        )])),
        position: pos(),
    });

    assert_eq!("if ((x < y)) {x} else {y}", expr.to_string());
}

#[test]
fn function_literal_display() {
    let expr = ast::Expression::Function(ast::FunctionLiteral {
        parameters: vec![ident("x"), ident("y")],
        body: block(vec![ast::Statement::Expression(ast::Expression::Infix(
            ast::InfixExpression {
                operator: Token::Plus,
                left: Box::new(ast::Expression::Identifier(ident("x"))),
                right: Box::new(ast::Expression::Identifier(ident("y"))),
                position: pos(),
            },
        ))]),
        position: pos(),
    });

    assert_eq!("fn(x, y) {(x + y)}", expr.to_string());
}

fn pos() -> Position {
    Position::start()
}

fn ident(name: &str) -> ast::Identifier {
    ast::Identifier {
        value: name.to_string(),
        position: pos(),
    }
}

fn int(value: i64) -> ast::Expression {
    ast::Expression::Integer(ast::IntegerLiteral {
        value,
        position: pos(),
    })
}

fn block(statements: Vec<ast::Statement>) -> ast::BlockStatement {
    ast::BlockStatement {
        statements,
        position: pos(),
    }
}
