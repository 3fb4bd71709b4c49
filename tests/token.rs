use monkey_lang::token::{self, Position, Token, TokenValue};

#[test]
fn token_display() {
    let tests = vec![
        (Token::Illegal, "illegal token"),
        (Token::Eof, "end of file"),
        (Token::Identifier, "identifier"),
        (Token::Integer, "int"),
        (Token::String, "string"),
        (Token::Assign, "="),
        (Token::Plus, "+"),
        (Token::Minus, "-"),
        (Token::Asterisk, "*"),
        (Token::Slash, "/"),
        (Token::Bang, "!"),
        (Token::LessThan, "<"),
        (Token::LessEqual, "<="),
        (Token::GreaterThan, ">"),
        (Token::GreaterEqual, ">="),
        (Token::Equal, "=="),
        (Token::NotEqual, "!="),
        (Token::Colon, ":"),
        (Token::Comma, ","),
        (Token::Semicolon, ";"),
        (Token::LeftParen, "("),
        (Token::RightParen, ")"),
        (Token::LeftBrace, "{"),
        (Token::RightBrace, "}"),
        (Token::LeftBracket, "["),
        (Token::RightBracket, "]"),
        (Token::Let, "let"),
        (Token::If, "if"),
        (Token::Else, "else"),
        (Token::True, "true"),
        (Token::False, "false"),
        (Token::Return, "return"),
        (Token::Function, "fn"),
    ];

    for (token, want) in tests {
        assert_eq!(want, token.to_string());
    }
}

#[test]
fn keyword_lookup() {
    let tests = vec![
        ("let", Some(Token::Let)),
        ("if", Some(Token::If)),
        ("else", Some(Token::Else)),
        ("true", Some(Token::True)),
        ("false", Some(Token::False)),
        ("return", Some(Token::Return)),
        ("fn", Some(Token::Function)),
        ("function", None),
        ("letx", None),
        ("", None),
    ];

    for (input, want) in tests {
        assert_eq!(want, token::lookup_keyword(input));
    }
}

#[test]
fn token_value_display() {
    let tok = TokenValue::new(Token::Identifier, "five", Position::start());
    assert_eq!(r#"identifier(literal="five")"#, tok.to_string());

    let tok = TokenValue::new(Token::Integer, "10", Position::start());
    assert_eq!(r#"int(literal="10")"#, tok.to_string());
}

#[test]
fn position_display() {
    let pos = Position {
        file: None,
        line: 3,
        column: 14,
    };
    assert_eq!("3:14", pos.to_string());

    let pos = Position {
        file: Some("main.monkey".to_string()),
        line: 1,
        column: 2,
    };
    assert_eq!("main.monkey:1:2", pos.to_string());
}
