use std::fmt;

#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Equal,
    Bang,

    EqualEqual,
    BangEqual,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,

    And,
    Or,

    // Delimiters
    Comma,
    Semicolon,

    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,

    // Identifiers & Literals
    Identifier(String),
    /// Raw digits; range is checked when the parser converts them
    Integer(String),

    // Keywords
    True,
    False,
    Fn,
    Let,
    If,
    Else,
    Return,

    // Special
    Illegal(char),
    Eof,
}

impl Token {
    /// Get the Token for the given keyword, if valid.
    pub fn lookup_keyword(s: &str) -> Option<Token> {
        use Token::*;

        match s {
            "true" => Some(True),
            "false" => Some(False),
            "fn" => Some(Fn),
            "let" => Some(Let),
            "if" => Some(If),
            "else" => Some(Else),
            "return" => Some(Return),
            "and" => Some(And),
            "or" => Some(Or),
            _ => None,
        }
    }

    /// Whether both tokens are of the same kind, ignoring any literal they carry.
    pub fn same_kind(&self, other: &Token) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Token::*;

        match self {
            Plus => write!(f, "+"),
            Minus => write!(f, "-"),
            Star => write!(f, "*"),
            Slash => write!(f, "/"),
            Equal => write!(f, "="),
            Bang => write!(f, "!"),

            EqualEqual => write!(f, "=="),
            BangEqual => write!(f, "!="),
            LessThan => write!(f, "<"),
            GreaterThan => write!(f, ">"),
            LessEqual => write!(f, "<="),
            GreaterEqual => write!(f, ">="),

            And => write!(f, "and"),
            Or => write!(f, "or"),

            Comma => write!(f, ","),
            Semicolon => write!(f, ";"),

            LeftParen => write!(f, "("),
            RightParen => write!(f, ")"),
            LeftBrace => write!(f, "{{"),
            RightBrace => write!(f, "}}"),

            Identifier(name) => write!(f, "{}", name),
            Integer(digits) => write!(f, "{}", digits),

            True => write!(f, "true"),
            False => write!(f, "false"),
            Fn => write!(f, "fn"),
            Let => write!(f, "let"),
            If => write!(f, "if"),
            Else => write!(f, "else"),
            Return => write!(f, "return"),

            Illegal(c) => write!(f, "{}", c),
            Eof => write!(f, "EOF"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::token::Token;

    #[test]
    fn keyword_lookup() {
        assert_eq!(Token::lookup_keyword("and"), Some(Token::And));
        assert_eq!(Token::lookup_keyword("or"), Some(Token::Or));
        assert_eq!(Token::lookup_keyword("fn"), Some(Token::Fn));
        assert_eq!(Token::lookup_keyword("nil"), None);
        assert_eq!(Token::lookup_keyword("If"), None);
    }

    #[test]
    fn same_kind_ignores_literal() {
        assert!(Token::Identifier("a".into()).same_kind(&Token::Identifier("b".into())));
        assert!(Token::Integer("1".into()).same_kind(&Token::Integer("22".into())));
        assert!(!Token::Plus.same_kind(&Token::Minus));
    }

    #[test]
    fn literal_formatting() {
        assert_eq!(Token::LeftBrace.to_string(), "{");
        assert_eq!(Token::GreaterEqual.to_string(), ">=");
        assert_eq!(Token::Integer("007".into()).to_string(), "007");
        assert_eq!(Token::Illegal('@').to_string(), "@");
        assert_eq!(Token::Eof.to_string(), "EOF");
    }
}
