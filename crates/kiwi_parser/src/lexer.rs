use std::iter::Peekable;
use std::str::Chars;

use crate::span::{Position, Span, WithSpan};
use crate::token::Token;

pub struct Lexer<'a> {
    input_iter: Peekable<Chars<'a>>,
    current_position: Position,
    /// Set once the iterator has yielded `Eof`
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Lexer<'a> {
        Lexer {
            input_iter: input.chars().peekable(),
            current_position: Position::default(),
            finished: false,
        }
    }

    /// Consume the next character from the list.
    fn read_char(&mut self) -> Option<char> {
        let next = self.input_iter.next();
        if let Some(c) = next {
            self.current_position = self.current_position.shift(c);
        }
        next
    }

    /// Get the next character from the list without consuming it.
    fn peek_char(&mut self) -> Option<&char> {
        self.input_iter.peek()
    }

    /// Consume the next character only if it is the expected one.
    fn read_char_if(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(&expected) {
            self.read_char();
            true
        } else {
            false
        }
    }

    /// Consume whitespace until a non-whitespace character is found.
    fn skip_whitespace(&mut self) {
        while let Some(&c) = self.peek_char() {
            if is_whitespace(c) {
                self.read_char();
            } else {
                break;
            }
        }
    }

    /// Read the current and following characters as an integer token.
    fn read_integer(&mut self, first: char) -> Token {
        let mut digits = String::new();
        digits.push(first);

        while let Some(&ch) = self.peek_char() {
            if !is_digit(ch) {
                break;
            }
            digits.push(ch);
            self.read_char();
        }

        Token::Integer(digits)
    }

    /// Read the current and following tokens as an identifier or a keyword (if it exists).
    fn read_identifier_or_keyword(&mut self, first: char) -> Token {
        let mut identifier = String::new();
        identifier.push(first);

        // Digits are allowed after the first character
        while let Some(&ch) = self.peek_char() {
            if is_identifier_char(ch) || is_digit(ch) {
                identifier.push(ch);
                self.read_char();
            } else {
                break;
            }
        }

        Token::lookup_keyword(&identifier).unwrap_or(Token::Identifier(identifier))
    }

    /// Read a new token from the characters list.
    ///
    /// Once the input is exhausted every call returns `Eof` with the same span.
    pub fn next_token(&mut self) -> WithSpan<Token> {
        self.skip_whitespace();

        let initial_position = self.current_position;

        let token = if let Some(c) = self.read_char() {
            match c {
                '+' => Token::Plus,
                '-' => Token::Minus,
                '*' => Token::Star,
                '/' => Token::Slash,

                '=' if self.read_char_if('=') => Token::EqualEqual,
                '=' => Token::Equal,
                '!' if self.read_char_if('=') => Token::BangEqual,
                '!' => Token::Bang,
                '<' if self.read_char_if('=') => Token::LessEqual,
                '<' => Token::LessThan,
                '>' if self.read_char_if('=') => Token::GreaterEqual,
                '>' => Token::GreaterThan,

                ',' => Token::Comma,
                ';' => Token::Semicolon,

                '(' => Token::LeftParen,
                ')' => Token::RightParen,
                '{' => Token::LeftBrace,
                '}' => Token::RightBrace,

                c if is_digit(c) => self.read_integer(c),
                c if is_identifier_char(c) => self.read_identifier_or_keyword(c),

                c => Token::Illegal(c),
            }
        } else {
            Token::Eof
        };

        let span = Span::new(initial_position, self.current_position);

        WithSpan::new(token, span)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = WithSpan<Token>;

    /// Yields every token including a single trailing `Eof`.
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let token = self.next_token();
        if token.value == Token::Eof {
            self.finished = true;
        }
        Some(token)
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Whether or not the given character is a digit
fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// Whether or not the given character may start an identifier
fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::lexer::Lexer;
    use crate::span::{Position, Span};
    use crate::token::Token;

    fn kinds(input: &str) -> Vec<Token> {
        Lexer::new(input).map(|token| token.value).collect()
    }

    #[test]
    fn test_operators() {
        let input = "+-*/=! ==!=<><=>= and or";
        let mut lex = Lexer::new(input);

        assert_eq!(lex.next_token().value, Token::Plus);
        assert_eq!(lex.next_token().value, Token::Minus);
        assert_eq!(lex.next_token().value, Token::Star);
        assert_eq!(lex.next_token().value, Token::Slash);
        assert_eq!(lex.next_token().value, Token::Equal);
        assert_eq!(lex.next_token().value, Token::Bang);

        assert_eq!(lex.next_token().value, Token::EqualEqual);
        assert_eq!(lex.next_token().value, Token::BangEqual);
        assert_eq!(lex.next_token().value, Token::LessThan);
        assert_eq!(lex.next_token().value, Token::GreaterThan);
        assert_eq!(lex.next_token().value, Token::LessEqual);
        assert_eq!(lex.next_token().value, Token::GreaterEqual);

        assert_eq!(lex.next_token().value, Token::And);
        assert_eq!(lex.next_token().value, Token::Or);
        assert_eq!(lex.next_token().value, Token::Eof);
    }

    #[test]
    fn test_delimiters() {
        assert_eq!(
            kinds(",;(){}"),
            vec![
                Token::Comma,
                Token::Semicolon,
                Token::LeftParen,
                Token::RightParen,
                Token::LeftBrace,
                Token::RightBrace,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_identifier() {
        assert_eq!(
            kinds("hello _world x1 _hello_world_ and_or"),
            vec![
                Token::Identifier("hello".to_owned()),
                Token::Identifier("_world".to_owned()),
                Token::Identifier("x1".to_owned()),
                Token::Identifier("_hello_world_".to_owned()),
                Token::Identifier("and_or".to_owned()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_integer() {
        assert_eq!(
            kinds("012312 5 99999999999999999999999"),
            vec![
                Token::Integer("012312".to_owned()),
                Token::Integer("5".to_owned()),
                // Range is not checked here
                Token::Integer("99999999999999999999999".to_owned()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_digits_then_letters() {
        assert_eq!(
            kinds("12abc"),
            vec![
                Token::Integer("12".to_owned()),
                Token::Identifier("abc".to_owned()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            kinds("true false fn let if else return and or"),
            vec![
                Token::True,
                Token::False,
                Token::Fn,
                Token::Let,
                Token::If,
                Token::Else,
                Token::Return,
                Token::And,
                Token::Or,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_illegal() {
        assert_eq!(
            kinds("a @ $b é"),
            vec![
                Token::Identifier("a".to_owned()),
                Token::Illegal('@'),
                Token::Illegal('$'),
                Token::Identifier("b".to_owned()),
                Token::Illegal('é'),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_program() {
        let input = "let add = fn(x, y) { x + y; };\nadd(1, 2);";
        assert_eq!(
            kinds(input),
            vec![
                Token::Let,
                Token::Identifier("add".to_owned()),
                Token::Equal,
                Token::Fn,
                Token::LeftParen,
                Token::Identifier("x".to_owned()),
                Token::Comma,
                Token::Identifier("y".to_owned()),
                Token::RightParen,
                Token::LeftBrace,
                Token::Identifier("x".to_owned()),
                Token::Plus,
                Token::Identifier("y".to_owned()),
                Token::Semicolon,
                Token::RightBrace,
                Token::Semicolon,
                Token::Identifier("add".to_owned()),
                Token::LeftParen,
                Token::Integer("1".to_owned()),
                Token::Comma,
                Token::Integer("2".to_owned()),
                Token::RightParen,
                Token::Semicolon,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_eof() {
        let input = "";
        let mut lex = Lexer::new(input);
        assert_eq!(lex.next_token().value, Token::Eof);
        assert_eq!(lex.next_token().value, Token::Eof);
        assert_eq!(lex.next_token().value, Token::Eof);
    }

    #[test]
    fn test_iterator_stops_after_eof() {
        let mut lex = Lexer::new("1");
        assert_eq!(lex.next().map(|t| t.value), Some(Token::Integer("1".into())));
        assert_eq!(lex.next().map(|t| t.value), Some(Token::Eof));
        assert_eq!(lex.next(), None);
    }

    #[test]
    fn test_spans_eof() {
        let input = "1";
        let mut lex = Lexer::new(input);

        // Skip the `1`
        lex.next_token();

        let final_span = Span::new(Position::new(1, 2), Position::new(1, 2));
        // Make sure that the span does not change upon hitting eof
        assert_eq!(lex.next_token().span, final_span);
        assert_eq!(lex.next_token().span, final_span);
    }

    #[test]
    fn test_spans() {
        let input = "abc 12 + return";
        let mut lex = Lexer::new(input);

        assert_eq!(
            lex.next_token().span,
            Span::new(Position::new(1, 1), Position::new(1, 4))
        );
        assert_eq!(
            lex.next_token().span,
            Span::new(Position::new(1, 5), Position::new(1, 7))
        );
        assert_eq!(
            lex.next_token().span,
            Span::new(Position::new(1, 8), Position::new(1, 9))
        );
        assert_eq!(
            lex.next_token().span,
            Span::new(Position::new(1, 10), Position::new(1, 16))
        );
    }

    #[test]
    fn test_spans_across_lines() {
        let input = "let x = 1;\n\tx <= 2;\r\n  y";
        let starts: Vec<Position> = Lexer::new(input).map(|t| t.span.start).collect();

        assert_eq!(
            starts,
            vec![
                Position::new(1, 1),
                Position::new(1, 5),
                Position::new(1, 7),
                Position::new(1, 9),
                Position::new(1, 10),
                Position::new(2, 2),
                Position::new(2, 4),
                Position::new(2, 7),
                Position::new(2, 8),
                Position::new(3, 3),
                // Eof
                Position::new(3, 4),
            ]
        );
    }
}
