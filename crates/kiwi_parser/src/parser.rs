use std::rc::Rc;

use thiserror::Error;
use tracing::debug;

use crate::ast::{
    BlockExpression, CallExpression, Expression, FunctionLiteral, IdentifierLiteral, IfExpression,
    InfixExpression, InfixOperator, PrefixExpression, PrefixOperator, Program, Statement,
};
use crate::lexer::Lexer;
use crate::span::{Position, Span, WithSpan};
use crate::token::Token;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// A specific token (or kind of token) was required next
    #[error("expected token {expected}, found {}", .found.at_str())]
    Expected {
        expected: String,
        found: WithSpan<Token>,
    },
    /// The token cannot begin an expression
    #[error("unexpected token {}", .0.at_str())]
    Unexpected(WithSpan<Token>),
    /// The digits do not fit in a 64-bit integer
    #[error("invalid integer literal {}", .0.at_str())]
    InvalidInteger(WithSpan<Token>),
    #[error("return is only allowed inside a function body {}", .0.at_str())]
    ReturnOutsideFunction(Span),
}

impl ParseError {
    /// Where the offending token starts.
    pub fn position(&self) -> Position {
        match self {
            ParseError::Expected { found, .. } => found.span.start,
            ParseError::Unexpected(token) | ParseError::InvalidInteger(token) => token.span.start,
            ParseError::ReturnOutsideFunction(span) => span.start,
        }
    }
}

type ParseResult<T> = Result<T, ParseError>;

/// Binding strength of infix tokens, lowest first.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
enum Precedence {
    Lowest,
    /// `== != <= >=`
    Equality,
    /// `and or`
    AndOr,
    /// `< >`
    LessGreater,
    /// `+ -`
    Sum,
    /// `* /`
    Product,
    /// `-x !x`
    Prefix,
    /// `f(x)`
    Call,
}

impl Precedence {
    fn of(token: &Token) -> Precedence {
        match token {
            Token::EqualEqual | Token::BangEqual | Token::LessEqual | Token::GreaterEqual => {
                Precedence::Equality
            }
            Token::And | Token::Or => Precedence::AndOr,
            Token::LessThan | Token::GreaterThan => Precedence::LessGreater,
            Token::Plus | Token::Minus => Precedence::Sum,
            Token::Star | Token::Slash => Precedence::Product,
            Token::LeftParen => Precedence::Call,
            _ => Precedence::Lowest,
        }
    }
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,

    current_token: WithSpan<Token>,
    peek_token: WithSpan<Token>,

    errors: Vec<ParseError>,
    /// Number of function bodies enclosing the current token
    function_depth: usize,
    /// Number of `{` not yet closed before the current token
    brace_depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(mut lexer: Lexer<'a>) -> Parser<'a> {
        let cur = lexer.next_token();
        let next = lexer.next_token();
        Parser {
            lexer,
            current_token: cur,
            peek_token: next,
            errors: Vec::new(),
            function_depth: 0,
            brace_depth: 0,
        }
    }

    /// Parse every statement until the end of input.
    ///
    /// Malformed statements are left out of the program and their error is recorded
    /// (see [`Parser::errors`]); parsing carries on with the next statement.
    pub fn parse(&mut self) -> Program {
        let mut program = Program::new();

        while !self.current_token_is(&Token::Eof) {
            let start_depth = self.brace_depth;

            match self.parse_statement() {
                Ok(statement) => program.statements.push(statement),
                Err(error) => {
                    debug!(%error, "skipping malformed statement");
                    self.errors.push(error);
                    self.synchronize(start_depth);
                }
            }
            self.next_token();
        }

        program
    }

    /// Errors recorded so far, in source order.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Parse the whole input, failing with every recorded error if any statement was malformed.
    pub fn parse_program(&mut self) -> Result<Program, Vec<ParseError>> {
        let program = self.parse();

        if !self.errors.is_empty() {
            return Err(self.errors.clone());
        }

        Ok(program)
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.current_token.value {
            Token::Let => self.parse_let_statement(),
            Token::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> ParseResult<Statement> {
        let name = self.expect_peek_identifier()?;

        self.expect_peek(Token::Equal)?;
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;

        // Always required, even after a block
        self.expect_peek(Token::Semicolon)?;

        Ok(Statement::Let { name, value })
    }

    fn parse_return_statement(&mut self) -> ParseResult<Statement> {
        if self.function_depth == 0 {
            return Err(ParseError::ReturnOutsideFunction(self.current_token.span));
        }

        // Consume the `return` token
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.expect_statement_end()?;

        Ok(Statement::Return { value })
    }

    fn parse_expression_statement(&mut self) -> ParseResult<Statement> {
        let expression = self.parse_expression(Precedence::Lowest)?;
        self.expect_statement_end()?;

        Ok(Statement::Expression { expression })
    }

    /// Consume the `;` after an expression.
    ///
    /// It may be left out when the expression ended with `}`, or right before the `}`
    /// closing the block or the end of input.
    fn expect_statement_end(&mut self) -> ParseResult<()> {
        if self.peek_token_is(&Token::Semicolon) {
            self.next_token();
            return Ok(());
        }

        if self.current_token_is(&Token::RightBrace)
            || self.peek_token_is(&Token::RightBrace)
            || self.peek_token_is(&Token::Eof)
        {
            return Ok(());
        }

        Err(self.peek_error(Token::Semicolon.to_string()))
    }

    fn parse_expression(&mut self, precedence: Precedence) -> ParseResult<Expression> {
        let mut left = self.parse_prefix()?;

        while !self.peek_token_is(&Token::Semicolon) && precedence < self.peek_precedence() {
            self.next_token();
            left = self.parse_infix(left)?;
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> ParseResult<Expression> {
        let token = self.current_token.value.clone();

        match token {
            Token::Identifier(name) => Ok(Expression::Identifier(IdentifierLiteral::from(name))),
            Token::Integer(digits) => self.parse_integer_literal(&digits),
            Token::True => Ok(Expression::Boolean(true)),
            Token::False => Ok(Expression::Boolean(false)),
            Token::Bang => self.parse_prefix_expression(PrefixOperator::Not),
            Token::Minus => self.parse_prefix_expression(PrefixOperator::Negate),
            Token::LeftParen => self.parse_grouped_expression(),
            Token::If => self.parse_if_expression(),
            Token::Fn => self.parse_function_literal(),
            _ => Err(ParseError::Unexpected(self.current_token.clone())),
        }
    }

    fn parse_infix(&mut self, left: Expression) -> ParseResult<Expression> {
        if self.current_token_is(&Token::LeftParen) {
            return self.parse_call_expression(left);
        }

        match InfixOperator::from_token(&self.current_token.value) {
            Some(operator) => self.parse_infix_expression(left, operator),
            None => Err(ParseError::Unexpected(self.current_token.clone())),
        }
    }

    fn parse_integer_literal(&self, digits: &str) -> ParseResult<Expression> {
        digits
            .parse()
            .map(Expression::Integer)
            .map_err(|_| ParseError::InvalidInteger(self.current_token.clone()))
    }

    fn parse_prefix_expression(&mut self, operator: PrefixOperator) -> ParseResult<Expression> {
        // Consume the operator
        self.next_token();

        let right = self.parse_expression(Precedence::Prefix)?;

        Ok(Expression::Prefix(Box::new(PrefixExpression {
            operator,
            right,
        })))
    }

    fn parse_infix_expression(
        &mut self,
        left: Expression,
        operator: InfixOperator,
    ) -> ParseResult<Expression> {
        let precedence = self.current_precedence();
        self.next_token();

        let right = self.parse_expression(precedence)?;

        Ok(Expression::Infix(Box::new(InfixExpression {
            left,
            operator,
            right,
        })))
    }

    fn parse_grouped_expression(&mut self) -> ParseResult<Expression> {
        // Consume the `(`
        self.next_token();

        let expression = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(Token::RightParen)?;

        Ok(expression)
    }

    /// Parse `{ <statement>* }`, starting on the `{` and ending on the `}`.
    fn parse_block_expression(&mut self) -> ParseResult<BlockExpression> {
        let mut statements = Vec::new();
        self.next_token();

        while !self.current_token_is(&Token::RightBrace) {
            if self.current_token_is(&Token::Eof) {
                return Err(ParseError::Expected {
                    expected: Token::RightBrace.to_string(),
                    found: self.current_token.clone(),
                });
            }

            statements.push(self.parse_statement()?);
            self.next_token();
        }

        Ok(BlockExpression { statements })
    }

    fn parse_if_expression(&mut self) -> ParseResult<Expression> {
        // Consume the `if`
        self.next_token();

        let condition = self.parse_expression(Precedence::Lowest)?;

        self.expect_peek(Token::LeftBrace)?;
        let consequence = self.parse_block_expression()?;

        let alternative = if self.peek_token_is(&Token::Else) {
            self.next_token();

            if self.peek_token_is(&Token::If) {
                // else if chains nest without a block in between
                self.next_token();
                Some(self.parse_if_expression()?)
            } else {
                self.expect_peek(Token::LeftBrace)?;
                Some(Expression::Block(Box::new(self.parse_block_expression()?)))
            }
        } else {
            None
        };

        Ok(Expression::If(Box::new(IfExpression {
            condition,
            consequence,
            alternative,
        })))
    }

    fn parse_function_literal(&mut self) -> ParseResult<Expression> {
        self.expect_peek(Token::LeftParen)?;
        let parameters = self.parse_function_parameters()?;

        self.expect_peek(Token::LeftBrace)?;

        self.function_depth += 1;
        let body = self.parse_block_expression();
        self.function_depth -= 1;

        Ok(Expression::Function(Box::new(FunctionLiteral {
            parameters,
            body: Rc::new(body?),
        })))
    }

    fn parse_function_parameters(&mut self) -> ParseResult<Vec<IdentifierLiteral>> {
        let mut parameters = Vec::new();

        if self.peek_token_is(&Token::RightParen) {
            self.next_token();
            return Ok(parameters);
        }

        parameters.push(self.expect_peek_identifier()?);

        while self.peek_token_is(&Token::Comma) {
            self.next_token();
            parameters.push(self.expect_peek_identifier()?);
        }

        self.expect_peek(Token::RightParen)?;

        Ok(parameters)
    }

    fn parse_call_expression(&mut self, function: Expression) -> ParseResult<Expression> {
        let arguments = self.parse_call_arguments()?;

        Ok(Expression::Call(Box::new(CallExpression {
            function,
            arguments,
        })))
    }

    fn parse_call_arguments(&mut self) -> ParseResult<Vec<Expression>> {
        let mut arguments = Vec::new();

        if self.peek_token_is(&Token::RightParen) {
            self.next_token();
            return Ok(arguments);
        }

        self.next_token();
        arguments.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_token_is(&Token::Comma) {
            self.next_token();
            self.next_token();
            arguments.push(self.parse_expression(Precedence::Lowest)?);
        }

        self.expect_peek(Token::RightParen)?;

        Ok(arguments)
    }

    /// Skip the rest of a malformed statement that started at `start_depth`.
    ///
    /// Stops on the `;` ending it, on a `}` closing a block it opened (or an enclosing one),
    /// or at the end of input.
    fn synchronize(&mut self, start_depth: usize) {
        loop {
            match self.current_token.value {
                Token::Eof => return,
                Token::Semicolon if self.brace_depth <= start_depth => return,
                Token::RightBrace if self.brace_depth <= start_depth + 1 => {
                    if self.peek_token_is(&Token::Semicolon) {
                        self.next_token();
                    }
                    return;
                }
                _ => self.next_token(),
            }
        }
    }

    fn next_token(&mut self) {
        match self.current_token.value {
            Token::LeftBrace => self.brace_depth += 1,
            Token::RightBrace => self.brace_depth = self.brace_depth.saturating_sub(1),
            _ => {}
        }

        let next = self.lexer.next_token();
        self.current_token = std::mem::replace(&mut self.peek_token, next);
    }

    fn current_token_is(&self, token: &Token) -> bool {
        self.current_token.value.same_kind(token)
    }

    fn peek_token_is(&self, token: &Token) -> bool {
        self.peek_token.value.same_kind(token)
    }

    fn current_precedence(&self) -> Precedence {
        Precedence::of(&self.current_token.value)
    }

    fn peek_precedence(&self) -> Precedence {
        Precedence::of(&self.peek_token.value)
    }

    fn peek_error(&self, expected: String) -> ParseError {
        ParseError::Expected {
            expected,
            found: self.peek_token.clone(),
        }
    }

    fn expect_peek(&mut self, token: Token) -> ParseResult<()> {
        if self.peek_token_is(&token) {
            self.next_token();
            Ok(())
        } else {
            Err(self.peek_error(token.to_string()))
        }
    }

    fn expect_peek_identifier(&mut self) -> ParseResult<IdentifierLiteral> {
        let name = match &self.peek_token.value {
            Token::Identifier(name) => name.to_owned(),
            _ => return Err(self.peek_error(String::from("identifier"))),
        };

        self.next_token();
        Ok(IdentifierLiteral::from(name))
    }
}
