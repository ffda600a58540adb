use crate::token::Token;
use std::{fmt::Display, rc::Rc};

#[derive(Debug, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new() -> Program {
        Program {
            statements: Vec::new(),
        }
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self
            .statements
            .iter()
            .map(|stmt| stmt.to_string())
            .collect::<Vec<String>>()
            .join("\n");

        write!(f, "{}", s)
    }
}

#[derive(Debug, PartialEq)]
pub enum Statement {
    Let {
        /// The name/identifier of the variable
        name: IdentifierLiteral,
        /// The value being assigned
        value: Expression,
    },
    Return {
        /// The value being returned
        value: Expression,
    },
    Expression {
        /// The expression for this statement
        expression: Expression,
    },
}

impl Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Statement::*;

        match self {
            Let { name, value } => write!(
                f,
                "{tok} {ident} = {val};",
                tok = Token::Let,
                ident = name,
                val = value
            ),
            Return { value } => write!(f, "{} {};", Token::Return, value),
            Expression { expression } => write!(f, "{};", expression),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Expression {
    // Literal
    Identifier(IdentifierLiteral),
    Integer(i64),
    Boolean(bool),

    // Complex
    Prefix(Box<PrefixExpression>),
    Infix(Box<InfixExpression>),
    Block(Box<BlockExpression>),
    If(Box<IfExpression>),
    Function(Box<FunctionLiteral>),
    Call(Box<CallExpression>),
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Expression::*;

        match self {
            Identifier(name) => write!(f, "{}", name),
            Integer(value) => write!(f, "{}", value),
            Boolean(value) => write!(f, "{}", value),

            Prefix(prefix) => write!(f, "{}", prefix),
            Infix(infix) => write!(f, "{}", infix),
            Block(block) => write!(f, "{}", block),
            If(if_exp) => write!(f, "{}", if_exp),
            Function(func) => write!(f, "{}", func),
            Call(call) => write!(f, "{}", call),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct IdentifierLiteral {
    pub name: String,
}

impl Display for IdentifierLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<&str> for IdentifierLiteral {
    fn from(name: &str) -> Self {
        Self {
            name: name.to_owned(),
        }
    }
}

impl From<String> for IdentifierLiteral {
    fn from(name: String) -> Self {
        Self { name }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum PrefixOperator {
    /// `-x`
    Negate,
    /// `!x`
    Not,
}

impl Display for PrefixOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrefixOperator::Negate => write!(f, "{}", Token::Minus),
            PrefixOperator::Not => write!(f, "{}", Token::Bang),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum InfixOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Equal,
    NotEqual,
    And,
    Or,
}

impl InfixOperator {
    /// Get the binary operator spelled by the given token, if any.
    /// `(` is an infix token for the parser but builds a call, not an InfixExpression.
    pub fn from_token(token: &Token) -> Option<InfixOperator> {
        use InfixOperator::*;

        match token {
            Token::Plus => Some(Add),
            Token::Minus => Some(Subtract),
            Token::Star => Some(Multiply),
            Token::Slash => Some(Divide),
            Token::LessThan => Some(Less),
            Token::GreaterThan => Some(Greater),
            Token::LessEqual => Some(LessEqual),
            Token::GreaterEqual => Some(GreaterEqual),
            Token::EqualEqual => Some(Equal),
            Token::BangEqual => Some(NotEqual),
            Token::And => Some(And),
            Token::Or => Some(Or),
            _ => None,
        }
    }

    pub fn token(&self) -> Token {
        use InfixOperator::*;

        match self {
            Add => Token::Plus,
            Subtract => Token::Minus,
            Multiply => Token::Star,
            Divide => Token::Slash,
            Less => Token::LessThan,
            Greater => Token::GreaterThan,
            LessEqual => Token::LessEqual,
            GreaterEqual => Token::GreaterEqual,
            Equal => Token::EqualEqual,
            NotEqual => Token::BangEqual,
            And => Token::And,
            Or => Token::Or,
        }
    }
}

impl Display for InfixOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

#[derive(Debug, PartialEq)]
pub struct PrefixExpression {
    pub operator: PrefixOperator,
    pub right: Expression,
}

impl Display for PrefixExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({op}{r})", op = self.operator, r = self.right)
    }
}

#[derive(Debug, PartialEq)]
pub struct InfixExpression {
    pub left: Expression,
    pub operator: InfixOperator,
    pub right: Expression,
}

impl Display for InfixExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({l} {op} {r})",
            l = self.left,
            op = self.operator,
            r = self.right
        )
    }
}

#[derive(Debug, PartialEq)]
pub struct BlockExpression {
    pub statements: Vec<Statement>,
}

impl Display for BlockExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{ ")?;
        for stmt in &self.statements {
            write!(f, "{} ", stmt)?;
        }
        write!(f, "}}")
    }
}

#[derive(Debug, PartialEq)]
pub struct IfExpression {
    pub condition: Expression,
    /// Block if condition is true
    pub consequence: BlockExpression,
    /// Expression (BlockExpression or IfExpression) if condition is false
    pub alternative: Option<Expression>,
}

impl Display for IfExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", Token::If, self.condition, self.consequence)?;

        if let Some(ref alt) = self.alternative {
            write!(f, " {} {}", Token::Else, alt)?;
        }

        Ok(())
    }
}

#[derive(Debug, PartialEq)]
pub struct FunctionLiteral {
    /// Parameter identifiers
    pub parameters: Vec<IdentifierLiteral>,
    /// Shared with every function object created from this literal
    pub body: Rc<BlockExpression>,
}

impl Display for FunctionLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}({}) {}",
            Token::Fn,
            join(&self.parameters),
            self.body
        )
    }
}

#[derive(Debug, PartialEq)]
pub struct CallExpression {
    pub function: Expression,
    pub arguments: Vec<Expression>,
}

impl Display for CallExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.function, join(&self.arguments))
    }
}

/// Comma-separate the printed form of each item.
pub fn join<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<String>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use crate::ast::{
        BlockExpression, CallExpression, Expression, FunctionLiteral, IdentifierLiteral,
        IfExpression, InfixExpression, InfixOperator, PrefixExpression, PrefixOperator, Program,
        Statement,
    };

    fn ident(name: &str) -> Expression {
        Expression::Identifier(IdentifierLiteral::from(name))
    }

    fn infix(left: Expression, operator: InfixOperator, right: Expression) -> Expression {
        Expression::Infix(Box::new(InfixExpression {
            left,
            operator,
            right,
        }))
    }

    #[test]
    fn test_display_program() {
        let program = Program {
            statements: vec![
                Statement::Let {
                    name: IdentifierLiteral::from("myVar"),
                    value: ident("anotherVar"),
                },
                Statement::Return {
                    value: Expression::Integer(5),
                },
            ],
        };

        assert_eq!(program.to_string(), "let myVar = anotherVar;\nreturn 5;")
    }

    #[test]
    fn test_display_operators() {
        let expr = infix(
            Expression::Prefix(Box::new(PrefixExpression {
                operator: PrefixOperator::Negate,
                right: ident("a"),
            })),
            InfixOperator::And,
            infix(
                Expression::Integer(1),
                InfixOperator::GreaterEqual,
                Expression::Prefix(Box::new(PrefixExpression {
                    operator: PrefixOperator::Not,
                    right: Expression::Boolean(true),
                })),
            ),
        );

        assert_eq!(expr.to_string(), "((-a) and (1 >= (!true)))");
    }

    #[test]
    fn test_display_if_function_call() {
        let body = BlockExpression {
            statements: vec![Statement::Expression {
                expression: infix(ident("x"), InfixOperator::Add, ident("y")),
            }],
        };
        let func = Expression::Function(Box::new(FunctionLiteral {
            parameters: vec![IdentifierLiteral::from("x"), IdentifierLiteral::from("y")],
            body: Rc::new(body),
        }));
        let call = Expression::Call(Box::new(CallExpression {
            function: func,
            arguments: vec![Expression::Integer(1), Expression::Integer(2)],
        }));
        assert_eq!(call.to_string(), "fn(x, y) { (x + y); }(1, 2)");

        let if_expr = Expression::If(Box::new(IfExpression {
            condition: ident("ok"),
            consequence: BlockExpression { statements: vec![] },
            alternative: Some(Expression::Block(Box::new(BlockExpression {
                statements: vec![Statement::Expression {
                    expression: Expression::Integer(0),
                }],
            }))),
        }));
        assert_eq!(if_expr.to_string(), "if ok { } else { 0; }");
    }

    #[test]
    fn infix_operator_token_mapping() {
        use crate::token::Token;

        for token in [
            Token::Plus,
            Token::Minus,
            Token::Star,
            Token::Slash,
            Token::LessThan,
            Token::GreaterThan,
            Token::LessEqual,
            Token::GreaterEqual,
            Token::EqualEqual,
            Token::BangEqual,
            Token::And,
            Token::Or,
        ] {
            let operator = InfixOperator::from_token(&token).unwrap();
            assert_eq!(operator.token(), token);
        }

        assert_eq!(InfixOperator::from_token(&Token::LeftParen), None);
        assert_eq!(InfixOperator::from_token(&Token::Equal), None);
    }
}
