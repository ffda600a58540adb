use std::rc::Rc;

use thiserror::Error;

use crate::object::Object;
use kiwi_parser::ast::{InfixOperator, PrefixOperator};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// When referencing an identifier that has not been bound in any enclosing scope
    #[error("identifier not found: {0}")]
    IdentifierNotFound(String),
    /// When an object that is not a function is used with function call syntax
    #[error("{0} is not a function")]
    NotAFunction(Rc<Object>),
    /// When a call's argument length does not match the function's parameter length
    #[error("wrong number of arguments: expected {expected}, got {got}")]
    BadArity { expected: usize, got: usize },
    /// When an infix operation has operands of kinds that do not combine (e.g. `5 + true`)
    #[error("type mismatch for \"{operator}\", found {left} and {right}")]
    TypeMismatch {
        operator: InfixOperator,
        left: &'static str,
        right: &'static str,
    },
    /// When booleans meet an arithmetic or ordering operator (e.g. `true < false`)
    #[error("unsupported operator for booleans")]
    UnsupportedBooleanOperator(InfixOperator),
    /// When attempting a prefix operation on an invalid type (e.g. `-true`)
    #[error("unsupported operand for \"{operator}\", found {operand}")]
    InvalidPrefixOperandType {
        operator: PrefixOperator,
        operand: &'static str,
    },
    #[error("division by zero")]
    DivisionByZero,
    /// When integer arithmetic leaves the 64-bit range
    #[error("integer overflow")]
    IntegerOverflow,
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use crate::error::RuntimeError;
    use crate::object::Object;
    use kiwi_parser::ast::{InfixOperator, PrefixOperator};

    #[test]
    fn messages() {
        let tests = vec![
            (
                RuntimeError::IdentifierNotFound("foobar".into()),
                "identifier not found: foobar",
            ),
            (
                RuntimeError::NotAFunction(Rc::new(Object::Integer(5))),
                "5 is not a function",
            ),
            (
                RuntimeError::BadArity {
                    expected: 2,
                    got: 1,
                },
                "wrong number of arguments: expected 2, got 1",
            ),
            (
                RuntimeError::TypeMismatch {
                    operator: InfixOperator::Add,
                    left: "integer",
                    right: "boolean",
                },
                "type mismatch for \"+\", found integer and boolean",
            ),
            (
                RuntimeError::UnsupportedBooleanOperator(InfixOperator::Less),
                "unsupported operator for booleans",
            ),
            (
                RuntimeError::InvalidPrefixOperandType {
                    operator: PrefixOperator::Negate,
                    operand: "boolean",
                },
                "unsupported operand for \"-\", found boolean",
            ),
            (RuntimeError::DivisionByZero, "division by zero"),
        ];

        for (error, expected) in tests {
            assert_eq!(error.to_string(), expected);
        }
    }
}
