use std::{cell::RefCell, fmt::Display, rc::Rc};

use crate::{environment::Environment, error::RuntimeError};

use kiwi_parser::ast::{join, BlockExpression, IdentifierLiteral};

thread_local! {
    static TRUE: Rc<Object> = Rc::new(Object::Boolean(true));
    static FALSE: Rc<Object> = Rc::new(Object::Boolean(false));
    static NIL: Rc<Object> = Rc::new(Object::Nil);
}

#[derive(Debug, PartialEq)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    Nil,
    Function(Function),
    Error(RuntimeError),
}

impl Object {
    /// The shared `true` or `false` object.
    pub fn boolean(value: bool) -> Rc<Object> {
        if value {
            TRUE.with(Rc::clone)
        } else {
            FALSE.with(Rc::clone)
        }
    }

    /// The shared `nil` object.
    pub fn nil() -> Rc<Object> {
        NIL.with(Rc::clone)
    }

    pub fn typename(&self) -> &'static str {
        use Object::*;

        match self {
            Integer(_) => "integer",
            Boolean(_) => "boolean",
            Nil => "nil",
            Function(_) => "function",
            Error(_) => "error",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// `false`, `nil` and `0` are falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Object::Boolean(value) => *value,
            Object::Nil => false,
            Object::Integer(value) => *value != 0,
            Object::Function(_) | Object::Error(_) => true,
        }
    }
}

impl Display for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Object::*;

        match self {
            Integer(value) => write!(f, "{}", value),
            Boolean(value) => write!(f, "{}", value),
            Nil => write!(f, "nil"),
            Function(func) => write!(f, "{}", func),
            Error(error) => write!(f, "error: {}", error),
        }
    }
}

pub struct Function {
    pub parameters: Vec<IdentifierLiteral>,
    pub body: Rc<BlockExpression>,
    /// The environment the function was defined in (captured by reference)
    pub env: Rc<RefCell<Environment>>,
}

impl Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fn({}) {}", join(&self.parameters), self.body)
    }
}

// The captured environment usually holds the function itself, so it is left out.
impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field("parameters", &self.parameters)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Function {
    /// Functions are equal when they come from the same literal evaluated in the same scope.
    fn eq(&self, other: &Function) -> bool {
        Rc::ptr_eq(&self.body, &other.body) && Rc::ptr_eq(&self.env, &other.env)
    }
}
