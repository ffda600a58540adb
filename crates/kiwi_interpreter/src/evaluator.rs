use std::{cell::RefCell, rc::Rc};

use tracing::{debug, trace};

use crate::{
    environment::Environment,
    error::RuntimeError,
    object::{Function, Object},
};

use kiwi_parser::ast::{
    BlockExpression, Expression, IdentifierLiteral, IfExpression, InfixOperator, PrefixOperator,
    Program, Statement,
};

/// Anything that stops the normal statement-by-statement walk.
#[derive(Debug)]
enum Interrupt {
    /// A `return` travelling up to the nearest function call (or the program)
    Return(Rc<Object>),
    Error(RuntimeError),
}

impl From<RuntimeError> for Interrupt {
    fn from(error: RuntimeError) -> Self {
        Interrupt::Error(error)
    }
}

type EvalResult = Result<Rc<Object>, Interrupt>;

pub struct Evaluator {
    env: Rc<RefCell<Environment>>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::new_with_env(Rc::new(RefCell::new(Environment::new())))
    }

    /// Evaluate against an existing environment, e.g. one kept alive across REPL lines.
    pub fn new_with_env(env: Rc<RefCell<Environment>>) -> Self {
        Evaluator { env }
    }

    pub fn eval(&mut self, prog: &Program) -> Rc<Object> {
        let mut result = Object::nil();

        for stmt in &prog.statements {
            match self.eval_statement(stmt) {
                Ok(val) => result = val,
                // Unwrap the return value into a final value and stop evaluating statements
                Err(Interrupt::Return(val)) => return val,
                Err(Interrupt::Error(error)) => {
                    debug!(%error, "evaluation failed");
                    return Rc::new(Object::Error(error));
                }
            }
        }

        result
    }

    // Similar to eval (for programs) but leaves return values to the caller
    fn eval_block_expression(&mut self, block: &BlockExpression) -> EvalResult {
        let mut result = Object::nil();

        for stmt in &block.statements {
            result = self.eval_statement(stmt)?;
        }

        Ok(result)
    }

    fn eval_statement(&mut self, stmt: &Statement) -> EvalResult {
        match stmt {
            Statement::Expression { expression } => self.eval_expression(expression),
            Statement::Return { value } => {
                let obj = self.eval_expression(value)?;
                Err(Interrupt::Return(obj))
            }
            Statement::Let { name, value } => {
                let obj = self.eval_expression(value)?;

                // Functions can always refer to themselves by the name they are bound to,
                // wherever they were created
                if let Object::Function(func) = obj.as_ref() {
                    func.env
                        .borrow_mut()
                        .set(name.name.clone(), Rc::clone(&obj));
                }

                self.env.borrow_mut().set(name.name.clone(), obj);

                Ok(Object::nil())
            }
        }
    }

    fn eval_expression(&mut self, expr: &Expression) -> EvalResult {
        match expr {
            Expression::Integer(value) => Ok(Rc::new(Object::Integer(*value))),
            Expression::Boolean(value) => Ok(Object::boolean(*value)),
            Expression::Identifier(identifier) => self.eval_identifier_expression(identifier),

            Expression::Prefix(prefix) => {
                let right = self.eval_expression(&prefix.right)?;
                eval_prefix_expression(prefix.operator, right)
            }
            Expression::Infix(infix) => {
                let left = self.eval_expression(&infix.left)?;

                if let Some(decided) = short_circuit(infix.operator, &left) {
                    trace!(operator = %infix.operator, "short circuit");
                    return Ok(decided);
                }

                let right = self.eval_expression(&infix.right)?;
                eval_infix_expression(infix.operator, left, right)
            }

            Expression::Block(block) => self.eval_block_expression(block),
            Expression::If(if_expr) => self.eval_if_expression(if_expr),

            Expression::Function(func) => Ok(Rc::new(Object::Function(Function {
                parameters: func.parameters.clone(),
                body: Rc::clone(&func.body),
                env: Rc::clone(&self.env),
            }))),
            Expression::Call(call) => {
                let func = self.eval_expression(&call.function)?;
                let args = self.eval_expressions(&call.arguments)?;

                self.apply_function(func, args)
            }
        }
    }

    fn eval_expressions(&mut self, exprs: &[Expression]) -> Result<Vec<Rc<Object>>, Interrupt> {
        exprs
            .iter()
            .map(|expr| self.eval_expression(expr))
            .collect()
    }

    fn eval_identifier_expression(&self, identifier: &IdentifierLiteral) -> EvalResult {
        match self.env.borrow().get(&identifier.name) {
            Some(obj) => Ok(obj),
            None => Err(RuntimeError::IdentifierNotFound(identifier.name.clone()).into()),
        }
    }

    fn eval_if_expression(&mut self, if_expr: &IfExpression) -> EvalResult {
        let condition = self.eval_expression(&if_expr.condition)?;

        if condition.is_truthy() {
            self.eval_block_expression(&if_expr.consequence)
        } else if let Some(alternative) = &if_expr.alternative {
            self.eval_expression(alternative)
        } else {
            Ok(Object::nil())
        }
    }

    fn apply_function(&mut self, func: Rc<Object>, args: Vec<Rc<Object>>) -> EvalResult {
        let function = match func.as_ref() {
            Object::Function(function) => function,
            _ => return Err(RuntimeError::NotAFunction(Rc::clone(&func)).into()),
        };

        // Check that number of args & params matches
        if args.len() != function.parameters.len() {
            return Err(RuntimeError::BadArity {
                expected: function.parameters.len(),
                got: args.len(),
            }
            .into());
        }

        // Create a new scoped environment for the call, enclosed by the captured one
        let mut scoped_env = Environment::new_enclosed(Rc::clone(&function.env));
        for (ident, obj) in function.parameters.iter().zip(args) {
            scoped_env.set(ident.name.clone(), obj);
        }

        trace!(%function, depth = scoped_env.depth(), "call");

        // Remember current environment (when exiting from call)
        let current_env = std::mem::replace(&mut self.env, Rc::new(RefCell::new(scoped_env)));
        let result = self.eval_block_expression(&function.body);
        self.env = current_env;

        match result {
            // The return stops at the call boundary
            Err(Interrupt::Return(val)) => Ok(val),
            other => other,
        }
    }
}

/// The result of `and`/`or` when the left operand alone decides it.
fn short_circuit(operator: InfixOperator, left: &Object) -> Option<Rc<Object>> {
    if !matches!(left, Object::Integer(_) | Object::Boolean(_)) {
        return None;
    }

    match operator {
        InfixOperator::And if !left.is_truthy() => Some(Object::boolean(false)),
        InfixOperator::Or if left.is_truthy() => Some(Object::boolean(true)),
        _ => None,
    }
}

fn eval_prefix_expression(operator: PrefixOperator, right: Rc<Object>) -> EvalResult {
    match operator {
        PrefixOperator::Not => Ok(Object::boolean(!right.is_truthy())),
        PrefixOperator::Negate => match *right {
            Object::Integer(value) => value
                .checked_neg()
                .map(|negated| Rc::new(Object::Integer(negated)))
                .ok_or(Interrupt::Error(RuntimeError::IntegerOverflow)),
            _ => Err(RuntimeError::InvalidPrefixOperandType {
                operator,
                operand: right.typename(),
            }
            .into()),
        },
    }
}

fn eval_infix_expression(operator: InfixOperator, left: Rc<Object>, right: Rc<Object>) -> EvalResult {
    match (left.as_ref(), right.as_ref()) {
        (Object::Integer(left_value), Object::Integer(right_value)) => {
            eval_integer_infix_expression(operator, *left_value, *right_value)
        }
        (Object::Boolean(left_value), Object::Boolean(right_value)) => {
            eval_boolean_infix_expression(operator, *left_value, *right_value)
        }
        (_, _) => Err(RuntimeError::TypeMismatch {
            operator,
            left: left.typename(),
            right: right.typename(),
        }
        .into()),
    }
}

fn eval_integer_infix_expression(
    operator: InfixOperator,
    left_value: i64,
    right_value: i64,
) -> EvalResult {
    use InfixOperator::*;

    let arithmetic = match operator {
        Add => left_value.checked_add(right_value),
        Subtract => left_value.checked_sub(right_value),
        Multiply => left_value.checked_mul(right_value),
        Divide => {
            if right_value == 0 {
                return Err(RuntimeError::DivisionByZero.into());
            }
            left_value.checked_div(right_value)
        }

        Less => return Ok(Object::boolean(left_value < right_value)),
        Greater => return Ok(Object::boolean(left_value > right_value)),
        LessEqual => return Ok(Object::boolean(left_value <= right_value)),
        GreaterEqual => return Ok(Object::boolean(left_value >= right_value)),
        Equal => return Ok(Object::boolean(left_value == right_value)),
        NotEqual => return Ok(Object::boolean(left_value != right_value)),

        // NOTE: Integers take part in logic through their truthiness
        And => return Ok(Object::boolean(left_value != 0 && right_value != 0)),
        Or => return Ok(Object::boolean(left_value != 0 || right_value != 0)),
    };

    match arithmetic {
        Some(value) => Ok(Rc::new(Object::Integer(value))),
        None => Err(RuntimeError::IntegerOverflow.into()),
    }
}

fn eval_boolean_infix_expression(
    operator: InfixOperator,
    left_value: bool,
    right_value: bool,
) -> EvalResult {
    match operator {
        InfixOperator::Equal => Ok(Object::boolean(left_value == right_value)),
        InfixOperator::NotEqual => Ok(Object::boolean(left_value != right_value)),
        InfixOperator::And => Ok(Object::boolean(left_value && right_value)),
        InfixOperator::Or => Ok(Object::boolean(left_value || right_value)),
        operator => Err(RuntimeError::UnsupportedBooleanOperator(operator).into()),
    }
}
