use super::Expr;
use num_rational::BigRational;
use std::{fmt::Debug, rc::Rc};

/// A named symbolic variable. Two symbols are the same variable iff they have
/// the same name
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(Rc<str>);

impl Symbol {
    pub fn new(name: &str) -> Self {
        Symbol(Rc::from(name))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Debug for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol::new(name)
    }
}

/// The functions an expression can apply to its arguments
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Function {
    Sin,
    Cos,
    Exp,
    Ln,
    Sqrt,
    /// A function nothing is known about except its name, like `f(r)` in a
    /// generic static metric. `derivatives[k]` counts how many times it has
    /// been differentiated with respect to its `k`-th argument
    Undefined {
        name: Rc<str>,
        derivatives: Vec<u32>,
    },
}

impl Function {
    pub fn undefined(name: &str, arity: usize) -> Self {
        Function::Undefined {
            name: Rc::from(name),
            derivatives: vec![0; arity],
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Exp => "exp",
            Function::Ln => "ln",
            Function::Sqrt => "sqrt",
            Function::Undefined { name, .. } => name,
        }
    }

    /// The partial derivative of an undefined function with respect to its
    /// `k`-th argument. `None` for elementary functions, which are
    /// differentiated by their own rules
    pub(crate) fn partial(&self, k: usize) -> Option<Self> {
        match self {
            Function::Undefined { name, derivatives } => {
                let mut derivatives = derivatives.clone();
                derivatives[k] += 1;
                Some(Function::Undefined {
                    name: Rc::clone(name),
                    derivatives,
                })
            }
            _ => None,
        }
    }
}

/// The abstract syntax tree nodes of a symbolic scalar expression. `E` is the
/// boxed type itself containing an `ExprNode`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExprNode<E> {
    /// An exact rational constant
    Number(BigRational),
    /// A free variable
    Symbol(Symbol),
    /// Sum of all the terms
    Sum(Vec<E>),
    /// Product of all the factors
    Product(Vec<E>),
    /// Integer power. A negative exponent denotes division
    Power(E, i64),
    /// Function application
    Apply(Function, Vec<E>),
}

pub(crate) type Node = ExprNode<Expr>;
