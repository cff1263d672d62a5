use super::base_types::{ExprNode as N, *};
use crate::error::{Error, Result};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};
use std::rc::Rc;

/// A symbolic scalar expression. Immutable: every operation builds a new
/// expression, sharing the subexpressions it was made from
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Expr {
    pub(super) rc: Rc<Node>,
}

impl std::fmt::Debug for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

/// Create an [`Expr`] that is just a free variable
pub fn sym(name: &str) -> Expr {
    Expr::symbol(&Symbol::new(name))
}

/// Apply an undefined function, eg. `function("f", vec![sym("r")])` is `f(r)`
pub fn function(name: &str, args: Vec<Expr>) -> Expr {
    let f = Function::undefined(name, args.len());
    Expr::new(N::Apply(f, args))
}

impl Expr {
    pub(crate) fn new(node: Node) -> Self {
        Expr { rc: Rc::new(node) }
    }

    /// The operation performed at the root of this expression
    pub fn node(&self) -> &ExprNode<Expr> {
        &self.rc
    }

    pub fn number(q: BigRational) -> Self {
        Expr::new(N::Number(q))
    }

    pub fn integer(n: i64) -> Self {
        Expr::number(BigRational::from_integer(BigInt::from(n)))
    }

    /// The exact fraction `n / d`
    ///
    /// # Panics
    ///
    /// If `d` is zero. Dividing expressions by zero is reported as
    /// [`Error::DivisionByZero`] when they are simplified instead
    pub fn rational(n: i64, d: i64) -> Self {
        Expr::number(BigRational::new(BigInt::from(n), BigInt::from(d)))
    }

    pub fn zero() -> Self {
        Expr::number(BigRational::zero())
    }

    pub fn one() -> Self {
        Expr::number(BigRational::one())
    }

    /// The exact rational value of a float
    pub fn from_f64(x: f64) -> Result<Self> {
        BigRational::from_float(x)
            .map(Expr::number)
            .ok_or(Error::NotANumber { value: x })
    }

    pub fn symbol(s: &Symbol) -> Self {
        Expr::new(N::Symbol(s.clone()))
    }

    pub fn apply(f: Function, args: Vec<Expr>) -> Self {
        Expr::new(N::Apply(f, args))
    }

    /// Whether this is literally the number zero. This is a structural test:
    /// call [`Expr::simplify`] first to test whether an expression vanishes
    pub fn is_zero(&self) -> bool {
        matches!(self.node(), N::Number(q) if q.is_zero())
    }

    /// Whether this is literally the number one
    pub fn is_one(&self) -> bool {
        matches!(self.node(), N::Number(q) if q.is_one())
    }

    pub fn as_number(&self) -> Option<&BigRational> {
        match self.node() {
            N::Number(q) => Some(q),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self.node() {
            N::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Integer power
    pub fn pow(&self, n: i64) -> Self {
        match (self.node(), n) {
            (_, 0) => Expr::one(),
            (_, 1) => self.clone(),
            (N::Number(q), _) if !q.is_zero() => Expr::number(rational_pow(q, n)),
            (N::Power(base, k), _) => Expr::new(N::Power(base.clone(), k * n)),
            _ => Expr::new(N::Power(self.clone(), n)),
        }
    }

    /// Sum of all the expressions, folding numbers and dropping zeros
    pub fn sum(terms: impl IntoIterator<Item = Expr>) -> Self {
        let mut constant = BigRational::zero();
        let mut rest = Vec::new();
        for t in terms {
            match t.node() {
                N::Number(q) => constant += q,
                N::Sum(ts) => {
                    for u in ts {
                        match u.node() {
                            N::Number(q) => constant += q,
                            _ => rest.push(u.clone()),
                        }
                    }
                }
                _ => rest.push(t),
            }
        }
        if !constant.is_zero() {
            rest.push(Expr::number(constant));
        }
        match rest.len() {
            0 => Expr::zero(),
            1 => rest.swap_remove(0),
            _ => Expr::new(N::Sum(rest)),
        }
    }

    /// Product of all the expressions, folding numbers and absorbing zeros
    pub fn product(factors: impl IntoIterator<Item = Expr>) -> Self {
        let mut constant = BigRational::one();
        let mut rest = Vec::new();
        for f in factors {
            match f.node() {
                N::Number(q) => constant *= q,
                N::Product(fs) => {
                    for g in fs {
                        match g.node() {
                            N::Number(q) => constant *= q,
                            _ => rest.push(g.clone()),
                        }
                    }
                }
                _ => rest.push(f),
            }
        }
        if constant.is_zero() {
            return Expr::zero();
        }
        if !constant.is_one() || rest.is_empty() {
            rest.insert(0, Expr::number(constant));
        }
        match rest.len() {
            1 => rest.swap_remove(0),
            _ => Expr::new(N::Product(rest)),
        }
    }

    fn add_expr(&self, rhs: &Expr) -> Expr {
        Expr::sum([self.clone(), rhs.clone()])
    }

    fn sub_expr(&self, rhs: &Expr) -> Expr {
        Expr::sum([self.clone(), rhs.neg_expr()])
    }

    fn mul_expr(&self, rhs: &Expr) -> Expr {
        Expr::product([self.clone(), rhs.clone()])
    }

    fn div_expr(&self, rhs: &Expr) -> Expr {
        Expr::product([self.clone(), rhs.pow(-1)])
    }

    fn neg_expr(&self) -> Expr {
        match self.node() {
            N::Number(q) => Expr::number(-q),
            _ => Expr::product([Expr::integer(-1), self.clone()]),
        }
    }

    pub fn sin(&self) -> Self {
        Expr::apply(Function::Sin, vec![self.clone()])
    }

    pub fn cos(&self) -> Self {
        Expr::apply(Function::Cos, vec![self.clone()])
    }

    pub fn exp(&self) -> Self {
        Expr::apply(Function::Exp, vec![self.clone()])
    }

    pub fn ln(&self) -> Self {
        Expr::apply(Function::Ln, vec![self.clone()])
    }

    pub fn sqrt(&self) -> Self {
        Expr::apply(Function::Sqrt, vec![self.clone()])
    }
}

/// `q^n`. `q` must not be zero when `n` is negative
pub(crate) fn rational_pow(q: &BigRational, n: i64) -> BigRational {
    let mut base = if n < 0 { q.recip() } else { q.clone() };
    let mut k = n.unsigned_abs();
    let mut acc = BigRational::one();
    while k > 0 {
        if k & 1 == 1 {
            acc *= &base;
        }
        base = &base * &base;
        k >>= 1;
    }
    acc
}

impl From<i64> for Expr {
    #[inline]
    fn from(n: i64) -> Expr {
        Expr::integer(n)
    }
}

impl From<&Symbol> for Expr {
    #[inline]
    fn from(s: &Symbol) -> Expr {
        Expr::symbol(s)
    }
}

impl From<BigRational> for Expr {
    #[inline]
    fn from(q: BigRational) -> Expr {
        Expr::number(q)
    }
}

macro_rules! expr_binary_ops {
    ($($doc:literal $trait:ident $method:ident $impl_fn:ident),*) => {
        $(
        #[doc=$doc]
        impl std::ops::$trait<Expr> for Expr {
            type Output = Expr;
            #[inline]
            fn $method(self, rhs: Expr) -> Expr {
                self.$impl_fn(&rhs)
            }
        }
        impl std::ops::$trait<&Expr> for Expr {
            type Output = Expr;
            #[inline]
            fn $method(self, rhs: &Expr) -> Expr {
                self.$impl_fn(rhs)
            }
        }
        impl std::ops::$trait<Expr> for &Expr {
            type Output = Expr;
            #[inline]
            fn $method(self, rhs: Expr) -> Expr {
                self.$impl_fn(&rhs)
            }
        }
        impl std::ops::$trait<&Expr> for &Expr {
            type Output = Expr;
            #[inline]
            fn $method(self, rhs: &Expr) -> Expr {
                self.$impl_fn(rhs)
            }
        }
        impl std::ops::$trait<i64> for Expr {
            type Output = Expr;
            #[inline]
            fn $method(self, rhs: i64) -> Expr {
                self.$impl_fn(&Expr::integer(rhs))
            }
        }
        impl std::ops::$trait<i64> for &Expr {
            type Output = Expr;
            #[inline]
            fn $method(self, rhs: i64) -> Expr {
                self.$impl_fn(&Expr::integer(rhs))
            }
        }
        impl std::ops::$trait<Expr> for i64 {
            type Output = Expr;
            #[inline]
            fn $method(self, rhs: Expr) -> Expr {
                Expr::integer(self).$impl_fn(&rhs)
            }
        }
        impl std::ops::$trait<&Expr> for i64 {
            type Output = Expr;
            #[inline]
            fn $method(self, rhs: &Expr) -> Expr {
                Expr::integer(self).$impl_fn(rhs)
            }
        }
        )*
    };
}
expr_binary_ops! {
    "Addition" Add add add_expr,
    "Subtraction" Sub sub sub_expr,
    "Multiplication" Mul mul mul_expr,
    "Division. Dividing by zero is only detected when simplifying" Div div div_expr
}

impl std::ops::Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        self.neg_expr()
    }
}

impl std::ops::Neg for &Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        self.neg_expr()
    }
}

impl std::iter::Sum for Expr {
    fn sum<I: Iterator<Item = Expr>>(iter: I) -> Expr {
        Expr::sum(iter)
    }
}

impl std::iter::Product for Expr {
    fn product<I: Iterator<Item = Expr>>(iter: I) -> Expr {
        Expr::product(iter)
    }
}
