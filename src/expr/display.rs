use super::{
    base_types::{ExprNode as N, *},
    Expr,
};
use num_traits::{One, Signed};
use std::fmt::{self, Display, Formatter};

/// Binding strength of the root of an expression, to know when it needs
/// parentheses
fn precedence(e: &Expr) -> u8 {
    match e.node() {
        N::Sum(_) => 0,
        N::Product(_) => 1,
        N::Number(q) if q.is_negative() || !q.denom().is_one() => 1,
        N::Power(..) => 2,
        _ => 3,
    }
}

fn write_operand(f: &mut Formatter<'_>, e: &Expr, min_precedence: u8) -> fmt::Result {
    if precedence(e) < min_precedence {
        write!(f, "({e})")
    } else {
        write!(f, "{e}")
    }
}

/// The term without its sign, if it is a product with a negative coefficient
fn negated_term(e: &Expr) -> Option<Expr> {
    match e.node() {
        N::Product(fs) => match fs.first().map(|c| c.node()) {
            Some(N::Number(q)) if q.is_negative() => Some(Expr::product(
                std::iter::once(Expr::number(-q)).chain(fs[1..].iter().cloned()),
            )),
            _ => None,
        },
        N::Number(q) if q.is_negative() => Some(Expr::number(-q)),
        _ => None,
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Function::Undefined { name, derivatives } => match derivatives.as_slice() {
                [k] => write!(f, "{name}{}", "'".repeat(*k as usize)),
                ds if ds.iter().all(|k| *k == 0) => write!(f, "{name}"),
                ds => write!(f, "D{ds:?}{name}"),
            },
            _ => f.write_str(self.name()),
        }
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.node() {
            N::Number(q) => write!(f, "{q}"),
            N::Symbol(s) => write!(f, "{s}"),
            N::Sum(ts) => {
                for (i, t) in ts.iter().enumerate() {
                    match (i, negated_term(t)) {
                        (0, None) => write_operand(f, t, 1)?,
                        (0, Some(u)) => {
                            f.write_str("-")?;
                            write_operand(f, &u, 1)?
                        }
                        (_, None) => {
                            f.write_str(" + ")?;
                            write_operand(f, t, 1)?
                        }
                        (_, Some(u)) => {
                            f.write_str(" - ")?;
                            write_operand(f, &u, 1)?
                        }
                    }
                }
                Ok(())
            }
            N::Product(fs) => {
                for (i, g) in fs.iter().enumerate() {
                    if i > 0 {
                        f.write_str("*")?;
                    }
                    write_operand(f, g, 2)?;
                }
                Ok(())
            }
            N::Power(b, n) => {
                write_operand(f, b, 3)?;
                if *n < 0 {
                    write!(f, "^({n})")
                } else {
                    write!(f, "^{n}")
                }
            }
            N::Apply(g, args) => {
                write!(f, "{g}(")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{a}")?;
                }
                f.write_str(")")
            }
        }
    }
}
