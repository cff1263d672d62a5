use super::{
    base_types::{ExprNode as N, *},
    stats, Expr,
};

impl Expr {
    /// Partial derivative with respect to a symbol. The result is not
    /// simplified
    pub fn differentiate(&self, s: &Symbol) -> Expr {
        stats::count_differentiate();
        self.diff(s)
    }

    fn diff(&self, s: &Symbol) -> Expr {
        match self.node() {
            N::Number(_) => Expr::zero(),
            N::Symbol(t) if t == s => Expr::one(),
            N::Symbol(_) => Expr::zero(),
            N::Sum(ts) => Expr::sum(ts.iter().map(|t| t.diff(s))),
            N::Product(fs) => Expr::sum((0..fs.len()).map(|i| {
                let di = fs[i].diff(s);
                if di.is_zero() {
                    return di;
                }
                Expr::product(
                    fs.iter()
                        .enumerate()
                        .map(|(j, f)| if i == j { di.clone() } else { f.clone() }),
                )
            })),
            N::Power(b, n) => {
                let db = b.diff(s);
                if db.is_zero() {
                    return db;
                }
                Expr::product([Expr::integer(*n), b.pow(n - 1), db])
            }
            N::Apply(f, args) => Expr::sum(args.iter().enumerate().map(|(k, u)| {
                let du = u.diff(s);
                if du.is_zero() {
                    return du;
                }
                outer_derivative(f, args, k) * du
            })),
        }
    }
}

/// Derivative of `f(args)` with respect to its `k`-th argument
fn outer_derivative(f: &Function, args: &[Expr], k: usize) -> Expr {
    let u = &args[k];
    match f {
        Function::Sin => u.cos(),
        Function::Cos => -u.sin(),
        Function::Exp => u.exp(),
        Function::Ln => u.pow(-1),
        Function::Sqrt => Expr::product([Expr::rational(1, 2), u.sqrt().pow(-1)]),
        Function::Undefined { .. } => match f.partial(k) {
            Some(df) => Expr::apply(df, args.to_vec()),
            None => Expr::zero(),
        },
    }
}

#[cfg(test)]
mod tests {
    use crate::expr::*;

    fn d(e: &Expr, s: &str) -> Expr {
        e.differentiate(&Symbol::new(s)).simplify().unwrap()
    }

    fn same(a: &Expr, b: &Expr) -> bool {
        (a - b).simplify().unwrap().is_zero()
    }

    #[test]
    fn polynomial() {
        let x = sym("x");
        let e = x.pow(3) + 2 * x.clone() * sym("y");
        assert!(same(&d(&e, "x"), &(3 * x.pow(2) + 2 * sym("y"))));
        assert!(same(&d(&e, "y"), &(2 * x)));
        assert!(d(&e, "z").is_zero());
    }

    #[test]
    fn quotient() {
        let r = sym("r");
        let e = Expr::one() / (r.clone() - 2 * sym("M"));
        let expected = -(r - 2 * sym("M")).pow(-2);
        assert!(same(&d(&e, "r"), &expected));
    }

    #[test]
    fn chain_rule() {
        let th = sym("theta");
        let e = th.sin().pow(2);
        assert!(same(&d(&e, "theta"), &(2 * th.sin() * th.cos())));
        let e = (2 * th.clone()).exp();
        assert!(same(&d(&e, "theta"), &(2 * (2 * th).exp())));
    }

    #[test]
    fn undefined_function() {
        let r = sym("r");
        let f = function("f", vec![r.clone()]);
        let df = d(&f, "r");
        match df.node() {
            ExprNode::Apply(Function::Undefined { name, derivatives }, _) => {
                assert_eq!(&**name, "f");
                assert_eq!(derivatives, &vec![1]);
            }
            n => panic!("expected f'(r), got {n:?}"),
        }
        assert_ne!(d(&df, "r"), df);
        assert!(d(&f, "t").is_zero());
    }

    #[test]
    fn counted_once_per_call() {
        let before = stats::snapshot();
        let _ = (sym("x").pow(4) * sym("x").sin()).differentiate(&Symbol::new("x"));
        assert_eq!(stats::snapshot().since(&before).differentiate, 1);
    }
}
