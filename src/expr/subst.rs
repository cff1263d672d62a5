use super::{
    base_types::{ExprNode as N, *},
    Expr,
};
use std::collections::{BTreeMap, BTreeSet};

impl Expr {
    /// Replace every occurrence of symbol `s` by `value`
    pub fn substitute(&self, s: &Symbol, value: &Expr) -> Expr {
        self.map_symbols(&|t| (t == s).then(|| value.clone()))
    }

    /// Replace every symbol in `values` by its value, all at once
    pub fn substitute_all(&self, values: &BTreeMap<Symbol, Expr>) -> Expr {
        if values.is_empty() {
            return self.clone();
        }
        self.map_symbols(&|t| values.get(t).cloned())
    }

    /// Rebuild the expression, replacing the symbols for which `f` returns a
    /// value. Subexpressions that do not change are shared, not copied
    fn map_symbols(&self, f: &impl Fn(&Symbol) -> Option<Expr>) -> Expr {
        match self.node() {
            N::Number(_) => self.clone(),
            N::Symbol(s) => f(s).unwrap_or_else(|| self.clone()),
            N::Sum(ts) => Expr::sum(ts.iter().map(|t| t.map_symbols(f))),
            N::Product(fs) => Expr::product(fs.iter().map(|g| g.map_symbols(f))),
            N::Power(b, n) => b.map_symbols(f).pow(*n),
            N::Apply(g, args) => {
                Expr::apply(g.clone(), args.iter().map(|a| a.map_symbols(f)).collect())
            }
        }
    }

    /// All the symbols appearing in the expression
    pub fn free_symbols(&self) -> BTreeSet<Symbol> {
        let mut acc = BTreeSet::new();
        self.collect_symbols(&mut acc);
        acc
    }

    fn collect_symbols(&self, acc: &mut BTreeSet<Symbol>) {
        match self.node() {
            N::Number(_) => {}
            N::Symbol(s) => {
                acc.insert(s.clone());
            }
            N::Sum(es) | N::Product(es) | N::Apply(_, es) => {
                es.iter().for_each(|e| e.collect_symbols(acc))
            }
            N::Power(b, _) => b.collect_symbols(acc),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::expr::*;
    use crate::test_macros::*;

    simple_eqs! {
        folds_numbers: (sym("x") * sym("y") + 1).substitute(&Symbol::new("x"), &Expr::zero()) => Expr::one(),
        inside_functions: sym("t").sin().substitute(&Symbol::new("t"), &sym("u")) => sym("u").sin(),
        untouched: sym("a").pow(2).substitute(&Symbol::new("b"), &Expr::one()) => sym("a").pow(2)
    }

    #[test]
    fn simultaneous() {
        let e = sym("x") - sym("y");
        let values = [
            (Symbol::new("x"), sym("y")),
            (Symbol::new("y"), sym("x")),
        ]
        .into_iter()
        .collect();
        assert_eq!(e.substitute_all(&values), sym("y") - sym("x"));
    }

    #[test]
    fn free_symbols() {
        let e = sym("G") * sym("M") / (sym("r") * sym("c").pow(2)) + sym("theta").sin();
        let names: Vec<_> = e
            .free_symbols()
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        assert_eq!(names, vec!["G", "M", "c", "r", "theta"]);
    }
}
