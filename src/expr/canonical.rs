//! A canonical representation of expressions as rational functions, which is
//! what simplification goes through
//!
//! An expression is turned into a fraction whose numerator is a polynomial
//! over _atoms_ (free symbols and function applications) with rational
//! coefficients, and whose denominator is kept factored: one monomial times
//! a product of (non-monomial) polynomial factors raised to some power. Each
//! denominator factor is stored primitive (integer coprime coefficients,
//! positive leading coefficient, no monomial content), so that two equal
//! factors always end up with the same key, which makes the LCM of two
//! denominators cheap to compute.
//!
//! Numerators are reduced modulo `sin²(u) + cos²(u) - 1`, by rewriting every
//! `cos(u)^k` with `k >= 2`, and modulo `sqrt(u)² - u`, by rewriting every
//! `sqrt(u)^k` with `k >= 2` in terms of `u`. Function arguments are kept as
//! one numerator over one expanded, primitive denominator, so that equal
//! arguments give the same atom.
//!
//! The reduced form of a polynomial is unique. Over sines and cosines the
//! quotient ring is an integral domain, so a fraction vanishes iff its
//! reduced numerator is the zero polynomial: the zero test is exact for
//! rational trigonometric expressions. It stays exact with square roots as
//! long as no radicand, nor product of radicands, is a perfect square.
//! Identities beyond these two are not known: `sqrt(a b)` and
//! `sqrt(a) sqrt(b)` are different atoms, as are `exp(a + b)` and
//! `exp(a) exp(b)`. Fractions are only cancelled by the denominator factors
//! they already have, not through a general polynomial GCD.

use super::{
    base_types::{ExprNode as N, *},
    stats, Expr,
};
use crate::error::{Error, Result};
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::{cmp::Ordering, collections::BTreeMap};

// # TYPES //

/// An indivisible factor of a monomial
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum Atom {
    Symbol(Symbol),
    /// Function application, with arguments in simplified form
    Apply(Function, Vec<Expr>),
}

/// A product of atoms raised to positive powers. Invariant: no exponent is
/// zero
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct Monomial(BTreeMap<Atom, u32>);

/// A polynomial over atoms. Invariant: no coefficient is zero
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
pub(crate) struct Poly(BTreeMap<Monomial, BigRational>);

/// `num / (den_mono * prod(f^k for (f, k) in den))`
#[derive(Debug, Clone)]
pub(crate) struct RationalFn {
    num: Poly,
    den_mono: Monomial,
    den: BTreeMap<Poly, u32>,
}

// # ATOMS & MONOMIALS //

impl Atom {
    fn to_expr(&self) -> Expr {
        match self {
            Atom::Symbol(s) => Expr::symbol(s),
            Atom::Apply(f, args) => Expr::apply(f.clone(), args.clone()),
        }
    }
}

/// Lexicographic order: the smallest atom on which two monomials differ
/// decides, the monomial with the highest power of it being the greatest.
/// This is compatible with multiplication, so it is a valid monomial order
/// for polynomial division
impl Ord for Monomial {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut a = self.0.iter().peekable();
        let mut b = other.0.iter().peekable();
        loop {
            match (a.peek(), b.peek()) {
                (None, None) => return Ordering::Equal,
                (Some(_), None) => return Ordering::Greater,
                (None, Some(_)) => return Ordering::Less,
                (Some((ka, ea)), Some((kb, eb))) => match ka.cmp(kb) {
                    Ordering::Less => return Ordering::Greater,
                    Ordering::Greater => return Ordering::Less,
                    Ordering::Equal => match ea.cmp(eb) {
                        Ordering::Equal => {
                            a.next();
                            b.next();
                        }
                        o => return o,
                    },
                },
            }
        }
    }
}

impl PartialOrd for Monomial {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Monomial {
    fn one() -> Self {
        Monomial(BTreeMap::new())
    }

    fn of(atom: Atom, e: u32) -> Self {
        let mut m = BTreeMap::new();
        if e > 0 {
            m.insert(atom, e);
        }
        Monomial(m)
    }

    fn is_one(&self) -> bool {
        self.0.is_empty()
    }

    fn mul(&self, other: &Self) -> Self {
        let mut m = self.0.clone();
        for (a, e) in &other.0 {
            *m.entry(a.clone()).or_insert(0) += e;
        }
        Monomial(m)
    }

    /// Whether `self` divides `other`
    fn divides(&self, other: &Self) -> bool {
        self.0
            .iter()
            .all(|(a, e)| other.0.get(a).is_some_and(|f| f >= e))
    }

    /// `self / other`. `other` must divide `self`
    fn div(&self, other: &Self) -> Self {
        let mut m = self.0.clone();
        for (a, e) in &other.0 {
            if let Some(f) = m.get_mut(a) {
                *f -= (*e).min(*f);
                if *f == 0 {
                    m.remove(a);
                }
            }
        }
        Monomial(m)
    }

    fn gcd(&self, other: &Self) -> Self {
        Monomial(
            self.0
                .iter()
                .filter_map(|(a, e)| other.0.get(a).map(|f| (a.clone(), *e.min(f))))
                .collect(),
        )
    }

    fn lcm(&self, other: &Self) -> Self {
        let mut m = self.0.clone();
        for (a, e) in &other.0 {
            let f = m.entry(a.clone()).or_insert(0);
            *f = (*f).max(*e);
        }
        Monomial(m)
    }

    /// The argument of the first `cos` raised to a power of at least 2
    fn reducible_cos(&self) -> Option<&Vec<Expr>> {
        self.0.iter().find_map(|(a, e)| match a {
            Atom::Apply(Function::Cos, args) if *e >= 2 => Some(args),
            _ => None,
        })
    }

    fn has_reducible_sqrt(&self) -> bool {
        self.0
            .iter()
            .any(|(a, e)| *e >= 2 && matches!(a, Atom::Apply(Function::Sqrt, args) if args.len() == 1))
    }

    /// `q * self` with each `sqrt(u)^k`, `k >= 2`, written
    /// `sqrt(u)^(k mod 2) * u^(k div 2)`
    fn unsquare(&self, q: &BigRational) -> Result<RationalFn> {
        let mut rest = Monomial::one();
        let mut radicands = RationalFn::one();
        for (a, e) in &self.0 {
            match a {
                Atom::Apply(Function::Sqrt, args) if *e >= 2 && args.len() == 1 => {
                    radicands = radicands.mul(&to_rational(&args[0])?.pow((*e / 2) as i64)?);
                    rest = rest.mul(&Monomial::of(a.clone(), *e % 2));
                }
                _ => rest = rest.mul(&Monomial::of(a.clone(), *e)),
            }
        }
        Ok(radicands.mul(&RationalFn::from_poly(Poly::monomial(rest, q.clone()))))
    }

    fn to_expr(&self, coeff: &BigRational) -> Expr {
        Expr::product(
            std::iter::once(Expr::number(coeff.clone()))
                .chain(self.0.iter().map(|(a, e)| a.to_expr().pow(*e as i64))),
        )
    }
}

// # POLYNOMIALS //

impl Poly {
    pub(crate) fn zero() -> Self {
        Poly(BTreeMap::new())
    }

    fn monomial(m: Monomial, q: BigRational) -> Self {
        let mut p = Poly::zero();
        p.add_term(m, q);
        p
    }

    fn constant(q: BigRational) -> Self {
        Poly::monomial(Monomial::one(), q)
    }

    pub(crate) fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    /// The value of a polynomial made of a single constant term
    fn as_constant(&self) -> Option<&BigRational> {
        match self.0.len() {
            1 => self.0.get(&Monomial::one()),
            _ => None,
        }
    }

    fn add_term(&mut self, m: Monomial, q: BigRational) {
        if q.is_zero() {
            return;
        }
        match self.0.get_mut(&m) {
            Some(c) => {
                *c += q;
                if c.is_zero() {
                    self.0.remove(&m);
                }
            }
            None => {
                self.0.insert(m, q);
            }
        }
    }

    fn add(&self, other: &Self) -> Self {
        let (small, big) = if self.0.len() <= other.0.len() {
            (self, other)
        } else {
            (other, self)
        };
        let mut p = big.clone();
        for (m, q) in &small.0 {
            p.add_term(m.clone(), q.clone());
        }
        p
    }

    fn sub(&self, other: &Self) -> Self {
        let mut p = self.clone();
        for (m, q) in &other.0 {
            p.add_term(m.clone(), -q);
        }
        p
    }

    fn mul(&self, other: &Self) -> Self {
        let mut p = Poly::zero();
        for (m1, q1) in &self.0 {
            for (m2, q2) in &other.0 {
                p.add_term(m1.mul(m2), q1 * q2);
            }
        }
        p
    }

    fn scale(&self, q: &BigRational) -> Self {
        if q.is_zero() {
            return Poly::zero();
        }
        Poly(self.0.iter().map(|(m, c)| (m.clone(), c * q)).collect())
    }

    fn mul_monomial(&self, m: &Monomial) -> Self {
        Poly(self.0.iter().map(|(n, c)| (n.mul(m), c.clone())).collect())
    }

    fn div_monomial(&self, m: &Monomial) -> Self {
        Poly(self.0.iter().map(|(n, c)| (n.div(m), c.clone())).collect())
    }

    fn pow(&self, k: u32) -> Self {
        let mut acc = Poly::constant(BigRational::one());
        for _ in 0..k {
            acc = acc.mul(self);
        }
        acc
    }

    fn leading(&self) -> Option<(&Monomial, &BigRational)> {
        self.0.iter().next_back()
    }

    /// The greatest monomial dividing every term
    fn content(&self) -> Monomial {
        let mut terms = self.0.keys();
        match terms.next() {
            None => Monomial::one(),
            Some(first) => terms.fold(first.clone(), |g, m| g.gcd(m)),
        }
    }

    /// `self / divisor` if the division is exact
    fn exact_div(&self, divisor: &Poly) -> Option<Poly> {
        let (lm_d, lc_d) = divisor.leading()?;
        let mut rem = self.clone();
        let mut quot = Poly::zero();
        loop {
            let (m, c) = match rem.leading() {
                None => return Some(quot),
                Some((lm_r, lc_r)) => {
                    if !lm_d.divides(lm_r) {
                        return None;
                    }
                    (lm_r.div(lm_d), lc_r / lc_d)
                }
            };
            rem = rem.sub(&divisor.mul_monomial(&m).scale(&c));
            quot.add_term(m, c);
        }
    }

    /// Rewrite every `cos(u)^k` (`k >= 2`) as `cos(u)^(k-2) * (1 - sin(u)^2)`
    fn trig_reduce(self) -> Poly {
        if !self.0.keys().any(|m| m.reducible_cos().is_some()) {
            return self;
        }
        let mut out = Poly::zero();
        let mut work: Vec<_> = self.0.into_iter().collect();
        while let Some((m, q)) = work.pop() {
            let args = match m.reducible_cos() {
                None => {
                    out.add_term(m, q);
                    continue;
                }
                Some(args) => args.clone(),
            };
            let cos_sq = Monomial::of(Atom::Apply(Function::Cos, args.clone()), 2);
            let sin_sq = Monomial::of(Atom::Apply(Function::Sin, args), 2);
            let rest = m.div(&cos_sq);
            work.push((rest.mul(&sin_sq), -q.clone()));
            work.push((rest, q));
        }
        out
    }

    fn has_reducible_sqrt(&self) -> bool {
        self.0.keys().any(Monomial::has_reducible_sqrt)
    }

    fn unsquare(&self) -> Result<RationalFn> {
        let terms = self
            .0
            .iter()
            .map(|(m, q)| m.unsquare(q))
            .collect::<Result<Vec<_>>>()?;
        Ok(RationalFn::sum(terms))
    }

    /// Split a non-zero polynomial into `scale * primitive`, where
    /// `primitive` has coprime integer coefficients and a positive leading
    /// coefficient
    fn primitive(&self) -> (BigRational, Poly) {
        let den_lcm = self
            .0
            .values()
            .fold(BigInt::one(), |l, q| l.lcm(q.denom()));
        let num_gcd = self.0.values().fold(BigInt::zero(), |g, q| {
            g.gcd(&(q * BigRational::from_integer(den_lcm.clone())).to_integer())
        });
        let mut scale = BigRational::new(num_gcd, den_lcm);
        if self.leading().is_some_and(|(_, c)| c.is_negative()) {
            scale = -scale;
        }
        let prim = self.scale(&scale.recip());
        (scale, prim)
    }

    fn to_expr(&self) -> Expr {
        Expr::sum(self.0.iter().rev().map(|(m, q)| m.to_expr(q)))
    }
}

// # RATIONAL FUNCTIONS //

impl RationalFn {
    fn from_poly(num: Poly) -> Self {
        RationalFn {
            num,
            den_mono: Monomial::one(),
            den: BTreeMap::new(),
        }
    }

    fn zero() -> Self {
        RationalFn::from_poly(Poly::zero())
    }

    fn one() -> Self {
        RationalFn::constant(BigRational::one())
    }

    fn constant(q: BigRational) -> Self {
        RationalFn::from_poly(Poly::constant(q))
    }

    fn atom(a: Atom) -> Self {
        RationalFn::from_poly(Poly::monomial(Monomial::of(a, 1), BigRational::one()))
    }

    pub(crate) fn numerator(&self) -> &Poly {
        &self.num
    }

    pub(crate) fn is_zero(&self) -> bool {
        self.num.is_zero()
    }

    /// The value, if this is a plain number
    pub(crate) fn as_constant(&self) -> Option<&BigRational> {
        if self.den_mono.is_one() && self.den.is_empty() {
            self.num.as_constant()
        } else {
            None
        }
    }

    fn normalize(mut self) -> Self {
        self.num = self.num.trig_reduce();
        if self.num.is_zero() {
            return RationalFn::zero();
        }
        let factors = std::mem::take(&mut self.den);
        for (f, mut k) in factors {
            while k > 0 {
                match self.num.exact_div(&f) {
                    Some(q) => {
                        self.num = q.trig_reduce();
                        k -= 1;
                    }
                    None => break,
                }
            }
            if k > 0 {
                self.den.insert(f, k);
            }
        }
        let g = self.num.content().gcd(&self.den_mono);
        if !g.is_one() {
            self.num = self.num.div_monomial(&g);
            self.den_mono = self.den_mono.div(&g);
        }
        self
    }

    /// `self / d`
    fn divide_by_poly(mut self, d: Poly) -> Result<Self> {
        let d = d.trig_reduce();
        if d.is_zero() {
            return Err(Error::DivisionByZero);
        }
        let m = d.content();
        let d = d.div_monomial(&m);
        self.den_mono = self.den_mono.mul(&m);
        if let Some(c) = d.as_constant() {
            self.num = self.num.scale(&c.recip());
            return Ok(self.normalize());
        }
        let (scale, mut prim) = d.primitive();
        self.num = self.num.scale(&scale.recip());
        // Powers of a factor we already have are kept as multiplicities of it
        let known: Vec<Poly> = self.den.keys().cloned().collect();
        for f in known {
            while let Some(q) = prim.exact_div(&f) {
                *self.den.entry(f.clone()).or_insert(0) += 1;
                if let Some(c) = q.as_constant() {
                    self.num = self.num.scale(&c.recip());
                    return Ok(self.normalize());
                }
                let (s, p) = q.primitive();
                self.num = self.num.scale(&s.recip());
                prim = p;
            }
        }
        *self.den.entry(prim).or_insert(0) += 1;
        Ok(self.normalize())
    }

    fn mul(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return RationalFn::zero();
        }
        let mut den = self.den.clone();
        for (f, k) in &other.den {
            *den.entry(f.clone()).or_insert(0) += k;
        }
        RationalFn {
            num: self.num.mul(&other.num),
            den_mono: self.den_mono.mul(&other.den_mono),
            den,
        }
        .normalize()
    }

    fn neg(&self) -> Self {
        RationalFn {
            num: self.num.scale(&-BigRational::one()),
            den_mono: self.den_mono.clone(),
            den: self.den.clone(),
        }
    }

    /// What the numerator must be multiplied by to bring this fraction to the
    /// (larger) denominator `mono * prod(den)`
    fn cofactor(&self, mono: &Monomial, den: &BTreeMap<Poly, u32>) -> Poly {
        let mut p = Poly::monomial(mono.div(&self.den_mono), BigRational::one());
        for (f, k) in den {
            let own = self.den.get(f).copied().unwrap_or(0);
            if *k > own {
                p = p.mul(&f.pow(k - own));
            }
        }
        p
    }

    /// Sum of several fractions over their common denominator
    fn sum(parts: Vec<RationalFn>) -> Self {
        let parts: Vec<_> = parts.into_iter().filter(|p| !p.is_zero()).collect();
        match parts.len() {
            0 => return RationalFn::zero(),
            1 => return parts.into_iter().next().unwrap_or_else(RationalFn::zero),
            _ => {}
        }
        let mut den_mono = Monomial::one();
        let mut den: BTreeMap<Poly, u32> = BTreeMap::new();
        for p in &parts {
            den_mono = den_mono.lcm(&p.den_mono);
            for (f, k) in &p.den {
                let e = den.entry(f.clone()).or_insert(0);
                *e = (*e).max(*k);
            }
        }
        let mut num = Poly::zero();
        for p in &parts {
            num = num.add(&p.num.mul(&p.cofactor(&den_mono, &den)));
        }
        RationalFn { num, den_mono, den }.normalize()
    }

    fn add(&self, other: &Self) -> Self {
        RationalFn::sum(vec![self.clone(), other.clone()])
    }

    fn denominator(&self) -> Poly {
        self.den.iter().fold(
            Poly::monomial(self.den_mono.clone(), BigRational::one()),
            |p, (f, k)| p.mul(&f.pow(*k)),
        )
    }

    fn recip(&self) -> Result<Self> {
        if self.is_zero() {
            return Err(Error::DivisionByZero);
        }
        RationalFn::from_poly(self.denominator()).divide_by_poly(self.num.clone())
    }

    fn pow(&self, n: i64) -> Result<Self> {
        let mut base = if n < 0 { self.recip()? } else { self.clone() };
        let mut k = n.unsigned_abs();
        let mut acc = RationalFn::one();
        while k > 0 {
            if k & 1 == 1 {
                acc = acc.mul(&base);
            }
            k >>= 1;
            if k > 0 {
                base = base.mul(&base);
            }
        }
        Ok(acc)
    }

    /// Rewrite the square roots raised to a power of at least 2 until there
    /// are none left. Each pass replaces a root by its radicand, which is
    /// strictly smaller
    fn reduce_radicals(self) -> Result<Self> {
        let mut rf = self;
        while rf.num.has_reducible_sqrt()
            || rf.den_mono.has_reducible_sqrt()
            || rf.den.keys().any(Poly::has_reducible_sqrt)
        {
            let num = rf.num.unsquare()?;
            let mut den = rf.den_mono.unsquare(&BigRational::one())?;
            for (f, k) in &rf.den {
                den = den.mul(&f.unsquare()?.pow(*k as i64)?);
            }
            rf = num.mul(&den.recip()?);
        }
        Ok(rf)
    }

    /// One numerator over one expanded denominator, scaled to be primitive
    fn to_expanded_expr(&self) -> Expr {
        if self.den_mono.is_one() && self.den.is_empty() {
            return self.num.to_expr();
        }
        let (scale, den) = self.denominator().trig_reduce().primitive();
        let num = self.num.scale(&scale.recip()).to_expr();
        if den.as_constant().is_some() {
            return num;
        }
        Expr::product([num, den.to_expr().pow(-1)])
    }

    pub(crate) fn to_expr(&self) -> Expr {
        let num = self.num.to_expr();
        if self.den_mono.is_one() && self.den.is_empty() {
            return num;
        }
        let den_atoms = self
            .den_mono
            .0
            .iter()
            .map(|(a, e)| a.to_expr().pow(-(*e as i64)));
        let den_factors = self
            .den
            .iter()
            .map(|(f, k)| f.to_expr().pow(-(*k as i64)));
        Expr::product(std::iter::once(num).chain(den_atoms).chain(den_factors))
    }
}

// # CONVERSION FROM EXPRESSIONS //

impl Expr {
    /// Bring the expression to its canonical form: a single fraction, with
    /// known common factors cancelled, `cos²` rewritten in terms of `sin²`
    /// and `sqrt(u)²` in terms of `u`. An expression whose simplification is
    /// the number zero is identically zero. The converse holds within the
    /// identities listed in the [module docs](self)
    ///
    /// Fails only when dividing by something that simplifies to zero
    pub fn simplify(&self) -> Result<Expr> {
        stats::count_simplify();
        Ok(to_rational(self)?.to_expr())
    }

    /// Canonical form of the opposite of an expression. Not counted as a
    /// simplification: it only propagates signs of values already simplified
    pub(crate) fn negated(&self) -> Result<Expr> {
        match self.node() {
            N::Number(q) => Ok(Expr::number(-q)),
            _ => Ok(to_rational(self)?.neg().to_expr()),
        }
    }
}

/// Canonical form of an expression
pub(crate) fn to_rational(e: &Expr) -> Result<RationalFn> {
    let rf = match e.node() {
        N::Number(q) => Ok(RationalFn::constant(q.clone())),
        N::Symbol(s) => Ok(RationalFn::atom(Atom::Symbol(s.clone()))),
        N::Sum(ts) => Ok(RationalFn::sum(
            ts.iter().map(to_rational).collect::<Result<_>>()?,
        )),
        N::Product(fs) => fs
            .iter()
            .try_fold(RationalFn::one(), |acc, f| Ok(acc.mul(&to_rational(f)?))),
        N::Power(base, n) => match base.node() {
            // Keeps every factor of the base as its own denominator factor
            N::Product(fs) => fs.iter().try_fold(RationalFn::one(), |acc, f| {
                Ok(acc.mul(&to_rational(f)?.pow(*n)?))
            }),
            _ => to_rational(base)?.pow(*n),
        },
        N::Apply(f, args) => {
            let args = args
                .iter()
                .map(|a| Ok(to_rational(a)?.to_expanded_expr()))
                .collect::<Result<Vec<_>>>()?;
            Ok(apply_function(f, args))
        }
    }?;
    rf.reduce_radicals()
}

/// Function application on simplified arguments, folding the few exact values
/// we know about
fn apply_function(f: &Function, args: Vec<Expr>) -> RationalFn {
    let exact = match (f, args.as_slice()) {
        (Function::Sin | Function::Sqrt, [x]) if x.is_zero() => Some(BigRational::zero()),
        (Function::Cos | Function::Exp, [x]) if x.is_zero() => Some(BigRational::one()),
        (Function::Ln, [x]) if x.is_one() => Some(BigRational::zero()),
        (Function::Sqrt, [x]) if x.is_one() => Some(BigRational::one()),
        _ => None,
    };
    match exact {
        Some(q) => RationalFn::constant(q),
        None => RationalFn::atom(Atom::Apply(f.clone(), args)),
    }
}
