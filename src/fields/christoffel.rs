use super::{tensor_field, Field, FieldEntry};
use crate::{
    config::Config,
    coords::DIM,
    error::Result,
    expr::Expr,
    manifold::Manifold,
    metric::MetricTensor,
    symmetry::{Representation, Symmetry},
    tensor::{memo, Tensor},
};
use std::{cell::OnceCell, rc::Rc};

/// `Γ^i_{kl} = ½ g^{im} (∂_k g_{ml} + ∂_l g_{mk} - ∂_m g_{kl})`, symmetric in
/// `k` and `l`
///
/// Also caches the derivatives `∂_d Γ^a_{bc}` the curvature tensors need.
#[derive(Debug)]
pub struct ChristoffelSymbols {
    tensor: Tensor<3>,
    metric: Rc<MetricTensor>,
    /// `∂_d Γ^a_{bc}` for `b <= c` at `((a * DIM + b) * DIM + c) * DIM + d`
    mixed_diff: Vec<OnceCell<Expr>>,
}

tensor_field!(ChristoffelSymbols, 3);

impl ChristoffelSymbols {
    fn formula(&self, i: usize, k: usize, l: usize) -> Result<Expr> {
        let g = &self.metric;
        let mut terms = Vec::new();
        for m in 0..DIM {
            let g_im = g.contra(i, m);
            if g_im.is_zero() {
                continue;
            }
            let inner = g.co_diff(m, l, k)? + g.co_diff(m, k, l)? - g.co_diff(k, l, m)?;
            if !inner.is_zero() {
                terms.push(g_im * inner);
            }
        }
        (Expr::sum(terms) / 2).simplify()
    }

    /// `∂_d Γ^a_{bc}`, simplified
    pub fn mixed_diff(&self, a: usize, b: usize, c: usize, d: usize) -> Result<Expr> {
        let (b, c) = (b.min(c), b.max(c));
        memo(&self.mixed_diff[((a * DIM + b) * DIM + c) * DIM + d], || {
            let gamma = self.tensor.mixed(&[a, b, c])?;
            if gamma.is_zero() {
                return Ok(gamma);
            }
            gamma
                .differentiate(self.metric.coords().coordinate(d))
                .simplify()
        })
        .cloned()
    }
}

impl Field for ChristoffelSymbols {
    const NAME: &'static str = "christoffel";

    fn dependencies(_: &Config) -> Vec<FieldEntry> {
        vec![]
    }

    fn instantiate(manifold: &Manifold) -> Result<Self> {
        Ok(ChristoffelSymbols {
            tensor: Tensor::new(Self::NAME, manifold.metric_rc(), Symmetry::LastPair),
            metric: manifold.metric_rc(),
            mixed_diff: (0..DIM.pow(4)).map(|_| OnceCell::new()).collect(),
        })
    }

    fn compute(&self, _: &Manifold, _: &Config) -> Result<usize> {
        self.tensor
            .fill(Representation::Mixed, |&[i, k, l]| self.formula(i, k, l))
    }
}
