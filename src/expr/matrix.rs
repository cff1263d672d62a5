use super::Expr;
use crate::error::{Error, Result};
use array_init::{array_init, try_array_init};

/// A 4×4 matrix of expressions, as the components of a rank-2 tensor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix4(pub [[Expr; 4]; 4]);

impl Matrix4 {
    pub fn from_fn(f: impl Fn(usize, usize) -> Expr) -> Self {
        Matrix4(array_init(|i| array_init(|j| f(i, j))))
    }

    pub fn try_from_fn(f: impl Fn(usize, usize) -> Result<Expr>) -> Result<Self> {
        Ok(Matrix4(try_array_init(|i| try_array_init(|j| f(i, j)))?))
    }

    /// Diagonal matrix, zero everywhere else
    pub fn diagonal(diag: [Expr; 4]) -> Self {
        Matrix4::from_fn(|i, j| if i == j { diag[i].clone() } else { Expr::zero() })
    }

    pub fn get(&self, i: usize, j: usize) -> &Expr {
        &self.0[i][j]
    }

    /// The first `(row, col)`, `row < col`, where the matrix differs from
    /// its transpose. Entries are compared by simplifying their difference
    pub fn first_asymmetry(&self) -> Result<Option<(usize, usize)>> {
        for i in 0..4 {
            for j in i + 1..4 {
                let (a, b) = (&self.0[i][j], &self.0[j][i]);
                if a != b && !(a - b).simplify()?.is_zero() {
                    return Ok(Some((i, j)));
                }
            }
        }
        Ok(None)
    }

    pub fn is_symmetric(&self) -> Result<bool> {
        Ok(self.first_asymmetry()?.is_none())
    }

    /// Matrix product. Entries are not simplified
    pub fn mul(&self, other: &Matrix4) -> Self {
        Matrix4::from_fn(|i, j| (0..4).map(|k| &self.0[i][k] * &other.0[k][j]).sum())
    }

    pub fn simplify(&self) -> Result<Self> {
        Matrix4::try_from_fn(|i, j| self.0[i][j].simplify())
    }

    /// Simplified determinant
    pub fn determinant(&self) -> Result<Expr> {
        self.minor(&[0, 1, 2, 3], &[0, 1, 2, 3]).simplify()
    }

    /// Simplified inverse, as the adjugate divided by the determinant
    pub fn inverse(&self) -> Result<Self> {
        let det = self.determinant()?;
        if det.is_zero() {
            return Err(Error::SingularMetric);
        }
        let inv_det = det.pow(-1);
        Matrix4::try_from_fn(|i, j| {
            let rows = others(j);
            let cols = others(i);
            let cofactor = self.minor(&rows, &cols);
            let signed = if (i + j) % 2 == 0 {
                cofactor
            } else {
                -cofactor
            };
            (signed * &inv_det).simplify()
        })
    }

    /// Unsimplified determinant of the submatrix keeping only some rows and
    /// columns, by cofactor expansion along the first kept row
    fn minor(&self, rows: &[usize], cols: &[usize]) -> Expr {
        match (rows, cols) {
            ([], _) => Expr::one(),
            ([r], [c]) => self.0[*r][*c].clone(),
            ([r, rest @ ..], _) => Expr::sum(cols.iter().enumerate().filter_map(|(k, c)| {
                let a = &self.0[*r][*c];
                if a.is_zero() {
                    return None;
                }
                let sub_cols: Vec<usize> = cols.iter().copied().filter(|x| x != c).collect();
                let term = a * self.minor(rest, &sub_cols);
                Some(if k % 2 == 0 { term } else { -term })
            })),
        }
    }
}

fn others(i: usize) -> [usize; 3] {
    let mut out = [0; 3];
    let mut n = 0;
    for k in (0..4).filter(|k| *k != i) {
        out[n] = k;
        n += 1;
    }
    out
}

impl std::ops::Index<(usize, usize)> for Matrix4 {
    type Output = Expr;
    fn index(&self, (i, j): (usize, usize)) -> &Expr {
        &self.0[i][j]
    }
}
