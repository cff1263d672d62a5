//! Options of a [`crate::Manifold`], given once when it is created

/// Which formula the Ricci tensor is computed with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RicciPath {
    /// Contract the Riemann tensor: `R_{μν} = R^λ_{μλν}`
    #[default]
    FromRiemann,
    /// Straight from the Christoffel symbols, without building the Riemann
    /// tensor
    FromChristoffel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Whether [`crate::Manifold::of`] defines the fields it is asked for
    /// and that do not exist yet
    pub autodefine: bool,
    /// Whether [`crate::Manifold::of`] computes a field that was only
    /// instantiated
    pub autocompute: bool,
    /// Compute only the independent components of the Riemann tensor, and
    /// get the others by symmetry
    pub reduced_riemann: bool,
    pub ricci_path: RicciPath,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            autodefine: true,
            autocompute: true,
            reduced_riemann: false,
            ricci_path: RicciPath::default(),
        }
    }
}

impl Config {
    pub fn with_autodefine(mut self, autodefine: bool) -> Self {
        self.autodefine = autodefine;
        self
    }

    pub fn with_autocompute(mut self, autocompute: bool) -> Self {
        self.autocompute = autocompute;
        self
    }

    pub fn with_reduced_riemann(mut self, reduced: bool) -> Self {
        self.reduced_riemann = reduced;
        self
    }

    pub fn with_ricci_path(mut self, path: RicciPath) -> Self {
        self.ricci_path = path;
        self
    }
}
