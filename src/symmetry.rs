//! Index placements, and the index symmetries that let a tensor fill several
//! components from a single computation

use std::fmt;

/// Placement of the indices of a tensor component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Representation {
    /// All indices down: `T_{abc}`
    Covariant,
    /// All indices up: `T^{abc}`
    Contravariant,
    /// First index up, all others down: `T^a_{bc}`
    Mixed,
}

impl Representation {
    pub const ALL: [Representation; 3] = [
        Representation::Covariant,
        Representation::Contravariant,
        Representation::Mixed,
    ];

    /// Whether the index at position `pos` is a contravariant (upper) one
    pub fn is_upper(self, pos: usize) -> bool {
        match self {
            Representation::Covariant => false,
            Representation::Contravariant => true,
            Representation::Mixed => pos == 0,
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Representation::Covariant => "covariant",
            Representation::Contravariant => "contravariant",
            Representation::Mixed => "mixed",
        })
    }
}

/// How components of a tensor relate to each other under index permutations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symmetry {
    None,
    /// Invariant under any permutation of its indices
    Symmetric,
    /// Changes sign under odd permutations of its indices
    Antisymmetric,
    /// `R_{abcd} = -R_{bacd} = -R_{abdc} = R_{cdab}`
    RiemannLike,
    /// Symmetric in its last two indices only, like the Christoffel symbols
    LastPair,
}

/// A component related to another one by symmetry: its indices, and whether
/// it is the opposite of the given component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mirror {
    pub indices: Vec<usize>,
    pub negated: bool,
}

impl Symmetry {
    /// Every component known from the value of `indices` in `repr`,
    /// `indices` itself included (first). A mixed representation has its
    /// first index placed differently from the others, so only permutations
    /// among the lower indices apply to it
    pub fn mirrors(self, repr: Representation, indices: &[usize]) -> Vec<Mirror> {
        let n = indices.len();
        let fixed = usize::from(repr == Representation::Mixed);
        let candidates: Vec<(Vec<usize>, bool)> = match self {
            Symmetry::None => vec![(identity(n), false)],
            Symmetry::Symmetric | Symmetry::Antisymmetric => {
                let signed = self == Symmetry::Antisymmetric;
                permutations_from(n, fixed)
                    .into_iter()
                    .map(|(p, odd)| (p, signed && odd))
                    .collect()
            }
            Symmetry::RiemannLike if n == 4 => match repr {
                Representation::Mixed => vec![(vec![0, 1, 2, 3], false), (vec![0, 1, 3, 2], true)],
                _ => vec![
                    (vec![0, 1, 2, 3], false),
                    (vec![1, 0, 2, 3], true),
                    (vec![0, 1, 3, 2], true),
                    (vec![1, 0, 3, 2], false),
                    (vec![2, 3, 0, 1], false),
                    (vec![3, 2, 0, 1], true),
                    (vec![2, 3, 1, 0], true),
                    (vec![3, 2, 1, 0], false),
                ],
            },
            Symmetry::LastPair if n >= 2 => {
                let mut swapped = identity(n);
                swapped.swap(n - 2, n - 1);
                vec![(identity(n), false), (swapped, false)]
            }
            _ => vec![(identity(n), false)],
        };
        let mut out: Vec<Mirror> = Vec::with_capacity(candidates.len());
        for (perm, negated) in candidates {
            let permuted: Vec<usize> = perm.iter().map(|&p| indices[p]).collect();
            if !out.iter().any(|m| m.indices == permuted) {
                out.push(Mirror {
                    indices: permuted,
                    negated,
                });
            }
        }
        out
    }
}

fn identity(n: usize) -> Vec<usize> {
    (0..n).collect()
}

/// All permutations of `0..n` leaving the first `fixed` positions in place,
/// the identity first, each with its parity (`true` if odd)
fn permutations_from(n: usize, fixed: usize) -> Vec<(Vec<usize>, bool)> {
    fn go(prefix: &mut Vec<usize>, rest: &mut Vec<usize>, odd: bool, out: &mut Vec<(Vec<usize>, bool)>) {
        if rest.is_empty() {
            out.push((prefix.clone(), odd));
            return;
        }
        for i in 0..rest.len() {
            let x = rest.remove(i);
            prefix.push(x);
            // Taking the i-th remaining element first is i transpositions away
            go(prefix, rest, odd ^ (i % 2 == 1), out);
            prefix.pop();
            rest.insert(i, x);
        }
    }
    let fixed = fixed.min(n);
    let mut prefix = identity(fixed);
    let mut rest: Vec<usize> = (fixed..n).collect();
    let mut out = Vec::new();
    go(&mut prefix, &mut rest, false, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use Representation::*;

    fn indices_of(ms: &[Mirror]) -> Vec<(Vec<usize>, bool)> {
        ms.iter().map(|m| (m.indices.clone(), m.negated)).collect()
    }

    #[test]
    fn permutation_parity() {
        let perms = permutations_from(3, 0);
        assert_eq!(perms.len(), 6);
        assert_eq!(perms[0], (vec![0, 1, 2], false));
        assert!(perms.contains(&(vec![1, 0, 2], true)));
        assert!(perms.contains(&(vec![1, 2, 0], false)));
        assert!(perms.contains(&(vec![2, 1, 0], true)));
    }

    #[test]
    fn symmetric_rank_two() {
        let ms = Symmetry::Symmetric.mirrors(Covariant, &[0, 2]);
        assert_eq!(indices_of(&ms), vec![(vec![0, 2], false), (vec![2, 0], false)]);
        // T^a_b is not symmetric in general
        assert_eq!(Symmetry::Symmetric.mirrors(Mixed, &[0, 2]).len(), 1);
        assert_eq!(Symmetry::Symmetric.mirrors(Covariant, &[1, 1]).len(), 1);
    }

    #[test]
    fn antisymmetric_signs() {
        let ms = Symmetry::Antisymmetric.mirrors(Contravariant, &[3, 1]);
        assert_eq!(indices_of(&ms), vec![(vec![3, 1], false), (vec![1, 3], true)]);
    }

    #[test]
    fn riemann_like_fills_eight() {
        let ms = Symmetry::RiemannLike.mirrors(Covariant, &[0, 1, 2, 3]);
        assert_eq!(ms.len(), 8);
        assert!(ms.contains(&Mirror {
            indices: vec![2, 3, 0, 1],
            negated: false
        }));
        assert!(ms.contains(&Mirror {
            indices: vec![1, 0, 2, 3],
            negated: true
        }));
        let mixed = Symmetry::RiemannLike.mirrors(Mixed, &[0, 1, 2, 3]);
        assert_eq!(indices_of(&mixed), vec![(vec![0, 1, 2, 3], false), (vec![0, 1, 3, 2], true)]);
    }

    #[test]
    fn last_pair() {
        for repr in Representation::ALL {
            let ms = Symmetry::LastPair.mirrors(repr, &[0, 1, 3]);
            assert_eq!(indices_of(&ms), vec![(vec![0, 1, 3], false), (vec![0, 3, 1], false)]);
        }
    }
}
