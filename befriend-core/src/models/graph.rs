use serde::{Deserialize, Serialize};

/// A pair of dense node indices.
///
/// Edges fed to the GCN are directed (`src` sends to `dst`). Existence checks
/// use [`Edge::canonical`], so `(u, v)` and `(v, u)` are the same friendship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    pub src: usize,
    pub dst: usize,
}

impl Edge {
    pub fn new(src: usize, dst: usize) -> Self {
        Self { src, dst }
    }

    /// The same edge with the smaller index first.
    pub fn canonical(self) -> Self {
        if self.src <= self.dst {
            self
        } else {
            Self {
                src: self.dst,
                dst: self.src,
            }
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.src == self.dst
    }
}

impl From<(usize, usize)> for Edge {
    fn from((src, dst): (usize, usize)) -> Self {
        Self { src, dst }
    }
}

/// A candidate edge with its link score in `[0, 1]`.
///
/// Scores only compare within the embedding pass that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredEdge {
    pub edge: Edge,
    pub score: f32,
}
