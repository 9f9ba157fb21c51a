use crate::domain::ports::Classifier;
use crate::utils::error::{AppError, Result};
use ndarray::{ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    /// Seeds the per-node feature order, which decides ties between equally good splits.
    pub random_state: u64,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            random_state: 7,
            max_depth: None,
            min_samples_split: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Leaf {
        survived: bool,
        samples: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Entropy-criterion decision tree stored as a node arena; node 0 is the root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

fn entropy(positives: usize, total: usize) -> f64 {
    if total == 0 || positives == 0 || positives == total {
        return 0.0;
    }
    let p = positives as f64 / total as f64;
    let q = 1.0 - p;
    -(p * p.log2() + q * q.log2())
}

struct Builder<'a> {
    x: ArrayView2<'a, f64>,
    y: Vec<bool>,
    params: TreeParams,
    rng: StdRng,
    nodes: Vec<Node>,
}

impl Builder<'_> {
    fn leaf(&mut self, indices: &[usize]) -> usize {
        let positives = indices.iter().filter(|&&i| self.y[i]).count();
        // 平手時取類別 0
        self.nodes.push(Node::Leaf {
            survived: positives * 2 > indices.len(),
            samples: indices.len(),
        });
        self.nodes.len() - 1
    }

    fn best_split(&mut self, indices: &[usize]) -> Option<SplitCandidate> {
        let total = indices.len();
        let positives = indices.iter().filter(|&&i| self.y[i]).count();
        let parent = entropy(positives, total);

        let mut features: Vec<usize> = (0..self.x.ncols()).collect();
        features.shuffle(&mut self.rng);

        let mut best: Option<SplitCandidate> = None;
        let mut sorted = indices.to_vec();

        for feature in features {
            let column = self.x.column(feature);
            sorted.sort_by(|&a, &b| column[a].total_cmp(&column[b]));

            let mut left_pos = 0usize;
            for k in 0..total - 1 {
                if self.y[sorted[k]] {
                    left_pos += 1;
                }
                let here = column[sorted[k]];
                let next = column[sorted[k + 1]];
                if here == next {
                    continue;
                }

                let left_n = k + 1;
                let right_n = total - left_n;
                let children = (left_n as f64 * entropy(left_pos, left_n)
                    + right_n as f64 * entropy(positives - left_pos, right_n))
                    / total as f64;
                let gain = parent - children;

                if best.as_ref().map_or(true, |b| gain > b.gain) {
                    best = Some(SplitCandidate {
                        feature,
                        threshold: here + (next - here) / 2.0,
                        gain,
                    });
                }
            }
        }

        best
    }

    fn grow(&mut self, indices: &[usize], depth: usize) -> usize {
        let positives = indices.iter().filter(|&&i| self.y[i]).count();
        let pure = positives == 0 || positives == indices.len();
        let too_deep = self.params.max_depth.is_some_and(|max| depth >= max);

        if pure || too_deep || indices.len() < self.params.min_samples_split {
            return self.leaf(indices);
        }

        let Some(split) = self.best_split(indices) else {
            return self.leaf(indices);
        };

        let column = self.x.column(split.feature);
        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .copied()
            .partition(|&i| column[i] <= split.threshold);

        // 先佔位，子節點建好後再填入
        let slot = self.nodes.len();
        self.nodes.push(Node::Leaf {
            survived: false,
            samples: indices.len(),
        });
        let left = self.grow(&left_idx, depth + 1);
        let right = self.grow(&right_idx, depth + 1);
        self.nodes[slot] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        slot
    }
}

impl DecisionTree {
    pub fn fit(x: ArrayView2<'_, f64>, labels: ArrayView1<'_, f64>, params: TreeParams) -> Result<Self> {
        if x.nrows() == 0 || x.nrows() != labels.len() {
            return Err(AppError::TrainingError {
                message: format!(
                    "decision tree needs matching rows, got {} x / {} y",
                    x.nrows(),
                    labels.len()
                ),
            });
        }

        let mut builder = Builder {
            x,
            y: labels.iter().map(|&v| v > 0.5).collect(),
            params,
            rng: StdRng::seed_from_u64(params.random_state),
            nodes: Vec::new(),
        };
        let all: Vec<usize> = (0..x.nrows()).collect();
        builder.grow(&all, 0);

        tracing::debug!("Decision tree grown with {} nodes", builder.nodes.len());
        Ok(Self {
            nodes: builder.nodes,
        })
    }

    /// Every split must name a known feature and point forward to existing
    /// nodes; the arena is built parent-first, so this also rules out cycles.
    pub fn check_shape(&self, n_features: usize) -> std::result::Result<(), String> {
        if self.nodes.is_empty() {
            return Err("decision tree has no nodes".to_string());
        }
        for (at, node) in self.nodes.iter().enumerate() {
            if let Node::Split {
                feature,
                left,
                right,
                ..
            } = node
            {
                if *feature >= n_features {
                    return Err(format!(
                        "node {} splits on feature {} of {}",
                        at, feature, n_features
                    ));
                }
                for &child in [left, right] {
                    if child <= at || child >= self.nodes.len() {
                        return Err(format!("node {} points to node {}", at, child));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], at: usize) -> usize {
            match nodes[at] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, left).max(walk(nodes, right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }
}

impl Classifier for DecisionTree {
    fn predict_row(&self, row: ArrayView1<'_, f64>) -> bool {
        let mut at = 0;
        loop {
            match self.nodes.get(at) {
                Some(Node::Leaf { survived, .. }) => return *survived,
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    at = if row[*feature] <= *threshold { *left } else { *right };
                }
                None => return false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_entropy() {
        assert_eq!(entropy(0, 4), 0.0);
        assert_eq!(entropy(4, 4), 0.0);
        assert!((entropy(2, 4) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_fits_training_data_exactly() {
        // 第二個特徵決定結果，第一個是雜訊
        let x = array![[0.3, 0.0], [0.7, 0.0], [0.1, 1.0], [0.9, 1.0], [0.5, 0.0], [0.2, 1.0]];
        let y = array![0.0, 0.0, 1.0, 1.0, 0.0, 1.0];

        let tree = DecisionTree::fit(x.view(), y.view(), TreeParams::default()).unwrap();

        assert_eq!(tree.predict(x.view()), vec![false, false, true, true, false, true]);
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let x = array![[0.0], [0.25], [0.5], [0.75], [1.0]];
        let y = array![0.0, 1.0, 0.0, 1.0, 0.0];
        let params = TreeParams {
            max_depth: Some(1),
            ..TreeParams::default()
        };
        let tree = DecisionTree::fit(x.view(), y.view(), params).unwrap();
        assert!(tree.depth() <= 1);
    }
}
