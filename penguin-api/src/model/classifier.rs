use ndarray::{Array1, Array2, ArrayView1};
use serde::Deserialize;

use crate::error::InferenceError;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    Linear(LinearModel),
    Forest(Forest),
}

impl Classifier {
    pub fn kind(&self) -> &'static str {
        match self {
            Classifier::Linear(_) => "linear",
            Classifier::Forest(_) => "forest",
        }
    }

    pub fn num_features(&self) -> usize {
        match self {
            Classifier::Linear(model) => model.num_features(),
            Classifier::Forest(forest) => forest.n_features,
        }
    }

    pub fn num_classes(&self) -> usize {
        match self {
            Classifier::Linear(model) => model.num_classes(),
            Classifier::Forest(forest) => forest.n_classes,
        }
    }

    /// Checks the structural invariants that serde alone cannot express.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Classifier::Linear(_) => Ok(()),
            Classifier::Forest(forest) => forest.validate(),
        }
    }

    /// Per-class scores for one row.
    pub fn scores(&self, row: ArrayView1<'_, f64>) -> Result<Array1<f64>, InferenceError> {
        if row.len() != self.num_features() {
            return Err(InferenceError::ShapeMismatch {
                expected: self.num_features(),
                got: row.len(),
            });
        }
        match self {
            Classifier::Linear(model) => Ok(model.decision_function(row)),
            Classifier::Forest(forest) => forest.predict_proba(row),
        }
    }

    /// Predicted class index for one row.
    pub fn predict(&self, row: ArrayView1<'_, f64>) -> Result<usize, InferenceError> {
        let scores = self.scores(row)?;
        argmax(scores.view())
    }
}

/// First index of the maximum score. Any non-finite score is an error.
pub fn argmax(scores: ArrayView1<'_, f64>) -> Result<usize, InferenceError> {
    let mut best: Option<(usize, f64)> = None;
    for (class, &score) in scores.iter().enumerate() {
        if !score.is_finite() {
            return Err(InferenceError::NonFiniteScore { class });
        }
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((class, score)),
        }
    }
    best.map(|(class, _)| class)
        .ok_or(InferenceError::EmptyScores)
}

/// Multinomial linear model: `scores = W . x + b`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(try_from = "LinearRepr")]
pub struct LinearModel {
    /// Shape `(n_classes, n_features)`.
    coefficients: Array2<f64>,
    /// Shape `(n_classes,)`.
    intercepts: Array1<f64>,
}

#[derive(Deserialize)]
struct LinearRepr {
    coefficients: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

impl TryFrom<LinearRepr> for LinearModel {
    type Error = String;

    fn try_from(repr: LinearRepr) -> Result<Self, Self::Error> {
        LinearModel::new(repr.coefficients, repr.intercepts)
    }
}

impl LinearModel {
    pub fn new(coefficients: Vec<Vec<f64>>, intercepts: Vec<f64>) -> Result<Self, String> {
        let n_classes = coefficients.len();
        let n_features = coefficients.first().map_or(0, Vec::len);
        if n_classes == 0 || n_features == 0 {
            return Err("linear model has no coefficients".to_string());
        }
        if intercepts.len() != n_classes {
            return Err(format!(
                "linear model has {} intercepts for {} classes",
                intercepts.len(),
                n_classes
            ));
        }
        if let Some(row) = coefficients.iter().position(|r| r.len() != n_features) {
            return Err(format!(
                "coefficient row {row} has {} values, expected {n_features}",
                coefficients[row].len()
            ));
        }
        let flat: Vec<f64> = coefficients.into_iter().flatten().collect();
        if flat.iter().chain(&intercepts).any(|v| !v.is_finite()) {
            return Err("linear model contains non-finite parameters".to_string());
        }

        let coefficients = Array2::from_shape_vec((n_classes, n_features), flat)
            .map_err(|e| format!("coefficient shape error: {e}"))?;
        Ok(Self {
            coefficients,
            intercepts: Array1::from_vec(intercepts),
        })
    }

    pub fn num_features(&self) -> usize {
        self.coefficients.ncols()
    }

    pub fn num_classes(&self) -> usize {
        self.coefficients.nrows()
    }

    pub fn decision_function(&self, row: ArrayView1<'_, f64>) -> Array1<f64> {
        self.coefficients.dot(&row) + &self.intercepts
    }
}

/// Ensemble of decision trees whose leaf class distributions are averaged.
/// A forest with a single tree is a plain decision tree.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Forest {
    pub n_features: usize,
    pub n_classes: usize,
    pub trees: Vec<Tree>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Tree {
    /// Node 0 is the root. Children always have a larger index than their parent.
    pub nodes: Vec<Node>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    /// Go `left` when `x[feature] <= threshold`, otherwise `right`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf { distribution: Vec<f64> },
}

impl Forest {
    fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (t, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, self.n_classes)
                .map_err(|reason| format!("tree {t}: {reason}"))?;
        }
        Ok(())
    }

    pub fn predict_proba(&self, row: ArrayView1<'_, f64>) -> Result<Array1<f64>, InferenceError> {
        let mut total = Array1::<f64>::zeros(self.n_classes);
        for (t, tree) in self.trees.iter().enumerate() {
            let leaf = tree.leaf_for(row, t)?;
            if leaf.len() != self.n_classes {
                return Err(InferenceError::MalformedTree {
                    tree: t,
                    reason: format!("leaf has {} classes", leaf.len()),
                });
            }
            total
                .iter_mut()
                .zip(leaf)
                .for_each(|(acc, p)| *acc += p);
        }
        Ok(total / self.trees.len() as f64)
    }
}

impl Tree {
    fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(format!("node {i} splits on feature {feature}"));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {i} has a non-finite threshold"));
                    }
                    for child in [*left, *right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(format!("node {i} has invalid child {child}"));
                        }
                    }
                }
                Node::Leaf { distribution } => {
                    if distribution.len() != n_classes {
                        return Err(format!(
                            "leaf {i} has {} classes, expected {n_classes}",
                            distribution.len()
                        ));
                    }
                    if distribution.iter().any(|p| !p.is_finite()) {
                        return Err(format!("leaf {i} has a non-finite value"));
                    }
                }
            }
        }
        Ok(())
    }

    fn leaf_for(&self, row: ArrayView1<'_, f64>, tree: usize) -> Result<&[f64], InferenceError> {
        let mut index = 0;
        loop {
            let node = self.nodes.get(index).ok_or_else(|| InferenceError::MalformedTree {
                tree,
                reason: format!("node {index} does not exist"),
            })?;
            match node {
                Node::Leaf { distribution } => return Ok(distribution),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = row.get(*feature).copied().ok_or_else(|| {
                        InferenceError::MalformedTree {
                            tree,
                            reason: format!("feature {feature} out of range"),
                        }
                    })?;
                    let next = if value <= *threshold { *left } else { *right };
                    if next <= index {
                        return Err(InferenceError::MalformedTree {
                            tree,
                            reason: format!("node {index} points back to {next}"),
                        });
                    }
                    index = next;
                }
            }
        }
    }
}
