//! Pairwise cosine similarity over the session's article vectors.

/// Cosine similarity between two vectors, computed in f64.
/// Zero-norm vectors score 0.0 against everything (no divide-by-zero).
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| *x as f64 * *y as f64)
        .sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Square symmetric N×N similarity matrix with a zeroed diagonal.
///
/// Values are clamped to [0, 1]: normalized text embeddings are non-negative
/// in practice, and the clamp makes the range a hard invariant for edge and
/// retrieval logic. The diagonal is forced to 0 so an article can never rank
/// as most similar to itself.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    n: usize,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    /// Compute the pairwise matrix. N=0 or N=1 yields an empty or trivial
    /// zero matrix.
    pub fn pairwise(vectors: &[Vec<f32>]) -> Self {
        let n = vectors.len();
        let mut values = vec![0.0; n * n];

        for i in 0..n {
            for j in (i + 1)..n {
                let sim = cosine_similarity(&vectors[i], &vectors[j]).clamp(0.0, 1.0);
                values[i * n + j] = sim;
                values[j * n + i] = sim;
            }
        }

        Self { n, values }
    }

    /// Build a matrix from raw row-major values. Diagonal is zeroed.
    /// Panics if `values` is not n×n.
    pub fn from_values(n: usize, mut values: Vec<f64>) -> Self {
        assert_eq!(values.len(), n * n, "similarity matrix must be square");
        for i in 0..n {
            values[i * n + i] = 0.0;
        }
        Self { n, values }
    }

    /// Number of articles (rows).
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.n + j]
    }

    /// Row of similarities for article `i`.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.n..(i + 1) * self.n]
    }
}

impl Default for SimilarityMatrix {
    /// The 0×0 matrix of an empty session.
    fn default() -> Self {
        Self {
            n: 0,
            values: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(components: &[f32]) -> Vec<f32> {
        let norm: f32 = components.iter().map(|x| x * x).sum::<f32>().sqrt();
        components.iter().map(|x| x / norm).collect()
    }

    #[test]
    fn empty_input_yields_empty_matrix() {
        let m = SimilarityMatrix::pairwise(&[]);
        assert!(m.is_empty());
        assert_eq!(m.len(), 0);
    }

    #[test]
    fn single_vector_yields_zero_matrix() {
        let m = SimilarityMatrix::pairwise(&[unit(&[1.0, 0.0])]);
        assert_eq!(m.len(), 1);
        assert_eq!(m.get(0, 0), 0.0);
    }

    #[test]
    fn matrix_is_symmetric() {
        let vectors = vec![
            unit(&[1.0, 0.2, 0.0]),
            unit(&[0.3, 1.0, 0.1]),
            unit(&[0.0, 0.5, 1.0]),
        ];
        let m = SimilarityMatrix::pairwise(&vectors);
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(m.get(i, j), m.get(j, i));
            }
        }
    }

    #[test]
    fn diagonal_is_zero() {
        let vectors = vec![unit(&[1.0, 1.0]), unit(&[1.0, 1.0])];
        let m = SimilarityMatrix::pairwise(&vectors);
        assert_eq!(m.get(0, 0), 0.0);
        assert_eq!(m.get(1, 1), 0.0);
        // Identical off-diagonal vectors still score 1.0.
        assert!((m.get(0, 1) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn values_stay_in_unit_range() {
        // Opposite vectors have cosine -1; the matrix clamps to 0.
        let vectors = vec![
            unit(&[1.0, 0.0]),
            unit(&[-1.0, 0.0]),
            unit(&[0.7, 0.7]),
        ];
        let m = SimilarityMatrix::pairwise(&vectors);
        for i in 0..3 {
            for j in 0..3 {
                let v = m.get(i, j);
                assert!((0.0..=1.0).contains(&v), "m[{i}][{j}] = {v} out of range");
            }
        }
        assert_eq!(m.get(0, 1), 0.0);
    }

    #[test]
    fn zero_norm_vector_scores_zero() {
        let vectors = vec![vec![0.0, 0.0], unit(&[1.0, 0.0])];
        let m = SimilarityMatrix::pairwise(&vectors);
        assert_eq!(m.get(0, 1), 0.0);
    }

    #[test]
    fn orthogonal_vectors_score_zero() {
        let m = SimilarityMatrix::pairwise(&[unit(&[1.0, 0.0]), unit(&[0.0, 1.0])]);
        assert!(m.get(0, 1).abs() < 1e-9);
    }

    #[test]
    #[should_panic(expected = "square")]
    fn from_values_rejects_non_square() {
        SimilarityMatrix::from_values(2, vec![0.0; 3]);
    }
}
