use super::vectorizer::SparseVector;

/// Cosine similarity of two sparse vectors, 0.0 when either has zero length
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f64 {
    let norm_a = a.norm();
    let norm_b = b.norm();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    a.dot(b) / (norm_a * norm_b)
}

/// Dense, symmetric N×N cosine similarity matrix
///
/// Rows and columns follow product id order. Built once from the fitted
/// document vectors and never modified afterwards.
#[derive(Debug, Clone, Default)]
pub struct SimilarityMatrix {
    size: usize,
    cells: Vec<f64>,
}

impl SimilarityMatrix {
    /// Computes every pairwise similarity
    ///
    /// Only the upper triangle is computed and then mirrored. The diagonal is
    /// pinned to exactly 1.0 for non-zero vectors and 0.0 for zero vectors.
    pub fn build(vectors: &[SparseVector]) -> Self {
        let size = vectors.len();
        let mut cells = vec![0.0; size * size];

        for i in 0..size {
            if vectors[i].is_zero() {
                continue;
            }
            cells[i * size + i] = 1.0;

            for j in (i + 1)..size {
                let sim = cosine_similarity(&vectors[i], &vectors[j]);
                cells[i * size + j] = sim;
                cells[j * size + i] = sim;
            }
        }

        Self { size, cells }
    }

    /// Number of rows (and columns)
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Similarity between products `i` and `j`, `None` if either is out of range
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if j >= self.size {
            return None;
        }
        self.row(i).map(|row| row[j])
    }

    /// Full row `i`, one entry per product
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        if i >= self.size {
            return None;
        }
        Some(&self.cells[i * self.size..(i + 1) * self.size])
    }
}
