/// Dense row-major square matrix
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    n: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![0.0; n * n],
        }
    }

    #[cfg(test)]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.n + col]
    }

    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.n + col] += value;
    }

    /// `XᵀX` and `Xᵀy` for a design given row by row.
    pub fn normal_equations<'a, I>(n: usize, rows: I, y: &[f64]) -> (Self, Vec<f64>)
    where
        I: IntoIterator<Item = &'a [f64]>,
    {
        let mut xtx = Self::zeros(n);
        let mut xty = vec![0.0; n];
        for (row, &target) in rows.into_iter().zip(y) {
            for i in 0..n {
                if row[i] == 0.0 {
                    continue;
                }
                xty[i] += row[i] * target;
                for j in 0..n {
                    xtx.add(i, j, row[i] * row[j]);
                }
            }
        }
        (xtx, xty)
    }

    /// Solve `A x = b` by Gaussian elimination with partial pivoting.
    /// Returns `None` for a (numerically) singular system.
    pub fn solve(&self, b: &[f64]) -> Option<Vec<f64>> {
        let n = self.n;
        if b.len() != n {
            return None;
        }
        let mut a = self.data.clone();
        let mut x = b.to_vec();

        for col in 0..n {
            let pivot_row = (col..n).max_by(|&r1, &r2| a[r1 * n + col].abs().total_cmp(&a[r2 * n + col].abs()))?;
            let pivot = a[pivot_row * n + col];
            if pivot.abs() < 1e-12 {
                return None;
            }
            if pivot_row != col {
                for j in 0..n {
                    a.swap(col * n + j, pivot_row * n + j);
                }
                x.swap(col, pivot_row);
            }

            for row in (col + 1)..n {
                let factor = a[row * n + col] / pivot;
                if factor == 0.0 {
                    continue;
                }
                for j in col..n {
                    a[row * n + j] -= factor * a[col * n + j];
                }
                x[row] -= factor * x[col];
            }
        }

        for row in (0..n).rev() {
            let tail: f64 = ((row + 1)..n).map(|j| a[row * n + j] * x[j]).sum();
            x[row] = (x[row] - tail) / a[row * n + row];
        }

        x.iter().all(|v| v.is_finite()).then_some(x)
    }
}
