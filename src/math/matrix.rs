use rand::Rng;
use serde::{Serialize, Deserialize};
use std::f64::consts::PI;
use std::ops::Mul;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows]
        }
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
        // Both samples in (0, 1] to avoid log(0).
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    fn normal<R: Rng + ?Sized>(rows: usize, cols: usize, std_dev: f64, rng: &mut R) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);
        for i in 0..rows {
            for j in 0..cols {
                res.data[i][j] = Matrix::sample_standard_normal(rng) * std_dev;
            }
        }
        res
    }

    /// He initialization: samples from N(0, sqrt(2 / rows)).
    ///
    /// Shape: (rows, cols). `rows` is the fan-in, matching the
    /// `input × weights` orientation used by dense layers.
    pub fn he<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        Matrix::normal(rows, cols, (2.0 / rows.max(1) as f64).sqrt(), rng)
    }

    /// Xavier (Glorot) initialization: samples from N(0, sqrt(1 / rows)).
    pub fn xavier<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        Matrix::normal(rows, cols, (1.0 / rows.max(1) as f64).sqrt(), rng)
    }

    /// Builds a matrix from row vectors. `cols` is taken from the first row;
    /// an empty input yields a 0×0 matrix.
    pub fn from_data(data: Vec<Vec<f64>>) -> Matrix {
        Matrix {
            rows: data.len(),
            cols: data.first().map_or(0, |r| r.len()),
            data
        }
    }

    /// True when `rows`/`cols` agree with the stored data. Deserialized
    /// matrices are not trusted until this holds.
    pub fn is_well_formed(&self) -> bool {
        self.data.len() == self.rows && self.data.iter().all(|r| r.len() == self.cols)
    }

    /// Adds a 1×cols row vector to every row (bias broadcast over a batch).
    pub fn add_row(&self, row: &Matrix) -> Matrix {
        if row.rows != 1 || row.cols != self.cols {
            panic!("Row vector is of incorrect size")
        }

        let mut res = self.clone();
        for r in res.data.iter_mut() {
            for (x, b) in r.iter_mut().zip(row.data[0].iter()) {
                *x += b;
            }
        }
        res
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

impl Mul for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Self) -> Self::Output {
        if self.cols != rhs.rows {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res =  Matrix::zeros(self.rows, rhs.cols);

        for i in 0..res.rows {
            for j in 0..res.cols {
                let mut sum = 0.0;

                for k in 0..self.cols {
                    sum += self.data[i][k] * rhs.data[k][j];
                }

                res.data[i][j] = sum;
            }
        }

        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn product_and_broadcast() {
        let a = Matrix::from_data(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let w = Matrix::from_data(vec![vec![1.0, 0.0, 1.0], vec![0.0, 1.0, 1.0]]);
        let b = Matrix::from_data(vec![vec![0.5, 0.5, 0.5]]);

        let out = (&a * &w).add_row(&b);
        assert_eq!(out.data, vec![vec![1.5, 2.5, 3.5], vec![3.5, 4.5, 7.5]]);
    }

    #[test]
    fn seeded_init_is_reproducible() {
        let a = Matrix::he(4, 3, &mut StdRng::seed_from_u64(7));
        let b = Matrix::he(4, 3, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert!(a.is_well_formed());
    }

    #[test]
    fn malformed_shape_is_detected() {
        let m = Matrix { rows: 2, cols: 2, data: vec![vec![1.0, 2.0]] };
        assert!(!m.is_well_formed());
        assert_eq!(Matrix::from_data(vec![]), Matrix::default());
    }
}
