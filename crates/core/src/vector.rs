//! Vector types and low-level operations.

use ndarray::Array1;
use rand::Rng;

/// Scalar type used for ratings and parameters.
pub type Scalar = f64;

/// Dense latent vector.
pub type Vector = Array1<Scalar>;

/// Dot product summed left-to-right over the component index.
///
/// Both vectors must have the same length.
pub fn dot(a: &Vector, b: &Vector) -> Scalar {
    debug_assert_eq!(a.len(), b.len(), "dot product of mismatched dimensions");
    a.iter().zip(b.iter()).fold(0.0, |acc, (x, y)| acc + x * y)
}

/// Compute L2 norm of a vector, handling NaN/inf.
pub fn l2_norm(v: &Vector) -> Scalar {
    let mut sum_sq: Scalar = 0.0;
    for &x in v.iter() {
        if x.is_nan() {
            return Scalar::NAN;
        }
        if !x.is_finite() {
            return Scalar::INFINITY;
        }
        sum_sq += x * x;
    }
    sum_sq.sqrt()
}

/// Sum of squared components.
pub fn squared_norm(v: &Vector) -> Scalar {
    v.iter().fold(0.0, |acc, x| acc + x * x)
}

/// Draw `dim` independent uniform values in `[0, 1)`.
pub fn uniform_vector<R: Rng + ?Sized>(dim: usize, rng: &mut R) -> Vector {
    Array1::from_iter((0..dim).map(|_| rng.gen::<Scalar>()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_l2_norm() {
        let v = array![3.0, 4.0];
        assert!((l2_norm(&v) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_l2_norm_nan() {
        let v = array![1.0, Scalar::NAN, 2.0];
        assert!(l2_norm(&v).is_nan());
    }

    #[test]
    fn test_l2_norm_inf() {
        let v = array![1.0, Scalar::NEG_INFINITY];
        assert_eq!(l2_norm(&v), Scalar::INFINITY);
    }

    #[test]
    fn test_dot() {
        assert_eq!(dot(&array![1.0, 2.0, 3.0], &array![4.0, 5.0, 6.0]), 32.0);
        assert_eq!(dot(&Vector::zeros(0), &Vector::zeros(0)), 0.0);
    }

    #[test]
    fn test_squared_norm() {
        assert_eq!(squared_norm(&array![1.0, -2.0, 2.0]), 9.0);
    }

    #[test]
    fn test_uniform_vector_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let v = uniform_vector(64, &mut rng);
        assert_eq!(v.len(), 64);
        assert!(v.iter().all(|x| (0.0..1.0).contains(x)));
    }
}
