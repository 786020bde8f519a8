//! Small fixed-size 3-vector helpers used by the particle model and the reaction resolver.

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

/// Fixed spatial dimension (3D).
pub const DIM: usize = 3;

/// A position or velocity vector.
pub type Vec3 = [f64; DIM];

/// Cross products with a squared norm below this are treated as degenerate.
const EPS_AXIS_SQ: f64 = 1e-24;

/// Weight of the random component in a soft directional blend.
pub const BLEND_NOISE: f64 = 0.4;

#[inline]
pub fn dot(a: &Vec3, b: &Vec3) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[inline]
pub fn sub(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn add(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub fn scale(a: &Vec3, s: f64) -> Vec3 {
    [a[0] * s, a[1] * s, a[2] * s]
}

#[inline]
pub fn cross(a: &Vec3, b: &Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
pub fn norm(a: &Vec3) -> f64 {
    dot(a, a).sqrt()
}

/// Draw an isotropic unit vector from three standard-normal samples.
///
/// A zero-length draw (vanishingly rare) falls back to +x.
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let v: Vec3 = [
        StandardNormal.sample(rng),
        StandardNormal.sample(rng),
        StandardNormal.sample(rng),
    ];
    let n = norm(&v);
    if n == 0.0 || !n.is_finite() {
        return [1.0, 0.0, 0.0];
    }
    scale(&v, 1.0 / n)
}

/// Unit vector perpendicular to both `a` and `b`, or an isotropic random
/// direction when the two are (nearly) parallel or either is zero.
pub fn fission_axis<R: Rng + ?Sized>(a: &Vec3, b: &Vec3, rng: &mut R) -> Vec3 {
    let c = cross(a, b);
    let n_sq = dot(&c, &c);
    if n_sq <= EPS_AXIS_SQ || !n_sq.is_finite() {
        return random_unit_vector(rng);
    }
    scale(&c, 1.0 / n_sq.sqrt())
}

/// `(axis + 0.4 * noise) / 1.4`.
///
/// The result is not renormalized: its length lies in [0.6/1.4, 1].
#[inline]
pub fn soft_blend(axis: &Vec3, noise: &Vec3) -> Vec3 {
    scale(&add(axis, &scale(noise, BLEND_NOISE)), 1.0 / (1.0 + BLEND_NOISE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn cross_of_basis_vectors() {
        assert_eq!(cross(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]), [0.0, 0.0, 1.0]);
        assert_eq!(cross(&[0.0, 1.0, 0.0], &[1.0, 0.0, 0.0]), [0.0, 0.0, -1.0]);
    }

    #[test]
    fn random_unit_vectors_are_unit_length() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let u = random_unit_vector(&mut rng);
            assert!((norm(&u) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn parallel_velocities_fall_back_to_random_axis() {
        let mut rng = StdRng::seed_from_u64(5);
        let axis = fission_axis(&[2.0, 0.0, 0.0], &[-7.0, 0.0, 0.0], &mut rng);
        assert!((norm(&axis) - 1.0).abs() < 1e-12);

        let axis = fission_axis(&[0.0, 0.0, 0.0], &[1.0, 2.0, 3.0], &mut rng);
        assert!((norm(&axis) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn fission_axis_is_normalized_cross_product() {
        let mut rng = StdRng::seed_from_u64(5);
        let axis = fission_axis(&[3.0, 0.0, 0.0], &[0.0, 5.0, 0.0], &mut rng);
        assert!((axis[2] - 1.0).abs() < 1e-12);
        assert!(axis[0].abs() < 1e-12 && axis[1].abs() < 1e-12);
    }

    #[test]
    fn soft_blend_is_not_unit_norm_in_general() {
        let b = soft_blend(&[1.0, 0.0, 0.0], &[-1.0, 0.0, 0.0]);
        assert!((norm(&b) - 0.6 / 1.4).abs() < 1e-12);
        let b = soft_blend(&[1.0, 0.0, 0.0], &[1.0, 0.0, 0.0]);
        assert!((norm(&b) - 1.0).abs() < 1e-12);
    }
}
