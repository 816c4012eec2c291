//! Standard normal and bivariate normal distribution functions.

use ndarray::Array2;
use std::f64::consts::{FRAC_1_SQRT_2, PI};

/// Ten-point Gauss-Legendre nodes on [-1, 1] (positive half).
const GL_NODES: [f64; 5] = [
    0.148_874_338_981_631_2,
    0.433_395_394_129_247_2,
    0.679_409_568_299_024_4,
    0.865_063_366_688_984_5,
    0.973_906_528_517_171_7,
];

const GL_WEIGHTS: [f64; 5] = [
    0.295_524_224_714_752_9,
    0.269_266_719_309_996_3,
    0.219_086_362_515_982_0,
    0.149_451_349_150_580_6,
    0.066_671_344_308_688_1,
];

const PANELS: usize = 4;

/// Complementary error function, fractional error below 1.2e-7 everywhere.
pub fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -z * z - 1.265_512_23
        + t * (1.000_023_68
            + t * (0.374_091_96
                + t * (0.096_784_18
                    + t * (-0.186_288_06
                        + t * (0.278_868_07
                            + t * (-1.135_203_98
                                + t * (1.488_515_87
                                    + t * (-0.822_152_23 + t * 0.170_872_77))))))));
    let ans = t * poly.exp();
    if x >= 0.0 {
        ans
    } else {
        2.0 - ans
    }
}

/// Standard normal CDF.
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * erfc(-x * FRAC_1_SQRT_2)
}

/// P(X <= h, Y <= k) for standard normals with correlation `rho`.
///
/// Uses Sheppard's integral over the angle `asin(rho)`, which keeps the
/// integrand bounded for any correlation.
pub fn bivariate_cdf(h: f64, k: f64, rho: f64) -> f64 {
    if h == f64::NEG_INFINITY || k == f64::NEG_INFINITY {
        return 0.0;
    }
    if h == f64::INFINITY {
        return normal_cdf(k);
    }
    if k == f64::INFINITY {
        return normal_cdf(h);
    }
    let rho = rho.clamp(-1.0, 1.0);
    if rho == 1.0 {
        return normal_cdf(h.min(k));
    }
    if rho == -1.0 {
        return (normal_cdf(h) + normal_cdf(k) - 1.0).max(0.0);
    }
    let independent = normal_cdf(h) * normal_cdf(k);
    if rho == 0.0 {
        return independent;
    }

    let upper = rho.asin();
    let integrand = |theta: f64| {
        let (sin, cos) = theta.sin_cos();
        (-(h * h + k * k - 2.0 * h * k * sin) / (2.0 * cos * cos)).exp()
    };
    let width = upper / PANELS as f64;
    let mut integral = 0.0;
    for panel in 0..PANELS {
        let mid = width * (panel as f64 + 0.5);
        let half = 0.5 * width;
        for (node, weight) in GL_NODES.iter().zip(GL_WEIGHTS.iter()) {
            integral += weight * (integrand(mid - half * node) + integrand(mid + half * node));
        }
    }
    integral *= 0.5 * width;
    (independent + integral / (2.0 * PI)).clamp(0.0, 1.0)
}

/// Probability of every rectangle of the grid spanned by the standardized
/// edges `z1` x `z2`. Entry `[i, j]` covers `[z1[i], z1[i+1]) x [z2[j], z2[j+1])`.
///
/// The CDF is evaluated once per grid corner and shared by the four rectangles
/// touching it.
pub fn rectangle_probabilities(z1: &[f64], z2: &[f64], rho: f64) -> Array2<f64> {
    let rows = z1.len().saturating_sub(1);
    let cols = z2.len().saturating_sub(1);
    if rows == 0 || cols == 0 {
        return Array2::zeros((rows, cols));
    }
    let cdf = Array2::from_shape_fn((z1.len(), z2.len()), |(a, b)| {
        bivariate_cdf(z1[a], z2[b], rho)
    });
    Array2::from_shape_fn((rows, cols), |(i, j)| {
        (cdf[[i + 1, j + 1]] - cdf[[i, j + 1]] - cdf[[i + 1, j]] + cdf[[i, j]]).max(0.0)
    })
}
