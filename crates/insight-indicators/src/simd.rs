//! SIMD reductions used by the windowed statistics.
//!
//! These use the `wide` crate for portable SIMD and fall back to scalar
//! loops for the remainder lanes.

use wide::f64x4;

/// Sum of all values.
pub fn sum(data: &[f64]) -> f64 {
    let chunks = data.len() / 4;
    let mut acc = f64x4::splat(0.0);

    for i in 0..chunks {
        let idx = i * 4;
        acc += f64x4::new([data[idx], data[idx + 1], data[idx + 2], data[idx + 3]]);
    }

    let mut result = acc.reduce_add();
    for &value in &data[chunks * 4..] {
        result += value;
    }
    result
}

/// Dot product of two equally long slices (extra elements are ignored).
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    let len = a.len().min(b.len());
    let chunks = len / 4;
    let mut acc = f64x4::splat(0.0);

    for i in 0..chunks {
        let idx = i * 4;
        let va = f64x4::new([a[idx], a[idx + 1], a[idx + 2], a[idx + 3]]);
        let vb = f64x4::new([b[idx], b[idx + 1], b[idx + 2], b[idx + 3]]);
        acc += va * vb;
    }

    let mut result = acc.reduce_add();
    for idx in chunks * 4..len {
        result += a[idx] * b[idx];
    }
    result
}

/// Sum of squared deviations from `mean`.
pub fn sum_squared_deviation(data: &[f64], mean: f64) -> f64 {
    let chunks = data.len() / 4;
    let mean_vec = f64x4::splat(mean);
    let mut acc = f64x4::splat(0.0);

    for i in 0..chunks {
        let idx = i * 4;
        let values = f64x4::new([data[idx], data[idx + 1], data[idx + 2], data[idx + 3]]);
        let diff = values - mean_vec;
        acc += diff * diff;
    }

    let mut result = acc.reduce_add();
    for &value in &data[chunks * 4..] {
        result += (value - mean).powi(2);
    }
    result
}

/// Population standard deviation of a window.
pub fn std_dev(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let n = data.len() as f64;
    let mean = sum(data) / n;
    (sum_squared_deviation(data, mean) / n).sqrt()
}
