use crate::MonitorError;

/// Floating point type used throughout system
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str, index: usize) -> Result<Real, MonitorError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(MonitorError::NonFinite {
            what,
            index,
            value: v,
        })
    }
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: impl IntoIterator<Item = Real>) -> Option<Real> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as Real)
}
