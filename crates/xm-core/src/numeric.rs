use crate::XmError;

/// Floating point type used throughout system
pub type Real = f64;

/// Relative test deciding whether a cached value still matches a caller's copy.
///
/// `|a - b| / max(|a|, floor) > rel` counts as a mismatch, where `a` is the
/// caller-supplied value. This is an equality check with slack for
/// representation noise, not a physical tolerance.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MismatchTolerance {
    pub rel: Real,
    pub floor: Real,
}

impl Default for MismatchTolerance {
    fn default() -> Self {
        Self {
            rel: 1e-15,
            floor: 1e-10,
        }
    }
}

impl MismatchTolerance {
    /// True when `supplied` and `cached` differ. Non-finite inputs always mismatch.
    pub fn mismatch(&self, supplied: Real, cached: Real) -> bool {
        let ratio = (supplied - cached).abs() / supplied.abs().max(self.floor);
        !(ratio <= self.rel)
    }

    /// Mismatch against a field that may not have been computed yet.
    pub fn mismatch_cached(&self, supplied: Real, cached: Option<Real>) -> bool {
        cached.is_none_or(|c| self.mismatch(supplied, c))
    }
}

/// Absolute/relative closeness, for comparing computed property values.
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

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, XmError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(XmError::NonFinite { what, value: v })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_values_match() {
        let tol = MismatchTolerance::default();
        assert!(!tol.mismatch(1e5, 1e5));
        assert!(!tol.mismatch(0.0, 0.0));
        assert!(!tol.mismatch(-2.5e6, -2.5e6));
    }

    #[test]
    fn tiny_relative_change_mismatches() {
        let tol = MismatchTolerance::default();
        assert!(tol.mismatch(1e5 * (1.0 + 1e-10), 1e5));
        assert!(tol.mismatch(1.000000000001e5, 1e5));
    }

    #[test]
    fn floor_avoids_blow_up_near_zero() {
        let tol = MismatchTolerance::default();
        // |a - b| / 1e-10 = 1e-16 / 1e-10 = 1e-6 > 1e-15
        assert!(tol.mismatch(0.0, 1e-16));
        let loose = MismatchTolerance {
            rel: 1e-5,
            floor: 1e-10,
        };
        assert!(!loose.mismatch(0.0, 1e-16));
    }

    #[test]
    fn non_finite_always_mismatches() {
        let tol = MismatchTolerance::default();
        assert!(tol.mismatch(Real::NAN, 1.0));
        assert!(tol.mismatch(1.0, Real::NAN));
        assert!(tol.mismatch(Real::INFINITY, Real::INFINITY));
    }

    #[test]
    fn unset_cache_mismatches() {
        let tol = MismatchTolerance::default();
        assert!(tol.mismatch_cached(1e5, None));
        assert!(!tol.mismatch_cached(1e5, Some(1e5)));
    }

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }
}
