//! Mixture composition attached to a fluid key.

use crate::error::{FluidError, FluidResult};
use crate::record::MAX_COMPONENTS;

/// Named components with normalized concentrations, in the order supplied.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    /// Component names and fractions (always normalized to sum=1).
    items: Vec<(String, f64)>,
}

impl Composition {
    /// Create a composition from fractions.
    ///
    /// Validates that all fractions are finite, non-negative, and have a positive sum,
    /// then normalizes to sum=1. Order is preserved.
    pub fn new_fractions(fractions: Vec<(String, f64)>) -> FluidResult<Self> {
        if fractions.is_empty() {
            return Err(FluidError::InvalidArg {
                what: "empty composition",
            });
        }
        if fractions.len() > MAX_COMPONENTS {
            return Err(FluidError::InvalidArg {
                what: "too many mixture components",
            });
        }

        let mut sum = 0.0;
        for (_, frac) in &fractions {
            if !frac.is_finite() {
                return Err(FluidError::NonPhysical {
                    what: "non-finite concentration",
                });
            }
            if *frac < 0.0 {
                return Err(FluidError::NonPhysical {
                    what: "negative concentration",
                });
            }
            sum += frac;
        }

        if sum <= 0.0 || !sum.is_finite() {
            return Err(FluidError::NonPhysical {
                what: "concentrations sum to zero or non-finite",
            });
        }

        Ok(Self {
            items: fractions.into_iter().map(|(n, f)| (n, f / sum)).collect(),
        })
    }

    /// Pair a `-`-separated substance string with one concentration per component.
    pub fn from_substance(substance: &str, concentrations: &[f64]) -> FluidResult<Self> {
        let names: Vec<&str> = substance.split('-').map(str::trim).collect();
        if names.iter().any(|n| n.is_empty()) {
            return Err(FluidError::InvalidArg {
                what: "empty component name",
            });
        }
        if names.len() != concentrations.len() {
            return Err(FluidError::InvalidArg {
                what: "one concentration is required per component",
            });
        }
        Self::new_fractions(
            names
                .into_iter()
                .map(str::to_owned)
                .zip(concentrations.iter().copied())
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.items.iter().map(|(n, f)| (n.as_str(), *f))
    }

    pub fn fractions(&self) -> Vec<f64> {
        self.items.iter().map(|(_, f)| *f).collect()
    }

    /// Key fragment `name_c/name_c/...` with 12 significant digits per concentration.
    pub fn key_fragment(&self) -> String {
        self.items
            .iter()
            .map(|(name, frac)| format!("{name}_{}", significant(*frac, 12)))
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Shortest decimal rendering of `v` rounded to `digits` significant digits.
pub(crate) fn significant(v: f64, digits: usize) -> String {
    let rounded = format!("{:.*e}", digits.saturating_sub(1), v);
    match rounded.parse::<f64>() {
        Ok(r) => format!("{r}"),
        Err(_) => rounded,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use xm_core::{Tolerances, nearly_equal};

    proptest! {
        #[test]
        fn normalized_sum_is_one(fracs in prop::collection::vec(0.0_f64..1.0_f64, 1..6)) {
            let names = ["a", "b", "c", "d", "e", "f"];
            let substance = names[..fracs.len()].join("-");

            if let Ok(comp) = Composition::from_substance(&substance, &fracs) {
                let sum: f64 = comp.iter().map(|(_, f)| f).sum();
                let tol = Tolerances { abs: 1e-9, rel: 1e-9 };
                prop_assert!(nearly_equal(sum, 1.0, tol));
            }
        }
    }
}
