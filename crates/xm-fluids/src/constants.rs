//! Fluid constants fixed when a backend is constructed.

use xm_core::units::{Density, MolarMass, Pressure, Temperature, k, kg_m3, kg_per_mol, pa};

/// Critical point and molar mass of a fluid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluidConstants {
    pub molar_mass: MolarMass,
    pub critical_temperature: Temperature,
    pub critical_pressure: Pressure,
    pub critical_density: Density,
}

impl FluidConstants {
    /// Build from SI values: kg/mol, K, Pa, kg/m³.
    pub fn from_si(molar_mass: f64, tc: f64, pc: f64, dc: f64) -> Self {
        Self {
            molar_mass: kg_per_mol(molar_mass),
            critical_temperature: k(tc),
            critical_pressure: pa(pc),
            critical_density: kg_m3(dc),
        }
    }

    /// Critical molar volume [m³/mol] = MM / dc.
    pub fn critical_molar_volume(&self) -> f64 {
        self.molar_mass.value / self.critical_density.value
    }
}
