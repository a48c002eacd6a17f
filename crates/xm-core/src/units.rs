// xm-core/src/units.rs

use uom::si::f64::{
    MassDensity as UomMassDensity, MolarMass as UomMolarMass, Pressure as UomPressure,
    ThermodynamicTemperature as UomThermodynamicTemperature,
};

// Public canonical unit types (SI, f64)
pub type Density = UomMassDensity;
pub type MolarMass = UomMolarMass;
pub type Pressure = UomPressure;
pub type Temperature = UomThermodynamicTemperature;

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn kg_m3(v: f64) -> Density {
    use uom::si::mass_density::kilogram_per_cubic_meter;
    Density::new::<kilogram_per_cubic_meter>(v)
}

#[inline]
pub fn kg_per_mol(v: f64) -> MolarMass {
    use uom::si::molar_mass::kilogram_per_mole;
    MolarMass::new::<kilogram_per_mole>(v)
}

pub mod constants {
    /// Universal gas constant [J/(mol·K)]
    pub const R_UNIVERSAL: f64 = 8.314_462_618;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_store_si_values() {
        assert_eq!(pa(101_325.0).value, 101_325.0);
        assert_eq!(k(300.0).value, 300.0);
        assert_eq!(kg_m3(998.2).value, 998.2);
        assert_eq!(kg_per_mol(0.018_015).value, 0.018_015);
    }
}
