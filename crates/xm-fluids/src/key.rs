//! Fluid identity used to share backends between states.

use core::fmt;
use core::hash::{Hash, Hasher};

use crate::composition::Composition;
use crate::error::FluidResult;

/// Library + substance (+ composition) identity of a fluid.
///
/// Equality and hashing use the serialized key only; the medium name is a
/// display label.
#[derive(Debug, Clone)]
pub struct FluidKey {
    medium: String,
    library: String,
    substance: String,
    composition: Option<Composition>,
    id: String,
}

impl FluidKey {
    /// Pure-fluid key.
    pub fn new(library: impl Into<String>, substance: impl Into<String>) -> Self {
        let library = library.into();
        let substance = substance.into();
        let id = format!("{library}.{substance}");
        Self {
            medium: substance.clone(),
            library,
            substance,
            composition: None,
            id,
        }
    }

    /// Key for a `-`-separated mixture with one concentration per component.
    ///
    /// A single component with a single concentration stays a pure-fluid key.
    pub fn mixture(
        library: impl Into<String>,
        substance: impl Into<String>,
        concentrations: &[f64],
    ) -> FluidResult<Self> {
        let library = library.into();
        let substance = substance.into();
        let composition = Composition::from_substance(&substance, concentrations)?;
        if composition.len() == 1 {
            return Ok(Self::new(library, substance));
        }
        let id = format!("{library}.{}", composition.key_fragment());
        Ok(Self {
            medium: substance.clone(),
            library,
            substance,
            composition: Some(composition),
            id,
        })
    }

    /// Attach a display name (the caller's medium name).
    pub fn with_medium(mut self, medium: impl Into<String>) -> Self {
        self.medium = medium.into();
        self
    }

    pub fn medium(&self) -> &str {
        &self.medium
    }

    pub fn library(&self) -> &str {
        &self.library
    }

    pub fn substance(&self) -> &str {
        &self.substance
    }

    pub fn composition(&self) -> Option<&Composition> {
        self.composition.as_ref()
    }

    /// Serialized identity.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl PartialEq for FluidKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FluidKey {}

impl Hash for FluidKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for FluidKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}
