//! Fluid quantities moved through the plumbing network (§3 `StoredFluids`).

use std::collections::HashMap;

/// Identifies a species of fluid (a prototype-defined gas or liquid kind).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Species(pub u32);

/// Mass of one species split between its gas and liquid phase.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhaseMass {
    pub gas: f64,
    pub liquid: f64,
}

/// A bag of fluid, keyed by species, each carrying separate gas and liquid
/// mass (§3 `StoredFluids`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredFluids {
    by_species: HashMap<Species, PhaseMass>,
}

impl StoredFluids {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn single_gas(species: Species, mass: f64) -> Self {
        let mut fluids = Self::new();
        fluids.by_species.insert(species, PhaseMass { gas: mass, liquid: 0.0 });
        fluids
    }

    #[must_use]
    pub fn get(&self, species: Species) -> PhaseMass { self.by_species.get(&species).copied().unwrap_or_default() }

    pub fn set(&mut self, species: Species, mass: PhaseMass) {
        if mass.gas == 0.0 && mass.liquid == 0.0 {
            self.by_species.remove(&species);
        } else {
            self.by_species.insert(species, mass);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Species, PhaseMass)> + '_ {
        self.by_species.iter().map(|(&species, &mass)| (species, mass))
    }

    /// Adds `other`'s masses onto `self`, species by species.
    pub fn add(&mut self, other: &Self) {
        for (species, mass) in other.iter() {
            let current = self.get(species);
            self.set(
                species,
                PhaseMass { gas: current.gas + mass.gas, liquid: current.liquid + mass.liquid },
            );
        }
    }

    /// Subtracts `other`'s masses from `self`, clamping each phase at zero.
    pub fn subtract_clamped(&mut self, other: &Self) {
        for (species, mass) in other.iter() {
            let current = self.get(species);
            self.set(
                species,
                PhaseMass {
                    gas: (current.gas - mass.gas).max(0.0),
                    liquid: (current.liquid - mass.liquid).max(0.0),
                },
            );
        }
    }

    /// Pointwise add or subtract: positive masses in `other` are added,
    /// which matches the solver's use of `modify` to both remove (negated)
    /// and inject fluid.
    pub fn modify(&mut self, other: &Self) { self.add(other); }

    #[must_use]
    pub fn get_total_gas_mass(&self) -> f64 { self.by_species.values().map(|m| m.gas).sum() }

    #[must_use]
    pub fn get_total_liquid_mass(&self) -> f64 { self.by_species.values().map(|m| m.liquid).sum() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.by_species.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_subtract_clamped_returns_to_zero() {
        let mut bag = StoredFluids::new();
        let methane = Species(0);
        bag.add(&StoredFluids::single_gas(methane, 5.0));
        assert_eq!(bag.get_total_gas_mass(), 5.0);

        bag.subtract_clamped(&StoredFluids::single_gas(methane, 8.0));
        assert_eq!(bag.get_total_gas_mass(), 0.0);
        assert!(bag.is_empty());
    }
}
