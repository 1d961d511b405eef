//! The seam between the vehicle loader and the (out-of-scope) prototype and
//! scripting systems that actually know how to build machine behavior
//! (§9: "a factory keyed by script name at load"; §1 non-goals: "the
//! scripting engine used for part logic").

use shipcore_fluid::Machine;

/// Builds the machine behavior objects a vehicle file references.
///
/// The vehicle file format (§6.1) only carries a part's prototype name and
/// per-machine overrides, not the machines' actual behavior; a real
/// integration implements this trait against its asset/prototype and
/// scripting systems. Tests and examples in this crate use a minimal
/// factory that returns inert placeholder machines.
pub trait MachineFactory {
    /// Builds the declared machine set for a part instantiated from
    /// `proto`, keyed by the machine id used in the file's override
    /// tables.
    fn declared_machines(&mut self, proto: &str) -> Vec<(String, Box<dyn Machine>)>;

    /// Builds one attached machine from its init-data table.
    fn attached_machine(&mut self, init: &toml::Table) -> Box<dyn Machine>;

    /// Applies a per-machine override table (plumbing position/rotation)
    /// loaded alongside a part's `proto`.
    fn apply_override(&mut self, machine: &mut dyn Machine, plumbing_rot: Option<i32>, plumbing_pos: Option<(i32, i32)>);
}
