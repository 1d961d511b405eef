//! Machines and the ports through which they exchange fluid (§4.4 Machines
//! & Ports, §4.5 machine fluid interface).

use crate::fluids::StoredFluids;

/// Identifies a machine within its owning vehicle's registry.
///
/// Opaque and stable for the vehicle's lifetime; assigned by the part that
/// declares or attaches the machine (§3 `Part`: "a mapping `id → Machine`").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MachineId(pub u32);

/// A named endpoint on a machine's plumbing view (§3 `FluidPort`).
#[derive(Debug, Clone)]
pub struct FluidPort {
    pub id: String,
    pub machine: MachineId,
    /// A flow port is an inlet/outlet of a through-device; a real port is a
    /// reservoir boundary where fluid is actually created or destroyed.
    pub is_flow_port: bool,
}

/// The uniform lifecycle every machine supports (§4.4).
///
/// A part forwards each callback to its declared machines (map iteration
/// order unspecified) and its attached machines (insertion order); this
/// crate does not prescribe which, it only defines the callback surface
/// machine implementations fulfil.
pub trait Machine {
    fn pre_update(&mut self, dt: f64);
    fn update(&mut self, dt: f64);
    fn editor_update(&mut self, dt: f64);
    fn physics_update(&mut self, dt: f64);

    /// Machines that participate in the plumbing network expose this view;
    /// most machines return `None`.
    fn plumbing_mut(&mut self) -> Option<&mut dyn PlumbingMachine> { None }

    fn plumbing(&self) -> Option<&dyn PlumbingMachine> { None }
}

/// A machine's view into the fluid network (§3 `PlumbingMachine`, §4.5
/// machine fluid interface).
pub trait PlumbingMachine {
    /// The ports this machine exposes, in declaration order.
    fn ports(&self) -> &[FluidPort];

    /// Editor grid position of this machine's plumbing icon.
    fn editor_pos(&self) -> (i32, i32);

    /// Editor rotation, in the same units the file format persists.
    fn editor_rot(&self) -> i32;

    /// Editor icon footprint.
    fn editor_size(&self) -> (i32, i32);

    /// Removes up to `mass` of fluid through `port`. A preview
    /// (`do_it = false`) must not mutate machine state.
    fn out_flow(&mut self, port: &str, mass: f64, do_it: bool) -> StoredFluids;

    /// Injects `fluids` through `port`.
    fn in_flow(&mut self, port: &str, fluids: StoredFluids, do_it: bool);

    /// Pressure at a real port.
    fn get_pressure(&self, port: &str) -> f64;

    /// Pressure drop across a flow machine from `in_port` to `out_port`
    /// given inlet pressure `p_in`. Always `>= 0`.
    fn get_pressure_drop(&self, in_port: &str, out_port: &str, p_in: f64) -> f64;

    /// Ports reachable through the device from `port` (internal wiring of a
    /// flow machine).
    fn get_connected_ports(&self, port: &str) -> Vec<String>;

    fn find_port(&self, id: &str) -> Option<&FluidPort> { self.ports().iter().find(|p| p.id == id) }
}

/// Looks up a machine's plumbing view and whether a named port is a flow
/// port, used by the solver to classify path endpoints.
pub trait MachineRegistry {
    fn plumbing(&self, id: MachineId) -> &dyn PlumbingMachine;
    fn plumbing_mut(&mut self, id: MachineId) -> &mut dyn PlumbingMachine;
}
