//! Machines, fluid ports, pipes and the pressure-driven plumbing solver
//! (§4.4 Machines & Ports, §4.5 Plumbing Solver).

pub mod fluids;
pub mod machine;
pub mod pipe;
pub mod solver;
pub mod wire;

pub use fluids::{PhaseMass, Species, StoredFluids};
pub use machine::{FluidPort, Machine, MachineId, MachineRegistry, PlumbingMachine};
pub use pipe::{Pipe, PipeEndpoint};
pub use solver::{enumerate_paths, reduce_forced_paths, run_tick, FlowPath, FLOW_MULTIPLIER};
pub use wire::WireMap;
