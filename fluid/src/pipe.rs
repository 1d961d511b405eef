//! An undirected connector between two resolved ports (§3 `Pipe`).
//!
//! On-disk pipes hold a pending reference to a part/machine-name pair that
//! cannot be resolved until every machine in the vehicle exists; resolving
//! that reference into a [`MachineId`] is specific to how a vehicle names
//! its parts and machines, so it is handled by the vehicle loader, not by
//! this crate. By the time a `Pipe` is constructed here its endpoints are
//! already concrete.

use crate::machine::MachineId;

/// One resolved endpoint of a pipe.
#[derive(Debug, Clone, PartialEq)]
pub struct PipeEndpoint {
    pub machine: MachineId,
    pub port: String,
}

/// An undirected connector between two ports with an `a → b` direction
/// convention (§3 `Pipe`).
#[derive(Debug, Clone)]
pub struct Pipe {
    pub a: PipeEndpoint,
    pub b: PipeEndpoint,
    /// 2D integer routing waypoints for the editor grid; not consulted by
    /// the solver.
    pub waypoints: Vec<(i32, i32)>,
    /// Last computed flow along this pipe, signed by the `a → b`
    /// convention. Reset to zero at the start of every solver tick.
    pub flow: f64,
    pub surface: f64,
}

impl Pipe {
    /// The endpoint at `near` (`a` when `!backwards`, `b` when `backwards`).
    #[must_use]
    pub fn near(&self, backwards: bool) -> &PipeEndpoint { if backwards { &self.b } else { &self.a } }

    /// The endpoint at `far` (`b` when `!backwards`, `a` when `backwards`).
    #[must_use]
    pub fn far(&self, backwards: bool) -> &PipeEndpoint { if backwards { &self.a } else { &self.b } }

    /// Adds `delta` to `flow`, signed so that a positive `delta` always
    /// means "fluid moved in the traversal direction" (§4.5.4: "sign =
    /// backwards ? +flow : -flow").
    pub fn accumulate_flow(&mut self, delta: f64, backwards: bool) {
        self.flow += if backwards { delta } else { -delta };
    }
}
