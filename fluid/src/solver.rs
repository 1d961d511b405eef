//! The pressure-driven plumbing solver (§4.5): path enumeration, pressure-drop
//! calculation, forced-path reduction, and flow execution.

use std::collections::HashSet;

use crate::fluids::StoredFluids;
use crate::machine::MachineRegistry;
use crate::pipe::Pipe;

/// The flow rate scale applied to every moved mass (§4.5.4). Acknowledged in
/// the original engine as an arbitrary constant tuned against plausible
/// rocket-scale pressures and pipe sizes; treated as a fixed tunable here.
pub const FLOW_MULTIPLIER: f64 = 2e-6;

/// The maximum number of forced-path reduction sweeps before the
/// configuration is considered malformed (§4.5.3).
pub const MAX_REDUCTION_ITERATIONS: u32 = 100;

/// A candidate or retained route from one real port to another through zero
/// or more flow machines (§3 `FlowPath`).
#[derive(Debug, Clone)]
pub struct FlowPath {
    /// Pipe indices, in traversal order.
    pub pipes: Vec<usize>,
    /// Traversal direction relative to each pipe's `a → b` convention.
    pub backwards: bool,
    /// End pressure minus (start pressure minus accumulated drops); only
    /// negative values drive flow.
    pub delta_p: f64,
}

impl FlowPath {
    #[must_use]
    pub fn start_pipe(&self) -> usize { *self.pipes.first().expect("FlowPath must have at least one pipe") }

    #[must_use]
    pub fn end_pipe(&self) -> usize { *self.pipes.last().expect("FlowPath must have at least one pipe") }
}

/// Runs one full plumbing tick: resets pipe flows, enumerates candidate
/// paths, reduces them to a mutually compatible set, and executes flow
/// along every retained path with `delta_p < 0` (§4.5, §5 "plumbing tick").
///
/// # Errors
/// Returns an error if forced-path reduction fails to converge within
/// [`MAX_REDUCTION_ITERATIONS`] sweeps.
pub fn run_tick(pipes: &mut [Pipe], registry: &mut dyn MachineRegistry, dt: f64) -> anyhow::Result<()> {
    for pipe in pipes.iter_mut() {
        pipe.flow = 0.0;
    }

    let candidates = enumerate_paths(pipes, registry);
    let retained = reduce_forced_paths(candidates)?;
    execute_flow(pipes, registry, &retained, dt);
    Ok(())
}

/// Finds every feasible real-port-to-real-port path (§4.5.1), keeping only
/// those with strictly falling pressure (§4.5.2).
///
/// # Panics
/// Panics if a pipe's endpoint references an unknown port, if a seed pipe
/// does not start at a real port, or if two consecutive pipes along a
/// traversal do not meet at the same machine — all structural corruption
/// that §7 calls fatal.
#[must_use]
pub fn enumerate_paths(pipes: &[Pipe], registry: &dyn MachineRegistry) -> Vec<FlowPath> {
    let mut candidates = Vec::new();

    for (start_index, seed_pipe) in pipes.iter().enumerate() {
        for &backwards in &[false, true] {
            let start = seed_pipe.near(backwards);
            let start_is_real = !registry
                .plumbing(start.machine)
                .find_port(&start.port)
                .unwrap_or_else(|| panic!("pipe {start_index} references unknown port {:?}", start.port))
                .is_flow_port;
            if !start_is_real {
                continue;
            }

            let mut stack = vec![vec![start_index]];
            while let Some(path) = stack.pop() {
                let last = &pipes[*path.last().expect("path is never empty")];
                let frontier = last.far(backwards);
                let frontier_port = registry
                    .plumbing(frontier.machine)
                    .find_port(&frontier.port)
                    .unwrap_or_else(|| panic!("path references unknown port {:?}", frontier.port));

                if frontier_port.is_flow_port {
                    let connected = registry.plumbing(frontier.machine).get_connected_ports(&frontier.port);
                    for next_port in connected {
                        for (q_index, q) in pipes.iter().enumerate() {
                            let near = q.near(backwards);
                            if near.machine == frontier.machine && near.port == next_port {
                                let mut extended = path.clone();
                                extended.push(q_index);
                                stack.push(extended);
                            }
                        }
                    }
                } else {
                    let delta_p = compute_delta_p(&path, backwards, pipes, registry);
                    if delta_p < 0.0 {
                        candidates.push(FlowPath { pipes: path, backwards, delta_p });
                    }
                }
            }
        }
    }

    candidates
}

/// Computes Δp for a fully enumerated path (§4.5.2).
fn compute_delta_p(path: &[usize], backwards: bool, pipes: &[Pipe], registry: &dyn MachineRegistry) -> f64 {
    let start = pipes[path[0]].near(backwards);
    let start_p = registry.plumbing(start.machine).get_pressure(&start.port);

    let mut p_drop = 0.0;
    for window in path.windows(2) {
        let in_endpoint = pipes[window[0]].far(backwards);
        let out_endpoint = pipes[window[1]].near(backwards);
        assert_eq!(
            in_endpoint.machine, out_endpoint.machine,
            "consecutive pipes in a path must meet at the same machine"
        );
        let p_in = start_p - p_drop;
        p_drop +=
            registry.plumbing(in_endpoint.machine).get_pressure_drop(&in_endpoint.port, &out_endpoint.port, p_in);
    }

    let end = pipes[*path.last().expect("path is never empty")].far(backwards);
    let end_p = registry.plumbing(end.machine).get_pressure(&end.port);

    end_p - (start_p - p_drop)
}

/// Reduces `candidates` to a mutually compatible set (§4.5.3).
///
/// # Errors
/// Returns an error if reduction does not converge within
/// [`MAX_REDUCTION_ITERATIONS`] sweeps.
pub fn reduce_forced_paths(mut candidates: Vec<FlowPath>) -> anyhow::Result<Vec<FlowPath>> {
    for iteration in 0.. {
        anyhow::ensure!(
            iteration < MAX_REDUCTION_ITERATIONS,
            "plumbing forced-path reduction did not converge within {MAX_REDUCTION_ITERATIONS} iterations"
        );

        let forced = find_forced(&candidates);
        if forced.is_empty() {
            break;
        }

        let mut to_delete: HashSet<usize> = HashSet::new();
        for &f in &forced {
            for i in 0..candidates.len() {
                if i != f && is_incompatible(&candidates[i], &candidates[f]) {
                    to_delete.insert(i);
                }
            }
        }
        if to_delete.is_empty() {
            break;
        }

        let mut indices: Vec<usize> = to_delete.into_iter().collect();
        indices.sort_unstable_by(|a, b| b.cmp(a));
        for i in indices {
            candidates.remove(i);
        }
    }

    Ok(candidates)
}

/// Indices of candidates whose start real port is unique among starts and
/// whose end real port is unique among ends.
fn find_forced(candidates: &[FlowPath]) -> Vec<usize> {
    let mut by_start: std::collections::HashMap<usize, u32> = std::collections::HashMap::new();
    let mut by_end: std::collections::HashMap<usize, u32> = std::collections::HashMap::new();
    for c in candidates {
        *by_start.entry(c.start_pipe()).or_default() += 1;
        *by_end.entry(c.end_pipe()).or_default() += 1;
    }
    candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| by_start[&c.start_pipe()] == 1 && by_end[&c.end_pipe()] == 1)
        .map(|(i, _)| i)
        .collect()
}

/// Whether `p` shares a pipe index with `forced` at some position but
/// diverges at the next position (§4.5.3).
fn is_incompatible(p: &FlowPath, forced: &FlowPath) -> bool {
    for i in 0..p.pipes.len().min(forced.pipes.len()) {
        if p.pipes[i] != forced.pipes[i] {
            continue;
        }
        let next = i + 1;
        if next < p.pipes.len() && next < forced.pipes.len() && p.pipes[next] != forced.pipes[next] {
            return true;
        }
    }
    false
}

/// Moves fluid along every retained path (§4.5.4).
fn execute_flow(pipes: &mut [Pipe], registry: &mut dyn MachineRegistry, paths: &[FlowPath], dt: f64) {
    for path in paths {
        let to_move = -path.delta_p * FLOW_MULTIPLIER * dt;
        if to_move == 0.0 {
            continue;
        }

        let start = pipes[path.start_pipe()].near(path.backwards).clone();
        let end = pipes[path.end_pipe()].far(path.backwards).clone();

        let buffer = registry.plumbing_mut(start.machine).out_flow(&start.port, to_move, true);
        let flow = buffer.get_total_gas_mass() + buffer.get_total_liquid_mass();

        for &pipe_index in &path.pipes {
            pipes[pipe_index].accumulate_flow(flow, path.backwards);
        }

        registry.plumbing_mut(end.machine).in_flow(&end.port, buffer, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::{FluidPort, MachineId, PlumbingMachine};

    struct RealPort {
        pressure: f64,
        out: Option<StoredFluids>,
        received: Option<StoredFluids>,
        ports: Vec<FluidPort>,
    }

    impl PlumbingMachine for RealPort {
        fn ports(&self) -> &[FluidPort] { &self.ports }
        fn editor_pos(&self) -> (i32, i32) { (0, 0) }
        fn editor_rot(&self) -> i32 { 0 }
        fn editor_size(&self) -> (i32, i32) { (1, 1) }
        fn out_flow(&mut self, _port: &str, mass: f64, do_it: bool) -> StoredFluids {
            let fluids = StoredFluids::single_gas(crate::fluids::Species(0), mass);
            if do_it {
                self.out = Some(fluids.clone());
            }
            fluids
        }
        fn in_flow(&mut self, _port: &str, fluids: StoredFluids, do_it: bool) {
            if do_it {
                self.received = Some(fluids);
            }
        }
        fn get_pressure(&self, _port: &str) -> f64 { self.pressure }
        fn get_pressure_drop(&self, _in_port: &str, _out_port: &str, _p_in: f64) -> f64 { 0.0 }
        fn get_connected_ports(&self, _port: &str) -> Vec<String> { Vec::new() }
    }

    struct TestRegistry {
        inlet: RealPort,
        outlet: RealPort,
    }

    impl MachineRegistry for TestRegistry {
        fn plumbing(&self, id: MachineId) -> &dyn PlumbingMachine {
            if id == MachineId(0) { &self.inlet } else { &self.outlet }
        }
        fn plumbing_mut(&mut self, id: MachineId) -> &mut dyn PlumbingMachine {
            if id == MachineId(0) { &mut self.inlet } else { &mut self.outlet }
        }
    }

    fn endpoint(machine: u32) -> crate::pipe::PipeEndpoint {
        crate::pipe::PipeEndpoint { machine: MachineId(machine), port: "main".into() }
    }

    #[test]
    fn straight_pipe_between_two_real_ports() {
        let mut registry = TestRegistry {
            inlet: RealPort {
                pressure: 100.0,
                out: None,
                received: None,
                ports: vec![FluidPort { id: "main".into(), machine: MachineId(0), is_flow_port: false }],
            },
            outlet: RealPort {
                pressure: 50.0,
                out: None,
                received: None,
                ports: vec![FluidPort { id: "main".into(), machine: MachineId(1), is_flow_port: false }],
            },
        };
        let mut pipes =
            vec![Pipe { a: endpoint(0), b: endpoint(1), waypoints: Vec::new(), flow: 0.0, surface: 1.0 }];

        let candidates = enumerate_paths(&pipes, &registry);
        assert_eq!(candidates.len(), 1);
        assert!(!candidates[0].backwards);
        assert_eq!(candidates[0].delta_p, -50.0);

        run_tick(&mut pipes, &mut registry, 1.0).unwrap();
        assert_eq!(registry.inlet.out.unwrap().get_total_gas_mass(), 50.0 * FLOW_MULTIPLIER);
        assert_eq!(pipes[0].flow, -50.0 * FLOW_MULTIPLIER);
    }
}
