//! Ties the structural (`shipcore-graph`) and plumbing (`shipcore-fluid`)
//! layers into a single vehicle, plus the file format and per-frame driver
//! built on top of them (§3 `Vehicle`/`Part`, §5, §6).

pub mod driver;
pub mod factory;
pub mod file;
pub mod part;
pub mod vehicle;

pub use driver::{run_editor_frame, run_frame};
pub use factory::MachineFactory;
pub use part::{attached_machine_name, Part};
pub use vehicle::{PackState, Vehicle};
