//! Process access
//!
//! Process enumeration, the owned process handle, and module lookup.
//! Everything above this layer talks to a target through [`TargetProcess`].

pub mod enumerator;
pub mod handle;
pub mod modules;
pub mod target;

pub use enumerator::{enumerate_processes, find_process_by_name, find_processes_by_name};
pub use handle::{ProcessAccess, ProcessHandle};
pub use modules::{find_module_by_pid, ModuleEnumerator};
pub use target::TargetProcess;
