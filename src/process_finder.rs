//! Process lookup for the pre-run presence check.

use sysinfo::{ProcessesToUpdate, System};

/// Finds running processes by (case-insensitive, partial) name.
///
/// # Example
///
/// ```
/// use click_key_sequencer::ProcessFinder;
///
/// let mut finder = ProcessFinder::new();
/// match finder.find_process("mblock") {
///     Some(pid) => println!("target is running as PID {}", pid),
///     None => println!("target is not running"),
/// }
/// ```
pub struct ProcessFinder {
    system: System,
}

impl Default for ProcessFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessFinder {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }

    pub fn find_process(&mut self, process_name: &str) -> Option<u32> {
        self.system.refresh_processes(ProcessesToUpdate::All, true);

        let wanted = process_name.to_lowercase();
        self.system
            .processes()
            .iter()
            .find(|(_, process)| {
                process
                    .name()
                    .to_string_lossy()
                    .to_lowercase()
                    .contains(&wanted)
            })
            .map(|(pid, _)| pid.as_u32())
    }
}
