use core::fmt;
use spin::Mutex;

const MAX_COMPONENTS: usize = 8;

/// Kernel initialization status tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStatus {
    NotStarted,
    InProgress,
    Completed,
    Failed,
}

/// Kernel component status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentStatus {
    pub name: &'static str,
    pub status: InitStatus,
}

/// Fixed table so components can register before the heap exists.
pub struct StatusTable {
    entries: [Option<ComponentStatus>; MAX_COMPONENTS],
}

impl StatusTable {
    pub const fn new() -> Self {
        Self {
            entries: [None; MAX_COMPONENTS],
        }
    }

    /// Silently ignores registrations beyond the table size.
    pub fn register(&mut self, name: &'static str) {
        if self.iter().any(|c| c.name == name) {
            return;
        }
        if let Some(slot) = self.entries.iter_mut().find(|e| e.is_none()) {
            *slot = Some(ComponentStatus {
                name,
                status: InitStatus::NotStarted,
            });
        }
    }

    pub fn update(&mut self, name: &'static str, status: InitStatus) {
        if let Some(comp) = self.entries.iter_mut().flatten().find(|c| c.name == name) {
            comp.status = status;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentStatus> {
        self.entries.iter().flatten()
    }

    pub fn all_ready(&self) -> bool {
        let mut any = false;
        for comp in self.iter() {
            if comp.status != InitStatus::Completed {
                return false;
            }
            any = true;
        }
        any
    }
}

impl Default for StatusTable {
    fn default() -> Self {
        Self::new()
    }
}

static INIT_STATUS: Mutex<StatusTable> = Mutex::new(StatusTable::new());

/// Track kernel component initialization
pub fn register_component(name: &'static str) {
    INIT_STATUS.lock().register(name);
}

pub fn update_component_status(name: &'static str, status: InitStatus) {
    INIT_STATUS.lock().update(name, status);
}

/// Calls `f` for every registered component, in registration order.
pub fn for_each_component(mut f: impl FnMut(&ComponentStatus)) {
    INIT_STATUS.lock().iter().for_each(|c| f(c));
}

pub fn all_components_ready() -> bool {
    INIT_STATUS.lock().all_ready()
}

impl fmt::Display for InitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitStatus::NotStarted => write!(f, "Not Started"),
            InitStatus::InProgress => write!(f, "In Progress"),
            InitStatus::Completed => write!(f, "Completed"),
            InitStatus::Failed => write!(f, "Failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_table_lifecycle() {
        let mut table = StatusTable::new();
        assert!(!table.all_ready());

        table.register("Heap");
        table.register("Timer");
        table.register("Heap");
        assert_eq!(table.iter().count(), 2);

        table.update("Heap", InitStatus::Completed);
        assert!(!table.all_ready());
        table.update("Timer", InitStatus::Completed);
        assert!(table.all_ready());

        table.update("Timer", InitStatus::Failed);
        assert!(!table.all_ready());
    }

    #[test]
    fn test_status_table_is_bounded() {
        let mut table = StatusTable::new();
        let names = ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"];
        for name in names {
            table.register(name);
        }
        assert_eq!(table.iter().count(), MAX_COMPONENTS);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(InitStatus::InProgress.to_string(), "In Progress");
    }
}
