//! Change detection between endpoint sets.

use crate::config::CompareMode;
use crate::inventory::Endpoint;

/// True unless `previous` and `current` are identical element by element.
///
/// Order-sensitive: the same members in a different order count as a change.
pub fn changed(previous: &[Endpoint], current: &[Endpoint]) -> bool {
    previous != current
}

/// Change detector honouring the configured [`CompareMode`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeDetector {
    mode: CompareMode,
}

impl ChangeDetector {
    pub fn new(mode: CompareMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> CompareMode {
        self.mode
    }

    pub fn changed(&self, previous: &[Endpoint], current: &[Endpoint]) -> bool {
        match self.mode {
            CompareMode::Strict => changed(previous, current),
            CompareMode::Normalized => {
                previous.len() != current.len() || sorted(previous) != sorted(current)
            }
        }
    }
}

fn sorted(set: &[Endpoint]) -> Vec<&Endpoint> {
    let mut refs: Vec<&Endpoint> = set.iter().collect();
    refs.sort_by(|a, b| {
        (&a.namespace, &a.name, &a.address).cmp(&(&b.namespace, &b.name, &b.address))
    });
    refs
}
