use std::collections::HashMap;

use crate::error::Severity;

/// Tunables passed in by the embedder: an explicit parameter struct rather
/// than ambient/global configuration.
#[derive(Debug, Clone)]
pub struct AssemblerOptions {
    /// Gates the jump-merge optimizer (§4.4): fusion only runs above 0.
    pub optimization_level: u8,
    /// Per-error-number severity overrides, the `-wd`/`-we`/`-ed`/`-ew`
    /// external surface (§7).
    pub severity_overrides: HashMap<u16, Severity>,
    /// Diagnostics suppressed once a pass exceeds this many reports.
    pub error_cap: u32,
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self {
            optimization_level: 1,
            severity_overrides: HashMap::new(),
            error_cap: 50,
        }
    }
}

impl AssemblerOptions {
    pub fn optimizations_enabled(&self) -> bool {
        self.optimization_level > 0
    }
}
