//! Bus kinds.
//!
//! Commands and queries share one bus implementation; the kind only names
//! the bus in logs and keeps a command bus from being passed where a query
//! bus is expected.

/// Marker for a bus flavour.
pub trait BusKind: Send + Sync + 'static {
    /// Short name used in log fields.
    const NAME: &'static str;
}

/// State-changing messages.
#[derive(Debug, Clone, Copy)]
pub enum Command {}

impl BusKind for Command {
    const NAME: &'static str = "command";
}

/// Read-only messages.
#[derive(Debug, Clone, Copy)]
pub enum Query {}

impl BusKind for Query {
    const NAME: &'static str = "query";
}
