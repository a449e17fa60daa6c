mod ledger;
mod migration;
mod snapshot;

pub use ledger::{ModuleTotals, ProgressLedger};
pub use migration::{DATA_VERSION, GateOutcome, VersionGate};
pub use snapshot::ProgressSnapshot;
