mod ledger_world;
mod setups;

pub use ledger_world::LedgerWorld;
