use cucumber::given;

use crate::cucumber::{ledger_world::LedgerSystem, LedgerWorld};

#[given("a fresh install")]
async fn fresh_database(world: &mut LedgerWorld) {
    let system = LedgerSystem::new().await;
    world.system = Some(system);
}
