use anyhow::Context;
use log::{info, warn};

use hash_ledger::blockchain::{
    Account, AccountId, Blockchain, HashAlgorithm, HashFunction, Sha256Hasher, Sha512Hasher,
};
use hash_ledger::Config;

// Replays the three-account scenario against a fresh ledger
fn run<H: HashFunction>(mut blockchain: Blockchain<H>) {
    info!("Created ledger using {}", blockchain.hasher().name());

    let mut alice = Account::new("Alice", 5000.0, AccountId(1));
    let mut bob = Account::new("Bob", 3000.0, AccountId(2));
    let mut charlie = Account::new("Charlie", 1000.0, AccountId(3));

    let transfers = [
        blockchain.record_transfer(&mut alice, &mut bob, 1000.0),
        blockchain.record_transfer(&mut bob, &mut charlie, 500.0),
        blockchain.record_transfer(&mut charlie, &mut alice, 2000.0),
    ];
    for result in transfers {
        match result {
            Ok(block) => info!("Recorded transfer in block {}", block.index()),
            Err(err) => warn!("Transfer not recorded: {}", err),
        }
    }

    info!("Is blockchain valid? Answer: {}", blockchain.validate());

    info!("Balances:");
    for account in [&alice, &bob, &charlie] {
        info!("  {}", account);
    }

    for block in blockchain.blocks() {
        info!("\n{}", block);
    }
}

fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to read configuration")?;

    // RUST_LOG wins over LEDGER_LOG
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_filter.as_str()),
    )
    .init();

    match config.hash_algorithm {
        HashAlgorithm::Sha512 => run(Blockchain::with_hasher(Sha512Hasher)),
        HashAlgorithm::Sha256 => run(Blockchain::with_hasher(Sha256Hasher)),
    }

    Ok(())
}
