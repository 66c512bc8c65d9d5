//! Command-line entry point to a local DPoS delegation ledger.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;

use dpos_crypto::{encode_address, parse_address};
use dpos_delegation::{
    candidates, check_consistency, current_delegatee, delegators_of, DelegationAction, Transition,
};
use dpos_node::{init_logging, BlockProcessor, DelegationTx, LogFormat, NodeConfig, Receipt};
use dpos_store::{LedgerStore, LedgerView};
use dpos_store_lmdb::{check_data_dir, check_integrity, LmdbEnvironment};
use dpos_types::{Address, Index};

#[derive(Parser)]
#[command(name = "dpos-daemon", about = "DPoS delegation ledger daemon")]
struct Cli {
    /// Data directory for ledger storage.
    #[arg(long, env = "DPOS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "DPOS_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "DPOS_LOG_FORMAT")]
    log_format: Option<String>,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "DPOS_CONFIG")]
    config: Option<PathBuf>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Add an address to the candidate index.
    RegisterCandidate { candidate: String },
    /// Remove an address from the candidate index.
    WithdrawCandidate { candidate: String },
    /// Delegate the votes of `--from` to a candidate.
    Delegate {
        #[arg(long)]
        from: String,
        candidate: String,
    },
    /// Revoke the delegation of `--from` to a candidate.
    Undelegate {
        #[arg(long)]
        from: String,
        candidate: String,
    },
    /// Show the current delegatee of an address.
    Vote { delegator: String },
    /// List every delegator of a candidate.
    Delegators { candidate: String },
    /// List every registered candidate.
    Candidates,
    /// Print the raw entries of one index ("candidates", "votes", "delegates").
    Dump { index: Index },
    /// Verify storage integrity and index consistency.
    Check,
}

fn load_config(cli: &Cli) -> anyhow::Result<NodeConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let path = path.to_string_lossy();
            NodeConfig::from_toml_file(&path)
                .with_context(|| format!("failed to load config file {path}"))?
        }
        None => NodeConfig::default(),
    };
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = data_dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.clone();
    }
    Ok(config)
}

fn address(s: &str) -> anyhow::Result<Address> {
    parse_address(s).with_context(|| format!("invalid address '{s}'"))
}

fn print_receipt(receipt: &Receipt) -> anyhow::Result<()> {
    let gas = receipt
        .gas_used
        .map(|g| g.to_string())
        .unwrap_or_else(|| "uncharged".into());
    match &receipt.result {
        Ok(Transition::Delegated { from: None, to }) => {
            println!("delegated to {} ({gas})", encode_address(to));
        }
        Ok(Transition::Delegated { from: Some(from), to }) => {
            println!(
                "redelegated from {} to {} ({gas})",
                encode_address(from),
                encode_address(to)
            );
        }
        Ok(Transition::Undelegated { from }) => {
            println!("undelegated from {} ({gas})", encode_address(from));
        }
        Err(e) => bail!("rejected: {e} ({gas})"),
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let format: LogFormat = config.log_format.parse()?;
    init_logging(format, &config.log_level)?;

    check_data_dir(&config.data_dir)?;
    let env = LmdbEnvironment::open(&config.data_dir, config.map_size)
        .with_context(|| format!("failed to open ledger at {}", config.data_dir.display()))?;
    let processor = BlockProcessor::new(env);

    let genesis = config.genesis_addresses()?;
    if !genesis.is_empty() {
        processor.register_candidates(&genesis)?;
    }

    match cli.command {
        Command::RegisterCandidate { candidate } => {
            let candidate = address(&candidate)?;
            if processor.register_candidates(&[candidate])? == 0 {
                println!("{} is already a candidate", encode_address(&candidate));
            } else {
                println!("registered {}", encode_address(&candidate));
            }
        }
        Command::WithdrawCandidate { candidate } => {
            let candidate = address(&candidate)?;
            if !processor.withdraw_candidate(&candidate)? {
                bail!("{} is not a candidate", encode_address(&candidate));
            }
            println!("withdrew {}", encode_address(&candidate));
        }
        Command::Delegate { from, candidate } => {
            let tx = DelegationTx::new(address(&from)?, DelegationAction::delegate(candidate).encode()?);
            print_receipt(&processor.process_transaction(&tx)?)?;
        }
        Command::Undelegate { from, candidate } => {
            let tx =
                DelegationTx::new(address(&from)?, DelegationAction::undelegate(candidate).encode()?);
            print_receipt(&processor.process_transaction(&tx)?)?;
        }
        Command::Vote { delegator } => {
            let view = processor.store().view()?;
            match current_delegatee(&view, &address(&delegator)?)? {
                Some(delegatee) => println!("{}", encode_address(&delegatee)),
                None => println!("none"),
            }
        }
        Command::Delegators { candidate } => {
            let view = processor.store().view()?;
            for delegator in delegators_of(&view, &address(&candidate)?)? {
                println!("{}", encode_address(&delegator));
            }
        }
        Command::Candidates => {
            let view = processor.store().view()?;
            for candidate in candidates(&view)? {
                println!("{}", encode_address(&candidate));
            }
        }
        Command::Dump { index } => {
            let view = processor.store().view()?;
            for (key, value) in view.scan_prefix(index, &[])? {
                println!("{} {}", hex::encode(key), hex::encode(value));
            }
        }
        Command::Check => {
            let report = check_integrity(processor.store())?;
            for (index, count) in &report.entries {
                println!("{index}: {count} entries");
            }
            for error in &report.errors {
                println!("integrity: {error}");
            }
            let view = processor.store().view()?;
            let problems = check_consistency(&view)?;
            for problem in &problems {
                println!("consistency: {problem:?}");
            }
            if !report.is_healthy() || !problems.is_empty() {
                bail!(
                    "ledger check failed: {} integrity error(s), {} inconsistency(ies)",
                    report.errors.len(),
                    problems.len()
                );
            }
            tracing::info!(entries = report.total_entries(), "ledger check passed");
            println!("ok");
        }
    }

    Ok(())
}
