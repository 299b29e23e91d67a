//! beacond - beacon relay group selection tool

use anyhow::{bail, Context, Result};
use beacon_consensus::{generate_ticket_range, next_group_index, Ticket, WireFormat};
use beacon_core::{GroupRegistry, NodeConfig, SelectionRound, StakingRegistry};
use beacon_crypto::{KeyPair, StakerPublicKey};
use clap::{Parser, Subcommand};
use num_bigint::BigUint;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Slots hashed and written per batch by `tickets`
const TICKET_CHUNK: u64 = 4096;

#[derive(Parser)]
#[command(name = "beacond")]
#[command(about = "Beacon relay group selection tool", version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new staker key pair
    Keygen,

    /// Print this staker's tickets for a beacon output, one wire-hex per line
    Tickets {
        /// Staker private key (hex)
        #[arg(long)]
        private_key: String,

        /// Previous beacon output (hex)
        #[arg(long)]
        beacon_output: String,

        /// Stake amount; slots = stake / minimum_stake
        #[arg(long, conflicts_with = "slots")]
        stake: Option<u64>,

        /// Number of virtual staker slots
        #[arg(long)]
        slots: Option<u64>,
    },

    /// Verify a ticket pool and select the candidate group
    Select {
        /// Previous beacon output (hex)
        #[arg(long)]
        beacon_output: String,

        /// File with one wire-hex ticket per line
        #[arg(long, value_name = "FILE")]
        pool: PathBuf,
    },

    /// Pick the group that answers the next relay request
    NextGroup {
        /// Previous beacon entry (hex, big-endian)
        #[arg(long)]
        entry: String,

        /// Number of registered groups; defaults to the configured registry
        #[arg(long)]
        groups: Option<usize>,

        /// Current block height; flags a stale responder group
        #[arg(long, conflicts_with = "groups")]
        current_block: Option<u64>,
    },
}

fn load_config(path: Option<&Path>) -> Result<NodeConfig> {
    match path {
        Some(path) => NodeConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(NodeConfig::default()),
    }
}

fn decode_hex_arg(name: &str, value: &str) -> Result<Vec<u8>> {
    hex::decode(value.trim().trim_start_matches("0x"))
        .with_context(|| format!("--{} is not valid hex", name))
}

fn read_pool(path: &Path) -> Result<Vec<Ticket>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading ticket pool {}", path.display()))?;

    let mut tickets = Vec::new();
    for (line_num, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match Ticket::decode_hex(line) {
            Ok(ticket) => tickets.push(ticket),
            Err(e) => log::warn!("Skipping pool line {}: {}", line_num + 1, e),
        }
    }
    Ok(tickets)
}

/// Write one wire-hex ticket per line, holding at most one chunk in memory
fn write_tickets<W: Write>(
    out: &mut W,
    beacon_output: &[u8],
    staker: &StakerPublicKey,
    slots: u64,
) -> io::Result<()> {
    let mut first = 1u64;
    while first <= slots {
        let last = first.saturating_add(TICKET_CHUNK - 1).min(slots);
        for ticket in generate_ticket_range(beacon_output, staker, first..=last) {
            writeln!(out, "{}", ticket.encode_hex())?;
        }
        if last == slots {
            break;
        }
        first = last + 1;
    }
    out.flush()
}

fn keygen() {
    let keypair = KeyPair::generate();
    println!("Private key: {}", keypair.private_key_hex());
    println!("Public key:  {}", keypair.public_key().compressed());
}

fn tickets(
    config: &NodeConfig,
    private_key: &str,
    beacon_output: &str,
    stake: Option<u64>,
    slots: Option<u64>,
) -> Result<()> {
    let keypair = KeyPair::from_private_key_hex(private_key)?;
    let beacon_output = decode_hex_arg("beacon-output", beacon_output)?;

    let slots = match (slots, stake) {
        (Some(slots), _) => slots,
        (None, Some(stake)) => {
            StakingRegistry::new(config.relay.minimum_stake)?.slots_for_stake(stake)
        }
        (None, None) => bail!("either --stake or --slots is required"),
    };
    log::info!(
        "Generating {} tickets for {}",
        slots,
        keypair.public_key().compressed()
    );

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    write_tickets(&mut out, &beacon_output, &keypair.public_key(), slots)?;
    Ok(())
}

fn select(config: &NodeConfig, beacon_output: &str, pool: &Path) -> Result<()> {
    if config.stakers.is_empty() {
        bail!("select needs a config file with [[stakers]] entries");
    }
    let registry = StakingRegistry::from_config(config)?;
    let beacon_output = decode_hex_arg("beacon-output", beacon_output)?;

    let mut round = SelectionRound::new(beacon_output, config.relay.clone())?;
    let submitted = round.submit_all(read_pool(pool)?)?;
    log::info!("Gathered {} distinct tickets", submitted);
    round.close_submissions()?;

    let outcome = round.finalize(&registry)?;

    println!(
        "Candidate group ({} of {}):",
        outcome.selected.len(),
        outcome.requested
    );
    for (rank, ticket) in outcome.selected.iter().enumerate() {
        println!(
            "  {:>3}. {} slot {} ticket {}",
            rank + 1,
            ticket.staker(),
            ticket.proof.virtual_staker_index,
            ticket.value
        );
    }
    if !outcome.rejected.is_empty() {
        println!("Rejected tickets: {}", outcome.rejected.len());
        for (ticket, reason) in &outcome.rejected {
            println!(
                "  {} slot {}: {}",
                ticket.staker(),
                ticket.proof.virtual_staker_index,
                reason
            );
        }
    }
    if outcome.is_short() {
        println!("Group is {} members short", outcome.missing());
    }
    Ok(())
}

fn next_group(
    config: &NodeConfig,
    entry: &str,
    groups: Option<usize>,
    current_block: Option<u64>,
) -> Result<()> {
    let entry = BigUint::from_bytes_be(&decode_hex_arg("entry", entry)?);

    match groups {
        Some(number_of_groups) => {
            println!("{}", next_group_index(&entry, number_of_groups));
        }
        None => {
            let registry = GroupRegistry::from_config(config)?;
            match registry.responder(&entry) {
                Some(group) => {
                    println!("{} {}", group.index, hex::encode(&group.public_key));
                    if let Some(block) = current_block {
                        if registry.is_stale(&group.public_key, block) {
                            log::warn!(
                                "⚠️  Group {} expired after block {}",
                                group.index,
                                group.expiry_block(
                                    config.relay.group_active_time,
                                    config.relay.relay_request_timeout
                                )
                            );
                            println!("stale at block {}", block);
                        }
                    }
                }
                None => bail!("no groups registered; pass --groups or a config with [[groups]]"),
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Keygen => keygen(),
        Commands::Tickets {
            private_key,
            beacon_output,
            stake,
            slots,
        } => tickets(&config, &private_key, &beacon_output, stake, slots)?,
        Commands::Select {
            beacon_output,
            pool,
        } => select(&config, &beacon_output, &pool)?,
        Commands::NextGroup {
            entry,
            groups,
            current_block,
        } => next_group(&config, &entry, groups, current_block)?,
    }

    Ok(())
}
