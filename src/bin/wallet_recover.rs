//! Bitcoin Core wallet password recovery
//!
//! Tests a single password or every line of a wordlist against an encrypted
//! `wallet.dat`, then decrypts the keys, checks their balances and writes
//! the export files.
//!
//! ## Usage
//! ```bash
//! # Try one password
//! cargo run --bin wallet-recover --features cli -- --wallet wallet.dat --password "hunter2"
//!
//! # Try a wordlist on 8 threads, testnet, no balance lookups
//! cargo run --bin wallet-recover --features cli -- --wallet wallet.dat --wordlist words.txt \
//!     --threads 8 --testnet --skip-balance
//!
//! # Only JSON and CSV, into ./out, with a BlockCypher token
//! cargo run --bin wallet-recover --features cli -- --wallet wallet.dat --password "pw" \
//!     --formats json,csv --output-dir out --api-key blockcypher=TOKEN
//!
//! # Show wallet metadata and exit
//! cargo run --bin wallet-recover --features cli -- --wallet wallet.dat --info
//! ```

#[cfg(feature = "cli")]
use std::{
    path::{Path, PathBuf},
    time::Instant,
};

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use rayon::prelude::*;
#[cfg(feature = "cli")]
use tracing_subscriber::EnvFilter;

#[cfg(feature = "cli")]
use wallet_recovery_libs::{
    common::{format_btc, format_number},
    create_wallet_handler,
    errors::{FileAccessError, RecoveryError, WalletResult},
    export::{export_all, ExportFormat, ExportOptions},
    BalanceCheckStatus, Network, RecoveryOptions, WalletFormatHandler, WalletHandler,
};

/// Bitcoin Core wallet password recovery
#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Path to the encrypted wallet.dat
    #[arg(short, long)]
    wallet: PathBuf,

    /// Single password to test
    #[arg(short, long, conflicts_with = "wordlist")]
    password: Option<String>,

    /// File with one candidate password per line
    #[arg(long)]
    wordlist: Option<PathBuf>,

    /// Worker threads for wordlist trials (0 = one per core)
    #[arg(short, long, default_value = "0")]
    threads: usize,

    /// Derive testnet addresses and use testnet balance endpoints
    #[arg(long)]
    testnet: bool,

    /// Do not query balance providers
    #[arg(long)]
    skip_balance: bool,

    /// Provider access token, e.g. blockcypher=TOKEN (repeatable)
    #[arg(long = "api-key", value_name = "SERVICE=TOKEN")]
    api_keys: Vec<String>,

    /// Directory for the export files
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Export formats: text, json, csv, electrum
    #[arg(long, value_delimiter = ',', default_value = "text,json,csv,electrum")]
    formats: Vec<String>,

    /// Print wallet metadata and exit
    #[arg(long)]
    info: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[cfg(feature = "cli")]
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = if verbose > 0 {
        EnvFilter::new(level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(feature = "cli")]
fn recovery_options(args: &CliArgs) -> WalletResult<RecoveryOptions> {
    let network = if args.testnet {
        Network::Testnet
    } else {
        Network::Mainnet
    };
    let mut options = RecoveryOptions::default()
        .with_network(network)
        .with_balance_check(!args.skip_balance);

    for entry in &args.api_keys {
        let (service, token) = entry.split_once('=').ok_or_else(|| {
            RecoveryError::InvalidArgument(format!("--api-key expects SERVICE=TOKEN, got {entry}"))
        })?;
        options.balance.set_api_key(service.trim(), token.trim());
    }
    Ok(options)
}

#[cfg(feature = "cli")]
fn export_options(args: &CliArgs) -> WalletResult<ExportOptions> {
    let formats = args
        .formats
        .iter()
        .map(|f| f.parse::<ExportFormat>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(RecoveryError::InvalidArgument)?;
    Ok(ExportOptions::default()
        .with_output_dir(&args.output_dir)
        .with_formats(formats))
}

#[cfg(feature = "cli")]
fn read_wordlist(path: &Path) -> WalletResult<Vec<String>> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| FileAccessError::unreadable(path, e))?;
    Ok(contents
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Run the trials, returning the first accepted password
#[cfg(feature = "cli")]
fn find_password(handler: &WalletHandler, args: &CliArgs) -> WalletResult<Option<String>> {
    if let Some(password) = &args.password {
        return Ok(handler.test_password(password).then(|| password.clone()));
    }

    let Some(wordlist) = &args.wordlist else {
        return Err(RecoveryError::InvalidArgument(
            "one of --password or --wordlist is required".into(),
        ));
    };
    let candidates = read_wordlist(wordlist)?;

    println!(
        "🔑 Testing {} candidates (~{:?} each per thread)",
        format_number(candidates.len()),
        handler.estimated_test_time()
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build()
        .map_err(|e| RecoveryError::InvalidArgument(format!("thread pool: {e}")))?;

    let started = Instant::now();
    let found = pool.install(|| {
        candidates
            .par_iter()
            .find_any(|candidate| handler.test_password(candidate))
            .cloned()
    });
    tracing::info!(elapsed = ?started.elapsed(), found = found.is_some(), "Wordlist finished");
    Ok(found)
}

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> WalletResult<()> {
    let args = CliArgs::parse();
    init_logging(args.verbose);

    let options = recovery_options(&args)?;
    let export_options = export_options(&args)?;

    let handler = create_wallet_handler(&args.wallet, options)?;
    handler.load()?;

    if args.info {
        let metadata = handler.get_metadata()?;
        println!("📄 Wallet: {}", args.wallet.display());
        println!("   Format:          {}", metadata.format);
        println!("   Encryption:      {}", metadata.encryption);
        println!("   Iterations:      {}", format_number(metadata.iterations));
        println!("   Salt:            {}", metadata.salt);
        println!("   Master keys:     {}", metadata.master_key_count);
        println!("   Encrypted keys:  {}", metadata.encrypted_key_count);
        println!("   Est. trial time: {:?}", metadata.estimated_test_time());
        return Ok(());
    }

    let Some(password) = find_password(&handler, &args)? else {
        println!("❌ Password not found");
        std::process::exit(1);
    };
    println!("✅ Password found: {password}");

    let result = handler.recover_wallet(&password).await;
    if !result.success {
        eprintln!("❌ Password accepted but no private keys could be recovered");
        std::process::exit(1);
    }

    println!(
        "🔓 Recovered {} addresses, {} funded, total {} BTC",
        format_number(result.total_addresses),
        result.funded_addresses,
        format_btc(result.total_balance_satoshis)
    );
    if result.balance_check == BalanceCheckStatus::Unavailable {
        println!("⚠️  Balance services unreachable; balances are unknown");
    }

    let mut failed = false;
    for outcome in export_all(&result.keys, &export_options) {
        match &outcome.result {
            Ok(()) => println!("💾 {}: {}", outcome.format, outcome.path.display()),
            Err(e) => {
                eprintln!("❌ {}: {e}", outcome.format);
                failed = true;
            }
        }
    }
    if failed {
        std::process::exit(2);
    }

    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("This binary requires the 'cli' feature to be enabled.");
    eprintln!("Run with: cargo run --bin wallet-recover --features cli");
    std::process::exit(1);
}
