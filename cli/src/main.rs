use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mrc_economy::{
    Address, GameConfig, LedgerConfig, MiningEconomy, PlayerState, TickSchedule, TokenLedger,
};
use mrc_miner::commands::{Command, HELP, describe_event, describe_ledger_event};
use mrc_miner::common::{format_token_amount, print_state};
use mrc_miner::progress::StatusDisplay;
use mrc_miner::{
    GameSession, LedgerMintExecutor, MintExecutor, SessionConfig, SimulatedWallet,
    spawn_tick_driver,
};
use parking_lot::Mutex;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Notify;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mrc-miner")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// JSON game configuration (economy and ledger parameters)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play an interactive mining session on the terminal
    Play {
        /// Auto-mine tick period in milliseconds
        #[arg(long, default_value = "1000")]
        tick_ms: u64,

        /// Give up on a mint after this many seconds
        #[arg(long, default_value = "10")]
        mint_timeout_secs: u64,

        /// Simulated wallet confirmation latency in milliseconds
        #[arg(long, default_value = "800")]
        wallet_latency_ms: u64,

        /// Probability (0..1) that the simulated wallet rejects a mint
        #[arg(long, default_value = "0.0")]
        failure_rate: f64,

        /// Start without a connected wallet (mints are refused)
        #[arg(long)]
        disconnected: bool,

        /// Mint into an in-memory token ledger instead of the simulated wallet
        #[arg(long)]
        ledger: bool,
    },
    /// Run a scripted session without waiting on real time
    Simulate {
        /// Number of manual mines
        #[arg(short, long, default_value = "200")]
        clicks: u64,

        /// Seconds of auto-mining to credit after the clicks
        #[arg(long, default_value = "0")]
        auto_secs: u64,

        /// Buy every affordable upgrade after each click
        #[arg(long)]
        greedy_upgrades: bool,

        /// Mint at the end of the run
        #[arg(long)]
        mint: bool,

        /// Print the final report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Deploy an in-memory token ledger and walk players through mining
    Ledger {
        /// Number of players
        #[arg(short, long, default_value = "3")]
        players: usize,

        /// Mining rounds per player
        #[arg(short, long, default_value = "5")]
        rounds: u32,

        /// Whole tokens requested per mine
        #[arg(short, long, default_value = "400")]
        amount: u64,

        /// Simulated seconds between rounds
        #[arg(long, default_value = "30")]
        interval_secs: u64,

        /// Override the mining cooldown in seconds
        #[arg(long)]
        cooldown: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = load_config(&args.config)?;

    match args.command {
        Some(Commands::Play {
            tick_ms,
            mint_timeout_secs,
            wallet_latency_ms,
            failure_rate,
            disconnected,
            ledger,
        }) => {
            if tick_ms == 0 {
                anyhow::bail!("Tick period must be at least 1 ms");
            }
            if !(0.0..=1.0).contains(&failure_rate) {
                anyhow::bail!("Failure rate must be between 0 and 1");
            }
            let session_config = SessionConfig::new(Duration::from_millis(tick_ms))
                .with_mint_timeout(Duration::from_secs(mint_timeout_secs))
                .with_connected(!disconnected)
                .with_wallet(Duration::from_millis(wallet_latency_ms), failure_rate);

            if ledger {
                let owner = Address::from_label("owner");
                let player = Address::from_label("player1");
                let token = Arc::new(Mutex::new(
                    TokenLedger::deploy(owner, config.ledger.clone())
                        .context("Failed to deploy token ledger")?,
                ));
                let executor = LedgerMintExecutor::new(token.clone(), owner, player);
                println!(
                    "📜 Minting into {} ledger as {}",
                    config.ledger.symbol,
                    executor.recipient()
                );
                run_play(&config, session_config, executor).await?;
                let token = token.lock();
                println!(
                    "🏦 On-chain balance of {}: {}",
                    player.short(),
                    format_token_amount(token.balance_of(player), token.config())
                );
                Ok(())
            } else {
                let executor = SimulatedWallet::new(
                    session_config.wallet_latency,
                    session_config.wallet_failure_rate,
                );
                run_play(&config, session_config, executor).await
            }
        }
        Some(Commands::Simulate {
            clicks,
            auto_secs,
            greedy_upgrades,
            mint,
            json,
        }) => run_simulation(&config, clicks, auto_secs, greedy_upgrades, mint, json).await,
        Some(Commands::Ledger {
            players,
            rounds,
            amount,
            interval_secs,
            cooldown,
        }) => {
            let mut ledger_config = config.ledger.clone();
            if let Some(secs) = cooldown {
                ledger_config = ledger_config.with_cooldown(secs);
            }
            run_ledger_walkthrough(ledger_config, players, rounds, amount, interval_secs)
        }
        None => {
            use clap::CommandFactory;
            Args::command().print_help()?;
            Ok(())
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: &Option<PathBuf>) -> Result<GameConfig> {
    match path {
        Some(p) => {
            let raw = fs::read_to_string(p)
                .with_context(|| format!("Failed to read config file {}", p.display()))?;
            let config = GameConfig::from_json(&raw)
                .with_context(|| format!("Invalid config file {}", p.display()))?;
            println!("⚙️  Loaded config from {}", p.display());
            Ok(config)
        }
        None => Ok(GameConfig::default()),
    }
}

// =============================================================================
// INTERACTIVE SESSION
// =============================================================================

async fn run_play<E: MintExecutor + 'static>(
    config: &GameConfig,
    session_config: SessionConfig,
    executor: E,
) -> Result<()> {
    let economy = MiningEconomy::new(config.economy.clone()).context("Invalid economy config")?;
    let session = Arc::new(GameSession::new(economy, executor, &session_config));
    let xp_per_level = session.economy().config().xp_per_level;

    println!("🎮 Token Miner Game - Web3 Edition");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    if !session.is_connected() {
        println!("🔌 Wallet not connected: mining works, minting is disabled");
    }
    println!("{}", HELP);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let display = Arc::new(StatusDisplay::new(xp_per_level));
    display.update(&session.snapshot());

    let cancel = Arc::new(AtomicBool::new(false));
    let shutdown = Arc::new(Notify::new());
    {
        let cancel = cancel.clone();
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            cancel.store(true, Ordering::SeqCst);
            shutdown.notify_one();
        })
        .ok();
    }

    let driver = {
        let display = display.clone();
        spawn_tick_driver(
            session.clone(),
            session_config.tick_period,
            cancel.clone(),
            move |transition| {
                for line in transition.events.iter().filter_map(describe_event) {
                    display.println(line);
                }
                display.update(&transition.state);
            },
        )?
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                display.println("⛔ Cancelled by user");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                let command = match line.parse::<Command>() {
                    Ok(command) => command,
                    Err(e) => {
                        display.println(format!("❓ {}", e));
                        continue;
                    }
                };
                if command == Command::Quit {
                    break;
                }
                handle_command(command, &session, &display);
            }
        }
    }

    cancel.store(true, Ordering::SeqCst);
    driver.abort();

    let state = session.snapshot();
    display.finish_with_summary(&state);
    println!();
    print_state(&state);
    Ok(())
}

fn handle_command<E: MintExecutor + 'static>(
    command: Command,
    session: &Arc<GameSession<E>>,
    display: &Arc<StatusDisplay>,
) {
    let outcome = match command {
        Command::Mine => Ok(session.mine()),
        Command::Upgrade => session.upgrade(),
        Command::ToggleAuto => Ok(session.toggle_active()),
        Command::Reset => session.reset(),
        Command::Mint => {
            spawn_mint(session.clone(), display.clone());
            return;
        }
        Command::Status => {
            display.println(mrc_miner::progress::status_line(&session.snapshot()));
            return;
        }
        Command::Help => {
            display.println(HELP);
            return;
        }
        Command::Quit => return,
    };

    match outcome {
        Ok(transition) => {
            for line in transition.events.iter().filter_map(describe_event) {
                display.println(line);
            }
            display.update(&transition.state);
        }
        Err(e) => display.println(format!("🚫 {}", e)),
    }
}

fn spawn_mint<E: MintExecutor + 'static>(session: Arc<GameSession<E>>, display: Arc<StatusDisplay>) {
    tokio::spawn(async move {
        if session.is_minting() {
            display.println("⏳ A mint is already in progress");
            return;
        }
        display.println("⏳ Minting...");
        match session.request_mint().await {
            Ok(receipt) => display.println(format!(
                "🪙 Minted {} real MRC (tx {})",
                receipt.amount, receipt.tx_hash
            )),
            Err(e) => display.println(format!("❌ Minting failed: {}", e)),
        }
        display.update(&session.snapshot());
    });
}

// =============================================================================
// SCRIPTED SIMULATION
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulationReport {
    clicks: u64,
    auto_ticks: u64,
    upgrades: u64,
    level_ups: u64,
    minted: Option<u64>,
    state: PlayerState,
}

async fn run_simulation(
    config: &GameConfig,
    clicks: u64,
    auto_secs: u64,
    greedy_upgrades: bool,
    mint: bool,
    json: bool,
) -> Result<()> {
    let economy = MiningEconomy::new(config.economy.clone()).context("Invalid economy config")?;
    let mut state = economy.initial_state();
    let mut upgrades = 0u64;
    let mut level_ups = 0u64;

    let count_level_ups = |events: &[mrc_economy::EconomyEvent]| {
        events
            .iter()
            .filter(|e| matches!(e, mrc_economy::EconomyEvent::LeveledUp { .. }))
            .count() as u64
    };

    for _ in 0..clicks {
        let t = economy.mine(&state);
        level_ups += count_level_ups(&t.events);
        state = t.state;
        while greedy_upgrades {
            match economy.upgrade(&state) {
                Ok(t) => {
                    upgrades += 1;
                    level_ups += count_level_ups(&t.events);
                    state = t.state;
                }
                Err(_) => break,
            }
        }
    }

    let mut auto_ticks = 0;
    if auto_secs > 0 {
        let mut schedule = TickSchedule::new(Duration::from_secs(1))?;
        auto_ticks = schedule.advance(Duration::from_secs(auto_secs));
        state = economy.toggle_active(&state).state;
        let t = economy.tick_many(&state, auto_ticks);
        level_ups += count_level_ups(&t.events);
        state = economy.toggle_active(&t.state).state;
    }

    let mut minted = None;
    if mint {
        let session = GameSession::from_state(
            economy,
            SimulatedWallet::new(Duration::ZERO, 0.0),
            &SessionConfig::default(),
            state,
        );
        match session.request_mint().await {
            Ok(receipt) => minted = Some(receipt.amount),
            Err(e) if !json => println!("❌ Minting failed: {}", e),
            Err(_) => {}
        }
        state = session.snapshot();
    }

    let report = SimulationReport {
        clicks,
        auto_ticks,
        upgrades,
        level_ups,
        minted,
        state,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("🚀 Simulated {} clicks + {} auto-mine ticks", clicks, auto_ticks);
    println!("🔧 Upgrades bought: {}", upgrades);
    println!("🆙 Threshold level-ups: {}", level_ups);
    if let Some(amount) = report.minted {
        println!("🪙 Minted: {} MRC", amount);
    }
    println!();
    print_state(&report.state);
    Ok(())
}

// =============================================================================
// LEDGER WALKTHROUGH
// =============================================================================

const GENESIS_TIMESTAMP: u64 = 1_700_000_000;

fn run_ledger_walkthrough(
    config: LedgerConfig,
    players: usize,
    rounds: u32,
    amount: u64,
    interval_secs: u64,
) -> Result<()> {
    if players == 0 {
        anyhow::bail!("At least one player is required");
    }
    let owner = Address::from_label("owner");
    let mut ledger =
        TokenLedger::deploy(owner, config.clone()).context("Failed to deploy token ledger")?;

    println!("📜 Deployed {} at genesis {}", ledger.name(), GENESIS_TIMESTAMP);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("👤 Owner:            {}", owner);
    println!("🏷️  Symbol:           {}", ledger.symbol());
    println!("🔢 Decimals:         {}", ledger.decimals());
    println!("💰 Initial Supply:   {}", format_token_amount(ledger.total_supply(), &config));
    println!("🧱 Max Supply:       {}", format_token_amount(ledger.max_supply(), &config));
    println!(
        "⛏️  Base Mining Rate: {} per mine",
        format_token_amount(ledger.base_mining_rate(), &config)
    );
    println!("📈 Level Multiplier: {} basis points", ledger.level_multiplier_bps());
    println!("⏱️  Mining Cooldown:  {} seconds", ledger.mining_cooldown());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    ledger.drain_events();

    let addresses: Vec<Address> = (1..=players)
        .map(|i| Address::from_label(&format!("player{}", i)))
        .collect();
    for player in &addresses {
        ledger.set_game_status(*player, true)?;
    }

    let request = config.to_base_units(amount);
    let mut now = GENESIS_TIMESTAMP;
    for round in 1..=rounds {
        println!("\n🔁 Round {} (t = +{}s)", round, now - GENESIS_TIMESTAMP);
        for player in &addresses {
            if let Err(e) = ledger.mine_tokens(*player, request, now) {
                println!("   ⛔ {}: {}", player.short(), e);
            }
        }
        // an immediate second attempt shows the cooldown at work
        if round == 1 && config.mining_cooldown_secs > 0 {
            if let Err(e) = ledger.mine_tokens(addresses[0], request, now) {
                println!("   ⛔ {} retry: {}", addresses[0].short(), e);
            }
        }
        for event in ledger.drain_events() {
            println!("   {}", describe_ledger_event(&event, &config));
        }
        now += interval_secs;
    }

    println!("\n📊 Player Statistics");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for player in &addresses {
        let stats = ledger.get_player_stats(*player)?;
        println!(
            "{} level {:>3} | mined {} | balance {}",
            player.short(),
            stats.level,
            format_token_amount(stats.mined, &config),
            format_token_amount(ledger.balance_of(*player), &config)
        );
    }
    println!(
        "🏦 Total supply: {} / {}",
        format_token_amount(ledger.total_supply(), &config),
        format_token_amount(ledger.max_supply(), &config)
    );
    Ok(())
}
