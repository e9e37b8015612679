use anyhow::Result;
use env_logger::Builder;
use log::{error, info, warn, LevelFilter};
use solana_wallet_watchdog::config::PushMode;
use solana_wallet_watchdog::monitor::SolanaRpcSource;
use solana_wallet_watchdog::notify::{LogNotifier, Notifier, RateLimitedNotifier, TelegramNotifier};
use solana_wallet_watchdog::{Watchdog, WatchdogConfig};
use std::io::Write;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::io::{AsyncBufReadExt, BufReader};

const DEFAULT_REPLY_TARGET: &str = "console";

// Simple CLI without clap
#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before the logger so RUST_LOG can come from it
    dotenv::dotenv().ok();

    // Initialize logger; RUST_LOG overrides the default level
    Builder::new()
        .format(|buf, record| {
            let secs = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default();
            writeln!(buf, "{} [{}] - {}", secs, record.level(), record.args())
        })
        .filter(None, LevelFilter::Info)
        .parse_default_env()
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().skip(1).any(|a| a == "--version" || a == "-v") {
        println!("Solana Wallet Watchdog v{}", solana_wallet_watchdog::VERSION);
        return Ok(());
    }
    if args.iter().skip(1).any(|a| a == "--help" || a == "-h") {
        print_usage(&args[0]);
        return Ok(());
    }

    let mut config = WatchdogConfig::from_env()?;

    // Parse optional arguments
    let mut account = None;
    let mut chat = None;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--chat" | "-c" => {
                if i + 1 < args.len() {
                    chat = Some(args[i + 1].clone());
                    i += 2;
                } else {
                    println!("Error: Missing value for --chat");
                    return Ok(());
                }
            }
            "--pull-only" => {
                config.push_mode = PushMode::Disabled;
                i += 1;
            }
            arg if arg.starts_with('-') => {
                println!("Unknown argument: {}", arg);
                i += 1;
            }
            arg => {
                account = Some(arg.to_string());
                i += 1;
            }
        }
    }

    let reply_to = chat
        .or_else(|| config.alert_chat_id.clone())
        .unwrap_or_else(|| DEFAULT_REPLY_TARGET.to_string());

    let delivery: Box<dyn Notifier> = match &config.telegram_bot_token {
        Some(token) => {
            info!("📨 Delivering messages through Telegram");
            Box::new(TelegramNotifier::new(token, config.fetch_timeout)?)
        }
        None => {
            info!("📝 No TELEGRAM_BOT_TOKEN set, messages go to the log");
            Box::new(LogNotifier)
        }
    };
    let notifier = Arc::new(RateLimitedNotifier::new(delivery, config.notify_min_interval));
    let source = Arc::new(SolanaRpcSource::new(&config));

    info!("Solana Wallet Watchdog v{}", solana_wallet_watchdog::VERSION);
    info!(
        "RPC {} | threshold {} SOL | pause {:?} | poll every {:?} | push {}",
        config.rpc_http_url,
        config.threshold_sol(),
        config.pause_threshold,
        config.poll_interval,
        if config.push_mode == PushMode::Enabled { "on" } else { "off" }
    );

    let watchdog = Watchdog::new(config, source, notifier)?;

    if let Some(account) = account {
        watchdog.watch(&account, reply_to.as_str()).await?;
    } else {
        println!("Type `watch <ACCOUNT> [CHAT]` to start monitoring, `help` for commands.");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                break;
            }
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    // stdin closed: keep running until interrupted
                    Ok(None) => {
                        tokio::signal::ctrl_c().await?;
                        break;
                    }
                    Err(e) => {
                        error!("Failed to read command: {}", e);
                        break;
                    }
                };
                if !run_command(&watchdog, &line, &reply_to).await {
                    break;
                }
            }
        }
    }

    watchdog.stop().await;
    Ok(())
}

/// Execute one console command; returns `false` on `quit`.
async fn run_command(watchdog: &Watchdog, line: &str, default_reply_to: &str) -> bool {
    let mut parts = line.split_whitespace();
    match parts.next() {
        Some("watch") => match parts.next() {
            Some(account) => {
                let reply_to = parts.next().unwrap_or(default_reply_to);
                match watchdog.watch(account, reply_to).await {
                    Ok(epoch) => println!("Watching {} (epoch {})", account, epoch),
                    Err(e) => warn!("⚠️ {}", e),
                }
            }
            None => println!("Usage: watch <ACCOUNT> [CHAT]"),
        },
        Some("stop") => match watchdog.stop().await {
            Some(target) => println!("Stopped watching {}", target),
            None => println!("Nothing is being watched"),
        },
        Some("status") => match watchdog.snapshot().await {
            Some(s) => println!(
                "{} (epoch {}): {} signatures seen, {}s since last transfer, alert {}",
                s.account,
                s.epoch,
                s.seen_signatures,
                s.since_last_transfer.as_secs(),
                if s.alert_latched { "active" } else { "clear" }
            ),
            None => println!("Nothing is being watched"),
        },
        Some("quit") | Some("exit") => return false,
        Some("help") => {
            println!("Commands:");
            println!("  watch <ACCOUNT> [CHAT]   Watch an account, replacing the current one");
            println!("  stop                     Stop watching");
            println!("  status                   Show the current watch");
            println!("  quit                     Exit");
        }
        Some(other) => println!("Unknown command: {}", other),
        None => {}
    }
    true
}

fn print_usage(program: &str) {
    println!("Solana Wallet Watchdog v{}", solana_wallet_watchdog::VERSION);
    println!("\nUsage:");
    println!("  {} [ACCOUNT] [--chat ID] [--pull-only]", program);
    println!("  {} --version", program);
    println!("\nOptions:");
    println!("  --chat, -c ID        Reply target for messages (default: ALERT_CHAT_ID or console)");
    println!("  --pull-only          Disable the push subscription and rely on polling");
    println!("  --version, -v        Show version information");
    println!("\nConfiguration is read from the environment (RPC_HTTP_URL, RPC_WS_URL,");
    println!("THRESHOLD_SOL, PAUSE_THRESHOLD, POLL_SIGNATURES_INTERVAL, TELEGRAM_BOT_TOKEN, ...).");
}
