//! keethings-link CLI - drive the wallet controller against a scripted wallet
//!
//!   keethings-link simulate                     → connect, balance, disconnect
//!   keethings-link simulate --reject NO_ACCOUNTS → connect fails with that code
//!   keethings-link simulate --switch kta1def    → account switch mid-session
//!   keethings-link simulate --offline           → no extension in the page
//!   keethings-link format 9000000000            → "9.000000000"
//!
//! Every view update the presenter renders is printed as it happens; the
//! command result (notifications plus final state) is printed as JSON.

use anyhow::{anyhow, bail, Context, Result};
use keethings_link::logging::init_logging_with;
use keethings_link::{
    format_balance, Notification, ScriptedBridge, StatusPresenter, ViewSink, ViewUpdate, WalletConfig,
    WalletController,
};
use serde_json::{json, Value};
use std::env;
use std::io::IsTerminal;
use std::time::Duration;

const DEFAULT_ADDRESS: &str = "kta1abc";
const DEFAULT_BALANCE: &str = "9000000000";
const DEFAULT_TIMEOUT_MS: u64 = 5_000;

fn main() {
    let args: Vec<String> = env::args().collect();
    let opts = ParsedArgs::parse(&args[1..]);

    init_logging_with(if opts.verbose { "keethings_link=debug" } else { "warn" });

    if opts.help {
        print_usage();
        return;
    }

    if opts.version {
        println!("keethings-link {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let result = match opts.command.as_deref() {
        Some("simulate") | Some("sim") => cmd_simulate(&opts),
        Some("format") => cmd_format(&opts),
        Some(cmd) => Err(anyhow!("Unknown command: {}", cmd)),
        None => {
            print_usage();
            return;
        }
    };

    let pretty = opts.pretty || std::io::stdout().is_terminal();
    match result {
        Ok(output) => println!("{}", render_json(&output, pretty)),
        Err(e) => {
            eprintln!("{}", render_json(&json!({"error": format!("{:#}", e)}), pretty));
            std::process::exit(1);
        }
    }
}

fn render_json(value: &Value, pretty: bool) -> String {
    let rendered = if pretty { serde_json::to_string_pretty(value) } else { serde_json::to_string(value) };
    rendered.unwrap_or_else(|_| value.to_string())
}

#[derive(Default)]
struct ParsedArgs {
    command: Option<String>,
    value: Option<String>,
    // Wallet script
    address: Option<String>,
    balance: Option<String>,
    reject: Option<String>,
    switch_to: Option<String>,
    offline: bool,
    // Config
    config: Option<String>,
    decimals: Option<u32>,
    timeout_ms: Option<u64>,
    // Output
    json: bool,
    pretty: bool,
    verbose: bool,
    help: bool,
    version: bool,
}

impl ParsedArgs {
    fn parse(args: &[String]) -> Self {
        let mut opts = ParsedArgs::default();
        let mut positional = Vec::new();
        let mut i = 0;

        while i < args.len() {
            let arg = &args[i];
            let next = args.get(i + 1).cloned();
            match arg.as_str() {
                "--help" | "-h" => opts.help = true,
                "--version" | "-V" => opts.version = true,
                "--json" => opts.json = true,
                "--pretty" => opts.pretty = true,
                "--verbose" | "-v" => opts.verbose = true,
                "--offline" => opts.offline = true,
                "--address" | "-a" => { opts.address = next; i += 1; }
                "--balance" | "-b" => { opts.balance = next; i += 1; }
                "--reject" => { opts.reject = next; i += 1; }
                "--switch" => { opts.switch_to = next; i += 1; }
                "--config" | "-c" => { opts.config = next; i += 1; }
                "--decimals" => { opts.decimals = next.and_then(|v| v.parse().ok()); i += 1; }
                "--timeout-ms" => { opts.timeout_ms = next.and_then(|v| v.parse().ok()); i += 1; }
                _ if !arg.starts_with('-') => positional.push(arg.clone()),
                _ => {} // Ignore unknown flags
            }
            i += 1;
        }

        // First positional is command, second its argument
        let mut positional = positional.into_iter();
        opts.command = positional.next();
        opts.value = positional.next();

        // Environment variables (lower priority than CLI args)
        if opts.config.is_none() {
            opts.config = env::var("KEETHINGS_CONFIG").ok().filter(|s| !s.is_empty());
        }
        opts
    }

    fn wallet_config(&self) -> Result<WalletConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path).with_context(|| format!("reading config {}", path))?;
                WalletConfig::from_json(&raw).with_context(|| format!("parsing config {}", path))?
            }
            None => WalletConfig::default(),
        };
        if let Some(decimals) = self.decimals {
            config = config.with_decimals(decimals);
        }
        Ok(config)
    }
}

// =============================================================================
// COMMANDS
// =============================================================================

fn cmd_format(opts: &ParsedArgs) -> Result<Value> {
    let raw = opts.value.as_deref().ok_or_else(|| anyhow!("format needs a balance, e.g. `format 9000000000`"))?;
    let config = opts.wallet_config()?;
    match format_balance(raw, config.decimals) {
        Some(formatted) => Ok(json!({"raw": raw, "formatted": formatted, "ticker": config.ticker})),
        None => bail!("not a decimal number: {}", raw),
    }
}

fn cmd_simulate(opts: &ParsedArgs) -> Result<Value> {
    let config = opts.wallet_config()?;
    let bridge = if opts.offline {
        ScriptedBridge::offline()
    } else {
        let bridge = ScriptedBridge::new().with_balance(opts.balance.as_deref().unwrap_or(DEFAULT_BALANCE));
        match &opts.reject {
            Some(code) => bridge.rejecting(code.as_str()),
            None => bridge.approving(opts.address.as_deref().unwrap_or(DEFAULT_ADDRESS)),
        }
    };

    let (controller, inbox) = WalletController::new(bridge, config);
    controller.start();
    let mut presenter = StatusPresenter::attach(&controller, ConsoleSink { json: opts.json });
    let timeout = Duration::from_millis(opts.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting runtime")?;

    let transcript = runtime.block_on(async {
        tokio::select! {
            _ = controller.run(inbox) => Err(anyhow!("reply loop ended")),
            outcome = run_session(&controller, &mut presenter, opts, timeout) => outcome,
        }
    })?;

    Ok(json!({
        "notifications": transcript,
        "final": controller.snapshot(),
        "install_pages_opened": controller.bridge().opened_install_pages(),
    }))
}

/// connect → balance → optional account switch → disconnect
async fn run_session(
    controller: &WalletController<ScriptedBridge>,
    presenter: &mut StatusPresenter<ConsoleSink>,
    opts: &ParsedArgs,
    timeout: Duration,
) -> Result<Vec<Notification>> {
    let mut seen = Vec::new();

    presenter.connect(controller);
    let first = next_notification(presenter, timeout).await?;
    let failed = matches!(first, Notification::Error(_));
    seen.push(first);
    if failed {
        return Ok(seen);
    }
    seen.push(next_notification(presenter, timeout).await?);

    if let Some(address) = &opts.switch_to {
        if !controller.bridge().change_account(address.as_str()) {
            bail!("wallet has no account listener registered");
        }
        seen.push(next_notification(presenter, timeout).await?);
        seen.push(next_notification(presenter, timeout).await?);
    }

    controller.disconnect();
    seen.push(next_notification(presenter, timeout).await?);
    Ok(seen)
}

async fn next_notification(presenter: &mut StatusPresenter<ConsoleSink>, timeout: Duration) -> Result<Notification> {
    tokio::time::timeout(timeout, presenter.next())
        .await
        .map_err(|_| anyhow!("timed out after {:?} waiting for the wallet", timeout))?
        .ok_or_else(|| anyhow!("notification stream closed"))
}

/// Prints each view update to stderr, one field per line
struct ConsoleSink {
    json: bool,
}

impl ViewSink for ConsoleSink {
    fn render(&mut self, update: &ViewUpdate) {
        if self.json {
            if let Ok(line) = serde_json::to_string(update) {
                eprintln!("{}", line);
            }
            return;
        }
        if let Some(status) = &update.status {
            eprintln!("[{:?}] {}", status.tone, status.text);
        }
        if let Some(address) = &update.address {
            eprintln!("  {}", address);
        }
        if let Some(balance) = &update.balance {
            eprintln!("  {}", balance);
        }
        if let Some(controls) = &update.controls {
            eprintln!("  <{:?} button>", controls);
        }
    }
}

fn print_usage() {
    println!(
        r#"keethings-link - Keethings wallet connection simulator

USAGE:
    keethings-link <command> [value] [options]

COMMANDS:
    simulate                Run connect → balance → disconnect against a scripted wallet
    format <raw>            Format a smallest-unit balance for display

SIMULATE OPTIONS:
    --address, -a <addr>    Address the wallet approves with (default: kta1abc)
    --balance, -b <value>   Balance reply, raw or a failure marker (default: 9000000000)
    --reject <code>         Reject connect with code (WALLET_NOT_FOUND, CONNECTION_REJECTED, ...)
    --switch <addr>         Switch account after the first balance
    --offline               No extension in the page
    --timeout-ms <ms>       Give up waiting for a reply (default: 5000)

CONFIG OPTIONS:
    --config, -c <file>     WalletConfig JSON (env: KEETHINGS_CONFIG)
    --decimals <n>          Override display decimals

OUTPUT OPTIONS:
    --json                  View updates as JSON lines
    --pretty                Pretty-print the result
    --verbose, -v           Debug logging (RUST_LOG overrides)
    --version, -V           Print version

ENVIRONMENT:
    RUST_LOG                Log filter
    KEETHINGS_LOG_FORMAT    pretty|compact|json"#
    );
}
