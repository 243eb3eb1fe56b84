//! averages-runner: headless front end for the agent averages dashboard.
//!
//! Usage:
//!   averages-runner --csv report.csv [--branches TIJ,RSA] [--positions CLOSER] [--export out.csv]
//!   averages-runner --import-roster roster.json --export-roster backup.json
//!   averages-runner --add AZN:TIJ:CLOSER --remove DXL
//!   averages-runner --ipc-mode
//!
//! Common flags: --db <path> (default from config), --data-dir <dir> (default ./data).

use agent_averages_core::{
    command::DashboardCommand,
    config::DashboardConfig,
    event::DashboardEvent,
    report::{results_file_name, roster_file_name},
    session::Dashboard,
    snapshot::DashboardSnapshot,
    store::RosterStore,
};
use anyhow::Result;
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Command { command: DashboardCommand },
    Quit,
}

#[derive(serde::Serialize)]
struct Notification {
    message:  String,
    is_error: bool,
    event:    DashboardEvent,
}

#[derive(serde::Serialize)]
struct UiState {
    #[serde(flatten)]
    snapshot:      DashboardSnapshot,
    notifications: Vec<Notification>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let data_dir = arg_value(&args, "--data-dir").unwrap_or("./data");
    let config = DashboardConfig::load_or_default(data_dir)?;
    let db = arg_value(&args, "--db")
        .map(str::to_string)
        .unwrap_or_else(|| config.db_path.clone());

    if !ipc_mode {
        println!("Agent Averages Dashboard (averages-runner)");
        println!("  db:        {db}");
        println!("  data_dir:  {data_dir}");
        println!();
    }

    let store = RosterStore::open(&db)?;
    if let Err(e) = store.migrate() {
        // Keep going; the session falls back to the default roster in memory.
        log::error!("Storage migration failed: {e}");
    }
    let mut dashboard = Dashboard::open(config, store);

    if ipc_mode {
        run_ipc_loop(&mut dashboard).await
    } else {
        run_once(&mut dashboard, &args).await
    }
}

async fn run_ipc_loop(dashboard: &mut Dashboard) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut buffer = String::new();

    // Report the initial load before the first command arrives.
    writeln!(stdout, "{}", serde_json::to_string(&ui_state(dashboard))?)?;
    stdout.flush()?;

    loop {
        buffer.clear();
        let bytes_read = stdin.lock().read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => {}
            IpcCommand::Command { command } => {
                dashboard.dispatch(command).await;
            }
        }
        writeln!(stdout, "{}", serde_json::to_string(&ui_state(dashboard))?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn ui_state(dashboard: &mut Dashboard) -> UiState {
    let notifications = dashboard
        .take_events()
        .into_iter()
        .map(|event| Notification {
            message:  event.message(),
            is_error: event.is_error(),
            event,
        })
        .collect();
    UiState {
        snapshot: dashboard.snapshot(),
        notifications,
    }
}

/// One-shot mode: apply the flags in a fixed order, then print a summary.
async fn run_once(dashboard: &mut Dashboard, args: &[String]) -> Result<()> {
    let today = chrono::Local::now();
    let mut commands = Vec::new();

    if let Some(path) = arg_value(args, "--import-roster") {
        commands.push(DashboardCommand::ImportRoster { path: path.into() });
    }
    for entry in arg_values(args, "--add") {
        let mut parts = entry.splitn(3, ':');
        commands.push(DashboardCommand::AddAgent {
            initials: parts.next().unwrap_or_default().into(),
            branch:   parts.next().unwrap_or_default().into(),
            position: parts.next().unwrap_or_default().into(),
        });
    }
    for initials in arg_values(args, "--remove") {
        commands.push(DashboardCommand::RemoveAgent { initials: initials.into() });
    }
    if let Some(path) = arg_value(args, "--export-roster") {
        let path = if path.is_empty() { roster_file_name(today) } else { path.into() };
        commands.push(DashboardCommand::ExportRoster { path });
    }
    if let Some(path) = arg_value(args, "--csv") {
        commands.push(DashboardCommand::LoadCsv { path: path.into() });
        commands.push(DashboardCommand::Calculate {
            branches:  arg_list(args, "--branches"),
            positions: arg_list(args, "--positions"),
        });
        if let Some(out) = arg_value(args, "--export") {
            let path = if out.is_empty() { results_file_name(today) } else { out.into() };
            commands.push(DashboardCommand::ExportResults { path });
        }
    }

    for command in commands {
        dashboard.dispatch(command).await;
        print_events(dashboard);
    }
    print_summary(dashboard);
    Ok(())
}

fn print_events(dashboard: &mut Dashboard) {
    for event in dashboard.take_events() {
        let marker = if event.is_error() { "!" } else { "-" };
        println!("  {marker} {}", event.message());
    }
}

fn print_summary(dashboard: &Dashboard) {
    let snapshot = dashboard.snapshot();

    println!();
    println!("=== ROSTER ===");
    println!("  agents:    {}", snapshot.roster.len());
    println!("  origin:    {:?}", snapshot.roster_origin);

    if snapshot.sales_loaded == 0 {
        return;
    }
    println!();
    println!("=== UPLOAD ===");
    println!("  records:   {}", snapshot.sales_loaded);
    println!("  matched:   {}", snapshot.matched_count);
    println!("  skipped:   {}", snapshot.skipped.len());
    if !snapshot.skipped.is_empty() {
        println!("  not on roster: {}", snapshot.skipped.join(", "));
    }

    if snapshot.cards.is_empty() {
        return;
    }
    println!();
    println!("=== AVERAGES ===");
    for card in &snapshot.cards {
        println!("  {:<22} {:>12}  ({} agents)", card.label, card.value, card.count);
    }

    println!();
    println!("=== AGENT BREAKDOWN ===");
    for row in &snapshot.breakdown {
        println!(
            "  #{:<3} {:<5} {:<4} {:<7} {:>12}  {}",
            row.rank, row.agent, row.branch, row.position, row.collected, row.vs_average
        );
    }
}

/// Value following `flag`. A flag given last with no value yields "".
fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    let pos = args.iter().position(|a| a == flag)?;
    Some(
        args.get(pos + 1)
            .map(String::as_str)
            .filter(|v| !v.starts_with("--"))
            .unwrap_or(""),
    )
}

/// Every value of a repeatable flag.
fn arg_values<'a>(args: &'a [String], flag: &str) -> Vec<&'a str> {
    args.windows(2)
        .filter(|w| w[0] == flag)
        .map(|w| w[1].as_str())
        .collect()
}

/// Comma-separated list; absent flag means "all".
fn arg_list(args: &[String], flag: &str) -> Option<Vec<String>> {
    arg_value(args, flag).map(|v| {
        v.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    })
}
