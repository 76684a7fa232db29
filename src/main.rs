//! group-ledger CLI
//!
//! Replay expense scenarios and simplify debts from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Replay a scenario and print every group's balances and debts
//! group-ledger replay --input scenario.json
//!
//! # Output as JSON, with engine settings from a file
//! group-ledger replay --input scenario.json --format json --config engine.json
//!
//! # Simplify a set of balances
//! group-ledger simplify --input balances.json
//!
//! # Generate a random scenario for testing
//! group-ledger generate --members 10 --expenses 30
//! ```

use env_logger::Env;
use group_ledger::config::EngineConfig;
use group_ledger::core::amount::Balance;
use group_ledger::core::member::MemberId;
use group_ledger::optimization::simplifier::DebtSimplifier;
use group_ledger::simulation::scenario::{replay, Scenario};
use group_ledger::simulation::workload::{generate_scenario, WorkloadConfig};
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"group-ledger — shared-expense group ledger

USAGE:
    group-ledger <COMMAND> [OPTIONS]

COMMANDS:
    replay      Replay a scenario against a fresh ledger
    simplify    Simplify a set of member balances into debts
    generate    Generate a random scenario (for testing)
    help        Show this message

OPTIONS (replay):
    --input <FILE>      Path to JSON scenario file
    --format <FORMAT>   Output format: text (default) or json
    --config <FILE>     Path to JSON engine config

OPTIONS (simplify):
    --input <FILE>      Path to JSON balances file
    --format <FORMAT>   Output format: text (default) or json

OPTIONS (generate):
    --members <N>       Number of members (default: 10)
    --expenses <N>      Number of expenses (default: 30)
    --output <FILE>     Write to file instead of stdout

EXAMPLES:
    group-ledger replay --input scenario.json
    group-ledger replay --input scenario.json --format json --config engine.json
    group-ledger simplify --input balances.json
    group-ledger generate --members 20 --expenses 60 --output scenario.json"#
    );
}

/// JSON schema for `simplify` input.
#[derive(serde::Deserialize)]
struct BalanceInput {
    member: String,
    balance: Balance,
}

#[derive(serde::Deserialize)]
struct BalancesFile {
    balances: Vec<BalanceInput>,
}

fn init_logging(config: &EngineConfig) {
    let env = Env::default().default_filter_or(config.log_filter.as_str());
    env_logger::Builder::from_env(env).init();
}

fn read_file(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    })
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error serializing output: {}", e);
        process::exit(1);
    })
}

/// Value following a flag, or exit with `message`.
fn flag_value(args: &[String], i: usize, message: &str) -> String {
    args.get(i).cloned().unwrap_or_else(|| {
        eprintln!("{}", message);
        process::exit(1);
    })
}

fn flag_number(args: &[String], i: usize, message: &str) -> usize {
    args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
        eprintln!("{}", message);
        process::exit(1);
    })
}

fn cmd_replay(args: &[String]) {
    let mut input_path = None;
    let mut config_path = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(flag_value(args, i, "--input requires a file path"));
            }
            "--config" => {
                i += 1;
                config_path = Some(flag_value(args, i, "--config requires a file path"));
            }
            "--format" => {
                i += 1;
                format = flag_value(args, i, "--format requires 'text' or 'json'");
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });

    let config = match config_path {
        Some(path) => EngineConfig::from_file(&path).unwrap_or_else(|e| {
            eprintln!("Error loading config '{}': {}", path, e);
            process::exit(1);
        }),
        None => EngineConfig::default(),
    };
    init_logging(&config);

    let scenario: Scenario = serde_json::from_str(&read_file(&path)).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "wallets": [ {{ "member": "bob", "deposit": 100, "allowance": 100 }} ],
  "steps": [
    {{ "create_group": {{ "creator": "alice", "name": "Trip", "invitees": ["bob"] }} }},
    {{ "register_expense": {{ "group": 1, "payer": "alice", "amount": 90,
        "participants": ["alice", "bob"], "method": "equal" }} }}
  ]
}}"#
        );
        process::exit(1);
    });

    let summaries = replay(&scenario, config).unwrap_or_else(|e| {
        eprintln!("Replay failed at {}", e);
        process::exit(1);
    });

    if format == "json" {
        println!("{}", to_json(&summaries));
    } else {
        for summary in &summaries {
            println!("{}", summary);
        }
    }
}

fn cmd_simplify(args: &[String]) {
    let mut input_path = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(flag_value(args, i, "--input requires a file path"));
            }
            "--format" => {
                i += 1;
                format = flag_value(args, i, "--format requires 'text' or 'json'");
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });
    init_logging(&EngineConfig::default());

    let file: BalancesFile = serde_json::from_str(&read_file(&path)).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "balances": [
    {{ "member": "alice", "balance": 7 }},
    {{ "member": "dave", "balance": -7 }}
  ]
}}"#
        );
        process::exit(1);
    });

    let balances: Vec<(MemberId, Balance)> = file
        .balances
        .into_iter()
        .map(|b| (MemberId::new(b.member), b.balance))
        .collect();

    let edges = DebtSimplifier::simplify_checked(&balances).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });

    if format == "json" {
        println!("{}", to_json(&edges));
    } else if edges.is_empty() {
        println!("All balances are settled.");
    } else {
        for edge in &edges {
            println!("{}", edge);
        }
        println!("\nTotal transfers: {}", edges.len());
    }
}

fn cmd_generate(args: &[String]) {
    let mut members = 10usize;
    let mut expenses = 30usize;
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--members" => {
                i += 1;
                members = flag_number(args, i, "--members requires a number");
            }
            "--expenses" => {
                i += 1;
                expenses = flag_number(args, i, "--expenses requires a number");
            }
            "--output" => {
                i += 1;
                output_path = Some(flag_value(args, i, "--output requires a file path"));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let config = WorkloadConfig {
        member_count: members,
        expense_count: expenses,
        ..Default::default()
    };
    let scenario = generate_scenario(&config);
    let json = to_json(&scenario);

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!(
            "Generated {} expenses across {} members → {}",
            expenses, members, path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "replay" => cmd_replay(rest),
        "simplify" => cmd_simplify(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
