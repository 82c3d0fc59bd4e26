/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
******************************************************************************/
//! Minimal command-line driver for the matching engine: reads a config
//! file and a newline-delimited command file, processes every command in
//! order, and writes the resulting newline-delimited event stream to
//! stdout. This is the thin "publisher" boundary the core engine needs
//! to be exercised end to end; it does no framing, batching, or retry
//! beyond that.

use matching_engine::command::Command;
use matching_engine::config::RuleConfig;
use matching_engine::orderbook::MatchingEngine;
use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let mut args = env::args().skip(1);
    let (Some(config_path), Some(commands_path)) = (args.next(), args.next()) else {
        eprintln!("usage: engine-cli <config.json> <commands.ndjson> [snapshot.ndjson]");
        return ExitCode::FAILURE;
    };
    let snapshot_path = args.next().map(PathBuf::from);

    let config_text = match fs::read_to_string(&config_path) {
        Ok(text) => text,
        Err(err) => {
            error!(path = %config_path, error = %err, "failed to read config");
            return ExitCode::FAILURE;
        }
    };
    let config = match RuleConfig::from_json(&config_text) {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "failed to parse config");
            return ExitCode::FAILURE;
        }
    };
    let (tick_rules, lot_rules, symbols) = config.into_rules();
    let mut engine = MatchingEngine::new(tick_rules, lot_rules, symbols);

    if let Some(path) = &snapshot_path {
        for event in engine.market_open(path) {
            print_event(&event);
        }
    }

    let commands_file = match fs::File::open(&commands_path) {
        Ok(file) => file,
        Err(err) => {
            error!(path = %commands_path, error = %err, "failed to open commands file");
            return ExitCode::FAILURE;
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut processed = 0usize;
    for line in io::BufReader::new(commands_file).lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                error!(error = %err, "failed to read command line");
                continue;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let command = match Command::from_json(line) {
            Ok(command) => command,
            Err(err) => {
                error!(error = %err, "dropping malformed command");
                continue;
            }
        };
        for event in engine.process(command) {
            if let Ok(json) = serde_json::to_string(&event) {
                let _ = writeln!(out, "{json}");
            }
        }
        processed += 1;
    }
    info!(processed, "commands processed");

    if let Some(path) = &snapshot_path {
        if let Err(err) = engine.market_close(path) {
            error!(error = %err, "failed to write closing snapshot");
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}

fn print_event(event: &matching_engine::events::Event) {
    if let Ok(json) = serde_json::to_string(event) {
        println!("{json}");
    }
}
