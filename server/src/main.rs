/*
 * This file is a part of Arbor.
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 *
*/

//! # arbord
//!
//! A thin, synchronous front-end over [`arbor::Tree`]: boots logging and
//! configuration, then reads line-oriented commands from stdin until EOF.
//! There is no wire protocol and no concurrency here — the interesting
//! concurrency lives in the library and is only exercised if an embedder
//! spawns multiple threads against the same `Tree`; this shell is a single
//! thread talking to itself.

use arbor::config;
use arbor::{Kind, Tree};
use env_logger::Builder;
use libsky::util::terminal;
use libsky::{URL, VERSION};
use std::io::{self, BufRead, Write};

fn main() {
    let cfg = match config::get_config_file_or_return_cfg() {
        Ok(c) => c,
        Err(e) => {
            terminal::write_error(format!("Startup failure: {e}\n")).ok();
            std::process::exit(0x100);
        }
    };
    let is_custom = cfg.is_custom();
    let cfg = cfg.into_inner();

    Builder::new().parse_filters(cfg.log_filter()).init();

    terminal::write_info(format!("arbor v{VERSION} | {URL}\n")).ok();
    if is_custom {
        log::info!("Using settings from supplied configuration");
    } else {
        log::warn!("No configuration file supplied. Using default settings");
    }

    let tree = Tree::with_max_name(cfg.max_name_len());
    log::info!("Tree initialised. Reading commands from stdin");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                log::error!("Failed to read line: {e}");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }
        run_command(&tree, line);
        io::stdout().flush().ok();
    }
    terminal::write_info("Goodbye :)\n").ok();
}

/// Parses and executes a single shell line of the form `<verb> <args...>`.
fn run_command(tree: &Tree, line: &str) {
    let mut parts = line.split_whitespace();
    let verb = match parts.next() {
        Some(v) => v,
        None => return,
    };
    let result = match verb {
        "list" => match parts.next() {
            Some(path) => tree.list(path).map(Reply::Listing),
            None => {
                print_usage("list <path>");
                return;
            }
        },
        "create" => match parts.next() {
            Some(path) => tree.create(path).map(|_| Reply::Ok),
            None => {
                print_usage("create <path>");
                return;
            }
        },
        "remove" => match parts.next() {
            Some(path) => tree.remove(path).map(|_| Reply::Ok),
            None => {
                print_usage("remove <path>");
                return;
            }
        },
        "move" => match (parts.next(), parts.next()) {
            (Some(source), Some(target)) => tree.move_to(source, target).map(|_| Reply::Ok),
            _ => {
                print_usage("move <source> <target>");
                return;
            }
        },
        other => {
            terminal::write_warning(format!("unknown command '{other}'\n")).ok();
            return;
        }
    };
    print_result(result);
}

enum Reply {
    Ok,
    Listing(String),
}

fn print_result(result: Result<Reply, Kind>) {
    match result {
        Ok(Reply::Ok) => {
            terminal::write_success("OK\n").ok();
        }
        Ok(Reply::Listing(listing)) => {
            println!("{listing}");
        }
        Err(e) => {
            terminal::write_error(format!("error: {e}\n")).ok();
        }
    }
}

fn print_usage(usage: &str) {
    terminal::write_warning(format!("usage: {usage}\n")).ok();
}
