//! dayplan-auth-local - local accounts auth provider for dayplan
//!
//! This binary implements the dayplan auth protocol, reading one JSON
//! request per line on stdin and answering on stdout.
//!
//! Accounts live in:
//!   ~/.config/dayplan/providers/local/accounts.toml

mod accounts;

use std::io::{self, BufRead, Write};

use anyhow::Result;
use dayplan_core::auth::Identity;
use dayplan_core::auth::protocol::{Command, Request, Response, SignOut};
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::accounts::Accounts;

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!(error = %e, "failed to read stdin");
                break;
            }
        };

        // Skip empty lines
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => handle_request(request),
            Err(e) => Response::error(&format!("Failed to parse request: {}", e)),
        };

        if writeln!(stdout, "{}", response)
            .and_then(|_| stdout.flush())
            .is_err()
        {
            break;
        }
    }
}

fn handle_request(request: Request) -> String {
    match request.command {
        Command::SignIn => handle_sign_in(&request.params),
        Command::SignOut => handle_sign_out(&request.params),
    }
}

#[derive(Debug, Deserialize)]
struct SignInParams {
    username: String,
    password: String,
}

fn handle_sign_in(params: &serde_json::Value) -> String {
    let params: SignInParams = match serde_json::from_value(params.clone()) {
        Ok(p) => p,
        Err(e) => return Response::error(&format!("Invalid params: {}", e)),
    };

    match Accounts::load().and_then(|accounts| sign_in(&accounts, &params)) {
        Ok(identity) => Response::success(identity),
        Err(e) => Response::error(&format!("{:#}", e)),
    }
}

fn sign_in(accounts: &Accounts, params: &SignInParams) -> Result<Identity> {
    let Some(identity) = accounts.verify(&params.username, &params.password) else {
        warn!(username = %params.username, "sign-in rejected");
        anyhow::bail!("Unknown account or wrong password");
    };

    info!(uid = %identity.uid, "signed in");
    Ok(identity)
}

/// Local accounts keep no remote session, so there is nothing to end.
fn handle_sign_out(params: &serde_json::Value) -> String {
    match serde_json::from_value::<SignOut>(params.clone()) {
        Ok(SignOut { identity }) => {
            info!(uid = %identity.uid, "signed out");
            Response::success(())
        }
        Err(e) => Response::error(&format!("Invalid params: {}", e)),
    }
}
