//! Interactive phone session
//!
//! Reads one command per line from stdin and drives the controller. State
//! changes are printed as they are published, whether they come from a
//! command or from an SDK event. The `remote` commands play the far end of
//! the simulated SDK.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use webphone_client_core::{CallStateController, SimulatedConnector, SimulatedSdk};

use crate::render::print_state;

const HELP: &str = "\
commands:
  login                 fetch a token and log in
  call <number>         dial a number
  hangup                hang up or cancel the current call
  mute                  toggle the microphone
  answer                answer the incoming call
  reject                reject the incoming call
  logout                log out
  status [--json]       show the current state
  remote ring           far end starts ringing
  remote answer         far end picks up
  remote hangup         far end hangs up
  remote fail [reason]  network drops the call
  remote call <number>  someone calls in
  help                  show this help
  quit                  log out and exit";

/// Far-end actions on the simulated SDK
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteAction {
    Ring,
    Answer,
    Hangup,
    Fail(Option<String>),
    Call(String),
}

/// One line of REPL input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login,
    Call(String),
    Hangup,
    Mute,
    Answer,
    Reject,
    Logout,
    Status { json: bool },
    Remote(RemoteAction),
    Help,
    Quit,
    Empty,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(Command::Empty);
        };
        let rest: Vec<&str> = words.collect();

        let command = match (name.to_ascii_lowercase().as_str(), rest.as_slice()) {
            ("login", []) => Command::Login,
            ("call" | "dial", [number]) => Command::Call(number.to_string()),
            ("call" | "dial", _) => return Err("usage: call <number>".to_string()),
            ("hangup" | "cancel", []) => Command::Hangup,
            ("mute", []) => Command::Mute,
            ("answer", []) => Command::Answer,
            ("reject", []) => Command::Reject,
            ("logout", []) => Command::Logout,
            ("status", []) => Command::Status { json: false },
            ("status", ["--json"]) => Command::Status { json: true },
            ("remote", args) => Command::Remote(parse_remote(args)?),
            ("help" | "?", _) => Command::Help,
            ("quit" | "exit", []) => Command::Quit,
            (other, _) => return Err(format!("unknown command '{}', try 'help'", other)),
        };
        Ok(command)
    }
}

fn parse_remote(args: &[&str]) -> Result<RemoteAction, String> {
    match args {
        ["ring"] => Ok(RemoteAction::Ring),
        ["answer"] => Ok(RemoteAction::Answer),
        ["hangup"] => Ok(RemoteAction::Hangup),
        ["fail"] => Ok(RemoteAction::Fail(None)),
        ["fail", reason @ ..] => Ok(RemoteAction::Fail(Some(reason.join(" ")))),
        ["call", number] => Ok(RemoteAction::Call(number.to_string())),
        _ => Err("usage: remote ring|answer|hangup|fail [reason]|call <number>".to_string()),
    }
}

/// A controller bound to the simulated SDK it drives
pub struct Session {
    controller: CallStateController,
    connector: SimulatedConnector,
}

impl Session {
    pub fn new(controller: CallStateController, connector: SimulatedConnector) -> Self {
        Self { controller, connector }
    }

    fn sdk(&self) -> Option<Arc<SimulatedSdk>> {
        self.connector.sdk()
    }

    /// Execute one command; returns `false` once the session should end
    pub async fn execute(&self, command: Command) -> Result<bool> {
        match command {
            Command::Empty => {}
            Command::Help => println!("{}", HELP),
            Command::Login => self.controller.login().await?,
            Command::Call(number) => self.controller.make_call(&number).await?,
            Command::Hangup => self.controller.hangup_call(),
            Command::Mute => {
                self.controller.toggle_mute();
                if let Some(sdk) = self.sdk() {
                    println!("microphone {}", if sdk.is_muted() { "muted" } else { "live" });
                }
            }
            Command::Answer => {
                let state = self.controller.state();
                self.controller.answer_call(state.incoming_call_uuid());
            }
            Command::Reject => {
                let state = self.controller.state();
                self.controller.reject_call(state.incoming_call_uuid());
            }
            Command::Logout => self.controller.logout(),
            Command::Status { json: true } => {
                println!("{}", serde_json::to_string_pretty(&self.controller.state())?);
            }
            Command::Status { json: false } => print_state(&self.controller.state()),
            Command::Remote(action) => self.remote(action),
            Command::Quit => {
                self.controller.shutdown();
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn remote(&self, action: RemoteAction) {
        let Some(sdk) = self.sdk() else {
            warn!("No SDK to drive");
            return;
        };
        match action {
            RemoteAction::Ring => sdk.remote_ringing(),
            RemoteAction::Answer => sdk.remote_answer(),
            RemoteAction::Hangup => sdk.remote_hangup(),
            RemoteAction::Fail(reason) => sdk.fail_call(reason.unwrap_or_default()),
            RemoteAction::Call(number) => {
                let call_uuid = sdk.ring_in(&number);
                debug!("Incoming call {} from {}", call_uuid, number);
            }
        }
    }

    /// Run until `quit` or end of input
    pub async fn run(self) -> Result<()> {
        let mut changes = self.controller.subscribe();
        let printer = tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                let state = changes.borrow_and_update().clone();
                print_state(&state);
            }
        });

        println!("{}", "webphone ready, type 'help' for commands".bold());
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let command = match line.parse::<Command>() {
                Ok(command) => command,
                Err(usage) => {
                    println!("{}", usage.yellow());
                    continue;
                }
            };

            match self.execute(command).await {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => println!("{}", format!("{:#}", e).red()),
            }
        }

        self.controller.shutdown();
        printer.abort();
        Ok(())
    }
}
