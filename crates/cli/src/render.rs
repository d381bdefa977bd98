//! Terminal rendering of the call state

use colored::Colorize;

use webphone_client_core::view::connection_label;
use webphone_client_core::{CallControl, CallPanel, ConnectionState, DialButton};

/// Plain-text lines describing `state`
pub fn state_lines(state: &ConnectionState) -> Vec<String> {
    let mut lines = vec![format!("connection: {}", connection_label(state))];

    let dial = DialButton::from_state(state, "0");
    lines.push(format!(
        "dial: {}{}",
        dial.label,
        if dial.enabled { "" } else { " (disabled)" }
    ));

    if let Some(panel) = CallPanel::from_state(state) {
        let mut line = format!("call: {}", panel.label);
        if let Some(number) = &panel.phone_number {
            line.push_str(&format!(" {}", number));
        }
        if !panel.controls.is_empty() {
            let controls: Vec<&str> = panel.controls.iter().map(|c| control_command(*c)).collect();
            line.push_str(&format!(" [{}]", controls.join(", ")));
        }
        lines.push(line);
    }

    if let Some(error) = &state.error {
        lines.push(format!("error: {}", error));
    }
    lines
}

/// REPL command triggering `control`
pub fn control_command(control: CallControl) -> &'static str {
    match control {
        CallControl::Answer => "answer",
        CallControl::Reject => "reject",
        CallControl::Mute => "mute",
        CallControl::Hangup | CallControl::Cancel => "hangup",
    }
}

/// Print `state` to stdout with colors
pub fn print_state(state: &ConnectionState) {
    for line in state_lines(state) {
        if line.starts_with("error:") {
            println!("  {}", line.red());
        } else if line.starts_with("call:") {
            println!("  {}", line.cyan());
        } else {
            println!("  {}", line.dimmed());
        }
    }
}
