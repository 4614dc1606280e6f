//! Slash commands typed into the chat input.

mod registry;

pub use registry::{all_commands, CommandInvocation};

use std::path::PathBuf;

use directories::BaseDirs;

use crate::core::app::App;
use crate::ui::markdown::collect_code_blocks;

#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    Continue,
    ProcessAsMessage(String),
    /// Start reading this file as the attachment.
    Attach(PathBuf),
    /// Copy this code block to the clipboard.
    Copy(usize),
}

pub fn process_input(app: &mut App, input: &str) -> CommandResult {
    let trimmed = input.trim();

    if !trimmed.starts_with('/') {
        return CommandResult::ProcessAsMessage(input.to_string());
    }

    let mut parts = trimmed[1..].splitn(2, char::is_whitespace);
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return CommandResult::ProcessAsMessage(input.to_string()),
    };
    let args = parts.next().unwrap_or("").trim();

    if let Some(command) = registry::find_command(command_name) {
        let invocation = CommandInvocation {
            input: trimmed,
            args,
        };
        (command.handler)(app, invocation)
    } else {
        CommandResult::ProcessAsMessage(input.to_string())
    }
}

const KEY_HELP: &[&str] = &[
    "Enter        send the message",
    "Alt+Enter    insert a newline",
    "Up/Down      scroll one line",
    "PgUp/PgDn    scroll one page",
    "End          jump to the latest message",
    "Esc, Ctrl+C  quit",
];

pub(super) fn handle_help(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    let mut lines: Vec<String> = KEY_HELP.iter().map(|line| line.to_string()).collect();
    lines.push(String::new());
    for command in all_commands() {
        lines.push(format!("{:<15}{}", command.usage, command.help));
    }
    app.show_overlay("Help", lines);
    CommandResult::Continue
}

pub(super) fn handle_attach(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    if invocation.args.is_empty() {
        app.set_error("Usage: /attach <path>");
        return CommandResult::Continue;
    }
    CommandResult::Attach(expand_home(invocation.args))
}

pub(super) fn handle_detach(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    let had_file = app.chat.uploads().file().is_some() || app.chat.uploads().is_pending();
    app.chat.uploads_mut().remove();
    if had_file {
        app.set_status("Attachment removed");
    } else {
        app.set_status("No file attached");
    }
    CommandResult::Continue
}

pub(super) fn handle_model(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let model_id = invocation.args;
    if model_id.is_empty() {
        return handle_models(app, invocation);
    }
    if !app.chat.models().contains(model_id) {
        app.set_error(format!("Unknown model: {model_id} (see /models)"));
        return CommandResult::Continue;
    }
    app.chat.models_mut().select(model_id);
    let name = app.chat.models().display_name().to_string();
    app.set_status(format!("Model set: {name}"));
    CommandResult::Continue
}

pub(super) fn handle_models(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    let models = app.chat.models();
    let lines = models
        .catalog()
        .iter()
        .map(|model| {
            let marker = if model.value == models.current() { "*" } else { " " };
            format!("{marker} {:<16}{}", model.value, model.name)
        })
        .collect();
    app.show_overlay("Models", lines);
    CommandResult::Continue
}

pub(super) fn handle_copy(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let available = collect_code_blocks(app.chat.log().all()).len();
    if available == 0 {
        app.set_error("No code blocks to copy yet");
        return CommandResult::Continue;
    }
    if invocation.args.is_empty() {
        return CommandResult::Copy(available);
    }
    match invocation.args.parse::<usize>() {
        Ok(index) if (1..=available).contains(&index) => CommandResult::Copy(index),
        _ => {
            app.set_error(format!(
                "Usage: /copy [n] where n is 1 to {available}"
            ));
            CommandResult::Continue
        }
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(dirs) = BaseDirs::new() {
            return dirs.home_dir().join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests;
