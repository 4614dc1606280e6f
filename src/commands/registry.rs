use super::CommandResult;
use crate::core::app::App;

pub type CommandHandler = fn(&mut App, CommandInvocation<'_>) -> CommandResult;

pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub help: &'static str,
    pub handler: CommandHandler,
}

#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub input: &'a str,
    pub args: &'a str,
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands()
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        usage: "/help",
        help: "Show commands and key bindings.",
        handler: super::handle_help,
    },
    Command {
        name: "attach",
        usage: "/attach <path>",
        help: "Attach a text file (5KB max) to the next message.",
        handler: super::handle_attach,
    },
    Command {
        name: "detach",
        usage: "/detach",
        help: "Remove the attached file.",
        handler: super::handle_detach,
    },
    Command {
        name: "model",
        usage: "/model [id]",
        help: "Switch models and remember the choice, or list them.",
        handler: super::handle_model,
    },
    Command {
        name: "models",
        usage: "/models",
        help: "List available models.",
        handler: super::handle_models,
    },
    Command {
        name: "copy",
        usage: "/copy [n]",
        help: "Copy code block n (default: the latest) to the clipboard.",
        handler: super::handle_copy,
    },
];
