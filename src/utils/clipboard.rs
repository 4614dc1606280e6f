use std::io::Write;
use std::process::{Command, Stdio};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// How text ended up on the clipboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardMethod {
    /// A platform clipboard command accepted it.
    Command,
    /// It was handed to the terminal as an OSC 52 escape.
    Osc52,
}

/// Copy through `primary`, falling back to OSC 52 written to `terminal`
/// when it fails.
pub fn copy_with_fallback_using<W, F>(
    text: &str,
    terminal: &mut W,
    primary: F,
) -> Result<ClipboardMethod, String>
where
    W: Write,
    F: FnOnce(&str) -> Result<(), String>,
{
    match primary(text) {
        Ok(()) => Ok(ClipboardMethod::Command),
        Err(command_err) => {
            tracing::debug!(error = %command_err, "clipboard command unavailable, using OSC 52");
            write_osc52(terminal, text)
                .map(|()| ClipboardMethod::Osc52)
                .map_err(|err| format!("{command_err}; OSC 52 fallback failed: {err}"))
        }
    }
}

/// `ESC ] 52 ; c ; <base64> BEL`
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text.as_bytes()))
}

pub fn write_osc52<W: Write>(terminal: &mut W, text: &str) -> std::io::Result<()> {
    terminal.write_all(osc52_sequence(text).as_bytes())?;
    terminal.flush()
}

pub fn copy_to_clipboard(text: &str) -> Result<(), String> {
    #[cfg(target_os = "macos")]
    {
        run_with_stdin("pbcopy", &[], text)
    }
    #[cfg(target_os = "windows")]
    {
        run_with_stdin("cmd", &["/C", "clip"], text)
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        const CANDIDATES: [(&str, &[&str]); 3] = [
            ("wl-copy", &[]),
            ("xclip", &["-selection", "clipboard"]),
            ("xsel", &["--clipboard", "--input"]),
        ];
        if CANDIDATES
            .iter()
            .any(|(cmd, args)| run_with_stdin(cmd, args, text).is_ok())
        {
            return Ok(());
        }
        Err("No clipboard command found (install wl-copy, xclip, or xsel)".to_string())
    }
}

fn run_with_stdin(cmd: &str, args: &[&str], input: &str) -> Result<(), String> {
    let mut child = Command::new(cmd)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|_| format!("Clipboard command `{cmd}` not available"))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(input.as_bytes())
            .map_err(|err| format!("Clipboard command `{cmd}` rejected input: {err}"))?;
    }
    match child.wait() {
        Ok(status) if status.success() => Ok(()),
        _ => Err(format!("Clipboard command `{cmd}` failed")),
    }
}
