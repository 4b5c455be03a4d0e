//! Lightweight REPL (Read-Eval-Print-Loop) for booth-cli.
//!
//! Provides an interactive mode when no `--name`, `--once` or `-f` is given.
//! Supported commands:
//! - `/quit`, `/exit`, `/q` - Exit the REPL
//! - `/help` - List commands
//! - `/layouts` - List layout templates
//! - `/layout <ID>` - Switch layout
//! - `/timer <SECONDS>` - Set the countdown (1-9)
//! - `/list` - List captures, newest first
//! - `/show <ID>` - Show one capture
//! - `/export <ID> [FILE_NAME]` - Export (or re-export) a capture
//!
//! Any other input is taken as a name and starts a capture session.

use std::io::{self, BufRead, Write};

use anyhow::Result;

use crate::booth::controller::{MAX_COUNTDOWN_SECONDS, MIN_COUNTDOWN_SECONDS};
use crate::booth::{CaptureRecord, LayoutTemplate, LAYOUTS};

use super::bootstrap::CliContext;
use super::runner::{capture_once, export_record};

const HELP: &str = "Commands: /layouts, /layout <ID>, /timer <1-9>, /list, /show <ID>, \
/export <ID> [FILE_NAME], /help, /quit\nAnything else starts a session for that name.";

/// REPL command variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    /// Exit the REPL
    Quit,
    Help,
    Layouts,
    SetLayout(String),
    SetTimer(u8),
    List,
    Show(String),
    Export {
        record_id: String,
        file_name_hint: Option<String>,
    },
    /// Known command with missing or malformed arguments
    Usage(&'static str),
    /// Unknown command (will show help)
    Unknown(String),
    /// Name to start a capture session for
    Capture(String),
    /// Empty input (skip)
    Empty,
}

impl ReplCommand {
    /// Parse user input into a REPL command.
    ///
    /// Command names are case-insensitive; arguments keep their case since
    /// layout ids are case-sensitive.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return ReplCommand::Empty;
        }

        if !trimmed.starts_with('/') {
            return ReplCommand::Capture(trimmed.to_string());
        }

        let mut parts = trimmed.split_whitespace();
        let command = parts.next().unwrap_or_default().to_lowercase();
        let args: Vec<&str> = parts.collect();

        match (command.as_str(), args.as_slice()) {
            ("/quit" | "/exit" | "/q", _) => ReplCommand::Quit,
            ("/help" | "/h", _) => ReplCommand::Help,
            ("/layouts", _) => ReplCommand::Layouts,
            ("/list", _) => ReplCommand::List,
            ("/layout", [id]) => ReplCommand::SetLayout(id.to_string()),
            ("/layout", _) => ReplCommand::Usage("/layout <ID>"),
            ("/timer", [seconds]) => match seconds.parse::<u8>() {
                Ok(s) if (MIN_COUNTDOWN_SECONDS..=MAX_COUNTDOWN_SECONDS).contains(&s) => {
                    ReplCommand::SetTimer(s)
                }
                _ => ReplCommand::Usage("/timer <1-9>"),
            },
            ("/timer", _) => ReplCommand::Usage("/timer <1-9>"),
            ("/show", [id]) => ReplCommand::Show(id.to_string()),
            ("/show", _) => ReplCommand::Usage("/show <ID>"),
            ("/export", [id]) => ReplCommand::Export {
                record_id: id.to_string(),
                file_name_hint: None,
            },
            ("/export", [id, hint @ ..]) => ReplCommand::Export {
                record_id: id.to_string(),
                file_name_hint: Some(hint.join(" ")),
            },
            ("/export", _) => ReplCommand::Usage("/export <ID> [FILE_NAME]"),
            _ => ReplCommand::Unknown(trimmed.to_string()),
        }
    }
}

/// Run an interactive REPL session.
///
/// Returns when the user exits or on EOF (Ctrl+D). Failures are printed and
/// the loop continues.
pub async fn run_repl(ctx: &mut CliContext) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    eprintln!("booth-cli interactive mode");
    eprintln!(
        "Layout {}, {}s timer, camera: {}, export: {}",
        ctx.defaults.layout,
        ctx.defaults.countdown_seconds,
        ctx.state.controller.camera_name(),
        ctx.state.exporter.name()
    );
    eprintln!("Type a name to start a session, /help for commands\n");

    loop {
        print!("> ");
        stdout.flush()?;

        // Read line
        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            // EOF (Ctrl+D)
            eprintln!("\nGoodbye!");
            break;
        }

        match ReplCommand::parse(&input) {
            ReplCommand::Empty => continue,
            ReplCommand::Quit => {
                eprintln!("Goodbye!");
                break;
            }
            ReplCommand::Help => eprintln!("{}", HELP),
            ReplCommand::Layouts => {
                for layout in LAYOUTS.iter() {
                    let marker = if layout.id == ctx.defaults.layout { "*" } else { " " };
                    eprintln!("{} {}", marker, format_layout(layout));
                }
            }
            ReplCommand::SetLayout(id) => match LayoutTemplate::resolve(&id) {
                Ok(layout) => {
                    ctx.defaults.layout = layout.id.to_string();
                    eprintln!("Layout: {}", format_layout(layout));
                }
                Err(e) => eprintln!("Error: {}", e),
            },
            ReplCommand::SetTimer(seconds) => {
                ctx.defaults.countdown_seconds = seconds;
                eprintln!("Timer: {}s", seconds);
            }
            ReplCommand::List => {
                let records = ctx.state.archive().list();
                if records.is_empty() {
                    eprintln!("No captures yet");
                }
                for record in records {
                    println!("{}", format_record(&record));
                }
            }
            ReplCommand::Show(id) => match ctx.state.archive().get(&id) {
                Some(record) => {
                    println!("{}", format_record(&record));
                    println!("  taken {}", record.timestamp().to_rfc3339());
                }
                None => eprintln!("Error: no capture with id {}", id),
            },
            ReplCommand::Export {
                record_id,
                file_name_hint,
            } => {
                if let Err(e) = export_record(ctx, &record_id, file_name_hint.as_deref()).await {
                    eprintln!("Error: {}", e);
                }
            }
            ReplCommand::Usage(usage) => eprintln!("Usage: {}", usage),
            ReplCommand::Unknown(cmd) => {
                eprintln!("Unknown command: {}", cmd);
                eprintln!("{}", HELP);
            }
            ReplCommand::Capture(name) => {
                if let Err(e) = capture_once(ctx, &name, None).await {
                    eprintln!("Error: {}", e);
                }

                println!(); // Blank line between sessions
            }
        }
    }

    Ok(())
}

pub(crate) fn format_layout(layout: &LayoutTemplate) -> String {
    format!("{:<13} {}", layout.id, layout.label)
}

fn format_record(record: &CaptureRecord) -> String {
    format!(
        "{}  {:<16} {:<13} {} photos  {}",
        record.id(),
        record.user_name(),
        record.layout_id(),
        record.images().len(),
        record.display_date()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    // ────────────────────────────────────────────────────────────────────────────────
    // Tests for ReplCommand::parse
    // ────────────────────────────────────────────────────────────────────────────────

    mod parse_tests {
        use super::*;

        #[test]
        fn parses_quit_variants() {
            assert_eq!(ReplCommand::parse("/quit"), ReplCommand::Quit);
            assert_eq!(ReplCommand::parse("/exit"), ReplCommand::Quit);
            assert_eq!(ReplCommand::parse("/q"), ReplCommand::Quit);
            assert_eq!(ReplCommand::parse("/QUIT"), ReplCommand::Quit);
        }

        #[test]
        fn parses_name_as_capture() {
            assert_eq!(
                ReplCommand::parse("  Alex Doe \n"),
                ReplCommand::Capture("Alex Doe".to_string())
            );
        }

        #[test]
        fn parses_layout_keeping_case() {
            assert_eq!(
                ReplCommand::parse("/LAYOUT STRIP_2x6_3"),
                ReplCommand::SetLayout("STRIP_2x6_3".to_string())
            );
            assert_eq!(
                ReplCommand::parse("/layout"),
                ReplCommand::Usage("/layout <ID>")
            );
        }

        #[test]
        fn parses_timer_in_range() {
            assert_eq!(ReplCommand::parse("/timer 5"), ReplCommand::SetTimer(5));
            assert_eq!(ReplCommand::parse("/timer 1"), ReplCommand::SetTimer(1));
            assert_eq!(ReplCommand::parse("/timer 9"), ReplCommand::SetTimer(9));
        }

        #[test]
        fn rejects_timer_out_of_range() {
            assert_eq!(
                ReplCommand::parse("/timer 0"),
                ReplCommand::Usage("/timer <1-9>")
            );
            assert_eq!(
                ReplCommand::parse("/timer 10"),
                ReplCommand::Usage("/timer <1-9>")
            );
            assert_eq!(
                ReplCommand::parse("/timer soon"),
                ReplCommand::Usage("/timer <1-9>")
            );
        }

        #[test]
        fn parses_export_with_and_without_hint() {
            assert_eq!(
                ReplCommand::parse("/export X7K2Q"),
                ReplCommand::Export {
                    record_id: "X7K2Q".to_string(),
                    file_name_hint: None,
                }
            );
            assert_eq!(
                ReplCommand::parse("/export X7K2Q party night"),
                ReplCommand::Export {
                    record_id: "X7K2Q".to_string(),
                    file_name_hint: Some("party night".to_string()),
                }
            );
            assert_eq!(
                ReplCommand::parse("/export"),
                ReplCommand::Usage("/export <ID> [FILE_NAME]")
            );
        }

        #[test]
        fn parses_listing_commands() {
            assert_eq!(ReplCommand::parse("/list"), ReplCommand::List);
            assert_eq!(ReplCommand::parse("/layouts"), ReplCommand::Layouts);
            assert_eq!(
                ReplCommand::parse("/show X7K2Q"),
                ReplCommand::Show("X7K2Q".to_string())
            );
        }

        #[test]
        fn parses_unknown_slash_command() {
            assert_eq!(
                ReplCommand::parse("/selfie"),
                ReplCommand::Unknown("/selfie".to_string())
            );
        }

        #[test]
        fn parses_empty_input() {
            assert_eq!(ReplCommand::parse(""), ReplCommand::Empty);
            assert_eq!(ReplCommand::parse("   "), ReplCommand::Empty);
            assert_eq!(ReplCommand::parse("\t\n"), ReplCommand::Empty);
        }
    }

    #[test]
    fn test_format_layout() {
        let line = format_layout(&crate::booth::layout::STRIP_2X6_3);
        assert!(line.starts_with("STRIP_2x6_3"));
        assert!(line.ends_with("2x6 Strip (3 Photos)"));
    }
}
