//! Developer console: `object.method(arg, ...)` lines parsed into typed commands.
//!
//! The regex only splits a line into object, method and raw argument text.
//! Arguments are tokenised separately and then checked against the closed
//! [`Command`] set, so a line either yields one complete command or nothing.

use std::fmt;
use std::sync::LazyLock;

use glam::Vec3;
use regex::Regex;

use crate::color::Color;

static CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z_]\w*)\s*\.\s*([A-Za-z_]\w*)\s*\((.*)\)\s*;?\s*$").unwrap()
});

/// One tokenised argument. Bare tokens that are not numbers stay strings.
#[derive(Clone, Debug, PartialEq)]
pub enum Arg {
    Num(f32),
    Str(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Background(Color),
    BrainPosition(Vec3),
    BrainOffset(Vec3),
    CameraSpeed(f32),
    StarSpin(f32),
    BoundsExtent(f32),
}

#[derive(Clone, Debug, PartialEq)]
pub enum CommandError {
    /// Not of the form `object.method(...)`.
    Malformed,
    UnterminatedString,
    EmptyArgument(usize),
    Unknown { object: String, method: String },
    Arity { expected: usize, got: usize },
    Argument { index: usize, reason: String },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Malformed => write!(f, "expected object.method(args)"),
            CommandError::UnterminatedString => write!(f, "unterminated string literal"),
            CommandError::EmptyArgument(i) => write!(f, "argument {i} is empty"),
            CommandError::Unknown { object, method } => write!(f, "unknown command {object}.{method}"),
            CommandError::Arity { expected, got } => {
                write!(f, "expected {expected} argument(s), got {got}")
            }
            CommandError::Argument { index, reason } => write!(f, "argument {index}: {reason}"),
        }
    }
}

impl std::error::Error for CommandError {}

/// Split raw argument text on top-level commas. Quotes may be `'` or `"`.
pub fn tokenize_args(raw: &str) -> Result<Vec<Arg>, CommandError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut args = Vec::new();
    let mut chars = raw.chars().peekable();
    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let arg = match chars.peek().copied() {
            Some(quote @ ('"' | '\'')) => {
                chars.next();
                let mut text = String::new();
                loop {
                    match chars.next() {
                        None => return Err(CommandError::UnterminatedString),
                        Some('\\') => match chars.next() {
                            Some(c) => text.push(c),
                            None => return Err(CommandError::UnterminatedString),
                        },
                        Some(c) if c == quote => break,
                        Some(c) => text.push(c),
                    }
                }
                while chars.next_if(|c| c.is_whitespace()).is_some() {}
                Arg::Str(text)
            }
            _ => {
                let mut token = String::new();
                while let Some(c) = chars.next_if(|&c| c != ',') {
                    token.push(c);
                }
                let token = token.trim();
                if token.is_empty() {
                    return Err(CommandError::EmptyArgument(args.len()));
                }
                match token.parse::<f32>() {
                    Ok(n) => Arg::Num(n),
                    Err(_) => Arg::Str(token.to_string()),
                }
            }
        };
        args.push(arg);
        match chars.next() {
            None => return Ok(args),
            Some(',') => {}
            // Trailing text after a closing quote.
            Some(_) => return Err(CommandError::Malformed),
        }
    }
}

fn number(args: &[Arg], index: usize) -> Result<f32, CommandError> {
    match &args[index] {
        Arg::Num(n) if n.is_finite() => Ok(*n),
        Arg::Num(_) => Err(CommandError::Argument {
            index,
            reason: "not finite".into(),
        }),
        Arg::Str(s) => Err(CommandError::Argument {
            index,
            reason: format!("expected a number, got {s:?}"),
        }),
    }
}

fn arity(args: &[Arg], expected: usize) -> Result<(), CommandError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(CommandError::Arity {
            expected,
            got: args.len(),
        })
    }
}

fn vector(args: &[Arg]) -> Result<Vec3, CommandError> {
    arity(args, 3)?;
    Ok(Vec3::new(number(args, 0)?, number(args, 1)?, number(args, 2)?))
}

fn non_negative(args: &[Arg]) -> Result<f32, CommandError> {
    arity(args, 1)?;
    let v = number(args, 0)?;
    if v < 0.0 {
        return Err(CommandError::Argument {
            index: 0,
            reason: "must not be negative".into(),
        });
    }
    Ok(v)
}

pub fn parse_line(line: &str) -> Result<Command, CommandError> {
    let caps = CALL.captures(line).ok_or(CommandError::Malformed)?;
    let object = &caps[1];
    let method = &caps[2];
    let args = tokenize_args(&caps[3])?;

    match (object, method) {
        ("scene", "background") => {
            arity(&args, 1)?;
            let text = match &args[0] {
                Arg::Str(s) => s.clone(),
                Arg::Num(n) => n.to_string(),
            };
            Color::parse(&text)
                .map(Command::Background)
                .ok_or_else(|| CommandError::Argument {
                    index: 0,
                    reason: format!("not a color: {text:?}"),
                })
        }
        ("brain", "position") => vector(&args).map(Command::BrainPosition),
        ("brain", "offset") => vector(&args).map(Command::BrainOffset),
        ("camera", "speed") => non_negative(&args).map(Command::CameraSpeed),
        ("stars", "spin") => {
            arity(&args, 1)?;
            number(&args, 0).map(Command::StarSpin)
        }
        ("bounds", "extent") => {
            let v = non_negative(&args)?;
            if v == 0.0 {
                return Err(CommandError::Argument {
                    index: 0,
                    reason: "must be positive".into(),
                });
            }
            Ok(Command::BoundsExtent(v))
        }
        _ => Err(CommandError::Unknown {
            object: object.to_string(),
            method: method.to_string(),
        }),
    }
}

/// Parse every line, skipping blanks, `//` comments and invalid lines.
pub fn parse_script(text: &str) -> Vec<Command> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with("//")
        })
        .filter_map(|(number, line)| match parse_line(line) {
            Ok(command) => Some(command),
            Err(e) => {
                tracing::debug!(line = number + 1, error = %e, "console line skipped");
                None
            }
        })
        .collect()
}
