//! Editor script parsing.
//!
//! A script is plain text with one command per line. Blank lines and lines
//! starting with `#` are skipped. Coordinates are `x y` with `y = 0` the
//! bottom row; `sent` in place of `y` addresses the garbage line.
//!
//! ```text
//! paint X Y PIECE          brush X Y PIECE        stroke X Y PIECE
//! begin | commit | cancel
//! piece PIECE ROTATION X Y | piece none
//! infer X Y X Y X Y X Y
//! comment [TEXT...] | inherit
//! flag lock|mirror|rise|frozen on|off
//! insert [N] | remove [N] | move FROM TO
//! next | back | goto N
//! undo | redo | reset | import DATA | show | quit
//! ```
//!
//! Parsing is pure: the parser only classifies lines. Invalid arguments are
//! reported separately from unknown commands so the caller can point at them.

use crate::Action;
use core_document::{Comment, PageFlags};
use core_field::{CellKey, FIELD_WIDTH, Piece, Placement, Rotation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCommand {
    Action(Action),
    /// Blank or comment line.
    Skip,
    Unknown(String),
    Invalid { command: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    #[error("line {line}: unknown command `{command}`")]
    Unknown { line: usize, command: String },
    #[error("line {line}: {command}: {reason}")]
    Invalid {
        line: usize,
        command: String,
        reason: String,
    },
}

pub struct ScriptParser;

impl ScriptParser {
    pub fn parse(raw: &str) -> ParsedCommand {
        let s = raw.trim();
        if s.is_empty() || s.starts_with('#') {
            return ParsedCommand::Skip;
        }
        let (command, rest) = match s.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (s, ""),
        };
        let args: Vec<&str> = rest.split_whitespace().collect();
        let parsed = match command.to_ascii_lowercase().as_str() {
            "begin" => exact(&args, Action::BeginGesture),
            "commit" => exact(&args, Action::CommitGesture),
            "cancel" => exact(&args, Action::CancelGesture),
            "next" => exact(&args, Action::NextPage),
            "back" => exact(&args, Action::BackPage),
            "undo" => exact(&args, Action::Undo),
            "redo" => exact(&args, Action::Redo),
            "reset" => exact(&args, Action::Reset),
            "show" => exact(&args, Action::Show),
            "quit" | "q" => exact(&args, Action::Quit),
            "paint" => cell_and_piece(&args).map(|(key, piece)| Action::Paint { key, piece }),
            "brush" => cell_and_piece(&args).map(|(key, piece)| Action::Brush { key, piece }),
            "stroke" => cell_and_piece(&args).map(|(key, piece)| Action::Stroke { key, piece }),
            "piece" => piece(&args).map(Action::SetPiece),
            "infer" => infer(&args).map(Action::Infer),
            // The text is taken verbatim so inner spacing survives.
            "comment" => Ok(Action::SetComment(Comment::Explicit(rest.to_string()))),
            "inherit" => exact(&args, Action::SetComment(Comment::Inherited)),
            "flag" => flag(&args),
            "insert" => optional_index(&args).map(Action::InsertPage),
            "remove" => optional_index(&args).map(Action::RemovePage),
            "move" => match args.as_slice() {
                [from, to] => {
                    number(from).and_then(|from| Ok(Action::MovePage { from, to: number(to)? }))
                }
                _ => Err("expected FROM TO".to_string()),
            },
            "goto" => match args.as_slice() {
                [index] => number(index).map(Action::GotoPage),
                _ => Err("expected a page index".to_string()),
            },
            "import" => match args.as_slice() {
                [data] => Ok(Action::Import(data.to_string())),
                _ => Err("expected encoded data".to_string()),
            },
            _ => return ParsedCommand::Unknown(command.to_string()),
        };
        match parsed {
            Ok(action) => ParsedCommand::Action(action),
            Err(reason) => ParsedCommand::Invalid {
                command: command.to_string(),
                reason,
            },
        }
    }
}

/// Parse a whole script. Stops at the first line that is not a valid command.
pub fn parse_script(text: &str) -> Result<Vec<Action>, ScriptError> {
    let mut actions = Vec::new();
    for (i, line) in text.lines().enumerate() {
        match ScriptParser::parse(line) {
            ParsedCommand::Action(action) => actions.push(action),
            ParsedCommand::Skip => {}
            ParsedCommand::Unknown(command) => {
                return Err(ScriptError::Unknown {
                    line: i + 1,
                    command,
                });
            }
            ParsedCommand::Invalid { command, reason } => {
                return Err(ScriptError::Invalid {
                    line: i + 1,
                    command,
                    reason,
                });
            }
        }
    }
    Ok(actions)
}

type Parsed<T> = Result<T, String>;

fn exact(args: &[&str], action: Action) -> Parsed<Action> {
    if args.is_empty() {
        Ok(action)
    } else {
        Err("takes no arguments".to_string())
    }
}

fn number<T: std::str::FromStr>(arg: &str) -> Parsed<T> {
    arg.parse().map_err(|_| format!("`{arg}` is not a number"))
}

fn optional_index(args: &[&str]) -> Parsed<Option<usize>> {
    match args {
        [] => Ok(None),
        [index] => number(index).map(Some),
        _ => Err("expected at most one page index".to_string()),
    }
}

fn piece_name(arg: &str) -> Parsed<Piece> {
    let mut chars = arg.chars();
    let piece = match (chars.next(), chars.next()) {
        (Some(c), None) => Piece::from_letter(c),
        _ => match arg.to_ascii_lowercase().as_str() {
            "empty" => Some(Piece::Empty),
            "gray" | "grey" | "garbage" => Some(Piece::Gray),
            _ => None,
        },
    };
    piece.ok_or_else(|| format!("`{arg}` is not a piece"))
}

fn cell(x: &str, y: &str) -> Parsed<CellKey> {
    let x: usize = number(x)?;
    let key = if y.eq_ignore_ascii_case("sent") {
        CellKey::sent(x)
    } else {
        CellKey::at(x, number(y)?)
    };
    key.map_err(|e| e.to_string())
}

fn cell_and_piece(args: &[&str]) -> Parsed<(CellKey, Piece)> {
    match args {
        [x, y, piece] => Ok((cell(x, y)?, piece_name(piece)?)),
        _ => Err("expected X Y PIECE".to_string()),
    }
}

fn piece(args: &[&str]) -> Parsed<Option<Placement>> {
    match args {
        [none] if none.eq_ignore_ascii_case("none") => Ok(None),
        [piece, rotation, x, y] => {
            let piece = piece_name(piece)?;
            let rotation =
                Rotation::from_name(rotation).ok_or_else(|| format!("`{rotation}` is not a rotation"))?;
            Placement::new(piece, rotation, number(x)?, number(y)?)
                .map(Some)
                .map_err(|e| e.to_string())
        }
        _ => Err("expected PIECE ROTATION X Y or `none`".to_string()),
    }
}

fn infer(args: &[&str]) -> Parsed<Vec<usize>> {
    if args.len() != 8 {
        return Err("expected four X Y pairs".to_string());
    }
    args.chunks(2)
        .map(|pair| {
            let x: usize = number(pair[0])?;
            let y: usize = number(pair[1])?;
            if x >= FIELD_WIDTH {
                return Err(format!("x {x} is off the field"));
            }
            Ok(y * FIELD_WIDTH + x)
        })
        .collect()
}

fn flag(args: &[&str]) -> Parsed<Action> {
    let [name, state] = args else {
        return Err("expected NAME on|off".to_string());
    };
    let flag = match name.to_ascii_lowercase().as_str() {
        "lock" => PageFlags::LOCK,
        "mirror" => PageFlags::MIRROR,
        "rise" => PageFlags::RISE,
        "frozen" | "freeze" => PageFlags::FROZEN,
        _ => return Err(format!("`{name}` is not a page flag")),
    };
    let on = match state.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" => true,
        "off" | "false" | "0" => false,
        _ => return Err(format!("`{state}` is not on or off")),
    };
    Ok(Action::SetFlag { flag, on })
}
