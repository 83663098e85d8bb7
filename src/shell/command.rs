//! Parses one input line into a [`Command`]. Pure: no state, no I/O.
//!
//! Values may contain `\n` escapes for multi-line fields such as
//! achievements. List positions are 1-based.

use std::path::PathBuf;

use clap::ValueEnum;

use crate::core::action::{Gate, TechField, TextField};
use crate::core::record::{ListKind, PersonalInfo};
use crate::render::TemplateKind;

/// What `/show` prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Cv,
    Record,
    Interview,
    LinkedIn,
    Refresh,
    Cover,
    Deck,
    Chat,
    Attachments,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetPersonal { field: String, value: String },
    SetText { field: TextField, value: String },
    Add(ListKind),
    Edit { list: ListKind, position: usize, field: String, value: String },
    Remove { list: ListKind, position: usize },
    Move { list: ListKind, from: usize, to: usize },
    /// Toggle a soft skill, or list the catalog when empty.
    Skill(Option<String>),
    Tech { field: TechField, value: String },
    Style { key: String, value: String },
    Template(TemplateKind),
    Show(View),
    Html(Option<PathBuf>),
    Pdf,
    Slides,
    Attach(PathBuf),
    ClearAttachments,
    Refresh(String),
    Interview,
    Company(String),
    Unlock(Gate),
    LinkedIn(String),
    Cover,
    Summary,
    Deck,
    Help,
    Quit,
    /// Anything that is not a command goes to the chat panel.
    Chat(String),
}

pub const HELP: &str = "\
Editing
  /set <field> <value>            personal field (fullName, email, ...) or aboutMe, jobTarget,
                                  additionalActivities, jobDescription, coverLetter
  /add <list>                     experience | education | certifications | sections | projects
  /edit <list> <n> <field> <value>
  /rm <list> <n>                  /mv <list> <from> <to>
  /skill [label]                  toggle a soft skill (no label lists suggestions)
  /tech <software|accounting|lab> <value>
  /style <key> <value>            accentColor, englishFont, arabicFont, fontSize, baseFontSize,
                                  lineHeight, sectionSpacing, headingSize
  /template <arabic|english|plain>
Output
  /show [cv|record|interview|linkedin|refresh|cover|deck|chat|files]
  /html [path]   /pdf   /slides
AI
  /attach <path> | /attach clear
  /refresh <old CV text>          /interview   /company <name>
  /linkedin <profile text>        /unlock <interview|linkedin>
  /cover   /summary   /deck
  anything else                   chat with the assistant
  /help   /quit
Use \\n inside a value for a line break.";

fn unescape(value: &str) -> String {
    value.trim().replace("\\n", "\n")
}

/// Splits off the first whitespace-separated word.
fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.find(char::is_whitespace) {
        Some(i) => (&input[..i], input[i..].trim_start()),
        None => (input, ""),
    }
}

fn require<'a>(value: &'a str, usage: &str) -> Result<&'a str, String> {
    if value.trim().is_empty() {
        Err(format!("usage: {usage}"))
    } else {
        Ok(value)
    }
}

fn position(word: &str) -> Result<usize, String> {
    match word.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(format!("'{word}' is not a position (1, 2, ...)")),
    }
}

fn list(word: &str) -> Result<ListKind, String> {
    word.parse::<ListKind>()
}

fn view(word: &str) -> Result<View, String> {
    match word.to_ascii_lowercase().as_str() {
        "" | "cv" => Ok(View::Cv),
        "record" | "json" => Ok(View::Record),
        "interview" => Ok(View::Interview),
        "linkedin" => Ok(View::LinkedIn),
        "refresh" => Ok(View::Refresh),
        "cover" => Ok(View::Cover),
        "deck" | "slides" => Ok(View::Deck),
        "chat" => Ok(View::Chat),
        "files" | "attachments" => Ok(View::Attachments),
        other => Err(format!("nothing to show for '{other}'")),
    }
}

pub fn parse(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Command::Chat(line.to_string()));
    };
    let (name, args) = split_word(rest);

    match name.to_ascii_lowercase().as_str() {
        "set" => {
            let (field, value) = split_word(args);
            require(field, "/set <field> <value>")?;
            if PersonalInfo::FIELDS.contains(&field) {
                return Ok(Command::SetPersonal {
                    field: field.to_string(),
                    value: unescape(value),
                });
            }
            let field = field.parse::<TextField>()?;
            Ok(Command::SetText { field, value: unescape(value) })
        }
        "add" => Ok(Command::Add(list(require(args, "/add <list>")?.trim())?)),
        "edit" => {
            let usage = "/edit <list> <n> <field> <value>";
            let (kind, rest) = split_word(require(args, usage)?);
            let (n, rest) = split_word(rest);
            let (field, value) = split_word(rest);
            require(field, usage)?;
            Ok(Command::Edit {
                list: list(kind)?,
                position: position(n)?,
                field: field.to_string(),
                value: unescape(value),
            })
        }
        "rm" => {
            let (kind, n) = split_word(require(args, "/rm <list> <n>")?);
            Ok(Command::Remove { list: list(kind)?, position: position(n.trim())? })
        }
        "mv" => {
            let (kind, rest) = split_word(require(args, "/mv <list> <from> <to>")?);
            let (from, to) = split_word(rest);
            Ok(Command::Move {
                list: list(kind)?,
                from: position(from)?,
                to: position(to.trim())?,
            })
        }
        "skill" => {
            let label = args.trim();
            Ok(Command::Skill((!label.is_empty()).then(|| label.to_string())))
        }
        "tech" => {
            let (field, value) = split_word(require(args, "/tech <field> <value>")?);
            Ok(Command::Tech { field: field.parse()?, value: unescape(value) })
        }
        "style" => {
            let (key, value) = split_word(args);
            require(value, "/style <key> <value>")?;
            Ok(Command::Style { key: key.to_string(), value: value.trim().to_string() })
        }
        "template" => {
            let name = require(args, "/template <arabic|english|plain>")?.trim();
            TemplateKind::from_str(name, true)
                .map(Command::Template)
                .map_err(|_| format!("unknown template '{name}'"))
        }
        "show" => Ok(Command::Show(view(args.trim())?)),
        "html" => {
            let path = args.trim();
            Ok(Command::Html((!path.is_empty()).then(|| PathBuf::from(path))))
        }
        "pdf" => Ok(Command::Pdf),
        "slides" => Ok(Command::Slides),
        "attach" => match require(args, "/attach <path> | /attach clear")?.trim() {
            "clear" => Ok(Command::ClearAttachments),
            path => Ok(Command::Attach(PathBuf::from(path))),
        },
        "refresh" => Ok(Command::Refresh(unescape(args))),
        "interview" => Ok(Command::Interview),
        "company" => Ok(Command::Company(args.trim().to_string())),
        "unlock" => match args.trim().to_ascii_lowercase().as_str() {
            "interview" => Ok(Command::Unlock(Gate::Interview)),
            "linkedin" => Ok(Command::Unlock(Gate::LinkedIn)),
            _ => Err("usage: /unlock <interview|linkedin>".into()),
        },
        "linkedin" => Ok(Command::LinkedIn(unescape(args))),
        "cover" => Ok(Command::Cover),
        "summary" => Ok(Command::Summary),
        "deck" => Ok(Command::Deck),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(format!("unknown command '/{other}' (try /help)")),
    }
}
