//! # Shell Adapter
//!
//! Line-oriented front end. Reads commands from stdin, translates them into
//! `core::Action` values, and runs the resulting effects: model requests as
//! spawned tokio tasks, exports on the blocking pool. Background work
//! reports back through the same action channel.
//!
//! This is the only module that prints to stdout.

pub mod command;
pub mod view;

use std::io::Write as _;
use std::path::Path;
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};

use crate::ProviderKind;
use crate::core::action::{Action, Effect, update};
use crate::core::assist::{self, AssistJob, AssistTask};
use crate::core::config::ResolvedConfig;
use crate::core::record::ListKind;
use crate::core::state::App;
use crate::export::{self, ExportJob};
use crate::inference::{Attachment, CompletionProvider, GeminiProvider, OpenRouterProvider, Source};
use crate::render::html;

use command::{Command, HELP};

pub fn build_provider(config: &ResolvedConfig) -> Arc<dyn CompletionProvider> {
    match config.provider {
        ProviderKind::Gemini => Arc::new(GeminiProvider::new(
            config.gemini_api_key.clone().unwrap_or_default(),
            Some(config.gemini_base_url.clone()),
            config.request_timeout,
        )),
        ProviderKind::OpenRouter => Arc::new(OpenRouterProvider::new(
            config.openrouter_api_key.clone().unwrap_or_default(),
            Some(config.openrouter_base_url.clone()),
            config.request_timeout,
        )),
    }
}

/// Looks up the id of the entry at a 1-based position.
fn entry_id(app: &App, list: ListKind, position: usize) -> Result<String, String> {
    let record = &app.record;
    let ids: Vec<&str> = match list {
        ListKind::Experience => record.experience.iter().map(|e| e.id.as_str()).collect(),
        ListKind::Education => record.education.iter().map(|e| e.id.as_str()).collect(),
        ListKind::Certifications => record.certifications.iter().map(|e| e.id.as_str()).collect(),
        ListKind::CustomSections => record.custom_sections.iter().map(|e| e.id.as_str()).collect(),
        ListKind::Projects => record.projects.iter().map(|e| e.id.as_str()).collect(),
    };
    ids.get(position - 1)
        .map(|id| id.to_string())
        .ok_or_else(|| format!("{list} has {} entries, no entry {position}", ids.len()))
}

/// What the shell should do with a parsed command.
enum Step {
    Dispatch(Action),
    Print(String),
}

fn write_html(app: &App, path: Option<&Path>) -> Result<String, String> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let dir = &app.export_options.output_dir;
            export::ensure_dir(dir).map_err(|e| format!("could not create {}: {e}", dir.display()))?;
            dir.join(export::html_file_name(app.record.display_name_or(export::PDF_FALLBACK_NAME)))
        }
    };
    let page = html::to_html(&app.document(), &app.record.settings);
    std::fs::write(&path, page).map_err(|e| format!("could not write {}: {e}", path.display()))?;
    info!("Wrote HTML preview to {}", path.display());
    Ok(format!("Wrote {}", path.display()))
}

fn translate(app: &App, command: Command) -> Result<Step, String> {
    let step = match command {
        Command::SetPersonal { field, value } => Step::Dispatch(Action::SetPersonalField { field, value }),
        Command::SetText { field, value } => Step::Dispatch(Action::SetText { field, value }),
        Command::Add(list) => Step::Dispatch(Action::AddEntry(list)),
        Command::Edit { list, position, field, value } => Step::Dispatch(Action::SetEntryField {
            list,
            id: entry_id(app, list, position)?,
            field,
            value,
        }),
        Command::Remove { list, position } => Step::Dispatch(Action::RemoveEntry {
            list,
            id: entry_id(app, list, position)?,
        }),
        Command::Move { list, from, to } => Step::Dispatch(Action::MoveEntry { list, from: from - 1, to: to - 1 }),
        Command::Skill(None) => Step::Print(view::soft_skill_catalog(&app.record)),
        Command::Skill(Some(label)) => Step::Dispatch(Action::ToggleSoftSkill(label)),
        Command::Tech { field, value } => Step::Dispatch(Action::SetTechnicalSkill { field, value }),
        Command::Style { key, value } => Step::Dispatch(Action::SetSetting { key, value }),
        Command::Template(kind) => Step::Dispatch(Action::SelectTemplate(kind)),
        Command::Show(v) => Step::Print(view::render(app, v)),
        Command::Html(path) => Step::Print(write_html(app, path.as_deref())?),
        Command::Pdf => Step::Dispatch(Action::ExportPdf),
        Command::Slides => Step::Dispatch(Action::ExportSlides),
        Command::Attach(path) => {
            let attachment =
                Attachment::from_path(&path).map_err(|e| format!("could not read {}: {e}", path.display()))?;
            Step::Dispatch(Action::Attach(attachment))
        }
        Command::ClearAttachments => Step::Dispatch(Action::ClearAttachments),
        Command::Refresh(old_cv) => Step::Dispatch(Action::Submit(AssistTask::Refresh { old_cv })),
        Command::Interview => Step::Dispatch(Action::Submit(AssistTask::InterviewPrep)),
        Command::Company(name) => Step::Dispatch(Action::SetTargetCompany(name)),
        Command::Unlock(gate) => Step::Dispatch(Action::Unlock(gate)),
        Command::LinkedIn(profile) => Step::Dispatch(Action::Submit(AssistTask::LinkedIn { profile })),
        Command::Cover => Step::Dispatch(Action::Submit(AssistTask::CoverLetter)),
        Command::Summary => Step::Dispatch(Action::Submit(AssistTask::Summary)),
        Command::Deck => Step::Dispatch(Action::Submit(AssistTask::Presentation)),
        Command::Help => Step::Print(HELP.to_string()),
        Command::Quit => Step::Dispatch(Action::Quit),
        Command::Chat(message) => Step::Dispatch(Action::Submit(AssistTask::Chat { message })),
    };
    Ok(step)
}

fn spawn_assist(app: &App, job: AssistJob, tx: UnboundedSender<Action>) {
    let provider = app.provider.clone();
    let options = app.options.clone();
    let panel = job.task.panel();
    info!("Spawning {panel} request");
    tokio::spawn(async move {
        let result = assist::run(provider.as_ref(), &options, job).await;
        if tx.send(Action::AssistFinished { panel, result }).is_err() {
            warn!("Failed to send {panel} result: receiver dropped");
        }
    });
}

fn spawn_export(app: &App, job: ExportJob, tx: UnboundedSender<Action>) {
    let options = app.export_options.clone();
    info!("Spawning export");
    tokio::spawn(async move {
        let result = match tokio::task::spawn_blocking(move || export::run(&job, &options)).await {
            Ok(result) => result,
            Err(e) => Err(export::ExportError::Io(std::io::Error::other(e.to_string()))),
        };
        if tx.send(Action::ExportFinished(result)).is_err() {
            warn!("Failed to send export result: receiver dropped");
        }
    });
}

/// What to print once a panel's answer has been applied.
fn finished_view(app: &App, panel: assist::Panel) -> String {
    match panel {
        assist::Panel::Chat => app
            .transcript
            .iter()
            .rev()
            .find(|m| m.source == Source::Model)
            .map(|m| m.text.clone())
            .unwrap_or_default(),
        other => view::render(app, view::for_panel(other)),
    }
}

/// Applies one action and starts its effect. Returns true when the shell should exit.
fn dispatch(app: &mut App, action: Action, tx: &UnboundedSender<Action>) -> bool {
    debug!("Dispatching: {:?}", action);
    let finished_panel = match &action {
        Action::AssistFinished { panel, .. } => Some(*panel),
        _ => None,
    };
    let was_exporting = app.is_exporting;

    match update(app, action) {
        Effect::Quit => return true,
        Effect::SpawnAssist(job) => spawn_assist(app, job, tx.clone()),
        Effect::Export(job) => spawn_export(app, job, tx.clone()),
        Effect::None => {}
    }

    if let Some(err) = app.error.take() {
        println!("! {err}");
    } else if let Some(panel) = finished_panel {
        println!("\n{}", finished_view(app, panel));
    } else if was_exporting && !app.is_exporting {
        for path in &app.last_export {
            println!("wrote {}", path.display());
        }
    } else if !app.status_message.is_empty() {
        println!("{}", app.status_message);
        app.status_message.clear();
    }
    false
}

fn prompt(app: &App) {
    let busy: Vec<String> = app.in_flight.iter().map(|p| p.to_string()).collect();
    if busy.is_empty() {
        print!("cvai> ");
    } else {
        print!("cvai [{}]> ", busy.join(", "));
    }
    let _ = std::io::stdout().flush();
}

pub async fn run(config: ResolvedConfig) -> std::io::Result<()> {
    info!(
        "Starting shell: provider={:?}, model={}, template={:?}",
        config.provider, config.model_name, config.template
    );
    let provider = build_provider(&config);
    let mut app = App::from_config(provider, &config);
    app.status_message.clear();

    let (tx, mut rx) = unbounded_channel::<Action>();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("cvai: CV builder ({} via {:?}). Type /help for commands.", config.model_name, config.provider);
    prompt(&app);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("stdin closed");
                    break;
                };
                if line.trim().is_empty() {
                    prompt(&app);
                    continue;
                }
                let quit = match command::parse(&line).and_then(|c| translate(&app, c)) {
                    Ok(Step::Dispatch(action)) => dispatch(&mut app, action, &tx),
                    Ok(Step::Print(text)) => {
                        println!("{text}");
                        false
                    }
                    Err(msg) => {
                        println!("! {msg}");
                        false
                    }
                };
                if quit {
                    break;
                }
                prompt(&app);
            }
            Some(action) = rx.recv() => {
                if dispatch(&mut app, action, &tx) {
                    break;
                }
                prompt(&app);
            }
        }
    }

    if !app.in_flight.is_empty() {
        info!("Exiting with {} request(s) still running", app.in_flight.len());
    }
    Ok(())
}
