//! Text views of the record and the panel results, with unlock gates applied.

use std::fmt::Write as _;

use crate::core::assist::Panel;
use crate::core::record::{CvData, SOFT_SKILL_CATALOG};
use crate::core::state::App;
use crate::inference::Source;
use crate::render::plain;

use super::command::View;

const WIDTH: usize = 88;

pub fn render(app: &App, view: View) -> String {
    let record = &app.record;
    match view {
        View::Cv => plain::to_text(&app.document(), WIDTH),
        View::Record => serde_json::to_string_pretty(record).unwrap_or_default(),
        View::Interview => interview(record),
        View::LinkedIn => linkedin(record),
        View::Refresh => refresh(record),
        View::Cover => {
            if record.cover_letter.trim().is_empty() {
                "No cover letter yet. Run /cover.".to_string()
            } else {
                record.cover_letter.clone()
            }
        }
        View::Deck => deck(record),
        View::Chat => chat(app),
        View::Attachments => {
            if app.attachments.is_empty() {
                "No files attached.".to_string()
            } else {
                app.attachments
                    .iter()
                    .map(|a| format!("{} ({})", a.file_name, a.mime_type))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
    }
}

/// The view worth printing after a panel finishes.
pub fn for_panel(panel: Panel) -> View {
    match panel {
        Panel::Refresh => View::Refresh,
        Panel::Interview => View::Interview,
        Panel::LinkedIn => View::LinkedIn,
        Panel::CoverLetter => View::Cover,
        Panel::Summary | Panel::Chat => View::Cv,
        Panel::Presentation => View::Deck,
    }
}

fn interview(record: &CvData) -> String {
    let prep = &record.interview_prep;
    if prep.questions.is_empty() {
        return "No interview questions yet. Run /interview.".to_string();
    }
    let mut out = String::new();
    let company = if prep.target_company.is_empty() { "any company" } else { &prep.target_company };
    let _ = writeln!(out, "Interview prep for {company}");
    for (i, q) in prep.visible_questions().iter().enumerate() {
        let _ = writeln!(out, "\n{}. [{}] {}", i + 1, q.kind.label(), q.question);
        if q.answer.is_empty() && q.is_premium {
            let _ = writeln!(out, "   (locked, /unlock interview)");
        } else {
            let _ = writeln!(out, "   {}", q.answer);
        }
    }
    if !prep.tips.is_empty() {
        let _ = writeln!(out, "\nTips");
        for tip in &prep.tips {
            let _ = writeln!(out, "- {tip}");
        }
    }
    out
}

fn linkedin(record: &CvData) -> String {
    let analysis = &record.linkedin_analysis;
    if !analysis.has_result() {
        return "No LinkedIn analysis yet. Run /linkedin <profile text>.".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(out, "Profile score: {:.0}/100", analysis.score);
    for (heading, items) in [("Strengths", &analysis.strengths), ("Weaknesses", &analysis.weaknesses)] {
        if !items.is_empty() {
            let _ = writeln!(out, "\n{heading}");
            for item in items {
                let _ = writeln!(out, "- {item}");
            }
        }
    }
    let _ = writeln!(out, "\nKeywords: {}", analysis.visible_keywords().join(", "));
    let _ = writeln!(out, "\nSuggestions");
    for s in analysis.visible_suggestions() {
        let _ = writeln!(out, "- {}: {}", s.section, s.action);
    }
    let hidden = analysis.keywords.len() - analysis.visible_keywords().len()
        + analysis.suggestions.len()
        - analysis.visible_suggestions().len();
    if hidden > 0 {
        let _ = writeln!(out, "\n{hidden} more items locked, /unlock linkedin");
    }
    out
}

fn refresh(record: &CvData) -> String {
    let analysis = &record.cv_refresh;
    if !analysis.is_processed {
        return "No refresh yet. Run /refresh <old CV text> or attach the file.".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(out, "Score: {:.0} -> {:.0}", analysis.old_score, analysis.new_score);
    if !analysis.missing_keywords.is_empty() {
        let _ = writeln!(out, "Missing keywords: {}", analysis.missing_keywords.join(", "));
    }
    for imp in &analysis.improvements {
        let _ = writeln!(out, "\n- before: {}\n  after:  {}\n  impact: {}", imp.before, imp.after, imp.impact);
    }
    out
}

fn deck(record: &CvData) -> String {
    let deck = &record.presentation;
    if !deck.is_generated {
        return "No presentation yet. Run /deck.".to_string();
    }
    let mut out = String::new();
    for (i, slide) in deck.slides.iter().enumerate() {
        let _ = writeln!(out, "Slide {} [{}]: {}", i + 1, slide.kind, slide.title);
        for line in &slide.content {
            let _ = writeln!(out, "  - {line}");
        }
    }
    out
}

fn chat(app: &App) -> String {
    app.transcript
        .iter()
        .map(|m| {
            let who = match m.source {
                Source::User => "you",
                _ => "assistant",
            };
            format!("{who}: {}", m.text)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn soft_skill_catalog(record: &CvData) -> String {
    SOFT_SKILL_CATALOG
        .iter()
        .map(|label| {
            let mark = if record.soft_skills.iter().any(|s| s == label) { "x" } else { " " };
            format!("[{mark}] {label}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
