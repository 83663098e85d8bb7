//! # AI Assist Panels
//!
//! Each panel turns the current record (plus optional free text and
//! attachments) into one model request, and the model's answer into a typed
//! [`AssistReply`]. Nothing here mutates the record: the reducer applies the
//! reply to whatever the record looks like when the answer arrives.
//!
//! ```text
//! AssistJob ──▶ build_context + schema ──▶ CompletionProvider::complete
//!                                                   │
//!            AssistReply ◀── decode (serde + repair) ┘
//! ```

use std::fmt;

use log::{debug, info, warn};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::core::json_repair::{MalformedOutput, parse_model_json};
use crate::core::patch::CvPatch;
use crate::core::record::{
    CvData, CvRefreshAnalysis, Improvement, InterviewPrep, InterviewQuestion, LinkedInAnalysis,
    Presentation, QuestionKind, Slide, Suggestion,
};
use crate::core::tools::{self, CvUpdate, ToolError, UpdateCvTool};
use crate::inference::{
    Attachment, CompletionProvider, CompletionRequest, Context, ProviderError, ResponseSchema,
};

/// Old CV text beyond this many characters is not sent.
pub const REFRESH_INPUT_LIMIT: usize = 2500;

// ============================================================================
// Panels and tasks
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    Refresh,
    Interview,
    LinkedIn,
    CoverLetter,
    Summary,
    Presentation,
    Chat,
}

impl Panel {
    pub const ALL: [Panel; 7] = [
        Panel::Refresh,
        Panel::Interview,
        Panel::LinkedIn,
        Panel::CoverLetter,
        Panel::Summary,
        Panel::Presentation,
        Panel::Chat,
    ];
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Panel::Refresh => "CV refresh",
            Panel::Interview => "interview prep",
            Panel::LinkedIn => "LinkedIn analysis",
            Panel::CoverLetter => "cover letter",
            Panel::Summary => "summary",
            Panel::Presentation => "presentation",
            Panel::Chat => "chat",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssistTask {
    /// Rebuild the CV from pasted old CV text.
    Refresh { old_cv: String },
    InterviewPrep,
    /// Score a LinkedIn profile (pasted text and/or the profile PDF).
    LinkedIn { profile: String },
    CoverLetter,
    Summary,
    Presentation,
    Chat { message: String },
}

impl AssistTask {
    pub fn panel(&self) -> Panel {
        match self {
            AssistTask::Refresh { .. } => Panel::Refresh,
            AssistTask::InterviewPrep => Panel::Interview,
            AssistTask::LinkedIn { .. } => Panel::LinkedIn,
            AssistTask::CoverLetter => Panel::CoverLetter,
            AssistTask::Summary => Panel::Summary,
            AssistTask::Presentation => Panel::Presentation,
            AssistTask::Chat { .. } => Panel::Chat,
        }
    }
}

/// Everything a background request needs, detached from the live state.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistJob {
    pub task: AssistTask,
    pub attachments: Vec<Attachment>,
    /// The record as it was when the request was submitted.
    pub snapshot: CvData,
}

/// Model and limits used for every assist request.
#[derive(Debug, Clone)]
pub struct AssistOptions {
    pub model: String,
    pub max_output_tokens: u32,
}

// ============================================================================
// Replies and errors
// ============================================================================

/// A decoded, validated answer for one panel.
#[derive(Debug, Clone, PartialEq)]
pub enum AssistReply {
    Refreshed { update: CvUpdate, analysis: CvRefreshAnalysis },
    InterviewGenerated { questions: Vec<InterviewQuestion>, tips: Vec<String> },
    LinkedInAnalyzed(LinkedInAnalysis),
    CoverLetter(String),
    Summary(String),
    Presentation(Vec<Slide>),
    /// Either prose for the transcript, a record update, or both.
    Chat { text: Option<String>, update: Option<CvUpdate> },
}

impl AssistReply {
    /// The patch this reply makes to `current`. Unlock gates already in the
    /// record are carried over.
    pub fn to_patch(&self, current: &CvData) -> CvPatch {
        match self {
            AssistReply::Refreshed { update, analysis } => CvPatch {
                cv_refresh: Some(CvRefreshAnalysis {
                    is_processed: true,
                    ..analysis.clone()
                }),
                ..update.clone().into_patch(current)
            },
            AssistReply::InterviewGenerated { questions, tips } => CvPatch {
                interview_prep: Some(InterviewPrep {
                    questions: questions.clone(),
                    tips: tips.clone(),
                    ..current.interview_prep.clone()
                }),
                ..Default::default()
            },
            AssistReply::LinkedInAnalyzed(analysis) => CvPatch {
                linkedin_analysis: Some(LinkedInAnalysis {
                    is_unlocked: current.linkedin_analysis.is_unlocked,
                    ..analysis.clone()
                }),
                ..Default::default()
            },
            AssistReply::CoverLetter(text) => CvPatch {
                cover_letter: Some(text.clone()),
                ..Default::default()
            },
            AssistReply::Summary(text) => CvPatch {
                about_me: Some(text.clone()),
                ..Default::default()
            },
            AssistReply::Presentation(slides) => CvPatch {
                presentation: Some(Presentation {
                    slides: slides.clone(),
                    is_generated: true,
                }),
                ..Default::default()
            },
            AssistReply::Chat { update, .. } => match update {
                Some(update) => update.clone().into_patch(current),
                None => CvPatch::default(),
            },
        }
    }
}

#[derive(Debug)]
pub enum AssistError {
    Provider(ProviderError),
    /// The model answered with nothing usable.
    EmptyResponse,
    Malformed(MalformedOutput),
    Tool(ToolError),
}

impl fmt::Display for AssistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssistError::Provider(e) => write!(f, "{e}"),
            AssistError::EmptyResponse => write!(f, "the model returned an empty answer"),
            AssistError::Malformed(e) => write!(f, "{e}"),
            AssistError::Tool(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for AssistError {}

impl From<ProviderError> for AssistError {
    fn from(e: ProviderError) -> Self {
        AssistError::Provider(e)
    }
}

impl From<MalformedOutput> for AssistError {
    fn from(e: MalformedOutput) -> Self {
        AssistError::Malformed(e)
    }
}

impl From<ToolError> for AssistError {
    fn from(e: ToolError) -> Self {
        AssistError::Tool(e)
    }
}

// ============================================================================
// Decoders (trust boundary)
// ============================================================================

fn score(value: f64) -> f64 {
    if value.is_finite() { value.clamp(0.0, 100.0) } else { 0.0 }
}

fn non_blank(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
struct ImprovementAnswer {
    /// Original wording
    before: String,
    /// Rewritten wording
    after: String,
    /// Why the change matters for ATS screening
    impact: String,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
struct RefreshScores {
    /// ATS score of the old CV, 0-100
    old_score: f64,
    /// ATS score after the rewrite, 0-100
    new_score: f64,
    missing_keywords: Vec<String>,
    improvements: Vec<ImprovementAnswer>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
struct RefreshAnswer {
    #[serde(flatten)]
    update: CvUpdate,
    cv_refresh: RefreshScores,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
struct QuestionAnswer {
    /// behavioral, technical or fit
    #[serde(rename = "type")]
    kind: String,
    question: String,
    /// Model answer using the STAR method
    answer: String,
    is_premium: bool,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(default)]
struct InterviewAnswer {
    questions: Vec<QuestionAnswer>,
    tips: Vec<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(default)]
struct SuggestionAnswer {
    /// Profile section, e.g. Headline or About
    section: String,
    action: String,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(default)]
struct LinkedInAnswer {
    /// Profile strength, 0-100
    score: f64,
    strengths: Vec<String>,
    weaknesses: Vec<String>,
    keywords: Vec<String>,
    suggestions: Vec<SuggestionAnswer>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
struct CoverLetterAnswer {
    cover_letter: String,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
struct SummaryAnswer {
    /// Three to four sentence professional summary
    about_me: String,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(default)]
struct SlideAnswer {
    title: String,
    /// Short bullet points
    content: Vec<String>,
    /// intro, experience, projects, skills or closing
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(default)]
struct PresentationAnswer {
    slides: Vec<SlideAnswer>,
}

fn decode_refresh(text: &str) -> Result<AssistReply, AssistError> {
    let answer: RefreshAnswer = parse_model_json(text)?;
    let scores = answer.cv_refresh;
    Ok(AssistReply::Refreshed {
        update: answer.update.normalized(),
        analysis: CvRefreshAnalysis {
            old_score: score(scores.old_score),
            new_score: score(scores.new_score),
            missing_keywords: non_blank(scores.missing_keywords),
            improvements: scores
                .improvements
                .into_iter()
                .map(|i| Improvement {
                    before: i.before,
                    after: i.after,
                    impact: i.impact,
                })
                .collect(),
            is_processed: true,
        },
    })
}

fn decode_interview(text: &str) -> Result<AssistReply, AssistError> {
    let answer: InterviewAnswer = parse_model_json(text)?;
    let questions: Vec<InterviewQuestion> = answer
        .questions
        .into_iter()
        .filter(|q| !q.question.trim().is_empty())
        .map(|q| InterviewQuestion {
            kind: QuestionKind::from_label(&q.kind),
            question: q.question.trim().to_string(),
            answer: q.answer.trim().to_string(),
            is_premium: q.is_premium,
        })
        .collect();
    if questions.is_empty() {
        return Err(AssistError::EmptyResponse);
    }
    Ok(AssistReply::InterviewGenerated {
        questions,
        tips: non_blank(answer.tips),
    })
}

fn decode_linkedin(text: &str) -> Result<AssistReply, AssistError> {
    let answer: LinkedInAnswer = parse_model_json(text)?;
    Ok(AssistReply::LinkedInAnalyzed(LinkedInAnalysis {
        score: score(answer.score),
        strengths: non_blank(answer.strengths),
        weaknesses: non_blank(answer.weaknesses),
        keywords: non_blank(answer.keywords),
        suggestions: answer
            .suggestions
            .into_iter()
            .filter(|s| !s.action.trim().is_empty())
            .map(|s| Suggestion {
                section: s.section.trim().to_string(),
                action: s.action.trim().to_string(),
            })
            .collect(),
        is_unlocked: false,
    }))
}

fn decode_text<T, F>(text: &str, field: F) -> Result<String, AssistError>
where
    T: serde::de::DeserializeOwned,
    F: FnOnce(T) -> String,
{
    let answer: T = parse_model_json(text)?;
    let value = field(answer).trim().to_string();
    if value.is_empty() {
        Err(AssistError::EmptyResponse)
    } else {
        Ok(value)
    }
}

fn decode_presentation(text: &str) -> Result<AssistReply, AssistError> {
    let answer: PresentationAnswer = parse_model_json(text)?;
    let slides: Vec<Slide> = answer
        .slides
        .into_iter()
        .map(|s| Slide {
            title: s.title.trim().to_string(),
            content: non_blank(s.content),
            kind: s.kind.trim().to_string(),
        })
        .filter(|s| !s.title.is_empty() || !s.content.is_empty())
        .collect();
    if slides.is_empty() {
        return Err(AssistError::EmptyResponse);
    }
    Ok(AssistReply::Presentation(slides))
}

// ============================================================================
// Requests
// ============================================================================

const DIRECTIVE: &str = "You are a senior career coach and ATS expert. \
    Write in the language the candidate's CV is written in. \
    When a JSON schema is given, answer with JSON only.";

const CHAT_DIRECTIVE: &str = "You are a career expert helping the user write their CV. \
    When the user gives you information that belongs in the CV, call update_cv_data with only \
    the fields that change. Otherwise answer briefly.";

/// The parts of the record worth showing the model: the CV itself, without
/// rendering settings or earlier assistant results.
pub fn cv_context(record: &CvData) -> String {
    let mut value = serde_json::to_value(record).unwrap_or_default();
    if let Some(obj) = value.as_object_mut() {
        for key in ["settings", "interviewPrep", "linkedInAnalysis", "cvRefresh", "presentation"] {
            obj.remove(key);
        }
    }
    value.to_string()
}

fn experience_headlines(record: &CvData) -> String {
    let lines: Vec<String> = record
        .experience
        .iter()
        .filter(|e| !e.title.trim().is_empty())
        .map(|e| format!("{} at {}", e.title, e.company))
        .collect();
    serde_json::to_string(&lines).unwrap_or_default()
}

fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}

/// The user-facing instruction for a task.
pub fn build_prompt(task: &AssistTask, record: &CvData) -> String {
    match task {
        AssistTask::Refresh { old_cv } => format!(
            "Analyse this old CV and rebuild it for today's ATS systems.\n\
             Old CV: \"{}\"\n\
             Extract the personal info, job target, a professional summary and the experience. \
             List technical skills (software) and soft skills explicitly. \
             Score the old and the rewritten CV from 0 to 100, list missing keywords and the \
             most important before/after improvements.",
            truncate_chars(old_cv.trim(), REFRESH_INPUT_LIMIT)
        ),
        AssistTask::InterviewPrep => {
            let company = record.interview_prep.target_company.trim();
            format!(
                "Job target: {}\nExperience: {}\nSkills: {}\nTarget company: {}\n\
                 Generate 5 professional interview questions (2 behavioral, 2 technical, 1 about \
                 the company) with model answers using the STAR method. Mark the two hardest \
                 questions as premium. Add short preparation tips.",
                record.job_target,
                experience_headlines(record),
                record.technical_skills.software,
                if company.is_empty() { "not specified" } else { company },
            )
        }
        AssistTask::LinkedIn { profile } => format!(
            "Analyse this LinkedIn profile for a candidate targeting \"{}\". \
             Score it from 0 to 100, list strengths, weaknesses, the keywords recruiters search \
             for that are missing, and concrete suggestions per profile section.\n\
             Profile: \"{}\"",
            record.job_target,
            profile.trim()
        ),
        AssistTask::CoverLetter => format!(
            "Write a tailored cover letter dated {} connecting the job description's needs to \
             the candidate's achievements.\nJob description: \"{}\"\nCV: {}",
            chrono::Local::now().format("%Y-%m-%d"),
            record.job_description.trim(),
            cv_context(record)
        ),
        AssistTask::Summary => format!(
            "Write a three to four sentence professional summary for this CV, targeting \"{}\".\nCV: {}",
            record.job_target,
            cv_context(record)
        ),
        AssistTask::Presentation => {
            let projects: Vec<&str> = record.projects.iter().map(|p| p.name.as_str()).collect();
            format!(
                "Turn this CV into a presentation of 5 to 7 slides with very short bullet points.\n\
                 Name: {}\nJob target: {}\nExperience: {}\nProjects: {}\nSkills: {}\n\
                 Slide 1 introduces the candidate, then experience highlights, key projects, \
                 technical skills, and a closing slide with contact details.",
                record.personal_info.full_name,
                record.job_target,
                experience_headlines(record),
                serde_json::to_string(&projects).unwrap_or_default(),
                record.technical_skills.software,
            )
        }
        AssistTask::Chat { message } => message.clone(),
    }
}

/// The output schema declared for a task. Chat answers through a tool instead.
pub fn response_schema(task: &AssistTask) -> Option<ResponseSchema> {
    match task {
        AssistTask::Refresh { .. } => Some(ResponseSchema::for_type::<RefreshAnswer>("cv_refresh")),
        AssistTask::InterviewPrep => Some(ResponseSchema::for_type::<InterviewAnswer>("interview_prep")),
        AssistTask::LinkedIn { .. } => Some(ResponseSchema::for_type::<LinkedInAnswer>("linkedin_analysis")),
        AssistTask::CoverLetter => Some(ResponseSchema::for_type::<CoverLetterAnswer>("cover_letter")),
        AssistTask::Summary => Some(ResponseSchema::for_type::<SummaryAnswer>("summary")),
        AssistTask::Presentation => Some(ResponseSchema::for_type::<PresentationAnswer>("presentation")),
        AssistTask::Chat { .. } => None,
    }
}

/// Builds the full model context for a job.
pub fn build_context(job: &AssistJob) -> Context {
    match &job.task {
        AssistTask::Chat { message } => {
            let mut context = Context::new(CHAT_DIRECTIVE);
            context.add_user_message(format!("Current CV data: {}", cv_context(&job.snapshot)));
            context.add_user_parts(message.clone(), &job.attachments);
            context
        }
        task => {
            let mut context = Context::new(DIRECTIVE);
            context.add_user_parts(build_prompt(task, &job.snapshot), &job.attachments);
            context
        }
    }
}

/// Runs one assist job against a provider.
pub async fn run(
    provider: &dyn CompletionProvider,
    options: &AssistOptions,
    job: AssistJob,
) -> Result<AssistReply, AssistError> {
    let panel = job.task.panel();
    let context = build_context(&job);
    let schema = response_schema(&job.task);
    let tool_defs = match job.task {
        AssistTask::Chat { .. } => tools::available(),
        _ => Vec::new(),
    };

    info!(
        "Assist request: panel={}, provider={}, attachments={}",
        panel,
        provider.name(),
        job.attachments.len()
    );

    let completion = provider
        .complete(CompletionRequest {
            context: &context,
            model: &options.model,
            response_schema: schema.as_ref(),
            tools: &tool_defs,
            max_output_tokens: options.max_output_tokens,
        })
        .await?;

    if completion.truncated {
        warn!("{panel} answer hit the output limit; decoding will try to repair it");
    }

    if let AssistTask::Chat { .. } = job.task {
        let mut update: Option<CvUpdate> = None;
        for call in &completion.function_calls {
            debug!("Chat function call: {}", call.name);
            let next = tools::invoke(&UpdateCvTool, call).await?;
            update = Some(match update {
                Some(earlier) => earlier.then(next),
                None => next,
            });
        }
        let text = completion
            .text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        if text.is_none() && update.is_none() {
            return Err(AssistError::EmptyResponse);
        }
        return Ok(AssistReply::Chat { text, update });
    }

    let text = completion.text.ok_or(AssistError::EmptyResponse)?;
    debug!("{panel} raw answer: {text}");

    match job.task {
        AssistTask::Refresh { .. } => decode_refresh(&text),
        AssistTask::InterviewPrep => decode_interview(&text),
        AssistTask::LinkedIn { .. } => decode_linkedin(&text),
        AssistTask::CoverLetter => {
            decode_text(&text, |a: CoverLetterAnswer| a.cover_letter).map(AssistReply::CoverLetter)
        }
        AssistTask::Summary => decode_text(&text, |a: SummaryAnswer| a.about_me).map(AssistReply::Summary),
        AssistTask::Presentation => decode_presentation(&text),
        AssistTask::Chat { .. } => Err(AssistError::EmptyResponse),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::ListKind;
    use crate::inference::{Completion, FunctionCall, Part};
    use crate::test_support::ScriptedProvider;
    use serde_json::json;

    fn options() -> AssistOptions {
        AssistOptions {
            model: "test-model".into(),
            max_output_tokens: 4000,
        }
    }

    fn job(task: AssistTask) -> AssistJob {
        AssistJob {
            task,
            attachments: Vec::new(),
            snapshot: CvData::default(),
        }
    }

    #[test]
    fn test_refresh_prompt_truncates_input() {
        let long = "م".repeat(REFRESH_INPUT_LIMIT + 100);
        let prompt = build_prompt(&AssistTask::Refresh { old_cv: long }, &CvData::default());
        assert_eq!(prompt.matches('م').count(), REFRESH_INPUT_LIMIT);
    }

    #[test]
    fn test_interview_prompt_defaults_company() {
        let prompt = build_prompt(&AssistTask::InterviewPrep, &CvData::default());
        assert!(prompt.contains("Target company: not specified"));
    }

    #[test]
    fn test_schemas_declared_for_structured_panels_only() {
        for task in [
            AssistTask::Refresh { old_cv: String::new() },
            AssistTask::InterviewPrep,
            AssistTask::LinkedIn { profile: String::new() },
            AssistTask::CoverLetter,
            AssistTask::Summary,
            AssistTask::Presentation,
        ] {
            let schema = response_schema(&task).unwrap();
            assert_eq!(schema.schema["type"], "object", "{}", schema.name);
        }
        assert!(response_schema(&AssistTask::Chat { message: "hi".into() }).is_none());

        let refresh = response_schema(&AssistTask::Refresh { old_cv: String::new() }).unwrap();
        let props = &refresh.schema["properties"];
        assert!(props.get("jobTarget").is_some());
        assert!(props.get("cvRefresh").is_some());
    }

    #[test]
    fn test_chat_context_sends_record_then_message_with_attachments() {
        let mut job = job(AssistTask::Chat { message: "Add my new job".into() });
        job.attachments.push(Attachment::from_bytes("cv.png", "image/png", b"x"));
        let context = build_context(&job);

        let turns: Vec<_> = context.turns().collect();
        assert_eq!(turns.len(), 2);
        assert!(matches!(&turns[0].parts[0], Part::Text(t) if t.starts_with("Current CV data:")));
        assert_eq!(turns[1].parts.len(), 2);
    }

    #[test]
    fn test_cv_context_omits_settings_and_results() {
        let context = cv_context(&CvData::default());
        assert!(context.contains("personalInfo"));
        assert!(!context.contains("accentColor"));
        assert!(!context.contains("interviewPrep"));
    }

    #[tokio::test]
    async fn test_run_interview_decodes_and_maps_kinds() {
        let provider = ScriptedProvider::text(
            r#"{"questions":[
                {"type":"Behavioral","question":"Tell me about a conflict","answer":"S/T/A/R","isPremium":false},
                {"type":"technical","question":"What is IFRS 16?","answer":"Leases","isPremium":true},
                {"type":"fit","question":"  ","answer":"","isPremium":false}
            ],"tips":["Arrive early",""]}"#,
        );
        let reply = run(&provider, &options(), job(AssistTask::InterviewPrep)).await.unwrap();

        let AssistReply::InterviewGenerated { questions, tips } = reply else {
            panic!("unexpected reply");
        };
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].kind, QuestionKind::Behavioral);
        assert!(questions[1].is_premium);
        assert_eq!(tips, vec!["Arrive early".to_string()]);

        let request = provider.last_request().unwrap();
        assert_eq!(request.schema_name.as_deref(), Some("interview_prep"));
        assert_eq!(request.max_output_tokens, 4000);
    }

    #[tokio::test]
    async fn test_run_refresh_repairs_truncated_answer() {
        let provider = ScriptedProvider::new(Completion {
            text: Some(
                r#"```json
{"jobTarget":"Accountant","experience":[{"company":"KPMG","title":"Auditor","period":"2019"}],"cvRefresh":{"oldScore":40,"newScore":180,"missingKeywords":["IFRS"#
                    .into(),
            ),
            function_calls: vec![],
            truncated: true,
        });
        let reply = run(&provider, &options(), job(AssistTask::Refresh { old_cv: "old".into() }))
            .await
            .unwrap();

        let AssistReply::Refreshed { update, analysis } = &reply else {
            panic!("unexpected reply");
        };
        assert_eq!(update.job_target.as_deref(), Some("Accountant"));
        assert_eq!(analysis.old_score, 40.0);
        assert_eq!(analysis.new_score, 100.0);
        assert_eq!(analysis.missing_keywords, vec!["IFRS".to_string()]);

        let patch = reply.to_patch(&CvData::default());
        assert!(patch.cv_refresh.unwrap().is_processed);
        assert!(patch.experience.unwrap()[0].id.starts_with(ListKind::Experience.as_str()));
        assert!(patch.interview_prep.is_none());
    }

    #[tokio::test]
    async fn test_run_reports_malformed_output() {
        let provider = ScriptedProvider::text("I'm sorry, I cannot do that.");
        let err = run(&provider, &options(), job(AssistTask::LinkedIn { profile: "p".into() }))
            .await
            .unwrap_err();
        assert!(matches!(err, AssistError::Malformed(m) if m.raw.contains("sorry")));
    }

    #[tokio::test]
    async fn test_run_reports_empty_answer() {
        let provider = ScriptedProvider::new(Completion::default());
        let err = run(&provider, &options(), job(AssistTask::Summary)).await.unwrap_err();
        assert!(matches!(err, AssistError::EmptyResponse));

        let provider = ScriptedProvider::text(r#"{"aboutMe":"   "}"#);
        let err = run(&provider, &options(), job(AssistTask::Summary)).await.unwrap_err();
        assert!(matches!(err, AssistError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_run_chat_with_function_call() {
        let provider = ScriptedProvider::new(Completion {
            text: None,
            function_calls: vec![FunctionCall {
                name: "update_cv_data".into(),
                arguments: json!({"aboutMe": "Chemist with 5 years in QA"}),
            }],
            truncated: false,
        });
        let reply = run(&provider, &options(), job(AssistTask::Chat { message: "..".into() }))
            .await
            .unwrap();

        let AssistReply::Chat { text, update } = &reply else {
            panic!("unexpected reply");
        };
        assert!(text.is_none());
        assert_eq!(update.as_ref().unwrap().about_me.as_deref(), Some("Chemist with 5 years in QA"));
        assert_eq!(provider.last_request().unwrap().tool_names, vec!["update_cv_data".to_string()]);
    }

    #[tokio::test]
    async fn test_run_chat_applies_every_function_call_in_order() {
        let provider = ScriptedProvider::new(Completion {
            text: None,
            function_calls: vec![
                FunctionCall {
                    name: "update_cv_data".into(),
                    arguments: json!({"aboutMe": "Chemist", "jobTarget": "Analyst"}),
                },
                FunctionCall {
                    name: "update_cv_data".into(),
                    arguments: json!({"jobTarget": "QA Lead"}),
                },
            ],
            truncated: false,
        });
        let reply = run(&provider, &options(), job(AssistTask::Chat { message: "..".into() }))
            .await
            .unwrap();

        let patch = reply.to_patch(&CvData::default());
        assert_eq!(patch.about_me.as_deref(), Some("Chemist"));
        assert_eq!(patch.job_target.as_deref(), Some("QA Lead"));
    }

    #[tokio::test]
    async fn test_run_chat_plain_text() {
        let provider = ScriptedProvider::text("  Sure, tell me more. ");
        let reply = run(&provider, &options(), job(AssistTask::Chat { message: "hi".into() }))
            .await
            .unwrap();
        assert_eq!(
            reply,
            AssistReply::Chat {
                text: Some("Sure, tell me more.".into()),
                update: None
            }
        );
        assert!(reply.to_patch(&CvData::default()).is_empty());
    }

    #[tokio::test]
    async fn test_provider_error_is_passed_through() {
        let provider = ScriptedProvider::failing(ProviderError::Api {
            status: 429,
            message: "quota".into(),
        });
        let err = run(&provider, &options(), job(AssistTask::CoverLetter)).await.unwrap_err();
        assert!(matches!(err, AssistError::Provider(ProviderError::Api { status: 429, .. })));
    }

    #[test]
    fn test_linkedin_reply_keeps_unlock_gate() {
        let mut current = CvData::default();
        current.linkedin_analysis.is_unlocked = true;
        let reply = AssistReply::LinkedInAnalyzed(LinkedInAnalysis {
            score: 70.0,
            ..Default::default()
        });
        let patch = reply.to_patch(&current);
        let analysis = patch.linkedin_analysis.unwrap();
        assert!(analysis.is_unlocked);
        assert_eq!(analysis.score, 70.0);
    }

    #[test]
    fn test_interview_reply_keeps_company_and_gate() {
        let mut current = CvData::default();
        current.interview_prep.target_company = "Aramco".into();
        current.interview_prep.is_unlocked = true;
        let reply = AssistReply::InterviewGenerated {
            questions: vec![],
            tips: vec!["t".into()],
        };
        let prep = reply.to_patch(&current).interview_prep.unwrap();
        assert_eq!(prep.target_company, "Aramco");
        assert!(prep.is_unlocked);
        assert_eq!(prep.tips, vec!["t".to_string()]);
    }
}
