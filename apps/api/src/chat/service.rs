//! Chat orchestration: deterministic fast paths for resume-bearing messages,
//! the LLM agent for everything else, and per-session history bookkeeping.

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::chat::agent::{normalize_answer, run_agent};
use crate::chat::extractor::{extract_application_fields, ApplicationDecision, CompleteApplication};
use crate::chat::memory::{trim_history, MAX_HISTORY_MESSAGES};
use crate::chat::prompts::{resume_context_message, system_prompt, INFO_EMAIL, SALES_EMAIL, SALES_PHONE};
use crate::chat::tools::FrontdeskTools;
use crate::errors::AppError;
use crate::hr::applications::{save_job_application, NewApplication};
use crate::hr::jobs::get_active_job_openings;
use crate::llm_client::Message;
use crate::models::job::JobPosting;
use crate::resume::matcher::match_resume_to_jobs;
use crate::resume::payload::{ResumeAttachment, ResumePayload};
use crate::resume::report::{analysis_unavailable, format_match_report, HrContact};
use crate::state::AppState;

pub const DEFAULT_SESSION_ID: &str = "default_session";

const ANALYSIS_KEYWORDS: &[&str] = &[
    "analyze", "analysis", "match", "role", "position", "job", "career", "suitable", "fit",
    "which", "best", "recommend", "check",
];

/// How a message is answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Submit(CompleteApplication),
    AskForMissing {
        position: Option<String>,
        missing: Vec<&'static str>,
    },
    Analyze,
    Agent,
}

/// Fast paths apply only when a resume is attached. The field extractor
/// decides first; analysis keywords come second; the agent handles the rest.
pub fn route_message(message: &str, has_resume: bool) -> Route {
    if !has_resume {
        return Route::Agent;
    }

    let draft = match extract_application_fields(message) {
        Ok(draft) => draft,
        Err(e) => {
            error!("Field extraction unavailable: {e}");
            return Route::Agent;
        }
    };

    match draft.decide(has_resume) {
        ApplicationDecision::Submit(app) => Route::Submit(app),
        ApplicationDecision::AskForMissing { position, missing } => {
            Route::AskForMissing { position, missing }
        }
        ApplicationDecision::NotApplying if wants_analysis(&message.to_lowercase()) => Route::Analyze,
        ApplicationDecision::NotApplying => Route::Agent,
    }
}

fn wants_analysis(lowered: &str) -> bool {
    ANALYSIS_KEYWORDS.iter().any(|k| lowered.contains(k))
}

/// Answers one chat message and records the exchange in the session history.
pub async fn chat(
    state: &AppState,
    session_id: &str,
    message: &str,
    resume: Option<ResumePayload>,
) -> Result<String, AppError> {
    let attachment = match resume {
        Some(payload) => {
            let normalized = tokio::task::spawn_blocking(move || payload.normalize())
                .await
                .map_err(|e| AppError::Internal(anyhow::anyhow!("Resume normalization task failed: {e}")))?;
            match normalized {
                Ok(attachment) => attachment,
                Err(e) => {
                    warn!("Could not read attached resume: {e}");
                    return Ok(e.to_string());
                }
            }
        }
        None => None,
    };

    // When the store is unreachable the turn is answered without history and
    // nothing is saved, so the stored session is not overwritten.
    let (mut history, persist) = match state.conversations.load(session_id).await {
        Ok(history) => (history, true),
        Err(e) => {
            warn!("History unavailable for session {session_id}: {e:?}");
            (Vec::new(), false)
        }
    };

    let route = route_message(message, attachment.is_some());
    let fast = match attachment.as_ref() {
        Some(resume) => fast_path_reply(state, route, resume).await,
        None => None,
    };
    let answer = match fast {
        Some(reply) => {
            history.push(Message::user_text(message));
            history.push(Message::assistant_text(reply.clone()));
            reply
        }
        None => agent_reply(state, &mut history, message, attachment).await,
    };

    if persist {
        trim_history(&mut history, MAX_HISTORY_MESSAGES);
        if let Err(e) = state.conversations.save(session_id, &history).await {
            warn!("Failed to persist history for session {session_id}: {e:?}");
        }
    }

    Ok(normalize_answer(&answer))
}

async fn agent_reply(
    state: &AppState,
    history: &mut Vec<Message>,
    message: &str,
    attachment: Option<ResumeAttachment>,
) -> String {
    let input = match &attachment {
        Some(resume) => resume_context_message(message, &resume.filename),
        None => message.to_string(),
    };
    let tools = FrontdeskTools::new(
        state.db.clone(),
        state.knowledge.clone(),
        state.hr_contact(),
        attachment,
    );
    let system = system_prompt(state.hr_contact());

    let checkpoint = history.len();
    match run_agent(state.model.as_ref(), &tools, &system, history, input).await {
        Ok(answer) => answer,
        Err(e) => {
            error!("Chat processing error: {e}");
            // Drop the unanswered turn so the stored history stays well-formed.
            history.truncate(checkpoint);
            fallback_reply(message)
        }
    }
}

/// `None` when the message belongs to the agent.
async fn fast_path_reply(state: &AppState, route: Route, resume: &ResumeAttachment) -> Option<String> {
    let reply = match route {
        Route::Submit(app) => submit_application(state, &app, resume).await,
        Route::AskForMissing {
            position: Some(position),
            missing,
        } => ask_for_missing_message(&position, &missing, &resume.filename),
        Route::AskForMissing { position: None, .. } => match get_active_job_openings(&state.db).await {
            Ok(jobs) => openings_prompt(&jobs),
            Err(e) => {
                error!("Failed to load job openings: {e:?}");
                "Let me help you apply! Which position are you interested in?".to_string()
            }
        },
        Route::Analyze => analyze(state, resume, state.hr_contact()).await,
        Route::Agent => return None,
    };
    Some(reply)
}

async fn submit_application(
    state: &AppState,
    app: &CompleteApplication,
    resume: &ResumeAttachment,
) -> String {
    info!("Submitting application for {} - {}", app.name, app.position);
    let saved = save_job_application(
        &state.db,
        NewApplication {
            name: &app.name,
            email: &app.email,
            phone: &app.phone,
            position: &app.position,
            resume_filename: &resume.filename,
            resume_text: Some(resume.text.as_str()),
            file_path: resume.file_path.as_deref(),
        },
    )
    .await;

    match saved {
        Ok(id) => submission_confirmation(id, app, state.hr_contact()),
        Err(e) => {
            error!("Application submission error: {e:?}");
            submission_failed(state.hr_contact())
        }
    }
}

async fn analyze(state: &AppState, resume: &ResumeAttachment, hr: HrContact<'_>) -> String {
    let jobs = match get_active_job_openings(&state.db).await {
        Ok(jobs) => jobs,
        Err(e) => {
            error!("Resume analysis could not load openings: {e:?}");
            return analysis_unavailable(hr);
        }
    };
    match match_resume_to_jobs(&resume.text, &jobs) {
        Ok(outcome) => format_match_report(&resume.filename, &outcome, &jobs, hr),
        Err(e) => {
            error!("Resume analysis error: {e}");
            analysis_unavailable(hr)
        }
    }
}

pub fn submission_confirmation(id: Uuid, app: &CompleteApplication, hr: HrContact<'_>) -> String {
    format!(
        "**Application Submitted Successfully!**\n\n\
         **Application ID:** {id}\n\
         **Applicant:** {name}\n\
         **Position:** {position}\n\
         **Email:** {email}\n\
         **Phone:** {phone}\n\n\
         Your resume has been processed and stored in our system.\n\n\
         **Next Steps:**\n\
         • Our HR team will review your application within 2-3 business days\n\
         • You'll receive an email confirmation shortly\n\
         • If shortlisted, we'll contact you for next steps\n\n\
         **Contact Information:**\n\
         {hr_email} | {hr_phone}\n\n\
         Thank you for your interest in joining Syscraft!",
        name = app.name,
        position = app.position,
        email = app.email,
        phone = app.phone,
        hr_email = hr.email,
        hr_phone = hr.phone,
    )
}

pub fn submission_failed(hr: HrContact<'_>) -> String {
    format!(
        "Error submitting application. Please contact HR directly at {}",
        hr.email
    )
}

pub fn ask_for_missing_message(position: &str, missing: &[&str], filename: &str) -> String {
    let mut out = format!(
        "**Ready to Apply for {position}!**\n\n\
         To complete your application, I need a few details:\n\n\
         **Required Information:**\n"
    );
    for field in missing {
        out.push_str(&format!("• {field}\n"));
    }
    out.push_str(&format!("• Confirm Position: {position}\n\n"));
    out.push_str(
        "Please provide these details in your next message, or simply say:\n\
         \"My name is [Your Name], email: [your.email@domain.com], phone: [your number]\"\n\n",
    );
    out.push_str(&format!(
        "I already have your resume ({filename}) ready for submission!"
    ));
    out
}

pub fn openings_prompt(jobs: &[JobPosting]) -> String {
    if jobs.is_empty() {
        return "Currently no job openings are available. Please check back later or contact HR."
            .to_string();
    }
    let list = jobs
        .iter()
        .map(|job| format!("• {} ({})", job.title, job.department))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "**Available Positions:**\n\n{list}\n\n\
         Which position would you like to apply for? Just mention the role name, and I'll help you submit your application!"
    )
}

/// Canned replies used when the model is unreachable. Keywords match whole words.
pub fn fallback_reply(message: &str) -> String {
    let lowered = message.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let has_any = |keywords: &[&str]| words.iter().any(|w| keywords.contains(w));

    if has_any(&["hello", "hi", "hey"]) {
        "Hello! I'm the Syscraft AI assistant. I can help you with our services, career opportunities, or analyze your resume for job matching. How can I assist you today?".to_string()
    } else if has_any(&["job", "jobs", "career", "careers", "hiring", "work"]) {
        "**Career Opportunities at Syscraft**\n\n\
         We're always looking for talented individuals! Our current focus areas include:\n\
         • Full Stack Development\n\
         • AI/ML Engineering\n\
         • UI/UX Design\n\
         • DevOps Engineering\n\
         • Internship Programs\n\n\
         Would you like me to show current openings or analyze your resume for the best fit?"
            .to_string()
    } else if has_any(&["service", "services", "product", "products", "solution", "solutions", "business"]) {
        format!(
            "**Syscraft Services**\n\n\
             We specialize in:\n\
             • **Web & Mobile Development** - Custom applications\n\
             • **AI/ML Solutions** - Intelligent automation & chatbots\n\
             • **UI/UX Design** - User-centered design\n\
             • **IoT Solutions** - Connected device ecosystems\n\
             • **DevOps & Cloud** - Infrastructure & deployment\n\n\
             Contact us: {SALES_EMAIL} | {SALES_PHONE}\n\n\
             What specific solution can we help you with?"
        )
    } else {
        format!(
            "I apologize for the technical difficulty. Please try rephrasing your question, or contact us directly at {INFO_EMAIL} for immediate assistance."
        )
    }
}
