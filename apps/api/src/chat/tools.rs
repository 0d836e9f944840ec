//! Functions the assistant may call, and their executor.

use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::PgPool;
use tracing::error;

use crate::chat::agent::{ToolExecutor, ToolOutcome};
use crate::enquiries::store::{add_contact, NewContact};
use crate::hr::applications::{save_job_application, NewApplication};
use crate::hr::jobs::get_active_job_openings;
use crate::knowledge::CompanyKnowledge;
use crate::llm_client::ToolDefinition;
use crate::models::job::JobPosting;
use crate::resume::matcher::match_resume_to_jobs;
use crate::resume::payload::{ResumeAttachment, RAW_TEXT_FILENAME};
use crate::resume::report::{analysis_unavailable, format_match_report, HrContact};

const COMPANY_INFO_TOP_K: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    GetDateAndTime,
    GetJobOpenings,
    SaveJobApplication,
    SaveSalesInquiry,
    AnalyzeResumeForRoles,
    GetCompanyInfo,
}

impl Tool {
    pub const ALL: [Tool; 6] = [
        Tool::GetDateAndTime,
        Tool::GetJobOpenings,
        Tool::SaveJobApplication,
        Tool::SaveSalesInquiry,
        Tool::AnalyzeResumeForRoles,
        Tool::GetCompanyInfo,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Tool::GetDateAndTime => "get_date_and_time",
            Tool::GetJobOpenings => "get_job_openings",
            Tool::SaveJobApplication => "save_job_application",
            Tool::SaveSalesInquiry => "save_sales_inquiry",
            Tool::AnalyzeResumeForRoles => "analyze_resume_for_roles",
            Tool::GetCompanyInfo => "get_company_info",
        }
    }

    pub fn from_name(name: &str) -> Option<Tool> {
        Tool::ALL.into_iter().find(|t| t.name() == name)
    }

    fn description(&self) -> &'static str {
        match self {
            Tool::GetDateAndTime => "Returns the current date and time in ISO 8601 format.",
            Tool::GetJobOpenings => {
                "Lists all active job openings with title, department, location, type, description and requirements."
            }
            Tool::SaveJobApplication => {
                "Saves a job application. Only call when the candidate's name, email, phone, position and resume are known from the conversation."
            }
            Tool::SaveSalesInquiry => {
                "Saves a sales or service enquiry for follow-up by the sales team."
            }
            Tool::AnalyzeResumeForRoles => {
                "Matches resume text against the active job openings and reports the best-fitting roles with scores."
            }
            Tool::GetCompanyInfo => {
                "Looks up information about the company (services, history, contacts) relevant to a question."
            }
        }
    }

    fn input_schema(&self) -> Value {
        match self {
            Tool::GetDateAndTime | Tool::GetJobOpenings => json!({
                "type": "object",
                "properties": {}
            }),
            Tool::SaveJobApplication => json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string", "description": "Candidate's full name"},
                    "email": {"type": "string", "description": "Candidate's email address"},
                    "phone": {"type": "string", "description": "Candidate's phone number"},
                    "position": {"type": "string", "description": "Position applied for"},
                    "resume_filename": {"type": "string", "description": "Original filename of the resume"},
                    "resume_content": {"type": "string", "description": "Resume text or a short summary of it. Leave empty to use the uploaded resume."},
                    "file_path": {"type": "string", "description": "Storage path of the uploaded resume, if known"}
                },
                "required": ["name", "email", "phone", "position"]
            }),
            Tool::SaveSalesInquiry => json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string", "description": "Full name of the inquirer"},
                    "email": {"type": "string", "description": "Email address of the inquirer"},
                    "phone_number": {"type": "string", "description": "Phone number of the inquirer"},
                    "subject": {"type": "string", "description": "Subject, e.g. 'Sales Inquiry' or 'Service Request'"},
                    "message": {"type": "string", "description": "Body of the enquiry"}
                },
                "required": ["name", "email", "phone_number"]
            }),
            Tool::AnalyzeResumeForRoles => json!({
                "type": "object",
                "properties": {
                    "resume_text": {"type": "string", "description": "Resume text. Leave empty to use the uploaded resume."}
                }
            }),
            Tool::GetCompanyInfo => json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "What the user wants to know"}
                },
                "required": ["query"]
            }),
        }
    }

    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: self.description(),
            input_schema: self.input_schema(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SaveApplicationArgs {
    name: String,
    email: String,
    phone: String,
    position: String,
    #[serde(default)]
    resume_filename: Option<String>,
    #[serde(default)]
    resume_content: Option<String>,
    #[serde(default)]
    file_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnalyzeArgs {
    #[serde(default)]
    resume_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompanyInfoArgs {
    query: String,
}

/// Executes tools for one chat turn. Holds the resume attached to that turn, if any.
pub struct FrontdeskTools {
    db: PgPool,
    knowledge: Arc<dyn CompanyKnowledge>,
    hr_email: String,
    hr_phone: String,
    resume: Option<ResumeAttachment>,
}

impl FrontdeskTools {
    pub fn new(
        db: PgPool,
        knowledge: Arc<dyn CompanyKnowledge>,
        hr: HrContact<'_>,
        resume: Option<ResumeAttachment>,
    ) -> Self {
        Self {
            db,
            knowledge,
            hr_email: hr.email.to_string(),
            hr_phone: hr.phone.to_string(),
            resume,
        }
    }

    fn hr(&self) -> HrContact<'_> {
        HrContact {
            email: &self.hr_email,
            phone: &self.hr_phone,
        }
    }

    async fn job_openings(&self) -> ToolOutcome {
        match get_active_job_openings(&self.db).await {
            Ok(jobs) => ToolOutcome::ok(format_job_openings(&jobs)),
            Err(e) => {
                error!("Failed to load job openings: {e:?}");
                ToolOutcome::error("Job openings are unavailable right now.")
            }
        }
    }

    async fn save_application(&self, args: SaveApplicationArgs) -> ToolOutcome {
        let blank: Vec<&str> = [
            ("name", &args.name),
            ("email", &args.email),
            ("phone", &args.phone),
            ("position", &args.position),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| k)
        .collect();
        if !blank.is_empty() {
            return ToolOutcome::error(format!("Missing required fields: {}", blank.join(", ")));
        }

        let supplied_text = args
            .resume_content
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .map(decode_resume_content);
        let resume_text = supplied_text.or_else(|| self.resume.as_ref().map(|r| r.text.clone()));
        let Some(resume_text) = resume_text else {
            return ToolOutcome::error("No resume is available. Ask the candidate to upload one.");
        };

        let resume_filename = args
            .resume_filename
            .filter(|f| !f.trim().is_empty())
            .or_else(|| self.resume.as_ref().map(|r| r.filename.clone()))
            .unwrap_or_else(|| RAW_TEXT_FILENAME.to_string());
        let file_path = args
            .file_path
            .filter(|p| !p.trim().is_empty())
            .or_else(|| self.resume.as_ref().and_then(|r| r.file_path.clone()));

        let saved = save_job_application(
            &self.db,
            NewApplication {
                name: args.name.trim(),
                email: args.email.trim(),
                phone: args.phone.trim(),
                position: args.position.trim(),
                resume_filename: &resume_filename,
                resume_text: Some(resume_text.as_str()),
                file_path: file_path.as_deref(),
            },
        )
        .await;

        match saved {
            Ok(id) => ToolOutcome::ok(
                json!({
                    "success": true,
                    "application_id": id,
                    "message": format!(
                        "Application submitted for {}! We will contact you at {}.",
                        args.position.trim(),
                        args.email.trim()
                    ),
                })
                .to_string(),
            ),
            Err(e) => {
                error!("Failed to save application: {e:?}");
                ToolOutcome::error(format!(
                    "Error saving application. The candidate can contact HR at {}.",
                    self.hr_email
                ))
            }
        }
    }

    async fn save_inquiry(&self, contact: NewContact) -> ToolOutcome {
        let missing = contact.missing_fields();
        if !missing.is_empty() {
            return ToolOutcome::error(format!("Missing required fields: {}", missing.join(", ")));
        }
        match add_contact(&self.db, &contact).await {
            Ok(row) => ToolOutcome::ok(
                json!({
                    "success": true,
                    "contact_id": row.id,
                    "message": "Inquiry added successfully.",
                })
                .to_string(),
            ),
            Err(e) => {
                error!("Failed to save sales inquiry: {e:?}");
                ToolOutcome::error("Error saving the inquiry.")
            }
        }
    }

    async fn analyze_resume(&self, args: AnalyzeArgs) -> ToolOutcome {
        let (filename, text) = match args.resume_text.filter(|t| !t.trim().is_empty()) {
            Some(text) => (RAW_TEXT_FILENAME.to_string(), text),
            None => match &self.resume {
                Some(resume) => (resume.filename.clone(), resume.text.clone()),
                None => {
                    return ToolOutcome::error(
                        "No resume text was provided and no resume is uploaded in this session.",
                    )
                }
            },
        };

        let jobs = match get_active_job_openings(&self.db).await {
            Ok(jobs) => jobs,
            Err(e) => {
                error!("Failed to load job openings for analysis: {e:?}");
                return ToolOutcome::error(analysis_unavailable(self.hr()));
            }
        };

        match match_resume_to_jobs(&text, &jobs) {
            Ok(outcome) => ToolOutcome::ok(format_match_report(&filename, &outcome, &jobs, self.hr())),
            Err(e) => {
                error!("Resume analysis failed: {e}");
                ToolOutcome::error(analysis_unavailable(self.hr()))
            }
        }
    }

    async fn company_info(&self, args: CompanyInfoArgs) -> ToolOutcome {
        match self.knowledge.search(&args.query, COMPANY_INFO_TOP_K).await {
            Ok(passages) if passages.is_empty() => {
                ToolOutcome::ok("No company information found for that query.")
            }
            Ok(passages) => ToolOutcome::ok(passages.join("\n\n")),
            Err(e) => {
                error!("Company knowledge search failed: {e:?}");
                ToolOutcome::error("Company information is unavailable right now.")
            }
        }
    }
}

#[async_trait]
impl ToolExecutor for FrontdeskTools {
    fn definitions(&self) -> Vec<ToolDefinition> {
        Tool::ALL.iter().map(Tool::definition).collect()
    }

    async fn execute(&self, name: &str, input: &Value) -> ToolOutcome {
        let Some(tool) = Tool::from_name(name) else {
            return ToolOutcome::error(format!("Unknown tool: {name}"));
        };

        match tool {
            Tool::GetDateAndTime => ToolOutcome::ok(Utc::now().to_rfc3339()),
            Tool::GetJobOpenings => self.job_openings().await,
            Tool::SaveJobApplication => match parse_args(tool, input) {
                Ok(args) => self.save_application(args).await,
                Err(outcome) => outcome,
            },
            Tool::SaveSalesInquiry => match parse_args(tool, input) {
                Ok(args) => self.save_inquiry(args).await,
                Err(outcome) => outcome,
            },
            Tool::AnalyzeResumeForRoles => match parse_args(tool, input) {
                Ok(args) => self.analyze_resume(args).await,
                Err(outcome) => outcome,
            },
            Tool::GetCompanyInfo => match parse_args(tool, input) {
                Ok(args) => self.company_info(args).await,
                Err(outcome) => outcome,
            },
        }
    }
}

fn parse_args<T: serde::de::DeserializeOwned>(tool: Tool, input: &Value) -> Result<T, ToolOutcome> {
    serde_json::from_value(input.clone())
        .map_err(|e| ToolOutcome::error(format!("Invalid arguments for {}: {e}", tool.name())))
}

/// Resume content may arrive base64-encoded. Decoded bytes are used only when
/// they are valid UTF-8; otherwise the content is taken as plain text.
pub fn decode_resume_content(content: &str) -> String {
    let trimmed = content.trim();
    STANDARD
        .decode(trimmed)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_else(|| trimmed.to_string())
}

pub fn format_job_openings(jobs: &[JobPosting]) -> String {
    if jobs.is_empty() {
        return "No job openings are currently available.".to_string();
    }

    let mut out = String::from("Current Job Openings:\n\n");
    for job in jobs {
        out.push_str(&format!("Position: {}\n", job.title));
        out.push_str(&format!("Department: {}\n", job.department));
        out.push_str(&format!("Location: {}\n", job.location));
        out.push_str(&format!("Type: {}\n", job.employment_type));
        out.push_str(&format!("Description: {}\n", job.description));
        out.push_str(&format!("Requirements: {}\n", job.requirements));
        out.push_str(&format!("Posted: {}\n", job.posted_date.format("%Y-%m-%d")));
        out.push_str(&"-".repeat(50));
        out.push_str("\n\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::lazy_test_pool;
    use crate::knowledge::StaticKnowledgeBase;

    const HR: HrContact<'static> = HrContact {
        email: "hr@example.com",
        phone: "+91 00000-00000",
    };

    fn tools(resume: Option<ResumeAttachment>) -> FrontdeskTools {
        FrontdeskTools::new(
            lazy_test_pool(),
            Arc::new(StaticKnowledgeBase::new(
                "Syscraft builds chatbots.\n\nSyscraft is based in Indore.",
            )),
            HR,
            resume,
        )
    }

    #[test]
    fn test_tool_names_round_trip_and_are_unique() {
        for tool in Tool::ALL {
            assert_eq!(Tool::from_name(tool.name()), Some(tool));
        }
        let mut names: Vec<&str> = Tool::ALL.iter().map(Tool::name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), Tool::ALL.len());
        assert_eq!(Tool::from_name("delete_everything"), None);
    }

    #[test]
    fn test_schemas_are_json_objects() {
        for tool in Tool::ALL {
            assert_eq!(tool.definition().input_schema["type"], "object", "{}", tool.name());
        }
    }

    #[test]
    fn test_decode_resume_content_accepts_base64_text() {
        let encoded = STANDARD.encode("Python developer with 5 years of experience");
        assert_eq!(
            decode_resume_content(&encoded),
            "Python developer with 5 years of experience"
        );
    }

    #[test]
    fn test_decode_resume_content_keeps_plain_text() {
        assert_eq!(
            decode_resume_content(" Experienced software developer. "),
            "Experienced software developer."
        );
        let binary = STANDARD.encode([0xff, 0xfe, 0xfd]);
        assert_eq!(decode_resume_content(&binary), binary);
    }

    #[test]
    fn test_format_job_openings_lists_each_job() {
        let jobs = vec![
            JobPosting::fixture("DevOps Engineer", "Operations", "AWS"),
            JobPosting::fixture("UI/UX Designer", "Design", "Figma"),
        ];
        let text = format_job_openings(&jobs);
        assert!(text.contains("Position: DevOps Engineer"));
        assert!(text.contains("Department: Design"));
        assert!(text.contains("Location: Indore"));
        assert_eq!(format_job_openings(&[]), "No job openings are currently available.");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_an_error_result() {
        let outcome = tools(None).execute("rm_rf", &json!({})).await;
        assert!(outcome.is_error);
        assert!(outcome.content.contains("Unknown tool"));
    }

    #[tokio::test]
    async fn test_date_tool_returns_iso_timestamp() {
        let outcome = tools(None).execute("get_date_and_time", &json!({"query": "now"})).await;
        assert!(!outcome.is_error);
        assert!(chrono::DateTime::parse_from_rfc3339(&outcome.content).is_ok());
    }

    #[tokio::test]
    async fn test_bad_arguments_are_reported() {
        let outcome = tools(None).execute("get_company_info", &json!({"q": 1})).await;
        assert!(outcome.is_error);
        assert!(outcome.content.starts_with("Invalid arguments for get_company_info"));
    }

    #[tokio::test]
    async fn test_company_info_uses_knowledge_base() {
        let outcome = tools(None)
            .execute("get_company_info", &json!({"query": "Where is Syscraft based?"}))
            .await;
        assert!(!outcome.is_error);
        assert!(outcome.content.contains("Indore"));
    }

    #[tokio::test]
    async fn test_sales_inquiry_requires_contact_details() {
        let outcome = tools(None)
            .execute("save_sales_inquiry", &json!({"name": "Asha", "email": ""}))
            .await;
        assert!(outcome.is_error);
        assert_eq!(outcome.content, "Missing required fields: email, phone_number");
    }

    #[tokio::test]
    async fn test_application_without_any_resume_is_refused() {
        let outcome = tools(None)
            .execute(
                "save_job_application",
                &json!({"name": "A", "email": "a@b.co", "phone": "9999999999", "position": "DevOps Engineer"}),
            )
            .await;
        assert!(outcome.is_error);
        assert!(outcome.content.contains("No resume"));
    }

    #[tokio::test]
    async fn test_application_store_failure_names_hr() {
        let resume = ResumeAttachment {
            filename: "cv.txt".to_string(),
            text: "Docker and AWS".to_string(),
            file_path: None,
        };
        let outcome = tools(Some(resume))
            .execute(
                "save_job_application",
                &json!({"name": "A", "email": "a@b.co", "phone": "9999999999", "position": "DevOps Engineer"}),
            )
            .await;
        assert!(outcome.is_error);
        assert!(outcome.content.contains("hr@example.com"));
    }

    #[tokio::test]
    async fn test_analysis_without_resume_is_refused() {
        let outcome = tools(None).execute("analyze_resume_for_roles", &json!({})).await;
        assert!(outcome.is_error);
        assert!(outcome.content.contains("no resume"));
    }
}
