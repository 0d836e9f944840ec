use crate::resume::report::HrContact;

pub const COMPANY_NAME: &str = "Syscraft";
pub const INFO_EMAIL: &str = "info@syscraftonline.com";
pub const SALES_EMAIL: &str = "sales@syscraftonline.com";
pub const SALES_PHONE: &str = "+91-70065-38876";

/// Built-in company description, used when no knowledge search service is configured.
pub const COMPANY_PROFILE: &str = "\
Syscraft Information System Pvt. Ltd. is an IT services company headquartered in Indore, India. \
The official website is https://syscraftonline.com/.

Services: Syscraft delivers web and mobile application development, AI and machine learning \
solutions including intelligent automation and chatbots, UI/UX design, IoT solutions for \
connected device ecosystems, and DevOps and cloud infrastructure and deployment.

Sales and partnerships: project consultation, technical solution guidance, service pricing \
discussions and business partnerships are handled by the sales team at sales@syscraftonline.com \
or +91-70065-38876.

Careers: Syscraft hires for full stack development, AI/ML engineering, UI/UX design, DevOps \
engineering and internship programs. Candidates can upload a resume for role matching and apply \
through the assistant. The HR team reviews applications within 2-3 business days.

Contact: general questions go to info@syscraftonline.com.";

/// System prompt for the assistant.
pub fn system_prompt(hr: HrContact<'_>) -> String {
    format!(
        r#"You are {COMPANY_NAME} AI, a recruitment, HR and business assistant for Syscraft Information System Pvt. Ltd.

Core responsibilities:
1. HR & recruitment: resume screening and analysis, job role matching, application processing and next steps.
2. Sales & business enquiries: IT services and solution guidance. Clarify budget, scope, timeline and goals when vague. Encourage sharing name, email and phone, then save the lead with `save_sales_inquiry`.
3. Company information: answer questions about {COMPANY_NAME} using `get_company_info`. Do not invent facts.

Tool rules:
- Use `get_job_openings` before naming open positions.
- Use `analyze_resume_for_roles` when a resume is available and the user asks which roles fit. Leave `resume_text` empty to analyze the resume uploaded in this session.
- Call `save_job_application` only when name, email, phone, position and resume are all known from the conversation. Never make up applicant details. Ask for anything missing.
- After a tool call, confirm the outcome and offer further help.

HR contact: {email} | {phone}
Sales contact: {SALES_EMAIL} | {SALES_PHONE}

Reply in concise, friendly markdown. When you return JSON, use the shape {{"answer": "..."}}."#,
        email = hr.email,
        phone = hr.phone,
    )
}

/// Agent input for a turn where a resume is attached.
pub fn resume_context_message(message: &str, filename: &str) -> String {
    format!(
        "USER MESSAGE: {message}\n\n\
         CONTEXT: User has uploaded resume '{filename}' and is asking: \"{message}\"\n\n\
         INSTRUCTIONS: Respond naturally and helpfully. If they need resume analysis, job \
         information, or want to apply, use the appropriate tools."
    )
}
