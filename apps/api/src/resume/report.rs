//! Markdown rendering of a resume match outcome for the chat assistant.

use crate::models::job::JobPosting;
use crate::resume::matcher::{MatchOutcome, MatchReport};

/// Where candidates are pointed when they need a human.
#[derive(Debug, Clone, Copy)]
pub struct HrContact<'a> {
    pub email: &'a str,
    pub phone: &'a str,
}

/// Renders the analysis reply. `jobs` backs the fallback listing when nothing matched.
pub fn format_match_report(
    filename: &str,
    outcome: &MatchOutcome,
    jobs: &[JobPosting],
    hr: HrContact<'_>,
) -> String {
    match outcome {
        MatchOutcome::EmptyResume => {
            "Resume appears to be empty. Please upload a valid PDF, DOCX or TXT resume.".to_string()
        }
        MatchOutcome::NoOpenings => "Currently no job openings are available.".to_string(),
        MatchOutcome::Report(report) => format_report(filename, report, jobs, hr),
    }
}

/// Fixed reply used when analysis fails internally.
pub fn analysis_unavailable(hr: HrContact<'_>) -> String {
    format!("Analysis temporarily unavailable. Contact HR: {}", hr.email)
}

fn format_report(
    filename: &str,
    report: &MatchReport,
    jobs: &[JobPosting],
    hr: HrContact<'_>,
) -> String {
    let mut out = format!("**Resume Analysis for {filename}**\n\n");

    if report.detected_skills.is_empty() {
        out.push_str("**Detected Skills:** none of our tracked skills were found.\n\n");
    } else {
        out.push_str("**Detected Skills:**\n");
        for (category, hits) in &report.detected_skills {
            out.push_str(&format!(
                "   • **{}:** {}\n",
                category.label(),
                hits.skills.join(", ")
            ));
        }
        out.push('\n');
    }

    if let Some(years) = report.experience_years.filter(|y| *y > 0) {
        out.push_str(&format!("**Experience:** {years} years\n\n"));
    }

    out.push_str("**Best Job Matches:**\n\n");

    if report.matches.is_empty() {
        out.push_str("No direct matches found. **Available Positions:**\n");
        for job in jobs.iter().take(3) {
            out.push_str(&format!("• **{}** - {}\n", job.title, job.department));
        }
        out.push('\n');
    } else {
        for (i, m) in report.matches.iter().enumerate() {
            out.push_str(&format!("{}. **{}**\n", i + 1, m.level().label()));
            out.push_str(&format!("   **Position:** {}\n", m.job.title));
            out.push_str(&format!("   **Department:** {}\n", m.job.department));
            out.push_str(&format!("   **Match Score:** {}%\n", m.score));
            if !m.reasons.is_empty() {
                let top: Vec<&str> = m.reasons.iter().take(2).map(String::as_str).collect();
                out.push_str(&format!("   **Why you're a fit:** {}\n", top.join("; ")));
            }
            out.push('\n');
        }
        if report.total_matches > report.matches.len() {
            out.push_str(&format!(
                "_{} of {} openings matched your profile._\n\n",
                report.total_matches, report.total_jobs_considered
            ));
        }
    }

    out.push_str("**Next Steps:**\n");
    out.push_str("• Say 'apply for [position]' to submit an application\n");
    out.push_str(&format!("• Contact HR: {} | {}\n\n", hr.email, hr.phone));
    out.push_str("Which position interests you? I can help with the application!");
    out
}
