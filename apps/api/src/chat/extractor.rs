//! Heuristic extraction of job-application fields from a single chat message.

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::patterns::{self, PatternError, PatternSet};
use crate::resume::skills::title_case;

const NAME_SOURCE: &str = r"(?:name is |my name is |i am |i'm )([a-z\s]+)";
const EMAIL_SOURCE: &str = r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}";
const PHONE_SOURCE: &str = r"\+?[0-9\s\-()]{10,15}";

/// Evaluated in order; the first rule that matches names the position.
/// Short markers only count as whole words ("email" is not "ai").
const POSITION_SOURCES: &[&str] = &[
    r"\bai\b|\bml\b|machine learning",
    r"full stack|developer",
    r"\bui\b|\bux\b|designer",
    r"devops",
    r"intern",
];
const POSITION_TITLES: &[&str] = &[
    "AI/ML Engineer",
    "Senior Full Stack Developer",
    "UI/UX Designer",
    "DevOps Engineer",
    "Internship Program",
];

const APPLY_KEYWORDS: &[&str] = &["apply", "application", "submit", "job application", "interested"];

const MIN_PHONE_DIGITS: usize = 10;
const MAX_FALLBACK_NAME_TOKENS: usize = 3;

static CONTACT_PATTERNS: Lazy<PatternSet> =
    Lazy::new(|| patterns::compile_all(&[NAME_SOURCE, EMAIL_SOURCE, PHONE_SOURCE]));
static POSITION_PATTERNS: Lazy<PatternSet> = Lazy::new(|| patterns::compile_all(POSITION_SOURCES));

/// Fields found in one message. Absent fields are `None`, never empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplicationDraft {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub apply_intent: bool,
}

/// A draft with every field present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompleteApplication {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub position: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplicationDecision {
    Submit(CompleteApplication),
    AskForMissing {
        position: Option<String>,
        missing: Vec<&'static str>,
    },
    NotApplying,
}

impl ApplicationDraft {
    /// Labels of the fields still needed, in the order they are asked for.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.is_none() {
            missing.push("Full Name");
        }
        if self.email.is_none() {
            missing.push("Email Address");
        }
        if self.phone.is_none() {
            missing.push("Phone Number");
        }
        if self.position.is_none() {
            missing.push("Position");
        }
        missing
    }

    /// Submit only with every field, apply intent and an attached resume.
    pub fn decide(self, has_resume: bool) -> ApplicationDecision {
        if !self.apply_intent {
            return ApplicationDecision::NotApplying;
        }

        let mut missing = self.missing_fields();
        if let (Some(name), Some(email), Some(phone), Some(position), true) = (
            self.name.as_ref(),
            self.email.as_ref(),
            self.phone.as_ref(),
            self.position.as_ref(),
            has_resume,
        ) {
            return ApplicationDecision::Submit(CompleteApplication {
                name: name.clone(),
                email: email.clone(),
                phone: phone.clone(),
                position: position.clone(),
            });
        }

        if !has_resume {
            missing.push("Resume");
        }
        ApplicationDecision::AskForMissing {
            position: self.position,
            missing,
        }
    }
}

/// Pulls name, email, phone, position and apply intent out of `message`.
pub fn extract_application_fields(message: &str) -> Result<ApplicationDraft, PatternError> {
    let contact = patterns::get(&CONTACT_PATTERNS)?;
    let (name_re, email_re, phone_re) = (&contact[0], &contact[1], &contact[2]);
    let lowered = message.to_lowercase();

    let name = name_re
        .captures(&lowered)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|n| !n.is_empty())
        .map(|n| title_case(&n))
        .or_else(|| name_before_email(message));

    let email = email_re.find(message).map(|m| m.as_str().to_string());

    let phone = phone_re
        .find_iter(message)
        .map(|m| m.as_str().trim())
        .find(|candidate| candidate.chars().filter(char::is_ascii_digit).count() >= MIN_PHONE_DIGITS)
        .map(str::to_string);

    Ok(ApplicationDraft {
        name,
        email,
        phone,
        position: infer_position(&lowered)?,
        apply_intent: has_apply_intent(&lowered),
    })
}

/// Maps a lower-cased message to a canonical position title.
pub fn infer_position(lowered: &str) -> Result<Option<String>, PatternError> {
    let rules = patterns::get(&POSITION_PATTERNS)?;
    Ok(rules
        .iter()
        .zip(POSITION_TITLES)
        .find(|(re, _)| re.is_match(lowered))
        .map(|(_, title)| title.to_string()))
}

pub fn has_apply_intent(lowered: &str) -> bool {
    APPLY_KEYWORDS.iter().any(|k| lowered.contains(k))
}

/// "Jane Doe jane@x.com" style messages: the words before the email address.
fn name_before_email(message: &str) -> Option<String> {
    let tokens: Vec<&str> = message.split_whitespace().collect();
    let at = tokens.iter().position(|t| t.contains('@'))?;
    if at == 0 || at > MAX_FALLBACK_NAME_TOKENS {
        return None;
    }

    let name = tokens[..at]
        .iter()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if name.is_empty() {
        None
    } else {
        Some(title_case(&name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIYA: &str = "Hi, my name is Priya Sharma, email priya@x.com, phone +91-9876543210. \
                         I want to apply for the full stack developer role.";

    #[test]
    fn test_complete_message_extracts_every_field() {
        let draft = extract_application_fields(PRIYA).unwrap();
        assert_eq!(draft.name.as_deref(), Some("Priya Sharma"));
        assert_eq!(draft.email.as_deref(), Some("priya@x.com"));
        assert_eq!(draft.phone.as_deref(), Some("+91-9876543210"));
        assert_eq!(draft.position.as_deref(), Some("Senior Full Stack Developer"));
        assert!(draft.apply_intent);
    }

    #[test]
    fn test_greeting_extracts_nothing() {
        let draft = extract_application_fields("hi").unwrap();
        assert_eq!(draft, ApplicationDraft::default());
    }

    #[test]
    fn test_name_falls_back_to_words_before_email() {
        let draft = extract_application_fields("Rahul Verma, rahul@example.in 9876543210").unwrap();
        assert_eq!(draft.name.as_deref(), Some("Rahul Verma"));
        assert_eq!(draft.phone.as_deref(), Some("9876543210"));
    }

    #[test]
    fn test_name_fallback_rejects_long_prefix() {
        let draft =
            extract_application_fields("please send the details to ops@example.com").unwrap();
        assert_eq!(draft.name, None);
    }

    #[test]
    fn test_phone_with_spaces() {
        let draft = extract_application_fields("call me on +91 98765 43210 please").unwrap();
        assert_eq!(draft.phone.as_deref(), Some("+91 98765 43210"));
    }

    #[test]
    fn test_short_digit_runs_are_not_phones() {
        let draft = extract_application_fields("I have 3 years (2019-2022) exp").unwrap();
        assert_eq!(draft.phone, None);
    }

    #[test]
    fn test_position_rules_are_ordered() {
        assert_eq!(
            infer_position("ml developer").unwrap().as_deref(),
            Some("AI/ML Engineer")
        );
        assert_eq!(
            infer_position("ui/ux designer").unwrap().as_deref(),
            Some("UI/UX Designer")
        );
        assert_eq!(
            infer_position("devops please").unwrap().as_deref(),
            Some("DevOps Engineer")
        );
        assert_eq!(
            infer_position("summer internship").unwrap().as_deref(),
            Some("Internship Program")
        );
        assert_eq!(infer_position("tell me more").unwrap(), None);
    }

    #[test]
    fn test_short_markers_need_word_boundaries() {
        assert_eq!(infer_position("my email is below").unwrap(), None);
        assert_eq!(infer_position("build guis").unwrap(), None);
    }

    #[test]
    fn test_apply_intent_keywords() {
        assert!(has_apply_intent("i am interested in this role"));
        assert!(has_apply_intent("please submit it"));
        assert!(!has_apply_intent("what do you do?"));
    }

    #[test]
    fn test_decide_submits_only_with_resume() {
        let draft = extract_application_fields(PRIYA).unwrap();
        assert!(matches!(
            draft.clone().decide(true),
            ApplicationDecision::Submit(ref app) if app.name == "Priya Sharma"
        ));
        assert_eq!(
            draft.decide(false),
            ApplicationDecision::AskForMissing {
                position: Some("Senior Full Stack Developer".to_string()),
                missing: vec!["Resume"],
            }
        );
    }

    #[test]
    fn test_decide_lists_missing_fields() {
        let draft = extract_application_fields("I want to apply as a designer").unwrap();
        assert_eq!(
            draft.decide(true),
            ApplicationDecision::AskForMissing {
                position: Some("UI/UX Designer".to_string()),
                missing: vec!["Full Name", "Email Address", "Phone Number"],
            }
        );
    }

    #[test]
    fn test_no_intent_is_not_applying() {
        let draft = extract_application_fields("I am a developer").unwrap();
        assert_eq!(draft.decide(true), ApplicationDecision::NotApplying);
    }
}
