//! Resume-to-job matching by keyword and role family.
//!
//! Algorithm:
//! 1. Profile the resume (first 3,000 chars): weighted skill categories + years of experience.
//! 2. For each job, dispatch on the title to exactly one role family and add
//!    category-weighted points for that family.
//! 3. Add an experience bonus (+30 / +20 / +10).
//! 4. A job still at 0 with any detected skill gets `min(50, total × 8)`.
//! 5. Jobs still at 0 are dropped; the rest are clamped to [0, 100].
//! 6. Stable sort by score (ties keep input order), keep the top 3.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::models::job::JobPosting;
use crate::patterns::PatternError;
use crate::resume::skills::{profile_resume, CategoryHits, ResumeProfile, SkillCategory};

pub const MAX_DISPLAYED_MATCHES: usize = 3;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("resume analysis pattern fault: {0}")]
    Pattern(#[from] PatternError),
}

/// Role family inferred from a job title. First matching family wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleFamily {
    AiMl,
    Developer,
    Design,
    DevOps,
    Other,
}

impl RoleFamily {
    pub fn from_title(title: &str) -> Self {
        let title = title.to_lowercase();
        let has_any = |terms: &[&str]| terms.iter().any(|t| title.contains(t));

        if has_any(&["ai", "ml", "machine learning", "data scientist"]) {
            RoleFamily::AiMl
        } else if has_any(&["full stack", "developer", "software engineer"]) {
            RoleFamily::Developer
        } else if has_any(&["ui", "ux", "design"]) {
            RoleFamily::Design
        } else if has_any(&["devops", "operations", "infrastructure"]) {
            RoleFamily::DevOps
        } else {
            RoleFamily::Other
        }
    }
}

/// Presentation-only bucket. Never used for ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchLevel {
    Excellent,
    Good,
    Potential,
}

impl MatchLevel {
    pub fn from_score(score: u8) -> Self {
        if score >= 80 {
            MatchLevel::Excellent
        } else if score >= 60 {
            MatchLevel::Good
        } else {
            MatchLevel::Potential
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MatchLevel::Excellent => "Excellent Match",
            MatchLevel::Good => "Good Match",
            MatchLevel::Potential => "Potential Match",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobMatch {
    pub job: JobPosting,
    /// Clamped to 0–100.
    pub score: u8,
    pub reasons: Vec<String>,
}

impl JobMatch {
    pub fn level(&self) -> MatchLevel {
        MatchLevel::from_score(self.score)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchReport {
    pub detected_skills: BTreeMap<SkillCategory, CategoryHits>,
    pub experience_years: Option<u32>,
    /// Top matches, at most `MAX_DISPLAYED_MATCHES`.
    pub matches: Vec<JobMatch>,
    /// Distinct jobs that scored above zero.
    pub total_matches: usize,
    pub total_jobs_considered: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MatchOutcome {
    /// Resume text was empty or whitespace only.
    EmptyResume,
    /// There were no active postings to match against.
    NoOpenings,
    Report(MatchReport),
}

/// Matches resume text against the given postings.
pub fn match_resume_to_jobs(
    resume_text: &str,
    jobs: &[JobPosting],
) -> Result<MatchOutcome, MatchError> {
    if resume_text.trim().is_empty() {
        return Ok(MatchOutcome::EmptyResume);
    }
    if jobs.is_empty() {
        return Ok(MatchOutcome::NoOpenings);
    }

    let profile = profile_resume(resume_text)?;

    let scored: Vec<JobMatch> = jobs
        .iter()
        .filter_map(|job| score_job(&profile, job))
        .collect();
    let total_matches = scored.len();

    let mut matches = rank_matches(scored);
    matches.truncate(MAX_DISPLAYED_MATCHES);

    debug!(
        total_matches,
        jobs = jobs.len(),
        skill_score = profile.total_skill_score,
        "resume matched against openings"
    );

    Ok(MatchOutcome::Report(MatchReport {
        detected_skills: profile.detected_skills,
        experience_years: profile.experience_years,
        matches,
        total_matches,
        total_jobs_considered: jobs.len(),
    }))
}

/// Scores one job. `None` when the job earns nothing.
pub fn score_job(profile: &ResumeProfile, job: &JobPosting) -> Option<JobMatch> {
    let mut score = 0.0_f64;
    let mut reasons = Vec::new();

    match RoleFamily::from_title(&job.title) {
        RoleFamily::AiMl => {
            if let Some(ds) = profile.category_score(SkillCategory::DataScienceAi) {
                score += ds * 20.0;
                reasons.push("Strong AI/ML background".to_string());
            }
            if profile.has(SkillCategory::Programming) {
                score += 25.0;
                reasons.push("Programming skills".to_string());
            }
        }
        RoleFamily::Developer => {
            if let Some(prog) = profile.category_score(SkillCategory::Programming) {
                score += prog * 15.0;
                reasons.push("Programming expertise".to_string());
            }
            if let Some(web) = profile.category_score(SkillCategory::WebDevelopment) {
                score += web * 18.0;
                reasons.push("Web development skills".to_string());
            }
        }
        RoleFamily::Design => {
            if let Some(design) = profile.category_score(SkillCategory::Design) {
                score += design * 25.0;
                reasons.push("Design expertise".to_string());
            }
        }
        RoleFamily::DevOps => {
            if let Some(cloud) = profile.category_score(SkillCategory::CloudDevOps) {
                score += cloud * 22.0;
                reasons.push("DevOps/Cloud skills".to_string());
            }
            if profile.has(SkillCategory::Programming) {
                score += 15.0;
                reasons.push("Programming background".to_string());
            }
        }
        RoleFamily::Other => {}
    }

    if let Some((bonus, reason)) = experience_bonus(profile.experience_years) {
        score += bonus;
        reasons.push(reason);
    }

    if score == 0.0 && profile.total_skill_score > 0.0 {
        score = (profile.total_skill_score * 8.0).min(50.0);
        reasons.push("General technical background".to_string());
    }

    if score <= 0.0 {
        return None;
    }

    Some(JobMatch {
        job: job.clone(),
        score: clamp_score(score),
        reasons,
    })
}

fn experience_bonus(years: Option<u32>) -> Option<(f64, String)> {
    match years? {
        0 => None,
        y if y >= 5 => Some((30.0, format!("Senior experience ({y} years)"))),
        y if y >= 2 => Some((20.0, format!("Mid-level experience ({y} years)"))),
        _ => Some((10.0, "Entry-level experience".to_string())),
    }
}

/// Truncates toward zero and clamps into 0–100.
pub fn clamp_score(raw: f64) -> u8 {
    raw.clamp(0.0, 100.0) as u8
}

/// Sorts by score descending. `sort_by` is stable, so equal scores keep input order.
pub fn rank_matches(mut matches: Vec<JobMatch>) -> Vec<JobMatch> {
    matches.sort_by(|a, b| b.score.cmp(&a.score));
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(outcome: MatchOutcome) -> MatchReport {
        match outcome {
            MatchOutcome::Report(r) => r,
            other => panic!("expected report, got {other:?}"),
        }
    }

    fn sample_jobs() -> Vec<JobPosting> {
        vec![
            JobPosting::fixture(
                "Senior Full Stack Developer",
                "Development",
                "3+ years experience with React, Node.js, Python, databases.",
            ),
            JobPosting::fixture("UI/UX Designer", "Design", "Figma, Adobe Creative Suite."),
            JobPosting::fixture("AI/ML Engineer", "AI/ML", "Python, TensorFlow/PyTorch."),
            JobPosting::fixture("DevOps Engineer", "Operations", "AWS, Docker, Kubernetes."),
        ]
    }

    #[test]
    fn test_role_family_dispatch_is_first_match() {
        assert_eq!(RoleFamily::from_title("AI/ML Engineer"), RoleFamily::AiMl);
        assert_eq!(
            RoleFamily::from_title("Senior Full Stack Developer"),
            RoleFamily::Developer
        );
        assert_eq!(RoleFamily::from_title("UI/UX Designer"), RoleFamily::Design);
        assert_eq!(RoleFamily::from_title("DevOps Engineer"), RoleFamily::DevOps);
        assert_eq!(RoleFamily::from_title("Accountant"), RoleFamily::Other);
        // "developer" is checked before "design"
        assert_eq!(
            RoleFamily::from_title("Design System Developer"),
            RoleFamily::Developer
        );
    }

    #[test]
    fn test_empty_resume_is_distinct_outcome() {
        let outcome = match_resume_to_jobs("   \n\t", &sample_jobs()).unwrap();
        assert_eq!(outcome, MatchOutcome::EmptyResume);
    }

    #[test]
    fn test_no_openings_is_explicit_outcome() {
        let outcome = match_resume_to_jobs("python developer", &[]).unwrap();
        assert_eq!(outcome, MatchOutcome::NoOpenings);
    }

    #[test]
    fn test_no_keyword_overlap_yields_no_matches() {
        let r = report(match_resume_to_jobs("I enjoy hiking and painting.", &sample_jobs()).unwrap());
        assert!(r.detected_skills.is_empty());
        assert!(r.matches.is_empty());
        assert_eq!(r.total_matches, 0);
        assert_eq!(r.total_jobs_considered, 4);
    }

    #[test]
    fn test_full_stack_score_uses_programming_and_web_weights() {
        let jobs = vec![JobPosting::fixture(
            "Full Stack Developer",
            "Development",
            "Python required",
        )];
        let r = report(match_resume_to_jobs("python, react, docker", &jobs).unwrap());
        assert!(r.detected_skills.contains_key(&SkillCategory::Programming));
        assert!(r.detected_skills.contains_key(&SkillCategory::WebDevelopment));
        // 1.5 * 15 + 1.3 * 18 = 45.9
        assert_eq!(r.matches[0].score, 45);
        assert_eq!(
            r.matches[0].reasons,
            vec!["Programming expertise", "Web development skills"]
        );
    }

    #[test]
    fn test_experience_bonus_applies_without_family() {
        let jobs = vec![JobPosting::fixture("Accountant", "Finance", "")];
        let r = report(match_resume_to_jobs("10 years of experience in ledgers", &jobs).unwrap());
        assert_eq!(r.experience_years, Some(10));
        assert_eq!(r.matches[0].score, 30);
        assert_eq!(r.matches[0].reasons, vec!["Senior experience (10 years)"]);
    }

    #[test]
    fn test_general_background_fallback_is_capped_at_50() {
        let jobs = vec![JobPosting::fixture("Accountant", "Finance", "")];
        let resume = "python java rust mysql docker aws figma";
        let r = report(match_resume_to_jobs(resume, &jobs).unwrap());
        assert_eq!(r.matches[0].score, 50);
        assert_eq!(r.matches[0].reasons, vec!["General technical background"]);
    }

    #[test]
    fn test_general_background_small_total() {
        let jobs = vec![JobPosting::fixture("Accountant", "Finance", "")];
        // Database 1.2 → 9.6
        let r = report(match_resume_to_jobs("redis", &jobs).unwrap());
        assert_eq!(r.matches[0].score, 9);
    }

    #[test]
    fn test_scores_are_clamped_to_100() {
        let jobs = vec![JobPosting::fixture("AI/ML Engineer", "AI/ML", "")];
        let resume = "machine learning, deep learning, tensorflow, pytorch, pandas, numpy, python. \
                      8 years of experience";
        let r = report(match_resume_to_jobs(resume, &jobs).unwrap());
        assert_eq!(r.matches[0].score, 100);
        assert_eq!(r.matches[0].level(), MatchLevel::Excellent);
    }

    #[test]
    fn test_all_scores_within_bounds() {
        let resume = "python java javascript react angular vue figma sketch aws docker \
                      kubernetes mysql 12 years experience";
        let r = report(match_resume_to_jobs(resume, &sample_jobs()).unwrap());
        assert!(!r.matches.is_empty());
        assert!(r.matches.iter().all(|m| m.score <= 100));
    }

    #[test]
    fn test_top_three_only_but_total_counts_all() {
        let r = report(
            match_resume_to_jobs("python react figma aws tensorflow", &sample_jobs()).unwrap(),
        );
        assert_eq!(r.total_matches, 4);
        assert_eq!(r.matches.len(), MAX_DISPLAYED_MATCHES);
        assert!(r.matches.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_matching_is_idempotent() {
        let resume = "python react docker 3 years experience";
        let jobs = sample_jobs();
        let first = match_resume_to_jobs(resume, &jobs).unwrap();
        let second = match_resume_to_jobs(resume, &jobs).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_rank_is_stable_for_ties() {
        let make = |title: &str, score: u8| JobMatch {
            job: JobPosting::fixture(title, "", ""),
            score,
            reasons: vec![],
        };
        let ranked = rank_matches(vec![make("B", 95), make("A", 95), make("C", 40)]);
        let titles: Vec<_> = ranked.iter().map(|m| m.job.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_match_level_buckets() {
        assert_eq!(MatchLevel::from_score(80), MatchLevel::Excellent);
        assert_eq!(MatchLevel::from_score(79), MatchLevel::Good);
        assert_eq!(MatchLevel::from_score(60), MatchLevel::Good);
        assert_eq!(MatchLevel::from_score(59), MatchLevel::Potential);
        assert_eq!(MatchLevel::Good.label(), "Good Match");
    }

    #[test]
    fn test_clamp_score_truncates() {
        assert_eq!(clamp_score(45.9), 45);
        assert_eq!(clamp_score(250.0), 100);
        assert_eq!(clamp_score(-3.0), 0);
    }
}
