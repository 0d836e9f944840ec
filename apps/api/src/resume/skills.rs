//! Resume profiling: static skill categories, keyword detection and
//! years-of-experience inference over a bounded, lower-cased prefix.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::patterns::{self, PatternError, PatternSet};

/// Only the first few thousand characters of a resume are inspected.
pub const RESUME_PREFIX_CHARS: usize = 3000;
/// Displayed keywords per category. All matches still count toward the score.
pub const MAX_DISPLAYED_SKILLS: usize = 5;

/// Closed set of skill buckets used for scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SkillCategory {
    Programming,
    WebDevelopment,
    DataScienceAi,
    Design,
    CloudDevOps,
    Database,
}

impl SkillCategory {
    pub const ALL: [SkillCategory; 6] = [
        SkillCategory::Programming,
        SkillCategory::WebDevelopment,
        SkillCategory::DataScienceAi,
        SkillCategory::Design,
        SkillCategory::CloudDevOps,
        SkillCategory::Database,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SkillCategory::Programming => "Programming",
            SkillCategory::WebDevelopment => "Web Development",
            SkillCategory::DataScienceAi => "Data Science/AI",
            SkillCategory::Design => "Design",
            SkillCategory::CloudDevOps => "Cloud/DevOps",
            SkillCategory::Database => "Database",
        }
    }

    pub fn weight(&self) -> f64 {
        match self {
            SkillCategory::Programming => 1.5,
            SkillCategory::WebDevelopment => 1.3,
            SkillCategory::DataScienceAi => 1.8,
            SkillCategory::Design => 1.6,
            SkillCategory::CloudDevOps => 1.4,
            SkillCategory::Database => 1.2,
        }
    }

    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            SkillCategory::Programming => &[
                "python", "java", "javascript", "c++", "c#", "php", "ruby", "go", "rust", "kotlin",
                "swift",
            ],
            SkillCategory::WebDevelopment => &[
                "html", "css", "react", "angular", "vue", "node.js", "express", "django", "flask",
                "laravel",
            ],
            SkillCategory::DataScienceAi => &[
                "machine learning",
                "artificial intelligence",
                "data science",
                "tensorflow",
                "pytorch",
                "pandas",
                "numpy",
                "scikit-learn",
                "deep learning",
            ],
            SkillCategory::Design => &[
                "ui/ux",
                "figma",
                "photoshop",
                "illustrator",
                "sketch",
                "adobe xd",
                "design thinking",
                "wireframe",
                "prototype",
            ],
            SkillCategory::CloudDevOps => &[
                "aws", "azure", "gcp", "docker", "kubernetes", "jenkins", "ci/cd", "terraform",
                "ansible",
            ],
            SkillCategory::Database => &[
                "mysql",
                "postgresql",
                "mongodb",
                "redis",
                "elasticsearch",
                "sql",
                "nosql",
            ],
        }
    }
}

/// Keywords found for one category and the weighted score they earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryHits {
    /// Title-cased, at most `MAX_DISPLAYED_SKILLS` entries.
    pub skills: Vec<String>,
    pub score: f64,
}

/// The parts of a resume the matcher actually looks at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResumeProfile {
    /// Lower-cased prefix that was inspected.
    #[serde(skip)]
    pub inspected_text: String,
    /// Only categories with at least one hit are present.
    pub detected_skills: BTreeMap<SkillCategory, CategoryHits>,
    pub total_skill_score: f64,
    pub experience_years: Option<u32>,
}

impl ResumeProfile {
    pub fn category_score(&self, category: SkillCategory) -> Option<f64> {
        self.detected_skills.get(&category).map(|hits| hits.score)
    }

    pub fn has(&self, category: SkillCategory) -> bool {
        self.detected_skills.contains_key(&category)
    }
}

const EXPERIENCE_SOURCES: &[&str] = &[
    r"(\d+)\+?\s*years?\s*(?:of\s*)?experience",
    r"experience[:\s]*(\d+)\+?\s*years?",
    r"(\d+)\+?\s*yrs?\s*(?:of\s*)?(?:exp|experience)",
    r"working\s*(?:for\s*)?(\d+)\+?\s*years?",
];

static EXPERIENCE_PATTERNS: Lazy<PatternSet> = Lazy::new(|| patterns::compile_all(EXPERIENCE_SOURCES));

/// Builds a profile from raw resume text.
pub fn profile_resume(resume_text: &str) -> Result<ResumeProfile, PatternError> {
    let inspected_text = inspected_prefix(resume_text);
    let (detected_skills, total_skill_score) = detect_skills(&inspected_text);
    let experience_years = detect_experience_years(&inspected_text)?;

    Ok(ResumeProfile {
        inspected_text,
        detected_skills,
        total_skill_score,
        experience_years,
    })
}

/// First `RESUME_PREFIX_CHARS` characters, lower-cased.
pub fn inspected_prefix(resume_text: &str) -> String {
    resume_text
        .chars()
        .take(RESUME_PREFIX_CHARS)
        .collect::<String>()
        .to_lowercase()
}

/// Scans every category's keyword list. Categories without hits are omitted.
pub fn detect_skills(text: &str) -> (BTreeMap<SkillCategory, CategoryHits>, f64) {
    let mut detected = BTreeMap::new();
    let mut total = 0.0;

    for category in SkillCategory::ALL {
        let found: Vec<&str> = category
            .keywords()
            .iter()
            .copied()
            .filter(|keyword| text.contains(keyword))
            .collect();

        if found.is_empty() {
            continue;
        }

        let score = found.len() as f64 * category.weight();
        total += score;
        detected.insert(
            category,
            CategoryHits {
                skills: found
                    .iter()
                    .take(MAX_DISPLAYED_SKILLS)
                    .map(|k| title_case(k))
                    .collect(),
                score,
            },
        );
    }

    (detected, total)
}

/// Largest of the first year counts matched by each experience pattern. `None` when nothing matched.
pub fn detect_experience_years(text: &str) -> Result<Option<u32>, PatternError> {
    let patterns = patterns::get(&EXPERIENCE_PATTERNS)?;

    Ok(patterns
        .iter()
        .filter_map(|re| re.captures(text))
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| m.as_str().parse::<u32>().ok())
        .max())
}

/// Upper-cases the first letter of every alphabetic run, lower-cases the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_without_hits_are_omitted() {
        let (detected, total) = detect_skills("python and docker");
        assert!(detected.contains_key(&SkillCategory::Programming));
        assert!(detected.contains_key(&SkillCategory::CloudDevOps));
        assert!(!detected.contains_key(&SkillCategory::Design));
        assert!((total - (1.5 + 1.4)).abs() < 1e-9);
    }

    #[test]
    fn test_every_hit_scores_but_display_is_capped() {
        let text = "python java javascript php ruby rust kotlin";
        let (detected, _) = detect_skills(text);
        let programming = &detected[&SkillCategory::Programming];
        assert_eq!(programming.skills.len(), MAX_DISPLAYED_SKILLS);
        // python, java, javascript, php, ruby, rust, kotlin
        assert!((programming.score - 7.0 * 1.5).abs() < 1e-9, "{}", programming.score);
    }

    #[test]
    fn test_no_keywords_means_empty_profile() {
        let (detected, total) = detect_skills("i enjoy hiking and painting");
        assert!(detected.is_empty());
        assert_eq!(total, 0.0);
    }

    #[test]
    fn test_experience_plain_years() {
        assert_eq!(
            detect_experience_years("5 years of experience").unwrap(),
            Some(5)
        );
    }

    #[test]
    fn test_experience_takes_maximum_across_patterns() {
        let text = "experience: 3 years in web. working for 7 years overall. 2 yrs exp in go";
        assert_eq!(detect_experience_years(text).unwrap(), Some(7));
    }

    #[test]
    fn test_experience_uses_first_match_of_each_pattern() {
        let text = "3 years of experience in java. previously 10 years experience as a clerk";
        assert_eq!(detect_experience_years(text).unwrap(), Some(3));
    }

    #[test]
    fn test_experience_absent_is_none_not_zero() {
        assert_eq!(detect_experience_years("fresh graduate").unwrap(), None);
    }

    #[test]
    fn test_prefix_is_bounded_and_lowercased() {
        let long = format!("{}PYTHON", "x".repeat(RESUME_PREFIX_CHARS));
        let prefix = inspected_prefix(&long);
        assert_eq!(prefix.chars().count(), RESUME_PREFIX_CHARS);
        assert!(!prefix.contains("python"));
        assert_eq!(inspected_prefix("React"), "react");
    }

    #[test]
    fn test_prefix_respects_char_boundaries() {
        let text = "é".repeat(RESUME_PREFIX_CHARS + 10);
        assert_eq!(inspected_prefix(&text).chars().count(), RESUME_PREFIX_CHARS);
    }

    #[test]
    fn test_title_case_keywords() {
        assert_eq!(title_case("node.js"), "Node.Js");
        assert_eq!(title_case("machine learning"), "Machine Learning");
        assert_eq!(title_case("ui/ux"), "Ui/Ux");
        assert_eq!(title_case("priya SHARMA"), "Priya Sharma");
    }
}
