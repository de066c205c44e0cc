//! Prompt construction and text hygiene for job evaluation.

use crate::config::Config;

/// Replace common Unicode punctuation with ASCII equivalents and drop any
/// remaining non-ASCII characters. Provider JSON modes choke less on
/// plain-ASCII prompts.
pub fn sanitize_text(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\u{2011}' | '\u{2013}' | '\u{2014}' => Some('-'),
            '\u{2018}' | '\u{2019}' => Some('\''),
            '\u{201c}' | '\u{201d}' => Some('"'),
            c if c.is_ascii() => Some(c),
            _ => None,
        })
        .collect()
}

/// Whole-word, case-insensitive exclusion match against a job title.
///
/// A keyword only matches when not embedded in a larger word, so "Senior"
/// does not match "Seniority" but does match "Senior-level".
pub fn contains_exclusions(title: &str, exclusion_keywords: &[String]) -> bool {
    let title_lower = title.to_lowercase();

    exclusion_keywords.iter().any(|word| {
        let word_lower = word.to_lowercase();
        if word_lower.is_empty() {
            return false;
        }
        title_lower.match_indices(&word_lower).any(|(start, _)| {
            let before_ok = title_lower[..start]
                .chars()
                .next_back()
                .map_or(true, |c| !is_word_char(c));
            let after_ok = title_lower[start + word_lower.len()..]
                .chars()
                .next()
                .map_or(true, |c| !is_word_char(c));
            before_ok && after_ok
        })
    })
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Build the eligibility prompt for one job description.
///
/// Layout: fixed preamble, operator evaluation criteria, sanitized job
/// description, sanitized resume (when non-empty), and the JSON schema the
/// model must answer with.
pub fn build_eligibility_prompt(job_description: &str, config: &Config) -> String {
    let mut prompt = String::from(
        "You are an AI recruiter assistant.\n\
         You are a helpful assistant that evaluates job postings with a realistic \
         understanding of hiring practices. Remember that many job 'requirements' are \
         actually preferences, and hiring managers often consider candidates who meet \
         70-80% of listed requirements. Analyse the following job description and \
         determine whether the candidate is eligible for the role. Assume the candidate \
         is eligible via US citizenship or residency requirements.",
    );

    if !config.prompts.evaluation_prompt.is_empty() {
        prompt.push_str("\n\nEvaluation Criteria:\n");
        prompt.push_str(&config.prompts.evaluation_prompt);
    }

    prompt.push_str("\n\nJob Description:\n");
    prompt.push_str(&sanitize_text(job_description.trim()));

    let resume = config.resume.text.trim();
    if !resume.is_empty() {
        prompt.push_str("\n\nCandidate Resume:\n");
        prompt.push_str(&sanitize_text(resume));
    }

    prompt.push_str(
        "\n\nRespond using ONLY valid JSON with the following schema:\n\
         {\n  \"eligible\": bool,\n  \"reasoning\": str,\n  \"missing_requirements\": [str]\n}",
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn sanitize_replaces_unicode_punctuation() {
        let input = "Senior\u{2013}level \u{2018}engineer\u{2019} \u{201c}remote\u{201d}\u{2014}only caf\u{e9}";
        assert_eq!(
            sanitize_text(input),
            "Senior-level 'engineer' \"remote\"-only caf"
        );
    }

    #[test]
    fn exclusions_match_whole_words_case_insensitively() {
        let words = keywords(&["Senior", "Sr."]);
        assert!(contains_exclusions("senior software engineer", &words));
        assert!(contains_exclusions("Software Engineer (Senior)", &words));
        assert!(contains_exclusions("Sr. Engineer", &words));
    }

    #[test]
    fn exclusions_ignore_embedded_matches() {
        let words = keywords(&["Senior"]);
        assert!(!contains_exclusions("Seniority Analyst", &words));
        assert!(!contains_exclusions("NonSenior Engineer", &words));
        assert!(!contains_exclusions("Junior Engineer", &words));
    }

    #[test]
    fn empty_exclusion_list_never_matches() {
        assert!(!contains_exclusions("Senior Engineer", &[]));
    }

    #[test]
    fn prompt_includes_all_sections() {
        let mut config = Config::default();
        config.resume.text = "Rust developer, 3 years.".to_string();
        let prompt = build_eligibility_prompt("Write Rust services.", &config);

        assert!(prompt.starts_with("You are an AI recruiter assistant."));
        assert!(prompt.contains("Evaluation Criteria:"));
        assert!(prompt.contains("Job Description:\nWrite Rust services."));
        assert!(prompt.contains("Candidate Resume:\nRust developer, 3 years."));
        assert!(prompt.contains("\"missing_requirements\": [str]"));
    }

    #[test]
    fn prompt_omits_empty_resume_section() {
        let mut config = Config::default();
        config.resume.text = String::new();
        let prompt = build_eligibility_prompt("desc", &config);
        assert!(!prompt.contains("Candidate Resume:"));
    }
}
