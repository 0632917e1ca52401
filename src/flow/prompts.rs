//! Prompt construction for agent-assisted question delivery.

use crate::catalog::{Question, QuestionCatalog};
use crate::session::AnswerMap;

/// Build the system instruction for presenting one question.
///
/// Names the question's position in the flow, carries a summary of what the
/// user already answered, and asks for an empathetic rephrasing in the
/// target language. The first question additionally gets a short welcome.
pub fn presentation_system_prompt(
    position: usize,
    total: usize,
    language: &str,
    is_first: bool,
    prior_summary: &str,
) -> String {
    let mut parts = vec![format!(
        "You are the Famlink onboarding assistant, guiding a parent or \
         caseworker through an intake conversation about their family \
         situation. You are now asking question {position} of {total}."
    )];

    if is_first {
        parts.push(
            "This is the first question. Open with one short, warm sentence \
             welcoming the user to Famlink before asking."
                .to_string(),
        );
    }

    if !prior_summary.is_empty() {
        parts.push(format!("What the user has answered so far:\n{prior_summary}"));
    }

    parts.push(format!(
        "Rephrase the question below empathetically in the language '{language}'. \
         Keep its meaning exactly; if answer options are listed, mention all of \
         them. Respond with the question only — no preamble, no commentary."
    ));

    parts.join("\n\n")
}

/// Build the user-role message carrying the question to present.
pub fn presentation_user_prompt(question: &Question) -> String {
    if question.options.is_empty() {
        format!("Question: {}", question.text)
    } else {
        format!(
            "Question: {}\nOptions: {}",
            question.text,
            question.options.join(", ")
        )
    }
}

/// Message shown when the last catalog question has been answered.
///
/// Static text on purpose — completion must not depend on the generation
/// provider being reachable.
pub fn completion_message(language: &str) -> String {
    match language {
        "da" => "Tak for dine svar! Din profil er nu klar, og vi gennemgår den \
                 hurtigst muligt."
            .to_string(),
        _ => "Thank you for your answers! Your profile is complete, and we will \
              review it as soon as possible."
            .to_string(),
    }
}

/// Serialize prior answers into a human-readable summary, one line per
/// answer, labeled with the catalog question text where the id still
/// resolves. Catalog order; answers for unknown ids are skipped.
pub fn summarize_answers(catalog: &QuestionCatalog, answers: &AnswerMap) -> String {
    catalog
        .questions()
        .iter()
        .filter_map(|q| {
            let value = answers.get(&q.id)?;
            let rendered = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some(format!("- {}: {}", q.text, rendered))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Question;

    fn sample_catalog() -> QuestionCatalog {
        QuestionCatalog::new(vec![
            Question {
                id: "name".into(),
                text: "What is your name?".into(),
                options: vec![],
            },
            Question {
                id: "role".into(),
                text: "What is your role in the family?".into(),
                options: vec!["mother".into(), "father".into(), "other".into()],
            },
        ])
    }

    #[test]
    fn system_prompt_names_position_and_language() {
        let prompt = presentation_system_prompt(2, 6, "da", false, "");
        assert!(prompt.contains("question 2 of 6"));
        assert!(prompt.contains("'da'"));
        assert!(!prompt.contains("first question"));
    }

    #[test]
    fn system_prompt_first_question_gets_welcome() {
        let prompt = presentation_system_prompt(1, 6, "en", true, "");
        assert!(prompt.contains("first question"));
        assert!(prompt.contains("welcoming"));
    }

    #[test]
    fn system_prompt_includes_prior_summary() {
        let prompt =
            presentation_system_prompt(3, 6, "en", false, "- What is your name?: Anna");
        assert!(prompt.contains("answered so far"));
        assert!(prompt.contains("Anna"));
    }

    #[test]
    fn user_prompt_without_options() {
        let q = Question {
            id: "name".into(),
            text: "What is your name?".into(),
            options: vec![],
        };
        let prompt = presentation_user_prompt(&q);
        assert_eq!(prompt, "Question: What is your name?");
    }

    #[test]
    fn user_prompt_lists_options() {
        let catalog = sample_catalog();
        let prompt = presentation_user_prompt(catalog.get("role").unwrap());
        assert!(prompt.contains("What is your role in the family?"));
        assert!(prompt.contains("mother, father, other"));
    }

    #[test]
    fn summary_uses_question_text_in_catalog_order() {
        let catalog = sample_catalog();
        let mut answers = AnswerMap::new();
        answers.insert("role".into(), serde_json::json!("mother"));
        answers.insert("name".into(), serde_json::json!("Anna"));

        let summary = summarize_answers(&catalog, &answers);
        assert_eq!(
            summary,
            "- What is your name?: Anna\n- What is your role in the family?: mother"
        );
    }

    #[test]
    fn summary_skips_foreign_keys_and_renders_non_strings() {
        let catalog = sample_catalog();
        let mut answers = AnswerMap::new();
        answers.insert("name".into(), serde_json::json!(3));
        answers.insert("gone".into(), serde_json::json!("stale"));

        let summary = summarize_answers(&catalog, &answers);
        assert_eq!(summary, "- What is your name?: 3");
    }

    #[test]
    fn completion_message_follows_language() {
        assert!(completion_message("da").starts_with("Tak"));
        assert!(completion_message("en").starts_with("Thank"));
        // Unknown languages fall back to English.
        assert!(completion_message("de").starts_with("Thank"));
    }

    #[test]
    fn summary_empty_answers() {
        let catalog = sample_catalog();
        assert!(summarize_answers(&catalog, &AnswerMap::new()).is_empty());
    }
}
