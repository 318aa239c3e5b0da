/// Build a prompt asking for a plain translation of `text`.
pub fn build_translation_prompt(text: &str, source_language: &str, target_language: &str) -> String {
    format!(
        "Translate the following text from language code '{source_language}' to language code '{target_language}'.\n\
\n\
Rules:\n\
- Return only the translated text.\n\
- Keep the structure and line breaks of the original.\n\
- Do not add notes, explanations or a preamble.\n\
\n\
Text:\n\
{text}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translation_prompt_names_both_languages_and_embeds_text() {
        let prompt = build_translation_prompt("Bonjour à tous", "fr", "de");
        assert!(prompt.contains("'fr'"));
        assert!(prompt.contains("'de'"));
        assert!(prompt.ends_with("Bonjour à tous"));
    }
}
