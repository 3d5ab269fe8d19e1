//! Review prompt template

/// Build the single user message sent to the model.
///
/// The document text is embedded verbatim between triple quotes.
pub fn build_review_prompt(document_text: &str) -> String {
    format!(
        r#"
You are a compliance expert specializing in gambling, marketing, and legal regulations. Review the following document text and identify violations of SPECIFIC regulated policy rules from these industries.

IMPORTANT: Only reference ACTUAL regulated policy rules from:
- Gambling regulations (e.g., UK Gambling Act 2005, US UIGEA, EU gambling directives)
- Marketing regulations (e.g., CAP Code, FTC guidelines, ASA regulations)
- Legal compliance (e.g., GDPR, consumer protection laws, financial regulations)

DO NOT create or reference made-up rules. Only use established regulatory frameworks.

For each violation found, you must:
1. Reference the SPECIFIC regulation/act/section
2. Quote the EXACT line from user's document that violates it
3. Explain how it violates the regulation

Return ONLY a JSON object with keys:
- "issues": list of compliance issues found. Each issue must have:
    - id (short string),
    - category (string: "Gambling", "Marketing", "Legal"),
    - severity ("Low","Medium","High"),
    - regulation_reference (string: specific regulation/act/section),
    - exact_violation_text (string: quote the exact line from user's document),
    - rule_description (string: what the regulation requires),
    - recommendation (string: how to fix the violation)
- "summary": a short 2-3 sentence summary of the review

If the document contains no violations, "issues" must be an empty list and "summary" must state that the document is fully compliant.

Document text to review:
"""{document_text}
"""

Return valid JSON only.
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_document_text() {
        let prompt = build_review_prompt("Bet now, no limits!");
        assert!(prompt.contains("\"\"\"Bet now, no limits!\n\"\"\""));
    }

    #[test]
    fn test_prompt_names_real_frameworks() {
        let prompt = build_review_prompt("");
        for framework in [
            "UK Gambling Act 2005",
            "UIGEA",
            "EU gambling directives",
            "CAP Code",
            "FTC guidelines",
            "ASA regulations",
            "GDPR",
        ] {
            assert!(prompt.contains(framework), "missing {}", framework);
        }
    }

    #[test]
    fn test_prompt_describes_response_shape() {
        let prompt = build_review_prompt("text");
        for key in [
            "\"issues\"",
            "\"summary\"",
            "regulation_reference",
            "exact_violation_text",
            "rule_description",
            "recommendation",
        ] {
            assert!(prompt.contains(key), "missing {}", key);
        }
        assert!(prompt.contains("fully compliant"));
    }
}
