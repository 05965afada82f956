// Shared prompt fragments. Each module that calls the generation service
// keeps its own prompts.rs alongside it; only cross-cutting text lives here.

/// Appended to every prompt that reads candidate material.
pub const GROUNDING_INSTRUCTION: &str = "\
    CRITICAL: Base everything you write on the supplied resume text and answers. \
    Do NOT infer, interpolate, or invent details that are not present or clearly implied.";

/// Fills `{key}` placeholders in one left-to-right pass. Inserted values are
/// never rescanned, so braces inside candidate text reach the model as
/// written. Unknown `{...}` sequences are kept verbatim.
pub fn render_prompt(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let matched = vars.iter().find(|(key, _)| {
            after
                .strip_prefix(key)
                .is_some_and(|tail| tail.starts_with('}'))
        });
        match matched {
            Some((key, value)) => {
                out.push_str(value);
                rest = &after[key.len() + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_fills_known_placeholders() {
        let out = render_prompt("Hi {name}, from {college}.", &[("name", "Ada"), ("college", "IIT")]);
        assert_eq!(out, "Hi Ada, from IIT.");
    }

    #[test]
    fn test_render_keeps_json_braces_and_unknown_keys() {
        let out = render_prompt(r#"{"general": [...]} {missing} {name}"#, &[("name", "Ada")]);
        assert_eq!(out, r#"{"general": [...]} {missing} Ada"#);
    }

    #[test]
    fn test_inserted_values_are_not_expanded() {
        let out = render_prompt(
            "{name} / {secret}",
            &[("name", "{secret}"), ("secret", "hidden")],
        );
        assert_eq!(out, "{secret} / hidden");
    }

    #[test]
    fn test_render_handles_trailing_brace_and_multibyte_text() {
        let out = render_prompt("résumé {name}{", &[("name", "Zoë")]);
        assert_eq!(out, "résumé Zoë{");
    }
}
