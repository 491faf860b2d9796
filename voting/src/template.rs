//! Message templates.
//!
//! Administrators write templates with `{mention}`, `{roles}` and (for
//! outcome messages) `{people}` placeholders. `{{` and `}}` produce literal
//! braces. Anything else inside braces is an error, and callers fall back to
//! the built-in default template.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unknown placeholder {{{0}}}")]
    UnknownPlaceholder(String),

    #[error("unclosed '{{' at byte {0}")]
    UnclosedBrace(usize),

    #[error("single '}}' at byte {0}")]
    StrayClosingBrace(usize),
}

/// Values substituted into a template.
#[derive(Clone, Copy, Debug)]
pub struct TemplateVars<'a> {
    pub mention: &'a str,
    pub roles: &'a str,
    /// Only outcome messages know who voted.
    pub people: Option<&'a str>,
}

impl<'a> TemplateVars<'a> {
    fn lookup(&self, name: &str) -> Option<&'a str> {
        match name {
            "mention" => Some(self.mention),
            "roles" => Some(self.roles),
            "people" => self.people,
            _ => None,
        }
    }
}

/// Substitute placeholders in `template`.
pub fn render(template: &str, vars: &TemplateVars<'_>) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' => {
                if chars.next_if(|&(_, n)| n == '{').is_some() {
                    out.push('{');
                    continue;
                }
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some((_, '}')) => break,
                        Some((_, ch)) => name.push(ch),
                        None => return Err(TemplateError::UnclosedBrace(pos)),
                    }
                }
                let value = vars
                    .lookup(&name)
                    .ok_or(TemplateError::UnknownPlaceholder(name))?;
                out.push_str(value);
            }
            '}' => {
                if chars.next_if(|&(_, n)| n == '}').is_none() {
                    return Err(TemplateError::StrayClosingBrace(pos));
                }
                out.push('}');
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

/// Render `template`, or `fallback` if the template is malformed.
pub fn render_or_fallback(template: &str, fallback: &str, vars: &TemplateVars<'_>) -> String {
    match render(template, vars) {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(error = %e, template, "malformed message template, using default");
            render(fallback, vars).unwrap_or_else(|_| fallback.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: TemplateVars<'static> = TemplateVars {
        mention: "<@5>",
        roles: "Members, Voters",
        people: Some("<@6>, <@7>"),
    };

    #[test]
    fn substitutes_all_placeholders() {
        let text = render("{mention} got {roles} from {people}", &VARS).unwrap();
        assert_eq!(text, "<@5> got Members, Voters from <@6>, <@7>");
    }

    #[test]
    fn doubled_braces_are_literal() {
        assert_eq!(render("{{mention}} }}", &VARS).unwrap(), "{mention} }");
    }

    #[test]
    fn people_unavailable_in_approval_posts() {
        let vars = TemplateVars {
            people: None,
            ..VARS
        };
        assert_eq!(
            render("{people}", &vars),
            Err(TemplateError::UnknownPlaceholder("people".into()))
        );
    }

    #[test]
    fn malformed_templates_are_rejected() {
        assert_eq!(render("hi {mention", &VARS), Err(TemplateError::UnclosedBrace(3)));
        assert_eq!(render("hi } there", &VARS), Err(TemplateError::StrayClosingBrace(3)));
        assert!(matches!(
            render("{0}", &VARS),
            Err(TemplateError::UnknownPlaceholder(_))
        ));
    }

    #[test]
    fn fallback_used_for_malformed_template() {
        let text = render_or_fallback("{nope}", "{mention} joins", &VARS);
        assert_eq!(text, "<@5> joins");
    }

    #[test]
    fn non_ascii_text_survives() {
        assert_eq!(render("✅ {mention} ✅", &VARS).unwrap(), "✅ <@5> ✅");
    }
}
