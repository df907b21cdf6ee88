//! Level template expansion
//!
//! Hierarchy entries such as `environment/{environment}.yaml` are rendered
//! against the caller's facts before a backend is consulted. `{{` and `}}`
//! stand for literal braces.

use std::collections::HashMap;

use crate::error::{HieraError, HieraResult};

/// Named runtime inputs used to render level templates
pub type Facts = HashMap<String, String>;

/// Render a single level template
pub fn expand_level(template: &str, facts: &Facts) -> HieraResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') | None => {
                            return Err(invalid(template, "unterminated placeholder"));
                        }
                        Some(c) => name.push(c),
                    }
                }
                if name.is_empty() {
                    return Err(invalid(template, "empty placeholder"));
                }
                match facts.get(&name) {
                    Some(value) => out.push_str(value),
                    None => {
                        return Err(HieraError::MissingFact {
                            template: template.to_string(),
                            fact: name,
                        })
                    }
                }
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => return Err(invalid(template, "single '}' encountered")),
            c => out.push(c),
        }
    }

    Ok(out)
}

/// Render every template of a hierarchy, preserving order
pub fn expand_hierarchy(hierarchy: &[String], facts: &Facts) -> HieraResult<Vec<String>> {
    hierarchy
        .iter()
        .map(|template| expand_level(template, facts))
        .collect()
}

fn invalid(template: &str, reason: &str) -> HieraError {
    HieraError::InvalidTemplate {
        template: template.to_string(),
        reason: reason.to_string(),
    }
}
