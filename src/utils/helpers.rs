//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use std::collections::BTreeMap;

use crate::utils::errors::TemplateError;

/// Render a `{field}` template against a set of named values.
///
/// `{{` and `}}` produce literal braces. A placeholder whose field is not
/// present in `values` is an error, never an empty substitution.
pub fn render_template(template: &str, values: &BTreeMap<String, String>) -> Result<String, TemplateError> {
    let mut output = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((position, c)) = chars.next() {
        match c {
            '{' => {
                if matches!(chars.peek(), Some((_, '{'))) {
                    chars.next();
                    output.push('{');
                    continue;
                }

                let mut field = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    match c {
                        '}' => {
                            closed = true;
                            break;
                        }
                        '{' => break,
                        _ => field.push(c),
                    }
                }

                let field = field.trim();
                if !closed || field.is_empty() {
                    return Err(TemplateError::Malformed {
                        template: template.to_string(),
                        position,
                    });
                }

                match values.get(field) {
                    Some(value) => output.push_str(value),
                    None => {
                        return Err(TemplateError::MissingField {
                            field: field.to_string(),
                            template: template.to_string(),
                        })
                    }
                }
            }
            '}' => {
                if matches!(chars.peek(), Some((_, '}'))) {
                    chars.next();
                    output.push('}');
                } else {
                    return Err(TemplateError::Malformed {
                        template: template.to_string(),
                        position,
                    });
                }
            }
            _ => output.push(c),
        }
    }

    Ok(output)
}

/// Truncate text to a maximum number of characters with ellipsis
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Sanitize filename for safe storage
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
