//! `[expr]` substitution inside string arguments.
//!
//! Bracket groups are matched with a depth counter, so a group may contain
//! nested brackets (`[sin[theta]]`). Passes repeat until one makes no
//! replacement. A group whose content is wrapped in backticks is left as is.

use crate::error::ExprError;
use crate::expr::eval::{Engine, Variables};
use crate::expr::format_number;

impl Engine {
    pub fn interpolate(&self, text: &str, vars: &dyn Variables) -> Result<String, ExprError> {
        let mut current = text.to_string();
        loop {
            let (next, replaced) = self.substitute(&current, vars)?;
            if !replaced {
                return Ok(next);
            }
            current = next;
        }
    }

    fn substitute(&self, text: &str, vars: &dyn Variables) -> Result<(String, bool), ExprError> {
        let mut out = String::with_capacity(text.len());
        let mut replaced = false;
        let mut rest = text;

        while let Some(start) = rest.find('[') {
            out.push_str(&rest[..start]);
            let group = &rest[start..];
            let Some(end) = matching_close(group) else {
                // unbalanced: keep the remainder verbatim
                out.push_str(group);
                rest = "";
                break;
            };
            let inner = &group[1..end];
            if is_escaped(inner) {
                out.push_str(&group[..=end]);
            } else {
                let expr = self.parse(inner)?;
                out.push_str(&format_number(self.eval(&expr, vars)?));
                replaced = true;
            }
            rest = &group[end + 1..];
        }
        out.push_str(rest);
        Ok((out, replaced))
    }
}

/// Byte index of the `]` closing the `[` at index 0.
fn matching_close(group: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in group.bytes().enumerate() {
        match b {
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn is_escaped(inner: &str) -> bool {
    inner.len() >= 2 && inner.starts_with('`') && inner.ends_with('`')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::eval::NoVars;
    use std::collections::HashMap;

    fn interp(text: &str, vars: &[(&str, f64)]) -> Result<String, ExprError> {
        let scope: HashMap<&str, f64> = vars.iter().copied().collect();
        Engine::new().interpolate(text, &scope)
    }

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(interp("hello world", &[]), Ok("hello world".into()));
    }

    #[test]
    fn substitutes_each_group() {
        assert_eq!(interp("[a] + [b] = [a+b]", &[("a", 1.0), ("b", 2.5)]), Ok("1 + 2.5 = 3.5".into()));
    }

    #[test]
    fn nested_brackets() {
        assert_eq!(interp("sine is [sin[theta]]", &[("theta", 0.0)]), Ok("sine is 0".into()));
        assert_eq!(interp("[[2]*[3]]", &[]), Ok("6".into()));
    }

    #[test]
    fn backtick_groups_are_literal() {
        assert_eq!(interp("keep [`x`] as is", &[]), Ok("keep [`x`] as is".into()));
    }

    #[test]
    fn unbalanced_bracket_is_kept() {
        assert_eq!(interp("open [ended", &[]), Ok("open [ended".into()));
    }

    #[test]
    fn deeply_nested_groups_fail_cleanly() {
        let text = format!("x{}1{}", "[".repeat(100_000), "]".repeat(100_000));
        assert_eq!(
            interp(&text, &[]),
            Err(ExprError::NestedTooDeep(crate::expr::parser::MAX_NESTING))
        );
    }

    #[test]
    fn errors_propagate() {
        assert_eq!(
            Engine::new().interpolate("[nope]", &NoVars),
            Err(ExprError::UndefinedVariable("nope".into()))
        );
    }
}
