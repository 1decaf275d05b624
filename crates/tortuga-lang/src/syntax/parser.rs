//! Line-oriented block parser for turtle programs.
//!
//! Source text is cut into logical lines of words (quoted strings kept as one
//! word, `# comments` split off), then a recursive block parser turns the
//! line queue into a tree. Comments are attached in a final annotation pass.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::{Error, ErrorCode};
use crate::syntax::ast::{Node, NodeKind};

/// Deepest allowed nesting of `do … end` blocks.
pub const MAX_BLOCK_DEPTH: usize = 128;

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub number: usize,
    pub words: Vec<String>,
}

/// Parses a whole program into its top-level nodes.
pub fn parse_program(source: &str) -> Result<Vec<Node>, Error> {
    let (lines, comments) = split_lines(source);
    let mut parser = BlockParser { queue: lines.into(), depth: 0 };
    let mut body = parser.parse_block(None)?;
    annotate(&mut body, &comments, &mut HashSet::new());
    log::debug!("parsed {} top-level node(s)", body.len());
    Ok(body)
}

// ─── Lines ───────────────────────────────────────────────────────────────────

/// Splits source into logical lines plus a map from line number to comment.
/// `end` always stands on a line of its own and `do` always ends one, so
/// `for 3 do fw 1 end` yields three lines.
pub fn split_lines(source: &str) -> (Vec<Line>, HashMap<usize, String>) {
    let mut lines = Vec::new();
    let mut comments = HashMap::new();

    for (idx, raw) in source.lines().enumerate() {
        let number = idx + 1;
        let (code, comment) = split_comment(raw);
        let words = split_words(code.trim());

        if let Some(c) = comment {
            comments.insert(number, c);
            if words.is_empty() {
                lines.push(Line { number, words });
                continue;
            }
        }

        let mut current: Vec<String> = Vec::new();
        for word in words {
            if word == "end" {
                if !current.is_empty() {
                    lines.push(Line { number, words: std::mem::take(&mut current) });
                }
                lines.push(Line { number, words: vec![word] });
            } else {
                let closes = word == "do";
                current.push(word);
                if closes {
                    lines.push(Line { number, words: std::mem::take(&mut current) });
                }
            }
        }
        if !current.is_empty() {
            lines.push(Line { number, words: current });
        }
    }
    (lines, comments)
}

/// Splits at the first `#` outside double quotes.
fn split_comment(raw: &str) -> (&str, Option<String>) {
    let mut in_quote = false;
    for (i, c) in raw.char_indices() {
        match c {
            '"' => in_quote = !in_quote,
            '#' if !in_quote => return (&raw[..i], Some(raw[i + 1..].trim().to_string())),
            _ => {}
        }
    }
    (raw, None)
}

/// Whitespace split, re-joining quoted multi-word strings with single spaces.
/// An unterminated quote runs to the end of the line.
pub fn split_words(code: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut buffer: Option<Vec<&str>> = None;

    for tok in code.split_whitespace() {
        match buffer.as_mut() {
            Some(buf) => {
                buf.push(tok);
                if tok.ends_with('"') {
                    words.push(buf.join(" "));
                    buffer = None;
                }
            }
            None if tok.starts_with('"') => {
                if tok.len() > 1 && tok.ends_with('"') {
                    words.push(tok.to_string());
                } else {
                    buffer = Some(vec![tok]);
                }
            }
            None => words.push(tok.to_string()),
        }
    }
    if let Some(buf) = buffer {
        words.push(buf.join(" "));
    }
    words
}

// ─── Blocks ──────────────────────────────────────────────────────────────────

struct BlockParser {
    queue: VecDeque<Line>,
    depth: usize,
}

impl BlockParser {
    /// Parses lines until the `end` matching `opener`, or to end of input for
    /// the top level.
    fn parse_block(&mut self, opener: Option<&Line>) -> Result<Vec<Node>, Error> {
        if let Some(line) = opener {
            if self.depth >= MAX_BLOCK_DEPTH {
                return Err(Error::new(ErrorCode::P006, line.number,
                    format!("blocks nested deeper than {MAX_BLOCK_DEPTH} levels")));
            }
        }
        self.depth += 1;
        let body = self.parse_lines(opener);
        self.depth -= 1;
        body
    }

    fn parse_lines(&mut self, opener: Option<&Line>) -> Result<Vec<Node>, Error> {
        let mut body = Vec::new();

        while let Some(line) = self.queue.pop_front() {
            let Some(head) = line.words.first() else {
                body.push(Node::new(NodeKind::Empty, "", line.number));
                continue;
            };

            match head.as_str() {
                "end" => {
                    return match opener {
                        Some(_) => Ok(body),
                        None => Err(Error::new(ErrorCode::P003, line.number,
                            "`end` without a matching `do`")),
                    };
                }
                "for" | "loop" => {
                    let count = header(&line)?.join(" ");
                    let children = self.parse_block(Some(&line))?;
                    body.push(Node::new(NodeKind::Loop, count, line.number).with_children(children));
                }
                "when" => {
                    let guard = header(&line)?.join(" ");
                    let children = self.parse_block(Some(&line))?;
                    body.push(Node::new(NodeKind::When, guard, line.number).with_children(children));
                }
                "draw" | "def" => {
                    let signature = header(&line)?.join(" ").replace(['(', ')', ','], " ");
                    let mut names = signature.split_whitespace();
                    let name = names.next().unwrap_or_default().to_string();
                    let params = names
                        .map(|p| Node::new(NodeKind::Argument, p, line.number))
                        .collect();
                    let children = self.parse_block(Some(&line))?;
                    let mut node = Node::new(NodeKind::Define, name, line.number).with_children(children);
                    node.meta.args = params;
                    body.push(node);
                }
                other if line.words.len() > 1 && line.words.last().is_some_and(|w| w == "do") => {
                    return Err(Error::new(ErrorCode::P005, line.number,
                        format!("`{other}` cannot open a block")));
                }
                name => {
                    let args = line.words[1..].iter()
                        .map(|w| Node::new(NodeKind::Argument, argument_text(w), line.number))
                        .collect();
                    body.push(Node::new(NodeKind::Call, name, line.number).with_children(args));
                }
            }
        }

        match opener {
            Some(line) => Err(Error::new(ErrorCode::P001, line.number,
                format!("`{}` block is never closed with `end`", line.words[0]))),
            None => Ok(body),
        }
    }
}

/// Words between the block keyword and the trailing `do`.
fn header(line: &Line) -> Result<&[String], Error> {
    let keyword = &line.words[0];
    if line.words.len() < 2 || line.words[line.words.len() - 1] != "do" {
        return Err(Error::new(ErrorCode::P002, line.number,
            format!("`{keyword}` line must end with `do`")));
    }
    let inner = &line.words[1..line.words.len() - 1];
    if inner.is_empty() {
        return Err(Error::new(ErrorCode::P004, line.number,
            format!("`{keyword}` needs something between `{keyword}` and `do`")));
    }
    Ok(inner)
}

/// Unquoted words lose a trailing comma, so `goto 10, 20` reads as two numbers.
fn argument_text(word: &str) -> &str {
    if word.starts_with('"') { word } else { word.strip_suffix(',').unwrap_or(word) }
}

// ─── Annotation ──────────────────────────────────────────────────────────────

/// Gives the first node parsed from each commented line its comment text.
fn annotate(nodes: &mut [Node], comments: &HashMap<usize, String>, seen: &mut HashSet<usize>) {
    for node in nodes {
        if let Some(c) = comments.get(&node.meta.line) {
            if seen.insert(node.meta.line) {
                node.meta.lit = Some(c.clone());
            }
        }
        annotate(&mut node.children, comments, seen);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Vec<Node> {
        parse_program(src).expect("parse failed")
    }

    fn parse_err(src: &str) -> Error {
        parse_program(src).expect_err("expected parse error")
    }

    #[test]
    fn blank_lines_are_dropped() {
        let p = parse("fw 10\n\n   \nrt 90");
        assert_eq!(p.len(), 2);
        assert_eq!(p[1].value, "rt");
        assert_eq!(p[1].line(), 4);
    }

    #[test]
    fn call_arguments() {
        let p = parse("goto 10, 20 -5");
        assert_eq!(p[0].kind, NodeKind::Call);
        let args: Vec<_> = p[0].children.iter().map(|a| a.value.as_str()).collect();
        assert_eq!(args, ["10", "20", "-5"]);
    }

    #[test]
    fn quoted_words_are_merged() {
        assert_eq!(split_words(r#"label "hello   big world" 12"#), [
            "label", r#""hello big world""#, "12",
        ]);
        assert_eq!(split_words(r#"label "one" "two""#), ["label", r#""one""#, r#""two""#]);
    }

    #[test]
    fn unterminated_quote_is_flushed() {
        assert_eq!(split_words(r#"label "never closed"#), ["label", r#""never closed"#]);
    }

    #[test]
    fn comments_split_outside_quotes() {
        assert_eq!(
            split_comment(r##"color "#ff0000" # red"##),
            (r##"color "#ff0000" "##, Some("red".to_string()))
        );
        assert_eq!(split_comment("fw 10"), ("fw 10", None));
    }

    #[test]
    fn loop_block() {
        let p = parse("for 4 do\n  fw 10\n  rt 90\nend");
        assert_eq!(p.len(), 1);
        assert_eq!(p[0].kind, NodeKind::Loop);
        assert_eq!(p[0].value, "4");
        assert_eq!(p[0].children.len(), 2);
    }

    #[test]
    fn one_line_blocks() {
        let p = parse("for 3 do fw 1 end\nloop n + 1 do rt 5 end");
        assert_eq!(p.len(), 2);
        assert_eq!(p[0].children[0].value, "fw");
        assert_eq!(p[1].value, "n + 1");
    }

    #[test]
    fn define_block_with_parameters() {
        let p = parse("draw square size n do\n for n do fw size\n rt 90 end\nend");
        assert_eq!(p[0].kind, NodeKind::Define);
        assert_eq!(p[0].value, "square");
        assert_eq!(p[0].params().collect::<Vec<_>>(), ["size", "n"]);
        assert_eq!(p[0].children[0].kind, NodeKind::Loop);
    }

    #[test]
    fn define_accepts_parenthesised_parameters() {
        let p = parse("def tri(a, b) do\nend");
        assert_eq!(p[0].value, "tri");
        assert_eq!(p[0].params().collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn when_block() {
        let p = parse("when x > 1 do\n fw x\nend");
        assert_eq!(p[0].kind, NodeKind::When);
        assert_eq!(p[0].value, "x > 1");
    }

    #[test]
    fn comment_only_line_is_empty_node() {
        let p = parse("# heading\nfw 1 # step");
        assert_eq!(p[0].kind, NodeKind::Empty);
        assert_eq!(p[0].meta.lit.as_deref(), Some("heading"));
        assert_eq!(p[1].meta.lit.as_deref(), Some("step"));
    }

    #[test]
    fn missing_end_is_fatal() {
        let e = parse_err("for 2 do\n fw 1");
        assert_eq!(e.code, ErrorCode::P001);
        assert_eq!(e.line, 1);
    }

    #[test]
    fn stray_end_is_fatal() {
        assert_eq!(parse_err("fw 1\nend").code, ErrorCode::P003);
    }

    #[test]
    fn missing_do_is_fatal() {
        assert_eq!(parse_err("for 3\nfw 1\nend").code, ErrorCode::P002);
        assert_eq!(parse_err("when do\nend").code, ErrorCode::P004);
        assert_eq!(parse_err("draw do\nend").code, ErrorCode::P004);
    }

    #[test]
    fn unknown_block_keyword() {
        assert_eq!(parse_err("repeat 3 do\nend").code, ErrorCode::P005);
    }

    #[test]
    fn deeply_nested_blocks_are_rejected() {
        let src = "for 1 do\n".repeat(100_000);
        let e = parse_err(&src);
        assert_eq!(e.code, ErrorCode::P006);
        assert_eq!(e.line, MAX_BLOCK_DEPTH);

        let ok = format!("{}fw 1\n{}", "for 1 do\n".repeat(50), "end\n".repeat(50));
        assert_eq!(parse(&ok).len(), 1);
    }

    #[test]
    fn quoted_end_is_not_a_keyword() {
        let p = parse(r#"label "the end""#);
        assert_eq!(p[0].children[0].value, r#""the end""#);
    }
}
