// Email template engine
//
// Three constructs over plain text:
//   {{ name }}                          placeholder substitution
//   {% if field %}...{% else %}...{% endif %}   conditional section
//   {% for item in seq %}...{% endfor %}  repeated section
//
// Variables are JSON values. A `{{ }}` reference to a missing variable is a
// render error (fatal for that one draft); a missing `if` guard is simply
// falsy. Rendering is deterministic: identical inputs produce byte-identical
// output.
//
// Block tags consume the newline that follows them and any indentation that
// precedes them, so tag lines leave no blank lines behind.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TemplateError {
    #[error("unknown variable `{0}`")]
    UnknownVariable(String),

    #[error("`{0}` is not a sequence")]
    NotASequence(String),

    #[error("malformed tag `{0}`")]
    MalformedTag(String),

    #[error("unexpected `{0}` tag")]
    UnexpectedTag(String),

    #[error("unterminated `{0}` block")]
    Unterminated(String),
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    Var(String),
    If {
        guard: String,
        then_body: Vec<Node>,
        else_body: Vec<Node>,
    },
    For {
        binding: String,
        sequence: String,
        body: Vec<Node>,
    },
}

#[derive(Debug, Clone)]
enum Token {
    Text(String),
    Var(String),
    Tag(String),
}

/// A parsed template, ready to render any number of times.
#[derive(Debug, Clone)]
pub struct Template {
    nodes: Vec<Node>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let tokens = tokenize(source)?;
        let mut position = 0;
        let nodes = parse_nodes(&tokens, &mut position, None)?;
        Ok(Self { nodes })
    }

    pub fn render(&self, vars: &Map<String, Value>) -> Result<String, TemplateError> {
        let mut output = String::new();
        let mut locals = Vec::new();
        render_nodes(&self.nodes, vars, &mut locals, &mut output)?;
        Ok(output)
    }
}

fn tokenize(source: &str) -> Result<Vec<Token>, TemplateError> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut rest = source;

    while !rest.is_empty() {
        let var_at = rest.find("{{");
        let tag_at = rest.find("{%");

        let (at, is_tag) = match (var_at, tag_at) {
            (Some(v), Some(t)) if t < v => (t, true),
            (Some(v), _) => (v, false),
            (None, Some(t)) => (t, true),
            (None, None) => {
                text.push_str(rest);
                break;
            }
        };

        text.push_str(&rest[..at]);
        rest = &rest[at..];

        let (open, close) = if is_tag { ("{%", "%}") } else { ("{{", "}}") };
        let Some(end) = rest.find(close) else {
            return Err(TemplateError::MalformedTag(
                rest.chars().take(20).collect::<String>(),
            ));
        };
        if end < open.len() {
            return Err(TemplateError::MalformedTag(open.to_string()));
        }
        let inner = rest[open.len()..end].trim().to_string();
        rest = &rest[end + close.len()..];

        if inner.is_empty() {
            return Err(TemplateError::MalformedTag(open.to_string()));
        }

        if is_tag {
            // Tags on their own line disappear entirely: strip the
            // indentation before the tag and the newline after it.
            strip_line_indent(&mut text);
            if let Some(stripped) = rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix("\n")) {
                rest = stripped;
            }
            flush_text(&mut tokens, &mut text);
            tokens.push(Token::Tag(inner));
        } else {
            flush_text(&mut tokens, &mut text);
            tokens.push(Token::Var(inner));
        }
    }

    flush_text(&mut tokens, &mut text);
    Ok(tokens)
}

fn flush_text(tokens: &mut Vec<Token>, text: &mut String) {
    if !text.is_empty() {
        tokens.push(Token::Text(std::mem::take(text)));
    }
}

// Remove trailing spaces/tabs back to the start of the current line.
fn strip_line_indent(text: &mut String) {
    let trailing_ws = text
        .chars()
        .rev()
        .take_while(|c| *c == ' ' || *c == '\t')
        .count();
    if trailing_ws == 0 {
        return;
    }
    let cut = text.len() - trailing_ws;
    let at_line_start = cut == 0 || text[..cut].ends_with('\n');
    if at_line_start {
        text.truncate(cut);
    }
}

/// Parse nodes until one of the closing tags for the enclosing block (or
/// end of input at the top level). Returns with `position` past the
/// consumed closing tag; the closing tag's word is left for the caller via
/// the return value.
fn parse_nodes(
    tokens: &[Token],
    position: &mut usize,
    enclosing: Option<&str>,
) -> Result<Vec<Node>, TemplateError> {
    let mut nodes = Vec::new();

    while *position < tokens.len() {
        match &tokens[*position] {
            Token::Text(text) => {
                nodes.push(Node::Text(text.clone()));
                *position += 1;
            }
            Token::Var(name) => {
                if name.split_whitespace().count() != 1 {
                    return Err(TemplateError::MalformedTag(name.clone()));
                }
                nodes.push(Node::Var(name.clone()));
                *position += 1;
            }
            Token::Tag(tag) => {
                let words: Vec<&str> = tag.split_whitespace().collect();
                match words.as_slice() {
                    ["if", guard] => {
                        *position += 1;
                        let (then_body, else_body) = parse_if_bodies(tokens, position)?;
                        nodes.push(Node::If {
                            guard: guard.to_string(),
                            then_body,
                            else_body,
                        });
                    }
                    ["for", binding, "in", sequence] => {
                        *position += 1;
                        let body = parse_nodes(tokens, position, Some("for"))?;
                        nodes.push(Node::For {
                            binding: binding.to_string(),
                            sequence: sequence.to_string(),
                            body,
                        });
                    }
                    ["endif"] | ["else"] if enclosing == Some("if") => {
                        // Leave the tag for parse_if_bodies to consume.
                        return Ok(nodes);
                    }
                    ["endfor"] if enclosing == Some("for") => {
                        *position += 1;
                        return Ok(nodes);
                    }
                    ["endif"] | ["endfor"] | ["else"] => {
                        return Err(TemplateError::UnexpectedTag(words[0].to_string()));
                    }
                    _ => return Err(TemplateError::MalformedTag(tag.clone())),
                }
            }
        }
    }

    match enclosing {
        Some(block) => Err(TemplateError::Unterminated(block.to_string())),
        None => Ok(nodes),
    }
}

fn parse_if_bodies(
    tokens: &[Token],
    position: &mut usize,
) -> Result<(Vec<Node>, Vec<Node>), TemplateError> {
    let then_body = parse_nodes(tokens, position, Some("if"))?;

    // parse_nodes stopped at `else` or `endif` (or ran out of tokens).
    let Some(Token::Tag(tag)) = tokens.get(*position) else {
        return Err(TemplateError::Unterminated("if".to_string()));
    };

    match tag.as_str() {
        "endif" => {
            *position += 1;
            Ok((then_body, Vec::new()))
        }
        "else" => {
            *position += 1;
            let else_body = parse_nodes(tokens, position, Some("if"))?;
            let Some(Token::Tag(closing)) = tokens.get(*position) else {
                return Err(TemplateError::Unterminated("if".to_string()));
            };
            if closing != "endif" {
                return Err(TemplateError::UnexpectedTag(closing.clone()));
            }
            *position += 1;
            Ok((then_body, else_body))
        }
        other => Err(TemplateError::UnexpectedTag(other.to_string())),
    }
}

fn render_nodes(
    nodes: &[Node],
    vars: &Map<String, Value>,
    locals: &mut Vec<(String, Value)>,
    output: &mut String,
) -> Result<(), TemplateError> {
    for node in nodes {
        match node {
            Node::Text(text) => output.push_str(text),
            Node::Var(name) => {
                let value = lookup(name, vars, locals)
                    .ok_or_else(|| TemplateError::UnknownVariable(name.clone()))?;
                output.push_str(&value_to_string(&value));
            }
            Node::If {
                guard,
                then_body,
                else_body,
            } => {
                let truthy = lookup(guard, vars, locals)
                    .map(|v| is_truthy(&v))
                    .unwrap_or(false);
                let body = if truthy { then_body } else { else_body };
                render_nodes(body, vars, locals, output)?;
            }
            Node::For {
                binding,
                sequence,
                body,
            } => {
                let value = lookup(sequence, vars, locals)
                    .ok_or_else(|| TemplateError::UnknownVariable(sequence.clone()))?;
                let Value::Array(items) = value else {
                    return Err(TemplateError::NotASequence(sequence.clone()));
                };
                for item in items {
                    locals.push((binding.clone(), item.clone()));
                    let result = render_nodes(body, vars, locals, output);
                    locals.pop();
                    result?;
                }
            }
        }
    }
    Ok(())
}

fn lookup(name: &str, vars: &Map<String, Value>, locals: &[(String, Value)]) -> Option<Value> {
    locals
        .iter()
        .rev()
        .find(|(binding, _)| binding == name)
        .map(|(_, value)| value.clone())
        .or_else(|| vars.get(name).cloned())
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}
