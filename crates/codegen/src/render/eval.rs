//! Single-pass evaluation of a parsed template

use serde_json::{Map, Value};

use super::parser::Node;
use super::{BlockKind, CURRENT_ITEM};

/// Join separator used when a sequence is substituted as a variable
pub const SEQUENCE_SEPARATOR: &str = ", ";

enum Frame<'a> {
    Root(&'a Map<String, Value>),
    Item(&'a Value),
}

/// Lexical scope: the caller's bindings plus one frame per enclosing `each`
pub(crate) struct Scope<'a> {
    frames: Vec<Frame<'a>>,
}

impl<'a> Scope<'a> {
    pub(crate) fn new(root: &'a Map<String, Value>) -> Self {
        Self {
            frames: vec![Frame::Root(root)],
        }
    }

    /// Resolve a possibly dotted name; inner frames shadow outer ones
    fn lookup(&self, path: &str) -> Option<&'a Value> {
        let mut segments = path.split('.');
        let head = segments.next()?;

        let mut value = if head == CURRENT_ITEM {
            self.frames.iter().rev().find_map(|frame| match frame {
                Frame::Item(item) => Some(*item),
                Frame::Root(_) => None,
            })?
        } else {
            self.frames.iter().rev().find_map(|frame| {
                let map = match *frame {
                    Frame::Root(map) => map,
                    Frame::Item(Value::Object(map)) => map,
                    Frame::Item(_) => return None,
                };
                map.get(head)
            })?
        };

        for segment in segments {
            value = match value {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(value)
    }
}

pub(crate) fn evaluate(nodes: &[Node], scope: &mut Scope<'_>, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Variable(name) => {
                if let Some(value) = scope.lookup(name) {
                    out.push_str(&stringify(value));
                }
            }
            Node::Helper { helper, name } => {
                if let Some(value) = scope.lookup(name) {
                    out.push_str(&helper.apply(&stringify(value)));
                }
            }
            Node::Block { kind, name, body } => match kind {
                BlockKind::If => {
                    if is_truthy(scope.lookup(name)) {
                        evaluate(body, scope, out);
                    }
                }
                BlockKind::Unless => {
                    if !is_truthy(scope.lookup(name)) {
                        evaluate(body, scope, out);
                    }
                }
                BlockKind::Each => {
                    if let Some(Value::Array(items)) = scope.lookup(name) {
                        for item in items {
                            scope.frames.push(Frame::Item(item));
                            evaluate(body, scope, out);
                            scope.frames.pop();
                        }
                    }
                }
            },
        }
    }
}

/// Natural string form of a value; null renders as nothing
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(stringify)
            .collect::<Vec<_>>()
            .join(SEQUENCE_SEPARATOR),
        // serde_json keeps object keys sorted, so this form is canonical
        Value::Object(_) => value.to_string(),
    }
}

/// Missing, null, false, "" and [] are falsy; everything else is truthy
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Number(_)) | Some(Value::Object(_)) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(json!(null), false)]
    #[test_case(json!(false), false)]
    #[test_case(json!(""), false)]
    #[test_case(json!([]), false)]
    #[test_case(json!(0), true)]
    #[test_case(json!({}), true)]
    #[test_case(json!(" "), true)]
    #[test_case(json!([0]), true)]
    fn test_truthiness(value: Value, expected: bool) {
        assert_eq!(is_truthy(Some(&value)), expected);
    }

    #[test]
    fn test_missing_is_falsy() {
        assert!(!is_truthy(None));
    }

    #[test_case(json!(3), "3")]
    #[test_case(json!(2.5), "2.5")]
    #[test_case(json!(true), "true")]
    #[test_case(json!(["a", 1, null]), "a, 1, ")]
    #[test_case(json!({"b": 1, "a": [2]}), r#"{"a":[2],"b":1}"#)]
    fn test_stringify(value: Value, expected: &str) {
        assert_eq!(stringify(&value), expected);
    }

    #[test]
    fn test_lookup_walks_dotted_paths_and_indices() {
        let root = json!({"user": {"emails": ["a@x", "b@x"]}});
        let map = root.as_object().unwrap();
        let scope = Scope::new(map);
        assert_eq!(scope.lookup("user.emails.1"), Some(&json!("b@x")));
        assert_eq!(scope.lookup("user.name"), None);
        assert_eq!(scope.lookup("this"), None);
    }
}
