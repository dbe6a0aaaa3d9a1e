//! Token stream to syntax tree

use std::collections::BTreeMap;

use super::helpers::Helper;
use super::lexer::Token;
use super::BlockKind;
use crate::error::SyntaxError;

/// A node of a parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Variable(String),
    Helper { helper: Helper, name: String },
    Block {
        kind: BlockKind,
        name: String,
        body: Vec<Node>,
    },
}

/// Compare open and close tag counts for every block construct
pub fn check_balance(tokens: &[Token<'_>]) -> Result<(), SyntaxError> {
    let mut counts: BTreeMap<BlockKind, (usize, usize)> = BTreeMap::new();
    for token in tokens {
        match token {
            Token::Open { kind, .. } => counts.entry(*kind).or_default().0 += 1,
            Token::Close { kind, .. } => counts.entry(*kind).or_default().1 += 1,
            _ => {}
        }
    }

    for kind in BlockKind::ALL {
        let (opened, closed) = counts.get(&kind).copied().unwrap_or_default();
        if opened != closed {
            return Err(SyntaxError::Unbalanced {
                construct: kind,
                opened,
                closed,
            });
        }
    }
    Ok(())
}

struct OpenBlock {
    kind: BlockKind,
    name: String,
    offset: usize,
    body: Vec<Node>,
}

/// Build the syntax tree, reporting misnested or nameless blocks
pub fn parse(tokens: &[Token<'_>]) -> Result<Vec<Node>, SyntaxError> {
    let mut root: Vec<Node> = Vec::new();
    let mut stack: Vec<OpenBlock> = Vec::new();

    for token in tokens {
        let node = match token {
            Token::Text(text) => Node::Text((*text).to_string()),
            Token::Variable(name) => Node::Variable((*name).to_string()),
            Token::Pair { first, second, raw } => match Helper::from_name(first) {
                Some(helper) => Node::Helper {
                    helper,
                    name: (*second).to_string(),
                },
                None => Node::Text((*raw).to_string()),
            },
            Token::Open { kind, name, offset } => {
                if name.is_empty() {
                    return Err(SyntaxError::MissingName {
                        construct: *kind,
                        offset: *offset,
                    });
                }
                stack.push(OpenBlock {
                    kind: *kind,
                    name: (*name).to_string(),
                    offset: *offset,
                    body: Vec::new(),
                });
                continue;
            }
            Token::Close { kind, offset } => {
                let open = stack.pop().ok_or(SyntaxError::UnexpectedClose {
                    construct: *kind,
                    offset: *offset,
                })?;
                if open.kind != *kind {
                    return Err(SyntaxError::Misnested {
                        expected: open.kind,
                        found: *kind,
                        offset: *offset,
                    });
                }
                Node::Block {
                    kind: open.kind,
                    name: open.name,
                    body: open.body,
                }
            }
        };

        match stack.last_mut() {
            Some(open) => push_node(&mut open.body, node),
            None => push_node(&mut root, node),
        }
    }

    if let Some(open) = stack.pop() {
        return Err(SyntaxError::Unclosed {
            construct: open.kind,
            offset: open.offset,
        });
    }

    Ok(root)
}

// Adjacent literal runs are merged so evaluation appends fewer pieces.
fn push_node(nodes: &mut Vec<Node>, node: Node) {
    if let (Some(Node::Text(prev)), Node::Text(text)) = (nodes.last_mut(), &node) {
        prev.push_str(text);
        return;
    }
    nodes.push(node);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::lexer::tokenize;

    fn parse_str(source: &str) -> Result<Vec<Node>, SyntaxError> {
        let tokens = tokenize(source);
        check_balance(&tokens)?;
        parse(&tokens)
    }

    #[test]
    fn test_nested_blocks_build_a_tree() {
        let nodes = parse_str("{{#each rows}}{{#if on}}{{label}}{{/if}}{{/each}}").unwrap();
        assert_eq!(
            nodes,
            vec![Node::Block {
                kind: BlockKind::Each,
                name: "rows".to_string(),
                body: vec![Node::Block {
                    kind: BlockKind::If,
                    name: "on".to_string(),
                    body: vec![Node::Variable("label".to_string())],
                }],
            }]
        );
    }

    #[test]
    fn test_unknown_pair_becomes_text() {
        let nodes = parse_str("a {{shout name}} b").unwrap();
        assert_eq!(nodes, vec![Node::Text("a {{shout name}} b".to_string())]);
    }

    #[test]
    fn test_unmatched_if_reports_counts() {
        let err = parse_str("{{#if x}}open").unwrap_err();
        assert_eq!(
            err,
            SyntaxError::Unbalanced {
                construct: BlockKind::If,
                opened: 1,
                closed: 0,
            }
        );
    }

    #[test]
    fn test_interleaved_blocks_are_misnested() {
        let err = parse_str("{{#if a}}{{#each b}}{{/if}}{{/each}}").unwrap_err();
        assert_eq!(
            err,
            SyntaxError::Misnested {
                expected: BlockKind::Each,
                found: BlockKind::If,
                offset: 20,
            }
        );
    }

    #[test]
    fn test_close_before_open() {
        let err = parse_str("{{/unless}}{{#unless a}}").unwrap_err();
        assert!(matches!(err, SyntaxError::UnexpectedClose { construct: BlockKind::Unless, offset: 0 }));
    }

    #[test]
    fn test_nameless_block() {
        let err = parse_str("{{#each}}{{/each}}").unwrap_err();
        assert!(matches!(err, SyntaxError::MissingName { construct: BlockKind::Each, .. }));
    }
}
