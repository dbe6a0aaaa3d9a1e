//! Template rendering
//!
//! A small, logic-light template language used to instantiate the built-in
//! test templates:
//!
//! ```text
//! {{name}}                          substitute a value
//! {{#each items}} … {{/each}}       repeat for every element of a sequence
//! {{#if flag}} … {{/if}}            keep when the value is truthy
//! {{#unless flag}} … {{/unless}}    keep when the value is falsy
//! {{kebabCase name}}                apply a named string transform
//! ```
//!
//! Templates are tokenized and parsed into a tree before anything is
//! evaluated, so syntax problems are always reported up front and rendering
//! itself cannot fail.

mod context;
mod eval;
mod helpers;
mod lexer;
mod parser;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::SyntaxError;
use lexer::Token;
use parser::Node;

pub use context::RenderContext;
pub use eval::{is_truthy, stringify, SEQUENCE_SEPARATOR};
pub use helpers::{camel_case, kebab_case, pascal_case, Helper};

/// Name bound to the current element inside an `each` block
pub const CURRENT_ITEM: &str = "this";

/// Block constructs of the template language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Each,
    If,
    Unless,
}

impl BlockKind {
    pub const ALL: [BlockKind; 3] = [BlockKind::Each, BlockKind::If, BlockKind::Unless];

    pub fn keyword(&self) -> &'static str {
        match self {
            BlockKind::Each => "each",
            BlockKind::If => "if",
            BlockKind::Unless => "unless",
        }
    }

    fn from_keyword(keyword: &str) -> Option<Self> {
        BlockKind::ALL.into_iter().find(|k| k.keyword() == keyword)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// A parsed template, ready to be rendered any number of times
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    nodes: Vec<Node>,
}

impl Template {
    /// Check syntax and build the syntax tree
    pub fn compile(source: &str) -> Result<Self, SyntaxError> {
        let tokens = lexer::tokenize(source);
        parser::check_balance(&tokens)?;
        let nodes = parser::parse(&tokens)?;
        Ok(Self { nodes })
    }

    /// Render against a context; deterministic for identical inputs
    pub fn render(&self, context: &RenderContext) -> String {
        let mut out = String::new();
        let mut scope = eval::Scope::new(context.as_map());
        eval::evaluate(&self.nodes, &mut scope, &mut out);
        out
    }
}

/// Validate then render a template in one call
pub fn render(template: &str, context: &RenderContext) -> Result<String, SyntaxError> {
    Ok(Template::compile(template)?.render(context))
}

/// Report tag imbalance or misnesting without rendering anything
pub fn validate_syntax(template: &str) -> Result<(), SyntaxError> {
    Template::compile(template).map(|_| ())
}

/// Every name referenced by any construct, found by scanning the text only
pub fn extract_variables(template: &str) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    for token in lexer::tokenize(template) {
        let name = match token {
            Token::Variable(name) => name,
            Token::Open { name, .. } if !name.is_empty() => name,
            Token::Pair { first, second, .. } if Helper::from_name(first).is_some() => second,
            _ => continue,
        };
        let is_current_item = name
            .split('.')
            .next()
            .is_some_and(|head| head == CURRENT_ITEM);
        if !is_current_item {
            names.insert(name.to_string());
        }
    }
    names
}
