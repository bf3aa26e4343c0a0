//! Tree-sitter parsing and syntax tree walks for TypeScript sources

use std::path::Path;

use tree_sitter::{Language, Node, Parser, Tree};

use crate::core::{ExplorerError, Result, ANONYMOUS_CLASS_NAME};

/// Tree-sitter node kinds used by the walks below
pub mod node_kinds {
    pub const CLASS_DECLARATION: &str = "class_declaration";
    pub const ABSTRACT_CLASS_DECLARATION: &str = "abstract_class_declaration";
    pub const CLASS: &str = "class";
    pub const EXPORT_STATEMENT: &str = "export_statement";
    pub const IMPORT_STATEMENT: &str = "import_statement";
    pub const DEFAULT: &str = "default";
}

/// Parsers for the two TypeScript grammars
pub struct SourceParser {
    typescript: Parser,
    tsx: Parser,
}

impl SourceParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            typescript: parser_for(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(), "typescript")?,
            tsx: parser_for(tree_sitter_typescript::LANGUAGE_TSX.into(), "tsx")?,
        })
    }

    /// Parse `text`, choosing the grammar from the file extension
    pub fn parse(&mut self, path: &Path, text: &str) -> Result<Tree> {
        let parser = if uses_tsx_grammar(path) {
            &mut self.tsx
        } else {
            &mut self.typescript
        };
        parser
            .parse(text, None)
            .ok_or_else(|| ExplorerError::parse_or_compile(path, "parser produced no syntax tree"))
    }
}

fn parser_for(language: Language, grammar: &str) -> Result<Parser> {
    let mut parser = Parser::new();
    parser.set_language(&language).map_err(|e| {
        ExplorerError::parse_or_compile(grammar, format!("cannot load grammar: {}", e))
    })?;
    Ok(parser)
}

/// `.tsx` and `.jsx` need the TSX grammar for their markup
pub fn uses_tsx_grammar(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("tsx") | Some("jsx")
    )
}

fn node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or_default()
}

fn children<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

fn is_default_export(node: &Node) -> bool {
    node.kind() == node_kinds::EXPORT_STATEMENT
        && children(node)
            .iter()
            .any(|child| child.kind() == node_kinds::DEFAULT)
}

/// Name of the class declared by `node`, if it declares one
fn declared_class_name(node: &Node, source: &str) -> Option<String> {
    let declares = match node.kind() {
        node_kinds::CLASS_DECLARATION | node_kinds::ABSTRACT_CLASS_DECLARATION => true,
        // `export default class {}` is a declaration, other class expressions are not
        node_kinds::CLASS => node.parent().is_some_and(|parent| is_default_export(&parent)),
        _ => false,
    };
    if !declares {
        return None;
    }

    let name = node
        .child_by_field_name("name")
        .map(|name| node_text(&name, source))
        .filter(|name| !name.is_empty())
        .unwrap_or(ANONYMOUS_CLASS_NAME);
    Some(name.to_string())
}

/// Names of every class declared in the tree, in source order
pub fn collect_class_names(tree: &Tree, source: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut stack = vec![tree.root_node()];

    while let Some(node) = stack.pop() {
        if let Some(name) = declared_class_name(&node, source) {
            names.push(name);
        }
        stack.extend(children(&node).into_iter().rev());
    }

    names
}

/// Module specifiers named by top-level `import` and `export ... from`
pub fn module_specifiers(tree: &Tree, source: &str) -> Vec<String> {
    children(&tree.root_node())
        .iter()
        .filter(|node| {
            matches!(
                node.kind(),
                node_kinds::IMPORT_STATEMENT | node_kinds::EXPORT_STATEMENT
            )
        })
        .filter_map(|node| node.child_by_field_name("source"))
        .map(|spec| {
            node_text(&spec, source)
                .trim_matches(|c| c == '"' || c == '\'')
                .to_string()
        })
        .filter(|spec| !spec.is_empty())
        .collect()
}

/// Whether the tree contains syntax errors
pub fn has_syntax_errors(tree: &Tree) -> bool {
    tree.root_node().has_error()
}
