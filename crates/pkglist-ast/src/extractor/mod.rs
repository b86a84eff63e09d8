use anyhow::{anyhow, bail, Context, Result};
use ast_grep_core::source::StrDoc;
use ast_grep_core::{AstGrep, Node};
use ast_grep_language::Python;
use pkglist_manifest::SetupMetadata;
use std::collections::HashMap;
use tracing::debug;

mod literals;


use literals::decode_string_literal;

type PyNode<'r> = Node<'r, StrDoc<Python>>;

/// Identifiers may refer to other identifiers; this bounds how far they are followed.
const MAX_BINDING_DEPTH: usize = 16;

const INSTALL_REQUIRES: &str = "install_requires";
const EXTRAS_REQUIRE: &str = "extras_require";

/// Extract `install_requires` and `extras_require` from the source of a `setup.py`.
pub fn extract_setup_metadata(content: &str) -> Result<SetupMetadata> {
    let sg = AstGrep::new(content, Python);
    let root = sg.root();
    let module = Module::new(&root);

    let call = root
        .find_all("$FUNC($$$ARGS)")
        .find(|call| {
            call.get_env()
                .get_match("$FUNC")
                .is_some_and(|callee| is_setup_callee(&callee.text()))
        })
        .ok_or_else(|| anyhow!("no setup() call found"))?;
    debug!(
        "Found setup call: {}",
        call.text().lines().next().unwrap_or_default()
    );

    let arguments = call
        .get_node()
        .field("arguments")
        .ok_or_else(|| anyhow!("setup() call has no argument list"))?;

    let mut metadata = SetupMetadata::default();
    for argument in arguments.children() {
        match argument.kind().as_ref() {
            "keyword_argument" => module.apply_keyword(&argument, &mut metadata)?,
            "dictionary_splat" => module.apply_splat(&argument, &mut metadata)?,
            _ => {}
        }
    }

    debug!(
        "Extracted {} install_requires and {} extras",
        metadata.install_requires.len(),
        metadata.extras_require.len()
    );
    Ok(metadata)
}

fn is_setup_callee(callee: &str) -> bool {
    callee == "setup" || callee.ends_with(".setup")
}

/// Module-level name bindings, last assignment wins
struct Module<'r> {
    bindings: HashMap<String, PyNode<'r>>,
}

impl<'r> Module<'r> {
    fn new(root: &PyNode<'r>) -> Self {
        let mut bindings = HashMap::new();
        for statement in root.children() {
            if statement.kind() != "expression_statement" {
                continue;
            }
            for assignment in statement.children() {
                if assignment.kind() != "assignment" {
                    continue;
                }
                let (Some(left), Some(right)) = (assignment.field("left"), assignment.field("right"))
                else {
                    continue;
                };
                if left.kind() == "identifier" {
                    bindings.insert(left.text().to_string(), right);
                }
            }
        }
        Module { bindings }
    }

    fn resolve(&self, identifier: &PyNode<'r>, depth: usize) -> Result<&PyNode<'r>> {
        if depth >= MAX_BINDING_DEPTH {
            bail!("`{}` is defined in terms of itself", identifier.text());
        }
        let name = identifier.text();
        self.bindings
            .get(name.as_ref())
            .ok_or_else(|| anyhow!("`{name}` is not assigned at module level"))
    }

    fn apply_keyword(&self, argument: &PyNode<'r>, metadata: &mut SetupMetadata) -> Result<()> {
        let (Some(name), Some(value)) = (argument.field("name"), argument.field("value")) else {
            return Ok(());
        };
        match name.text().as_ref() {
            INSTALL_REQUIRES => {
                metadata.install_requires = self
                    .string_list(&value, 0)
                    .with_context(|| format!("cannot evaluate {INSTALL_REQUIRES}"))?;
            }
            EXTRAS_REQUIRE => {
                metadata.extras_require = self
                    .extras(&value, 0)
                    .with_context(|| format!("cannot evaluate {EXTRAS_REQUIRE}"))?;
            }
            _ => {}
        }
        Ok(())
    }

    /// `setup(**config)` where `config` is a dict literal or `dict(...)` call
    fn apply_splat(&self, argument: &PyNode<'r>, metadata: &mut SetupMetadata) -> Result<()> {
        let Some(value) = argument.children().find(|child| child.is_named()) else {
            return Ok(());
        };
        for (key, value) in self.keyword_pairs(&value, 0)? {
            match key.as_str() {
                INSTALL_REQUIRES => {
                    metadata.install_requires = self
                        .string_list(&value, 0)
                        .with_context(|| format!("cannot evaluate {INSTALL_REQUIRES}"))?;
                }
                EXTRAS_REQUIRE => {
                    metadata.extras_require = self
                        .extras(&value, 0)
                        .with_context(|| format!("cannot evaluate {EXTRAS_REQUIRE}"))?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Evaluate an expression to a list of requirement strings.
    fn string_list(&self, node: &PyNode<'r>, depth: usize) -> Result<Vec<String>> {
        match node.kind().as_ref() {
            "list" | "tuple" => {
                let mut items = Vec::new();
                for element in node.children().filter(|child| child.is_named()) {
                    match element.kind().as_ref() {
                        "comment" => {}
                        "list_splat" => {
                            if let Some(inner) = element.children().find(|child| child.is_named())
                            {
                                items.extend(self.string_list(&inner, depth)?);
                            }
                        }
                        _ => items.push(self.string(&element, depth)?),
                    }
                }
                Ok(items)
            }
            "string" | "concatenated_string" => Ok(self
                .string(node, depth)?
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect()),
            "binary_operator" => {
                let operator = node.field("operator").map(|op| op.text().to_string());
                if operator.as_deref() != Some("+") {
                    bail!("unsupported operator in `{}`", node.text());
                }
                let (Some(left), Some(right)) = (node.field("left"), node.field("right")) else {
                    bail!("incomplete expression `{}`", node.text());
                };
                let mut items = self.string_list(&left, depth)?;
                items.extend(self.string_list(&right, depth)?);
                Ok(items)
            }
            "parenthesized_expression" => match inner_expression(node) {
                Some(inner) => self.string_list(&inner, depth),
                None => Ok(Vec::new()),
            },
            "identifier" => self.string_list(self.resolve(node, depth)?, depth + 1),
            "none" => Ok(Vec::new()),
            _ => bail!("unsupported expression `{}`", node.text()),
        }
    }

    /// Evaluate an expression to a single string.
    fn string(&self, node: &PyNode<'r>, depth: usize) -> Result<String> {
        match node.kind().as_ref() {
            "string" => decode_string_literal(&node.text()),
            "concatenated_string" => node
                .children()
                .filter(|child| child.kind() == "string")
                .map(|child| decode_string_literal(&child.text()))
                .collect(),
            "parenthesized_expression" => match inner_expression(node) {
                Some(inner) => self.string(&inner, depth),
                None => bail!("empty expression"),
            },
            "identifier" => self.string(self.resolve(node, depth)?, depth + 1),
            _ => bail!("expected a string, found `{}`", node.text()),
        }
    }

    /// Evaluate an expression to `(extra, requirements)` pairs in declaration order.
    fn extras(&self, node: &PyNode<'r>, depth: usize) -> Result<Vec<(String, Vec<String>)>> {
        let mut extras: Vec<(String, Vec<String>)> = Vec::new();
        for (name, value) in self.keyword_pairs(node, depth)? {
            let requirements = self
                .string_list(&value, depth)
                .with_context(|| format!("extra `{name}`"))?;
            match extras.iter_mut().find(|(existing, _)| *existing == name) {
                Some((_, existing)) => *existing = requirements,
                None => extras.push((name, requirements)),
            }
        }
        Ok(extras)
    }

    /// Key/value expressions of a dict literal, a `dict(...)` call, or a name bound to either.
    fn keyword_pairs(&self, node: &PyNode<'r>, depth: usize) -> Result<Vec<(String, PyNode<'r>)>> {
        match node.kind().as_ref() {
            "dictionary" => {
                let mut pairs = Vec::new();
                for child in node.children() {
                    match child.kind().as_ref() {
                        "pair" => {
                            let (Some(key), Some(value)) = (child.field("key"), child.field("value"))
                            else {
                                continue;
                            };
                            pairs.push((self.string(&key, depth)?, value));
                        }
                        "dictionary_splat" => {
                            if let Some(inner) = child.children().find(|child| child.is_named()) {
                                pairs.extend(self.keyword_pairs(&inner, depth)?);
                            }
                        }
                        _ => {}
                    }
                }
                Ok(pairs)
            }
            "call" if node.field("function").is_some_and(|f| f.text() == "dict") => {
                let Some(arguments) = node.field("arguments") else {
                    return Ok(Vec::new());
                };
                let mut pairs = Vec::new();
                for argument in arguments.children() {
                    if argument.kind() != "keyword_argument" {
                        continue;
                    }
                    if let (Some(name), Some(value)) =
                        (argument.field("name"), argument.field("value"))
                    {
                        pairs.push((name.text().to_string(), value));
                    }
                }
                Ok(pairs)
            }
            "parenthesized_expression" => match inner_expression(node) {
                Some(inner) => self.keyword_pairs(&inner, depth),
                None => Ok(Vec::new()),
            },
            "identifier" => self.keyword_pairs(self.resolve(node, depth)?, depth + 1),
            "none" => Ok(Vec::new()),
            _ => bail!("expected a dict, found `{}`", node.text()),
        }
    }
}

fn inner_expression<'r>(node: &PyNode<'r>) -> Option<PyNode<'r>> {
    node.children()
        .find(|child| child.is_named() && child.kind() != "comment")
}
