use std::fmt;
use thiserror::Error;

use crate::flags::{ActionResult, FlagType};
use crate::model::{FlagKey, PathPattern, Segment};
use crate::router::Context;

pub(crate) type CommandAction = Box<dyn Fn(&mut Context) -> ActionResult + Send + Sync>;

/// One node of the command tree.
///
/// The root node has an empty path; every other node's path is relative to its parent.
/// Nodes are built once by [`crate::CommandLineRouter::build`] and only read afterwards.
pub struct CommandNode {
    name: String,
    pattern: PathPattern,
    description: Option<String>,
    children: Vec<CommandNode>,
    flags: Vec<FlagType>,
    action: Option<CommandAction>,
}

impl fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandNode")
            .field("name", &self.name)
            .field("pattern", &self.pattern)
            .field("children", &self.children)
            .field("flags", &self.flags)
            .field("action", &self.action.is_some())
            .finish()
    }
}

impl CommandNode {
    pub(crate) fn new(
        name: impl Into<String>,
        pattern: PathPattern,
        description: Option<String>,
        children: Vec<CommandNode>,
        flags: Vec<FlagType>,
        action: Option<CommandAction>,
    ) -> Self {
        Self {
            name: name.into(),
            pattern,
            description,
            children,
            flags,
            action,
        }
    }

    /// The full name of this command, from the program down (ex: `app greet bind {{option:person}}`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The path segments, relative to the parent.
    pub fn path(&self) -> &[Segment] {
        self.pattern.segments()
    }

    /// The command description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The sub-commands, in declaration order.
    pub fn children(&self) -> &[CommandNode] {
        &self.children
    }

    /// The flags declared directly on this command.
    pub fn flags(&self) -> &[FlagType] {
        &self.flags
    }

    /// Whether this command can be executed.
    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }

    pub(crate) fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub(crate) fn action(&self) -> Option<&CommandAction> {
        self.action.as_ref()
    }
}

/// The outcome of matching a command path against the tree.
#[derive(Debug, Default)]
pub(crate) struct MatchChain<'t> {
    nodes: Vec<&'t CommandNode>,
    bindings: Vec<(FlagKey, String)>,
}

impl<'t> MatchChain<'t> {
    pub(crate) fn new(node: &'t CommandNode) -> Self {
        Self {
            nodes: vec![node],
            bindings: Vec::default(),
        }
    }

    /// Place `node` (and its bindings) above this chain.
    pub(crate) fn under(self, node: &'t CommandNode, bindings: Vec<(FlagKey, String)>) -> Self {
        let MatchChain {
            nodes: below_nodes,
            bindings: below_bindings,
        } = self;
        let mut nodes = Vec::with_capacity(below_nodes.len() + 1);
        nodes.push(node);
        nodes.extend(below_nodes);
        let mut all_bindings = bindings;
        all_bindings.extend(below_bindings);

        Self {
            nodes,
            bindings: all_bindings,
        }
    }

    /// Root to leaf.
    pub(crate) fn nodes(&self) -> &[&'t CommandNode] {
        &self.nodes
    }

    /// Bindings in path order.
    pub(crate) fn bindings(&self) -> &[(FlagKey, String)] {
        &self.bindings
    }

    pub(crate) fn leaf(&self) -> Option<&'t CommandNode> {
        self.nodes.last().copied()
    }

    /// Every flag declared from the root down to the leaf.
    pub(crate) fn visible_flags(&self) -> impl Iterator<Item = &'t FlagType> + '_ {
        self.nodes
            .iter()
            .copied()
            .flat_map(|node: &'t CommandNode| node.flags().iter())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum MatchError {
    #[error("Command not found: '{}'.", path.join(" "))]
    CommandNotFound {
        path: Vec<String>,
        remaining: Vec<String>,
    },
}
