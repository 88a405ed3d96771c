use crate::matcher::model::*;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// Match the command path against the tree under `root`.
///
/// Siblings are tried in declaration order, and the first one whose full pattern is admitted is committed to (there is no backtracking).
/// The chain must end on a node with an action.
pub(crate) fn match_path<'t>(
    root: &'t CommandNode,
    path: &[String],
) -> Result<MatchChain<'t>, MatchError> {
    let chain = if path.is_empty() {
        MatchChain::new(root)
    } else {
        descend(root.children(), path)
            .map_err(|remaining| MatchError::CommandNotFound {
                path: path.to_vec(),
                remaining,
            })?
            .under(root, Vec::default())
    };

    match chain.leaf() {
        Some(leaf) if leaf.has_action() => Ok(chain),
        _ => {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Matched a chain without an action for path {path:?}.");
            }

            Err(MatchError::CommandNotFound {
                path: path.to_vec(),
                remaining: Vec::default(),
            })
        }
    }
}

// Err carries the unconsumed path at the level that failed.
fn descend<'t>(siblings: &'t [CommandNode], path: &[String]) -> Result<MatchChain<'t>, Vec<String>> {
    for node in siblings {
        if let Some(bindings) = node.pattern().admit(path) {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Committed to '{}' with bindings {bindings:?}.", node.name());
            }

            let remaining = &path[node.pattern().len()..];
            let below = if remaining.is_empty() {
                MatchChain::default()
            } else {
                descend(node.children(), remaining)?
            };

            return Ok(below.under(node, bindings));
        }
    }

    #[cfg(feature = "tracing_debug")]
    {
        debug!("No command admits {path:?}.");
    }

    Err(path.to_vec())
}
