use crate::matcher::MatchChain;
use crate::router::{ActionError, ActionOrigin, Context};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// Run the actions of the chain, root to leaf.
/// At each node, the flag actions (in declaration order) run before the command action.
/// The first error stops the walk.
pub(crate) fn execute(chain: &MatchChain<'_>, ctx: &mut Context) -> Result<(), ActionError> {
    for node in chain.nodes() {
        for flag_type in node.flags() {
            let action = match flag_type.action() {
                Some(action) => action,
                None => continue,
            };
            // Only flags that resolved to a value are acted on.
            let value = match ctx.flags().known().get(flag_type.key()) {
                Some(value) => value.clone(),
                None => continue,
            };

            #[cfg(feature = "tracing_debug")]
            {
                debug!("Invoking flag action '{}' = '{value}'.", flag_type.key());
            }

            action(&value, ctx)
                .map_err(|source| ActionError::new(ActionOrigin::Flag(flag_type.key().clone()), source))?;
        }

        if let Some(action) = node.action() {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Invoking command action '{}'.", node.name());
            }

            action(ctx).map_err(|source| {
                ActionError::new(ActionOrigin::Command(node.name().to_string()), source)
            })?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{ActionResult, FlagType, ProcessedFlags};
    use crate::matcher::{match_path, CommandNode};
    use crate::model::{FlagKey, PathPattern, Segment};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    fn flag(log: &Log, name: &str, fail: bool) -> FlagType {
        let mut flag_type = FlagType::new(FlagKey::new("option", name), None);
        let log = log.clone();
        let message = name.to_string();
        flag_type.set_action(Box::new(move |value: &str, _: &mut Context| -> ActionResult {
            if fail {
                return Err(format!("bad {message}").into());
            }

            log.lock().unwrap().push(format!("{message}={value}"));
            Ok(())
        }));
        flag_type
    }

    fn node(
        log: &Log,
        name: &str,
        flags: Vec<FlagType>,
        children: Vec<CommandNode>,
        fail: bool,
    ) -> CommandNode {
        let log = log.clone();
        let message = name.to_string();
        let segments = if name == "app" {
            Vec::default()
        } else {
            vec![Segment::Literal(name.to_string())]
        };
        CommandNode::new(
            name,
            PathPattern::new(segments),
            None,
            children,
            flags,
            Some(Box::new(move |_: &mut Context| -> ActionResult {
                if fail {
                    return Err(format!("bad {message}").into());
                }

                log.lock().unwrap().push(message.clone());
                Ok(())
            })),
        )
    }

    fn context(known: &[(&str, &str)]) -> Context {
        Context::new(
            Vec::default(),
            ProcessedFlags::new(
                known
                    .iter()
                    .map(|(k, v)| (FlagKey::new("option", *k), v.to_string()))
                    .collect(),
                HashMap::default(),
            ),
        )
    }

    fn strings(path: &[&str]) -> Vec<String> {
        path.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn order() {
        let log = Log::default();
        let leaf = node(&log, "leaf", vec![flag(&log, "inner", false)], Vec::default(), false);
        let root = node(
            &log,
            "app",
            vec![flag(&log, "outer", false), flag(&log, "absent", false)],
            vec![leaf],
            false,
        );
        let chain = match_path(&root, &strings(&["leaf"])).unwrap();
        let mut ctx = context(&[("inner", "i"), ("outer", "o")]);

        execute(&chain, &mut ctx).unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            strings(&["outer=o", "app", "inner=i", "leaf"])
        );
    }

    #[test]
    fn flag_failure_stops() {
        let log = Log::default();
        let leaf = node(&log, "leaf", vec![flag(&log, "inner", true)], Vec::default(), false);
        let root = node(&log, "app", vec![flag(&log, "outer", false)], vec![leaf], false);
        let chain = match_path(&root, &strings(&["leaf"])).unwrap();
        let mut ctx = context(&[("inner", "i"), ("outer", "o")]);

        let error = execute(&chain, &mut ctx).unwrap_err();

        assert_eq!(error.to_string(), "bad inner");
        assert_matches!(error.origin(), ActionOrigin::Flag(key) if key == &FlagKey::new("option", "inner"));
        assert_eq!(*log.lock().unwrap(), strings(&["outer=o", "app"]));
    }

    #[test]
    fn command_failure_stops() {
        let log = Log::default();
        let leaf = node(&log, "leaf", vec![flag(&log, "inner", false)], Vec::default(), false);
        let root = node(&log, "app", Vec::default(), vec![leaf], true);
        let chain = match_path(&root, &strings(&["leaf"])).unwrap();
        let mut ctx = context(&[("inner", "i")]);

        let error = execute(&chain, &mut ctx).unwrap_err();

        assert_eq!(error.to_string(), "bad app");
        assert_matches!(error.origin(), ActionOrigin::Command(name) if name == "app");
        assert!(log.lock().unwrap().is_empty());
    }
}
