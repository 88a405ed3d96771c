use cmdroute::{
    validators, ActionOrigin, ActionResult, CommandLineRouter, ConfigError, Context, Flag,
    FlagKey, FlagPrefix, RouteError, Router,
};
use rstest::rstest;
use std::sync::{Arc, Mutex};
use std::thread;

type Log = Arc<Mutex<Vec<String>>>;

fn echo_command(log: &Log, message: &str, error: Option<&str>) -> impl Fn(&mut Context) -> ActionResult {
    let log = log.clone();
    let message = message.to_string();
    let error = error.map(ToString::to_string);
    move |_| {
        if let Some(error) = &error {
            return Err(error.clone().into());
        }

        log.lock().unwrap().push(message.clone());
        Ok(())
    }
}

fn echo_flag(log: &Log, message: &str, error: Option<&str>) -> impl Fn(&str, &mut Context) -> ActionResult {
    let log = log.clone();
    let message = message.to_string();
    let error = error.map(ToString::to_string);
    move |value, _| {
        if let Some(error) = &error {
            return Err(error.clone().into());
        }

        let mut log = log.lock().unwrap();
        log.push(message.clone());
        log.push(value.to_string());
        Ok(())
    }
}

fn dummy_app() -> (Router, Log) {
    let log = Log::default();
    let router = CommandLineRouter::new("test")
        .prefix(FlagPrefix::new("option", "--").shorthand("-"))
        .flag(
            Flag::new("option", "log")
                .default("console")
                .action(echo_flag(&log, "log", None)),
        )
        .command("greet", |greet| {
            greet
                .flag(Flag::new("option", "person p").action(echo_flag(&log, "person", None)))
                .action(echo_command(&log, "greet", None))
                .command("bind {{option:person}}", |bind| {
                    bind.action(echo_command(&log, "bind", None))
                })
                .command("flag", |flag| flag.action(echo_command(&log, "flag", None)))
                .command("bad command", |bad| {
                    bad.action(echo_command(&log, "bind", Some("bad command")))
                })
                .command("bad_flag", |bad_flag| {
                    bad_flag
                        .flag(
                            Flag::new("option", "bad")
                                .action(echo_flag(&log, "bad", Some("bad flag"))),
                        )
                        .action(echo_command(&log, "bad_flag", None))
                })
                .command("default", |default| {
                    default
                        .flag(
                            Flag::new("option", "message")
                                .default("defaultHello")
                                .action(echo_flag(&log, "message", None)),
                        )
                        .action(echo_command(&log, "default", None))
                })
        })
        .build()
        .unwrap();

    (router, log)
}

#[rstest]
#[case(vec!["greet", "bind", "someone"], vec!["log", "console", "person", "someone", "greet", "bind"])]
#[case(vec!["greet", "flag", "--person", "fullName"], vec!["log", "console", "person", "fullName", "greet", "flag"])]
#[case(vec!["greet", "flag", "-p", "shortHand"], vec!["log", "console", "person", "shortHand", "greet", "flag"])]
#[case(vec!["greet", "default"], vec!["log", "console", "greet", "message", "defaultHello", "default"])]
#[case(vec!["greet", "default", "--message", "hello"], vec!["log", "console", "greet", "message", "hello", "default"])]
#[case(vec!["greet", "flag", "--person", "someone", "--log", "file"], vec!["log", "file", "person", "someone", "greet", "flag"])]
#[case(vec!["greet", "flag", "--log", "--person", "someone"], vec!["log", "console", "person", "someone", "greet", "flag"])]
#[case(vec!["--log=file", "greet", "-p=x", "flag"], vec!["log", "file", "person", "x", "greet", "flag"])]
#[case(vec!["greet", "--unknown", "value", "flag"], vec!["log", "console", "greet", "flag"])]
fn app_run(#[case] tokens: Vec<&str>, #[case] expected: Vec<&str>) {
    // Setup
    let (router, log) = dummy_app();

    // Execute
    router.run_tokens(&tokens).unwrap();

    // Verify
    assert_eq!(*log.lock().unwrap(), expected);
}

#[rstest]
#[case(vec!["greet", "bad_flag", "--bad", "bad"], "bad flag")]
#[case(vec!["greet", "bad", "command"], "bad command")]
fn app_run_action_error(#[case] tokens: Vec<&str>, #[case] expected: &str) {
    // Setup
    let (router, log) = dummy_app();

    // Execute
    let error = router.run_tokens(&tokens).unwrap_err();

    // Verify
    assert_eq!(error.to_string(), expected);
    // Outer actions have already run.
    assert_eq!(log.lock().unwrap()[..2], ["log", "console"]);
    match error {
        RouteError::Action(action_error) => match action_error.origin() {
            ActionOrigin::Flag(key) => assert_eq!(key, &FlagKey::new("option", "bad")),
            ActionOrigin::Command(name) => assert_eq!(name, "test greet bad command"),
        },
        other => panic!("unexpected error: {other:?}"),
    }
}

#[rstest]
#[case(vec!["unknown", "command"], vec!["unknown", "command"])]
#[case(vec!["greet", "bind"], vec!["bind"])]
#[case(vec!["greet", "flag", "extra"], vec!["extra"])]
#[case(vec![], vec![])]
fn app_run_not_found(#[case] tokens: Vec<&str>, #[case] expected_remaining: Vec<&str>) {
    // Setup
    let (router, log) = dummy_app();

    // Execute
    let error = router.run_tokens(&tokens).unwrap_err();

    // Verify
    assert!(error.to_string().starts_with("Command not found"));
    match error {
        RouteError::CommandNotFound { path, remaining } => {
            assert_eq!(path, tokens);
            assert_eq!(remaining, expected_remaining);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn dynamic_flags() {
    // Setup
    let seen = Arc::new(Mutex::new(Vec::default()));
    let captured = seen.clone();
    let router = CommandLineRouter::new("test")
        .prefix(FlagPrefix::new("setting", "#"))
        .command("test", |test| {
            test.action(move |ctx| {
                let names: Vec<String> = ctx
                    .flags()
                    .names_in("setting")
                    .into_iter()
                    .map(ToString::to_string)
                    .collect();
                let value = ctx.value("setting", "dynamic").map(ToString::to_string);
                captured.lock().unwrap().push((names, value));
                Ok(())
            })
        })
        .build()
        .unwrap();

    // Execute
    router.run_tokens(&["test", "#dynamic", "flag"]).unwrap();

    // Verify
    assert_eq!(
        *seen.lock().unwrap(),
        vec![(vec!["dynamic".to_string()], Some("flag".to_string()))]
    );
}

#[test]
fn state_from_outer_flag() {
    #[derive(Debug, PartialEq)]
    struct Verbosity(u8);

    // Setup
    let seen = Arc::new(Mutex::new(None));
    let captured = seen.clone();
    let router = CommandLineRouter::new("test")
        .prefix(FlagPrefix::new("option", "--").shorthand("-"))
        .flag(
            Flag::new("option", "verbose v")
                .default("0")
                .validator(validators::int)
                .action(|value, ctx| {
                    ctx.insert(Verbosity(value.parse()?));
                    Ok(())
                }),
        )
        .command("work", |work| {
            work.action(move |ctx| {
                *captured.lock().unwrap() = ctx.remove::<Verbosity>();
                Ok(())
            })
        })
        .build()
        .unwrap();

    // Execute
    router.run_tokens(&["work", "-v", "2"]).unwrap();

    // Verify
    assert_eq!(*seen.lock().unwrap(), Some(Verbosity(2)));
}

#[test]
fn validation() {
    // Setup
    let router = CommandLineRouter::new("test")
        .prefix(FlagPrefix::new("option", "--"))
        .command("serve", |serve| {
            serve
                .flag(Flag::new("option", "port").required().validator(validators::int))
                .flag(Flag::new("option", "ratio").default("0.5").validator(validators::number))
                .flag(Flag::new("option", "name").validator(validators::required))
                .action(|_| Ok(()))
        })
        .build()
        .unwrap();

    // Execute
    let missing = router.run_tokens(&["serve"]).unwrap_err();
    let invalid = router
        .run_tokens(&["serve", "--port", "http", "--ratio", "half", "--name="])
        .unwrap_err();

    // Verify
    assert_eq!(missing.to_string(), "Validation error: --port '': Required.");
    match invalid {
        RouteError::Validation(error) => assert_eq!(
            error.messages(),
            &[
                "--port 'http': Must be a valid int.".to_string(),
                "--ratio 'half': Must be a valid number.".to_string(),
                "--name '': Required.".to_string(),
            ]
        ),
        other => panic!("unexpected error: {other:?}"),
    }
    router
        .run_tokens(&["serve", "--port", "8080", "--name", "x"])
        .unwrap();
}

#[test]
fn bound_value_validation() {
    // Setup
    let router = CommandLineRouter::new("test")
        .prefix(FlagPrefix::new("option", "--"))
        .command("serve", |serve| {
            serve
                .flag(Flag::new("option", "count").validator(validators::int))
                .action(|_| Ok(()))
        })
        .command("bind {{count}}", |bind| {
            bind.flag(Flag::new("option", "count").validator(validators::int))
                .action(|ctx| {
                    assert_eq!(ctx.parse::<i64>("option", "count")?, Some(7));
                    Ok(())
                })
        })
        .build()
        .unwrap();

    // Execute
    let repeated = router.resolve(&["serve", "--count", "many", "--count", "3"]);
    let overridden = router.run_tokens(&["bind", "7", "--count", "bogus"]);
    let invalid = router
        .run_tokens(&["bind", "seven"])
        .unwrap_err();

    // Verify
    assert_eq!(repeated.unwrap().value("option", "count"), Some("3"));
    overridden.unwrap();
    match invalid {
        RouteError::Validation(error) => assert_eq!(
            error.messages(),
            &["--count 'seven': Must be a valid int.".to_string()]
        ),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn resolve_without_running() {
    // Setup
    let (router, log) = dummy_app();

    // Execute
    let flags = router
        .resolve(&["greet", "bind", "someone", "--extra", "-x"])
        .unwrap();

    // Verify
    assert_eq!(flags.value("option", "person"), Some("someone"));
    assert_eq!(flags.value("option", "log"), Some("console"));
    assert_eq!(flags.value("option", "extra"), Some("true"));
    assert_eq!(flags.names_in("option"), vec!["extra", "log", "person", "x"]);
    assert_eq!(flags.known().len(), 2);
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn tree() {
    // Setup
    let (router, _) = dummy_app();

    // Execute
    let greet = &router.root().children()[0];

    // Verify
    assert_eq!(router.program(), "test");
    assert_eq!(greet.name(), "test greet");
    let names: Vec<&str> = greet.children().iter().map(|child| child.name()).collect();
    assert_eq!(
        names,
        vec![
            "test greet bind {{option:person}}",
            "test greet flag",
            "test greet bad command",
            "test greet bad_flag",
            "test greet default",
        ]
    );
    assert_eq!(greet.flags()[0].shorthand(), Some("p"));
}

#[rstest]
#[case(
    CommandLineRouter::new("test")
        .prefix(FlagPrefix::new("option", "--"))
        .command("greet {{person}}", |c| c)
        .command("greet bind", |c| c),
    "Config error: commands 'test greet {{option:person}}' and 'test greet bind' are ambiguous under 'test'."
)]
#[case(
    CommandLineRouter::new("test")
        .prefix(FlagPrefix::new("option", "--").shorthand("-"))
        .flag(Flag::new("option", "person p"))
        .command("greet", |c| c.flag(Flag::new("option", "pet p"))),
    "Config error: cannot duplicate the flag 'p' within the command 'test greet'."
)]
#[case(
    CommandLineRouter::new("test")
        .prefix(FlagPrefix::new("option", "--"))
        .prefix(FlagPrefix::new("setting", "--")),
    "Config error: cannot duplicate the prefix '--'."
)]
#[case(
    CommandLineRouter::new("test").flag(Flag::new("option", "person")),
    "Config error: prefix group 'option' does not exist."
)]
fn config_errors(#[case] clr: CommandLineRouter, #[case] expected: &str) {
    // Execute
    let error = clr.build().unwrap_err();

    // Verify
    assert_eq!(error.to_string(), expected);
}

#[test]
fn config_error_variant() {
    let error = CommandLineRouter::new("test")
        .prefix(FlagPrefix::new("option", "--"))
        .command("{{bad", |c| c)
        .build()
        .unwrap_err();

    assert_eq!(error, ConfigError::MalformedBinder("{{bad".to_string()));
}

#[test]
fn concurrent_runs() {
    // Setup
    let seen = Arc::new(Mutex::new(Vec::default()));
    let captured = seen.clone();
    let router = CommandLineRouter::new("test")
        .prefix(FlagPrefix::new("option", "--"))
        .command("greet {{person}}", |greet| {
            greet.flag(Flag::new("option", "person")).action(move |ctx| {
                let person = ctx.value("option", "person").unwrap_or_default().to_string();
                captured.lock().unwrap().push(person);
                Ok(())
            })
        })
        .build()
        .unwrap();

    // Execute
    thread::scope(|scope| {
        for i in 0..8 {
            let router = &router;
            scope.spawn(move || {
                let person = format!("person{i}");
                router.run_tokens(&["greet", person.as_str()]).unwrap();
            });
        }
    });

    // Verify
    let mut seen = seen.lock().unwrap().clone();
    seen.sort();
    let expected: Vec<String> = (0..8).map(|i| format!("person{i}")).collect();
    assert_eq!(seen, expected);
}
