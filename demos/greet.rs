use cmdroute::{validators, CommandLineRouter, ConfigError, Context, Flag, FlagPrefix, Router};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogTarget {
    Console,
    File,
}

fn say(ctx: &Context, message: &str) {
    let target = match ctx.get::<LogTarget>() {
        Some(LogTarget::File) => "file",
        _ => "console",
    };
    println!("[{target}] {message}");
}

fn hello(ctx: &mut Context) -> cmdroute::ActionResult {
    let person = ctx.value("option", "person").unwrap_or("you");
    say(ctx, &format!("Hello, {person}."));
    Ok(())
}

fn build() -> Result<Router, ConfigError> {
    CommandLineRouter::new("greet")
        .about("Greets people, to the console or to a file.")
        .prefix(FlagPrefix::new("option", "--").shorthand("-"))
        .flag(
            Flag::new("option", "log l")
                .description("Where to write the greeting (console or file).")
                .default("console")
                .action(|value, ctx| {
                    let target = match value {
                        "file" => LogTarget::File,
                        _ => LogTarget::Console,
                    };
                    ctx.insert(target);
                    Ok(())
                }),
        )
        .command("greet", |greet| {
            greet
                .about("Greet someone.")
                .flag(
                    Flag::new("option", "person p")
                        .description("Who to greet.")
                        .default("you"),
                )
                .command("bind {{person}}", |bind| bind.action(hello))
                .command("flag", |flag| flag.action(hello))
                .command("default", |default| {
                    default
                        .flag(Flag::new("option", "message m").default("defaultHello"))
                        .flag(
                            Flag::new("option", "count c")
                                .default("1")
                                .validator(validators::int),
                        )
                        .action(|ctx| {
                            let message = ctx.value("option", "message").unwrap_or_default();
                            let person = ctx.value("option", "person").unwrap_or_default();
                            let count: i64 = ctx.parse("option", "count")?.unwrap_or(1);

                            for _ in 0..count {
                                say(ctx, &format!("{message}, {person}."));
                            }

                            Ok(())
                        })
                })
        })
        .build()
}

fn main() {
    let router = match build() {
        Ok(router) => router,
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(1);
        }
    };

    if let Err(error) = router.run() {
        eprintln!("{error}");
        std::process::exit(1);
    }
}
