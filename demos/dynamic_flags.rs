use cmdroute::{CommandLineRouter, Flag, FlagPrefix};

// $ dynamic_flags set #color blue #size=10
// color = blue
// size = 10
fn main() {
    let router = CommandLineRouter::new("dynamic_flags")
        .prefix(FlagPrefix::new("option", "--").shorthand("-"))
        .prefix(FlagPrefix::new("setting", "#"))
        .flag(Flag::new("option", "verbose v"))
        .command("set", |set| {
            set.about("Apply any number of #settings.").action(|ctx| {
                let verbose = ctx.parse::<bool>("option", "verbose")?.unwrap_or(false);

                for name in ctx.flags().names_in("setting") {
                    let value = ctx.value("setting", name).unwrap_or_default();
                    println!("{name} = {value}");
                }

                if verbose {
                    println!("unknown flags: {:?}", ctx.flags().unknown());
                }

                Ok(())
            })
        })
        .build();

    let result = match router {
        Ok(router) => router.run().map_err(|error| error.to_string()),
        Err(error) => Err(error.to_string()),
    };

    if let Err(message) = result {
        eprintln!("{message}");
        std::process::exit(1);
    }
}
