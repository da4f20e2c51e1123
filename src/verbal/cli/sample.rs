//! The docker-like tree the demo executes against.
//!
//! Handlers print the command path followed by `name=value` for every bound
//! argument in position order, so the binary's output shows exactly what the
//! executor bound.

use verbal::arguments::Arguments;
use verbal::declare::{Capabilities, CommandDecl, ParamDecl, VerbDecl};
use verbal::globals::GlobalOptions;
use verbal::model::{EnumType, Value, ValueType};

const MANAGEMENT: &str = "Management Commands";

fn describe(path: &str, args: &Arguments) -> String {
    let mut line = path.to_string();
    for (name, value) in args.iter() {
        line.push_str(&format!(" {}={}", name, value));
    }
    if let Some(globals) = args.globals() {
        let set: Vec<String> = globals
            .iter()
            .filter(|(name, _)| globals.is_set(name))
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        if !set.is_empty() {
            line.push_str(&format!(" [globals {}]", set.join(" ")));
        }
    }
    line
}

fn printing(path: &'static str) -> impl Fn(Arguments) -> anyhow::Result<()> + Send + Sync {
    move |args| {
        println!("{}", describe(path, &args));
        Ok(())
    }
}

pub fn global_options() -> GlobalOptions {
    GlobalOptions::new()
        .option(
            ParamDecl::option("config", ValueType::String)
                .help("Location of client config files")
                .default(Value::String("~/.docker".into())),
        )
        .option(
            ParamDecl::option("context", ValueType::String)
                .short('c')
                .help("Name of the context to use to connect to the daemon"),
        )
        .option(
            ParamDecl::option("debug", ValueType::Bool)
                .short('D')
                .help("Enable debug mode"),
        )
        .option(
            ParamDecl::option("host", ValueType::array(ValueType::String))
                .short('H')
                .help("Daemon socket(s) to connect to"),
        )
        .option(
            ParamDecl::option(
                "orchestrator",
                ValueType::Enum(EnumType::new("Orchestrator", ["swarm", "kubernetes", "all"])),
            )
            .help("Orchestrator to use"),
        )
}

pub struct BuilderCommands;

impl Capabilities for BuilderCommands {
    fn capabilities(&self) -> VerbDecl {
        VerbDecl::new("builder")
            .help("Manage builds")
            .category(MANAGEMENT)
            .command(
                CommandDecl::new("build")
                    .help("Build an image from a Dockerfile")
                    .param(ParamDecl::value("path", ValueType::String).help("Build context"))
                    .param(
                        ParamDecl::option("tag", ValueType::array(ValueType::String))
                            .short('t')
                            .help("Name and optionally a tag in the 'name:tag' format"),
                    )
                    .param(
                        ParamDecl::option("no-cache", ValueType::Bool)
                            .help("Do not use cache when building the image"),
                    )
                    .handler(printing("builder build")),
            )
            .command(
                CommandDecl::new("prune")
                    .help("Remove build cache")
                    .param(
                        ParamDecl::option("all", ValueType::Bool)
                            .short('a')
                            .help("Remove all unused build cache, not just dangling ones"),
                    )
                    .param(
                        ParamDecl::option("force", ValueType::Bool)
                            .short('f')
                            .help("Do not prompt for confirmation"),
                    )
                    .param(
                        ParamDecl::option("filter", ValueType::String)
                            .help("Provide filter values (e.g. 'until=24h')"),
                    )
                    .param(
                        ParamDecl::option("keep-storage", ValueType::I64)
                            .help("Amount of disk space to keep for cache"),
                    )
                    .handler(printing("builder prune")),
            )
    }
}

pub struct UserCommands;

impl Capabilities for UserCommands {
    fn capabilities(&self) -> VerbDecl {
        VerbDecl::new("user")
            .help("Manage users")
            .category(MANAGEMENT)
            .command(
                CommandDecl::new("create")
                    .help("Creates a new user")
                    .param(ParamDecl::value("username", ValueType::String).help("The user name"))
                    .param(ParamDecl::value("password", ValueType::String).help("The password"))
                    .param(
                        ParamDecl::option("preventlogin", ValueType::Bool)
                            .help("Create the user with logins disabled"),
                    )
                    .handler(printing("user create")),
            )
            .command(
                CommandDecl::new("list")
                    .help("Lists users")
                    .param(ParamDecl::option("all", ValueType::Bool).short('a').help("Include disabled users"))
                    .param(ParamDecl::option("desc", ValueType::Bool).short('d').help("Sort descending"))
                    .handler(printing("user list")),
            )
            .command(
                CommandDecl::new("perm")
                    .help("Grants permissions to a user")
                    .param(ParamDecl::value("user", ValueType::String))
                    .param(
                        ParamDecl::option("perm", ValueType::array(ValueType::String))
                            .short('p')
                            .no_long()
                            .help("Permissions to grant"),
                    )
                    .param(ParamDecl::global_options())
                    .handler(printing("user perm")),
            )
    }
}

pub fn tree() -> VerbDecl {
    VerbDecl::root()
        .group(&BuilderCommands)
        .group(&UserCommands)
        .command(
            CommandDecl::new("attach")
                .help("Attach local standard input, output, and error streams to a running container")
                .param(ParamDecl::value("container", ValueType::String))
                .param(
                    ParamDecl::option("detach-keys", ValueType::String)
                        .help("Override the key sequence for detaching a container"),
                )
                .param(
                    ParamDecl::option("no-stdin", ValueType::Bool)
                        .help("Do not attach STDIN"),
                )
                .param(ParamDecl::global_options())
                .handler(printing("attach")),
        )
        .command(
            CommandDecl::new("wait")
                .help("Block until a container stops, then print its exit code")
                .param(ParamDecl::value("container", ValueType::String))
                .async_handler(|args| async move {
                    tokio::task::yield_now().await;
                    let container: String = args.get("container")?;
                    println!("wait container={} exit=0", container);
                    Ok(())
                }),
        )
}
