//! # Executor
//!
//! Resolves a command string against a declared tree and invokes the handler.
//!
//! A run is a single left-to-right pass over the tokens:
//!
//! 1. **Verb resolution.** Starting at the root, positional tokens select child
//!    verbs until one names a command. Global options bind wherever they
//!    appear; the help and version flags stop the run; any other option is
//!    rejected because verbs take none.
//! 2. **Binding.** The remaining tokens bind to the command's parameters.
//!    Options bind by key, positionals fill the first unbound value in
//!    position order, and a positional following an array parameter appends
//!    to it.
//! 3. **Defaults.** Every parameter nobody bound gets its declared default or
//!    its type's zero value, and the global options slot receives this run's
//!    global values.
//! 4. **Invocation.** The handler runs, and is awaited when it is async. This
//!    is the only suspension point of a run.
//!
//! Structural failures (unknown names, bad values, a repeated option) end the
//! run normally: the message goes to the output sink, followed by help for the
//! verb or command the failure happened in. Only handler, rendering and I/O
//! failures come back as errors.

use crate::arguments::{Arguments, Slot};
use crate::config::{ColorChoice, ExecutorOptions};
use crate::convert::{parse_bool, DefaultConverter, ValueConverter};
use crate::declare::{Capabilities, CommandDecl, VerbDecl};
use crate::decorator;
use crate::error::{BadCommandKind, Result, VerbalError};
use crate::globals::{GlobalOptions, GlobalValues};
use crate::help::HelpRenderer;
use crate::model::{same_name, Command, OptionKey, Parameter, Value, Verb};
use crate::output::OutputSink;
use crate::parser::{unescape, CommandParser, CommandPart};
use crate::reference::StringReference;
use crate::version::{BuildVersionProvider, VersionProvider};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tracing::debug;

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The handler ran and succeeded.
    Invoked { command: Vec<String> },
    HelpShown,
    VersionShown,
    /// The command line was structurally wrong; the message and help were written.
    Rejected { message: String },
}

/// Where help is shown when a run stops.
#[derive(Debug, Clone, Copy)]
pub enum HelpTarget<'m> {
    Verb(&'m Verb),
    Command(&'m Command),
}

#[derive(Debug)]
struct BadCommand<'m> {
    kind: BadCommandKind,
    target: HelpTarget<'m>,
}

impl<'m> BadCommand<'m> {
    fn new(kind: BadCommandKind, target: HelpTarget<'m>) -> Self {
        Self { kind, target }
    }
}

enum Resolution<'m> {
    Invoke(&'m Command, Arguments),
    Help(HelpTarget<'m>),
    Version,
}

type Step<'m, T> = std::result::Result<T, BadCommand<'m>>;

/// Executes command strings against a declared tree.
pub struct Executor<O: OutputSink> {
    options: ExecutorOptions,
    globals: Option<GlobalOptions>,
    versions: Box<dyn VersionProvider + Send + Sync>,
    converter: Box<dyn ValueConverter + Send + Sync>,
    output: O,
}

impl<O: OutputSink> Executor<O> {
    pub fn new(output: O) -> Self {
        Self {
            options: ExecutorOptions::default(),
            globals: None,
            versions: Box::new(BuildVersionProvider),
            converter: Box::new(DefaultConverter),
            output,
        }
    }

    pub fn with_options(mut self, options: ExecutorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_global_options(mut self, globals: GlobalOptions) -> Self {
        self.globals = Some(globals);
        self
    }

    pub fn with_version_provider<V>(mut self, versions: V) -> Self
    where
        V: VersionProvider + Send + Sync + 'static,
    {
        self.versions = Box::new(versions);
        self
    }

    pub fn with_converter<C>(mut self, converter: C) -> Self
    where
        C: ValueConverter + Send + Sync + 'static,
    {
        self.converter = Box::new(converter);
        self
    }

    pub fn options(&self) -> &ExecutorOptions {
        &self.options
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    pub fn into_output(self) -> O {
        self.output
    }

    /// Runs `command` against the tree rooted at `root`.
    pub async fn execute(&mut self, command: &str, root: &VerbDecl) -> Result<Outcome> {
        let model = decorator::build(root);
        debug!(command, "Executing");
        let resolution = self.session(command).resolve(&model);
        self.finish(resolution).await
    }

    /// Runs `command` against the verb a capability provider contributes.
    pub async fn execute_capabilities<C>(&mut self, command: &str, provider: &C) -> Result<Outcome>
    where
        C: Capabilities + ?Sized,
    {
        let root = VerbDecl::root().group(provider);
        self.execute(command, &root).await
    }

    /// Binds `command` straight to a single command, skipping verb resolution.
    pub async fn execute_command(&mut self, command: &str, decl: &CommandDecl) -> Result<Outcome> {
        let model = decorator::build_command(decl, vec![decl.name().to_string()]);
        debug!(command, target = decl.name(), "Executing command directly");
        let resolution = self.session(command).bind_command(&model);
        self.finish(resolution).await
    }

    fn session<'s, 'c>(&'s self, command: &'c str) -> Session<'s, 'c> {
        Session {
            tokens: CommandParser::new(command),
            source: command,
            pushback: None,
            options: &self.options,
            converter: self.converter.as_ref(),
            globals: self.globals.as_ref(),
            global_values: self
                .globals
                .as_ref()
                .map(|g| g.defaults(self.converter.as_ref())),
        }
    }

    async fn finish(&mut self, resolution: Step<'_, Resolution<'_>>) -> Result<Outcome> {
        match resolution {
            Ok(Resolution::Invoke(command, arguments)) => {
                debug!(command = %command.path.join(" "), arguments = arguments.len(), "Invoking handler");
                (command.handler)(arguments)
                    .wait()
                    .await
                    .map_err(VerbalError::Handler)?;
                Ok(Outcome::Invoked {
                    command: command.path.clone(),
                })
            }
            Ok(Resolution::Help(target)) => {
                self.write_help(target)?;
                Ok(Outcome::HelpShown)
            }
            Ok(Resolution::Version) => {
                for line in self.versions.versions() {
                    self.output.write(&line);
                }
                Ok(Outcome::VersionShown)
            }
            Err(bad) => {
                let message = bad.kind.to_string();
                debug!(%message, "Rejected command");
                self.output.error(&message);
                self.write_help(bad.target)?;
                Ok(Outcome::Rejected { message })
            }
        }
    }

    fn use_color(&self) -> bool {
        match self.options.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.output.supports_color(),
        }
    }

    fn write_help(&mut self, target: HelpTarget<'_>) -> Result<()> {
        let text = {
            let renderer = HelpRenderer::new(&self.options, self.globals.as_ref(), self.use_color())?;
            match target {
                HelpTarget::Verb(verb) => renderer.verb_help(verb)?,
                HelpTarget::Command(command) => renderer.command_help(command)?,
            }
        };
        self.output.write(&text);
        Ok(())
    }
}

/// State for one pass over a command string.
struct Session<'s, 'c> {
    tokens: CommandParser<'c>,
    source: &'c str,
    /// A token to hand out again before reading further.
    pushback: Option<CommandPart>,
    options: &'s ExecutorOptions,
    converter: &'s dyn ValueConverter,
    globals: Option<&'s GlobalOptions>,
    global_values: Option<GlobalValues>,
}

enum Flag {
    Help,
    Version,
}

impl<'s, 'c> Session<'s, 'c> {
    fn text(&self, reference: StringReference) -> &'c str {
        reference.resolve(self.source)
    }

    fn next_token<'m>(&mut self, target: HelpTarget<'m>) -> Step<'m, Option<CommandPart>> {
        if let Some(part) = self.pushback.take() {
            return Ok(Some(part));
        }
        match self.tokens.next() {
            None => Ok(None),
            Some(Ok(part)) => Ok(Some(part)),
            Some(Err(e)) => Err(BadCommand::new(e.into(), target)),
        }
    }

    /// How an option token is named in messages.
    fn display_key(&self, part: &CommandPart) -> String {
        let dashes = if part.is_short_form { "-" } else { "--" };
        format!("{}{}", dashes, self.text(part.key))
    }

    fn flag(&self, part: &CommandPart) -> Option<Flag> {
        let key = self.text(part.key);
        let matches = |short: char, long: &str| {
            if part.is_short_form {
                key.chars().next() == Some(short)
            } else {
                same_name(key, long)
            }
        };
        if matches(self.options.version_short_form, &self.options.version_long_form) {
            Some(Flag::Version)
        } else if matches(self.options.help_short_form, &self.options.help_long_form) {
            Some(Flag::Help)
        } else {
            None
        }
    }

    fn stop<'m>(flag: Flag, target: HelpTarget<'m>) -> Resolution<'m> {
        match flag {
            Flag::Help => Resolution::Help(target),
            Flag::Version => Resolution::Version,
        }
    }

    /// Walks verbs until a command is found, then binds it.
    fn resolve<'m>(mut self, root: &'m Verb) -> Step<'m, Resolution<'m>> {
        let mut verb = root;
        loop {
            let target = HelpTarget::Verb(verb);
            let Some(part) = self.next_token(target)? else {
                return Err(BadCommand::new(BadCommandKind::MalformedCommand, target));
            };

            if part.is_argument {
                if part.key.is_empty() {
                    return Err(BadCommand::new(BadCommandKind::MalformedCommand, target));
                }
                if self.bind_global(&part, target)? {
                    continue;
                }
                if let Some(flag) = self.flag(&part) {
                    return Ok(Self::stop(flag, target));
                }
                return Err(BadCommand::new(
                    BadCommandKind::UnexpectedOption(self.display_key(&part)),
                    target,
                ));
            }

            let name = self.text(part.key);
            if let Some(child) = verb.find_verb(name) {
                debug!(verb = %child.name, "Entering verb");
                verb = child;
                continue;
            }
            if let Some(command) = verb.find_command(name) {
                debug!(command = %command.name, "Resolved command");
                return self.bind_command(command);
            }

            let kind = if verb.commands.is_empty() && !verb.verbs.is_empty() {
                BadCommandKind::UnknownVerb(name.to_string())
            } else {
                BadCommandKind::UnknownCommand(name.to_string())
            };
            return Err(BadCommand::new(kind, target));
        }
    }

    /// Binds the remaining tokens to `command`'s parameters.
    fn bind_command<'m>(mut self, command: &'m Command) -> Step<'m, Resolution<'m>> {
        let target = HelpTarget::Command(command);
        let mut bound: BTreeMap<usize, Value> = BTreeMap::new();
        let mut last: Option<&'m Parameter> = None;

        while let Some(part) = self.next_token(target)? {
            if part.is_argument {
                if part.key.is_empty() {
                    return Err(BadCommand::new(BadCommandKind::MalformedCommand, target));
                }
                if self.bind_global(&part, target)? {
                    continue;
                }
                if let Some(flag) = self.flag(&part) {
                    return Ok(Self::stop(flag, target));
                }

                let key = self.display_key(&part);
                let parameter = OptionKey::from_token(self.text(part.key), part.is_short_form)
                    .and_then(|k| command.find_option(&k))
                    .map(|index| &command.parameters[index])
                    .ok_or_else(|| {
                        BadCommand::new(BadCommandKind::UnknownOption(key.clone()), target)
                    })?;
                let value = self.option_value(&part, parameter, &key, target)?;
                if !bind(&mut bound, parameter, value) {
                    return Err(BadCommand::new(
                        BadCommandKind::OptionRepeatedNotArray(key),
                        target,
                    ));
                }
                debug!(option = %key, position = parameter.position, "Bound option");
                last = Some(parameter);
                continue;
            }

            let text = self.text(part.key);
            if let Some(parameter) = last.filter(|p| p.is_array()) {
                let value = self.convert(text, parameter, &parameter.name, target)?;
                bind(&mut bound, parameter, value);
                continue;
            }

            let parameter = command
                .values()
                .find(|p| !bound.contains_key(&p.position))
                .ok_or_else(|| {
                    BadCommand::new(BadCommandKind::TooManyValues(text.to_string()), target)
                })?;
            let value = self.convert(text, parameter, &parameter.name, target)?;
            bind(&mut bound, parameter, value);
            debug!(value = %parameter.name, position = parameter.position, "Bound value");
            last = Some(parameter);
        }

        Ok(Resolution::Invoke(command, self.arguments(command, bound)))
    }

    /// Binds `part` if it names a global option. Returns whether it did.
    fn bind_global<'m>(&mut self, part: &CommandPart, target: HelpTarget<'m>) -> Step<'m, bool> {
        let Some(globals) = self.globals else {
            return Ok(false);
        };
        let Some(parameter) = OptionKey::from_token(self.text(part.key), part.is_short_form)
            .and_then(|k| globals.find(&k))
        else {
            return Ok(false);
        };

        let key = self.display_key(part);
        let value = self.option_value(part, parameter, &key, target)?;
        if let Some(values) = self.global_values.as_mut() {
            if values.bind(parameter, value).is_err() {
                return Err(BadCommand::new(
                    BadCommandKind::OptionRepeatedNotArray(key),
                    target,
                ));
            }
        }
        debug!(option = %key, "Bound global option");
        Ok(true)
    }

    /// Reads and converts the value of an option token.
    ///
    /// Flags bind on presence. A short flag whose attached text is not a
    /// boolean literal leaves that text to be read as the next positional.
    /// Other options without an attached value take the following positional.
    fn option_value<'m>(
        &mut self,
        part: &CommandPart,
        parameter: &Parameter,
        key: &str,
        target: HelpTarget<'m>,
    ) -> Step<'m, Value> {
        let is_flag = parameter.value_type.is_flag();
        let raw = match part.value {
            Some(value) => {
                let text = self.text(value);
                if is_flag && part.is_short_form && parse_bool(text).is_none() {
                    self.pushback = Some(CommandPart {
                        is_argument: false,
                        is_short_form: false,
                        key: value,
                        value: None,
                    });
                    ""
                } else {
                    text
                }
            }
            None if is_flag => "",
            None => match self.next_token(target)? {
                Some(next) if !next.is_argument => self.text(next.key),
                _ => {
                    return Err(BadCommand::new(
                        BadCommandKind::MissingOptionValue(key.to_string()),
                        target,
                    ))
                }
            },
        };
        self.convert(raw, parameter, key, target)
    }

    /// Converts token text after stripping quote escapes.
    fn convert<'m>(
        &self,
        raw: &str,
        parameter: &Parameter,
        key: &str,
        target: HelpTarget<'m>,
    ) -> Step<'m, Value> {
        self.converter
            .convert(&unescape(raw), &parameter.value_type)
            .map_err(|e| {
                BadCommand::new(
                    BadCommandKind::InvalidValueFormat {
                        key: key.to_string(),
                        value: e.value,
                        expected: e.expected,
                    },
                    target,
                )
            })
    }

    /// One slot per handler parameter, defaults filled in.
    fn arguments(&self, command: &Command, mut bound: BTreeMap<usize, Value>) -> Arguments {
        let mut slots: Vec<Option<Slot>> = (0..command.arity).map(|_| None).collect();
        let mut defaulted = 0;
        for parameter in &command.parameters {
            let value = bound.remove(&parameter.position).unwrap_or_else(|| {
                defaulted += 1;
                parameter
                    .default
                    .clone()
                    .unwrap_or_else(|| self.converter.default_for(&parameter.value_type))
            });
            slots[parameter.position] = Some(Slot::Value {
                name: parameter.name.clone(),
                value,
            });
        }
        if let Some(position) = command.global_options_slot {
            slots[position] = Some(Slot::Globals(
                self.global_values.clone().unwrap_or_default(),
            ));
        }
        debug!(command = %command.name, defaulted, "Filled defaults");
        Arguments::new(slots.into_iter().flatten().collect())
    }
}

/// Binds `value` at the parameter's position. Arrays accumulate; anything
/// else binds once. Returns false on a repeat.
fn bind(bound: &mut BTreeMap<usize, Value>, parameter: &Parameter, value: Value) -> bool {
    match bound.entry(parameter.position) {
        Entry::Vacant(e) => {
            e.insert(value);
            true
        }
        Entry::Occupied(mut e) => parameter.is_array() && e.get_mut().append(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declare::ParamDecl;
    use crate::model::{EnumType, ValueType};
    use crate::output::BufferOutput;
    use crate::parser::command_line_from_args;
    use crate::version::StaticVersions;
    use std::sync::{Arc, Mutex};

    type Calls = Arc<Mutex<Vec<(String, Arguments)>>>;

    fn recording(name: &str, calls: &Calls) -> CommandDecl {
        let calls = calls.clone();
        let label = name.to_string();
        CommandDecl::new(name).handler(move |args| {
            calls.lock().unwrap().push((label.clone(), args));
            Ok(())
        })
    }

    fn tree(calls: &Calls) -> VerbDecl {
        VerbDecl::root()
            .verb(
                VerbDecl::new("builder").command(
                    recording("prune", calls)
                        .param(ParamDecl::option("all", ValueType::Bool).short('a'))
                        .param(ParamDecl::option("force", ValueType::Bool).short('f'))
                        .param(ParamDecl::option("filter", ValueType::String))
                        .param(ParamDecl::option("keep-storage", ValueType::I64)),
                ),
            )
            .verb(
                VerbDecl::new("user")
                    .command(
                        recording("create", calls)
                            .param(ParamDecl::value("username", ValueType::String))
                            .param(ParamDecl::value("password", ValueType::String))
                            .param(ParamDecl::option("preventlogin", ValueType::Bool)),
                    )
                    .command(
                        recording("perm", calls)
                            .param(ParamDecl::value("user", ValueType::String))
                            .param(
                                ParamDecl::option("perm", ValueType::array(ValueType::String))
                                    .short('p'),
                            )
                            .param(ParamDecl::global_options()),
                    )
                    .command(
                        recording("tag", calls)
                            .param(ParamDecl::value("name", ValueType::String))
                            .param(ParamDecl::value("rest", ValueType::array(ValueType::I32))),
                    )
                    .command(
                        recording("level", calls).param(ParamDecl::value(
                            "level",
                            ValueType::Enum(EnumType::new("Level", ["Low", "High"])),
                        )),
                    ),
            )
            .command(recording("attach", calls).param(
                ParamDecl::value("count", ValueType::U8).default(Value::UInt(3)),
            ))
    }

    fn executor() -> Executor<BufferOutput> {
        Executor::new(BufferOutput::new())
            .with_options(ExecutorOptions::default().with_program_name("demo"))
            .with_version_provider(StaticVersions::new(["demo 1.2.3"]))
            .with_global_options(
                GlobalOptions::new()
                    .option(ParamDecl::option("debug", ValueType::Bool).short('D'))
                    .option(ParamDecl::option("host", ValueType::array(ValueType::String)).short('H')),
            )
    }

    async fn run(command: &str) -> (Outcome, BufferOutput, Vec<(String, Arguments)>) {
        let calls: Calls = Arc::default();
        let mut executor = executor();
        let outcome = executor.execute(command, &tree(&calls)).await.unwrap();
        let calls = calls.lock().unwrap().clone();
        (outcome, executor.into_output(), calls)
    }

    fn rejected(outcome: &Outcome) -> &str {
        match outcome {
            Outcome::Rejected { message } => message,
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_binds_options_by_key() {
        let (outcome, _, calls) = run("builder prune -af --filter=\"until=24h\" --keep-storage 10").await;
        assert_eq!(
            outcome,
            Outcome::Invoked {
                command: vec!["builder".into(), "prune".into()]
            }
        );
        let args = &calls[0].1;
        assert_eq!(args.get::<bool>("all"), Ok(true));
        assert_eq!(args.get::<bool>("force"), Ok(true));
        assert_eq!(args.get::<String>("filter").unwrap(), "until=24h");
        assert_eq!(args.get::<i64>("keep-storage"), Ok(10));
    }

    #[tokio::test]
    async fn test_unbound_parameters_get_defaults() {
        let (_, _, calls) = run("builder prune").await;
        let args = &calls[0].1;
        assert_eq!(args.get::<bool>("all"), Ok(false));
        assert_eq!(args.get::<String>("filter").unwrap(), "");
        assert_eq!(args.get::<i64>("keep-storage"), Ok(0));

        let (_, _, calls) = run("attach").await;
        assert_eq!(calls[0].1.get::<u8>("count"), Ok(3));
    }

    #[tokio::test]
    async fn test_values_bind_in_position_order() {
        let (_, _, calls) = run("user create john secret --preventlogin").await;
        let args = &calls[0].1;
        assert_eq!(args.get::<String>("username").unwrap(), "john");
        assert_eq!(args.get::<String>("password").unwrap(), "secret");
        assert_eq!(args.get::<bool>("preventlogin"), Ok(true));
    }

    #[tokio::test]
    async fn test_names_are_case_insensitive() {
        let (outcome, _, _) = run("USER Create john secret --PreventLogin").await;
        assert!(matches!(outcome, Outcome::Invoked { .. }));
    }

    #[tokio::test]
    async fn test_array_option_accumulates_and_absorbs_positionals() {
        let (_, _, calls) = run("user perm bob -p read write -p admin").await;
        let args = &calls[0].1;
        assert_eq!(args.get::<String>("user").unwrap(), "bob");
        assert_eq!(
            args.get::<Vec<String>>("perm").unwrap(),
            vec!["read", "write", "admin"]
        );
    }

    #[tokio::test]
    async fn test_trailing_array_value_collects_rest() {
        let (_, _, calls) = run("user tag v1 1 2 3").await;
        let args = &calls[0].1;
        assert_eq!(args.get::<String>("name").unwrap(), "v1");
        assert_eq!(args.get::<Vec<i32>>("rest").unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_globals_bind_anywhere_and_reach_handler() {
        let (_, _, calls) = run("-D user -H a perm bob -H b").await;
        let globals = calls[0].1.globals().unwrap();
        assert_eq!(globals.get::<bool>("debug"), Ok(true));
        assert_eq!(globals.get::<Vec<String>>("host").unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_short_flag_spills_non_boolean_value() {
        let (outcome, _, calls) = run("-D user perm bob").await;
        assert!(matches!(outcome, Outcome::Invoked { .. }));
        assert_eq!(calls[0].1.get::<String>("user").unwrap(), "bob");

        let (_, _, calls) = run("builder prune -a false").await;
        assert_eq!(calls[0].1.get::<bool>("all"), Ok(false));
    }

    #[tokio::test]
    async fn test_enum_value_by_name_or_ordinal() {
        let (_, _, calls) = run("user level high").await;
        assert_eq!(calls[0].1.value("level").unwrap().to_string(), "High");
        let (_, _, calls) = run("user level 0").await;
        assert_eq!(calls[0].1.value("level").unwrap().to_string(), "Low");
    }

    #[tokio::test]
    async fn test_help_and_version_flags() {
        let (outcome, out, calls) = run("builder prune --help").await;
        assert_eq!(outcome, Outcome::HelpShown);
        assert!(calls.is_empty());
        assert!(out.text().starts_with("Usage:  demo builder prune [Options]"));

        let (outcome, out, _) = run("-h").await;
        assert_eq!(outcome, Outcome::HelpShown);
        assert!(out.text().starts_with("Usage: demo [OPTIONS] COMMAND"));

        let (outcome, out, _) = run("user --VERSION").await;
        assert_eq!(outcome, Outcome::VersionShown);
        assert_eq!(out.lines, vec!["demo 1.2.3"]);
    }

    #[tokio::test]
    async fn test_flag_names_fold_case_like_other_names() {
        let root = VerbDecl::root().command(
            CommandDecl::new("übersicht").param(ParamDecl::option("ärger", ValueType::Bool)),
        );
        let mut executor = Executor::new(BufferOutput::new()).with_options(ExecutorOptions {
            help_long_form: "hülfe".into(),
            ..ExecutorOptions::default().with_program_name("demo")
        });

        let outcome = executor.execute("ÜBERSICHT --ÄRGER", &root).await.unwrap();
        assert!(matches!(outcome, Outcome::Invoked { .. }));

        let outcome = executor.execute("ÜBERSICHT --HÜLFE", &root).await.unwrap();
        assert_eq!(outcome, Outcome::HelpShown);
        let outcome = executor.execute("--Hülfe", &root).await.unwrap();
        assert_eq!(outcome, Outcome::HelpShown);
    }

    #[tokio::test]
    async fn test_rejections_carry_messages_and_help() {
        let cases = [
            ("", "Malformed command"),
            ("user", "Malformed command"),
            ("nope", "Unknown command `nope`"),
            ("--all", "Unexpected option `--all`"),
            ("builder prune --nope", "Unknown option `--nope`"),
            ("builder prune -a -a", "Option `-a` can only be given once"),
            ("-D -D attach", "Option `-D` can only be given once"),
            ("user create a b c", "Too many values, `c` was not expected"),
            (
                "builder prune --keep-storage=lots",
                "Invalid value `lots` for --keep-storage, expected i64",
            ),
            ("builder prune --keep-storage", "Option `--keep-storage` requires a value"),
            ("builder prune --filter -a", "Option `--filter` requires a value"),
            ("builder prune -af x", "Short option cluster `-af` cannot take a value"),
            ("attach --", "Malformed command"),
        ];
        for (command, expected) in cases {
            let (outcome, out, calls) = run(command).await;
            assert_eq!(rejected(&outcome), expected, "for `{}`", command);
            assert!(calls.is_empty());
            assert_eq!(out.errors, vec![expected.to_string()]);
            assert!(out.text().contains("Usage:"), "no help for `{}`", command);
        }
    }

    #[tokio::test]
    async fn test_rebuilt_arguments_bind_unchanged() {
        for username in ["say \"hi\" now", "it's", "'quoted'", "a\\\"b", "C:\\dir\\", ""] {
            let line = command_line_from_args(["user", "create", username, "secret"]).unwrap();
            let (outcome, _, calls) = run(&line).await;
            assert!(matches!(outcome, Outcome::Invoked { .. }), "for `{}`", line);
            let args = &calls[0].1;
            assert_eq!(args.get::<String>("username").unwrap(), username);
            assert_eq!(args.get::<String>("password").unwrap(), "secret");
        }

        let line = command_line_from_args(["user", "perm", "bob", "--perm=read \"all\""]).unwrap();
        let (_, _, calls) = run(&line).await;
        assert_eq!(
            calls[0].1.get::<Vec<String>>("perm").unwrap(),
            vec!["read \"all\""]
        );
    }

    #[tokio::test]
    async fn test_unknown_verb_when_only_verbs_exist() {
        let calls: Calls = Arc::default();
        let root = VerbDecl::root().verb(VerbDecl::new("user").verb(
            VerbDecl::new("admin").command(recording("list", &calls)),
        ));
        let mut executor = executor();
        let outcome = executor.execute("user nope", &root).await.unwrap();
        assert_eq!(rejected(&outcome), "Unknown verb `nope`");
        assert!(executor
            .output()
            .text()
            .contains("Usage: demo user COMMAND"));
    }

    #[tokio::test]
    async fn test_handler_errors_propagate() {
        let root = VerbDecl::root()
            .command(CommandDecl::new("fail").handler(|_| Err(anyhow::anyhow!("boom"))));
        let mut executor = executor();
        let err = executor.execute("fail", &root).await.unwrap_err();
        assert!(matches!(err, VerbalError::Handler(_)));
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_async_handler_is_awaited() {
        let hits = Arc::new(Mutex::new(0));
        let counter = hits.clone();
        let root = VerbDecl::root().command(CommandDecl::new("wait").async_handler(move |_| {
            let counter = counter.clone();
            async move {
                tokio::task::yield_now().await;
                *counter.lock().unwrap() += 1;
                Ok(())
            }
        }));
        let mut executor = executor();
        executor.execute("wait", &root).await.unwrap();
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_execute_command_skips_verbs() {
        let calls: Calls = Arc::default();
        let decl = recording("create", &calls)
            .param(ParamDecl::value("username", ValueType::String))
            .param(ParamDecl::global_options());
        let mut executor = executor();
        let outcome = executor.execute_command("john -D", &decl).await.unwrap();
        assert_eq!(
            outcome,
            Outcome::Invoked {
                command: vec!["create".into()]
            }
        );
        let calls = calls.lock().unwrap();
        assert_eq!(calls[0].1.get::<String>("username").unwrap(), "john");
        assert_eq!(calls[0].1.globals().unwrap().get::<bool>("debug"), Ok(true));
    }

    #[tokio::test]
    async fn test_global_slot_without_globals_is_empty() {
        let calls: Calls = Arc::default();
        let decl = recording("solo", &calls).param(ParamDecl::global_options());
        let mut executor = Executor::new(BufferOutput::new());
        executor.execute_command("", &decl).await.unwrap();
        let calls = calls.lock().unwrap();
        assert_eq!(calls[0].1.len(), 1);
        assert_eq!(calls[0].1.globals(), Some(&GlobalValues::default()));
    }
}
