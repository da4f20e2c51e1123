//! Declarations the host builds its command tree from.
//!
//! A tree is declared once with the builders here and handed to the executor,
//! which turns it into the read-only model (see `decorator`) on every run.
//!
//! ```rust
//! use verbal::declare::{CommandDecl, ParamDecl, VerbDecl};
//! use verbal::model::ValueType;
//!
//! let root = VerbDecl::root().verb(
//!     VerbDecl::new("builder").help("Manage builds").command(
//!         CommandDecl::new("prune")
//!             .param(ParamDecl::option("all", ValueType::Bool).short('a'))
//!             .param(ParamDecl::option("keep-storage", ValueType::I64))
//!             .handler(|args| {
//!                 let all: bool = args.get("all")?;
//!                 println!("prune all={}", all);
//!                 Ok(())
//!             }),
//!     ),
//! );
//! # let _ = root;
//! ```

use crate::arguments::Arguments;
use crate::model::{Value, ValueType};
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

/// What a handler hands back: a finished result or a future to await.
pub enum Completion {
    Ready(anyhow::Result<()>),
    Pending(BoxFuture<'static, anyhow::Result<()>>),
}

impl Completion {
    pub fn is_pending(&self) -> bool {
        matches!(self, Completion::Pending(_))
    }

    pub async fn wait(self) -> anyhow::Result<()> {
        match self {
            Completion::Ready(result) => result,
            Completion::Pending(future) => future.await,
        }
    }
}

pub type Handler = Arc<dyn Fn(Arguments) -> Completion + Send + Sync>;

/// Implemented by host types that contribute a verb to the tree.
pub trait Capabilities {
    fn capabilities(&self) -> VerbDecl;
}

#[derive(Clone, Default)]
pub struct VerbDecl {
    pub(crate) name: Option<String>,
    pub(crate) help: Option<String>,
    pub(crate) category: Option<String>,
    pub(crate) verbs: Vec<VerbDecl>,
    pub(crate) commands: Vec<CommandDecl>,
}

impl VerbDecl {
    /// The unnamed root of a tree.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn help(mut self, help: &str) -> Self {
        self.help = Some(help.to_string());
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn verb(mut self, verb: VerbDecl) -> Self {
        self.verbs.push(verb);
        self
    }

    pub fn command(mut self, command: CommandDecl) -> Self {
        self.commands.push(command);
        self
    }

    /// Adds the verb contributed by a capability provider.
    pub fn group<C: Capabilities + ?Sized>(self, provider: &C) -> Self {
        self.verb(provider.capabilities())
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

#[derive(Clone)]
pub struct CommandDecl {
    pub(crate) name: String,
    pub(crate) help: Option<String>,
    pub(crate) category: Option<String>,
    pub(crate) params: Vec<ParamDecl>,
    pub(crate) handler: Handler,
}

impl CommandDecl {
    /// A command whose handler does nothing until one is attached.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            help: None,
            category: None,
            params: Vec::new(),
            handler: Arc::new(|_| Completion::Ready(Ok(()))),
        }
    }

    pub fn help(mut self, help: &str) -> Self {
        self.help = Some(help.to_string());
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    /// Appends a handler parameter; position follows call order.
    pub fn param(mut self, param: ParamDecl) -> Self {
        self.params.push(param);
        self
    }

    pub fn handler<F>(mut self, f: F) -> Self
    where
        F: Fn(Arguments) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.handler = Arc::new(move |args| Completion::Ready(f(args)));
        self
    }

    pub fn async_handler<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.handler = Arc::new(move |args| Completion::Pending(Box::pin(f(args))));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ParamRole {
    Value,
    Option {
        short: Option<char>,
        long: Option<String>,
        suppress_long: bool,
    },
    GlobalOptions,
}

/// One handler parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    pub(crate) name: String,
    pub(crate) value_type: ValueType,
    pub(crate) help: Option<String>,
    pub(crate) default: Option<Value>,
    pub(crate) role: ParamRole,
}

impl ParamDecl {
    /// A positional value.
    pub fn value(name: &str, value_type: ValueType) -> Self {
        Self {
            name: name.to_string(),
            value_type,
            help: None,
            default: None,
            role: ParamRole::Value,
        }
    }

    /// A keyed option; its long form defaults to the parameter name.
    pub fn option(name: &str, value_type: ValueType) -> Self {
        Self {
            role: ParamRole::Option {
                short: None,
                long: None,
                suppress_long: false,
            },
            ..Self::value(name, value_type)
        }
    }

    /// The slot that receives the executor's global option values.
    pub fn global_options() -> Self {
        Self {
            role: ParamRole::GlobalOptions,
            ..Self::value("global_options", ValueType::String)
        }
    }

    pub fn short(mut self, c: char) -> Self {
        if let ParamRole::Option { short, .. } = &mut self.role {
            *short = Some(c);
        }
        self
    }

    pub fn long(mut self, name: &str) -> Self {
        if let ParamRole::Option { long, .. } = &mut self.role {
            *long = Some(name.to_string());
        }
        self
    }

    /// Drops the implicit long form so only the short form binds.
    pub fn no_long(mut self) -> Self {
        if let ParamRole::Option { suppress_long, .. } = &mut self.role {
            *suppress_long = true;
        }
        self
    }

    pub fn help(mut self, help: &str) -> Self {
        self.help = Some(help.to_string());
        self
    }

    pub fn default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_option(&self) -> bool {
        matches!(self.role, ParamRole::Option { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Users;

    impl Capabilities for Users {
        fn capabilities(&self) -> VerbDecl {
            VerbDecl::new("user").command(CommandDecl::new("list"))
        }
    }

    #[test]
    fn test_group_adds_capability_verb() {
        let root = VerbDecl::root().group(&Users);
        assert_eq!(root.verbs.len(), 1);
        assert_eq!(root.verbs[0].name(), Some("user"));
        assert_eq!(root.verbs[0].commands[0].name(), "list");
    }

    #[test]
    fn test_option_builders_ignore_values() {
        let p = ParamDecl::value("name", ValueType::String).short('n').no_long();
        assert_eq!(p.role, ParamRole::Value);

        let o = ParamDecl::option("all", ValueType::Bool).short('a').no_long();
        assert_eq!(
            o.role,
            ParamRole::Option {
                short: Some('a'),
                long: None,
                suppress_long: true
            }
        );
    }

    #[tokio::test]
    async fn test_default_handler_is_a_no_op() {
        let command = CommandDecl::new("noop");
        let completion = (command.handler)(Arguments::default());
        assert!(!completion.is_pending());
        assert!(completion.wait().await.is_ok());
    }

    #[tokio::test]
    async fn test_async_handler_is_pending() {
        let command = CommandDecl::new("later").async_handler(|_| async { Ok(()) });
        let completion = (command.handler)(Arguments::default());
        assert!(completion.is_pending());
        assert!(completion.wait().await.is_ok());
    }
}
