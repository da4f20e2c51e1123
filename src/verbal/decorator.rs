//! Builds the read-only command model from declarations.

use crate::declare::{CommandDecl, ParamDecl, ParamRole, VerbDecl};
use crate::model::{fold_name, Command, OptionForms, Parameter, ParameterKind, Verb};
use std::collections::btree_map::Entry;
use std::collections::hash_map::Entry as HashEntry;
use std::collections::{BTreeMap, HashMap};
use tracing::{trace, warn};

/// Builds the model rooted at `root`.
///
/// Names are matched case-insensitively; when two siblings collide, the first
/// declared wins.
pub fn build(root: &VerbDecl) -> Verb {
    build_verb(root, Vec::new(), true)
}

fn build_verb(decl: &VerbDecl, path: Vec<String>, is_root: bool) -> Verb {
    let mut verbs = BTreeMap::new();
    for child in &decl.verbs {
        let Some(name) = child.name() else {
            warn!(parent = %path.join(" "), "Skipping unnamed verb");
            continue;
        };
        match verbs.entry(fold_name(name)) {
            Entry::Vacant(e) => {
                e.insert(build_verb(child, extend(&path, name), false));
            }
            Entry::Occupied(_) => warn!(verb = name, "Duplicate verb ignored"),
        }
    }

    let mut commands = BTreeMap::new();
    for child in &decl.commands {
        match commands.entry(fold_name(&child.name)) {
            Entry::Vacant(e) => {
                e.insert(build_command(child, extend(&path, &child.name)));
            }
            Entry::Occupied(_) => warn!(command = %child.name, "Duplicate command ignored"),
        }
    }

    Verb {
        name: decl.name.clone().unwrap_or_default(),
        path,
        help: decl.help.clone(),
        category: decl.category.clone(),
        is_root,
        verbs,
        commands,
    }
}

fn extend(path: &[String], name: &str) -> Vec<String> {
    let mut path = path.to_vec();
    path.push(name.to_string());
    path
}

/// Builds one command; `path` includes the command's own name.
pub fn build_command(decl: &CommandDecl, path: Vec<String>) -> Command {
    let mut parameters = Vec::new();
    let mut ordered_values = Vec::new();
    let mut options_by_key = HashMap::new();
    let mut global_options_slot = None;

    for (position, param) in decl.params.iter().enumerate() {
        let parameter = match &param.role {
            ParamRole::GlobalOptions => {
                global_options_slot.get_or_insert(position);
                continue;
            }
            ParamRole::Value => Parameter {
                name: param.name.clone(),
                position,
                value_type: param.value_type.clone(),
                default: param.default.clone(),
                kind: ParameterKind::Value {
                    help: param.help.clone(),
                },
            },
            ParamRole::Option { .. } => option_parameter(param, position),
        };

        let index = parameters.len();
        if parameter.forms().is_some() {
            for key in parameter.keys() {
                match options_by_key.entry(key) {
                    HashEntry::Vacant(e) => {
                        e.insert(index);
                    }
                    HashEntry::Occupied(e) => {
                        warn!(command = %decl.name, key = ?e.key(), "Option key declared twice")
                    }
                }
            }
        } else {
            ordered_values.push(index);
        }
        parameters.push(parameter);
    }

    trace!(
        command = %path.join(" "),
        values = ordered_values.len(),
        options = options_by_key.len(),
        "Built command"
    );

    Command {
        name: decl.name.clone(),
        path,
        help: decl.help.clone(),
        category: decl.category.clone(),
        parameters,
        ordered_values,
        options_by_key,
        global_options_slot,
        arity: decl.params.len(),
        handler: decl.handler.clone(),
    }
}

/// Turns a declaration into an option parameter, whatever role it was declared with.
pub(crate) fn option_parameter(param: &ParamDecl, position: usize) -> Parameter {
    let (short, long) = match &param.role {
        ParamRole::Option {
            short,
            long,
            suppress_long,
        } => {
            let long = if *suppress_long {
                None
            } else {
                Some(long.clone().unwrap_or_else(|| param.name.clone()))
            };
            (*short, long)
        }
        _ => (None, Some(param.name.clone())),
    };
    Parameter {
        name: param.name.clone(),
        position,
        value_type: param.value_type.clone(),
        default: param.default.clone(),
        kind: ParameterKind::Option(OptionForms {
            short,
            long,
            help: param.help.clone(),
        }),
    }
}
