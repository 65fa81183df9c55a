//! Argument classifier: raw args → launcher flags vs pass-through tokens.

use crate::args::registry::{FlagArity, FlagDef};

/// A classified argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedArg {
    /// Launcher flag with its value, if one was supplied.
    Recognized {
        flag: String, // normalized to long form
        value: Option<String>,
    },
    /// Anything else, forwarded verbatim.
    Passthrough(String),
}

/// Result of classifying raw arguments.
#[derive(Debug, Clone, Default)]
pub struct ClassifyResult {
    /// Classified arguments in order.
    pub args: Vec<ClassifiedArg>,
}

/// Classify raw args against the registry.
///
/// Accepts `--flag value` and `--flag=value`. A recognised flag whose value is
/// missing is kept without one so that validation reports it.
pub fn classify(raw_args: &[String], registry: &[FlagDef]) -> ClassifyResult {
    let mut args = Vec::new();
    let mut iter = raw_args.iter().peekable();

    while let Some(arg) = iter.next() {
        let (name, inline_value) = match arg.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value.to_string())),
            _ => (arg.as_str(), None),
        };

        let Some(def) = registry.iter().find(|d| d.matches(name)) else {
            args.push(ClassifiedArg::Passthrough(arg.clone()));
            continue;
        };

        let value = match (def.arity, inline_value) {
            (_, Some(value)) => Some(value),
            (FlagArity::NoValue, None) => None,
            (FlagArity::RequiresValue, None) => match iter.peek() {
                Some(next) if !next.starts_with('-') => iter.next().cloned(),
                Some(_) | None => None,
            },
        };

        args.push(ClassifiedArg::Recognized {
            flag: def.long.to_string(),
            value,
        });
    }

    ClassifyResult { args }
}

impl ClassifyResult {
    /// Launcher tokens, re-flattened for validation. Values are glued to
    /// their flag as `--flag=value` so one starting with `-` stays a value.
    pub fn recognized(&self) -> Vec<String> {
        self.args
            .iter()
            .filter_map(|a| match a {
                ClassifiedArg::Recognized { flag, value: Some(value) } => {
                    Some(format!("{}={}", flag, value))
                }
                ClassifiedArg::Recognized { flag, value: None } => Some(flag.clone()),
                ClassifiedArg::Passthrough(_) => None,
            })
            .collect()
    }

    /// Pass-through tokens in their original order.
    pub fn passthrough(&self) -> Vec<String> {
        self.args
            .iter()
            .filter_map(|a| match a {
                ClassifiedArg::Passthrough(s) => Some(s.clone()),
                ClassifiedArg::Recognized { .. } => None,
            })
            .collect()
    }
}
