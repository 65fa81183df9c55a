//! Flag registry: single source of truth for the launcher's own flags.

/// Whether a flag takes a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagArity {
    /// Boolean flag, no value (e.g., --help).
    NoValue,
    /// Requires exactly one value (e.g., --project <ID>).
    RequiresValue,
}

/// A single flag definition.
#[derive(Debug, Clone)]
pub struct FlagDef {
    /// Primary long form (e.g., "--project").
    pub long: &'static str,
    /// Optional short form (e.g., "-h").
    pub short: Option<&'static str>,
    /// Does it take a value?
    pub arity: FlagArity,
}

/// Build the complete flag registry.
///
/// Anything not listed here is forwarded untouched to the Beam pipeline.
pub fn flag_registry() -> Vec<FlagDef> {
    vec![
        FlagDef {
            long: "--project",
            short: None,
            arity: FlagArity::RequiresValue,
        },
        FlagDef {
            long: "--location",
            short: None,
            arity: FlagArity::RequiresValue,
        },
        FlagDef {
            long: "--python_module_path",
            short: None,
            arity: FlagArity::RequiresValue,
        },
        FlagDef {
            long: "--temp_location",
            short: None,
            arity: FlagArity::RequiresValue,
        },
        FlagDef {
            long: "--requirements_file_path",
            short: None,
            arity: FlagArity::RequiresValue,
        },
        FlagDef {
            long: "--args",
            short: None,
            arity: FlagArity::RequiresValue,
        },
        FlagDef {
            long: "--gcp_resources",
            short: None,
            arity: FlagArity::RequiresValue,
        },
        FlagDef {
            long: "--help",
            short: Some("-h"),
            arity: FlagArity::NoValue,
        },
    ]
}

impl FlagDef {
    /// Check if this definition matches the given argument string.
    pub fn matches(&self, arg: &str) -> bool {
        arg == self.long || (self.short == Some(arg))
    }
}
