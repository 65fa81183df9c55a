//! Argument handling for the launcher.
//!
//! ```text
//! argv → Classify (registry) → recognised → clap validation → LaunchArgs
//!                            → pass-through ───────────────→ Vec<String>
//! ```
//!
//! Arguments are parsed exactly once; unrecognised tokens never fail the parse.

mod classifier;
mod launch;
mod registry;

pub use classifier::{classify, ClassifiedArg, ClassifyResult};
pub use launch::{
    is_gcs_path, make_parent_dirs_and_return_path, parse_args, LaunchArgs, ParsedArgs,
    PROGRAM_NAME,
};
pub use registry::{flag_registry, FlagArity, FlagDef};
