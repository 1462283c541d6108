//! Instructions loader: the text of the session's single system message.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Used when no instructions document is available.
pub const DEFAULT_INSTRUCTIONS: &str =
    "You are AI Agent Level 5, a helpful AI assistant with access to tools.";

/// Where the instructions came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InstructionsSource {
    File(PathBuf),
    BuiltIn,
}

/// System-message text plus its origin (the CLI reports which was used).
#[derive(Clone, Debug)]
pub struct Instructions {
    pub text: String,
    pub source: InstructionsSource,
}

impl Instructions {
    fn built_in() -> Self {
        Instructions {
            text: DEFAULT_INSTRUCTIONS.to_string(),
            source: InstructionsSource::BuiltIn,
        }
    }
}

/// Load instructions from `path`, falling back to [`DEFAULT_INSTRUCTIONS`]
/// when the file is missing, unreadable, or blank.
pub fn load_instructions(path: &Path) -> Instructions {
    if !path.is_file() {
        debug!(path = %path.display(), "no instructions file, using built-in default");
        return Instructions::built_in();
    }

    match std::fs::read_to_string(path) {
        Ok(text) if !text.trim().is_empty() => {
            debug!(path = %path.display(), chars = text.len(), "loaded instructions");
            Instructions {
                text,
                source: InstructionsSource::File(path.to_path_buf()),
            }
        }
        Ok(_) => {
            warn!(path = %path.display(), "instructions file is empty, using built-in default");
            Instructions::built_in()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read instructions");
            Instructions::built_in()
        }
    }
}
