use std::path::PathBuf;

use thiserror::Error;

use crate::component::ComponentKind;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Component of kind '{0}' already exists on this instance")]
    DuplicateKind(ComponentKind),

    #[error("Component of kind '{kind}' is already attached to '{owner}'")]
    AlreadyAttached { kind: ComponentKind, owner: String },

    #[error("Component {0} is already borrowed")]
    ComponentBusy(String),

    #[error("Lua script file not found: {} (tried: {})", .path.display(), join_paths(.tried))]
    ScriptNotFound { path: PathBuf, tried: Vec<PathBuf> },

    #[error("Failed to read script '{}': {source}", .path.display())]
    ScriptRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Lua error: {0}")]
    Script(#[from] mlua::Error),
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_not_found_names_every_attempt() {
        let err = RuntimeError::ScriptNotFound {
            path: PathBuf::from("scripts/missing.lua"),
            tried: vec![
                PathBuf::from("/opt/game/scripts/missing.lua"),
                PathBuf::from("scripts/missing.lua"),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("/opt/game/scripts/missing.lua"));
        assert!(msg.ends_with("scripts/missing.lua)"));
    }

    #[test]
    fn test_already_attached_names_owner() {
        let err = RuntimeError::AlreadyAttached {
            kind: ComponentKind::Script,
            owner: "hero".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Component of kind 'script' is already attached to 'hero'"
        );
    }

    #[test]
    fn test_duplicate_kind_message() {
        let err = RuntimeError::DuplicateKind(ComponentKind::Transform);
        assert_eq!(
            err.to_string(),
            "Component of kind 'transform' already exists on this instance"
        );
    }
}
