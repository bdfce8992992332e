//! Processor specification parsing.
//!
//! A specification is a colon-delimited configuration token naming one
//! transform for one file extension:
//! - `<processor-path>` — external executable, extension defaults to `md`
//! - `builtin:<name>` — builtin transform, extension defaults to `md`
//! - `<ext>:<processor-path>` — external executable for `<ext>`
//! - `<ext>:<other-ext>` — alias: reuse the chain resolved for `<other-ext>`
//! - `<ext>:builtin:<name>` — builtin transform for `<ext>`
//!
//! The string is split into at most three fields; the last field keeps
//! any further colons it contains.

use std::path::{Path, PathBuf};

use markpress_shared::{MarkpressError, Result};

use crate::builtins::BuiltinKind;

/// Extension applied when a specification does not name one.
pub const DEFAULT_EXTENSION: &str = "md";

/// Literal selecting the builtin forms of the grammar.
const BUILTIN_MARKER: &str = "builtin";

/// Specifications applied when the user supplies none at all.
pub const DEFAULT_STACK: [&str; 2] = ["builtin:convert_gemoji", "builtin:add_footer"];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// What a specification points at. Exactly one target per spec, enforced
/// by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecTarget {
    /// A named in-process transform.
    Builtin(BuiltinKind),
    /// An external executable, canonicalized at parse time.
    External(PathBuf),
    /// Reuse the chain resolved for another extension.
    CopyFrom(String),
}

/// One parsed processor specification. Constructed once per raw
/// configuration token at startup, immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorSpec {
    /// The raw configuration token, kept for error reporting.
    pub raw: String,
    /// Extension this spec applies to (no leading dot).
    pub ext: String,
    /// The transform or alias this spec configures.
    pub target: SpecTarget,
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

impl ProcessorSpec {
    /// Parse a raw specification string.
    pub fn parse(raw: &str) -> Result<Self> {
        let parts: Vec<&str> = raw.splitn(3, ':').collect();

        let (ext, target) = match parts.as_slice() {
            [path] => (
                DEFAULT_EXTENSION.to_string(),
                SpecTarget::External(resolve_executable(path)?),
            ),
            [marker, name] if *marker == BUILTIN_MARKER => {
                (DEFAULT_EXTENSION.to_string(), builtin_target(name)?)
            }
            [ext, value] => {
                // An existing executable wins; anything else is read as the
                // name of another extension to alias.
                let target = match resolve_executable(value) {
                    Ok(path) => SpecTarget::External(path),
                    Err(_) => SpecTarget::CopyFrom((*value).to_string()),
                };
                ((*ext).to_string(), target)
            }
            [ext, marker, name] if *marker == BUILTIN_MARKER => {
                ((*ext).to_string(), builtin_target(name)?)
            }
            _ => {
                return Err(MarkpressError::MalformedSpec {
                    value: raw.to_string(),
                });
            }
        };

        Ok(Self {
            raw: raw.to_string(),
            ext,
            target,
        })
    }
}

/// Look up a builtin by name, failing with the list of valid names.
fn builtin_target(name: &str) -> Result<SpecTarget> {
    BuiltinKind::from_name(name)
        .map(SpecTarget::Builtin)
        .ok_or_else(|| MarkpressError::UnknownBuiltin {
            name: name.to_string(),
            valid: BuiltinKind::valid_names(),
        })
}

/// Validate that `path` is an existing executable file and canonicalize it.
fn resolve_executable(path: &str) -> Result<PathBuf> {
    let path = Path::new(path);
    if !path.is_file() || !is_executable(path) {
        return Err(MarkpressError::MissingExecutable {
            path: path.to_path_buf(),
        });
    }
    path.canonicalize().map_err(|e| MarkpressError::io(path, e))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_short_form_defaults_to_md() {
        let spec = ProcessorSpec::parse("builtin:noop").expect("parse");
        assert_eq!(spec.ext, "md");
        assert_eq!(spec.target, SpecTarget::Builtin(BuiltinKind::Noop));
    }

    #[test]
    fn builtin_with_extension() {
        let spec = ProcessorSpec::parse("txt:builtin:add_footer").expect("parse");
        assert_eq!(spec.ext, "txt");
        assert_eq!(spec.target, SpecTarget::Builtin(BuiltinKind::AddFooter));
    }

    #[test]
    fn default_stack_parses() {
        for raw in DEFAULT_STACK {
            let spec = ProcessorSpec::parse(raw).expect("parse default spec");
            assert_eq!(spec.ext, "md");
            assert!(matches!(spec.target, SpecTarget::Builtin(_)));
        }
    }

    #[test]
    fn three_fields_require_builtin_marker() {
        let err = ProcessorSpec::parse("txt:external:foo").unwrap_err();
        assert!(matches!(
            err,
            MarkpressError::MalformedSpec { ref value } if value == "txt:external:foo"
        ));
    }

    #[test]
    fn unknown_builtin_lists_valid_names() {
        let err = ProcessorSpec::parse("builtin:frobnicate").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("frobnicate"));
        assert!(msg.contains("noop"));
        assert!(msg.contains("add_footer"));
        assert!(msg.contains("convert_gemoji"));
    }

    #[test]
    fn single_field_missing_path_rejected() {
        let err = ProcessorSpec::parse("/no/such/processor").unwrap_err();
        assert!(matches!(err, MarkpressError::MissingExecutable { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn single_field_executable_path() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let script = crate::test_support::write_script(tmp.path(), "upper.sh", "#!/bin/sh\ntr a-z A-Z\n");

        let spec = ProcessorSpec::parse(script.to_str().unwrap()).expect("parse");
        assert_eq!(spec.ext, "md");
        assert_eq!(
            spec.target,
            SpecTarget::External(script.canonicalize().unwrap())
        );
    }

    #[cfg(unix)]
    #[test]
    fn extension_with_executable_path() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let script = crate::test_support::write_script(tmp.path(), "upper.sh", "#!/bin/sh\ntr a-z A-Z\n");

        let raw = format!("txt:{}", script.display());
        let spec = ProcessorSpec::parse(&raw).expect("parse");
        assert_eq!(spec.ext, "txt");
        assert!(matches!(spec.target, SpecTarget::External(_)));
    }

    #[cfg(unix)]
    #[test]
    fn non_executable_file_is_read_as_alias() {
        // A plain data file is not an executable, so the second field
        // falls back to the alias reading.
        let tmp = tempfile::tempdir().expect("tempdir");
        let data = tmp.path().join("notes.txt");
        std::fs::write(&data, "not a processor").expect("write");

        let raw = format!("txt:{}", data.display());
        let spec = ProcessorSpec::parse(&raw).expect("parse");
        assert_eq!(
            spec.target,
            SpecTarget::CopyFrom(data.display().to_string())
        );
    }

    #[test]
    fn extension_alias_form() {
        let spec = ProcessorSpec::parse("markdown:md").expect("parse");
        assert_eq!(spec.ext, "markdown");
        assert_eq!(spec.target, SpecTarget::CopyFrom("md".into()));
    }

    #[test]
    fn raw_token_preserved() {
        let spec = ProcessorSpec::parse("builtin:noop").expect("parse");
        assert_eq!(spec.raw, "builtin:noop");
    }
}
