//! The fixed builtin transform registry and footer rendering.
//!
//! Builtins are in-process text transforms selected as `builtin:<name>`.
//! The registry is closed; extending it is additive only and the names
//! are stable identifiers.

use markpress_git::GitFileInfo;
use markpress_shared::{GitProvider, MarkpressError, PathInfo, Result};
use url::Url;

use crate::context::BuildContext;
use crate::external;

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// The builtin transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinKind {
    /// Identity transform.
    Noop,
    /// Append a "last modified" / "view source" footer from git metadata.
    AddFooter,
    /// Rewrite `:shortcode:` emoji markup to Unicode characters.
    ConvertGemoji,
}

impl BuiltinKind {
    /// Every registered builtin, in registry order.
    pub const ALL: [Self; 3] = [Self::Noop, Self::AddFooter, Self::ConvertGemoji];

    /// Stable configuration identifier.
    pub fn name(self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::AddFooter => "add_footer",
            Self::ConvertGemoji => "convert_gemoji",
        }
    }

    /// Look up a builtin by its configuration identifier.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Comma-separated list of valid identifiers, for error messages.
    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(|kind| kind.name())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Apply this transform to one file's text content.
    pub fn apply(self, path_info: &PathInfo, ctx: &BuildContext, text: String) -> Result<String> {
        match self {
            Self::Noop => Ok(text),
            Self::AddFooter => add_footer(path_info, ctx, text),
            Self::ConvertGemoji => convert_gemoji(ctx, &text),
        }
    }
}

// ---------------------------------------------------------------------------
// add_footer
// ---------------------------------------------------------------------------

/// Horizontal-rule separator inserted before a non-empty footer.
const FOOTER_SEPARATOR: &str = "\n* * *\n\n";

fn add_footer(path_info: &PathInfo, ctx: &BuildContext, text: String) -> Result<String> {
    let footer = render_footer(path_info, ctx)?;
    if footer.is_empty() {
        return Ok(text);
    }
    Ok(format!("{text}{FOOTER_SEPARATOR}{footer}"))
}

/// Render the footer for one file.
///
/// Missing metadata degrades gracefully: with no repository match and no
/// base URL there is nothing to say and the result is empty.
fn render_footer(path_info: &PathInfo, ctx: &BuildContext) -> Result<String> {
    let filepath = path_info.relative_slash_path();

    let info = match &ctx.repo {
        Some(repo) => repo.find_file_info(&filepath)?,
        None => None,
    };

    let Some(base) = &ctx.git_url_base else {
        return Ok(match &info {
            Some(info) => format!("Last modified: {}", format_timestamp(info)),
            None => String::new(),
        });
    };

    let templates =
        path_templates(ctx.git_provider).ok_or_else(|| MarkpressError::UnconfiguredProvider {
            provider: ctx.git_provider.to_string(),
        })?;

    let edit_url = join_template(base, templates.edit_path, ctx, &filepath, info.as_ref())?;
    let history_url = join_template(base, templates.history_path, ctx, &filepath, info.as_ref())?;

    let mut footer = format!("[View source]({edit_url}) | [View history]({history_url})");

    if let Some(info) = &info {
        let commit_url = join_template(base, templates.commit_path, ctx, &filepath, Some(info))?;
        footer.push_str(&format!(" | [{}]({commit_url})", format_timestamp(info)));
    }

    Ok(footer)
}

fn format_timestamp(info: &GitFileInfo) -> String {
    info.committed_at.format("%Y-%m-%d %H:%M:%S").to_string()
}

// ---------------------------------------------------------------------------
// Provider path templates
// ---------------------------------------------------------------------------

/// URL path templates for one hosting provider. `{ref}`, `{filepath}`,
/// and `{last_commit}` are substituted before joining onto the base URL.
struct PathTemplates {
    edit_path: &'static str,
    history_path: &'static str,
    commit_path: &'static str,
}

const GITHUB_TEMPLATES: PathTemplates = PathTemplates {
    edit_path: "/blob/{ref}/{filepath}",
    history_path: "/commits/{ref}/{filepath}",
    commit_path: "/commit/{last_commit}",
};

fn path_templates(provider: GitProvider) -> Option<&'static PathTemplates> {
    match provider {
        GitProvider::Github => Some(&GITHUB_TEMPLATES),
    }
}

/// Substitute template placeholders and join the result onto the base URL.
fn join_template(
    base: &Url,
    template: &str,
    ctx: &BuildContext,
    filepath: &str,
    info: Option<&GitFileInfo>,
) -> Result<Url> {
    let path = template
        .replace("{ref}", &ctx.git_ref)
        .replace("{filepath}", filepath)
        .replace(
            "{last_commit}",
            info.map(|i| i.commit_short.as_str()).unwrap_or_default(),
        );

    base.join(&path).map_err(|e| {
        MarkpressError::config(format!("cannot join '{path}' onto base URL {base}: {e}"))
    })
}

// ---------------------------------------------------------------------------
// convert_gemoji
// ---------------------------------------------------------------------------

/// Delegates to the bundled helper script through the same subprocess
/// path as any external processor.
fn convert_gemoji(ctx: &BuildContext, text: &str) -> Result<String> {
    external::run_external(&ctx.gemoji_script, text.as_bytes())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::bare_context;
    use std::path::{Path, PathBuf};

    fn info_for(ctx: &BuildContext, rel: &str) -> PathInfo {
        ctx.source_path_info(Path::new(rel)).expect("path info")
    }

    #[test]
    fn registry_names_roundtrip() {
        for kind in BuiltinKind::ALL {
            assert_eq!(BuiltinKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(BuiltinKind::from_name("frobnicate"), None);
        assert_eq!(BuiltinKind::valid_names(), "noop, add_footer, convert_gemoji");
    }

    #[test]
    fn noop_returns_input_unchanged() {
        let ctx = bare_context(Path::new("/project"));
        let info = info_for(&ctx, "README.md");

        let out = BuiltinKind::Noop
            .apply(&info, &ctx, "unchanged".into())
            .expect("apply");
        assert_eq!(out, "unchanged");
    }

    #[test]
    fn footer_empty_without_repo_or_base_url() {
        let ctx = bare_context(Path::new("/project"));
        let info = info_for(&ctx, "README.md");

        let out = BuiltinKind::AddFooter
            .apply(&info, &ctx, "# Title\n".into())
            .expect("apply");
        assert_eq!(out, "# Title\n");
    }

    #[test]
    fn footer_links_without_repo() {
        let mut ctx = bare_context(Path::new("/project"));
        ctx.git_url_base = Some(Url::parse("https://example.com").unwrap());
        let info = info_for(&ctx, "docs/intro.md");

        let out = BuiltinKind::AddFooter
            .apply(&info, &ctx, "body".into())
            .expect("apply");

        assert_eq!(
            out,
            "body\n* * *\n\n\
             [View source](https://example.com/blob/HEAD/docs/intro.md) | \
             [View history](https://example.com/commits/HEAD/docs/intro.md)"
        );
    }

    #[test]
    fn footer_uses_configured_ref() {
        let mut ctx = bare_context(Path::new("/project"));
        ctx.git_url_base = Some(Url::parse("https://example.com").unwrap());
        ctx.git_ref = "main".into();
        let info = info_for(&ctx, "README.md");

        let out = render_footer(&info, &ctx).expect("render");
        assert!(out.contains("/blob/main/README.md"));
        assert!(out.contains("/commits/main/README.md"));
    }

    #[test]
    fn absolute_template_path_replaces_base_path() {
        // The templates begin with '/', so RFC 3986 joining replaces any
        // path carried by the base URL.
        let mut ctx = bare_context(Path::new("/project"));
        ctx.git_url_base = Some(Url::parse("https://github.com/acme/docs").unwrap());
        let info = info_for(&ctx, "README.md");

        let out = render_footer(&info, &ctx).expect("render");
        assert!(out.contains("(https://github.com/blob/HEAD/README.md)"));
    }

    #[test]
    fn footer_with_commit_metadata() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let root = tmp.path().canonicalize().expect("canonicalize");
        std::fs::write(root.join("README.md"), "# Hello\n").expect("write");
        git(&root, &["init", "-q"]);
        git(&root, &["add", "README.md"]);
        git(&root, &["commit", "-qm", "add readme"]);

        let mut ctx = bare_context(&root);
        ctx.repo = Some(markpress_git::GitRepo::open(&root).expect("open repo"));
        ctx.git_url_base = Some(Url::parse("https://example.com").unwrap());
        let info = info_for(&ctx, "README.md");

        let out = render_footer(&info, &ctx).expect("render");
        assert!(out.starts_with("[View source]("));
        assert!(out.contains("/commit/"), "commit link present: {out}");
        // Timestamp link segment: " | [YYYY-MM-DD HH:MM:SS](...)"
        assert!(out.contains(" | ["), "timestamp link present: {out}");
    }

    #[test]
    fn last_modified_only_when_repo_but_no_base_url() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let root = tmp.path().canonicalize().expect("canonicalize");
        std::fs::write(root.join("README.md"), "# Hello\n").expect("write");
        git(&root, &["init", "-q"]);
        git(&root, &["add", "README.md"]);
        git(&root, &["commit", "-qm", "add readme"]);

        let mut ctx = bare_context(&root);
        ctx.repo = Some(markpress_git::GitRepo::open(&root).expect("open repo"));
        let info = info_for(&ctx, "README.md");

        let out = render_footer(&info, &ctx).expect("render");
        assert!(out.starts_with("Last modified: "), "footer: {out}");
        // YYYY-MM-DD HH:MM:SS
        assert_eq!(out.len(), "Last modified: ".len() + 19);
    }

    #[cfg(unix)]
    #[test]
    fn convert_gemoji_runs_the_configured_script() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let script = crate::test_support::write_script(
            tmp.path(),
            "gemoji.sh",
            "#!/bin/sh\nsed 's/:star:/⭐/g'\n",
        );

        let mut ctx = bare_context(tmp.path());
        ctx.gemoji_script = script;
        let info = info_for(&ctx, "README.md");

        let out = BuiltinKind::ConvertGemoji
            .apply(&info, &ctx, "Welcome! :star:\n".into())
            .expect("apply");
        assert_eq!(out, "Welcome! ⭐\n");
    }

    #[test]
    fn convert_gemoji_missing_script_is_fatal() {
        let mut ctx = bare_context(Path::new("/project"));
        ctx.gemoji_script = PathBuf::from("/no/such/script.mjs");
        let info = info_for(&ctx, "README.md");

        let err = BuiltinKind::ConvertGemoji
            .apply(&info, &ctx, "text".into())
            .unwrap_err();
        assert!(matches!(err, MarkpressError::ExternalProcessor { .. }));
    }

    fn git(dir: &Path, args: &[&str]) {
        let output = std::process::Command::new("git")
            .args([
                "-c",
                "user.name=markpress-test",
                "-c",
                "user.email=test@example.com",
                "-c",
                "commit.gpgsign=false",
            ])
            .args(args)
            .current_dir(dir)
            .output()
            .expect("run git");
        assert!(
            output.status.success(),
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }
}
