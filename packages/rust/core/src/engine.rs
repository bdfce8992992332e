//! Per-file chain execution.
//!
//! The file's bytes are read once and folded through its chain. Content
//! between steps is either decoded text or raw bytes; coercions happen
//! only at step boundaries. Builtins require and return text; externals
//! take bytes and return text. An empty chain never touches the bytes at
//! all, which keeps binary files intact.

use std::path::Path;

use markpress_shared::{MarkpressError, PathInfo, Result};

use crate::chain::TransformStep;
use crate::context::BuildContext;
use crate::external;

/// Content moving through a chain, in whichever representation the last
/// step produced.
#[derive(Debug)]
enum Content {
    Text(String),
    Bytes(Vec<u8>),
}

impl Content {
    /// Coerce to text; non-UTF-8 bytes are fatal for the file.
    fn into_text(self, source_path: &Path) -> Result<String> {
        match self {
            Self::Text(text) => Ok(text),
            Self::Bytes(bytes) => String::from_utf8(bytes).map_err(|e| MarkpressError::Encoding {
                path: source_path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Coerce to bytes; text is UTF-8 encoded.
    fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Text(text) => text.into_bytes(),
            Self::Bytes(bytes) => bytes,
        }
    }
}

/// Run one file's content through its resolved chain and return the final
/// bytes to write into the build tree.
pub fn process_file(
    path_info: &PathInfo,
    ctx: &BuildContext,
    chain: &[TransformStep],
) -> Result<Vec<u8>> {
    let bytes = std::fs::read(&path_info.absolute_source_path)
        .map_err(|e| MarkpressError::io(&path_info.absolute_source_path, e))?;

    let mut content = Content::Bytes(bytes);
    for step in chain {
        content = match step {
            TransformStep::Builtin(kind) => {
                let text = content.into_text(&path_info.absolute_source_path)?;
                Content::Text(kind.apply(path_info, ctx, text)?)
            }
            TransformStep::External(processor) => {
                Content::Text(external::run_external(processor, &content.into_bytes())?)
            }
        };
    }

    Ok(content.into_bytes())
}
