//! Client-side export formats for a generated script.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::Serialize;

use railqa_core::config::ViewerConfig;

use crate::error::ExportError;

/// File name used for every downloaded diagram.
pub const DOWNLOAD_FILE_NAME: &str = "process.md";

const FENCE_OPEN: &str = "```mermaid\n";
const FENCE_CLOSE: &str = "\n```";

/// Wrap a script in a fenced `mermaid` code block.
pub fn download_document(script: &str) -> String {
    format!("{FENCE_OPEN}{script}{FENCE_CLOSE}")
}

/// Editor state understood by the Mermaid Live `#base64:` fragment.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EditorState<'a> {
    code: &'a str,
    /// Mermaid config, itself a JSON document stored as a string.
    mermaid: String,
    auto_sync: bool,
    update_diagram: bool,
}

/// Build a deep link that opens `script` in the external editor.
///
/// The fragment is `base64:` followed by the URL-safe, unpadded base64 of
/// the JSON editor state.
pub fn viewer_url(script: &str, viewer: &ViewerConfig) -> Result<String, ExportError> {
    let mermaid = serde_json::to_string_pretty(&serde_json::json!({ "theme": viewer.theme }))?;
    let state = EditorState {
        code: script,
        mermaid,
        auto_sync: true,
        update_diagram: true,
    };
    let encoded = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&state)?);
    Ok(format!("{}#base64:{}", viewer.base_url, encoded))
}
