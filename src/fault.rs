//! Response classification.
//!
//! [`check_for_error`] is the single gate every response passes before a
//! download result is handed to the caller.

use tracing::debug;

use crate::error::WebDavError;
use crate::session::HttpResponse;

const DAV_NAMESPACE: &str = "DAV:";
const SABRE_NAMESPACE: &str = "http://sabredav.org/ns";

/// Fails with a classified [`WebDavError::Http`] unless the response status is 2xx.
///
/// When a body is supplied and carries a WebDAV fault document, its message
/// is attached to the error.
///
/// # Errors
///
/// Returns [`WebDavError::Http`] for every non-success status.
pub fn check_for_error(response: &HttpResponse, body: Option<&[u8]>) -> Result<(), WebDavError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let message = body.and_then(extract_fault_message);
    debug!(status = status.as_u16(), url = %response.url(), ?message, "response rejected");
    Err(WebDavError::http(
        response.url().as_str(),
        status.as_u16(),
        message,
    ))
}

/// Extracts the human readable message of a WebDAV fault body.
///
/// Only `<d:error>` documents in the `DAV:` namespace whose `<s:message>`
/// child is in the SabreDAV namespace qualify. Anything else, including
/// bodies that are not XML, yields `None`.
#[must_use]
pub fn extract_fault_message(body: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(body).ok()?;
    let document = match roxmltree::Document::parse(text) {
        Ok(document) => document,
        Err(error) => {
            debug!(%error, "fault body is not XML");
            return None;
        }
    };

    let root = document.root_element();
    if !root.has_tag_name((DAV_NAMESPACE, "error")) {
        return None;
    }
    let message = root
        .children()
        .find(|node| node.has_tag_name((SABRE_NAMESPACE, "message")))?
        .text()?
        .trim();
    (!message.is_empty()).then(|| message.to_string())
}
