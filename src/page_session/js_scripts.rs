//! JavaScript evaluation scripts
//!
//! This module contains the JavaScript code evaluated in the live page
//! to read back post-render state.

/// Doctype declaration plus `documentElement.outerHTML`.
///
/// Evaluated in-page so the result reflects the DOM after client-side
/// rendering, not the server response.
pub const SNAPSHOT_SCRIPT: &str = r#"
    (() => {
        const dt = document.doctype;
        const doctype = dt
            ? "<!DOCTYPE " + dt.name
                + (dt.publicId ? ' PUBLIC "' + dt.publicId + '"' : '')
                + (!dt.publicId && dt.systemId ? ' SYSTEM' : '')
                + (dt.systemId ? ' "' + dt.systemId + '"' : '')
                + ">"
            : null;
        return {
            doctype: doctype,
            outerHTML: document.documentElement.outerHTML
        };
    })()
"#;

/// Text content of every `<style>` block, in document order
pub const INLINE_STYLES_SCRIPT: &str = r"
    Array.from(document.querySelectorAll('style')).map(s => s.textContent || '')
";

/// `href` attribute of every stylesheet link exactly as authored
pub const STYLESHEET_HREFS_SCRIPT: &str = r#"
    Array.from(document.querySelectorAll('link[rel="stylesheet"]'))
        .map(link => link.getAttribute('href'))
"#;

/// Non-empty `style` attribute values, in document order
pub const DYNAMIC_STYLES_SCRIPT: &str = r"
    Array.from(document.querySelectorAll('[style]'))
        .map(el => el.getAttribute('style'))
        .filter(style => style)
";

/// Build a readiness probe for `selector`.
///
/// Returns `true` once the element exists (and, when `visible`, has a
/// rendered box that is not hidden).
#[must_use]
pub fn selector_probe_script(selector: &str, visible: bool) -> String {
    let quoted = quote_js(selector);
    if visible {
        format!(
            r"
    (() => {{
        const el = document.querySelector({quoted});
        if (!el) return false;
        const style = window.getComputedStyle(el);
        if (style.visibility === 'hidden' || style.display === 'none') return false;
        return el.getClientRects().length > 0;
    }})()
"
        )
    } else {
        format!("document.querySelector({quoted}) !== null")
    }
}

/// Number of elements matching `selector`
#[must_use]
pub fn selector_count_script(selector: &str) -> String {
    format!("document.querySelectorAll({}).length", quote_js(selector))
}

fn quote_js(value: &str) -> String {
    // JSON string literals are valid JavaScript string literals
    serde_json::Value::String(value.to_string()).to_string()
}
