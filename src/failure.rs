//! Terminal failure boundary.
//!
//! The dispatch entry point owns exactly one [`FailureHandler`], built from
//! the context once the configuration is final; constructing a replacement
//! supersedes the previous one. Any error that escapes request processing is
//! handed to it once: the handler composes the entire 500-equivalent
//! response, emits it, and terminates the request. Composition is pure
//! string building and cannot fail; emission ignores write errors — this is
//! the last line of defense and must never itself fail.

use std::error::Error;
use std::io::Write;
use std::process;

use tracing::error;

use crate::core::context::SwarmContext;

/// Transmission state of the inciting request's response.
#[derive(Debug, Clone)]
pub struct ResponseState {
    /// Protocol version of the inciting request, echoed in the status line.
    pub protocol: String,
    /// Once transmission has begun, no status line may be emitted.
    pub headers_sent: bool,
}

impl Default for ResponseState {
    fn default() -> Self {
        Self {
            protocol: "HTTP/1.1".to_string(),
            headers_sent: false,
        }
    }
}

/// The composed terminal response.
#[derive(Debug, Clone)]
pub struct FailureResponse {
    /// `None` when transmission had already begun.
    pub status_line: Option<String>,
    pub body: String,
}

/// Process-wide terminal handler for escaped errors.
pub struct FailureHandler {
    show_details: bool,
}

impl FailureHandler {
    /// Build the handler from the context's diagnostic policy.
    pub fn install(ctx: &SwarmContext) -> Self {
        Self {
            show_details: ctx.debug().show_exception_details,
        }
    }

    /// Compose the terminal response for an escaped failure. Detail is
    /// all-or-nothing: either the escaped message plus origin trace, or the
    /// generic pointer to the config flag — never both, never partial.
    pub fn render(&self, state: &ResponseState, failure: &dyn Error) -> FailureResponse {
        let status_line = (!state.headers_sent)
            .then(|| format!("{} 500 Swarm Internal Error", state.protocol));

        let mut body = String::from("<h2>Swarm internal error</h2>\n\n");
        if self.show_details {
            body.push_str(&format!(
                "<p>{}</p><p>Backtrace:</p><p>{}</p>\n",
                nl2br(&escape_html(&failure.to_string())),
                nl2br(&escape_html(&origin_trace(failure))),
            ));
        } else {
            body.push_str(
                "<p>Set <b><tt>show_exception_details = \"1\"</tt></b> \
                 in the <tt>[debug]</tt> section at the bottom of swarm.toml \
                 to show detailed debugging information.</p>",
            );
        }

        FailureResponse { status_line, body }
    }

    /// Emit the composed response on `out` and terminate. Never returns and
    /// never re-enters: escaping this path is an unrecoverable crash.
    pub fn trap(&self, state: &ResponseState, failure: &dyn Error, mut out: impl Write) -> ! {
        error!(%failure, "unhandled failure — terminating request");
        let response = self.render(state, failure);
        if let Some(line) = &response.status_line {
            let _ = writeln!(out, "{line}");
            let _ = writeln!(out);
        }
        let _ = out.write_all(response.body.as_bytes());
        let _ = out.flush();
        process::exit(1);
    }
}

/// Numbered origin trace: the failure's cause chain, closed by the
/// entry-point frame so the section is never empty.
fn origin_trace(failure: &dyn Error) -> String {
    let mut frames = Vec::new();
    let mut depth = 0usize;
    let mut cause = failure.source();
    while let Some(c) = cause {
        frames.push(format!("#{depth} {c}"));
        cause = c.source();
        depth += 1;
    }
    frames.push(format!("#{depth} {{main}}"));
    frames.join("\n")
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

fn nl2br(text: &str) -> String {
    text.replace('\n', "<br />\n")
}
