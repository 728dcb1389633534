//! Diagnostic echo of outgoing messages.
//!
//! The client calls its sink right before handing a text message or
//! update record to the transport, and only in debug builds. A sink sees
//! a rendering of the message, never the framed bytes.

/// Receives human-readable renderings of outgoing messages.
pub trait DiagnosticSink {
    /// `label` names the send operation (e.g. `SendGamePacket`), `text`
    /// is the message or the record's sparse rendering.
    fn echo(&self, label: &str, text: &str);
}

/// Discards every echo.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn echo(&self, _label: &str, _text: &str) {}
}

/// Emits echoes as `tracing` debug events on the `relaywire::echo`
/// target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn echo(&self, label: &str, text: &str) {
        tracing::debug!(target: "relaywire::echo", label, "\n{text}");
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &S {
    fn echo(&self, label: &str, text: &str) {
        (**self).echo(label, text);
    }
}
