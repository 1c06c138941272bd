use arboard::Clipboard;
use tracing::trace;

use crate::domain::CCError;

pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<(), CCError>;
}

/// The desktop clipboard. Opened on first use so a missing clipboard
/// provider only surfaces once the user actually copies something.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<Clipboard>,
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), CCError> {
        if self.inner.is_none() {
            self.inner = Some(Clipboard::new()?);
        }
        if let Some(clipboard) = self.inner.as_mut() {
            clipboard.set_text(text)?;
            trace!("Copied {} bytes to clipboard.", text.len());
        }
        Ok(())
    }
}
