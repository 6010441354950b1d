//! Copy image locators to the system clipboard

use anyhow::{Context, Result};
use arboard::Clipboard;

use crate::models::ImageItem;

/// Longest text accepted for copying (64 KiB)
const MAX_CLIPBOARD_SIZE: usize = 64 * 1024;

/// Clipboard backend seam (mocked in tests)
trait ClipboardProvider {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

struct SystemClipboard {
    clipboard: Clipboard,
}

impl SystemClipboard {
    fn new() -> Result<Self> {
        let clipboard = Clipboard::new().context("Failed to initialize clipboard")?;
        Ok(Self { clipboard })
    }
}

impl ClipboardProvider for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.clipboard.set_text(text).context("Failed to set clipboard contents")?;
        Ok(())
    }
}

/// Reject text that is blank, oversized or carries control characters
fn validate_clipboard_text(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        anyhow::bail!("Cannot copy empty text to clipboard");
    }

    if text.len() > MAX_CLIPBOARD_SIZE {
        anyhow::bail!(
            "Text too large for clipboard ({} bytes, max {})",
            text.len(),
            MAX_CLIPBOARD_SIZE
        );
    }

    // Backend-supplied strings end up pasted into shells
    if text.chars().any(|c| c.is_control() && c != '\n' && c != '\t') {
        anyhow::bail!("Refusing to copy text containing control characters");
    }

    Ok(())
}

fn copy_with_provider(text: &str, provider: &mut dyn ClipboardProvider) -> Result<()> {
    validate_clipboard_text(text)?;
    provider.set_text(text)
}

/// Copy text to the system clipboard.
///
/// Validation runs before the clipboard is opened, so invalid input fails
/// the same way on headless machines.
///
/// # Errors
/// Returns error if the text is blank, larger than 64 KiB, contains control
/// characters, or the system clipboard is unavailable.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    validate_clipboard_text(text)?;
    let mut clipboard = SystemClipboard::new()?;
    copy_with_provider(text, &mut clipboard)
}

/// Copy the locator of `item`, falling back to the placeholder for blank URLs
pub fn copy_image_url(item: &ImageItem) -> Result<()> {
    copy_to_clipboard(item.display_url())
}
