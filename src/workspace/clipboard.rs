//! Clipboard access.

/// Somewhere text can be copied to.
pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> anyhow::Result<()>;

    fn get_text(&mut self) -> anyhow::Result<String>;
}

/// In-process clipboard for tests and headless use.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    text: Option<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> anyhow::Result<()> {
        self.text = Some(text.to_string());
        Ok(())
    }

    fn get_text(&mut self) -> anyhow::Result<String> {
        self.text.clone().ok_or_else(|| anyhow::anyhow!("Clipboard is empty"))
    }
}

/// The operating system clipboard.
#[cfg(feature = "clipboard")]
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

#[cfg(feature = "clipboard")]
impl SystemClipboard {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self { inner: arboard::Clipboard::new()? })
    }
}

#[cfg(feature = "clipboard")]
impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> anyhow::Result<()> {
        self.inner.set_text(text.to_string())?;
        Ok(())
    }

    fn get_text(&mut self) -> anyhow::Result<String> {
        Ok(self.inner.get_text()?)
    }
}
