use std::borrow::Cow;

use arboard::Clipboard;
use image::RgbaImage;

use super::ClipboardSource;
use crate::error::{Error, Result};

/// The OS clipboard, through arboard.
pub struct SystemClipboard {
    inner: Clipboard,
    #[cfg_attr(not(target_os = "linux"), allow(dead_code))]
    hold_selection: bool,
}

impl SystemClipboard {
    /// Fails when no clipboard is reachable (no display server, no session).
    pub fn open() -> Result<Self> {
        Ok(SystemClipboard {
            inner: Clipboard::new()?,
            hold_selection: false,
        })
    }

    /// On X11/Wayland the clipboard contents belong to the writing process.
    /// With this set, writes block until another application takes over the
    /// selection, so a short-lived process can hand its content off.
    pub fn hold_selection(mut self, hold: bool) -> Self {
        self.hold_selection = hold;
        self
    }
}

impl ClipboardSource for SystemClipboard {
    fn read_text(&mut self) -> Result<Option<String>> {
        match self.inner.get_text() {
            Ok(text) => Ok(Some(text)),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn read_image(&mut self) -> Result<Option<RgbaImage>> {
        let data = match self.inner.get_image() {
            Ok(data) => data,
            Err(arboard::Error::ContentNotAvailable) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let (width, height) = (data.width, data.height);
        if width == 0 || height == 0 {
            return Ok(None);
        }

        let image = RgbaImage::from_raw(width as u32, height as u32, data.bytes.into_owned())
            .ok_or(Error::ImageBuffer { width, height })?;

        Ok(Some(image))
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        #[cfg(target_os = "linux")]
        if self.hold_selection {
            use arboard::SetExtLinux;
            self.inner.set().wait().text(text.to_owned())?;
            return Ok(());
        }

        self.inner.set_text(text.to_owned())?;
        Ok(())
    }

    fn write_image(&mut self, image: &RgbaImage) -> Result<()> {
        let data = arboard::ImageData {
            width: image.width() as usize,
            height: image.height() as usize,
            bytes: Cow::Borrowed(image.as_raw()),
        };

        #[cfg(target_os = "linux")]
        if self.hold_selection {
            use arboard::SetExtLinux;
            self.inner.set().wait().image(data)?;
            return Ok(());
        }

        self.inner.set_image(data)?;
        Ok(())
    }
}
