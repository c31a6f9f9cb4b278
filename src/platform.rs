use std::path::PathBuf;

use directories::UserDirs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOS,
    Linux,
    Windows,
    Unknown,
}

pub fn detect() -> Platform {
    match std::env::consts::OS {
        "macos" => Platform::MacOS,
        "linux" => Platform::Linux,
        "windows" => Platform::Windows,
        _ => Platform::Unknown,
    }
}

pub fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

/// Where the platform's screenshot tool saves by default:
/// - macOS: the desktop
/// - Windows (Win+PrtScn, Snipping Tool): Pictures\Screenshots
/// - Linux (GNOME, KDE Spectacle): Pictures/Screenshots
///
/// Falls back to the desktop, then ~/Desktop.
pub fn screenshot_dir(platform: Platform) -> Option<PathBuf> {
    let dirs = UserDirs::new();
    let desktop = || {
        dirs.as_ref()
            .and_then(|d| d.desktop_dir().map(PathBuf::from))
            .or_else(|| home_dir().map(|h| h.join("Desktop")))
    };

    match platform {
        Platform::Windows | Platform::Linux => dirs
            .as_ref()
            .and_then(|d| d.picture_dir())
            .map(|p| p.join("Screenshots"))
            .filter(|p| p.is_dir())
            .or_else(desktop),
        Platform::MacOS | Platform::Unknown => desktop(),
    }
}
