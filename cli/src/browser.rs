use std::io;
use std::process::Command;
use std::sync::Arc;

use tilt_core::api::OpenUrl;

/// Opens `url` with the OS default handler. Only the launch is checked; the
/// browser itself runs detached.
pub fn open_browser(url: &str) -> io::Result<()> {
    #[cfg(target_os = "macos")]
    let (command, args) = ("open", vec![url]);

    #[cfg(target_os = "linux")]
    let (command, args) = ("xdg-open", vec![url]);

    #[cfg(target_os = "windows")]
    let (command, args) = ("cmd", vec!["/c", "start", "", url]);

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    let (command, args): (&str, Vec<&str>) = {
        return Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "opening a browser is not supported on this platform",
        ));
    };

    let child = Command::new(command).args(&args).spawn()?;
    tracing::info!("launched browser for {} with PID {}", url, child.id());
    Ok(())
}

pub fn browser_opener() -> OpenUrl {
    Arc::new(open_browser)
}
