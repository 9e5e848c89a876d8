use std::io;
use std::process::{Command, Stdio};

use crate::order::BrowserOpener;

/// Opens URLs with the platform's default handler.
pub struct SystemBrowser;

impl SystemBrowser {
    fn command(url: &str) -> io::Result<Command> {
        let mut cmd = if cfg!(target_os = "macos") {
            Command::new("open")
        } else if cfg!(target_os = "windows") {
            let mut cmd = Command::new("rundll32");
            cmd.arg("url.dll,FileProtocolHandler");
            cmd
        } else if cfg!(unix) {
            Command::new("xdg-open")
        } else {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "no browser launcher for this platform",
            ));
        };
        cmd.arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        Ok(cmd)
    }
}

impl BrowserOpener for SystemBrowser {
    fn open(&self, url: &str) -> io::Result<()> {
        // Fire and forget; the launcher outlives us if it has to.
        Self::command(url)?.spawn().map(|_| ())
    }
}
