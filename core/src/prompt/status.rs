use crossterm::style::{style, Color, Stylize};

use crate::state::{WebHost, WebUrl};

pub const MENU_BROWSER: &str = "(space) to open the browser";
pub const MENU_STREAM: &str = "(s) to stream logs";
pub const MENU_HUD: &str = "(h) to open terminal HUD";
pub const MENU_EXIT: &str = "(ctrl-c) to exit";

/// First line of the prompt banner, without styling.
pub fn start_status_line(url: &WebUrl, host: &WebHost) -> String {
    let server_status = if url.is_empty() {
        "(without browser UI)".to_string()
    } else if host.is_wildcard() {
        format!("on {} (listening on {})", url, WebHost::WILDCARD)
    } else {
        format!("on {}", url)
    };
    format!("Tilt started {}", server_status)
}

/// Every line of the banner, in print order.
///
/// Lines of `init_output` that repeat the status line or the build stamp are
/// dropped; the rest are printed verbatim, so output ending in a newline
/// yields a trailing blank line.
pub fn banner_lines(
    status_line: &str,
    build_stamp: &str,
    init_output: &str,
    has_browser_ui: bool,
) -> Vec<String> {
    let mut lines = vec![
        style(status_line).with(Color::Green).to_string(),
        build_stamp.to_string(),
        String::new(),
    ];

    lines.extend(
        init_output
            .split('\n')
            .filter(|line| !line.contains(status_line) && !line.starts_with(build_stamp))
            .map(str::to_string),
    );

    if has_browser_ui {
        lines.push(MENU_BROWSER.to_string());
    }
    lines.push(MENU_STREAM.to_string());
    lines.push(MENU_HUD.to_string());
    lines.push(MENU_EXIT.to_string());
    lines
}
