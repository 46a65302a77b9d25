//! Terminal output of the csn-typer CLI.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use csn_typer::{Diagnostic, Severity};

pub mod colors {
    use console::Color;

    pub const CYAN: Color = Color::Color256(51);
    pub const MAGENTA: Color = Color::Color256(201);
    pub const AMBER: Color = Color::Color256(214);
    pub const NEON_GREEN: Color = Color::Color256(82);
    pub const DIM: Color = Color::Color256(240);
}

pub mod symbols {
    pub const DIAMOND: &str = "\u{25C6}"; // ◆
    pub const DIAMOND_OUTLINE: &str = "\u{25C7}"; // ◇
    pub const TARGET_FILLED: &str = "\u{25C9}"; // ◉
    pub const TRIANGLE: &str = "\u{25B8}"; // ▸
    pub const DOT: &str = "\u{00B7}"; // ·
}

/// Print compact version header
pub fn print_compact_header(version: &str) {
    println!(
        "  {} {} {}",
        style(symbols::DIAMOND).fg(colors::CYAN),
        style("csn-typer").fg(colors::CYAN).bold(),
        style(version).dim()
    );
    println!();
}

pub fn success(msg: &str) {
    println!(
        "  {} {}",
        style(symbols::TARGET_FILLED).fg(colors::NEON_GREEN),
        msg
    );
}

pub fn info(msg: &str) {
    println!(
        "  {} {}",
        style(symbols::DIAMOND_OUTLINE).fg(colors::CYAN),
        msg
    );
}

pub fn dim(msg: &str) {
    println!("  {}", style(msg).fg(colors::DIM));
}

/// One collected finding, colored by severity.
pub fn diagnostic(entry: &Diagnostic) {
    let (label, color) = match entry.severity {
        Severity::Warning => ("warning", colors::AMBER),
        Severity::Error => ("error", colors::MAGENTA),
    };
    println!(
        "  {} {} {}",
        style(symbols::TRIANGLE).fg(color),
        style(format!("{}[{}]", label, entry.subject)).fg(color).bold(),
        entry.message
    );
}

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("\u{25CE}\u{25C9}\u{25CE}\u{25C9}") // ◎◉◎◉
            .template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(150));
    pb
}

pub fn box_header(title: &str) {
    let width = 55;
    let title_padded = format!(" {} ", title);
    let title_len = title_padded.chars().count();
    let dashes = width - title_len - 4;

    println!(
        "  {}{}{}{}",
        style("\u{256D}\u{2500}").fg(colors::CYAN), // ╭─
        style(title_padded).fg(colors::CYAN).bold(),
        style("\u{2500}".repeat(dashes)).fg(colors::CYAN),
        style("\u{256E}").fg(colors::CYAN) // ╮
    );
}

pub fn box_line(content: &str) {
    let width: usize = 53;
    let content_len = content.chars().count();
    let padding = width.saturating_sub(content_len);
    println!(
        "  {} {}{}{}",
        style("\u{2502}").fg(colors::CYAN), // │
        content,
        " ".repeat(padding),
        style("\u{2502}").fg(colors::CYAN)
    );
}

pub fn box_footer() {
    let width = 55;
    println!(
        "  {}{}{}",
        style("\u{2570}").fg(colors::CYAN), // ╰
        style("\u{2500}".repeat(width - 2)).fg(colors::CYAN),
        style("\u{256F}").fg(colors::CYAN) // ╯
    );
}

/// A namespace line inside a box: `▸ sap/common   index.ts · index.js`.
pub fn namespace_line(directory: &str, has_runtime: bool) -> String {
    let directory = if directory.is_empty() { "." } else { directory };
    let files = if has_runtime {
        format!("index.ts {} index.js", symbols::DOT)
    } else {
        "index.ts".to_string()
    };
    format!("{} {:<28} {}", symbols::TRIANGLE, directory, files)
}

pub fn timing(label: &str, duration_ms: u128) {
    println!(
        "  {} {} in {}ms",
        style(symbols::DIAMOND_OUTLINE).fg(colors::CYAN),
        label,
        duration_ms
    );
}

/// Header for a failed compilation.
pub fn nope_header() {
    println!();
    println!(
        "  {} {}",
        style(symbols::DIAMOND).fg(colors::MAGENTA).bold(),
        style("Nope.").fg(colors::MAGENTA).bold()
    );
    println!();
}

pub fn looking_good() {
    println!(
        "  {} {}",
        style(symbols::TARGET_FILLED).fg(colors::NEON_GREEN),
        style("Looking good.").bold()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_line_names_root_directory() {
        let line = namespace_line("", true);
        assert!(line.starts_with("\u{25B8} . "));
        assert!(line.ends_with("index.ts \u{00B7} index.js"));
    }

    #[test]
    fn libraries_have_no_runtime() {
        assert!(namespace_line("cds/hana", false).ends_with("index.ts"));
        assert!(!namespace_line("cds/hana", false).contains("index.js"));
    }
}
