use clap::builder::styling::{AnsiColor, Color, Style};
use clap::builder::Styles;
use crossterm::style::Stylize;

use storefront::{Notice, PackageDisplayState};

// ═══════════════════════════════════════════════════════════════════════════════
// Clap Styles
// ═══════════════════════════════════════════════════════════════════════════════

pub fn get_styles() -> Styles {
    let heading = Style::new()
        .bold()
        .underline()
        .fg_color(Some(Color::Ansi(AnsiColor::Cyan)));
    let red = Style::new()
        .bold()
        .fg_color(Some(Color::Ansi(AnsiColor::Red)));

    Styles::styled()
        .usage(heading)
        .header(heading)
        .literal(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .invalid(red)
        .error(red)
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack))))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Palette
// ═══════════════════════════════════════════════════════════════════════════════

pub mod colors {
    use crossterm::style::Color;

    pub const CYAN: Color = Color::Rgb {
        r: 0,
        g: 255,
        b: 255,
    };
    pub const GREEN: Color = Color::Rgb {
        r: 0,
        g: 255,
        b: 136,
    };
    pub const ORANGE: Color = Color::Rgb {
        r: 255,
        g: 165,
        b: 0,
    };
    pub const RED: Color = Color::Rgb {
        r: 255,
        g: 85,
        b: 85,
    };
    pub const DIM: Color = Color::Rgb {
        r: 128,
        g: 128,
        b: 128,
    };
}

pub const CHECK: &str = "✓";
pub const CROSS_MARK: &str = "✗";
pub const BULLET: &str = "●";

// ═══════════════════════════════════════════════════════════════════════════════
// Output
// ═══════════════════════════════════════════════════════════════════════════════

/// One catalog row: name, version, package identifier and category.
pub fn print_package(package: &PackageDisplayState) {
    let d = &package.descriptor;
    let marker = if package.is_downloading {
        format!("{}%", package.download_progress).with(colors::ORANGE)
    } else {
        BULLET.to_string().with(colors::CYAN)
    };
    println!(
        "{} {} {} {} {}",
        marker,
        d.name.as_str().bold(),
        format!("v{}", d.version).with(colors::DIM),
        d.package_name.as_str().with(colors::CYAN),
        format!("[{}]", d.category).with(colors::DIM),
    );
}

pub fn print_category(category: &str) {
    println!("{} {}", BULLET.with(colors::CYAN), category);
}

/// A notice published while a command runs.
pub fn print_notice(notice: &Notice) {
    let (mark, color) = if notice.kind.is_error() {
        (CROSS_MARK, colors::RED)
    } else {
        (CHECK, colors::GREEN)
    };
    match &notice.body {
        Some(body) => println!(
            "{} {} {}",
            mark.with(color),
            notice.title.as_str().bold(),
            body.as_str().with(colors::DIM)
        ),
        None => println!("{} {}", mark.with(color), notice.title.as_str().bold()),
    }
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", CROSS_MARK.with(colors::RED), message.with(colors::RED));
}
