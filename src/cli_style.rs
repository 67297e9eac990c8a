use clap::builder::styling::{AnsiColor, Style};
use clap::builder::Styles;

const TITLE: Style = AnsiColor::Cyan.on_default().bold().underline();
const LITERAL: Style = AnsiColor::Green.on_default().bold();
const FAILURE: Style = AnsiColor::Red.on_default().bold();
const PLACEHOLDER: Style = AnsiColor::BrightBlack.on_default();

pub fn get_styles() -> Styles {
    Styles::styled()
        .usage(TITLE)
        .header(TITLE)
        .literal(LITERAL)
        .invalid(FAILURE)
        .error(FAILURE)
        .placeholder(PLACEHOLDER)
}
