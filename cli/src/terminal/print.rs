use std::fmt::Display;

use colored::*;
use tracing::info;

pub const TOTAL_WIDTH: usize = 64;
pub const KEY_WIDTH: usize = 12;

const PRIMARY: Color = Color::BrightGreen;
const ACCENT: Color = Color::Yellow;
const SEPARATOR: Color = Color::BrightBlack;
const TEXT_DEFAULT: Color = Color::White;

pub fn print(msg: &str) {
    info!(target: "netroute::print", raw_msg = msg);
}

pub fn blank() {
    print("");
}

pub fn header(msg: &str) {
    let formatted: String = format!("⟦ {} ⟧", msg);
    let msg_len: usize = console::measure_text_width(&formatted);

    let dash_count: usize = TOTAL_WIDTH.saturating_sub(msg_len);
    let left: usize = dash_count / 2;
    let right: usize = dash_count - left;

    let line: ColoredString = format!(
        "{}{}{}",
        "─".repeat(left),
        formatted.to_uppercase().bright_green(),
        "─".repeat(right)
    )
    .bright_black();

    print(&format!("{}", line));
}

pub fn fat_separator() {
    let sep: ColoredString = "═".repeat(TOTAL_WIDTH).color(SEPARATOR);
    print(&format!("{}", sep));
}

pub fn aligned_line<V: Display>(key: &str, value: V) {
    let dots: String = ".".repeat((KEY_WIDTH + 1).saturating_sub(key.len()));
    let colon: String = format!("{}{}", dots.color(SEPARATOR), ":".color(SEPARATOR));
    print_status(format!("{}{} {}", key.color(PRIMARY), colon, value));
}

pub fn print_status<T: AsRef<str>>(msg: T) {
    let prefix: ColoredString = ">".color(SEPARATOR);
    let message: String = format!("{} {}", prefix, msg.as_ref().color(TEXT_DEFAULT));
    print(&message);
}

pub fn tree_head(idx: usize, name: &str) {
    let idx_str: String = format!("[{}]", idx.to_string().color(ACCENT));
    let output: String = format!("{} {}", idx_str.color(SEPARATOR), name.color(PRIMARY));
    print(&output);
}

pub fn as_tree_one_level(key_value_pair: &[(&str, ColoredString)]) {
    for (i, (key, value)) in key_value_pair.iter().enumerate() {
        let last: bool = i + 1 == key_value_pair.len();
        let branch: ColoredString = if !last {
            "├─".bright_black()
        } else {
            "└─".bright_black()
        };
        let output: String = format!(
            " {} {}{}{} {}",
            branch,
            key.color(TEXT_DEFAULT),
            ".".repeat(9usize.saturating_sub(key.len())).color(SEPARATOR),
            ":".color(SEPARATOR),
            value
        );
        print(&output);
    }
}

pub fn centerln(msg: &str) {
    let space = " ".repeat(TOTAL_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2);
    print(&format!("{}{}{}", space, msg, space));
}
