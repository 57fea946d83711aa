use std::fmt::Display;

use colored::*;
use tracing::info;

pub const TOTAL_WIDTH: usize = 64;
pub const PRINT_TARGET: &str = "flowtally::print";

const KEY_WIDTH: usize = 14;

pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, "{msg}");
}

pub fn header(msg: &str) {
    let formatted: String = format!("⟦ {} ⟧", msg);
    let msg_len: usize = formatted.chars().count();

    let dash_count: usize = TOTAL_WIDTH.saturating_sub(msg_len);
    let left: usize = dash_count / 2;
    let right: usize = dash_count - left;

    let line = format!(
        "{}{}{}",
        "─".repeat(left).bright_black(),
        formatted.to_uppercase().bright_green(),
        "─".repeat(right).bright_black()
    );
    print(&line);
}

pub fn aligned_line<V: Display>(key: &str, value: V) {
    let dots: String = ".".repeat((KEY_WIDTH + 1).saturating_sub(key.len()));
    print_status(format!(
        "{}{}{} {}",
        key.cyan(),
        dots.bright_black(),
        ":".bright_black(),
        value.to_string().white()
    ));
}

pub fn print_status<T: AsRef<str>>(msg: T) {
    print(&format!("{} {}", ">".bright_black(), msg.as_ref()));
}

pub fn end_of_program() {
    print(&"═".repeat(TOTAL_WIDTH).bright_black().to_string());
}
