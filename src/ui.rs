//! Terminal output helpers.
//!
//! - `rule` - the horizontal separator used around build and program output
//! - `banner` - the header printed before a build starts
//! - `Table` - two-or-more column table with box-drawing borders, used to
//!   dump the effective configuration when discovery comes up empty

use crate::config::BuildConfig;
use colored::*;
use console::measure_text_width;
use std::path::Path;

const RULE_WIDTH: usize = 50;

pub fn rule() -> String {
    "-".repeat(RULE_WIDTH)
}

pub fn banner(cwd: &Path, config: &BuildConfig) {
    println!("{}", rule());
    println!("Building Project: {}", cwd.display().to_string().bold());
    println!("Using Configuration: {}", config.config_file.display());
    println!("Using {}", config.compiler.cyan());
    println!("{}\n", rule());
}

pub fn print_config(config: &BuildConfig) {
    println!("\nConfig File");
    let mut table = Table::new(&["Key", "Value"]);
    for (key, value) in config.display_rows() {
        table.add_row(vec![key, value]);
    }
    table.print();
}

pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Rows with the wrong number of cells are dropped.
    pub fn add_row(&mut self, row: Vec<String>) {
        if row.len() == self.headers.len() {
            self.rows.push(row);
        }
    }

    pub fn render(&self) -> Vec<String> {
        if self.headers.is_empty() {
            return Vec::new();
        }

        let mut widths: Vec<usize> = self.headers.iter().map(|h| measure_text_width(h)).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(measure_text_width(&flatten(cell)));
            }
        }

        let border = |left: &str, mid: &str, right: &str| {
            let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("  {}{}{}", left, segments.join(mid), right)
        };
        let line = |cells: &[String]| {
            let mut s = String::from("  │");
            for (cell, width) in cells.iter().zip(&widths) {
                let text = flatten(cell);
                let pad = width.saturating_sub(measure_text_width(&text));
                s.push_str(&format!(" {}{} │", text, " ".repeat(pad)));
            }
            s
        };

        let mut out = vec![border("┌", "┬", "┐"), line(&self.headers), border("├", "┼", "┤")];
        out.extend(self.rows.iter().map(|row| line(row)));
        out.push(border("└", "┴", "┘"));
        out
    }

    pub fn print(&self) {
        for line in self.render() {
            println!("{}", line);
        }
    }
}

fn flatten(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            _ => c,
        })
        .collect()
}
