// UI layer: everything that touches the terminal. Printing goes through
// the `Output` sink and prompting through `Prompter`, so the command
// flows can run against in-memory implementations in tests.

use crate::error::{Error, Result};
use crossterm::style::{style, Stylize};
use dialoguer::{Confirm, MultiSelect};
use indicatif::{ProgressBar, ProgressStyle};
use std::cell::RefCell;
use std::io;
use std::time::Duration;

/// Visual weight of a printed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Heading,
    Info,
    Success,
    Warning,
    Error,
    Dim,
}

/// Where user-facing output goes.
pub trait Output {
    /// Print one line of text.
    fn print(&self, tone: Tone, text: &str);

    /// Print a rendered table.
    fn table(&self, table: &Table);

    /// Start a progress indicator; `None` means an unbounded spinner.
    fn progress(&self, total: Option<u64>, message: &str) -> ProgressBar;
}

/// Colored stdout output with indicatif progress bars.
#[derive(Default)]
pub struct ConsoleOutput {
    active: RefCell<Option<ProgressBar>>,
}

impl ConsoleOutput {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Output for ConsoleOutput {
    fn print(&self, tone: Tone, text: &str) {
        let styled = match tone {
            Tone::Plain => text.to_string(),
            Tone::Heading => style(text).bold().to_string(),
            Tone::Info => style(text).cyan().to_string(),
            Tone::Success => style(text).green().to_string(),
            Tone::Warning => style(text).yellow().to_string(),
            Tone::Error => style(text).red().bold().to_string(),
            Tone::Dim => style(text).dim().to_string(),
        };
        // Route through the live bar so it is redrawn below the line.
        match self.active.borrow().as_ref() {
            Some(bar) if !bar.is_finished() => bar.println(styled),
            _ => println!("{}", styled),
        }
    }

    fn table(&self, table: &Table) {
        for line in table.render() {
            self.print(Tone::Plain, &line);
        }
    }

    fn progress(&self, total: Option<u64>, message: &str) -> ProgressBar {
        let bar = match total {
            Some(len) => {
                let bar = ProgressBar::new(len);
                bar.set_style(
                    ProgressStyle::with_template("{spinner} {msg} [{bar:30}] {pos}/{len}")
                        .unwrap_or_else(|_| ProgressStyle::default_bar()),
                );
                bar
            }
            None => {
                let bar = ProgressBar::new_spinner();
                bar.set_style(
                    ProgressStyle::with_template("{spinner} {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                bar
            }
        };
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        *self.active.borrow_mut() = Some(bar.clone());
        bar
    }
}

/// Collects plain lines in memory; progress bars are hidden.
#[derive(Default)]
pub struct BufferedOutput {
    lines: RefCell<Vec<String>>,
}

impl BufferedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// True if any printed line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.borrow().iter().any(|l| l.contains(needle))
    }
}

impl Output for BufferedOutput {
    fn print(&self, _tone: Tone, text: &str) {
        self.lines.borrow_mut().push(text.to_string());
    }

    fn table(&self, table: &Table) {
        self.lines.borrow_mut().extend(table.render());
    }

    fn progress(&self, _total: Option<u64>, _message: &str) -> ProgressBar {
        ProgressBar::hidden()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
    Center,
}

/// A plain text table with a title and aligned columns.
#[derive(Debug, Clone)]
pub struct Table {
    title: String,
    columns: Vec<(String, Align)>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(title: &str) -> Self {
        Table {
            title: title.to_string(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn column(mut self, name: &str, align: Align) -> Self {
        self.columns.push((name.to_string(), align));
        self
    }

    /// Add a row; missing cells render empty, extra cells are dropped.
    pub fn add_row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    pub fn render(&self) -> Vec<String> {
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, (name, _))| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let format_row = |cells: Vec<&str>, aligns: &[Align]| -> String {
            let parts: Vec<String> = cells
                .iter()
                .zip(widths.iter().zip(aligns))
                .map(|(cell, (width, align))| pad(cell, *width, *align))
                .collect();
            format!("│ {} │", parts.join(" │ "))
        };

        let rule = |left: &str, mid: &str, right: &str| -> String {
            let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("{}{}{}", left, segments.join(mid), right)
        };

        let mut lines = vec![self.title.clone(), rule("┌", "┬", "┐")];
        let header_aligns = vec![Align::Left; self.columns.len()];
        lines.push(format_row(
            self.columns.iter().map(|(n, _)| n.as_str()).collect(),
            &header_aligns,
        ));
        lines.push(rule("├", "┼", "┤"));

        let aligns: Vec<Align> = self.columns.iter().map(|(_, a)| *a).collect();
        for row in &self.rows {
            let cells = (0..self.columns.len())
                .map(|i| row.get(i).map(String::as_str).unwrap_or(""))
                .collect();
            lines.push(format_row(cells, &aligns));
        }
        lines.push(rule("└", "┴", "┘"));
        lines
    }
}

fn pad(cell: &str, width: usize, align: Align) -> String {
    let fill = width.saturating_sub(cell.chars().count());
    match align {
        Align::Left => format!("{}{}", cell, " ".repeat(fill)),
        Align::Right => format!("{}{}", " ".repeat(fill), cell),
        Align::Center => {
            let left = fill / 2;
            format!("{}{}{}", " ".repeat(left), cell, " ".repeat(fill - left))
        }
    }
}

/// Format a byte count as gigabytes with two decimals, e.g. "12.34 GB".
pub fn bytes_to_gb(size_bytes: u64) -> String {
    let gb = size_bytes as f64 / (1024u64.pow(3)) as f64;
    format!("{:.2} GB", gb)
}

/// One row of a checkbox prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectItem {
    pub label: String,
    pub checked: bool,
}

/// Asking the user things.
pub trait Prompter {
    /// Yes/no question; the default answer is "no".
    fn confirm(&self, prompt: &str) -> Result<bool>;

    /// Checkbox list. Returns the chosen indices, or `None` when the
    /// user cancelled.
    fn select(&self, prompt: &str, items: &[SelectItem]) -> Result<Option<Vec<usize>>>;
}

/// Keyboard-driven prompts using `dialoguer`.
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        match Confirm::new().with_prompt(prompt).default(false).interact() {
            Ok(answer) => Ok(answer),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn select(&self, prompt: &str, items: &[SelectItem]) -> Result<Option<Vec<usize>>> {
        let choices: Vec<(&str, bool)> = items
            .iter()
            .map(|item| (item.label.as_str(), item.checked))
            .collect();
        // `interact_opt` returns None on Esc/q; Ctrl+C surfaces as Interrupted.
        match MultiSelect::new()
            .with_prompt(prompt)
            .items_checked(&choices)
            .interact_opt()
        {
            Ok(selection) => Ok(selection),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Stand-in used when no terminal is attached.
pub struct UnavailablePrompter;

impl Prompter for UnavailablePrompter {
    fn confirm(&self, _prompt: &str) -> Result<bool> {
        Err(Error::SelectionUnavailable(
            "no interactive terminal; pass --yes to skip confirmation".into(),
        ))
    }

    fn select(&self, _prompt: &str, _items: &[SelectItem]) -> Result<Option<Vec<usize>>> {
        Err(Error::SelectionUnavailable(
            "interactive selection requires a terminal on stdin and stdout".into(),
        ))
    }
}
