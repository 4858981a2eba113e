use std::io::Write;

use termion::{color, style};

/// Foreground/background color of a table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    White,
    Red,
    Green,
    Yellow,
    Cyan,
}

impl Color {
    fn fg_str(self) -> &'static str {
        match self {
            Color::White => color::White.fg_str(),
            Color::Red => color::Red.fg_str(),
            Color::Green => color::Green.fg_str(),
            Color::Yellow => color::Yellow.fg_str(),
            Color::Cyan => color::Cyan.fg_str(),
        }
    }

    fn bg_str(self) -> &'static str {
        match self {
            Color::White => color::White.bg_str(),
            Color::Red => color::Red.bg_str(),
            Color::Green => color::Green.bg_str(),
            Color::Yellow => color::Yellow.bg_str(),
            Color::Cyan => color::Cyan.bg_str(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
}

impl Style {
    pub fn fg(color: Color) -> Style {
        Style {
            fg: Some(color),
            ..Default::default()
        }
    }

    pub fn bold() -> Style {
        Style {
            bold: true,
            ..Default::default()
        }
    }

    pub fn on(self, color: Color) -> Style {
        Style {
            bg: Some(color),
            ..self
        }
    }

    pub fn with_bold(self) -> Style {
        Style { bold: true, ..self }
    }

    fn paint(&self, out: &mut impl Write, contents: &str) -> std::io::Result<()> {
        if self.bold {
            write!(out, "{}", style::Bold)?;
        }
        if let Some(bg) = self.bg {
            write!(out, "{}", bg.bg_str())?;
        }
        if let Some(fg) = self.fg {
            write!(out, "{}", fg.fg_str())?;
        }
        write!(out, "{}{}", contents, style::Reset)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Cell {
    pub contents: String,
    pub style: Option<Style>,
}

impl Cell {
    pub fn new(contents: impl Into<String>) -> Cell {
        Cell {
            contents: contents.into(),
            style: None,
        }
    }

    pub fn styled(contents: impl Into<String>, style: Style) -> Cell {
        Cell {
            contents: contents.into(),
            style: Some(style),
        }
    }

    fn width(&self) -> usize {
        self.contents.chars().count()
    }
}

#[derive(Debug, Default)]
pub struct Table {
    pub headers: Vec<Cell>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Writes the table with columns aligned on two spaces.
    ///
    /// Headers and colors are only written when `tty` is set, so piped
    /// output stays plain rows.
    pub fn render(&self, out: &mut impl Write, tty: bool) -> std::io::Result<()> {
        let mut widths = Vec::new();
        if tty {
            widen(&mut widths, &self.headers);
        }
        for row in self.rows.iter() {
            widen(&mut widths, row);
        }

        if tty {
            write_row(out, &self.headers, &widths, tty)?;
        }
        for row in self.rows.iter() {
            write_row(out, row, &widths, tty)?;
        }

        out.flush()
    }
}

fn widen(widths: &mut Vec<usize>, row: &[Cell]) {
    if widths.len() < row.len() {
        widths.resize(row.len(), 0);
    }
    for (width, cell) in widths.iter_mut().zip(row.iter()) {
        *width = (*width).max(cell.width());
    }
}

fn write_row(
    out: &mut impl Write,
    row: &[Cell],
    widths: &[usize],
    tty: bool,
) -> std::io::Result<()> {
    for (i, cell) in row.iter().enumerate() {
        match cell.style {
            Some(style) if tty => style.paint(out, &cell.contents)?,
            _ => write!(out, "{}", cell.contents)?,
        }

        if i + 1 < row.len() {
            let padding = widths[i] - cell.width() + 2;
            write!(out, "{:padding$}", "")?;
        }
    }
    writeln!(out)
}
