// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Pad grid widget.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// One pad as the grid shows it
#[derive(Debug, Clone, PartialEq)]
pub struct PadCell {
    pub label: String,
    pub held: bool,
}

impl PadCell {
    pub fn new(label: impl Into<String>, held: bool) -> Self {
        Self {
            label: label.into(),
            held,
        }
    }
}

/// Grid of pads laid out row by row
pub struct PadGridWidget<'a> {
    cells: &'a [PadCell],
    columns: usize,
    cursor: Option<usize>,
    block: Option<Block<'a>>,
}

impl<'a> PadGridWidget<'a> {
    pub fn new(cells: &'a [PadCell], columns: usize) -> Self {
        Self {
            cells,
            columns: columns.max(1),
            cursor: None,
            block: None,
        }
    }

    /// Highlight the pad under the cursor
    pub fn cursor(mut self, cursor: Option<usize>) -> Self {
        self.cursor = cursor;
        self
    }

    /// Set the block wrapper
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Rows needed to show every pad
    pub fn rows(&self) -> usize {
        self.cells.len().div_ceil(self.columns)
    }

    fn cell_style(&self, index: usize, cell: &PadCell) -> Style {
        let style = if cell.held {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        if self.cursor == Some(index) {
            style.add_modifier(Modifier::REVERSED)
        } else {
            style
        }
    }
}

impl Widget for PadGridWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = match self.block.clone() {
            Some(block) => {
                let inner = block.inner(area);
                block.render(area, buf);
                inner
            }
            None => area,
        };

        if self.cells.is_empty() {
            Paragraph::new("No pads")
                .style(Style::default().fg(Color::DarkGray))
                .render(area, buf);
            return;
        }

        // Each pad is a bordered box three lines tall
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Length(3); self.rows()])
            .split(area);

        let columns = vec![Constraint::Ratio(1, self.columns as u32); self.columns];
        for (row_index, row) in self.cells.chunks(self.columns).enumerate() {
            let Some(&row_area) = rows.get(row_index) else {
                break;
            };
            let cells = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(columns.clone())
                .split(row_area);

            for (column, cell) in row.iter().enumerate() {
                let index = row_index * self.columns + column;
                let style = self.cell_style(index, cell);
                Paragraph::new(cell.label.as_str())
                    .alignment(Alignment::Center)
                    .style(style)
                    .block(Block::default().borders(Borders::ALL).border_style(style))
                    .render(cells[column], buf);
            }
        }
    }
}
