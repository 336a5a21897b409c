use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Position, Rect},
    style::{Style, Stylize},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, TableState},
};
use tracing::trace;

use crate::model::{Model, UIData};
use crate::stretch::{Align, RenderedCell, RenderedGrid};

pub const TABLE_HEADER_HEIGHT: usize = 1;
pub const CMDLINE_HEIGHT: usize = 1;
/// Blank columns on each side of a cell value.
pub const CELL_PADDING: usize = 1;

#[derive(Debug, Default)]
pub struct TableUI {
    frames: u64,
}

impl TableUI {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws the model and returns what was laid out, for measuring.
    pub fn draw(&mut self, model: &Model, frame: &mut Frame) -> RenderedGrid {
        self.frames += 1;
        let uidata = model.get_uidata();
        let [table_area, status_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(CMDLINE_HEIGHT as u16)])
                .areas(frame.area());

        self.draw_table(&uidata, frame, table_area);
        self.draw_statusline(&uidata, frame, status_area);
        if let Some(message) = &uidata.popup_message {
            self.draw_popup(message, frame);
        }

        let rendered = layout_rows(&uidata);
        trace!(
            "Frame {}: {} rows, {} columns",
            self.frames,
            uidata.rows.len(),
            uidata.widths.len()
        );
        rendered
    }

    fn draw_table(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .title(Line::from(format!(" {} ", uidata.name)).bold().centered())
            .border_set(border::PLAIN);
        let inner_width = block.inner(area).width as usize;
        let first = first_column(&uidata.widths, uidata.selected_column, inner_width);

        let widths = uidata.widths[first..]
            .iter()
            .map(|&w| Constraint::Length(w as u16));
        let header = Row::new(
            uidata.headers[first..]
                .iter()
                .zip(&uidata.aligns[first..])
                .map(|(h, a)| Cell::from(padded(h, *a))),
        )
        .bold()
        .underlined();
        let rows = uidata.rows.iter().map(|row| {
            Row::new(
                row[first..]
                    .iter()
                    .zip(&uidata.aligns[first..])
                    .map(|(v, a)| Cell::from(padded(v, *a))),
            )
        });

        let table = Table::new(rows, widths)
            .header(header)
            .column_spacing(0)
            .block(block)
            .row_highlight_style(Style::new().on_dark_gray())
            .cell_highlight_style(Style::new().reversed());

        let mut state = TableState::default();
        if !uidata.rows.is_empty() && uidata.selected_column >= first {
            state.select_cell(Some((uidata.selected_row, uidata.selected_column - first)));
        }
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_statusline(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        if let Some(input) = &uidata.cmdinput {
            frame.render_widget(
                Paragraph::new(Line::from(vec!["/".yellow().bold(), input.input.as_str().into()])),
                area,
            );
            frame.set_cursor_position(Position::new(
                area.x + 1 + input.cursor_pos as u16,
                area.y,
            ));
            return;
        }

        let [message_area, info_area] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(uidata.page_info.len() as u16 + 1)])
                .areas(area);
        frame.render_widget(Paragraph::new(uidata.status_message.as_str()), message_area);
        frame.render_widget(
            Paragraph::new(Line::from(uidata.page_info.as_str()).right_aligned().blue()),
            info_area,
        );
    }

    fn draw_popup(&self, message: &str, frame: &mut Frame) {
        let height = message.lines().count() as u16 + 2;
        let width = message.lines().map(|l| l.chars().count()).max().unwrap_or(0) as u16 + 4;
        let [area] = Layout::vertical([Constraint::Length(height)])
            .flex(Flex::Center)
            .areas(frame.area());
        let [area] = Layout::horizontal([Constraint::Length(width)])
            .flex(Flex::Center)
            .areas(area);

        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(message).block(
                Block::bordered()
                    .title(Line::from(" Help ").bold().centered())
                    .border_set(border::THICK),
            ),
            area,
        );
    }
}

fn padded(value: &str, align: Align) -> Line<'_> {
    let pad = " ".repeat(CELL_PADDING);
    let line = Line::from(vec![Span::raw(pad.clone()), Span::raw(value), Span::raw(pad)]);
    match align {
        Align::LEFT => line,
        Align::RIGHT => line.right_aligned(),
    }
}

/// First rendered column to draw so the selected one is on screen.
fn first_column(widths: &[usize], selected: usize, available: usize) -> usize {
    let mut first = selected.min(widths.len().saturating_sub(1));
    let mut used = widths.get(first).copied().unwrap_or(0);
    while first > 0 && used + widths[first - 1] <= available {
        first -= 1;
        used += widths[first];
    }
    first
}

/// The cells as the table lays them out: a cell spans its allocated width
/// unless the padded value needs more, the value is the content element.
pub fn layout_rows(uidata: &UIData) -> RenderedGrid {
    let mut grid = RenderedGrid::new();
    for row in uidata.rows.iter() {
        grid.push_row(
            row.iter()
                .zip(&uidata.widths)
                .map(|(value, &allocated)| {
                    let content = (!value.is_empty()).then(|| Line::from(value.as_str()).width());
                    RenderedCell {
                        width: allocated.max(content.unwrap_or(0) + 2 * CELL_PADDING),
                        content_width: content,
                    }
                })
                .collect(),
        );
    }
    grid
}
