use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState,
    Wrap,
};
use ratatui::Frame;
use rusqlite::Connection;
use tracing::debug;

use crate::db::{
    create_toy, delete_toy, fetch_sorted_toys, fetch_toy, fetch_toys, search_toys, update_toy,
};
use crate::models::{SortOrder, Toy};

use super::forms::{field_prefix, ConfirmToyDelete, ToyField, ToyForm};
use super::helpers::{centered_rect, padded, surface_error};
use super::screens::{Listing, SortPicker, ToyTable};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Blank columns on each side of a grid cell.
const CELL_PADDING: usize = 1;
/// Rows skipped by PageUp / PageDown.
const PAGE_STEP: isize = 10;
const COLUMN_TITLES: [&str; 6] = ["ID", "Name", "Type", "Material", "Color", "Price"];
const COLUMN_WIDTHS: [Constraint; 6] = [
    Constraint::Length(6),
    Constraint::Min(24),
    Constraint::Length(14),
    Constraint::Length(12),
    Constraint::Length(14),
    Constraint::Length(10),
];

/// Modes layered over the toy grid. Every mode except `Normal` is a modal
/// that owns its own input state.
enum Mode {
    Normal,
    Searching(SearchState),
    ChoosingSort(SortPicker),
    AddingToy(ToyForm),
    EditingToy { id: i64, form: ToyForm },
    ConfirmDelete(ConfirmToyDelete),
}

/// Text typed into the search box before it is submitted.
struct SearchState {
    query: String,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state. Owns the one database connection for the
/// lifetime of the session.
pub struct App {
    conn: Connection,
    table: ToyTable,
    sort: SortOrder,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(conn: Connection, toys: Vec<Toy>) -> Self {
        Self {
            conn,
            table: ToyTable::new(toys),
            sort: SortOrder::default(),
            mode: Mode::Normal,
            status: None,
        }
    }

    /// Route one key press to the active mode. Returns `true` when the user
    /// asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::Searching(state) => self.handle_search(code, state)?,
            Mode::ChoosingSort(picker) => self.handle_sort_picker(code, picker)?,
            Mode::AddingToy(form) => self.handle_add_toy(code, form)?,
            Mode::EditingToy { id, form } => self.handle_edit_toy(code, id, form)?,
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') => {
                *exit = true;
            }
            KeyCode::Esc => {
                if self.table.is_search() {
                    self.reset_search()?;
                } else {
                    *exit = true;
                }
            }
            KeyCode::Up => self.table.move_selection(-1),
            KeyCode::Down => self.table.move_selection(1),
            KeyCode::PageUp => self.table.move_selection(-PAGE_STEP),
            KeyCode::PageDown => self.table.move_selection(PAGE_STEP),
            KeyCode::Home => self.table.select_first(),
            KeyCode::End => self.table.select_last(),
            KeyCode::Char('f') | KeyCode::Char('/') => {
                self.clear_status();
                let query = match &self.table.listing {
                    Listing::Search(keyword) => keyword.clone(),
                    _ => String::new(),
                };
                return Ok(Mode::Searching(SearchState { query }));
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                if self.table.is_search() {
                    self.reset_search()?;
                }
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.clear_status();
                return Ok(Mode::ChoosingSort(SortPicker::new(self.sort)));
            }
            KeyCode::Char('+') | KeyCode::Char('a') | KeyCode::Char('A') => {
                self.clear_status();
                return Ok(Mode::AddingToy(ToyForm::default()));
            }
            KeyCode::Char('e') | KeyCode::Char('E') => return self.begin_edit(),
            KeyCode::Char('-') | KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(toy) = self.table.current_toy().cloned() {
                    self.clear_status();
                    return Ok(Mode::ConfirmDelete(ConfirmToyDelete { toy }));
                } else {
                    self.set_status("Select a toy to delete.", StatusKind::Error);
                }
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    /// Open the edit form for the highlighted row, pre-filled from a fresh
    /// read of that record.
    fn begin_edit(&mut self) -> Result<Mode> {
        let Some(id) = self.table.current_toy().map(|toy| toy.id) else {
            self.set_status("Select a toy to edit.", StatusKind::Error);
            return Ok(Mode::Normal);
        };

        match fetch_toy(&self.conn, id)? {
            Some(toy) => {
                self.clear_status();
                Ok(Mode::EditingToy {
                    id,
                    form: ToyForm::from_toy(&toy),
                })
            }
            None => {
                self.reload_toys(None)?;
                self.set_status(
                    format!("Toy #{id} no longer exists."),
                    StatusKind::Error,
                );
                Ok(Mode::Normal)
            }
        }
    }

    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Search cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Enter => {
                self.run_search(&state.query)?;
                return Ok(Mode::Normal);
            }
            KeyCode::Backspace => {
                state.query.pop();
            }
            KeyCode::Char(ch) => {
                if !ch.is_control() {
                    state.query.push(ch);
                }
            }
            _ => {}
        }
        Ok(Mode::Searching(state))
    }

    fn handle_sort_picker(&mut self, code: KeyCode, mut picker: SortPicker) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Sort cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Up => picker.move_selection(-1),
            KeyCode::Down => picker.move_selection(1),
            KeyCode::Enter => {
                self.apply_sort(picker.current())?;
                return Ok(Mode::Normal);
            }
            _ => {}
        }
        Ok(Mode::ChoosingSort(picker))
    }

    fn handle_add_toy(&mut self, code: KeyCode, mut form: ToyForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Add toy cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_new_toy(&form) {
                Ok(_) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::AddingToy(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_edit_toy(&mut self, code: KeyCode, id: i64, mut form: ToyForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_existing_toy(id, &form) {
                Ok(_) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::EditingToy { id, form })
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmToyDelete) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.perform_delete(&confirm) {
                    Ok(_) => Ok(Mode::Normal),
                    Err(err) => {
                        let message = surface_error(&err);
                        self.set_status(message, StatusKind::Error);
                        Ok(Mode::ConfirmDelete(confirm))
                    }
                }
            }
            _ => Ok(Mode::ConfirmDelete(confirm)),
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        self.draw_toy_table(frame, content_area);

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::Searching(state) => self.draw_search_bar(frame, area, state),
            Mode::ChoosingSort(picker) => self.draw_sort_picker(frame, area, picker),
            Mode::AddingToy(form) => self.draw_toy_form(frame, area, "Add Toy", form),
            Mode::EditingToy { id, form } => {
                self.draw_toy_form(frame, area, &format!("Edit Toy #{id}"), form)
            }
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Normal => {}
        }
    }

    fn draw_toy_table(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.table.title());

        if self.table.toys.is_empty() {
            let text = if self.table.is_search() {
                "No toys match this search. Press 'r' to reset."
            } else {
                "No toys yet. Press '+' to add one."
            };
            let message = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let header = Row::new(
            COLUMN_TITLES
                .iter()
                .map(|title| Cell::from(padded(title, CELL_PADDING))),
        )
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

        let rows = self.table.toys.iter().map(|toy| {
            Row::new(
                toy.column_texts()
                    .into_iter()
                    .map(|text| Cell::from(padded(&text, CELL_PADDING))),
            )
        });

        let table = Table::new(rows, COLUMN_WIDTHS)
            .header(header)
            .block(block)
            .row_highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .highlight_symbol("▶ ");

        let mut state = TableState::default().with_selected(Some(self.table.selected));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Search");
        let paragraph = Paragraph::new(Span::raw(format!("Search: {}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner
            .x
            .saturating_add(cursor_offset("Search: ".len() + state.query.chars().count()));
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_sort_picker(&self, frame: &mut Frame, area: Rect, picker: &SortPicker) {
        let popup_area = centered_rect(40, 60, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Sort").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let items: Vec<ListItem> = picker
            .options
            .iter()
            .map(|order| ListItem::new(order.to_string()))
            .collect();

        let list = List::new(items)
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("▶ ");

        let mut list_state = ListState::default();
        list_state.select(Some(picker.selected));
        frame.render_stateful_widget(list, inner, &mut list_state);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let hints: &[(&str, &str)] = match &self.mode {
            Mode::Searching(_) => &[("[Enter]", " Search   "), ("[Esc]", " Cancel")],
            Mode::ChoosingSort(_) => &[
                ("[↑↓]", " Choose   "),
                ("[Enter]", " Sort   "),
                ("[Esc]", " Cancel"),
            ],
            Mode::AddingToy(_) | Mode::EditingToy { .. } => &[
                ("[Tab/↑↓]", " Switch field   "),
                ("[Enter]", " Save   "),
                ("[Esc]", " Cancel"),
            ],
            Mode::ConfirmDelete(_) => &[("[y]", " Delete   "), ("[n/Esc]", " Keep")],
            Mode::Normal if self.table.is_search() => &[
                ("[↑↓]", " Navigate   "),
                ("[f]", " Search   "),
                ("[r]", " Reset search   "),
                ("[s]", " Sort   "),
                ("[+]", " Add   "),
                ("[e]", " Edit   "),
                ("[-]", " Delete   "),
                ("[q]", " Quit"),
            ],
            Mode::Normal => &[
                ("[↑↓]", " Navigate   "),
                ("[f]", " Search   "),
                ("[s]", " Sort   "),
                ("[+]", " Add   "),
                ("[e]", " Edit   "),
                ("[-]", " Delete   "),
                ("[q]", " Quit"),
            ],
        };

        Line::from(
            hints
                .iter()
                .flat_map(|(key, action)| {
                    [
                        Span::styled(key.to_string(), key_style),
                        Span::raw(action.to_string()),
                    ]
                })
                .collect::<Vec<_>>(),
        )
    }

    fn draw_toy_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &ToyForm) {
        let popup_area = centered_rect(60, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = ToyField::ALL
            .iter()
            .map(|&field| form.build_line(field))
            .collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let prefix = field_prefix(form.active).chars().count();
        let cursor_x = inner
            .x
            .saturating_add(cursor_offset(prefix + form.value_len(form.active)));
        let cursor_y = inner.y.saturating_add(form.active.row());
        frame.set_cursor_position((cursor_x, cursor_y));
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmToyDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Delete Toy").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let toy = &confirm.toy;
        let lines = vec![
            Line::from(format!("Delete '{}' permanently?", toy.name)),
            Line::from(format!(
                "#{} • {} • {} • {} • {}",
                toy.id,
                toy.kind,
                toy.material,
                toy.color,
                toy.price_text()
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    fn run_search(&mut self, keyword: &str) -> Result<()> {
        let toys = search_toys(&self.conn, keyword)?;
        let found = toys.len();
        let focus = self.table.current_toy().map(|toy| toy.id);
        self.table
            .replace(toys, Listing::Search(keyword.to_string()), focus);
        self.set_status(format!("Found {found} toy(s)."), StatusKind::Info);
        Ok(())
    }

    fn reset_search(&mut self) -> Result<()> {
        let focus = self.table.current_toy().map(|toy| toy.id);
        self.reload_toys(focus)?;
        self.set_status("Search reset.", StatusKind::Info);
        Ok(())
    }

    fn apply_sort(&mut self, order: SortOrder) -> Result<()> {
        let toys = fetch_sorted_toys(&self.conn, order)?;
        self.sort = order;
        self.table.replace(toys, Listing::Sorted(order), None);
        self.table.select_first();
        self.set_status(format!("Sorted: {order}."), StatusKind::Info);
        Ok(())
    }

    fn save_new_toy(&mut self, form: &ToyForm) -> Result<()> {
        let fields = form.parse_inputs()?;
        let toy = create_toy(&self.conn, &fields)?;
        self.reload_toys(Some(toy.id))?;
        self.set_status(format!("Added {toy}."), StatusKind::Info);
        Ok(())
    }

    fn save_existing_toy(&mut self, id: i64, form: &ToyForm) -> Result<()> {
        let fields = form.parse_inputs()?;
        let updated = update_toy(&self.conn, id, &fields)?;
        self.reload_toys(Some(id))?;
        if updated {
            self.set_status(format!("Updated toy #{id}."), StatusKind::Info);
        } else {
            self.set_status(
                format!("Toy #{id} no longer exists; nothing was changed."),
                StatusKind::Error,
            );
        }
        Ok(())
    }

    fn perform_delete(&mut self, confirm: &ConfirmToyDelete) -> Result<()> {
        let deleted = delete_toy(&self.conn, confirm.toy.id)?;
        self.reload_toys(None)?;
        if deleted {
            self.set_status(format!("Deleted {}.", confirm.toy), StatusKind::Info);
        } else {
            self.set_status(
                format!("{} was already gone.", confirm.toy),
                StatusKind::Error,
            );
        }
        Ok(())
    }

    /// Replace the grid with the full, unfiltered list.
    fn reload_toys(&mut self, focus_id: Option<i64>) -> Result<()> {
        let toys = fetch_toys(&self.conn)?;
        debug!(rows = toys.len(), "reloaded grid");
        self.table.replace(toys, Listing::All, focus_id);
        Ok(())
    }
}

/// Column offset for a text cursor, pinned to the terminal coordinate range.
fn cursor_offset(chars: usize) -> u16 {
    u16::try_from(chars).unwrap_or(u16::MAX)
}
