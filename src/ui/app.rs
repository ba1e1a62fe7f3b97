use std::mem;

use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use tracing::{debug, info, warn};

use crate::catalog::{audit, CatalogFiles, CatalogStore};
use crate::error::CatalogError;
use crate::models::{BookId, MemberId};

use super::forms::{
    BookField, BookForm, ConfirmExit, ConfirmLoad, LoanAction, LoanField, LoanForm, MemberForm,
};
use super::helpers::{centered_rect, describe_error, key_hints, yes_no};
use super::screens::{BookList, MemberList, MenuItem, RecordList};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows moved by PageUp/PageDown in the list screens.
const PAGE_STEP: isize = 10;
/// Key reminders for dialogs with two fields and with one.
const TWO_FIELD_KEYS: &str = "Enter to save • Tab to switch • Esc to cancel";
const ONE_FIELD_KEYS: &str = "Enter to save • Esc to cancel";

/// What fills the main area.
enum Screen {
    Menu,
    Books(BookList),
    Members(MemberList),
}

/// Modal state layered over the current screen.
enum Mode {
    Normal,
    AddingBook(BookForm),
    AddingMember(MemberForm),
    Loan(LoanForm),
    ConfirmLoad(ConfirmLoad),
    ConfirmExit(ConfirmExit),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

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

/// Session state: the catalog, where it is saved, and what the UI shows.
pub struct App {
    store: CatalogStore,
    files: CatalogFiles,
    screen: Screen,
    mode: Mode,
    menu_selected: usize,
    status: Option<StatusMessage>,
    /// Set by any mutation, cleared by a successful save or load.
    dirty: bool,
}

impl App {
    pub fn new(store: CatalogStore, files: CatalogFiles) -> Self {
        Self {
            store,
            files,
            screen: Screen::Menu,
            mode: Mode::Normal,
            menu_selected: 0,
            status: None,
            dirty: false,
        }
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    /// Feed one key press through the active mode. Returns `true` once the
    /// session should end.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::AddingBook(form) => self.handle_add_book(code, form),
            Mode::AddingMember(form) => self.handle_add_member(code, form),
            Mode::Loan(form) => self.handle_loan(code, form),
            Mode::ConfirmLoad(confirm) => self.handle_confirm_load(code, confirm),
            Mode::ConfirmExit(confirm) => self.handle_confirm_exit(code, confirm, &mut exit),
        };

        exit
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match self.screen {
            Screen::Menu => self.handle_menu_key(code, exit),
            Screen::Books(_) => self.handle_book_list_key(code, exit),
            Screen::Members(_) => self.handle_member_list_key(code, exit),
        }
    }

    fn handle_menu_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        let last = MenuItem::ALL.len() - 1;
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return self.request_exit(exit),
            KeyCode::Up => self.menu_selected = self.menu_selected.saturating_sub(1),
            KeyCode::Down => self.menu_selected = (self.menu_selected + 1).min(last),
            KeyCode::Home => self.menu_selected = 0,
            KeyCode::End => self.menu_selected = last,
            KeyCode::Enter => {
                let item = MenuItem::ALL[self.menu_selected];
                return self.activate(item, exit);
            }
            KeyCode::Char(ch) => match MenuItem::from_shortcut(ch) {
                Some(item) => {
                    self.menu_selected = MenuItem::ALL
                        .iter()
                        .position(|entry| *entry == item)
                        .unwrap_or(0);
                    return self.activate(item, exit);
                }
                None => self.set_status("Invalid choice.", StatusKind::Error),
            },
            _ => {}
        }
        Mode::Normal
    }

    fn activate(&mut self, item: MenuItem, exit: &mut bool) -> Mode {
        debug!(item = item.label(), "menu entry selected");
        self.clear_status();
        match item {
            MenuItem::AddBook => Mode::AddingBook(BookForm::default()),
            MenuItem::AddMember => Mode::AddingMember(MemberForm::default()),
            MenuItem::BorrowBook => Mode::Loan(LoanForm::new(LoanAction::Borrow)),
            MenuItem::ReturnBook => Mode::Loan(LoanForm::new(LoanAction::Return)),
            MenuItem::ListBooks => {
                self.screen = Screen::Books(RecordList::new(self.store.list_books()));
                Mode::Normal
            }
            MenuItem::ListMembers => {
                self.screen = Screen::Members(RecordList::new(self.store.list_members()));
                Mode::Normal
            }
            MenuItem::SaveData => {
                self.save();
                Mode::Normal
            }
            MenuItem::LoadData => {
                if self.store.is_empty() {
                    self.load();
                    Mode::Normal
                } else {
                    Mode::ConfirmLoad(ConfirmLoad {
                        books: self.store.book_count(),
                        members: self.store.member_count(),
                    })
                }
            }
            MenuItem::Exit => self.request_exit(exit),
        }
    }

    fn handle_book_list_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        let selected = match &self.screen {
            Screen::Books(list) => list.current().map(|book| book.id),
            _ => None,
        };

        match code {
            KeyCode::Char('q') => return self.request_exit(exit),
            KeyCode::Esc => {
                self.screen = Screen::Menu;
                self.clear_status();
            }
            KeyCode::Char('b') | KeyCode::Char('B') => match selected {
                Some(book_id) => {
                    return Mode::Loan(LoanForm::prefilled(
                        LoanAction::Borrow,
                        None,
                        Some(book_id),
                    ))
                }
                None => self.set_status("No book selected.", StatusKind::Error),
            },
            KeyCode::Char('r') | KeyCode::Char('R') => match selected {
                Some(book_id) => {
                    let holder = self.holder_of(book_id);
                    return Mode::Loan(LoanForm::prefilled(
                        LoanAction::Return,
                        holder,
                        Some(book_id),
                    ));
                }
                None => self.set_status("No book selected.", StatusKind::Error),
            },
            other => {
                if let Screen::Books(list) = &mut self.screen {
                    navigate(list, other);
                }
            }
        }
        Mode::Normal
    }

    fn handle_member_list_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        let selected = match &self.screen {
            Screen::Members(list) => list.current().map(|member| member.id),
            _ => None,
        };

        match code {
            KeyCode::Char('q') => return self.request_exit(exit),
            KeyCode::Esc => {
                self.screen = Screen::Menu;
                self.clear_status();
            }
            KeyCode::Char(ch @ ('b' | 'B' | 'r' | 'R')) => match selected {
                Some(member_id) => {
                    let action = if ch.eq_ignore_ascii_case(&'b') {
                        LoanAction::Borrow
                    } else {
                        LoanAction::Return
                    };
                    return Mode::Loan(LoanForm::prefilled(action, Some(member_id), None));
                }
                None => self.set_status("No member selected.", StatusKind::Error),
            },
            other => {
                if let Screen::Members(list) = &mut self.screen {
                    navigate(list, other);
                }
            }
        }
        Mode::Normal
    }

    fn handle_add_book(&mut self, code: KeyCode, mut form: BookForm) -> Mode {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Add book cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match form.parse_inputs() {
                Ok((title, author)) => match self.store.add_book(&title, &author) {
                    Ok(id) => {
                        info!(book_id = id, %title, %author, "book added");
                        self.mark_changed();
                        self.set_status(format!("Book added with ID: {id}"), StatusKind::Info);
                        keep_open = false;
                    }
                    Err(err) => {
                        warn!(error = %err, "book not added");
                        let message = describe_error(&err);
                        form.error = Some(message.clone());
                        self.set_status(message, StatusKind::Error);
                    }
                },
                Err(err) => {
                    let message = err.to_string();
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
            Mode::AddingBook(form)
        } else {
            Mode::Normal
        }
    }

    fn handle_add_member(&mut self, code: KeyCode, mut form: MemberForm) -> Mode {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Add member cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match form.parse_inputs() {
                Ok(name) => match self.store.add_member(&name) {
                    Ok(id) => {
                        info!(member_id = id, %name, "member added");
                        self.mark_changed();
                        self.set_status(format!("Member added with ID: {id}"), StatusKind::Info);
                        keep_open = false;
                    }
                    Err(err) => {
                        warn!(error = %err, "member not added");
                        let message = describe_error(&err);
                        form.error = Some(message.clone());
                        self.set_status(message, StatusKind::Error);
                    }
                },
                Err(err) => {
                    let message = err.to_string();
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
            Mode::AddingMember(form)
        } else {
            Mode::Normal
        }
    }

    fn handle_loan(&mut self, code: KeyCode, mut form: LoanForm) -> Mode {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status(
                    format!("{} cancelled.", form.action.title()),
                    StatusKind::Info,
                );
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match form.parse_inputs() {
                Ok((member_id, book_id)) => match self.apply_loan(form.action, member_id, book_id)
                {
                    Ok(message) => {
                        self.set_status(message, StatusKind::Info);
                        keep_open = false;
                    }
                    Err(err) => {
                        warn!(action = ?form.action, member_id, book_id, error = %err, "loan rejected");
                        let message = describe_error(&err);
                        form.error = Some(message.clone());
                        self.set_status(message, StatusKind::Error);
                    }
                },
                Err(err) => {
                    let message = err.to_string();
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
            Mode::Loan(form)
        } else {
            Mode::Normal
        }
    }

    fn apply_loan(
        &mut self,
        action: LoanAction,
        member_id: MemberId,
        book_id: BookId,
    ) -> Result<String, CatalogError> {
        let message = match action {
            LoanAction::Borrow => {
                self.store.borrow_book(member_id, book_id)?;
                "Book borrowed successfully."
            }
            LoanAction::Return => {
                self.store.return_book(member_id, book_id)?;
                "Book returned successfully."
            }
        };
        if let (Some(member), Some(book)) = (self.store.member(member_id), self.store.book(book_id))
        {
            info!(member_id, book_id, %member, %book, ?action, "loan updated");
        }
        self.mark_changed();
        Ok(message.to_string())
    }

    fn handle_confirm_load(&mut self, code: KeyCode, confirm: ConfirmLoad) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Load cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.load();
                Mode::Normal
            }
            _ => Mode::ConfirmLoad(confirm),
        }
    }

    fn handle_confirm_exit(&mut self, code: KeyCode, confirm: ConfirmExit, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Exit cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                info!("exiting without saving");
                *exit = true;
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('s') | KeyCode::Char('S') => {
                if self.save() {
                    *exit = true;
                }
                Mode::Normal
            }
            _ => Mode::ConfirmExit(confirm),
        }
    }

    fn request_exit(&mut self, exit: &mut bool) -> Mode {
        if self.dirty {
            Mode::ConfirmExit(ConfirmExit)
        } else {
            *exit = true;
            Mode::Normal
        }
    }

    /// Write both files. Returns whether the save went through.
    fn save(&mut self) -> bool {
        match self.files.save(&self.store) {
            Ok(()) => {
                info!(
                    books = self.store.book_count(),
                    members = self.store.member_count(),
                    path = %self.files.books.display(),
                    "catalog saved"
                );
                self.dirty = false;
                self.set_status(
                    format!(
                        "Data saved to {} and {}.",
                        self.files.books.display(),
                        self.files.members.display()
                    ),
                    StatusKind::Info,
                );
                true
            }
            Err(err) => {
                warn!(error = %err, "save failed");
                self.set_status(describe_error(&err), StatusKind::Error);
                false
            }
        }
    }

    fn load(&mut self) {
        match self.files.load(&mut self.store) {
            Ok(()) => {
                let findings = audit(&self.store);
                for finding in &findings {
                    warn!(%finding, "catalog inconsistency");
                }
                info!(
                    books = self.store.book_count(),
                    members = self.store.member_count(),
                    warnings = findings.len(),
                    "catalog loaded"
                );
                self.dirty = false;
                let message = if findings.is_empty() {
                    "Data loaded from files.".to_string()
                } else {
                    format!(
                        "Data loaded from files with {} consistency warning(s); see the log.",
                        findings.len()
                    )
                };
                self.set_status(message, StatusKind::Info);
            }
            Err(err) => {
                warn!(error = %err, "load failed");
                let mut message = describe_error(&err);
                if matches!(err, CatalogError::Parse { .. }) {
                    // The store was emptied before parsing started.
                    self.dirty = false;
                    message.push_str(" Catalog cleared.");
                }
                self.set_status(message, StatusKind::Error);
            }
        }
        self.refresh_lists();
    }

    fn mark_changed(&mut self) {
        self.dirty = true;
        self.refresh_lists();
    }

    /// Re-snapshot whichever list screen is open, keeping the selection.
    fn refresh_lists(&mut self) {
        match &mut self.screen {
            Screen::Books(list) => {
                let selected = list.selected;
                *list = RecordList::new(self.store.list_books());
                list.selected = selected;
                list.move_selection(0);
            }
            Screen::Members(list) => {
                let selected = list.selected;
                *list = RecordList::new(self.store.list_members());
                list.selected = selected;
                list.move_selection(0);
            }
            Screen::Menu => {}
        }
    }

    fn holder_of(&self, book_id: BookId) -> Option<MemberId> {
        self.store
            .members()
            .find(|member| member.holds(book_id))
            .map(|member| member.id)
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

        match &self.screen {
            Screen::Menu => self.draw_menu(frame, content_area),
            Screen::Books(list) => self.draw_book_list(frame, content_area, list),
            Screen::Members(list) => self.draw_member_list(frame, content_area, list),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::AddingBook(form) => self.draw_book_form(frame, area, form),
            Mode::AddingMember(form) => self.draw_member_form(frame, area, form),
            Mode::Loan(form) => self.draw_loan_form(frame, area, form),
            Mode::ConfirmLoad(confirm) => self.draw_confirm_load(frame, area, confirm),
            Mode::ConfirmExit(_) => self.draw_confirm_exit(frame, area),
            Mode::Normal => {}
        }
    }

    fn draw_menu(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Library Management System");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(0)])
            .split(inner);

        let mut summary = vec![
            Span::raw(format!(
                "Books: {}   Members: {}",
                self.store.book_count(),
                self.store.member_count()
            )),
        ];
        if self.dirty {
            summary.push(Span::styled(
                "   (unsaved changes)",
                Style::default().fg(Color::Yellow),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(summary)), chunks[0]);

        let items: Vec<ListItem> = MenuItem::ALL
            .iter()
            .map(|item| ListItem::new(format!("{}. {}", item.shortcut(), item.label())))
            .collect();
        let list = List::new(items)
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        let mut state = ListState::default();
        state.select(Some(self.menu_selected));
        frame.render_stateful_widget(list, chunks[1], &mut state);
    }

    fn draw_book_list(&self, frame: &mut Frame, area: Rect, list: &BookList) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Books ({})", list.items.len()));

        if list.is_empty() {
            let message = Paragraph::new("No books in the library.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = list
            .items
            .iter()
            .map(|book| {
                let borrowed_style = if book.borrowed {
                    Style::default().fg(Color::Red)
                } else {
                    Style::default().fg(Color::Green)
                };
                ListItem::new(Line::from(vec![
                    Span::raw(format!(
                        "ID: {} | Title: {} | Author: {} | Borrowed: ",
                        book.id, book.title, book.author
                    )),
                    Span::styled(yes_no(book.borrowed), borrowed_style),
                ]))
            })
            .collect();
        self.render_record_list(frame, area, block, items, list.selected);
    }

    fn draw_member_list(&self, frame: &mut Frame, area: Rect, list: &MemberList) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Members ({})", list.items.len()));

        if list.is_empty() {
            let message = Paragraph::new("No members.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = list
            .items
            .iter()
            .map(|member| {
                let held: Vec<String> = member
                    .borrowed_books
                    .iter()
                    .map(|id| id.to_string())
                    .collect();
                ListItem::new(format!(
                    "Member ID: {} | Name: {} | Borrowed Book IDs: {}",
                    member.id,
                    member.name,
                    held.join(" ")
                ))
            })
            .collect();
        self.render_record_list(frame, area, block, items, list.selected);
    }

    fn render_record_list(
        &self,
        frame: &mut Frame,
        area: Rect,
        block: Block,
        items: Vec<ListItem>,
        selected: usize,
    ) {
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        state.select(Some(selected));
        frame.render_stateful_widget(list, area, &mut state);
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

    fn footer_instructions(&self) -> Line<'static> {
        match (&self.screen, &self.mode) {
            (_, Mode::AddingBook(_)) | (_, Mode::Loan(_)) => key_hints(&[
                ("Tab", "Switch Field"),
                ("Enter", "Submit"),
                ("Esc", "Cancel"),
            ]),
            (_, Mode::AddingMember(_)) => key_hints(&[("Enter", "Submit"), ("Esc", "Cancel")]),
            (_, Mode::ConfirmLoad(_)) => key_hints(&[("y", "Load"), ("n", "Cancel")]),
            (_, Mode::ConfirmExit(_)) => key_hints(&[
                ("s", "Save & Exit"),
                ("y", "Exit Without Saving"),
                ("n", "Cancel"),
            ]),
            (Screen::Books(_), _) => key_hints(&[
                ("↑↓", "Select"),
                ("b", "Borrow"),
                ("r", "Return"),
                ("Esc", "Menu"),
                ("q", "Quit"),
            ]),
            (Screen::Members(_), _) => key_hints(&[
                ("↑↓", "Select"),
                ("b", "Borrow For"),
                ("r", "Return From"),
                ("Esc", "Menu"),
                ("q", "Quit"),
            ]),
            (Screen::Menu, _) => key_hints(&[
                ("↑↓", "Move"),
                ("Enter", "Choose"),
                ("1-9", "Shortcut"),
                ("q", "Quit"),
            ]),
        }
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, form: &BookForm) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Add Book").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            form.build_line("Title", BookField::Title),
            form.build_line("Author", BookField::Author),
            Line::from(""),
        ];
        lines.push(form_hint(form.error.as_deref(), TWO_FIELD_KEYS));

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let (prefix, row, field) = match form.active {
            BookField::Title => ("Title: ", 0, BookField::Title),
            BookField::Author => ("Author: ", 1, BookField::Author),
        };
        frame.set_cursor_position((
            inner.x + prefix.len() as u16 + form.value_len(field) as u16,
            inner.y + row,
        ));
    }

    fn draw_member_form(&self, frame: &mut Frame, area: Rect, form: &MemberForm) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Add Member").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            form.build_line(),
            Line::from(""),
            form_hint(form.error.as_deref(), ONE_FIELD_KEYS),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        frame.set_cursor_position((
            inner.x + "Name: ".len() as u16 + form.value_len() as u16,
            inner.y,
        ));
    }

    fn draw_loan_form(&self, frame: &mut Frame, area: Rect, form: &LoanForm) {
        let popup_area = centered_rect(50, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(form.action.title())
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            form.build_line("Member ID", LoanField::Member),
            form.build_line("Book ID", LoanField::Book),
            Line::from(""),
            form_hint(form.error.as_deref(), TWO_FIELD_KEYS),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let (prefix, row) = match form.active {
            LoanField::Member => ("Member ID: ", 0),
            LoanField::Book => ("Book ID: ", 1),
        };
        frame.set_cursor_position((
            inner.x + prefix.len() as u16 + form.value_len(form.active) as u16,
            inner.y + row,
        ));
    }

    fn draw_confirm_load(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmLoad) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Load Data").borders(Borders::ALL);
        let lines = vec![
            Line::from(format!(
                "Replace {} book(s) and {} member(s) in memory with the contents of",
                confirm.books, confirm.members
            )),
            Line::from(format!(
                "{} and {}?",
                self.files.books.display(),
                self.files.members.display()
            )),
            Line::from(""),
            Line::from(Span::styled(
                "y to load • n to cancel",
                Style::default().fg(Color::Gray),
            )),
        ];
        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);
    }

    fn draw_confirm_exit(&self, frame: &mut Frame, area: Rect) {
        let popup_area = centered_rect(50, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Unsaved Changes").borders(Borders::ALL);
        let lines = vec![
            Line::from("The catalog has changes that were not saved."),
            Line::from(""),
            Line::from(Span::styled(
                "s to save and exit • y to exit anyway • n to stay",
                Style::default().fg(Color::Gray),
            )),
        ];
        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);
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
}

/// Arrow/page navigation shared by the list screens.
fn navigate<T>(list: &mut RecordList<T>, code: KeyCode) {
    match code {
        KeyCode::Up => list.move_selection(-1),
        KeyCode::Down => list.move_selection(1),
        KeyCode::PageUp => list.move_selection(-PAGE_STEP),
        KeyCode::PageDown => list.move_selection(PAGE_STEP),
        KeyCode::Home => list.select_first(),
        KeyCode::End => list.select_last(),
        _ => {}
    }
}

/// Last line of a dialog: the validation error if there is one, otherwise
/// the key reminder.
fn form_hint(error: Option<&str>, keys: &'static str) -> Line<'static> {
    match error {
        Some(error) => Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )),
        None => Line::from(Span::styled(keys, Style::default().fg(Color::Gray))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MAX_STORED_ID;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use tempfile::TempDir;

    fn app(temp: &TempDir) -> App {
        App::new(CatalogStore::new(), CatalogFiles::in_dir(temp.path()))
    }

    fn press(app: &mut App, codes: &[KeyCode]) -> bool {
        let mut exit = false;
        for code in codes {
            exit = app.handle_key(*code);
        }
        exit
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch));
        }
    }

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn status_text(app: &App) -> &str {
        app.status.as_ref().map(|s| s.text.as_str()).unwrap_or("")
    }

    fn add_book(app: &mut App, title: &str, author: &str) {
        app.handle_key(KeyCode::Char('1'));
        type_text(app, title);
        app.handle_key(KeyCode::Tab);
        type_text(app, author);
        app.handle_key(KeyCode::Enter);
    }

    fn add_member(app: &mut App, name: &str) {
        app.handle_key(KeyCode::Char('2'));
        type_text(app, name);
        app.handle_key(KeyCode::Enter);
    }

    fn loan(app: &mut App, shortcut: char, member: &str, book: &str) {
        app.handle_key(KeyCode::Char(shortcut));
        type_text(app, member);
        app.handle_key(KeyCode::Tab);
        type_text(app, book);
        app.handle_key(KeyCode::Enter);
    }

    #[test]
    fn menu_session_borrows_and_returns() {
        let temp = TempDir::new().unwrap();
        let mut app = app(&temp);

        add_book(&mut app, "Dune", "Herbert");
        assert_eq!(status_text(&app), "Book added with ID: 1000");
        add_member(&mut app, "Alice");
        assert_eq!(status_text(&app), "Member added with ID: 5000");

        loan(&mut app, '3', "5000", "1000");
        assert_eq!(status_text(&app), "Book borrowed successfully.");
        assert!(app.store().book(1000).unwrap().borrowed);

        loan(&mut app, '3', "5000", "1000");
        assert_eq!(status_text(&app), "Book 1000 is already borrowed.");
        assert!(matches!(app.mode, Mode::Loan(ref form) if form.error.is_some()));
        app.handle_key(KeyCode::Esc);
        assert!(matches!(app.mode, Mode::Normal));

        loan(&mut app, '4', "5000", "1000");
        assert_eq!(status_text(&app), "Book returned successfully.");
        loan(&mut app, '4', "5000", "1000");
        assert_eq!(status_text(&app), "Book 1000 was not borrowed.");
    }

    #[test]
    fn invalid_form_input_keeps_dialog_open() {
        let temp = TempDir::new().unwrap();
        let mut app = app(&temp);

        add_book(&mut app, "Dune, Part One", "Herbert");
        assert!(matches!(app.mode, Mode::AddingBook(_)));
        assert_eq!(status_text(&app), "Title cannot contain commas.");
        assert_eq!(app.store().book_count(), 0);
    }

    #[test]
    fn save_and_load_through_menu() {
        let temp = TempDir::new().unwrap();
        let mut app = app(&temp);
        add_book(&mut app, "Dune", "Herbert");
        add_member(&mut app, "Alice");
        loan(&mut app, '3', "5000", "1000");

        app.handle_key(KeyCode::Char('7'));
        assert!(!app.dirty);
        assert!(temp.path().join("books.csv").exists());

        add_book(&mut app, "Emma", "Austen");
        app.handle_key(KeyCode::Char('8'));
        assert!(matches!(app.mode, Mode::ConfirmLoad(_)));
        app.handle_key(KeyCode::Char('y'));

        assert_eq!(status_text(&app), "Data loaded from files.");
        assert_eq!(app.store().book_count(), 1);
        assert_eq!(app.store().member(5000).unwrap().borrowed_books, vec![1000]);
    }

    #[test]
    fn load_reports_inconsistencies() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("members.csv"), "5000,Alice,1000\n").unwrap();
        let mut app = app(&temp);

        app.handle_key(KeyCode::Char('8'));
        assert!(status_text(&app).contains("1 consistency warning"));
        assert_eq!(app.store().member_count(), 1);
    }

    #[test]
    fn malformed_file_clears_catalog() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("books.csv"), "1000,Dune\n").unwrap();
        let mut app = app(&temp);
        add_member(&mut app, "Alice");

        press(&mut app, &[KeyCode::Char('8'), KeyCode::Char('y')]);
        assert!(app.store().is_empty());
        assert!(status_text(&app).ends_with("Catalog cleared."));
    }

    #[test]
    fn exit_asks_when_changes_are_unsaved() {
        let temp = TempDir::new().unwrap();
        let mut app = app(&temp);
        assert!(press(&mut app, &[KeyCode::Char('9')]));

        let mut app = self::app(&temp);
        add_member(&mut app, "Alice");
        assert!(!press(&mut app, &[KeyCode::Char('q')]));
        assert!(matches!(app.mode, Mode::ConfirmExit(_)));
        assert!(!press(&mut app, &[KeyCode::Char('n')]));
        assert!(press(&mut app, &[KeyCode::Char('q'), KeyCode::Char('s')]));
        assert!(temp.path().join("members.csv").exists());
    }

    #[test]
    fn list_screen_prefills_loan_form() {
        let temp = TempDir::new().unwrap();
        let mut app = app(&temp);
        add_book(&mut app, "Dune", "Herbert");
        add_member(&mut app, "Alice");
        loan(&mut app, '3', "5000", "1000");

        press(&mut app, &[KeyCode::Char('5'), KeyCode::Char('r')]);
        match &app.mode {
            Mode::Loan(form) => {
                assert_eq!(form.action, LoanAction::Return);
                assert_eq!(form.member_id, "5000");
                assert_eq!(form.book_id, "1000");
            }
            _ => panic!("expected loan form"),
        }
        app.handle_key(KeyCode::Enter);
        assert!(!app.store().book(1000).unwrap().borrowed);
        match &app.screen {
            Screen::Books(list) => assert!(!list.items[0].borrowed),
            _ => panic!("expected book list"),
        }
    }

    #[test]
    fn unknown_shortcut_is_reported() {
        let temp = TempDir::new().unwrap();
        let mut app = app(&temp);
        app.handle_key(KeyCode::Char('x'));
        assert_eq!(status_text(&app), "Invalid choice.");
    }

    #[test]
    fn member_dialog_hint_matches_its_keys() {
        let temp = TempDir::new().unwrap();
        let mut app = app(&temp);

        app.handle_key(KeyCode::Char('2'));
        let screen = screen_text(&app);
        assert!(screen.contains("Enter to save"));
        assert!(!screen.contains("Tab to switch"));

        app.handle_key(KeyCode::Esc);
        app.handle_key(KeyCode::Char('1'));
        assert!(screen_text(&app).contains("Tab to switch"));
    }

    #[test]
    fn exhausted_ids_keep_dialog_open() {
        let temp = TempDir::new().unwrap();
        let top = MAX_STORED_ID.to_string();
        std::fs::write(
            temp.path().join("books.csv"),
            format!("{top},Dune,Herbert,0\n"),
        )
        .unwrap();
        let mut app = app(&temp);
        press(&mut app, &[KeyCode::Char('8')]);
        assert_eq!(app.store().book_count(), 1);

        add_book(&mut app, "Emma", "Austen");
        assert_eq!(status_text(&app), "No book ids left to assign.");
        assert!(matches!(app.mode, Mode::AddingBook(ref form) if form.error.is_some()));
        assert_eq!(app.store().book_count(), 1);
    }
}
