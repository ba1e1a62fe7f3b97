use anyhow::{anyhow, Context, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{BookId, MemberId};

/// Checks shared by every free-text field. The flat files have no escaping, so
/// a comma would split the row when the catalog is loaded again.
fn validate_text(label: &str, raw: &str) -> Result<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(anyhow!("{label} is required."));
    }
    if value.contains(',') {
        return Err(anyhow!("{label} cannot contain commas."));
    }
    Ok(value.to_string())
}

fn parse_id<T: std::str::FromStr>(label: &str, raw: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = raw.trim();
    if value.is_empty() {
        return Err(anyhow!("{label} is required."));
    }
    value
        .parse::<T>()
        .with_context(|| format!("{label} must be a number."))
}

/// One `Label: value` row, highlighted when focused.
fn field_line(field_name: &str, value: &str, is_active: bool) -> Line<'static> {
    let display = if value.is_empty() {
        "<required>".to_string()
    } else {
        value.to_string()
    };

    let style = if is_active {
        Style::default().fg(Color::Yellow)
    } else if value.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::raw(format!("{field_name}: ")),
        Span::styled(display, style),
    ])
}

/// Input state for the "Add Book" dialog.
#[derive(Default, Clone)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) active: BookField,
    pub(crate) error: Option<String>,
}

#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum BookField {
    #[default]
    Title,
    Author,
}

impl BookForm {
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            BookField::Title => BookField::Author,
            BookField::Author => BookField::Title,
        };
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            BookField::Title => self.title.push(ch),
            BookField::Author => self.author.push(ch),
        }
        true
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            BookField::Title => {
                self.title.pop();
            }
            BookField::Author => {
                self.author.pop();
            }
        }
    }

    /// Validate the inputs and return `(title, author)`.
    pub(crate) fn parse_inputs(&self) -> Result<(String, String)> {
        let title = validate_text("Title", &self.title)?;
        let author = validate_text("Author", &self.author)?;
        Ok((title, author))
    }

    pub(crate) fn build_line(&self, field_name: &str, field: BookField) -> Line<'static> {
        let value = match field {
            BookField::Title => &self.title,
            BookField::Author => &self.author,
        };
        field_line(field_name, value, self.active == field)
    }

    pub(crate) fn value_len(&self, field: BookField) -> usize {
        match field {
            BookField::Title => self.title.chars().count(),
            BookField::Author => self.author.chars().count(),
        }
    }
}

/// Input state for the "Add Member" dialog.
#[derive(Default, Clone)]
pub(crate) struct MemberForm {
    pub(crate) name: String,
    pub(crate) error: Option<String>,
}

impl MemberForm {
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.name.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.name.pop();
    }

    pub(crate) fn parse_inputs(&self) -> Result<String> {
        validate_text("Name", &self.name)
    }

    pub(crate) fn build_line(&self) -> Line<'static> {
        field_line("Name", &self.name, true)
    }

    pub(crate) fn value_len(&self) -> usize {
        self.name.chars().count()
    }
}

/// Which transition a loan form performs on submit.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum LoanAction {
    Borrow,
    Return,
}

impl LoanAction {
    pub(crate) fn title(self) -> &'static str {
        match self {
            LoanAction::Borrow => "Borrow Book",
            LoanAction::Return => "Return Book",
        }
    }
}

/// Member id + book id pair, shared by the borrow and return dialogs.
#[derive(Clone)]
pub(crate) struct LoanForm {
    pub(crate) action: LoanAction,
    pub(crate) member_id: String,
    pub(crate) book_id: String,
    pub(crate) active: LoanField,
    pub(crate) error: Option<String>,
}

#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum LoanField {
    #[default]
    Member,
    Book,
}

impl LoanForm {
    pub(crate) fn new(action: LoanAction) -> Self {
        Self {
            action,
            member_id: String::new(),
            book_id: String::new(),
            active: LoanField::Member,
            error: None,
        }
    }

    /// Seed the form from a list screen. Focus lands on the first blank field.
    pub(crate) fn prefilled(
        action: LoanAction,
        member_id: Option<MemberId>,
        book_id: Option<BookId>,
    ) -> Self {
        let mut form = Self::new(action);
        if let Some(id) = member_id {
            form.member_id = id.to_string();
        }
        if let Some(id) = book_id {
            form.book_id = id.to_string();
        }
        if !form.member_id.is_empty() && form.book_id.is_empty() {
            form.active = LoanField::Book;
        }
        form
    }

    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            LoanField::Member => LoanField::Book,
            LoanField::Book => LoanField::Member,
        };
    }

    /// Only digits are accepted; ids are never negative.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if !ch.is_ascii_digit() {
            return false;
        }
        match self.active {
            LoanField::Member => self.member_id.push(ch),
            LoanField::Book => self.book_id.push(ch),
        }
        true
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            LoanField::Member => {
                self.member_id.pop();
            }
            LoanField::Book => {
                self.book_id.pop();
            }
        }
    }

    pub(crate) fn parse_inputs(&self) -> Result<(MemberId, BookId)> {
        let member_id = parse_id::<MemberId>("Member ID", &self.member_id)?;
        let book_id = parse_id::<BookId>("Book ID", &self.book_id)?;
        Ok((member_id, book_id))
    }

    pub(crate) fn build_line(&self, field_name: &str, field: LoanField) -> Line<'static> {
        let value = match field {
            LoanField::Member => &self.member_id,
            LoanField::Book => &self.book_id,
        };
        field_line(field_name, value, self.active == field)
    }

    pub(crate) fn value_len(&self, field: LoanField) -> usize {
        match field {
            LoanField::Member => self.member_id.len(),
            LoanField::Book => self.book_id.len(),
        }
    }
}

/// Shown before a load replaces a non-empty in-memory catalog.
#[derive(Clone)]
pub(crate) struct ConfirmLoad {
    pub(crate) books: usize,
    pub(crate) members: usize,
}

/// Shown when quitting with changes that were never saved.
#[derive(Clone, Copy)]
pub(crate) struct ConfirmExit;
