use crate::models::{Book, Member};

/// Entries of the main menu, in the order they are listed and numbered.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum MenuItem {
    AddBook,
    AddMember,
    BorrowBook,
    ReturnBook,
    ListBooks,
    ListMembers,
    SaveData,
    LoadData,
    Exit,
}

impl MenuItem {
    pub(crate) const ALL: [MenuItem; 9] = [
        MenuItem::AddBook,
        MenuItem::AddMember,
        MenuItem::BorrowBook,
        MenuItem::ReturnBook,
        MenuItem::ListBooks,
        MenuItem::ListMembers,
        MenuItem::SaveData,
        MenuItem::LoadData,
        MenuItem::Exit,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            MenuItem::AddBook => "Add Book",
            MenuItem::AddMember => "Add Member",
            MenuItem::BorrowBook => "Borrow Book",
            MenuItem::ReturnBook => "Return Book",
            MenuItem::ListBooks => "List All Books",
            MenuItem::ListMembers => "List All Members",
            MenuItem::SaveData => "Save Data",
            MenuItem::LoadData => "Load Data",
            MenuItem::Exit => "Exit",
        }
    }

    /// The digit that selects this entry directly, `1` through `9`.
    pub(crate) fn shortcut(self) -> char {
        let position = Self::ALL
            .iter()
            .position(|item| *item == self)
            .unwrap_or(0);
        char::from(b'1' + position as u8)
    }

    pub(crate) fn from_shortcut(ch: char) -> Option<Self> {
        let digit = ch.to_digit(10)? as usize;
        digit
            .checked_sub(1)
            .and_then(|idx| Self::ALL.get(idx))
            .copied()
    }
}

/// Scrollable snapshot of records shown by the list screens. The snapshot is
/// taken when the screen opens and is not live.
pub(crate) struct RecordList<T> {
    pub(crate) items: Vec<T>,
    pub(crate) selected: usize,
}

pub(crate) type BookList = RecordList<Book>;
pub(crate) type MemberList = RecordList<Member>;

impl<T> RecordList<T> {
    pub(crate) fn new(items: Vec<T>) -> Self {
        Self { items, selected: 0 }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn current(&self) -> Option<&T> {
        self.items.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.items.is_empty() {
            return;
        }
        let len = self.items.len() as isize;
        let new = (self.selected as isize + offset).clamp(0, len - 1);
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.items.len().saturating_sub(1);
    }
}
