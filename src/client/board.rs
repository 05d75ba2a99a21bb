//! Client-side todo list.
//!
//! The board mirrors the service once at load time and is then edited locally. Toggles,
//! edits, removals and the bulk actions never reach the service; only new todos are sent.
//! Items are addressed by [`TodoId`], with display order kept separately so a removal or a
//! filter in the view never shifts which item an operation lands on.

use std::collections::HashMap;

use crate::domain::todo::{NewTodo, Todo, TodoId};

use super::ClientError;

/// The form fields shared by "add" and "edit".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditState {
    #[default]
    Idle,
    Editing(TodoId),
}

/// A destructive action waiting for an explicit yes/no.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirm {
    RemoveOne(TodoId),
    RemoveAll,
}

#[derive(Debug, Clone)]
pub struct TodoBoard {
    order: Vec<TodoId>,
    items: HashMap<TodoId, Todo>,
    loading: bool,
    submitting: bool,
    draft: Draft,
    edit: EditState,
    confirm: Option<Confirm>,
}

impl Default for TodoBoard {
    fn default() -> Self { Self::new() }
}

impl TodoBoard {
    /// An empty board that has not finished its initial load yet.
    pub fn new() -> Self {
        Self { order: Vec::new(), items: HashMap::new(), loading: true, submitting: false, draft: Draft::default(), edit: EditState::Idle, confirm: None }
    }

    /// Todos in display order.
    pub fn todos(&self) -> impl Iterator<Item = &Todo> + '_ {
        self.order.iter().filter_map(|id| self.items.get(id))
    }

    pub fn get(&self, id: TodoId) -> Option<&Todo> { self.items.get(&id) }

    pub fn id_at(&self, position: usize) -> Option<TodoId> { self.order.get(position).copied() }

    pub fn position(&self, id: TodoId) -> Option<usize> { self.order.iter().position(|&o| o == id) }

    pub fn len(&self) -> usize { self.order.len() }

    pub fn is_empty(&self) -> bool { self.order.is_empty() }

    pub fn is_loading(&self) -> bool { self.loading }

    pub(crate) fn set_loading(&mut self, loading: bool) { self.loading = loading; }

    /// A create request has been sent and its reply has not been applied yet.
    pub fn is_submitting(&self) -> bool { self.submitting }

    pub(crate) fn set_submitting(&mut self, submitting: bool) { self.submitting = submitting; }

    pub fn draft(&self) -> &Draft { &self.draft }

    /// Typing into the form is always allowed, in both add and edit mode.
    pub fn draft_mut(&mut self) -> &mut Draft { &mut self.draft }

    pub fn clear_draft(&mut self) { self.draft = Draft::default(); }

    pub fn edit_state(&self) -> EditState { self.edit }

    pub fn is_editing(&self) -> bool { matches!(self.edit, EditState::Editing(_)) }

    pub fn pending_confirm(&self) -> Option<Confirm> { self.confirm }

    /// Replaces the whole list with a fresh server listing. Duplicate ids keep their first position.
    pub fn replace_all(&mut self, todos: Vec<Todo>) {
        self.order.clear();
        self.items.clear();
        for todo in todos {
            if self.items.contains_key(&todo.id) { continue; }
            self.order.push(todo.id);
            self.items.insert(todo.id, todo);
        }
    }

    pub(crate) fn append_created(&mut self, todo: Todo) {
        if !self.items.contains_key(&todo.id) { self.order.push(todo.id); }
        self.items.insert(todo.id, todo);
    }

    /// Validates the draft for submission and returns the payload to send.
    pub fn begin_submit(&self) -> Result<NewTodo, ClientError> {
        self.ensure_idle()?;
        if self.submitting { return Err(ClientError::SubmitInFlight); }
        if self.draft.title.trim().is_empty() { return Err(ClientError::EmptyTitle); }
        let text = (!self.draft.text.is_empty()).then(|| self.draft.text.clone());
        Ok(NewTodo { title: self.draft.title.clone(), text, completed: Some(false) })
    }

    pub fn toggle_complete(&mut self, id: TodoId) -> Result<bool, ClientError> {
        self.ensure_idle()?;
        let todo = self.items.get_mut(&id).ok_or(ClientError::UnknownTodo(id))?;
        todo.completed = !todo.completed;
        Ok(todo.completed)
    }

    pub fn begin_edit(&mut self, id: TodoId) -> Result<(), ClientError> {
        self.ensure_idle()?;
        let todo = self.items.get(&id).ok_or(ClientError::UnknownTodo(id))?;
        self.draft = Draft { title: todo.title.clone(), text: todo.text.clone().unwrap_or_default() };
        self.edit = EditState::Editing(id);
        Ok(())
    }

    /// Writes the draft into the todo under edit. Only title and text change.
    pub fn save_edit(&mut self) -> Result<TodoId, ClientError> {
        if self.confirm.is_some() { return Err(ClientError::ConfirmPending); }
        let EditState::Editing(id) = self.edit else { return Err(ClientError::NotEditing) };
        let draft = std::mem::take(&mut self.draft);
        self.edit = EditState::Idle;
        let todo = self.items.get_mut(&id).ok_or(ClientError::UnknownTodo(id))?;
        todo.title = draft.title;
        todo.text = (!draft.text.is_empty()).then_some(draft.text);
        Ok(id)
    }

    pub fn cancel_edit(&mut self) -> Result<(), ClientError> {
        if !self.is_editing() { return Err(ClientError::NotEditing); }
        self.edit = EditState::Idle;
        self.clear_draft();
        Ok(())
    }

    pub fn request_remove(&mut self, id: TodoId) -> Result<(), ClientError> {
        self.ensure_idle()?;
        if !self.items.contains_key(&id) { return Err(ClientError::UnknownTodo(id)); }
        self.confirm = Some(Confirm::RemoveOne(id));
        Ok(())
    }

    pub fn request_remove_all(&mut self) -> Result<(), ClientError> {
        self.ensure_idle()?;
        self.confirm = Some(Confirm::RemoveAll);
        Ok(())
    }

    /// Runs the pending destructive action.
    pub fn confirm(&mut self) -> Result<Confirm, ClientError> {
        let action = self.confirm.take().ok_or(ClientError::NothingToConfirm)?;
        match action {
            Confirm::RemoveOne(id) => {
                self.items.remove(&id);
                self.order.retain(|&o| o != id);
            }
            Confirm::RemoveAll => {
                self.items.clear();
                self.order.clear();
            }
        }
        Ok(action)
    }

    pub fn cancel_confirm(&mut self) -> Option<Confirm> { self.confirm.take() }

    /// Drops every completed todo and returns how many went.
    pub fn remove_completed(&mut self) -> Result<usize, ClientError> {
        self.ensure_idle()?;
        let before = self.order.len();
        let items = &mut self.items;
        self.order.retain(|id| {
            let keep = items.get(id).is_some_and(|t| !t.completed);
            if !keep { items.remove(id); }
            keep
        });
        Ok(before - self.order.len())
    }

    pub fn mark_all_complete(&mut self) -> Result<(), ClientError> { self.set_all_completed(true) }

    pub fn mark_all_incomplete(&mut self) -> Result<(), ClientError> { self.set_all_completed(false) }

    fn set_all_completed(&mut self, completed: bool) -> Result<(), ClientError> {
        self.ensure_idle()?;
        self.items.values_mut().for_each(|t| t.completed = completed);
        Ok(())
    }

    fn ensure_idle(&self) -> Result<(), ClientError> {
        if self.confirm.is_some() { return Err(ClientError::ConfirmPending); }
        if self.is_editing() { return Err(ClientError::EditInProgress); }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn todo(title: &str, completed: bool) -> Todo {
        let now = Utc::now();
        Todo { id: TodoId::default(), title: title.into(), text: Some(format!("{title} text")), completed, created_at: now, updated_at: now }
    }

    fn board(todos: Vec<Todo>) -> TodoBoard {
        let mut board = TodoBoard::new();
        board.replace_all(todos);
        board.set_loading(false);
        board
    }

    fn flags(board: &TodoBoard) -> Vec<bool> { board.todos().map(|t| t.completed).collect() }

    #[test]
    fn toggle_flips_only_the_target_and_twice_restores() {
        let items = vec![todo("a", false), todo("b", true), todo("c", false)];
        let b_id = items[1].id;
        let mut board = board(items);
        assert!(!board.toggle_complete(b_id).unwrap());
        assert_eq!(flags(&board), [false, false, false]);
        assert!(board.toggle_complete(b_id).unwrap());
        assert_eq!(flags(&board), [false, true, false]);
    }

    #[test]
    fn edit_replaces_title_and_text_only() {
        let items = vec![todo("a", true), todo("b", false)];
        let original = items[0].clone();
        let mut board = board(items);

        board.begin_edit(original.id).unwrap();
        assert_eq!(board.draft().title, "a");
        assert_eq!(board.draft().text, "a text");
        board.draft_mut().title = "renamed".into();
        board.draft_mut().text = "new body".into();
        assert_eq!(board.save_edit().unwrap(), original.id);

        let edited = board.get(original.id).unwrap();
        assert_eq!(edited.title, "renamed");
        assert_eq!(edited.text.as_deref(), Some("new body"));
        assert_eq!(edited.id, original.id);
        assert_eq!(edited.completed, original.completed);
        assert_eq!(edited.created_at, original.created_at);
        assert_eq!(edited.updated_at, original.updated_at);
        assert_eq!(board.draft(), &Draft::default());
        assert_eq!(board.edit_state(), EditState::Idle);
        assert_eq!(board.todos().nth(1).unwrap().title, "b");
    }

    #[test]
    fn only_one_edit_session_at_a_time() {
        let items = vec![todo("a", false), todo("b", false)];
        let (a, b) = (items[0].id, items[1].id);
        let mut board = board(items);
        board.begin_edit(a).unwrap();
        assert_eq!(board.begin_edit(b), Err(ClientError::EditInProgress));
        assert_eq!(board.edit_state(), EditState::Editing(a));
        assert_eq!(board.draft().title, "a");
    }

    #[test]
    fn editing_locks_out_everything_else() {
        let items = vec![todo("a", false), todo("b", false)];
        let (a, b) = (items[0].id, items[1].id);
        let mut board = board(items);
        board.begin_edit(a).unwrap();

        assert_eq!(board.begin_submit(), Err(ClientError::EditInProgress));
        assert_eq!(board.toggle_complete(b), Err(ClientError::EditInProgress));
        assert_eq!(board.request_remove(b), Err(ClientError::EditInProgress));
        assert_eq!(board.request_remove_all(), Err(ClientError::EditInProgress));
        assert_eq!(board.remove_completed(), Err(ClientError::EditInProgress));
        assert_eq!(board.mark_all_complete(), Err(ClientError::EditInProgress));
        assert_eq!(board.mark_all_incomplete(), Err(ClientError::EditInProgress));
        assert_eq!(flags(&board), [false, false]);

        board.cancel_edit().unwrap();
        assert_eq!(board.draft(), &Draft::default());
        board.mark_all_complete().unwrap();
        assert_eq!(flags(&board), [true, true]);
    }

    #[test]
    fn save_without_session_is_rejected() {
        let mut board = board(vec![todo("a", false)]);
        assert_eq!(board.save_edit(), Err(ClientError::NotEditing));
        assert_eq!(board.cancel_edit(), Err(ClientError::NotEditing));
    }

    #[test]
    fn removal_waits_for_confirmation() {
        let items = vec![todo("a", false), todo("b", false), todo("c", false)];
        let b = items[1].id;
        let mut board = board(items);

        board.request_remove(b).unwrap();
        assert_eq!(board.len(), 3);
        assert_eq!(board.toggle_complete(b), Err(ClientError::ConfirmPending));
        assert_eq!(board.cancel_confirm(), Some(Confirm::RemoveOne(b)));
        assert_eq!(board.len(), 3);

        board.request_remove(b).unwrap();
        assert_eq!(board.confirm().unwrap(), Confirm::RemoveOne(b));
        let titles: Vec<_> = board.todos().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["a", "c"]);
        assert!(board.get(b).is_none());
        assert_eq!(board.confirm(), Err(ClientError::NothingToConfirm));
    }

    #[test]
    fn remove_all_requires_confirmation() {
        let mut board = board(vec![todo("a", false), todo("b", true)]);
        board.request_remove_all().unwrap();
        assert_eq!(board.len(), 2);
        board.confirm().unwrap();
        assert!(board.is_empty());
    }

    #[test]
    fn ids_stay_valid_after_earlier_removal() {
        let items = vec![todo("a", false), todo("b", false), todo("c", false)];
        let (a, c) = (items[0].id, items[2].id);
        let mut board = board(items);
        board.request_remove(a).unwrap();
        board.confirm().unwrap();
        board.toggle_complete(c).unwrap();
        assert!(board.get(c).unwrap().completed);
        assert_eq!(board.position(c), Some(1));
        assert_eq!(board.id_at(1), Some(c));
    }

    #[test]
    fn bulk_transforms() {
        let mut board = board(vec![todo("a", true), todo("b", false), todo("c", true)]);
        board.mark_all_incomplete().unwrap();
        assert_eq!(flags(&board), [false, false, false]);
        board.mark_all_complete().unwrap();
        assert_eq!(flags(&board), [true, true, true]);
        let first = board.id_at(0).unwrap();
        board.toggle_complete(first).unwrap();
        assert_eq!(board.remove_completed().unwrap(), 2);
        assert_eq!(board.todos().map(|t| t.title.as_str()).collect::<Vec<_>>(), ["a"]);
    }

    #[test]
    fn submit_guard_rejects_blank_titles() {
        let mut board = board(vec![]);
        board.draft_mut().title = "   ".into();
        assert_eq!(board.begin_submit(), Err(ClientError::EmptyTitle));
        board.draft_mut().title = " Buy milk ".into();
        board.draft_mut().text = "2%".into();
        let payload = board.begin_submit().unwrap();
        assert_eq!(payload.title, " Buy milk ");
        assert_eq!(payload.text.as_deref(), Some("2%"));
        assert_eq!(payload.completed, Some(false));
    }

    #[test]
    fn unknown_ids_are_reported() {
        let mut board = board(vec![todo("a", false)]);
        let ghost = TodoId::default();
        assert_eq!(board.toggle_complete(ghost), Err(ClientError::UnknownTodo(ghost)));
        assert_eq!(board.begin_edit(ghost), Err(ClientError::UnknownTodo(ghost)));
        assert_eq!(board.request_remove(ghost), Err(ClientError::UnknownTodo(ghost)));
        assert_eq!(board.pending_confirm(), None);
    }
}
