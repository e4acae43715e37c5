use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub text: String,
    pub done: bool,
}

/// Caller-owned task list. Every update consumes the list and hands back the
/// new one; nothing is kept behind the caller's back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Appends an open task. Blank text is ignored.
    pub fn add(mut self, text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return self;
        }
        self.tasks.push(Task {
            id: Uuid::new_v4(),
            text: text.to_string(),
            done: false,
        });
        self
    }

    pub fn toggle(mut self, id: Uuid) -> Self {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            task.done = !task.done;
        }
        self
    }

    pub fn set_done(mut self, id: Uuid, done: bool) -> Self {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            task.done = done;
        }
        self
    }

    pub fn remove(mut self, id: Uuid) -> Self {
        self.tasks.retain(|t| t.id != id);
        self
    }

    pub fn open_count(&self) -> usize {
        self.tasks.iter().filter(|t| !t.done).count()
    }
}
