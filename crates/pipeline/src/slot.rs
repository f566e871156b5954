//! Single-slot handoff for the comment currently being worked on.
//!
//! The serving layer owns one [`CommentSlot`] and passes it by reference; it is
//! never ambient state. A successful persist clears the slot, a failed one
//! leaves the comment in place so the caller can retry.

use crate::Comment;

/// Holds at most one comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentSlot {
    current: Option<Comment>,
}

impl CommentSlot {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Places `comment` in the slot, returning the one it replaced.
    pub fn put(&mut self, comment: Comment) -> Option<Comment> {
        self.current.replace(comment)
    }

    /// The comment in the slot, if any.
    pub fn current(&self) -> Option<&Comment> {
        self.current.as_ref()
    }

    /// Empties the slot, returning what it held.
    pub fn take(&mut self) -> Option<Comment> {
        self.current.take()
    }

    /// Returns `true` if the slot holds no comment.
    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_replaces_and_take_empties() {
        let mut slot = CommentSlot::new();
        assert!(slot.is_empty());
        assert!(slot.put(Comment::new("primero de todos").unwrap()).is_none());
        let replaced = slot.put(Comment::new("segundo de todos").unwrap());
        assert_eq!(replaced.unwrap().as_str(), "primero de todos");
        assert_eq!(slot.current().unwrap().as_str(), "segundo de todos");
        assert_eq!(slot.take().unwrap().as_str(), "segundo de todos");
        assert!(slot.is_empty());
    }
}
