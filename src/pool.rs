//! The live question pool
//!
//! A session serves every question at most once. The pool starts as a copy
//! of the question bank and loses one question per draw; it is never
//! refilled, not even when the session is reset.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::{DataStore, Question, QuestionId};

/// The shrinking set of questions that have not been served yet
#[derive(Debug, Clone, Default, Serialize)]
pub struct QuestionPool {
    remaining: BTreeMap<QuestionId, Question>,
}

impl QuestionPool {
    /// Creates a pool holding every question in the store
    pub fn new(store: &DataStore) -> Self {
        store.questions().cloned().collect()
    }

    /// Removes a uniformly random question from the pool and returns it
    ///
    /// # Returns
    ///
    /// `None` once the pool is exhausted
    pub fn draw(&mut self) -> Option<Question> {
        let id = fastrand::choice(self.remaining.keys())?.clone();
        self.remaining.remove(&id)
    }

    /// Number of questions not served yet
    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    /// Whether every question has been served
    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Whether the question is still waiting to be served
    pub fn contains(&self, id: &QuestionId) -> bool {
        self.remaining.contains_key(id)
    }
}

impl FromIterator<Question> for QuestionPool {
    fn from_iter<I: IntoIterator<Item = Question>>(iter: I) -> Self {
        Self {
            remaining: iter
                .into_iter()
                .map(|question| (question.id.clone(), question))
                .collect(),
        }
    }
}
