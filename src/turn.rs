//! Turn state of a running quiz
//!
//! [`TurnState`] holds everything that changes from one action to the next:
//! whose turn it is, the question on the table, the student called on, and
//! which teams have passed on the current question. It does not decide when
//! to draw or score; the session controller in [`crate::game`] drives it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::data::{Question, StudentId};

/// The phase a quiz is in, derived from the turn state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum Phase {
    /// No question has been drawn yet, or the last one was discarded
    AwaitingQuestion,
    /// A question is waiting to be answered
    QuestionActive,
    /// A question is waiting to be answered and its answer is visible
    AnswerRevealed,
    /// The question pool ran out
    Finished,
}

/// Mutable per-turn bookkeeping
#[derive(Debug, Clone, Serialize)]
pub struct TurnState {
    /// Index of the team whose turn it is, always below `team_count`
    active_team: usize,
    /// Number of teams in rotation
    team_count: usize,
    /// Question on the table
    current_question: Option<Question>,
    /// Student called on for the current question
    current_student: Option<StudentId>,
    /// Rotation indices of the teams that passed on the current question
    skipped_teams: BTreeSet<usize>,
    /// Whether the answer of the current question is visible
    answer_revealed: bool,
    /// Whether the question pool has run out
    finished: bool,
}

impl TurnState {
    /// Creates the state for a fresh round with `team_count` teams, first team active
    pub fn new(team_count: usize) -> Self {
        Self {
            active_team: 0,
            team_count: team_count.max(1),
            current_question: None,
            current_student: None,
            skipped_teams: BTreeSet::new(),
            answer_revealed: false,
            finished: false,
        }
    }

    /// Current phase of the quiz
    pub fn phase(&self) -> Phase {
        if self.finished {
            Phase::Finished
        } else if self.current_question.is_none() {
            Phase::AwaitingQuestion
        } else if self.answer_revealed {
            Phase::AnswerRevealed
        } else {
            Phase::QuestionActive
        }
    }

    /// Rotation index of the team whose turn it is
    pub fn active_team(&self) -> usize {
        self.active_team
    }

    /// Number of teams in rotation
    pub fn team_count(&self) -> usize {
        self.team_count
    }

    /// Question on the table
    pub fn current_question(&self) -> Option<&Question> {
        self.current_question.as_ref()
    }

    /// Student called on for the current question
    pub fn current_student(&self) -> Option<&StudentId> {
        self.current_student.as_ref()
    }

    /// Rotation indices of the teams that passed on the current question
    pub fn skipped_teams(&self) -> &BTreeSet<usize> {
        &self.skipped_teams
    }

    /// Whether the answer is visible
    pub fn answer_revealed(&self) -> bool {
        self.answer_revealed
    }

    /// Hands the turn to the next team in round-robin order
    ///
    /// The student called on belongs to the previous team, so it is cleared.
    ///
    /// # Returns
    ///
    /// `true` if the rotation wrapped back to the first team
    pub fn advance(&mut self) -> bool {
        self.active_team = (self.active_team + 1) % self.team_count;
        self.current_student = None;
        self.active_team == 0
    }

    /// Puts a new question on the table, hiding its answer
    ///
    /// A finished quiz stays finished.
    ///
    /// # Returns
    ///
    /// The question it replaced, if that one was never resolved
    pub fn set_question(&mut self, question: Question) -> Option<Question> {
        self.answer_revealed = false;
        self.current_question.replace(question)
    }

    /// Takes the current question off the table without resolving it
    pub fn discard_question(&mut self) -> Option<Question> {
        self.answer_revealed = false;
        self.current_question.take()
    }

    /// Records the student called on for the current question
    pub fn set_student(&mut self, student: Option<StudentId>) {
        self.current_student = student;
    }

    /// Marks the active team as having passed
    ///
    /// # Returns
    ///
    /// `true` if every team has now passed on the current question
    pub fn record_skip(&mut self) -> bool {
        self.skipped_teams.insert(self.active_team);
        self.skipped_teams.len() >= self.team_count
    }

    /// Forgets which teams passed
    pub fn clear_skips(&mut self) {
        self.skipped_teams.clear();
    }

    /// Makes the answer visible
    ///
    /// # Returns
    ///
    /// `true` if visibility changed; there must be a question on the table
    pub fn reveal_answer(&mut self) -> bool {
        let changed = self.current_question.is_some() && !self.answer_revealed;
        if changed {
            self.answer_revealed = true;
        }
        changed
    }

    /// Hides the answer
    ///
    /// # Returns
    ///
    /// `true` if visibility changed
    pub fn hide_answer(&mut self) -> bool {
        let changed = self.answer_revealed;
        self.answer_revealed = false;
        changed
    }

    /// Marks the question pool as exhausted, clearing the table
    pub fn finish(&mut self) {
        self.discard_question();
        self.current_student = None;
        self.finished = true;
    }
}
