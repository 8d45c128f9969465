//! Session controller
//!
//! This module contains [`Game`], the controller a presentation layer drives
//! once setup is complete. Every operation runs to completion, mutates the
//! roster, the turn state and the question pool, and returns the list of
//! [`UpdateMessage`]s describing what changed. A full [`SyncMessage`]
//! snapshot is available at any time for redrawing the whole view.

use std::sync::Arc;

use itertools::Itertools;
use serde::Serialize;
use serde_with::skip_serializing_none;

use crate::{
    constants,
    data::{DataStore, Question, Student},
    leaderboard::Leaderboard,
    pool::QuestionPool,
    session::Tunnel,
    setup::Setup,
    teams::Roster,
    turn::{Phase, TurnState},
};

/// Incremental notifications produced by controller operations
///
/// Operations return these in the order the changes happened, so a
/// presentation layer can update only what changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum UpdateMessage {
    /// A question was put on the table
    QuestionDrawn {
        /// The question text
        question: String,
        /// Questions left in the pool after this draw
        remaining: usize,
    },
    /// Every team passed and the question was taken off the table unanswered
    QuestionDiscarded,
    /// The answer is now visible
    AnswerShown(String),
    /// The answer is hidden again
    AnswerHidden,
    /// A student of the active team was called on (`None` if the team has no members)
    StudentDrawn(Option<String>),
    /// The turn passed to another team
    TurnChanged(String),
    /// A team passed on the current question
    TeamSkipped(String),
    /// A team's score changed
    Score {
        /// The team whose score changed
        team: String,
        /// The new score
        score: i64,
    },
    /// The question pool ran out; carries the final board
    Finished(Leaderboard),
}

impl UpdateMessage {
    /// Converts the update message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// Full snapshot of what the play view shows
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncMessage {
    /// Current phase
    pub phase: Phase,
    /// Name of the team whose turn it is
    pub team: String,
    /// Text for the question area: the question, or a status line without one
    pub headline: String,
    /// The current question text
    pub question: Option<String>,
    /// The answer, present only while revealed
    pub answer: Option<String>,
    /// Name of the student called on
    pub student: Option<String>,
    /// Questions left in the pool
    pub remaining_questions: usize,
    /// Teams that passed on the current question
    pub skipped: Vec<String>,
    /// Current scores in team creation order
    pub leaderboard: Leaderboard,
}

impl SyncMessage {
    /// Converts the snapshot to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// The session controller
///
/// Owns the roster, the turn state and the question pool exclusively; the
/// data store is shared read-only with the setup flow.
pub struct Game {
    /// Students and questions loaded at startup
    store: Arc<DataStore>,
    /// Questions not served yet
    pool: QuestionPool,
    /// Teams, scores and members
    roster: Roster,
    /// Whose turn it is and what is on the table
    turn: TurnState,
    /// Text shown in the question area when no question is on the table
    status: &'static str,
    /// Board captured when the pool ran out
    final_leaderboard: Option<Leaderboard>,
    /// Team count proposed again by the setup flow after a reset
    default_team_count: usize,
}

impl std::fmt::Debug for Game {
    /// Custom debug implementation that avoids printing the whole data store
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("roster", &self.roster)
            .field("turn", &self.turn)
            .field("remaining_questions", &self.pool.len())
            .finish_non_exhaustive()
    }
}

// Accessors
impl Game {
    /// Current phase
    pub fn phase(&self) -> Phase {
        self.turn.phase()
    }

    /// Whether the question pool has run out
    pub fn is_finished(&self) -> bool {
        matches!(self.phase(), Phase::Finished)
    }

    /// Rotation index of the team whose turn it is
    pub fn active_team(&self) -> usize {
        self.turn.active_team()
    }

    /// Name of the team whose turn it is
    pub fn active_team_name(&self) -> String {
        self.team_name(self.turn.active_team())
    }

    fn team_name(&self, index: usize) -> String {
        self.roster
            .get(index)
            .map(|team| team.name().to_owned())
            .unwrap_or_default()
    }

    /// Question on the table
    pub fn current_question(&self) -> Option<&Question> {
        self.turn.current_question()
    }

    /// Student called on for the current question
    pub fn current_student(&self) -> Option<&Student> {
        self.turn
            .current_student()
            .and_then(|id| self.store.student(id))
    }

    /// Names of the teams that passed on the current question
    pub fn skipped_teams(&self) -> Vec<String> {
        self.turn
            .skipped_teams()
            .iter()
            .map(|&index| self.team_name(index))
            .collect_vec()
    }

    /// Whether the answer is visible
    pub fn answer_revealed(&self) -> bool {
        self.turn.answer_revealed()
    }

    /// Teams, scores and members
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Students and questions loaded at startup
    pub fn store(&self) -> &DataStore {
        &self.store
    }

    /// Number of questions not served yet
    pub fn remaining_questions(&self) -> usize {
        self.pool.len()
    }

    /// Current scores in team creation order
    pub fn leaderboard(&self) -> Leaderboard {
        self.roster.leaderboard()
    }

    /// Board captured when the quiz finished, `None` while it is running
    pub fn final_leaderboard(&self) -> Option<&Leaderboard> {
        self.final_leaderboard.as_ref()
    }

    /// Text for the question area
    pub fn headline(&self) -> &str {
        self.turn
            .current_question()
            .map_or(self.status, |question| question.text.as_str())
    }

    /// Full snapshot of the play view
    pub fn snapshot(&self) -> SyncMessage {
        SyncMessage {
            phase: self.phase(),
            team: self.active_team_name(),
            headline: self.headline().to_owned(),
            question: self.turn.current_question().map(|q| q.text.clone()),
            answer: self
                .turn
                .current_question()
                .filter(|_| self.turn.answer_revealed())
                .map(|q| q.answer.clone()),
            student: self.current_student().map(|s| s.name.clone()),
            remaining_questions: self.pool.len(),
            skipped: self.skipped_teams(),
            leaderboard: self.roster.leaderboard(),
        }
    }

    /// Sends updates followed by a fresh snapshot through a tunnel
    pub fn announce<T: Tunnel>(&self, updates: &[UpdateMessage], tunnel: &T) {
        for update in updates {
            tunnel.send_message(update);
        }
        tunnel.send_state(&self.snapshot());
    }
}

impl Game {
    /// Creates a controller for a freshly set up round
    ///
    /// The first team is active and no question is on the table.
    pub fn new(store: Arc<DataStore>, roster: Roster, pool: QuestionPool) -> Self {
        let turn = TurnState::new(roster.len());

        tracing::debug!(
            teams = roster.len(),
            questions = pool.len(),
            "quiz started"
        );

        Self {
            store,
            pool,
            roster,
            turn,
            status: constants::status::PROMPT,
            final_leaderboard: None,
            default_team_count: constants::teams::DEFAULT_COUNT,
        }
    }

    pub(crate) fn with_default_team_count(mut self, count: usize) -> Self {
        self.default_team_count = count;
        self
    }

    /// Draws a question and calls on a student of the active team
    ///
    /// Any question still on the table is discarded without penalty. When the
    /// pool is empty the quiz finishes instead.
    pub fn draw_question(&mut self) -> Vec<UpdateMessage> {
        let mut updates = Vec::new();
        self.draw(true, &mut updates);
        updates
    }

    /// Draws a replacement question, keeping the student already called on
    ///
    /// Behaves like [`Game::draw_question`] otherwise.
    pub fn reroll_question(&mut self) -> Vec<UpdateMessage> {
        let mut updates = Vec::new();
        self.draw(false, &mut updates);
        updates
    }

    fn draw(&mut self, call_student: bool, updates: &mut Vec<UpdateMessage>) {
        if self.is_finished() {
            self.finish(updates);
            return;
        }

        let Some(question) = self.pool.draw() else {
            self.finish(updates);
            return;
        };

        tracing::info!(
            question = %question.id,
            remaining = self.pool.len(),
            "drew question"
        );

        updates.push(UpdateMessage::QuestionDrawn {
            question: question.text.clone(),
            remaining: self.pool.len(),
        });

        if let Some(discarded) = self.turn.set_question(question) {
            tracing::debug!(question = %discarded.id, "replaced unresolved question");
        }

        if call_student {
            self.call_student(updates);
        }
    }

    /// Picks a uniformly random member of the active team
    ///
    /// # Returns
    ///
    /// `None` if the active team has no members
    pub fn random_student(&self) -> Option<&Student> {
        let members = self.roster.get(self.turn.active_team())?.members();
        let id = fastrand::choice(members.iter())?;
        self.store.student(id)
    }

    /// Calls on a new random student of the active team
    pub fn draw_student(&mut self) -> Vec<UpdateMessage> {
        let mut updates = Vec::new();
        self.call_student(&mut updates);
        updates
    }

    fn call_student(&mut self, updates: &mut Vec<UpdateMessage>) {
        let student = self.random_student().cloned();

        if student.is_none() {
            tracing::debug!(team = %self.active_team_name(), "no student to call on");
        }

        updates.push(UpdateMessage::StudentDrawn(
            student.as_ref().map(|s| s.name.clone()),
        ));
        self.turn.set_student(student.map(|s| s.id));
    }

    /// Makes the answer of the current question visible
    pub fn reveal_answer(&mut self) -> Vec<UpdateMessage> {
        if !self.turn.reveal_answer() {
            return Vec::new();
        }

        self.turn
            .current_question()
            .map(|question| vec![UpdateMessage::AnswerShown(question.answer.clone())])
            .unwrap_or_default()
    }

    /// Hides the answer of the current question
    pub fn hide_answer(&mut self) -> Vec<UpdateMessage> {
        if self.turn.hide_answer() {
            vec![UpdateMessage::AnswerHidden]
        } else {
            Vec::new()
        }
    }

    /// Shows the answer if hidden and hides it if shown
    pub fn toggle_answer(&mut self) -> Vec<UpdateMessage> {
        if self.turn.answer_revealed() {
            self.hide_answer()
        } else {
            self.reveal_answer()
        }
    }

    /// Hands the turn to the next team
    ///
    /// When the rotation wraps back to the first team with no question on
    /// the table, a question is drawn.
    pub fn advance_team(&mut self) -> Vec<UpdateMessage> {
        let mut updates = Vec::new();
        let wrapped = self.rotate(&mut updates);
        self.draw_if_idle(wrapped, &mut updates);
        updates
    }

    fn rotate(&mut self, updates: &mut Vec<UpdateMessage>) -> bool {
        let wrapped = self.turn.advance();
        let team = self.active_team_name();

        tracing::debug!(%team, wrapped, "turn passed");

        updates.push(UpdateMessage::TurnChanged(team));
        wrapped
    }

    fn draw_if_idle(&mut self, wrapped: bool, updates: &mut Vec<UpdateMessage>) {
        if wrapped && self.turn.current_question().is_none() {
            self.draw(true, updates);
        }
    }

    /// Awards a point to the active team and moves on
    ///
    /// The skip record is cleared, the turn passes to the next team and the
    /// next question is drawn straight away. Without a question on the table
    /// nothing happens.
    pub fn mark_correct(&mut self) -> Vec<UpdateMessage> {
        if self.turn.current_question().is_none() {
            tracing::warn!("ignored correct mark without a question");
            return Vec::new();
        }

        let mut updates = Vec::new();
        let team = self.active_team_name();

        if let Some(score) = self.roster.increment_score(&team, 1) {
            tracing::info!(%team, score, "answered correctly");
            updates.push(UpdateMessage::Score { team, score });
        }

        self.turn.clear_skips();
        self.rotate(&mut updates);
        self.draw(true, &mut updates);

        updates
    }

    /// Records that the active team passes and hands the turn on
    ///
    /// The question stays on the table for the next team. Once every team has
    /// passed on it, the question is discarded without any score change and a
    /// new one is drawn; in that case the wrap-around draw of
    /// [`Game::advance_team`] does not also fire.
    pub fn skip(&mut self) -> Vec<UpdateMessage> {
        let mut updates = Vec::new();
        let team = self.active_team_name();
        let everyone_passed = self.turn.record_skip();

        tracing::debug!(%team, everyone_passed, "team passed");

        updates.push(UpdateMessage::TeamSkipped(team));
        let wrapped = self.rotate(&mut updates);

        if everyone_passed {
            self.turn.clear_skips();
            if let Some(discarded) = self.turn.discard_question() {
                tracing::info!(question = %discarded.id, "every team passed");
                self.status = constants::status::SKIPPED;
                updates.push(UpdateMessage::QuestionDiscarded);
            }
            self.draw(true, &mut updates);
        } else {
            self.draw_if_idle(wrapped, &mut updates);
        }

        updates
    }

    /// Overwrites a team's score from manually entered text
    ///
    /// Input that is not an integer, or an unknown team, leaves every score
    /// unchanged.
    pub fn set_score(&mut self, team: &str, input: &str) -> Vec<UpdateMessage> {
        match self.roster.set_score(team, input) {
            Some(score) => {
                tracing::info!(team, score, "score corrected");
                vec![UpdateMessage::Score {
                    team: team.to_owned(),
                    score,
                }]
            }
            None => {
                tracing::warn!(team, input, "ignored score entry");
                Vec::new()
            }
        }
    }

    /// Ends the quiz and publishes the final board
    pub fn end_quiz(&mut self) -> Vec<UpdateMessage> {
        let mut updates = Vec::new();
        self.finish(&mut updates);
        updates
    }

    fn finish(&mut self, updates: &mut Vec<UpdateMessage>) {
        let leaderboard = self.roster.leaderboard();

        if self.final_leaderboard.is_none() {
            tracing::info!(
                standings = %leaderboard.standings().iter().map(|s| format!("{}={}", s.team, s.score)).join(", "),
                "quiz finished"
            );
        }

        self.turn.finish();
        self.status = constants::status::FINISHED;
        self.final_leaderboard = Some(leaderboard.clone());
        updates.push(UpdateMessage::Finished(leaderboard));
    }

    /// Throws away teams, scores and turn state and returns to setup
    ///
    /// Questions already served stay out of the pool.
    pub fn reset(self) -> Setup {
        tracing::info!(remaining = self.pool.len(), "quiz reset");
        Setup::resume(self.store, self.pool, self.default_team_count)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::{
        cell::RefCell,
        collections::{BTreeSet, HashSet},
    };

    use super::*;
    use crate::data::{Question, Student};

    fn store(students: usize, questions: usize) -> Arc<DataStore> {
        Arc::new(DataStore::new(
            (1..=students).map(|i| Student {
                id: format!("s{i}").into(),
                name: format!("Student {i}"),
            }),
            (1..=questions).map(|i| Question {
                id: format!("q{i}").into(),
                text: format!("Question {i}"),
                answer: format!("Answer {i}"),
            }),
        ))
    }

    fn game(teams: usize, questions: usize) -> Game {
        let store = store(4, questions);
        let pool = QuestionPool::new(&store);
        Game::new(store, Roster::new(teams), pool)
    }

    fn scores(game: &Game) -> Vec<i64> {
        game.roster().iter().map(|team| team.score()).collect()
    }

    #[derive(Default)]
    struct MockTunnel {
        messages: RefCell<Vec<String>>,
        states: RefCell<Vec<String>>,
    }

    impl Tunnel for MockTunnel {
        fn send_message(&self, message: &UpdateMessage) {
            self.messages.borrow_mut().push(message.to_message());
        }

        fn send_state(&self, state: &SyncMessage) {
            self.states.borrow_mut().push(state.to_message());
        }
    }

    #[test]
    fn test_new_game() {
        let game = game(3, 5);

        assert_eq!(game.phase(), Phase::AwaitingQuestion);
        assert_eq!(game.active_team(), 0);
        assert_eq!(game.active_team_name(), "Team 1");
        assert_eq!(game.remaining_questions(), 5);
        assert_eq!(game.headline(), constants::status::PROMPT);
        assert!(game.final_leaderboard().is_none());
        assert_eq!(scores(&game), vec![0, 0, 0]);
    }

    #[test]
    fn test_draw_question_consumes_pool() {
        let mut game = game(2, 4);
        let mut seen = HashSet::new();

        for remaining in (0..4).rev() {
            let updates = game.draw_question();
            let question = game.current_question().unwrap().clone();

            assert!(seen.insert(question.id.clone()));
            assert_eq!(game.remaining_questions(), remaining);
            assert_eq!(game.phase(), Phase::QuestionActive);
            assert_eq!(game.headline(), question.text);
            assert_eq!(
                updates[0],
                UpdateMessage::QuestionDrawn {
                    question: question.text,
                    remaining,
                }
            );
        }

        let updates = game.draw_question();
        assert!(game.is_finished());
        assert!(game.current_question().is_none());
        assert_eq!(game.headline(), constants::status::FINISHED);
        assert!(matches!(updates.as_slice(), [UpdateMessage::Finished(_)]));

        game.draw_question();
        assert!(game.is_finished());
        assert_eq!(game.remaining_questions(), 0);
    }

    #[test]
    fn test_draw_question_hides_answer() {
        let mut game = game(2, 3);
        game.draw_question();
        game.reveal_answer();
        assert_eq!(game.phase(), Phase::AnswerRevealed);

        game.reroll_question();

        assert_eq!(game.phase(), Phase::QuestionActive);
        assert!(!game.answer_revealed());
    }

    #[test]
    fn test_reroll_is_free() {
        let mut game = game(2, 3);
        game.draw_question();
        let first = game.current_question().unwrap().id.clone();

        game.reroll_question();

        assert_ne!(game.current_question().unwrap().id, first);
        assert_eq!(game.active_team(), 0);
        assert_eq!(scores(&game), vec![0, 0]);
        assert_eq!(game.remaining_questions(), 1);
    }

    #[test]
    fn test_reveal_and_hide_answer() {
        let mut game = game(2, 2);
        assert!(game.reveal_answer().is_empty());

        game.draw_question();
        let answer = game.current_question().unwrap().answer.clone();

        assert_eq!(game.reveal_answer(), vec![UpdateMessage::AnswerShown(answer.clone())]);
        assert!(game.reveal_answer().is_empty());
        assert_eq!(game.snapshot().answer, Some(answer));

        assert_eq!(game.hide_answer(), vec![UpdateMessage::AnswerHidden]);
        assert!(game.hide_answer().is_empty());
        assert_eq!(game.snapshot().answer, None);
        assert_eq!(scores(&game), vec![0, 0]);
    }

    #[test]
    fn test_toggle_answer() {
        let mut game = game(2, 2);
        game.draw_question();

        game.toggle_answer();
        assert!(game.answer_revealed());
        game.toggle_answer();
        assert!(!game.answer_revealed());
    }

    #[test]
    fn test_mark_correct_scores_active_team_only() {
        let mut game = game(3, 10);
        game.draw_question();
        game.advance_team();
        assert_eq!(game.active_team(), 1);

        let updates = game.mark_correct();

        assert_eq!(scores(&game), vec![0, 1, 0]);
        assert_eq!(game.active_team(), 2);
        assert_eq!(game.phase(), Phase::QuestionActive);
        assert_eq!(game.remaining_questions(), 8);
        assert_eq!(
            updates[0],
            UpdateMessage::Score {
                team: "Team 2".to_owned(),
                score: 1,
            }
        );
        assert_eq!(updates[1], UpdateMessage::TurnChanged("Team 3".to_owned()));
        assert!(matches!(updates[2], UpdateMessage::QuestionDrawn { .. }));
    }

    #[test]
    fn test_mark_correct_clears_skips() {
        let mut game = game(3, 10);
        game.draw_question();
        game.skip();
        assert_eq!(game.skipped_teams(), vec!["Team 1"]);

        game.mark_correct();

        assert!(game.skipped_teams().is_empty());
        assert_eq!(scores(&game), vec![0, 1, 0]);
    }

    #[test]
    fn test_mark_correct_without_question() {
        let mut game = game(2, 2);

        assert!(game.mark_correct().is_empty());
        assert_eq!(scores(&game), vec![0, 0]);
        assert_eq!(game.active_team(), 0);
        assert_eq!(game.remaining_questions(), 2);
    }

    #[test]
    fn test_skip_keeps_question() {
        let mut game = game(3, 5);
        game.draw_question();
        let question = game.current_question().unwrap().id.clone();

        let updates = game.skip();

        assert_eq!(game.current_question().unwrap().id, question);
        assert_eq!(game.active_team(), 1);
        assert_eq!(game.remaining_questions(), 4);
        assert_eq!(
            updates,
            vec![
                UpdateMessage::TeamSkipped("Team 1".to_owned()),
                UpdateMessage::TurnChanged("Team 2".to_owned()),
            ]
        );
    }

    #[test]
    fn test_full_skip_cycle_discards_question() {
        for teams in 1..=5 {
            let mut game = game(teams, 10);
            game.draw_question();
            game.set_score("Team 1", "3");
            let before = scores(&game);
            let question = game.current_question().unwrap().id.clone();

            for _ in 0..teams - 1 {
                game.skip();
                assert_eq!(game.current_question().unwrap().id, question);
            }
            let updates = game.skip();

            assert!(updates.contains(&UpdateMessage::QuestionDiscarded));
            assert!(game.skipped_teams().is_empty());
            assert_ne!(game.current_question().unwrap().id, question);
            assert_eq!(game.remaining_questions(), 8);
            assert_eq!(scores(&game), before);
            assert_eq!(game.active_team(), 0);
        }
    }

    #[test]
    fn test_full_skip_draws_once() {
        let mut game = game(3, 10);

        // no question on the table: the last skip both wraps and completes the cycle
        game.skip();
        game.skip();
        assert_eq!(game.remaining_questions(), 10);
        let updates = game.skip();

        let draws = updates
            .iter()
            .filter(|u| matches!(u, UpdateMessage::QuestionDrawn { .. }))
            .count();
        assert_eq!(draws, 1);
        assert_eq!(game.remaining_questions(), 9);
        assert_eq!(game.phase(), Phase::QuestionActive);
    }

    #[test]
    fn test_full_skip_with_empty_pool_finishes() {
        let mut game = game(2, 1);
        game.draw_question();

        game.skip();
        let updates = game.skip();

        assert!(game.is_finished());
        assert!(game.current_question().is_none());
        assert!(matches!(updates.last(), Some(UpdateMessage::Finished(_))));
    }

    #[test]
    fn test_wrap_without_question_draws() {
        let mut game = game(3, 5);

        assert!(game.advance_team().len() == 1);
        assert!(game.advance_team().len() == 1);
        assert_eq!(game.remaining_questions(), 5);

        let updates = game.advance_team();

        assert_eq!(game.active_team(), 0);
        assert_eq!(game.remaining_questions(), 4);
        assert_eq!(game.phase(), Phase::QuestionActive);
        assert!(matches!(updates[1], UpdateMessage::QuestionDrawn { .. }));
    }

    #[test]
    fn test_wrap_with_question_keeps_it() {
        let mut game = game(2, 5);
        game.draw_question();
        let question = game.current_question().unwrap().id.clone();

        game.advance_team();
        game.advance_team();

        assert_eq!(game.active_team(), 0);
        assert_eq!(game.current_question().unwrap().id, question);
        assert_eq!(game.remaining_questions(), 4);
    }

    #[test]
    fn test_three_teams_two_questions_scenario() {
        let mut game = game(3, 2);

        game.draw_question();
        let a = game.current_question().unwrap().id.clone();
        assert_eq!(game.active_team_name(), "Team 1");

        game.skip();
        assert_eq!(game.active_team_name(), "Team 2");
        assert_eq!(game.skipped_teams(), vec!["Team 1"]);

        game.skip();
        assert_eq!(game.active_team_name(), "Team 3");
        assert_eq!(game.skipped_teams(), vec!["Team 1", "Team 2"]);

        game.skip();
        let b = game.current_question().unwrap().id.clone();
        assert_ne!(a, b);
        assert!(game.skipped_teams().is_empty());
        assert_eq!(game.active_team_name(), "Team 1");
        assert_eq!(game.remaining_questions(), 0);

        let updates = game.mark_correct();
        assert_eq!(scores(&game), vec![1, 0, 0]);
        assert_eq!(game.active_team_name(), "Team 2");
        assert!(game.is_finished());

        let board = game.final_leaderboard().unwrap();
        assert_eq!(board.score("Team 1"), Some(1));
        assert_eq!(
            updates.last(),
            Some(&UpdateMessage::Finished(board.clone()))
        );
    }

    #[test]
    fn test_random_student_from_active_team() {
        let store = store(4, 3);
        let pool = QuestionPool::new(&store);
        let mut roster = Roster::new(2);
        roster.assign_student("s1".into(), "Team 1");
        roster.assign_student("s2".into(), "Team 1");
        roster.assign_student("s3".into(), "Team 2");
        let game = Game::new(store, roster, pool);

        let allowed: BTreeSet<&str> = ["s1", "s2"].into_iter().collect();
        let mut seen = BTreeSet::new();
        for _ in 0..200 {
            let student = game.random_student().unwrap();
            assert!(allowed.contains(student.id.as_str()));
            seen.insert(student.id.as_str().to_owned());
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_random_student_empty_team() {
        let mut game = game(2, 3);

        assert!(game.random_student().is_none());
        assert_eq!(game.draw_student(), vec![UpdateMessage::StudentDrawn(None)]);
        assert!(game.current_student().is_none());
        assert_eq!(game.phase(), Phase::AwaitingQuestion);
    }

    #[test]
    fn test_draw_question_calls_student() {
        let store = store(2, 3);
        let pool = QuestionPool::new(&store);
        let mut roster = Roster::new(2);
        roster.assign_student("s1".into(), "Team 1");
        roster.assign_student("s2".into(), "Team 2");
        let mut game = Game::new(store, roster, pool);

        game.draw_question();
        assert_eq!(game.current_student().unwrap().name, "Student 1");

        game.skip();
        assert!(game.current_student().is_none());

        game.reroll_question();
        assert!(game.current_student().is_none());

        game.draw_student();
        assert_eq!(game.current_student().unwrap().name, "Student 2");
    }

    #[test]
    fn test_set_score() {
        let mut game = game(2, 2);

        assert!(game.set_score("Team 2", "abc").is_empty());
        assert_eq!(scores(&game), vec![0, 0]);

        assert_eq!(
            game.set_score("Team 2", "7"),
            vec![UpdateMessage::Score {
                team: "Team 2".to_owned(),
                score: 7,
            }]
        );
        assert_eq!(scores(&game), vec![0, 7]);

        assert!(game.set_score("Team 2", "abc").is_empty());
        assert_eq!(scores(&game), vec![0, 7]);
    }

    #[test]
    fn test_end_quiz() {
        let mut game = game(2, 5);
        game.draw_question();
        game.mark_correct();

        let updates = game.end_quiz();

        assert!(game.is_finished());
        assert_eq!(game.remaining_questions(), 3);
        let board = game.final_leaderboard().unwrap();
        assert_eq!(board.to_string(), "Leaderboard:\nTeam 1: 1\nTeam 2: 0\n");
        assert_eq!(updates, vec![UpdateMessage::Finished(board.clone())]);
    }

    #[test]
    fn test_end_quiz_is_terminal() {
        let mut game = game(2, 3);
        game.end_quiz();

        let updates = game.draw_question();

        assert!(game.is_finished());
        assert!(game.current_question().is_none());
        assert_eq!(game.remaining_questions(), 3);
        assert!(game.final_leaderboard().is_some());
        assert_eq!(game.headline(), constants::status::FINISHED);
        assert!(matches!(updates.as_slice(), [UpdateMessage::Finished(_)]));

        game.skip();
        game.advance_team();
        assert!(game.is_finished());
        assert_eq!(game.remaining_questions(), 3);
    }

    #[test]
    fn test_full_skip_without_question_discards_nothing() {
        let mut game = game(2, 5);

        game.skip();
        let updates = game.skip();

        assert!(!updates.contains(&UpdateMessage::QuestionDiscarded));
        assert_eq!(game.remaining_questions(), 4);
        assert_eq!(game.headline(), game.current_question().unwrap().text);
    }

    #[test]
    fn test_full_skip_after_finish_discards_nothing() {
        let mut game = game(2, 1);
        game.draw_question();
        game.skip();
        game.skip();
        assert!(game.is_finished());

        game.skip();
        let updates = game.skip();

        assert!(!updates.contains(&UpdateMessage::QuestionDiscarded));
        assert!(matches!(updates.last(), Some(UpdateMessage::Finished(_))));
        assert_eq!(game.headline(), constants::status::FINISHED);
    }

    #[test]
    fn test_snapshot() {
        let store = store(1, 2);
        let pool = QuestionPool::new(&store);
        let mut roster = Roster::new(2);
        roster.assign_student("s1".into(), "Team 1");
        let mut game = Game::new(store, roster, pool);

        let snapshot = game.snapshot();
        assert_eq!(snapshot.phase, Phase::AwaitingQuestion);
        assert_eq!(snapshot.headline, constants::status::PROMPT);
        assert_eq!(snapshot.question, None);
        assert_eq!(snapshot.remaining_questions, 2);

        game.draw_question();
        game.reveal_answer();
        let snapshot = game.snapshot();
        let question = game.current_question().unwrap();
        assert_eq!(snapshot.phase, Phase::AnswerRevealed);
        assert_eq!(snapshot.team, "Team 1");
        assert_eq!(snapshot.question.as_deref(), Some(question.text.as_str()));
        assert_eq!(snapshot.answer.as_deref(), Some(question.answer.as_str()));
        assert_eq!(snapshot.student.as_deref(), Some("Student 1"));
    }

    #[test]
    fn test_snapshot_json_skips_none() {
        let game = game(2, 2);
        let json = game.snapshot().to_message();

        assert!(json.contains(r#""phase":"AwaitingQuestion""#));
        assert!(!json.contains("answer"));
        assert!(!json.contains("student"));
    }

    #[test]
    fn test_announce() {
        let mut game = game(2, 2);
        let tunnel = MockTunnel::default();

        let updates = game.draw_question();
        game.announce(&updates, &tunnel);

        assert_eq!(tunnel.messages.borrow().len(), updates.len());
        assert!(tunnel.messages.borrow()[0].contains("QuestionDrawn"));
        assert_eq!(tunnel.states.borrow().len(), 1);
        assert!(tunnel.states.borrow()[0].contains("QuestionActive"));
    }

    #[test]
    fn test_reset_keeps_consumed_questions() {
        let mut game = game(3, 4).with_default_team_count(2);
        game.draw_question();
        game.mark_correct();
        assert_eq!(game.remaining_questions(), 2);

        let mut setup = game.reset();
        assert_eq!(setup.team_count(), 2);
        setup.submit_team_count(3).unwrap();
        setup.confirm_assignments().unwrap();
        let game = setup.start().unwrap();

        assert_eq!(game.remaining_questions(), 2);
        assert_eq!(scores(&game), vec![0, 0, 0]);
        assert_eq!(game.phase(), Phase::AwaitingQuestion);
    }
}
