//! Student and question data
//!
//! This module defines the two static collections a quiz session is played
//! with: the class list and the question bank. Both are loaded once at
//! startup into an immutable [`DataStore`] that the setup flow and the
//! session controller share for the lifetime of the process.

use std::{
    collections::BTreeMap,
    fmt::Display,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a student as it appears in the student file
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct StudentId(String);

impl StudentId {
    /// Returns the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StudentId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Identifier of a question as it appears in the question file
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    /// Returns the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for QuestionId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// A student who can be assigned to a team and called on to answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Identity of the student
    pub id: StudentId,
    /// Name shown when the student is drawn
    pub name: String,
}

/// A question together with its expected answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Identity of the question
    pub id: QuestionId,
    /// Question text read out to the class
    pub text: String,
    /// Answer revealed on demand
    pub answer: String,
}

/// On-disk shape of a question entry: `{"question": ..., "answer": ...}`
#[derive(Deserialize)]
struct QuestionRecord {
    question: String,
    answer: String,
}

/// Errors that can occur while loading the data files
#[derive(Error, Debug)]
pub enum Error {
    /// A data file could not be read
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// The file that failed to open
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },
    /// A data file is not in the expected JSON shape
    #[error("cannot parse {what}: {source}")]
    Parse {
        /// Which collection was being parsed
        what: &'static str,
        /// The underlying JSON error
        source: serde_json::Error,
    },
}

/// Immutable store of every student and every question known to the process
///
/// Questions are never removed from the store itself; the shrinking set of
/// questions still available in a session lives in
/// [`QuestionPool`](crate::pool::QuestionPool).
#[derive(Debug, Clone, Default)]
pub struct DataStore {
    students: BTreeMap<StudentId, Student>,
    questions: BTreeMap<QuestionId, Question>,
}

impl DataStore {
    /// Creates a store from already-built students and questions
    ///
    /// Later entries replace earlier ones that share an id.
    pub fn new<S, Q>(students: S, questions: Q) -> Self
    where
        S: IntoIterator<Item = Student>,
        Q: IntoIterator<Item = Question>,
    {
        Self {
            students: students
                .into_iter()
                .map(|student| (student.id.clone(), student))
                .collect(),
            questions: questions
                .into_iter()
                .map(|question| (question.id.clone(), question))
                .collect(),
        }
    }

    /// Parses the two JSON documents into a store
    ///
    /// The student document maps ids to display names, the question document
    /// maps ids to `{"question": ..., "answer": ...}` objects.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if either document does not have that shape.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use team_quiz::data::DataStore;
    ///
    /// let store = DataStore::from_json(
    ///     r#"{"s1": "Ada", "s2": "Grace"}"#,
    ///     r#"{"q1": {"question": "2 + 2?", "answer": "4"}}"#,
    /// )
    /// .unwrap();
    /// assert_eq!(store.student_count(), 2);
    /// assert_eq!(store.question_count(), 1);
    /// ```
    pub fn from_json(students: &str, questions: &str) -> Result<Self, Error> {
        let students: BTreeMap<String, String> =
            serde_json::from_str(students).map_err(|source| Error::Parse {
                what: "students",
                source,
            })?;
        let questions: BTreeMap<String, QuestionRecord> =
            serde_json::from_str(questions).map_err(|source| Error::Parse {
                what: "questions",
                source,
            })?;

        Ok(Self::new(
            students.into_iter().map(|(id, name)| Student {
                id: id.into(),
                name,
            }),
            questions
                .into_iter()
                .map(|(id, QuestionRecord { question, answer })| Question {
                    id: id.into(),
                    text: question,
                    answer,
                }),
        ))
    }

    /// Reads and parses the student and question files
    ///
    /// # Errors
    ///
    /// Returns [`Error::Read`] if a file cannot be read and [`Error::Parse`]
    /// if its contents are not valid.
    pub fn load(students_path: &Path, questions_path: &Path) -> Result<Self, Error> {
        let students = read(students_path)?;
        let questions = read(questions_path)?;
        let store = Self::from_json(&students, &questions)?;

        tracing::info!(
            students = store.student_count(),
            questions = store.question_count(),
            "loaded quiz data"
        );

        Ok(store)
    }

    /// Looks up a student by id
    pub fn student(&self, id: &StudentId) -> Option<&Student> {
        self.students.get(id)
    }

    /// Iterates over all students in id order
    pub fn students(&self) -> impl ExactSizeIterator<Item = &Student> {
        self.students.values()
    }

    /// Iterates over all questions in id order
    pub fn questions(&self) -> impl ExactSizeIterator<Item = &Question> {
        self.questions.values()
    }

    /// Number of students in the class list
    pub fn student_count(&self) -> usize {
        self.students.len()
    }

    /// Number of questions in the bank
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }
}

fn read(path: &Path) -> Result<String, Error> {
    fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_owned(),
        source,
    })
}

impl Display for Student {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
