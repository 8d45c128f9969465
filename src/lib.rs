//! # Team Quiz Library
//!
//! This library provides the core logic of a classroom quiz game: students
//! are split into teams, teams take turns answering questions drawn at
//! random from a question bank, and a leaderboard tracks team scores.
//!
//! The flow is:
//!
//! 1. load a [`data::DataStore`] once at startup,
//! 2. drive a [`setup::Setup`] through team count and team assignments,
//! 3. play with the [`game::Game`] controller, forwarding its
//!    [`game::UpdateMessage`]s and [`game::SyncMessage`] snapshots to a
//!    presentation layer through a [`session::Tunnel`].

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::struct_field_names)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod constants;
pub mod data;
pub mod game;
pub mod leaderboard;
pub mod pool;
pub mod session;
pub mod setup;
pub mod teams;
pub mod turn;

pub use game::{Game, SyncMessage, UpdateMessage};
pub use setup::Setup;
