//! Presentation layer boundary
//!
//! The session controller never draws anything itself. A presentation layer
//! (a window, a terminal, a web page) implements [`Tunnel`] and receives the
//! notifications the controller produces after each operation.

use crate::game::{SyncMessage, UpdateMessage};

/// Trait for delivering controller output to a presentation layer
pub trait Tunnel {
    /// Delivers a single change notification
    ///
    /// # Arguments
    ///
    /// * `message` - The update message to deliver
    fn send_message(&self, message: &UpdateMessage);

    /// Delivers a full snapshot of the play view
    ///
    /// Sent after the updates of each operation so the presentation layer
    /// can redraw from scratch instead of applying updates.
    ///
    /// # Arguments
    ///
    /// * `state` - The snapshot to deliver
    fn send_state(&self, state: &SyncMessage);
}
