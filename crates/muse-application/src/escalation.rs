//! Escalation notifiers.
//!
//! Negative feedback raises an `Escalation`; the host decides who reviews it.
//! Both notifiers here return immediately so the feedback path never waits
//! on a reviewer.

use muse_core::feedback::{Escalation, EscalationNotifier};
use muse_core::{MuseError, Result};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Pushes escalations onto an unbounded queue drained by the host.
#[derive(Clone)]
pub struct QueuedEscalationNotifier {
    sender: UnboundedSender<Escalation>,
}

impl QueuedEscalationNotifier {
    /// Creates the notifier together with the receiving end of its queue.
    pub fn channel() -> (Self, UnboundedReceiver<Escalation>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl EscalationNotifier for QueuedEscalationNotifier {
    fn notify(&self, escalation: Escalation) -> Result<()> {
        tracing::warn!(
            feedback_id = %escalation.feedback_id,
            persona_id = %escalation.persona_id,
            rating = escalation.rating_value,
            reason = ?escalation.reason,
            "Queued feedback for urgent review"
        );
        self.sender
            .send(escalation)
            .map_err(|_| MuseError::internal("escalation queue receiver was dropped"))
    }
}

/// Only logs escalations; the default when the host wires nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingEscalationNotifier;

impl EscalationNotifier for LoggingEscalationNotifier {
    fn notify(&self, escalation: Escalation) -> Result<()> {
        tracing::warn!(
            feedback_id = %escalation.feedback_id,
            persona_id = %escalation.persona_id,
            question_id = ?escalation.question_id,
            rating = escalation.rating_value,
            helpful = escalation.helpful,
            reason = ?escalation.reason,
            comment = ?escalation.comment,
            "Feedback needs urgent review"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use muse_core::feedback::{EscalationReason, FeedbackRecord};

    fn escalation() -> Escalation {
        let now = Utc::now();
        let record = FeedbackRecord::new("f1", "p1", 1, false, now);
        Escalation::from_feedback(&record, now).unwrap()
    }

    #[test]
    fn test_queue_delivers_escalations() {
        let (notifier, mut receiver) = QueuedEscalationNotifier::channel();
        notifier.notify(escalation()).unwrap();

        let received = receiver.try_recv().unwrap();
        assert_eq!(received.feedback_id, "f1");
        assert_eq!(received.reason, EscalationReason::LowRatingAndNotHelpful);
    }

    #[test]
    fn test_dropped_receiver_is_an_error() {
        let (notifier, receiver) = QueuedEscalationNotifier::channel();
        drop(receiver);
        assert!(notifier.notify(escalation()).is_err());
    }

    #[test]
    fn test_logging_notifier_never_fails() {
        assert!(LoggingEscalationNotifier.notify(escalation()).is_ok());
    }
}
