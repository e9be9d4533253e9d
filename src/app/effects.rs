use tracing::debug;

use crate::app::{App, Message, Model};

impl App {
    /// Perform the side effects a message implies after `update` ran.
    pub(super) fn handle_message_side_effects(&mut self, model: &mut Model, msg: &Message) {
        match msg {
            Message::Submit => {
                if let Some(context) = model.outbound.take() {
                    let id = self.worker.submit(context);
                    debug!(?id, model = self.worker.model_name(), "request dispatched");
                    model.in_flight = Some(id);
                }
            }
            Message::ClearHistory => {
                // A request still running is left to finish; its reply no
                // longer matches `in_flight` and is dropped.
                model.outbound = None;
            }
            _ => {}
        }
    }

    /// Feed finished requests back into the model.
    ///
    /// Returns whether anything arrived.
    pub(super) fn drain_replies(&self, model: &mut Model) -> bool {
        let mut received = false;
        while let Some(reply) = self.worker.try_recv() {
            debug!(
                id = ?reply.id,
                elapsed_ms = reply.elapsed.as_millis(),
                ok = reply.result.is_ok(),
                "reply received"
            );
            *model = super::update(
                std::mem::take(model),
                Message::ReplyReceived(reply.id, reply.result),
            );
            received = true;
        }
        received
    }
}
