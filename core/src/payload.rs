//! Request and response payload logs

use crate::{EventKind, operations::Eframework, transaction::Transaction};

impl Eframework {
    /// Log an inbound payload to `requestPayloadLogFlow`, tagged `payloadType=REQUEST`
    pub fn log_request_payload(&self, transaction: Transaction) {
        self.emit(EventKind::RequestPayload, transaction);
    }

    /// Log an outbound payload to `responsePayloadLogFlow`, tagged `payloadType=RESPONSE`
    pub fn log_response_payload(&self, transaction: Transaction) {
        self.emit(EventKind::ResponsePayload, transaction);
    }
}
