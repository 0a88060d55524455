//! Notification, error, retry and audit events
//!
//! The four operations are one algorithm: aggregate the attribute set with
//! the kind's default message, then dispatch to the kind's flow.

use crate::{EventKind, operations::Eframework, transaction::Transaction};

impl Eframework {
    /// Emit a notification event to `notificationFlow`
    pub fn emit_notification(&self, transaction: Transaction) {
        self.emit(EventKind::Notification, transaction);
    }

    /// Emit an error event to `errorTransactionFlow`
    pub fn emit_error(&self, transaction: Transaction) {
        self.emit(EventKind::Error, transaction);
    }

    /// Emit a retry event to `retryTransactionFlow`
    pub fn emit_retry(&self, transaction: Transaction) {
        self.emit(EventKind::Retry, transaction);
    }

    /// Emit an audit event to `auditLogFlow`
    pub fn emit_audit(&self, transaction: Transaction) {
        self.emit(EventKind::Audit, transaction);
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::RecordingHandler;
    use crate::{AttributeSet, Eframework, MemoryRegistry, Transaction, flows};
    use serde_json::Value;
    use std::sync::Arc;

    fn setup(flow: &str) -> (Eframework, RecordingHandler) {
        let registry = Arc::new(MemoryRegistry::new());
        let recorder = RecordingHandler::new();
        registry.register(flow, Arc::new(recorder.clone()));
        let ef = Eframework::builder("shop").registry(registry).build().unwrap();
        (ef, recorder)
    }

    #[test]
    fn test_audit_end_to_end() {
        let (ef, recorder) = setup(flows::AUDIT);

        ef.emit_audit(Transaction::new("ORDER_CREATE", "SUCCESS").attribute("orderId", "42"));

        let envelopes = recorder.envelopes();
        assert_eq!(envelopes.len(), 1);

        let expected: AttributeSet = [
            ("applicationId", "shop"),
            ("orderId", "42"),
            (
                "transactionMsg",
                "AUDIT:  {\"applicationId\":\"shop\",\"orderId\":\"42\",\
                 \"transactionStatus\":\"SUCCESS\",\"transactionType\":\"ORDER_CREATE\"}",
            ),
            ("transactionStatus", "SUCCESS"),
            ("transactionType", "ORDER_CREATE"),
        ]
        .into_iter()
        .collect();
        assert_eq!(envelopes[0].attributes, expected);
        assert_eq!(
            envelopes[0].attributes.keys().collect::<Vec<_>>(),
            vec![
                "applicationId",
                "orderId",
                "transactionMsg",
                "transactionStatus",
                "transactionType"
            ]
        );
        assert_eq!(envelopes[0].content, Value::Null);
    }

    #[test]
    fn test_each_kind_uses_its_flow_and_prefix() {
        let cases: [(&str, &str, fn(&Eframework, Transaction)); 4] = [
            (flows::NOTIFICATION, "NOTIFICATION: ", Eframework::emit_notification),
            (flows::ERROR, "ERROR: ", Eframework::emit_error),
            (flows::RETRY, "RETRY: ", Eframework::emit_retry),
            (flows::AUDIT, "AUDIT: ", Eframework::emit_audit),
        ];

        for (flow, prefix, op) in cases {
            let (ef, recorder) = setup(flow);
            op(&ef, Transaction::new("ORDER_CREATE", "FAILURE"));

            let envelopes = recorder.envelopes();
            assert_eq!(envelopes.len(), 1, "{flow} should receive one event");
            let msg = envelopes[0].transaction_msg().unwrap_or_default();
            assert!(msg.starts_with(&format!("{prefix} {{")), "{msg}");
        }
    }

    #[test]
    fn test_emit_error_carries_content_and_custom_message() {
        let (ef, recorder) = setup(flows::ERROR);

        ef.emit_error(
            Transaction::new("ORDER_CREATE", "FAILURE")
                .message("ERROR: validation failed")
                .content(serde_json::json!({"orderId": 42})),
        );

        let envelopes = recorder.envelopes();
        let envelope = &envelopes[0];
        assert_eq!(envelope.content, serde_json::json!({"orderId": 42}));
        assert!(
            envelope
                .transaction_msg()
                .unwrap_or_default()
                .starts_with("ERROR: validation failed {")
        );
    }

    #[test]
    fn test_emit_to_unregistered_flow_returns_normally() {
        let (ef, recorder) = setup(flows::AUDIT);
        ef.emit_retry(Transaction::new("ORDER_CREATE", "RETRY"));
        assert_eq!(recorder.count(), 0);
    }

    #[test]
    fn test_failing_handler_does_not_reach_caller() {
        let registry = Arc::new(MemoryRegistry::new());
        registry.register_fn(flows::NOTIFICATION, |_| Err("sink offline".into()));
        let ef = Eframework::builder("shop").registry(registry).build().unwrap();

        ef.emit_notification(Transaction::new("ORDER_CREATE", "SUCCESS"));
    }
}
