//! # Rollback Flows
//!
//! Every way a gate can end without committing, checked against the
//! snapshot taken when it opened and against the bus.
//!
//! ## Cases:
//!
//! 1. **Cancel / dismiss**: restore the snapshot, no credit
//! 2. **Cancel handle during a capture**: the in-flight result is discarded
//! 3. **Attempt exhaustion**: gate closes, a new request starts clean
//! 4. **Timeout sweep**: a gate left open is rolled back
//! 5. **Resume**: a session starting from a prior status

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use pr_01_shipment_lifecycle::{
        CancelCause, LifecycleConfig, PickerError, RollbackReason, ShipmentLifecycleApi,
        TransitionOutcome, TransitionReport, VerifyOutcome,
    };
    use pr_02_earnings_ledger::EarningsApi;
    use shared_bus::ShipmentEvent;
    use shared_types::confirmation::ConfirmationAction;
    use shared_types::entities::{AssetUri, Credits, MediaSource, Milestone, ShipmentStatus};
    use tokio::time::timeout;

    use crate::integration::fixtures::{drain, labels, FixedPicker, Harness, HeldPicker, DELIVERY_CODE};

    fn status(picked_up: bool, in_transit: bool, delivered: bool) -> ShipmentStatus {
        ShipmentStatus::from_flags(picked_up, in_transit, delivered).unwrap()
    }

    fn rolled_back(report: TransitionReport) -> pr_01_shipment_lifecycle::RollbackReport {
        match report {
            TransitionReport::RolledBack(report) => report,
            other => panic!("expected rollback, got {other:?}"),
        }
    }

    // =========================================================================
    // SNAPSHOT RESTORE
    // =========================================================================

    #[tokio::test]
    async fn test_cancelled_media_restores_exact_snapshot() {
        let h = Harness::builder()
            .picker(Arc::new(FixedPicker(Err(PickerError::Cancelled))))
            .build();
        let mut sub = h.subscribe();
        let before = h.lifecycle.status();

        h.lifecycle
            .request_transition(Milestone::PickedUp)
            .await
            .unwrap();
        let report = rolled_back(h.lifecycle.capture_media(MediaSource::Library).await.unwrap());

        assert_eq!(report.restored, before);
        assert_eq!(h.lifecycle.status(), before);
        assert!(h.lifecycle.pending().is_none());
        assert_eq!(h.earnings.total(&h.shipment), Credits::ZERO);
        assert_eq!(
            labels(&drain(&mut sub)),
            vec!["requested:PICKED_UP", "rolled_back:PICKED_UP"]
        );
    }

    #[tokio::test]
    async fn test_device_failure_rolls_back_with_reason() {
        let h = Harness::builder()
            .picker(Arc::new(FixedPicker(Err(PickerError::Device(
                "camera busy".to_string(),
            )))))
            .build();
        let mut sub = h.subscribe();

        h.lifecycle
            .request_transition(Milestone::PickedUp)
            .await
            .unwrap();
        let report = rolled_back(h.lifecycle.capture_media(MediaSource::Camera).await.unwrap());

        assert!(matches!(report.reason, RollbackReason::GateFailed(_)));
        let events = drain(&mut sub);
        let Some(ShipmentEvent::TransitionRolledBack { reason, .. }) = events.last() else {
            panic!("expected a rollback event, got {events:?}");
        };
        assert!(reason.contains("camera busy"), "reason was {reason:?}");
    }

    #[tokio::test]
    async fn test_empty_uri_is_not_evidence() {
        let h = Harness::builder()
            .picker(Arc::new(FixedPicker(Ok(AssetUri::new("  ")))))
            .build();

        h.lifecycle
            .request_transition(Milestone::PickedUp)
            .await
            .unwrap();
        let report = h.lifecycle.capture_media(MediaSource::Camera).await.unwrap();

        assert!(matches!(report, TransitionReport::RolledBack(_)));
        assert_eq!(h.lifecycle.status(), ShipmentStatus::initial());
    }

    #[tokio::test]
    async fn test_dismissed_confirmation_keeps_pickup() {
        let h = Harness::builder().status(status(true, false, false)).build();

        h.lifecycle
            .request_transition(Milestone::InTransit)
            .await
            .unwrap();
        let report = rolled_back(
            h.lifecycle
                .respond(ConfirmationAction::Dismiss)
                .await
                .unwrap(),
        );

        assert_eq!(report.reason, RollbackReason::Dismissed);
        assert_eq!(h.lifecycle.status(), status(true, false, false));

        // The same milestone can be requested again right away
        h.lifecycle
            .request_transition(Milestone::InTransit)
            .await
            .unwrap();
        h.lifecycle
            .respond(ConfirmationAction::Confirm)
            .await
            .unwrap();
        assert_eq!(h.lifecycle.status(), status(true, true, false));
        assert_eq!(h.earnings.total(&h.shipment), Credits(15));
    }

    // =========================================================================
    // CANCELLATION DURING A CAPTURE
    // =========================================================================

    #[tokio::test]
    async fn test_canceller_discards_in_flight_capture() {
        let (picker, release) = HeldPicker::new();
        let h = Harness::builder().picker(picker.clone()).build();
        let canceller = h.lifecycle.canceller();

        h.lifecycle
            .request_transition(Milestone::PickedUp)
            .await
            .unwrap();

        let lifecycle = h.lifecycle.clone();
        let capture =
            tokio::spawn(async move { lifecycle.capture_media(MediaSource::Camera).await });
        picker.wait_started().await;

        canceller.cancel();
        let report = timeout(Duration::from_secs(1), capture)
            .await
            .expect("capture should end once cancelled")
            .unwrap()
            .unwrap();

        // The picker answering late changes nothing
        let _ = release.send(Ok(AssetUri::new("file:///late.jpg")));

        let report = rolled_back(report);
        assert_eq!(report.reason, RollbackReason::Cancelled);
        assert_eq!(h.lifecycle.status(), ShipmentStatus::initial());
        assert_eq!(h.earnings.total(&h.shipment), Credits::ZERO);
    }

    #[tokio::test]
    async fn test_navigating_away_during_capture() {
        let (picker, _release) = HeldPicker::new();
        let h = Harness::builder().picker(picker.clone()).build();

        h.lifecycle
            .request_transition(Milestone::PickedUp)
            .await
            .unwrap();

        let lifecycle = h.lifecycle.clone();
        let capture =
            tokio::spawn(async move { lifecycle.capture_media(MediaSource::Camera).await });
        picker.wait_started().await;

        let cancelled = h
            .lifecycle
            .cancel_pending(CancelCause::NavigatedAway)
            .await
            .unwrap()
            .expect("a gate was open");
        assert_eq!(cancelled.reason, RollbackReason::NavigatedAway);

        // The capture task sees the gate already settled
        let late = timeout(Duration::from_secs(1), capture)
            .await
            .expect("capture should end")
            .unwrap()
            .unwrap();
        assert_eq!(rolled_back(late).transition_id, cancelled.transition_id);

        let history = h.lifecycle.history();
        assert_eq!(history.len(), 1, "one attempt, one record");
        assert_eq!(
            history[0].outcome,
            TransitionOutcome::RolledBack(RollbackReason::NavigatedAway)
        );
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let h = Harness::builder().build();
        let mut sub = h.subscribe();

        h.lifecycle
            .request_transition(Milestone::PickedUp)
            .await
            .unwrap();
        let first = h.lifecycle.cancel_pending(CancelCause::Explicit).await.unwrap();
        let second = h.lifecycle.cancel_pending(CancelCause::Explicit).await.unwrap();

        assert!(first.is_some());
        assert!(second.is_none());
        let rollbacks = drain(&mut sub)
            .into_iter()
            .filter(|event| matches!(event, ShipmentEvent::TransitionRolledBack { .. }))
            .count();
        assert_eq!(rollbacks, 1);
    }

    // =========================================================================
    // CODE GATE
    // =========================================================================

    #[tokio::test]
    async fn test_exhaustion_closes_gate_and_restart_succeeds() {
        let config = LifecycleConfig {
            max_code_attempts: Some(2),
            ..Default::default()
        };
        let h = Harness::builder()
            .config(config)
            .status(status(true, true, false))
            .build();

        h.lifecycle
            .request_transition(Milestone::Delivered)
            .await
            .unwrap();
        let first = h.lifecycle.enter_code("0001").await.unwrap();
        assert_eq!(first, VerifyOutcome::Mismatch { remaining: Some(1) });

        let second = h.lifecycle.enter_code("0002").await.unwrap();
        let VerifyOutcome::Resolved(report) = second else {
            panic!("expected the gate to close, got {second:?}");
        };
        assert_eq!(rolled_back(report).reason, RollbackReason::AttemptsExhausted);
        assert_eq!(h.lifecycle.status(), status(true, true, false));

        // A fresh request gets a fresh counter
        h.lifecycle
            .request_transition(Milestone::Delivered)
            .await
            .unwrap();
        let retry = h.lifecycle.enter_code(DELIVERY_CODE).await.unwrap();
        assert!(matches!(
            retry,
            VerifyOutcome::Resolved(TransitionReport::Committed(_))
        ));
        assert!(h.lifecycle.is_terminal());
    }

    #[tokio::test]
    async fn test_verifier_outage_keeps_gate_and_attempts() {
        let h = Harness::builder().status(status(true, true, false)).build();

        h.lifecycle
            .request_transition(Milestone::Delivered)
            .await
            .unwrap();
        h.verifier.set_offline(true);
        let outage = h.lifecycle.enter_code(DELIVERY_CODE).await.unwrap();
        assert!(matches!(outage, VerifyOutcome::Unavailable { .. }));
        assert!(h.lifecycle.pending().is_some());

        h.verifier.set_offline(false);
        let wrong = h.lifecycle.enter_code("9999").await.unwrap();
        assert_eq!(wrong, VerifyOutcome::Mismatch { remaining: Some(4) });

        h.lifecycle.enter_code(DELIVERY_CODE).await.unwrap();
        assert_eq!(h.lifecycle.status(), status(true, true, true));
    }

    #[tokio::test]
    async fn test_verify_button_after_auto_submit() {
        let h = Harness::builder().status(status(true, true, false)).build();

        h.lifecycle
            .request_transition(Milestone::Delivered)
            .await
            .unwrap();
        h.lifecycle.enter_code(DELIVERY_CODE).await.unwrap();
        let again = h.lifecycle.verify_code().await.unwrap();

        assert_eq!(again, VerifyOutcome::AlreadyCommitted);
        assert_eq!(h.earnings.total(&h.shipment), Credits(25));
    }

    // =========================================================================
    // TIMEOUTS
    // =========================================================================

    #[tokio::test]
    async fn test_timeout_sweep_rolls_back_stale_gate() {
        let config = LifecycleConfig {
            pending_timeout_ms: Some(30_000),
            ..Default::default()
        };
        let h = Harness::builder()
            .config(config)
            .status(status(true, false, false))
            .build();

        h.lifecycle
            .request_transition(Milestone::InTransit)
            .await
            .unwrap();

        h.time.advance(29_999);
        assert!(h.lifecycle.cleanup_timeouts().await.is_none());

        h.time.advance(1);
        let report = h.lifecycle.cleanup_timeouts().await.expect("gate timed out");
        assert_eq!(report.reason, RollbackReason::TimedOut);
        assert_eq!(h.lifecycle.status(), status(true, false, false));

        // The stale prompt can no longer commit
        assert!(h
            .lifecycle
            .respond(ConfirmationAction::Confirm)
            .await
            .is_err());
    }

    // =========================================================================
    // RESUME
    // =========================================================================

    #[tokio::test]
    async fn test_resumed_session_continues_from_prior_status() {
        let h = Harness::builder().status(status(true, true, false)).build();

        assert!(h.lifecycle.history().is_empty());
        h.lifecycle
            .request_transition(Milestone::Delivered)
            .await
            .unwrap();
        h.lifecycle.enter_code(DELIVERY_CODE).await.unwrap();

        // Only the milestone reached in this session is credited
        assert_eq!(h.earnings.total(&h.shipment), Credits(25));
        assert_eq!(h.lifecycle.history().len(), 1);
    }
}
