//! # Delivery Flows
//!
//! Drives a shipment from a fresh status to delivered through both
//! subsystems and checks the statuses, the credits and the events on the
//! bus.
//!
//! ## Flow Tested:
//!
//! ```text
//! request PickedUp  → media gate  → commit → +10
//! request InTransit → confirm     → commit → +15
//! request Delivered → code 4821   → commit → +25 → terminal
//! ```

#[cfg(test)]
mod tests {
    use pr_01_shipment_lifecycle::{
        CancelCause, GatePrompt, LifecycleError, RequestOutcome, ShipmentLifecycleApi,
        TransitionError, TransitionReport, VerifyOutcome,
    };
    use pr_02_earnings_ledger::{AwardResult, EarningsApi};
    use shared_bus::ShipmentEvent;
    use shared_types::confirmation::ConfirmationAction;
    use shared_types::entities::{CreditMilestone, Credits, MediaSource, Milestone, ShipmentStatus};

    use crate::integration::fixtures::{drain, labels, Harness, DELIVERY_CODE};

    fn status(picked_up: bool, in_transit: bool, delivered: bool) -> ShipmentStatus {
        ShipmentStatus::from_flags(picked_up, in_transit, delivered).unwrap()
    }

    async fn pick_up(h: &Harness) -> TransitionReport {
        h.lifecycle
            .request_transition(Milestone::PickedUp)
            .await
            .unwrap();
        h.lifecycle.capture_media(MediaSource::Camera).await.unwrap()
    }

    async fn go_in_transit(h: &Harness) -> TransitionReport {
        h.lifecycle
            .request_transition(Milestone::InTransit)
            .await
            .unwrap();
        h.lifecycle
            .respond(ConfirmationAction::Confirm)
            .await
            .unwrap()
    }

    // =========================================================================
    // SCENARIOS
    // =========================================================================

    #[tokio::test]
    async fn test_pickup_with_uri_commits_and_credits() {
        let h = Harness::builder().build();

        let report = pick_up(&h).await;

        let TransitionReport::Committed(report) = report else {
            panic!("expected commit, got {report:?}");
        };
        assert_eq!(report.status, status(true, false, false));
        assert_eq!(report.credit, Some(Credits(10)));
        assert_eq!(
            report.evidence.as_ref().map(|uri| uri.as_str()),
            Some("file:///media/parcel.jpg")
        );
        assert_eq!(h.earnings.total(&h.shipment), Credits(10));
    }

    #[tokio::test]
    async fn test_transit_confirm_commits_and_credits() {
        let h = Harness::builder()
            .status(status(true, false, false))
            .build();

        let outcome = h
            .lifecycle
            .request_transition(Milestone::InTransit)
            .await
            .unwrap();
        let RequestOutcome::Opened(GatePrompt::Confirm { request, .. }) = outcome else {
            panic!("expected a confirmation prompt, got {outcome:?}");
        };
        assert_eq!(request.milestone, Milestone::InTransit);

        let report = h
            .lifecycle
            .respond(ConfirmationAction::Confirm)
            .await
            .unwrap();

        assert!(matches!(report, TransitionReport::Committed(_)));
        assert_eq!(h.lifecycle.status(), status(true, true, false));
        assert_eq!(h.earnings.total(&h.shipment), Credits(15));
    }

    #[tokio::test]
    async fn test_wrong_code_then_right_code_delivers() {
        let h = Harness::builder().status(status(true, true, false)).build();

        h.lifecycle
            .request_transition(Milestone::Delivered)
            .await
            .unwrap();

        let wrong = h.lifecycle.enter_code("1111").await.unwrap();
        assert!(matches!(wrong, VerifyOutcome::Mismatch { .. }));
        assert_eq!(h.lifecycle.status(), status(true, true, false));
        assert!(h.lifecycle.pending().is_some(), "gate stays open");
        assert_eq!(h.earnings.total(&h.shipment), Credits::ZERO);

        let right = h.lifecycle.enter_code(DELIVERY_CODE).await.unwrap();
        let VerifyOutcome::Resolved(TransitionReport::Committed(report)) = right else {
            panic!("expected delivery commit, got {right:?}");
        };
        assert!(report.terminal);
        assert_eq!(report.credit, Some(Credits(25)));
        assert_eq!(h.lifecycle.status(), status(true, true, true));
        assert!(h.lifecycle.is_terminal());
    }

    #[tokio::test]
    async fn test_full_delivery_totals_every_credit() {
        let h = Harness::builder().build();

        let unlock = h
            .earnings
            .award(&h.shipment, CreditMilestone::AccessUnlock)
            .await
            .unwrap();
        assert_eq!(unlock.credited(), Some(Credits(5)));

        pick_up(&h).await;
        go_in_transit(&h).await;
        h.lifecycle
            .request_transition(Milestone::Delivered)
            .await
            .unwrap();
        for (slot, digit) in DELIVERY_CODE.chars().enumerate() {
            h.lifecycle.enter_code_digit(slot, digit).await.unwrap();
        }

        assert!(h.lifecycle.is_terminal());
        assert_eq!(h.earnings.total(&h.shipment), Credits(55));
        assert_eq!(h.earnings.events(&h.shipment).len(), 4);
    }

    // =========================================================================
    // GUARDS ACROSS SUBSYSTEMS
    // =========================================================================

    #[tokio::test]
    async fn test_out_of_order_request_leaves_everything_untouched() {
        let h = Harness::builder().build();
        let mut sub = h.subscribe();

        let err = h
            .lifecycle
            .request_transition(Milestone::Delivered)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            LifecycleError::Transition(TransitionError::PrerequisiteNotMet {
                requested: Milestone::Delivered,
                required: Milestone::InTransit,
            })
        );
        assert_eq!(h.lifecycle.status(), ShipmentStatus::initial());
        assert!(h.lifecycle.pending().is_none());
        assert!(drain(&mut sub).is_empty(), "a rejected request publishes nothing");
    }

    #[tokio::test]
    async fn test_terminal_shipment_ignores_everything() {
        let h = Harness::builder().status(status(true, true, true)).build();
        let mut sub = h.subscribe();

        for milestone in Milestone::ALL {
            let outcome = h.lifecycle.request_transition(milestone).await.unwrap();
            assert_eq!(outcome, RequestOutcome::Ignored);
        }
        assert_eq!(h.lifecycle.verify_code().await.unwrap(), VerifyOutcome::AlreadyCommitted);
        assert_eq!(h.lifecycle.cancel_pending(CancelCause::Explicit).await.unwrap(), None);

        assert_eq!(h.lifecycle.status(), status(true, true, true));
        assert!(drain(&mut sub).is_empty());
    }

    #[tokio::test]
    async fn test_ledger_rejects_second_award_after_commit() {
        let h = Harness::builder().build();
        pick_up(&h).await;

        let again = h
            .earnings
            .award(&h.shipment, CreditMilestone::PickedUp)
            .await
            .unwrap();

        assert_eq!(again, AwardResult::AlreadyAwarded);
        assert_eq!(h.earnings.total(&h.shipment), Credits(10));
        assert_eq!(h.earnings.events(&h.shipment).len(), 1);
    }

    // =========================================================================
    // BUS CHOREOGRAPHY
    // =========================================================================

    #[tokio::test]
    async fn test_bus_sees_credit_before_commit_and_terminal_last() {
        let h = Harness::builder().status(status(true, true, false)).build();
        let mut sub = h.subscribe();

        h.lifecycle
            .request_transition(Milestone::Delivered)
            .await
            .unwrap();
        h.lifecycle.enter_code(DELIVERY_CODE).await.unwrap();

        assert_eq!(
            labels(&drain(&mut sub)),
            vec![
                "requested:DELIVERED",
                "credit:DELIVERED:25",
                "committed:DELIVERED",
                "terminal",
            ]
        );
    }

    #[tokio::test]
    async fn test_credit_event_carries_running_total() {
        let h = Harness::builder().build();
        let mut sub = h.subscribe();

        pick_up(&h).await;
        go_in_transit(&h).await;

        let totals: Vec<u64> = drain(&mut sub)
            .into_iter()
            .filter_map(|event| match event {
                ShipmentEvent::CreditAwarded { total, .. } => Some(total.0),
                _ => None,
            })
            .collect();
        assert_eq!(totals, vec![10, 25]);
    }

    #[tokio::test]
    async fn test_events_serialize_for_logging() {
        let h = Harness::builder().build();
        let mut sub = h.subscribe();

        pick_up(&h).await;

        for event in drain(&mut sub) {
            let json = serde_json::to_value(&event).unwrap();
            assert!(json.is_object());
        }
    }

    #[tokio::test]
    async fn test_other_shipments_are_filtered_out() {
        let h = Harness::builder().build();
        let mut sub = h.subscribe();

        let other = shared_types::entities::ShipmentId::new("SHP-OTHER");
        h.earnings
            .award(&other, CreditMilestone::AccessUnlock)
            .await
            .unwrap();

        assert!(drain(&mut sub).is_empty());
        assert_eq!(h.earnings.total(&h.shipment), Credits::ZERO);
    }
}
