//! # Console Session Flows
//!
//! The runtime as `main` assembles it: configuration from `PR_*` values,
//! the container, the display handler on the bus, and console commands
//! against real files.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use courier_runtime::{CourierContainer, Flow, RuntimeConfig, Session};
    use pr_01_shipment_lifecycle::ShipmentLifecycleApi;
    use pr_02_earnings_ledger::EarningsApi;
    use shared_types::entities::{Credits, Milestone, ShipmentStatus};
    use shared_types::time::ManualTimeSource;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    fn config_from(pairs: &[(&str, &str)]) -> RuntimeConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RuntimeConfig::from_lookup(|key| vars.get(key).cloned())
    }

    fn start(config: RuntimeConfig) -> (Arc<CourierContainer>, Session) {
        let container = Arc::new(
            CourierContainer::with_time(config, Arc::new(ManualTimeSource::new(1_700_000_000_000)))
                .unwrap(),
        );
        let session = Session::new(
            container.lifecycle.clone(),
            container.earnings.clone(),
            container.picker.clone(),
        );
        (container, session)
    }

    async fn run(session: &Session, line: &str) -> Vec<String> {
        match session.handle_line(line).await.unwrap() {
            Flow::Continue(lines) => lines,
            Flow::Quit => panic!("unexpected quit on {line:?}"),
        }
    }

    fn spawn_display(container: &CourierContainer) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        container.spawn_display(tx);
        rx
    }

    async fn next_line(rx: &mut mpsc::UnboundedReceiver<String>) -> String {
        timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("display line")
            .expect("display open")
    }

    #[tokio::test]
    async fn test_console_delivery_with_display() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("parcel.jpg"), b"jpeg").unwrap();
        let media_root = dir.path().to_string_lossy().to_string();
        let (container, session) = start(config_from(&[
            ("PR_SHIPMENT_ID", "SHP-CONSOLE"),
            ("PR_DELIVERY_CODE", "4821"),
            ("PR_MEDIA_ROOT", &media_root),
        ]));
        let mut display = spawn_display(&container);

        container.unlock_access().await.unwrap();
        assert_eq!(
            next_line(&mut display).await,
            "+5 credits for ACCESS_UNLOCK (total 5)"
        );

        let out = run(&session, "pickup camera parcel.jpg").await;
        assert!(out.iter().any(|l| l.contains("PICKED_UP committed")), "{out:?}");
        assert_eq!(
            next_line(&mut display).await,
            "+10 credits for PICKED_UP (total 15)"
        );

        run(&session, "transit").await;
        run(&session, "confirm").await;
        run(&session, "deliver").await;
        for (slot, digit) in "482".chars().enumerate() {
            run(&session, &format!("digit {slot} {digit}")).await;
        }
        let out = run(&session, "digit 3 1").await;
        assert!(out.iter().any(|l| l.contains("DELIVERED committed")), "{out:?}");

        assert_eq!(
            next_line(&mut display).await,
            "+15 credits for IN_TRANSIT (total 30)"
        );
        assert_eq!(
            next_line(&mut display).await,
            "+25 credits for DELIVERED (total 55)"
        );
        assert_eq!(
            next_line(&mut display).await,
            "Shipment SHP-CONSOLE delivered. Opening completed shipments."
        );
        assert_eq!(container.earnings.total(&container.config.shipment), Credits(55));
    }

    #[tokio::test]
    async fn test_console_resumes_from_prior_milestone() {
        let (container, session) = start(config_from(&[
            ("PR_PRIOR_MILESTONE", "in-transit"),
            ("PR_DELIVERY_CODE", "1357"),
        ]));

        assert_eq!(
            container.lifecycle.status(),
            ShipmentStatus::reached(Some(Milestone::InTransit))
        );
        let err = session.handle_line("transit").await.unwrap_err();
        assert!(err.to_string().contains("already completed"), "{err}");

        run(&session, "deliver").await;
        run(&session, "code 1357").await;
        assert!(container.lifecycle.is_terminal());
    }

    #[tokio::test]
    async fn test_console_attempt_limit_from_config() {
        let (container, session) = start(config_from(&[
            ("PR_PRIOR_MILESTONE", "in_transit"),
            ("PR_DELIVERY_CODE", "1357"),
            ("PR_MAX_CODE_ATTEMPTS", "1"),
        ]));

        run(&session, "deliver").await;
        let out = run(&session, "code 0000").await;

        assert!(out.iter().any(|l| l.contains("rolled back")), "{out:?}");
        assert!(container.lifecycle.pending().is_none());
        assert!(!container.lifecycle.status().delivered());
    }

    #[tokio::test]
    async fn test_console_history_lists_attempts() {
        let dir = tempfile::tempdir().unwrap();
        let media_root = dir.path().to_string_lossy().to_string();
        let (container, session) = start(config_from(&[("PR_MEDIA_ROOT", &media_root)]));

        run(&session, "pickup library missing.jpg").await;
        std::fs::write(dir.path().join("found.jpg"), b"jpeg").unwrap();
        run(&session, "pickup library found.jpg").await;

        let history = run(&session, "history").await;
        assert_eq!(history.len(), 2, "{history:?}");
        assert!(history[0].contains("PICKED_UP"));
        assert!(container.lifecycle.status().picked_up());
    }

    #[tokio::test]
    async fn test_quit_ends_session() {
        let (_container, session) = start(RuntimeConfig::default());

        assert!(matches!(session.handle_line("quit").await.unwrap(), Flow::Quit));
    }
}
