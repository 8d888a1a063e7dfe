//! Component integration tests.
//!
//! These tests wire the controller to a real overlay surface and check
//! that the two stay consistent through message passing only:
//! - Overlay pose follows the timer
//! - Overlay commands reach the controller
//! - Settings saves reach the overlay as appearance updates
//! - Tray actions drive the controller

use std::time::Duration;

use tokio::time::timeout;

use pomodorocat::app::{App, AppCommand};
use pomodorocat::engine::ManualTicker;
use pomodorocat::notify::MockNotifier;
use pomodorocat::preferences::{keys, MemoryStore, PreferencesStore, Settings};
use pomodorocat::sync::{spawn_overlay, OverlayMessage, OverlayView, OverlayVisual, SurfaceCommand};
use pomodorocat::tray::TrayAction;
use pomodorocat::types::{PetType, TimerMode};

// ============================================================================
// Test Helpers
// ============================================================================

fn create_app(store: MemoryStore) -> (App, MockNotifier) {
    let notifier = MockNotifier::new();
    let app = App::with_scheduler(Box::new(store), Box::new(notifier.clone()), |_| {
        Box::new(ManualTicker::new())
    });
    (app, notifier)
}

fn one_minute_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    store.set(keys::WORK_TIME, serde_json::json!(1)).unwrap();
    store.set(keys::BREAK_TIME, serde_json::json!(1)).unwrap();
    store
}

/// Waits until the overlay channel yields a message matching `pred`.
async fn wait_for<F>(rx: &crossbeam_channel::Receiver<OverlayMessage>, pred: F) -> OverlayMessage
where
    F: Fn(&OverlayMessage) -> bool,
{
    timeout(Duration::from_secs(2), async {
        loop {
            if let Ok(message) = rx.try_recv() {
                if pred(&message) {
                    return message;
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
    .await
    .expect("overlay message not received")
}

// ============================================================================
// Overlay Thread
// ============================================================================

mod overlay_thread_tests {
    use super::*;

    #[test]
    fn test_overlay_follows_work_then_break() {
        let (mut app, notifier) = create_app(one_minute_store());
        let (overlay_tx, overlay) = spawn_overlay(app.surface_sender()).unwrap();
        app.attach_overlay(overlay_tx);

        app.handle_surface(SurfaceCommand::RequestStart);
        for _ in 0..60 {
            app.on_tick();
        }
        app.handle_surface(SurfaceCommand::RequestStart);

        drop(app);
        let last = overlay.join().unwrap();

        assert_eq!(last.mode, TimerMode::Break);
        assert!(last.is_running);
        assert_eq!(last.visual(), OverlayVisual::OnBreak);
        assert_eq!(notifier.notify_count(), 1);
    }

    #[test]
    fn test_overlay_gets_appearance_on_save() {
        let (mut app, _notifier) = create_app(MemoryStore::new());
        let (overlay_tx, overlay) = spawn_overlay(app.surface_sender()).unwrap();
        app.attach_overlay(overlay_tx);

        app.save_settings(Settings {
            cat_theme: "pixel-calico".to_string(),
            pet_type: PetType::Bird,
            ..Settings::default()
        })
        .unwrap();

        drop(app);
        let last = overlay.join().unwrap();

        assert_eq!(last.theme, "pixel-calico");
        assert_eq!(last.pet_type, PetType::Bird);
        assert_eq!(last.visual(), OverlayVisual::Idle);
    }

    #[test]
    fn test_overlay_gone_is_not_an_error() {
        let (mut app, _notifier) = create_app(MemoryStore::new());
        let (overlay_tx, overlay_rx) = crossbeam_channel::unbounded();
        app.attach_overlay(overlay_tx);
        drop(overlay_rx);

        app.handle_surface(SurfaceCommand::RequestStart);
        app.handle_surface(SurfaceCommand::RequestHide);
        app.on_tick();

        assert!(app.snapshot().is_running);
        assert_eq!(app.snapshot().remaining_seconds, 1499);
    }
}

// ============================================================================
// Overlay Commands Through The Run Loop
// ============================================================================

mod run_loop_tests {
    use super::*;

    #[tokio::test]
    async fn test_overlay_close_hides_overlay() {
        let (mut app, _notifier) = create_app(MemoryStore::new());
        let (overlay_tx, overlay_rx) = crossbeam_channel::unbounded();
        app.attach_overlay(overlay_tx);
        overlay_rx.try_iter().count();

        let view = OverlayView::new(app.surface_sender());
        let commands = app.command_sender();
        let handle = tokio::spawn(app.run());

        view.close();
        let message = wait_for(&overlay_rx, |m| {
            matches!(m, OverlayMessage::Visibility { .. })
        })
        .await;
        assert_eq!(message, OverlayMessage::Visibility { visible: false });

        commands.send(AppCommand::Quit).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_surface_start_request_starts_timer() {
        let (mut app, _notifier) = create_app(MemoryStore::new());
        let (overlay_tx, overlay_rx) = crossbeam_channel::unbounded();
        app.attach_overlay(overlay_tx);
        overlay_rx.try_iter().count();

        let surface = app.surface_sender();
        let commands = app.command_sender();
        let handle = tokio::spawn(app.run());

        surface.send(SurfaceCommand::RequestStart).unwrap();
        let message = wait_for(&overlay_rx, |m| matches!(m, OverlayMessage::State(_))).await;
        match message {
            OverlayMessage::State(payload) => assert_eq!(payload.visual(), OverlayVisual::Working),
            other => panic!("Expected State, got {:?}", other),
        }

        let (tx, rx) = tokio::sync::oneshot::channel();
        commands.send(AppCommand::Status(tx)).unwrap();
        assert!(rx.await.unwrap().is_running);

        commands.send(AppCommand::Quit).unwrap();
        handle.await.unwrap();
    }
}

// ============================================================================
// Tray
// ============================================================================

mod tray_tests {
    use super::*;

    #[test]
    fn test_tray_menu_drives_controller() {
        let (mut app, _notifier) = create_app(MemoryStore::new());

        let start = TrayAction::StartTimer.to_command().unwrap();
        assert!(app.handle_command(start));
        assert!(app.snapshot().is_running);

        let hide = TrayAction::from_id("hide-overlay")
            .and_then(|action| action.to_command())
            .unwrap();
        app.handle_command(hide);
        assert!(!app.is_overlay_visible());

        let pause = TrayAction::from_id("pause-timer")
            .and_then(|action| action.to_command())
            .unwrap();
        app.handle_command(pause);
        assert!(!app.snapshot().is_running);

        let quit = TrayAction::Quit.to_command().unwrap();
        assert!(!app.handle_command(quit));
    }
}
