//! End-to-end window behavior driven through `show()` on the headless backend

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use approx::assert_relative_eq;
use casement::backend::headless::{EventScript, HeadlessBackend, HeadlessStats};
use casement::events::native::{kind, window_event, NativeEvent};
use casement::prelude::*;

fn platform_with(backend: HeadlessBackend) -> (Platform<HeadlessBackend>, EventScript, Arc<HeadlessStats>) {
    let script = backend.script();
    let stats = backend.stats();
    (Platform::new(backend), script, stats)
}

fn recorder() -> Rc<RefCell<Vec<Event>>> {
    Rc::new(RefCell::new(Vec::new()))
}

#[test]
fn lowering_maximum_shrinks_running_window() {
    let (platform, _, _) = platform_with(HeadlessBackend::new());
    let mut window = Window::new(&platform, "shrink", 500, 400, WindowFlags::RESIZABLE);
    let checked = Rc::new(RefCell::new(false));
    let flag = Rc::clone(&checked);

    window.on_loaded(move |window| {
        assert_eq!(window.minimum_size(), Size::MIN);
        assert_eq!(window.maximum_size(), Size::MAX);
        window.set_maximum_size(300, 300).unwrap();
        assert_eq!(window.size(), Size::new(300, 300));
        assert_eq!(window.realtime_size().unwrap(), Size::new(300, 300));
        *flag.borrow_mut() = true;
    });

    window.show().unwrap();
    assert!(*checked.borrow());
}

#[test]
fn fullscreen_round_trip_restores_pre_fullscreen_bounds() {
    let (platform, _, _) = platform_with(HeadlessBackend::new().with_desktop(Size::new(2560, 1440)));
    let mut window = Window::new(&platform, "modes", 640, 480, WindowFlags::empty());

    window.on_loaded(|window| {
        window.set_minimum_size(320, 200).unwrap();
        window.set_maximum_size(1024, 768).unwrap();
        let before = (
            window.minimum_size(),
            window.maximum_size(),
            window.size(),
            window.is_resizable(),
        );

        window.change_window_mode(WindowMode::Fullscreen).unwrap();
        assert_eq!(window.maximum_size(), Size::new(2560, 1440));
        assert!(window.is_resizable());

        window.change_window_mode(WindowMode::Windowed).unwrap();
        let after = (
            window.minimum_size(),
            window.maximum_size(),
            window.size(),
            window.is_resizable(),
        );
        assert_eq!(after, before);
        assert!(!after.3);
    });

    window.show().unwrap();
}

#[test]
fn opacity_and_position_requests_are_clamped() {
    let (platform, _, _) = platform_with(HeadlessBackend::new());
    let mut window = Window::new(&platform, "clamp", 200, 200, WindowFlags::empty());

    window.on_loaded(|window| {
        window.change_opacity(11111.0).unwrap();
        assert_relative_eq!(window.opacity(), 1.0);
        window.change_opacity(-1.0).unwrap();
        assert_relative_eq!(window.opacity(), 0.0);
        window.change_position(-1, -1).unwrap();
        assert_eq!(window.position(), Position::new(0, 0));
    });

    window.show().unwrap();
}

#[test]
fn callbacks_follow_native_order_one_to_one() {
    let (platform, script, _) = platform_with(HeadlessBackend::new().without_echo());
    script.extend([
        NativeEvent::window(window_event::SHOWN, 0, 0),
        NativeEvent::window(window_event::MOVED, 10, 20),
        NativeEvent::new(kind::KEY_DOWN).with_code(65).with_which(30),
        NativeEvent::window(window_event::FOCUS_GAINED, 0, 0),
        NativeEvent::new(kind::MOUSE_BUTTON_DOWN).with_code(1).with_data(3, 4),
        NativeEvent::new(kind::KEY_UP).with_code(65).with_which(30),
        NativeEvent::window(window_event::FOCUS_LOST, 0, 0),
        NativeEvent::window(window_event::CLOSE, 0, 0),
    ]);

    let mut window = Window::new(&platform, "order", 100, 100, WindowFlags::empty());
    let seen = recorder();
    let sink = Rc::clone(&seen);
    window.on_any(move |_, event| sink.borrow_mut().push(event.clone()));

    window.show().unwrap();

    assert_eq!(
        *seen.borrow(),
        vec![
            Event::Loaded,
            Event::Shown,
            Event::Moved { x: 10, y: 20 },
            Event::KeyDown {
                keycode: 65,
                scancode: 30
            },
            Event::FocusGained,
            Event::MouseButtonDown { button: 1, x: 3, y: 4 },
            Event::KeyUp {
                keycode: 65,
                scancode: 30
            },
            Event::FocusLost,
            Event::Closed,
        ]
    );
}

#[test]
fn idle_window_rejects_every_mutator_without_touching_state() {
    let platform = Platform::headless();
    let mut window = Window::new(&platform, "idle", 100, 100, WindowFlags::RESIZABLE);
    let before = window.state().clone();

    let results = [
        window.change_size(10, 10),
        window.change_position(5, 5),
        window.set_minimum_size(50, 50),
        window.set_maximum_size(60, 60),
        window.set_resizable(false),
        window.change_title("other"),
        window.change_opacity(0.5),
        window.change_icon("/no/such/icon.bmp"),
        window.change_window_mode(WindowMode::Fullscreen),
        window.unbound(),
        window.minimize(),
        window.maximize(),
        window.restore(),
        window.focus(),
        window.realtime_size().map(|_| ()),
    ];

    for result in results {
        assert!(matches!(result, Err(WindowError::NotRunning)), "{result:?}");
    }
    assert_eq!(window.state(), &before);
    assert!(window.close().is_ok());
}

#[test]
fn minimize_and_maximize_never_coexist() {
    let (platform, script, _) = platform_with(HeadlessBackend::new());
    let mut window = Window::new(&platform, "exclusive", 300, 300, WindowFlags::empty());
    let states = Rc::new(RefCell::new(Vec::new()));

    window.on_loaded(|window| {
        window.maximize().unwrap();
        window.minimize().unwrap();
        assert!(window.is_minimized() && !window.is_maximized());
        window.restore().unwrap();
        assert!(!window.is_minimized() && !window.is_maximized());
    });

    let sink = Rc::clone(&states);
    window.on_any(move |window, _| {
        assert!(!(window.is_minimized() && window.is_maximized()));
        sink.borrow_mut().push((window.is_minimized(), window.is_maximized()));
    });

    window.show().unwrap();
    assert!(script.is_empty());
    // Loaded, the three echoed state events, then Quit and Closed
    assert_eq!(states.borrow().len(), 6);
}

#[test]
fn resize_handler_can_resize_reentrantly() {
    let (platform, script, _) = platform_with(HeadlessBackend::new());
    script.push(NativeEvent::window(window_event::RESIZED, 1200, 900));

    let mut window = Window::new(&platform, "reentrant", 400, 300, WindowFlags::RESIZABLE);
    let sizes = Rc::new(RefCell::new(Vec::new()));

    window.on_resized(|window, width, height| {
        window.change_size(width / 2, height / 2).unwrap();
        assert_eq!(window.size(), Size::new(600, 450));
    });
    let sink = Rc::clone(&sizes);
    window.on_size_changed(move |_, width, height| sink.borrow_mut().push((width, height)));

    window.show().unwrap();
    assert_eq!(*sizes.borrow(), vec![(600, 450)]);
}

#[test]
fn closing_inside_a_callback_releases_once() {
    let (platform, script, stats) = platform_with(HeadlessBackend::new());
    script.extend([
        NativeEvent::window(window_event::EXPOSED, 0, 0),
        NativeEvent::window(window_event::EXPOSED, 0, 0),
    ]);

    let mut window = Window::new(&platform, "closing", 200, 200, WindowFlags::empty());
    let exposures = Rc::new(RefCell::new(0));
    let closes = Rc::new(RefCell::new(0));

    let counter = Rc::clone(&exposures);
    window.on(EventType::Exposed, move |window, _| {
        *counter.borrow_mut() += 1;
        window.close().unwrap();
        assert!(window.handle().is_none());
    });
    let counter = Rc::clone(&closes);
    window.on_closed(move |window| {
        *counter.borrow_mut() += 1;
        assert!(window.handle().is_some());
        window.close().unwrap();
    });

    window.show().unwrap();

    assert_eq!(*exposures.borrow(), 1);
    assert_eq!(*closes.borrow(), 1);
    assert_eq!(stats.windows_destroyed(), 1);
    assert_eq!(script.len(), 1);
    assert!(window.handle().is_none());
    assert!(matches!(window.show(), Err(WindowError::Finished)));
}

#[test]
fn show_while_running_is_rejected() {
    let platform = Platform::headless();
    let mut window = Window::new(&platform, "nested", 100, 100, WindowFlags::empty());
    window.on_loaded(|window| {
        assert!(matches!(window.show(), Err(WindowError::AlreadyRunning)));
    });
    window.show().unwrap();
}

#[test]
fn commands_from_another_thread_run_on_the_pump() {
    let (platform, _, stats) = platform_with(HeadlessBackend::new().blocking());
    let mut window = Window::new(&platform, "proxy", 800, 600, WindowFlags::RESIZABLE);
    let proxy = window.proxy();
    let final_state = Rc::new(RefCell::new(None));

    let sink = Rc::clone(&final_state);
    window.on_closed(move |window| {
        *sink.borrow_mut() = Some((window.size(), window.title().to_string(), window.mode()));
    });

    let sender = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        proxy.send(WindowCommand::SetMaximumSize(500, 500));
        proxy.send(WindowCommand::ChangeTitle("from thread".to_string()));
        thread::sleep(Duration::from_millis(20));
        proxy.change_window_mode(WindowMode::Borderless);
        proxy.close();
    });

    window.show().unwrap();
    sender.join().unwrap();

    assert_eq!(
        final_state.borrow().clone(),
        Some((Size::new(500, 500), "from thread".to_string(), WindowMode::Borderless))
    );
    assert_eq!(stats.windows_destroyed(), 1);
}

#[test]
fn failed_mode_change_is_reported_and_changes_nothing() {
    let (platform, _, _) = platform_with(HeadlessBackend::new().failing_fullscreen());
    let mut window = Window::new(&platform, "failing", 400, 300, WindowFlags::empty());

    window.on_loaded(|window| {
        let before = window.state().clone();
        let err = window.change_window_mode(WindowMode::Fullscreen).unwrap_err();
        match err {
            WindowError::Backend(ref backend) => {
                assert_eq!(backend.operation, "set_fullscreen");
                assert!(!backend.message.is_empty());
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(window.state(), &before);
        assert!(window.windowed_snapshot().is_none());
    });

    window.show().unwrap();
}

#[test]
fn unrecognized_events_are_skipped() {
    let (platform, script, _) = platform_with(HeadlessBackend::new());
    script.extend([
        NativeEvent::new(0x4242),
        NativeEvent::window(200, 1, 1),
        NativeEvent::new(kind::USER),
        NativeEvent::window(window_event::HIDDEN, 0, 0),
    ]);

    let mut window = Window::new(&platform, "unknown", 100, 100, WindowFlags::empty());
    let seen = recorder();
    let sink = Rc::clone(&seen);
    window.on_any(move |_, event| sink.borrow_mut().push(event.clone()));

    window.show().unwrap();
    assert_eq!(
        *seen.borrow(),
        vec![Event::Loaded, Event::Hidden, Event::Quit, Event::Closed]
    );
}

#[test]
fn state_resets_after_show_returns() {
    let platform = Platform::headless();
    let mut window = Window::new(&platform, "reset", 700, 500, WindowFlags::RESIZABLE);
    window.on_loaded(|window| {
        window.change_window_mode(WindowMode::Borderless).unwrap();
        window.change_opacity(0.3).unwrap();
    });
    window.show().unwrap();

    assert_eq!(window.state(), &WindowState::default());
    assert!(window.windowed_snapshot().is_none());
}

#[test]
fn backend_shuts_down_after_last_owner() {
    let backend = HeadlessBackend::new();
    let stats = backend.stats();
    let platform = Platform::new(backend);
    let mut first = Window::new(&platform, "a", 100, 100, WindowFlags::empty());
    let second = Window::new(&platform, "b", 100, 100, WindowFlags::empty());
    first.show().unwrap();

    drop(platform);
    drop(first);
    assert_eq!(stats.shutdowns(), 0);
    drop(second);
    assert_eq!(stats.shutdowns(), 1);
    assert_eq!(stats.windows_created(), 1);
}

#[test]
fn observers_can_unsubscribe_themselves() {
    let (platform, script, _) = platform_with(HeadlessBackend::new().without_echo());
    script.extend([
        NativeEvent::window(window_event::EXPOSED, 0, 0),
        NativeEvent::window(window_event::EXPOSED, 0, 0),
    ]);

    let mut window = Window::new(&platform, "once", 100, 100, WindowFlags::empty());
    let count = Rc::new(RefCell::new(0));
    let token = Rc::new(RefCell::new(None));

    let counter = Rc::clone(&count);
    let own = Rc::clone(&token);
    let subscription = window.on(EventType::Exposed, move |window, _| {
        *counter.borrow_mut() += 1;
        if let Some(token) = own.borrow_mut().take() {
            assert!(window.unsubscribe(token));
        }
    });
    *token.borrow_mut() = Some(subscription);

    window.show().unwrap();
    assert_eq!(*count.borrow(), 1);
}

#[test]
fn catch_all_observer_that_closes_still_sees_closed() {
    let (platform, script, stats) = platform_with(HeadlessBackend::new());
    script.push(NativeEvent::window(window_event::EXPOSED, 0, 0));

    let mut window = Window::new(&platform, "catch-all", 200, 200, WindowFlags::empty());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    window.on_any(move |window, event| {
        log.borrow_mut().push(event.event_type());
        if *event == Event::Exposed {
            window.close().unwrap();
        }
    });

    window.show().unwrap();

    assert_eq!(
        *seen.borrow(),
        vec![EventType::Loaded, EventType::Exposed, EventType::Closed]
    );
    assert_eq!(stats.windows_destroyed(), 1);
}
