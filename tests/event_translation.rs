mod common;

use common::init_logging;
use irrlicht::engine::input::{
    ClickTracker, DeviceState, EventTranslator, Flow, KeyMap, Modifiers, NativeEvent, Scancode,
    WindowNotification,
};
use irrlicht::engine::{
    Event, Key, KeyInput, MouseButton, MouseButtonAction, MouseButtons, TouchInput, TouchPhase,
};
use nalgebra::Vector2;
use std::time::Duration;

fn setup() -> (EventTranslator, DeviceState) {
    init_logging();
    let translator =
        EventTranslator::new(KeyMap::default(), ClickTracker::default(), Modifiers::CTRL);
    let state = DeviceState::new(800, 600, Vector2::new(1.0, 1.0));
    (translator, state)
}

fn translate(
    translator: &mut EventTranslator,
    state: &mut DeviceState,
    events: impl IntoIterator<Item = NativeEvent>,
) -> Vec<Event> {
    let mut out = Vec::new();
    for event in events {
        assert_eq!(translator.translate(state, event, &mut out), Flow::Continue);
    }
    out
}

fn press(x: f32, y: f32, ms: u64) -> NativeEvent {
    NativeEvent::MouseButton {
        button: MouseButton::Left,
        pressed: true,
        x,
        y,
        modifiers: Modifiers::empty(),
        time: Duration::from_millis(ms),
    }
}

fn release(x: f32, y: f32, ms: u64) -> NativeEvent {
    NativeEvent::MouseButton {
        button: MouseButton::Left,
        pressed: false,
        x,
        y,
        modifiers: Modifiers::empty(),
        time: Duration::from_millis(ms),
    }
}

fn actions(events: &[Event]) -> Vec<(MouseButtonAction, u32)> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::MouseButton(input) => Some((input.action, input.click_count)),
            _ => None,
        })
        .collect()
}

#[test]
fn resize_to_the_same_size_is_dropped() {
    let (mut translator, mut state) = setup();
    let resize =
        |width, height| NativeEvent::Window(WindowNotification::SizeChanged { width, height });

    let events = translate(
        &mut translator,
        &mut state,
        [resize(800, 600), resize(1024, 768), resize(1024, 768)],
    );

    assert_eq!(
        events,
        vec![Event::WindowResize {
            width: 1024,
            height: 768
        }]
    );
    assert_eq!((state.width, state.height), (1024, 768));
}

#[test]
fn resize_is_reported_in_scaled_pixels() {
    let (mut translator, _) = setup();
    let mut state = DeviceState::new(1600, 1200, Vector2::new(2.0, 2.0));

    let events = translate(
        &mut translator,
        &mut state,
        [NativeEvent::Window(WindowNotification::SizeChanged {
            width: 640,
            height: 480,
        })],
    );

    assert_eq!(
        events,
        vec![Event::WindowResize {
            width: 1280,
            height: 960
        }]
    );
}

#[test]
fn successive_presses_raise_double_and_triple_clicks() {
    let (mut translator, mut state) = setup();

    let events = translate(
        &mut translator,
        &mut state,
        [
            press(10.0, 10.0, 0),
            release(10.0, 10.0, 50),
            press(11.0, 10.0, 100),
            release(11.0, 10.0, 150),
            press(12.0, 11.0, 200),
            release(12.0, 11.0, 250),
            press(12.0, 11.0, 300),
        ],
    );

    assert_eq!(
        actions(&events),
        vec![
            (MouseButtonAction::PressedDown, 1),
            (MouseButtonAction::LeftUp, 1),
            (MouseButtonAction::PressedDown, 2),
            (MouseButtonAction::DoubleClick, 2),
            (MouseButtonAction::LeftUp, 1),
            (MouseButtonAction::PressedDown, 3),
            (MouseButtonAction::TripleClick, 3),
            (MouseButtonAction::LeftUp, 1),
            (MouseButtonAction::PressedDown, 1),
        ]
    );
}

#[test]
fn slow_or_distant_presses_start_a_new_run() {
    let (mut translator, mut state) = setup();

    let events = translate(
        &mut translator,
        &mut state,
        [
            press(10.0, 10.0, 0),
            press(10.0, 10.0, 600),
            press(20.0, 10.0, 700),
        ],
    );

    assert_eq!(
        actions(&events),
        vec![
            (MouseButtonAction::PressedDown, 1),
            (MouseButtonAction::PressedDown, 1),
            (MouseButtonAction::PressedDown, 1),
        ]
    );
}

#[test]
fn clicks_are_detected_on_scaled_positions() {
    let (mut translator, _) = setup();
    let mut state = DeviceState::new(1600, 1200, Vector2::new(2.0, 2.0));

    // 2 logical pixels apart is 4 scaled pixels, beyond the tolerance.
    let events = translate(
        &mut translator,
        &mut state,
        [press(10.0, 10.0, 0), press(12.0, 10.0, 100)],
    );

    assert_eq!(
        actions(&events),
        vec![
            (MouseButtonAction::PressedDown, 1),
            (MouseButtonAction::PressedDown, 1),
        ]
    );
    assert_eq!(state.mouse_position, Vector2::new(24, 20));
}

#[test]
fn button_mask_tracks_every_button() {
    let (mut translator, mut state) = setup();
    let extra = NativeEvent::MouseButton {
        button: MouseButton::Extra1,
        pressed: true,
        x: 5.0,
        y: 5.0,
        modifiers: Modifiers::empty(),
        time: Duration::ZERO,
    };

    let events = translate(&mut translator, &mut state, [extra, press(5.0, 5.0, 10)]);

    assert_eq!(events.len(), 1);
    let Event::MouseButton(input) = &events[0] else {
        panic!("expected a button event, got {events:?}");
    };
    assert_eq!(input.button, MouseButton::Left);
    assert_eq!(input.buttons, MouseButtons::LEFT | MouseButtons::EXTRA1);
}

#[test]
fn keys_resolve_through_the_fallback() {
    let (mut translator, mut state) = setup();
    let key = |primary, fallback| NativeEvent::Key {
        primary,
        fallback,
        pressed: true,
        modifiers: Modifiers::LSHIFT | Modifiers::RCTRL,
    };

    let events = translate(
        &mut translator,
        &mut state,
        [
            key(Scancode::letter('a'), None),
            key(Some(Scancode(0x7FFF)), Scancode::letter('q')),
            key(Some(Scancode(0x7FFF)), None),
            key(None, None),
        ],
    );

    let keys: Vec<Key> = events.iter().filter_map(|e| e.key()).map(|k| k.key).collect();
    assert_eq!(keys, vec![Key::A, Key::Q, Key::Unknown, Key::Unknown]);
    assert_eq!(
        events[0],
        Event::Key(KeyInput {
            key: Key::A,
            pressed_down: true,
            shift: true,
            control: true,
        })
    );
}

#[test]
fn touch_positions_are_scaled_to_the_window() {
    let (mut translator, mut state) = setup();
    let finger = |phase| NativeEvent::Finger {
        phase,
        id: 7,
        x: 0.5,
        y: 0.5,
    };

    let events = translate(
        &mut translator,
        &mut state,
        [finger(TouchPhase::Down), finger(TouchPhase::Up)],
    );

    assert_eq!(
        events,
        vec![
            Event::Touch(TouchInput {
                id: 7,
                phase: TouchPhase::Down,
                x: 400,
                y: 300,
                active_touch_count: 1,
            }),
            Event::Touch(TouchInput {
                id: 7,
                phase: TouchPhase::Up,
                x: 400,
                y: 300,
                active_touch_count: 1,
            }),
        ]
    );
    assert_eq!(state.active_touch_count(), 0);
}

#[test]
fn horizontal_wheel_and_warps_are_swallowed() {
    let (mut translator, mut state) = setup();

    let events = translate(
        &mut translator,
        &mut state,
        [
            NativeEvent::MouseMotion {
                x: 30.0,
                y: 40.0,
                modifiers: Modifiers::empty(),
                warped: true,
            },
            NativeEvent::MouseWheel {
                x: 1.0,
                y: 0.0,
                modifiers: Modifiers::empty(),
            },
            NativeEvent::MouseWheel {
                x: 0.0,
                y: -1.0,
                modifiers: Modifiers::LCTRL,
            },
        ],
    );

    assert_eq!(
        events,
        vec![Event::MouseWheel {
            x: 30,
            y: 40,
            delta: -1.0,
            buttons: MouseButtons::empty(),
            shift: false,
            control: true,
        }]
    );
}

#[test]
fn window_notifications_update_state() {
    let (mut translator, mut state) = setup();
    state.has_focus = true;

    let events = translate(
        &mut translator,
        &mut state,
        [
            NativeEvent::Window(WindowNotification::FocusLost),
            NativeEvent::Window(WindowNotification::Minimized),
        ],
    );
    assert_eq!(
        events,
        vec![
            Event::WindowFocus { gained: false },
            Event::WindowMinimize { minimized: true },
        ]
    );
    assert!(!state.is_window_active());

    translate(
        &mut translator,
        &mut state,
        [
            NativeEvent::Window(WindowNotification::Restored),
            NativeEvent::Window(WindowNotification::FocusGained),
        ],
    );
    assert!(state.is_window_active());
}

#[test]
fn quit_and_device_reset_close_the_device() {
    let (mut translator, mut state) = setup();
    let mut out = Vec::new();

    assert_eq!(
        translator.translate(&mut state, NativeEvent::Quit, &mut out),
        Flow::Close
    );
    assert_eq!(
        translator.translate(&mut state, NativeEvent::RenderDeviceReset, &mut out),
        Flow::Close
    );
    assert!(out.is_empty());
}

#[test]
fn composition_text_is_flagged() {
    let (mut translator, mut state) = setup();

    let events = translate(
        &mut translator,
        &mut state,
        [
            NativeEvent::TextEditing {
                text: "ka".into(),
                start: 2,
                length: 0,
            },
            NativeEvent::TextInput { text: "か".into() },
            NativeEvent::User { data1: 1, data2: 2 },
            NativeEvent::Other(0x1234),
        ],
    );

    let composing: Vec<bool> = events
        .iter()
        .filter_map(|e| match e {
            Event::TextInput(input) => Some(input.is_composing),
            _ => None,
        })
        .collect();
    assert_eq!(composing, vec![true, false]);
    assert_eq!(events.last(), Some(&Event::User { data1: 1, data2: 2 }));
    assert_eq!(events.len(), 3);
}
