//! Native event record and its classification into typed events
//!
//! Backends report everything through one flat record: a `kind` tag, a window
//! sub-event tag for window events, and a handful of payload slots. The tag
//! numbering follows SDL so SDL-like backends can forward events verbatim.
//! [`classify`] turns a record into an [`Event`]; tags it does not know are
//! reported as [`Classified::Unrecognized`] instead of failing.

use std::path::PathBuf;

use super::{Event, Finger};
use crate::backend::NativeHandle;

/// Top-level event tags
pub mod kind {
    /// Application quit requested
    pub const QUIT: u32 = 0x100;
    /// OS is terminating the application
    pub const APP_TERMINATING: u32 = 0x101;
    /// OS is low on memory
    pub const APP_LOW_MEMORY: u32 = 0x102;
    /// Application is about to enter the background
    pub const APP_WILL_ENTER_BACKGROUND: u32 = 0x103;
    /// Application entered the background
    pub const APP_DID_ENTER_BACKGROUND: u32 = 0x104;
    /// Application is about to enter the foreground
    pub const APP_WILL_ENTER_FOREGROUND: u32 = 0x105;
    /// Application entered the foreground
    pub const APP_DID_ENTER_FOREGROUND: u32 = 0x106;
    /// User locale preferences changed
    pub const LOCALE_CHANGED: u32 = 0x107;
    /// Window state change; see [`super::window_event`]
    pub const WINDOW: u32 = 0x200;
    /// Key pressed
    pub const KEY_DOWN: u32 = 0x300;
    /// Key released
    pub const KEY_UP: u32 = 0x301;
    /// IME composition text
    pub const TEXT_EDITING: u32 = 0x302;
    /// Finalized text input
    pub const TEXT_INPUT: u32 = 0x303;
    /// Keyboard layout changed
    pub const KEYMAP_CHANGED: u32 = 0x304;
    /// Mouse moved
    pub const MOUSE_MOTION: u32 = 0x400;
    /// Mouse button pressed
    pub const MOUSE_BUTTON_DOWN: u32 = 0x401;
    /// Mouse button released
    pub const MOUSE_BUTTON_UP: u32 = 0x402;
    /// Mouse wheel scrolled
    pub const MOUSE_WHEEL: u32 = 0x403;
    /// Joystick axis moved
    pub const JOY_AXIS_MOTION: u32 = 0x600;
    /// Joystick button pressed
    pub const JOY_BUTTON_DOWN: u32 = 0x603;
    /// Joystick button released
    pub const JOY_BUTTON_UP: u32 = 0x604;
    /// Joystick connected
    pub const JOY_DEVICE_ADDED: u32 = 0x605;
    /// Joystick disconnected
    pub const JOY_DEVICE_REMOVED: u32 = 0x606;
    /// Controller axis moved
    pub const CONTROLLER_AXIS_MOTION: u32 = 0x650;
    /// Controller button pressed
    pub const CONTROLLER_BUTTON_DOWN: u32 = 0x651;
    /// Controller button released
    pub const CONTROLLER_BUTTON_UP: u32 = 0x652;
    /// Controller connected
    pub const CONTROLLER_DEVICE_ADDED: u32 = 0x653;
    /// Controller disconnected
    pub const CONTROLLER_DEVICE_REMOVED: u32 = 0x654;
    /// Controller mapping updated
    pub const CONTROLLER_DEVICE_REMAPPED: u32 = 0x655;
    /// Finger touched the screen
    pub const FINGER_DOWN: u32 = 0x700;
    /// Finger lifted
    pub const FINGER_UP: u32 = 0x701;
    /// Finger moved
    pub const FINGER_MOTION: u32 = 0x702;
    /// Recognized a recorded $1 gesture
    pub const DOLLAR_GESTURE: u32 = 0x800;
    /// Multi-finger pinch or rotate
    pub const MULTI_GESTURE: u32 = 0x802;
    /// Clipboard contents changed
    pub const CLIPBOARD_UPDATE: u32 = 0x900;
    /// File dropped on the window
    pub const DROP_FILE: u32 = 0x1000;
    /// Drag and drop started
    pub const DROP_BEGIN: u32 = 0x1002;
    /// Drag and drop finished
    pub const DROP_COMPLETE: u32 = 0x1003;
    /// Audio device connected
    pub const AUDIO_DEVICE_ADDED: u32 = 0x1100;
    /// Audio device disconnected
    pub const AUDIO_DEVICE_REMOVED: u32 = 0x1101;
    /// Render targets were reset
    pub const RENDER_TARGETS_RESET: u32 = 0x2000;
    /// Render device was reset
    pub const RENDER_DEVICE_RESET: u32 = 0x2001;
    /// Wake-up with no payload, posted to interrupt a blocking wait
    pub const USER: u32 = 0x8000;
}

/// Window sub-event tags carried in [`NativeEvent::window_event`]
pub mod window_event {
    /// No change
    pub const NONE: u8 = 0;
    /// Window shown
    pub const SHOWN: u8 = 1;
    /// Window hidden
    pub const HIDDEN: u8 = 2;
    /// Window exposed and needs redrawing
    pub const EXPOSED: u8 = 3;
    /// Window moved to `data1, data2`
    pub const MOVED: u8 = 4;
    /// Window resized by the user to `data1 x data2`
    pub const RESIZED: u8 = 5;
    /// Window size changed, by any cause
    pub const SIZE_CHANGED: u8 = 6;
    /// Window minimized
    pub const MINIMIZED: u8 = 7;
    /// Window maximized
    pub const MAXIMIZED: u8 = 8;
    /// Window restored to normal size
    pub const RESTORED: u8 = 9;
    /// Cursor entered the window
    pub const ENTER: u8 = 10;
    /// Cursor left the window
    pub const LEAVE: u8 = 11;
    /// Window gained keyboard focus
    pub const FOCUS_GAINED: u8 = 12;
    /// Window lost keyboard focus
    pub const FOCUS_LOST: u8 = 13;
    /// Window manager asked the window to close
    pub const CLOSE: u8 = 14;
    /// Window is being offered focus
    pub const TAKE_FOCUS: u8 = 15;
    /// Window had a hit test
    pub const HIT_TEST: u8 = 16;
}

/// Flat event record produced by a backend
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NativeEvent {
    /// Top-level tag, one of [`kind`]
    pub kind: u32,
    /// Window sub-event tag when `kind == kind::WINDOW`
    pub window_event: u8,
    /// Device, finger or scancode identifier
    pub which: i64,
    /// Key code, button index or axis index
    pub code: i32,
    /// First integer payload slot
    pub data1: i32,
    /// Second integer payload slot
    pub data2: i32,
    /// Horizontal float payload
    pub x: f32,
    /// Vertical float payload
    pub y: f32,
    /// Touch pressure
    pub pressure: f32,
    /// Gesture distance change
    pub distance: f32,
    /// Gesture rotation change in radians
    pub rotation: f32,
    /// Backend timestamp in milliseconds
    pub timestamp: u32,
    /// Text or path payload
    pub text: Option<String>,
    /// Window the event belongs to; `None` for application-wide events
    pub window: Option<NativeHandle>,
}

impl NativeEvent {
    /// Create an event with the given tag and an empty payload
    pub fn new(kind: u32) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Create a window sub-event with its two integer payload slots
    pub fn window(window_event: u8, data1: i32, data2: i32) -> Self {
        Self {
            kind: kind::WINDOW,
            window_event,
            data1,
            data2,
            ..Self::default()
        }
    }

    /// Set the device/finger identifier (builder pattern)
    pub fn with_which(mut self, which: i64) -> Self {
        self.which = which;
        self
    }

    /// Set the key/button/axis code
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = code;
        self
    }

    /// Set the integer payload slots
    pub fn with_data(mut self, data1: i32, data2: i32) -> Self {
        self.data1 = data1;
        self.data2 = data2;
        self
    }

    /// Set the float payload
    pub fn with_floats(mut self, x: f32, y: f32, pressure: f32) -> Self {
        self.x = x;
        self.y = y;
        self.pressure = pressure;
        self
    }

    /// Set the gesture deltas
    pub fn with_gesture(mut self, distance: f32, rotation: f32) -> Self {
        self.distance = distance;
        self.rotation = rotation;
        self
    }

    /// Set the backend timestamp
    pub fn with_timestamp(mut self, timestamp: u32) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Address the event to one window
    pub fn for_window(mut self, window: NativeHandle) -> Self {
        self.window = Some(window);
        self
    }

    /// Set the text payload
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Outcome of classifying a native event
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    /// A typed event to apply and dispatch
    Event(Event),
    /// A payload-free wake-up; nothing to dispatch
    Wake,
    /// A tag this layer does not know
    Unrecognized {
        /// Top-level tag
        kind: u32,
        /// Window sub-event tag (zero for non-window events)
        window_event: u8,
    },
}

/// Classify a native event record
pub fn classify(native: &NativeEvent) -> Classified {
    let event = match native.kind {
        kind::WINDOW => return classify_window(native),
        kind::USER => return Classified::Wake,

        kind::QUIT => Event::Quit,
        kind::APP_TERMINATING => Event::AppTerminating,
        kind::APP_LOW_MEMORY => Event::AppLowMemory,
        kind::APP_WILL_ENTER_BACKGROUND => Event::AppWillEnterBackground,
        kind::APP_DID_ENTER_BACKGROUND => Event::AppDidEnterBackground,
        kind::APP_WILL_ENTER_FOREGROUND => Event::AppWillEnterForeground,
        kind::APP_DID_ENTER_FOREGROUND => Event::AppDidEnterForeground,
        kind::LOCALE_CHANGED => Event::LocaleChanged,
        kind::CLIPBOARD_UPDATE => Event::ClipboardUpdated,
        kind::DROP_BEGIN => Event::DropBegin,
        kind::DROP_COMPLETE => Event::DropComplete,
        kind::DROP_FILE => Event::FileDropped(PathBuf::from(text_of(native))),
        kind::RENDER_TARGETS_RESET => Event::RenderTargetsReset,
        kind::RENDER_DEVICE_RESET => Event::RenderDeviceReset,

        kind::KEY_DOWN => Event::KeyDown {
            keycode: native.code,
            scancode: native.which,
        },
        kind::KEY_UP => Event::KeyUp {
            keycode: native.code,
            scancode: native.which,
        },
        kind::TEXT_EDITING => Event::TextEditing(text_of(native)),
        kind::TEXT_INPUT => Event::TextInput(text_of(native)),
        kind::KEYMAP_CHANGED => Event::KeymapChanged,
        kind::MOUSE_MOTION => Event::MouseMotion {
            x: native.data1,
            y: native.data2,
        },
        kind::MOUSE_BUTTON_DOWN => Event::MouseButtonDown {
            button: native.code,
            x: native.data1,
            y: native.data2,
        },
        kind::MOUSE_BUTTON_UP => Event::MouseButtonUp {
            button: native.code,
            x: native.data1,
            y: native.data2,
        },
        kind::MOUSE_WHEEL => Event::MouseWheel {
            x: native.x,
            y: native.y,
        },
        kind::FINGER_DOWN => Event::FingerDown(finger_of(native)),
        kind::FINGER_UP => Event::FingerUp(finger_of(native)),
        kind::FINGER_MOTION => Event::FingerMotion(finger_of(native)),
        kind::DOLLAR_GESTURE => Event::DollarGesture {
            gesture_id: native.which,
            x: native.x,
            y: native.y,
            fingers: native.data1.unsigned_abs(),
            timestamp: native.timestamp,
        },
        kind::MULTI_GESTURE => Event::MultiGesture {
            x: native.x,
            y: native.y,
            distance: native.distance,
            rotation: native.rotation,
        },
        kind::CONTROLLER_AXIS_MOTION => Event::ControllerAxisMotion {
            which: device_of(native),
            axis: native.code,
            value: native.data1,
        },
        kind::CONTROLLER_BUTTON_DOWN => Event::ControllerButtonDown {
            which: device_of(native),
            button: native.code,
        },
        kind::CONTROLLER_BUTTON_UP => Event::ControllerButtonUp {
            which: device_of(native),
            button: native.code,
        },
        kind::JOY_AXIS_MOTION => Event::JoystickAxisMotion {
            which: device_of(native),
            axis: native.code,
            value: native.data1,
        },
        kind::JOY_BUTTON_DOWN => Event::JoystickButtonDown {
            which: device_of(native),
            button: native.code,
        },
        kind::JOY_BUTTON_UP => Event::JoystickButtonUp {
            which: device_of(native),
            button: native.code,
        },

        kind::AUDIO_DEVICE_ADDED => Event::AudioDeviceAdded(device_of(native)),
        kind::AUDIO_DEVICE_REMOVED => Event::AudioDeviceRemoved(device_of(native)),
        kind::CONTROLLER_DEVICE_ADDED => Event::ControllerDeviceAdded(device_of(native)),
        kind::CONTROLLER_DEVICE_REMOVED => Event::ControllerDeviceRemoved(device_of(native)),
        kind::CONTROLLER_DEVICE_REMAPPED => Event::ControllerDeviceRemapped(device_of(native)),
        kind::JOY_DEVICE_ADDED => Event::JoystickDeviceAdded(device_of(native)),
        kind::JOY_DEVICE_REMOVED => Event::JoystickDeviceRemoved(device_of(native)),

        _ => return unrecognized(native),
    };
    Classified::Event(event)
}

fn classify_window(native: &NativeEvent) -> Classified {
    let (data1, data2) = (native.data1, native.data2);
    let event = match native.window_event {
        window_event::NONE => return Classified::Wake,
        window_event::SHOWN => Event::Shown,
        window_event::HIDDEN => Event::Hidden,
        window_event::EXPOSED => Event::Exposed,
        window_event::MOVED => Event::Moved { x: data1, y: data2 },
        window_event::RESIZED => Event::Resized {
            width: data1,
            height: data2,
        },
        window_event::SIZE_CHANGED => Event::SizeChanged {
            width: data1,
            height: data2,
        },
        window_event::MINIMIZED => Event::Minimized,
        window_event::MAXIMIZED => Event::Maximized,
        window_event::RESTORED => Event::Restored,
        window_event::ENTER => Event::Enter,
        window_event::LEAVE => Event::Leave,
        window_event::FOCUS_GAINED => Event::FocusGained,
        window_event::FOCUS_LOST => Event::FocusLost,
        window_event::CLOSE => Event::Closed,
        window_event::TAKE_FOCUS => Event::TakeFocus,
        window_event::HIT_TEST => Event::HitTest,
        _ => return unrecognized(native),
    };
    Classified::Event(event)
}

const fn unrecognized(native: &NativeEvent) -> Classified {
    Classified::Unrecognized {
        kind: native.kind,
        window_event: native.window_event,
    }
}

fn text_of(native: &NativeEvent) -> String {
    native.text.clone().unwrap_or_default()
}

fn device_of(native: &NativeEvent) -> i32 {
    i32::try_from(native.which).unwrap_or(-1)
}

const fn finger_of(native: &NativeEvent) -> Finger {
    Finger {
        id: native.which,
        x: native.x,
        y: native.y,
        pressure: native.pressure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_sub_events_carry_their_payload() {
        assert_eq!(
            classify(&NativeEvent::window(window_event::MOVED, 12, -3)),
            Classified::Event(Event::Moved { x: 12, y: -3 })
        );
        assert_eq!(
            classify(&NativeEvent::window(window_event::RESIZED, 640, 480)),
            Classified::Event(Event::Resized {
                width: 640,
                height: 480
            })
        );
        assert_eq!(
            classify(&NativeEvent::window(window_event::CLOSE, 0, 0)),
            Classified::Event(Event::Closed)
        );
    }

    #[test]
    fn input_events_read_codes_and_text() {
        let key = NativeEvent::new(kind::KEY_DOWN).with_code(97).with_which(4);
        assert_eq!(
            classify(&key),
            Classified::Event(Event::KeyDown {
                keycode: 97,
                scancode: 4
            })
        );

        let text = NativeEvent::new(kind::TEXT_INPUT).with_text("é");
        assert_eq!(
            classify(&text),
            Classified::Event(Event::TextInput("é".to_string()))
        );

        let drop = NativeEvent::new(kind::DROP_FILE).with_text("/tmp/a.txt");
        assert_eq!(
            classify(&drop),
            Classified::Event(Event::FileDropped(PathBuf::from("/tmp/a.txt")))
        );
    }

    #[test]
    fn touch_and_devices() {
        let finger = NativeEvent::new(kind::FINGER_DOWN)
            .with_which(7)
            .with_floats(0.5, 0.25, 0.9);
        match classify(&finger) {
            Classified::Event(Event::FingerDown(f)) => {
                assert_eq!(f.id, 7);
                approx::assert_relative_eq!(f.pressure, 0.9);
            }
            other => panic!("unexpected {other:?}"),
        }

        let added = NativeEvent::new(kind::AUDIO_DEVICE_ADDED).with_which(2);
        assert_eq!(
            classify(&added),
            Classified::Event(Event::AudioDeviceAdded(2))
        );
    }

    #[test]
    fn gestures_carry_position_and_deltas() {
        let dollar = NativeEvent::new(kind::DOLLAR_GESTURE)
            .with_which(42)
            .with_data(3, 0)
            .with_floats(0.25, 0.75, 0.0)
            .with_timestamp(1200);
        assert_eq!(
            classify(&dollar),
            Classified::Event(Event::DollarGesture {
                gesture_id: 42,
                x: 0.25,
                y: 0.75,
                fingers: 3,
                timestamp: 1200
            })
        );

        let pinch = NativeEvent::new(kind::MULTI_GESTURE)
            .with_floats(0.5, 0.5, 0.0)
            .with_gesture(-0.1, 0.3);
        match classify(&pinch) {
            Classified::Event(Event::MultiGesture { distance, rotation, .. }) => {
                approx::assert_relative_eq!(distance, -0.1);
                approx::assert_relative_eq!(rotation, 0.3);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn window_address_does_not_change_classification() {
        let handle = NativeHandle::from_raw(9).unwrap();
        let exposed = NativeEvent::window(window_event::EXPOSED, 0, 0);
        assert_eq!(exposed.window, None);
        let addressed = exposed.clone().for_window(handle);
        assert_eq!(addressed.window, Some(handle));
        assert_eq!(classify(&addressed), classify(&exposed));
    }

    #[test]
    fn unknown_tags_are_reported_not_fatal() {
        assert_eq!(
            classify(&NativeEvent::new(0x1234)),
            Classified::Unrecognized {
                kind: 0x1234,
                window_event: 0
            }
        );
        assert_eq!(
            classify(&NativeEvent::window(200, 0, 0)),
            Classified::Unrecognized {
                kind: kind::WINDOW,
                window_event: 200
            }
        );
    }

    #[test]
    fn wake_ups_carry_nothing() {
        assert_eq!(classify(&NativeEvent::new(kind::USER)), Classified::Wake);
        assert_eq!(
            classify(&NativeEvent::window(window_event::NONE, 0, 0)),
            Classified::Wake
        );
    }
}
