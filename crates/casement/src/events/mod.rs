//! Typed window events and the observer registry
//!
//! Key principles:
//! - One sum type ([`Event`]) for everything the backend can report
//! - Registration per [`EventType`], so only interested observers are called
//! - Synchronous delivery in registration order; each observer runs to
//!   completion before the next one starts
//! - Registration returns a [`Subscription`] token used for removal

pub mod native;

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::rc::Rc;

/// A touch point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Finger {
    /// Unique identifier of the finger for the duration of the touch
    pub id: i64,
    /// Normalized horizontal position
    pub x: f32,
    /// Normalized vertical position
    pub y: f32,
    /// Pressure in `[0, 1]`
    pub pressure: f32,
}

/// Everything the native backend can report, strongly typed
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    // Window lifecycle
    /// The native window was created and the pump is about to start
    Loaded,
    /// Window became visible
    Shown,
    /// Window was hidden
    Hidden,
    /// Window was exposed and should be redrawn
    Exposed,
    /// Window moved to a new position
    Moved {
        /// New horizontal position
        x: i32,
        /// New vertical position
        y: i32,
    },
    /// User resized the window
    Resized {
        /// New width
        width: i32,
        /// New height
        height: i32,
    },
    /// Window size changed; carries the size read back from the backend
    SizeChanged {
        /// New width
        width: i32,
        /// New height
        height: i32,
    },
    /// Window was minimized
    Minimized,
    /// Window was maximized
    Maximized,
    /// Window was restored from minimized or maximized
    Restored,
    /// Cursor entered the window
    Enter,
    /// Cursor left the window
    Leave,
    /// Window gained keyboard focus
    FocusGained,
    /// Window lost keyboard focus
    FocusLost,
    /// Window is being offered focus
    TakeFocus,
    /// Hit test performed on the window
    HitTest,
    /// Window is closing; the native handle is still valid while this is delivered
    Closed,

    // Input
    /// Key pressed
    KeyDown {
        /// Virtual key code
        keycode: i32,
        /// Physical scancode
        scancode: i64,
    },
    /// Key released
    KeyUp {
        /// Virtual key code
        keycode: i32,
        /// Physical scancode
        scancode: i64,
    },
    /// IME composition text
    TextEditing(String),
    /// Finalized text input
    TextInput(String),
    /// Keyboard layout changed
    KeymapChanged,
    /// Mouse moved
    MouseMotion {
        /// Cursor x in window coordinates
        x: i32,
        /// Cursor y in window coordinates
        y: i32,
    },
    /// Mouse button pressed
    MouseButtonDown {
        /// Button index, 1 = left
        button: i32,
        /// Cursor x
        x: i32,
        /// Cursor y
        y: i32,
    },
    /// Mouse button released
    MouseButtonUp {
        /// Button index, 1 = left
        button: i32,
        /// Cursor x
        x: i32,
        /// Cursor y
        y: i32,
    },
    /// Mouse wheel scrolled
    MouseWheel {
        /// Horizontal amount, positive to the right
        x: f32,
        /// Vertical amount, positive away from the user
        y: f32,
    },
    /// Finger touched the screen
    FingerDown(Finger),
    /// Finger lifted
    FingerUp(Finger),
    /// Finger moved
    FingerMotion(Finger),
    /// A recorded gesture was recognized
    DollarGesture {
        /// Identifier of the recognized gesture
        gesture_id: i64,
        /// Normalized center x
        x: f32,
        /// Normalized center y
        y: f32,
        /// Fingers used
        fingers: u32,
        /// Backend timestamp in milliseconds
        timestamp: u32,
    },
    /// Several fingers pinched or rotated
    MultiGesture {
        /// Normalized center x
        x: f32,
        /// Normalized center y
        y: f32,
        /// Change in distance between the fingers
        distance: f32,
        /// Rotation in radians
        rotation: f32,
    },
    /// Controller axis moved
    ControllerAxisMotion {
        /// Controller instance id
        which: i32,
        /// Axis index
        axis: i32,
        /// Axis value
        value: i32,
    },
    /// Controller button pressed
    ControllerButtonDown {
        /// Controller instance id
        which: i32,
        /// Button index
        button: i32,
    },
    /// Controller button released
    ControllerButtonUp {
        /// Controller instance id
        which: i32,
        /// Button index
        button: i32,
    },
    /// Joystick axis moved
    JoystickAxisMotion {
        /// Joystick instance id
        which: i32,
        /// Axis index
        axis: i32,
        /// Axis value
        value: i32,
    },
    /// Joystick button pressed
    JoystickButtonDown {
        /// Joystick instance id
        which: i32,
        /// Button index
        button: i32,
    },
    /// Joystick button released
    JoystickButtonUp {
        /// Joystick instance id
        which: i32,
        /// Button index
        button: i32,
    },

    // Application
    /// Quit requested by the user or the system
    Quit,
    /// OS is terminating the application
    AppTerminating,
    /// OS is low on memory
    AppLowMemory,
    /// Application is about to enter the background
    AppWillEnterBackground,
    /// Application entered the background
    AppDidEnterBackground,
    /// Application is about to enter the foreground
    AppWillEnterForeground,
    /// Application entered the foreground
    AppDidEnterForeground,
    /// User locale changed
    LocaleChanged,
    /// Clipboard contents changed
    ClipboardUpdated,
    /// Drag and drop started
    DropBegin,
    /// Drag and drop finished
    DropComplete,
    /// A file was dropped on the window
    FileDropped(PathBuf),
    /// Render targets were reset
    RenderTargetsReset,
    /// Render device was reset
    RenderDeviceReset,

    // Device hot-plug
    /// Audio device connected
    AudioDeviceAdded(i32),
    /// Audio device disconnected
    AudioDeviceRemoved(i32),
    /// Controller connected
    ControllerDeviceAdded(i32),
    /// Controller disconnected
    ControllerDeviceRemoved(i32),
    /// Controller mapping updated
    ControllerDeviceRemapped(i32),
    /// Joystick connected
    JoystickDeviceAdded(i32),
    /// Joystick disconnected
    JoystickDeviceRemoved(i32),
}

/// Broad grouping of events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    /// Window lifecycle and geometry
    Window,
    /// Keyboard, mouse, touch, controller and joystick input
    Input,
    /// Application lifecycle and system notifications
    Application,
    /// Device connection changes
    Device,
}

/// Event type identification, used to key subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum EventType {
    Loaded,
    Shown,
    Hidden,
    Exposed,
    Moved,
    Resized,
    SizeChanged,
    Minimized,
    Maximized,
    Restored,
    Enter,
    Leave,
    FocusGained,
    FocusLost,
    TakeFocus,
    HitTest,
    Closed,
    KeyDown,
    KeyUp,
    TextEditing,
    TextInput,
    KeymapChanged,
    MouseMotion,
    MouseButtonDown,
    MouseButtonUp,
    MouseWheel,
    FingerDown,
    FingerUp,
    FingerMotion,
    DollarGesture,
    MultiGesture,
    ControllerAxisMotion,
    ControllerButtonDown,
    ControllerButtonUp,
    JoystickAxisMotion,
    JoystickButtonDown,
    JoystickButtonUp,
    Quit,
    AppTerminating,
    AppLowMemory,
    AppWillEnterBackground,
    AppDidEnterBackground,
    AppWillEnterForeground,
    AppDidEnterForeground,
    LocaleChanged,
    ClipboardUpdated,
    DropBegin,
    DropComplete,
    FileDropped,
    RenderTargetsReset,
    RenderDeviceReset,
    AudioDeviceAdded,
    AudioDeviceRemoved,
    ControllerDeviceAdded,
    ControllerDeviceRemoved,
    ControllerDeviceRemapped,
    JoystickDeviceAdded,
    JoystickDeviceRemoved,
}

impl Event {
    /// Discriminant used for subscriptions
    pub const fn event_type(&self) -> EventType {
        match self {
            Self::Loaded => EventType::Loaded,
            Self::Shown => EventType::Shown,
            Self::Hidden => EventType::Hidden,
            Self::Exposed => EventType::Exposed,
            Self::Moved { .. } => EventType::Moved,
            Self::Resized { .. } => EventType::Resized,
            Self::SizeChanged { .. } => EventType::SizeChanged,
            Self::Minimized => EventType::Minimized,
            Self::Maximized => EventType::Maximized,
            Self::Restored => EventType::Restored,
            Self::Enter => EventType::Enter,
            Self::Leave => EventType::Leave,
            Self::FocusGained => EventType::FocusGained,
            Self::FocusLost => EventType::FocusLost,
            Self::TakeFocus => EventType::TakeFocus,
            Self::HitTest => EventType::HitTest,
            Self::Closed => EventType::Closed,
            Self::KeyDown { .. } => EventType::KeyDown,
            Self::KeyUp { .. } => EventType::KeyUp,
            Self::TextEditing(_) => EventType::TextEditing,
            Self::TextInput(_) => EventType::TextInput,
            Self::KeymapChanged => EventType::KeymapChanged,
            Self::MouseMotion { .. } => EventType::MouseMotion,
            Self::MouseButtonDown { .. } => EventType::MouseButtonDown,
            Self::MouseButtonUp { .. } => EventType::MouseButtonUp,
            Self::MouseWheel { .. } => EventType::MouseWheel,
            Self::FingerDown(_) => EventType::FingerDown,
            Self::FingerUp(_) => EventType::FingerUp,
            Self::FingerMotion(_) => EventType::FingerMotion,
            Self::DollarGesture { .. } => EventType::DollarGesture,
            Self::MultiGesture { .. } => EventType::MultiGesture,
            Self::ControllerAxisMotion { .. } => EventType::ControllerAxisMotion,
            Self::ControllerButtonDown { .. } => EventType::ControllerButtonDown,
            Self::ControllerButtonUp { .. } => EventType::ControllerButtonUp,
            Self::JoystickAxisMotion { .. } => EventType::JoystickAxisMotion,
            Self::JoystickButtonDown { .. } => EventType::JoystickButtonDown,
            Self::JoystickButtonUp { .. } => EventType::JoystickButtonUp,
            Self::Quit => EventType::Quit,
            Self::AppTerminating => EventType::AppTerminating,
            Self::AppLowMemory => EventType::AppLowMemory,
            Self::AppWillEnterBackground => EventType::AppWillEnterBackground,
            Self::AppDidEnterBackground => EventType::AppDidEnterBackground,
            Self::AppWillEnterForeground => EventType::AppWillEnterForeground,
            Self::AppDidEnterForeground => EventType::AppDidEnterForeground,
            Self::LocaleChanged => EventType::LocaleChanged,
            Self::ClipboardUpdated => EventType::ClipboardUpdated,
            Self::DropBegin => EventType::DropBegin,
            Self::DropComplete => EventType::DropComplete,
            Self::FileDropped(_) => EventType::FileDropped,
            Self::RenderTargetsReset => EventType::RenderTargetsReset,
            Self::RenderDeviceReset => EventType::RenderDeviceReset,
            Self::AudioDeviceAdded(_) => EventType::AudioDeviceAdded,
            Self::AudioDeviceRemoved(_) => EventType::AudioDeviceRemoved,
            Self::ControllerDeviceAdded(_) => EventType::ControllerDeviceAdded,
            Self::ControllerDeviceRemoved(_) => EventType::ControllerDeviceRemoved,
            Self::ControllerDeviceRemapped(_) => EventType::ControllerDeviceRemapped,
            Self::JoystickDeviceAdded(_) => EventType::JoystickDeviceAdded,
            Self::JoystickDeviceRemoved(_) => EventType::JoystickDeviceRemoved,
        }
    }

    /// Broad category of this event
    pub const fn category(&self) -> EventCategory {
        self.event_type().category()
    }
}

impl EventType {
    /// Broad category of this event type
    pub const fn category(self) -> EventCategory {
        match self {
            Self::Loaded
            | Self::Shown
            | Self::Hidden
            | Self::Exposed
            | Self::Moved
            | Self::Resized
            | Self::SizeChanged
            | Self::Minimized
            | Self::Maximized
            | Self::Restored
            | Self::Enter
            | Self::Leave
            | Self::FocusGained
            | Self::FocusLost
            | Self::TakeFocus
            | Self::HitTest
            | Self::Closed => EventCategory::Window,

            Self::KeyDown
            | Self::KeyUp
            | Self::TextEditing
            | Self::TextInput
            | Self::KeymapChanged
            | Self::MouseMotion
            | Self::MouseButtonDown
            | Self::MouseButtonUp
            | Self::MouseWheel
            | Self::FingerDown
            | Self::FingerUp
            | Self::FingerMotion
            | Self::DollarGesture
            | Self::MultiGesture
            | Self::ControllerAxisMotion
            | Self::ControllerButtonDown
            | Self::ControllerButtonUp
            | Self::JoystickAxisMotion
            | Self::JoystickButtonDown
            | Self::JoystickButtonUp => EventCategory::Input,

            Self::Quit
            | Self::AppTerminating
            | Self::AppLowMemory
            | Self::AppWillEnterBackground
            | Self::AppDidEnterBackground
            | Self::AppWillEnterForeground
            | Self::AppDidEnterForeground
            | Self::LocaleChanged
            | Self::ClipboardUpdated
            | Self::DropBegin
            | Self::DropComplete
            | Self::FileDropped
            | Self::RenderTargetsReset
            | Self::RenderDeviceReset => EventCategory::Application,

            Self::AudioDeviceAdded
            | Self::AudioDeviceRemoved
            | Self::ControllerDeviceAdded
            | Self::ControllerDeviceRemoved
            | Self::ControllerDeviceRemapped
            | Self::JoystickDeviceAdded
            | Self::JoystickDeviceRemoved => EventCategory::Device,
        }
    }
}

/// Token returned by [`EventSystem::subscribe`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    id: u64,
    event_type: Option<EventType>,
}

impl Subscription {
    /// Event type this subscription listens to, `None` for catch-all observers
    pub const fn event_type(&self) -> Option<EventType> {
        self.event_type
    }
}

/// Observer callback; receives the dispatch context and the event
pub type Handler<C> = Box<dyn FnMut(&mut C, &Event)>;

/// A registered observer.
///
/// Shared so dispatch can snapshot the observer list and run callbacks that
/// mutate the registry (or the context owning it) without holding a borrow.
pub struct Listener<C> {
    id: u64,
    active: Cell<bool>,
    handler: RefCell<Handler<C>>,
    deferred: RefCell<VecDeque<Event>>,
}

impl<C> Listener<C> {
    /// Run the handler unless it was unsubscribed
    ///
    /// An event raised while this observer's own handler is still running
    /// (for example a `Closed` caused by the handler closing the window) is
    /// queued and delivered, in order, as soon as that handler returns.
    pub fn invoke(&self, context: &mut C, event: &Event) {
        if !self.active.get() {
            return;
        }
        let Ok(mut handler) = self.handler.try_borrow_mut() else {
            log::debug!(
                "Observer {} busy, deferring {:?}",
                self.id,
                event.event_type()
            );
            self.deferred.borrow_mut().push_back(event.clone());
            return;
        };

        (*handler)(context, event);
        loop {
            let next = self.deferred.borrow_mut().pop_front();
            let Some(next) = next else { break };
            if !self.active.get() {
                self.deferred.borrow_mut().clear();
                break;
            }
            (*handler)(context, &next);
        }
    }
}

/// Observer registry keyed by event type
pub struct EventSystem<C> {
    handlers: HashMap<EventType, Vec<Rc<Listener<C>>>>,
    catch_all: Vec<Rc<Listener<C>>>,
    next_id: u64,
}

impl<C> EventSystem<C> {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            catch_all: Vec::new(),
            next_id: 1,
        }
    }

    fn listener(&mut self, handler: Handler<C>) -> Rc<Listener<C>> {
        let id = self.next_id;
        self.next_id += 1;
        Rc::new(Listener {
            id,
            active: Cell::new(true),
            handler: RefCell::new(handler),
            deferred: RefCell::new(VecDeque::new()),
        })
    }

    /// Register an observer for one event type
    pub fn subscribe(&mut self, event_type: EventType, handler: Handler<C>) -> Subscription {
        let listener = self.listener(handler);
        let id = listener.id;
        self.handlers.entry(event_type).or_default().push(listener);
        Subscription {
            id,
            event_type: Some(event_type),
        }
    }

    /// Register an observer for every event
    pub fn subscribe_all(&mut self, handler: Handler<C>) -> Subscription {
        let listener = self.listener(handler);
        let id = listener.id;
        self.catch_all.push(listener);
        Subscription {
            id,
            event_type: None,
        }
    }

    /// Remove an observer; returns false if it was not registered
    ///
    /// Safe to call from inside a callback, including the observer's own: a
    /// removed observer is never invoked again, even for an event whose
    /// delivery is already in progress.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let list = match subscription.event_type {
            Some(event_type) => match self.handlers.get_mut(&event_type) {
                Some(list) => list,
                None => return false,
            },
            None => &mut self.catch_all,
        };

        match list.iter().position(|l| l.id == subscription.id) {
            Some(index) => {
                list.remove(index).active.set(false);
                true
            }
            None => false,
        }
    }

    /// Observers for an event type, in delivery order: typed observers first
    /// (in registration order), then catch-all observers.
    pub fn listeners(&self, event_type: EventType) -> Vec<Rc<Listener<C>>> {
        self.handlers
            .get(&event_type)
            .into_iter()
            .flatten()
            .chain(self.catch_all.iter())
            .cloned()
            .collect()
    }

    /// Deliver an event to every interested observer
    pub fn notify(&self, context: &mut C, event: &Event) {
        for listener in self.listeners(event.event_type()) {
            listener.invoke(context, event);
        }
    }

    /// Number of observers registered for an event type (excluding catch-all)
    pub fn handler_count(&self, event_type: EventType) -> usize {
        self.handlers.get(&event_type).map_or(0, Vec::len)
    }

    /// Remove every observer
    pub fn clear(&mut self) {
        for listener in self.handlers.values().flatten().chain(&self.catch_all) {
            listener.active.set(false);
        }
        self.handlers.clear();
        self.catch_all.clear();
    }
}

impl<C> Default for EventSystem<C> {
    fn default() -> Self {
        Self::new()
    }
}
