//! GLFW backend
//!
//! Wraps `glfw` windows and converts their events into [`NativeEvent`]s.
//! GLFW has no thread-safe way to post an event without the `Glfw` context,
//! so the waker sets a flag that the pump checks between short waits.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use glfw::{Action, Context, WindowEvent};
use slotmap::{new_key_type, Key, KeyData, SlotMap};

use super::{
    GlProfile, GlSettings, IconHandle, NativeHandle, VSync, Wake, WindowBackend,
    WindowDescriptor, WindowFlags,
};
use crate::error::BackendError;
use crate::events::native::{kind, window_event, NativeEvent};
use crate::icon::IconImage;
use crate::window::{Position, Size, WindowMode};

/// How long a single wait may block before the wake flag is checked again
const WAIT_SLICE_SECONDS: f64 = 0.05;

new_key_type! {
    struct WindowKey;
    struct IconKey;
}

struct GlfwWindow {
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, WindowEvent)>,
    cursor: (i32, i32),
    gl: bool,
    /// Position and size to return to when leaving a desktop-covering mode
    windowed_rect: Option<(Position, Size)>,
}

struct FlagWaker(Arc<AtomicBool>);

impl Wake for FlagWaker {
    fn wake(&self) {
        self.0.store(true, Ordering::Release);
    }
}

/// Native backend built on GLFW
pub struct GlfwBackend {
    glfw: glfw::Glfw,
    windows: SlotMap<WindowKey, GlfwWindow>,
    icons: SlotMap<IconKey, glfw::PixelImage>,
    pending: VecDeque<NativeEvent>,
    wake: Arc<AtomicBool>,
}

impl GlfwBackend {
    /// Initialize GLFW
    pub fn new() -> Result<Self, BackendError> {
        let glfw = glfw::init(glfw::fail_on_errors)
            .map_err(|e| BackendError::new("glfw_init", e.to_string()))?;

        log::info!("GLFW initialized: {}", glfw::get_version_string());

        Ok(Self {
            glfw,
            windows: SlotMap::with_key(),
            icons: SlotMap::with_key(),
            pending: VecDeque::new(),
            wake: Arc::new(AtomicBool::new(false)),
        })
    }

    fn entry(&mut self, window: NativeHandle) -> Option<&mut GlfwWindow> {
        let found = self.windows.get_mut(window_key(window));
        if found.is_none() {
            log::warn!("GLFW backend: unknown window {}", window.raw());
        }
        found
    }

    fn collect_events(&mut self) {
        for (key, entry) in &mut self.windows {
            let handle = NativeHandle::from_raw(key.data().as_ffi());
            for (_, event) in glfw::flush_messages(&entry.events) {
                let first = self.pending.len();
                let maximized = entry.window.is_maximized();
                translate(event, &mut entry.cursor, maximized, &mut self.pending);
                for native in self.pending.range_mut(first..) {
                    native.window = handle;
                }
            }
        }
    }

    fn gl_entry(
        &mut self,
        operation: &'static str,
        window: NativeHandle,
    ) -> Result<&mut GlfwWindow, BackendError> {
        let entry = self
            .windows
            .get_mut(window_key(window))
            .ok_or_else(|| missing(operation, window))?;
        if !entry.gl {
            return Err(BackendError::new(operation, "window has no OpenGL context"));
        }
        Ok(entry)
    }

    fn context_hints(&mut self, gl: Option<&GlSettings>) {
        let Some(gl) = gl else {
            self.glfw
                .window_hint(glfw::WindowHint::ClientApi(glfw::ClientApiHint::NoApi));
            return;
        };
        let profile = match gl.profile {
            GlProfile::Core => glfw::OpenGlProfileHint::Core,
            GlProfile::Compatibility => glfw::OpenGlProfileHint::Compat,
        };
        let hints = [
            glfw::WindowHint::ClientApi(glfw::ClientApiHint::OpenGl),
            glfw::WindowHint::ContextVersion(gl.major_version, gl.minor_version),
            glfw::WindowHint::OpenGlProfile(profile),
            glfw::WindowHint::OpenGlForwardCompat(gl.profile == GlProfile::Core),
            glfw::WindowHint::DepthBits(Some(gl.depth_bits)),
            glfw::WindowHint::StencilBits(Some(gl.stencil_bits)),
            glfw::WindowHint::DoubleBuffer(gl.double_buffer),
            glfw::WindowHint::Samples((gl.samples > 0).then_some(gl.samples)),
            glfw::WindowHint::SRgbCapable(gl.srgb),
        ];
        for hint in hints {
            self.glfw.window_hint(hint);
        }
    }

    fn apply_swap_interval(&mut self, vsync: VSync) {
        match vsync.swap_interval() {
            Some(0) => self.glfw.set_swap_interval(glfw::SwapInterval::None),
            Some(interval) => self.glfw.set_swap_interval(glfw::SwapInterval::Sync(interval)),
            None => {}
        }
    }
}

fn window_key(window: NativeHandle) -> WindowKey {
    KeyData::from_ffi(window.raw()).into()
}

fn icon_key(icon: IconHandle) -> IconKey {
    KeyData::from_ffi(icon.raw()).into()
}

fn missing(operation: &'static str, window: NativeHandle) -> BackendError {
    BackendError::new(operation, format!("invalid window {}", window.raw()))
}

fn limit(value: u32) -> Option<u32> {
    (value < Size::UNBOUNDED).then_some(value)
}

/// Convert one GLFW event; `maximized` is the window's state when it arrived
fn translate(
    event: WindowEvent,
    cursor: &mut (i32, i32),
    maximized: bool,
    out: &mut VecDeque<NativeEvent>,
) {
    let window = |sub_event, data1, data2| NativeEvent::window(sub_event, data1, data2);
    match event {
        WindowEvent::Pos(x, y) => out.push_back(window(window_event::MOVED, x, y)),
        WindowEvent::Size(w, h) => {
            out.push_back(window(window_event::RESIZED, w, h));
            out.push_back(window(window_event::SIZE_CHANGED, w, h));
        }
        WindowEvent::Close => out.push_back(window(window_event::CLOSE, 0, 0)),
        WindowEvent::Refresh => out.push_back(window(window_event::EXPOSED, 0, 0)),
        WindowEvent::Focus(true) => out.push_back(window(window_event::FOCUS_GAINED, 0, 0)),
        WindowEvent::Focus(false) => out.push_back(window(window_event::FOCUS_LOST, 0, 0)),
        WindowEvent::Iconify(true) => out.push_back(window(window_event::MINIMIZED, 0, 0)),
        WindowEvent::Maximize(true) => out.push_back(window(window_event::MAXIMIZED, 0, 0)),
        WindowEvent::Iconify(false) if maximized => {
            out.push_back(window(window_event::MAXIMIZED, 0, 0));
        }
        WindowEvent::Iconify(false) | WindowEvent::Maximize(false) => {
            out.push_back(window(window_event::RESTORED, 0, 0));
        }
        WindowEvent::CursorEnter(true) => out.push_back(window(window_event::ENTER, 0, 0)),
        WindowEvent::CursorEnter(false) => out.push_back(window(window_event::LEAVE, 0, 0)),
        WindowEvent::CursorPos(x, y) => {
            *cursor = (x as i32, y as i32);
            out.push_back(NativeEvent::new(kind::MOUSE_MOTION).with_data(cursor.0, cursor.1));
        }
        WindowEvent::MouseButton(button, action, _) => {
            let tag = if action == Action::Release {
                kind::MOUSE_BUTTON_UP
            } else {
                kind::MOUSE_BUTTON_DOWN
            };
            out.push_back(
                NativeEvent::new(tag)
                    .with_code(button as i32 + 1)
                    .with_data(cursor.0, cursor.1),
            );
        }
        WindowEvent::Scroll(x, y) => {
            out.push_back(NativeEvent::new(kind::MOUSE_WHEEL).with_floats(x as f32, y as f32, 0.0));
        }
        WindowEvent::Key(key, scancode, action, _) => {
            let tag = if action == Action::Release {
                kind::KEY_UP
            } else {
                kind::KEY_DOWN
            };
            out.push_back(
                NativeEvent::new(tag)
                    .with_code(key as i32)
                    .with_which(i64::from(scancode)),
            );
        }
        WindowEvent::Char(c) => {
            out.push_back(NativeEvent::new(kind::TEXT_INPUT).with_text(c.to_string()));
        }
        WindowEvent::FileDrop(paths) => {
            out.push_back(NativeEvent::new(kind::DROP_BEGIN));
            for path in paths {
                out.push_back(
                    NativeEvent::new(kind::DROP_FILE).with_text(path.to_string_lossy()),
                );
            }
            out.push_back(NativeEvent::new(kind::DROP_COMPLETE));
        }
        other => log::trace!("Ignoring GLFW event {:?}", other),
    }
}

impl WindowBackend for GlfwBackend {
    fn create_window(
        &mut self,
        descriptor: &WindowDescriptor,
    ) -> Result<NativeHandle, BackendError> {
        let flags = descriptor.flags;
        self.glfw.default_window_hints();
        self.context_hints(descriptor.gl.as_ref());
        self.glfw.window_hint(glfw::WindowHint::Resizable(
            flags.contains(WindowFlags::RESIZABLE),
        ));
        self.glfw
            .window_hint(glfw::WindowHint::Visible(!flags.contains(WindowFlags::HIDDEN)));

        let (width, height) = (descriptor.size.width, descriptor.size.height);
        let (mut window, events) = self
            .glfw
            .create_window(width, height, &descriptor.title, glfw::WindowMode::Windowed)
            .ok_or_else(|| BackendError::new("create_window", "GLFW could not create the window"))?;

        if let Some(position) = descriptor.position {
            window.set_pos(position.x, position.y);
        }
        window.set_all_polling(true);
        if let Some(gl) = descriptor.gl {
            window.make_current();
            self.apply_swap_interval(gl.vsync);
            log::debug!("OpenGL {}.{} context ready", gl.major_version, gl.minor_version);
        }

        let key = self.windows.insert(GlfwWindow {
            window,
            events,
            cursor: (0, 0),
            gl: descriptor.gl.is_some(),
            windowed_rect: None,
        });
        NativeHandle::from_raw(key.data().as_ffi()).ok_or_else(|| {
            self.windows.remove(key);
            BackendError::new("create_window", "slot map produced a null key")
        })
    }

    fn destroy_window(&mut self, window: NativeHandle) {
        if let Some(mut entry) = self.windows.remove(window_key(window)) {
            entry.window.set_should_close(true);
            log::debug!("Destroyed GLFW window {}", window.raw());
        }
    }

    fn window_size(&self, window: NativeHandle) -> Result<Size, BackendError> {
        let entry = self
            .windows
            .get(window_key(window))
            .ok_or_else(|| missing("window_size", window))?;
        let (width, height) = entry.window.get_size();
        Ok(Size::from_native(width, height))
    }

    fn set_window_size(&mut self, window: NativeHandle, size: Size) {
        if let Some(entry) = self.entry(window) {
            let (width, height) = size.to_native();
            entry.window.set_size(width, height);
        }
    }

    fn set_size_limits(&mut self, window: NativeHandle, min: Size, max: Size) {
        if let Some(entry) = self.entry(window) {
            entry.window.set_size_limits(
                Some(min.width),
                Some(min.height),
                limit(max.width),
                limit(max.height),
            );
        }
    }

    fn window_position(&self, window: NativeHandle) -> Result<Position, BackendError> {
        let entry = self
            .windows
            .get(window_key(window))
            .ok_or_else(|| missing("window_position", window))?;
        let (x, y) = entry.window.get_pos();
        Ok(Position::new(x, y))
    }

    fn set_window_position(&mut self, window: NativeHandle, position: Position) {
        if let Some(entry) = self.entry(window) {
            entry.window.set_pos(position.x, position.y);
        }
    }

    fn set_opacity(&mut self, window: NativeHandle, opacity: f32) -> Result<(), BackendError> {
        let entry = self
            .entry(window)
            .ok_or_else(|| missing("set_opacity", window))?;
        entry.window.set_opacity(opacity);
        Ok(())
    }

    fn set_resizable(&mut self, window: NativeHandle, resizable: bool) {
        if let Some(entry) = self.entry(window) {
            entry.window.set_resizable(resizable);
        }
    }

    fn set_fullscreen(&mut self, window: NativeHandle, mode: WindowMode) -> Result<(), BackendError> {
        let desktop = if mode.covers_desktop() {
            Some(self.desktop_resolution()?)
        } else {
            None
        };
        let entry = self
            .windows
            .get_mut(window_key(window))
            .ok_or_else(|| missing("set_fullscreen", window))?;

        if mode.covers_desktop() && entry.windowed_rect.is_none() {
            let (x, y) = entry.window.get_pos();
            let (w, h) = entry.window.get_size();
            entry.windowed_rect = Some((Position::new(x, y), Size::from_native(w, h)));
        }

        match (mode, desktop) {
            (WindowMode::Windowed, _) => {
                let (position, size) = entry
                    .windowed_rect
                    .take()
                    .unwrap_or((Position::default(), Size::from_native(800, 600)));
                entry.window.set_decorated(true);
                entry.window.set_monitor(
                    glfw::WindowMode::Windowed,
                    position.x,
                    position.y,
                    size.width,
                    size.height,
                    None,
                );
                Ok(())
            }
            (WindowMode::Borderless, Some(desktop)) => {
                entry.window.set_decorated(false);
                entry.window.set_monitor(
                    glfw::WindowMode::Windowed,
                    0,
                    0,
                    desktop.width,
                    desktop.height,
                    None,
                );
                Ok(())
            }
            (WindowMode::Fullscreen, Some(desktop)) => {
                let handle = &mut entry.window;
                self.glfw.with_primary_monitor(|_, monitor| match monitor {
                    Some(monitor) => {
                        let refresh = monitor.get_video_mode().map(|m| m.refresh_rate);
                        handle.set_monitor(
                            glfw::WindowMode::FullScreen(monitor),
                            0,
                            0,
                            desktop.width,
                            desktop.height,
                            refresh,
                        );
                        Ok(())
                    }
                    None => Err(BackendError::new("set_fullscreen", "no primary monitor")),
                })
            }
            (_, None) => Err(BackendError::new("set_fullscreen", "desktop size unknown")),
        }
    }

    fn set_title(&mut self, window: NativeHandle, title: &str) {
        if let Some(entry) = self.entry(window) {
            entry.window.set_title(title);
        }
    }

    fn create_icon(&mut self, image: &IconImage) -> Result<IconHandle, BackendError> {
        let pixels: Vec<u32> = bytemuck::pod_collect_to_vec(&image.rgba);
        let key = self.icons.insert(glfw::PixelImage {
            width: image.width,
            height: image.height,
            pixels,
        });
        IconHandle::from_raw(key.data().as_ffi()).ok_or_else(|| {
            self.icons.remove(key);
            BackendError::new("create_icon", "slot map produced a null key")
        })
    }

    fn set_window_icon(&mut self, window: NativeHandle, icon: IconHandle) {
        let Some(image) = self.icons.get(icon_key(icon)) else {
            log::warn!("GLFW backend: unknown icon {}", icon.raw());
            return;
        };
        let image = glfw::PixelImage {
            width: image.width,
            height: image.height,
            pixels: image.pixels.clone(),
        };
        if let Some(entry) = self.entry(window) {
            entry.window.set_icon_from_pixels(vec![image]);
        }
    }

    fn destroy_icon(&mut self, icon: IconHandle) {
        self.icons.remove(icon_key(icon));
    }

    fn minimize(&mut self, window: NativeHandle) {
        if let Some(entry) = self.entry(window) {
            entry.window.iconify();
        }
    }

    fn maximize(&mut self, window: NativeHandle) {
        if let Some(entry) = self.entry(window) {
            entry.window.maximize();
        }
    }

    fn restore(&mut self, window: NativeHandle) {
        if let Some(entry) = self.entry(window) {
            entry.window.restore();
        }
    }

    fn raise(&mut self, window: NativeHandle) {
        if let Some(entry) = self.entry(window) {
            entry.window.show();
            entry.window.focus();
        }
    }

    fn set_swap_interval(&mut self, window: NativeHandle, vsync: VSync) -> Result<(), BackendError> {
        self.gl_entry("set_swap_interval", window)?.window.make_current();
        self.apply_swap_interval(vsync);
        Ok(())
    }

    fn swap_buffers(&mut self, window: NativeHandle) -> Result<(), BackendError> {
        self.gl_entry("swap_buffers", window)?.window.swap_buffers();
        Ok(())
    }

    fn drawable_size(&self, window: NativeHandle) -> Result<Size, BackendError> {
        let entry = self
            .windows
            .get(window_key(window))
            .ok_or_else(|| missing("drawable_size", window))?;
        let (width, height) = entry.window.get_framebuffer_size();
        Ok(Size::from_native(width, height))
    }

    fn desktop_resolution(&mut self) -> Result<Size, BackendError> {
        self.glfw
            .with_primary_monitor(|_, monitor| monitor.and_then(|m| m.get_video_mode()))
            .map(|mode| Size::new(mode.width, mode.height))
            .ok_or_else(|| {
                BackendError::new("desktop_resolution", "primary monitor has no video mode")
            })
    }

    fn wait_event(&mut self) -> NativeEvent {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return event;
            }
            if self.wake.swap(false, Ordering::AcqRel) {
                return NativeEvent::new(kind::USER);
            }
            self.glfw.wait_events_timeout(WAIT_SLICE_SECONDS);
            self.collect_events();
        }
    }

    fn waker(&self) -> Arc<dyn Wake> {
        Arc::new(FlagWaker(Arc::clone(&self.wake)))
    }

    fn shutdown(&mut self) {
        self.windows.clear();
        self.icons.clear();
        self.pending.clear();
        log::info!("GLFW backend shut down");
    }
}
