//! Linux virtual pointer via uinput.
//!
//! Registers a synthetic mouse with the kernel input subsystem using the
//! `evdev` crate's [`VirtualDeviceBuilder`].  Every application on the host,
//! the X server and Wayland compositors included, sees it as ordinary
//! hardware.
//!
//! # What is uinput? (for beginners)
//!
//! `/dev/uinput` lets a user-space process create an input device and then
//! write `input_event` records into it.  A device declares its capabilities
//! up front; here that is two keys (`BTN_LEFT`, `BTN_RIGHT`) and two relative
//! axes (`REL_X`, `REL_Y`).  Events are grouped into packets by
//! `SYN_REPORT`: consumers only act on a packet once its `SYN_REPORT` arrives.
//!
//! # Batching
//!
//! [`PointerSink::emit_button`] and [`PointerSink::emit_motion`] only queue
//! events.  [`PointerSink::sync`] writes the queue with
//! `VirtualDevice::emit`, which appends the `SYN_REPORT` itself, so each
//! barrier maps to exactly one packet.  The queue is emptied even when the
//! write fails, so a rejected packet is dropped instead of being merged into
//! the next one.
//!
//! # Permissions
//!
//! Opening `/dev/uinput` normally requires root or membership of a group
//! granted access by a udev rule.  Without it the constructor fails with an
//! `EmulationError::Device` and the bridge does not start.

use std::io;
use std::sync::Mutex;

use evdev::{
    uinput::{VirtualDevice, VirtualDeviceBuilder},
    AttributeSet, BusType, EventType, InputEvent, InputId, Key, RelativeAxisType,
};
use phonemouse_core::MouseButton;
use tracing::{debug, info};

use crate::application::emulate_input::{EmulationError, PointerSink};

/// Name the device is registered under (visible in `libinput list-devices`).
pub const DEVICE_NAME: &str = "Bluetooth Phone Mouse";

const DEVICE_VERSION: u16 = 1;

struct Pending {
    device: VirtualDevice,
    queued: Vec<InputEvent>,
}

/// uinput-backed implementation of [`PointerSink`].
///
/// Dropping it closes the uinput file descriptor, which unregisters the
/// device.
pub struct UinputPointer {
    inner: Mutex<Pending>,
}

impl UinputPointer {
    /// Registers the virtual pointing device.
    ///
    /// # Errors
    ///
    /// Returns `EmulationError::Device` if `/dev/uinput` cannot be opened or
    /// the kernel rejects the device description.
    pub fn new() -> Result<Self, EmulationError> {
        let mut keys = AttributeSet::<Key>::new();
        keys.insert(Key::BTN_LEFT);
        keys.insert(Key::BTN_RIGHT);

        let mut axes = AttributeSet::<RelativeAxisType>::new();
        axes.insert(RelativeAxisType::REL_X);
        axes.insert(RelativeAxisType::REL_Y);

        let device = VirtualDeviceBuilder::new()?
            .name(DEVICE_NAME)
            .input_id(InputId::new(BusType::BUS_BLUETOOTH, 0, 0, DEVICE_VERSION))
            .with_keys(&keys)?
            .with_relative_axes(&axes)?
            .build()?;

        info!("registered virtual pointer \"{DEVICE_NAME}\"");
        Ok(Self {
            inner: Mutex::new(Pending {
                device,
                queued: Vec::with_capacity(8),
            }),
        })
    }

    fn with_pending<T>(
        &self,
        f: impl FnOnce(&mut Pending) -> Result<T, EmulationError>,
    ) -> Result<T, EmulationError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| EmulationError::Platform("uinput device lock poisoned".into()))?;
        f(&mut *guard)
    }
}

/// Hands the queued events to `write` as one packet and empties the queue,
/// whatever `write` returns.
fn flush_packet(
    queued: &mut Vec<InputEvent>,
    write: impl FnOnce(&[InputEvent]) -> io::Result<()>,
) -> io::Result<()> {
    let result = write(queued.as_slice());
    queued.clear();
    result
}

fn key_for(button: MouseButton) -> Key {
    match button {
        MouseButton::Left => Key::BTN_LEFT,
        MouseButton::Right => Key::BTN_RIGHT,
    }
}

impl PointerSink for UinputPointer {
    fn emit_button(&self, button: MouseButton, pressed: bool) -> Result<(), EmulationError> {
        let event = InputEvent::new(EventType::KEY, key_for(button).code(), i32::from(pressed));
        self.with_pending(|p| {
            p.queued.push(event);
            Ok(())
        })
    }

    fn emit_motion(&self, dx: i32, dy: i32) -> Result<(), EmulationError> {
        self.with_pending(|p| {
            // The input core drops zero-valued relative events anyway.
            if dx != 0 {
                p.queued
                    .push(InputEvent::new(EventType::RELATIVE, RelativeAxisType::REL_X.0, dx));
            }
            if dy != 0 {
                p.queued
                    .push(InputEvent::new(EventType::RELATIVE, RelativeAxisType::REL_Y.0, dy));
            }
            Ok(())
        })
    }

    fn sync(&self) -> Result<(), EmulationError> {
        self.with_pending(|p| {
            let Pending { device, queued } = p;
            flush_packet(queued, |events| device.emit(events))?;
            Ok(())
        })
    }
}

impl Drop for UinputPointer {
    fn drop(&mut self) {
        debug!("unregistering virtual pointer \"{DEVICE_NAME}\"");
    }
}
