//! USB Serial/JTAG console port.
//!
//! The ROM/driver owns the USB interrupt on this peripheral, so the
//! producer side here is a service pump: [`UsbSerialPort::service_rx`]
//! moves whatever the driver has buffered into the shared ring and
//! signals the session task. Call it from the driver's event loop or a
//! dedicated service task.

use esp_idf_svc::sys;

use super::{create_tx_mutex, lock, unlock, RxShared};
use crate::transport::{Serial, SerialDevice, TransportError};

/// Driver-side buffering, independent of the shared ring.
const DRIVER_BUF_SIZE: u32 = 256;

pub struct UsbSerialPort {
    state: &'static RxShared,
    tx_mutex: sys::QueueHandle_t,
}

// SAFETY: the driver API is task-safe, TX is serialized by the mutex
// and the ring is SPSC-safe.
unsafe impl Send for UsbSerialPort {}
unsafe impl Sync for UsbSerialPort {}

impl UsbSerialPort {
    /// Install the USB Serial/JTAG driver and bind the port to `state`.
    pub fn install(state: &'static RxShared) -> Result<Self, TransportError> {
        state.init_sem()?;
        let tx_mutex = create_tx_mutex()?;

        let mut cfg = sys::usb_serial_jtag_driver_config_t {
            tx_buffer_size: DRIVER_BUF_SIZE,
            rx_buffer_size: DRIVER_BUF_SIZE,
        };

        // SAFETY: one-time driver install with a valid config.
        let err = unsafe { sys::usb_serial_jtag_driver_install(&mut cfg) };
        if err != sys::ESP_OK {
            return Err(TransportError::Hardware(err));
        }

        Ok(Self { state, tx_mutex })
    }

    /// Drain the driver's RX buffer into the shared ring.
    ///
    /// Returns the number of bytes moved; signals the session task
    /// once when anything arrived.
    pub fn service_rx(&self) -> usize {
        let mut chunk = [0u8; 64];
        let mut moved = 0;

        loop {
            // SAFETY: valid buffer, zero timeout keeps this a poll.
            let n = unsafe {
                sys::usb_serial_jtag_read_bytes(
                    chunk.as_mut_ptr() as *mut core::ffi::c_void,
                    chunk.len() as u32,
                    0,
                )
            };
            if n <= 0 {
                break;
            }
            for &b in &chunk[..n as usize] {
                self.state.ring().push_from_isr(b);
            }
            moved += n as usize;
        }

        if moved > 0 {
            self.state.notify();
        }
        moved
    }

    /// Park the calling task until RX data arrives or `ticks` elapse.
    pub fn wait_rx(&self, ticks: sys::TickType_t) -> bool {
        self.state.wait(ticks)
    }
}

impl Serial for UsbSerialPort {
    fn write(&self, data: &[u8]) -> Result<usize, TransportError> {
        lock(self.tx_mutex);

        let mut written = 0;
        while written < data.len() {
            let rest = &data[written..];
            // SAFETY: valid slice; blocks until the driver accepts it.
            let n = unsafe {
                sys::usb_serial_jtag_write_bytes(
                    rest.as_ptr() as *const core::ffi::c_void,
                    rest.len() as u32,
                    super::PORT_MAX_DELAY,
                )
            };
            if n <= 0 {
                unlock(self.tx_mutex);
                return Err(TransportError::NotReady);
            }
            written += n as usize;
        }

        unlock(self.tx_mutex);
        Ok(written)
    }

    fn read(&self, out: &mut [u8]) -> usize {
        self.state.ring().pop(out)
    }

    fn bytes_available(&self) -> usize {
        self.state.ring().available()
    }

    fn device(&self) -> SerialDevice {
        SerialDevice::UsbSerial
    }
}
