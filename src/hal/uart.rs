//! Interrupt-driven hardware UART ports.
//!
//! RX bypasses the IDF UART driver: a custom interrupt handler drains
//! the hardware FIFO straight into the lock-free ring and gives the
//! port's wakeup semaphore once per invocation. TX writes the FIFO
//! directly under a mutex, busy-retrying while it is full.

use core::ffi::c_void;
use core::ptr;
use core::sync::atomic::Ordering;

use esp_idf_svc::sys;

use super::{create_tx_mutex, lock, unlock, RxShared};
use crate::config::{UART0_PINS, UART1_PINS, UART_BAUD_RATE};
use crate::transport::{Serial, SerialDevice, TransportError};

/// UART interrupt status bits (UART_INT_CLR_REG layout).
const RXFIFO_FULL_INT: u32 = 1 << 0;
const RXFIFO_TOUT_INT: u32 = 1 << 8;

/// Hardware FIFO depth on all supported chips.
const TX_FIFO_DEPTH: u32 = 128;

/// One hardware UART bound to a shared RX state block.
pub struct UartPort {
    device: SerialDevice,
    state: &'static RxShared,
    regs: *mut sys::uart_dev_t,
    tx_mutex: sys::QueueHandle_t,
}

// SAFETY: register access is confined to the ISR (RX side) and the
// mutex-guarded TX path; the ring itself is SPSC-safe.
unsafe impl Send for UartPort {}
unsafe impl Sync for UartPort {}

impl UartPort {
    /// Configure the peripheral, register the RX interrupt handler and
    /// bind it to `state`.
    ///
    /// `state` must be a `static`: the interrupt controller keeps a raw
    /// pointer to it for the lifetime of the process.
    pub fn install(
        device: SerialDevice,
        state: &'static RxShared,
    ) -> Result<Self, TransportError> {
        let (port_num, pins, intr_source, regs) = match device {
            SerialDevice::Uart0 => (
                0,
                UART0_PINS,
                sys::periph_interrupt_t_ETS_UART0_INTR_SOURCE,
                sys::DR_REG_UART_BASE as *mut sys::uart_dev_t,
            ),
            SerialDevice::Uart1 => (
                1,
                UART1_PINS,
                sys::periph_interrupt_t_ETS_UART1_INTR_SOURCE,
                sys::DR_REG_UART1_BASE as *mut sys::uart_dev_t,
            ),
            SerialDevice::UsbSerial => return Err(TransportError::InvalidDevice),
        };

        state.init_sem()?;
        state.regs.store(regs as *mut c_void, Ordering::Release);
        let tx_mutex = create_tx_mutex()?;

        let cfg = sys::uart_config_t {
            baud_rate: UART_BAUD_RATE as i32,
            data_bits: sys::uart_word_length_t_UART_DATA_8_BITS,
            parity: sys::uart_parity_t_UART_PARITY_DISABLE,
            stop_bits: sys::uart_stop_bits_t_UART_STOP_BITS_1,
            flow_ctrl: sys::uart_hw_flowcontrol_t_UART_HW_FLOWCTRL_DISABLE,
            ..Default::default()
        };

        // SAFETY: one-time peripheral bring-up with a valid config and
        // pin assignment for this port.
        unsafe {
            check(sys::uart_param_config(port_num, &cfg))?;
            check(sys::uart_set_pin(
                port_num,
                pins.0 as i32,
                pins.1 as i32,
                sys::UART_PIN_NO_CHANGE,
                sys::UART_PIN_NO_CHANGE,
            ))?;

            // Hand RX to our own handler; `state` outlives the
            // registration (it is 'static).
            check(sys::esp_intr_alloc(
                intr_source as i32,
                0,
                Some(uart_rx_isr),
                state as *const RxShared as *mut c_void,
                ptr::null_mut(),
            ))?;

            // Interrupt on every received byte plus idle timeout.
            check(sys::uart_set_rx_full_threshold(port_num, 1))?;
            check(sys::uart_set_rx_timeout(port_num, 2))?;
            check(sys::uart_enable_rx_intr(port_num))?;
        }

        Ok(Self {
            device,
            state,
            regs,
            tx_mutex,
        })
    }

    /// Park the calling task until RX data arrives or `ticks` elapse.
    pub fn wait_rx(&self, ticks: sys::TickType_t) -> bool {
        self.state.wait(ticks)
    }
}

impl Serial for UartPort {
    fn write(&self, data: &[u8]) -> Result<usize, TransportError> {
        lock(self.tx_mutex);

        for &b in data {
            // SAFETY: TX registers are only touched here, under the
            // mutex held above.
            unsafe {
                // Busy-retry while the FIFO is full; no timeout, the
                // peripheral always drains at line rate.
                while tx_fifo_count(self.regs) >= TX_FIFO_DEPTH {}
                ptr::write_volatile(ptr::addr_of_mut!((*self.regs).fifo) as *mut u32, b as u32);
            }
        }

        unlock(self.tx_mutex);
        Ok(data.len())
    }

    fn read(&self, out: &mut [u8]) -> usize {
        self.state.ring().pop(out)
    }

    fn bytes_available(&self) -> usize {
        self.state.ring().available()
    }

    fn device(&self) -> SerialDevice {
        self.device
    }
}

#[inline]
unsafe fn tx_fifo_count(regs: *mut sys::uart_dev_t) -> u32 {
    (*regs).status.txfifo_cnt()
}

/// RX interrupt handler.
///
/// Runs in interrupt context: drains the hardware FIFO into the ring
/// (never blocks, overwrites the oldest byte when full), clears the
/// interrupt and gives the wakeup semaphore exactly once.
unsafe extern "C" fn uart_rx_isr(arg: *mut c_void) {
    let state = &*(arg as *const RxShared);
    let regs = state.regs.load(Ordering::Relaxed) as *mut sys::uart_dev_t;
    if regs.is_null() {
        return;
    }

    while (*regs).status.rxfifo_cnt() != 0 {
        let b = ptr::read_volatile(ptr::addr_of!((*regs).fifo) as *const u32) as u8;
        state.ring().push_from_isr(b);
    }

    ptr::write_volatile(
        ptr::addr_of_mut!((*regs).int_clr) as *mut u32,
        RXFIFO_FULL_INT | RXFIFO_TOUT_INT,
    );

    state.notify_from_isr();
}

fn check(err: sys::esp_err_t) -> Result<(), TransportError> {
    if err == sys::ESP_OK {
        Ok(())
    } else {
        Err(TransportError::Hardware(err))
    }
}
