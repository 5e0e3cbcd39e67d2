//! ESP-IDF hardware bindings.
//!
//! Thin wrappers around the ROM/driver APIs; protocol and concurrency
//! logic stays in the portable core modules. Compiled only for
//! `target_os = "espidf"`.

use core::ffi::c_void;
use core::ptr;
use core::sync::atomic::{AtomicPtr, Ordering};

use esp_idf_svc::sys;

use crate::config::RX_RING_SIZE;
use crate::ring::RxRing;
use crate::transport::TransportError;

pub mod platform;
pub mod uart;
pub mod usb;

pub use platform::EspPlatform;
pub use uart::UartPort;
pub use usb::UsbSerialPort;

// FreeRTOS constants the bindings expose only as C macros.
const QUEUE_TYPE_MUTEX: u8 = 1;
const QUEUE_TYPE_BINARY_SEMAPHORE: u8 = 3;
const SEND_TO_BACK: sys::BaseType_t = 0;
const PORT_MAX_DELAY: sys::TickType_t = 0xFFFF_FFFF;

/// Per-port state shared with the RX producer context.
///
/// Lives in a `static` owned by the embedding application; the ISR (or
/// driver callback path) reaches it through the registered context
/// pointer.
pub struct RxShared {
    ring: RxRing<RX_RING_SIZE>,
    /// Binary "data available" semaphore (FreeRTOS queue handle).
    /// Saturates on give: repeated ISR firings before the consumer
    /// wakes collapse into one pending signal.
    sem: AtomicPtr<c_void>,
    /// UART register block, null for non-UART producers.
    regs: AtomicPtr<c_void>,
}

// SAFETY: the ring is SPSC-safe, the pointer fields are atomics and
// the handles they hold are only used through thread-safe FreeRTOS
// calls.
unsafe impl Sync for RxShared {}

impl RxShared {
    pub const fn new() -> Self {
        Self {
            ring: RxRing::new(),
            sem: AtomicPtr::new(ptr::null_mut()),
            regs: AtomicPtr::new(ptr::null_mut()),
        }
    }

    #[inline]
    pub fn ring(&self) -> &RxRing<RX_RING_SIZE> {
        &self.ring
    }

    /// Release the "data available" signal from task context.
    pub fn notify(&self) {
        let sem = self.sem.load(Ordering::Acquire);
        if !sem.is_null() {
            // SAFETY: handle was created in init and is never deleted.
            unsafe {
                sys::xQueueGenericSend(sem as _, ptr::null(), 0, SEND_TO_BACK);
            }
        }
    }

    /// Release the signal from interrupt context; yields if a higher
    /// priority task was woken.
    ///
    /// # Safety
    ///
    /// Interrupt context only.
    pub unsafe fn notify_from_isr(&self) {
        let sem = self.sem.load(Ordering::Acquire);
        if sem.is_null() {
            return;
        }

        let mut higher_prio_woken: sys::BaseType_t = 0;
        // Semaphore give (xSemaphoreGiveFromISR is a macro over this).
        sys::xQueueGenericSendFromISR(sem as _, ptr::null(), &mut higher_prio_woken, SEND_TO_BACK);
        if higher_prio_woken != 0 {
            sys::vPortYield();
        }
    }

    /// Park the calling task until the producer signals data or the
    /// timeout elapses. Returns `true` when signalled.
    pub fn wait(&self, ticks: sys::TickType_t) -> bool {
        let sem = self.sem.load(Ordering::Acquire);
        if sem.is_null() {
            return false;
        }
        // SAFETY: handle was created in init and is never deleted.
        unsafe { sys::xQueueSemaphoreTake(sem as _, ticks) != 0 }
    }

    fn init_sem(&self) -> Result<(), TransportError> {
        // SAFETY: FreeRTOS queue creation, null-checked below.
        let sem = unsafe { sys::xQueueGenericCreate(1, 0, QUEUE_TYPE_BINARY_SEMAPHORE) };
        if sem.is_null() {
            return Err(TransportError::Hardware(sys::ESP_ERR_NO_MEM as i32));
        }
        self.sem.store(sem as *mut c_void, Ordering::Release);
        Ok(())
    }
}

impl Default for RxShared {
    fn default() -> Self {
        Self::new()
    }
}

fn create_tx_mutex() -> Result<sys::QueueHandle_t, TransportError> {
    // SAFETY: FreeRTOS mutex creation, null-checked below.
    let mutex = unsafe { sys::xQueueCreateMutex(QUEUE_TYPE_MUTEX) };
    if mutex.is_null() {
        return Err(TransportError::Hardware(sys::ESP_ERR_NO_MEM as i32));
    }
    Ok(mutex)
}

fn lock(mutex: sys::QueueHandle_t) {
    // SAFETY: handle was created in init and is never deleted.
    unsafe {
        sys::xQueueSemaphoreTake(mutex, PORT_MAX_DELAY);
    }
}

fn unlock(mutex: sys::QueueHandle_t) {
    // SAFETY: handle was created in init and is never deleted.
    unsafe {
        sys::xQueueGenericSend(mutex, ptr::null(), 0, SEND_TO_BACK);
    }
}
