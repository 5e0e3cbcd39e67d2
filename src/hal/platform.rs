//! System facts and control via ESP-IDF services.

use core::fmt;
use core::ptr;

use esp_idf_svc::sys;

use crate::platform::{HeapStats, Platform};

// esp_chip_info_t feature bits (CHIP_FEATURE_* macros).
const FEATURE_WIFI_BGN: u32 = 1 << 0;
const FEATURE_BT: u32 = 1 << 4;
const FEATURE_BLE: u32 = 1 << 5;

// RTC_CNTL_OPTION1_REG: bit 0 forces ROM download boot on the next
// reset, the ESP equivalent of holding BOOT at power-up.
const RTC_CNTL_OPTION1_REG: u32 = 0x6000_8128;
const RTC_CNTL_FORCE_DOWNLOAD_BOOT: u32 = 1;

pub struct EspPlatform {
    chip: sys::esp_chip_info_t,
}

impl EspPlatform {
    pub fn new() -> Self {
        let mut chip = sys::esp_chip_info_t::default();
        // SAFETY: plain out-parameter fill.
        unsafe { sys::esp_chip_info(&mut chip) };
        Self { chip }
    }
}

impl Default for EspPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for EspPlatform {
    fn name(&self) -> &'static str {
        #[allow(non_upper_case_globals)]
        match self.chip.model {
            sys::esp_chip_model_t_CHIP_ESP32 => "ESP32",
            sys::esp_chip_model_t_CHIP_ESP32S2 => "ESP32-S2",
            sys::esp_chip_model_t_CHIP_ESP32S3 => "ESP32-S3",
            sys::esp_chip_model_t_CHIP_ESP32C3 => "ESP32-C3",
            _ => "ESP32-family",
        }
    }

    fn has_wireless(&self) -> bool {
        self.chip.features & (FEATURE_WIFI_BGN | FEATURE_BT | FEATURE_BLE) != 0
    }

    fn temperature_c(&self) -> f32 {
        // ROM temperature sensor, raw units to Celsius per TRM.
        // SAFETY: read-only ROM helper.
        let raw = unsafe { sys::temprature_sens_read() };
        (raw as f32 - 32.0) / 1.8
    }

    fn heap_stats(&self) -> HeapStats {
        // SAFETY: heap introspection, no arguments to get wrong.
        let (total, free) = unsafe {
            (
                sys::heap_caps_get_total_size(sys::MALLOC_CAP_DEFAULT) as usize,
                sys::heap_caps_get_free_size(sys::MALLOC_CAP_DEFAULT) as usize,
            )
        };
        HeapStats {
            total,
            used: total.saturating_sub(free),
        }
    }

    fn timestamp_us(&self) -> i64 {
        // SAFETY: monotonic timer read.
        unsafe { sys::esp_timer_get_time() }
    }

    fn clock_summary(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        // SAFETY: clock tree queries, read-only.
        let (cpu, apb, xtal) = unsafe {
            (
                sys::esp_clk_cpu_freq(),
                sys::esp_clk_apb_freq(),
                sys::esp_clk_xtal_freq(),
            )
        };
        writeln!(out, "   clk_sys: {} Hz", cpu)?;
        writeln!(out, "   clk_apb: {} Hz", apb)?;
        writeln!(out, "  clk_xtal: {} Hz", xtal)?;
        Ok(())
    }

    fn task_snapshot(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        // vTaskList needs configUSE_TRACE_FACILITY; ~40 bytes per task.
        let mut buf = [0u8; 1024];
        // SAFETY: FreeRTOS writes a NUL-terminated table into buf.
        unsafe { sys::vTaskList(buf.as_mut_ptr() as *mut core::ffi::c_char) };

        let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
        match core::str::from_utf8(&buf[..len]) {
            Ok(table) => out.write_str(table),
            Err(_) => writeln!(out, "<task list unavailable>"),
        }
    }

    fn reboot(&self) -> ! {
        // SAFETY: terminal system call.
        unsafe { sys::esp_restart() };
        unreachable!()
    }

    fn bootsel(&self) -> ! {
        // SAFETY: documented RTC register poke, followed by reset.
        unsafe {
            ptr::write_volatile(
                RTC_CNTL_OPTION1_REG as *mut u32,
                RTC_CNTL_FORCE_DOWNLOAD_BOOT,
            );
            sys::esp_restart();
        }
        unreachable!()
    }
}
