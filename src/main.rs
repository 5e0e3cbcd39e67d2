//! shell-fw: interactive serial console firmware.
//!
//! Brings up the USB Serial/JTAG console plus both hardware UARTs,
//! runs one shell session per port and drains the deferred log ring
//! out the USB console. On non-ESP targets this binary is a stub; the
//! library and its tests carry the portable logic.

#![cfg_attr(target_os = "espidf", no_std)]
#![cfg_attr(target_os = "espidf", no_main)]

#[cfg(target_os = "espidf")]
mod firmware {
    use core::fmt::Write;

    use esp_idf_svc::sys;

    use serial_shell::hal::{EspPlatform, RxShared, UartPort, UsbSerialPort};
    use serial_shell::logging::LogRing;
    use serial_shell::shell::ShellInfo;
    use serial_shell::{fw_error, fw_info};
    use serial_shell::{Platform, Serial, SerialDevice, SerialOut, SerialRegistry, Shell};

    // Static RX state, one block per port. The interrupt controller
    // holds raw pointers into these for the process lifetime.
    static USB_RX: RxShared = RxShared::new();
    static UART0_RX: RxShared = RxShared::new();
    static UART1_RX: RxShared = RxShared::new();

    static LOG_RING: LogRing = LogRing::new();

    const INFO: ShellInfo<'static> = ShellInfo {
        banner: "Serial Shell Console",
        version: env!("VERSION_STRING"),
        built: concat!("Built from git ", env!("GIT_HASH")),
        copyright: "(c) 2026 SerialShell Contributors",
    };

    /// Write queued log records out the console port.
    fn drain_logs(port: &dyn Serial) {
        while let Some(record) = LOG_RING.drain() {
            let mut out = SerialOut::new(port);
            let _ = writeln!(
                out,
                "[{:10}] {:5} {}",
                record.timestamp_us,
                record.level.as_str(),
                record.message()
            );
        }
    }

    pub fn run() -> ! {
        sys::link_patches();

        let platform = EspPlatform::new();
        let now = || unsafe { sys::esp_timer_get_time() };
        fw_info!(
            LOG_RING,
            now(),
            "{} wireless={}",
            platform.name(),
            platform.has_wireless()
        );

        let usb = match UsbSerialPort::install(&USB_RX) {
            Ok(port) => port,
            Err(_) => {
                // No console; nothing useful left to do.
                // SAFETY: terminal system call.
                unsafe { sys::esp_restart() };
                unreachable!()
            }
        };
        fw_info!(LOG_RING, now(), "usb console up");

        let uart0 = UartPort::install(SerialDevice::Uart0, &UART0_RX);
        let uart1 = UartPort::install(SerialDevice::Uart1, &UART1_RX);
        if uart0.is_err() {
            fw_error!(LOG_RING, now(), "uart0 install failed");
        }
        if uart1.is_err() {
            fw_error!(LOG_RING, now(), "uart1 install failed");
        }

        let mut registry = SerialRegistry::new();
        registry.register(&usb);
        if let Ok(port) = &uart0 {
            registry.register(port);
        }
        if let Ok(port) = &uart1 {
            registry.register(port);
        }

        let mut usb_shell = Shell::new(&usb, &platform, INFO);
        usb_shell.show_welcome();

        let mut uart_shells: [Option<Shell<'_>>; 2] = [None, None];
        for (slot, device) in [SerialDevice::Uart0, SerialDevice::Uart1]
            .into_iter()
            .enumerate()
        {
            if let Some(port) = registry.get(device) {
                let mut shell = Shell::new(port, &platform, INFO);
                shell.show_welcome();
                uart_shells[slot] = Some(shell);
            }
        }

        loop {
            // The USB driver buffers internally; pump it into the ring.
            usb.service_rx();
            usb_shell.process();

            for shell in uart_shells.iter_mut().flatten() {
                shell.process();
            }

            drain_logs(&usb);

            // Park until USB data arrives; UART sessions are polled on
            // the same cadence, their ISRs have already buffered the
            // bytes.
            usb.wait_rx(1);
        }
    }
}

#[cfg(target_os = "espidf")]
#[no_mangle]
fn main() {
    firmware::run();
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    eprintln!("shell-fw is ESP-IDF firmware; build for an espidf target to produce an image");
}
