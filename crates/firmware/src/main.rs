#![no_main]
#![no_std]

mod board;
mod leds;
mod uart;

use core::sync::atomic::{AtomicBool, Ordering};
use cortex_m_rt::{entry, exception};
use panic_halt as _;
use secoc_core::echo::LineEcho;
use secoc_core::patterns::{Leds, Sequencer};
use secoc_core::report;
use secoc_core::selftest::self_test_with;

use leds::StatusLeds;
use uart::{RxPoll, UartSink, Usart1};

const WELCOME_MSG: &str = "Hello, this message is sent via UART!";

/// Granularity of `App::pause`; short enough not to overrun the RX register
/// at 115200 baud.
const POLL_SLICE_US: u32 = 50;

static TOGGLE_RED: AtomicBool = AtomicBool::new(false);

#[exception]
fn SysTick() {
    TOGGLE_RED.store(true, Ordering::Release);
}

struct App {
    uart: Usart1,
    leds: StatusLeds,
    echo: LineEcho,
}

impl App {
    /// Wait `ms` milliseconds while servicing the UART and the red LED timer.
    fn pause(&mut self, ms: u32) {
        let slices = ms * (1_000 / POLL_SLICE_US);
        for _ in 0..slices {
            self.service();
            board::delay_us(POLL_SLICE_US);
        }
        self.service();
    }

    fn service(&mut self) {
        match self.uart.poll_rx() {
            RxPoll::Byte(byte) => {
                if let Some(chunk) = self.echo.push(byte) {
                    let _ = self.uart.write_all(&chunk);
                }
            }
            RxPoll::Error => self.echo.abort(),
            RxPoll::Empty => {}
        }

        if TOGGLE_RED.swap(false, Ordering::AcqRel) {
            self.leds.toggle(Leds::RED);
        }
    }
}

#[entry]
fn main() -> ! {
    let Some(mut cp) = cortex_m::Peripherals::take() else {
        loop {
            cortex_m::asm::nop();
        }
    };
    let mut uart = board::init(&mut cp);
    {
        let mut sink = UartSink::new(&mut uart);
        report!(&mut sink, "{}", WELCOME_MSG);

        let status = self_test_with(&mut sink);
        if status == 0 {
            report!(&mut sink, "Self-test passed");
        } else {
            report!(&mut sink, "Self-test failed, status={}", status);
        }
    }

    let mut app = App {
        uart,
        leds: StatusLeds::new(),
        echo: LineEcho::new(),
    };

    let mut seed = 0u32;
    let mut sequencer = Sequencer::new(seed);
    loop {
        match sequencer.next() {
            Some(step) => {
                app.leds.apply(step.action);
                app.pause(step.delay_ms);
            }
            None => {
                seed = seed.wrapping_add(1);
                sequencer = Sequencer::new(seed);
            }
        }
    }
}
