//! STM32F103 bring-up: clocks, pins, interrupt priorities, USART1, SysTick.

use cortex_m::peripheral::scb::SystemHandler;
use cortex_m::peripheral::syst::SystClkSource;

/// HSI after reset; no PLL.
pub const SYSCLK_HZ: u32 = 8_000_000;
pub const UART_BAUD: u32 = 115_200;
/// SysTick fires once per second.
pub const TIMER_RELOAD: u32 = SYSCLK_HZ - 1;
const SYSTICK_PRIORITY: u8 = 0x80;

const RCC_BASE: usize = 0x4002_1000;
pub const GPIOA_BASE: usize = 0x4001_0800;
pub const USART1_BASE: usize = 0x4001_3800;

const RCC_APB2ENR: Reg = Reg::at(RCC_BASE, 0x18);
const APB2ENR_AFIOEN: u32 = 1 << 0;
const APB2ENR_IOPAEN: u32 = 1 << 2;
const APB2ENR_USART1EN: u32 = 1 << 14;

const GPIOA_CRL: Reg = Reg::at(GPIOA_BASE, 0x00);
const GPIOA_CRH: Reg = Reg::at(GPIOA_BASE, 0x04);

/// A 32-bit memory-mapped register.
#[derive(Clone, Copy)]
pub struct Reg(usize);

impl Reg {
    pub const fn at(base: usize, offset: usize) -> Self {
        Self(base + offset)
    }

    pub fn read(self) -> u32 {
        // SAFETY: only constructed for fixed, aligned peripheral addresses.
        unsafe { core::ptr::read_volatile(self.0 as *const u32) }
    }

    pub fn write(self, value: u32) {
        // SAFETY: see `read`.
        unsafe { core::ptr::write_volatile(self.0 as *mut u32, value) }
    }

    pub fn modify(self, f: impl FnOnce(u32) -> u32) {
        self.write(f(self.read()));
    }
}

pub fn init(cp: &mut cortex_m::Peripherals) -> crate::uart::Usart1 {
    // 1. Clocks for AFIO, port A and USART1
    RCC_APB2ENR.modify(|v| v | APB2ENR_AFIOEN | APB2ENR_IOPAEN | APB2ENR_USART1EN);

    // 2. Pins: PA5..PA7 push-pull outputs (LEDs), PA9 AF push-pull (TX),
    //    PA10 floating input (RX)
    GPIOA_CRL.modify(|v| (v & !(0xFFF << 20)) | (0x222 << 20));
    GPIOA_CRH.modify(|v| (v & !(0xFF << 4)) | (0x4B << 4));

    // 3. Interrupt priorities
    // SAFETY: no priority-based critical sections exist yet.
    unsafe { cp.SCB.set_priority(SystemHandler::SysTick, SYSTICK_PRIORITY) };

    // 4. USART1
    let uart = crate::uart::Usart1::init(SYSCLK_HZ / UART_BAUD);

    // 5. Periodic timer
    let syst = &mut cp.SYST;
    syst.set_clock_source(SystClkSource::Core);
    syst.set_reload(TIMER_RELOAD);
    syst.clear_current();
    syst.enable_interrupt();
    syst.enable_counter();

    uart
}

pub fn delay_us(us: u32) {
    cortex_m::asm::delay(us * (SYSCLK_HZ / 1_000_000));
}
