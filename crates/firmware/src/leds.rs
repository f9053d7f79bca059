use crate::board::{Reg, GPIOA_BASE};
use secoc_core::patterns::{LedAction, Leds};

const GPIOA_BSRR: Reg = Reg::at(GPIOA_BASE, 0x10);

/// Green, blue and red LEDs on PA5..PA7, active high.
pub struct StatusLeds {
    state: Leds,
}

impl StatusLeds {
    pub fn new() -> Self {
        let mut leds = Self {
            state: Leds::all(),
        };
        leds.drive(Leds::empty());
        leds
    }

    pub fn apply(&mut self, action: LedAction) {
        let next = action.apply(self.state);
        self.drive(next);
    }

    pub fn toggle(&mut self, mask: Leds) {
        self.apply(LedAction::Toggle(mask));
    }

    fn drive(&mut self, on: Leds) {
        let set = pin_mask(on);
        let reset = pin_mask(on.complement());
        // BSRR: low half sets, high half resets.
        GPIOA_BSRR.write(set | (reset << 16));
        self.state = on;
    }
}

fn pin_mask(leds: Leds) -> u32 {
    let mut mask = 0;
    if leds.contains(Leds::GREEN) {
        mask |= 1 << 5;
    }
    if leds.contains(Leds::BLUE) {
        mask |= 1 << 6;
    }
    if leds.contains(Leds::RED) {
        mask |= 1 << 7;
    }
    mask
}
