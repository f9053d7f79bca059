//! LED pattern sequencer for the three-LED status display.
//!
//! Patterns are expressed as [`LedStep`]s so the board code only has to
//! apply an action and wait. A run picks [`LED_CYCLES`] patterns at random
//! from a seeded generator, so two runs with the same seed blink alike.

use bitflags::bitflags;

pub const LED_CYCLES: u32 = 20;
pub const FAST_DELAY_MS: u32 = 150;
pub const SLOW_DELAY_MS: u32 = 400;
pub const STROBE_DELAY_MS: u32 = 50;
pub const PATTERN_PAUSE_MS: u32 = 200;

/// Longest pattern (strobe) in steps.
pub const MAX_PATTERN_STEPS: usize = 10;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Leds: u8 {
        const GREEN = 1 << 0;
        const BLUE = 1 << 1;
        const RED = 1 << 2;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedAction {
    /// Drive every LED: set ones on, the rest off.
    Write(Leds),
    /// Flip the given LEDs.
    Toggle(Leds),
    /// Leave the LEDs alone.
    Hold,
}

impl LedAction {
    pub fn apply(self, current: Leds) -> Leds {
        match self {
            LedAction::Write(on) => on,
            LedAction::Toggle(mask) => current ^ mask,
            LedAction::Hold => current,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedStep {
    pub action: LedAction,
    pub delay_ms: u32,
}

impl LedStep {
    const fn write(on: Leds, delay_ms: u32) -> Self {
        Self {
            action: LedAction::Write(on),
            delay_ms,
        }
    }

    const fn toggle(mask: Leds, delay_ms: u32) -> Self {
        Self {
            action: LedAction::Toggle(mask),
            delay_ms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedPattern {
    Alternate,
    Simultaneous,
    Chase,
    ToggleWave,
    BinaryCounter,
    RandomToggle,
    RotatingPair,
    Strobe,
    PingPong,
}

impl LedPattern {
    pub const ALL: [LedPattern; 9] = [
        LedPattern::Alternate,
        LedPattern::Simultaneous,
        LedPattern::Chase,
        LedPattern::ToggleWave,
        LedPattern::BinaryCounter,
        LedPattern::RandomToggle,
        LedPattern::RotatingPair,
        LedPattern::Strobe,
        LedPattern::PingPong,
    ];

    pub fn steps(self, rng: &mut PatternRng) -> heapless::Vec<LedStep, MAX_PATTERN_STEPS> {
        let mut steps = heapless::Vec::new();
        let mut add = |step: LedStep| {
            // Every pattern fits in MAX_PATTERN_STEPS.
            let _ = steps.push(step);
        };
        match self {
            // Alternate and chase light one LED at a time, green to red.
            LedPattern::Alternate | LedPattern::Chase => {
                add(LedStep::write(Leds::GREEN, FAST_DELAY_MS));
                add(LedStep::write(Leds::BLUE, FAST_DELAY_MS));
                add(LedStep::write(Leds::RED, FAST_DELAY_MS));
            }
            LedPattern::Simultaneous => {
                add(LedStep::toggle(Leds::all(), SLOW_DELAY_MS));
                add(LedStep::toggle(Leds::all(), SLOW_DELAY_MS));
            }
            LedPattern::ToggleWave => {
                add(LedStep::write(Leds::empty(), 0));
                for led in [Leds::GREEN, Leds::BLUE, Leds::RED, Leds::GREEN, Leds::BLUE, Leds::RED] {
                    add(LedStep::toggle(led, FAST_DELAY_MS));
                }
            }
            LedPattern::BinaryCounter => {
                for count in 0..8u8 {
                    add(LedStep::write(Leds::from_bits_truncate(count), FAST_DELAY_MS));
                }
            }
            LedPattern::RandomToggle => {
                for _ in 0..8 {
                    let mut mask = Leds::empty();
                    let picks = rng.next_u32() % 2 + 1;
                    for _ in 0..picks {
                        mask |= match rng.next_u32() % 3 {
                            0 => Leds::GREEN,
                            1 => Leds::BLUE,
                            _ => Leds::RED,
                        };
                    }
                    add(LedStep::toggle(mask, STROBE_DELAY_MS));
                }
            }
            LedPattern::RotatingPair => {
                add(LedStep::write(Leds::GREEN | Leds::BLUE, SLOW_DELAY_MS));
                add(LedStep::write(Leds::BLUE | Leds::RED, SLOW_DELAY_MS));
                add(LedStep::write(Leds::GREEN | Leds::RED, SLOW_DELAY_MS));
            }
            LedPattern::Strobe => {
                for _ in 0..10 {
                    add(LedStep::toggle(Leds::all(), STROBE_DELAY_MS));
                }
            }
            LedPattern::PingPong => {
                add(LedStep::write(Leds::GREEN, FAST_DELAY_MS));
                add(LedStep::toggle(Leds::GREEN | Leds::BLUE, FAST_DELAY_MS));
                add(LedStep::toggle(Leds::BLUE | Leds::RED, FAST_DELAY_MS));
                add(LedStep::toggle(Leds::BLUE | Leds::RED, FAST_DELAY_MS));
                add(LedStep::toggle(Leds::GREEN | Leds::BLUE, FAST_DELAY_MS));
            }
        }
        steps
    }
}

/// Small linear congruential generator; reproducible from its seed.
#[derive(Debug, Clone)]
pub struct PatternRng {
    state: u32,
}

impl PatternRng {
    pub const fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Next value in `0..=0x7FFF`.
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        (self.state >> 16) & 0x7FFF
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Start,
    Pattern,
    Pause,
    End,
    Done,
}

/// Iterator over every step of one run: LEDs off, `cycles` random patterns
/// each followed by a pause, LEDs off.
#[derive(Debug, Clone)]
pub struct Sequencer {
    rng: PatternRng,
    cycles: u32,
    cycle: u32,
    current: heapless::Vec<LedStep, MAX_PATTERN_STEPS>,
    index: usize,
    phase: Phase,
}

impl Sequencer {
    pub fn new(seed: u32) -> Self {
        Self::with_cycles(seed, LED_CYCLES)
    }

    pub fn with_cycles(seed: u32, cycles: u32) -> Self {
        Self {
            rng: PatternRng::new(seed),
            cycles,
            cycle: 0,
            current: heapless::Vec::new(),
            index: 0,
            phase: Phase::Start,
        }
    }

    fn load_next_pattern(&mut self) {
        let pick = self.rng.next_u32() as usize % LedPattern::ALL.len();
        let pattern = LedPattern::ALL[pick];
        self.current = pattern.steps(&mut self.rng);
        self.index = 0;
        self.phase = Phase::Pattern;
    }
}

impl Iterator for Sequencer {
    type Item = LedStep;

    fn next(&mut self) -> Option<LedStep> {
        loop {
            match self.phase {
                Phase::Start => {
                    if self.cycles == 0 {
                        self.phase = Phase::End;
                    } else {
                        self.load_next_pattern();
                    }
                    return Some(LedStep::write(Leds::empty(), 0));
                }
                Phase::Pattern => {
                    if let Some(step) = self.current.get(self.index).copied() {
                        self.index += 1;
                        return Some(step);
                    }
                    self.phase = Phase::Pause;
                }
                Phase::Pause => {
                    self.cycle += 1;
                    if self.cycle >= self.cycles {
                        self.phase = Phase::End;
                    } else {
                        self.load_next_pattern();
                    }
                    return Some(LedStep {
                        action: LedAction::Hold,
                        delay_ms: PATTERN_PAUSE_MS,
                    });
                }
                Phase::End => {
                    self.phase = Phase::Done;
                    return Some(LedStep::write(Leds::empty(), 0));
                }
                Phase::Done => return None,
            }
        }
    }
}
