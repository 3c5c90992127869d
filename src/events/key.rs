// src/events/key.rs

//! Key event payloads and the filter scripts wait with.

use std::collections::BTreeSet;
use std::fmt;

/// Virtual-key code as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyCode(pub u32);

impl KeyCode {
    pub const BACK: KeyCode = KeyCode(8);
    pub const TAB: KeyCode = KeyCode(9);
    pub const RETURN: KeyCode = KeyCode(13);
    pub const SHIFT: KeyCode = KeyCode(16);
    pub const CONTROL: KeyCode = KeyCode(17);
    pub const MENU: KeyCode = KeyCode(18);
    pub const ESCAPE: KeyCode = KeyCode(27);
    pub const SPACE: KeyCode = KeyCode(32);
    pub const LEFT: KeyCode = KeyCode(37);
    pub const UP: KeyCode = KeyCode(38);
    pub const RIGHT: KeyCode = KeyCode(39);
    pub const DOWN: KeyCode = KeyCode(40);
    pub const DELETE: KeyCode = KeyCode(46);
    pub const MULTIPLY: KeyCode = KeyCode(106);
    pub const ADD: KeyCode = KeyCode(107);
    pub const SUBTRACT: KeyCode = KeyCode(109);
    pub const DIVIDE: KeyCode = KeyCode(111);
    pub const F1: KeyCode = KeyCode(112);
    pub const F12: KeyCode = KeyCode(123);

    /// Digit key `0`..=`9` on the main row.
    pub fn digit(n: u8) -> Option<KeyCode> {
        (n <= 9).then(|| KeyCode(0x30 + u32::from(n)))
    }

    /// Letter key `A`..=`Z` (case-insensitive).
    pub fn letter(c: char) -> Option<KeyCode> {
        let c = c.to_ascii_uppercase();
        c.is_ascii_uppercase().then(|| KeyCode(c as u32))
    }

    /// Function key `F1`..=`F12`.
    pub fn function(n: u8) -> Option<KeyCode> {
        (1..=12)
            .contains(&n)
            .then(|| KeyCode(Self::F1.0 + u32::from(n) - 1))
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

/// Modifier flags observed together with a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Modifiers {
    pub alt: bool,
    pub ctrl: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        alt: false,
        ctrl: false,
        shift: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    pub fn alt() -> Self {
        Self {
            alt: true,
            ..Self::NONE
        }
    }
}

/// A discrete key transition delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    /// `true` when the key went down, `false` when it was released.
    pub pressed: bool,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(code: KeyCode, pressed: bool, modifiers: Modifiers) -> Self {
        Self {
            code,
            pressed,
            modifiers,
        }
    }

    pub fn press(code: KeyCode) -> Self {
        Self::new(code, true, Modifiers::NONE)
    }

    pub fn release(code: KeyCode) -> Self {
        Self::new(code, false, Modifiers::NONE)
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Which key events a waiter is interested in.
///
/// Every criterion left as `None` matches anything. The default filter
/// matches every event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyFilter {
    codes: Option<BTreeSet<KeyCode>>,
    pressed: Option<bool>,
    alt: Option<bool>,
    ctrl: Option<bool>,
    shift: Option<bool>,
}

impl KeyFilter {
    /// Matches any key event.
    pub fn any() -> Self {
        Self::default()
    }

    /// Only these codes. An empty iterator matches nothing.
    pub fn codes(mut self, codes: impl IntoIterator<Item = KeyCode>) -> Self {
        self.codes = Some(codes.into_iter().collect());
        self
    }

    /// Only this code.
    pub fn code(self, code: KeyCode) -> Self {
        self.codes([code])
    }

    /// Only presses (`true`) or releases (`false`).
    pub fn pressed(mut self, pressed: bool) -> Self {
        self.pressed = Some(pressed);
        self
    }

    pub fn alt(mut self, alt: bool) -> Self {
        self.alt = Some(alt);
        self
    }

    pub fn ctrl(mut self, ctrl: bool) -> Self {
        self.ctrl = Some(ctrl);
        self
    }

    pub fn shift(mut self, shift: bool) -> Self {
        self.shift = Some(shift);
        self
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        if let Some(codes) = &self.codes {
            if !codes.contains(&event.code) {
                return false;
            }
        }

        let wanted = [
            (self.pressed, event.pressed),
            (self.alt, event.modifiers.alt),
            (self.ctrl, event.modifiers.ctrl),
            (self.shift, event.modifiers.shift),
        ];
        wanted
            .into_iter()
            .all(|(want, actual)| want.is_none_or(|w| w == actual))
    }
}
