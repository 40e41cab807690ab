use crate::engine::input::native::Scancode;
use crate::engine::keycodes::Key;
use std::collections::BTreeMap;

impl Scancode {
    pub const A: Scancode = Scancode(4);
    pub const Z: Scancode = Scancode(29);
    pub const NUM_1: Scancode = Scancode(30);
    pub const NUM_0: Scancode = Scancode(39);
    pub const RETURN: Scancode = Scancode(40);
    pub const ESCAPE: Scancode = Scancode(41);
    pub const BACKSPACE: Scancode = Scancode(42);
    pub const TAB: Scancode = Scancode(43);
    pub const SPACE: Scancode = Scancode(44);
    pub const MINUS: Scancode = Scancode(45);
    pub const EQUALS: Scancode = Scancode(46);
    pub const LEFT_BRACKET: Scancode = Scancode(47);
    pub const RIGHT_BRACKET: Scancode = Scancode(48);
    pub const BACKSLASH: Scancode = Scancode(49);
    pub const SEMICOLON: Scancode = Scancode(51);
    pub const APOSTROPHE: Scancode = Scancode(52);
    pub const GRAVE: Scancode = Scancode(53);
    pub const COMMA: Scancode = Scancode(54);
    pub const PERIOD: Scancode = Scancode(55);
    pub const SLASH: Scancode = Scancode(56);
    pub const CAPS_LOCK: Scancode = Scancode(57);
    pub const F1: Scancode = Scancode(58);
    pub const F12: Scancode = Scancode(69);
    pub const PRINT_SCREEN: Scancode = Scancode(70);
    pub const SCROLL_LOCK: Scancode = Scancode(71);
    pub const PAUSE: Scancode = Scancode(72);
    pub const INSERT: Scancode = Scancode(73);
    pub const HOME: Scancode = Scancode(74);
    pub const PAGE_UP: Scancode = Scancode(75);
    pub const DELETE: Scancode = Scancode(76);
    pub const END: Scancode = Scancode(77);
    pub const PAGE_DOWN: Scancode = Scancode(78);
    pub const RIGHT: Scancode = Scancode(79);
    pub const LEFT: Scancode = Scancode(80);
    pub const DOWN: Scancode = Scancode(81);
    pub const UP: Scancode = Scancode(82);
    pub const NUM_LOCK: Scancode = Scancode(83);
    pub const KP_DIVIDE: Scancode = Scancode(84);
    pub const KP_MULTIPLY: Scancode = Scancode(85);
    pub const KP_MINUS: Scancode = Scancode(86);
    pub const KP_PLUS: Scancode = Scancode(87);
    pub const KP_ENTER: Scancode = Scancode(88);
    pub const KP_1: Scancode = Scancode(89);
    pub const KP_0: Scancode = Scancode(98);
    pub const KP_PERIOD: Scancode = Scancode(99);
    pub const NON_US_BACKSLASH: Scancode = Scancode(100);
    pub const APPLICATION: Scancode = Scancode(101);
    pub const POWER: Scancode = Scancode(102);
    pub const F13: Scancode = Scancode(104);
    pub const F24: Scancode = Scancode(115);
    pub const EXECUTE: Scancode = Scancode(116);
    pub const HELP: Scancode = Scancode(117);
    pub const MENU: Scancode = Scancode(118);
    pub const SELECT: Scancode = Scancode(119);
    pub const CLEAR: Scancode = Scancode(156);
    pub const SEPARATOR: Scancode = Scancode(159);
    pub const KP_DECIMAL: Scancode = Scancode(220);
    pub const LCTRL: Scancode = Scancode(224);
    pub const LSHIFT: Scancode = Scancode(225);
    pub const LALT: Scancode = Scancode(226);
    pub const LGUI: Scancode = Scancode(227);
    pub const RCTRL: Scancode = Scancode(228);
    pub const RSHIFT: Scancode = Scancode(229);
    pub const RALT: Scancode = Scancode(230);
    pub const RGUI: Scancode = Scancode(231);
    pub const AC_BACK: Scancode = Scancode(270);
    pub const SLEEP: Scancode = Scancode(282);

    /// Scancode of the letter key `c` (`a..=z`, case-insensitive).
    pub fn letter(c: char) -> Option<Scancode> {
        let c = c.to_ascii_lowercase();
        c.is_ascii_lowercase()
            .then(|| Scancode(Self::A.0 + (c as u32 - 'a' as u32)))
    }

    /// Scancode of the top-row digit key `c`.
    pub fn digit(c: char) -> Option<Scancode> {
        match c {
            '0' => Some(Self::NUM_0),
            '1'..='9' => Some(Scancode(Self::NUM_1.0 + (c as u32 - '1' as u32))),
            _ => None,
        }
    }

    /// Scancode of function key `F{n}` for `n` in `1..=24`.
    pub fn function(n: u32) -> Option<Scancode> {
        match n {
            1..=12 => Some(Scancode(Self::F1.0 + n - 1)),
            13..=24 => Some(Scancode(Self::F13.0 + n - 13)),
            _ => None,
        }
    }

    /// Scancode of keypad digit `n`.
    pub fn keypad(n: u32) -> Option<Scancode> {
        match n {
            0 => Some(Self::KP_0),
            1..=9 => Some(Scancode(Self::KP_1.0 + n - 1)),
            _ => None,
        }
    }
}

/// Sorted scancode to logical key table, immutable once built.
#[derive(Debug, Clone)]
pub struct KeyMap {
    entries: Vec<(Scancode, Key)>,
}

impl KeyMap {
    /// Builds a table from arbitrary pairs. A scancode listed twice keeps
    /// the mapping that came last.
    pub fn from_entries(entries: impl IntoIterator<Item = (Scancode, Key)>) -> Self {
        let unique: BTreeMap<Scancode, Key> = entries.into_iter().collect();
        KeyMap {
            entries: unique.into_iter().collect(),
        }
    }

    pub fn lookup(&self, scancode: Scancode) -> Option<Key> {
        self.entries
            .binary_search_by_key(&scancode, |(code, _)| *code)
            .ok()
            .map(|idx| self.entries[idx].1)
    }

    /// Resolves the primary scancode, then the fallback. Never fails: an
    /// unmapped key resolves to [`Key::Unknown`].
    pub fn resolve(&self, primary: Option<Scancode>, fallback: Option<Scancode>) -> Key {
        primary
            .and_then(|code| self.lookup(code))
            .or_else(|| fallback.and_then(|code| self.lookup(code)))
            .unwrap_or(Key::Unknown)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(Scancode, Key)] {
        &self.entries
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::from_entries(default_entries())
    }
}

#[rustfmt::skip]
const LETTERS: [Key; 26] = [
    Key::A, Key::B, Key::C, Key::D, Key::E, Key::F, Key::G, Key::H, Key::I,
    Key::J, Key::K, Key::L, Key::M, Key::N, Key::O, Key::P, Key::Q, Key::R,
    Key::S, Key::T, Key::U, Key::V, Key::W, Key::X, Key::Y, Key::Z,
];

#[rustfmt::skip]
const DIGITS: [Key; 10] = [
    Key::Key0, Key::Key1, Key::Key2, Key::Key3, Key::Key4,
    Key::Key5, Key::Key6, Key::Key7, Key::Key8, Key::Key9,
];

#[rustfmt::skip]
const NUMPAD: [Key; 10] = [
    Key::Numpad0, Key::Numpad1, Key::Numpad2, Key::Numpad3, Key::Numpad4,
    Key::Numpad5, Key::Numpad6, Key::Numpad7, Key::Numpad8, Key::Numpad9,
];

#[rustfmt::skip]
const FUNCTION: [Key; 24] = [
    Key::F1, Key::F2, Key::F3, Key::F4, Key::F5, Key::F6, Key::F7, Key::F8,
    Key::F9, Key::F10, Key::F11, Key::F12, Key::F13, Key::F14, Key::F15, Key::F16,
    Key::F17, Key::F18, Key::F19, Key::F20, Key::F21, Key::F22, Key::F23, Key::F24,
];

const NAMED: &[(Scancode, Key)] = &[
    (Scancode::BACKSPACE, Key::Back),
    (Scancode::TAB, Key::Tab),
    (Scancode::CLEAR, Key::Clear),
    (Scancode::RETURN, Key::Return),
    (Scancode::PAUSE, Key::Pause),
    (Scancode::CAPS_LOCK, Key::Capital),
    (Scancode::ESCAPE, Key::Escape),
    (Scancode::SPACE, Key::Space),
    (Scancode::PAGE_UP, Key::Prior),
    (Scancode::PAGE_DOWN, Key::Next),
    (Scancode::END, Key::End),
    (Scancode::HOME, Key::Home),
    (Scancode::LEFT, Key::Left),
    (Scancode::UP, Key::Up),
    (Scancode::RIGHT, Key::Right),
    (Scancode::DOWN, Key::Down),
    (Scancode::SELECT, Key::Select),
    (Scancode::PRINT_SCREEN, Key::Print),
    (Scancode::EXECUTE, Key::Execute),
    (Scancode::INSERT, Key::Insert),
    (Scancode::DELETE, Key::Delete),
    (Scancode::HELP, Key::Help),
    (Scancode::LGUI, Key::LWin),
    (Scancode::RGUI, Key::RWin),
    (Scancode::APPLICATION, Key::Apps),
    (Scancode::POWER, Key::Sleep),
    (Scancode::SLEEP, Key::Sleep),
    (Scancode::KP_MULTIPLY, Key::Multiply),
    (Scancode::KP_PERIOD, Key::Period),
    (Scancode::KP_DECIMAL, Key::Decimal),
    (Scancode::KP_PLUS, Key::Add),
    (Scancode::KP_MINUS, Key::Subtract),
    (Scancode::KP_DIVIDE, Key::Divide),
    (Scancode::KP_ENTER, Key::Return),
    (Scancode::SEPARATOR, Key::Separator),
    (Scancode::PERIOD, Key::Period),
    (Scancode::NUM_LOCK, Key::NumLock),
    (Scancode::SCROLL_LOCK, Key::Scroll),
    (Scancode::LSHIFT, Key::LShift),
    (Scancode::RSHIFT, Key::RShift),
    (Scancode::LCTRL, Key::LControl),
    (Scancode::RCTRL, Key::RControl),
    (Scancode::LALT, Key::LMenu),
    (Scancode::RALT, Key::RMenu),
    (Scancode::MENU, Key::Menu),
    (Scancode::COMMA, Key::Comma),
    (Scancode::MINUS, Key::Minus),
    (Scancode::AC_BACK, Key::Escape),
    (Scancode::EQUALS, Key::Plus),
    (Scancode::SEMICOLON, Key::Oem1),
    (Scancode::SLASH, Key::Oem2),
    (Scancode::GRAVE, Key::Oem3),
    (Scancode::LEFT_BRACKET, Key::Oem4),
    (Scancode::BACKSLASH, Key::Oem5),
    (Scancode::RIGHT_BRACKET, Key::Oem6),
    (Scancode::APOSTROPHE, Key::Oem7),
    (Scancode::NON_US_BACKSLASH, Key::Oem102),
];

fn default_entries() -> impl Iterator<Item = (Scancode, Key)> {
    let letters = ('a'..='z')
        .zip(LETTERS)
        .filter_map(|(c, key)| Some((Scancode::letter(c)?, key)));
    let digits = ('0'..='9')
        .zip(DIGITS)
        .filter_map(|(c, key)| Some((Scancode::digit(c)?, key)));
    let numpad = (0..10)
        .zip(NUMPAD)
        .filter_map(|(n, key)| Some((Scancode::keypad(n)?, key)));
    let function = (1..=24)
        .zip(FUNCTION)
        .filter_map(|(n, key)| Some((Scancode::function(n)?, key)));

    letters
        .chain(digits)
        .chain(numpad)
        .chain(function)
        .chain(NAMED.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_is_sorted_and_unique() {
        let map = KeyMap::default();
        assert!(map.entries().windows(2).all(|w| w[0].0 < w[1].0));
        assert_eq!(map.lookup(Scancode::letter('q').unwrap()), Some(Key::Q));
        assert_eq!(map.lookup(Scancode::function(24).unwrap()), Some(Key::F24));
        assert_eq!(map.lookup(Scancode::keypad(7).unwrap()), Some(Key::Numpad7));
    }

    #[test]
    fn duplicate_scancode_keeps_last_mapping() {
        let map = KeyMap::from_entries([
            (Scancode::SPACE, Key::Space),
            (Scancode::SPACE, Key::Return),
        ]);
        assert_eq!(map.len(), 1);
        assert_eq!(map.lookup(Scancode::SPACE), Some(Key::Return));
    }
}
