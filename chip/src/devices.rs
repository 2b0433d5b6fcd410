//! The collaborators the machine talks to, the display surface and the
//! input source, together with simple in memory implementations of both.
use crate::definitions::{display, keyboard};

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for the display based code
pub trait DisplaySurface {
    /// Will clear the display
    fn clear(&mut self);

    /// Will XOR the eight bits of `row` into the pixels starting at `(x, y)`,
    /// the most significant bit is the left most pixel.
    ///
    /// Returns true if any pixel that was set became unset.
    fn draw_row(&mut self, x: usize, y: usize, row: u8) -> bool;
}

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for reading the keyboard state
pub trait InputSource {
    /// Checks if the key `0x0-0xF` is currently held down.
    fn is_down(&self, key: usize) -> bool;

    /// The lowest key that is currently held down, if there is any.
    fn first_down(&self) -> Option<usize> {
        (0..keyboard::SIZE).find(|&key| self.is_down(key))
    }
}

/// The graphics of the Chip 8 are black and white and the screen has a total of `2048` pixels
/// `(64 x 32)`. Coordinates outside of the screen wrap around on both axes.
#[derive(Debug, Clone, PartialEq)]
pub struct Display {
    pixels: Box<[[bool; display::WIDTH]; display::HEIGHT]>,
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}

impl Display {
    pub fn new() -> Self {
        Self {
            pixels: Box::new([[false; display::WIDTH]; display::HEIGHT]),
        }
    }

    /// The rows of the screen, top to bottom.
    pub fn pixels(&self) -> &[[bool; display::WIDTH]; display::HEIGHT] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.pixels[y % display::HEIGHT][x % display::WIDTH]
    }

    /// The amount of pixels that are currently set.
    pub fn lit(&self) -> usize {
        self.pixels.iter().flatten().filter(|&&pixel| pixel).count()
    }
}

impl DisplaySurface for Display {
    fn clear(&mut self) {
        for row in self.pixels.iter_mut() {
            for pixel in row.iter_mut() {
                *pixel = false;
            }
        }
    }

    fn draw_row(&mut self, x: usize, y: usize, row: u8) -> bool {
        let line = &mut self.pixels[y % display::HEIGHT];
        let mut collided = false;

        for bit in 0..display::SPRITE_WIDTH {
            let mask = 0x80 >> bit;
            if row & mask == 0 {
                continue;
            }

            let pixel = &mut line[(x + bit) % display::WIDTH];
            if *pixel {
                collided = true;
            }
            *pixel = !*pixel;
        }
        collided
    }
}

/// Input is done with a hex keyboard that has 16 keys ranging `0-F`. The `8`, `4`, `6`, and
/// `2` keys are typically used for directional input. Three opcodes are used to detect input.
/// One skips an instruction if a specific key is pressed, while another does the same if a
/// specific key is not pressed. The third waits for a key press, and then stores it in one of
/// the data registers.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Keyboard {
    keys: [bool; keyboard::SIZE],
}

impl Keyboard {
    pub fn new() -> Self {
        Keyboard::default()
    }

    /// Keys outside of `0x0-0xF` are ignored.
    pub fn set_key(&mut self, key: usize, to: bool) {
        match self.keys.get_mut(key) {
            Some(state) => *state = to,
            None => log::warn!("ignored unknown key {:#X}", key),
        }
    }

    pub fn toggle_key(&mut self, key: usize) {
        self.set_key(key, !self.is_down(key))
    }

    /// Sets the key found at `row` and `column` of the hex keypad layout
    /// ```text
    /// 1 2 3 C
    /// 4 5 6 D
    /// 7 8 9 E
    /// A 0 B F
    /// ```
    pub fn set_layout_key(&mut self, row: usize, column: usize, to: bool) {
        match keyboard::LAYOUT.get(row).and_then(|r| r.get(column)) {
            Some(&key) => self.set_key(key, to),
            None => log::warn!("ignored unknown layout key ({}, {})", row, column),
        }
    }

    /// Will overwrite the keyboard state, entry `i` is key `i`. Missing
    /// entries are released, surplus entries are ignored.
    pub fn set_keys(&mut self, keys: &[bool]) {
        self.release_all();
        for (state, &to) in self.keys.iter_mut().zip(keys) {
            *state = to;
        }
    }

    pub fn release_all(&mut self) {
        self.keys = [false; keyboard::SIZE];
    }

    pub fn get_keys(&self) -> &[bool] {
        &self.keys
    }
}

impl InputSource for Keyboard {
    fn is_down(&self, key: usize) -> bool {
        self.keys.get(key).copied().unwrap_or(false)
    }
}
