//! The images that get loaded into memory before execution begins.
use crate::{
    definitions::{cpu, display::fontset},
    ImageError,
};

#[derive(Clone, Debug, PartialEq)]
/// Represents a single rom with it's information
pub struct Rom {
    /// The rom name
    name: String,
    /// The raw program, loaded at `0x200`
    data: Box<[u8]>,
}

impl Rom {
    /// Will generate a new rom based of the given data, a program that does
    /// not fit between `0x200` and the end of memory is rejected.
    pub fn new<D>(name: &str, data: D) -> Result<Self, ImageError>
    where
        D: Into<Box<[u8]>>,
    {
        let data = data.into();
        if data.len() > cpu::PROGRAM_SIZE {
            log::warn!("rejected rom '{}' with {} bytes", name, data.len());
            return Err(ImageError::ProgramTooLarge {
                len: data.len(),
                max: cpu::PROGRAM_SIZE,
            });
        }
        Ok(Rom {
            name: name.to_string(),
            data,
        })
    }

    /// Will return a slice internal values of the given data
    pub fn get_data(&self) -> &[u8] {
        &self.data
    }

    /// Will return the name of the rom.
    pub fn get_name(&self) -> &str {
        &self.name
    }
}

/// The sixteen hex glyphs `0-F`, five bytes each, loaded at `0x050`.
#[derive(Clone, Debug, PartialEq)]
pub struct Font {
    glyphs: [u8; fontset::SIZE],
}

impl Default for Font {
    fn default() -> Self {
        Self {
            glyphs: fontset::FONTSET,
        }
    }
}

impl Font {
    /// A font has to be exactly 80 bytes long.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ImageError> {
        let mut glyphs = [0; fontset::SIZE];
        if data.len() != glyphs.len() {
            log::warn!("rejected font with {} bytes", data.len());
            return Err(ImageError::InvalidFontSize {
                len: data.len(),
                expected: glyphs.len(),
            });
        }
        glyphs.copy_from_slice(data);
        Ok(Self { glyphs })
    }

    pub fn get_data(&self) -> &[u8] {
        &self.glyphs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rom_max_size() {
        let data = vec![0xAA; cpu::PROGRAM_SIZE];
        let rom = Rom::new("FULL", data).expect("A rom filling the memory is valid.");
        assert_eq!(cpu::PROGRAM_SIZE, rom.get_data().len());
        assert_eq!("FULL", rom.get_name());
    }

    #[test]
    fn test_rom_too_large() {
        let data = vec![0xAA; cpu::PROGRAM_SIZE + 1];
        assert_eq!(
            Err(ImageError::ProgramTooLarge {
                len: 0xE01,
                max: 0xE00
            }),
            Rom::new("LARGE", data)
        );
    }

    #[test]
    fn test_font_size() {
        assert_eq!(
            Err(ImageError::InvalidFontSize {
                len: 79,
                expected: 80
            }),
            Font::from_bytes(&[0; 79])
        );
        assert!(Font::from_bytes(&[0; 81]).is_err());
        assert_eq!(Ok(Font::default()), Font::from_bytes(&fontset::FONTSET));
    }
}
