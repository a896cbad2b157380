use super::Preview;
use crate::control::CommandSource;
use crate::error::PipelineError;
use anyhow::Result;
use image::RgbImage;
use minifb::{Key, KeyRepeat, Window, WindowOptions};

const LETTER_KEYS: [(Key, char); 26] = [
    (Key::A, 'a'),
    (Key::B, 'b'),
    (Key::C, 'c'),
    (Key::D, 'd'),
    (Key::E, 'e'),
    (Key::F, 'f'),
    (Key::G, 'g'),
    (Key::H, 'h'),
    (Key::I, 'i'),
    (Key::J, 'j'),
    (Key::K, 'k'),
    (Key::L, 'l'),
    (Key::M, 'm'),
    (Key::N, 'n'),
    (Key::O, 'o'),
    (Key::P, 'p'),
    (Key::Q, 'q'),
    (Key::R, 'r'),
    (Key::S, 's'),
    (Key::T, 't'),
    (Key::U, 'u'),
    (Key::V, 'v'),
    (Key::W, 'w'),
    (Key::X, 'x'),
    (Key::Y, 'y'),
    (Key::Z, 'z'),
];

/// Debug preview window; also the keyboard source for operator commands
pub struct PreviewWindow {
    window: Window,
    buffer: Vec<u32>,
    width: usize,
    height: usize,
}

impl PreviewWindow {
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self> {
        let width = width as usize;
        let height = height as usize;
        let window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| anyhow::anyhow!("Failed to open preview window: {}", e))?;

        tracing::info!("Preview window opened ({}x{})", width, height);

        Ok(Self {
            window,
            buffer: vec![0; width * height],
            width,
            height,
        })
    }
}

impl Preview for PreviewWindow {
    fn show(&mut self, frame: &RgbImage) -> Result<()> {
        let (width, height) = frame.dimensions();
        if (width as usize, height as usize) != (self.width, self.height) {
            return Err(PipelineError::DimensionMismatch {
                what: "preview frame",
                expected: (self.width as u32, self.height as u32),
                actual: (width, height),
            }
            .into());
        }

        for (dst, p) in self.buffer.iter_mut().zip(frame.pixels()) {
            *dst = (u32::from(p[0]) << 16) | (u32::from(p[1]) << 8) | u32::from(p[2]);
        }

        self.window
            .update_with_buffer(&self.buffer, self.width, self.height)
            .map_err(|e| PipelineError::Sink(e.to_string()))?;
        Ok(())
    }
}

impl CommandSource for PreviewWindow {
    fn poll(&mut self) -> Vec<char> {
        let shift = self.window.is_key_down(Key::LeftShift) || self.window.is_key_down(Key::RightShift);
        self.window
            .get_keys_pressed(KeyRepeat::No)
            .into_iter()
            .filter_map(|key| key_to_char(key, shift))
            .collect()
    }

    fn is_open(&self) -> bool {
        self.window.is_open()
    }
}

impl Drop for PreviewWindow {
    fn drop(&mut self) {
        tracing::debug!("Closing preview window");
    }
}

fn key_to_char(key: Key, shift: bool) -> Option<char> {
    LETTER_KEYS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|&(_, c)| if shift { c.to_ascii_uppercase() } else { c })
}
