//! Platform abstraction layer
//!
//! Every input device answers the same three questions. The simulation never
//! looks at a key code or a touch point directly.

use std::collections::HashSet;

use crate::consts::WORLD_WIDTH;

/// Input capability consumed by the combat core
pub trait InputSource {
    fn is_left_active(&self) -> bool;
    fn is_right_active(&self) -> bool;
    fn is_shoot_active(&self) -> bool;
}

/// Keyboard: arrows or A/D to move, space to shoot
///
/// Codes are DOM `KeyboardEvent.code` strings.
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    held: HashSet<String>,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, code: &str) {
        self.held.insert(code.to_string());
    }

    pub fn key_up(&mut self, code: &str) {
        self.held.remove(code);
    }

    /// Focus loss: drop everything so nothing stays stuck down
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    fn any_held(&self, codes: &[&str]) -> bool {
        codes.iter().any(|c| self.held.contains(*c))
    }
}

impl InputSource for KeyboardState {
    fn is_left_active(&self) -> bool {
        self.any_held(&["ArrowLeft", "KeyA"])
    }

    fn is_right_active(&self) -> bool {
        self.any_held(&["ArrowRight", "KeyD"])
    }

    fn is_shoot_active(&self) -> bool {
        self.any_held(&["Space"])
    }
}

/// Touch: press the left or right half of the screen. Always auto-fires.
#[derive(Debug, Clone)]
pub struct TouchState {
    left: bool,
    right: bool,
    screen_width: f32,
}

impl Default for TouchState {
    fn default() -> Self {
        Self::new(WORLD_WIDTH)
    }
}

impl TouchState {
    pub fn new(screen_width: f32) -> Self {
        Self {
            left: false,
            right: false,
            screen_width,
        }
    }

    pub fn pointer_down(&mut self, x: f32) {
        if x < self.screen_width / 2.0 {
            self.left = true;
        } else {
            self.right = true;
        }
    }

    pub fn pointer_up(&mut self) {
        self.left = false;
        self.right = false;
    }
}

impl InputSource for TouchState {
    fn is_left_active(&self) -> bool {
        self.left
    }

    fn is_right_active(&self) -> bool {
        self.right
    }

    fn is_shoot_active(&self) -> bool {
        true
    }
}

/// On-screen arrow buttons (mobile)
#[derive(Debug, Clone, Copy, Default)]
pub struct VirtualButtons {
    pub left: bool,
    pub right: bool,
}

impl InputSource for VirtualButtons {
    fn is_left_active(&self) -> bool {
        self.left
    }

    fn is_right_active(&self) -> bool {
        self.right
    }

    fn is_shoot_active(&self) -> bool {
        false
    }
}

/// Several sources at once; a direction is active if any source says so
#[derive(Default)]
pub struct CombinedInput<'a> {
    sources: Vec<&'a dyn InputSource>,
}

impl<'a> CombinedInput<'a> {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    pub fn with(mut self, source: &'a dyn InputSource) -> Self {
        self.sources.push(source);
        self
    }
}

impl InputSource for CombinedInput<'_> {
    fn is_left_active(&self) -> bool {
        self.sources.iter().any(|s| s.is_left_active())
    }

    fn is_right_active(&self) -> bool {
        self.sources.iter().any(|s| s.is_right_active())
    }

    fn is_shoot_active(&self) -> bool {
        self.sources.iter().any(|s| s.is_shoot_active())
    }
}
