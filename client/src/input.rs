//! Keyboard sampling turned into movement offsets for the local player

use macroquad::prelude::*;

/// Local player speed in world units per second
pub const PLAYER_SPEED: f64 = 200.0;

/// Which movement keys are held this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Direction {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl Direction {
    /// Reads WASD and the arrow keys
    pub fn from_keyboard() -> Self {
        Self {
            left: is_key_down(KeyCode::A) || is_key_down(KeyCode::Left),
            right: is_key_down(KeyCode::D) || is_key_down(KeyCode::Right),
            up: is_key_down(KeyCode::W) || is_key_down(KeyCode::Up),
            down: is_key_down(KeyCode::S) || is_key_down(KeyCode::Down),
        }
    }
}

/// Turns held keys into per-frame movement
pub struct InputManager {
    speed: f64,
}

impl InputManager {
    pub fn new() -> Self {
        Self::with_speed(PLAYER_SPEED)
    }

    pub fn with_speed(speed: f64) -> Self {
        Self { speed }
    }

    /// Samples the keyboard and returns this frame's offset, if any key moves us
    pub fn update(&self, frame_time: f32) -> Option<(f64, f64)> {
        movement_delta(Direction::from_keyboard(), self.speed, frame_time as f64)
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Offset covered in `dt` seconds. Diagonals are normalized so they are not faster.
pub fn movement_delta(direction: Direction, speed: f64, dt: f64) -> Option<(f64, f64)> {
    let x = axis(direction.left, direction.right);
    let y = axis(direction.up, direction.down);

    if x == 0.0 && y == 0.0 {
        return None;
    }

    let (nx, ny) = normalize_vector(x, y);
    Some((nx * speed * dt, ny * speed * dt))
}

fn axis(negative: bool, positive: bool) -> f64 {
    match (negative, positive) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    }
}

// Calculate normalized vector
pub fn normalize_vector(x: f64, y: f64) -> (f64, f64) {
    let magnitude = (x * x + y * y).sqrt();
    if magnitude > 0.0 {
        (x / magnitude, y / magnitude)
    } else {
        (0.0, 0.0)
    }
}
