use crate::world::World;
use macroquad::prelude::*;

const BACKGROUND: Color = Color::new(0.1, 0.1, 0.1, 1.0);
const REMOTE_COLOR: Color = Color::new(1.0, 0.27, 0.27, 1.0);

pub struct Renderer {
    font_size: f32,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer { font_size: 20.0 }
    }

    /// Draws every known player as a circle of its radius
    pub fn render(&self, world: &World, connected: bool) {
        clear_background(BACKGROUND);

        for (id, player) in world.sorted_players() {
            let is_local_player = Some(id) == world.local_id();
            let color = if is_local_player { GREEN } else { REMOTE_COLOR };

            let (x, y, radius) = (player.x as f32, player.y as f32, player.radius as f32);
            draw_circle(x, y, radius, color);
            draw_circle_lines(x, y, radius, 2.0, WHITE);
            draw_text(&id.to_string(), x - 4.0, y - radius - 4.0, 16.0, WHITE);
        }

        self.draw_ui(world, connected);
    }

    fn draw_ui(&self, world: &World, connected: bool) {
        let player = match world.local_id() {
            Some(id) => format!("Player: {}", id),
            None => "Player: spectator".to_string(),
        };
        let status = if connected { "Connected" } else { "Disconnected" };

        let lines = [
            player,
            format!("Players: {}", world.len()),
            format!("Status: {}", status),
            "WASD / arrows to move, Esc to quit".to_string(),
        ];

        let x = screen_width() - 260.0;
        for (i, line) in lines.iter().enumerate() {
            draw_text(line, x, 24.0 + i as f32 * self.font_size, self.font_size, LIGHTGRAY);
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
