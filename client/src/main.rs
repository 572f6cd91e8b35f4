use clap::Parser;
use client::input::InputManager;
use client::network::Connection;
use client::rendering::Renderer;
use client::world::World;
use log::{error, info};
use macroquad::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Relay server URL to connect to
    #[arg(short = 's', long, default_value = "ws://127.0.0.1:3000")]
    server: String,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Position Relay".to_owned(),
        window_width: 800,
        window_height: 600,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    info!("Connecting to: {}", args.server);
    let mut connection = match Connection::open(&args.server) {
        Ok(connection) => connection,
        Err(e) => {
            error!("Failed to connect to {}: {}", args.server, e);
            return;
        }
    };
    info!("Controls: WASD or arrow keys to move, Esc to quit");

    let mut world = World::new(connection.id());
    let input = InputManager::new();
    let renderer = Renderer::new();

    loop {
        while let Some(message) = connection.try_recv() {
            world.apply(message);
        }

        if connection.is_connected() {
            if let Some((dx, dy)) = input.update(get_frame_time()) {
                if let Some(update) = world.move_local(dx, dy) {
                    connection.send(update);
                }
            }
        }

        renderer.render(&world, connection.is_connected());

        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        next_frame().await;
    }
}
