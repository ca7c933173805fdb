use macroquad::prelude::*;
use macroquad::miniquad::conf::Platform;

mod animation;
mod camera;
mod helpers;
mod player;
mod world;

use animation::FrameTable;
use camera::Camera;
use player::{CollisionShape, FrameInput, Player};
use world::{ChunkGrid, TerrainMask, WorldConfig, CHUNK_SIZE};

const WINDOW_WIDTH: i32 = 1900;
const WINDOW_HEIGHT: i32 = 1000;
const MENU_GREEN: Color = Color::new(34.0 / 255.0, 139.0 / 255.0, 34.0 / 255.0, 1.0);
const LOADING_BAR_SIZE: Vec2 = Vec2::new(400.0, 40.0);

fn window_conf() -> Conf {
    Conf {
        window_title: "Wildergrove".to_owned(),
        window_width: WINDOW_WIDTH,
        window_height: WINDOW_HEIGHT,
        sample_count: 1,
        platform: Platform {
            linux_wm_class: "wildergrove",
            ..Default::default()
        },
        ..Default::default()
    }
}

async fn show_loading(label: &str, progress: f32) {
    let pct = (progress.clamp(0.0, 1.0) * 100.0).round();
    let bar = LOADING_BAR_SIZE;
    let pos = vec2(
        (screen_width() - bar.x) * 0.5,
        (screen_height() - bar.y) * 0.5,
    );

    set_default_camera();
    clear_background(BLACK);
    draw_rectangle(pos.x - 3.0, pos.y - 3.0, bar.x + 6.0, bar.y + 6.0, MENU_GREEN);
    draw_rectangle(pos.x, pos.y, bar.x, bar.y, BLACK);
    draw_rectangle(
        pos.x,
        pos.y,
        bar.x * progress.clamp(0.0, 1.0),
        bar.y,
        MENU_GREEN,
    );
    draw_text(
        &format!("{label} {pct:.0}%"),
        pos.x,
        pos.y - 30.0,
        36.0,
        WHITE,
    );
    next_frame().await;
}

async fn main_menu() {
    let items = ["Start Game", "Options", "Exit"];
    let mut selected = 0usize;

    loop {
        clear_background(BLACK);

        let title = "Wildergrove";
        let title_dims = measure_text(title, None, 74, 1.0);
        draw_text(
            title,
            (screen_width() - title_dims.width) * 0.5,
            140.0,
            74.0,
            MENU_GREEN,
        );

        for (i, item) in items.iter().enumerate() {
            let color = if i == selected { MENU_GREEN } else { WHITE };
            let dims = measure_text(item, None, 48, 1.0);
            draw_text(
                item,
                (screen_width() - dims.width) * 0.5,
                280.0 + i as f32 * 60.0,
                48.0,
                color,
            );
        }

        if is_key_pressed(KeyCode::Up) {
            selected = (selected + items.len() - 1) % items.len();
        }
        if is_key_pressed(KeyCode::Down) {
            selected = (selected + 1) % items.len();
        }
        if is_key_pressed(KeyCode::Enter) {
            match selected {
                0 => return,
                1 => {} // options screen not built yet
                _ => std::process::exit(0),
            }
        }

        next_frame().await;
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    main_menu().await;

    show_loading("Loading", 0.0).await;
    let config = WorldConfig::load("world.json").await.unwrap_or_else(|err| {
        eprintln!("world manifest load failed: {err}");
        eprintln!("Please ensure assets/world.json exists");
        panic!("world manifest loading failed");
    });
    let bounds = config.bounds();

    show_loading("Loading", 0.15).await;
    let terrain = helpers::load_filtered_texture("terrain.png")
        .await
        .unwrap_or_else(|err| {
            eprintln!("terrain load failed: {err:?}");
            panic!("terrain loading failed");
        });

    show_loading("Loading", 0.35).await;
    let mask = TerrainMask::load("collision.png", config.map_width, config.map_height)
        .await
        .unwrap_or_else(|err| {
            eprintln!("collision mask load failed: {err}");
            panic!("collision mask loading failed");
        });

    show_loading("Indexing terrain", 0.55).await;
    let grid = ChunkGrid::build(&mask, CHUNK_SIZE);

    show_loading("Loading", 0.7).await;
    let sheet = helpers::load_filtered_texture("link.png")
        .await
        .unwrap_or_else(|err| {
            eprintln!("sprite sheet load failed: {err:?}");
            panic!("sprite sheet loading failed");
        });

    show_loading("Loading", 0.8).await;
    let silhouette = load_image(&helpers::asset_path("link_collision.png"))
        .await
        .unwrap_or_else(|err| {
            eprintln!("silhouette load failed: {err:?}");
            panic!("silhouette loading failed");
        });
    let shape = CollisionShape::from_image(&silhouette);
    if shape.is_empty() {
        eprintln!("silhouette image has no black pixels; player will never collide");
    }

    show_loading("Loading", 0.9).await;
    let frames = FrameTable::load("atlas.yaml").await.unwrap_or_else(|err| {
        eprintln!("atlas load failed: {err}");
        panic!("atlas loading failed");
    });

    show_loading("Loading", 1.0).await;

    let mut player = Player::new(
        vec2(config.spawn_x, config.spawn_y),
        sheet,
        frames,
        shape,
    );
    let mut camera = Camera::new(
        vec2(config.viewport_width, config.viewport_height),
        vec2(config.map_width as f32, config.map_height as f32),
    );

    let mut fps_timer: f32 = 0.0;
    let mut fps: i32 = 0;

    loop {
        let dt = get_frame_time();
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        let input = FrameInput::poll();
        player.update(&input, dt, &grid, bounds);
        camera.update(player.center());

        set_default_camera();
        clear_background(BLACK);

        let offset = camera.offset();
        draw_texture(&terrain, -offset.x, -offset.y, WHITE);
        if player.world_rect().overlaps(&camera.view_rect()) {
            player.draw(&camera);
        }

        fps_timer += get_frame_time();
        if fps_timer >= 1.0 {
            fps = get_fps();
            fps_timer = 0.0;
        }
        draw_text(&format!("FPS: {fps}"), 20.0, 40.0, 30.0, WHITE);

        next_frame().await;
    }
}
