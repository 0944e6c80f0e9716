mod controllers;

use controllers::{PointerController, PointerEvent, PointerFrame};
use log::{info, warn};
use macroquad::prelude::*;
use volumes::clock::FrameClock;
use volumes::palette::Tint;
use volumes::{
    CpalOutput, EntityId, GestureSink, Location, SceneRenderer, Session, SessionConfig,
    VisualHandle, VoiceId,
};

const SCREEN_WIDTH: f32 = 1280.0;
const SCREEN_HEIGHT: f32 = 720.0;
const SPHERE_RADIUS: f32 = 0.25;
const SPHERE_LIFT: f32 = 0.6;
const HUD_FONT_SIZE: f32 = 22.0;

const BACKGROUND: Color = Color {
    r: 0.02,
    g: 0.02,
    b: 0.04,
    a: 1.0,
};
const GRID: Color = Color {
    r: 0.2,
    g: 0.22,
    b: 0.28,
    a: 1.0,
};
const HUD: Color = Color {
    r: 0.7,
    g: 0.8,
    b: 0.9,
    a: 1.0,
};

struct SphereVisual {
    id: EntityId,
    color: [f32; 3],
    base: Vec3,
    emissive: f32,
    offset: f32,
}

impl SphereVisual {
    fn center(&self) -> Vec3 {
        self.base + vec3(0.0, self.offset, 0.0)
    }
}

/// Draws the spheres the session places. Visual handles index `spheres`.
#[derive(Default)]
struct MacroquadScene {
    spheres: Vec<SphereVisual>,
}

impl MacroquadScene {
    fn hit_test(&self, origin: Vec3, dir: Vec3) -> Option<EntityId> {
        self.spheres
            .iter()
            .filter_map(|sphere| {
                ray_sphere(origin, dir, sphere.center(), SPHERE_RADIUS).map(|t| (t, sphere.id))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, id)| id)
    }

    fn draw(&self, min_emissive: f32, max_emissive: f32) {
        let span = (max_emissive - min_emissive).max(f32::EPSILON);
        for sphere in &self.spheres {
            let glow = ((sphere.emissive - min_emissive) / span).clamp(0.0, 1.0);
            let [r, g, b] = sphere.color;
            let body = 0.35 + 0.65 * glow;
            draw_sphere(
                sphere.center(),
                SPHERE_RADIUS,
                None,
                Color::new(r * body, g * body, b * body, 1.0),
            );
            draw_sphere(
                sphere.center(),
                SPHERE_RADIUS * (1.1 + 0.4 * glow),
                None,
                Color::new(r, g, b, 0.05 + 0.2 * glow),
            );
        }
    }
}

impl SceneRenderer for MacroquadScene {
    fn create_visual(&mut self, id: EntityId, tint: Tint, location: Location) -> VisualHandle {
        let handle = VisualHandle(self.spheres.len() as u64);
        self.spheres.push(SphereVisual {
            id,
            color: tint.to_unit(),
            base: Vec3::from(location),
            emissive: 0.0,
            offset: 0.0,
        });
        handle
    }

    fn set_emissive_intensity(&mut self, handle: VisualHandle, intensity: f32) {
        if let Some(sphere) = self.spheres.get_mut(handle.0 as usize) {
            sphere.emissive = intensity;
        }
    }

    fn set_vertical_offset(&mut self, handle: VisualHandle, offset: f32) {
        if let Some(sphere) = self.spheres.get_mut(handle.0 as usize) {
            sphere.offset = offset;
        }
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    let config = SessionConfig::default();
    let mut clock = FrameClock::new(config.animation.tick_rate_hz);
    let mut session = Session::new(MacroquadScene::default(), CpalOutput::new(), config);
    if session.start_audio().is_err() {
        warn!("continuing without audio");
    }

    let camera = Camera3D {
        position: vec3(0.0, 2.5, 4.0),
        target: vec3(0.0, 0.4, 0.0),
        up: vec3(0.0, 1.0, 0.0),
        ..Default::default()
    };
    let mut pointer = PointerController::new();
    let mut last_mouse = mouse_position();

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }
        let dt = get_frame_time();
        let mouse = mouse_position();
        let (origin, dir) = mouse_ray(&camera, mouse);
        let frame = PointerFrame {
            hovered: session.renderer().hit_test(origin, dir),
            pressed: is_mouse_button_pressed(MouseButton::Left),
            down: is_mouse_button_down(MouseButton::Left),
            released: is_mouse_button_released(MouseButton::Left),
            moved: mouse != last_mouse,
        };
        last_mouse = mouse;

        match pointer.handle(frame, dt) {
            Some(PointerEvent::Place) => {
                if let Some(floor) = floor_hit(origin, dir) {
                    let location = floor + vec3(0.0, SPHERE_LIFT, 0.0);
                    session.placement_requested(location.to_array());
                }
            }
            Some(PointerEvent::Begin(id)) => session.on_select_begin(id),
            Some(PointerEvent::Change(id)) => session.on_select_change(id),
            Some(PointerEvent::End(id)) => session.on_select_end(id),
            None => {}
        }

        for _ in 0..clock.advance(dt) {
            session.tick();
        }

        clear_background(BACKGROUND);
        set_camera(&camera);
        draw_grid(20, 0.5, GRID, GRID);
        let anim = session.config().animation;
        session.renderer().draw(anim.min_emissive, anim.max_emissive);

        set_default_camera();
        draw_hud(&session, pointer.selected());

        next_frame().await;
    }

    session.teardown();
    info!("bye");
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Volumes".into(),
        fullscreen: false,
        sample_count: 4,
        window_width: SCREEN_WIDTH as i32,
        window_height: SCREEN_HEIGHT as i32,
        high_dpi: false,
        ..Default::default()
    }
}

fn draw_hud(session: &Session<MacroquadScene, CpalOutput>, selected: Option<EntityId>) {
    let pitch = session.pitch();
    let lines = [
        format!("bass {:.2} Hz  treble {:.2} Hz", pitch.bass, pitch.treble),
        format!(
            "levels  treble {:.2}  bass {:.2}",
            session.voice(VoiceId::Treble).volume(),
            session.voice(VoiceId::Bass).volume()
        ),
        match selected {
            Some(id) => format!("holding {id}"),
            None => "click the floor to place, hold a sphere to play".to_string(),
        },
    ];
    if !session.is_audio_running() {
        draw_text("no audio device", 16.0, SCREEN_HEIGHT - 16.0, HUD_FONT_SIZE, RED);
    }
    for (row, line) in lines.iter().enumerate() {
        draw_text(line, 16.0, 28.0 + row as f32 * 26.0, HUD_FONT_SIZE, HUD);
    }
}

/// World-space ray under the cursor.
fn mouse_ray(camera: &Camera3D, mouse: (f32, f32)) -> (Vec3, Vec3) {
    let ndc = vec2(
        mouse.0 / screen_width() * 2.0 - 1.0,
        1.0 - mouse.1 / screen_height() * 2.0,
    );
    let inverse = camera.matrix().inverse();
    let near = inverse.project_point3(vec3(ndc.x, ndc.y, -1.0));
    let far = inverse.project_point3(vec3(ndc.x, ndc.y, 1.0));
    (near, (far - near).normalize_or_zero())
}

fn floor_hit(origin: Vec3, dir: Vec3) -> Option<Vec3> {
    if dir.y >= -f32::EPSILON {
        return None;
    }
    let t = -origin.y / dir.y;
    (t > 0.0).then(|| origin + dir * t)
}

fn ray_sphere(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let to_center = origin - center;
    let b = to_center.dot(dir);
    let c = to_center.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let t = -b - discriminant.sqrt();
    (t > 0.0).then_some(t)
}
