//! Hexbounce entry point
//!
//! Runs the simulation headless: a ball in a small hex room, then a polygon
//! scene grown edge by edge, logging every bounce with its MIDI bytes.
//!
//! Usage: `hexbounce [config.json] [seed]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Hexbounce (native) starting...");

    let mut args = std::env::args().skip(1);
    let config = demo::load_config(args.next().as_deref());
    let seed = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0x5eed_u64);

    demo::run_hex_room(&config, seed, 600);
    demo::run_polygon_scene(&config, 300);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Library-only on the web; the host drives the simulation
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::cell::Cell;
    use std::rc::Rc;

    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use hexbounce::consts::FRAME_DT;
    use hexbounce::midi::{MidiMapper, ScaleSpeed};
    use hexbounce::sim::{
        Axial, Ball, ChangeHistory, CollisionRecord, DragController, EdgeExtension, HexGrid,
        HexStyle, Polygon, Scene, StyleRegistry, add_hexagon_at_edge, step_grid, step_polygons,
    };
    use hexbounce::{EventBus, HistoryEvent, SimConfig};

    const MIDI_CHANNEL: u8 = 0;

    fn midi_mapper() -> MidiMapper {
        MidiMapper::new(MIDI_CHANNEL).with_transform(ScaleSpeed(1.2))
    }

    /// Config from a JSON file, or defaults when none is given or it is invalid
    pub fn load_config(path: Option<&str>) -> SimConfig {
        let Some(path) = path else {
            return SimConfig::default();
        };
        let loaded = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|json| SimConfig::from_json(&json).map_err(|e| e.to_string()));
        match loaded {
            Ok(config) => config,
            Err(e) => {
                log::error!("Failed to load config from {}: {}", path, e);
                SimConfig::default()
            }
        }
    }

    fn log_bounce(
        label: &str,
        mapper: &MidiMapper,
        record: &CollisionRecord,
        grid: Option<&HexGrid>,
    ) {
        let event = mapper.event(record, grid);
        let bytes = mapper.messages(record, grid).map(|m| m.bytes());
        log::info!(
            "{} bounce {:?}: angle {:.1}, speed {:.2}, note {} vel {} -> {:02X?}",
            label,
            record.tag,
            event.angle_deg,
            event.speed,
            event.note,
            event.velocity,
            bytes
        );
    }

    fn count_collisions(bus: &mut EventBus) -> Rc<Cell<u32>> {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        bus.collisions.subscribe(move |_| c.set(c.get() + 1));
        count
    }

    /// Six-cell room around the origin with a seeded launch direction
    pub fn run_hex_room(config: &SimConfig, seed: u64, ticks: u32) {
        let styles = StyleRegistry::new().with_style("fire", HexStyle::fire());
        let mut grid = HexGrid::for_viewport(
            config.viewport_width,
            config.viewport_height,
            config.hex_radius,
            styles,
        );
        for (q, r) in [(0, 0), (0, 1), (1, 1), (1, 0), (1, -1), (0, -1)] {
            grid.set_active(Axial::new(q, r), true);
        }
        grid.set_type(Axial::new(1, 0), "fire");

        let mut rng = Pcg32::seed_from_u64(seed);
        let angle: f32 = rng.random_range(0.0..std::f32::consts::TAU);
        let speed = config.default_velocity.length();
        let mut ball = Ball::new(Vec2::ZERO, Vec2::from_angle(angle) * speed, config.ball_radius);
        log::info!(
            "Hex room: {} active cells, seed {}, launch angle {:.1}",
            grid.active_cells().count(),
            seed,
            angle.to_degrees()
        );

        let mapper = midi_mapper();
        let mut bus = EventBus::new();
        let count = count_collisions(&mut bus);
        for _ in 0..ticks {
            step_grid(&mut ball, &grid, config, FRAME_DT, &mut |record: &CollisionRecord| {
                bus.collisions.publish(record);
                log_bounce("hex", &mapper, record, Some(&grid));
            });
        }
        log::info!(
            "Hex room done: {} bounces in {} ticks, ball at ({:.1}, {:.1})",
            count.get(),
            ticks,
            ball.pos.x,
            ball.pos.y
        );
    }

    /// Grow a hexagon into a larger polygon, drag it, undo and redo, then
    /// bounce the ball inside it
    pub fn run_polygon_scene(config: &SimConfig, ticks: u32) {
        let mut scene = Scene::new(Ball::new(Vec2::ZERO, config.default_velocity, config.ball_radius));
        let mut history = ChangeHistory::new();
        let mapper = midi_mapper();
        let mut bus = EventBus::new();
        let count = count_collisions(&mut bus);
        bus.history
            .subscribe(|event: &HistoryEvent| log::info!("History: {:?}", event));

        let base = scene.next_polygon_id();
        scene.push_polygon(Polygon::regular_hexagon(base, Vec2::ZERO, config.hex_radius, 0.0));

        let mut target = base;
        for edge in [0, 9] {
            match add_hexagon_at_edge(
                &mut scene,
                &mut history,
                target,
                edge,
                config.hex_radius,
                config.merge_tolerance,
            ) {
                Ok(EdgeExtension::Merged { merged, .. }) => target = merged,
                Ok(EdgeExtension::Unmerged { hexagon }) => {
                    log::warn!("Hexagon {} left unmerged", hexagon);
                }
                Err(e) => {
                    log::error!("Could not extend polygon {}: {}", target, e);
                    return;
                }
            }
            if let Some(description) = history.undo_description() {
                bus.history.publish(&HistoryEvent::Applied(description.to_string()));
            }
        }

        let mut drag = DragController::new();
        if drag.begin(&mut scene, Vec2::ZERO).is_some() {
            drag.drag_to(&mut scene, Vec2::new(25.0, -10.0));
            if drag.end(&mut scene, &mut history, config.default_velocity) {
                if let Some(description) = history.undo_description() {
                    bus.history.publish(&HistoryEvent::Applied(description.to_string()));
                }
            }
        }

        if let Some(description) = history.undo(&mut scene) {
            bus.history.publish(&HistoryEvent::Undone(description.to_string()));
        }
        if let Some(description) = history.redo(&mut scene) {
            bus.history.publish(&HistoryEvent::Redone(description.to_string()));
        }
        log::info!(
            "Polygon scene: {} polygon(s), {} vertices in the first, {} change(s) recorded",
            scene.polygons.len(),
            scene.polygons.first().map_or(0, Polygon::len),
            history.len()
        );

        // Start inside the grown polygon
        if let Some(polygon) = scene.polygons.first() {
            scene.ball.pos = polygon.centroid();
        }
        for _ in 0..ticks {
            step_polygons(&mut scene, config, FRAME_DT, &mut |record: &CollisionRecord| {
                bus.collisions.publish(record);
                log_bounce("polygon", &mapper, record, None);
            });
        }
        log::info!("Polygon scene done: {} bounces in {} ticks", count.get(), ticks);
    }
}
