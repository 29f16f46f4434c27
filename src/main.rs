//! Fallcity - endless falling city viewer

use std::path::PathBuf;
use std::sync::{Arc, Mutex as StdMutex};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use fallcity::city::{CityConfig, CitySystem};
use fallcity::core::{
    error::Error,
    logging,
    time::{FrameTimer, TickClock},
    types::Result,
};
use fallcity::remote::{self, AppControlHandler, SharedControlState};
use fallcity::render::{CityRenderer, ResizeTarget, Viewport, WindowConfig};
use fallcity::scene::SceneGraph;

struct App {
    window_config: WindowConfig,
    window: Option<Arc<Window>>,
    renderer: Option<CityRenderer>,
    viewport: Viewport,
    scene: SceneGraph,
    city: CitySystem,
    timer: FrameTimer,
    clock: TickClock,
    control_state: Arc<StdMutex<SharedControlState>>,
    last_title_frame: u64,
    /// Set when the app has to stop with an error
    fatal: Option<Error>,
}

impl App {
    fn new(
        scene: SceneGraph,
        city: CitySystem,
        control_state: Arc<StdMutex<SharedControlState>>,
    ) -> Self {
        let window_config = WindowConfig::default();
        let viewport = Viewport::new(window_config.width, window_config.height);
        let clock = TickClock::new(city.config().tick_rate);

        Self {
            window_config,
            window: None,
            renderer: None,
            viewport,
            scene,
            city,
            timer: FrameTimer::new(),
            clock,
            control_state,
            last_title_frame: 0,
            fatal: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: Error) {
        log::error!("{}", error);
        self.fatal = Some(error);
        event_loop.exit();
    }

    fn resize(&mut self, width: u32, height: u32) {
        let target = self.renderer.as_mut().map(|r| r as &mut dyn ResizeTarget);
        self.viewport
            .resize(self.city.camera_mut(), target, width, height);
    }

    /// Apply queued control edits, advance the city, draw.
    fn frame(&mut self) -> Result<()> {
        self.timer.tick();
        let ticks = self.clock.advance(self.timer.delta_secs());

        // Edits land between ticks, never inside one
        let edits = remote::lock(&self.control_state).drain_edits();
        for edit in edits {
            if let Err(e) = self.city.apply_edit(edit, &mut self.scene) {
                log::error!("Queued edit {} failed: {}", edit, e);
            }
        }

        self.city.tick(ticks, &mut self.scene);
        self.scene.take_redraw_request();

        if let Some(renderer) = self.renderer.as_mut() {
            renderer.render(&mut self.scene, self.city.camera(), self.city.atmosphere())?;
        }

        remote::lock(&self.control_state).publish(&self.city, self.timer.stats());
        self.update_title();
        Ok(())
    }

    fn update_title(&mut self) {
        // Once per second is plenty
        let frames = self.timer.frame_count();
        if frames - self.last_title_frame < 60 {
            return;
        }
        self.last_title_frame = frames;
        if let Some(window) = &self.window {
            window.set_title(&format!(
                "{} - {:.0} FPS",
                self.window_config.title,
                self.timer.fps()
            ));
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(self.window_config.attributes()) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(event_loop, Error::Window(format!("Failed to create window: {}", e)));
                return;
            }
        };

        let renderer = match pollster::block_on(CityRenderer::new(window.clone())) {
            Ok(renderer) => renderer,
            Err(e) => {
                self.fail(event_loop, e);
                return;
            }
        };

        let size = window.inner_size();
        log::info!("Window created: {}x{}", size.width, size.height);

        self.renderer = Some(renderer);
        self.window = Some(window);
        self.resize(size.width, size.height);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Window close requested");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.frame() {
                    self.fail(event_loop, e);
                    return;
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Start the control server on its own thread with a tokio runtime.
fn spawn_control_server(state: Arc<StdMutex<SharedControlState>>, port: u16) -> Result<()> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()?;

    std::thread::Builder::new()
        .name("control-server".into())
        .spawn(move || {
            rt.block_on(async {
                let handler = Arc::new(tokio::sync::Mutex::new(AppControlHandler::new(state)));
                let _server = fallcity_control::ControlServer::start(handler, port);
                // Keep runtime alive forever
                loop {
                    tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
                }
            });
        })?;

    Ok(())
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let mut config = match parse_config_arg(&args) {
        Some(path) => CityConfig::load(&path)?,
        None => CityConfig::default(),
    };
    if let Some(seed) = parse_seed_arg(&args)? {
        config.seed = Some(seed);
    }

    let mut scene = SceneGraph::new();
    let city = CitySystem::new(config, &mut scene)?;

    let control_state = Arc::new(StdMutex::new(SharedControlState::new(&city)));
    match city.config().control_port {
        Some(port) => spawn_control_server(control_state.clone(), port)?,
        None => log::info!("Control server disabled"),
    }

    let event_loop = EventLoop::new()
        .map_err(|e| Error::Window(format!("Failed to create event loop: {}", e)))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(scene, city, control_state);
    event_loop
        .run_app(&mut app)
        .map_err(|e| Error::Window(format!("Event loop error: {}", e)))?;

    match app.fatal.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn main() {
    logging::init();
    log::info!("Fallcity starting...");

    if let Err(e) = run() {
        log::error!("Fatal: {}", e);
        std::process::exit(1);
    }
}

/// Parse --config argument from command line
fn parse_config_arg(args: &[String]) -> Option<PathBuf> {
    for i in 0..args.len() {
        if args[i] == "--config" || args[i] == "-c" {
            if let Some(path) = args.get(i + 1) {
                return Some(PathBuf::from(path));
            }
        }
    }
    None
}

/// Parse --seed argument from command line (debris RNG seed)
fn parse_seed_arg(args: &[String]) -> Result<Option<u64>> {
    for i in 0..args.len() {
        if args[i] == "--seed" || args[i] == "-s" {
            let Some(seed_str) = args.get(i + 1) else {
                return Err(Error::config("--seed", "needs a value"));
            };
            return seed_str
                .parse()
                .map(Some)
                .map_err(|_| Error::config("--seed", format!("must be an integer (got {seed_str:?})")));
        }
    }
    Ok(None)
}
