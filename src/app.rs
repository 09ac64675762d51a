//! Application shell and event loop.
//!
//! [`App`] is the winit [`ApplicationHandler`]. It builds the [`AppState`] once
//! the window exists, starts the model loads and the frame loop, and routes
//! every host event to the part of the state that owns it:
//!
//! 1. `Resized` goes to the [`Viewport`], which updates the lens and the surface
//! 2. pointer, wheel and touch input goes to the [`OrbitControls`]
//! 3. `RedrawRequested` ticks the [`FrameDriver`], which updates the controls,
//!    renders and asks for the next frame
//! 4. finished loads arrive as [`AppEvent::ModelLoaded`] and are added to the scene
//!
//! All of this happens on the event loop thread, so the scene graph needs no locking.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    camera::{Camera, Projection},
    config::Config,
    context::Context,
    controls::OrbitControls,
    data_structures::scene_graph::SceneGraph,
    frame::FrameDriver,
    render::SceneRenderer,
    resources::{
        AssetSource,
        loader::{CompletionSink, LoadCompletion, Loader},
    },
    scene,
    viewport::{self, Viewport},
};

pub enum AppEvent {
    ModelLoaded(LoadCompletion),
    /// The asynchronously created state on the web.
    #[cfg(target_arch = "wasm32")]
    Initialized(Box<anyhow::Result<AppState>>),
}

impl CompletionSink for EventLoopProxy<AppEvent> {
    fn deliver(&self, completion: LoadCompletion) {
        let path = completion.request.path.clone();
        if self.send_event(AppEvent::ModelLoaded(completion)).is_err() {
            log::warn!("Load of {path} finished after the event loop closed");
        }
    }
}

/// Everything that lives as long as the window.
pub struct AppState {
    pub ctx: Context,
    pub scene: SceneGraph,
    pub camera: Camera,
    pub projection: Projection,
    pub controls: OrbitControls,
    pub viewport: Viewport,
    pub renderer: SceneRenderer,
    pub driver: FrameDriver,
}

impl AppState {
    /// Build the state in dependency order: viewport, scene, camera, GPU, renderer.
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let viewport = Viewport::from_physical(window.inner_size(), window.scale_factor());

        let mut scene = scene::new_scene();
        scene::assemble(&mut scene);
        log::info!(
            "Assembled {} objects and {} lights",
            scene.len(),
            scene.lights().len()
        );

        let camera = scene::initial_camera();
        let projection = scene::initial_projection(&viewport);
        let controls = scene::initial_controls();

        let ctx = Context::new(window, &scene, &camera, &projection, viewport.buffer_size()).await?;
        let renderer = SceneRenderer::new(&ctx);

        Ok(Self {
            ctx,
            scene,
            camera,
            projection,
            controls,
            viewport,
            renderer,
            driver: FrameDriver::new(),
        })
    }

    fn resize(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        let scale_factor = self.ctx.window.scale_factor();
        let logical = size.to_logical::<f64>(scale_factor);
        if let Some((width, height)) = viewport::handle_resize(
            &mut self.viewport,
            &mut self.projection,
            logical.width,
            logical.height,
            scale_factor,
        ) {
            self.ctx.resize(width, height);
        }
    }

    /// One frame: move the camera, then draw.
    fn redraw(&mut self) {
        let Self {
            ctx,
            scene,
            camera,
            projection,
            controls,
            renderer,
            driver,
            ..
        } = self;
        let mut window = ctx.window.clone();
        driver.tick(&mut window, |_time| {
            controls.update(camera);
            match renderer.render(ctx, scene, camera, projection) {
                Ok(()) => {}
                // Reconfigure the surface if it's lost or outdated
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => ctx.configure(),
                Err(e) => log::error!("Unable to render {}", e),
            }
        });
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<AppEvent>,
    config: Config,
    loader: Loader,
    window: Option<Arc<Window>>,
    state: Option<AppState>,
    error: Option<anyhow::Error>,
}

impl App {
    pub fn new(event_loop: &EventLoop<AppEvent>, config: Config) -> anyhow::Result<Self> {
        let source = AssetSource::from(&config);
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        #[cfg(not(target_arch = "wasm32"))]
        let loader = Loader::new(async_runtime.handle().clone(), source);
        #[cfg(target_arch = "wasm32")]
        let loader = Loader::new(source);

        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy: event_loop.create_proxy(),
            config,
            loader,
            window: None,
            state: None,
            error: None,
        })
    }

    /// The error that ended the app early, if any.
    pub fn into_result(self) -> anyhow::Result<()> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("App initialization failed: {error:#}");
        self.error = Some(error);
        event_loop.exit();
    }

    /// Take over a freshly built state: kick off the loads and the frame loop.
    fn start(&mut self, mut state: AppState) {
        for request in scene::load_requests() {
            self.loader.spawn(request, self.proxy.clone());
        }
        let size = state.ctx.window.inner_size();
        state.resize(size);
        let mut window = state.ctx.window.clone();
        state.driver.start(&mut window);
        self.state = Some(state);
    }

    fn window_attributes(&self) -> anyhow::Result<winit::window::WindowAttributes> {
        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title(&self.config.window_title);

        #[cfg(target_arch = "wasm32")]
        {
            use anyhow::Context as _;
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            let canvas = web_sys::window()
                .and_then(|window| window.document())
                .and_then(|document| document.get_element_by_id(&self.config.canvas_id))
                .with_context(|| format!("no element with id {}", self.config.canvas_id))?;
            let html_canvas_element = canvas
                .dyn_into::<web_sys::HtmlCanvasElement>()
                .map_err(|_| anyhow::anyhow!("element {} is not a canvas", self.config.canvas_id))?;
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        Ok(window_attributes)
    }
}

impl ApplicationHandler<AppEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let window = match self
            .window_attributes()
            .and_then(|attributes| Ok(event_loop.create_window(attributes)?))
        {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e),
        };
        self.window = Some(window.clone());

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(AppState::new(window)) {
                Ok(state) => self.start(state),
                Err(e) => self.fail(event_loop, e),
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let state = AppState::new(window).await;
                if proxy
                    .send_event(AppEvent::Initialized(Box::new(state)))
                    .is_err()
                {
                    log::error!("The event loop closed before initialization finished");
                }
            });
        }
    }

    #[allow(unused_variables)]
    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            AppEvent::ModelLoaded(completion) => match &mut self.state {
                Some(state) => {
                    state.scene.apply_load(completion);
                }
                None => log::warn!(
                    "Dropping {} because the scene does not exist",
                    completion.request.path
                ),
            },
            #[cfg(target_arch = "wasm32")]
            AppEvent::Initialized(state) => match *state {
                Ok(state) => self.start(state),
                Err(e) => self.fail(event_loop, e),
            },
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => {
                state.driver.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => state.resize(size),
            WindowEvent::RedrawRequested => state.redraw(),
            other => {
                state.controls.handle_window_event(
                    &other,
                    &state.camera,
                    state.projection.fovy(),
                    &state.viewport,
                );
            }
        }
    }
}

/// Open the window and run until it is closed.
pub fn run() -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)?;
    }

    let config = Config::from_env();
    let event_loop: EventLoop<AppEvent> = EventLoop::with_user_event().build()?;
    #[allow(unused_mut)]
    let mut app = App::new(&event_loop, config)?;

    #[cfg(not(target_arch = "wasm32"))]
    {
        event_loop.run_app(&mut app)?;
        app.into_result()
    }

    #[cfg(target_arch = "wasm32")]
    {
        use winit::platform::web::EventLoopExtWebSys;
        event_loop.spawn_app(app);
        Ok(())
    }
}
