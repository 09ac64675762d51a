//! Asynchronous, single-shot model loads.
//!
//! Every [`LoadRequest`] runs as its own task and finishes exactly once with a
//! [`LoadCompletion`] that is handed to a [`CompletionSink`]. The sink is the
//! only way results get back to the scene, so the scene is only ever mutated by
//! whoever drains the sink (the event loop). There is no retry, no caching and
//! no cancellation: a load that never finishes simply never delivers.

use crate::{
    data_structures::model::ModelData,
    placement::Placement,
    resources::{AssetSource, load_model_gltf},
};

#[derive(Clone, Debug, PartialEq)]
pub struct LoadRequest {
    /// Model path relative to the asset root.
    pub path: String,
    pub placement: Placement,
}

impl LoadRequest {
    pub fn new(path: &str, placement: Placement) -> Self {
        Self {
            path: path.to_string(),
            placement,
        }
    }
}

#[derive(Debug)]
pub struct LoadCompletion {
    pub request: LoadRequest,
    pub result: anyhow::Result<ModelData>,
}

/// Receives finished loads.
pub trait CompletionSink: 'static {
    fn deliver(&self, completion: LoadCompletion);
}

impl CompletionSink for futures::channel::mpsc::UnboundedSender<LoadCompletion> {
    fn deliver(&self, completion: LoadCompletion) {
        if let Err(e) = self.unbounded_send(completion) {
            log::warn!(
                "Load of {} finished after its receiver was dropped",
                e.into_inner().request.path
            );
        }
    }
}

/// Run a single request to completion.
pub async fn load(request: LoadRequest, source: AssetSource) -> LoadCompletion {
    log::info!("Loading {}", request.path);
    let result = load_model_gltf(&request.path, &source).await;
    LoadCompletion { request, result }
}

/// Spawns load tasks on the platform's executor.
#[derive(Clone, Debug)]
pub struct Loader {
    #[cfg(not(target_arch = "wasm32"))]
    runtime: tokio::runtime::Handle,
    source: AssetSource,
}

impl Loader {
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new(runtime: tokio::runtime::Handle, source: AssetSource) -> Self {
        Self { runtime, source }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn new(source: AssetSource) -> Self {
        Self { source }
    }

    /// Start `request` in the background; the result is delivered to `sink`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn spawn<S>(&self, request: LoadRequest, sink: S)
    where
        S: CompletionSink + Send,
    {
        let source = self.source.clone();
        self.runtime.spawn(async move {
            let completion = load(request, source).await;
            sink.deliver(completion);
        });
    }

    /// Start `request` in the background; the result is delivered to `sink`.
    #[cfg(target_arch = "wasm32")]
    pub fn spawn<S>(&self, request: LoadRequest, sink: S)
    where
        S: CompletionSink,
    {
        let source = self.source.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let completion = load(request, source).await;
            sink.deliver(completion);
        });
    }
}
