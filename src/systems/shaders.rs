//! shaders.rs
//!
//! Two phase startup for the globe material.
//! Phase 1 resolves the vertex and fragment shader text off the main thread.
//! Phase 2 registers the text as shader assets and flips the app into
//! `GlobeState::Running`, which is what triggers the scene builder.
//! If either load fails nothing is built.

use std::path::{Path, PathBuf};

use bevy::asset::io::file::FileAssetReader;
use bevy::asset::weak_handle;
use bevy::prelude::*;
use bevy::render::render_resource::Shader;
use reqwest::header::USER_AGENT;
use tokio::sync::oneshot;

use crate::config::GlobeConfig;
use crate::error::LoadError;

// fixed handles so the material can name its shaders before they exist
pub const EARTH_VERTEX_HANDLE: Handle<Shader> = weak_handle!("6d1f4b3e-2c7a-4f0e-9a51-3b8e2d7c4a10");
pub const EARTH_FRAGMENT_HANDLE: Handle<Shader> = weak_handle!("a3c9e0f2-58b1-4d6e-8f27-91c4b5d0e6a2");

pub struct ShaderLoaderPlugin;

impl Plugin for ShaderLoaderPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GlobeState>()
            .add_systems(Startup, start_loading);
        add_shader_polling(app);
    }
}

// phase 2 wiring, runs until the state leaves Loading
pub fn add_shader_polling(app: &mut App) {
    app.add_systems(
        Update,
        poll_pending_shaders.run_if(in_state(GlobeState::Loading)),
    );
}

#[derive(States, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GlobeState {
    #[default]
    Loading,
    Running,
    Failed,
}

/// Shader text resolved in phase 1, immutable afterwards
#[derive(Resource, Debug, Clone)]
pub struct ShaderBundle {
    pub vertex: String,
    pub fragment: String,
    pub vertex_path: String,
    pub fragment_path: String,
}

// result slot for the background loader
#[derive(Resource)]
pub struct PendingShaders {
    receiver: oneshot::Receiver<Result<ShaderBundle, LoadError>>,
}

impl PendingShaders {
    pub fn new(receiver: oneshot::Receiver<Result<ShaderBundle, LoadError>>) -> Self {
        Self { receiver }
    }
}

/// Directory local shader sources are read from.
/// Same base as `AssetPlugin`, so shaders and textures resolve together
/// no matter where the binary is started from.
pub fn shader_root(asset_root: &str) -> PathBuf {
    FileAssetReader::get_base_path().join(asset_root)
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Resolve one shader source to text.
/// Remote sources go through HTTP, everything else is read relative to `root`.
pub async fn load_shader(root: &Path, source: &str) -> Result<String, LoadError> {
    if is_remote(source) {
        let http_error = |e| LoadError::Http {
            url: source.to_string(),
            source: e,
        };

        let response = reqwest::Client::new()
            .get(source)
            .header(USER_AGENT, "bevy-earthglobe")
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(http_error)?;

        response.text().await.map_err(http_error)
    } else {
        let path = root.join(source);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| LoadError::Io { path, source: e })
    }
}

/// Load both stages jointly, the first failure wins
pub async fn load_bundle(root: &Path, vertex: &str, fragment: &str) -> Result<ShaderBundle, LoadError> {
    let (vertex_text, fragment_text) =
        tokio::try_join!(load_shader(root, vertex), load_shader(root, fragment))?;

    Ok(ShaderBundle {
        vertex: vertex_text,
        fragment: fragment_text,
        vertex_path: vertex.to_string(),
        fragment_path: fragment.to_string(),
    })
}

// kick off phase 1 on a background thread with its own runtime
fn start_loading(mut commands: Commands, config: Res<GlobeConfig>) {
    let root = shader_root(&config.assets.root);
    let vertex = config.assets.vertex_shader.clone();
    let fragment = config.assets.fragment_shader.clone();

    let (sender, receiver) = oneshot::channel();

    let spawned = std::thread::Builder::new()
        .name("shader-loader".to_string())
        .spawn(move || {
            let result = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime.block_on(load_bundle(&root, &vertex, &fragment)),
                Err(e) => Err(LoadError::Runtime(e)),
            };

            // receiver is only gone when the app already quit
            let _ = sender.send(result);
        });

    // a failed spawn drops the sender, polling then reports Disconnected
    if let Err(e) = spawned {
        error!("could not start shader loader thread: {e}");
    }

    debug!(
        "loading shaders {} and {} from {}",
        config.assets.vertex_shader,
        config.assets.fragment_shader,
        shader_root(&config.assets.root).display()
    );
    commands.insert_resource(PendingShaders::new(receiver));
}

// phase 2, runs every frame until the loader answers
pub fn poll_pending_shaders(
    mut commands: Commands,
    pending: Option<ResMut<PendingShaders>>,
    mut shaders: ResMut<Assets<Shader>>,
    mut next_state: ResMut<NextState<GlobeState>>,
) {
    let Some(mut pending) = pending else { return; };

    let result = match pending.receiver.try_recv() {
        Ok(result) => result,
        Err(oneshot::error::TryRecvError::Empty) => return, // still loading
        Err(oneshot::error::TryRecvError::Closed) => Err(LoadError::Disconnected),
    };
    commands.remove_resource::<PendingShaders>();

    match result {
        Ok(bundle) => {
            register_shaders(&bundle, &mut shaders);
            info!(
                "shaders resolved: {} ({} bytes), {} ({} bytes)",
                bundle.vertex_path,
                bundle.vertex.len(),
                bundle.fragment_path,
                bundle.fragment.len()
            );
            commands.insert_resource(bundle);
            next_state.set(GlobeState::Running);
        }
        Err(e) => {
            error!("globe scene not built: {e}");
            next_state.set(GlobeState::Failed);
        }
    }
}

fn register_shaders(bundle: &ShaderBundle, shaders: &mut Assets<Shader>) {
    shaders.insert(
        EARTH_VERTEX_HANDLE.id(),
        Shader::from_wgsl(bundle.vertex.clone(), bundle.vertex_path.clone()),
    );
    shaders.insert(
        EARTH_FRAGMENT_HANDLE.id(),
        Shader::from_wgsl(bundle.fragment.clone(), bundle.fragment_path.clone()),
    );
}
