//! Runtime configuration.
//!
//! The viewer has no configuration file. Everything that may differ between
//! deployments lives in [`Config`], the scene itself is fixed in
//! [`crate::scene`].

/// Environment variable that overrides the asset root on native targets.
pub const ASSETS_ENV: &str = "ROOM_VIEWER_ASSETS";

/// Copy of `assets/` made by the build script.
#[cfg(not(target_arch = "wasm32"))]
pub const BUILT_ASSETS: &str = concat!(env!("OUT_DIR"), "/assets");

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Directory (native) or URL path segment (web) that model paths are relative to.
    pub assets_dir: String,
    /// Id of the canvas element the viewer draws into on the web.
    pub canvas_id: String,
    pub window_title: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            assets_dir: "assets".to_string(),
            canvas_id: "canvas".to_string(),
            window_title: "room-viewer".to_string(),
        }
    }
}

impl Config {
    /// Default configuration with the asset root resolved by [`asset_root`] on native.
    pub fn from_env() -> Self {
        #[allow(unused_mut)]
        let mut config = Self::default();
        #[cfg(not(target_arch = "wasm32"))]
        {
            config.assets_dir = asset_root(
                std::env::var(ASSETS_ENV).ok(),
                std::path::Path::new(&config.assets_dir),
            );
        }
        config
    }
}

/// Pick the asset directory: a non-blank `override_dir` (from [`ASSETS_ENV`]),
/// else `local` if it exists, else the build script's copy.
///
/// Falls back to `local` when neither exists; loads then fail and are logged.
#[cfg(not(target_arch = "wasm32"))]
pub fn asset_root(override_dir: Option<String>, local: &std::path::Path) -> String {
    if let Some(dir) = override_dir.filter(|dir| !dir.trim().is_empty()) {
        log::info!("Using asset root {dir} from {ASSETS_ENV}");
        return dir;
    }
    if !local.is_dir() && std::path::Path::new(BUILT_ASSETS).is_dir() {
        log::info!("No {} here, using {BUILT_ASSETS}", local.display());
        return BUILT_ASSETS.to_string();
    }
    local.to_string_lossy().into_owned()
}
