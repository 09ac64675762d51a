use std::path::Path;

use room_viewer::config::{BUILT_ASSETS, Config, asset_root};

use crate::common::test_utils::temp_assets;

mod common;

#[test]
fn override_wins_over_everything() {
    let local = temp_assets("config-override");
    assert_eq!(asset_root(Some("/srv/room".to_string()), &local), "/srv/room");
}

#[test]
fn blank_override_is_ignored() {
    let local = temp_assets("config-blank");
    assert_eq!(
        asset_root(Some("  ".to_string()), &local),
        local.to_string_lossy()
    );
}

#[test]
fn existing_local_directory_is_used() {
    let local = temp_assets("config-local");
    assert_eq!(asset_root(None, &local), local.to_string_lossy());
}

#[test]
fn missing_local_directory_falls_back_to_the_build_copy() {
    let local = temp_assets("config-missing").join("assets");
    let root = asset_root(None, &local);
    if Path::new(BUILT_ASSETS).is_dir() {
        assert_eq!(root, BUILT_ASSETS);
    } else {
        assert_eq!(root, local.to_string_lossy());
    }
}

#[test]
fn defaults_match_the_page_and_the_assets_folder() {
    let config = Config::default();
    assert_eq!(config.assets_dir, "assets");
    assert_eq!(config.canvas_id, "canvas");
}
