use std::fs;
use std::path::Path;

use tempfile::TempDir;

use wf3d_core::catalog::FALLBACK_NAME;
use wf3d_core::obj::{format_obj, write_obj_file};
use wf3d_core::{ObjWireFrame, WireFrameCatalog, WireFrameError};

fn write_config(dir: &Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("wf3d.toml");
    fs::write(&path, body).unwrap();
    path
}

fn setup() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("models")).unwrap();
    write_obj_file(&ObjWireFrame::cube(1.0), dir.path().join("models/cube.obj")).unwrap();
    write_obj_file(&ObjWireFrame::cube(0.5), dir.path().join("models/small.obj")).unwrap();
    dir
}

#[test]
fn test_loads_models_relative_to_config() {
    let dir = setup();
    let config = write_config(
        dir.path(),
        r#"
        [[wire_frames]]
        id = 3
        name = "cube"
        path = "models/cube.obj"

        [[wire_frames]]
        id = 9
        name = "small"
        path = "models/small.obj"
        default = true
        "#,
    );

    let catalog = WireFrameCatalog::from_config_file(&config).unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["cube", "small"]);
    assert_eq!(catalog.ids().collect::<Vec<_>>(), vec![3, 9]);
    assert_eq!(catalog.default_name(), Some("small"));

    let small = catalog.get_by_id(9).unwrap();
    assert_eq!(*small, ObjWireFrame::cube(0.5));
    assert_eq!(catalog.get_by_name("cube").unwrap().faces.len(), 6);
    assert_eq!(catalog.next_name("small"), Some("cube"));
}

#[test]
fn test_last_default_wins_and_first_name_otherwise() {
    let dir = setup();
    let config = write_config(
        dir.path(),
        r#"
        [[wire_frames]]
        id = 1
        name = "zeta"
        path = "models/cube.obj"
        default = true

        [[wire_frames]]
        id = 2
        name = "alpha"
        path = "models/small.obj"
        default = true
        "#,
    );
    let catalog = WireFrameCatalog::from_config_file(&config).unwrap();
    assert_eq!(catalog.default_name(), Some("alpha"));

    let config = write_config(
        dir.path(),
        r#"
        [[wire_frames]]
        id = 1
        name = "zeta"
        path = "models/cube.obj"

        [[wire_frames]]
        id = 2
        name = "alpha"
        path = "models/small.obj"
        "#,
    );
    let catalog = WireFrameCatalog::from_config_file(&config).unwrap();
    assert_eq!(catalog.default_name(), Some("alpha"));
}

#[test]
fn test_view_settings_are_carried() {
    let dir = setup();
    let config = write_config(
        dir.path(),
        "[view]\ndrag_speed = 0.5\n\n[[wire_frames]]\nid = 1\nname = \"cube\"\npath = \"models/cube.obj\"\n",
    );

    let catalog = WireFrameCatalog::from_config_file(&config).unwrap();
    assert_eq!(catalog.settings().drag_speed, 0.5);
}

#[test]
fn test_missing_or_broken_config_falls_back() {
    let dir = TempDir::new().unwrap();

    let catalog = WireFrameCatalog::from_config_file(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(catalog.default_name(), Some(FALLBACK_NAME));
    assert!(catalog.get_by_id(0).is_ok());

    let config = write_config(dir.path(), "[[wire_frames]\nid = ");
    let catalog = WireFrameCatalog::from_config_file(&config).unwrap();
    assert_eq!(catalog.names().collect::<Vec<_>>(), vec![FALLBACK_NAME]);
}

#[test]
fn test_bad_model_is_an_error() {
    let dir = setup();
    fs::write(dir.path().join("models/broken.obj"), "v 1 2\n").unwrap();

    let mut bad_normal = ObjWireFrame::cube(1.0);
    bad_normal.normals[0] = bad_normal.normals[0] * 2.0;
    fs::write(dir.path().join("models/long.obj"), format_obj(&bad_normal)).unwrap();

    for (file, expect_parse) in [("broken.obj", true), ("long.obj", false), ("gone.obj", false)] {
        let config = write_config(
            dir.path(),
            &format!("[[wire_frames]]\nid = 1\nname = \"m\"\npath = \"models/{file}\"\n"),
        );

        let err = WireFrameCatalog::from_config_file(&config).unwrap_err();
        match err {
            WireFrameError::Model { path, source } => {
                assert!(path.ends_with(format!("models/{file}")));
                assert_eq!(matches!(*source, WireFrameError::Parse(_)), expect_parse);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
