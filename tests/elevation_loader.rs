use std::path::PathBuf;

use approx::assert_relative_eq;
use glam::{UVec2, Vec2};
use image::{Rgba, RgbaImage};

use terrain_costmap::visualization::cost_layer_to_image;
use terrain_costmap::{Layer, MapInfo, TraversabilityError, load_elevation_map};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("terrain_costmap_{}_{name}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn gray(v: u8) -> Rgba<u8> {
    Rgba([v, v, v, 255])
}

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

#[test]
fn loads_layers_with_heights_and_flipped_rows() {
    let dir = scratch_dir("heights");
    // Top image row: [black, white]; bottom row: [transparent, white].
    let mut img = RgbaImage::new(2, 2);
    img.put_pixel(0, 0, gray(0));
    img.put_pixel(1, 0, gray(255));
    img.put_pixel(0, 1, TRANSPARENT);
    img.put_pixel(1, 1, gray(255));
    img.save(dir.join("elevation.png")).unwrap();
    img.save(dir.join("inpaint.png")).unwrap();

    std::fs::write(
        dir.join("map.yaml"),
        "resolution: 0.1\norigin: [-0.1, 0.2, 0.0]\nmin_height: -0.5\nmax_height: 1.5\n\
         layers:\n  elevation: elevation.png\n  inpaint: inpaint.png\n",
    )
    .unwrap();

    let map = load_elevation_map(dir.join("map.yaml")).unwrap();
    assert_eq!(map.layer_names().collect::<Vec<_>>(), vec!["elevation", "inpaint"]);
    assert_eq!(map.dimensions(), (2, 2));
    assert_relative_eq!(map.resolution(), 0.1);
    assert_eq!(map.info().origin, Vec2::new(-0.1, 0.2));

    let elevation = map.layer("elevation").unwrap();
    // Grid row 0 is the bottom image row.
    assert_eq!(elevation.value(UVec2::new(0, 0)), None);
    assert_relative_eq!(elevation.value(UVec2::new(1, 0)).unwrap(), 1.5);
    assert_relative_eq!(elevation.value(UVec2::new(0, 1)).unwrap(), -0.5);
}

#[test]
fn negate_inverts_heights() {
    let dir = scratch_dir("negate");
    RgbaImage::from_pixel(1, 1, gray(255))
        .save(dir.join("e.png"))
        .unwrap();
    std::fs::write(
        dir.join("map.yaml"),
        "resolution: 0.05\norigin: [0, 0, 0]\nmin_height: 0\nmax_height: 2\nnegate: true\nlayers: {elevation: e.png}\n",
    )
    .unwrap();

    let map = load_elevation_map(dir.join("map.yaml")).unwrap();
    assert_relative_eq!(map.get("elevation", 0, 0).unwrap().unwrap(), 0.0);
}

#[test]
fn mismatched_images_are_rejected() {
    let dir = scratch_dir("mismatch");
    RgbaImage::from_pixel(2, 2, gray(10)).save(dir.join("a.png")).unwrap();
    RgbaImage::from_pixel(3, 2, gray(10)).save(dir.join("b.png")).unwrap();
    std::fs::write(
        dir.join("map.yaml"),
        "resolution: 0.05\norigin: [0, 0, 0]\nmin_height: 0\nmax_height: 1\nlayers: {a: a.png, b: b.png}\n",
    )
    .unwrap();

    assert!(matches!(
        load_elevation_map(dir.join("map.yaml")),
        Err(TraversabilityError::GeometryMismatch { .. })
    ));
}

#[test]
fn inverted_height_range_is_rejected() {
    let dir = scratch_dir("range");
    std::fs::write(
        dir.join("map.yaml"),
        "resolution: 0.05\norigin: [0, 0, 0]\nmin_height: 1\nmax_height: 1\nlayers: {a: a.png}\n",
    )
    .unwrap();

    assert!(matches!(
        load_elevation_map(dir.join("map.yaml")),
        Err(TraversabilityError::InvalidMetadata(_))
    ));
}

#[test]
fn missing_image_is_an_error() {
    let dir = scratch_dir("noimage");
    std::fs::write(
        dir.join("map.yaml"),
        "resolution: 0.05\norigin: [0, 0, 0]\nmin_height: 0\nmax_height: 1\nlayers: {a: nowhere.png}\n",
    )
    .unwrap();
    assert!(load_elevation_map(dir.join("map.yaml")).is_err());
}

#[test]
fn cost_preview_round_trips_through_disk() {
    let dir = scratch_dir("preview");
    let info = MapInfo::square(3, 0.1);
    let cost = Layer::from_fn(info, |c| (c.x != 1).then_some(c.x as f32 / 2.0));
    let path = dir.join("cost.png");
    cost_layer_to_image(&cost).save(&path).unwrap();

    let back = image::open(&path).unwrap().to_luma8();
    assert_eq!(back.dimensions(), (3, 3));
    assert_eq!(back.get_pixel(0, 0).0[0], 254);
    assert_eq!(back.get_pixel(1, 0).0[0], 205);
    assert_eq!(back.get_pixel(2, 0).0[0], 0);
}
