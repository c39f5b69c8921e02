use proptest::prelude::*;

use wf3d_core::obj::{format_obj, parse_obj};
use wf3d_core::{Face, ObjWireFrame, Point3D};

fn point() -> impl Strategy<Value = Point3D> {
    (-1.0e6..1.0e6f64, -1.0e6..1.0e6f64, -1.0e6..1.0e6f64)
        .prop_map(|(x, y, z)| Point3D::new(x, y, z))
}

fn arb_mesh() -> impl Strategy<Value = ObjWireFrame> {
    (
        prop::collection::vec(point(), 1..12),
        prop::collection::vec(point(), 0..6),
    )
        .prop_flat_map(|(vertices, normals)| {
            let vertex_count = vertices.len();
            let normal_count = normals.len();
            let normal = if normal_count == 0 {
                Just(None).boxed()
            } else {
                prop::option::of(0..normal_count).boxed()
            };
            let face = (prop::collection::vec(0..vertex_count, 1..6), normal)
                .prop_map(|(indices, normal)| Face::new(indices, normal));

            prop::collection::vec(face, 0..8).prop_map(move |faces| {
                ObjWireFrame::new(vertices.clone(), normals.clone(), faces)
            })
        })
}

proptest! {
    #[test]
    fn test_format_then_parse_restores_the_mesh(mesh in arb_mesh()) {
        let text = format_obj(&mesh);
        let parsed = parse_obj(&text).unwrap();
        prop_assert_eq!(parsed, mesh);
    }

    #[test]
    fn test_parse_format_parse_is_a_fixed_point(mesh in arb_mesh()) {
        let once = parse_obj(&format_obj(&mesh)).unwrap();
        let text = format_obj(&once);
        let twice = parse_obj(&text).unwrap();
        prop_assert_eq!(format_obj(&twice), text);
    }
}

#[test]
fn test_hand_written_file_settles_after_one_pass() {
    let source = "# a quad\r\nv 0 0 0\nv 1 0 0\nv 1 1 0 1.0\nv 0 1 0\n\nvn 0 0 -1\nusemtl grey\nf 1/1/1 2/2 3//1 4\n";

    let first = format_obj(&parse_obj(source).unwrap());
    let second = format_obj(&parse_obj(&first).unwrap());
    assert_eq!(first, second);
    assert_eq!(
        first,
        "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\n\nvn 0 0 -1\n\nf 1//1 2//1 3//1 4//1\n"
    );
}
