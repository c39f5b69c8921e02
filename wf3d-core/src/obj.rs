/// Parser and writer for the `.obj` subset used by wire-frames.
///
/// Only `v`, `vn` and `f` directives are read; everything else is skipped.
/// Indices are 1-based in text and 0-based in memory. A face takes its
/// normal from its first vertex entry and applies it to the whole face.
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use nom::{
    branch::alt,
    character::complete::{char, space0, space1, u64 as index},
    combinator::{eof, map, opt, peek, verify},
    multi::many1,
    number::complete::double,
    sequence::{preceded, terminated, tuple},
    IResult,
};
use tracing::debug;

use crate::error::{ParseError, Result};
use crate::geometry::Point3D;
use crate::mesh::{Face, ObjWireFrame};

/// Parses `.obj` text into a wire-frame.
///
/// The result is not validated; see [`ObjWireFrame::validate`].
pub fn parse_obj(contents: &str) -> std::result::Result<ObjWireFrame, ParseError> {
    let mut mesh = ObjWireFrame::default();

    for (number, line) in contents.split('\n').enumerate() {
        let line = line.trim();
        let (directive, rest) = match line.split_once(|c: char| c.is_whitespace()) {
            Some((directive, rest)) => (directive, rest),
            None => (line, ""),
        };
        let line_number = number + 1;

        match directive {
            "v" => mesh.vertices.push(parse_line(vector3, rest, line_number, "v")?),
            "vn" => mesh.normals.push(parse_line(vector3, rest, line_number, "vn")?),
            "f" => mesh.faces.push(parse_line(face, rest, line_number, "f")?),
            _ => {}
        }
    }

    debug!(
        vertices = mesh.vertices.len(),
        normals = mesh.normals.len(),
        faces = mesh.faces.len(),
        "parsed obj"
    );

    Ok(mesh)
}

/// Writes the wire-frame back out in the same subset.
pub fn format_obj(mesh: &ObjWireFrame) -> String {
    let mut out = String::new();

    for vertex in &mesh.vertices {
        let _ = writeln!(out, "v {} {} {}", vertex.x(), vertex.y(), vertex.z());
    }
    out.push('\n');

    for normal in &mesh.normals {
        let _ = writeln!(out, "vn {} {} {}", normal.x(), normal.y(), normal.z());
    }
    out.push('\n');

    for face in &mesh.faces {
        out.push('f');
        for vertex in face.vertices() {
            match face.normal() {
                Some(normal) => {
                    let _ = write!(out, " {}//{}", vertex + 1, normal + 1);
                }
                None => {
                    let _ = write!(out, " {}", vertex + 1);
                }
            }
        }
        out.push('\n');
    }

    out
}

/// Reads and parses an `.obj` file.
pub fn load_obj_file(path: impl AsRef<Path>) -> Result<ObjWireFrame> {
    let contents = fs::read_to_string(path)?;
    Ok(parse_obj(&contents)?)
}

pub fn write_obj_file(mesh: &ObjWireFrame, path: impl AsRef<Path>) -> Result<()> {
    fs::write(path, format_obj(mesh))?;
    Ok(())
}

fn parse_line<'a, T>(
    parser: impl Fn(&'a str) -> IResult<&'a str, T>,
    input: &'a str,
    line: usize,
    directive: &str,
) -> std::result::Result<T, ParseError> {
    match parser(input) {
        Ok((_, value)) => Ok(value),
        Err(e) => Err(ParseError::new(
            line,
            format!("malformed `{directive}` directive: {e}"),
        )),
    }
}

/// A token boundary: whitespace or end of line.
fn boundary(input: &str) -> IResult<&str, &str> {
    peek(alt((space1, eof)))(input)
}

fn coordinate(input: &str) -> IResult<&str, f64> {
    preceded(space0, terminated(double, boundary))(input)
}

/// Three coordinates; anything after them is ignored.
fn vector3(input: &str) -> IResult<&str, Point3D> {
    map(tuple((coordinate, coordinate, coordinate)), |(x, y, z)| {
        Point3D::new(x, y, z)
    })(input)
}

/// A 1-based index converted to 0-based.
fn one_based(input: &str) -> IResult<&str, usize> {
    map(verify(index, |&i: &u64| i > 0), |i| (i - 1) as usize)(input)
}

/// `vertex`, `vertex/texture`, `vertex/texture/normal` or `vertex//normal`.
fn face_point(input: &str) -> IResult<&str, (usize, Option<usize>)> {
    let (input, vertex) = one_based(input)?;
    let (input, rest) = opt(preceded(
        char('/'),
        tuple((opt(index), opt(preceded(char('/'), opt(one_based))))),
    ))(input)?;

    let normal = rest.and_then(|(_texture, normal)| normal.flatten());
    Ok((input, (vertex, normal)))
}

fn face(input: &str) -> IResult<&str, Face> {
    let (input, points) = many1(preceded(space0, terminated(face_point, boundary)))(input)?;
    let (input, _) = terminated(space0, eof)(input)?;

    let normal = points.first().and_then(|&(_, normal)| normal);
    let vertices = points.into_iter().map(|(vertex, _)| vertex).collect();

    Ok((input, Face::new(vertices, normal)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: &str = "\
# a single triangle
o tri
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vt 0.5 0.5
vn 0.0 0.0 1.0

f 1/1/1 2/1/1 3/1/1
";

    #[test]
    fn test_parse_triangle() {
        let mesh = parse_obj(TRIANGLE).unwrap();
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.normals.len(), 1);
        assert_eq!(mesh.faces, vec![Face::new(vec![0, 1, 2], Some(0))]);
        assert_eq!(mesh.vertices[1], Point3D::new(1.0, 0.0, 0.0));
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_face_token_forms() {
        let mesh = parse_obj("f 1 2 3\nf 4/7 5/8 6/9\nf 7//2 8//3 9//4\nf 1/2/ 2 3").unwrap();
        assert_eq!(mesh.faces[0], Face::new(vec![0, 1, 2], None));
        assert_eq!(mesh.faces[1], Face::new(vec![3, 4, 5], None));
        assert_eq!(mesh.faces[2], Face::new(vec![6, 7, 8], Some(1)));
        assert_eq!(mesh.faces[3], Face::new(vec![0, 1, 2], None));
    }

    #[test]
    fn test_face_normal_comes_from_first_entry() {
        let mesh = parse_obj("f 1//3 2//1 3//2").unwrap();
        assert_eq!(mesh.faces[0].normal(), Some(2));

        let mesh = parse_obj("f 1 2//1 3//2").unwrap();
        assert_eq!(mesh.faces[0].normal(), None);
    }

    #[test]
    fn test_crlf_and_extra_tokens() {
        let mesh = parse_obj("v 1 2 3 1.0\r\nvn 0 1 0\r\n").unwrap();
        assert_eq!(mesh.vertices[0], Point3D::new(1.0, 2.0, 3.0));
        assert_eq!(mesh.normals[0], Point3D::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_malformed_lines_fail_with_line_number() {
        let err = parse_obj("v 1 2 3\nv 1 2\n").unwrap_err();
        assert_eq!(err.line, 2);

        let err = parse_obj("v 1 2 3\nvn 0 x 1\n").unwrap_err();
        assert_eq!(err.line, 2);

        assert!(parse_obj("v 1.0abc 2 3").is_err());
        assert!(parse_obj("f").is_err());
        assert!(parse_obj("f 0 1 2").is_err());
        assert!(parse_obj("f -1 -2 -3").is_err());
        assert!(parse_obj("f 1 2 three").is_err());
    }

    #[test]
    fn test_unknown_directives_are_ignored() {
        let mesh = parse_obj("mtllib car.mtl\nusemtl paint\ns off\ng body\n").unwrap();
        assert_eq!(mesh, ObjWireFrame::default());
    }

    #[test]
    fn test_format_layout() {
        let mesh = ObjWireFrame::new(
            vec![Point3D::new(0.0, 0.5, -1.0), Point3D::new(1.0, 0.0, 0.0)],
            vec![Point3D::new(0.0, 0.0, 1.0)],
            vec![
                Face::new(vec![0, 1, 0], Some(0)),
                Face::new(vec![1, 0, 1], None),
            ],
        );

        assert_eq!(
            format_obj(&mesh),
            "v 0 0.5 -1\nv 1 0 0\n\nvn 0 0 1\n\nf 1//1 2//1 1//1\nf 2 1 2\n"
        );
    }

    #[test]
    fn test_parse_format_parse_is_a_fixed_point() {
        let first = parse_obj(TRIANGLE).unwrap();
        let second = parse_obj(&format_obj(&first)).unwrap();
        assert_eq!(first, second);
        assert_eq!(format_obj(&first), format_obj(&second));
    }
}
