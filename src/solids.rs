use std::f64::consts::PI;

use truck_meshalgo::prelude::*;
use truck_modeling::*;
use truck_polymesh::PolygonMesh;

pub fn to_mesh(solid: &Solid) -> PolygonMesh {
    solid.triangulation(0.01).to_polygon()
}

pub fn box_solid(width: f64, height: f64, depth: f64) -> Solid {
    let vertex: Vertex = builder::vertex(Point3::new(-width / 2.0, -height / 2.0, -depth / 2.0));
    let edge: Edge = builder::tsweep(&vertex, Vector3::new(0.0, 0.0, depth));
    let face: Face = builder::tsweep(&edge, Vector3::new(width, 0.0, 0.0));
    builder::tsweep(&face, Vector3::new(0.0, height, 0.0))
}

pub fn sphere(radius: f64) -> Solid {
    let v0 = builder::vertex(Point3::new(0.0, radius, 0.0));
    let wire: Wire = builder::rsweep(&v0, Point3::origin(), Vector3::unit_x(), Rad(PI));
    let shell = builder::cone(&wire, Vector3::unit_y(), Rad(7.0));
    Solid::new(vec![shell])
}
