use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use track_engine::TrackMesh;

#[derive(Component)]
pub struct TrackMeshMarker;

/// Straight strip showing the configured cross-section.
#[derive(Component)]
pub struct ProfilePreviewMarker;

/// Uploads an extruded track into a bevy triangle list.
pub fn to_bevy_mesh(track: &TrackMesh) -> Mesh {
    let mut mesh = Mesh::new(PrimitiveTopology::TriangleList);

    let positions: Vec<[f32; 3]> = track.positions.iter().map(|v| v.to_array()).collect();
    let normals: Vec<[f32; 3]> = track.normals.iter().map(|v| v.to_array()).collect();
    let uvs: Vec<[f32; 2]> = track.uvs.iter().map(|v| v.to_array()).collect();

    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.set_indices(Some(Indices::U32(track.indices.clone())));

    mesh
}
