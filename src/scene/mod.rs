//! The 3D scene widget: a translucent icebox, the live plums, and the
//! pointer wiring that feeds the pick-and-place interaction.

use std::rc::Rc;
use std::sync::Arc;

use glam::{Mat4, Vec3};
use iced::wgpu;
use iced::widget::shader::{self, Viewport};
use iced::{keyboard, mouse, Element, Event, Length, Point, Rectangle};
use truck_polymesh::PolygonMesh;

use crate::camera::camera_from_params;
use crate::interaction::{Interaction, Plum, PointerOutcome, PLUM_RADIUS};
use crate::solids;

pub use crate::camera::CameraMode;

mod render;
use render::Pipeline;

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    model_view: [[f32; 4]; 4],
    mvp: [[f32; 4]; 4],
    // World-space sun direction; w is padding.
    light: [f32; 4],
}

/// Direction of the animated sun at `time` seconds. The sun circles
/// the scene at height 10 with radius 30.
fn sun_direction(time: f32) -> Vec3 {
    Vec3::new(time.sin() * 30.0, 10.0, time.cos() * 30.0).normalize_or_zero()
}

fn translated(mesh: &PolygonMesh, offset: Vec3) -> PolygonMesh {
    let mut out = mesh.clone();
    for p in out.positions_mut() {
        p.x += offset.x as f64;
        p.y += offset.y as f64;
        p.z += offset.z as f64;
    }
    out
}

/// One shared sphere mesh, placed once per live plum.
fn build_plums_mesh(plums: &[Plum]) -> Option<PolygonMesh> {
    let mut iter = plums.iter();
    let first = iter.next()?;

    let base = solids::to_mesh(&solids::sphere(PLUM_RADIUS as f64));
    let mut mesh = translated(&base, first.position);
    for plum in iter {
        mesh.merge(translated(&base, plum.position));
    }
    Some(mesh)
}

fn mesh_to_vertex_index(mesh: &PolygonMesh) -> (Vec<Vertex>, Vec<u32>) {
    let positions = mesh.positions();
    let mesh_normals = mesh.normals();

    let mut vertices: Vec<Vertex> = positions
        .iter()
        .map(|p| Vertex {
            position: [p.x as f32, p.y as f32, p.z as f32],
            normal: [0.0, 0.0, 1.0],
        })
        .collect();

    let mut tri_indices: Vec<u32> = Vec::with_capacity(mesh.tri_faces().len() * 3);
    for tri in mesh.tri_faces() {
        tri_indices.extend_from_slice(&[tri[0].pos as u32, tri[1].pos as u32, tri[2].pos as u32]);
    }
    for quad in mesh.quad_faces() {
        let a = quad[0].pos as u32;
        let b = quad[1].pos as u32;
        let c = quad[2].pos as u32;
        let d = quad[3].pos as u32;
        tri_indices.extend_from_slice(&[a, b, c, a, c, d]);
    }
    for face in mesh.other_faces() {
        if face.len() < 3 {
            continue;
        }
        let a = face[0].pos as u32;
        for i in 1..(face.len() - 1) {
            tri_indices.extend_from_slice(&[a, face[i].pos as u32, face[i + 1].pos as u32]);
        }
    }

    let mut normal_sums = vec![Vec3::ZERO; vertices.len()];
    if !mesh_normals.is_empty() {
        let mut accumulate = |pos: usize, nor: Option<usize>| {
            if let Some(nor) = nor {
                let n = mesh_normals[nor];
                normal_sums[pos] += Vec3::new(n.x as f32, n.y as f32, n.z as f32);
            }
        };
        for tri in mesh.tri_faces() {
            for v in tri.iter() {
                accumulate(v.pos, v.nor);
            }
        }
        for quad in mesh.quad_faces() {
            for v in quad.iter() {
                accumulate(v.pos, v.nor);
            }
        }
        for face in mesh.other_faces() {
            for v in face.iter() {
                accumulate(v.pos, v.nor);
            }
        }
    } else {
        // Smooth normals from triangle geometry.
        for tri in tri_indices.chunks_exact(3) {
            let ia = tri[0] as usize;
            let ib = tri[1] as usize;
            let ic = tri[2] as usize;

            let a = Vec3::from_array(vertices[ia].position);
            let b = Vec3::from_array(vertices[ib].position);
            let c = Vec3::from_array(vertices[ic].position);

            let n = (b - a).cross(c - a);
            normal_sums[ia] += n;
            normal_sums[ib] += n;
            normal_sums[ic] += n;
        }
    }

    for (v, ns) in vertices.iter_mut().zip(normal_sums.into_iter()) {
        v.normal = ns.normalize_or_zero().to_array();
        if v.normal == [0.0, 0.0, 0.0] {
            v.normal = [0.0, 0.0, 1.0];
        }
    }

    (vertices, tri_indices)
}

pub struct Scene<Message> {
    camera_mode: CameraMode,
    light_time: f32,
    on_plums_changed: Option<Rc<dyn Fn(usize) -> Message + 'static>>,
}

#[derive(Debug, Clone)]
pub struct SceneState {
    target: Vec3,
    distance: f32,
    yaw: f32,
    pitch: f32,
    dragging: Dragging,
    last_cursor: Option<Point>,
    modifiers: keyboard::Modifiers,
    interaction: Interaction,
    plums_version: u64,
}

/// Camera manipulation only; plum drags live in [`Interaction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dragging {
    None,
    Pan,
    Rotate,
}

impl Default for SceneState {
    fn default() -> Self {
        Self {
            // Startup pose: eye at (8, 8, 8) looking at the origin.
            target: Vec3::ZERO,
            distance: 192.0_f32.sqrt(),
            yaw: std::f32::consts::FRAC_PI_4,
            pitch: 35.264_f32.to_radians(),
            dragging: Dragging::None,
            last_cursor: None,
            modifiers: keyboard::Modifiers::default(),
            interaction: Interaction::default(),
            plums_version: 0,
        }
    }
}

impl SceneState {
    fn finish_session(&mut self) -> PointerOutcome {
        let outcome = self.interaction.pointer_up();
        match outcome {
            PointerOutcome::DroppedIn(id) => {
                self.plums_version = self.plums_version.wrapping_add(1);
                log::info!(
                    "plum {id} dropped into the icebox ({} left)",
                    self.interaction.plums().len()
                );
            }
            PointerOutcome::DroppedOut(id) => {
                self.plums_version = self.plums_version.wrapping_add(1);
                log::debug!("plum {id} released outside the icebox");
            }
            _ => {}
        }
        outcome
    }
}

impl<Message> shader::Program<Message> for Scene<Message> {
    type State = SceneState;
    type Primitive = Primitive;

    fn update(
        &self,
        state: &mut Self::State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<shader::Action<Message>> {
        if let Event::Keyboard(keyboard::Event::ModifiersChanged(mods)) = event {
            state.modifiers = *mods;
        }

        let Some(cursor_pos) = cursor.position_in(bounds) else {
            // A release outside the widget still ends whatever was in
            // flight, session included.
            match event {
                Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                    let outcome = state.finish_session();
                    state.dragging = Dragging::None;
                    state.last_cursor = None;

                    if matches!(outcome, PointerOutcome::DroppedIn(_)) {
                        if let Some(cb) = &self.on_plums_changed {
                            let count = state.interaction.plums().len();
                            return Some(shader::Action::publish(cb(count)).and_capture());
                        }
                    }
                    return Some(shader::Action::request_redraw().and_capture());
                }
                Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Right)) => {
                    state.dragging = Dragging::None;
                    state.last_cursor = None;
                    return Some(shader::Action::request_redraw().and_capture());
                }
                _ => return None,
            }
        };

        let camera = camera_from_params(
            state.target,
            state.distance,
            state.yaw,
            state.pitch,
            bounds,
            self.camera_mode,
        );

        match event {
            Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                // Zoom is part of camera manipulation and stays off
                // while a plum is held.
                if state.interaction.held().is_some() {
                    return None;
                }

                let scroll_y = match *delta {
                    mouse::ScrollDelta::Lines { y, .. } => y,
                    mouse::ScrollDelta::Pixels { y, .. } => y / 120.0,
                };

                if scroll_y.abs() > f32::EPSILON {
                    let factor = 1.1_f32.powf(scroll_y);
                    state.distance = (state.distance / factor).clamp(0.1, 200.0);
                    return Some(shader::Action::request_redraw().and_capture());
                }
            }
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let outcome = state.interaction.pointer_down(cursor_pos, bounds, &camera);
                state.last_cursor = Some(cursor_pos);

                match outcome {
                    PointerOutcome::Spawned(id) => {
                        state.plums_version = state.plums_version.wrapping_add(1);
                        let count = state.interaction.plums().len();
                        log::info!("added a plum, id {id} ({count} in the scene)");
                        if let Some(cb) = &self.on_plums_changed {
                            return Some(shader::Action::publish(cb(count)).and_capture());
                        }
                    }
                    PointerOutcome::Picked(id) => {
                        log::debug!("picked up plum {id}");
                    }
                    _ => {}
                }

                return Some(shader::Action::request_redraw().and_capture());
            }
            Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                let outcome = state.finish_session();
                state.last_cursor = None;

                if matches!(outcome, PointerOutcome::DroppedIn(_)) {
                    if let Some(cb) = &self.on_plums_changed {
                        let count = state.interaction.plums().len();
                        return Some(shader::Action::publish(cb(count)).and_capture());
                    }
                }
                if outcome != PointerOutcome::Ignored {
                    return Some(shader::Action::request_redraw().and_capture());
                }
            }
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Right)) => {
                // Orbit input is suppressed for the whole session, so a
                // held plum and the camera are never dragged at once.
                if state.interaction.held().is_some() {
                    return None;
                }

                state.dragging = if state.modifiers.shift() {
                    Dragging::Pan
                } else {
                    Dragging::Rotate
                };
                state.last_cursor = Some(cursor_pos);
                return Some(shader::Action::request_redraw().and_capture());
            }
            Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Right)) => {
                if matches!(state.dragging, Dragging::Pan | Dragging::Rotate) {
                    state.dragging = Dragging::None;
                    state.last_cursor = None;
                    return Some(shader::Action::request_redraw().and_capture());
                }
            }
            Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                if state.interaction.held().is_some() {
                    let outcome = state.interaction.pointer_move(cursor_pos, bounds, &camera);
                    if matches!(outcome, PointerOutcome::Dragged(_)) {
                        state.plums_version = state.plums_version.wrapping_add(1);
                    }
                    state.last_cursor = Some(cursor_pos);
                    return Some(shader::Action::request_redraw().and_capture());
                }

                match state.dragging {
                    Dragging::None => {}
                    Dragging::Pan => {
                        if let Some(last) = state.last_cursor {
                            let dx = cursor_pos.x - last.x;
                            let dy = cursor_pos.y - last.y;

                            if bounds.width > 1.0 && bounds.height > 1.0 {
                                let dx_ndc = (dx * 2.0) / bounds.width;
                                let dy_ndc = (-dy * 2.0) / bounds.height;

                                let half_h = camera.ortho_half_h;
                                let half_w = half_h * camera.aspect;

                                let pan = camera.right * (dx_ndc * half_w)
                                    + camera.up * (dy_ndc * half_h);
                                state.target += pan;
                            }
                        }

                        state.last_cursor = Some(cursor_pos);
                        return Some(shader::Action::request_redraw().and_capture());
                    }
                    Dragging::Rotate => {
                        if let Some(last) = state.last_cursor {
                            let dx = cursor_pos.x - last.x;
                            let dy = cursor_pos.y - last.y;

                            let rot_speed = 2.5;
                            if bounds.width > 1.0 && bounds.height > 1.0 {
                                state.yaw += (dx / bounds.width) * rot_speed;
                                state.pitch += (dy / bounds.height) * rot_speed;
                            } else {
                                state.yaw += dx * 0.01;
                                state.pitch += dy * 0.01;
                            }

                            let max_pitch = 1.55;
                            state.pitch = state.pitch.clamp(-max_pitch, max_pitch);
                        }

                        state.last_cursor = Some(cursor_pos);
                        return Some(shader::Action::request_redraw().and_capture());
                    }
                }
            }
            _ => {}
        }

        None
    }

    fn draw(&self, state: &Self::State, _cursor: mouse::Cursor, _bounds: Rectangle) -> Primitive {
        Primitive {
            target: state.target,
            distance: state.distance,
            yaw: state.yaw,
            pitch: state.pitch,
            camera_mode: self.camera_mode,
            light_time: self.light_time,
            plums: Arc::new(state.interaction.plums().to_vec()),
            plums_version: state.plums_version,
        }
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        let busy = state.interaction.held().is_some() || state.dragging != Dragging::None;
        if cursor.position_in(bounds).is_some() && busy {
            mouse::Interaction::Grabbing
        } else if cursor.position_in(bounds).is_some() {
            mouse::Interaction::Grab
        } else {
            mouse::Interaction::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct Primitive {
    target: Vec3,
    distance: f32,
    yaw: f32,
    pitch: f32,
    camera_mode: CameraMode,
    light_time: f32,
    plums: Arc<Vec<Plum>>,
    plums_version: u64,
}

impl shader::Primitive for Primitive {
    type Pipeline = Pipeline;

    fn prepare(
        &self,
        pipeline: &mut Self::Pipeline,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bounds: &Rectangle,
        viewport: &Viewport,
    ) {
        use wgpu::util::DeviceExt;

        // Keep the depth buffer sized to the swapchain.
        let physical = viewport.physical_size();
        let target_w = physical.width.max(1);
        let target_h = physical.height.max(1);

        if pipeline.depth_size != (target_w, target_h) {
            let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
                label: Some("icebox_depth"),
                size: wgpu::Extent3d {
                    width: target_w,
                    height: target_h,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Depth24Plus,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            });
            pipeline.depth = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());
            pipeline.depth_size = (target_w, target_h);
        }

        // Widget bounds in physical pixels, for the render viewport.
        let scale = viewport.scale_factor();
        pipeline.last_bounds = (
            bounds.x * scale,
            bounds.y * scale,
            (bounds.width * scale).max(1.0),
            (bounds.height * scale).max(1.0),
        );

        let camera = camera_from_params(
            self.target,
            self.distance,
            self.yaw,
            self.pitch,
            *bounds,
            self.camera_mode,
        );

        let view = Mat4::look_at_rh(camera.eye, camera.eye + camera.forward, Vec3::Y);
        let proj = match camera.mode {
            CameraMode::Perspective => {
                Mat4::perspective_rh(camera.fovy, camera.aspect, camera.near, camera.far)
            }
            CameraMode::Orthographic => {
                let half_h = camera.ortho_half_h;
                let half_w = half_h * camera.aspect;
                Mat4::orthographic_rh(-half_w, half_w, -half_h, half_h, camera.near, camera.far)
            }
        };

        let model = Mat4::IDENTITY;
        let model_view = view * model;
        let mvp = proj * model_view;

        let uniforms = Uniforms {
            model_view: model_view.to_cols_array_2d(),
            mvp: mvp.to_cols_array_2d(),
            light: sun_direction(self.light_time).extend(0.0).to_array(),
        };
        queue.write_buffer(&pipeline.uniforms, 0, bytemuck::bytes_of(&uniforms));

        if pipeline.plums_version != self.plums_version {
            pipeline.plums_version = self.plums_version;

            if let Some(mesh) = build_plums_mesh(self.plums.as_slice()) {
                let (vertices, indices) = mesh_to_vertex_index(&mesh);

                pipeline.plum_vertices =
                    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("icebox_plum_vertices"),
                        contents: bytemuck::cast_slice(&vertices),
                        usage: wgpu::BufferUsages::VERTEX,
                    });
                pipeline.plum_indices =
                    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("icebox_plum_indices"),
                        contents: bytemuck::cast_slice(&indices),
                        usage: wgpu::BufferUsages::INDEX,
                    });
                pipeline.plum_index_count = indices.len() as u32;
            } else {
                pipeline.plum_index_count = 0;
            }
        }
    }

    fn draw(&self, _pipeline: &Self::Pipeline, _render_pass: &mut wgpu::RenderPass<'_>) -> bool {
        // Use `render` so we can attach a depth buffer.
        false
    }

    fn render(
        &self,
        pipeline: &Self::Pipeline,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        clip_bounds: &Rectangle<u32>,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("icebox_scene_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &pipeline.depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let (bx, by, bw, bh) = pipeline.last_bounds;
        render_pass.set_viewport(bx, by, bw, bh, 0.0, 1.0);
        render_pass.set_scissor_rect(
            clip_bounds.x,
            clip_bounds.y,
            clip_bounds.width,
            clip_bounds.height,
        );

        render_pass.set_pipeline(&pipeline.background_pipeline);
        render_pass.draw(0..3, 0..1);

        if pipeline.plum_index_count > 0 {
            render_pass.set_pipeline(&pipeline.plum_pipeline);
            render_pass.set_bind_group(0, &pipeline.bind_group, &[]);
            render_pass.set_vertex_buffer(0, pipeline.plum_vertices.slice(..));
            render_pass
                .set_index_buffer(pipeline.plum_indices.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..pipeline.plum_index_count, 0, 0..1);
        }

        // The icebox is translucent; draw it after the opaque plums.
        render_pass.set_pipeline(&pipeline.icebox_pipeline);
        render_pass.set_bind_group(0, &pipeline.bind_group, &[]);
        render_pass.set_vertex_buffer(0, pipeline.icebox_vertices.slice(..));
        render_pass.set_index_buffer(pipeline.icebox_indices.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..pipeline.icebox_index_count, 0, 0..1);
    }
}

pub fn widget<'a, Message>(
    camera_mode: CameraMode,
    light_time: f32,
    on_plums_changed: impl Fn(usize) -> Message + 'static,
) -> Element<'a, Message>
where
    Message: 'a,
{
    iced::widget::shader::Shader::new(Scene {
        camera_mode,
        light_time,
        on_plums_changed: Some(Rc::new(on_plums_changed)),
    })
    .width(Length::Fill)
    .height(Length::Fill)
    .into()
}
