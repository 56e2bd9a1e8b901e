//! WGSL sources and the uniform block they share.

use bytemuck::{Pod, Zeroable};

/// Per-frame uniforms, bound at group 0 binding 0 by the overlay and point
/// pipelines. Layout matches `FrameUniforms` in the WGSL below.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct FrameUniforms {
    pub screen_size: [f32; 2],
    pub _padding: [f32; 2],
    pub overlay: [f32; 4],
    pub point_color: [f32; 4],
}

const UNIFORMS_WGSL: &str = r#"
struct FrameUniforms {
    screen_size: vec2<f32>,
    _padding: vec2<f32>,
    overlay: vec4<f32>,
    point_color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> frame_data: FrameUniforms;
"#;

const OVERLAY_BODY: &str = r#"
@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> @builtin(position) vec4<f32> {
    // One oversized triangle covers the whole viewport.
    var corners = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 3.0, -1.0),
        vec2<f32>(-1.0,  3.0),
    );
    return vec4<f32>(corners[vertex_index], 0.0, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return frame_data.overlay;
}
"#;

const POINTS_BODY: &str = r#"
@vertex
fn vs_main(@location(0) pixel: vec2<f32>) -> @builtin(position) vec4<f32> {
    // Pixel coordinates, origin top-left, sampled at the pixel center.
    let ndc = vec2<f32>(
        (pixel.x + 0.5) / frame_data.screen_size.x * 2.0 - 1.0,
        1.0 - (pixel.y + 0.5) / frame_data.screen_size.y * 2.0,
    );
    return vec4<f32>(ndc, 0.0, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return frame_data.point_color;
}
"#;

/// Copies the persistent canvas onto the swapchain texture.
pub const BLIT_SOURCE: &str = r#"
@group(0) @binding(0)
var canvas: texture_2d<f32>;

@group(0) @binding(1)
var canvas_sampler: sampler;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    var corners = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 3.0, -1.0),
        vec2<f32>(-1.0,  3.0),
    );
    let pos = corners[vertex_index];

    var out: VertexOutput;
    out.clip_position = vec4<f32>(pos, 0.0, 1.0);
    out.uv = vec2<f32>((pos.x + 1.0) * 0.5, (1.0 - pos.y) * 0.5);
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(canvas, canvas_sampler, in.uv);
}
"#;

/// Full-screen translucent fill.
pub fn overlay_source() -> String {
    format!("{UNIFORMS_WGSL}{OVERLAY_BODY}")
}

/// One point per particle.
pub fn points_source() -> String {
    format!("{UNIFORMS_WGSL}{POINTS_BODY}")
}
