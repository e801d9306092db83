const GLOBALS: &str = r#"
struct GlobalUniform {
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    ambient: vec4<f32>,
    directional_direction: vec4<f32>,
    directional_color: vec4<f32>,
    point_position: vec4<f32>,
    point_color: vec4<f32>,
    viewport: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> globals: GlobalUniform;
"#;

const EARTH: &str = r#"
struct ObjectConstants {
    model: mat4x4<f32>,
    normal: mat3x4<f32>,
}

@group(1) @binding(0)
var<uniform> object: ObjectConstants;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) color: vec3<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) color: vec3<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world_position = object.model * vec4<f32>(input.position, 1.0);
    out.position = globals.view_proj * world_position;
    out.world_pos = world_position.xyz;
    let world_normal = mat3x3<f32>(
        object.normal[0].xyz,
        object.normal[1].xyz,
        object.normal[2].xyz
    ) * input.normal;
    out.normal = normalize(world_normal);
    out.color = input.color;
    return out;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    let normal = normalize(input.normal);
    var light = globals.ambient.xyz;
    light += max(dot(normal, globals.directional_direction.xyz), 0.0) * globals.directional_color.xyz;

    let to_point = globals.point_position.xyz - input.world_pos;
    let distance_sq = max(dot(to_point, to_point), 1e-4);
    let point_dir = to_point * inverseSqrt(distance_sq);
    light += max(dot(normal, point_dir), 0.0) * globals.point_color.xyz / distance_sq;

    return vec4<f32>(input.color * light, 1.0);
}
"#;

const STARS: &str = r#"
struct StarInput {
    @location(0) position: vec3<f32>,
    @location(1) size: f32,
    @location(2) color: vec4<f32>,
}

struct StarOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) corner: vec2<f32>,
    @location(1) color: vec3<f32>,
}

var<private> CORNERS: array<vec2<f32>, 6> = array<vec2<f32>, 6>(
    vec2<f32>(-1.0, -1.0),
    vec2<f32>(1.0, -1.0),
    vec2<f32>(1.0, 1.0),
    vec2<f32>(-1.0, -1.0),
    vec2<f32>(1.0, 1.0),
    vec2<f32>(-1.0, 1.0),
);

@vertex
fn vs_main(@builtin(vertex_index) index: u32, star: StarInput) -> StarOutput {
    var out: StarOutput;
    let corner = CORNERS[index];
    let view_position = globals.view * vec4<f32>(star.position, 1.0);
    var clip = globals.projection * view_position;
    let depth = max(-view_position.z, 1e-3);
    let time = globals.viewport.z;
    let pixel_size = star.size * (30.0 / depth) * (3.0 + sin(time + 100.0));
    clip = vec4<f32>(clip.xy + corner * pixel_size / globals.viewport.xy * clip.w, clip.zw);
    out.position = clip;
    out.corner = corner;
    out.color = star.color.rgb;
    return out;
}

@fragment
fn fs_main(input: StarOutput) -> @location(0) vec4<f32> {
    let d = length(input.corner) * 0.5;
    var opacity = 1.0;
    if (globals.viewport.w > 0.5) {
        opacity = 1.0 / (1.0 + exp(16.0 * (d - 0.25)));
    }
    return vec4<f32>(input.color, opacity);
}
"#;

pub(crate) const OVERLAY_SHADER: &str = r#"
struct OverlayInput {
    @location(0) position: vec2<f32>,
    @location(1) color: vec4<f32>,
}

struct OverlayOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec4<f32>,
}

@vertex
fn vs_main(input: OverlayInput) -> OverlayOutput {
    var out: OverlayOutput;
    out.position = vec4<f32>(input.position, 0.0, 1.0);
    out.color = input.color;
    return out;
}

@fragment
fn fs_main(input: OverlayOutput) -> @location(0) vec4<f32> {
    return input.color;
}
"#;

pub(crate) fn earth_shader() -> String {
    format!("{GLOBALS}{EARTH}")
}

pub(crate) fn star_shader() -> String {
    format!("{GLOBALS}{STARS}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shaders_share_the_global_block() {
        for source in [earth_shader(), star_shader()] {
            assert_eq!(source.matches("struct GlobalUniform").count(), 1);
            assert!(source.contains("fn vs_main"));
            assert!(source.contains("fn fs_main"));
        }
        assert!(!OVERLAY_SHADER.contains("globals"));
    }
}
