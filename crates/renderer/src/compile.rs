use std::borrow::Cow;

use tracing::debug;
use wgpu::naga::front::glsl::{Frontend, Options};
use wgpu::naga::ShaderStage;

/// Uniform names the preview feeds each frame. Declarations of these in the
/// user shader are stripped during wrapping and replaced by the injected
/// block; a shader is free to reference any subset of them.
pub(crate) const CONTRACT_UNIFORMS: [&str; 7] = [
    "iTime",
    "iSpeed",
    "iResolution",
    "iPosition",
    "iPositionFixed",
    "iDirection",
    "iSliders",
];

/// Diagnostics from the two shader build tiers. Neither variant aborts the
/// preview; both are logged and the frame degrades to the fallback stage.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("{stage} shader compile error:\n{diagnostics}")]
    Compile {
        stage: &'static str,
        diagnostics: String,
    },
    #[error("program link error:\n{message}")]
    Link { message: String },
}

/// Pass A vertex stage: clip-space positions straight through.
pub(crate) const VERTEX_SHADER_GLSL: &str = r#"#version 450
layout(location = 0) in vec2 pos;

void main() {
    gl_Position = vec4(pos, 0.0, 1.0);
}
"#;

/// Pass B vertex stage: forwards per-vertex texture coordinates.
pub(crate) const BLIT_VERTEX_GLSL: &str = r#"#version 450
layout(location = 0) in vec2 position;
layout(location = 1) in vec2 texCoord;
layout(location = 0) out vec2 uv;

void main() {
    uv = texCoord;
    gl_Position = vec4(position, 0.0, 1.0);
}
"#;

/// Pass B fragment stage: samples the offscreen target.
pub(crate) const BLIT_FRAGMENT_GLSL: &str = r#"#version 450
layout(location = 0) in vec2 uv;
layout(location = 0) out vec4 fragColor;

layout(set = 0, binding = 0) uniform texture2D blitTexture;
layout(set = 0, binding = 1) uniform sampler blitSampler;

void main() {
    fragColor = texture(sampler2D(blitTexture, blitSampler), uv);
}
"#;

/// Stand-in fragment stage used when the user shader fails to build.
pub(crate) const FALLBACK_FRAGMENT_GLSL: &str = r#"#version 450
layout(location = 0) out vec4 fragColor;

void main() {
    fragColor = vec4(0.0, 0.0, 0.0, 1.0);
}
"#;

// Contract names map onto the block fields via macros so that stripped user
// declarations cannot clash with the injected ones.
const UNIFORM_HEADER: &str = r#"#version 450

layout(std140, set = 0, binding = 0) uniform FlightParams {
    vec2 _iResolution;
    float _iTime;
    float _iSpeed;
    vec3 _iPosition;
    vec3 _iPositionFixed;
    vec3 _iDirection;
    vec4 _iSliders;
} ubo;

#define iResolution ubo._iResolution
#define iTime ubo._iTime
#define iSpeed ubo._iSpeed
#define iPosition ubo._iPosition
#define iPositionFixed ubo._iPositionFixed
#define iDirection ubo._iDirection
#define iSliders ubo._iSliders
"#;

/// Rewrites a user fragment shader so it compiles against the injected
/// uniform block: the original `#version` directive and any contract uniform
/// declarations are dropped, and the first color output gains the explicit
/// location Vulkan-flavored GLSL requires.
pub(crate) fn wrap_user_fragment(source: &str) -> String {
    let mut sanitized = String::new();
    let mut located_output = false;
    for line in source.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("#version") {
            continue;
        }
        if trimmed.starts_with("uniform ")
            && CONTRACT_UNIFORMS.iter().any(|name| trimmed.contains(name))
        {
            continue;
        }
        if !located_output && trimmed.starts_with("out ") {
            sanitized.push_str("layout(location = 0) ");
            sanitized.push_str(trimmed);
            sanitized.push('\n');
            located_output = true;
            continue;
        }
        sanitized.push_str(line);
        sanitized.push('\n');
    }
    format!("{UNIFORM_HEADER}\n#line 1\n{sanitized}")
}

/// Runs the wrapped source through the GLSL front end ahead of module
/// creation so that syntax errors surface as readable diagnostics instead of
/// a device-level validation failure.
pub(crate) fn validate_fragment_source(
    stage: &'static str,
    source: &str,
) -> Result<(), ShaderError> {
    let mut frontend = Frontend::default();
    frontend
        .parse(&Options::from(ShaderStage::Fragment), source)
        .map(|_| ())
        .map_err(|errors| ShaderError::Compile {
            stage,
            diagnostics: errors.emit_to_string(source),
        })
}

/// Contract uniforms the shader text never mentions. Purely informational;
/// the block is bound either way.
pub(crate) fn unreferenced_uniforms(source: &str) -> Vec<&'static str> {
    CONTRACT_UNIFORMS
        .iter()
        .copied()
        .filter(|name| !source.contains(name))
        .collect()
}

pub(crate) fn log_unreferenced_uniforms(source: &str) {
    for name in unreferenced_uniforms(source) {
        debug!(uniform = name, "shader never references contract uniform");
    }
}

pub(crate) fn create_module(
    device: &wgpu::Device,
    label: &str,
    source: &str,
    stage: ShaderStage,
) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(source.to_string()),
            stage,
            defines: &[],
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_FRAGMENT: &str = r#"#version 460 core
uniform float iTime;
uniform vec2 iResolution;
uniform vec3 iPosition;
out vec4 fragColor;

void main() {
    vec2 uv = gl_FragCoord.xy / iResolution;
    fragColor = vec4(uv, sin(iTime) * iPosition.z, 1.0);
}
"#;

    #[test]
    fn wrap_strips_contract_uniform_declarations() {
        let wrapped = wrap_user_fragment(VALID_FRAGMENT);
        assert!(!wrapped.contains("uniform float iTime"));
        assert!(!wrapped.contains("uniform vec2 iResolution"));
        assert!(!wrapped.contains("uniform vec3 iPosition"));
        assert!(wrapped.contains("#define iTime ubo._iTime"));
    }

    #[test]
    fn wrap_replaces_version_and_keeps_main() {
        let wrapped = wrap_user_fragment(VALID_FRAGMENT);
        assert!(!wrapped.contains("#version 460"));
        assert!(wrapped.starts_with("#version 450"));
        assert!(wrapped.contains("void main()"));
        assert!(wrapped.contains("#line 1"));
    }

    #[test]
    fn wrap_gives_the_output_an_explicit_location() {
        let wrapped = wrap_user_fragment(VALID_FRAGMENT);
        assert!(wrapped.contains("layout(location = 0) out vec4 fragColor;"));
    }

    #[test]
    fn wrap_leaves_unrelated_uniforms_alone() {
        let source = "#version 330\nuniform float userKnob;\nout vec4 c;\nvoid main() { c = vec4(userKnob); }\n";
        let wrapped = wrap_user_fragment(source);
        assert!(wrapped.contains("uniform float userKnob;"));
    }

    #[test]
    fn wrapped_user_fragment_parses() {
        let wrapped = wrap_user_fragment(VALID_FRAGMENT);
        validate_fragment_source("fragment", &wrapped).unwrap();
    }

    #[test]
    fn builtin_stages_parse() {
        let mut frontend = Frontend::default();
        frontend
            .parse(&Options::from(ShaderStage::Vertex), VERTEX_SHADER_GLSL)
            .unwrap();
        frontend
            .parse(&Options::from(ShaderStage::Vertex), BLIT_VERTEX_GLSL)
            .unwrap();
        validate_fragment_source("fragment", BLIT_FRAGMENT_GLSL).unwrap();
        validate_fragment_source("fragment", FALLBACK_FRAGMENT_GLSL).unwrap();
    }

    #[test]
    fn invalid_fragment_reports_diagnostics() {
        let err = validate_fragment_source(
            "fragment",
            "#version 450\nvoid main() { this is not glsl; }\n",
        )
        .unwrap_err();
        match err {
            ShaderError::Compile { stage, diagnostics } => {
                assert_eq!(stage, "fragment");
                assert!(!diagnostics.is_empty());
            }
            other => panic!("expected a compile error, got {other:?}"),
        }
    }

    #[test]
    fn unreferenced_scan_reports_unused_names() {
        let missing = unreferenced_uniforms(VALID_FRAGMENT);
        assert!(missing.contains(&"iSpeed"));
        assert!(missing.contains(&"iDirection"));
        assert!(missing.contains(&"iSliders"));
        assert!(!missing.contains(&"iTime"));
        assert!(!missing.contains(&"iResolution"));
    }
}
