use std::path::PathBuf;

use clap::Parser;

/// Command-line interface for the shaderfly preview binary.
#[derive(Parser, Debug)]
#[command(
    name = "shaderfly",
    author,
    version,
    about = "First-person fragment shader previewer"
)]
pub struct Cli {
    /// Fragment shader to preview (.frag or .glsl).
    #[arg(value_name = "SHADER", value_parser = parse_shader_path)]
    pub shader: PathBuf,

    /// Offscreen render width in pixels.
    #[arg(long, default_value_t = 320, value_parser = parse_render_width)]
    pub width: u32,

    /// Render aspect ratio as width:height (e.g. 16:9).
    #[arg(long = "ar", default_value = "16:9", value_parser = parse_aspect_ratio)]
    pub aspect_ratio: f32,

    /// Open a resizable window at the render size instead of fullscreen.
    #[arg(long)]
    pub windowed: bool,

    /// Pointer sensitivity in radians per pixel of motion.
    #[arg(long, default_value_t = 0.003)]
    pub sensitivity: f64,

    /// Distance travelled per frame per held movement key.
    #[arg(long, default_value_t = 1.0)]
    pub move_step: f32,

    /// Pin the speed factor to 1 and ignore the Q/E speed keys.
    #[arg(long)]
    pub fixed_speed: bool,

    /// Ignore the slider keys and keep iSliders at zero.
    #[arg(long)]
    pub no_sliders: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_shader_path(value: &str) -> Result<PathBuf, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("shader path cannot be empty".to_string());
    }
    let path = PathBuf::from(trimmed);
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("frag") | Some("glsl") => {}
        _ => return Err(format!("'{trimmed}' must have a .frag or .glsl extension")),
    }
    if !path.is_file() {
        return Err(format!("shader file not found: {trimmed}"));
    }
    Ok(path)
}

pub fn parse_render_width(value: &str) -> Result<u32, String> {
    let width: u32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid render width '{value}'"))?;
    if width == 0 {
        return Err("render width must be greater than zero".to_string());
    }
    Ok(width)
}

/// Parses `width:height` into the ratio width over height.
pub fn parse_aspect_ratio(value: &str) -> Result<f32, String> {
    let trimmed = value.trim();
    let (width, height) = trimmed
        .split_once(':')
        .ok_or_else(|| format!("invalid aspect ratio '{trimmed}', expected width:height"))?;
    let width: f32 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid aspect ratio width in '{trimmed}'"))?;
    let height: f32 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid aspect ratio height in '{trimmed}'"))?;
    if width <= 0.0 || height <= 0.0 {
        return Err(format!(
            "aspect ratio '{trimmed}' must use positive dimensions"
        ));
    }
    Ok(width / height)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use clap::Parser;
    use tempfile::TempDir;

    use super::*;

    fn shader_fixture(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, "void main() {}\n").unwrap();
        path
    }

    #[test]
    fn defaults_match_the_documented_values() {
        let dir = TempDir::new().unwrap();
        let shader = shader_fixture(&dir, "scene.frag");

        let cli = Cli::try_parse_from(["shaderfly", shader.to_str().unwrap()]).unwrap();
        assert_eq!(cli.shader, shader);
        assert_eq!(cli.width, 320);
        assert!((cli.aspect_ratio - 16.0 / 9.0).abs() < 1e-6);
        assert!(!cli.windowed);
        assert!((cli.sensitivity - 0.003).abs() < 1e-12);
        assert!((cli.move_step - 1.0).abs() < 1e-6);
        assert!(!cli.fixed_speed);
        assert!(!cli.no_sliders);
    }

    #[test]
    fn flags_override_defaults() {
        let dir = TempDir::new().unwrap();
        let shader = shader_fixture(&dir, "scene.glsl");

        let cli = Cli::try_parse_from([
            "shaderfly",
            shader.to_str().unwrap(),
            "--width",
            "640",
            "--ar",
            "4:3",
            "--windowed",
            "--fixed-speed",
            "--no-sliders",
        ])
        .unwrap();
        assert_eq!(cli.width, 640);
        assert!((cli.aspect_ratio - 4.0 / 3.0).abs() < 1e-6);
        assert!(cli.windowed);
        assert!(cli.fixed_speed);
        assert!(cli.no_sliders);
    }

    #[test]
    fn shader_path_requires_known_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scene.txt");
        fs::write(&path, "void main() {}\n").unwrap();

        let err = parse_shader_path(path.to_str().unwrap()).unwrap_err();
        assert!(err.contains(".frag or .glsl"));
    }

    #[test]
    fn shader_path_must_exist() {
        let err = parse_shader_path("/nonexistent/scene.frag").unwrap_err();
        assert!(err.contains("not found"));
    }

    #[test]
    fn render_width_rejects_zero() {
        assert!(parse_render_width("0").is_err());
        assert!(parse_render_width("abc").is_err());
        assert_eq!(parse_render_width("320"), Ok(320));
        assert_eq!(parse_render_width(" 640 "), Ok(640));
    }

    #[test]
    fn aspect_ratio_accepts_fractional_operands() {
        let ratio = parse_aspect_ratio("21.5:9").unwrap();
        assert!((ratio - 21.5 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn aspect_ratio_rejects_malformed_values() {
        assert!(parse_aspect_ratio("16x9").is_err());
        assert!(parse_aspect_ratio("16:").is_err());
        assert!(parse_aspect_ratio(":9").is_err());
        assert!(parse_aspect_ratio("16:0").is_err());
        assert!(parse_aspect_ratio("-16:9").is_err());
    }
}
