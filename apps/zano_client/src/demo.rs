use tracing::{debug, info};
use zano_runtime::{
    Color, ComponentKind, FrameTime, Instance, LuaScript, Renderer, SpriteRenderer, TextureHandle,
    Transform2D, Vec2,
};

use crate::config::ClientConfig;

/// Sprite controller used when no script is configured
pub const SPRITE_CONTROLLER: &str = include_str!("../scripts/sprite_controller.lua");

/// 50x50 white square every demo sprite is drawn with
const WHITE_SQUARE: TextureHandle = TextureHandle {
    id: 1,
    width: 50,
    height: 50,
};

/// Build the demo object: transform, red sprite and controller script
///
/// # Errors
/// Fails if the configured script cannot be found or read.
pub fn build_demo_object(config: &ClientConfig) -> zano_runtime::Result<Instance> {
    let script = match &config.script {
        Some(path) => LuaScript::from_file(path)?,
        None => LuaScript::new(SPRITE_CONTROLLER),
    }
    .with_config(config.script_config());

    let instance = Instance::new(config.object_name.as_str());
    instance.add(Transform2D::new(config.start_position).with_scale(Vec2::ONE))?;

    let mut sprite = SpriteRenderer::new(WHITE_SQUARE);
    sprite.color = Color::RED;
    instance.add(sprite)?;

    instance.add(script)?;
    debug!("Demo object '{}' has {:?}", instance.name(), instance.kinds());

    Ok(instance)
}

/// Step `frames` frames of `dt` seconds: one update pass then one draw pass each
///
/// # Returns
/// The time of the last simulated frame
pub fn run_frames(instance: &Instance, frames: u64, dt: f64, renderer: &mut dyn Renderer) -> FrameTime {
    let mut time = FrameTime::default();
    for frame in 1..=frames {
        time = time.advance(dt);
        instance.update(&time);
        instance.draw(&time, renderer);

        if frame % 60 == 0 {
            log_progress(instance, frame, &time);
        }
    }
    time
}

fn log_progress(instance: &Instance, frame: u64, time: &FrameTime) {
    let Some(transform) = instance.get_as::<Transform2D>(ComponentKind::Transform) else {
        info!("frame {} t={:.2}s", frame, time.total);
        return;
    };
    let Ok(transform) = transform.try_borrow() else {
        return;
    };
    info!(
        "frame {} t={:.2}s position={} rotation={:.2}",
        frame, time.total, transform.position, transform.rotation
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use zano_runtime::{RecordingRenderer, RuntimeError};

    #[test]
    fn test_demo_object_layout() {
        let instance = build_demo_object(&ClientConfig::default()).unwrap();
        assert_eq!(
            instance.kinds(),
            vec![ComponentKind::Transform, ComponentKind::Sprite, ComponentKind::Script]
        );
        assert_eq!(instance.name(), "sprite");
    }

    #[test]
    fn test_controller_spins_and_bobs() {
        let instance = build_demo_object(&ClientConfig::default()).unwrap();
        let mut renderer = RecordingRenderer::new();

        let time = run_frames(&instance, 30, 1.0 / 60.0, &mut renderer);

        assert_eq!(renderer.requests.len(), 30);
        let transform = instance
            .get_as::<Transform2D>(ComponentKind::Transform)
            .unwrap();
        let transform = transform.borrow();
        let expected_rotation = (time.total * 1.5) as f32;
        assert!((transform.rotation - expected_rotation).abs() < 1e-3);
        assert_eq!(transform.origin, Vec2::new(25.0, 25.0));
        assert_eq!(transform.position.x, 400.0);
        assert_ne!(transform.position.y, 300.0);

        let last = renderer.last().unwrap();
        assert_eq!(last.tint.r, 255);
        assert_eq!(last.position, transform.position);

        let script = instance.get_as::<LuaScript>(ComponentKind::Script).unwrap();
        assert_eq!(script.borrow().error_count(), 0);
    }

    #[test]
    fn test_script_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("still.lua");
        std::fs::write(&path, "function update(t) instance.getTransform().position = vec2(1, 1) end")
            .unwrap();
        let config = ClientConfig {
            script: Some(path.display().to_string()),
            ..ClientConfig::default()
        };

        let instance = build_demo_object(&config).unwrap();
        let mut renderer = RecordingRenderer::new();
        run_frames(&instance, 2, 0.5, &mut renderer);

        assert_eq!(renderer.last().unwrap().position, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_missing_script_fails_before_building() {
        let config = ClientConfig {
            script: Some("definitely/not/here.lua".to_string()),
            ..ClientConfig::default()
        };
        let err = build_demo_object(&config).unwrap_err();
        assert!(matches!(err, RuntimeError::ScriptNotFound { .. }));
    }
}
