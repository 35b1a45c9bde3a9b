//! SDL2 window that presents frames and turns input into scene commands.

use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::mouse::MouseButton;
use sdl2::pixels::PixelFormatEnum;
use sdl2::rect::Rect;

use crate::backend::RenderError;
use crate::config::RenderFlag;
use crate::light::ShadingMode;
use crate::projection::ProjectionMode;
use crate::scene::SceneCommand;
use crate::transform::{AxisKey, Interaction};

/// World units the light moves per arrow key press.
pub const LIGHT_STEP: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowEvent {
    Quit,
    Resize(u32, u32),
    Command(SceneCommand),
    /// Move the light by `(dx, dy)` in world units.
    MoveLight(f32, f32),
    Snapshot,
}

/// Modifier and button state tracked across events.
#[derive(Debug, Default, Clone, Copy)]
struct InputState {
    left_down: bool,
    right_down: bool,
    ctrl: bool,
    axis: AxisKey,
}

pub struct Window {
    canvas: sdl2::render::Canvas<sdl2::video::Window>,
    texture: sdl2::render::Texture<'static>,
    texture_creator: Box<sdl2::render::TextureCreator<sdl2::video::WindowContext>>,
    event_pump: sdl2::EventPump,
    input: InputState,
    interaction: Interaction,
    width: u32,
    height: u32,
}

fn display_error<E: ToString>(e: E) -> RenderError {
    RenderError::Display(e.to_string())
}

impl Window {
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self, RenderError> {
        let sdl_context = sdl2::init().map_err(display_error)?;
        let video_subsystem = sdl_context.video().map_err(display_error)?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .resizable()
            .build()
            .map_err(display_error)?;

        let canvas = window.into_canvas().build().map_err(display_error)?;
        let texture_creator = Box::new(canvas.texture_creator());
        let event_pump = sdl_context.event_pump().map_err(display_error)?;

        // SAFETY: texture_creator is heap-allocated and lives as long as Window.
        // The texture field is declared before texture_creator so it drops first.
        let texture_creator_ref: &'static sdl2::render::TextureCreator<sdl2::video::WindowContext> =
            unsafe { &*(texture_creator.as_ref() as *const _) };
        let texture = texture_creator_ref
            .create_texture_streaming(PixelFormatEnum::RGBA32, width, height)
            .map_err(display_error)?;

        log::info!("opened {}x{} window", width, height);

        Ok(Self {
            canvas,
            texture,
            texture_creator,
            event_pump,
            input: InputState::default(),
            interaction: Interaction::default(),
            width,
            height,
        })
    }

    /// Blocks until at least one event arrives, then drains the queue.
    pub fn wait_events(&mut self) -> Vec<WindowEvent> {
        let first = self.event_pump.wait_event();
        let mut raw = vec![first];
        raw.extend(self.event_pump.poll_iter());

        raw.into_iter()
            .filter_map(|event| self.translate(event))
            .collect()
    }

    fn translate(&mut self, event: Event) -> Option<WindowEvent> {
        match event {
            Event::Quit { .. } => Some(WindowEvent::Quit),
            Event::Window {
                win_event: sdl2::event::WindowEvent::Resized(w, h),
                ..
            } => Some(WindowEvent::Resize(w.max(1) as u32, h.max(1) as u32)),

            Event::MouseButtonDown { mouse_btn, .. } | Event::MouseButtonUp { mouse_btn, .. } => {
                let down = matches!(event, Event::MouseButtonDown { .. });
                match mouse_btn {
                    MouseButton::Left => self.input.left_down = down,
                    MouseButton::Right => self.input.right_down = down,
                    _ => {}
                }
                None
            }
            Event::MouseMotion { xrel, yrel, .. } => {
                let (dx, dy) = (xrel as f32, yrel as f32);
                let delta = if self.input.left_down {
                    self.interaction
                        .rotation(dx, dy, self.input.axis, self.input.ctrl)
                } else if self.input.right_down {
                    self.interaction.translation(dx, dy, self.input.axis)
                } else {
                    return None;
                };
                Some(WindowEvent::Command(SceneCommand::ComposeTransform(delta)))
            }
            Event::MouseWheel { y, .. } => {
                // SDL reports scrolling away from the user as positive.
                let delta = self.interaction.scaling(-(y as f32), self.input.axis);
                Some(WindowEvent::Command(SceneCommand::ComposeTransform(delta)))
            }

            Event::KeyUp {
                keycode: Some(key), ..
            } => {
                self.track_modifiers(key, false);
                None
            }
            Event::KeyDown {
                keycode: Some(key),
                repeat,
                ..
            } => {
                self.track_modifiers(key, true);
                if repeat && !is_arrow(key) {
                    return None;
                }
                key_binding(key)
            }
            _ => None,
        }
    }

    fn track_modifiers(&mut self, key: Keycode, down: bool) {
        let held = |axis| if down { axis } else { AxisKey::None };
        match key {
            Keycode::LCtrl | Keycode::RCtrl => self.input.ctrl = down,
            Keycode::X => self.input.axis = held(AxisKey::X),
            Keycode::Y => self.input.axis = held(AxisKey::Y),
            Keycode::Z => self.input.axis = held(AxisKey::Z),
            _ => {}
        }
    }

    /// Copies an RGBA8 frame into the window.
    pub fn present(&mut self, buffer: &[u8]) -> Result<(), RenderError> {
        self.texture
            .update(None, buffer, (self.width * 4) as usize)
            .map_err(display_error)?;

        self.canvas.clear();
        self.canvas
            .copy(&self.texture, None, Some(Rect::new(0, 0, self.width, self.height)))
            .map_err(display_error)?;
        self.canvas.present();
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        // SAFETY: Same as in new() - texture_creator outlives texture
        let texture_creator_ref: &'static sdl2::render::TextureCreator<sdl2::video::WindowContext> =
            unsafe { &*(self.texture_creator.as_ref() as *const _) };
        self.texture = texture_creator_ref
            .create_texture_streaming(PixelFormatEnum::RGBA32, width, height)
            .map_err(display_error)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

fn is_arrow(key: Keycode) -> bool {
    matches!(
        key,
        Keycode::Left | Keycode::Right | Keycode::Up | Keycode::Down
    )
}

fn key_binding(key: Keycode) -> Option<WindowEvent> {
    use SceneCommand::*;
    use WindowEvent::Command;

    let projection = |n| ProjectionMode::from_index(n).map(|mode| Command(SelectProjection(mode)));

    match key {
        Keycode::Escape => Some(WindowEvent::Quit),
        Keycode::Num1 => projection(1),
        Keycode::Num2 => projection(2),
        Keycode::Num3 => projection(3),
        Keycode::Num4 => projection(4),
        Keycode::Num5 => projection(5),
        Keycode::Num6 => projection(6),
        Keycode::Num7 => projection(7),

        Keycode::F => Some(Command(ToggleFlag(RenderFlag::FillFaces))),
        Keycode::W => Some(Command(ToggleFlag(RenderFlag::Wireframe))),
        Keycode::L => Some(Command(ToggleFlag(RenderFlag::Lighting))),
        Keycode::C => Some(Command(ToggleFlag(RenderFlag::BackfaceCulling))),
        Keycode::B => Some(Command(ToggleFlag(RenderFlag::ZBuffer))),
        Keycode::A => Some(Command(ToggleFlag(RenderFlag::Axes))),
        Keycode::I => Some(Command(ToggleFlag(RenderFlag::LightIndicator))),

        Keycode::G => Some(Command(SetShadingMode(ShadingMode::Flat))),
        Keycode::H => Some(Command(SetShadingMode(ShadingMode::Gouraud))),
        Keycode::P => Some(Command(SetShadingMode(ShadingMode::Phong))),

        Keycode::R => Some(Command(ResetTransform)),
        Keycode::S => Some(WindowEvent::Snapshot),

        Keycode::Left => Some(WindowEvent::MoveLight(-LIGHT_STEP, 0.0)),
        Keycode::Right => Some(WindowEvent::MoveLight(LIGHT_STEP, 0.0)),
        Keycode::Up => Some(WindowEvent::MoveLight(0.0, LIGHT_STEP)),
        Keycode::Down => Some(WindowEvent::MoveLight(0.0, -LIGHT_STEP)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_keys_select_projections() {
        assert_eq!(
            key_binding(Keycode::Num2),
            Some(WindowEvent::Command(SceneCommand::SelectProjection(
                ProjectionMode::OrthographicTop
            )))
        );
        assert_eq!(
            key_binding(Keycode::Num4),
            Some(WindowEvent::Command(SceneCommand::SelectProjection(
                ProjectionMode::perspective()
            )))
        );
    }

    #[test]
    fn letter_keys_toggle_flags_and_shading() {
        assert_eq!(
            key_binding(Keycode::W),
            Some(WindowEvent::Command(SceneCommand::ToggleFlag(RenderFlag::Wireframe)))
        );
        assert_eq!(
            key_binding(Keycode::P),
            Some(WindowEvent::Command(SceneCommand::SetShadingMode(ShadingMode::Phong)))
        );
        assert_eq!(key_binding(Keycode::Escape), Some(WindowEvent::Quit));
        assert_eq!(key_binding(Keycode::Q), None);
    }
}
