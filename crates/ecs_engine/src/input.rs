//! Input events understood by the engine
//!
//! Windowing lives outside the crate. Hosts translate their native events
//! into [`InputEvent`]s; [`InputManager`] turns them into camera commands.

use crate::ecs::components::CameraMovement;

/// Host input event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A key was pressed; WASD moves the camera
    Key(char),
    /// Explicit camera movement
    Move(CameraMovement),
    /// Absolute pointer position in window coordinates
    PointerMoved {
        /// Horizontal position
        x: f32,
        /// Vertical position, growing downwards
        y: f32,
    },
    /// Relative pointer motion
    PointerDelta {
        /// Horizontal delta
        dx: f32,
        /// Vertical delta, positive downwards
        dy: f32,
    },
    /// The viewport changed size
    Resized {
        /// New width in pixels
        width: u32,
        /// New height in pixels
        height: u32,
    },
}

/// Camera command derived from an event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraCommand {
    /// Step in a direction
    Move(CameraMovement),
    /// Turn by a pointer delta
    Rotate {
        /// Horizontal delta
        dx: f32,
        /// Vertical delta
        dy: f32,
    },
    /// Change the viewport
    Resize {
        /// New width in pixels
        width: u32,
        /// New height in pixels
        height: u32,
    },
}

/// Input manager
///
/// Remembers the last pointer position so absolute positions become deltas.
/// The first position only primes the tracker.
#[derive(Debug, Default)]
pub struct InputManager {
    last_pointer: Option<(f32, f32)>,
}

impl InputManager {
    /// Create a new input manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate an event, or `None` if it has no camera effect
    pub fn translate(&mut self, event: InputEvent) -> Option<CameraCommand> {
        match event {
            InputEvent::Key(key) => CameraMovement::from_key(key).map(CameraCommand::Move),
            InputEvent::Move(direction) => Some(CameraCommand::Move(direction)),
            InputEvent::PointerMoved { x, y } => {
                let previous = self.last_pointer.replace((x, y))?;
                Some(CameraCommand::Rotate {
                    dx: x - previous.0,
                    dy: y - previous.1,
                })
            }
            InputEvent::PointerDelta { dx, dy } => Some(CameraCommand::Rotate { dx, dy }),
            InputEvent::Resized { width, height } => Some(CameraCommand::Resize { width, height }),
        }
    }

    /// Forget the last pointer position, e.g. when the pointer leaves the window
    pub fn reset_pointer(&mut self) {
        self.last_pointer = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_pointer_position_only_primes() {
        let mut input = InputManager::new();
        assert_eq!(input.translate(InputEvent::PointerMoved { x: 100.0, y: 50.0 }), None);
        assert_eq!(
            input.translate(InputEvent::PointerMoved { x: 110.0, y: 45.0 }),
            Some(CameraCommand::Rotate { dx: 10.0, dy: -5.0 })
        );

        input.reset_pointer();
        assert_eq!(input.translate(InputEvent::PointerMoved { x: 0.0, y: 0.0 }), None);
    }

    #[test]
    fn test_keys_map_to_movement() {
        let mut input = InputManager::new();
        assert_eq!(
            input.translate(InputEvent::Key('s')),
            Some(CameraCommand::Move(CameraMovement::Backward))
        );
        assert_eq!(input.translate(InputEvent::Key('x')), None);
    }
}
