/// State of a button over the current frame.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ButtonState {
    #[default]
    Released,
    JustPressed,
    Pressed,
    JustReleased,
}

impl ButtonState {
    /// Derive the state from the previous and current raw readings.
    pub fn from_levels(was_down: bool, is_down: bool) -> Self {
        match (was_down, is_down) {
            (false, false) => ButtonState::Released,
            (false, true) => ButtonState::JustPressed,
            (true, true) => ButtonState::Pressed,
            (true, false) => ButtonState::JustReleased,
        }
    }

    #[inline]
    pub fn is_down(self) -> bool {
        matches!(self, ButtonState::JustPressed | ButtonState::Pressed)
    }

    #[inline]
    pub fn just_pressed(self) -> bool {
        self == ButtonState::JustPressed
    }

    #[inline]
    pub fn just_released(self) -> bool {
        self == ButtonState::JustReleased
    }
}
