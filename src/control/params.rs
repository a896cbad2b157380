use super::commands::Command;
use std::ops::ControlFlow;

const BLUR_STEP: u32 = 2;
const FOCUS_STEP: i32 = 10;
const FOCUS_FLOOR: i32 = 10;
const TRANSLUCENT_STEP: i32 = 10;
/// Increments of focus and translucent size stop once this is reached
const BAND_CEILING: i32 = 256;

/// Run-time tuning knobs read by the mask and compositing stages every frame
///
/// Fields are independent, so a change between two frames never needs
/// cross-field consistency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    /// Flip the composite horizontally
    pub mirror: bool,
    /// Center of the focus band in the intensity domain
    pub focus: i32,
    /// Half-width of the soft transition band below `focus`
    pub translucent_size: i32,
    /// Median blur kernel size, always odd
    pub blur: u32,
    /// Dilation iteration count
    pub dilate: u32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            mirror: false,
            focus: 100,
            translucent_size: 40,
            blur: 67,
            dilate: 4,
        }
    }
}

impl Params {
    /// Lower edge of the focus band; intensities below it are foreground
    pub fn band_floor(&self) -> i32 {
        self.focus - self.translucent_size
    }

    /// Pure state transition for one command
    ///
    /// Guarded commands return the record unchanged when the step would
    /// leave the field's domain. `Print` and `Quit` never change state.
    pub fn apply(&self, command: Command) -> Params {
        let mut next = *self;
        match command {
            Command::ToggleMirror => next.mirror = !next.mirror,
            Command::IncreaseBlur => next.blur += BLUR_STEP,
            Command::DecreaseBlur if next.blur > 1 => next.blur -= BLUR_STEP,
            Command::IncreaseDilate => next.dilate += 1,
            Command::DecreaseDilate if next.dilate > 0 => next.dilate -= 1,
            Command::IncreaseFocus if next.focus < BAND_CEILING => next.focus += FOCUS_STEP,
            Command::DecreaseFocus if next.focus > FOCUS_FLOOR => next.focus -= FOCUS_STEP,
            Command::IncreaseTranslucent if next.translucent_size < BAND_CEILING => {
                next.translucent_size += TRANSLUCENT_STEP
            }
            Command::DecreaseTranslucent if next.translucent_size >= TRANSLUCENT_STEP => {
                next.translucent_size -= TRANSLUCENT_STEP
            }
            _ => {}
        }
        next
    }

    /// Apply a command in place and echo the outcome for the operator
    ///
    /// Returns `Break` when the command asks the loop to stop.
    pub fn dispatch(&mut self, command: Command) -> ControlFlow<()> {
        match command {
            Command::Quit => return ControlFlow::Break(()),
            Command::Print => {
                self.log();
                return ControlFlow::Continue(());
            }
            _ => {}
        }

        let next = self.apply(command);
        if next == *self {
            tracing::debug!("{:?} ignored at current bounds", command);
            return ControlFlow::Continue(());
        }
        *self = next;

        match command {
            Command::ToggleMirror => tracing::info!("mirror: {}", self.mirror),
            Command::IncreaseBlur | Command::DecreaseBlur => tracing::info!("blur: {}", self.blur),
            Command::IncreaseDilate | Command::DecreaseDilate => {
                tracing::info!("dilate: {}", self.dilate)
            }
            Command::IncreaseFocus | Command::DecreaseFocus => {
                tracing::info!("focus: {}", self.focus)
            }
            Command::IncreaseTranslucent | Command::DecreaseTranslucent => {
                tracing::info!("translucent_size: {}", self.translucent_size)
            }
            Command::Print | Command::Quit => {}
        }
        ControlFlow::Continue(())
    }

    pub fn log(&self) {
        tracing::info!("mirror: {}", self.mirror);
        tracing::info!("focus: {}", self.focus);
        tracing::info!("translucent_size: {}", self.translucent_size);
        tracing::info!("blur: {}", self.blur);
        tracing::info!("dilate: {}", self.dilate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tuned_values() {
        let params = Params::default();
        assert!(!params.mirror);
        assert_eq!(params.focus, 100);
        assert_eq!(params.translucent_size, 40);
        assert_eq!(params.blur, 67);
        assert_eq!(params.dilate, 4);
        assert_eq!(params.band_floor(), 60);
    }

    #[test]
    fn each_command_moves_one_field() {
        let params = Params::default();

        assert!(params.apply(Command::ToggleMirror).mirror);
        assert_eq!(params.apply(Command::IncreaseBlur).blur, 69);
        assert_eq!(params.apply(Command::DecreaseBlur).blur, 65);
        assert_eq!(params.apply(Command::IncreaseDilate).dilate, 5);
        assert_eq!(params.apply(Command::DecreaseDilate).dilate, 3);
        assert_eq!(params.apply(Command::IncreaseFocus).focus, 110);
        assert_eq!(params.apply(Command::DecreaseFocus).focus, 90);
        assert_eq!(params.apply(Command::IncreaseTranslucent).translucent_size, 50);
        assert_eq!(params.apply(Command::DecreaseTranslucent).translucent_size, 30);

        let blurred = params.apply(Command::IncreaseBlur);
        assert_eq!(
            blurred,
            Params {
                blur: 69,
                ..params
            }
        );
    }

    #[test]
    fn print_and_quit_leave_state_alone() {
        let params = Params::default();
        assert_eq!(params.apply(Command::Print), params);
        assert_eq!(params.apply(Command::Quit), params);
    }

    #[test]
    fn decrements_stop_at_lower_bounds() {
        let params = Params {
            mirror: false,
            focus: 10,
            translucent_size: 0,
            blur: 1,
            dilate: 0,
        };

        for command in [
            Command::DecreaseBlur,
            Command::DecreaseDilate,
            Command::DecreaseFocus,
            Command::DecreaseTranslucent,
        ] {
            assert_eq!(params.apply(command), params, "{:?}", command);
        }
    }

    #[test]
    fn increments_stop_at_band_ceiling() {
        let params = Params {
            focus: 256,
            translucent_size: 256,
            ..Params::default()
        };

        assert_eq!(params.apply(Command::IncreaseFocus), params);
        assert_eq!(params.apply(Command::IncreaseTranslucent), params);
    }

    #[test]
    fn blur_stays_odd_through_steps() {
        let mut params = Params::default();
        for _ in 0..50 {
            params = params.apply(Command::DecreaseBlur);
            assert_eq!(params.blur % 2, 1);
        }
        assert_eq!(params.blur, 1);
        for _ in 0..5 {
            params = params.apply(Command::IncreaseBlur);
            assert_eq!(params.blur % 2, 1);
        }
        assert_eq!(params.blur, 11);
    }

    #[test]
    fn dispatch_updates_in_place_and_signals_quit() {
        let mut params = Params::default();

        assert_eq!(params.dispatch(Command::ToggleMirror), ControlFlow::Continue(()));
        assert!(params.mirror);

        assert_eq!(params.dispatch(Command::Print), ControlFlow::Continue(()));
        assert!(params.mirror);

        assert_eq!(params.dispatch(Command::Quit), ControlFlow::Break(()));
    }
}
