use tracing::debug;

/// Share of the terminal width handed to the panes. The remainder absorbs
/// reflow artifacts in terminals with imprecise cell measurement.
const USABLE_RATIO: f64 = 0.90;
pub const MARGIN: usize = 4;
pub const DIVIDER_WIDTH: usize = 3;
pub const MIN_SIDE_BY_SIDE_WIDTH: usize = 100;
pub const MIN_COLUMN_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    Unified,
    #[default]
    SideBySide,
}

impl DisplayMode {
    pub fn toggle(self) -> Self {
        match self {
            DisplayMode::Unified => DisplayMode::SideBySide,
            DisplayMode::SideBySide => DisplayMode::Unified,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DisplayMode::Unified => "unified",
            DisplayMode::SideBySide => "side-by-side",
        }
    }
}

/// Outcome of planning a terminal width.
///
/// For `Unified`, `left_width` is the single pane width and `right_width`
/// is 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutDecision {
    pub mode: DisplayMode,
    pub left_width: usize,
    pub right_width: usize,
}

impl LayoutDecision {
    fn unified(width: usize) -> Self {
        Self {
            mode: DisplayMode::Unified,
            left_width: width,
            right_width: 0,
        }
    }

    /// Total columns of a composed row, divider included.
    pub fn total_width(&self) -> usize {
        match self.mode {
            DisplayMode::Unified => self.left_width,
            DisplayMode::SideBySide => self.left_width + DIVIDER_WIDTH + self.right_width,
        }
    }
}

/// Decide the layout for a terminal `width`.
pub fn plan(width: u16) -> LayoutDecision {
    let usable = (f64::from(width) * USABLE_RATIO).floor() as usize;
    let available = usable.saturating_sub(MARGIN);

    let decision = if available < MIN_SIDE_BY_SIDE_WIDTH {
        LayoutDecision::unified(available)
    } else {
        let content = available - DIVIDER_WIDTH;
        let left = content / 2;
        let right = content - left;
        if left < MIN_COLUMN_WIDTH || right < MIN_COLUMN_WIDTH {
            LayoutDecision::unified(available)
        } else {
            LayoutDecision {
                mode: DisplayMode::SideBySide,
                left_width: left,
                right_width: right,
            }
        }
    };

    debug!(
        width,
        mode = decision.mode.label(),
        left = decision.left_width,
        right = decision.right_width,
        "planned layout"
    );
    decision
}

/// Combine a requested mode with the planned layout. A side-by-side request
/// on a too-narrow terminal is downgraded; the caller labels it `(auto)`.
pub fn effective(requested: DisplayMode, width: u16) -> LayoutDecision {
    let planned = plan(width);
    match requested {
        DisplayMode::SideBySide => planned,
        DisplayMode::Unified => LayoutDecision::unified(planned.total_width()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_force_unified_below_threshold() {
        // given: 80 columns -> 72 usable -> 68 available
        let decision = plan(80);

        // then
        assert_eq!(decision.mode, DisplayMode::Unified);
        assert_eq!(decision.left_width, 68);
        assert_eq!(decision.right_width, 0);
    }

    #[test]
    fn should_split_wide_terminal() {
        // given: 200 -> 180 usable -> 176 available -> 173 content
        let decision = plan(200);

        // then
        assert_eq!(decision.mode, DisplayMode::SideBySide);
        assert_eq!(decision.left_width, 86);
        assert_eq!(decision.right_width, 87);
        assert_eq!(decision.total_width(), 176);
    }

    #[test]
    fn should_switch_exactly_at_threshold() {
        // 116 -> 104 usable -> 100 available
        assert_eq!(plan(116).mode, DisplayMode::SideBySide);
        // 115 -> 103 usable -> 99 available
        assert_eq!(plan(115).mode, DisplayMode::Unified);
    }

    #[test]
    fn should_never_return_to_side_by_side_when_shrinking() {
        let mut seen_unified = false;
        for width in (0..=400u16).rev() {
            let decision = plan(width);
            if seen_unified {
                assert_eq!(decision.mode, DisplayMode::Unified, "width {}", width);
            }
            if decision.mode == DisplayMode::Unified {
                seen_unified = true;
            } else {
                assert!(decision.left_width >= MIN_COLUMN_WIDTH);
                assert!(decision.right_width >= decision.left_width);
            }
        }
    }

    #[test]
    fn should_survive_tiny_terminals() {
        let decision = plan(0);
        assert_eq!(decision.mode, DisplayMode::Unified);
        assert_eq!(decision.left_width, 0);
    }

    #[test]
    fn should_honor_unified_request_on_wide_terminal() {
        let decision = effective(DisplayMode::Unified, 200);
        assert_eq!(decision.mode, DisplayMode::Unified);
        assert_eq!(decision.left_width, 176);
    }

    #[test]
    fn should_downgrade_side_by_side_request_when_narrow() {
        assert_eq!(
            effective(DisplayMode::SideBySide, 80).mode,
            DisplayMode::Unified
        );
    }
}
