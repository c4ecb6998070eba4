//! V≤3 status line: room description on the left, score/turns or time
//! on the right, rendered reverse-video across the status window's one
//! row, with the room description truncated if both sides don't fit
//! (§4.E).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMode {
    ScoreAndTurn,
    Time,
}

#[derive(Debug, Clone, Copy)]
pub struct StatusContext<'a> {
    pub room_name: &'a str,
    pub mode: StatusMode,
    /// Score in `ScoreAndTurn` mode, hour-of-day (0-23) in `Time` mode.
    pub first: i16,
    /// Turn count in `ScoreAndTurn` mode, minute-of-hour in `Time` mode.
    pub second: i16,
    pub width: u16,
}

/// Leading space mandated before the room name, plus the two-space gap
/// `format_right_segment` puts between score and turns.
pub fn format_status(ctx: &StatusContext<'_>) -> String {
    let width = ctx.width as usize;
    if width == 0 {
        return String::new();
    }
    let right = format_right_segment(ctx);
    let right = truncate(&right, width.saturating_sub(1));
    let right_len = right.chars().count();
    let room_budget = width.saturating_sub(right_len + 1);
    let room = truncate(ctx.room_name, room_budget);
    let used = 1 + room.chars().count() + right_len;
    let pad = width.saturating_sub(used);
    format!(" {room}{}{right}", " ".repeat(pad))
}

fn format_right_segment(ctx: &StatusContext<'_>) -> String {
    match ctx.mode {
        StatusMode::ScoreAndTurn => format!("Score: {}  Turns: {} ", ctx.first, ctx.second),
        // §4.E: a fixed 5-char 24-hour clock, right-aligned at xsize-5.
        StatusMode::Time => format!("{:02}:{:02}", ctx.first, ctx.second),
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else if max_chars == 0 {
        String::new()
    } else {
        s.chars().take(max_chars.saturating_sub(1)).collect::<String>() + "\u{2026}"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_score_and_turn_status() {
        let ctx = StatusContext {
            room_name: "Forest Path",
            mode: StatusMode::ScoreAndTurn,
            first: 10,
            second: 42,
            width: 40,
        };
        let s = format_status(&ctx);
        assert!(s.starts_with(" Forest Path"));
        assert!(s.ends_with("Score: 10  Turns: 42 "));
        assert_eq!(s.chars().count(), 40);
    }

    #[test]
    fn scenario_one_status_line() {
        let ctx = StatusContext {
            room_name: "Kitchen",
            mode: StatusMode::ScoreAndTurn,
            first: 5,
            second: 10,
            width: 35,
        };
        let s = format_status(&ctx);
        assert!(s.starts_with(" Kitchen"));
        assert!(s.ends_with("Score: 5  Turns: 10 "));
        assert_eq!(s.chars().count(), 35);
    }

    #[test]
    fn builds_24_hour_time_status() {
        let ctx = StatusContext {
            room_name: "Kitchen",
            mode: StatusMode::Time,
            first: 21,
            second: 5,
            width: 30,
        };
        let s = format_status(&ctx);
        assert!(s.ends_with("21:05"));
        assert_eq!(s.chars().count(), 30);
    }

    #[test]
    fn time_status_is_right_aligned_at_xsize_minus_five() {
        let ctx = StatusContext {
            room_name: "Hall",
            mode: StatusMode::Time,
            first: 9,
            second: 5,
            width: 20,
        };
        let s = format_status(&ctx);
        let chars: Vec<char> = s.chars().collect();
        let clock: String = chars[chars.len() - 5..].iter().collect();
        assert_eq!(clock, "09:05");
    }

    #[test]
    fn truncates_long_room_name_to_fit() {
        let ctx = StatusContext {
            room_name: "A Very Long Room Description That Will Not Fit",
            mode: StatusMode::ScoreAndTurn,
            first: 0,
            second: 0,
            width: 20,
        };
        let s = format_status(&ctx);
        assert_eq!(s.chars().count(), 20);
    }

    #[test]
    fn zero_width_status_is_empty() {
        let ctx = StatusContext {
            room_name: "Room",
            mode: StatusMode::ScoreAndTurn,
            first: 0,
            second: 0,
            width: 0,
        };
        assert_eq!(format_status(&ctx), "");
    }
}
