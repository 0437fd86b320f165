//! Edit actions that turn the current buffer into a suggested word.

use crate::context::{needs_leading_space, SearchContext};
use crate::interface::{InputAction, Suggestion};

/// Build the suggestion for `display` (already capitalized) given what is
/// typed around the cursor. Counts are in characters.
pub fn make_suggestion(display: String, ctx: &SearchContext, before: Option<&str>, after: Option<&str>) -> Suggestion {
    let actions = synthesize_actions(&display, ctx, before, after);
    Suggestion { text: display, actions }
}

pub fn synthesize_actions(
    display: &str,
    ctx: &SearchContext,
    before: Option<&str>,
    after: Option<&str>,
) -> Vec<InputAction> {
    let prefix_len = ctx.prefix_len();
    let suffix_len = ctx.suffix_len();
    let chars: Vec<char> = display.chars().collect();

    match (prefix_len > 0, suffix_len > 0) {
        (true, true) => {
            let end = chars.len().saturating_sub(suffix_len).max(prefix_len.min(chars.len()));
            let middle: String = chars[prefix_len.min(chars.len())..end].iter().collect();
            let mut actions = vec![
                InputAction::Insert { text: middle },
                InputAction::MoveCursor {
                    delta: i32::try_from(suffix_len).unwrap_or(i32::MAX),
                },
            ];
            // The word ends the document: finish it off like a typed word
            let at_end = after.is_some_and(|text| text.chars().nth(suffix_len).is_none());
            if at_end {
                actions.push(InputAction::Insert { text: " ".to_string() });
                actions.push(InputAction::MaybePunctuating { value: true });
            }
            actions
        }
        (true, false) => {
            let mut text: String = chars.iter().skip(prefix_len).collect();
            text.push(' ');
            vec![
                InputAction::Insert { text },
                InputAction::MaybePunctuating { value: true },
            ]
        }
        (false, true) => {
            let text: String = chars[..chars.len().saturating_sub(suffix_len)].iter().collect();
            vec![InputAction::Insert { text }]
        }
        (false, false) => {
            let mut text = String::new();
            if needs_leading_space(before) {
                text.push(' ');
            }
            text.push_str(display);
            text.push(' ');
            vec![
                InputAction::Insert { text },
                InputAction::MaybePunctuating { value: true },
            ]
        }
    }
}
