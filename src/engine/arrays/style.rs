//! Style Arrays
//!
//! The inline style of every element. Effects never write properties one by
//! one from scattered handlers: they compute a [`StylePatch`] from their own
//! state and hand it to [`apply`]. A patch entry is tri-state:
//!
//! - `None` - leave the property alone
//! - `Some(None)` - remove the inline property
//! - `Some(Some(v))` - set it
//!
//! [`css_text`] serialises the result the way a browser reports
//! `element.style.cssText`.

use std::time::Duration;

use super::{Column, clear, read, write};
use crate::types::{
    Animation, Length, Overflow, PointerEvents, Position, Rgba, Transform, Transition,
    format_number, format_seconds,
};

// =============================================================================
// CSS values
// =============================================================================

/// Serialise a property value.
pub trait CssValue {
    fn css_value(&self) -> String;
}

impl CssValue for f32 {
    fn css_value(&self) -> String {
        format_number(*self)
    }
}

impl CssValue for i32 {
    fn css_value(&self) -> String {
        self.to_string()
    }
}

impl CssValue for String {
    fn css_value(&self) -> String {
        self.clone()
    }
}

impl CssValue for Duration {
    fn css_value(&self) -> String {
        format_seconds(*self)
    }
}

impl CssValue for Rgba {
    fn css_value(&self) -> String {
        self.css()
    }
}

impl CssValue for Length {
    fn css_value(&self) -> String {
        self.css()
    }
}

impl CssValue for Transform {
    fn css_value(&self) -> String {
        self.css()
    }
}

impl CssValue for Transition {
    fn css_value(&self) -> String {
        self.css()
    }
}

impl CssValue for Animation {
    fn css_value(&self) -> String {
        self.css()
    }
}

impl CssValue for Position {
    fn css_value(&self) -> String {
        self.css().to_string()
    }
}

impl CssValue for Overflow {
    fn css_value(&self) -> String {
        self.css().to_string()
    }
}

impl CssValue for PointerEvents {
    fn css_value(&self) -> String {
        self.css().to_string()
    }
}

// =============================================================================
// InlineStyle / StylePatch
// =============================================================================

macro_rules! inline_style {
    ($($field:ident, $clear:ident: $ty:ty => $css:literal;)*) => {
        /// Inline style properties of one element. Field order is
        /// serialisation order.
        #[derive(Debug, Clone, PartialEq, Default)]
        pub struct InlineStyle {
            $(pub $field: Option<$ty>,)*
        }

        /// A change to an [`InlineStyle`].
        #[derive(Debug, Clone, PartialEq, Default)]
        pub struct StylePatch {
            $(pub $field: Option<Option<$ty>>,)*
        }

        impl StylePatch {
            pub fn new() -> Self {
                Self::default()
            }

            $(
                pub fn $field(mut self, value: $ty) -> Self {
                    self.$field = Some(Some(value));
                    self
                }

                pub fn $clear(mut self) -> Self {
                    self.$field = Some(None);
                    self
                }
            )*

            /// True when applying the patch changes nothing.
            pub fn is_empty(&self) -> bool {
                true $(&& self.$field.is_none())*
            }
        }

        impl InlineStyle {
            pub fn apply(&mut self, patch: &StylePatch) {
                $(
                    if let Some(value) = &patch.$field {
                        self.$field = value.clone();
                    }
                )*
            }

            pub fn css_text(&self) -> String {
                let mut parts: Vec<String> = Vec::new();
                $(
                    if let Some(value) = &self.$field {
                        parts.push(format!("{}: {};", $css, value.css_value()));
                    }
                )*
                parts.join(" ")
            }

            pub fn is_empty(&self) -> bool {
                true $(&& self.$field.is_none())*
            }
        }
    };
}

inline_style! {
    position, clear_position: Position => "position";
    overflow, clear_overflow: Overflow => "overflow";
    width, clear_width: Length => "width";
    height, clear_height: Length => "height";
    left, clear_left: Length => "left";
    top, clear_top: Length => "top";
    right, clear_right: Length => "right";
    font_size, clear_font_size: Length => "font-size";
    opacity, clear_opacity: f32 => "opacity";
    transform, clear_transform: Transform => "transform";
    transition, clear_transition: Transition => "transition";
    animation, clear_animation: Animation => "animation";
    animation_delay, clear_animation_delay: Duration => "animation-delay";
    box_shadow, clear_box_shadow: String => "box-shadow";
    background, clear_background: Rgba => "background";
    background_position, clear_background_position: String => "background-position";
    pointer_events, clear_pointer_events: PointerEvents => "pointer-events";
    z_index, clear_z_index: i32 => "z-index";
}

// =============================================================================
// Arrays
// =============================================================================

thread_local! {
    static STYLE: Column<InlineStyle> = Column::new(Vec::new());
}

/// Ensure arrays have capacity for the given index.
pub fn ensure_capacity(index: usize) {
    write(&STYLE, index, |_| ());
}

/// Clear values at index.
pub fn clear_at_index(index: usize) {
    clear(&STYLE, index);
}

/// Reset all arrays.
pub fn reset() {
    STYLE.with(|arr| arr.borrow_mut().clear());
}

// =============================================================================
// Access
// =============================================================================

/// Get the inline style at index.
pub fn get_style(index: usize) -> InlineStyle {
    read(&STYLE, index)
}

/// Apply a patch to the inline style at index.
pub fn apply(index: usize, patch: &StylePatch) {
    if patch.is_empty() {
        return;
    }
    write(&STYLE, index, |s| s.apply(patch));
}

/// Serialised inline style at index.
pub fn css_text(index: usize) -> String {
    get_style(index).css_text()
}

pub fn get_opacity(index: usize) -> Option<f32> {
    get_style(index).opacity
}

pub fn get_transform(index: usize) -> Option<Transform> {
    get_style(index).transform
}

pub fn get_transition(index: usize) -> Option<Transition> {
    get_style(index).transition
}

pub fn get_animation(index: usize) -> Option<Animation> {
    get_style(index).animation
}

pub fn get_animation_delay(index: usize) -> Option<Duration> {
    get_style(index).animation_delay
}

pub fn get_box_shadow(index: usize) -> Option<String> {
    get_style(index).box_shadow
}

pub fn get_background(index: usize) -> Option<Rgba> {
    get_style(index).background
}

pub fn get_background_position(index: usize) -> Option<String> {
    get_style(index).background_position
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Easing, TransformFn};
    use pretty_assertions::assert_eq;

    fn setup() {
        reset();
    }

    #[test]
    fn test_patch_sets_and_clears() {
        setup();

        apply(
            0,
            &StylePatch::new()
                .opacity(0.0)
                .transform(Transform::translate_y(20.0)),
        );
        assert_eq!(get_opacity(0), Some(0.0));

        apply(0, &StylePatch::new().clear_transform());
        assert_eq!(get_transform(0), None);
        // Untouched properties survive
        assert_eq!(get_opacity(0), Some(0.0));
    }

    #[test]
    fn test_empty_patch_is_noop() {
        setup();

        assert!(StylePatch::new().is_empty());
        apply(7, &StylePatch::new());
        assert!(get_style(7).is_empty());
    }

    #[test]
    fn test_css_text_order() {
        setup();

        apply(
            1,
            &StylePatch::new()
                .transition(Transition::all(Duration::from_millis(600), Easing::STANDARD))
                .transform(Transform::translate_y(0.0))
                .opacity(1.0),
        );
        assert_eq!(
            css_text(1),
            "opacity: 1; transform: translateY(0px); transition: all 0.6s cubic-bezier(0.4, 0, 0.2, 1);"
        );
    }

    #[test]
    fn test_css_text_lengths_and_keywords() {
        setup();

        apply(
            2,
            &StylePatch::new()
                .position(Position::Absolute)
                .width(Length::Px(120.0))
                .height(Length::Px(120.0))
                .left(Length::Px(-10.5))
                .pointer_events(PointerEvents::None)
                .transform(Transform::scale(1.1).then(TransformFn::TranslateY(-2.0))),
        );
        assert_eq!(
            css_text(2),
            "position: absolute; width: 120px; height: 120px; left: -10.5px; transform: scale(1.1) translateY(-2px); pointer-events: none;"
        );
    }
}
