//! Core types for invoice-fx.
//!
//! These types define the foundation that everything builds on.
//! They flow from the effect state machines into inline styles and define
//! what a host renderer has to understand.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// =============================================================================
// Cleanup Function
// =============================================================================

/// Cleanup function returned by handler registrations and effects.
///
/// Call this to detach the listener and release resources.
pub type Cleanup = Box<dyn FnOnce()>;

// =============================================================================
// Geometry
// =============================================================================

/// A point in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Translate by (-dx, -dy). Used to go from document to client space.
    #[inline]
    pub fn offset_by(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x - dx, self.y - dy, self.width, self.height)
    }

    /// Edge-inclusive containment test.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Edge-inclusive intersection. Touching rectangles yield a zero-area rect.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < left || bottom < top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }
}

// =============================================================================
// Color
// =============================================================================

/// RGBA color with 8-bit channels (0-255).
///
/// Using integers for exact comparison - no floating point epsilon needed.
/// Alpha 255 = fully opaque, 0 = fully transparent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Create a new RGBA color.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Create from a 0xRRGGBB integer.
    pub const fn from_rgb_int(value: u32) -> Self {
        Self::rgb(
            ((value >> 16) & 0xff) as u8,
            ((value >> 8) & 0xff) as u8,
            (value & 0xff) as u8,
        )
    }

    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    #[inline]
    pub const fn is_opaque(&self) -> bool {
        self.a == 255
    }

    /// Parse a hex color: `#RGB`, `#RRGGBB` or `#RRGGBBAA` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');

        fn hex_digit(c: u8) -> Option<u8> {
            match c {
                b'0'..=b'9' => Some(c - b'0'),
                b'a'..=b'f' => Some(c - b'a' + 10),
                b'A'..=b'F' => Some(c - b'A' + 10),
                _ => None,
            }
        }

        fn hex_byte(s: &[u8], i: usize) -> Option<u8> {
            let high = hex_digit(s[i])?;
            let low = hex_digit(s[i + 1])?;
            Some((high << 4) | low)
        }

        let bytes = hex.as_bytes();
        match bytes.len() {
            3 => {
                let r = hex_digit(bytes[0])?;
                let g = hex_digit(bytes[1])?;
                let b = hex_digit(bytes[2])?;
                Some(Self::rgb((r << 4) | r, (g << 4) | g, (b << 4) | b))
            }
            6 => Some(Self::rgb(
                hex_byte(bytes, 0)?,
                hex_byte(bytes, 2)?,
                hex_byte(bytes, 4)?,
            )),
            8 => Some(Self::new(
                hex_byte(bytes, 0)?,
                hex_byte(bytes, 2)?,
                hex_byte(bytes, 4)?,
                hex_byte(bytes, 6)?,
            )),
            _ => None,
        }
    }

    /// CSS serialization: `#rrggbb` when opaque, `rgba(r, g, b, a)` otherwise.
    pub fn css(&self) -> String {
        if self.is_opaque() {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!(
                "rgba({}, {}, {}, {})",
                self.r,
                self.g,
                self.b,
                format_number(self.a as f32 / 255.0)
            )
        }
    }
}

impl TryFrom<String> for Rgba {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value).ok_or_else(|| format!("invalid hex color `{value}`"))
    }
}

impl From<Rgba> for String {
    fn from(value: Rgba) -> Self {
        if value.is_opaque() {
            value.css()
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", value.r, value.g, value.b, value.a)
        }
    }
}

// =============================================================================
// Lengths
// =============================================================================

/// A CSS length as used by the inline styles this crate writes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Px(f32),
    Percent(f32),
    Rem(f32),
}

impl Length {
    pub fn css(&self) -> String {
        match self {
            Self::Px(v) => format!("{}px", format_number(*v)),
            Self::Percent(v) => format!("{}%", format_number(*v)),
            Self::Rem(v) => format!("{}rem", format_number(*v)),
        }
    }

    /// Resolve against a reference dimension (percentages only need it).
    pub fn resolve(&self, reference: f32) -> f32 {
        match self {
            Self::Px(v) => *v,
            Self::Percent(v) => reference * v / 100.0,
            Self::Rem(v) => v * 16.0,
        }
    }
}

/// Format a number the way CSS serializers do: no trailing `.0`, at most
/// four fractional digits.
pub fn format_number(value: f32) -> String {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let text = format!("{rounded:.4}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    text.to_string()
}

/// Format a duration in seconds, e.g. `0.6s`.
pub fn format_seconds(duration: Duration) -> String {
    format!("{}s", format_number(duration.as_secs_f32()))
}

// =============================================================================
// Transforms
// =============================================================================

/// A single transform function. Order inside a [`Transform`] is significant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformFn {
    Translate(f32, f32),
    TranslateY(f32),
    Scale(f32),
    RotateX(f32),
    RotateY(f32),
}

impl TransformFn {
    fn css(&self) -> String {
        match self {
            Self::Translate(x, y) => {
                format!("translate({}px, {}px)", format_number(*x), format_number(*y))
            }
            Self::TranslateY(y) => format!("translateY({}px)", format_number(*y)),
            Self::Scale(s) => format!("scale({})", format_number(*s)),
            Self::RotateX(d) => format!("rotateX({}deg)", format_number(*d)),
            Self::RotateY(d) => format!("rotateY({}deg)", format_number(*d)),
        }
    }
}

/// An ordered list of transform functions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Transform(pub Vec<TransformFn>);

impl Transform {
    pub fn translate_y(px: f32) -> Self {
        Self(vec![TransformFn::TranslateY(px)])
    }

    pub fn scale(s: f32) -> Self {
        Self(vec![TransformFn::Scale(s)])
    }

    pub fn translate(x: f32, y: f32) -> Self {
        Self(vec![TransformFn::Translate(x, y)])
    }

    /// Append another function (builder style).
    pub fn then(mut self, f: TransformFn) -> Self {
        self.0.push(f);
        self
    }

    pub fn css(&self) -> String {
        self.0.iter().map(TransformFn::css).collect::<Vec<_>>().join(" ")
    }
}

// =============================================================================
// Timing
// =============================================================================

/// Timing function of a transition or animation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Linear,
    #[default]
    Ease,
    EaseOut,
    EaseInOut,
    CubicBezier(f32, f32, f32, f32),
}

impl Easing {
    /// Material "standard" curve used by the card transitions.
    pub const STANDARD: Self = Self::CubicBezier(0.4, 0.0, 0.2, 1.0);

    pub fn css(&self) -> String {
        match self {
            Self::Linear => "linear".into(),
            Self::Ease => "ease".into(),
            Self::EaseOut => "ease-out".into(),
            Self::EaseInOut => "ease-in-out".into(),
            Self::CubicBezier(a, b, c, d) => format!(
                "cubic-bezier({}, {}, {}, {})",
                format_number(*a),
                format_number(*b),
                format_number(*c),
                format_number(*d)
            ),
        }
    }
}

/// `transition` shorthand over all properties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub duration: Duration,
    pub easing: Easing,
    pub delay: Duration,
}

impl Transition {
    pub const fn all(duration: Duration, easing: Easing) -> Self {
        Self {
            duration,
            easing,
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn css(&self) -> String {
        let mut out = format!("all {} {}", format_seconds(self.duration), self.easing.css());
        if !self.delay.is_zero() {
            out.push(' ');
            out.push_str(&format_seconds(self.delay));
        }
        out
    }
}

/// How many times an animation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Iterations {
    Count(u32),
    Infinite,
}

/// `animation` shorthand.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub name: String,
    pub duration: Duration,
    pub easing: Easing,
    pub iterations: Iterations,
    pub fill_forwards: bool,
}

impl Animation {
    pub fn once(name: impl Into<String>, duration: Duration, easing: Easing) -> Self {
        Self {
            name: name.into(),
            duration,
            easing,
            iterations: Iterations::Count(1),
            fill_forwards: false,
        }
    }

    pub fn infinite(name: impl Into<String>, duration: Duration, easing: Easing) -> Self {
        Self {
            iterations: Iterations::Infinite,
            ..Self::once(name, duration, easing)
        }
    }

    pub fn forwards(mut self) -> Self {
        self.fill_forwards = true;
        self
    }

    pub fn css(&self) -> String {
        let mut out = format!(
            "{} {} {}",
            self.name,
            format_seconds(self.duration),
            self.easing.css()
        );
        if self.iterations == Iterations::Infinite {
            out.push_str(" infinite");
        }
        if self.fill_forwards {
            out.push_str(" forwards");
        }
        out
    }
}

// =============================================================================
// Keyword properties
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Static,
    Relative,
    Absolute,
}

impl Position {
    pub fn css(&self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Relative => "relative",
            Self::Absolute => "absolute",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overflow {
    Visible,
    Hidden,
}

impl Overflow {
    pub fn css(&self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::Hidden => "hidden",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvents {
    Auto,
    None,
}

impl PointerEvents {
    pub fn css(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::None => "none",
        }
    }
}
