//! Keyframes and helper classes the effects rely on.

use tracing::debug;

use crate::engine::{ElementProps, create_element, head, query_selector};

/// Marker attribute on the injected `<style>` element.
pub const STYLESHEET_MARKER: &str = "data-fx";

pub const STYLESHEET: &str = r#"
.ripple {
    position: absolute;
    border-radius: 50%;
    background: rgba(255, 255, 255, 0.6);
    animation: ripple-animation 0.6s linear;
    pointer-events: none;
}

@keyframes ripple-animation {
    to { transform: scale(2); opacity: 0; }
}

html { scroll-behavior: smooth; }

.fade-in { animation: fadeIn 0.8s ease-out; }

@keyframes fadeIn {
    from { opacity: 0; transform: translateY(20px); }
    to { opacity: 1; transform: translateY(0); }
}

.floating { animation: floating 3s ease-in-out infinite; }

@keyframes floating {
    0%, 100% { transform: translateY(0px); }
    50% { transform: translateY(-10px); }
}

.pulse { animation: pulse 2s infinite; }

@keyframes pulse {
    0% { transform: scale(1); }
    50% { transform: scale(1.05); }
    100% { transform: scale(1); }
}

@keyframes zoomIn {
    from { opacity: 0; transform: scale(0.8); }
    to { opacity: 1; transform: scale(1); }
}

@keyframes sparkle {
    0%, 100% { opacity: 0; transform: scale(0.5); }
    50% { opacity: 1; transform: scale(1); }
}

.glow:focus { box-shadow: 0 0 20px rgba(56, 178, 172, 0.6); }

.magnetic { transition: transform 0.3s ease; }
.magnetic:hover { transform: translateY(-2px); }

.shimmer {
    background: linear-gradient(90deg, #f0f0f0 25%, #e0e0e0 50%, #f0f0f0 75%);
    background-size: 200% 100%;
    animation: shimmer 2s infinite;
    -webkit-background-clip: text;
    -webkit-text-fill-color: transparent;
}

@keyframes shimmer {
    0% { background-position: -200% 0; }
    100% { background-position: 200% 0; }
}
"#;

/// Append the effect stylesheet to `<head>`.
///
/// Returns the `<style>` element. Injecting twice returns the existing one;
/// a document without a head gets nothing.
pub fn inject_stylesheet() -> Option<usize> {
    if let Ok(Some(existing)) = query_selector("style[data-fx]") {
        return Some(existing);
    }
    let Some(head) = head() else {
        debug!("stylesheet skipped: no head");
        return None;
    };
    Some(create_element(ElementProps {
        attributes: vec![(STYLESHEET_MARKER.into(), String::new())],
        text: Some(STYLESHEET.into()),
        parent: Some(head),
        ..ElementProps::tag("style")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::arrays::core;
    use crate::engine::{children_of, reset_document};

    #[test]
    fn test_injected_once() {
        reset_document();
        let html = create_element(ElementProps::tag("html"));
        let head = create_element(ElementProps {
            parent: Some(html),
            ..ElementProps::tag("head")
        });

        let style = inject_stylesheet().unwrap();
        assert_eq!(inject_stylesheet(), Some(style));
        assert_eq!(children_of(head), vec![style]);
        assert!(core::get_text(style).contains("@keyframes ripple-animation"));
    }

    #[test]
    fn test_no_head() {
        reset_document();
        create_element(ElementProps::tag("body"));
        assert_eq!(inject_stylesheet(), None);
    }
}
