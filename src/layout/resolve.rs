//! Translation from [`crate::style::Style`] to taffy's flexbox style.
//!
//! Invalid values (negative or non-finite lengths) do not abort layout:
//! they fall back to the default and are reported back to the caller as
//! messages, which the adapter converts into [`crate::error::RenderError`]s.

use taffy::prelude::*;

use crate::style::{
    AlignItems, Dimension as Dim, Display, Edges, FlexDirection, FlexWrap, JustifyContent,
    Overflow, Position, Style,
};

fn check(value: f32, what: &str, errors: &mut Vec<String>) -> Option<f32> {
    if value.is_finite() && value >= 0.0 {
        Some(value)
    } else {
        errors.push(format!("invalid {what}: {value}"));
        None
    }
}

fn dimension(dim: Dim, what: &str, errors: &mut Vec<String>) -> Dimension {
    match dim {
        Dim::Auto => Dimension::AUTO,
        Dim::Cells(v) => match check(v, what, errors) {
            Some(v) => Dimension::from_length(v),
            None => Dimension::AUTO,
        },
        Dim::Percent(v) => match check(v, what, errors) {
            Some(v) => Dimension::from_percent(v / 100.0),
            None => Dimension::AUTO,
        },
    }
}

fn length(value: f32, what: &str, errors: &mut Vec<String>) -> LengthPercentage {
    match check(value, what, errors) {
        Some(v) => LengthPercentage::from_length(v),
        None => LengthPercentage::ZERO,
    }
}

fn edges(edges: Edges, what: &str, errors: &mut Vec<String>) -> Rect<LengthPercentage> {
    Rect {
        top: length(edges.top, what, errors),
        right: length(edges.right, what, errors),
        bottom: length(edges.bottom, what, errors),
        left: length(edges.left, what, errors),
    }
}

fn margin_edges(m: Edges, errors: &mut Vec<String>) -> Rect<LengthPercentageAuto> {
    let one = |v: f32, errors: &mut Vec<String>| match check(v, "margin", errors) {
        Some(v) => LengthPercentageAuto::from_length(v),
        None => LengthPercentageAuto::ZERO,
    };
    Rect {
        top: one(m.top, errors),
        right: one(m.right, errors),
        bottom: one(m.bottom, errors),
        left: one(m.left, errors),
    }
}

/// One-cell insets for the visible border edges.
fn border_edges(style: &Style) -> Rect<LengthPercentage> {
    let Some(border) = &style.border else {
        return Rect {
            top: LengthPercentage::ZERO,
            right: LengthPercentage::ZERO,
            bottom: LengthPercentage::ZERO,
            left: LengthPercentage::ZERO,
        };
    };
    let cell = |shown: bool| {
        if shown {
            LengthPercentage::from_length(1.0)
        } else {
            LengthPercentage::ZERO
        }
    };
    Rect {
        top: cell(border.top),
        right: cell(border.right),
        bottom: cell(border.bottom),
        left: cell(border.left),
    }
}

/// Resolve a node style into taffy's representation.
///
/// Returns the taffy style plus the messages for any values that had to be
/// replaced with defaults.
pub(crate) fn resolve_style(style: &Style) -> (taffy::Style, Vec<String>) {
    let mut errors = Vec::new();

    let display = match style.display {
        Display::Flex => taffy::Display::Flex,
        Display::None => taffy::Display::None,
    };
    let position = match style.position {
        Position::Relative => taffy::Position::Relative,
        Position::Absolute => taffy::Position::Absolute,
    };
    let flex_direction = match style.flex_direction {
        FlexDirection::Row => taffy::FlexDirection::Row,
        FlexDirection::Column => taffy::FlexDirection::Column,
        FlexDirection::RowReverse => taffy::FlexDirection::RowReverse,
        FlexDirection::ColumnReverse => taffy::FlexDirection::ColumnReverse,
    };
    let flex_wrap = match style.flex_wrap {
        FlexWrap::NoWrap => taffy::FlexWrap::NoWrap,
        FlexWrap::Wrap => taffy::FlexWrap::Wrap,
        FlexWrap::WrapReverse => taffy::FlexWrap::WrapReverse,
    };
    let align_items = style.align_items.map(|a| match a {
        AlignItems::FlexStart => taffy::AlignItems::FlexStart,
        AlignItems::Center => taffy::AlignItems::Center,
        AlignItems::FlexEnd => taffy::AlignItems::FlexEnd,
        AlignItems::Stretch => taffy::AlignItems::Stretch,
    });
    let align_self = style.align_self.map(|a| match a {
        AlignItems::FlexStart => taffy::AlignSelf::FlexStart,
        AlignItems::Center => taffy::AlignSelf::Center,
        AlignItems::FlexEnd => taffy::AlignSelf::FlexEnd,
        AlignItems::Stretch => taffy::AlignSelf::Stretch,
    });
    let justify_content = style.justify_content.map(|j| match j {
        JustifyContent::FlexStart => taffy::JustifyContent::FlexStart,
        JustifyContent::Center => taffy::JustifyContent::Center,
        JustifyContent::FlexEnd => taffy::JustifyContent::FlexEnd,
        JustifyContent::SpaceBetween => taffy::JustifyContent::SpaceBetween,
        JustifyContent::SpaceAround => taffy::JustifyContent::SpaceAround,
        JustifyContent::SpaceEvenly => taffy::JustifyContent::SpaceEvenly,
    });
    let overflow_axis = match style.overflow {
        Overflow::Visible => taffy::Overflow::Visible,
        Overflow::Hidden => taffy::Overflow::Hidden,
    };

    let flex_grow = check(style.flex_grow, "flex_grow", &mut errors).unwrap_or(0.0);
    let flex_shrink = check(style.flex_shrink, "flex_shrink", &mut errors).unwrap_or(1.0);

    let base_gap = check(style.gap, "gap", &mut errors).unwrap_or(0.0);
    let column_gap = style
        .column_gap
        .and_then(|g| check(g, "column_gap", &mut errors))
        .unwrap_or(base_gap);
    let row_gap = style
        .row_gap
        .and_then(|g| check(g, "row_gap", &mut errors))
        .unwrap_or(base_gap);

    let resolved = taffy::Style {
        display,
        position,
        size: Size {
            width: dimension(style.width, "width", &mut errors),
            height: dimension(style.height, "height", &mut errors),
        },
        min_size: Size {
            width: dimension(style.min_width, "min_width", &mut errors),
            height: dimension(style.min_height, "min_height", &mut errors),
        },
        max_size: Size {
            width: dimension(style.max_width, "max_width", &mut errors),
            height: dimension(style.max_height, "max_height", &mut errors),
        },
        flex_direction,
        flex_wrap,
        flex_grow,
        flex_shrink,
        flex_basis: dimension(style.flex_basis, "flex_basis", &mut errors),
        align_items,
        align_self,
        justify_content,
        margin: margin_edges(style.margin, &mut errors),
        padding: edges(style.padding, "padding", &mut errors),
        border: border_edges(style),
        gap: Size {
            width: LengthPercentage::from_length(column_gap),
            height: LengthPercentage::from_length(row_gap),
        },
        overflow: taffy::Point {
            x: overflow_axis,
            y: overflow_axis,
        },
        ..Default::default()
    };

    (resolved, errors)
}
