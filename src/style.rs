//! Immutable style records applied to element nodes.
//!
//! A [`Style`] bundles layout properties (consumed by [`crate::layout`]) and
//! paint properties (consumed by [`crate::render`]). Styles are replaced
//! wholesale when an element's props change, so the reconciler's prop diff is
//! a single `PartialEq` comparison.

// ---------------------------------------------------------------------------
// Dimensions and edges
// ---------------------------------------------------------------------------

/// A size value for widths, heights, and flex basis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Dimension {
    /// Let the layout engine decide.
    #[default]
    Auto,
    /// An absolute number of terminal cells.
    Cells(f32),
    /// A percentage (0..100) of the parent's corresponding dimension.
    Percent(f32),
}

/// Per-edge cell counts for margin and padding.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Edges {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Edges {
    /// The same value on all four edges.
    pub fn all(v: f32) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    /// `horizontal` on left/right, `vertical` on top/bottom.
    pub fn symmetric(horizontal: f32, vertical: f32) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    /// Left and right edges only.
    pub fn x(v: f32) -> Self {
        Self::symmetric(v, 0.0)
    }

    /// Top and bottom edges only.
    pub fn y(v: f32) -> Self {
        Self::symmetric(0.0, v)
    }
}

// ---------------------------------------------------------------------------
// Flex enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
    #[default]
    Flex,
    /// Removed from layout entirely (zero size, not painted).
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    Relative,
    Absolute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexDirection {
    #[default]
    Row,
    Column,
    RowReverse,
    ColumnReverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexWrap {
    #[default]
    NoWrap,
    Wrap,
    WrapReverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignItems {
    FlexStart,
    Center,
    FlexEnd,
    Stretch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JustifyContent {
    FlexStart,
    Center,
    FlexEnd,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Visible,
    /// Children are clipped to this node's box when painted.
    Hidden,
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

/// How text is fitted to its measured width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextWrap {
    /// Word-wrap onto additional lines.
    #[default]
    Wrap,
    /// Single line, `…` replaces the overflowing tail.
    TruncateEnd,
    /// Single line, `…` replaces the middle.
    TruncateMiddle,
    /// Single line, `…` replaces the overflowing head.
    TruncateStart,
}

/// Text modifier flags applied when painting text nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextStyle {
    pub bold: bool,
    pub dim: bool,
    pub italic: bool,
    pub underline: bool,
    pub inverse: bool,
    pub strikethrough: bool,
}

// ---------------------------------------------------------------------------
// Borders
// ---------------------------------------------------------------------------

/// Built-in border glyph sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderKind {
    #[default]
    Single,
    Double,
    Round,
    Bold,
    SingleDouble,
    DoubleSingle,
    Classic,
}

/// Border configuration: glyph set, per-edge visibility, colors, and dim.
///
/// Per-edge colors and dim flags override the whole-border settings when set.
/// Hidden edges also remove the corresponding one-cell layout inset.
#[derive(Debug, Clone, PartialEq)]
pub struct Border {
    pub kind: BorderKind,
    pub color: Option<String>,
    pub dim: bool,
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
    pub top_color: Option<String>,
    pub bottom_color: Option<String>,
    pub left_color: Option<String>,
    pub right_color: Option<String>,
    pub top_dim: Option<bool>,
    pub bottom_dim: Option<bool>,
    pub left_dim: Option<bool>,
    pub right_dim: Option<bool>,
}

impl Border {
    /// A border of the given kind on all four edges, uncolored.
    pub fn new(kind: BorderKind) -> Self {
        Self {
            kind,
            color: None,
            dim: false,
            top: true,
            bottom: true,
            left: true,
            right: true,
            top_color: None,
            bottom_color: None,
            left_color: None,
            right_color: None,
            top_dim: None,
            bottom_dim: None,
            left_dim: None,
            right_dim: None,
        }
    }

    /// Set the color for all edges (builder).
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

impl Default for Border {
    fn default() -> Self {
        Self::new(BorderKind::Single)
    }
}

// ---------------------------------------------------------------------------
// Style
// ---------------------------------------------------------------------------

/// The full style record for one element node.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub display: Display,
    pub position: Position,
    pub width: Dimension,
    pub height: Dimension,
    pub min_width: Dimension,
    pub min_height: Dimension,
    pub max_width: Dimension,
    pub max_height: Dimension,
    pub flex_direction: FlexDirection,
    pub flex_wrap: FlexWrap,
    pub flex_grow: f32,
    pub flex_shrink: f32,
    pub flex_basis: Dimension,
    pub align_items: Option<AlignItems>,
    pub align_self: Option<AlignItems>,
    pub justify_content: Option<JustifyContent>,
    pub margin: Edges,
    pub padding: Edges,
    /// Gap between flex children, in cells. Overridden per axis by
    /// `column_gap` / `row_gap`.
    pub gap: f32,
    pub column_gap: Option<f32>,
    pub row_gap: Option<f32>,
    pub overflow: Overflow,
    pub border: Option<Border>,
    /// Background fill color (named or `#rrggbb`), painted inside the border.
    pub background: Option<String>,
    /// Foreground text color.
    pub color: Option<String>,
    pub text: TextStyle,
    pub wrap: TextWrap,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            display: Display::Flex,
            position: Position::Relative,
            width: Dimension::Auto,
            height: Dimension::Auto,
            min_width: Dimension::Auto,
            min_height: Dimension::Auto,
            max_width: Dimension::Auto,
            max_height: Dimension::Auto,
            flex_direction: FlexDirection::Row,
            flex_wrap: FlexWrap::NoWrap,
            flex_grow: 0.0,
            flex_shrink: 1.0,
            flex_basis: Dimension::Auto,
            align_items: None,
            align_self: None,
            justify_content: None,
            margin: Edges::default(),
            padding: Edges::default(),
            gap: 0.0,
            column_gap: None,
            row_gap: None,
            overflow: Overflow::Visible,
            border: None,
            background: None,
            color: None,
            text: TextStyle::default(),
            wrap: TextWrap::Wrap,
        }
    }
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixed width in cells (builder).
    pub fn with_width(mut self, cells: f32) -> Self {
        self.width = Dimension::Cells(cells);
        self
    }

    /// Fixed height in cells (builder).
    pub fn with_height(mut self, cells: f32) -> Self {
        self.height = Dimension::Cells(cells);
        self
    }

    /// Border on all edges with the given glyph set (builder).
    pub fn with_border(mut self, kind: BorderKind) -> Self {
        self.border = Some(Border::new(kind));
        self
    }

    /// Background fill color (builder).
    pub fn with_background(mut self, color: impl Into<String>) -> Self {
        self.background = Some(color.into());
        self
    }

    /// Foreground color (builder).
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Padding on all edges (builder).
    pub fn with_padding(mut self, cells: f32) -> Self {
        self.padding = Edges::all(cells);
        self
    }

    /// Margin on all edges (builder).
    pub fn with_margin(mut self, cells: f32) -> Self {
        self.margin = Edges::all(cells);
        self
    }

    /// Flex direction (builder).
    pub fn with_direction(mut self, direction: FlexDirection) -> Self {
        self.flex_direction = direction;
        self
    }
}
