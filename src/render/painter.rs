//! Painting the committed fiber tree into the output buffer.
//!
//! Hosts paint back-to-front: background fill, then border, then content
//! and children. Non-host fibers (components, providers, raws) pass their
//! parent's origin through. Output transforms accumulate along the path and
//! apply per line to every text node underneath.

use slotmap::SlotMap;

use crate::element::{HostTag, Transform};
use crate::fiber::{child_ids, squash_text, DomHandle, Fiber, FiberId, FiberKind};
use crate::layout::LayoutAdapter;
use crate::style::{Display, Overflow};
use crate::text::wrap_text;

use super::borders::render_border;
use super::colorize::{apply_modifiers, colorize, ColorTarget};
use super::output::Output;

/// Paint the tree rooted at `root` into `out`.
pub(crate) fn paint(
    fibers: &SlotMap<FiberId, Fiber>,
    layout: &LayoutAdapter,
    root: FiberId,
    out: &mut Output,
) {
    let mut transformers: Vec<Transform> = Vec::new();
    paint_node(fibers, layout, root, 0, 0, &mut transformers, out);
}

fn paint_node(
    fibers: &SlotMap<FiberId, Fiber>,
    layout: &LayoutAdapter,
    id: FiberId,
    ox: i32,
    oy: i32,
    transformers: &mut Vec<Transform>,
    out: &mut Output,
) {
    let Some(fiber) = fibers.get(id) else {
        return;
    };

    let tag = match &fiber.kind {
        FiberKind::Host(tag) => *tag,
        FiberKind::Raw => return,
        // Pass-through nodes keep the parent's origin.
        _ => {
            for child in child_ids(fibers, id) {
                paint_node(fibers, layout, child, ox, oy, transformers, out);
            }
            return;
        }
    };

    let style = &fiber.props.style;
    if style.display == Display::None {
        return;
    }
    let Some(DomHandle::Node(node)) = fiber.dom else {
        return;
    };
    let region = layout.layout_of(node);
    let x = ox + region.x;
    let y = oy + region.y;

    let pushed = fiber.props.transform.clone();
    if let Some(t) = &pushed {
        transformers.push(t.clone());
    }

    match tag {
        HostTag::Text => {
            let content = squash_text(fibers, id);
            let fitted = wrap_text(&content, region.width.max(0) as usize, style.wrap);
            let mut lines: Vec<String> = fitted.split('\n').map(str::to_string).collect();
            for transform in transformers.iter() {
                lines = lines
                    .iter()
                    .enumerate()
                    .map(|(i, line)| transform(line, i))
                    .collect();
            }
            let styled: Vec<String> = lines
                .iter()
                .map(|line| {
                    let line = apply_modifiers(line, &style.text);
                    let line = colorize(&line, style.color.as_deref(), ColorTarget::Foreground);
                    colorize(&line, style.background.as_deref(), ColorTarget::Background)
                })
                .collect();
            out.write(x, y, &styled.join("\n"));
        }
        HostTag::Box => {
            if let Some(bg) = &style.background {
                let width = region.width.max(0) as usize;
                let height = region.height.max(0) as usize;
                if width > 0 && height > 0 {
                    let row = colorize(&" ".repeat(width), Some(bg), ColorTarget::Background);
                    let fill = vec![row; height].join("\n");
                    out.write(x, y, &fill);
                }
            }
            if let Some(border) = &style.border {
                render_border(out, x, y, region.width, region.height, border);
            }

            let clipped = style.overflow == Overflow::Hidden;
            if clipped {
                out.push_clip(x, y, region.width, region.height);
            }
            for child in child_ids(fibers, id) {
                paint_node(fibers, layout, child, x, y, transformers, out);
            }
            if clipped {
                out.pop_clip();
            }
        }
    }

    if pushed.is_some() {
        transformers.pop();
    }
}
