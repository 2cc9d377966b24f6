use core_document::{Comment, Document, FormatVersion, PageFlags};
use core_field::{CellKey, Field, Piece};
use tracing::debug;

use crate::Layout;
use crate::action::Action;
use crate::comment;
use crate::values::ValueWriter;

const MAX_REPEAT: u32 = 63;

/// Frame cell `i` as a field key. `None` for rows the field does not have.
pub(crate) fn frame_key(layout: Layout, i: usize) -> Option<CellKey> {
    let x = i % 10;
    match layout.row_of(i) {
        -1 => CellKey::sent(x).ok(),
        y => CellKey::at(x, usize::try_from(y).ok()?).ok(),
    }
}

fn cell_or_empty(field: &Field, key: Option<CellKey>) -> Piece {
    key.map_or(Piece::Empty, |key| field.cell(key))
}

/// Run-length frame of `current` against `previous`. Returns `true` when the
/// frame is the single unchanged run.
fn push_frame(writer: &mut ValueWriter, layout: Layout, previous: &Field, current: &Field) -> bool {
    let blocks = layout.blocks() as usize;
    let diff_at = |i: usize| {
        let key = frame_key(layout, i);
        u32::from(cell_or_empty(current, key).value()) + 8
            - u32::from(cell_or_empty(previous, key).value())
    };
    let mut run_diff = diff_at(0);
    let mut run_len = 0u32;
    let mut runs = 0;
    for i in 1..blocks {
        let diff = diff_at(i);
        if diff == run_diff {
            run_len += 1;
        } else {
            writer.push(run_diff * layout.blocks() + run_len, 2);
            runs += 1;
            run_diff = diff;
            run_len = 0;
        }
    }
    writer.push(run_diff * layout.blocks() + run_len, 2);
    runs == 0 && run_diff == 8
}

/// Encode `doc` as a `v115@` string.
///
/// Deterministic: equal documents give equal strings. Unchanged frames are
/// collapsed and comments are only written when they differ from the last
/// written one.
pub fn encode(doc: &Document) -> String {
    let layout = Layout::of(FormatVersion::V115);
    let mut writer = ValueWriter::new();
    // Page 0 diffs against an empty field but resolves over the initial one.
    let mut previous = Field::empty();
    let mut base = doc.initial_field().clone();
    let mut repeat_slot: Option<usize> = None;
    let mut last_comment: Option<&str> = None;

    for (index, page) in doc.pages().iter().enumerate() {
        let resolved = page.resolved_field(&base);

        let mut frame = ValueWriter::new();
        if push_frame(&mut frame, layout, &previous, &resolved) {
            match repeat_slot {
                Some(slot) if writer.digit(slot) < MAX_REPEAT => writer.bump(slot),
                _ => {
                    writer.push(9 * layout.blocks() - 1, 2);
                    writer.push(0, 1);
                    repeat_slot = Some(writer.len() - 1);
                }
            }
        } else {
            writer.append(frame);
            repeat_slot = None;
        }

        let written_comment = match page.comment() {
            Comment::Explicit(text) if index == 0 && text.is_empty() => None,
            Comment::Explicit(text) if last_comment != Some(text.as_str()) => Some(text.as_str()),
            _ => None,
        };
        if written_comment.is_some() {
            last_comment = written_comment;
        }

        let flags = page.flags();
        let action = page.piece().map_or_else(Action::default, |placement| Action {
            piece: placement.piece(),
            rotation: placement.rotation(),
            x: placement.x(),
            y: placement.y(),
            ..Action::default()
        });
        let action = Action {
            rise: flags.contains(PageFlags::RISE),
            mirror: flags.contains(PageFlags::MIRROR),
            colorize: if index == 0 {
                doc.meta().guide_color
            } else {
                page.colorize()
            },
            comment: written_comment.is_some(),
            lock: flags.contains(PageFlags::LOCK),
            ..action
        };
        writer.push(action.pack(layout), 3);
        if let Some(text) = written_comment {
            comment::write(&mut writer, text);
        }

        let settled = page.settle(&resolved);
        previous = settled.clone();
        base = settled;
    }

    let body = writer.finish();
    debug!(target: "codec", pages = doc.page_count(), len = body.len(), "encoded");
    format!("v115@{body}")
}
