use core_document::{Commands, Comment, Document, DocumentMeta, FormatVersion, Page, PageFlags};
use core_field::{Field, Piece, Placement};
use tracing::debug;

use crate::action::Action;
use crate::encoder::frame_key;
use crate::values::Values;
use crate::{DecodeError, Layout, comment};

const MARKERS: [(&str, FormatVersion); 5] = [
    ("v115@", FormatVersion::V115),
    ("m115@", FormatVersion::V115),
    ("d115@", FormatVersion::V115),
    ("D115@", FormatVersion::V115),
    ("v110@", FormatVersion::V110),
];

/// Find the first version marker in `input` and return the data after it,
/// cut at the first URL parameter separator.
fn locate(input: &str) -> Result<(FormatVersion, &str), DecodeError> {
    let found = MARKERS
        .iter()
        .filter_map(|(marker, version)| input.find(marker).map(|at| (at, *marker, *version)))
        .min_by_key(|(at, _, _)| *at);
    let Some((at, marker, version)) = found else {
        return Err(match input.find('@') {
            Some(at) => {
                let prefix = input[..at].rsplit(['/', '?', '&', '=']).next().unwrap_or("");
                DecodeError::UnsupportedVersion(prefix.trim().to_string())
            }
            None => DecodeError::MissingPrefix,
        });
    };
    let data = &input[at + marker.len()..];
    let data = data.split('&').next().unwrap_or(data);
    Ok((version, data))
}

/// Apply one run-length frame to `field`. Returns the repeat count when the
/// frame is the unchanged marker.
fn read_frame(
    values: &mut Values,
    layout: Layout,
    field: &mut Field,
    page: usize,
) -> Result<Option<u32>, DecodeError> {
    let blocks = layout.blocks();
    let mut repeat = None;
    let mut at = 0u32;
    while at < blocks {
        let run = values.poll(2)?;
        let diff = (run / blocks) as i32 - 8;
        let len = run % blocks + 1;
        if diff == 0 && len == blocks {
            repeat = Some(values.poll(1)?);
        }
        if at + len > blocks {
            return Err(DecodeError::FrameOverflow { page });
        }
        if diff != 0 {
            for i in at..at + len {
                let i = i as usize;
                let y = layout.row_of(i);
                let x = i % 10;
                let key = frame_key(layout, i);
                let current = key.map_or(0, |key| i32::from(field.cell(key).value()));
                let value = current + diff;
                let piece = u8::try_from(value)
                    .ok()
                    .and_then(Piece::from_value)
                    .ok_or(DecodeError::CellOutOfRange { page, x, y, value })?;
                match key {
                    Some(key) => field.set_cell(key, piece),
                    None => return Err(DecodeError::CellOutOfRange { page, x, y, value }),
                }
            }
        }
        at += len;
    }
    Ok(repeat)
}

/// Decode fumen data into a document.
///
/// `input` may be a bare `v115@...` string or any text containing one (a
/// share URL, for instance). `?` separators and whitespace inside the data
/// are ignored. Decoded documents start from an empty initial field and
/// carry each frame as their page's commands.
pub fn decode(input: &str) -> Result<Document, DecodeError> {
    let (version, data) = locate(input)?;
    let layout = Layout::of(version);
    let body: String = data
        .chars()
        .filter(|ch| *ch != '?' && !ch.is_whitespace())
        .collect();
    let mut values = Values::parse(&body)?;
    if values.is_empty() {
        return Err(DecodeError::NoPages);
    }

    let mut previous = Field::empty();
    let mut pages = Vec::new();
    let mut guide_color = true;
    let mut skip = 0;
    while !values.is_empty() {
        let index = pages.len();
        let mut current = previous.clone();
        if skip > 0 {
            skip -= 1;
        } else if let Some(repeat) = read_frame(&mut values, layout, &mut current, index)? {
            skip = repeat;
        }

        let action = Action::unpack(values.poll(3)?, layout);
        let piece = if action.piece.is_mino() {
            let placement = Placement::new(action.piece, action.rotation, action.x, action.y)
                .map_err(|source| DecodeError::InvalidPlacement { page: index, source })?;
            Some(placement)
        } else {
            None
        };
        let comment = if action.comment {
            Comment::Explicit(comment::read(&mut values)?)
        } else {
            Comment::Inherited
        };
        if index == 0 {
            guide_color = action.colorize;
        }

        let mut flags = PageFlags::empty();
        flags.set(PageFlags::LOCK, action.lock);
        flags.set(PageFlags::MIRROR, action.mirror);
        flags.set(PageFlags::RISE, action.rise);
        let page = Page::new()
            .with_commands(Commands::diff(&previous, &current))
            .with_piece(piece)
            .with_comment(comment)
            .with_flags(flags)
            .with_colorize(index > 0 && action.colorize);
        previous = page.settle(&current);
        pages.push(page);
    }

    debug!(target: "codec", pages = pages.len(), ?version, "decoded");
    Ok(Document::from_parts(
        Field::empty(),
        pages,
        DocumentMeta {
            guide_color,
            version,
        },
    ))
}
