//! Property tests: encoding then decoding preserves what a viewer sees.

use core_codec::{decode, encode};
use core_document::{Commands, Comment, Document, DocumentMeta, Page, PageFlags};
use core_field::{CellKey, FIELD_CELLS, FIELD_WIDTH, Field, Piece, Placement, Rotation};
use proptest::prelude::*;

fn piece_value() -> impl Strategy<Value = Piece> {
    (0u8..=8).prop_map(|v| Piece::from_value(v).unwrap())
}

fn cell_key() -> impl Strategy<Value = CellKey> {
    prop_oneof![
        4 => (0..FIELD_CELLS).prop_map(|i| CellKey::block(i).unwrap()),
        1 => (0..FIELD_WIDTH).prop_map(|x| CellKey::sent(x).unwrap()),
    ]
}

fn placement() -> impl Strategy<Value = Option<Placement>> {
    let rotation = prop::sample::select(Rotation::ALL.to_vec());
    let mino = prop::sample::select(Piece::MINOS.to_vec());
    prop::option::of((mino, rotation, -1i32..11, -1i32..24))
        .prop_map(|p| p.and_then(|(piece, r, x, y)| Placement::new(piece, r, x, y).ok()))
}

fn comment() -> impl Strategy<Value = Comment> {
    prop_oneof![
        3 => Just(Comment::Inherited),
        1 => "[ -~]{0,12}".prop_map(Comment::Explicit),
        1 => prop::sample::select(vec!["#Q=[](T)SZ", "テトリス", "hello"])
            .prop_map(|s| Comment::Explicit(s.to_string())),
    ]
}

fn page() -> impl Strategy<Value = Page> {
    (
        prop::collection::vec((cell_key(), piece_value()), 0..12),
        placement(),
        comment(),
        any::<(bool, bool, bool, bool)>(),
    )
        .prop_map(|(cells, piece, comment, (lock, mirror, rise, colorize))| {
            let mut flags = PageFlags::empty();
            flags.set(PageFlags::LOCK, lock);
            flags.set(PageFlags::MIRROR, mirror);
            flags.set(PageFlags::RISE, rise);
            Page::new()
                .with_commands(cells.into_iter().collect::<Commands>())
                .with_piece(piece)
                .with_comment(comment)
                .with_flags(flags)
                .with_colorize(colorize)
        })
}

fn document() -> impl Strategy<Value = Document> {
    (
        prop::collection::vec((cell_key(), piece_value()), 0..20),
        prop::collection::vec(page(), 1..6),
        any::<bool>(),
    )
        .prop_map(|(initial, pages, guide_color)| {
            let mut field = Field::empty();
            for (key, piece) in initial {
                field.set_cell(key, piece);
            }
            let meta = DocumentMeta {
                guide_color,
                ..DocumentMeta::default()
            };
            Document::from_parts(field, pages, meta)
        })
}

fn footprint(placement: Option<Placement>) -> Option<(Piece, Vec<(i32, i32)>)> {
    placement.map(|p| {
        let mut blocks = p.blocks().to_vec();
        blocks.sort();
        (p.piece(), blocks)
    })
}

proptest! {
    #[test]
    fn decode_preserves_what_is_shown(doc in document()) {
        let encoded = encode(&doc);
        let back = decode(&encoded).unwrap();
        prop_assert_eq!(back.page_count(), doc.page_count());
        prop_assert_eq!(back.meta().guide_color, doc.meta().guide_color);
        for i in 0..doc.page_count() {
            prop_assert_eq!(back.resolved_field(i), doc.resolved_field(i), "page {}", i);
            prop_assert_eq!(back.comment_text(i), doc.comment_text(i), "page {}", i);
            prop_assert_eq!(back.flags(i), doc.flags(i), "page {}", i);
            if i > 0 {
                prop_assert_eq!(back.page(i).unwrap().colorize(), doc.page(i).unwrap().colorize());
            }
            prop_assert_eq!(
                footprint(back.page(i).unwrap().piece()),
                footprint(doc.page(i).unwrap().piece())
            );
        }
    }

    #[test]
    fn encoding_is_stable(doc in document()) {
        let encoded = encode(&doc);
        let again = encode(&decode(&encoded).unwrap());
        prop_assert_eq!(again, encoded);
    }
}
