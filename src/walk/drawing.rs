use crate::model::{Drawing, Placement, PictureRef};
use crate::visitor::AnchorPosition;

pub const EMU_PER_INCH: i64 = 914_400;
pub const EMU_PER_POINT: f32 = 12_700.0;

pub fn emu_to_points(emu: i64) -> f32 {
    emu as f32 / EMU_PER_POINT
}

/// Every picture of a drawing in document order, with its anchor position
/// (`None` for inline graphics).
pub fn pictures(drawing: &Drawing) -> impl Iterator<Item = (&PictureRef, Option<AnchorPosition>)> {
    drawing.objects.iter().flat_map(|object| {
        let position = match &object.placement {
            Placement::Inline => None,
            Placement::Anchor(anchor) => Some(AnchorPosition {
                offset_x: anchor
                    .position_h
                    .as_ref()
                    .and_then(|p| p.offset_emu)
                    .map(emu_to_points),
                relative_from_h: anchor.position_h.as_ref().and_then(|p| p.relative_from),
                offset_y: anchor
                    .position_v
                    .as_ref()
                    .and_then(|p| p.offset_emu)
                    .map(emu_to_points),
                relative_from_v: anchor.position_v.as_ref().and_then(|p| p.relative_from),
            }),
        };
        object.pictures.iter().map(move |p| (p, position))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Anchor, DrawingObject, Position, RelativeFromH, RelativeFromV};

    #[test]
    fn one_inch_is_72_points() {
        assert_eq!(emu_to_points(EMU_PER_INCH), 72.0);
        assert_eq!(emu_to_points(-898_525), -70.75);
    }

    #[test]
    fn anchor_without_vertical_block_has_no_vertical_offset() {
        let drawing = Drawing {
            objects: vec![
                DrawingObject {
                    placement: Placement::Inline,
                    pictures: vec![PictureRef::default()],
                },
                DrawingObject {
                    placement: Placement::Anchor(Anchor {
                        position_h: Some(Position {
                            relative_from: Some(RelativeFromH::Column),
                            offset_emu: Some(25_400),
                            align: None,
                        }),
                        position_v: None,
                    }),
                    pictures: vec![PictureRef::default()],
                },
            ],
        };

        let positions: Vec<_> = pictures(&drawing).map(|(_, pos)| pos).collect();
        assert_eq!(positions[0], None);
        let anchored = positions[1].unwrap();
        assert_eq!(anchored.offset_x, Some(2.0));
        assert_eq!(anchored.relative_from_h, Some(RelativeFromH::Column));
        assert_eq!(anchored.offset_y, None);
        assert_eq!(anchored.relative_from_v, None::<RelativeFromV>);
    }
}
