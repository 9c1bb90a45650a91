//! Splitting a sprite sequence into same-texture runs.
//!
//! Sprites are never reordered: overlapping sprites composite in submission
//! order, so a run ends at the first texture change even if the same texture
//! shows up again later.

use std::ops::Range;

use spritebatch_host::TextureHandle;

use crate::Sprite;

/// A contiguous run of sprites drawn with one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Portion {
    pub start: usize,
    pub len: usize,
    pub texture: TextureHandle,
}

impl Portion {
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }
}

/// Length of the longest run starting at `start` that shares its texture and
/// does not exceed `capacity`.
///
/// Returns 0 when `start` is past the end. A `capacity` of 0 is treated as 1.
pub fn portion_length(sprites: &[Sprite], start: usize, capacity: usize) -> usize {
    let Some(first) = sprites.get(start) else {
        return 0;
    };

    let limit = capacity.max(1).min(sprites.len() - start);
    1 + sprites[start + 1..start + limit]
        .iter()
        .take_while(|sprite| sprite.texture == first.texture)
        .count()
}

/// Iterator over the maximal portions of a sprite sequence.
///
/// ```
/// use spritebatch::{Portions, Sprite, TextureHandle, Vec2};
///
/// let a = TextureHandle::new(1, 8, 8);
/// let b = TextureHandle::new(2, 8, 8);
/// let sprites: Vec<Sprite> = [a, a, b, a]
///     .into_iter()
///     .map(|t| Sprite::new(t, Vec2::ZERO))
///     .collect();
///
/// let lens: Vec<usize> = Portions::new(&sprites, 2000).map(|p| p.len).collect();
/// assert_eq!(lens, [2, 1, 1]);
/// ```
#[derive(Debug, Clone)]
pub struct Portions<'a> {
    sprites: &'a [Sprite],
    capacity: usize,
    next: usize,
}

impl<'a> Portions<'a> {
    pub fn new(sprites: &'a [Sprite], capacity: usize) -> Self {
        Self {
            sprites,
            capacity,
            next: 0,
        }
    }
}

impl Iterator for Portions<'_> {
    type Item = Portion;

    fn next(&mut self) -> Option<Portion> {
        let texture = self.sprites.get(self.next)?.texture;
        let start = self.next;
        let len = portion_length(self.sprites, start, self.capacity);
        self.next += len;

        Some(Portion {
            start,
            len,
            texture,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.sprites.len() - self.next;
        let capacity = self.capacity.max(1);
        (remaining.div_ceil(capacity), Some(remaining))
    }
}

impl std::iter::FusedIterator for Portions<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use spritebatch_core::math::Vec2;

    fn sprites(textures: &[u64]) -> Vec<Sprite> {
        textures
            .iter()
            .map(|id| Sprite::new(TextureHandle::new(*id, 16, 16), Vec2::ZERO))
            .collect()
    }

    fn lens(sprites: &[Sprite], capacity: usize) -> Vec<usize> {
        Portions::new(sprites, capacity).map(|p| p.len).collect()
    }

    #[test]
    fn test_empty_sequence() {
        assert_eq!(Portions::new(&[], 10).next(), None);
        assert_eq!(portion_length(&[], 0, 10), 0);
    }

    #[test]
    fn test_single_texture_runs_to_capacity() {
        let seq = sprites(&[1; 5]);
        assert_eq!(lens(&seq, 10), [5]);
        assert_eq!(lens(&seq, 5), [5]);
        assert_eq!(lens(&seq, 4), [4, 1]);
        assert_eq!(lens(&seq, 2), [2, 2, 1]);
    }

    #[test]
    fn test_alternating_textures() {
        let seq = sprites(&[1, 2, 1, 2, 1, 2, 1]);
        assert_eq!(lens(&seq, 2000), [1; 7]);
    }

    #[test]
    fn test_no_reordering_across_repeats() {
        let seq = sprites(&[1, 1, 2, 2, 2, 1]);
        let portions: Vec<Portion> = Portions::new(&seq, 2000).collect();

        assert_eq!(portions.len(), 3);
        assert_eq!(portions[0].range(), 0..2);
        assert_eq!(portions[1].range(), 2..5);
        assert_eq!(portions[2].range(), 5..6);
        assert_eq!(portions[2].texture.id(), 1);
    }

    #[test]
    fn test_identity_not_size() {
        // Same id with a different cached size is still the same texture.
        let seq = vec![
            Sprite::new(TextureHandle::new(9, 16, 16), Vec2::ZERO),
            Sprite::new(TextureHandle::new(9, 32, 32), Vec2::ZERO),
        ];
        assert_eq!(lens(&seq, 10), [2]);
    }

    #[test]
    fn test_portion_length_from_middle() {
        let seq = sprites(&[1, 2, 2, 2, 3]);
        assert_eq!(portion_length(&seq, 1, 10), 3);
        assert_eq!(portion_length(&seq, 1, 2), 2);
        assert_eq!(portion_length(&seq, 4, 10), 1);
        assert_eq!(portion_length(&seq, 5, 10), 0);
    }

    #[test]
    fn test_zero_capacity_still_progresses() {
        let seq = sprites(&[1, 1, 1]);
        assert_eq!(lens(&seq, 0), [1, 1, 1]);
    }

    #[test]
    fn test_portions_cover_sequence_exactly_once() {
        let pattern = [1, 1, 1, 2, 3, 3, 1, 1, 4, 4, 4, 4, 4, 4, 4];
        let seq = sprites(&pattern);

        for capacity in 1..=8 {
            let mut expected_start = 0;
            for portion in Portions::new(&seq, capacity) {
                assert_eq!(portion.start, expected_start);
                assert!(portion.len >= 1 && portion.len <= capacity);
                assert!(seq[portion.range()].iter().all(|s| s.texture == portion.texture));

                // Maximal: the run stops at capacity, a texture change or the end.
                let end = portion.end();
                assert!(
                    portion.len == capacity
                        || end == seq.len()
                        || seq[end].texture != portion.texture
                );
                expected_start = end;
            }
            assert_eq!(expected_start, seq.len());
        }
    }
}
