//! Position mapping across applied steps.
//!
//! Every step reports the single range it replaced as
//! `(start, old_size, new_size)`. Positions before the range keep their
//! value, positions after it shift by the size delta and positions inside a
//! deleted range collapse onto its start.

use serde::{Deserialize, Serialize};

/// Which side a position sticks to when content is inserted exactly at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Assoc {
    Before,
    After,
}

/// A mapped position and whether the content around it was deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapResult {
    pub pos: usize,
    pub deleted: bool,
}

/// The change made by one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StepMap {
    range: Option<(usize, usize, usize)>,
}

impl StepMap {
    /// A map for steps that leave every position in place.
    pub fn identity() -> Self {
        Self { range: None }
    }

    pub fn new(start: usize, old_size: usize, new_size: usize) -> Self {
        Self {
            range: Some((start, old_size, new_size)),
        }
    }

    pub fn is_identity(&self) -> bool {
        match self.range {
            None => true,
            Some((_, old, new)) => old == 0 && new == 0,
        }
    }

    pub fn map_result(&self, pos: usize, assoc: Assoc) -> MapResult {
        let Some((start, old_size, new_size)) = self.range else {
            return MapResult { pos, deleted: false };
        };
        let end = start + old_size;
        if pos < start {
            return MapResult { pos, deleted: false };
        }
        if pos > end {
            return MapResult {
                pos: pos + new_size - old_size,
                deleted: false,
            };
        }

        let side = if old_size == 0 {
            assoc
        } else if pos == start {
            Assoc::Before
        } else if pos == end {
            Assoc::After
        } else {
            assoc
        };
        let mapped = match side {
            Assoc::Before => start,
            Assoc::After => start + new_size,
        };
        let deleted = old_size > 0 && pos != start && pos != end;
        MapResult {
            pos: mapped,
            deleted,
        }
    }

    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        self.map_result(pos, assoc).pos
    }

    /// The map that undoes this one.
    pub fn invert(&self) -> StepMap {
        match self.range {
            None => StepMap::identity(),
            Some((start, old, new)) => StepMap::new(start, new, old),
        }
    }
}

/// A sequence of step maps, applied in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    maps: Vec<StepMap>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, map: StepMap) {
        self.maps.push(map);
    }

    pub fn maps(&self) -> &[StepMap] {
        &self.maps
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    pub fn map_result(&self, pos: usize, assoc: Assoc) -> MapResult {
        self.maps.iter().fold(MapResult { pos, deleted: false }, |acc, map| {
            let next = map.map_result(acc.pos, assoc);
            MapResult {
                pos: next.pos,
                deleted: acc.deleted || next.deleted,
            }
        })
    }

    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        self.map_result(pos, assoc).pos
    }

    /// Mapping through the maps from `from` onward.
    pub fn slice(&self, from: usize) -> Mapping {
        Mapping {
            maps: self.maps.get(from..).map(<[StepMap]>::to_vec).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_before_insert_stay() {
        let map = StepMap::new(10, 0, 4);
        assert_eq!(map.map(5, Assoc::After), 5);
        assert_eq!(map.map(12, Assoc::After), 16);
    }

    #[test]
    fn test_insert_point_follows_assoc() {
        let map = StepMap::new(10, 0, 4);
        assert_eq!(map.map(10, Assoc::Before), 10);
        assert_eq!(map.map(10, Assoc::After), 14);
    }

    #[test]
    fn test_deleted_positions_collapse() {
        let map = StepMap::new(10, 5, 0);
        let result = map.map_result(12, Assoc::After);
        assert_eq!(result, MapResult { pos: 10, deleted: true });
        assert_eq!(map.map(15, Assoc::After), 10);
        assert!(!map.map_result(15, Assoc::After).deleted);
        assert_eq!(map.map(20, Assoc::After), 15);
    }

    #[test]
    fn test_mapping_composes() {
        let mut mapping = Mapping::new();
        mapping.push(StepMap::new(4, 6, 0));
        mapping.push(StepMap::identity());
        mapping.push(StepMap::new(20, 0, 6));
        assert_eq!(mapping.map(30, Assoc::After), 30);
        assert_eq!(mapping.map(7, Assoc::After), 4);
        assert!(mapping.map_result(7, Assoc::After).deleted);
        assert_eq!(mapping.slice(2).map(20, Assoc::After), 26);
    }

    #[test]
    fn test_invert_round_trips() {
        let map = StepMap::new(3, 2, 7);
        assert_eq!(map.invert().map(map.map(20, Assoc::After), Assoc::After), 20);
    }
}
